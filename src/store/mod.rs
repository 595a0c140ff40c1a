//! Durable storage beneath the registry, split across backends.
//!
//! Every backend rewrites whole collections on save. Nothing here enforces
//! the student → course relationship as a primary rule; the registry does
//! that before it ever calls a store. The SQLite backend additionally
//! declares the foreign key in its schema.

mod connection;
mod courses;
mod files;
mod memory;
mod sqlite;
mod students;

use anyhow::Result;

use crate::models::{Course, Student};

pub use connection::{ensure_schema, open_database, DB_FILE_NAME};
pub use files::{FileStore, COURSES_FILE_NAME, STUDENTS_FILE_NAME};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Load/save contract shared by every backend.
///
/// Loading an absent or empty store yields empty collections. Saving replaces
/// the stored collection; a load that follows a successful save returns
/// exactly what was saved, in the same order.
pub trait RecordStore {
    fn load_students(&self) -> Result<Vec<Student>>;

    fn load_courses(&self) -> Result<Vec<Course>>;

    fn save_students(&mut self, students: &[Student]) -> Result<()>;

    fn save_courses(&mut self, courses: &[Course]) -> Result<()>;

    /// Persist both collections after a registry mutation. Courses go first
    /// so every student reference resolves when students are written.
    fn save_all(&mut self, students: &[Student], courses: &[Course]) -> Result<()> {
        self.save_courses(courses)?;
        self.save_students(students)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn load_students(&self) -> Result<Vec<Student>> {
        (**self).load_students()
    }

    fn load_courses(&self) -> Result<Vec<Course>> {
        (**self).load_courses()
    }

    fn save_students(&mut self, students: &[Student]) -> Result<()> {
        (**self).save_students(students)
    }

    fn save_courses(&mut self, courses: &[Course]) -> Result<()> {
        (**self).save_courses(courses)
    }

    fn save_all(&mut self, students: &[Student], courses: &[Course]) -> Result<()> {
        (**self).save_all(students, courses)
    }
}
