use anyhow::Result;

use crate::models::{Course, Student};

use super::RecordStore;

/// Keeps the last saved collections in process memory. Useful when embedding
/// the registry without touching disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    students: Vec<Student>,
    courses: Vec<Course>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from pre-existing records, as if they had been saved earlier.
    pub fn with_records(students: Vec<Student>, courses: Vec<Course>) -> Self {
        Self {
            students,
            courses,
            saves: 0,
        }
    }

    /// Number of collection writes performed so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl RecordStore for MemoryStore {
    fn load_students(&self) -> Result<Vec<Student>> {
        Ok(self.students.clone())
    }

    fn load_courses(&self) -> Result<Vec<Course>> {
        Ok(self.courses.clone())
    }

    fn save_students(&mut self, students: &[Student]) -> Result<()> {
        self.students = students.to_vec();
        self.saves += 1;
        Ok(())
    }

    fn save_courses(&mut self, courses: &[Course]) -> Result<()> {
        self.courses = courses.to_vec();
        self.saves += 1;
        Ok(())
    }
}
