use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::models::{Course, Student};

use super::connection::{ensure_schema, open_database};
use super::courses::{fetch_courses, sync_courses};
use super::students::{fetch_students, replace_students};
use super::RecordStore;

/// Relational backend. Each save runs inside one transaction, so a reader
/// never observes a half-written collection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database file at `path`, creating it and its tables on first
    /// use.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_database(path)?,
        })
    }

    /// Private database that disappears when the store is dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    /// Adopt an existing connection, creating tables if they are missing.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteStore {
    fn load_students(&self) -> Result<Vec<Student>> {
        fetch_students(&self.conn)
    }

    fn load_courses(&self) -> Result<Vec<Course>> {
        fetch_courses(&self.conn)
    }

    fn save_students(&mut self, students: &[Student]) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .context("failed to begin transaction")?;
        replace_students(&tx, students)?;
        tx.commit().context("failed to commit students")?;
        tracing::debug!(count = students.len(), "saved students");
        Ok(())
    }

    fn save_courses(&mut self, courses: &[Course]) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .context("failed to begin transaction")?;
        sync_courses(&tx, courses)?;
        tx.commit().context("failed to commit courses")?;
        tracing::debug!(count = courses.len(), "saved courses");
        Ok(())
    }

    /// Students are cleared first so renamed or removed courses can be
    /// rewritten without tripping the foreign key, then reinserted against the
    /// new course rows. Everything commits together.
    fn save_all(&mut self, students: &[Student], courses: &[Course]) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .context("failed to begin transaction")?;
        tx.execute("DELETE FROM students", [])
            .context("failed to clear students")?;
        sync_courses(&tx, courses)?;
        replace_students(&tx, students)?;
        tx.commit().context("failed to commit records")?;
        tracing::debug!(
            students = students.len(),
            courses = courses.len(),
            "saved records"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use crate::models::Gender;
    use crate::store::fixtures::{course, student, students_strategy};

    fn seeded() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .save_all(
                &[
                    student("2023-0002", Some("CS101")),
                    student("2023-0001", Some("CS101")),
                    student("2023-0003", None),
                ],
                &[course("CS101", "Intro To Computing"), course("MATH1", "Algebra")],
            )
            .unwrap();
        store
    }

    #[test]
    fn empty_database_loads_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load_students().unwrap().is_empty());
        assert!(store.load_courses().unwrap().is_empty());
    }

    #[test]
    fn round_trip_preserves_order_and_fields() {
        let mut store = seeded();
        let ids: Vec<_> = store
            .load_students()
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, ["2023-0002", "2023-0001", "2023-0003"]);

        let mut students = store.load_students().unwrap();
        students[2].gender = Gender::Other;
        store.save_students(&students).unwrap();
        assert_eq!(store.load_students().unwrap(), students);
    }

    #[test]
    fn foreign_key_rejects_unknown_course() {
        let mut store = seeded();
        let before = store.load_students().unwrap();

        let err = store
            .save_students(&[student("2023-0009", Some("NOPE"))])
            .unwrap_err();
        assert!(format!("{err:#}").contains("2023-0009"));
        // The failed transaction leaves the previous rows untouched.
        assert_eq!(store.load_students().unwrap(), before);
    }

    #[test]
    fn dropping_a_course_nulls_references() {
        let mut store = seeded();
        store.save_courses(&[course("MATH1", "Algebra")]).unwrap();

        let students = store.load_students().unwrap();
        assert!(students.iter().all(|s| s.course_code.is_none()));
        assert_eq!(store.load_courses().unwrap(), vec![course("MATH1", "Algebra")]);
    }

    #[test]
    fn save_all_handles_renamed_course() {
        let mut store = seeded();
        let students = vec![
            student("2023-0002", Some("CS102")),
            student("2023-0001", Some("CS102")),
            student("2023-0003", None),
        ];
        let courses = vec![course("CS102", "Intro To Computing"), course("MATH1", "Algebra")];
        store.save_all(&students, &courses).unwrap();

        assert_eq!(store.load_students().unwrap(), students);
        assert_eq!(store.load_courses().unwrap(), courses);
    }

    #[test]
    fn reopening_file_database_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(crate::store::DB_FILE_NAME);
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store
                .save_all(&[student("1234-5678", Some("CS101"))], &[course("CS101", "X")])
                .unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load_students().unwrap().len(), 1);
        assert_eq!(store.load_courses().unwrap()[0].code, "CS101");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn any_student_sequence_round_trips(students in students_strategy()) {
            let codes: BTreeSet<&str> = students
                .iter()
                .filter_map(|s| s.course_code.as_deref())
                .collect();
            let courses: Vec<Course> = codes.into_iter().map(|code| course(code, "COURSE")).collect();

            let mut store = SqliteStore::open_in_memory().unwrap();
            store.save_all(&students, &courses).unwrap();
            prop_assert_eq!(store.load_students().unwrap(), students);
            prop_assert_eq!(store.load_courses().unwrap(), courses);
        }
    }
}
