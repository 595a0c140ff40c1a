//! Flat-file backend: one CSV file per collection, header row first.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::models::{Course, Student};

use super::RecordStore;

pub const STUDENTS_FILE_NAME: &str = "students.csv";
pub const COURSES_FILE_NAME: &str = "courses.csv";

const STUDENT_COLUMNS: [&str; 7] = [
    "id",
    "first_name",
    "middle_name",
    "last_name",
    "level",
    "gender",
    "course_code",
];
const COURSE_COLUMNS: [&str; 2] = ["course_code", "course_name"];

/// Stores students and courses as two CSV files.
#[derive(Debug, Clone)]
pub struct FileStore {
    students_path: PathBuf,
    courses_path: PathBuf,
}

impl FileStore {
    /// Use `students.csv` and `courses.csv` inside `dir`. Nothing is created
    /// until the first save.
    pub fn new(dir: &Path) -> Self {
        Self::with_paths(dir.join(STUDENTS_FILE_NAME), dir.join(COURSES_FILE_NAME))
    }

    /// Use explicit file locations, which need not share a directory.
    pub fn with_paths(students_path: impl Into<PathBuf>, courses_path: impl Into<PathBuf>) -> Self {
        Self {
            students_path: students_path.into(),
            courses_path: courses_path.into(),
        }
    }

    pub fn students_path(&self) -> &Path {
        &self.students_path
    }

    pub fn courses_path(&self) -> &Path {
        &self.courses_path
    }
}

impl RecordStore for FileStore {
    fn load_students(&self) -> Result<Vec<Student>> {
        read_records(&self.students_path)
    }

    fn load_courses(&self) -> Result<Vec<Course>> {
        read_records(&self.courses_path)
    }

    fn save_students(&mut self, students: &[Student]) -> Result<()> {
        write_records(&self.students_path, &STUDENT_COLUMNS, students)
    }

    fn save_courses(&mut self, courses: &[Course]) -> Result<()> {
        write_records(&self.courses_path, &COURSE_COLUMNS, courses)
    }
}

/// Read every row of a CSV file. A missing or zero-length file is an empty
/// collection; rows that fail to parse are skipped with a warning.
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let is_empty = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
        Err(err) => {
            return Err(err).with_context(|| format!("failed to stat {}", path.display()));
        }
    };
    if is_empty {
        tracing::debug!(path = %path.display(), "no records on disk");
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for (index, row) in reader.deserialize().enumerate() {
        match row {
            Ok(record) => records.push(record),
            Err(err) => {
                // Header is line 1, so data rows start at line 2.
                tracing::warn!(
                    path = %path.display(),
                    line = index + 2,
                    error = %err,
                    "skipping malformed row"
                );
            }
        }
    }

    tracing::debug!(path = %path.display(), count = records.len(), "loaded records");
    Ok(records)
}

/// Write a header plus one row per record to a temp file in the same
/// directory, sync it, and rename it over `path` so readers only ever see a
/// complete file. On any error the temp file is dropped, which deletes it.
fn write_records<T: Serialize>(path: &Path, columns: &[&str], records: &[T]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).context("failed to create data directory")?;

    let temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(temp);
    writer
        .write_record(columns)
        .context("failed to write header row")?;
    for record in records {
        writer.serialize(record).context("failed to write row")?;
    }
    let temp = writer
        .into_inner()
        .map_err(|err| anyhow!("failed to flush {}: {}", path.display(), err.error()))?;
    temp.as_file()
        .sync_all()
        .with_context(|| format!("failed to sync {}", temp.path().display()))?;

    temp.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;

    tracing::debug!(path = %path.display(), count = records.len(), "saved records");
    Ok(())
}
