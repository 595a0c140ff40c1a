use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// SQLite file name stored inside the application data directory.
pub const DB_FILE_NAME: &str = "registry.sqlite";

/// Open (creating if needed) the database at `path` and make sure the schema
/// exists.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Run lazy migrations on a live connection. The function also toggles
/// `PRAGMA foreign_keys = ON` so the `students.course_code` reference is
/// enforced by SQLite itself, with `ON DELETE SET NULL` mirroring the
/// registry's course-deletion cascade.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses (
            course_code TEXT PRIMARY KEY NOT NULL,
            course_name TEXT NOT NULL,
            position INTEGER NOT NULL
        )",
        [],
    )
    .context("failed to create courses table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students (
            id TEXT PRIMARY KEY NOT NULL,
            first_name TEXT NOT NULL,
            middle_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            level INTEGER NOT NULL CHECK (level BETWEEN 1 AND 6),
            gender TEXT NOT NULL CHECK (gender IN ('M', 'F', 'O')),
            course_code TEXT,
            position INTEGER NOT NULL,
            CONSTRAINT fk_course_code FOREIGN KEY (course_code)
                REFERENCES courses(course_code) ON DELETE SET NULL
        )",
        [],
    )
    .context("failed to create students table")?;

    Ok(())
}
