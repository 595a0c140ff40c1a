use anyhow::{anyhow, Context, Result};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, Error as SqlError, ErrorCode};

use crate::models::{Gender, Student};

impl ToSql for Gender {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Gender {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;
        Gender::from_code(code)
            .ok_or_else(|| FromSqlError::Other(format!("unknown gender code {code:?}").into()))
    }
}

/// Retrieve every student in registry order.
pub(super) fn fetch_students(conn: &Connection) -> Result<Vec<Student>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, first_name, middle_name, last_name, level, gender, course_code
             FROM students
             ORDER BY position",
        )
        .context("failed to prepare student query")?;

    let students = stmt
        .query_map([], |row| {
            Ok(Student {
                id: row.get(0)?,
                first_name: row.get(1)?,
                middle_name: row.get(2)?,
                last_name: row.get(3)?,
                level: row.get(4)?,
                gender: row.get(5)?,
                course_code: row.get(6)?,
            })
        })
        .context("failed to load students")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect students")?;

    Ok(students)
}

/// Delete every student row and insert `students` in order.
pub(super) fn replace_students(conn: &Connection, students: &[Student]) -> Result<()> {
    conn.execute("DELETE FROM students", [])
        .context("failed to clear students")?;

    let mut insert = conn
        .prepare(
            "INSERT INTO students
                 (id, first_name, middle_name, last_name, level, gender, course_code, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .context("failed to prepare student insert")?;

    for (position, student) in students.iter().enumerate() {
        insert
            .execute(params![
                student.id,
                student.first_name,
                student.middle_name,
                student.last_name,
                student.level,
                student.gender,
                student.course_code,
                position as i64,
            ])
            .map_err(|err| map_constraint(err, student))
            .context("failed to insert student")?;
    }

    Ok(())
}

/// Coerce SQLite constraint errors into human-readable messages. The foreign
/// key is the interesting one: it fires when a student names a course that
/// was never written.
fn map_constraint(err: SqlError, student: &Student) -> anyhow::Error {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        match &student.course_code {
            Some(code) => anyhow!(
                "student {} violates a database constraint (course {code}): {err}",
                student.id
            ),
            None => anyhow!("student {} violates a database constraint: {err}", student.id),
        }
    } else {
        err.into()
    }
}
