use std::collections::HashSet;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::models::Course;

/// Retrieve every course in registry order.
pub(super) fn fetch_courses(conn: &Connection) -> Result<Vec<Course>> {
    let mut stmt = conn
        .prepare("SELECT course_code, course_name FROM courses ORDER BY position")
        .context("failed to prepare course query")?;

    let courses = stmt
        .query_map([], |row| {
            Ok(Course {
                code: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .context("failed to load courses")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect courses")?;

    Ok(courses)
}

/// Make the `courses` table match `courses` exactly. Rows that are no longer
/// present are deleted, which lets the foreign key null out any student still
/// pointing at them; surviving rows are updated in place rather than
/// re-inserted so their references stay intact.
pub(super) fn sync_courses(conn: &Connection, courses: &[Course]) -> Result<()> {
    let keep: HashSet<&str> = courses.iter().map(|course| course.code.as_str()).collect();

    let existing = {
        let mut stmt = conn
            .prepare("SELECT course_code FROM courses")
            .context("failed to prepare course code query")?;
        let codes = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("failed to list course codes")?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to collect course codes")?;
        codes
    };

    for code in existing.iter().filter(|code| !keep.contains(code.as_str())) {
        conn.execute("DELETE FROM courses WHERE course_code = ?1", params![code])
            .with_context(|| format!("failed to delete course {code}"))?;
    }

    let mut upsert = conn
        .prepare(
            "INSERT INTO courses (course_code, course_name, position) VALUES (?1, ?2, ?3)
             ON CONFLICT(course_code) DO UPDATE SET
                 course_name = excluded.course_name,
                 position = excluded.position",
        )
        .context("failed to prepare course upsert")?;

    for (position, course) in courses.iter().enumerate() {
        upsert
            .execute(params![course.code, course.name, position as i64])
            .with_context(|| format!("failed to write course {}", course.code))?;
    }

    Ok(())
}
