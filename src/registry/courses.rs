use crate::error::{RegistryError, RegistryResult};
use crate::models::Course;
use crate::store::RecordStore;
use crate::validate::course_key;

use super::Registry;

/// Outcome of a course update or deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseChange {
    /// The course as it now stands (update) or as it was removed (delete).
    pub course: Course,
    /// Students whose `course_code` was rewritten by the cascade.
    pub affected_students: usize,
}

impl<S: RecordStore> Registry<S> {
    /// Validate and insert a new course. The code is checked for uniqueness
    /// before the name is validated.
    pub fn add_course(&mut self, code: &str, name: &str) -> RegistryResult<Course> {
        let code = self.validator.course_code(code)?;
        if self.courses.contains_key(&code) {
            return Err(RegistryError::DuplicateCourseCode { code });
        }
        let name = self.validator.course_name(name)?;

        let course = Course { code, name };
        self.courses.insert(course.code.clone(), course.clone());
        tracing::info!(code = %course.code, "added course");

        self.persist()?;
        Ok(course)
    }

    /// Rename and/or retitle the course stored under `old_code`.
    ///
    /// When the code changes, every student enrolled under the old code is
    /// moved to the new one. All checks run first, so a rejected rename leaves
    /// both collections exactly as they were.
    pub fn update_course(
        &mut self,
        old_code: &str,
        new_code: &str,
        name: &str,
    ) -> RegistryResult<CourseChange> {
        let old_code = course_key(old_code);
        let index = self
            .courses
            .get_index_of(&old_code)
            .ok_or_else(|| RegistryError::course_not_found(old_code.as_str()))?;

        let code = self.validator.course_code(new_code)?;
        let name = self.validator.course_name(name)?;
        let renamed = code != old_code;
        if renamed && self.courses.contains_key(&code) {
            return Err(RegistryError::DuplicateCourseCode { code });
        }

        let course = Course { code, name };
        let mut affected_students = 0;
        if renamed {
            self.courses.shift_remove_index(index);
            self.courses
                .shift_insert(index, course.code.clone(), course.clone());
            for student in self.students.values_mut() {
                if student.course_code.as_deref() == Some(old_code.as_str()) {
                    student.course_code = Some(course.code.clone());
                    affected_students += 1;
                }
            }
            tracing::info!(
                from = %old_code,
                to = %course.code,
                students = affected_students,
                "renamed course"
            );
        } else if let Some(slot) = self.courses.get_mut(&old_code) {
            *slot = course.clone();
            tracing::info!(code = %course.code, "updated course");
        }

        self.persist()?;
        Ok(CourseChange {
            course,
            affected_students,
        })
    }

    /// Remove a course. Students enrolled in it stay registered with no
    /// course.
    pub fn delete_course(&mut self, code: &str) -> RegistryResult<CourseChange> {
        let code = course_key(code);
        let course = self
            .courses
            .shift_remove(&code)
            .ok_or_else(|| RegistryError::course_not_found(code.as_str()))?;

        let mut affected_students = 0;
        for student in self.students.values_mut() {
            if student.course_code.as_deref() == Some(code.as_str()) {
                student.course_code = None;
                affected_students += 1;
            }
        }
        tracing::info!(
            code = %course.code,
            students = affected_students,
            "deleted course"
        );

        self.persist()?;
        Ok(CourseChange {
            course,
            affected_students,
        })
    }
}
