use crate::error::{RegistryError, RegistryResult};
use crate::models::{Student, StudentForm};
use crate::store::RecordStore;

use super::Registry;

impl<S: RecordStore> Registry<S> {
    /// Validate `form` and insert it as a new student.
    ///
    /// The identifier is checked for uniqueness before the remaining fields
    /// are validated; a non-blank course code must name a registered course.
    pub fn add_student(&mut self, form: &StudentForm) -> RegistryResult<Student> {
        let id = self.validator.id(&form.id)?;
        if self.students.contains_key(&id) {
            return Err(RegistryError::DuplicateId { id });
        }
        let student = self.validator.student(form)?;
        self.ensure_course_exists(student.course_code.as_deref())?;

        self.students.insert(student.id.clone(), student.clone());
        tracing::info!(id = %student.id, course = ?student.course_code, "added student");

        self.persist()?;
        Ok(student)
    }

    /// Replace the student stored under `id` with the validated `form`,
    /// keeping its position. The form may carry a new identifier as long as no
    /// other student already uses it.
    pub fn update_student(&mut self, id: &str, form: &StudentForm) -> RegistryResult<Student> {
        let current = id.trim();
        let index = self
            .students
            .get_index_of(current)
            .ok_or_else(|| RegistryError::student_not_found(current))?;

        let student = self.validator.student(form)?;
        let renamed = student.id != current;
        if renamed && self.students.contains_key(&student.id) {
            return Err(RegistryError::DuplicateId { id: student.id });
        }
        self.ensure_course_exists(student.course_code.as_deref())?;

        if renamed {
            self.students.shift_remove_index(index);
            self.students
                .shift_insert(index, student.id.clone(), student.clone());
            tracing::info!(from = %current, to = %student.id, "updated student with new ID");
        } else if let Some(slot) = self.students.get_mut(current) {
            *slot = student.clone();
            tracing::info!(id = %student.id, "updated student");
        }

        self.persist()?;
        Ok(student)
    }

    /// Remove the student with `id`, returning the removed record.
    pub fn delete_student(&mut self, id: &str) -> RegistryResult<Student> {
        let id = id.trim();
        let removed = self
            .students
            .shift_remove(id)
            .ok_or_else(|| RegistryError::student_not_found(id))?;
        tracing::info!(id = %removed.id, "deleted student");

        self.persist()?;
        Ok(removed)
    }

    fn ensure_course_exists(&self, code: Option<&str>) -> RegistryResult<()> {
        match code {
            Some(code) if !self.courses.contains_key(code) => Err(RegistryError::UnknownCourse {
                code: code.to_string(),
            }),
            _ => Ok(()),
        }
    }
}
