//! Domain records shared by the validator, the registry and every store. The
//! types stay plain data holders; the rules that keep them consistent live in
//! `validate` and `registry`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Gender as persisted: a one-letter code regardless of which set a
/// deployment accepts on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Gender {
    /// Storage code written to CSV files and the `students.gender` column.
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }

    /// Reverse of [`Gender::code`].
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            "O" => Some(Gender::Other),
            _ => None,
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A committed student record. Column order matches the persisted layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    /// Older exports called this column `lvl`.
    #[serde(alias = "lvl")]
    pub level: u8,
    pub gender: Gender,
    /// `None` when the student is not enrolled in any registered course.
    pub course_code: Option<String>,
}

impl Student {
    /// Every field rendered as text, in column order. Search matches against
    /// these, so the gender contributes both its code and its label.
    pub fn search_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.first_name.clone(),
            self.middle_name.clone(),
            self.last_name.clone(),
            self.level.to_string(),
            self.gender.code().to_string(),
            self.gender.label().to_string(),
            self.course_code.clone().unwrap_or_default(),
        ]
    }

    /// `First Middle Last`, skipping blank parts.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  level {}  {}  course {}",
            self.id,
            self.full_name(),
            self.level,
            self.gender,
            self.course_code.as_deref().unwrap_or("-")
        )
    }
}

/// A committed course record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "course_code")]
    pub code: String,
    #[serde(rename = "course_name")]
    pub name: String,
}

impl Course {
    pub fn search_fields(&self) -> [&str; 2] {
        [self.code.as_str(), self.name.as_str()]
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.code, self.name)
    }
}

/// Raw, unvalidated student input exactly as a front end collected it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub id: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub level: String,
    pub gender: String,
    /// Blank means "no course".
    pub course_code: String,
}

impl StudentForm {
    /// Seed a form from a committed record, as an edit dialog would.
    pub fn from_student(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            first_name: student.first_name.clone(),
            middle_name: student.middle_name.clone(),
            last_name: student.last_name.clone(),
            level: student.level.to_string(),
            gender: student.gender.code().to_string(),
            course_code: student.course_code.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Student {
        Student {
            id: "1234-5678".to_string(),
            first_name: "ADA".to_string(),
            middle_name: "KING".to_string(),
            last_name: "LOVELACE".to_string(),
            level: 2,
            gender: Gender::Female,
            course_code: Some("CS101".to_string()),
        }
    }

    #[test]
    fn gender_codes_round_trip() {
        for gender in [Gender::Male, Gender::Female, Gender::Other] {
            assert_eq!(Gender::from_code(gender.code()), Some(gender));
        }
        assert_eq!(Gender::from_code("X"), None);
    }

    #[test]
    fn search_fields_include_gender_label_and_blank_course() {
        let mut student = sample();
        student.course_code = None;
        let fields = student.search_fields();
        assert!(fields.contains(&"Female".to_string()));
        assert!(fields.contains(&"F".to_string()));
        assert_eq!(fields.last().map(String::as_str), Some(""));
    }

    #[test]
    fn form_from_student_keeps_storage_codes() {
        let form = StudentForm::from_student(&sample());
        assert_eq!(form.level, "2");
        assert_eq!(form.gender, "F");
        assert_eq!(form.course_code, "CS101");
    }

    #[test]
    fn display_uses_dash_for_missing_course() {
        let mut student = sample();
        student.course_code = None;
        assert!(student.to_string().ends_with("course -"));
    }
}
