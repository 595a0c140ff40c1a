//! Field validation and normalization.
//!
//! Every check here is a pure function of its input and the deployment's
//! [`ValidationConfig`]: no lookups against existing records happen at this
//! layer. The registry calls into the [`Validator`] before it touches its
//! collections, so a rejected field never leaves a partial change behind.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Field, Rule, ValidationError};
use crate::models::{Gender, Student, StudentForm};

static PLAIN_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{4}$").expect("valid id pattern"));
static YEAR_PREFIXED_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^20[0-9]{2}-[0-9]{4}$").expect("valid id pattern"));
static COURSE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9-]{4,15}$").expect("valid course code pattern"));

/// Accepted shape of a student identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdFormat {
    /// `XXXX-XXXX`
    #[default]
    Plain,
    /// `20XX-XXXX`
    YearPrefixed,
}

impl IdFormat {
    fn pattern(self) -> &'static Regex {
        match self {
            IdFormat::Plain => &PLAIN_ID,
            IdFormat::YearPrefixed => &YEAR_PREFIXED_ID,
        }
    }

    /// Placeholder shown to users when an identifier is rejected.
    pub fn hint(self) -> &'static str {
        match self {
            IdFormat::Plain => "XXXX-XXXX",
            IdFormat::YearPrefixed => "20XX-XXXX",
        }
    }
}

/// Which genders a deployment accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenderSet {
    /// `M` / `F`
    #[default]
    Binary,
    /// `Male` / `Female` / `Other`
    Ternary,
}

impl GenderSet {
    /// Values listed back to the user when a gender is rejected.
    pub fn accepted(self) -> &'static [&'static str] {
        match self {
            GenderSet::Binary => &["M", "F"],
            GenderSet::Ternary => &["Male", "Female", "Other"],
        }
    }

    pub fn contains(self, gender: Gender) -> bool {
        match self {
            GenderSet::Binary => gender != Gender::Other,
            GenderSet::Ternary => true,
        }
    }
}

/// Canonical case applied to accepted names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameCase {
    /// `ADA LOVELACE`
    #[default]
    Upper,
    /// `Ada Lovelace`
    Title,
}

impl NameCase {
    pub fn apply(self, text: &str) -> String {
        match self {
            NameCase::Upper => text.to_uppercase(),
            NameCase::Title => title_case(text),
        }
    }
}

/// Capitalize the first letter of every alphabetic run and lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Deployment-level validation choices, read from the `[validation]` table of
/// the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ValidationConfig {
    pub id_format: IdFormat,
    pub genders: GenderSet,
    pub name_case: NameCase,
}

/// Stateless field checker parameterized by a [`ValidationConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Validator for one deployment variant. [`Validator::default`] gives the
    /// plain-id, binary-gender, uppercase rules.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Trimmed identifier, required and matching the configured [`IdFormat`].
    pub fn id(&self, raw: &str) -> Result<String, ValidationError> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(ValidationError::new(Field::Id, Rule::Required));
        }
        let format = self.config.id_format;
        if !format.pattern().is_match(id) {
            return Err(ValidationError::new(
                Field::Id,
                Rule::IdFormat {
                    expected: format.hint(),
                },
            ));
        }
        Ok(id.to_string())
    }

    /// Accepts letters separated by spaces; returns the trimmed name in the
    /// configured case.
    pub fn name(&self, field: Field, raw: &str) -> Result<String, ValidationError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ValidationError::new(field, Rule::Required));
        }
        if !name.chars().filter(|ch| *ch != ' ').all(char::is_alphabetic) {
            return Err(ValidationError::new(field, Rule::Alphabetic));
        }
        Ok(self.config.name_case.apply(name))
    }

    /// A single ASCII digit from 1 to 6. Anything else, including `06`, is out
    /// of range.
    pub fn level(&self, raw: &str) -> Result<u8, ValidationError> {
        let level = raw.trim();
        if level.is_empty() {
            return Err(ValidationError::new(Field::Level, Rule::Required));
        }
        match level.as_bytes() {
            [digit @ b'1'..=b'6'] => Ok(digit - b'0'),
            _ => Err(ValidationError::new(Field::Level, Rule::LevelRange)),
        }
    }

    /// Accepts either the one-letter code or the full label, in any case.
    pub fn gender(&self, raw: &str) -> Result<Gender, ValidationError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(ValidationError::new(Field::Gender, Rule::Required));
        }
        let parsed = match value.to_ascii_uppercase().as_str() {
            "M" | "MALE" => Some(Gender::Male),
            "F" | "FEMALE" => Some(Gender::Female),
            "O" | "OTHER" => Some(Gender::Other),
            _ => None,
        };
        let genders = self.config.genders;
        parsed.filter(|gender| genders.contains(*gender)).ok_or_else(|| {
            ValidationError::new(
                Field::Gender,
                Rule::GenderSet {
                    accepted: genders.accepted(),
                },
            )
        })
    }

    /// Trimmed and uppercased, then checked against `^[A-Z0-9-]{4,15}$`.
    pub fn course_code(&self, raw: &str) -> Result<String, ValidationError> {
        let code = raw.trim().to_uppercase();
        if code.is_empty() {
            return Err(ValidationError::new(Field::CourseCode, Rule::Required));
        }
        if !COURSE_CODE.is_match(&code) {
            return Err(ValidationError::new(Field::CourseCode, Rule::CourseCodeFormat));
        }
        Ok(code)
    }

    /// A blank code means the student is not enrolled anywhere.
    pub fn optional_course_code(&self, raw: &str) -> Result<Option<String>, ValidationError> {
        if raw.trim().is_empty() {
            Ok(None)
        } else {
            self.course_code(raw).map(Some)
        }
    }

    /// Free text, required, returned in the configured case.
    pub fn course_name(&self, raw: &str) -> Result<String, ValidationError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ValidationError::new(Field::CourseName, Rule::Required));
        }
        Ok(self.config.name_case.apply(name))
    }

    /// Validate a whole form in column order and build the normalized record.
    pub fn student(&self, form: &StudentForm) -> Result<Student, ValidationError> {
        Ok(Student {
            id: self.id(&form.id)?,
            first_name: self.name(Field::FirstName, &form.first_name)?,
            middle_name: self.name(Field::MiddleName, &form.middle_name)?,
            last_name: self.name(Field::LastName, &form.last_name)?,
            level: self.level(&form.level)?,
            gender: self.gender(&form.gender)?,
            course_code: self.optional_course_code(&form.course_code)?,
        })
    }
}

/// Canonical form of a course code used as a lookup key.
pub(crate) fn course_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn validator() -> Validator {
        Validator::default()
    }

    fn web_validator() -> Validator {
        Validator::new(ValidationConfig {
            id_format: IdFormat::YearPrefixed,
            genders: GenderSet::Ternary,
            name_case: NameCase::Title,
        })
    }

    fn form() -> StudentForm {
        StudentForm {
            id: "1234-5678".to_string(),
            first_name: "ada".to_string(),
            middle_name: "king".to_string(),
            last_name: "lovelace".to_string(),
            level: "2".to_string(),
            gender: "F".to_string(),
            course_code: "cs101".to_string(),
        }
    }

    #[test]
    fn plain_ids() {
        let v = validator();
        assert_eq!(v.id(" 1234-5678 ").unwrap(), "1234-5678");
        assert_eq!(
            v.id("").unwrap_err(),
            ValidationError::new(Field::Id, Rule::Required)
        );
        for bad in ["12345678", "123-45678", "1234-567", "abcd-efgh", "1234-56789"] {
            let err = v.id(bad).unwrap_err();
            assert_eq!(err.field, Field::Id, "{bad}");
            assert!(matches!(err.rule, Rule::IdFormat { expected: "XXXX-XXXX" }));
        }
    }

    #[test]
    fn year_prefixed_ids() {
        let v = web_validator();
        assert!(v.id("2023-0001").is_ok());
        assert!(v.id("1999-0001").is_err());
        assert!(validator().id("1999-0001").is_ok());
    }

    #[test]
    fn names_allow_internal_spaces_only() {
        let v = validator();
        assert_eq!(v.name(Field::FirstName, "  mary  ann ").unwrap(), "MARY  ANN");
        assert_eq!(
            v.name(Field::LastName, "o'brien").unwrap_err(),
            ValidationError::new(Field::LastName, Rule::Alphabetic)
        );
        assert_eq!(
            v.name(Field::MiddleName, "   ").unwrap_err(),
            ValidationError::new(Field::MiddleName, Rule::Required)
        );
        assert!(v.name(Field::FirstName, "R2D2").is_err());
    }

    #[test]
    fn title_case_names() {
        let v = web_validator();
        assert_eq!(v.name(Field::FirstName, "mARY ann").unwrap(), "Mary Ann");
        assert_eq!(v.course_name("intro to COMPUTING").unwrap(), "Intro To Computing");
    }

    #[test]
    fn levels() {
        let v = validator();
        assert_eq!(v.level("1").unwrap(), 1);
        assert_eq!(v.level(" 6 ").unwrap(), 6);
        for bad in ["0", "7", "06", "12", "x", "-1"] {
            assert_eq!(
                v.level(bad).unwrap_err(),
                ValidationError::new(Field::Level, Rule::LevelRange),
                "{bad}"
            );
        }
    }

    #[test]
    fn binary_genders() {
        let v = validator();
        assert_eq!(v.gender("m").unwrap(), Gender::Male);
        assert_eq!(v.gender("Female").unwrap(), Gender::Female);
        let err = v.gender("Other").unwrap_err();
        assert_eq!(
            err.rule,
            Rule::GenderSet {
                accepted: &["M", "F"]
            }
        );
    }

    #[test]
    fn ternary_genders() {
        let v = web_validator();
        assert_eq!(v.gender("other").unwrap(), Gender::Other);
        assert_eq!(v.gender("O").unwrap(), Gender::Other);
        assert!(v.gender("X").is_err());
    }

    #[test]
    fn course_codes() {
        let v = validator();
        assert_eq!(v.course_code(" bs-cs ").unwrap(), "BS-CS");
        assert_eq!(v.course_code("CS101").unwrap(), "CS101");
        for bad in ["CS1", "CS_101", "ABCDEFGHIJKLMNOP", "CS 101"] {
            assert_eq!(
                v.course_code(bad).unwrap_err().rule,
                Rule::CourseCodeFormat,
                "{bad}"
            );
        }
        assert_eq!(v.optional_course_code("  ").unwrap(), None);
    }

    #[test]
    fn student_form_normalizes_every_field() {
        let student = validator().student(&form()).unwrap();
        assert_eq!(student.first_name, "ADA");
        assert_eq!(student.level, 2);
        assert_eq!(student.gender, Gender::Female);
        assert_eq!(student.course_code.as_deref(), Some("CS101"));
    }

    #[test]
    fn student_form_reports_first_bad_field() {
        let mut bad = form();
        bad.last_name = "l0velace".to_string();
        bad.level = "9".to_string();
        let err = validator().student(&bad).unwrap_err();
        assert_eq!(err.field, Field::LastName);
    }

    proptest! {
        #[test]
        fn normalized_names_are_fixed_points(raw in "[a-zA-Z]{1,8}( [a-zA-Z]{1,8}){0,2}") {
            for v in [validator(), web_validator()] {
                let once = v.name(Field::FirstName, &raw).unwrap();
                let twice = v.name(Field::FirstName, &once).unwrap();
                prop_assert_eq!(once, twice);
            }
        }

        #[test]
        fn course_code_acceptance_ignores_case(raw in "[a-zA-Z0-9-]{4,15}") {
            let v = validator();
            prop_assert_eq!(v.course_code(&raw).unwrap(), raw.to_uppercase());
        }
    }
}
