//! Error types returned by the validator and the registry.

use std::fmt;

use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Which input field a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    FirstName,
    MiddleName,
    LastName,
    Level,
    Gender,
    CourseCode,
    CourseName,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Id => "ID number",
            Field::FirstName => "first name",
            Field::MiddleName => "middle name",
            Field::LastName => "last name",
            Field::Level => "year level",
            Field::Gender => "gender",
            Field::CourseCode => "course code",
            Field::CourseName => "course name",
        };
        f.write_str(name)
    }
}

/// The rule a field broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Blank after trimming.
    Required,
    /// Identifier does not match the deployment's pattern, e.g. `XXXX-XXXX`.
    IdFormat { expected: &'static str },
    /// Contains something other than letters and spaces.
    Alphabetic,
    /// Not a single digit between 1 and 6.
    LevelRange,
    /// Not one of the accepted values.
    GenderSet { accepted: &'static [&'static str] },
    /// Not 4 to 15 characters of `A-Z`, `0-9` or `-`.
    CourseCodeFormat,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => f.write_str("is required"),
            Rule::IdFormat { expected } => write!(f, "must use the format {expected}"),
            Rule::Alphabetic => f.write_str("must contain only alphabetic characters"),
            Rule::LevelRange => f.write_str("must be a single digit between 1 and 6"),
            Rule::GenderSet { accepted } => write!(f, "must be one of {}", accepted.join(", ")),
            Rule::CourseCodeFormat => {
                f.write_str("must be 4-15 uppercase letters, digits or hyphens")
            }
        }
    }
}

/// A single field rejected by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {rule}")]
pub struct ValidationError {
    pub field: Field,
    pub rule: Rule,
}

impl ValidationError {
    pub fn new(field: Field, rule: Rule) -> Self {
        Self { field, rule }
    }
}

/// Record kind named by [`RegistryError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Student,
    Course,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Student => f.write_str("student"),
            Entity::Course => f.write_str("course"),
        }
    }
}

/// Errors surfaced by [`crate::Registry`] operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A field failed syntactic validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another student already uses this identifier.
    #[error("student with ID {id} already exists")]
    DuplicateId { id: String },

    /// Another course already uses this code.
    #[error("course with code {code} already exists")]
    DuplicateCourseCode { code: String },

    /// No record with the given key.
    #[error("{entity} {key} not found")]
    NotFound { entity: Entity, key: String },

    /// The student references a course that is not registered.
    #[error("course code {code} does not exist")]
    UnknownCourse { code: String },

    /// Persisting the collections failed. The in-memory change stays applied.
    #[error("failed to persist records: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl RegistryError {
    pub fn student_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: Entity::Student,
            key: id.into(),
        }
    }

    pub fn course_not_found(code: impl Into<String>) -> Self {
        Self::NotFound {
            entity: Entity::Course,
            key: code.into(),
        }
    }

    /// Whether the failure came from the backing store rather than the input.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

impl From<anyhow::Error> for RegistryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Store(err.into())
    }
}
