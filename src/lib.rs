//! Core library for the student registry.
//!
//! The crate keeps student and course records mutually consistent: fields are
//! validated before anything is committed, a student may only reference a
//! registered course, and renaming or deleting a course cascades to every
//! student enrolled in it. Front ends stay thin and only call into
//! [`Registry`].
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod store;
pub mod validate;

/// Deployment configuration.
pub use config::{default_data_dir, Backend, Config};

/// Typed failures returned to front ends.
pub use error::{Entity, Field, RegistryError, RegistryResult, Rule, ValidationError};

/// The two record types and the raw form used to create or edit students.
pub use models::{Course, Gender, Student, StudentForm};

/// The integrity engine and its query types.
pub use registry::{CourseChange, Registry, SearchHits, SearchOrder, SearchScope};

/// Persistence backends.
pub use store::{FileStore, MemoryStore, RecordStore, SqliteStore};

pub use validate::{GenderSet, IdFormat, NameCase, ValidationConfig, Validator};
