//! The integrity engine.
//!
//! A [`Registry`] owns the in-memory student and course collections for a
//! session together with the store that backs them. Each mutation runs every
//! check (field validation, uniqueness, course existence) before touching a
//! collection, applies the change, cascades it across the other collection
//! when needed, and finally rewrites both collections to the store.
//!
//! A store failure is reported as [`RegistryError::Store`] but the in-memory
//! change is kept: memory stays the source of truth and the next successful
//! mutation resynchronizes the store.

mod courses;
mod search;
mod students;

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::error::{RegistryError, RegistryResult};
use crate::models::{Course, Student};
use crate::store::RecordStore;
use crate::validate::{course_key, Validator};

pub use courses::CourseChange;
pub use search::{SearchHits, SearchOrder, SearchScope};

pub struct Registry<S> {
    store: S,
    validator: Validator,
    /// Keyed by student id, in insertion order.
    students: IndexMap<String, Student>,
    /// Keyed by course code, in insertion order.
    courses: IndexMap<String, Course>,
}

impl<S: RecordStore> Registry<S> {
    /// Load both collections from `store`. Stored keys are normalized the same
    /// way as input: ids trimmed, course codes trimmed and uppercased. Keys that
    /// collide after normalization keep their first occurrence.
    pub fn open(store: S, validator: Validator) -> RegistryResult<Self> {
        let courses = index_records(
            store.load_courses()?.into_iter().map(normalize_loaded_course),
            "course",
            |course| course.code.clone(),
        );
        let students = index_records(
            store.load_students()?.into_iter().map(normalize_loaded_student),
            "student",
            |student| student.id.clone(),
        );

        for student in students.values() {
            if let Some(code) = &student.course_code {
                if !courses.contains_key(code) {
                    tracing::warn!(id = %student.id, course = %code, "student references a missing course");
                }
            }
        }

        tracing::debug!(
            students = students.len(),
            courses = courses.len(),
            "registry loaded"
        );

        Ok(Self {
            store,
            validator,
            students,
            courses,
        })
    }

    /// The backing store, for callers that need to inspect persisted state.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Students in insertion order.
    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.students.values()
    }

    /// Courses in insertion order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// Number of registered students.
    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    /// Number of registered courses.
    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    /// Exact match on the trimmed identifier.
    pub fn find_student(&self, id: &str) -> Option<&Student> {
        self.students.get(id.trim())
    }

    /// Codes are matched after trimming and uppercasing, the same way they are
    /// normalized on entry.
    pub fn find_course(&self, code: &str) -> Option<&Course> {
        self.courses.get(&course_key(code))
    }

    /// Every student, ordered by identifier rather than insertion.
    pub fn students_sorted_by_id(&self) -> Vec<&Student> {
        let mut sorted: Vec<&Student> = self.students.values().collect();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));
        sorted
    }

    /// Students currently enrolled in `code`, in insertion order.
    pub fn students_in_course(&self, code: &str) -> Vec<&Student> {
        let code = course_key(code);
        self.students
            .values()
            .filter(|student| student.course_code.as_deref() == Some(code.as_str()))
            .collect()
    }

    /// Rewrite both collections to the store.
    fn persist(&mut self) -> RegistryResult<()> {
        let students: Vec<Student> = self.students.values().cloned().collect();
        let courses: Vec<Course> = self.courses.values().cloned().collect();
        self.store.save_all(&students, &courses).map_err(|err| {
            tracing::error!(error = %format!("{err:#}"), "failed to persist records");
            RegistryError::from(err)
        })
    }
}

fn normalize_loaded_course(mut course: Course) -> Course {
    course.code = course_key(&course.code);
    course
}

/// A blank stored course code counts as no course.
fn normalize_loaded_student(mut student: Student) -> Student {
    student.id = student.id.trim().to_string();
    student.course_code = student
        .course_code
        .map(|code| course_key(&code))
        .filter(|code| !code.is_empty());
    student
}

fn index_records<T>(
    records: impl Iterator<Item = T>,
    kind: &'static str,
    key_of: impl Fn(&T) -> String,
) -> IndexMap<String, T> {
    let mut indexed = IndexMap::with_capacity(records.size_hint().0);
    for record in records {
        match indexed.entry(key_of(&record)) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(slot) => {
                tracing::warn!(kind, key = %slot.key(), "ignoring duplicate stored record");
            }
        }
    }
    indexed
}


#[cfg(test)]
mod tests {
    use super::testing::{form, registry, FlakyStore};
    use super::*;
    use crate::models::Gender;
    use crate::store::MemoryStore;

    fn stored_student(id: &str, course: Option<&str>) -> Student {
        Student {
            id: id.to_string(),
            first_name: "ALAN".to_string(),
            middle_name: "MATHISON".to_string(),
            last_name: "TURING".to_string(),
            level: 4,
            gender: Gender::Male,
            course_code: course.map(str::to_string),
        }
    }

    #[test]
    fn open_loads_existing_records_in_order() {
        let store = MemoryStore::with_records(
            vec![
                stored_student("5555-5555", Some("CS101")),
                stored_student("1111-1111", None),
            ],
            vec![Course {
                code: "CS101".to_string(),
                name: "INTRO".to_string(),
            }],
        );
        let registry = Registry::open(store, Validator::default()).unwrap();

        let ids: Vec<_> = registry.students().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["5555-5555", "1111-1111"]);
        let sorted: Vec<_> = registry
            .students_sorted_by_id()
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(sorted, ["1111-1111", "5555-5555"]);
        assert_eq!(registry.students_in_course("cs101").len(), 1);
    }

    #[test]
    fn open_keeps_first_of_duplicate_keys() {
        let mut second = stored_student("1111-1111", None);
        second.first_name = "SECOND".to_string();
        let store = MemoryStore::with_records(vec![stored_student("1111-1111", None), second], vec![]);
        let registry = Registry::open(store, Validator::default()).unwrap();

        assert_eq!(registry.student_count(), 1);
        assert_eq!(registry.find_student("1111-1111").unwrap().first_name, "ALAN");
    }

    #[test]
    fn open_normalizes_stored_keys() {
        let mut lowercase = stored_student(" 1111-1111 ", Some("bscs"));
        lowercase.first_name = "GRACE".to_string();
        let store = MemoryStore::with_records(
            vec![lowercase, stored_student("2222-2222", Some(" "))],
            vec![Course {
                code: "bscs".to_string(),
                name: "COMPUTER SCIENCE".to_string(),
            }],
        );
        let mut registry = Registry::open(store, Validator::default()).unwrap();

        assert!(registry.find_course("BSCS").is_some());
        assert!(registry.find_course("bscs").is_some());
        assert_eq!(registry.find_student("1111-1111").unwrap().first_name, "GRACE");
        assert_eq!(registry.find_student("2222-2222").unwrap().course_code, None);
        assert_eq!(registry.students_in_course("BSCS").len(), 1);

        let err = registry.add_course("BSCS", "again").unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCourseCode { .. }));
        assert_eq!(registry.course_count(), 1);

        let change = registry
            .update_course("bscs", "BSIT", "information technology")
            .unwrap();
        assert_eq!(change.affected_students, 1);
        assert_eq!(
            registry
                .find_student("1111-1111")
                .unwrap()
                .course_code
                .as_deref(),
            Some("BSIT")
        );

        let change = registry.delete_course("bsit").unwrap();
        assert_eq!(change.affected_students, 1);
        assert_eq!(registry.find_student("1111-1111").unwrap().course_code, None);
        assert_eq!(registry.course_count(), 0);
    }

    #[test]
    fn open_keeps_first_of_keys_colliding_after_normalization() {
        let store = MemoryStore::with_records(
            vec![],
            vec![
                Course {
                    code: "bscs".to_string(),
                    name: "FIRST".to_string(),
                },
                Course {
                    code: "BSCS".to_string(),
                    name: "SECOND".to_string(),
                },
            ],
        );
        let registry = Registry::open(store, Validator::default()).unwrap();

        assert_eq!(registry.course_count(), 1);
        assert_eq!(registry.find_course("BSCS").unwrap().name, "FIRST");
    }

    #[test]
    fn lookups_normalize_keys() {
        let mut registry = registry();
        registry.add_course("cs101", "intro").unwrap();
        registry.add_student(&form("1234-5678", "CS101")).unwrap();

        assert!(registry.find_course("  cs101 ").is_some());
        assert!(registry.find_student(" 1234-5678").is_some());
        assert!(registry.find_student("9999-9999").is_none());
        assert!(registry.find_course("MATH1").is_none());
    }

    #[test]
    fn every_mutation_rewrites_both_collections() {
        let mut registry = registry();
        registry.add_course("CS101", "intro").unwrap();
        assert_eq!(registry.store().save_count(), 2);

        registry.add_student(&form("1234-5678", "CS101")).unwrap();
        assert_eq!(registry.store().save_count(), 4);
        assert_eq!(registry.store().load_students().unwrap().len(), 1);
        assert_eq!(registry.store().load_courses().unwrap().len(), 1);
    }

    #[test]
    fn store_failure_keeps_memory_change_and_registry_usable() {
        let mut registry = Registry::open(FlakyStore::default(), Validator::default()).unwrap();
        registry.add_course("CS101", "intro").unwrap();

        registry.store.fail = true;
        let err = registry.add_student(&form("1234-5678", "CS101")).unwrap_err();
        assert!(err.is_store_error());
        assert!(registry.find_student("1234-5678").is_some());
        assert!(registry.store().inner.load_students().unwrap().is_empty());

        registry.store.fail = false;
        registry.add_student(&form("2222-2222", "")).unwrap();
        assert_eq!(registry.store().inner.load_students().unwrap().len(), 2);
    }
}
