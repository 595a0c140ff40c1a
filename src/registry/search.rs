use crate::models::{Course, Student};
use crate::store::RecordStore;

use super::Registry;

/// Result ordering for student searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOrder {
    /// Collection (insertion) order.
    #[default]
    Insertion,
    /// Ascending by student identifier.
    ById,
}

/// Which collection a search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Students(SearchOrder),
    Courses,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchHits<'a> {
    Students(Vec<&'a Student>),
    Courses(Vec<&'a Course>),
}

impl SearchHits<'_> {
    pub fn len(&self) -> usize {
        match self {
            SearchHits::Students(hits) => hits.len(),
            SearchHits::Courses(hits) => hits.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: RecordStore> Registry<S> {
    /// Case-insensitive substring search over every field of every record in
    /// `scope`. A blank query matches everything.
    pub fn search(&self, query: &str, scope: SearchScope) -> SearchHits<'_> {
        match scope {
            SearchScope::Students(order) => SearchHits::Students(self.search_students(query, order)),
            SearchScope::Courses => SearchHits::Courses(self.search_courses(query)),
        }
    }

    /// Student half of [`Registry::search`], optionally sorted by identifier.
    pub fn search_students(&self, query: &str, order: SearchOrder) -> Vec<&Student> {
        let needle = query.trim().to_lowercase();
        let mut hits: Vec<&Student> = self
            .students
            .values()
            .filter(|student| {
                student
                    .search_fields()
                    .iter()
                    .any(|field| contains_folded(field, &needle))
            })
            .collect();
        if order == SearchOrder::ById {
            hits.sort_by(|a, b| a.id.cmp(&b.id));
        }
        hits
    }

    /// Course half of [`Registry::search`], in insertion order.
    pub fn search_courses(&self, query: &str) -> Vec<&Course> {
        let needle = query.trim().to_lowercase();
        self.courses
            .values()
            .filter(|course| {
                course
                    .search_fields()
                    .iter()
                    .any(|field| contains_folded(field, &needle))
            })
            .collect()
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}
