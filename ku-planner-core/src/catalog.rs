pub mod source;

use std::{path::Path, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{CourseRecord, Error, Result};

pub use source::*;

/// Exact-match query over catalog fields; every given field must match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFilter {
    pub faculty: Option<String>,
    pub course_code: Option<String>,
}

impl CourseFilter {
    pub fn faculty(faculty: impl Into<String>) -> Self {
        Self {
            faculty: Some(faculty.into()),
            ..Self::default()
        }
    }

    pub fn course_code(course_code: impl Into<String>) -> Self {
        Self {
            course_code: Some(course_code.into()),
            ..Self::default()
        }
    }

    /// Empty strings count as absent, so `?faculty=` behaves like no filter
    pub fn matches(&self, course: &CourseRecord) -> bool {
        fn field_ok(wanted: Option<&String>, actual: &str) -> bool {
            wanted.is_none_or(|w| w.is_empty() || w == actual)
        }

        field_ok(self.faculty.as_ref(), &course.faculty)
            && field_ok(self.course_code.as_ref(), &course.course_code)
    }
}

/// The full list of offered course sections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    courses: Vec<CourseRecord>,
}

impl Catalog {
    pub const fn new(courses: Vec<CourseRecord>) -> Self {
        Self { courses }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            Error::DataSourceUnavailable(format!("{}: {}", path.display(), e))
        })?;
        Self::from_slice(&bytes)
    }

    /// Records matching the filter, in catalog order
    pub fn list_courses(&self, filter: &CourseFilter) -> Vec<CourseRecord> {
        self.courses
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search on course code or name
    pub fn search(&self, term: &str) -> Vec<CourseRecord> {
        let needle = term.to_lowercase();
        self.courses
            .iter()
            .filter(|c| {
                c.course_code.to_lowercase().contains(&needle)
                    || c.course_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub fn find(&self, course_code: &str) -> Option<&CourseRecord> {
        self.courses.iter().find(|c| c.course_code == course_code)
    }

    pub fn courses(&self) -> &[CourseRecord] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

/// Catalog availability for a planner session
#[derive(Debug, Clone, Default)]
pub enum CatalogState {
    #[default]
    Loading,
    Ready(Arc<Catalog>),
}

impl CatalogState {
    pub fn ready(&self) -> Option<&Catalog> {
        match self {
            Self::Loading => None,
            Self::Ready(catalog) => Some(catalog.as_ref()),
        }
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}
