//! Planner session state and the intents that change it.
//!
//! [`PlannerState`] is an immutable snapshot. [`PlannerState::update`] returns
//! the next snapshot, or an error while leaving the current one untouched, so
//! a presentation layer can keep showing the last good state after a rejected
//! action.

use std::sync::Arc;

use crate::{
    CourseRecord, Day, Error, HalfHour, Result, ScheduleEntry,
    catalog::{Catalog, CatalogState},
    grid::GridView,
    store::ScheduleStore,
    time::parse_time_range,
};

/// The fields of the entry being composed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub day: Day,
    pub start_hour: HalfHour,
    pub end_hour: HalfHour,
    pub course_code: String,
    pub course_name: String,
}

impl Default for PendingEntry {
    fn default() -> Self {
        Self {
            day: Day::Mon,
            start_hour: HalfHour::from_hm(9, false),
            end_hour: HalfHour::from_hm(9, true),
            course_code: String::new(),
            course_name: String::new(),
        }
    }
}

impl PendingEntry {
    pub fn to_entry(&self) -> ScheduleEntry {
        ScheduleEntry::new(
            self.day,
            self.start_hour,
            self.end_hour,
            self.course_code.clone(),
            self.course_name.clone(),
        )
    }

    /// Pending fields for a catalog course: mapped day and parsed meeting time
    pub fn from_course(course: &CourseRecord) -> Result<Self> {
        let day = Day::from_catalog_code(&course.day)?;
        let (start_hour, end_hour) = parse_time_range(&course.time)?;
        Ok(Self {
            day,
            start_hour,
            end_hour,
            course_code: course.course_code.clone(),
            course_name: course.course_name.clone(),
        })
    }
}

/// A user action
#[derive(Debug, Clone)]
pub enum Intent {
    CatalogLoaded(Catalog),
    CatalogFailed(String),
    Search(String),
    /// Pick a course from the catalog by code
    Select(String),
    SetDay(Day),
    SetStart(HalfHour),
    SetEnd(HalfHour),
    SetCourseCode(String),
    SetCourseName(String),
    Add,
    Delete { day: Day, hour: HalfHour },
    Clear,
}

impl Intent {
    /// Turn the outcome of a catalog load into the matching intent
    pub fn from_load(result: Result<Catalog>) -> Self {
        match result {
            Ok(catalog) => Self::CatalogLoaded(catalog),
            Err(e) => Self::CatalogFailed(e.to_string()),
        }
    }
}

/// Everything a planner session shows
#[derive(Debug, Clone, Default)]
pub struct PlannerState {
    catalog: CatalogState,
    store: ScheduleStore,
    pending: PendingEntry,
    search_term: String,
    suggestions: Vec<CourseRecord>,
    dropdown_open: bool,
}

impl PlannerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an intent, producing the next snapshot
    pub fn update(&self, intent: Intent) -> Result<Self> {
        let mut next = self.clone();
        next.apply(intent)?;
        Ok(next)
    }

    fn apply(&mut self, intent: Intent) -> Result<()> {
        match intent {
            Intent::CatalogLoaded(catalog) => {
                tracing::info!("Catalog ready with {} courses", catalog.len());
                self.catalog = CatalogState::Ready(Arc::new(catalog));
                self.refresh_suggestions();
            }
            Intent::CatalogFailed(message) => {
                tracing::error!("Catalog load failed: {}", message);
            }
            Intent::Search(term) => {
                self.search_term = term;
                self.dropdown_open = true;
                self.refresh_suggestions();
            }
            Intent::Select(course_code) => self.select(&course_code)?,
            Intent::SetDay(day) => self.pending.day = day,
            Intent::SetStart(hour) => self.pending.start_hour = hour,
            Intent::SetEnd(hour) => self.pending.end_hour = hour,
            Intent::SetCourseCode(code) => self.pending.course_code = code,
            Intent::SetCourseName(name) => self.pending.course_name = name,
            Intent::Add => self.add()?,
            Intent::Delete { day, hour } => {
                let removed = self.store.remove_at(day, hour);
                tracing::debug!("Removed {} entries at {} {}", removed, day, hour);
            }
            Intent::Clear => {
                tracing::debug!("Clearing {} entries", self.store.len());
                self.store.clear();
            }
        }
        Ok(())
    }

    fn select(&mut self, course_code: &str) -> Result<()> {
        let catalog = self
            .catalog
            .ready()
            .ok_or_else(|| Error::Validation("The course catalog is still loading".to_string()))?;
        let course = catalog
            .find(course_code)
            .ok_or_else(|| Error::Validation(format!("Unknown course: {course_code}")))?;

        self.pending = PendingEntry::from_course(course)?;
        self.search_term.clear();
        self.dropdown_open = false;
        self.refresh_suggestions();
        Ok(())
    }

    fn add(&mut self) -> Result<()> {
        let entry = self.pending.to_entry();

        for existing in self.store.overlaps(&entry) {
            tracing::warn!(
                "{} on {} {}-{} overlaps {}",
                entry.course_code,
                entry.day,
                entry.start_hour,
                entry.end_hour,
                existing.course_code
            );
        }

        self.store.add(entry)?;
        self.pending.course_code.clear();
        self.pending.course_name.clear();
        self.search_term.clear();
        self.refresh_suggestions();
        Ok(())
    }

    fn refresh_suggestions(&mut self) {
        self.suggestions = self
            .catalog
            .ready()
            .map(|catalog| catalog.search(&self.search_term))
            .unwrap_or_default();
    }

    pub const fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    pub const fn store(&self) -> &ScheduleStore {
        &self.store
    }

    pub const fn pending(&self) -> &PendingEntry {
        &self.pending
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Suggestions to show under the search box.
    ///
    /// Empty unless the list is open, a term is typed and something matched.
    pub fn visible_suggestions(&self) -> &[CourseRecord] {
        if self.dropdown_open && !self.search_term.is_empty() {
            &self.suggestions
        } else {
            &[]
        }
    }

    /// The resolved grid, only once the catalog is ready
    pub fn grid(&self) -> Option<GridView<'_>> {
        self.catalog
            .is_ready()
            .then(|| GridView::build(&self.store))
    }
}
