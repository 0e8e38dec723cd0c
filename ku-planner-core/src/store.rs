use serde::{Deserialize, Serialize};

use crate::{Day, Error, HalfHour, Result, ScheduleEntry};

/// Message shown when an entry is rejected
pub const ADD_REJECTED_MESSAGE: &str =
    "Please fill all fields and ensure the start time is less than the end time!";

/// Bookings on the weekly grid, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleStore {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleStore {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check the constraints `add` enforces without touching the store
    pub fn validate(entry: &ScheduleEntry) -> Result<()> {
        if entry.start_hour < entry.end_hour
            && !entry.course_code.is_empty()
            && !entry.course_name.is_empty()
        {
            Ok(())
        } else {
            Err(Error::Validation(ADD_REJECTED_MESSAGE.to_string()))
        }
    }

    /// Append an entry; rejected entries leave the store untouched
    pub fn add(&mut self, entry: ScheduleEntry) -> Result<()> {
        Self::validate(&entry)?;
        self.entries.push(entry);
        Ok(())
    }

    /// Remove every entry on `day` whose interval contains `hour`.
    ///
    /// Returns how many entries were removed.
    pub fn remove_at(&mut self, day: Day, hour: HalfHour) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.contains(day, hour));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// First entry in store order covering the axis point
    pub fn entry_at(&self, day: Day, hour: HalfHour) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.contains(day, hour))
    }

    /// Stored entries that share time with `entry`
    pub fn overlaps<'a>(&'a self, entry: &'a ScheduleEntry) -> impl Iterator<Item = &'a ScheduleEntry> {
        self.entries.iter().filter(move |e| e.overlaps(entry))
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ScheduleEntry> for ScheduleStore {
    /// Collects entries, skipping any that `add` would reject
    fn from_iter<I: IntoIterator<Item = ScheduleEntry>>(iter: I) -> Self {
        let mut store = Self::new();
        for entry in iter {
            if let Err(e) = store.add(entry) {
                tracing::debug!("Skipping entry: {}", e);
            }
        }
        store
    }
}

impl<'a> IntoIterator for &'a ScheduleStore {
    type Item = &'a ScheduleEntry;
    type IntoIter = std::slice::Iter<'a, ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
