use std::{fmt, str::FromStr};

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Weekday on the planner grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    /// Grid row order
    pub const ALL: [Self; 7] = [
        Self::Mon,
        Self::Tue,
        Self::Wed,
        Self::Thu,
        Self::Fri,
        Self::Sat,
        Self::Sun,
    ];

    /// Internal day code (`MON`, `TUE`, ...)
    pub const fn code(self) -> &'static str {
        match self {
            Self::Mon => "MON",
            Self::Tue => "TUE",
            Self::Wed => "WED",
            Self::Thu => "THU",
            Self::Fri => "FRI",
            Self::Sat => "SAT",
            Self::Sun => "SUN",
        }
    }

    /// Day code used by the course catalog, also the row label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mon => "M",
            Self::Tue => "Tu",
            Self::Wed => "W",
            Self::Thu => "Th",
            Self::Fri => "F",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }

    /// Background color of cells booked on this day
    pub const fn color(self) -> &'static str {
        match self {
            Self::Mon => "#fde047",
            Self::Tue => "#f9a8d4",
            Self::Wed => "#86efac",
            Self::Thu => "#fdba74",
            Self::Fri => "#93c5fd",
            Self::Sat => "#d8b4fe",
            Self::Sun => "#fca5a5",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn weekday(self) -> Weekday {
        match self {
            Self::Mon => Weekday::Mon,
            Self::Tue => Weekday::Tue,
            Self::Wed => Weekday::Wed,
            Self::Thu => Weekday::Thu,
            Self::Fri => Weekday::Fri,
            Self::Sat => Weekday::Sat,
            Self::Sun => Weekday::Sun,
        }
    }

    /// Map a catalog day code to a grid day.
    ///
    /// Accepts the catalog codes (`M`, `Tu`, `W`, `Th`, `F`, `Sat`, `Sun`)
    /// and passes internal codes through unchanged.
    pub fn from_catalog_code(code: &str) -> Result<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.label() == code || day.code() == code)
            .ok_or_else(|| Error::UnknownDay(code.to_string()))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Day {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|day| day.code() == upper)
            .map_or_else(|| Self::from_catalog_code(s), Ok)
    }
}

/// Time of day at half-hour granularity, counted in half hours since midnight.
///
/// On the wire it is a plain number of hours (`9`, `9.5`, `20.5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalfHour(u16);

impl HalfHour {
    /// First slot on the grid axis (9:00)
    pub const AXIS_START: Self = Self(18);
    /// Number of half-hour columns on the grid axis (9:00 to 20:30)
    pub const SLOT_COUNT: usize = 24;

    pub const fn from_half_hours(half_hours: u16) -> Self {
        Self(half_hours)
    }

    /// Build from a whole hour plus an optional half
    pub const fn from_hm(hour: u16, half: bool) -> Self {
        Self(hour * 2 + half as u16)
    }

    /// Convert a number of hours; only whole and half hours within a day are accepted
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_hours(hours: f64) -> Option<Self> {
        let doubled = hours * 2.0;
        if !doubled.is_finite() || doubled.fract() != 0.0 || !(0.0..=48.0).contains(&doubled) {
            return None;
        }
        Some(Self(doubled as u16))
    }

    pub fn hours(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    pub const fn half_hours(self) -> u16 {
        self.0
    }

    pub const fn hour(self) -> u16 {
        self.0 / 2
    }

    pub const fn minute(self) -> u16 {
        if self.0 % 2 == 1 { 30 } else { 0 }
    }

    /// Column index on the grid axis, `None` when off the axis
    pub const fn slot(self) -> Option<usize> {
        let start = Self::AXIS_START.0;
        if self.0 < start {
            return None;
        }
        let idx = (self.0 - start) as usize;
        if idx < Self::SLOT_COUNT { Some(idx) } else { None }
    }

    /// Time at the given axis column
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_slot(slot: usize) -> Self {
        Self(Self::AXIS_START.0 + slot as u16)
    }

    /// All axis times, 9:00 through 20:30
    pub fn axis() -> impl Iterator<Item = Self> {
        (0..Self::SLOT_COUNT).map(Self::from_slot)
    }

    /// Half-hour steps from `self` up to `end`; zero when `end` is not later
    pub const fn steps_until(self, end: Self) -> u16 {
        end.0.saturating_sub(self.0)
    }
}

impl fmt::Display for HalfHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for HalfHour {
    type Err = Error;

    /// Accepts `9`, `9.5` or a clock time `09:30`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.contains(':') {
            return crate::time::parse_clock(s);
        }
        s.parse::<f64>()
            .ok()
            .and_then(Self::from_hours)
            .ok_or_else(|| Error::InvalidTime(s.to_string()))
    }
}

impl Serialize for HalfHour {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.0 % 2 == 0 {
            serializer.serialize_u16(self.hour())
        } else {
            serializer.serialize_f64(self.hours())
        }
    }
}

impl<'de> Deserialize<'de> for HalfHour {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hours = f64::deserialize(deserializer)?;
        Self::from_hours(hours).ok_or_else(|| {
            serde::de::Error::custom(format!("{hours} is not a whole or half hour"))
        })
    }
}

/// One course section as published in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub course_code: String,
    pub course_name: String,
    pub credits: String,
    pub foundation: String,
    pub group: String,
    /// Catalog day code (`M`, `Tu`, ...)
    pub day: String,
    /// `HH:MM-HH:MM`
    pub time: String,
    pub instructor: String,
    pub faculty: String,
}

/// A booking placed on the weekly grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub day: Day,
    pub start_hour: HalfHour,
    pub end_hour: HalfHour,
    pub course_code: String,
    pub course_name: String,
}

impl ScheduleEntry {
    pub fn new(
        day: Day,
        start_hour: HalfHour,
        end_hour: HalfHour,
        course_code: impl Into<String>,
        course_name: impl Into<String>,
    ) -> Self {
        Self {
            day,
            start_hour,
            end_hour,
            course_code: course_code.into(),
            course_name: course_name.into(),
        }
    }

    /// Whether `[start_hour, end_hour)` on `day` contains `hour`
    pub fn contains(&self, day: Day, hour: HalfHour) -> bool {
        self.day == day && self.start_hour <= hour && hour < self.end_hour
    }

    /// Whether both entries share a day and their intervals intersect
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day
            && self.start_hour < other.end_hour
            && other.start_hour < self.end_hour
    }

    /// Number of half-hour columns the entry covers
    pub const fn span(&self) -> u16 {
        self.start_hour.steps_until(self.end_hour)
    }

    /// Cell text: code and name on separate lines
    pub fn label(&self) -> String {
        format!("{}\n{}", self.course_code, self.course_name)
    }
}
