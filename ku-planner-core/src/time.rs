//! Catalog time strings.
//!
//! Catalog records carry their meeting time as `HH:MM-HH:MM`. Only whole and
//! half hours exist on the grid: a minute field of exactly `30` adds half an
//! hour and any other minute value is dropped.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, HalfHour, Result};

static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid clock regex"));

/// Parse `HH:MM` into a half-hour time
pub fn parse_clock(clock: &str) -> Result<HalfHour> {
    let clock = clock.trim();
    let caps = CLOCK_RE
        .captures(clock)
        .ok_or_else(|| Error::InvalidTime(clock.to_string()))?;

    let hour: u16 = caps[1]
        .parse()
        .map_err(|_| Error::InvalidTime(clock.to_string()))?;
    if hour > 24 {
        return Err(Error::InvalidTime(clock.to_string()));
    }

    Ok(HalfHour::from_hm(hour, &caps[2] == "30"))
}

/// Parse `HH:MM-HH:MM` into start and end times
pub fn parse_time_range(range: &str) -> Result<(HalfHour, HalfHour)> {
    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| Error::InvalidTime(range.trim().to_string()))?;
    Ok((parse_clock(start)?, parse_clock(end)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_past_adds_half_an_hour() {
        assert_eq!(parse_clock("09:30").unwrap(), HalfHour::from_hm(9, true));
        assert_eq!(parse_clock("13:00").unwrap(), HalfHour::from_hm(13, false));
        assert_eq!(parse_clock("8:30").unwrap(), HalfHour::from_hm(8, true));
    }

    #[test]
    fn other_minutes_are_dropped() {
        assert_eq!(parse_clock("10:15").unwrap(), HalfHour::from_hm(10, false));
        assert_eq!(parse_clock("10:45").unwrap(), HalfHour::from_hm(10, false));
    }

    #[test]
    fn range_splits_on_dash() {
        let (start, end) = parse_time_range("09:00-10:30").unwrap();
        assert_eq!(start.hours(), 9.0);
        assert_eq!(end.hours(), 10.5);

        let (start, end) = parse_time_range(" 13:30 - 16:30 ").unwrap();
        assert_eq!(start.hours(), 13.5);
        assert_eq!(end.hours(), 16.5);
    }

    #[test]
    fn garbage_is_rejected() {
        for bad in ["", "0900-1030", "ab:cd-10:00", "09:00", "25:00-26:00", "9-10"] {
            assert!(
                matches!(parse_time_range(bad), Err(Error::InvalidTime(_))),
                "{bad:?} should not parse"
            );
        }
    }
}
