use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::{Error, HalfHour, Result, ScheduleEntry, store::ScheduleStore};

use super::Exporter;

/// ICS generation options
#[derive(Debug, Clone)]
pub struct IcsOptions {
    pub calendar_name: Option<String>,
    pub timezone: Option<String>,
    /// Monday of the first week the schedule repeats in
    pub week_start: NaiveDate,
    /// Number of weekly repeats; unbounded when `None`
    pub weeks: Option<u32>,
    pub reminder_minutes: Option<u32>,
}

impl Default for IcsOptions {
    fn default() -> Self {
        Self {
            calendar_name: Some("Class Schedule".to_string()),
            timezone: Some("Asia/Bangkok".to_string()),
            week_start: monday_of(Local::now().date_naive()),
            weeks: Some(16),
            reminder_minutes: Some(15),
        }
    }
}

/// Monday of the week containing `date`
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Weekly recurring calendar events, one per schedule entry
#[derive(Debug, Clone, Default)]
pub struct IcsExporter {
    options: IcsOptions,
}

impl IcsExporter {
    pub fn new(mut options: IcsOptions) -> Self {
        options.week_start = monday_of(options.week_start);
        Self { options }
    }

    /// Generate the calendar document
    pub fn generate(&self, store: &ScheduleStore) -> Result<String> {
        if self.options.weeks == Some(0) {
            return Err(Error::Config(
                "A calendar must repeat for at least one week".to_string(),
            ));
        }

        let mut ics_content = String::new();

        ics_content.push_str("BEGIN:VCALENDAR\r\n");
        ics_content.push_str("VERSION:2.0\r\n");
        ics_content.push_str("PRODID:-//KU Planner//Class Schedule//EN\r\n");
        ics_content.push_str("CALSCALE:GREGORIAN\r\n");
        ics_content.push_str("METHOD:PUBLISH\r\n");

        if let Some(ref name) = self.options.calendar_name {
            ics_content.push_str(&format!("X-WR-CALNAME:{}\r\n", escape_text(name)));
        }

        if let Some(ref timezone) = self.options.timezone {
            ics_content.push_str(&format!("X-WR-TIMEZONE:{timezone}\r\n"));
        }

        for entry in store {
            self.add_entry_event(&mut ics_content, entry)?;
        }

        ics_content.push_str("END:VCALENDAR\r\n");

        Ok(ics_content)
    }

    fn occurrence(&self, entry: &ScheduleEntry, hour: HalfHour) -> Result<NaiveDateTime> {
        let date = self
            .options
            .week_start
            .checked_add_signed(Duration::days(entry.day.index() as i64))
            .ok_or_else(|| Error::Export(format!("date out of range for {}", entry.day)))?;
        Ok(date.and_time(NaiveTime::default()) + Duration::minutes(i64::from(hour.half_hours()) * 30))
    }

    fn add_entry_event(&self, ics_content: &mut String, entry: &ScheduleEntry) -> Result<()> {
        let uid = Uuid::new_v4();
        let dtstamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let dtstart = self.occurrence(entry, entry.start_hour)?.format("%Y%m%dT%H%M%S");
        let dtend = self.occurrence(entry, entry.end_hour)?.format("%Y%m%dT%H%M%S");

        ics_content.push_str("BEGIN:VEVENT\r\n");
        ics_content.push_str(&format!("UID:{uid}\r\n"));
        ics_content.push_str(&format!("DTSTAMP:{dtstamp}\r\n"));
        ics_content.push_str(&format!("DTSTART:{dtstart}\r\n"));
        ics_content.push_str(&format!("DTEND:{dtend}\r\n"));
        ics_content.push_str(&format!(
            "SUMMARY:{}\r\n",
            escape_text(&format!("{} {}", entry.course_code, entry.course_name))
        ));

        let mut rrule = format!("RRULE:FREQ=WEEKLY;BYDAY={}", byday(entry));
        if let Some(weeks) = self.options.weeks {
            rrule.push_str(&format!(";COUNT={weeks}"));
        }
        ics_content.push_str(&format!("{rrule}\r\n"));

        if let Some(reminder_minutes) = self.options.reminder_minutes {
            ics_content.push_str("BEGIN:VALARM\r\n");
            ics_content.push_str("ACTION:DISPLAY\r\n");
            ics_content.push_str(&format!(
                "DESCRIPTION:{}\r\n",
                escape_text(&entry.course_code)
            ));
            ics_content.push_str(&format!("TRIGGER:-PT{reminder_minutes}M\r\n"));
            ics_content.push_str("END:VALARM\r\n");
        }

        ics_content.push_str("END:VEVENT\r\n");

        Ok(())
    }
}

fn byday(entry: &ScheduleEntry) -> &'static str {
    &entry.day.code()[..2]
}

/// Escape ICS text values
fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

impl Exporter for IcsExporter {
    fn file_name(&self) -> &str {
        "schedule.ics"
    }

    fn content_type(&self) -> &'static str {
        "text/calendar; charset=utf-8"
    }

    fn render(&self, store: &ScheduleStore) -> Result<Vec<u8>> {
        self.generate(store).map(String::into_bytes)
    }
}
