//! Weekly grid layout.
//!
//! The grid has one row per [`Day`] and one column per half hour from 9:00 to
//! 20:30. A booking occupies a run of columns: its first column is a
//! [`CellView::SpanStart`] carrying the run length and the columns after it
//! are [`CellView::Continuation`] cells that render nothing.
//!
//! Rows are laid out left to right. At each free column the first entry in
//! store order that covers the column claims it through to the entry's end.
//! An entry that started underneath an earlier claim shows only its remaining
//! tail and is marked `clipped`. Every row therefore adds up to exactly
//! [`HalfHour::SLOT_COUNT`] columns.

use serde::Serialize;

use crate::{Day, HalfHour, ScheduleEntry, store::ScheduleStore};

/// What to draw at one axis point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView<'a> {
    Empty,
    SpanStart {
        entry: &'a ScheduleEntry,
        /// Columns covered, this one included
        span: usize,
        /// The entry began under another booking's run
        clipped: bool,
    },
    Continuation,
}

impl<'a> CellView<'a> {
    pub const fn entry(&self) -> Option<&'a ScheduleEntry> {
        match *self {
            Self::SpanStart { entry, .. } => Some(entry),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<String> {
        self.entry().map(ScheduleEntry::label)
    }

    pub fn color(&self) -> Option<&'static str> {
        self.entry().map(|e| e.day.color())
    }
}

/// Resolve a single axis point.
///
/// Hours off the axis are always [`CellView::Empty`].
pub fn cell_at(store: &ScheduleStore, day: Day, hour: HalfHour) -> CellView<'_> {
    match hour.slot() {
        Some(slot) => layout_row(store, day)[slot],
        None => CellView::Empty,
    }
}

fn layout_row(store: &ScheduleStore, day: Day) -> Vec<CellView<'_>> {
    let mut cells = vec![CellView::Empty; HalfHour::SLOT_COUNT];
    let mut slot = 0;

    while slot < HalfHour::SLOT_COUNT {
        let hour = HalfHour::from_slot(slot);
        let Some(entry) = store.entry_at(day, hour) else {
            slot += 1;
            continue;
        };

        // entry covers `hour`, so its end lies past this column
        let end_slot = entry.end_hour.slot().unwrap_or(HalfHour::SLOT_COUNT);
        cells[slot] = CellView::SpanStart {
            entry,
            span: end_slot - slot,
            clipped: entry.start_hour != hour,
        };
        for cell in &mut cells[slot + 1..end_slot] {
            *cell = CellView::Continuation;
        }
        slot = end_slot;
    }

    cells
}

/// A booked run as it appears in a rendered row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking<'a> {
    #[serde(flatten)]
    pub entry: &'a ScheduleEntry,
    pub label: String,
    pub color: &'static str,
    pub clipped: bool,
}

/// A drawn cell: an empty half hour or a booked run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedCell<'a> {
    pub hour: HalfHour,
    pub span: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking<'a>>,
}

/// One day of the rendered grid, continuation cells removed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow<'a> {
    pub day: Day,
    pub label: &'static str,
    pub cells: Vec<RenderedCell<'a>>,
}

/// The resolved 7 × 24 grid for one store snapshot
#[derive(Debug, Clone)]
pub struct GridView<'a> {
    rows: Vec<Vec<CellView<'a>>>,
}

impl<'a> GridView<'a> {
    pub fn build(store: &'a ScheduleStore) -> Self {
        let rows = Day::ALL.iter().map(|&day| layout_row(store, day)).collect();
        Self { rows }
    }

    pub fn cell(&self, day: Day, hour: HalfHour) -> CellView<'a> {
        hour.slot()
            .map_or(CellView::Empty, |slot| self.rows[day.index()][slot])
    }

    /// Column headers: one per whole hour, each spanning two half-hour columns
    pub fn header() -> impl Iterator<Item = HalfHour> {
        HalfHour::axis().step_by(2)
    }

    /// Drawable cells of one day
    pub fn row(&self, day: Day) -> GridRow<'a> {
        let cells = self.rows[day.index()]
            .iter()
            .enumerate()
            .filter_map(|(slot, cell)| {
                let hour = HalfHour::from_slot(slot);
                match *cell {
                    CellView::Empty => Some(RenderedCell {
                        hour,
                        span: 1,
                        booking: None,
                    }),
                    CellView::SpanStart {
                        entry,
                        span,
                        clipped,
                    } => Some(RenderedCell {
                        hour,
                        span,
                        booking: Some(Booking {
                            entry,
                            label: entry.label(),
                            color: entry.day.color(),
                            clipped,
                        }),
                    }),
                    CellView::Continuation => None,
                }
            })
            .collect();

        GridRow {
            day,
            label: day.label(),
            cells,
        }
    }

    pub fn rows(&self) -> Vec<GridRow<'a>> {
        Day::ALL.iter().map(|&day| self.row(day)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(hours: f64) -> HalfHour {
        HalfHour::from_hours(hours).unwrap()
    }

    fn entry(day: Day, start: f64, end: f64, code: &str) -> ScheduleEntry {
        ScheduleEntry::new(day, h(start), h(end), code, format!("{code} name"))
    }

    fn store_of(entries: impl IntoIterator<Item = ScheduleEntry>) -> ScheduleStore {
        entries.into_iter().collect()
    }

    #[test]
    fn ninety_minute_booking_spans_three_columns() {
        let store = store_of([entry(Day::Mon, 9.0, 10.5, "CS101")]);

        match cell_at(&store, Day::Mon, h(9.0)) {
            CellView::SpanStart {
                entry,
                span,
                clipped,
            } => {
                assert_eq!(entry.course_code, "CS101");
                assert_eq!(span, 3);
                assert!(!clipped);
            }
            other => panic!("expected span start, got {other:?}"),
        }
        assert_eq!(cell_at(&store, Day::Mon, h(9.5)), CellView::Continuation);
        assert_eq!(cell_at(&store, Day::Mon, h(10.0)), CellView::Continuation);
        assert_eq!(cell_at(&store, Day::Mon, h(10.5)), CellView::Empty);
        assert_eq!(cell_at(&store, Day::Tue, h(9.0)), CellView::Empty);
    }

    #[test]
    fn span_start_carries_label_and_day_color() {
        let store = store_of([entry(Day::Fri, 13.0, 14.0, "MA101")]);
        let cell = cell_at(&store, Day::Fri, h(13.0));
        assert_eq!(cell.label().as_deref(), Some("MA101\nMA101 name"));
        assert_eq!(cell.color(), Some("#93c5fd"));
        assert_eq!(CellView::Empty.label(), None);
    }

    #[test]
    fn off_axis_points_are_empty() {
        let store = store_of([entry(Day::Mon, 8.0, 22.0, "ALLDAY")]);
        assert_eq!(cell_at(&store, Day::Mon, h(8.5)), CellView::Empty);
        assert_eq!(cell_at(&store, Day::Mon, h(21.0)), CellView::Empty);
    }

    #[test]
    fn runs_past_the_axis_are_cut_at_the_last_column() {
        let store = store_of([entry(Day::Sun, 19.5, 22.0, "LATE")]);
        match cell_at(&store, Day::Sun, h(19.5)) {
            CellView::SpanStart { span, .. } => assert_eq!(span, 3),
            other => panic!("unexpected {other:?}"),
        }

        let early = store_of([entry(Day::Sun, 8.0, 10.0, "EARLY")]);
        match cell_at(&early, Day::Sun, h(9.0)) {
            CellView::SpanStart { span, clipped, .. } => {
                assert_eq!(span, 2);
                assert!(clipped);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn adjacent_bookings_do_not_interfere() {
        let store = store_of([
            entry(Day::Wed, 9.0, 10.0, "A"),
            entry(Day::Wed, 10.0, 11.0, "B"),
        ]);
        let grid = GridView::build(&store);
        let row = grid.row(Day::Wed);

        let booked: Vec<(&str, usize)> = row
            .cells
            .iter()
            .filter_map(|c| c.booking.as_ref().map(|b| (b.entry.course_code.as_str(), c.span)))
            .collect();
        assert_eq!(booked, [("A", 2), ("B", 2)]);
    }

    #[test]
    fn overlap_goes_to_first_claim_and_tail_is_clipped() {
        let store = store_of([
            entry(Day::Tue, 9.0, 10.0, "A"),
            entry(Day::Tue, 9.5, 11.0, "B"),
        ]);

        let grid = GridView::build(&store);
        assert_eq!(grid.cell(Day::Tue, h(9.5)), CellView::Continuation);
        match grid.cell(Day::Tue, h(10.0)) {
            CellView::SpanStart {
                entry,
                span,
                clipped,
            } => {
                assert_eq!(entry.course_code, "B");
                assert_eq!(span, 2);
                assert!(clipped);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn every_row_covers_the_whole_axis() {
        let store = store_of([
            entry(Day::Mon, 9.0, 12.0, "A"),
            entry(Day::Mon, 10.0, 14.0, "B"),
            entry(Day::Mon, 11.5, 12.5, "C"),
            entry(Day::Mon, 13.0, 13.5, "D"),
            entry(Day::Mon, 20.0, 23.0, "E"),
            entry(Day::Thu, 15.0, 16.0, "F"),
        ]);
        let grid = GridView::build(&store);

        for row in grid.rows() {
            let width: usize = row.cells.iter().map(|c| c.span).sum();
            assert_eq!(width, HalfHour::SLOT_COUNT, "row {}", row.day);
        }
    }

    #[test]
    fn header_has_one_label_per_hour() {
        let labels: Vec<String> = GridView::header().map(|h| h.to_string()).collect();
        assert_eq!(labels.len(), 12);
        assert_eq!(labels.first().map(String::as_str), Some("9:00"));
        assert_eq!(labels.last().map(String::as_str), Some("20:00"));
    }

    #[test]
    fn rendered_rows_serialize_bookings_inline() {
        let store = store_of([entry(Day::Mon, 9.0, 10.5, "CS101")]);
        let grid = GridView::build(&store);
        let json = serde_json::to_value(grid.row(Day::Mon)).unwrap();

        assert_eq!(json["day"], "MON");
        assert_eq!(json["label"], "M");
        assert_eq!(json["cells"][0]["span"], 3);
        assert_eq!(json["cells"][0]["booking"]["courseCode"], "CS101");
        assert_eq!(json["cells"][0]["booking"]["color"], "#fde047");
        assert_eq!(json["cells"][1]["hour"], 10.5);
        assert!(json["cells"][1].get("booking").is_none());
        assert_eq!(json["cells"].as_array().unwrap().len(), 22);
    }
}
