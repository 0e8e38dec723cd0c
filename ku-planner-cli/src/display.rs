use std::fmt::Write;

use ku_planner_core::prelude::*;

/// Characters per half-hour column
const COLUMN_WIDTH: usize = 4;

/// Plain-text weekly grid, one line per day
pub fn render_grid(grid: &GridView<'_>) -> String {
    let mut out = String::new();

    let _ = write!(out, "{:<4}", "");
    for hour in GridView::header() {
        let _ = write!(out, "|{:<width$}", hour.to_string(), width = COLUMN_WIDTH * 2 - 1);
    }
    out.push_str("|\n");

    for row in grid.rows() {
        let _ = write!(out, "{:<4}", row.label);
        for cell in &row.cells {
            let width = cell.span * COLUMN_WIDTH - 1;
            let text = cell.booking.as_ref().map_or("", |b| b.entry.course_code.as_str());
            let marker = if cell.booking.as_ref().is_some_and(|b| b.clipped) {
                '~'
            } else {
                '|'
            };
            let _ = write!(out, "{marker}{:<width$}", truncate(text, width));
        }
        out.push_str("|\n");
    }

    out
}

/// One catalog course per line
pub fn course_line(course: &CourseRecord) -> String {
    format!(
        "{:<10} {:<40} {:<4} {:<12} {}",
        course.course_code,
        truncate(&course.course_name, 40),
        course.day,
        course.time,
        course.faculty
    )
}

pub fn pending_line(pending: &PendingEntry) -> String {
    format!(
        "pending: {} {}-{} [{}] {}",
        pending.day, pending.start_hour, pending.end_hour, pending.course_code, pending.course_name
    )
}

fn truncate(text: &str, width: usize) -> &str {
    text.char_indices()
        .nth(width)
        .map_or(text, |(idx, _)| &text[..idx])
}
