use std::fmt::Write;

use crate::{Result, grid::GridView, store::ScheduleStore};

use super::Exporter;

/// Standalone HTML page with the weekly table.
///
/// This is the page a browser or headless rasterizer snapshots into
/// `schedule-table.png`.
#[derive(Debug, Clone)]
pub struct HtmlTableExporter {
    pub title: String,
}

impl Default for HtmlTableExporter {
    fn default() -> Self {
        Self {
            title: "Class Schedule".to_string(),
        }
    }
}

impl HtmlTableExporter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Only the `<table>` element
    pub fn render_table(&self, grid: &GridView<'_>) -> String {
        let mut out = String::new();
        out.push_str("<table id=\"schedule-table\">\n<thead>\n<tr><th>Day/Time</th>");
        for hour in GridView::header() {
            let _ = write!(out, "<th colspan=\"2\">{hour}</th>");
        }
        out.push_str("</tr>\n</thead>\n<tbody>\n");

        for row in grid.rows() {
            let _ = write!(out, "<tr><td class=\"day\">{}</td>", row.label);
            for cell in &row.cells {
                match &cell.booking {
                    Some(booking) => {
                        let _ = write!(
                            out,
                            "<td colspan=\"{}\" style=\"background:{}\"{}><pre>{}</pre></td>",
                            cell.span,
                            booking.color,
                            if booking.clipped { " class=\"clipped\"" } else { "" },
                            escape_html(&booking.label)
                        );
                    }
                    None => out.push_str("<td></td>"),
                }
            }
            out.push_str("</tr>\n");
        }

        out.push_str("</tbody>\n</table>\n");
        out
    }
}

impl Exporter for HtmlTableExporter {
    fn file_name(&self) -> &str {
        "schedule-table.html"
    }

    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }

    fn render(&self, store: &ScheduleStore) -> Result<Vec<u8>> {
        let grid = GridView::build(store);
        let title = escape_html(&self.title);

        let mut page = String::new();
        page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(page, "<title>{title}</title>");
        page.push_str(STYLE);
        page.push_str("</head>\n<body>\n");
        let _ = writeln!(page, "<h1>{title}</h1>");
        page.push_str(&self.render_table(&grid));
        page.push_str("</body>\n</html>\n");

        Ok(page.into_bytes())
    }
}

const STYLE: &str = "<style>
table { border-collapse: collapse; width: 100%; text-align: center; font-family: sans-serif; }
th, td { border: 1px solid #d1d5db; padding: 8px; }
thead th { background: #f3f4f6; }
pre { white-space: pre-wrap; margin: 0; font-size: 0.875rem; }
td.clipped { border-left: 2px dashed #6b7280; }
</style>
";

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
