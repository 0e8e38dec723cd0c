pub mod html;
pub mod ics;

use std::path::{Path, PathBuf};

use crate::{Error, Result, store::ScheduleStore};

pub use html::HtmlTableExporter;
pub use ics::{IcsExporter, IcsOptions};

/// Turns a schedule into a downloadable artifact
pub trait Exporter {
    /// Default file name for the artifact
    fn file_name(&self) -> &str;

    fn content_type(&self) -> &'static str;

    fn render(&self, store: &ScheduleStore) -> Result<Vec<u8>>;
}

/// Render and write the artifact to `path`, or into `path` when it is a directory
pub fn write_export(
    exporter: &dyn Exporter,
    store: &ScheduleStore,
    path: impl AsRef<Path>,
) -> Result<PathBuf> {
    let path = path.as_ref();
    let target = if path.is_dir() {
        path.join(exporter.file_name())
    } else {
        path.to_path_buf()
    };

    let bytes = exporter.render(store)?;
    std::fs::write(&target, bytes)
        .map_err(|e| Error::Export(format!("{}: {}", target.display(), e)))?;

    tracing::info!("Exported schedule to {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Day, HalfHour, ScheduleEntry};

    fn one_entry() -> ScheduleStore {
        [ScheduleEntry::new(
            Day::Mon,
            HalfHour::from_hm(9, false),
            HalfHour::from_hm(10, true),
            "CS101",
            "Intro",
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn writes_default_file_name_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_export(&HtmlTableExporter::default(), &one_entry(), dir.path()).unwrap();

        assert_eq!(written, dir.path().join("schedule-table.html"));
        let html = std::fs::read_to_string(written).unwrap();
        assert!(html.contains("CS101"));
    }

    #[test]
    fn unwritable_target_is_an_export_error() {
        let err = write_export(
            &HtmlTableExporter::default(),
            &one_entry(),
            "/nonexistent-dir/schedule-table.html",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Export(_)));
    }
}
