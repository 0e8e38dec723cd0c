use std::path::PathBuf;

use anyhow::Result;
use ku_planner_core::{Error, prelude::*};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::display;

const HELP: &str = "\
commands:
  search <term>        filter the catalog by code or name
  select <code>        fill the pending entry from a catalog course
  day <day>            set the pending day (MON..SUN or M, Tu, W, Th, F, Sat, Sun)
  start <time>         set the pending start (9, 9.5 or 09:30)
  end <time>           set the pending end
  code <code>          set the pending course code
  name <name>          set the pending course name
  add                  add the pending entry to the schedule
  delete <day> <time>  remove every entry covering that half hour
  clear                remove all entries
  show                 print the grid and the pending entry
  export html|ics [path]
  help
  quit";

/// One parsed line of session input
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Apply(IntentCommand),
    Show,
    Export { format: ExportFormat, path: PathBuf },
    Help,
    Quit,
}

/// Session commands that map straight onto a planner intent
#[derive(Debug, Clone, PartialEq)]
pub enum IntentCommand {
    Search(String),
    Select(String),
    Day(Day),
    Start(HalfHour),
    End(HalfHour),
    Code(String),
    Name(String),
    Add,
    Delete(Day, HalfHour),
    Clear,
}

impl From<IntentCommand> for Intent {
    fn from(command: IntentCommand) -> Self {
        match command {
            IntentCommand::Search(term) => Self::Search(term),
            IntentCommand::Select(code) => Self::Select(code),
            IntentCommand::Day(day) => Self::SetDay(day),
            IntentCommand::Start(hour) => Self::SetStart(hour),
            IntentCommand::End(hour) => Self::SetEnd(hour),
            IntentCommand::Code(code) => Self::SetCourseCode(code),
            IntentCommand::Name(name) => Self::SetCourseName(name),
            IntentCommand::Add => Self::Add,
            IntentCommand::Delete(day, hour) => Self::Delete { day, hour },
            IntentCommand::Clear => Self::Clear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Ics,
}

impl SessionCommand {
    /// `None` for a blank line
    pub fn parse(line: &str) -> ku_planner_core::Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        let command = match word.to_ascii_lowercase().as_str() {
            "search" => Self::Apply(IntentCommand::Search(rest.to_string())),
            "select" => Self::Apply(IntentCommand::Select(required(rest, "select <code>")?)),
            "day" => Self::Apply(IntentCommand::Day(rest.parse()?)),
            "start" => Self::Apply(IntentCommand::Start(rest.parse()?)),
            "end" => Self::Apply(IntentCommand::End(rest.parse()?)),
            "code" => Self::Apply(IntentCommand::Code(rest.to_string())),
            "name" => Self::Apply(IntentCommand::Name(rest.to_string())),
            "add" => Self::Apply(IntentCommand::Add),
            "delete" => {
                let (day, hour) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| Error::Validation("usage: delete <day> <time>".to_string()))?;
                Self::Apply(IntentCommand::Delete(day.parse()?, hour.parse()?))
            }
            "clear" => Self::Apply(IntentCommand::Clear),
            "show" => Self::Show,
            "export" => {
                let (format, path) = rest
                    .split_once(char::is_whitespace)
                    .map_or((rest, ""), |(format, path)| (format, path.trim()));
                let format = match format.to_ascii_lowercase().as_str() {
                    "" | "html" => ExportFormat::Html,
                    "ics" => ExportFormat::Ics,
                    other => {
                        return Err(Error::Validation(format!(
                            "Unknown export format '{other}'"
                        )));
                    }
                };
                let path = if path.is_empty() { "." } else { path };
                Self::Export {
                    format,
                    path: PathBuf::from(path),
                }
            }
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => {
                return Err(Error::Validation(format!(
                    "Unknown command '{other}', type 'help'"
                )));
            }
        };

        Ok(Some(command))
    }
}

fn required(value: &str, usage: &str) -> ku_planner_core::Result<String> {
    if value.is_empty() {
        Err(Error::Validation(format!("usage: {usage}")))
    } else {
        Ok(value.to_string())
    }
}

/// Read commands from stdin until `quit` or end of input.
///
/// The catalog loads in the background; until it arrives the session works
/// with manual entries only.
pub async fn run(source: Box<dyn CatalogSource>) -> Result<()> {
    tracing::info!("Loading catalog from {}", source.describe());
    let mut loading = Some(tokio::spawn(async move { source.load().await }));

    let mut state = PlannerState::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("KU planner session, type 'help' for commands");

    loop {
        let line = match loading.as_mut() {
            Some(task) => tokio::select! {
                joined = task => {
                    loading = None;
                    let result = joined.unwrap_or_else(|e| Err(Error::Internal(e.to_string())));
                    state = step(&state, Intent::from_load(result));
                    if let Some(catalog) = state.catalog().ready() {
                        println!("catalog ready: {} courses", catalog.len());
                    }
                    continue;
                }
                line = lines.next_line() => line?,
            },
            None => lines.next_line().await?,
        };

        let Some(line) = line else {
            break;
        };

        let command = match SessionCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match command {
            SessionCommand::Apply(command) => {
                let searching = matches!(command, IntentCommand::Search(_));
                state = step(&state, command.into());
                if searching {
                    print_suggestions(&state);
                }
            }
            SessionCommand::Show => show(&state),
            SessionCommand::Export { format, path } => export(&state, format, &path),
            SessionCommand::Help => println!("{HELP}"),
            SessionCommand::Quit => break,
        }
    }

    if let Some(task) = loading {
        task.abort();
    }

    Ok(())
}

/// Next state, or the current one when the intent is rejected
fn step(state: &PlannerState, intent: Intent) -> PlannerState {
    match state.update(intent) {
        Ok(next) => next,
        Err(e) => {
            if !e.is_user_error() {
                tracing::warn!("Rejected action: {}", e);
            }
            println!("{e}");
            state.clone()
        }
    }
}

fn print_suggestions(state: &PlannerState) {
    if state.catalog().ready().is_none() {
        println!("catalog still loading");
        return;
    }
    let suggestions = state.visible_suggestions();
    if suggestions.is_empty() {
        println!("no matching courses");
    }
    for course in suggestions {
        println!("{}", display::course_line(course));
    }
}

fn show(state: &PlannerState) {
    match state.grid() {
        Some(grid) => print!("{}", display::render_grid(&grid)),
        None => println!("catalog still loading, grid not available yet"),
    }
    println!("{}", display::pending_line(state.pending()));
}

/// Export failures are reported and the session carries on
fn export(state: &PlannerState, format: ExportFormat, path: &std::path::Path) {
    let exporter: Box<dyn Exporter> = match format {
        ExportFormat::Html => Box::new(HtmlTableExporter::default()),
        ExportFormat::Ics => Box::new(IcsExporter::new(IcsOptions::default())),
    };

    match write_export(exporter.as_ref(), state.store(), path) {
        Ok(written) => println!("wrote {}", written.display()),
        Err(e) => tracing::error!("Export failed: {}", e),
    }
}
