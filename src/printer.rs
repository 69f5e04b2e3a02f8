use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use tracing::debug;

use crate::entry::Entry;
use crate::error::RenameError;
use crate::results::{RenameRecord, RenameStatus};

/// One processed entry on its way from a worker to the printer.
pub(crate) struct Processed {
    pub entry:  Entry,
    pub status: RenameStatus,
    pub error:  Option<RenameError>,
}

/// Formats rename lines and writes them to an output sink.
///
/// Paths under the `base` directory are shown relative to it. Everything
/// else is shown exactly as the walk produced it.
pub(crate) struct Printer {
    out:  Option<Box<dyn Write + Send>>,
    base: Option<PathBuf>,
}

impl Printer {
    pub fn new(out: Option<Box<dyn Write + Send>>, base: Option<PathBuf>) -> Self {
        Self { out, base }
    }

    /// Display form of `path`.
    pub fn display(&self, path: &Path) -> String {
        let shown = match &self.base {
            Some(base) => path.strip_prefix(base).unwrap_or(path),
            None => path,
        };
        if shown.as_os_str().is_empty() {
            ".".to_string()
        } else {
            shown.display().to_string()
        }
    }

    /// The output line for one rename, without the trailing newline.
    pub fn line(&self, from: &Path, to: &Path, reason: Option<&str>) -> String {
        let mut line = format!("{} => {}", self.display(from), self.display(to));
        if let Some(reason) = reason {
            line.push_str(&format!(" (failed: {reason})"));
        }
        line
    }

    fn emit(&mut self, line: &str) -> std::io::Result<()> {
        match self.out.as_mut() {
            Some(out) => writeln!(out, "{line}"),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.out.as_mut() {
            Some(out) => out.flush(),
            None => Ok(()),
        }
    }
}

/// What the printer saw by the time the result queue closed.
#[derive(Default)]
pub(crate) struct PrintSummary {
    pub matches: usize,
    pub renamed: usize,
    pub failed:  usize,
    pub renames: Vec<RenameRecord>,
    pub errors:  Vec<RenameError>,
}

/// Spawn the single result consumer. It drains `rx` until every sender is
/// gone, then hands back its summary.
pub(crate) fn spawn_printer(
    mut printer: Printer,
    rx: Receiver<Processed>,
    collect_renames: bool,
) -> Result<JoinHandle<Result<PrintSummary, RenameError>>, RenameError> {
    thread::Builder::new()
        .name("rename-printer".to_string())
        .spawn(move || {
            let mut summary = PrintSummary::default();

            for processed in rx.iter() {
                let Processed { entry, status, error } = processed;
                let to = entry.new_path.unwrap_or_else(|| entry.path.clone());

                let reason = error.as_ref().map(failure_reason);
                let line = printer.line(&entry.path, &to, reason.as_deref());
                printer.emit(&line).map_err(RenameError::Output)?;

                summary.matches += 1;
                match status {
                    RenameStatus::Renamed => summary.renamed += 1,
                    RenameStatus::Failed  => summary.failed += 1,
                    RenameStatus::Planned => {}
                }
                if let Some(err) = error {
                    summary.errors.push(err);
                }
                if collect_renames {
                    summary.renames.push(RenameRecord {
                        from: entry.path,
                        to,
                        kind: entry.kind,
                        status,
                    });
                }
            }

            printer.flush().map_err(RenameError::Output)?;
            debug!(lines = summary.matches, "printer done");
            Ok(summary)
        })
        .map_err(|e| RenameError::ThreadPool(e.to_string()))
}

/// Just the OS error for a failed rename; the paths are already on the line.
fn failure_reason(err: &RenameError) -> String {
    match err {
        RenameError::Rename { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}
