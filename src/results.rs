use std::path::PathBuf;
use std::time::Duration;

use crate::entry::EntryKind;
use crate::error::RenameError;

/// The output of a completed rename run.
///
/// `renames` is opt-in: enable it with `.collect_renames(true)` on the
/// builder. `errors` is always populated, one per failed rename.
pub struct Results {
    /// Entries that passed the rename rule and reached the printer.
    pub matches: usize,

    /// Entries actually renamed on disk. Always 0 in dry-run mode.
    pub renamed: usize,

    /// Entries whose rename call failed.
    pub failed: usize,

    /// Every processed entry, in the order the printer received them.
    /// Only populated if `.collect_renames(true)` was set on the builder.
    pub renames: Vec<RenameRecord>,

    /// Rename failures, one per failed entry.
    pub errors: Vec<RenameError>,

    /// Walk statistics.
    pub stats: ScanStats,
}

impl Results {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// One entry as reported by the printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRecord {
    pub from:   PathBuf,
    pub to:     PathBuf,
    pub kind:   EntryKind,
    pub status: RenameStatus,
}

/// What happened to a matched entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameStatus {
    /// Renamed on disk.
    Renamed,

    /// Dry run: the rename was computed but not applied.
    Planned,

    /// The rename call failed; see [`Results::errors`].
    Failed,
}

/// Statistics for the walk side of a run.
pub struct ScanStats {
    /// Entries queued for the workers (after the type filter).
    pub entries: usize,

    /// Non-directory entries queued.
    pub files: usize,

    /// Directory entries queued.
    pub dirs: usize,

    /// Wall-clock time from start of walk to printer shutdown.
    pub duration: Duration,

    /// `entries / duration`, clamped to 0 on zero-duration runs.
    pub entries_per_sec: usize,
}

impl ScanStats {
    pub(crate) fn compute(files: usize, dirs: usize, duration: Duration) -> Self {
        let total = files + dirs;
        let eps = if duration.as_secs_f64() > 0.0 {
            (total as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            entries: total,
            files,
            dirs,
            duration,
            entries_per_sec: eps,
        }
    }
}
