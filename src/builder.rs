use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::engine::{run, EngineOptions, PipelineConfig};
use crate::entry::TypeFilter;
use crate::error::RenameError;
use crate::printer::Printer;
use crate::results::Results;
use crate::rule::RenameRule;
use crate::traits::{NameMapper, Source};

/// Default number of rename workers.
pub const DEFAULT_WORKERS: usize = 2;

/// Default capacity of both the work queue and the result queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

// ---------------------------------------------------------------------------
// RenameBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a rename run.
///
/// Created via [`regren::renamer()`](crate::renamer). Configure with chained
/// builder methods, then call [`run()`](RenameBuilder::run) to execute.
///
/// # Example
///
/// ```rust,ignore
/// let results = regren::renamer()
///     .source(GlobSource::new(["photos/*"]))
///     .rule(RenameRule::new(r"^IMG_(\d+)", "holiday_$1", Some("jpe?g"))?)
///     .workers(4)
///     .dry_run(true)
///     .print_to(std::io::stdout())
///     .run()?;
/// ```
pub struct RenameBuilder {
    source:          Option<Box<dyn Source>>,
    mapper:          Option<Box<dyn NameMapper>>,
    type_filter:     TypeFilter,
    workers:         usize,
    queue_capacity:  usize,
    dry_run:         bool,
    output:          Option<Box<dyn Write + Send>>,
    relative_to:     Option<PathBuf>,
    collect_renames: bool,
}

impl Default for RenameBuilder {
    fn default() -> Self {
        Self {
            source:          None,
            mapper:          None,
            type_filter:     TypeFilter::Any,
            workers:         DEFAULT_WORKERS,
            queue_capacity:  DEFAULT_QUEUE_CAPACITY,
            dry_run:         false,
            output:          None,
            relative_to:     None,
            collect_renames: false,
        }
    }
}

impl RenameBuilder {
    // ── Source ────────────────────────────────────────────────────────────

    /// Set where entries come from.
    ///
    /// Usually a [`GlobSource`](crate::GlobSource); any [`Source`] works.
    pub fn source(mut self, s: impl Source + 'static) -> Self {
        self.source = Some(Box::new(s));
        self
    }

    /// Only queue files, only directories, or both (the default).
    pub fn type_filter(mut self, filter: TypeFilter) -> Self {
        self.type_filter = filter;
        self
    }

    // ── Rule ──────────────────────────────────────────────────────────────

    /// Rename with a regex [`RenameRule`].
    pub fn rule(self, rule: RenameRule) -> Self {
        self.with_mapper(rule)
    }

    /// Rename with custom logic.
    ///
    /// Any type implementing [`NameMapper`] is accepted. Replaces any rule
    /// set earlier.
    pub fn with_mapper(mut self, m: impl NameMapper + 'static) -> Self {
        self.mapper = Some(Box::new(m));
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Number of concurrent rename workers. Defaults to 2.
    ///
    /// With more than one worker, output order no longer follows walk order.
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    /// Capacity of the work and result queues. Defaults to 1000.
    ///
    /// The walker blocks when the work queue is full; workers block when the
    /// result queue is full.
    pub fn queue_capacity(mut self, n: usize) -> Self {
        self.queue_capacity = n;
        self
    }

    /// Compute and report renames without touching the filesystem.
    pub fn dry_run(mut self, yes: bool) -> Self {
        self.dry_run = yes;
        self
    }

    // ── Output ────────────────────────────────────────────────────────────

    /// Write one `old => new` line per processed entry to `out`.
    ///
    /// Without an output sink the run is silent; use
    /// [`collect_renames`](Self::collect_renames) to inspect what happened.
    pub fn print_to(mut self, out: impl Write + Send + 'static) -> Self {
        self.output = Some(Box::new(out));
        self
    }

    /// Show paths under `base` relative to it in printed lines.
    pub fn relative_to(mut self, base: impl Into<PathBuf>) -> Self {
        self.relative_to = Some(base.into());
        self
    }

    /// Collect every processed entry into [`Results::renames`].
    ///
    /// Disabled by default to avoid holding one record per entry on large
    /// trees.
    pub fn collect_renames(mut self, yes: bool) -> Self {
        self.collect_renames = yes;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Execute the run and return results.
    ///
    /// Blocks until the walk, every worker and the printer have finished.
    ///
    /// # Errors
    ///
    /// Returns `Err` for configuration errors (no source, no rule, zero
    /// workers), for any traversal error, for a failure writing output, and
    /// if a worker panics. Renames already applied are not rolled back.
    /// Individual rename failures are not errors here: they are counted in
    /// [`Results::failed`] and listed in [`Results::errors`].
    pub fn run(self) -> Result<Results, RenameError> {
        let source = self.source.ok_or_else(|| {
            RenameError::Source("no source provided".into())
        })?;
        let mapper: Arc<dyn NameMapper> = match self.mapper {
            Some(m) => Arc::from(m),
            None    => return Err(RenameError::NoRule),
        };
        if self.workers == 0 {
            return Err(RenameError::InvalidWorkerCount(0));
        }

        let opts = EngineOptions {
            config: PipelineConfig {
                workers:        self.workers,
                queue_capacity: self.queue_capacity,
                dry_run:        self.dry_run,
                type_filter:    self.type_filter,
            },
            source,
            mapper,
            printer:         Printer::new(self.output, self.relative_to),
            collect_renames: self.collect_renames,
        };

        run(opts)
    }
}
