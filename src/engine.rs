use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::entry::{Entry, TypeFilter};
use crate::error::RenameError;
use crate::printer::{spawn_printer, Printer, Processed};
use crate::results::{RenameStatus, Results, ScanStats};
use crate::traits::{NameMapper, Source};

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Pipeline parameters passed from the builder to the engine.
///
/// `pub(crate)`: callers configure these via the builder methods
/// (`.workers()`, `.queue_capacity()`, `.dry_run()`, `.type_filter()`).
pub(crate) struct PipelineConfig {
    pub workers:        usize,
    pub queue_capacity: usize,
    pub dry_run:        bool,
    pub type_filter:    TypeFilter,
}

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Internal options passed from the builder to `run()`.
pub(crate) struct EngineOptions {
    pub config:          PipelineConfig,
    pub source:          Box<dyn Source>,
    pub mapper:          Arc<dyn NameMapper>,
    pub printer:         Printer,
    pub collect_renames: bool,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Run the walk → workers → printer pipeline to completion.
///
/// The walk runs on the calling thread and feeds a bounded work queue.
/// Workers rename whatever they pull and push results to a bounded result
/// queue drained by the printer thread. Shutdown is by channel closure:
/// the walk drops the work sender, each worker drops its result sender on
/// exit, and the printer stops once the last one is gone.
pub(crate) fn run(opts: EngineOptions) -> Result<Results, RenameError> {
    let EngineOptions { config, source, mapper, printer, collect_renames } = opts;

    let (work_tx, work_rx) = bounded::<Entry>(config.queue_capacity);
    let (result_tx, result_rx) = bounded::<Processed>(config.queue_capacity);
    let abort = Arc::new(AtomicBool::new(false));
    let claimed = Arc::new(Mutex::new(HashSet::new()));

    let start = Instant::now();

    let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(config.workers);
    for id in 0..config.workers {
        let work_rx   = work_rx.clone();
        let result_tx = result_tx.clone();
        let mapper    = Arc::clone(&mapper);
        let abort     = Arc::clone(&abort);
        let claimed   = Arc::clone(&claimed);
        let dry_run   = config.dry_run;

        let handle = thread::Builder::new()
            .name(format!("rename-worker-{id}"))
            .spawn(move || {
                worker_loop(id, work_rx, result_tx, mapper, dry_run, abort, claimed)
            })
            .map_err(|e| RenameError::ThreadPool(e.to_string()))?;
        workers.push(handle);
    }
    // Only workers hold these now; the printer ends when the last worker does.
    drop(work_rx);
    drop(result_tx);

    let printer = spawn_printer(printer, result_rx, collect_renames)?;

    // Walk on this thread. Any source error is fatal.
    let mut files = 0usize;
    let mut dirs = 0usize;
    let mut walk_error = None;

    for item in source.walk() {
        let entry = match item {
            Ok(e) => e,
            Err(e) => {
                walk_error = Some(e);
                break;
            }
        };

        if !config.type_filter.admits(&entry) {
            continue;
        }
        if entry.is_dir() {
            dirs += 1;
        } else {
            files += 1;
        }

        if work_tx.send(entry).is_err() {
            // every worker is gone; the printer or a worker failed
            break;
        }
    }

    if walk_error.is_some() {
        abort.store(true, Ordering::Relaxed);
    }
    drop(work_tx);

    let mut pool_error = None;
    for handle in workers {
        if handle.join().is_err() && pool_error.is_none() {
            pool_error = Some(RenameError::ThreadPool("rename worker panicked".into()));
        }
    }

    let summary = match printer.join() {
        Ok(res) => res,
        Err(_) => Err(RenameError::ThreadPool("printer panicked".into())),
    };

    if let Some(e) = walk_error {
        return Err(e);
    }
    if let Some(e) = pool_error {
        return Err(e);
    }
    let summary = summary?;

    let duration = start.elapsed();
    info!(
        entries = files + dirs,
        matches = summary.matches,
        renamed = summary.renamed,
        failed = summary.failed,
        elapsed_ms = duration.as_millis() as u64,
        "rename run complete"
    );

    Ok(Results {
        matches: summary.matches,
        renamed: summary.renamed,
        failed:  summary.failed,
        renames: summary.renames,
        errors:  summary.errors,
        stats:   ScanStats::compute(files, dirs, duration),
    })
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

fn worker_loop(
    id: usize,
    rx: Receiver<Entry>,
    tx: Sender<Processed>,
    mapper: Arc<dyn NameMapper>,
    dry_run: bool,
    abort: Arc<AtomicBool>,
    claimed: Arc<Mutex<HashSet<PathBuf>>>,
) {
    debug!(worker = id, "worker started");
    let mut forwarded = 0usize;

    for mut entry in rx.iter() {
        // after a fatal walk error, drain without touching the filesystem
        if abort.load(Ordering::Relaxed) {
            continue;
        }

        let Some(new_name) = mapper.map_name(&entry) else {
            continue;
        };
        let new_path = entry.sibling(&new_name);

        let (status, error) = if dry_run {
            (RenameStatus::Planned, None)
        } else {
            match rename(&entry.path, &new_path, &claimed) {
                Ok(()) => (RenameStatus::Renamed, None),
                Err(e) => {
                    warn!(worker = id, error = %e, "rename failed");
                    (RenameStatus::Failed, Some(e))
                }
            }
        };

        entry.new_path = Some(new_path);
        if tx.send(Processed { entry, status, error }).is_err() {
            // printer is gone
            break;
        }
        forwarded += 1;
    }

    debug!(worker = id, forwarded, "worker finished");
}

/// Rename `from` to `to`, refusing to replace anything.
///
/// A target already claimed by another entry in this run, or already
/// present on disk, fails with `AlreadyExists`. The existence check and the
/// rename are not atomic, so a path created by another process in between
/// can still be replaced.
fn rename(
    from: &Path,
    to: &Path,
    claimed: &Mutex<HashSet<PathBuf>>,
) -> Result<(), RenameError> {
    let fail = |source: io::Error| RenameError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if from == to {
        return Ok(());
    }

    let first_claim = match claimed.lock() {
        Ok(mut set) => set.insert(to.to_path_buf()),
        Err(poisoned) => poisoned.into_inner().insert(to.to_path_buf()),
    };
    if !first_claim {
        return Err(fail(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "another entry is renamed to this path",
        )));
    }

    match std::fs::symlink_metadata(to) {
        Ok(existing) if !same_entry(from, &existing) => {
            return Err(fail(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "target already exists",
            )));
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(fail(e)),
    }

    std::fs::rename(from, to).map_err(fail)
}

/// Whether `existing` is `from` itself, as on a case-insensitive filesystem
/// where only the case of the name changes.
#[cfg(unix)]
fn same_entry(from: &Path, existing: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    std::fs::symlink_metadata(from)
        .map(|m| m.dev() == existing.dev() && m.ino() == existing.ino())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn same_entry(_from: &Path, _existing: &std::fs::Metadata) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use crate::rule::RenameRule;

    struct ListSource(Vec<(String, EntryKind)>);

    impl ListSource {
        fn of(items: &[(&str, EntryKind)]) -> Self {
            Self(items.iter().map(|(p, k)| (p.to_string(), *k)).collect())
        }
    }

    impl Source for ListSource {
        fn walk(&self) -> Box<dyn Iterator<Item = Result<Entry, RenameError>>> {
            let entries = self
                .0
                .iter()
                .map(|(p, k)| Ok(Entry::new(p.as_str(), *k)))
                .collect::<Vec<Result<Entry, RenameError>>>();
            Box::new(entries.into_iter())
        }
    }

    /// Yields its entries, then a traversal error.
    struct FailingSource(Vec<&'static str>);

    impl Source for FailingSource {
        fn walk(&self) -> Box<dyn Iterator<Item = Result<Entry, RenameError>>> {
            let mut items = self
                .0
                .iter()
                .map(|p| Ok(Entry::new(*p, EntryKind::File)))
                .collect::<Vec<_>>();
            items.push(Err(RenameError::PermissionDenied("locked".into())));
            Box::new(items.into_iter())
        }
    }

    fn options(source: impl Source + 'static, workers: usize, filter: TypeFilter) -> EngineOptions {
        EngineOptions {
            config: PipelineConfig {
                workers,
                queue_capacity: 2,
                dry_run: true,
                type_filter: filter,
            },
            source:          Box::new(source),
            mapper:          Arc::new(RenameRule::new(r"^(\w+)\.txt$", "$1.bak", None).unwrap()),
            printer:         Printer::new(None, None),
            collect_renames: true,
        }
    }

    #[test]
    fn only_matching_entries_reach_the_printer() {
        let source = ListSource::of(&[
            ("a.txt", EntryKind::File),
            ("b.txt", EntryKind::File),
            ("note.md", EntryKind::File),
        ]);
        let results = run(options(source, 2, TypeFilter::Any)).unwrap();

        assert_eq!(results.stats.entries, 3);
        assert_eq!(results.matches, 2);
        assert_eq!(results.renamed, 0);
        assert!(results.renames.iter().all(|r| r.status == RenameStatus::Planned));
    }

    #[test]
    fn type_filter_applies_before_queueing() {
        let source = ListSource::of(&[
            ("dir.txt", EntryKind::Dir),
            ("file.txt", EntryKind::File),
        ]);
        let results = run(options(source, 1, TypeFilter::DirsOnly)).unwrap();

        assert_eq!(results.stats.dirs, 1);
        assert_eq!(results.stats.files, 0);
        assert_eq!(results.renames.len(), 1);
        assert_eq!(results.renames[0].kind, EntryKind::Dir);
    }

    #[test]
    fn many_entries_through_small_queues() {
        let source = ListSource((0..500).map(|i| (format!("f{i}.txt"), EntryKind::File)).collect());
        let results = run(options(source, 4, TypeFilter::Any)).unwrap();

        assert_eq!(results.matches, 500);
        assert_eq!(results.renames.len(), 500);
    }

    #[test]
    fn walk_error_is_returned() {
        let source = FailingSource(vec!["a.txt", "b.txt"]);
        let err = run(options(source, 2, TypeFilter::Any)).err().unwrap();
        assert!(matches!(err, RenameError::PermissionDenied(_)));
    }

    #[test]
    fn worker_panic_surfaces_as_thread_pool_error() {
        struct Panics;
        impl NameMapper for Panics {
            fn map_name(&self, _entry: &Entry) -> Option<std::ffi::OsString> {
                panic!("mapper blew up");
            }
        }

        let mut opts = options(ListSource::of(&[("a.txt", EntryKind::File)]), 1, TypeFilter::Any);
        opts.mapper = Arc::new(Panics);
        let err = run(opts).err().unwrap();
        assert!(matches!(err, RenameError::ThreadPool(_)));
    }
}
