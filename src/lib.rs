//! # regren
//!
//! Bulk file and directory renaming with regular expressions.
//!
//! A run is a three-stage pipeline: a walker enumerates entries under a set
//! of glob patterns, a pool of worker threads applies a regex
//! match-and-replace to each file name and renames the entry in place, and a
//! single printer reports one `old => new` line per renamed entry. Stages
//! are connected by bounded queues.
//!
//! Renaming is not transactional. A run that is interrupted, or that hits a
//! traversal error part way, leaves already-renamed entries renamed.
//!
//! # Quick Start
//!
//! ```rust
//! use regren::{Entry, EntryKind, RenameError, RenameRule, Source};
//!
//! // A minimal in-memory source for demonstration
//! struct NameSource(Vec<&'static str>);
//!
//! impl Source for NameSource {
//!     fn walk(&self) -> Box<dyn Iterator<Item = Result<Entry, RenameError>>> {
//!         let entries = self.0.iter()
//!             .map(|name| Ok(Entry::new(*name, EntryKind::File)))
//!             .collect::<Vec<Result<Entry, RenameError>>>();
//!         Box::new(entries.into_iter())
//!     }
//! }
//!
//! let results = regren::renamer()
//!     .source(NameSource(vec!["a.txt", "b.txt", "note.md"]))
//!     .rule(RenameRule::new(r"(.*)\.txt$", "$1.bak", Some("txt")).unwrap())
//!     .dry_run(true)
//!     .collect_renames(true)
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(results.matches, 2);
//! assert_eq!(results.renamed, 0);
//! ```
//!
//! On a real tree, use [`GlobSource`]:
//!
//! ```rust,no_run
//! use regren::{GlobSource, RenameRule, TypeFilter};
//!
//! let results = regren::renamer()
//!     .source(GlobSource::new(["photos/*"]))
//!     .rule(RenameRule::new(" ", "_", None)?)
//!     .type_filter(TypeFilter::FilesOnly)
//!     .workers(4)
//!     .print_to(std::io::stdout())
//!     .run()?;
//!
//! if results.has_failures() {
//!     eprintln!("{} renames failed", results.failed);
//! }
//! # Ok::<(), regren::RenameError>(())
//! ```

#![forbid(unsafe_code)]

pub mod config;

mod builder;
mod engine;
mod entry;
mod error;
mod printer;
mod results;
mod rule;
mod source;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{RenameBuilder, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
pub use entry::{Entry, EntryKind, TypeFilter};
pub use error::RenameError;
pub use results::{RenameRecord, RenameStatus, Results, ScanStats};
pub use rule::RenameRule;
pub use source::GlobSource;
pub use traits::{NameMapper, Source};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`RenameBuilder`] to configure and run a rename.
pub fn renamer() -> RenameBuilder {
    RenameBuilder::default()
}
