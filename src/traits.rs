use std::ffi::OsString;

use crate::entry::Entry;
use crate::error::RenameError;

/// A source of entries to consider for renaming.
///
/// The filesystem implementation is [`GlobSource`](crate::GlobSource).
/// Implement this to feed the pipeline from anything else: a fixed list of
/// paths, a different walker, a manifest file.
///
/// # Laziness
///
/// The engine pulls from the iterator on the calling thread while workers
/// are already renaming, so sources should yield entries as they discover
/// them rather than collecting everything up front.
///
/// # Error Handling
///
/// Any `Err` yielded here is fatal: the engine stops pulling, discards
/// entries still queued, and returns the error from
/// [`RenameBuilder::run`](crate::RenameBuilder::run).
///
/// # Example
///
/// ```rust
/// use regren::{Entry, EntryKind, RenameError, Source};
///
/// struct ListSource(Vec<&'static str>);
///
/// impl Source for ListSource {
///     fn walk(&self) -> Box<dyn Iterator<Item = Result<Entry, RenameError>>> {
///         let entries = self.0.iter()
///             .map(|p| Ok(Entry::new(*p, EntryKind::File)))
///             .collect::<Vec<Result<Entry, RenameError>>>();
///         Box::new(entries.into_iter())
///     }
/// }
/// ```
pub trait Source: Send + Sync {
    /// Traverse the source and yield entries in discovery order.
    fn walk(&self) -> Box<dyn Iterator<Item = Result<Entry, RenameError>>>;
}

/// Decides whether an entry is renamed, and to what.
///
/// The regex implementation is [`RenameRule`](crate::RenameRule). Mappers
/// are shared across worker threads and called concurrently on different
/// entries.
///
/// Names are `OsString`s because file names need not be UTF-8. A mapper
/// that works on [`Entry::name`] should skip entries whose
/// [`Entry::file_name`] is not valid UTF-8, or it will write replacement
/// characters to disk.
///
/// # Example
///
/// ```rust
/// use std::ffi::OsString;
/// use regren::{Entry, NameMapper};
///
/// struct Lowercase;
///
/// impl NameMapper for Lowercase {
///     fn map_name(&self, entry: &Entry) -> Option<OsString> {
///         let name = entry.file_name.to_str()?;
///         let lower = name.to_lowercase();
///         (lower != name).then(|| lower.into())
///     }
/// }
/// ```
pub trait NameMapper: Send + Sync {
    /// Returns the new file name, or `None` to leave the entry alone.
    /// Entries mapped to `None` are dropped from the pipeline and never
    /// reported.
    fn map_name(&self, entry: &Entry) -> Option<OsString>;
}
