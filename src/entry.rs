use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// A single filesystem object produced by a [`Source`](crate::traits::Source)
/// and carried through the rename pipeline.
///
/// Ownership moves with the entry: the walker builds it, hands it to exactly
/// one worker through the work queue, and that worker forwards it to the
/// printer. No two workers ever see the same entry, so no two workers ever
/// rename the same source path.
pub struct Entry {
    /// Path as produced by the walk (relative or absolute, as given).
    pub path: PathBuf,

    /// The entry's file name exactly as the filesystem reports it. Patterns
    /// are matched against this, never the full path.
    pub file_name: OsString,

    /// `file_name` as UTF-8, with invalid sequences replaced. For display
    /// and for mappers that only deal in text; never written back to disk
    /// by [`RenameRule`](crate::RenameRule).
    pub name: String,

    /// What kind of entry this is, as seen at walk time.
    pub kind: EntryKind,

    /// How deep in the traversal this entry was found. Root = 0.
    pub depth: usize,

    /// Metadata snapshot taken at walk time (lstat semantics). Not refreshed
    /// before the rename, so it may be stale by then. `None` for sources that
    /// are not backed by a filesystem walk.
    pub metadata: Option<std::fs::Metadata>,

    /// Destination path, set by the worker once a rename target is known.
    pub new_path: Option<PathBuf>,
}

impl Entry {
    /// Build an entry for `path`, deriving `name` from its last component.
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        let path = path.into();
        let file_name = path.file_name().unwrap_or(path.as_os_str()).to_os_string();
        let name = file_name.to_string_lossy().into_owned();
        Self {
            path,
            file_name,
            name,
            kind,
            depth:    0,
            metadata: None,
            new_path: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// The path `new_name` would have if it replaced this entry's name in
    /// the same parent directory.
    pub fn sibling(&self, new_name: impl AsRef<OsStr>) -> PathBuf {
        self.path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(new_name.as_ref())
    }
}

/// The kind of a traversed entry.
///
/// Symlinks are never followed, so a link to a directory is a `Symlink`,
/// not a `Dir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link.
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}

impl EntryKind {
    pub fn from_file_type(ft: std::fs::FileType) -> Self {
        if ft.is_dir() {
            EntryKind::Dir
        } else if ft.is_file() {
            EntryKind::File
        } else if ft.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::Other
        }
    }
}

/// Which entry kinds the walker queues for renaming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    /// Files and directories alike.
    #[default]
    Any,

    /// Everything that is not a directory (symlinks included).
    FilesOnly,

    /// Directories only.
    DirsOnly,
}

impl TypeFilter {
    pub fn admits(&self, entry: &Entry) -> bool {
        match self {
            TypeFilter::Any       => true,
            TypeFilter::FilesOnly => !entry.is_dir(),
            TypeFilter::DirsOnly  => entry.is_dir(),
        }
    }
}
