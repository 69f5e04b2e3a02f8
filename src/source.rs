use std::path::PathBuf;

use ignore::{DirEntry, WalkBuilder};
use tracing::{debug, warn};

use crate::entry::{Entry, EntryKind};
use crate::error::RenameError;
use crate::traits::Source;

type EntryIter = Box<dyn Iterator<Item = Result<Entry, RenameError>>>;

// ---------------------------------------------------------------------------
// GlobSource
// ---------------------------------------------------------------------------

/// Walks every path matched by a list of glob patterns.
///
/// Each pattern is expanded with `glob`, then each match is traversed
/// pre-order with `ignore` in sequential mode: the match itself first, then
/// its children sorted by name. Nothing is filtered out (hidden files and
/// ignore files are not honoured) and symlinks are not followed.
///
/// Patterns are expanded one at a time as the walk reaches them, so entries
/// under the first pattern are already being renamed while later patterns
/// are still unexpanded.
#[derive(Debug, Clone)]
pub struct GlobSource {
    patterns: Vec<String>,
}

impl GlobSource {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Source for GlobSource {
    fn walk(&self) -> EntryIter {
        Box::new(self.patterns.clone().into_iter().flat_map(walk_pattern))
    }
}

fn walk_pattern(pattern: String) -> EntryIter {
    match expand(&pattern) {
        Ok(roots) => {
            if roots.is_empty() {
                warn!(pattern = %pattern, "pattern matched nothing");
            }
            Box::new(roots.into_iter().flat_map(walk_root))
        }
        Err(e) => Box::new(std::iter::once(Err::<Entry, _>(e))),
    }
}

fn expand(pattern: &str) -> Result<Vec<PathBuf>, RenameError> {
    let paths = glob::glob(pattern).map_err(|e| RenameError::Glob {
        pattern: pattern.to_string(),
        reason:  e.to_string(),
    })?;

    paths
        .map(|res| {
            res.map_err(|e| RenameError::Io {
                path:   e.path().to_path_buf(),
                source: e.into_error(),
            })
        })
        .collect()
}

fn walk_root(root: PathBuf) -> EntryIter {
    debug!(root = %root.display(), "walking");

    let mut builder = WalkBuilder::new(&root);
    builder
        .standard_filters(false)
        .ignore(false)
        .parents(false)
        .hidden(false)
        .follow_links(false)
        .same_file_system(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    Box::new(
        builder
            .build()
            .map(|res| res.map_err(map_ignore_error).and_then(to_entry)),
    )
}

fn to_entry(dent: DirEntry) -> Result<Entry, RenameError> {
    // lstat: with follow_links(false) ignore reports the link itself
    let metadata = dent.metadata().map_err(map_ignore_error)?;
    let kind = EntryKind::from_file_type(metadata.file_type());

    Ok(Entry {
        path:      dent.path().to_path_buf(),
        file_name: dent.file_name().to_os_string(),
        name:      dent.file_name().to_string_lossy().into_owned(),
        kind,
        depth:     dent.depth(),
        metadata:  Some(metadata),
        new_path:  None,
    })
}

// ---------------------------------------------------------------------------
// Map ignore::Error to RenameError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error) -> RenameError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => {
                if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                    RenameError::PermissionDenied(path)
                } else {
                    RenameError::Io { path, source: io_err }
                }
            }
            other => RenameError::Source(format!("{}: {}", path.display(), other)),
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::Loop { child, .. } => RenameError::SymlinkLoop(child),
        ignore::Error::Io(io_err) => RenameError::Io {
            path:   PathBuf::new(),
            source: io_err,
        },
        other => RenameError::Source(other.to_string()),
    }
}
