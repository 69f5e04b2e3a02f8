use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenameError {
    // Config
    #[error("match pattern is required. use --match 'pattern'")]
    EmptyPattern,

    #[error("replacement is required. use --replace 'replacement'")]
    EmptyReplacement,

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid worker count: {0}")]
    InvalidWorkerCount(usize),

    #[error("no rename rule provided")]
    NoRule,

    // Traversal
    #[error("invalid glob pattern '{pattern}': {reason}")]
    Glob { pattern: String, reason: String },

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("symlink loop: {}", .0.display())]
    SymlinkLoop(PathBuf),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source error: {0}")]
    Source(String),

    // Runtime
    #[error("rename {} => {} failed: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    #[error("thread pool failure: {0}")]
    ThreadPool(String),
}

impl RenameError {
    /// The path this error occurred at, if applicable.
    /// For rename failures this is the source path.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::PermissionDenied(p)
            | Self::SymlinkLoop(p)
            | Self::Io { path: p, .. }
            | Self::Rename { from: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether this error aborts a run.
    ///
    /// Everything except a per-entry rename failure is fatal: configuration
    /// and traversal errors stop the pipeline, rename failures are reported
    /// against their entry and the run carries on.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Rename { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_failures_are_not_fatal() {
        let err = RenameError::Rename {
            from:   PathBuf::from("a.txt"),
            to:     PathBuf::from("b.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.path(), Some(&PathBuf::from("a.txt")));
        assert!(RenameError::SymlinkLoop(PathBuf::from("x")).is_fatal());
        assert!(RenameError::EmptyPattern.is_fatal());
    }

    #[test]
    fn config_errors_carry_usage_hint() {
        assert!(RenameError::EmptyReplacement.to_string().contains("--replace"));
        assert!(RenameError::EmptyPattern.to_string().contains("--match"));
    }
}
