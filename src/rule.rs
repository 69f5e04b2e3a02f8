use std::ffi::{OsStr, OsString};

use regex::bytes::Regex;

use crate::entry::Entry;
use crate::error::RenameError;
use crate::traits::NameMapper;

/// Regex match-and-replace over file names.
///
/// Two filters run in order: the optional extension filter, then the name
/// pattern. An entry that passes both gets every match of the name pattern
/// replaced with the template. Templates use the `regex` crate's expansion
/// syntax: `$1`, `${1}`, `${name}`, `$$` for a literal dollar.
///
/// Matching runs over the raw bytes of the name, so bytes that are not valid
/// UTF-8 survive untouched unless the pattern itself consumes them. Outside
/// Unix, names that are not valid Unicode are left alone.
///
/// A rule says nothing about collisions: two names may map to the same
/// target. The engine refuses to rename onto an existing path, so the
/// second of two colliding entries is reported as failed.
#[derive(Debug, Clone)]
pub struct RenameRule {
    pattern:     Regex,
    replacement: String,
    extension:   Option<Regex>,
}

impl RenameRule {
    /// Compile a rule.
    ///
    /// `extension` is matched as `\.<extension>$` against the file name. It
    /// is a regex fragment, so `jpe?g` matches both `.jpg` and `.jpeg`.
    /// An empty extension means no extension filter.
    ///
    /// # Errors
    ///
    /// `EmptyPattern` and `EmptyReplacement` for blank inputs,
    /// `InvalidPattern` when either regex fails to compile.
    pub fn new(
        pattern: &str,
        replacement: &str,
        extension: Option<&str>,
    ) -> Result<Self, RenameError> {
        if pattern.is_empty() {
            return Err(RenameError::EmptyPattern);
        }
        if replacement.is_empty() {
            return Err(RenameError::EmptyReplacement);
        }

        let pattern = compile(pattern)?;
        let extension = match extension {
            Some(ext) if !ext.is_empty() => Some(compile(&format!(r"\.{ext}$"))?),
            _ => None,
        };

        Ok(Self {
            pattern,
            replacement: replacement.to_string(),
            extension,
        })
    }

    /// Whether `name` passes both filters.
    pub fn is_match(&self, name: impl AsRef<OsStr>) -> bool {
        match name_bytes(name.as_ref()) {
            Some(bytes) => self.is_match_bytes(bytes),
            None => false,
        }
    }

    /// The replacement name for `name`, or `None` if it is filtered out.
    pub fn apply(&self, name: impl AsRef<OsStr>) -> Option<OsString> {
        let bytes = name_bytes(name.as_ref())?;
        if !self.is_match_bytes(bytes) {
            return None;
        }
        let replaced = self
            .pattern
            .replace_all(bytes, self.replacement.as_bytes())
            .into_owned();
        name_from_bytes(replaced)
    }

    fn is_match_bytes(&self, bytes: &[u8]) -> bool {
        if let Some(ext) = &self.extension {
            if !ext.is_match(bytes) {
                return false;
            }
        }
        self.pattern.is_match(bytes)
    }
}

impl NameMapper for RenameRule {
    fn map_name(&self, entry: &Entry) -> Option<OsString> {
        self.apply(&entry.file_name)
    }
}

fn compile(pattern: &str) -> Result<Regex, RenameError> {
    Regex::new(pattern).map_err(|e| RenameError::InvalidPattern {
        pattern: pattern.to_string(),
        reason:  e.to_string(),
    })
}

#[cfg(unix)]
fn name_bytes(name: &OsStr) -> Option<&[u8]> {
    use std::os::unix::ffi::OsStrExt;
    Some(name.as_bytes())
}

#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> Option<&[u8]> {
    name.to_str().map(str::as_bytes)
}

#[cfg(unix)]
fn name_from_bytes(bytes: Vec<u8>) -> Option<OsString> {
    use std::os::unix::ffi::OsStringExt;
    Some(OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn name_from_bytes(bytes: Vec<u8>) -> Option<OsString> {
    String::from_utf8(bytes).ok().map(OsString::from)
}
