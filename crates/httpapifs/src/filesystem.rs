//! The generic filesystem contract.
//!
//! Callers program against [`FileSystem`]; [`crate::HttpApiFs`] is one
//! backend. Paths are slash-separated and normalized by the backend.

use crate::entry::NodeInfo;
use crate::error::{HttpApiFsError, Result};
use glob::Pattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

impl OpenMode {
    /// Parses a mode string such as `"r"`, `"rb"`, `"w"` or `"wb"`.
    ///
    /// Append (`a`) and read-write (`+`) modes are rejected: the remote side
    /// only reads and replaces whole files.
    pub fn parse(mode: &str) -> Result<Self> {
        let mode = mode.to_ascii_lowercase();
        if mode.contains('a') || mode.contains('+') {
            return Err(HttpApiFsError::Unsupported {
                op: format!("open mode '{}'", mode),
            });
        }
        if mode.contains('w') || mode.contains('x') {
            Ok(OpenMode::Write)
        } else {
            Ok(OpenMode::Read)
        }
    }

    pub fn is_readable(&self) -> bool {
        *self == OpenMode::Read
    }

    pub fn is_writable(&self) -> bool {
        *self == OpenMode::Write
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter {
    #[default]
    All,
    DirsOnly,
    FilesOnly,
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub filter: ListFilter,
    /// Glob matched against entry names, e.g. `*.txt`
    pub wildcard: Option<String>,
    /// Return absolute paths instead of bare names
    pub full: bool,
    /// Bypass the cached listing
    pub refresh: bool,
}

impl ListOptions {
    /// Compiles `wildcard`, if set.
    pub fn pattern(&self) -> Result<Option<Pattern>> {
        self.wildcard
            .as_deref()
            .map(|wildcard| {
                Pattern::new(wildcard).map_err(|e| HttpApiFsError::InvalidPattern {
                    pattern: wildcard.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }
}

/// Static capabilities of a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsMeta {
    pub network: bool,
    pub virtual_fs: bool,
    pub read_only: bool,
    pub unicode_paths: bool,
    pub case_insensitive_paths: bool,
    pub atomic_rename: bool,
    pub atomic_makedir: bool,
    pub atomic_setcontents: bool,
    pub read_and_write: bool,
}

/// A whole-file handle returned by [`FileSystem::open`].
pub trait FileHandle {
    fn path(&self) -> &str;
    fn mode(&self) -> OpenMode;
    /// Size recorded when a read handle was opened.
    fn size(&self) -> Option<u64>;
    fn read(&mut self) -> Result<Vec<u8>>;
    fn write(&mut self, data: &[u8]) -> Result<()>;
    fn close(&mut self);
    fn is_closed(&self) -> bool;
}

pub trait FileSystem {
    fn exists(&self, path: &str) -> Result<bool>;
    fn isdir(&self, path: &str) -> Result<bool>;
    fn isfile(&self, path: &str) -> Result<bool>;
    fn getsize(&self, path: &str) -> Result<u64>;
    fn getinfo(&self, path: &str) -> Result<NodeInfo>;
    fn listdir(&self, path: &str, options: &ListOptions) -> Result<Vec<String>>;
    fn open(&self, path: &str, mode: &str) -> Result<Box<dyn FileHandle + '_>>;
    fn makedir(&self, path: &str, recursive: bool, allow_recreate: bool) -> Result<()>;
    fn remove(&self, path: &str) -> Result<()>;
    fn removedir(&self, path: &str) -> Result<()>;
    fn rename(&self, src: &str, dst: &str, overwrite: bool) -> Result<()>;
    /// Drops any cached state. Backends without a cache do nothing.
    fn reset_cache(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_read_modes() {
        assert_eq!(OpenMode::parse("r").unwrap(), OpenMode::Read);
        assert_eq!(OpenMode::parse("rb").unwrap(), OpenMode::Read);
        assert_eq!(OpenMode::parse("").unwrap(), OpenMode::Read);
    }

    #[test]
    fn test_parse_write_modes() {
        assert_eq!(OpenMode::parse("w").unwrap(), OpenMode::Write);
        assert_eq!(OpenMode::parse("WB").unwrap(), OpenMode::Write);
    }

    #[test]
    fn test_parse_rejects_append_and_update() {
        for mode in ["a", "ab", "r+", "w+", "rb+"] {
            let err = OpenMode::parse(mode).unwrap_err();
            assert!(
                matches!(err, HttpApiFsError::Unsupported { .. }),
                "mode {} should be unsupported",
                mode
            );
        }
    }

    #[test]
    fn test_list_options_pattern() {
        assert!(ListOptions::default().pattern().unwrap().is_none());

        let options = ListOptions {
            wildcard: Some("*.txt".to_string()),
            ..Default::default()
        };
        let pattern = options.pattern().unwrap().unwrap();
        assert!(pattern.matches("readme.txt"));
        assert!(!pattern.matches("img"));

        let bad = ListOptions {
            wildcard: Some("[".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad.pattern(),
            Err(HttpApiFsError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_mode_capabilities() {
        assert!(OpenMode::Read.is_readable());
        assert!(!OpenMode::Read.is_writable());
        assert!(OpenMode::Write.is_writable());
    }
}
