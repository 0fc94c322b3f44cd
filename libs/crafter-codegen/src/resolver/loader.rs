use crate::error::{Error, Result};
use serde_yaml::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Loads and parses spec documents by path.
///
/// The resolver asks for each distinct file at most once per run.
pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Value>;
}

/// Reads YAML documents from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDocumentLoader;

impl DocumentLoader for FsDocumentLoader {
    fn load(&self, path: &Path) -> Result<Value> {
        let source = fs::read_to_string(path).map_err(|e| {
            Error::Io(io::Error::new(
                e.kind(),
                format!("failed to read file on path {}: {e}", path.display()),
            ))
        })?;
        Ok(serde_yaml::from_str(&source)?)
    }
}

/// A parsed document and the normalized absolute path it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: PathBuf,
    pub value: Value,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, value: Value) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    /// Directory relative references inside this document resolve against.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}
