//! Filesystem document source.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::traits::DocumentSource;
use crate::types::Document;

const TEXT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Loads every `.txt` and `.md` file under a root directory.
///
/// Files are visited in sorted path order so repeated runs over the same
/// tree produce documents in the same order. The document `source` is the
/// path relative to the root.
pub struct FsDocumentSource {
    root: PathBuf,
}

impl FsDocumentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocumentSource for FsDocumentSource {
    fn load(&self) -> Result<Vec<Document>> {
        if !self.root.is_dir() {
            return Err(Error::Source(format!(
                "not a directory: {}",
                self.root.display()
            )));
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            if !has_text_extension(entry.path()) {
                continue;
            }
            let raw = fs::read(entry.path())
                .map_err(|e| Error::Source(format!("read {}: {e}", entry.path().display())))?;
            let raw_text = match String::from_utf8(raw) {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %entry.path().display(), "lossy UTF-8 decode");
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                }
            };
            let source = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .into_owned();
            debug!(source = %source, bytes = raw_text.len(), "loaded document");
            documents.push(Document {
                source,
                raw_text,
                page_metadata: std::collections::HashMap::new(),
            });
        }
        Ok(documents)
    }
}

fn has_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
