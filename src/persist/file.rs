//! File-backed durable namespace.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::DurableNamespace;
use crate::error::{CacheError, Result};

/// Keeps every key in one JSON object on disk.
///
/// The file is loaded once on open; each mutation rewrites it through a
/// temporary file and a rename so a crash never leaves half a document.
/// Keys written by other components sharing the file are preserved.
#[derive(Debug)]
pub struct FileNamespace {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileNamespace {
    /// Opens the namespace at `path`, starting empty if the file is absent.
    ///
    /// # Errors
    /// Fails if the file exists but is not a JSON object of strings; it is
    /// left untouched so unrelated data in it is not lost.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    CacheError::Persistence(format!(
                        "Failed to parse {}: {}",
                        path.display(),
                        e
                    ))
                })?
            }
        } else {
            BTreeMap::new()
        };

        info!(
            "Opened persistent namespace {} with {} keys",
            path.display(),
            entries.len()
        );
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let content = serde_json::to_string(&self.entries)?;
        let temp_path = self.path.with_extension("json.tmp");

        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path)?;

        debug!("Flushed {} keys to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}

impl DurableNamespace for FileNamespace {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, text: &str) -> Result<()> {
        let previous = self.entries.insert(key.to_string(), text.to_string());
        if let Err(err) = self.flush() {
            // Keep memory in step with what is on disk
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if let Some(old) = self.entries.remove(key) {
            if let Err(err) = self.flush() {
                self.entries.insert(key.to_string(), old);
                return Err(err);
            }
        }
        Ok(())
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}
