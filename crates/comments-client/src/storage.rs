use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

/// A small persistent key/value store: one pretty-printed JSON file per key
/// inside a directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    /// Opens the store in `<config dir>/comments`.
    pub fn open_default() -> Result<Self> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("comments");
        Self::open(dir)
    }

    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).context("Could not create storage directory")?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }

    /// Returns `None` if the key was never written.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.key_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;

        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Could not parse {}", path.display()))?;

        Ok(Some(value))
    }

    /// Writes to a temporary file in the same directory and renames it over
    /// the key's file, so readers see either the old or the new value.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.key_path(key);
        let contents = serde_json::to_string_pretty(value)
            .with_context(|| format!("Could not serialize {}", key))?;

        let mut temp = NamedTempFile::new_in(&self.dir)
            .context("Could not create temporary storage file")?;
        temp.write_all(contents.as_bytes())
            .with_context(|| format!("Could not write {}", key))?;
        temp.flush()?;
        temp.persist(&path)
            .with_context(|| format!("Could not write {}", path.display()))?;

        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);

        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Could not delete {}", path.display()))?;
        }

        Ok(())
    }
}
