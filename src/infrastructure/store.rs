//! JSON persistence for item collections
//!
//! The editor never touches storage; owners such as the CLI load a flat
//! collection, edit it and save it back through an `ItemStore`.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::domain::{Item, TreeItem};
use crate::infrastructure::error::{InfraError, InfraResult};

/// Storage boundary for flat collections.
pub trait ItemStore {
    /// Load the flat collection.
    fn load(&self) -> InfraResult<Vec<Item>>;

    /// Replace the stored collection.
    fn save(&self, items: &[Item]) -> InfraResult<()>;
}

/// Flat collection stored as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ItemStore for JsonFileStore {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> InfraResult<Vec<Item>> {
        read_json(&self.path)
    }

    #[instrument(level = "debug", skip(self, items), fields(path = %self.path.display(), count = items.len()))]
    fn save(&self, items: &[Item]) -> InfraResult<()> {
        write_json(&self.path, items)
    }
}

/// Read a nested tree (items with `children` arrays).
pub fn load_nested(path: &Path) -> InfraResult<Vec<TreeItem>> {
    read_json(path)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> InfraResult<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?;
    serde_json::from_str(&content).map_err(|e| InfraError::json(path.display().to_string(), e))
}

/// Pretty-print `value` to stdout.
pub fn write_json_stdout<T: Serialize + ?Sized>(value: &T) -> InfraResult<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)
        .map_err(|e| InfraError::json("serialize to stdout", e))?;
    writeln!(out).map_err(|e| InfraError::io("write stdout", e))
}

/// Write `value` atomically: temp file in the target directory, then rename.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> InfraResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| InfraError::json(format!("serialize {}", path.display()), e))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| InfraError::io(format!("create temp file in {}", dir.display()), e))?;
    tmp.write_all(json.as_bytes())
        .and_then(|_| tmp.write_all(b"\n"))
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    tmp.persist(path)
        .map_err(|e| InfraError::io(format!("replace {}", path.display()), e.error))?;

    debug!(path = %path.display(), bytes = json.len(), "saved");
    Ok(())
}
