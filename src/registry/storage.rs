use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Key the course snapshot lives under
pub const SNAPSHOT_KEY: &str = "gradeCourses";

/// Key-value persistence for the full course snapshot.
///
/// Implementations store one opaque JSON string under a fixed key and
/// overwrite it whole on every save.
pub trait SnapshotStore {
    /// Read the stored snapshot. `Ok(None)` means nothing has been saved yet.
    fn read(&self) -> Result<Option<String>>;

    /// Replace the stored snapshot
    fn write(&mut self, snapshot: &str) -> Result<()>;
}

/// Get the default store directory (<data dir>/grade-calc/store)
pub fn get_store_path(data_dir: &Path) -> PathBuf {
    data_dir.join("store")
}

/// Disk store backed by a cacache content-addressed cache.
#[derive(Debug, Clone)]
pub struct DiskStore {
    cache_path: PathBuf,
}

impl DiskStore {
    pub fn new(cache_path: PathBuf) -> Self {
        Self { cache_path }
    }

    pub fn path(&self) -> &Path {
        &self.cache_path
    }
}

impl SnapshotStore for DiskStore {
    fn read(&self) -> Result<Option<String>> {
        match cacache::read_sync(&self.cache_path, SNAPSHOT_KEY) {
            Ok(bytes) => {
                let text = String::from_utf8(bytes).context("Stored snapshot is not valid UTF-8")?;
                Ok(Some(text))
            }
            Err(cacache::Error::EntryNotFound(_, _)) => Ok(None),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to read snapshot from {}", self.cache_path.display())
            }),
        }
    }

    fn write(&mut self, snapshot: &str) -> Result<()> {
        cacache::write_sync(&self.cache_path, SNAPSHOT_KEY, snapshot.as_bytes()).with_context(
            || format!("Failed to save snapshot to {}", self.cache_path.display()),
        )?;
        Ok(())
    }
}

/// Store that keeps the snapshot in memory. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a snapshot already present
    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            value: Some(snapshot.into()),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.value.clone())
    }

    fn write(&mut self, snapshot: &str) -> Result<()> {
        self.value = Some(snapshot.to_string());
        Ok(())
    }
}

/// Write an export document atomically
///
/// Uses atomic-write-file so an interrupted export never leaves a truncated
/// file behind.
pub fn write_export_file(path: &Path, contents: &str) -> Result<()> {
    // The temporary file is created next to the target, which needs a real parent
    let path = &std::path::absolute(path)
        .with_context(|| format!("Invalid export path {}", path.display()))?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write export to {}", path.display()))?;

    file.commit()
        .with_context(|| format!("Failed to save export to {}", path.display()))?;

    tracing::info!(path = %path.display(), "exported courses");
    Ok(())
}

/// Read an import document fully into memory
pub fn read_import_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file at {}", path.display()))
}
