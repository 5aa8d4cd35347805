pub mod config;
pub mod grades;
pub mod logging;
pub mod output;
pub mod registry;
pub mod stderr_buffer;
pub mod tui;

use std::path::Path;

use registry::{CourseRegistry, DiskStore, Naming};

/// Open the on-disk registry rooted at `data_dir`
pub fn open_registry(data_dir: &Path, naming: Naming) -> CourseRegistry {
    let store = DiskStore::new(registry::get_store_path(data_dir));
    tracing::debug!(path = %store.path().display(), "opening course store");
    CourseRegistry::open(Box::new(store), naming)
}
