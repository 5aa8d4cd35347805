pub mod snapshot;
pub mod storage;

pub use snapshot::{ExportedCourse, ExportedItem};
pub use storage::{
    get_store_path, read_import_file, write_export_file, DiskStore, MemoryStore, SnapshotStore,
    SNAPSHOT_KEY,
};

use anyhow::{Context, Result};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use crate::grades::{Course, CourseId, ItemEdit, ItemId};

pub const DEFAULT_COURSE_NAME: &str = "New course";
pub const DEFAULT_CLONE_SUFFIX: &str = " (copy)";

/// Why an import was rejected. The registry is unchanged in every case.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid import data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to save imported data: {0:#}")]
    Save(anyhow::Error),
}

/// Cross-course statistics
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegistryStats {
    pub course_count: usize,
    /// Mean of every course's total score, 0.0 with no courses
    pub average_score: f64,
}

/// Naming used when the registry creates courses on its own
#[derive(Debug, Clone)]
pub struct Naming {
    pub default_course_name: String,
    pub clone_suffix: String,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            default_course_name: DEFAULT_COURSE_NAME.to_string(),
            clone_suffix: DEFAULT_CLONE_SUFFIX.to_string(),
        }
    }
}

/// Owns every course and keeps the persisted snapshot in sync with it.
///
/// Each mutating call saves the full snapshot and recomputes
/// [`RegistryStats`]. Unknown ids are silent no-ops.
pub struct CourseRegistry {
    courses: Vec<Course>,
    stats: RegistryStats,
    store: Box<dyn SnapshotStore>,
    naming: Naming,
}

impl CourseRegistry {
    /// Load the persisted snapshot, or start empty if there is none or it
    /// cannot be read.
    pub fn open(store: Box<dyn SnapshotStore>, naming: Naming) -> Self {
        let mut registry = Self {
            courses: Vec::new(),
            stats: RegistryStats::default(),
            store,
            naming,
        };
        registry.load_courses();
        registry.update_total_stats();
        registry
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn stats(&self) -> RegistryStats {
        self.stats
    }

    pub fn naming(&self) -> &Naming {
        &self.naming
    }

    pub fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    /// Apply `change` to a copy of the course list, save the copy, and only
    /// then make it current. A failed save leaves courses and stats as they
    /// were.
    fn commit<T>(&mut self, change: impl FnOnce(&mut Vec<Course>) -> T) -> Result<T> {
        let mut candidate = self.courses.clone();
        let outcome = change(&mut candidate);
        self.write_snapshot(&candidate)?;
        self.courses = candidate;
        self.update_total_stats();
        Ok(outcome)
    }

    /// Create a course with one default item already in it
    pub fn add_course(&mut self, name: Option<&str>) -> Result<CourseId> {
        let name = name
            .unwrap_or(self.naming.default_course_name.as_str())
            .to_string();
        let mut course = Course::new(name);
        course.add_default_item();
        let id = course.id;

        self.commit(|courses| courses.push(course))?;
        Ok(id)
    }

    /// Append a copy of a course with every score reset to 0
    pub fn clone_course(&mut self, id: CourseId) -> Result<Option<CourseId>> {
        let copy = match self.course(id) {
            Some(course) => course.blank_copy(&self.naming.clone_suffix),
            None => return Ok(None),
        };
        let new_id = copy.id;

        self.commit(|courses| courses.push(copy))?;
        Ok(Some(new_id))
    }

    /// Returns false if no course had this id
    pub fn delete_course(&mut self, id: CourseId) -> Result<bool> {
        let Some(pos) = self.courses.iter().position(|c| c.id == id) else {
            return Ok(false);
        };

        self.commit(|courses| {
            courses.remove(pos);
        })?;
        Ok(true)
    }

    pub fn rename_course(&mut self, id: CourseId, name: &str) -> Result<bool> {
        if self.course(id).is_none() {
            return Ok(false);
        }

        self.commit(|courses| {
            if let Some(course) = find_course_mut(courses, id) {
                course.name = name.to_string();
            }
        })?;
        Ok(true)
    }

    /// Append a default item to a course
    pub fn add_item(&mut self, course_id: CourseId) -> Result<Option<ItemId>> {
        if self.course(course_id).is_none() {
            return Ok(None);
        }

        self.commit(|courses| {
            find_course_mut(courses, course_id).map(|c| c.add_default_item().id)
        })
    }

    /// Assign one field of an item. Values are stored as given; validity is
    /// evaluated when totals are read.
    pub fn edit_item(
        &mut self,
        course_id: CourseId,
        item_id: ItemId,
        edit: ItemEdit,
    ) -> Result<bool> {
        if self.course(course_id).and_then(|c| c.item(item_id)).is_none() {
            return Ok(false);
        }

        self.commit(|courses| {
            match find_course_mut(courses, course_id).and_then(|c| c.item_mut(item_id)) {
                Some(item) => {
                    item.set_field(edit);
                    true
                }
                None => false,
            }
        })
    }

    /// Returns false if either id is unknown
    pub fn delete_item(&mut self, course_id: CourseId, item_id: ItemId) -> Result<bool> {
        if self.course(course_id).and_then(|c| c.item(item_id)).is_none() {
            return Ok(false);
        }

        self.commit(|courses| {
            find_course_mut(courses, course_id).is_some_and(|c| c.delete_item(item_id))
        })
    }

    /// Refresh statistics and persist after an item inside `course_id`
    /// changed in place
    pub fn update_course(&mut self, course_id: CourseId) -> Result<()> {
        if self.course(course_id).is_none() {
            return Ok(());
        }
        self.update_total_stats();
        self.save_courses()
    }

    pub fn update_total_stats(&mut self) {
        let course_count = self.courses.len();
        let average_score = if course_count == 0 {
            0.0
        } else {
            let sum: f64 = self.courses.iter().map(|c| c.total().score).sum();
            sum / course_count as f64
        };
        self.stats = RegistryStats {
            course_count,
            average_score,
        };
    }

    /// Write the full snapshot (ids included) to the store
    pub fn save_courses(&mut self) -> Result<()> {
        let courses = std::mem::take(&mut self.courses);
        let result = self.write_snapshot(&courses);
        self.courses = courses;
        result
    }

    fn write_snapshot(&mut self, courses: &[Course]) -> Result<()> {
        let snapshot = serde_json::to_string(courses).context("Failed to serialize courses")?;
        self.store.write(&snapshot)?;
        tracing::debug!(courses = courses.len(), "saved course snapshot");
        Ok(())
    }

    /// Replace the in-memory courses with the stored snapshot.
    ///
    /// Unreadable or malformed data is logged and leaves the registry empty.
    pub fn load_courses(&mut self) {
        self.courses = match self.read_snapshot() {
            Ok(Some(mut courses)) => {
                reissue_duplicate_ids(&mut courses);
                tracing::debug!(courses = courses.len(), "loaded course snapshot");
                courses
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load saved courses, starting empty: {:#}", e);
                Vec::new()
            }
        };
    }

    fn read_snapshot(&self) -> Result<Option<Vec<Course>>> {
        let Some(text) = self.store.read()? else {
            return Ok(None);
        };
        let courses = serde_json::from_str(&text).context("Stored snapshot is malformed")?;
        Ok(Some(courses))
    }

    /// Pretty-printed export document without ids
    pub fn export_to_json(&self) -> Result<String> {
        let exported: Vec<ExportedCourse> = self.courses.iter().map(ExportedCourse::from).collect();
        serde_json::to_string_pretty(&exported).context("Failed to serialize export")
    }

    /// Replace every course with the contents of an export document.
    ///
    /// The document is parsed and saved before anything in memory changes,
    /// so a failure leaves the registry exactly as it was. Returns the number
    /// of imported courses.
    pub fn import_from_json(&mut self, text: &str) -> Result<usize, ImportError> {
        let exported: Vec<ExportedCourse> = serde_json::from_str(text)?;
        let courses: Vec<Course> = exported
            .into_iter()
            .map(|c| c.into_course(&self.naming.default_course_name))
            .collect();

        self.write_snapshot(&courses).map_err(ImportError::Save)?;

        self.courses = courses;
        self.update_total_stats();
        tracing::info!(courses = self.courses.len(), "imported courses");
        Ok(self.courses.len())
    }
}

fn find_course_mut(courses: &mut [Course], id: CourseId) -> Option<&mut Course> {
    courses.iter_mut().find(|c| c.id == id)
}

/// Give fresh ids to courses and items whose id was already seen in the
/// same container.
fn reissue_duplicate_ids(courses: &mut [Course]) {
    let mut course_ids = HashSet::new();
    for course in courses.iter_mut() {
        if !course_ids.insert(course.id) {
            tracing::warn!(course = %course.name, "duplicate course id in snapshot, reissuing");
            course.id = Uuid::new_v4();
            course_ids.insert(course.id);
        }

        let mut item_ids = HashSet::new();
        for item in course.items.iter_mut() {
            if !item_ids.insert(item.id) {
                tracing::warn!(item = %item.name, "duplicate item id in snapshot, reissuing");
                item.id = Uuid::new_v4();
                item_ids.insert(item.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grades::{ItemField, ScoreItem};

    /// Store whose writes always fail
    #[derive(Default)]
    struct BrokenStore {
        snapshot: Option<String>,
    }

    impl SnapshotStore for BrokenStore {
        fn read(&self) -> Result<Option<String>> {
            Ok(self.snapshot.clone())
        }

        fn write(&mut self, _snapshot: &str) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    fn empty_registry() -> CourseRegistry {
        CourseRegistry::open(Box::new(MemoryStore::new()), Naming::default())
    }

    fn stored_courses(registry: &CourseRegistry) -> Vec<Course> {
        let text = registry.store().read().unwrap().unwrap();
        serde_json::from_str(&text).unwrap()
    }

    /// Add a course holding exactly the given items
    fn add_course_with(
        registry: &mut CourseRegistry,
        name: &str,
        items: &[(&str, f64, f64, f64)],
    ) -> CourseId {
        let id = registry.add_course(Some(name)).unwrap();
        let placeholder = registry.course(id).unwrap().items[0].id;
        registry.delete_item(id, placeholder).unwrap();
        for (name, max, weight, mine) in items {
            let item_id = registry.add_item(id).unwrap().unwrap();
            registry.edit_item(id, item_id, ItemEdit::Name(name.to_string())).unwrap();
            registry.edit_item(id, item_id, ItemEdit::MaxScore(*max)).unwrap();
            registry.edit_item(id, item_id, ItemEdit::Weight(*weight)).unwrap();
            registry.edit_item(id, item_id, ItemEdit::MyScore(*mine)).unwrap();
        }
        id
    }

    #[test]
    fn test_open_empty_store() {
        let registry = empty_registry();
        assert!(registry.courses().is_empty());
        assert_eq!(registry.stats(), RegistryStats { course_count: 0, average_score: 0.0 });
    }

    #[test]
    fn test_add_course_has_default_item_and_persists() {
        let mut registry = empty_registry();
        let id = registry.add_course(None).unwrap();

        let course = registry.course(id).unwrap();
        assert_eq!(course.name, DEFAULT_COURSE_NAME);
        assert_eq!(course.items.len(), 1);
        assert_eq!(registry.stats().course_count, 1);

        let stored = stored_courses(&registry);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
    }

    #[test]
    fn test_average_of_course_totals() {
        let mut registry = empty_registry();
        add_course_with(&mut registry, "Math", &[("Final", 100.0, 100.0, 80.0)]);
        add_course_with(&mut registry, "Chemistry", &[("Final", 100.0, 100.0, 90.0)]);

        let stats = registry.stats();
        assert_eq!(stats.course_count, 2);
        assert!((stats.average_score - 85.0).abs() < 1e-9);
    }

    #[test]
    fn test_clone_course_resets_scores() {
        let mut registry = empty_registry();
        let id = add_course_with(&mut registry, "Math", &[("Quiz", 10.0, 20.0, 8.0)]);

        let copy_id = registry.clone_course(id).unwrap().unwrap();
        let copy = registry.course(copy_id).unwrap();
        assert_eq!(copy.name, "Math (copy)");
        assert_eq!(copy.items[0].name, "Quiz");
        assert_eq!(copy.items[0].max_score, 10.0);
        assert_eq!(copy.items[0].weight, 20.0);
        assert_eq!(copy.items[0].my_score, 0.0);

        assert_eq!(registry.course(id).unwrap().items[0].my_score, 8.0);
        assert_eq!(stored_courses(&registry).len(), 2);
    }

    #[test]
    fn test_clone_missing_course_is_noop() {
        let mut registry = empty_registry();
        assert_eq!(registry.clone_course(Uuid::new_v4()).unwrap(), None);
        assert!(registry.courses().is_empty());
    }

    #[test]
    fn test_delete_course() {
        let mut registry = empty_registry();
        let keep = registry.add_course(Some("Keep")).unwrap();
        let gone = registry.add_course(Some("Drop")).unwrap();

        assert!(registry.delete_course(gone).unwrap());
        assert!(!registry.delete_course(gone).unwrap());
        assert_eq!(registry.courses().len(), 1);
        assert_eq!(registry.courses()[0].id, keep);
        assert_eq!(registry.stats().course_count, 1);
        assert_eq!(stored_courses(&registry).len(), 1);
    }

    #[test]
    fn test_delete_item_unknown_ids() {
        let mut registry = empty_registry();
        let id = registry.add_course(None).unwrap();
        assert!(!registry.delete_item(id, Uuid::new_v4()).unwrap());
        assert!(!registry.delete_item(Uuid::new_v4(), Uuid::new_v4()).unwrap());
        assert_eq!(registry.course(id).unwrap().items.len(), 1);
    }

    #[test]
    fn test_edit_item_updates_stats_and_snapshot() {
        let mut registry = empty_registry();
        let id = add_course_with(&mut registry, "Math", &[("Final", 50.0, 100.0, 25.0)]);
        assert!((registry.stats().average_score - 50.0).abs() < 1e-9);

        let item_id = registry.course(id).unwrap().items[0].id;
        let edit = ItemEdit::from_input(ItemField::MyScore, "40");
        assert!(registry.edit_item(id, item_id, edit).unwrap());
        assert!((registry.stats().average_score - 80.0).abs() < 1e-9);
        assert_eq!(stored_courses(&registry)[0].items[0].my_score, 40.0);
    }

    #[test]
    fn test_rename_course() {
        let mut registry = empty_registry();
        let id = registry.add_course(None).unwrap();
        assert!(registry.rename_course(id, "Statistics").unwrap());
        assert_eq!(stored_courses(&registry)[0].name, "Statistics");
    }

    #[test]
    fn test_load_round_trips_ids() {
        let mut registry = empty_registry();
        let id = add_course_with(&mut registry, "Math", &[("Quiz", 10.0, 20.0, 8.0)]);
        let snapshot = registry.store().read().unwrap().unwrap();

        let store = MemoryStore::with_snapshot(snapshot);
        let reloaded = CourseRegistry::open(Box::new(store), Naming::default());
        assert_eq!(reloaded.courses(), registry.courses());
        assert_eq!(reloaded.courses()[0].id, id);
        assert_eq!(reloaded.stats(), registry.stats());
    }

    #[test]
    fn test_load_malformed_snapshot_starts_empty() {
        let store = MemoryStore::with_snapshot("{not json");
        let registry = CourseRegistry::open(Box::new(store), Naming::default());
        assert!(registry.courses().is_empty());
        assert_eq!(registry.stats().average_score, 0.0);
    }

    #[test]
    fn test_load_reissues_duplicate_ids() {
        let mut course = Course::new("Math");
        course.add_item(ScoreItem::new("A", 10.0, 50.0, 5.0));
        course.add_item(ScoreItem::new("B", 10.0, 50.0, 5.0));
        course.items[1].id = course.items[0].id;
        let twin = course.clone();

        let snapshot = serde_json::to_string(&vec![course, twin]).unwrap();
        let store = MemoryStore::with_snapshot(snapshot);
        let registry = CourseRegistry::open(Box::new(store), Naming::default());

        let courses = registry.courses();
        assert_eq!(courses.len(), 2);
        assert_ne!(courses[0].id, courses[1].id);
        assert_ne!(courses[0].items[0].id, courses[0].items[1].id);
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut registry = empty_registry();
        add_course_with(
            &mut registry,
            "Math",
            &[("Quiz", 10.0, 20.0, 8.0), ("Final", 100.0, 80.0, 72.5)],
        );
        add_course_with(&mut registry, "Art", &[("Portfolio", 50.0, 100.0, 45.0)]);
        let exported = registry.export_to_json().unwrap();
        assert!(!exported.contains("\"id\""));
        assert!(exported.contains('\n'));

        let mut other = empty_registry();
        other.add_course(Some("Old")).unwrap();
        assert_eq!(other.import_from_json(&exported).unwrap(), 2);

        let visible = |r: &CourseRegistry| -> Vec<ExportedCourse> {
            r.courses().iter().map(ExportedCourse::from).collect()
        };
        assert_eq!(visible(&other), visible(&registry));
        assert_eq!(other.stats(), registry.stats());
        assert_eq!(stored_courses(&other).len(), 2);
    }

    #[test]
    fn test_import_malformed_keeps_state() {
        let mut registry = empty_registry();
        let id = registry.add_course(Some("Math")).unwrap();
        let before = registry.store().read().unwrap();

        let result = registry.import_from_json("{not json");
        assert!(matches!(result, Err(ImportError::Parse(_))));
        assert_eq!(registry.courses().len(), 1);
        assert_eq!(registry.courses()[0].id, id);
        assert_eq!(registry.store().read().unwrap(), before);
    }

    #[test]
    fn test_import_wrong_shape_keeps_state() {
        let mut registry = empty_registry();
        registry.add_course(Some("Math")).unwrap();

        // Second course is missing its items: nothing gets applied
        let text = r#"[{"name": "A", "items": []}, {"name": "B"}]"#;
        assert!(registry.import_from_json(text).is_err());
        assert!(registry.import_from_json(r#"{"name": "A"}"#).is_err());
        assert_eq!(registry.courses().len(), 1);
        assert_eq!(registry.courses()[0].name, "Math");
    }

    /// Registry over a failing store, seeded with one course holding a
    /// scored item
    fn broken_registry() -> CourseRegistry {
        let mut seed = empty_registry();
        add_course_with(&mut seed, "Math", &[("Final", 100.0, 100.0, 70.0)]);
        let store = BrokenStore {
            snapshot: seed.store().read().unwrap(),
        };
        CourseRegistry::open(Box::new(store), Naming::default())
    }

    fn assert_stats_match(registry: &CourseRegistry) {
        let stats = registry.stats();
        assert_eq!(stats.course_count, registry.courses().len());
        let expected = registry.courses()[0].total().score;
        assert!((stats.average_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_failed_save_leaves_courses_and_stats_unchanged() {
        let mut registry = broken_registry();
        let before = registry.courses().to_vec();
        let course_id = before[0].id;
        let item_id = before[0].items[0].id;

        assert!(registry.add_course(Some("Physics")).is_err());
        assert!(registry.clone_course(course_id).is_err());
        assert!(registry.rename_course(course_id, "Algebra").is_err());
        assert!(registry.add_item(course_id).is_err());
        assert!(registry
            .edit_item(course_id, item_id, ItemEdit::MyScore(90.0))
            .is_err());
        assert!(registry.delete_item(course_id, item_id).is_err());
        assert!(registry.delete_course(course_id).is_err());

        assert_eq!(registry.courses(), &before[..]);
        assert_stats_match(&registry);
        assert!((registry.stats().average_score - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_import_save_failure_keeps_state() {
        let mut registry = broken_registry();

        let result = registry.import_from_json(r#"[{"name": "A", "items": []}]"#);
        assert!(matches!(result, Err(ImportError::Save(_))));
        assert_eq!(registry.courses().len(), 1);
        assert_eq!(registry.courses()[0].name, "Math");
        assert_stats_match(&registry);
    }

    #[test]
    fn test_empty_failing_store_stays_empty() {
        let store = Box::new(BrokenStore::default());
        let mut registry = CourseRegistry::open(store, Naming::default());
        assert!(registry.add_course(Some("Math")).is_err());
        assert!(registry.courses().is_empty());
        assert_eq!(registry.stats().course_count, 0);
    }

    #[test]
    fn test_non_finite_input_survives_reload_and_export() {
        let mut registry = empty_registry();
        let id = add_course_with(&mut registry, "Math", &[("Final", 100.0, 100.0, 70.0)]);
        registry.add_course(Some("Art")).unwrap();
        let item_id = registry.course(id).unwrap().items[0].id;

        let edit = ItemEdit::from_input(ItemField::MyScore, "inf");
        assert!(registry.edit_item(id, item_id, edit).unwrap());
        assert_eq!(registry.course(id).unwrap().items[0].my_score, 0.0);

        let snapshot = registry.store().read().unwrap().unwrap();
        assert!(!snapshot.contains("null"));
        let reloaded =
            CourseRegistry::open(Box::new(MemoryStore::with_snapshot(snapshot)), Naming::default());
        assert_eq!(reloaded.courses(), registry.courses());

        let exported = registry.export_to_json().unwrap();
        let mut other = empty_registry();
        assert_eq!(other.import_from_json(&exported).unwrap(), 2);
    }

    #[test]
    fn test_snapshot_with_null_number_still_loads() {
        let mut registry = empty_registry();
        add_course_with(&mut registry, "Math", &[("Final", 100.0, 100.0, 70.0)]);
        registry.add_course(Some("Art")).unwrap();
        let snapshot = registry
            .store()
            .read()
            .unwrap()
            .unwrap()
            .replace("\"myScore\":70.0", "\"myScore\":null");
        assert!(snapshot.contains("null"));

        let reloaded =
            CourseRegistry::open(Box::new(MemoryStore::with_snapshot(snapshot)), Naming::default());
        assert_eq!(reloaded.courses().len(), 2);
        assert_eq!(reloaded.courses()[0].items[0].my_score, 0.0);
    }

    #[test]
    fn test_custom_naming() {
        let naming = Naming {
            default_course_name: "Untitled".to_string(),
            clone_suffix: " #2".to_string(),
        };
        let mut registry = CourseRegistry::open(Box::new(MemoryStore::new()), naming);
        let id = registry.add_course(None).unwrap();
        let copy = registry.clone_course(id).unwrap().unwrap();
        assert_eq!(registry.course(copy).unwrap().name, "Untitled #2");

        registry.import_from_json(r#"[{"items": []}]"#).unwrap();
        assert_eq!(registry.courses()[0].name, "Untitled");
    }
}
