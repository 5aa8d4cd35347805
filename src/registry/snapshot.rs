//! Wire shapes for the export/import document.
//!
//! The stored snapshot serializes [`Course`] directly (ids included). The
//! export document drops ids so that a file can be imported into any
//! registry without clashing.

use serde::{Deserialize, Serialize};

use crate::grades::item::number_or_zero;
use crate::grades::{Course, ScoreItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedCourse {
    /// Missing names fall back to the registry's default course name
    #[serde(default)]
    pub name: Option<String>,
    pub items: Vec<ExportedItem>,
}

/// Item without its id. Missing fields take the same defaults as a new item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedItem {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_max_score", deserialize_with = "number_or_zero")]
    pub max_score: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub weight: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub my_score: f64,
}

fn default_max_score() -> f64 {
    ScoreItem::default().max_score
}

impl From<&Course> for ExportedCourse {
    fn from(course: &Course) -> Self {
        Self {
            name: Some(course.name.clone()),
            items: course.items.iter().map(ExportedItem::from).collect(),
        }
    }
}

impl From<&ScoreItem> for ExportedItem {
    fn from(item: &ScoreItem) -> Self {
        Self {
            name: item.name.clone(),
            max_score: item.max_score,
            weight: item.weight,
            my_score: item.my_score,
        }
    }
}

impl ExportedCourse {
    /// Build a course with fresh ids
    pub fn into_course(self, default_name: &str) -> Course {
        let mut course = Course::new(self.name.unwrap_or_else(|| default_name.to_string()));
        for item in self.items {
            course.add_item(ScoreItem::new(
                item.name,
                item.max_score,
                item.weight,
                item.my_score,
            ));
        }
        course
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_has_no_ids() {
        let mut course = Course::new("Biology");
        course.add_item(ScoreItem::new("Lab", 20.0, 25.0, 18.0));

        let value = serde_json::to_value(ExportedCourse::from(&course)).unwrap();
        assert!(value.get("id").is_none());
        assert!(value["items"][0].get("id").is_none());
        assert_eq!(value["items"][0]["maxScore"], 20.0);
        assert_eq!(value["items"][0]["myScore"], 18.0);
    }

    #[test]
    fn test_missing_item_fields_take_defaults() {
        let json = r#"{"name": "Art", "items": [{"name": "Portfolio"}]}"#;
        let exported: ExportedCourse = serde_json::from_str(json).unwrap();
        let course = exported.into_course("New course");

        assert_eq!(course.name, "Art");
        let item = &course.items[0];
        assert_eq!(item.name, "Portfolio");
        assert_eq!(item.max_score, 100.0);
        assert_eq!(item.weight, 0.0);
        assert_eq!(item.my_score, 0.0);
    }

    #[test]
    fn test_missing_course_name_uses_default() {
        let exported: ExportedCourse = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert_eq!(exported.into_course("New course").name, "New course");
    }

    #[test]
    fn test_null_numbers_import_as_zero() {
        let json = r#"{"name": "Art", "items": [{"name": "Essay", "maxScore": null, "myScore": null}]}"#;
        let exported: ExportedCourse = serde_json::from_str(json).unwrap();
        let item = &exported.into_course("New course").items[0];
        assert_eq!(item.max_score, 0.0);
        assert_eq!(item.my_score, 0.0);
    }

    #[test]
    fn test_missing_items_is_rejected() {
        let result: Result<ExportedCourse, _> = serde_json::from_str(r#"{"name": "Art"}"#);
        assert!(result.is_err());
    }
}
