use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::{ItemId, ScoreItem};

pub type CourseId = Uuid;

/// Weight sum a complete course should reach
pub const FULL_WEIGHT: f64 = 100.0;

/// Allowed drift from [`FULL_WEIGHT`] before the weight warning shows
pub const WEIGHT_TOLERANCE: f64 = 0.01;

/// Aggregate of a course's valid items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseTotal {
    /// Sum of reflected scores
    pub score: f64,
    /// Sum of weights
    pub total_weight: f64,
    /// Weights add up to 100 within tolerance. Advisory only.
    pub is_valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub items: Vec<ScoreItem>,
}

impl Course {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Sum weights and reflected scores over items with no validation errors.
    /// Invalid items are left out entirely, not counted as zero weight.
    pub fn total(&self) -> CourseTotal {
        let (score, total_weight) = self
            .items
            .iter()
            .filter(|item| item.is_valid())
            .fold((0.0, 0.0), |(score, weight), item| {
                (score + item.reflected_score(), weight + item.weight)
            });

        CourseTotal {
            score,
            total_weight,
            is_valid: (total_weight - FULL_WEIGHT).abs() < WEIGHT_TOLERANCE,
        }
    }

    /// Append an item and hand it back for further edits
    pub fn add_item(&mut self, item: ScoreItem) -> &mut ScoreItem {
        self.items.push(item);
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub fn add_default_item(&mut self) -> &mut ScoreItem {
        self.add_item(ScoreItem::default())
    }

    /// Remove an item by id. Returns false if no such item exists.
    pub fn delete_item(&mut self, item_id: ItemId) -> bool {
        match self.position_of(item_id) {
            Some(pos) => {
                self.items.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn position_of(&self, item_id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == item_id)
    }

    pub fn item(&self, item_id: ItemId) -> Option<&ScoreItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: ItemId) -> Option<&mut ScoreItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }

    /// Copy of this course with fresh ids, a suffixed name and every score
    /// reset to 0. Names, max scores and weights carry over.
    pub fn blank_copy(&self, suffix: &str) -> Course {
        let mut copy = Course::new(format!("{}{}", self.name, suffix));
        for item in &self.items {
            copy.add_item(ScoreItem::new(
                item.name.clone(),
                item.max_score,
                item.weight,
                0.0,
            ));
        }
        copy
    }
}
