use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type ItemId = Uuid;

/// Editable fields of a score item, in table column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Name,
    MaxScore,
    Weight,
    MyScore,
}

impl ItemField {
    pub const ALL: [ItemField; 4] = [
        ItemField::Name,
        ItemField::MaxScore,
        ItemField::Weight,
        ItemField::MyScore,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ItemField::Name => "Name",
            ItemField::MaxScore => "Max",
            ItemField::Weight => "Weight (%)",
            ItemField::MyScore => "Score",
        }
    }

    pub fn next(&self) -> ItemField {
        match self {
            ItemField::Name => ItemField::MaxScore,
            ItemField::MaxScore => ItemField::Weight,
            ItemField::Weight => ItemField::MyScore,
            ItemField::MyScore => ItemField::Name,
        }
    }

    pub fn previous(&self) -> ItemField {
        match self {
            ItemField::Name => ItemField::MyScore,
            ItemField::MaxScore => ItemField::Name,
            ItemField::Weight => ItemField::MaxScore,
            ItemField::MyScore => ItemField::Weight,
        }
    }
}

/// A violated item constraint. These are advisory: they never block editing,
/// they only exclude the item from its course totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("item name is required")]
    EmptyName,
    #[error("max score must be at least 1")]
    MaxScoreTooSmall,
    #[error("weight must be 0 or more")]
    NegativeWeight,
    #[error("score must be between 0 and the max score")]
    ScoreOutOfRange,
}

impl ItemError {
    /// The field this error should be shown next to
    pub fn field(&self) -> ItemField {
        match self {
            ItemError::EmptyName => ItemField::Name,
            ItemError::MaxScoreTooSmall => ItemField::MaxScore,
            ItemError::NegativeWeight => ItemField::Weight,
            ItemError::ScoreOutOfRange => ItemField::MyScore,
        }
    }
}

/// A single scored entry in a course (an exam, a quiz, homework...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreItem {
    pub id: ItemId,
    pub name: String,
    #[serde(deserialize_with = "number_or_zero")]
    pub max_score: f64,
    /// Percentage points this item counts toward the course total
    #[serde(deserialize_with = "number_or_zero")]
    pub weight: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub my_score: f64,
}

impl Default for ScoreItem {
    fn default() -> Self {
        Self::new("", 100.0, 0.0, 0.0)
    }
}

impl ScoreItem {
    pub fn new(name: impl Into<String>, max_score: f64, weight: f64, my_score: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            max_score,
            weight,
            my_score,
        }
    }

    /// Collect every violated constraint. Empty means the item takes part in
    /// aggregation.
    pub fn validate(&self) -> Vec<ItemError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(ItemError::EmptyName);
        }

        // NaN fails every comparison, so these also reject non-finite input
        if !(self.max_score >= 1.0 && self.max_score.is_finite()) {
            errors.push(ItemError::MaxScoreTooSmall);
        }

        if !(self.weight >= 0.0 && self.weight.is_finite()) {
            errors.push(ItemError::NegativeWeight);
        }

        if !(self.my_score >= 0.0 && self.my_score <= self.max_score) {
            errors.push(ItemError::ScoreOutOfRange);
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Contribution of this item to its course total:
    /// `(my_score / max_score) * weight`, or 0 when the ratio is undefined
    /// or the score is out of range.
    pub fn reflected_score(&self) -> f64 {
        if !(self.max_score > 0.0) || !(self.my_score >= 0.0 && self.my_score <= self.max_score) {
            return 0.0;
        }
        (self.my_score / self.max_score) * self.weight
    }

    /// Assign one field. NaN and infinity are stored as 0 so the snapshot
    /// always holds plain JSON numbers.
    pub fn set_field(&mut self, edit: ItemEdit) {
        match edit {
            ItemEdit::Name(name) => self.name = name,
            ItemEdit::MaxScore(v) => self.max_score = finite_or_zero(v),
            ItemEdit::Weight(v) => self.weight = finite_or_zero(v),
            ItemEdit::MyScore(v) => self.my_score = finite_or_zero(v),
        }
    }

    /// Current value of a field as the text shown in an edit box
    pub fn field_text(&self, field: ItemField) -> String {
        match field {
            ItemField::Name => self.name.clone(),
            ItemField::MaxScore => format_number(self.max_score),
            ItemField::Weight => format_number(self.weight),
            ItemField::MyScore => format_number(self.my_score),
        }
    }

    /// Errors that belong to one field
    pub fn field_errors(&self, field: ItemField) -> Vec<ItemError> {
        self.validate()
            .into_iter()
            .filter(|e| e.field() == field)
            .collect()
    }
}

/// A single field assignment. No cross-field checks happen at write time.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEdit {
    Name(String),
    MaxScore(f64),
    Weight(f64),
    MyScore(f64),
}

impl ItemEdit {
    /// Build an edit from raw text typed into a field. Numeric text that does
    /// not parse to a finite number ("abc", "inf", "NaN") becomes 0.
    pub fn from_input(field: ItemField, input: &str) -> Self {
        let number = || input.trim().parse::<f64>().map_or(0.0, finite_or_zero);
        match field {
            ItemField::Name => ItemEdit::Name(input.to_string()),
            ItemField::MaxScore => ItemEdit::MaxScore(number()),
            ItemField::Weight => ItemEdit::Weight(number()),
            ItemField::MyScore => ItemEdit::MyScore(number()),
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Read a number field, taking `null` as 0.
///
/// serde_json writes NaN and infinity as `null`, so documents saved by older
/// builds may contain it. One such value must not make the whole list
/// unreadable.
pub(crate) fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map_or(0.0, finite_or_zero))
}

/// Format a number without a trailing ".0" for whole values
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
