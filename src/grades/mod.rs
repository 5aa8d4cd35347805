pub mod course;
pub mod item;

pub use course::{Course, CourseId, CourseTotal, FULL_WEIGHT, WEIGHT_TOLERANCE};
pub use item::{format_number, ItemEdit, ItemError, ItemField, ItemId, ScoreItem};
