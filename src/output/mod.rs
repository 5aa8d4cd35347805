pub mod formatter;

pub use formatter::{
    format_course_detail, format_course_table, format_score, format_stats, should_use_colors,
    truncate_name,
};
