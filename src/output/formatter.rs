use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::grades::{format_number, Course, ScoreItem};
use crate::registry::RegistryStats;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with two decimals ("85.00")
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
pub fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// One line per course: index, total score, weight sum, name.
/// Courses whose weights do not add up to 100 get a trailing warning.
pub fn format_course_table(courses: &[Course], use_colors: bool) -> String {
    if courses.is_empty() {
        return "No courses yet. Add one with `grade-calc add <NAME>`.".to_string();
    }

    let term_width = get_terminal_width();
    // "99." + space + score(7) + two spaces + "w=100.00" + two spaces
    let fixed_width = 3 + 1 + 7 + 2 + 8 + 2;

    courses
        .iter()
        .enumerate()
        .map(|(idx, course)| {
            let total = course.total();
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format!("{:>7}", format_score(total.score));
            let weight_str = format!("w={:<6}", format_number(round2(total.total_weight)));

            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_name(&course.name, width - fixed_width)
                }
                Some(_) => truncate_name(&course.name, 20),
                None => course.name.clone(),
            };

            let warning = if total.is_valid { "" } else { "  (weights != 100%)" };

            if use_colors {
                format!(
                    "{} {}  {}  {}{}",
                    index_str.dimmed(),
                    score_str.bold(),
                    weight_str.dimmed(),
                    name,
                    warning.yellow()
                )
            } else {
                format!(
                    "{} {}  {}  {}{}",
                    index_str, score_str, weight_str, name, warning
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-line detail for one course (for verbose mode)
pub fn format_course_detail(course: &Course, use_colors: bool) -> String {
    let total = course.total();
    let mut lines = Vec::new();

    if use_colors {
        lines.push(format!("{}", course.name.bold()));
    } else {
        lines.push(course.name.clone());
    }

    if course.items.is_empty() {
        lines.push("  (no items)".to_string());
    }

    for item in &course.items {
        lines.push(format!("  {}", format_item_line(item)));
        for error in item.validate() {
            if use_colors {
                lines.push(format!("      {}", error.to_string().red()));
            } else {
                lines.push(format!("      ! {}", error));
            }
        }
    }

    let weight_note = if total.is_valid {
        String::new()
    } else if use_colors {
        format!(" {}", "weights do not add up to 100%".yellow())
    } else {
        " weights do not add up to 100%".to_string()
    };

    lines.push(format!(
        "  Total: {} (weight {}%){}",
        format_score(total.score),
        format_number(round2(total.total_weight)),
        weight_note
    ));

    lines.join("\n")
}

fn format_item_line(item: &ScoreItem) -> String {
    let name = if item.name.trim().is_empty() {
        "(unnamed)".to_string()
    } else {
        item.name.clone()
    };
    format!(
        "{}: {}/{} x {}% -> {}",
        name,
        format_number(item.my_score),
        format_number(item.max_score),
        format_number(item.weight),
        format_score(item.reflected_score())
    )
}

/// Global statistics line
pub fn format_stats(stats: &RegistryStats, use_colors: bool) -> String {
    let text = format!(
        "{} courses, average {}",
        stats.course_count,
        format_score(stats.average_score)
    );
    if use_colors {
        format!("{}", text.dimmed())
    } else {
        text
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
