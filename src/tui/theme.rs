//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

/// Theme preference from config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Auto,
    Dark,
    Light,
}

impl Theme {
    /// Unknown values fall back to auto (config validation rejects them first)
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Theme::Dark,
            Some("light") => Theme::Light,
            _ => Theme::Auto,
        }
    }
}

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Score-based colors (traffic light pattern, high is good)
    pub score_high: Color,
    pub score_mid: Color,
    pub score_low: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,
    pub invalid_cell: Color,
    pub computed_cell: Color,

    // Styles
    pub header_style: Style,
    pub row_selected: Style,
    pub cell_selected: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,
    pub warning: Color,

    // Tab colors
    pub tab_active_style: Style,
    pub tab_inactive_style: Style,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            score_high: Color::Green,
            score_mid: Color::Yellow,
            score_low: Color::Red,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            invalid_cell: Color::LightRed,
            computed_cell: Color::Cyan,
            header_style: Style::new().bold(),
            row_selected: Style::new().bg(Color::Indexed(238)),
            cell_selected: Style::new().reversed(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            warning: Color::Yellow,
            tab_active_style: Style::new().fg(Color::Cyan).bold().reversed(),
            tab_inactive_style: Style::new().fg(Color::DarkGray),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
        }
    }

    pub fn light() -> Self {
        Self {
            score_high: Color::Green,
            score_mid: Color::Rgb(176, 120, 0),
            score_low: Color::Red,
            row_alt_bg: Color::Indexed(255),
            index_color: Color::Gray,
            invalid_cell: Color::Red,
            computed_cell: Color::Blue,
            header_style: Style::new().bold(),
            row_selected: Style::new().bg(Color::Indexed(252)),
            cell_selected: Style::new().reversed(),
            muted: Color::DarkGray,
            title_color: Color::Blue,
            warning: Color::Rgb(176, 120, 0),
            tab_active_style: Style::new().fg(Color::Blue).bold().reversed(),
            tab_inactive_style: Style::new().fg(Color::Gray),
            status_bar_bg: Color::Indexed(253),
            status_key_color: Color::Blue,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
        }
    }

    /// Color for a score out of 100
    pub fn score_color(&self, score: f64) -> Color {
        if score >= 80.0 {
            self.score_high
        } else if score >= 60.0 {
            self.score_mid
        } else {
            self.score_low
        }
    }
}

/// Pick a palette. `Auto` asks the terminal for its background luminance
/// and falls back to dark when the terminal does not answer.
pub fn resolve_theme(theme: Theme) -> ThemeColors {
    match theme {
        Theme::Dark => ThemeColors::dark(),
        Theme::Light => ThemeColors::light(),
        Theme::Auto => match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => ThemeColors::light(),
            Ok(_) => ThemeColors::dark(),
            Err(e) => {
                tracing::debug!("terminal background detection failed: {}", e);
                ThemeColors::dark()
            }
        },
    }
}
