use crate::grades::{format_number, ItemField};
use crate::output::{format_score, truncate_name};
use crate::tui::app::{App, InputMode};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs};

const TITLE: &str = "Grade Calculator";

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 10 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Tabs(1) + Course header(1) + Table(fill) + Advisory(2) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Length(1), // Course tabs
        Constraint::Length(1), // Course total and weight warning
        Constraint::Fill(1),   // Item table
        Constraint::Length(2), // Validation advisories for the selected item
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    render_course_header(frame, chunks[2], app);
    render_table(frame, chunks[3], app);
    render_advisories(frame, chunks[4], app);
    render_status_bar(frame, chunks[5], app);

    match app.input_mode {
        InputMode::EditCell => {
            let title = format!(" {} ", app.selected_field.label());
            render_input_popup(frame, app, &title, "Enter: save | Esc: cancel");
        }
        InputMode::RenameCourse => {
            render_input_popup(frame, app, " Course name ", "Enter: save | Esc: cancel")
        }
        InputMode::ExportPath => {
            render_input_popup(frame, app, " Export to ", "Enter: export | Esc: cancel")
        }
        InputMode::ImportPath => render_input_popup(
            frame,
            app,
            " Import from ",
            "Enter: import (replaces all courses) | Esc: cancel",
        ),
        InputMode::Help => render_help_popup(frame, app),
        InputMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let stats = app.registry.stats();
    let stats_text = format!(
        "{} courses | average {}",
        stats.course_count,
        format_score(stats.average_score)
    );
    let padding_len = (area.width as usize).saturating_sub(TITLE.len() + stats_text.len());

    let title = Line::from(vec![
        Span::styled(TITLE, Style::default().fg(app.colors.title_color).bold()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(stats_text, Style::default().fg(app.colors.muted)),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let courses = app.registry.courses();
    if courses.is_empty() {
        return;
    }

    let titles: Vec<String> = courses
        .iter()
        .map(|c| {
            let name = if c.name.trim().is_empty() {
                "(untitled)"
            } else {
                c.name.as_str()
            };
            truncate_name(name, 24)
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.selected_course)
        .style(app.colors.tab_inactive_style)
        .highlight_style(app.colors.tab_active_style)
        .divider(" | ");

    frame.render_widget(tabs, area);
}

fn render_course_header(frame: &mut Frame, area: Rect, app: &App) {
    let Some(course) = app.current_course() else {
        return;
    };
    let total = course.total();

    let mut spans = vec![
        Span::styled("Total: ", Style::default().fg(app.colors.muted)),
        Span::styled(
            format_score(total.score),
            Style::default().fg(app.colors.score_color(total.score)).bold(),
        ),
        Span::styled(
            format!("   Weight: {}%", format_number(round2(total.total_weight))),
            Style::default().fg(app.colors.muted),
        ),
    ];

    if !total.is_valid {
        spans.push(Span::styled(
            "   Weights do not add up to 100%",
            Style::default().fg(app.colors.warning),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let Some(course) = app.current_course() else {
        let empty_msg = Paragraph::new("No courses yet. Press n to add one.")
            .alignment(Alignment::Center)
            .block(Block::default());
        frame.render_widget(empty_msg, area);
        return;
    };

    if course.items.is_empty() {
        let empty_msg = Paragraph::new("No items. Press a to add one.")
            .alignment(Alignment::Center)
            .block(Block::default());
        frame.render_widget(empty_msg, area);
        return;
    }

    let colors = &app.colors;
    let selected_row = app.table_state.selected();
    let selected_field = app.selected_field;

    let rows: Vec<Row> = course
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let errors = item.validate();
            let mut cells = vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(colors.index_color)),
            ];

            for field in ItemField::ALL {
                let mut style = Style::default();
                if errors.iter().any(|e| e.field() == field) {
                    style = style.fg(colors.invalid_cell);
                }
                if selected_row == Some(idx) && selected_field == field {
                    style = style.patch(colors.cell_selected);
                }
                let text = match field {
                    ItemField::Name if item.name.is_empty() => "(name)".to_string(),
                    _ => item.field_text(field),
                };
                cells.push(Cell::from(text).style(style));
            }

            let reflected = if errors.is_empty() {
                format_score(item.reflected_score())
            } else {
                "-".to_string()
            };
            cells.push(Cell::from(reflected).style(Style::default().fg(colors.computed_cell)));

            let row_style = if idx % 2 == 1 {
                Style::default().bg(colors.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(cells).style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),  // Index: "99."
        Constraint::Fill(1),    // Name
        Constraint::Length(8),  // Max
        Constraint::Length(11), // Weight
        Constraint::Length(8),  // Score
        Constraint::Length(10), // Reflected
    ];

    let mut header = vec!["#"];
    header.extend(ItemField::ALL.iter().map(|f| f.label()));
    header.push("Reflected");

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(colors.header_style).bottom_margin(1))
        .row_highlight_style(colors.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

/// Advisory text for the selected item's validation errors
fn render_advisories(frame: &mut Frame, area: Rect, app: &App) {
    let Some(item) = app.selected_item() else {
        return;
    };

    let lines: Vec<Line> = item
        .validate()
        .iter()
        .take(area.height as usize)
        .map(|e| {
            Line::from(Span::styled(
                format!("! {}: {}", e.field().label(), e),
                Style::default().fg(app.colors.invalid_cell),
            ))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let text = if let Some(ref flash) = app.flash_message {
        let color = if flash.is_error {
            app.colors.flash_error
        } else {
            app.colors.flash_success
        };
        Line::from(Span::styled(flash.text.clone(), Style::default().fg(color)))
    } else {
        let saved = match app.last_saved {
            Some(at) => format!("saved {}", at.format("%H:%M:%S")),
            None => "no changes".to_string(),
        };

        let hints = [
            ("h/l", ":field "),
            ("j/k", ":row "),
            ("Tab", ":course "),
            ("Enter", ":edit "),
            ("a", ":item "),
            ("n", ":course "),
            ("?", ":help "),
            ("q", ":quit"),
        ];

        let mut spans = vec![
            Span::styled(saved, Style::default().fg(app.colors.muted)),
            Span::raw("  "),
        ];
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(
                *key,
                Style::default().fg(app.colors.status_key_color),
            ));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(app.colors.status_bar_bg)),
        area,
    );
}

/// Single-line text entry popup
fn render_input_popup(frame: &mut Frame, app: &App, title: &str, help: &str) {
    let width = (help.len() as u16 + 4).max(44);
    let popup_area = centered_rect_fixed(width, 4, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(title.to_string(), app.colors.popup_title))
        .border_style(Style::default().fg(app.colors.popup_border));
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Input line
        Constraint::Length(1), // Help text
    ])
    .split(inner);

    frame.render_widget(Paragraph::new(format!("{}|", app.input)), chunks[0]);
    frame.render_widget(
        Paragraph::new(help.to_string()).style(Style::default().fg(app.colors.muted)),
        chunks[1],
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

fn render_help_popup(frame: &mut Frame, app: &App) {
    let shortcuts = [
        ("h / l", "Previous / next field"),
        ("j / k", "Next / previous item"),
        ("Tab / S-Tab", "Next / previous course"),
        ("Enter / e", "Edit selected field"),
        ("a", "Add item"),
        ("d", "Delete item"),
        ("n", "New course"),
        ("r", "Rename course"),
        ("c", "Clone course (scores reset)"),
        ("D", "Delete course"),
        ("x", "Export to JSON"),
        ("i", "Import from JSON"),
        ("q / Ctrl-c", "Quit"),
    ];

    let popup_area = centered_rect_fixed(50, shortcuts.len() as u16 + 4, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", app.colors.popup_title))
        .border_style(Style::default().fg(app.colors.popup_border));
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let key_style = Style::default().fg(app.colors.status_key_color).bold();
    let mut help_lines: Vec<Line> = shortcuts
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{:<14}", key), key_style),
                Span::raw(*action),
            ])
        })
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(app.colors.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CourseRegistry, MemoryStore, Naming};
    use crate::tui::theme::ThemeColors;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Duration;

    fn render_to_string(app: &mut App) -> String {
        let backend = TestBackend::new(90, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn test_app() -> App {
        let registry = CourseRegistry::open(Box::new(MemoryStore::new()), Naming::default());
        App::new(
            registry,
            "grades-export.json".to_string(),
            Duration::from_secs(3),
            ThemeColors::dark(),
        )
    }

    #[test]
    fn test_draw_empty() {
        let mut app = test_app();
        let screen = render_to_string(&mut app);
        assert!(screen.contains("Grade Calculator"));
        assert!(screen.contains("0 courses | average 0.00"));
        assert!(screen.contains("No courses yet"));
    }

    #[test]
    fn test_draw_course_with_warning() {
        let mut app = test_app();
        app.add_course();
        let screen = render_to_string(&mut app);
        assert!(screen.contains("New course"));
        assert!(screen.contains("Weights do not add up to 100%"));
        assert!(screen.contains("Reflected"));
        // Default item has no name yet
        assert!(screen.contains("item name is required"));
    }

    #[test]
    fn test_draw_too_small() {
        let mut app = test_app();
        let backend = TestBackend::new(20, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Terminal too small"));
    }
}
