use crate::grades::{Course, ItemEdit, ItemField, ScoreItem};
use crate::registry::{self, CourseRegistry};
use crate::tui::theme::ThemeColors;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    EditCell,
    RenameCourse,
    ExportPath,
    ImportPath,
    Help,
}

#[derive(Debug, Clone)]
pub struct Flash {
    pub text: String,
    pub is_error: bool,
    pub shown_at: Instant,
}

pub struct App {
    pub registry: CourseRegistry,
    pub selected_course: usize,
    pub table_state: ratatui::widgets::TableState,
    pub selected_field: ItemField,
    pub input_mode: InputMode,
    pub input: String,
    pub flash_message: Option<Flash>,
    pub flash_duration: Duration,
    pub export_file: String,
    pub last_saved: Option<DateTime<Local>>,
    pub should_quit: bool,
    pub colors: ThemeColors,
}

impl App {
    pub fn new(
        registry: CourseRegistry,
        export_file: String,
        flash_duration: Duration,
        colors: ThemeColors,
    ) -> Self {
        let mut app = Self {
            registry,
            selected_course: 0,
            table_state: ratatui::widgets::TableState::default(),
            selected_field: ItemField::Name,
            input_mode: InputMode::Normal,
            input: String::new(),
            flash_message: None,
            flash_duration,
            export_file,
            last_saved: None,
            should_quit: false,
            colors,
        };
        app.clamp_selection();
        app
    }

    pub fn current_course(&self) -> Option<&Course> {
        self.registry.courses().get(self.selected_course)
    }

    pub fn selected_item(&self) -> Option<&ScoreItem> {
        let course = self.current_course()?;
        self.table_state.selected().and_then(|i| course.items.get(i))
    }

    /// Keep course and row selection inside the current lists
    fn clamp_selection(&mut self) {
        let course_count = self.registry.courses().len();
        if course_count == 0 {
            self.selected_course = 0;
            self.table_state.select(None);
            return;
        }
        if self.selected_course >= course_count {
            self.selected_course = course_count - 1;
        }

        let item_count = self.registry.courses()[self.selected_course].items.len();
        match self.table_state.selected() {
            _ if item_count == 0 => self.table_state.select(None),
            Some(i) if i >= item_count => self.table_state.select(Some(item_count - 1)),
            Some(_) => {}
            None => self.table_state.select(Some(0)),
        }
    }

    fn select_course(&mut self, index: usize) {
        self.selected_course = index;
        self.table_state.select(None);
        self.clamp_selection();
    }

    pub fn next_course(&mut self) {
        let count = self.registry.courses().len();
        if count == 0 {
            return;
        }
        self.select_course((self.selected_course + 1) % count);
    }

    pub fn previous_course(&mut self) {
        let count = self.registry.courses().len();
        if count == 0 {
            return;
        }
        let i = if self.selected_course == 0 {
            count - 1
        } else {
            self.selected_course - 1
        };
        self.select_course(i);
    }

    pub fn next_row(&mut self) {
        let len = self.current_course().map_or(0, |c| c.items.len());
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i < len - 1 => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.current_course().map_or(0, |c| c.items.len());
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn next_field(&mut self) {
        self.selected_field = self.selected_field.next();
    }

    pub fn previous_field(&mut self) {
        self.selected_field = self.selected_field.previous();
    }

    pub fn show_flash(&mut self, text: String) {
        self.flash_message = Some(Flash {
            text,
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    pub fn show_error(&mut self, text: String) {
        self.flash_message = Some(Flash {
            text,
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    pub fn update_flash(&mut self) {
        if let Some(flash) = &self.flash_message {
            if flash.shown_at.elapsed() >= self.flash_duration {
                self.flash_message = None;
            }
        }
    }

    /// Record the outcome of a registry mutation. Returns the value on success.
    fn saved<T>(&mut self, result: anyhow::Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_saved = Some(Local::now());
                Some(value)
            }
            Err(e) => {
                self.show_error(format!("Failed to save: {:#}", e));
                None
            }
        }
    }

    pub fn add_course(&mut self) {
        let result = self.registry.add_course(None);
        if self.saved(result).is_some() {
            let last = self.registry.courses().len() - 1;
            self.select_course(last);
            self.show_flash("Course added".to_string());
        }
        self.clamp_selection();
    }

    pub fn clone_selected_course(&mut self) {
        let Some(id) = self.current_course().map(|c| c.id) else {
            return;
        };
        let result = self.registry.clone_course(id);
        if let Some(Some(_)) = self.saved(result) {
            let last = self.registry.courses().len() - 1;
            self.select_course(last);
            self.show_flash("Course cloned".to_string());
        }
        self.clamp_selection();
    }

    pub fn delete_selected_course(&mut self) {
        let Some((id, name)) = self.current_course().map(|c| (c.id, c.name.clone())) else {
            return;
        };
        let result = self.registry.delete_course(id);
        if let Some(true) = self.saved(result) {
            self.show_flash(format!("Deleted course: {}", name));
        }
        self.table_state.select(None);
        self.clamp_selection();
    }

    pub fn add_item(&mut self) {
        let Some(id) = self.current_course().map(|c| c.id) else {
            return;
        };
        let result = self.registry.add_item(id);
        if let Some(Some(_)) = self.saved(result) {
            let last = self.current_course().map_or(0, |c| c.items.len().saturating_sub(1));
            self.table_state.select(Some(last));
            self.selected_field = ItemField::Name;
        }
        self.clamp_selection();
    }

    pub fn delete_selected_item(&mut self) {
        let (Some(course_id), Some(item_id)) = (
            self.current_course().map(|c| c.id),
            self.selected_item().map(|i| i.id),
        ) else {
            return;
        };
        let result = self.registry.delete_item(course_id, item_id);
        self.saved(result);
        self.clamp_selection();
    }

    /// Open the edit box for the selected cell, prefilled with its value
    pub fn start_edit(&mut self) {
        if let Some(item) = self.selected_item() {
            self.input = item.field_text(self.selected_field);
            self.input_mode = InputMode::EditCell;
        }
    }

    pub fn confirm_edit(&mut self) {
        let (Some(course_id), Some(item_id)) = (
            self.current_course().map(|c| c.id),
            self.selected_item().map(|i| i.id),
        ) else {
            self.cancel_input();
            return;
        };
        let edit = ItemEdit::from_input(self.selected_field, &self.input);
        let result = self.registry.edit_item(course_id, item_id, edit);
        self.saved(result);
        self.cancel_input();
    }

    pub fn start_rename(&mut self) {
        if let Some(course) = self.current_course() {
            self.input = course.name.clone();
            self.input_mode = InputMode::RenameCourse;
        }
    }

    pub fn confirm_rename(&mut self) {
        if let Some(id) = self.current_course().map(|c| c.id) {
            let name = self.input.clone();
            let result = self.registry.rename_course(id, &name);
            self.saved(result);
        }
        self.cancel_input();
    }

    pub fn start_export(&mut self) {
        self.input = self.export_file.clone();
        self.input_mode = InputMode::ExportPath;
    }

    pub fn confirm_export(&mut self) {
        let path = PathBuf::from(self.input.trim());
        self.cancel_input();

        let result = self
            .registry
            .export_to_json()
            .and_then(|json| registry::write_export_file(&path, &json));
        match result {
            Ok(()) => self.show_flash(format!("Exported to {}", path.display())),
            Err(e) => self.show_error(format!("Export failed: {:#}", e)),
        }
    }

    pub fn start_import(&mut self) {
        self.input = self.export_file.clone();
        self.input_mode = InputMode::ImportPath;
    }

    /// Import replaces every course. A failed import leaves them untouched.
    pub fn confirm_import(&mut self) {
        let path = PathBuf::from(self.input.trim());
        self.cancel_input();

        let text = match registry::read_import_file(&path) {
            Ok(text) => text,
            Err(e) => {
                self.show_error(format!("Import failed: {:#}", e));
                return;
            }
        };

        match self.registry.import_from_json(&text) {
            Ok(count) => {
                self.last_saved = Some(Local::now());
                self.select_course(0);
                self.show_flash(format!("Imported {} courses", count));
            }
            Err(e) => self.show_error(format!("Import failed: {}", e)),
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }
}
