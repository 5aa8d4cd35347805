pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(event::TICK_RATE);

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => app.update_flash(),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => match key.code {
            // Quit
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.should_quit = true
            }

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            KeyCode::Char('l') | KeyCode::Right => app.next_field(),
            KeyCode::Char('h') | KeyCode::Left => app.previous_field(),
            KeyCode::Tab => app.next_course(),
            KeyCode::BackTab => app.previous_course(),

            // Items
            KeyCode::Enter | KeyCode::Char('e') => app.start_edit(),
            KeyCode::Char('a') => app.add_item(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected_item(),

            // Courses
            KeyCode::Char('n') => app.add_course(),
            KeyCode::Char('r') => app.start_rename(),
            KeyCode::Char('c') => app.clone_selected_course(),
            KeyCode::Char('D') => app.delete_selected_course(),

            // Export / import
            KeyCode::Char('x') => app.start_export(),
            KeyCode::Char('i') => app.start_import(),

            KeyCode::Char('?') => app.show_help(),

            _ => {}
        },
        app::InputMode::EditCell
        | app::InputMode::RenameCourse
        | app::InputMode::ExportPath
        | app::InputMode::ImportPath => match key.code {
            KeyCode::Enter => match app.input_mode {
                app::InputMode::EditCell => app.confirm_edit(),
                app::InputMode::RenameCourse => app.confirm_rename(),
                app::InputMode::ExportPath => app.confirm_export(),
                app::InputMode::ImportPath => app.confirm_import(),
                _ => {}
            },
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.input.push(c);
            }
            // Ignore all other keys (don't propagate to Normal mode)
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}
