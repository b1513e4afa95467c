//! Keyboard and input event handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::App;

/// Process a key event and update the application state.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> anyhow::Result<()> {
    // ── Popup handling (captures all keys) ────────────────
    if app.show_help {
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => app.show_help = false,
            _ => {}
        }
        return Ok(());
    }

    if let (KeyModifiers::CONTROL, KeyCode::Char('c')) = (key.modifiers, key.code) {
        app.should_quit = true;
        return Ok(());
    }

    let last = app.message_count().saturating_sub(1);
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,

        // ── Navigation ───────────────────────────────────────
        KeyCode::Char('j') | KeyCode::Down => {
            if app.selected < last {
                app.select_message(app.selected + 1);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.selected > 0 {
                app.select_message(app.selected - 1);
            }
        }
        KeyCode::Char('g') | KeyCode::Home => app.select_message(0),
        KeyCode::Char('G') | KeyCode::End => app.select_message(last),
        KeyCode::PageDown => {
            let page = app.visible_range().len().max(1);
            app.select_message((app.selected + page).min(last));
        }
        KeyCode::PageUp => {
            let page = app.visible_range().len().max(1);
            app.select_message(app.selected.saturating_sub(page));
        }

        // ── Countdown ────────────────────────────────────────
        KeyCode::Char('s') => app.stop_selected_timer(),
        KeyCode::Char('r') => app.restart_selected_timer(),

        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellOptions;
    use crate::store::sample_conversation;
    use crate::timer::clock::ManualClock;
    use crate::tui::theme::Theme;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn demo_app() -> App {
        let now = 1_700_000_000.0;
        App::new(
            sample_conversation(now).unwrap(),
            CellOptions::default(),
            Box::new(ManualClock::new(now)),
            Theme::dark(),
            "%H:%M".into(),
        )
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = demo_app();
        let last = app.message_count() - 1;
        assert_eq!(app.selected, last);

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected, last);

        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.selected, last - 1);

        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.selected, 0);
        assert_eq!(app.scroll_offset, 0);

        press(&mut app, KeyCode::End);
        assert_eq!(app.selected, last);
    }

    #[test]
    fn test_help_captures_keys() {
        let mut app = demo_app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('g'));
        assert_ne!(app.selected, 0);
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = demo_app();
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        )
        .unwrap();
        assert!(app.should_quit);

        let mut app = demo_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
