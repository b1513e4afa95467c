//! Terminal UI: conversation preview entry point and event loop.

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

use std::io;
use std::time::Duration;

use crossterm::event::{poll as ct_poll, read as ct_read, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use self::app::App;
use self::theme::Theme;
use crate::cell::CellOptions;
use crate::config::Config;
use crate::store::Conversation;
use crate::timer::clock::SystemClock;

/// Run the TUI application. Blocks until the user quits.
pub fn run_tui(conversation: Conversation, config: &Config) -> anyhow::Result<()> {
    let app = App::new(
        conversation,
        CellOptions::from_config(config),
        Box::new(SystemClock),
        Theme::by_name(&config.display.theme),
        config.general.date_format.clone(),
    );

    // Setup terminal (alternate screen)
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the event loop
    let result = run_event_loop(&mut terminal, app);

    // Restore terminal (always, even on error)
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main event loop: render → poll → handle → tick → repeat.
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> anyhow::Result<()> {
    let max_wait = Duration::from_millis(100);

    loop {
        terminal.draw(|frame| {
            ui::render(frame, &mut app);
        })?;

        // Wake up for the next countdown tick even without input
        let wait = app.time_until_next_tick().map_or(max_wait, |d| d.min(max_wait));
        if ct_poll(wait)? {
            if let Event::Key(key) = ct_read()? {
                event::handle_key_event(&mut app, key)?;
            }
        }

        // Deliver due countdown ticks
        app.tick();

        if app.should_quit {
            break;
        }
    }

    app.shutdown();
    Ok(())
}
