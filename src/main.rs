use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use grammar_hero::{
    draw_error, draw_game, draw_game_over, draw_loading, draw_menu, draw_submenu,
    handle_error_input, handle_game_input, handle_game_over_input, handle_loading_input,
    handle_menu_input, handle_submenu_input, logger, spawn_provider_worker, App, AppState,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::mpsc;
use std::time::Duration;

fn main() -> io::Result<()> {
    logger::init();

    let (req_tx, req_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let _worker = spawn_provider_worker(resp_tx, req_rx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(Some(req_tx));

    loop {
        terminal.draw(|f| match app.state {
            AppState::Menu => draw_menu(f, app.menu_index),
            AppState::SubMenu => draw_submenu(
                f,
                app.selected_topic(),
                app.submenu_index,
                app.difficulty,
                app.mode,
            ),
            AppState::Loading => draw_loading(f, app.selected_topic().title()),
            AppState::Game => {
                if let Some(session) = &app.session {
                    draw_game(f, session, app.status_line.as_deref());
                }
            }
            AppState::Error => draw_error(
                f,
                app.error_message
                    .as_deref()
                    .unwrap_or("Couldn't load questions."),
            ),
            AppState::GameOver => {
                if let Some(session) = &app.session {
                    draw_game_over(f, session, app.status_line.as_deref());
                }
            }
        })?;

        // Merge any batches the worker finished since the last frame.
        while let Ok(response) = resp_rx.try_recv() {
            app.handle_provider_response(response);
        }

        app.tick();

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                match app.state {
                    AppState::Menu => handle_menu_input(&mut app, key),
                    AppState::SubMenu => handle_submenu_input(&mut app, key),
                    AppState::Loading => handle_loading_input(&mut app, key),
                    AppState::Game => handle_game_input(&mut app, key),
                    AppState::Error => handle_error_input(&mut app, key),
                    AppState::GameOver => handle_game_over_input(&mut app, key),
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
