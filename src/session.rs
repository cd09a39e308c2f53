use crate::catalog::{Difficulty, GameMode, Topic};
use crate::export;
use crate::file_io;
use crate::logger;
use crate::models::{
    AnswerRecord, AnswerStatus, AppState, FetchKind, GameConfig, GameState, ProviderRequest,
    ProviderResponse, Question,
};
use crossterm::event::{KeyCode, KeyEvent};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Questions requested when a sub-topic is selected.
pub const INITIAL_BATCH: usize = 10;
/// Questions requested by a background prefetch.
pub const PREFETCH_BATCH: usize = 5;
/// Prefetch fires once the active index is this close to the buffered end.
pub const PREFETCH_MARGIN: usize = 2;

/// Bonus points for answering within five seconds: 2 points per full
/// half-second saved, never negative.
pub fn speed_bonus(time_taken_secs: f64) -> u32 {
    ((5.0 - time_taken_secs).max(0.0) * 2.0).floor() as u32
}

pub fn points_for_correct(streak_before: u32, time_taken_secs: f64) -> u32 {
    10 + streak_before * 2 + speed_bonus(time_taken_secs)
}

/// Wall-clock driver for the countdown. Owned by the session and dropped on
/// every path that leaves the active timed state, so no tick can outlive the
/// session it belongs to.
#[derive(Debug)]
pub struct CountdownTimer {
    last_tick: Instant,
}

impl CountdownTimer {
    pub fn start() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    /// Whole seconds elapsed since the previous call; the remainder carries
    /// over so ticks don't drift.
    pub fn elapsed_ticks(&mut self) -> u32 {
        let elapsed = self.last_tick.elapsed().as_secs();
        if elapsed > 0 {
            self.last_tick += Duration::from_secs(elapsed);
        }
        elapsed as u32
    }
}

#[derive(Debug)]
pub struct QuizSession {
    pub config: GameConfig,
    /// Generation counter stamped on every provider request; responses for an
    /// older epoch are discarded on arrival.
    pub epoch: u64,
    pub queue: Vec<Question>,
    pub current_index: usize,
    pub selected: Option<usize>,
    pub status: AnswerStatus,
    pub history: Vec<AnswerRecord>,
    pub game: GameState,
    pub load_in_flight: bool,
    pub question_shown_at: Option<Instant>,
    pub timer: Option<CountdownTimer>,
    pub provider_tx: Option<Sender<ProviderRequest>>,
}

impl QuizSession {
    pub fn new(
        config: GameConfig,
        epoch: u64,
        provider_tx: Option<Sender<ProviderRequest>>,
    ) -> Self {
        Self {
            config,
            epoch,
            queue: Vec::new(),
            current_index: 0,
            selected: None,
            status: AnswerStatus::Idle,
            history: Vec::new(),
            game: GameState::new(config.mode),
            load_in_flight: false,
            question_shown_at: None,
            timer: None,
            provider_tx,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.queue.get(self.current_index)
    }

    /// Level shown in the game header; one level per ten questions.
    pub fn level(&self) -> usize {
        self.current_index / 10 + 1
    }

    pub fn time_on_question(&self) -> f64 {
        self.question_shown_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    pub fn request_initial_load(&mut self) {
        self.load_in_flight = true;
        self.send_fetch(INITIAL_BATCH, FetchKind::Initial);
    }

    fn send_fetch(&mut self, count: usize, kind: FetchKind) {
        if let Some(ref tx) = self.provider_tx {
            let request = ProviderRequest::Fetch {
                epoch: self.epoch,
                config: self.config,
                count,
                kind,
            };
            tx.send(request).ok();
        }
    }

    pub fn select_option(&mut self, index: usize) {
        if self.status != AnswerStatus::Idle || self.game.is_over {
            return;
        }
        if let Some(q) = self.current_question() {
            if index < q.options.len() {
                self.selected = Some(index);
            }
        }
    }

    pub fn select_next_option(&mut self) {
        if self.status != AnswerStatus::Idle || self.game.is_over {
            return;
        }
        let Some(count) = self.current_question().map(|q| q.options.len()) else {
            return;
        };
        self.selected = Some(match self.selected {
            Some(i) => (i + 1) % count,
            None => 0,
        });
    }

    pub fn select_prev_option(&mut self) {
        if self.status != AnswerStatus::Idle || self.game.is_over {
            return;
        }
        let Some(count) = self.current_question().map(|q| q.options.len()) else {
            return;
        };
        self.selected = Some(match self.selected {
            Some(i) => (i + count - 1) % count,
            None => count - 1,
        });
    }

    /// Checks the selected option against the current question. Valid only
    /// while the answer is pending and an option is selected; returns whether
    /// the submission was accepted.
    pub fn submit_answer(&mut self, time_taken_secs: f64) -> bool {
        if self.status != AnswerStatus::Idle || self.game.is_over {
            return false;
        }
        let Some(question) = self.current_question().cloned() else {
            return false;
        };
        let Some(selected_option) = self
            .selected
            .and_then(|i| question.options.get(i))
            .cloned()
        else {
            return false;
        };
        if selected_option.is_empty() {
            return false;
        }

        let is_correct = selected_option == question.correct_answer;
        if is_correct {
            self.game.score += points_for_correct(self.game.streak, time_taken_secs);
            self.game.streak += 1;
            self.status = AnswerStatus::Correct;
        } else {
            self.game.score = self.game.score.saturating_sub(5);
            self.game.streak = 0;
            self.status = AnswerStatus::Incorrect;
        }
        self.game.total_answered += 1;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.history.push(AnswerRecord {
            question,
            selected_option,
            is_correct,
            timestamp,
            time_taken_secs,
        });
        true
    }

    /// Moves to the next question after the answer was revealed. Never blocks
    /// on the provider; running past the buffer just shows the waiting view
    /// until a prefetched batch lands.
    pub fn advance(&mut self) {
        if self.status == AnswerStatus::Idle || self.game.is_over {
            return;
        }
        self.selected = None;
        self.status = AnswerStatus::Idle;
        self.current_index += 1;
        self.question_shown_at = Some(Instant::now());
        self.maybe_prefetch();
    }

    pub fn maybe_prefetch(&mut self) {
        if self.load_in_flight || self.game.is_over {
            return;
        }
        if self.current_index + PREFETCH_MARGIN >= self.queue.len() {
            self.load_in_flight = true;
            self.send_fetch(PREFETCH_BATCH, FetchKind::Prefetch);
        }
    }

    /// One second off the clock. At zero the session is terminal no matter
    /// what the question sub-state was.
    pub fn timer_tick(&mut self) {
        if self.config.mode != GameMode::Timed || self.game.is_over {
            return;
        }
        if self.game.time_left_secs > 0 {
            self.game.time_left_secs -= 1;
        }
        if self.game.time_left_secs == 0 {
            self.game.is_over = true;
            self.timer = None;
        }
    }

    /// Applies elapsed wall-clock time to the countdown; returns true when
    /// the session just became terminal.
    pub fn poll_timer(&mut self) -> bool {
        if self.game.is_over {
            return false;
        }
        let ticks = match self.timer.as_mut() {
            Some(timer) => timer.elapsed_ticks(),
            None => return false,
        };
        for _ in 0..ticks {
            self.timer_tick();
            if self.game.is_over {
                return true;
            }
        }
        false
    }
}

/// Top-level application state: the current screen, the menu cursors and the
/// session (when one is running). All transitions are plain methods so the
/// whole machine is testable without a terminal.
pub struct App {
    pub state: AppState,
    pub menu_index: usize,
    pub submenu_index: usize,
    pub difficulty: Difficulty,
    pub mode: GameMode,
    pub session: Option<QuizSession>,
    pub error_message: Option<String>,
    pub status_line: Option<String>,
    pub export_dir: PathBuf,
    pub should_quit: bool,
    epoch: u64,
    provider_tx: Option<Sender<ProviderRequest>>,
}

impl App {
    pub fn new(provider_tx: Option<Sender<ProviderRequest>>) -> Self {
        Self {
            state: AppState::Menu,
            menu_index: 0,
            submenu_index: 0,
            difficulty: Difficulty::Medium,
            mode: GameMode::Practice,
            session: None,
            error_message: None,
            status_line: None,
            export_dir: PathBuf::from("."),
            should_quit: false,
            epoch: 0,
            provider_tx,
        }
    }

    pub fn selected_topic(&self) -> Topic {
        Topic::ALL[self.menu_index.min(Topic::ALL.len() - 1)]
    }

    pub fn select_topic(&mut self) {
        self.submenu_index = 0;
        self.state = AppState::SubMenu;
    }

    /// SUBMENU -> LOADING: fresh session, fresh epoch, initial fetch.
    pub fn start_session(&mut self) {
        let topic = self.selected_topic();
        let config = GameConfig {
            topic,
            sub_topic: topic.sub_topics().get(self.submenu_index),
            difficulty: self.difficulty,
            mode: self.mode,
        };
        self.launch(config);
    }

    /// GAME OVER -> LOADING with the identical config.
    pub fn restart_session(&mut self) {
        if let Some(config) = self.session.as_ref().map(|s| s.config) {
            self.launch(config);
        }
    }

    fn launch(&mut self, config: GameConfig) {
        self.epoch += 1;
        let mut session = QuizSession::new(config, self.epoch, self.provider_tx.clone());
        session.request_initial_load();
        self.session = Some(session);
        self.error_message = None;
        self.status_line = None;
        self.state = AppState::Loading;
    }

    /// ERROR -> LOADING: re-issues the identical initial request.
    pub fn retry_initial_load(&mut self) {
        match self.session.as_mut() {
            Some(session) => {
                session.request_initial_load();
                self.error_message = None;
                self.state = AppState::Loading;
            }
            None => self.state = AppState::SubMenu,
        }
    }

    pub fn back_to_menu(&mut self) {
        self.teardown_session();
        self.state = AppState::Menu;
    }

    pub fn back_to_submenu(&mut self) {
        self.teardown_session();
        self.state = AppState::SubMenu;
    }

    /// Dropping the session drops its timer with it; bumping the epoch
    /// strands any response still in flight.
    fn teardown_session(&mut self) {
        self.session = None;
        self.epoch += 1;
        self.error_message = None;
        self.status_line = None;
    }

    /// Called every loop iteration; drives the countdown while in game.
    pub fn tick(&mut self) {
        if self.state != AppState::Game {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            if session.poll_timer() {
                self.state = AppState::GameOver;
            }
        }
    }

    pub fn handle_provider_response(&mut self, response: ProviderResponse) {
        let ProviderResponse::Batch {
            epoch,
            kind,
            result,
        } = response;

        let Some(session) = self.session.as_mut() else {
            logger::log("discarding provider response with no session");
            return;
        };
        if epoch != session.epoch {
            logger::log(&format!(
                "discarding stale provider response (epoch {} != {})",
                epoch, session.epoch
            ));
            return;
        }

        session.load_in_flight = false;
        match (kind, result) {
            (FetchKind::Initial, Ok(batch)) => {
                session.queue = batch;
                session.current_index = 0;
                session.selected = None;
                session.status = AnswerStatus::Idle;
                session.question_shown_at = Some(Instant::now());
                if session.config.mode == GameMode::Timed {
                    session.timer = Some(CountdownTimer::start());
                }
                self.state = AppState::Game;
            }
            (FetchKind::Initial, Err(e)) => {
                logger::log(&format!("initial load failed: {}", e));
                self.error_message =
                    Some("Oops! Couldn't load questions. Check your internet.".to_string());
                self.state = AppState::Error;
            }
            (FetchKind::Prefetch, Ok(batch)) => {
                session.queue.extend(batch);
            }
            (FetchKind::Prefetch, Err(e)) => {
                // Silent by design at the UI; the queue simply doesn't grow.
                logger::log(&format!("prefetch failed: {}", e));
            }
        }
    }

    /// Serializes the answer history and writes the report file. With no
    /// history this is a no-op.
    pub fn export_report(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let now = chrono::Local::now();
        let Some(report) =
            export::build_report(&session.history, &session.config, &session.game, now)
        else {
            logger::log("export requested with empty history, skipping");
            return;
        };
        let filename = export::report_filename(session.config.topic, now.date_naive());
        match file_io::save_report(&self.export_dir, &filename, &report) {
            Ok(path) => {
                self.status_line = Some(format!("Report saved to {}", path.display()));
            }
            Err(e) => {
                logger::log(&format!("failed to save report: {}", e));
                self.status_line = Some(format!("Export failed: {}", e));
            }
        }
    }
}

pub fn handle_menu_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up => {
            if app.menu_index > 0 {
                app.menu_index -= 1;
            }
        }
        KeyCode::Down => {
            if app.menu_index < Topic::ALL.len().saturating_sub(1) {
                app.menu_index += 1;
            }
        }
        KeyCode::Enter => app.select_topic(),
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

pub fn handle_submenu_input(app: &mut App, key: KeyEvent) {
    let sub_count = app.selected_topic().sub_topics().len();
    match key.code {
        KeyCode::Up => {
            if app.submenu_index > 0 {
                app.submenu_index -= 1;
            }
        }
        KeyCode::Down => {
            if app.submenu_index < sub_count.saturating_sub(1) {
                app.submenu_index += 1;
            }
        }
        KeyCode::Left => app.difficulty = app.difficulty.prev(),
        KeyCode::Right => app.difficulty = app.difficulty.next(),
        KeyCode::Tab | KeyCode::Char('t') => app.mode = app.mode.toggled(),
        KeyCode::Enter => app.start_session(),
        KeyCode::Esc => app.state = AppState::Menu,
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

pub fn handle_loading_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.back_to_submenu();
    }
}

pub fn handle_game_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            if let Some(session) = app.session.as_mut() {
                session.select_prev_option();
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if let Some(session) = app.session.as_mut() {
                session.select_next_option();
            }
        }
        KeyCode::Char(c @ '1'..='4') => {
            if let Some(session) = app.session.as_mut() {
                session.select_option(c as usize - '1' as usize);
            }
        }
        KeyCode::Enter => {
            if let Some(session) = app.session.as_mut() {
                if session.status == AnswerStatus::Idle {
                    if session.current_question().is_some() {
                        let elapsed = session.time_on_question();
                        session.submit_answer(elapsed);
                    } else {
                        // Ran past the buffer; nudge the prefetch.
                        session.maybe_prefetch();
                    }
                } else {
                    session.advance();
                }
            }
        }
        KeyCode::Char('e') => app.export_report(),
        KeyCode::Char('b') | KeyCode::Esc => app.back_to_submenu(),
        KeyCode::Char('m') => app.back_to_menu(),
        _ => {}
    }
}

pub fn handle_error_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Enter => app.retry_initial_load(),
        KeyCode::Char('b') | KeyCode::Esc => app.back_to_submenu(),
        KeyCode::Char('m') => app.back_to_menu(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

pub fn handle_game_over_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') => app.export_report(),
        KeyCode::Char('r') => app.restart_session(),
        KeyCode::Char('b') => app.back_to_submenu(),
        KeyCode::Char('m') | KeyCode::Esc => app.back_to_menu(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}
