pub mod catalog;
pub mod export;
pub mod file_io;
pub mod logger;
pub mod models;
pub mod provider;
pub mod provider_worker;
pub mod session;
pub mod ui;
pub mod utils;

// Re-exports for convenience
pub use catalog::{Difficulty, GameMode, SubTopic, Topic, TIMED_ROUND_SECS};
pub use models::{
    AnswerRecord, AnswerStatus, AppState, FetchKind, GameConfig, GameState, ProviderRequest,
    ProviderResponse, Question,
};
pub use provider::{fetch_questions, load_batch, ProviderError, QuestionSource};
pub use provider_worker::spawn_provider_worker;
pub use session::{
    handle_error_input, handle_game_input, handle_game_over_input, handle_loading_input,
    handle_menu_input, handle_submenu_input, App, QuizSession,
};
pub use ui::{draw_error, draw_game, draw_game_over, draw_loading, draw_menu, draw_submenu};
