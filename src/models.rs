use crate::catalog::{Difficulty, GameMode, SubTopic, Topic, TIMED_ROUND_SECS};
use crate::provider::ProviderError;
use serde::{Deserialize, Serialize};

/// One multiple-choice grammar question, immutable once the adapter has
/// validated and shuffled it. `correct_answer` is always one of `options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub sentence_pre: String,
    pub sentence_post: String,
    pub hint_text: String,
    pub correct_answer: String,
    pub explanation: String,
    pub options: Vec<String>,
}

impl Question {
    /// The sentence as shown in the exported report, blank marker included.
    pub fn full_sentence(&self) -> String {
        format!(
            "{} ______ ({}) {}",
            self.sentence_pre.trim_end(),
            self.hint_text,
            self.sentence_post.trim_start()
        )
    }
}

/// Append-only record of one answered question.
#[derive(Debug, Clone)]
pub struct AnswerRecord {
    pub question: Question,
    pub selected_option: String,
    pub is_correct: bool,
    /// Unix seconds at the moment the answer was checked.
    pub timestamp: u64,
    pub time_taken_secs: f64,
}

/// Score, streak and clock for the running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub score: u32,
    pub streak: u32,
    pub total_answered: u32,
    /// Only meaningful in timed mode; stays 0 in practice mode.
    pub time_left_secs: u32,
    pub is_over: bool,
}

impl GameState {
    pub fn new(mode: GameMode) -> Self {
        Self {
            score: 0,
            streak: 0,
            total_answered: 0,
            time_left_secs: match mode {
                GameMode::Timed => TIMED_ROUND_SECS,
                GameMode::Practice => 0,
            },
            is_over: false,
        }
    }
}

/// Sub-state of the active question: pending, or revealed with the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStatus {
    Idle,
    Correct,
    Incorrect,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AppState {
    Menu,
    SubMenu,
    Loading,
    Game,
    Error,
    GameOver,
}

/// Everything the user picked before the session started. Immutable for the
/// session's lifetime; changing it means a new session (and a new epoch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub topic: Topic,
    pub sub_topic: Option<&'static SubTopic>,
    pub difficulty: Difficulty,
    pub mode: GameMode,
}

impl GameConfig {
    pub fn sub_topic_label(&self) -> Option<&'static str> {
        self.sub_topic.map(|s| s.label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Initial,
    Prefetch,
}

#[derive(Debug)]
pub enum ProviderRequest {
    Fetch {
        epoch: u64,
        config: GameConfig,
        count: usize,
        kind: FetchKind,
    },
}

#[derive(Debug)]
pub enum ProviderResponse {
    Batch {
        epoch: u64,
        kind: FetchKind,
        result: Result<Vec<Question>, ProviderError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            id: "q-1".to_string(),
            sentence_pre: "She ".to_string(),
            sentence_post: " to the park.".to_string(),
            hint_text: "run".to_string(),
            correct_answer: "is running".to_string(),
            explanation: "Singular subject needs 'is' + verb-ing.".to_string(),
            options: vec![
                "is running".to_string(),
                "are running".to_string(),
                "runing".to_string(),
                "running".to_string(),
            ],
        }
    }

    #[test]
    fn test_full_sentence_reconstructs_blank_and_hint() {
        let q = question();
        assert_eq!(q.full_sentence(), "She ______ (run) to the park.");
    }

    #[test]
    fn test_game_state_timed_starts_with_clock() {
        let state = GameState::new(GameMode::Timed);
        assert_eq!(state.time_left_secs, TIMED_ROUND_SECS);
        assert!(!state.is_over);
    }

    #[test]
    fn test_game_state_practice_has_no_clock() {
        let state = GameState::new(GameMode::Practice);
        assert_eq!(state.time_left_secs, 0);
        assert!(!state.is_over);
    }
}
