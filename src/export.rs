use crate::catalog::Topic;
use crate::models::{AnswerRecord, GameConfig, GameState};
use chrono::{DateTime, Local, NaiveDate};

const DIVIDER: &str = "---------------------------------------------------";

/// Serializes the session history into the plain-text report. Returns `None`
/// for an empty history; exporting nothing is a no-op, not an error.
pub fn build_report(
    history: &[AnswerRecord],
    config: &GameConfig,
    game: &GameState,
    now: DateTime<Local>,
) -> Option<String> {
    if history.is_empty() {
        return None;
    }

    let mut report = format!(
        "GRAMMAR HERO - {} REPORT\n",
        config.topic.title().to_uppercase()
    );
    if let Some(sub) = config.sub_topic_label() {
        report.push_str(&format!("Sub-topic: {}\n", sub));
    }
    report.push_str(&format!("Difficulty: {}\n", config.difficulty.label()));
    report.push_str(&format!("Date: {}\n", now.format("%Y-%m-%d %H:%M:%S")));
    report.push_str(&format!("Final Score: {}\n", game.score));
    report.push_str(&format!("Total Answered: {}\n", game.total_answered));
    report.push_str(&format!("\n{}\n\n", DIVIDER));

    let blocks: Vec<String> = history
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let result = if record.is_correct {
                "CORRECT"
            } else {
                "INCORRECT"
            };
            format!(
                "Question {}: {}\nYour Answer: {}\nResult: {}\nCorrect Answer: {}\nTime Taken: {:.1}s\n",
                i + 1,
                record.question.full_sentence(),
                record.selected_option,
                result,
                record.question.correct_answer,
                record.time_taken_secs,
            )
        })
        .collect();

    report.push_str(&blocks.join(&format!("\n{}\n\n", DIVIDER)));
    Some(report)
}

pub fn report_filename(topic: Topic, date: NaiveDate) -> String {
    format!("grammar_hero_{}_{}.txt", topic.slug(), date.format("%Y-%m-%d"))
}
