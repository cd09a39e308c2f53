use crate::logger;
use crate::models::{GameConfig, Question};
use crate::provider::client::{build_prompt, OpenRouterClient};
use crate::provider::{fallback, ProviderError};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;
use uuid::Uuid;

/// Anything that can turn a prompt into raw completion text. Implemented by
/// the OpenRouter client and by a canned mock in tests.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// The provider's wire shape, before validation. Field names follow the
/// JSON contract given in the prompt.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    pub sentence_pre: String,
    pub sentence_post: String,
    #[serde(default)]
    pub hint_text: String,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub options: Vec<String>,
}

fn clean_json_response(response: &str) -> String {
    let mut cleaned = response.trim().to_string();

    if cleaned.starts_with("```") {
        let lines: Vec<&str> = cleaned.lines().collect();
        if lines.len() > 2 {
            cleaned = lines[1..lines.len() - 1].join("\n");
        }
    }

    if let Some(start) = cleaned.find('[') {
        if let Some(end) = cleaned.rfind(']') {
            if start < end {
                cleaned = cleaned[start..=end].to_string();
            }
        }
    }

    cleaned.trim().to_string()
}

fn parse_batch(response: &str) -> Result<Vec<RawQuestion>, ProviderError> {
    let cleaned = clean_json_response(response);
    let raw: Vec<RawQuestion> = serde_json::from_str(&cleaned)
        .map_err(|e| ProviderError::Malformed(format!("{} in: {}", e, cleaned)))?;

    if raw.is_empty() {
        return Err(ProviderError::Malformed("empty question list".to_string()));
    }
    Ok(raw)
}

/// Validates, repairs, shuffles and id-stamps one raw batch.
///
/// Records without a correct answer are dropped. Missing options degrade to
/// the single-option list; a correct answer absent from its options gets
/// inserted. Both the options of each question and the batch order are
/// shuffled with `SliceRandom::shuffle` (Fisher-Yates). Ids are assigned
/// here, never trusted from upstream, so they stay unique across batches.
pub fn prepare_batch(raw: Vec<RawQuestion>) -> Vec<Question> {
    let mut rng = rand::thread_rng();
    let mut batch: Vec<Question> = Vec::with_capacity(raw.len());

    for record in raw {
        let correct = record.correct_answer.trim().to_string();
        if correct.is_empty() {
            logger::log("dropping question record without a correct answer");
            continue;
        }

        let mut options: Vec<String> = record
            .options
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        if options.is_empty() {
            logger::log("question record without options, degrading to single option");
            options = vec![correct.clone()];
        } else if !options.contains(&correct) {
            logger::log("correct answer missing from options, inserting it");
            options.push(correct.clone());
        }
        options.shuffle(&mut rng);

        batch.push(Question {
            id: format!("q-{}", Uuid::new_v4()),
            sentence_pre: record.sentence_pre,
            sentence_post: record.sentence_post,
            hint_text: record.hint_text,
            correct_answer: correct,
            explanation: record.explanation,
            options,
        });
    }

    batch.shuffle(&mut rng);
    batch
}

/// Fetches one batch through a [`QuestionSource`]. No retries; callers decide
/// whether a failure is user-visible.
pub async fn fetch_questions(
    source: &dyn QuestionSource,
    config: &GameConfig,
    count: usize,
) -> Result<Vec<Question>, ProviderError> {
    let prompt = build_prompt(config, count);
    let response = source.generate(&prompt).await?;
    let batch = prepare_batch(parse_batch(&response)?);

    if batch.is_empty() {
        return Err(ProviderError::Malformed(
            "no usable question records in batch".to_string(),
        ));
    }
    Ok(batch)
}

/// The built-in deterministic bank for a topic, shuffled and id-stamped like
/// any other batch.
pub fn fallback_batch(config: &GameConfig) -> Result<Vec<Question>, ProviderError> {
    let batch = prepare_batch(fallback::bank(config.topic));
    if batch.is_empty() {
        return Err(ProviderError::Unavailable);
    }
    Ok(batch)
}

/// Adapter entry point used by the worker: remote generation first, built-in
/// bank when that fails, `Unavailable` only when even the bank is empty.
pub async fn load_batch(config: &GameConfig, count: usize) -> Result<Vec<Question>, ProviderError> {
    let remote = match OpenRouterClient::new() {
        Ok(client) => fetch_questions(&client, config, count).await,
        Err(e) => Err(e),
    };

    match remote {
        Ok(batch) => Ok(batch),
        Err(e) => {
            logger::log(&format!("provider failed ({}), using fallback bank", e));
            fallback_batch(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Difficulty, GameMode, Topic};

    struct MockSource {
        response: Result<String, ProviderError>,
    }

    impl MockSource {
        fn ok(response: &str) -> Self {
            Self {
                response: Ok(response.to_string()),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(ProviderError::Request("connection refused".to_string())),
            }
        }
    }

    #[async_trait]
    impl QuestionSource for MockSource {
        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(ProviderError::Request("connection refused".to_string())),
            }
        }
    }

    fn config() -> GameConfig {
        GameConfig {
            topic: Topic::PastTense,
            sub_topic: None,
            difficulty: Difficulty::Medium,
            mode: GameMode::Practice,
        }
    }

    fn raw(correct: &str, options: &[&str]) -> RawQuestion {
        RawQuestion {
            sentence_pre: "Yesterday, I ".to_string(),
            sentence_post: " pizza for dinner.".to_string(),
            hint_text: "eat".to_string(),
            correct_answer: correct.to_string(),
            explanation: "The past tense of 'eat' is 'ate'.".to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    const BATCH_JSON: &str = r#"[
        {"sentencePre": "Yesterday, I ", "sentencePost": " pizza.", "hintText": "eat",
         "correctAnswer": "ate", "explanation": "Past of eat.",
         "options": ["ate", "eat", "eated", "eating"]},
        {"sentencePre": "Last week, she ", "sentencePost": " a new bike.", "hintText": "buy",
         "correctAnswer": "bought", "explanation": "Past of buy.",
         "options": ["bought", "buyed", "buy", "buying"]}
    ]"#;

    #[test]
    fn test_clean_json_response_plain_array() {
        let cleaned = clean_json_response(r#"[{"a":1}]"#);
        assert_eq!(cleaned, r#"[{"a":1}]"#);
    }

    #[test]
    fn test_clean_json_response_markdown_fence() {
        let response = "```json\n[{\"a\":1}]\n```";
        assert_eq!(clean_json_response(response), r#"[{"a":1}]"#);
    }

    #[test]
    fn test_clean_json_response_surrounding_prose() {
        let response = r#"Here you go: [{"a":1}] hope that helps"#;
        assert_eq!(clean_json_response(response), r#"[{"a":1}]"#);
    }

    #[test]
    fn test_parse_batch_valid() {
        let raw = parse_batch(BATCH_JSON).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].correct_answer, "ate");
        assert_eq!(raw[1].hint_text, "buy");
    }

    #[test]
    fn test_parse_batch_malformed_json() {
        let result = parse_batch("not json at all");
        assert!(matches!(result, Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_parse_batch_empty_list() {
        let result = parse_batch("[]");
        assert!(matches!(result, Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_prepare_batch_preserves_option_multiset() {
        let record = raw("ate", &["ate", "eat", "eated", "eating"]);
        let batch = prepare_batch(vec![record.clone()]);
        assert_eq!(batch.len(), 1);

        let mut expected: Vec<String> = record.options.clone();
        expected.sort();
        let mut got = batch[0].options.clone();
        got.sort();
        assert_eq!(got, expected);
        assert!(batch[0].options.contains(&batch[0].correct_answer));
    }

    #[test]
    fn test_prepare_batch_drops_record_without_correct_answer() {
        let batch = prepare_batch(vec![raw("", &["a", "b"])]);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_prepare_batch_degrades_missing_options_to_single_entry() {
        let batch = prepare_batch(vec![raw("ate", &[])]);
        assert_eq!(batch[0].options, vec!["ate".to_string()]);
    }

    #[test]
    fn test_prepare_batch_inserts_absent_correct_answer() {
        let batch = prepare_batch(vec![raw("ate", &["eat", "eated", "eating"])]);
        assert_eq!(batch[0].options.len(), 4);
        assert!(batch[0].options.contains(&"ate".to_string()));
    }

    #[test]
    fn test_prepare_batch_assigns_unique_ids() {
        let records = vec![
            raw("ate", &["ate", "eat"]),
            raw("ate", &["ate", "eat"]),
            raw("ate", &["ate", "eat"]),
        ];
        let batch = prepare_batch(records);
        assert_eq!(batch.len(), 3);
        assert_ne!(batch[0].id, batch[1].id);
        assert_ne!(batch[1].id, batch[2].id);
        assert_ne!(batch[0].id, batch[2].id);
    }

    // Each option should land in each position with roughly equal frequency.
    // A comparator-based "shuffle" concentrates mass heavily on the original
    // order and fails these bounds.
    #[test]
    fn test_option_shuffle_is_roughly_uniform() {
        const TRIALS: usize = 2000;
        let mut first_position_counts = [0usize; 4];

        for _ in 0..TRIALS {
            let batch = prepare_batch(vec![raw("ate", &["ate", "eat", "eated", "eating"])]);
            let first = &batch[0].options[0];
            let idx = ["ate", "eat", "eated", "eating"]
                .iter()
                .position(|o| o == first)
                .unwrap();
            first_position_counts[idx] += 1;
        }

        for count in first_position_counts {
            let share = count as f64 / TRIALS as f64;
            assert!(
                (0.15..=0.35).contains(&share),
                "position share {} outside uniform bounds: {:?}",
                share,
                first_position_counts
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_questions_happy_path() {
        let source = MockSource::ok(BATCH_JSON);
        let batch = fetch_questions(&source, &config(), 2).await.unwrap();
        assert_eq!(batch.len(), 2);
        for q in &batch {
            assert!(q.options.contains(&q.correct_answer));
            assert!(q.id.starts_with("q-"));
        }
    }

    #[tokio::test]
    async fn test_fetch_questions_propagates_request_failure() {
        let source = MockSource::failing();
        let result = fetch_questions(&source, &config(), 2).await;
        assert!(matches!(result, Err(ProviderError::Request(_))));
    }

    #[tokio::test]
    async fn test_fetch_questions_rejects_garbage_payload() {
        let source = MockSource::ok("I'm sorry, I can't do that.");
        let result = fetch_questions(&source, &config(), 2).await;
        assert!(matches!(result, Err(ProviderError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_fetch_questions_rejects_batch_of_invalid_records() {
        let source =
            MockSource::ok(r#"[{"sentencePre": "a", "sentencePost": "b", "correctAnswer": ""}]"#);
        let result = fetch_questions(&source, &config(), 1).await;
        assert!(matches!(result, Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_fallback_batch_available_for_every_topic() {
        for topic in Topic::ALL {
            let cfg = GameConfig {
                topic,
                sub_topic: None,
                difficulty: Difficulty::Starter,
                mode: GameMode::Practice,
            };
            let batch = fallback_batch(&cfg).unwrap();
            assert!(!batch.is_empty(), "{} has no fallback", topic.title());
            for q in batch {
                assert!(q.options.contains(&q.correct_answer));
            }
        }
    }
}
