use crate::catalog::Topic;
use crate::models::GameConfig;
use crate::provider::questions::QuestionSource;
use crate::provider::ProviderError;
use async_trait::async_trait;
use openrouter_api::{
    models::provider_preferences::ProviderPreferences,
    models::provider_preferences::ProviderSort,
    types::chat::{ChatCompletionRequest, Message},
};

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug)]
pub struct OpenRouterClient {
    client: openrouter_api::OpenRouterClient<openrouter_api::Ready>,
}

impl OpenRouterClient {
    pub fn new() -> Result<Self, ProviderError> {
        let client = openrouter_api::OpenRouterClient::quick()
            .map_err(|e| ProviderError::Request(format!("failed to create client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl QuestionSource for OpenRouterClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let messages = vec![
            Message::text(
                "system",
                "You write English grammar exercises for learners aged 10-14. \
                 You respond only with valid JSON.",
            ),
            Message::text("user", prompt),
        ];

        let provider = ProviderPreferences::new().with_sort(ProviderSort::Throughput);

        let request = ChatCompletionRequest {
            model: DEFAULT_MODEL.to_string(),
            messages,
            provider: Some(provider),
            stream: None,
            response_format: None,
            tools: None,
            tool_choice: None,
            models: None,
            transforms: None,
            route: None,
            user: None,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            temperature: Some(DEFAULT_TEMPERATURE),
            top_p: None,
            top_k: None,
            frequency_penalty: None,
            presence_penalty: None,
            repetition_penalty: None,
            min_p: None,
            top_a: None,
            seed: None,
            stop: None,
            logit_bias: None,
            logprobs: None,
            top_logprobs: None,
            prediction: None,
            parallel_tool_calls: None,
            verbosity: None,
        };

        let response = self
            .client
            .chat()
            .map_err(|e| ProviderError::Request(e.to_string()))?
            .chat_completion(request)
            .await
            .map_err(|e| ProviderError::Request(format!("OpenRouter API error: {}", e)))?;

        if let Some(choice) = response.choices.first() {
            match &choice.message.content {
                openrouter_api::MessageContent::Text(text) => Ok(text.clone()),
                openrouter_api::MessageContent::Parts(parts) => {
                    let text_parts: Vec<String> = parts
                        .iter()
                        .filter_map(|p| {
                            if let openrouter_api::ContentPart::Text(tc) = p {
                                Some(tc.text.clone())
                            } else {
                                None
                            }
                        })
                        .collect();
                    Ok(text_parts.join("\n"))
                }
            }
        } else {
            Err(ProviderError::Request(
                "no response choices received".to_string(),
            ))
        }
    }
}

/// Builds the generation prompt for one batch. Each topic carries its own
/// task description and worked example; sub-topic and difficulty narrow it.
pub fn build_prompt(config: &GameConfig, count: usize) -> String {
    let mut prompt = format!(
        "Generate {} unique, fun, and engaging English grammar questions \
         for 10-14 year olds.\nTopic: \"{}\".\n",
        count,
        config.topic.title()
    );

    if let Some(sub) = config.sub_topic {
        prompt.push_str(&format!("Focus: {}.\n", sub.focus));
    }
    prompt.push_str(&format!(
        "Difficulty: {}. {}\n\n",
        config.difficulty.label(),
        config.difficulty.prompt_hint()
    ));

    prompt.push_str(topic_task(config.topic));

    prompt.push_str(
        "\nRespond ONLY with a JSON array (no markdown, no extra text) of objects \
         with this exact shape:\n\
         [{\"sentencePre\": \"...\", \"sentencePost\": \"...\", \"hintText\": \"...\", \
         \"correctAnswer\": \"...\", \"explanation\": \"...\", \
         \"options\": [\"...\", \"...\", \"...\", \"...\"]}]\n\
         - \"sentencePre\" and \"sentencePost\" are the sentence parts before and after the blank.\n\
         - \"hintText\" is the hint shown in brackets next to the blank.\n\
         - \"options\" must have exactly 4 entries: 1 correct answer and 3 distractors.\n\
         - \"explanation\" is a short, helpful explanation for a 10-14 year old.\n",
    );

    prompt
}

fn topic_task(topic: Topic) -> &'static str {
    match topic {
        Topic::PresentProgressive => {
            "Task:\n\
             1. Create a sentence with a missing verb in Present Progressive form.\n\
             2. \"hintText\" is the infinitive verb (e.g., \"run\").\n\
             3. Options should include common spelling mistakes (runing vs running) \
             or wrong auxiliaries.\n\n\
             Example:\n\
             Sentence: \"She _______ (run) to the park.\"\n\
             hintText: \"run\"\n\
             correctAnswer: \"is running\"\n\
             options: [\"is running\", \"are running\", \"runing\", \"running\"]\n"
        }
        Topic::Pronouns => {
            "Task:\n\
             1. Create a sentence where a name or noun phrase needs to be replaced \
             by a subject pronoun.\n\
             2. \"hintText\" is the noun or name being replaced (e.g., \"My Dad\", \
             \"The cats\", \"Sarah and I\").\n\
             3. Options should be subject pronouns.\n\n\
             Example:\n\
             Sentence: \"_______ is my best friend.\"\n\
             hintText: \"Tom\"\n\
             correctAnswer: \"He\"\n\
             options: [\"He\", \"She\", \"They\", \"It\"]\n"
        }
        Topic::HasHave => {
            "Task:\n\
             1. Create a sentence about possession or attributes.\n\
             2. \"hintText\" is \"have\".\n\
             3. Options should mix has, have, having, etc.\n\n\
             Example:\n\
             Sentence: \"The dog _______ (have) a big bone.\"\n\
             correctAnswer: \"has\"\n\
             options: [\"has\", \"have\", \"having\", \"haves\"]\n"
        }
        Topic::AmIsAre => {
            "Task:\n\
             1. Create a sentence describing a state, age, or quality.\n\
             2. \"hintText\" is \"be\".\n\
             3. Options: am, is, are, be.\n\n\
             Example:\n\
             Sentence: \"They _______ (be) very happy today.\"\n\
             correctAnswer: \"are\"\n\
             options: [\"are\", \"is\", \"am\", \"be\"]\n"
        }
        Topic::Negatives => {
            "Task:\n\
             1. Create a sentence that implies a negative state.\n\
             2. \"hintText\" is \"not be\".\n\
             3. Options should include: isn't, aren't, 'm not, and a wrong form \
             like \"not is\".\n\n\
             Example:\n\
             Sentence: \"He _______ (not be) at school, he is at home.\"\n\
             correctAnswer: \"isn't\"\n\
             options: [\"isn't\", \"aren't\", \"not is\", \"amn't\"]\n"
        }
        Topic::AdjectivesAdverbs => {
            "Task:\n\
             1. Create a sentence where the student must choose between an adjective \
             (describing a noun) and an adverb (describing a verb).\n\
             2. \"hintText\" is the root word (e.g. \"quick\", \"loud\").\n\
             3. Options should include the adjective, the adverb (-ly), and \
             distractors (spelling or wrong form).\n\n\
             Example:\n\
             Sentence: \"The turtle walks very _______ (slow).\"\n\
             correctAnswer: \"slowly\"\n\
             options: [\"slowly\", \"slow\", \"slowness\", \"slowing\"]\n"
        }
        Topic::PastTense => {
            "Task:\n\
             1. Create interesting sentences describing completed actions in the past.\n\
             2. Use a good mix of regular verbs (walk -> walked) and irregular verbs \
             (buy -> bought, catch -> caught).\n\
             3. \"hintText\" must be the infinitive form.\n\
             4. Vary the sentence structure. Don't just start with \"Yesterday\". \
             Use clauses like \"When the bell rang...\", \"In 1492...\", \"Last summer...\".\n\
             5. Options must include: the correct past tense, the base form, the present \
             tense, and a common mistake (like \"buyed\" or \"eated\").\n\n\
             Example:\n\
             Sentence: \"The explorer _______ (find) a hidden treasure map in the cave.\"\n\
             correctAnswer: \"found\"\n\
             options: [\"found\", \"finded\", \"find\", \"finding\"]\n"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Difficulty, GameMode};

    fn config(topic: Topic) -> GameConfig {
        GameConfig {
            topic,
            sub_topic: topic.sub_topics().first(),
            difficulty: Difficulty::Medium,
            mode: GameMode::Practice,
        }
    }

    #[test]
    fn test_prompt_includes_count_topic_and_schema() {
        let prompt = build_prompt(&config(Topic::PastTense), 10);
        assert!(prompt.contains("Generate 10"));
        assert!(prompt.contains("Past Tense"));
        assert!(prompt.contains("\"correctAnswer\""));
        assert!(prompt.contains("exactly 4 entries"));
    }

    #[test]
    fn test_prompt_includes_sub_topic_focus_and_difficulty() {
        let cfg = config(Topic::PresentProgressive);
        let prompt = build_prompt(&cfg, 5);
        let focus = cfg.sub_topic.map(|s| s.focus).unwrap_or_default();
        assert!(prompt.contains(focus));
        assert!(prompt.contains("Medium"));
    }

    #[test]
    fn test_prompt_without_sub_topic_omits_focus_line() {
        let mut cfg = config(Topic::Pronouns);
        cfg.sub_topic = None;
        let prompt = build_prompt(&cfg, 5);
        assert!(!prompt.contains("Focus:"));
    }

    #[test]
    fn test_every_topic_has_a_worked_example() {
        for topic in Topic::ALL {
            let prompt = build_prompt(
                &GameConfig {
                    topic,
                    sub_topic: None,
                    difficulty: Difficulty::Starter,
                    mode: GameMode::Practice,
                },
                3,
            );
            assert!(prompt.contains("Example:"), "{} lacks example", topic.title());
        }
    }
}
