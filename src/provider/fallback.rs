//! Built-in question bank used when the provider is unreachable. Content is
//! deterministic so scoring stays exercisable offline; it is not meant to
//! cover sub-topics or difficulty tiers.

use crate::catalog::Topic;
use crate::provider::questions::RawQuestion;

fn entry(
    pre: &str,
    post: &str,
    hint: &str,
    correct: &str,
    explanation: &str,
    options: [&str; 4],
) -> RawQuestion {
    RawQuestion {
        sentence_pre: pre.to_string(),
        sentence_post: post.to_string(),
        hint_text: hint.to_string(),
        correct_answer: correct.to_string(),
        explanation: explanation.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
    }
}

pub fn bank(topic: Topic) -> Vec<RawQuestion> {
    match topic {
        Topic::PresentProgressive => vec![
            entry(
                "Look! The cat ",
                " up the tree.",
                "climb",
                "is climbing",
                "Singular subject 'The cat' needs 'is' + verb-ing.",
                ["is climbing", "are climbing", "climbing", "climb"],
            ),
            entry(
                "We ",
                " math right now.",
                "study",
                "are studying",
                "'We' is plural, so we use 'are'.",
                ["are studying", "is studying", "studying", "studies"],
            ),
        ],
        Topic::Pronouns => vec![entry(
            "",
            " is my sister.",
            "Sarah",
            "She",
            "Sarah is a girl, so we use 'She'.",
            ["She", "He", "They", "It"],
        )],
        Topic::HasHave => vec![entry(
            "I ",
            " a new bike.",
            "have",
            "have",
            "With 'I', we use 'have'.",
            ["have", "has", "having", "had"],
        )],
        Topic::AmIsAre => vec![entry(
            "You ",
            " my best friend.",
            "be",
            "are",
            "With 'You', we always use 'are'.",
            ["are", "is", "am", "be"],
        )],
        Topic::Negatives => vec![entry(
            "It ",
            " raining today.",
            "not be",
            "isn't",
            "It is not -> It isn't.",
            ["isn't", "aren't", "not is", "amn't"],
        )],
        Topic::AdjectivesAdverbs => vec![entry(
            "She sings very ",
            ".",
            "beautiful",
            "beautifully",
            "We are describing how she sings (verb), so we need an adverb (-ly).",
            ["beautifully", "beautiful", "beauty", "beautify"],
        )],
        Topic::PastTense => vec![entry(
            "Yesterday, I ",
            " pizza for dinner.",
            "eat",
            "ate",
            "The past tense of 'eat' is 'ate'.",
            ["ate", "eat", "eated", "eating"],
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_covers_every_topic() {
        for topic in Topic::ALL {
            assert!(!bank(topic).is_empty(), "{} bank empty", topic.title());
        }
    }

    #[test]
    fn test_bank_records_are_well_formed() {
        for topic in Topic::ALL {
            for record in bank(topic) {
                assert!(!record.correct_answer.is_empty());
                assert_eq!(record.options.len(), 4);
                assert!(record.options.contains(&record.correct_answer));
            }
        }
    }
}
