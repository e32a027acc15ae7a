//! Deterministic train/test splitting.
//!
//! NLU examples are stratified by intent: every intent group is shuffled with
//! its own generator seeded from the same seed, and the first
//! `round(fraction × group size)` examples of the shuffled group go to
//! training. Stories are shuffled as one flat collection. See [`rng`] for the
//! pinned shuffle.

use std::collections::HashMap;

use crate::config::TrainingFraction;
use crate::dialogue::{BlockKind, StoryBlock};
use crate::nlu::{NluData, TrainingExample};

pub mod rng;

/// Two disjoint parts that together hold every input item.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

/// Shuffle `items` with `seed` and cut after `round(fraction × len)` items.
pub fn partition<T: Clone>(items: &[T], fraction: TrainingFraction, seed: u64) -> Partition<T> {
    let mut shuffled = rng::shuffled(items, seed);
    let test = shuffled.split_off(fraction.train_count(items.len()));
    Partition {
        train: shuffled,
        test,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NluSplit {
    pub train: NluData,
    pub test: NluData,
}

/// Examples grouped by intent, groups in order of first occurrence.
///
/// Examples without an intent form a group of their own.
fn intent_groups(examples: &[TrainingExample]) -> Vec<Vec<TrainingExample>> {
    let mut slots: HashMap<Option<&str>, usize> = HashMap::new();
    let mut groups: Vec<Vec<TrainingExample>> = Vec::new();

    for example in examples {
        let key = example.intent.as_deref();
        match slots.get(&key) {
            Some(&slot) => groups[slot].push(example.clone()),
            None => {
                slots.insert(key, groups.len());
                groups.push(vec![example.clone()]);
            }
        }
    }

    groups
}

/// Stratified split of NLU data.
///
/// Synonyms, regex features and lookup tables go to both sides; each side
/// keeps only the responses its examples refer to.
pub fn split_nlu(data: &NluData, fraction: TrainingFraction, seed: u64) -> NluSplit {
    let mut train = Vec::new();
    let mut test = Vec::new();

    for group in intent_groups(&data.examples) {
        let part = partition(&group, fraction, seed);
        tracing::debug!(
            "Intent {:?}: {} train, {} test",
            group.first().and_then(|e| e.intent.as_deref()),
            part.train.len(),
            part.test.len()
        );
        train.extend(part.train);
        test.extend(part.test);
    }

    NluSplit {
        train: data.with_examples(train),
        test: data.with_examples(test),
    }
}

/// Split the stories among `blocks`; rules are left out.
pub fn split_stories(
    blocks: &[StoryBlock],
    fraction: TrainingFraction,
    seed: u64,
) -> Partition<StoryBlock> {
    let stories: Vec<StoryBlock> = blocks
        .iter()
        .filter(|b| b.kind == BlockKind::Story)
        .cloned()
        .collect();
    partition(&stories, fraction, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::parse_blocks;
    use crate::domain::ResponseGroup;
    use std::collections::HashSet;

    fn fraction(value: f64) -> TrainingFraction {
        TrainingFraction::new(value).unwrap()
    }

    fn nlu(groups: &[(&str, usize)]) -> NluData {
        let mut data = NluData::default();
        for (intent, size) in groups {
            for i in 0..*size {
                data.push_example(TrainingExample::new(
                    format!("{} example {}", intent, i),
                    Some(intent.to_string()),
                ));
            }
        }
        data
    }

    fn texts(examples: &[TrainingExample]) -> Vec<&str> {
        examples.iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn test_split_covers_input_without_overlap() {
        let data = nlu(&[("greet", 7), ("goodbye", 3), ("affirm", 1)]);
        let split = split_nlu(&data, fraction(0.75), 12345);

        let train: HashSet<&str> = texts(&split.train.examples).into_iter().collect();
        let test: HashSet<&str> = texts(&split.test.examples).into_iter().collect();
        let all: HashSet<&str> = texts(&data.examples).into_iter().collect();

        assert!(train.is_disjoint(&test));
        assert_eq!(train.union(&test).copied().collect::<HashSet<_>>(), all);
    }

    #[test]
    fn test_intent_groups_keep_first_occurrence_order() {
        let examples = vec![
            TrainingExample::new("hi", Some("greet".to_string())),
            TrainingExample::new("bye", Some("goodbye".to_string())),
            TrainingExample::new("raw text", None),
            TrainingExample::new("hello", Some("greet".to_string())),
            TrainingExample::new("more text", None),
        ];

        let grouped = intent_groups(&examples);
        let groups: Vec<Vec<&str>> = grouped.iter().map(|group| texts(group)).collect();

        assert_eq!(
            groups,
            vec![vec!["hi", "hello"], vec!["bye"], vec!["raw text", "more text"]]
        );
    }

    #[test]
    fn test_group_sizes_follow_rounding() {
        let data = nlu(&[("a", 4), ("b", 3), ("c", 1), ("d", 2)]);
        for (value, expected) in [
            (0.5, [2, 2, 1, 1]),
            (0.75, [3, 2, 1, 2]),
            (1.0, [4, 3, 1, 2]),
        ] {
            let split = split_nlu(&data, fraction(value), 42);
            for (intent, count) in ["a", "b", "c", "d"].iter().zip(expected) {
                let in_train = split
                    .train
                    .examples
                    .iter()
                    .filter(|e| e.intent.as_deref() == Some(*intent))
                    .count();
                assert_eq!(in_train, count, "intent {} at {}", intent, value);
            }
        }
    }

    #[test]
    fn test_full_fraction_leaves_test_empty() {
        let data = nlu(&[("greet", 3)]);
        let split = split_nlu(&data, fraction(1.0), 1);
        assert_eq!(split.train.examples.len(), 3);
        assert!(split.test.examples.is_empty());
    }

    #[test]
    fn test_split_is_deterministic_and_pinned() {
        let data = nlu(&[("greet", 4)]);
        let first = split_nlu(&data, fraction(0.5), 42);
        let second = split_nlu(&data, fraction(0.5), 42);

        assert_eq!(first, second);
        // seed 42 orders four items as [1, 3, 0, 2]
        assert_eq!(
            texts(&first.train.examples),
            vec!["greet example 1", "greet example 3"]
        );
    }

    #[test]
    fn test_each_intent_group_is_seeded_alike() {
        let data = nlu(&[("a", 4), ("b", 4)]);
        let split = split_nlu(&data, fraction(0.5), 42);
        assert_eq!(
            texts(&split.train.examples),
            vec!["a example 1", "a example 3", "b example 1", "b example 3"]
        );
    }

    #[test]
    fn test_responses_follow_their_examples() {
        let mut data = nlu(&[("chitchat/ask_name", 1), ("chitchat/ask_age", 1)]);
        data.responses = vec![
            ResponseGroup {
                name: "utter_chitchat/ask_name".to_string(),
                variants: Vec::new(),
            },
            ResponseGroup {
                name: "utter_chitchat/ask_age".to_string(),
                variants: Vec::new(),
            },
        ];
        data.entity_synonyms
            .insert("NYC".to_string(), "New York City".to_string());

        let split = split_nlu(&data, fraction(0.5), 42);

        // a group of one rounds 0.5 up to one training example
        assert_eq!(split.train.responses.len(), 2);
        assert!(split.test.responses.is_empty());
        assert_eq!(split.test.entity_synonyms, data.entity_synonyms);
    }

    #[test]
    fn test_split_stories_pins_first_story_to_train() {
        let document = serde_yaml::from_str(
            r#"
stories:
- story: story 1
  steps:
  - intent: intent_a
  - action: utter_a
- story: story 2
  steps:
  - intent: intent_a
  - action: utter_a
rules:
- rule: rule 1
  steps:
  - intent: intent_a
  - action: utter_a
"#,
        )
        .unwrap();
        let blocks = parse_blocks(&document, None).unwrap();

        let part = split_stories(&blocks, fraction(0.5), 123);

        assert_eq!(part.train.len(), 1);
        assert_eq!(part.train[0].name, "story 1");
        assert_eq!(part.test.len(), 1);
        assert_eq!(part.test[0].name, "story 2");
    }
}
