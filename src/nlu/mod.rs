//! NLU training data: labeled examples, entity synonyms, regex features,
//! lookup tables and the responses that belong to retrieval intents.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::constants::UTTER_PREFIX;
use crate::domain::ResponseGroup;

pub mod json;
pub mod markup;
pub mod yaml;

/// An annotated entity span; offsets count characters of the plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAnnotation {
    pub start: usize,
    pub end: usize,
    pub value: String,
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub text: String,
    pub intent: Option<String>,
    pub entities: Vec<EntityAnnotation>,
    pub metadata: Option<Value>,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, intent: Option<String>) -> Self {
        Self {
            text: text.into(),
            intent,
            entities: Vec::new(),
            metadata: None,
        }
    }

    /// Annotations whose value differs from the text they cover, as `(surface, value)`.
    pub fn synonyms(&self) -> Vec<(String, String)> {
        self.entities
            .iter()
            .filter_map(|e| {
                let surface: String = self
                    .text
                    .chars()
                    .skip(e.start)
                    .take(e.end.saturating_sub(e.start))
                    .collect();
                (surface != e.value).then_some((surface, e.value.clone()))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexFeature {
    pub name: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTable {
    pub name: String,
    pub elements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NluData {
    pub examples: Vec<TrainingExample>,
    /// Surface form to canonical value.
    pub entity_synonyms: BTreeMap<String, String>,
    pub regex_features: Vec<RegexFeature>,
    pub lookup_tables: Vec<LookupTable>,
    pub responses: Vec<ResponseGroup>,
}

impl NluData {
    /// Add an example, recording any synonyms its annotations imply.
    pub fn push_example(&mut self, example: TrainingExample) {
        for (surface, value) in example.synonyms() {
            self.entity_synonyms.insert(surface, value);
        }
        self.examples.push(example);
    }

    pub fn merge(&mut self, other: NluData) {
        self.examples.extend(other.examples);
        self.entity_synonyms.extend(other.entity_synonyms);
        self.regex_features.extend(other.regex_features);
        self.lookup_tables.extend(other.lookup_tables);
        self.responses.extend(other.responses);
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
            && self.entity_synonyms.is_empty()
            && self.regex_features.is_empty()
            && self.lookup_tables.is_empty()
            && self.responses.is_empty()
    }

    /// Intent labels in order of first occurrence.
    pub fn intents(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.examples
            .iter()
            .filter_map(|e| e.intent.as_deref())
            .filter(|intent| seen.insert(*intent))
            .collect()
    }

    /// Entity types used by any example annotation.
    pub fn entities(&self) -> BTreeSet<&str> {
        self.examples
            .iter()
            .flat_map(|e| e.entities.iter().map(|a| a.entity.as_str()))
            .collect()
    }

    /// Copy of this data with `examples` swapped in and responses narrowed to them.
    ///
    /// Synonyms, regex features and lookup tables are carried over unchanged.
    pub fn with_examples(&self, examples: Vec<TrainingExample>) -> NluData {
        let responses = responses_for(&self.responses, &examples);
        NluData {
            examples,
            entity_synonyms: self.entity_synonyms.clone(),
            regex_features: self.regex_features.clone(),
            lookup_tables: self.lookup_tables.clone(),
            responses,
        }
    }
}

/// Response groups referenced by the intents of `examples`.
///
/// A group matches an intent `chitchat/ask_name` when it is named either
/// `chitchat/ask_name` or `utter_chitchat/ask_name`.
pub fn responses_for(
    responses: &[ResponseGroup],
    examples: &[TrainingExample],
) -> Vec<ResponseGroup> {
    let intents: HashSet<&str> = examples.iter().filter_map(|e| e.intent.as_deref()).collect();
    responses
        .iter()
        .filter(|group| {
            let name = group.name.as_str();
            intents.contains(name)
                || name
                    .strip_prefix(UTTER_PREFIX)
                    .map(|stripped| intents.contains(stripped))
                    .unwrap_or(false)
        })
        .cloned()
        .collect()
}
