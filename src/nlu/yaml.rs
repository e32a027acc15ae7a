//! YAML training data format for NLU.
//!
//! ```yaml
//! version: "3.1"
//! nlu:
//! - intent: inform
//!   examples: |
//!     - I live in [Berlin](city)
//! - synonym: New York City
//!   examples: |
//!     - NYC
//! responses:
//!   utter_chitchat/ask_name:
//!   - text: I'm a bot
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

use super::{markup, LookupTable, NluData, RegexFeature, TrainingExample};
use crate::constants::LATEST_TRAINING_DATA_FORMAT_VERSION;
use crate::domain::ResponseGroup;
use crate::files::{parse_yaml_document, scalar_text};

pub const KEY_NLU: &str = "nlu";
pub const KEY_RESPONSES: &str = "responses";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NluBlock {
    Intent {
        intent: Value,
        examples: Examples,
        #[serde(default)]
        metadata: Option<Value>,
    },
    Synonym {
        synonym: Value,
        examples: Examples,
    },
    Regex {
        regex: Value,
        examples: Examples,
    },
    Lookup {
        lookup: Value,
        examples: Examples,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Examples {
    Block(String),
    Items(Vec<ExampleItem>),
}

#[derive(Debug, Deserialize)]
struct ExampleItem {
    text: String,
    #[serde(default)]
    metadata: Option<Value>,
}

impl Examples {
    fn into_items(self) -> Result<Vec<ExampleItem>> {
        match self {
            Examples::Items(items) => Ok(items),
            Examples::Block(block) => block_lines(&block)
                .map(|line| {
                    line.map(|text| ExampleItem {
                        text,
                        metadata: None,
                    })
                })
                .collect(),
        }
    }

    fn into_texts(self) -> Result<Vec<String>> {
        Ok(self.into_items()?.into_iter().map(|item| item.text).collect())
    }
}

/// Lines of a `- `-prefixed literal block.
fn block_lines(block: &str) -> impl Iterator<Item = Result<String>> + '_ {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.strip_prefix('-') {
            Some(text) => Ok(text.trim().to_string()),
            None => bail!("Example '{}' must start with '- '", line),
        })
}

/// True when a parsed document carries NLU data (`nlu` section).
pub fn is_nlu_document(document: &Value) -> bool {
    document.get(KEY_NLU).is_some()
}

pub fn read_str(content: &str) -> Result<NluData> {
    read(&parse_yaml_document(content)?)
}

/// Read the `nlu` and `responses` sections of a training data document.
pub fn read(document: &Value) -> Result<NluData> {
    let mut data = NluData::default();

    match document.get(KEY_NLU) {
        None | Some(Value::Null) => {}
        Some(Value::Sequence(blocks)) => {
            for (index, block) in blocks.iter().enumerate() {
                let parsed: NluBlock = serde_yaml::from_value(block.clone())
                    .with_context(|| format!("Invalid nlu block #{}: {:?}", index + 1, block))?;
                read_block(parsed, &mut data)?;
            }
        }
        Some(_) => bail!("'{}' must be a list", KEY_NLU),
    }

    data.responses = read_responses(document)?;
    Ok(data)
}

fn read_block(block: NluBlock, data: &mut NluData) -> Result<()> {
    match block {
        NluBlock::Intent {
            intent,
            examples,
            metadata,
        } => {
            let intent = scalar_text(&intent);
            for item in examples.into_items()? {
                let (text, entities) = markup::parse(&item.text)?;
                data.push_example(TrainingExample {
                    text,
                    intent: Some(intent.clone()),
                    entities,
                    metadata: item.metadata.or_else(|| metadata.clone()),
                });
            }
        }
        NluBlock::Synonym { synonym, examples } => {
            let value = scalar_text(&synonym);
            for surface in examples.into_texts()? {
                data.entity_synonyms.insert(surface, value.clone());
            }
        }
        NluBlock::Regex { regex, examples } => {
            let name = scalar_text(&regex);
            for pattern in examples.into_texts()? {
                data.regex_features.push(RegexFeature {
                    name: name.clone(),
                    pattern,
                });
            }
        }
        NluBlock::Lookup { lookup, examples } => {
            data.lookup_tables.push(LookupTable {
                name: scalar_text(&lookup),
                elements: examples.into_texts()?,
            });
        }
    }
    Ok(())
}

fn read_responses(document: &Value) -> Result<Vec<ResponseGroup>> {
    let responses = match document.get(KEY_RESPONSES) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Mapping(responses)) => responses,
        Some(_) => bail!("'{}' must be a mapping", KEY_RESPONSES),
    };

    responses
        .iter()
        .map(|(name, variants)| {
            let name = scalar_text(name);
            let variants = match variants {
                Value::Sequence(items) => items.clone(),
                Value::Null => Vec::new(),
                _ => bail!("Response '{}' must be a list of variants", name),
            };
            Ok(ResponseGroup { name, variants })
        })
        .collect()
}

fn header() -> Mapping {
    let mut document = Mapping::new();
    document.insert(
        Value::String("version".to_string()),
        Value::String(LATEST_TRAINING_DATA_FORMAT_VERSION.to_string()),
    );
    document
}

fn examples_block<'a>(lines: impl IntoIterator<Item = &'a str>) -> Value {
    let mut block = String::new();
    for line in lines {
        block.push_str("- ");
        block.push_str(line);
        block.push('\n');
    }
    Value::String(block)
}

fn named_block(key: &str, name: &str, examples: Value) -> Value {
    let mut block = Mapping::new();
    block.insert(Value::String(key.to_string()), Value::String(name.to_string()));
    block.insert(Value::String("examples".to_string()), examples);
    Value::Mapping(block)
}

/// Document with the version header and the `nlu` section only.
///
/// The `nlu` key is always present, so an empty split side is still a valid file.
pub fn nlu_document(data: &NluData) -> Value {
    let mut document = header();
    document.insert(Value::String(KEY_NLU.to_string()), Value::Sequence(nlu_blocks(data)));
    Value::Mapping(document)
}

/// Document with the version header and `responses` only.
pub fn responses_document(responses: &[ResponseGroup]) -> Value {
    let mut document = header();
    document.insert(
        Value::String(KEY_RESPONSES.to_string()),
        Value::Mapping(responses_mapping(responses)),
    );
    Value::Mapping(document)
}

/// Full document: `nlu` plus `responses` when there are any.
pub fn to_document(data: &NluData) -> Value {
    let mut document = nlu_document(data);
    if !data.responses.is_empty() {
        if let Value::Mapping(map) = &mut document {
            map.insert(
                Value::String(KEY_RESPONSES.to_string()),
                Value::Mapping(responses_mapping(&data.responses)),
            );
        }
    }
    document
}

pub fn to_string(document: &Value) -> Result<String> {
    serde_yaml::to_string(document).context("Failed to serialize training data")
}

fn responses_mapping(responses: &[ResponseGroup]) -> Mapping {
    responses
        .iter()
        .map(|group| {
            (
                Value::String(group.name.clone()),
                Value::Sequence(group.variants.clone()),
            )
        })
        .collect()
}

fn nlu_blocks(data: &NluData) -> Vec<Value> {
    let mut blocks = Vec::new();

    for intent in data.intents() {
        let examples: Vec<&TrainingExample> = data
            .examples
            .iter()
            .filter(|e| e.intent.as_deref() == Some(intent))
            .collect();
        let rendered: Vec<String> = examples
            .iter()
            .map(|e| markup::render(&e.text, &e.entities))
            .collect();

        let value = if examples.iter().any(|e| e.metadata.is_some()) {
            Value::Sequence(
                examples
                    .iter()
                    .zip(&rendered)
                    .map(|(example, text)| {
                        let mut item = Mapping::new();
                        item.insert(Value::String("text".to_string()), Value::String(text.clone()));
                        if let Some(metadata) = &example.metadata {
                            item.insert(Value::String("metadata".to_string()), metadata.clone());
                        }
                        Value::Mapping(item)
                    })
                    .collect(),
            )
        } else {
            examples_block(rendered.iter().map(String::as_str))
        };
        blocks.push(named_block("intent", intent, value));
    }

    let unlabeled = data.examples.iter().filter(|e| e.intent.is_none()).count();
    if unlabeled > 0 {
        tracing::warn!(
            "Dropping {} example(s) without an intent: the YAML format cannot express them",
            unlabeled
        );
    }

    let mut synonyms: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (surface, value) in &data.entity_synonyms {
        synonyms.entry(value.as_str()).or_default().push(surface.as_str());
    }
    for (value, surfaces) in synonyms {
        blocks.push(named_block("synonym", value, examples_block(surfaces)));
    }

    let mut regexes: Vec<(&str, Vec<&str>)> = Vec::new();
    for feature in &data.regex_features {
        match regexes.iter_mut().find(|(name, _)| *name == feature.name) {
            Some((_, patterns)) => patterns.push(feature.pattern.as_str()),
            None => regexes.push((feature.name.as_str(), vec![feature.pattern.as_str()])),
        }
    }
    for (name, patterns) in regexes {
        blocks.push(named_block("regex", name, examples_block(patterns)));
    }

    for table in &data.lookup_tables {
        blocks.push(named_block(
            "lookup",
            &table.name,
            examples_block(table.elements.iter().map(String::as_str)),
        ));
    }

    blocks
}
