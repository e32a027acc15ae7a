//! Stories and rules: named sequences of dialogue steps.
//!
//! Each block keeps the mapping it was parsed from, so splitting can write
//! stories back exactly as the author wrote them.

use anyhow::{bail, Context, Result};
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::files::scalar_text;

pub const KEY_STORIES: &str = "stories";
pub const KEY_RULES: &str = "rules";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Story,
    Rule,
}

impl BlockKind {
    /// Key naming a block inside its list (`story: …` / `rule: …`).
    pub fn name_key(self) -> &'static str {
        match self {
            BlockKind::Story => "story",
            BlockKind::Rule => "rule",
        }
    }

    pub fn section_key(self) -> &'static str {
        match self {
            BlockKind::Story => KEY_STORIES,
            BlockKind::Rule => KEY_RULES,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_key())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// User turn classified as `name`, with the entity types it carries.
    Intent { name: String, entities: Vec<String> },
    /// User turn given as raw text without an intent.
    UserText(String),
    Action(String),
    /// Bot turn given as raw text.
    BotText(String),
    /// `None` is the "no form active" sentinel (`active_loop: null`).
    ActiveLoop(Option<String>),
    SlotWasSet(Vec<(String, String)>),
    Checkpoint(String),
    Or(Vec<Step>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoryBlock {
    pub name: String,
    pub kind: BlockKind,
    pub steps: Vec<Step>,
    pub source: Option<PathBuf>,
    raw: Mapping,
}

impl StoryBlock {
    /// The block exactly as it was read.
    pub fn raw(&self) -> &Mapping {
        &self.raw
    }

    /// All steps, with `or` alternatives flattened in place.
    pub fn flat_steps(&self) -> Vec<&Step> {
        fn walk<'a>(steps: &'a [Step], out: &mut Vec<&'a Step>) {
            for step in steps {
                match step {
                    Step::Or(alternatives) => walk(alternatives, out),
                    other => out.push(other),
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.steps, &mut out);
        out
    }

    pub fn intents(&self) -> impl Iterator<Item = &str> {
        self.flat_steps().into_iter().filter_map(|s| match s {
            Step::Intent { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.flat_steps().into_iter().filter_map(|s| match s {
            Step::Action(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Forms named by `active_loop` steps; the null sentinel is skipped.
    pub fn active_loops(&self) -> impl Iterator<Item = &str> {
        self.flat_steps().into_iter().filter_map(|s| match s {
            Step::ActiveLoop(Some(form)) => Some(form.as_str()),
            _ => None,
        })
    }

    pub fn location(&self) -> String {
        match &self.source {
            Some(path) => format!("'{}' in {}", self.name, path.display()),
            None => format!("'{}'", self.name),
        }
    }
}

/// Read the `stories` and `rules` sections of a training data document.
pub fn parse_blocks(document: &Value, source: Option<&Path>) -> Result<Vec<StoryBlock>> {
    let mut blocks = Vec::new();
    for kind in [BlockKind::Story, BlockKind::Rule] {
        blocks.extend(parse_section(document, kind, source)?);
    }
    Ok(blocks)
}

/// Read one section (`stories` or `rules`) of a document.
pub fn parse_section(
    document: &Value,
    kind: BlockKind,
    source: Option<&Path>,
) -> Result<Vec<StoryBlock>> {
    let items = match document.get(kind.section_key()) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Sequence(items)) => items,
        Some(_) => bail!("'{}' must be a list", kind.section_key()),
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            parse_block(item, kind, source)
                .with_context(|| format!("Invalid {} #{}", kind, index + 1))
        })
        .collect()
}

fn parse_block(item: &Value, kind: BlockKind, source: Option<&Path>) -> Result<StoryBlock> {
    let Some(raw) = item.as_mapping() else {
        bail!("expected a mapping with '{}' and 'steps'", kind.name_key());
    };
    let name = match raw.get(kind.name_key()) {
        Some(value) if !value.is_null() => scalar_text(value),
        _ => bail!("missing '{}' name", kind.name_key()),
    };

    let steps = match raw.get("steps") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(items)) => parse_steps(items, &name)?,
        Some(_) => bail!("steps of '{}' must be a list", name),
    };

    Ok(StoryBlock {
        name,
        kind,
        steps,
        source: source.map(Path::to_path_buf),
        raw: raw.clone(),
    })
}

fn parse_steps(items: &[Value], block: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::with_capacity(items.len());
    for item in items {
        let Some(step) = item.as_mapping() else {
            bail!("step {:?} in '{}' must be a mapping", item, block);
        };
        match parse_step(step, block)? {
            Some(parsed) => steps.push(parsed),
            None => tracing::debug!("Skipping unrecognised step {:?} in '{}'", step, block),
        }
    }
    Ok(steps)
}

fn parse_step(step: &Mapping, block: &str) -> Result<Option<Step>> {
    if let Some(intent) = step.get("intent") {
        return Ok(Some(Step::Intent {
            name: scalar_text(intent),
            entities: step_entities(step.get("entities")),
        }));
    }
    if let Some(text) = step.get("user") {
        return Ok(Some(Step::UserText(scalar_text(text))));
    }
    if let Some(action) = step.get("action") {
        return Ok(Some(Step::Action(scalar_text(action))));
    }
    if let Some(text) = step.get("bot") {
        return Ok(Some(Step::BotText(scalar_text(text))));
    }
    if let Some(active_loop) = step.get("active_loop") {
        let form = match active_loop {
            Value::Null => None,
            other => Some(scalar_text(other)),
        };
        return Ok(Some(Step::ActiveLoop(form)));
    }
    if let Some(slots) = step.get("slot_was_set") {
        return Ok(Some(Step::SlotWasSet(slot_events(slots))));
    }
    if let Some(checkpoint) = step.get("checkpoint") {
        return Ok(Some(Step::Checkpoint(scalar_text(checkpoint))));
    }
    if let Some(alternatives) = step.get("or") {
        let Some(items) = alternatives.as_sequence() else {
            bail!("'or' step in '{}' must be a list", block);
        };
        return Ok(Some(Step::Or(parse_steps(items, block)?)));
    }
    Ok(None)
}

fn step_entities(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Sequence(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .flat_map(|item| match item {
            Value::String(entity) => vec![entity.clone()],
            Value::Mapping(map) => map.keys().map(scalar_text).collect(),
            _ => Vec::new(),
        })
        .collect()
}

fn slot_events(value: &Value) -> Vec<(String, String)> {
    let items = match value {
        Value::Sequence(items) => items.as_slice(),
        _ => return Vec::new(),
    };
    items
        .iter()
        .flat_map(|item| match item {
            // bare slot name: set to a truthy value
            Value::String(slot) => vec![(slot.clone(), "true".to_string())],
            Value::Mapping(map) => map
                .iter()
                .map(|(k, v)| (scalar_text(k), scalar_text(v)))
                .collect(),
            _ => Vec::new(),
        })
        .collect()
}

/// Serialize blocks back into a training data document.
pub fn to_document(version: &str, kind: BlockKind, blocks: &[StoryBlock]) -> Value {
    let mut document = Mapping::new();
    document.insert(
        Value::String("version".to_string()),
        Value::String(version.to_string()),
    );
    document.insert(
        Value::String(kind.section_key().to_string()),
        Value::Sequence(blocks.iter().map(|b| Value::Mapping(b.raw.clone())).collect()),
    );
    Value::Mapping(document)
}
