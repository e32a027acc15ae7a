//! Inline entity markup inside example texts.
//!
//! Supported forms:
//! - `[Berlin](city)`
//! - `[NYC](city:New York City)` (synonym)
//! - `[Berlin]{"entity": "city", "role": "destination"}`

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use super::EntityAnnotation;

const ENTITY_MARKUP_PATTERN: &str =
    r"\[(?P<text>[^\]]+?)\](?:\((?P<entity>[^:)]+?)(?::(?P<value>[^)]+))?\)|(?P<dict>\{[^}]+?\}))";

fn entity_markup() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ENTITY_MARKUP_PATTERN).expect("entity markup pattern is valid"))
}

#[derive(Debug, Deserialize)]
struct EntityDict {
    entity: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    group: Option<String>,
}

/// Split annotated text into plain text and its entity annotations.
pub fn parse(annotated: &str) -> Result<(String, Vec<EntityAnnotation>)> {
    let mut plain = String::with_capacity(annotated.len());
    let mut entities = Vec::new();
    let mut last = 0;

    for caps in entity_markup().captures_iter(annotated) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(surface) = caps.name("text").map(|m| m.as_str()) else {
            continue;
        };

        plain.push_str(&annotated[last..whole.start()]);
        let start = plain.chars().count();
        plain.push_str(surface);
        let end = start + surface.chars().count();
        last = whole.end();

        let annotation = match (caps.name("entity"), caps.name("dict")) {
            (Some(entity), _) => EntityAnnotation {
                start,
                end,
                value: caps
                    .name("value")
                    .map(|v| v.as_str().to_string())
                    .unwrap_or_else(|| surface.to_string()),
                entity: entity.as_str().trim().to_string(),
                role: None,
                group: None,
            },
            (None, Some(dict)) => {
                let parsed: EntityDict = serde_json::from_str(dict.as_str()).with_context(|| {
                    format!("Invalid entity annotation {} in '{}'", dict.as_str(), annotated)
                })?;
                EntityAnnotation {
                    start,
                    end,
                    value: parsed.value.unwrap_or_else(|| surface.to_string()),
                    entity: parsed.entity,
                    role: parsed.role,
                    group: parsed.group,
                }
            }
            (None, None) => continue,
        };
        entities.push(annotation);
    }

    plain.push_str(&annotated[last..]);
    Ok((plain, entities))
}

/// Render plain text with its annotations back into markup.
///
/// Overlapping annotations cannot be expressed inline; later ones are dropped.
pub fn render(text: &str, entities: &[EntityAnnotation]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut sorted: Vec<&EntityAnnotation> = entities.iter().collect();
    sorted.sort_by_key(|e| (e.start, e.end));

    let mut out = String::with_capacity(text.len() + entities.len() * 16);
    let mut position = 0;

    for entity in sorted {
        if entity.start < position || entity.end > chars.len() || entity.start >= entity.end {
            tracing::debug!(
                "Dropping annotation {}..{} that cannot be rendered in '{}'",
                entity.start,
                entity.end,
                text
            );
            continue;
        }
        out.extend(&chars[position..entity.start]);
        let surface: String = chars[entity.start..entity.end].iter().collect();
        out.push('[');
        out.push_str(&surface);
        out.push(']');
        out.push_str(&annotation_suffix(entity, &surface));
        position = entity.end;
    }

    out.extend(&chars[position..]);
    out
}

fn annotation_suffix(entity: &EntityAnnotation, surface: &str) -> String {
    if entity.role.is_none() && entity.group.is_none() {
        return if entity.value == surface {
            format!("({})", entity.entity)
        } else {
            format!("({}:{})", entity.entity, entity.value)
        };
    }

    let mut dict = serde_json::Map::new();
    dict.insert("entity".to_string(), entity.entity.clone().into());
    if let Some(role) = &entity.role {
        dict.insert("role".to_string(), role.clone().into());
    }
    if let Some(group) = &entity.group {
        dict.insert("group".to_string(), group.clone().into());
    }
    if entity.value != surface {
        dict.insert("value".to_string(), entity.value.clone().into());
    }
    serde_json::Value::Object(dict).to_string()
}
