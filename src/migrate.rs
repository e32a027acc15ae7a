//! Domain migration from the 2.x format to the 3.x format.
//!
//! - slot mappings declared under a form's `required_slots` move onto the slot,
//!   gated by `conditions: [{active_loop: <form>, requested_slot: <slot>}]`
//! - slots without mappings get `from_entity` for a same-named entity when
//!   `auto_fill` was on, `custom` otherwise
//! - `auto_fill` is dropped and `version` set to the latest format

use anyhow::{bail, Context, Result};
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::LATEST_TRAINING_DATA_FORMAT_VERSION;
use crate::files::{parse_yaml_document, scalar_text, write_together};

const KEY_VERSION: &str = "version";
const KEY_SLOTS: &str = "slots";
const KEY_FORMS: &str = "forms";
const KEY_ENTITIES: &str = "entities";
const KEY_MAPPINGS: &str = "mappings";
const KEY_REQUIRED_SLOTS: &str = "required_slots";
const KEY_AUTO_FILL: &str = "auto_fill";

/// Form keys that are not slot names in the oldest form syntax.
const FORM_SETTINGS: &[&str] = &[KEY_REQUIRED_SLOTS, "ignored_intents"];

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

/// Whether a `version` value is at least 3.0.
fn is_migrated(version: Option<&Value>) -> bool {
    let Some(version) = version else {
        return false;
    };
    let text = scalar_text(version);
    let major = text.split('.').next().unwrap_or_default();
    major.parse::<u32>().map(|m| m >= 3).unwrap_or(false)
}

fn entity_names(document: &Mapping) -> HashSet<String> {
    let Some(Value::Sequence(entities)) = document.get(KEY_ENTITIES) else {
        return HashSet::new();
    };
    entities
        .iter()
        .flat_map(|entity| match entity {
            Value::String(name) => vec![name.clone()],
            Value::Mapping(map) => map.keys().map(scalar_text).collect(),
            _ => Vec::new(),
        })
        .collect()
}

/// The slot → mappings table of a 2.x form, if the form uses one.
fn legacy_form_slots(form: &Mapping) -> Option<Vec<(String, Vec<Value>)>> {
    let table: Vec<(&Value, &Value)> = match form.get(KEY_REQUIRED_SLOTS) {
        Some(Value::Mapping(required)) => required.iter().collect(),
        Some(_) => return None,
        None => form
            .iter()
            .filter(|(k, _)| !FORM_SETTINGS.contains(&scalar_text(k).as_str()))
            .collect(),
    };
    if table.is_empty() && form.get(KEY_REQUIRED_SLOTS).is_none() {
        return None;
    }

    Some(
        table
            .into_iter()
            .map(|(slot, mappings)| {
                let mappings = match mappings {
                    Value::Sequence(items) => items.clone(),
                    _ => Vec::new(),
                };
                (scalar_text(slot), mappings)
            })
            .collect(),
    )
}

fn with_condition(mapping: &Value, form: &str, slot: &str) -> Value {
    let mut mapping = match mapping {
        Value::Mapping(map) => map.clone(),
        _ => Mapping::new(),
    };
    let mut condition = Mapping::new();
    condition.insert(key("active_loop"), key(form));
    condition.insert(key("requested_slot"), key(slot));
    mapping.insert(
        key("conditions"),
        Value::Sequence(vec![Value::Mapping(condition)]),
    );
    Value::Mapping(mapping)
}

fn single_mapping(pairs: &[(&str, &str)]) -> Value {
    let mut mapping = Mapping::new();
    for (k, v) in pairs {
        mapping.insert(key(k), key(v));
    }
    Value::Mapping(mapping)
}

/// Migrate a parsed 2.x domain document.
pub fn migrate_domain(document: Value) -> Result<Value> {
    let Value::Mapping(mut domain) = document else {
        bail!("The domain file must contain a mapping at the top level.");
    };
    if is_migrated(domain.get(KEY_VERSION)) {
        bail!(
            "The domain is already in the 3.x format (version {}). Nothing to migrate.",
            domain.get(KEY_VERSION).map(scalar_text).unwrap_or_default()
        );
    }

    let entities = entity_names(&domain);

    // slot -> mappings moved off forms, in form order
    let mut moved: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    if let Some(Value::Mapping(forms)) = domain.get_mut(KEY_FORMS) {
        for (form_name, form) in forms.iter_mut() {
            let form_name = scalar_text(form_name);
            let Value::Mapping(form_map) = form else {
                continue;
            };
            let Some(table) = legacy_form_slots(form_map) else {
                continue;
            };

            let mut required = Vec::with_capacity(table.len());
            for (slot, mappings) in table {
                form_map.remove(slot.as_str());
                let entry = moved.entry(slot.clone()).or_default();
                entry.extend(mappings.iter().map(|m| with_condition(m, &form_name, &slot)));
                required.push(Value::String(slot));
            }
            form_map.insert(key(KEY_REQUIRED_SLOTS), Value::Sequence(required));
            tracing::debug!("Moved slot mappings off form '{}'", form_name);
        }
    }

    if let Some(Value::Mapping(slots)) = domain.get_mut(KEY_SLOTS) {
        for (slot_name, slot) in slots.iter_mut() {
            let slot_name = scalar_text(slot_name);
            let Value::Mapping(slot_map) = slot else {
                continue;
            };

            let auto_fill = slot_map
                .remove(KEY_AUTO_FILL)
                .and_then(|v| v.as_bool())
                .unwrap_or(true);

            let mut mappings = match slot_map.remove(KEY_MAPPINGS) {
                Some(Value::Sequence(items)) => items,
                _ => Vec::new(),
            };
            let from_forms = moved.remove(&slot_name).unwrap_or_default();
            let had_mappings = !mappings.is_empty() || !from_forms.is_empty();
            mappings.extend(from_forms);

            if auto_fill && entities.contains(&slot_name) {
                mappings.insert(
                    0,
                    single_mapping(&[("type", "from_entity"), ("entity", slot_name.as_str())]),
                );
            } else if !had_mappings {
                mappings.push(single_mapping(&[("type", "custom")]));
            }
            slot_map.insert(key(KEY_MAPPINGS), Value::Sequence(mappings));
        }
    }

    for slot in moved.keys() {
        tracing::warn!(
            "Form slot '{}' is not declared under 'slots'; its mappings were dropped",
            slot
        );
    }

    domain.insert(
        key(KEY_VERSION),
        key(LATEST_TRAINING_DATA_FORMAT_VERSION),
    );
    Ok(Value::Mapping(domain))
}

/// Name of the backup written next to a domain that is migrated in place.
pub fn backup_path(domain: &Path) -> PathBuf {
    let name = domain
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "domain.yml".to_string());
    domain.with_file_name(format!("original_{}", name))
}

/// Migrate `input` and write the result to `output` (the input itself when `None`).
///
/// Migrating in place keeps the original as `original_<name>`.
pub fn migrate_file(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    if input.is_dir() {
        bail!(
            "Migrating a domain directory is not supported; pass the domain file '{}' directly.",
            input.display()
        );
    }
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read domain from {}", input.display()))?;
    let document = parse_yaml_document(&content)
        .with_context(|| format!("Invalid YAML in {}", input.display()))?;
    let migrated = migrate_domain(document)
        .with_context(|| format!("Failed to migrate {}", input.display()))?;
    let rendered = serde_yaml::to_string(&migrated).context("Failed to serialize domain")?;

    let target = output.unwrap_or(input).to_path_buf();
    let mut outputs = vec![(target.clone(), rendered)];
    if target == input {
        outputs.push((backup_path(input), content));
    }
    write_together(&outputs)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Domain, SlotMappingType};
    use tempfile::TempDir;

    const LEGACY: &str = r#"
version: "2.0"
entities:
- cuisine
- city
slots:
  cuisine:
    type: text
  city:
    type: text
    auto_fill: false
  num_people:
    type: float
  outdoor:
    type: bool
    influence_conversation: true
forms:
  restaurant_form:
    required_slots:
      num_people:
      - type: from_entity
        entity: number
      outdoor:
      - type: from_intent
        intent: affirm
        value: true
"#;

    fn migrate(yaml: &str) -> Domain {
        let migrated = migrate_domain(parse_yaml_document(yaml).unwrap()).unwrap();
        Domain::from_value(migrated).unwrap()
    }

    #[test]
    fn test_migrated_domain_loads() {
        let domain = migrate(LEGACY);

        assert_eq!(domain.version.as_deref(), Some("3.1"));
        let form = domain.form("restaurant_form").unwrap();
        assert_eq!(form.required_slots, vec!["num_people", "outdoor"]);
    }

    #[test]
    fn test_auto_fill_becomes_from_entity() {
        let domain = migrate(LEGACY);

        let cuisine = domain.slot("cuisine").unwrap();
        assert_eq!(cuisine.mappings.len(), 1);
        assert_eq!(cuisine.mappings[0].mapping_type, SlotMappingType::FromEntity);
        assert_eq!(cuisine.mappings[0].entity.as_deref(), Some("cuisine"));

        // auto_fill: false leaves a custom mapping
        let city = domain.slot("city").unwrap();
        assert_eq!(city.mappings[0].mapping_type, SlotMappingType::Custom);
    }

    #[test]
    fn test_form_mappings_move_onto_slots() {
        let domain = migrate(LEGACY);

        let outdoor = domain.slot("outdoor").unwrap();
        assert_eq!(outdoor.mappings.len(), 1);
        assert_eq!(outdoor.mappings[0].mapping_type, SlotMappingType::FromIntent);
        assert!(outdoor.mappings[0].applies_during("restaurant_form"));
        assert_eq!(
            outdoor.mappings[0].conditions[0].requested_slot.as_deref(),
            Some("outdoor")
        );
    }

    #[test]
    fn test_already_migrated_domain_is_rejected() {
        let err = migrate_domain(parse_yaml_document("version: \"3.1\"\nintents: []\n").unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("already in the 3.x format"));
    }

    #[test]
    fn test_migrate_in_place_keeps_backup() {
        let tmp = TempDir::new().unwrap();
        let domain = tmp.path().join("domain.yml");
        fs::write(&domain, LEGACY).unwrap();

        let written = migrate_file(&domain, None).unwrap();

        assert_eq!(written, domain);
        assert_eq!(fs::read_to_string(backup_path(&domain)).unwrap(), LEGACY);
        assert!(Domain::load(&domain).is_ok());
    }
}
