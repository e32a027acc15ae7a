//! Domain model: intents, entities, slots, forms, actions and responses.
//!
//! Lists keep declaration order and are never deduplicated while loading, so
//! the validator can report names declared twice (including across the files
//! of a domain directory).

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::constants::DEFAULT_ACTIONS;
use crate::errors::InvalidDomain;
use crate::files::{is_yaml_file, optional_scalar, read_yaml_file, training_files};

mod slots;

pub use slots::{Form, MappingCondition, Slot, SlotMapping, SlotMappingType};
use slots::SlotDefinition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub name: String,
    /// Action the intent was mapped to by the retired `triggers` property.
    pub triggers: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub roles: Vec<String>,
    pub groups: Vec<String>,
}

/// A named response with its variants kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseGroup {
    pub name: String,
    pub variants: Vec<Value>,
}

/// A name that is declared more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateName {
    /// Plural section name, e.g. `intents`.
    pub kind: &'static str,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct Domain {
    pub version: Option<String>,
    pub intents: Vec<Intent>,
    pub entities: Vec<Entity>,
    pub slots: Vec<Slot>,
    pub forms: Vec<Form>,
    pub actions: Vec<String>,
    pub responses: Vec<ResponseGroup>,
    /// Deprecation notices raised while parsing; passed on unchanged by the validator.
    pub warnings: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDomain {
    #[serde(default, deserialize_with = "optional_scalar")]
    version: Option<String>,
    #[serde(default)]
    intents: Option<Vec<NameOrProperties<IntentProperties>>>,
    #[serde(default)]
    entities: Option<Vec<NameOrProperties<EntityProperties>>>,
    #[serde(default)]
    slots: Option<Mapping>,
    #[serde(default)]
    forms: Option<Mapping>,
    #[serde(default)]
    actions: Option<Vec<NameOrProperties<Value>>>,
    #[serde(default)]
    responses: Option<Mapping>,
}

/// List entry written either as a bare name or as `name: {properties}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NameOrProperties<P> {
    Name(String),
    Detailed(BTreeMap<String, Option<P>>),
}

impl<P> NameOrProperties<P> {
    fn into_entries(self) -> Vec<(String, Option<P>)> {
        match self {
            NameOrProperties::Name(name) => vec![(name, None)],
            NameOrProperties::Detailed(map) => map.into_iter().collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct IntentProperties {
    #[serde(default)]
    triggers: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EntityProperties {
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    groups: Vec<String>,
}

impl Domain {
    /// Load a domain from a file, or merge every YAML file of a directory.
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() {
            let mut domain = Domain::default();
            for file in training_files(path)?.iter().filter(|f| is_yaml_file(f)) {
                domain.merge(Self::load_file(file)?);
            }
            return Ok(domain);
        }
        Self::load_file(path)
    }

    fn load_file(path: &Path) -> Result<Self> {
        let document = read_yaml_file(path)?;
        Self::from_value(document)
            .with_context(|| format!("Failed to load domain from {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Self::from_value(crate::files::parse_yaml_document(content)?)
    }

    pub fn from_value(document: Value) -> Result<Self> {
        if document.is_null() {
            return Ok(Domain::default());
        }
        if !document.is_mapping() {
            return Err(InvalidDomain::NotAMapping.into());
        }
        let raw: RawDomain = serde_yaml::from_value(document).context("Failed to parse domain")?;

        let mut domain = Domain {
            version: raw.version,
            ..Default::default()
        };

        let intents = raw.intents.unwrap_or_default();
        for (name, props) in intents.into_iter().flat_map(NameOrProperties::into_entries) {
            let triggers = props.and_then(|p: IntentProperties| p.triggers);
            if let Some(action) = &triggers {
                domain.warnings.push(format!(
                    "The intent '{}' is mapped to the action '{}' via 'triggers'. Mapping \
                     intents to actions is no longer supported. Please migrate to RulePolicy.",
                    name, action
                ));
            }
            domain.intents.push(Intent { name, triggers });
        }

        let entities = raw.entities.unwrap_or_default();
        for (name, props) in entities.into_iter().flat_map(NameOrProperties::into_entries) {
            let props = props.unwrap_or_default();
            domain.entities.push(Entity {
                name,
                roles: props.roles,
                groups: props.groups,
            });
        }

        for (key, value) in raw.slots.unwrap_or_default() {
            let name = section_key("slots", &key)?;
            let definition: SlotDefinition = serde_yaml::from_value(value)
                .with_context(|| format!("Invalid definition of slot '{}'", name))?;
            let mappings = definition
                .mappings
                .ok_or_else(|| InvalidDomain::SlotWithoutMappings { slot: name.clone() })?;
            domain.slots.push(Slot {
                name,
                slot_type: definition.slot_type,
                influence_conversation: definition.influence_conversation,
                mappings,
            });
        }

        for (key, value) in raw.forms.unwrap_or_default() {
            let name = section_key("forms", &key)?;
            domain.forms.push(parse_form(name, &value)?);
        }

        let actions = raw.actions.unwrap_or_default();
        for (name, _) in actions.into_iter().flat_map(NameOrProperties::into_entries) {
            domain.actions.push(name);
        }

        for (key, value) in raw.responses.unwrap_or_default() {
            let name = section_key("responses", &key)?;
            let variants = match value {
                Value::Sequence(items) => items,
                Value::Null => Vec::new(),
                _ => {
                    return Err(InvalidDomain::Malformed {
                        section: "responses".to_string(),
                        reason: format!("response '{}' must be a list of variants", name),
                    }
                    .into())
                }
            };
            domain.responses.push(ResponseGroup { name, variants });
        }

        Ok(domain)
    }

    /// Append another domain's declarations after this one's.
    pub fn merge(&mut self, other: Domain) {
        if self.version.is_none() {
            self.version = other.version;
        }
        self.intents.extend(other.intents);
        self.entities.extend(other.entities);
        self.slots.extend(other.slots);
        self.forms.extend(other.forms);
        self.actions.extend(other.actions);
        self.responses.extend(other.responses);
        self.warnings.extend(other.warnings);
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
            && self.entities.is_empty()
            && self.slots.is_empty()
            && self.forms.is_empty()
            && self.actions.is_empty()
            && self.responses.is_empty()
    }

    pub fn intent_names(&self) -> impl Iterator<Item = &str> {
        self.intents.iter().map(|i| i.name.as_str())
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.name.as_str())
    }

    pub fn form_names(&self) -> impl Iterator<Item = &str> {
        self.forms.iter().map(|f| f.name.as_str())
    }

    pub fn response_names(&self) -> impl Iterator<Item = &str> {
        self.responses.iter().map(|r| r.name.as_str())
    }

    pub fn has_intent(&self, name: &str) -> bool {
        self.intent_names().any(|i| i == name)
    }

    pub fn has_entity(&self, name: &str) -> bool {
        self.entity_names().any(|e| e == name)
    }

    pub fn has_response(&self, name: &str) -> bool {
        self.response_names().any(|r| r == name)
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn form(&self, name: &str) -> Option<&Form> {
        self.forms.iter().find(|f| f.name == name)
    }

    /// Every name a story step may use as an action.
    ///
    /// Declared actions, responses and forms all count, as do the built-in actions.
    pub fn action_names(&self) -> HashSet<&str> {
        self.actions
            .iter()
            .map(String::as_str)
            .chain(self.response_names())
            .chain(self.form_names())
            .chain(DEFAULT_ACTIONS.iter().copied())
            .collect()
    }

    pub fn duplicates(&self) -> Vec<DuplicateName> {
        let sections: [(&'static str, Vec<&str>); 6] = [
            ("intents", self.intent_names().collect()),
            ("entities", self.entity_names().collect()),
            ("actions", self.actions.iter().map(String::as_str).collect()),
            ("slots", self.slots.iter().map(|s| s.name.as_str()).collect()),
            ("forms", self.form_names().collect()),
            ("responses", self.response_names().collect()),
        ];

        sections
            .into_iter()
            .flat_map(|(kind, names)| {
                duplicate_names(names)
                    .into_iter()
                    .map(move |name| DuplicateName { kind, name })
            })
            .collect()
    }
}

/// Names occurring more than once, each reported once in order of its second occurrence.
pub fn duplicate_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for name in names {
        if !seen.insert(name) && reported.insert(name) {
            duplicates.push(name.to_string());
        }
    }

    duplicates
}

fn section_key(section: &str, key: &Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(s.clone()),
        other => Err(InvalidDomain::Malformed {
            section: section.to_string(),
            reason: format!("expected a name, found {:?}", other),
        }
        .into()),
    }
}

fn parse_form(name: String, value: &Value) -> Result<Form> {
    let required_slots = match value.get("required_slots") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(slot) => Ok(slot.clone()),
                _ => Err(InvalidDomain::Malformed {
                    section: "forms".to_string(),
                    reason: format!("required slots of form '{}' must be slot names", name),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(Value::Mapping(_)) => {
            return Err(InvalidDomain::LegacyRequiredSlots { form: name }.into())
        }
        Some(_) => {
            return Err(InvalidDomain::Malformed {
                section: "forms".to_string(),
                reason: format!("required slots of form '{}' must be a list", name),
            }
            .into())
        }
    };

    let ignored_intents = match value.get("ignored_intents") {
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(|i| i.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(intent)) => vec![intent.clone()],
        _ => Vec::new(),
    };

    Ok(Form {
        name,
        required_slots,
        ignored_intents,
    })
}
