//! Slots, slot mappings and forms.

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::config::defaults::default_true;

/// How a slot mapping extracts its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotMappingType {
    FromEntity,
    FromIntent,
    FromTriggerIntent,
    FromText,
    Custom,
}

/// Gate on a slot mapping: it only applies while the condition holds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MappingCondition {
    /// Form that must be active; `None` means "no form active".
    #[serde(default)]
    pub active_loop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_slot: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotMapping {
    #[serde(rename = "type")]
    pub mapping_type: SlotMappingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub intent: Vec<String>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub not_intent: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<MappingCondition>,
}

impl SlotMapping {
    /// Whether this mapping may fire while `form` is the active loop.
    ///
    /// Unconditioned mappings fire in every context.
    pub fn applies_during(&self, form: &str) -> bool {
        self.conditions.is_empty()
            || self
                .conditions
                .iter()
                .any(|c| c.active_loop.as_deref() == Some(form))
    }

    /// Forms named by this mapping's conditions, in declaration order.
    pub fn condition_forms(&self) -> impl Iterator<Item = &str> {
        self.conditions
            .iter()
            .filter_map(|c| c.active_loop.as_deref())
    }
}

/// Slot declaration as written in the domain file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SlotDefinition {
    #[serde(rename = "type")]
    pub slot_type: String,
    #[serde(default = "default_true")]
    pub influence_conversation: bool,
    #[serde(default)]
    pub mappings: Option<Vec<SlotMapping>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub slot_type: String,
    pub influence_conversation: bool,
    /// Ordered as declared.
    pub mappings: Vec<SlotMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub name: String,
    /// Ordered as declared.
    pub required_slots: Vec<String>,
    pub ignored_intents: Vec<String>,
}

impl Form {
    pub fn requires(&self, slot: &str) -> bool {
        self.required_slots.iter().any(|s| s == slot)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(name)) => vec![name],
        Some(OneOrMany::Many(names)) => names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> SlotMapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_unconditioned_mapping_applies_everywhere() {
        let m = mapping("type: from_text\n");
        assert!(m.applies_during("booking_form"));
        assert_eq!(m.condition_forms().count(), 0);
    }

    #[test]
    fn test_conditioned_mapping_applies_only_to_its_form() {
        let m = mapping(
            "type: from_text\nintent: inform\nconditions:\n  - active_loop: booking_form\n",
        );
        assert!(m.applies_during("booking_form"));
        assert!(!m.applies_during("name_form"));
        assert_eq!(m.intent, vec!["inform".to_string()]);
    }

    #[test]
    fn test_null_active_loop_condition() {
        let m = mapping("type: from_entity\nentity: city\nconditions:\n  - active_loop: null\n");
        assert_eq!(m.conditions[0].active_loop, None);
        assert!(!m.applies_during("booking_form"));
        assert_eq!(m.condition_forms().count(), 0);
    }

    #[test]
    fn test_intent_list_and_unknown_type() {
        let m = mapping("type: from_intent\nvalue: true\nintent: [affirm, thankyou]\n");
        assert_eq!(m.intent.len(), 2);
        assert!(serde_yaml::from_str::<SlotMapping>("type: from_nowhere\n").is_err());
    }
}
