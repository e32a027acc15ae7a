//! Legacy JSON training data format (`rasa_nlu_data`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{EntityAnnotation, LookupTable, NluData, RegexFeature, TrainingExample};

/// Printed whenever data is written in this format.
pub const DEPRECATION_WARNING: &str = "NLU data in Rasa JSON format is deprecated and will be \
     removed in a future version. Please convert your JSON NLU data to the YAML format.";

#[derive(Debug, Default, Serialize, Deserialize)]
struct JsonDocument {
    rasa_nlu_data: JsonNluData,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct JsonNluData {
    #[serde(default)]
    common_examples: Vec<JsonExample>,
    #[serde(default)]
    regex_features: Vec<RegexFeature>,
    #[serde(default)]
    lookup_tables: Vec<LookupTable>,
    #[serde(default)]
    entity_synonyms: Vec<JsonSynonym>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonExample {
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    intent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    entities: Vec<EntityAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonSynonym {
    value: String,
    synonyms: Vec<String>,
}

pub fn read_str(content: &str) -> Result<NluData> {
    let document: JsonDocument =
        serde_json::from_str(content).context("Failed to parse JSON training data")?;
    let raw = document.rasa_nlu_data;

    let mut data = NluData::default();
    for example in raw.common_examples {
        let metadata = example
            .metadata
            .map(serde_yaml::to_value)
            .transpose()
            .context("Invalid example metadata")?;
        data.push_example(TrainingExample {
            text: example.text,
            intent: example.intent.filter(|i| !i.is_empty()),
            entities: example.entities,
            metadata,
        });
    }
    for synonym in raw.entity_synonyms {
        for surface in synonym.synonyms {
            data.entity_synonyms.insert(surface, synonym.value.clone());
        }
    }
    data.regex_features = raw.regex_features;
    data.lookup_tables = raw.lookup_tables;
    Ok(data)
}

/// Serialize to pretty-printed JSON. Responses have no place in this format.
pub fn to_string(data: &NluData) -> Result<String> {
    if !data.responses.is_empty() {
        tracing::warn!(
            "Dropping {} response group(s): the JSON format cannot store responses",
            data.responses.len()
        );
    }

    let common_examples = data
        .examples
        .iter()
        .map(|example| {
            let metadata = example
                .metadata
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .context("Invalid example metadata")?;
            Ok(JsonExample {
                text: example.text.clone(),
                intent: example.intent.clone(),
                entities: example.entities.clone(),
                metadata,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (surface, value) in &data.entity_synonyms {
        grouped.entry(value.as_str()).or_default().push(surface.clone());
    }
    let entity_synonyms = grouped
        .into_iter()
        .map(|(value, synonyms)| JsonSynonym {
            value: value.to_string(),
            synonyms,
        })
        .collect();

    let document = JsonDocument {
        rasa_nlu_data: JsonNluData {
            common_examples,
            regex_features: data.regex_features.clone(),
            lookup_tables: data.lookup_tables.clone(),
            entity_synonyms,
        },
    };
    serde_json::to_string_pretty(&document).context("Failed to serialize training data")
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
  "rasa_nlu_data": {
    "common_examples": [
      {"text": "hello", "intent": "greet"},
      {
        "text": "fly to NYC",
        "intent": "inform",
        "entities": [{"start": 7, "end": 10, "value": "New York City", "entity": "city"}]
      }
    ],
    "regex_features": [{"name": "zipcode", "pattern": "[0-9]{5}"}],
    "lookup_tables": [{"name": "city", "elements": ["Berlin", "Paris"]}],
    "entity_synonyms": [{"value": "New York City", "synonyms": ["the big apple"]}]
  }
}"#;

    #[test]
    fn test_read_json() {
        let data = read_str(JSON).unwrap();

        assert_eq!(data.examples.len(), 2);
        assert_eq!(data.intents(), vec!["greet", "inform"]);
        assert_eq!(data.entity_synonyms.len(), 2);
        assert_eq!(data.regex_features.len(), 1);
        assert_eq!(data.lookup_tables[0].elements.len(), 2);
    }

    #[test]
    fn test_json_written_and_read_back() {
        let data = read_str(JSON).unwrap();
        let reread = read_str(&to_string(&data).unwrap()).unwrap();
        assert_eq!(reread, data);
    }

    #[test]
    fn test_missing_root_key_is_an_error() {
        assert!(read_str(r#"{"common_examples": []}"#).is_err());
    }
}
