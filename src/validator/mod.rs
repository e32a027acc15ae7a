//! Consistency checks across the domain, stories, rules and NLU data.
//!
//! [`Validator::validate`] runs the checks in a fixed order and collects their
//! findings into a [`Verdict`]:
//!
//! 1. duplicate names (stops the run when any are found)
//! 2. empty domain
//! 3. domain parser warnings, passed through unchanged
//! 4. domain checks: actions, forms, form slots, slot mapping conditions
//! 5. dialogue checks: intents, utterances, unused declarations, conflicts
//! 6. NLU checks: intents, examples, entities
//! 7. config checks: assistant id, deprecated policies
//!
//! In stories-only mode steps 2-4 and 6 are skipped and step 5 only looks for
//! story structure conflicts.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::{default_max_history, AssistantId, ValidationSettings};
use crate::constants::{ASSISTANT_ID_KEY, DEFAULT_INTENTS, UTTER_PREFIX};
use crate::dialogue::{BlockKind, StoryBlock};
use crate::domain::{duplicate_names, SlotMappingType};
use crate::importer::TrainingData;
use crate::validation::{Finding, FindingKind, Verdict};

pub mod conflicts;

/// Intent name without its retrieval suffix (`chitchat/ask_name` → `chitchat`).
fn base_intent(intent: &str) -> &str {
    intent.split('/').next().unwrap_or(intent)
}

pub struct Validator<'a> {
    data: &'a TrainingData,
}

impl<'a> Validator<'a> {
    pub fn new(data: &'a TrainingData) -> Self {
        Self { data }
    }

    pub fn validate(&self, settings: &ValidationSettings) -> Verdict {
        let mut verdict = Verdict::new(settings.fail_on_warnings);

        tracing::info!("Validating for duplicate names...");
        let duplicates = self.duplicate_findings();
        if !duplicates.is_empty() {
            verdict.extend(duplicates);
            tracing::debug!("Duplicate names found, skipping remaining checks");
            return verdict;
        }

        if !settings.stories_only {
            if self.data.domain.is_empty() {
                verdict.push(Finding::new(
                    FindingKind::EmptyDomain,
                    "domain",
                    "Encountered empty domain during validation.",
                ));
                return verdict;
            }

            verdict.extend(self.domain_warnings());

            tracing::info!("Validating domain...");
            verdict.extend(self.unknown_actions());
            verdict.extend(self.unknown_forms());
            verdict.extend(self.form_slots());
            verdict.extend(self.slot_mapping_conditions());

            tracing::info!("Validating stories and rules...");
            verdict.extend(self.unknown_intents_in_dialogue());
            verdict.extend(self.unknown_utterances());
            verdict.extend(self.unused_intents());
            verdict.extend(self.unused_utterances());
        }

        tracing::info!("Validating story structure...");
        verdict.extend(self.story_conflicts(settings));

        if !settings.stories_only {
            tracing::info!("Validating NLU data...");
            verdict.extend(self.nlu_intents_not_in_domain());
            verdict.extend(self.intents_without_examples());
            verdict.extend(self.duplicate_examples());
            verdict.extend(self.unknown_entities());
        }

        tracing::info!("Validating config...");
        verdict.extend(self.assistant_id());
        verdict.extend(self.deprecated_policies());

        verdict
    }

    fn duplicate_findings(&self) -> Vec<Finding> {
        let mut findings: Vec<Finding> = self
            .data
            .domain
            .duplicates()
            .into_iter()
            .map(|duplicate| {
                Finding::new(
                    FindingKind::DuplicateName,
                    duplicate.name.clone(),
                    format!(
                        "'{}' is declared more than once in the domain's {}.",
                        duplicate.name, duplicate.kind
                    ),
                )
            })
            .collect();

        for kind in [BlockKind::Story, BlockKind::Rule] {
            let blocks: Vec<&StoryBlock> = self
                .data
                .stories
                .iter()
                .filter(|b| b.kind == kind)
                .collect();
            for name in duplicate_names(blocks.iter().map(|b| b.name.as_str())) {
                let locations: Vec<String> = blocks
                    .iter()
                    .filter(|b| b.name == name)
                    .map(|b| b.location())
                    .collect();
                findings.push(Finding::new(
                    FindingKind::DuplicateName,
                    name.clone(),
                    format!(
                        "The {} name '{}' is used more than once: {}. Each {} needs a unique name.",
                        kind,
                        name,
                        locations.join(", "),
                        kind
                    ),
                ));
            }
        }

        findings
    }

    fn domain_warnings(&self) -> Vec<Finding> {
        self.data
            .domain
            .warnings
            .iter()
            .map(|warning| Finding::new(FindingKind::DomainWarning, "domain", warning.clone()))
            .collect()
    }

    fn unknown_actions(&self) -> Vec<Finding> {
        let known = self.data.domain.action_names();
        let mut findings = Vec::new();

        for block in &self.data.stories {
            let mut reported = HashSet::new();
            for action in block.actions() {
                if action.starts_with(UTTER_PREFIX) || known.contains(action) {
                    continue;
                }
                if reported.insert(action) {
                    findings.push(
                        Finding::new(
                            FindingKind::UnknownAction,
                            action,
                            format!(
                                "The action '{}' is used in the {} {}, but it is not listed in \
                                 the domain file.",
                                action,
                                block.kind,
                                block.location()
                            ),
                        )
                        .with_suggestion("Add it to the 'actions' or 'forms' of your domain"),
                    );
                }
            }
        }

        findings
    }

    fn unknown_forms(&self) -> Vec<Finding> {
        let domain = &self.data.domain;
        let mut findings = Vec::new();

        for block in &self.data.stories {
            let mut reported = HashSet::new();
            for form in block.active_loops() {
                if domain.form(form).is_some() || !reported.insert(form) {
                    continue;
                }
                findings.push(Finding::new(
                    FindingKind::UnknownForm,
                    form,
                    format!(
                        "The form '{}' is used in the {} {}, but it is not listed in the domain \
                         file.",
                        form,
                        block.kind,
                        block.location()
                    ),
                ));
            }
        }

        findings
    }

    fn form_slots(&self) -> Vec<Finding> {
        let domain = &self.data.domain;
        let mut findings = Vec::new();

        for form in &domain.forms {
            for slot_name in &form.required_slots {
                let Some(slot) = domain.slot(slot_name) else {
                    findings.push(
                        Finding::new(
                            FindingKind::FormSlotsNotMatching,
                            form.name.clone(),
                            format!(
                                "The form slot '{}' in form '{}' is not present in the domain \
                                 slots.",
                                slot_name, form.name
                            ),
                        )
                        .with_suggestion("Add the slot to the 'slots' section or fix its name"),
                    );
                    continue;
                };

                let reachable = slot.mappings.is_empty()
                    || slot.mappings.iter().any(|m| m.applies_during(&form.name));
                if !reachable {
                    findings.push(Finding::new(
                        FindingKind::FormSlotsNotMatching,
                        form.name.clone(),
                        format!(
                            "The slot '{}' is required by form '{}', but none of its mappings \
                             apply while that form is active.",
                            slot_name, form.name
                        ),
                    ));
                }
            }
        }

        findings
    }

    fn slot_mapping_conditions(&self) -> Vec<Finding> {
        let domain = &self.data.domain;
        let mut findings = Vec::new();

        for slot in &domain.slots {
            let mut reported = HashSet::new();
            for mapping in &slot.mappings {
                for form_name in mapping.condition_forms() {
                    if !reported.insert(form_name) {
                        continue;
                    }
                    match domain.form(form_name) {
                        None => findings.push(Finding::new(
                            FindingKind::SlotMappingUnknownForm,
                            slot.name.clone(),
                            format!(
                                "The slot '{}' has a mapping condition for form '{}' which is \
                                 not listed in the domain forms. Please add this form to the \
                                 forms section or check for typos.",
                                slot.name, form_name
                            ),
                        )),
                        Some(form)
                            if !form.requires(&slot.name)
                                && mapping.mapping_type != SlotMappingType::FromTriggerIntent =>
                        {
                            findings.push(
                                Finding::new(
                                    FindingKind::SlotMappingNotRequired,
                                    slot.name.clone(),
                                    format!(
                                        "Slot '{}' has a mapping condition for form '{}', but \
                                         the form does not list this slot in its \
                                         'required_slots'. The mapping will never be applied.",
                                        slot.name, form_name
                                    ),
                                )
                                .with_suggestion(format!(
                                    "Add '{}' to the required_slots of '{}' or remove the \
                                     condition",
                                    slot.name, form_name
                                )),
                            )
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        findings
    }

    fn unknown_intents_in_dialogue(&self) -> Vec<Finding> {
        let domain = &self.data.domain;
        let mut findings = Vec::new();

        for block in &self.data.stories {
            let mut reported = HashSet::new();
            for intent in block.intents() {
                let base = base_intent(intent);
                if domain.has_intent(base) || DEFAULT_INTENTS.contains(&base) {
                    continue;
                }
                if reported.insert(intent) {
                    findings.push(Finding::new(
                        FindingKind::UnknownIntentInStory,
                        intent,
                        format!(
                            "The intent '{}' is used in the {} {}, but it is not listed in the \
                             domain file. You should add it to your domain file!",
                            intent,
                            block.kind,
                            block.location()
                        ),
                    ));
                }
            }
        }

        findings
    }

    /// Whether `action` resolves to a response, a declared action, or a
    /// retrieval response group (`utter_faq` covers `utter_faq/ask_name`).
    fn has_utterance(&self, action: &str) -> bool {
        let domain = &self.data.domain;
        domain.has_response(action)
            || domain.actions.iter().any(|a| a == action)
            || domain
                .response_names()
                .any(|r| base_intent(r) == action && r.contains('/'))
    }

    fn unknown_utterances(&self) -> Vec<Finding> {
        let mut findings = Vec::new();

        for block in &self.data.stories {
            let mut reported = HashSet::new();
            for action in block.actions() {
                if !action.starts_with(UTTER_PREFIX) || self.has_utterance(action) {
                    continue;
                }
                if reported.insert(action) {
                    findings.push(Finding::new(
                        FindingKind::UnknownUtterance,
                        action,
                        format!(
                            "The action '{}' is used in the {} {}, but there is no response \
                             with that name in the domain.",
                            action,
                            block.kind,
                            block.location()
                        ),
                    ));
                }
            }
        }

        findings
    }

    fn unused_intents(&self) -> Vec<Finding> {
        let used: HashSet<&str> = self
            .data
            .stories
            .iter()
            .flat_map(|b| b.intents().map(base_intent).collect::<Vec<_>>())
            .collect();

        self.data
            .domain
            .intent_names()
            .filter(|intent| !used.contains(intent) && !DEFAULT_INTENTS.contains(intent))
            .map(|intent| {
                Finding::new(
                    FindingKind::UnusedIntent,
                    intent,
                    format!(
                        "The intent '{}' is not used in any story or rule.",
                        intent
                    ),
                )
            })
            .collect()
    }

    fn unused_utterances(&self) -> Vec<Finding> {
        let used: HashSet<&str> = self
            .data
            .stories
            .iter()
            .flat_map(|b| b.actions().collect::<Vec<_>>())
            .collect();

        self.data
            .domain
            .response_names()
            .filter(|r| r.starts_with(UTTER_PREFIX))
            .filter(|r| !used.contains(r) && !used.contains(base_intent(r)))
            .map(|response| {
                Finding::new(
                    FindingKind::UnusedUtterance,
                    response,
                    format!(
                        "The utterance '{}' is not used in any story or rule.",
                        response
                    ),
                )
            })
            .collect()
    }

    /// `--max-history`, else the largest policy `max_history`, else the default.
    fn max_history(&self, settings: &ValidationSettings) -> usize {
        let max_history = match settings.max_history {
            Some(max_history) => max_history.get(),
            None => self
                .data
                .config
                .max_history()
                .unwrap_or_else(default_max_history)
                .max(1),
        };
        tracing::debug!("Checking story structure with max_history {}", max_history);
        max_history
    }

    fn story_conflicts(&self, settings: &ValidationSettings) -> Vec<Finding> {
        let max_history = self.max_history(settings);
        conflicts::find_conflicts(self.data.story_blocks(), max_history)
            .into_iter()
            .map(|conflict| {
                let subject = conflict.intent.clone().unwrap_or_else(|| "start".to_string());
                Finding::new(FindingKind::StoryConflict, subject, conflict.message())
            })
            .collect()
    }

    fn nlu_intents_not_in_domain(&self) -> Vec<Finding> {
        let domain = &self.data.domain;
        self.data
            .nlu
            .intents()
            .into_iter()
            .filter(|intent| !domain.has_intent(base_intent(intent)))
            .map(|intent| {
                Finding::new(
                    FindingKind::NluIntentNotInDomain,
                    intent,
                    format!(
                        "The intent '{}' is listed in your NLU training data, but it is not in \
                         the domain file. You should add it to your domain file!",
                        intent
                    ),
                )
            })
            .collect()
    }

    fn intents_without_examples(&self) -> Vec<Finding> {
        let labeled: HashSet<&str> = self
            .data
            .nlu
            .intents()
            .into_iter()
            .map(base_intent)
            .collect();

        self.data
            .domain
            .intent_names()
            .filter(|intent| !labeled.contains(intent) && !DEFAULT_INTENTS.contains(intent))
            .map(|intent| {
                Finding::new(
                    FindingKind::IntentWithoutExamples,
                    intent,
                    format!(
                        "The intent '{}' is listed in the domain file, but is not found in the \
                         NLU training data.",
                        intent
                    ),
                )
            })
            .collect()
    }

    fn duplicate_examples(&self) -> Vec<Finding> {
        let mut labels: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for example in &self.data.nlu.examples {
            if let Some(intent) = example.intent.as_deref() {
                labels.entry(example.text.as_str()).or_default().insert(intent);
            }
        }

        labels
            .into_iter()
            .filter(|(_, intents)| intents.len() > 1)
            .map(|(text, intents)| {
                let intents: Vec<&str> = intents.into_iter().collect();
                Finding::new(
                    FindingKind::DuplicateExample,
                    text,
                    format!(
                        "The example '{}' was found labeled with multiple different intents in \
                         the training data. Each annotated message should only appear with one \
                         intent. The example is labeled with: {}.",
                        text,
                        intents.join(", ")
                    ),
                )
            })
            .collect()
    }

    fn unknown_entities(&self) -> Vec<Finding> {
        let domain = &self.data.domain;
        self.data
            .nlu
            .entities()
            .into_iter()
            .filter(|entity| !domain.has_entity(entity))
            .map(|entity| {
                Finding::new(
                    FindingKind::UnknownEntity,
                    entity,
                    format!(
                        "The entity '{}' is annotated in your NLU training data, but it is not \
                         listed in the domain file.",
                        entity
                    ),
                )
            })
            .collect()
    }

    fn assistant_id(&self) -> Option<Finding> {
        match self.data.config.assistant_id() {
            AssistantId::Unique(id) => {
                tracing::debug!("Assistant id is '{}'", id);
                None
            }
            AssistantId::Missing => Some(Finding::new(
                FindingKind::MissingAssistantId,
                ASSISTANT_ID_KEY,
                format!(
                    "The config file is missing the '{}' mandatory key.",
                    ASSISTANT_ID_KEY
                ),
            )),
            AssistantId::Placeholder => Some(Finding::new(
                FindingKind::PlaceholderAssistantId,
                ASSISTANT_ID_KEY,
                format!(
                    "The config file is missing a unique value for the '{}' mandatory key. \
                     Please replace the default placeholder value with a unique identifier.",
                    ASSISTANT_ID_KEY
                ),
            )),
        }
    }

    fn deprecated_policies(&self) -> Vec<Finding> {
        self.data
            .config
            .deprecated_policies()
            .into_iter()
            .map(|policy| {
                Finding::new(
                    FindingKind::DeprecatedPolicy,
                    policy,
                    format!(
                        "The policy '{}' is no longer supported. Please migrate to RulePolicy.",
                        policy
                    ),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AssistantConfig, MaxHistory};
    use crate::dialogue::parse_blocks;
    use crate::domain::Domain;
    use crate::nlu::yaml;
    use crate::validation::Severity;

    const DOMAIN: &str = r#"
version: "3.1"
intents:
- greet
- goodbye
- request_restaurant
entities:
- cuisine
slots:
  cuisine:
    type: text
    mappings:
    - type: from_entity
      entity: cuisine
forms:
  restaurant_form:
    required_slots:
    - cuisine
actions:
- action_search_restaurants
responses:
  utter_greet:
  - text: hey
  utter_goodbye:
  - text: bye
"#;

    fn data(domain: &str, stories: &str, nlu: &str, config: &str) -> TrainingData {
        let document = crate::files::parse_yaml_document(stories).unwrap();
        TrainingData {
            domain: Domain::parse(domain).unwrap(),
            stories: parse_blocks(&document, None).unwrap(),
            nlu: yaml::read_str(nlu).unwrap(),
            config: AssistantConfig::parse(config).unwrap(),
        }
    }

    fn validate(data: &TrainingData) -> Verdict {
        Validator::new(data).validate(&ValidationSettings::default())
    }

    const CONFIG: &str = "assistant_id: test_bot\n";

    #[test]
    fn test_valid_project_passes() {
        let data = data(
            DOMAIN,
            r#"
stories:
- story: restaurant
  steps:
  - intent: request_restaurant
  - action: restaurant_form
  - active_loop: restaurant_form
  - active_loop: null
  - action: action_search_restaurants
- story: greet
  steps:
  - intent: greet
  - action: utter_greet
  - intent: goodbye
  - action: utter_goodbye
"#,
            "nlu:\n- intent: greet\n  examples: |\n    - hi\n",
            CONFIG,
        );

        let verdict = validate(&data);
        assert!(verdict.is_ok(), "{:?}", verdict.findings);
        assert!(!verdict.contains(FindingKind::UnknownForm));
        assert!(!verdict.has_warnings());
    }

    #[test]
    fn test_unknown_action_fails_in_stories_and_rules() {
        for stories in [
            "stories:\n- story: test path\n  steps:\n  - intent: goodbye\n  - action: action_test\n",
            "rules:\n- rule: test path\n  steps:\n  - intent: goodbye\n  - action: action_test\n",
        ] {
            let verdict = validate(&data(DOMAIN, stories, "", CONFIG));
            assert!(verdict.contains(FindingKind::UnknownAction));
            assert_eq!(verdict.exit_code(), 1);
        }
    }

    #[test]
    fn test_undeclared_form_fails() {
        let domain = "intents:\n- request_restaurant\n";
        let stories = "stories:\n- story: s\n  steps:\n  - intent: request_restaurant\n  \
                       - action: restaurant_form\n  - active_loop: restaurant_form\n";
        let verdict = validate(&data(domain, stories, "", CONFIG));

        assert!(verdict.contains(FindingKind::UnknownAction));
        assert!(verdict.contains(FindingKind::UnknownForm));
        assert_eq!(verdict.exit_code(), 1);
    }

    #[test]
    fn test_duplicates_stop_the_run() {
        let domain = "intents:\n- greet\n- greet\nactions:\n- action_a\n";
        let stories = "stories:\n- story: s\n  steps:\n  - action: action_unknown\n";
        let verdict = validate(&data(domain, stories, "", ""));

        assert_eq!(verdict.findings.len(), 1);
        assert_eq!(verdict.findings[0].kind, FindingKind::DuplicateName);
        assert_eq!(verdict.exit_code(), 1);
    }

    #[test]
    fn test_duplicate_story_names_are_reported() {
        let stories = "stories:\n- story: same\n  steps: []\n- story: same\n  steps: []\n";
        let verdict = validate(&data(DOMAIN, stories, "", CONFIG));

        assert!(verdict.contains(FindingKind::DuplicateName));
        assert!(verdict.findings[0].message.contains("story name 'same'"));
    }

    #[test]
    fn test_empty_domain_is_an_error() {
        let verdict = validate(&data("", "", "", CONFIG));
        assert!(verdict.contains(FindingKind::EmptyDomain));
        assert_eq!(verdict.exit_code(), 1);
    }

    #[test]
    fn test_missing_form_slot_fails() {
        let domain = r#"
forms:
  name_form:
    required_slots:
    - first_name
    - last_name
slots:
  first_name:
    type: text
    mappings:
    - type: from_text
  last_nam:
    type: text
    mappings:
    - type: from_text
"#;
        let verdict = validate(&data(domain, "", "", CONFIG));
        let findings: Vec<_> = verdict.of_kind(FindingKind::FormSlotsNotMatching).collect();

        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("'last_name'"));
        assert_eq!(verdict.exit_code(), 1);
    }

    #[test]
    fn test_slot_mapped_only_for_other_form_fails() {
        let domain = r#"
slots:
  city:
    type: text
    mappings:
    - type: from_text
      conditions:
      - active_loop: other_form
forms:
  travel_form:
    required_slots:
    - city
  other_form:
    required_slots:
    - city
"#;
        let verdict = validate(&data(domain, "", "", CONFIG));
        assert_eq!(verdict.of_kind(FindingKind::FormSlotsNotMatching).count(), 1);
    }

    #[test]
    fn test_mapping_condition_on_form_without_slot_fails() {
        let domain = r#"
intents:
- state_length_of_time
entities:
- city
slots:
  duration:
    type: text
    influence_conversation: false
    mappings:
    - type: from_text
      intent: state_length_of_time
      conditions:
      - active_loop: booking_form
  location:
    type: text
    mappings:
    - type: from_entity
      entity: city
forms:
  booking_form:
    required_slots:
    - location
"#;
        let verdict = validate(&data(domain, "", "", CONFIG));

        let finding = verdict.of_kind(FindingKind::SlotMappingNotRequired).next().unwrap();
        assert_eq!(finding.subject, "duration");
        assert_eq!(finding.severity, Severity::Error);
        assert_eq!(verdict.exit_code(), 1);
    }

    #[test]
    fn test_trigger_intent_mapping_is_exempt() {
        let domain = r#"
intents:
- book
slots:
  started:
    type: bool
    mappings:
    - type: from_trigger_intent
      intent: book
      value: true
      conditions:
      - active_loop: booking_form
  location:
    type: text
    mappings:
    - type: from_text
forms:
  booking_form:
    required_slots:
    - location
"#;
        let verdict = validate(&data(domain, "", "", CONFIG));
        assert!(!verdict.contains(FindingKind::SlotMappingNotRequired));
    }

    #[test]
    fn test_mapping_condition_on_unknown_form() {
        let domain = r#"
slots:
  city:
    type: text
    mappings:
    - type: from_text
      conditions:
      - active_loop: ghost_form
"#;
        let verdict = validate(&data(domain, "", "", CONFIG));
        assert!(verdict.contains(FindingKind::SlotMappingUnknownForm));
    }

    #[test]
    fn test_assistant_id_warnings() {
        let missing = validate(&data(DOMAIN, "", "", "language: en\n"));
        let finding = missing.of_kind(FindingKind::MissingAssistantId).next().unwrap();
        assert!(finding
            .message
            .contains("missing the 'assistant_id' mandatory key"));
        assert_eq!(missing.exit_code(), 0);

        let placeholder = validate(&data(DOMAIN, "", "", "assistant_id: placeholder_default\n"));
        let finding = placeholder
            .of_kind(FindingKind::PlaceholderAssistantId)
            .next()
            .unwrap();
        assert!(finding.message.contains("replace the default placeholder value"));
        assert_eq!(placeholder.exit_code(), 0);
    }

    #[test]
    fn test_fail_on_warnings_promotes_warnings() {
        let data = data(DOMAIN, "", "", "");
        let settings = ValidationSettings {
            fail_on_warnings: true,
            ..Default::default()
        };
        assert_eq!(Validator::new(&data).validate(&settings).exit_code(), 1);
    }

    #[test]
    fn test_domain_warnings_pass_through() {
        let domain = "intents:\n- greet:\n    triggers: utter_greet\nresponses:\n  utter_greet:\n  - text: hi\n";
        let verdict = validate(&data(domain, "", "", CONFIG));

        let finding = verdict.of_kind(FindingKind::DomainWarning).next().unwrap();
        assert!(finding.message.contains("Please migrate to RulePolicy."));
        assert_eq!(verdict.exit_code(), 0);
    }

    #[test]
    fn test_dialogue_warnings_and_infos() {
        let stories = "stories:\n- story: s\n  steps:\n  - intent: unknown_intent\n  - action: utter_missing\n";
        let verdict = validate(&data(DOMAIN, stories, "", CONFIG));

        assert!(verdict.contains(FindingKind::UnknownIntentInStory));
        assert!(verdict.contains(FindingKind::UnknownUtterance));
        assert!(verdict.contains(FindingKind::UnusedIntent));
        assert!(verdict.contains(FindingKind::UnusedUtterance));
        // the undeclared intent is an error, the rest are advisory
        assert_eq!(verdict.count(Severity::Error), 1);
        assert_eq!(verdict.exit_code(), 1);
    }

    #[test]
    fn test_nlu_checks() {
        let nlu = r#"
nlu:
- intent: greet
  examples: |
    - hello
    - I like [pizza](food)
- intent: goodbye
  examples: |
    - hello
- intent: thank
  examples: |
    - thanks
"#;
        let verdict = validate(&data(DOMAIN, "", nlu, CONFIG));

        assert!(verdict.contains(FindingKind::NluIntentNotInDomain));
        assert!(verdict.contains(FindingKind::DuplicateExample));
        assert!(verdict.contains(FindingKind::UnknownEntity));
        assert!(verdict
            .of_kind(FindingKind::IntentWithoutExamples)
            .any(|f| f.subject == "request_restaurant"));
    }

    #[test]
    fn test_retrieval_intents_resolve_to_base_intent() {
        let domain = "intents:\n- chitchat\nresponses:\n  utter_chitchat/ask_name:\n  - text: bot\n";
        let stories = "stories:\n- story: s\n  steps:\n  - intent: chitchat/ask_name\n  - action: utter_chitchat\n";
        let nlu = "nlu:\n- intent: chitchat/ask_name\n  examples: |\n    - who are you\n";
        let verdict = validate(&data(domain, stories, nlu, CONFIG));

        assert!(verdict.is_ok(), "{:?}", verdict.findings);
        assert!(!verdict.has_warnings(), "{:?}", verdict.findings);
    }

    #[test]
    fn test_stories_only_checks_structure_and_config() {
        let stories = r#"
stories:
- story: happy
  steps:
  - intent: greet
  - action: utter_greet
- story: grumpy
  steps:
  - intent: greet
  - action: action_not_declared
"#;
        let data = data(DOMAIN, stories, "", "");
        let settings = ValidationSettings {
            stories_only: true,
            max_history: Some(MaxHistory::new(3).unwrap()),
            ..Default::default()
        };
        let verdict = Validator::new(&data).validate(&settings);

        assert!(verdict.contains(FindingKind::StoryConflict));
        assert!(verdict.contains(FindingKind::MissingAssistantId));
        assert!(!verdict.contains(FindingKind::UnknownAction));
        assert_eq!(verdict.exit_code(), 0);
    }

    #[test]
    fn test_max_history_falls_back_to_policies() {
        let data = data(
            DOMAIN,
            "",
            "",
            "assistant_id: bot\npolicies:\n- name: MemoizationPolicy\n  max_history: 8\n- name: RulePolicy\n",
        );
        let validator = Validator::new(&data);

        assert_eq!(validator.max_history(&ValidationSettings::default()), 8);
        let settings = ValidationSettings {
            max_history: Some(MaxHistory::new(2).unwrap()),
            ..Default::default()
        };
        assert_eq!(validator.max_history(&settings), 2);
    }

    #[test]
    fn test_deprecated_policy_warning() {
        let data = data(
            DOMAIN,
            "",
            "",
            "assistant_id: bot\npolicies:\n- name: MappingPolicy\n",
        );
        let verdict = validate(&data);
        let finding = verdict.of_kind(FindingKind::DeprecatedPolicy).next().unwrap();
        assert!(finding.message.ends_with("Please migrate to RulePolicy."));
    }
}
