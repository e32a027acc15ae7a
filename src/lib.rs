//! # assistant-data - training data tooling for conversational assistants
//!
//! Cross-checks an assistant's declared domain (intents, entities, slots, forms,
//! actions, responses) against its dialogue data (stories, rules) and its NLU
//! examples, and splits training data into reproducible train/test subsets.
//!
//! ## Core Concepts
//!
//! - **Domain**: the declarative schema of what the assistant knows about
//! - **Stories / Rules**: named step sequences used as dialogue training data
//! - **NLU data**: labeled example utterances plus synonyms, regexes and lookups
//! - **Findings**: errors, warnings and infos produced by the validator
//!
//! ## Modules
//!
//! - [`domain`] - Domain model and YAML loader
//! - [`dialogue`] - Stories and rules
//! - [`nlu`] - NLU examples, entity markup, YAML and JSON formats
//! - [`importer`] - Resolves paths into parsed training data
//! - [`config`] - Assistant config file and typed command options
//! - [`validation`] - Findings, severities and the verdict
//! - [`validator`] - Consistency checks across domain, dialogue and NLU data
//! - [`split`] - Deterministic stratified train/test splitting
//! - [`migrate`] - Domain migration from the 2.x to the 3.x format
//!
//! ## Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use assistant_data::config::ValidateOptions;
//! use assistant_data::importer::TrainingDataImporter;
//! use assistant_data::validator::Validator;
//!
//! let options = ValidateOptions::new(PathBuf::from("domain.yml"))
//!     .with_data(vec![PathBuf::from("data")]);
//! let data = TrainingDataImporter::from_options(&options)
//!     .load()
//!     .expect("Failed to load training data");
//!
//! let verdict = Validator::new(&data).validate(&options.settings());
//! std::process::exit(verdict.exit_code());
//! ```

pub mod config;
pub mod dialogue;
pub mod domain;
pub mod errors;
pub mod files;
pub mod importer;
pub mod migrate;
pub mod nlu;
pub mod split;
pub mod validation;
pub mod validator;

/// Shared names, keys and defaults.
pub mod constants {
    /// Format version written to every training data file.
    pub const LATEST_TRAINING_DATA_FORMAT_VERSION: &str = "3.1";
    /// Config key holding the unique assistant identifier.
    pub const ASSISTANT_ID_KEY: &str = "assistant_id";
    /// Placeholder value shipped in project templates for `assistant_id`.
    pub const ASSISTANT_ID_DEFAULT_VALUE: &str = "placeholder_default";
    /// Prefix of actions that only send a response.
    pub const UTTER_PREFIX: &str = "utter_";

    /// Default domain file: `domain.yml`
    pub const DEFAULT_DOMAIN_PATH: &str = "domain.yml";
    /// Default assistant config: `config.yml`
    pub const DEFAULT_CONFIG_PATH: &str = "config.yml";
    /// Default training data directory: `data`
    pub const DEFAULT_DATA_PATH: &str = "data";
    /// Default output directory for splits: `train_test_split`
    pub const DEFAULT_SPLIT_OUT_PATH: &str = "train_test_split";

    /// Actions every assistant has without declaring them.
    pub const DEFAULT_ACTIONS: &[&str] = &[
        "action_listen",
        "action_restart",
        "action_session_start",
        "action_default_fallback",
        "action_deactivate_loop",
        "action_revert_fallback_events",
        "action_default_ask_affirmation",
        "action_default_ask_rephrase",
        "action_two_stage_fallback",
        "action_unlikely_intent",
        "action_back",
        "action_extract_slots",
    ];

    /// Intents every assistant has without declaring them.
    pub const DEFAULT_INTENTS: &[&str] = &[
        "restart",
        "back",
        "out_of_scope",
        "session_start",
        "nlu_fallback",
    ];

    /// Policies replaced by rule-based dialogue handling.
    pub const DEPRECATED_POLICIES: &[&str] = &[
        "MappingPolicy",
        "FormPolicy",
        "FallbackPolicy",
        "TwoStageFallbackPolicy",
    ];
}
