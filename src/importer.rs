//! Resolves domain, data and config paths into parsed training data.
//!
//! Loading fails closed: any unreadable or malformed file aborts the import,
//! so the validator never sees partially loaded data.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{AssistantConfig, ValidateOptions};
use crate::constants::DEFAULT_CONFIG_PATH;
use crate::dialogue::{self, BlockKind, StoryBlock, KEY_RULES, KEY_STORIES};
use crate::domain::Domain;
use crate::files::{is_json_file, is_yaml_file, read_yaml_file, training_files};
use crate::nlu::{self, NluData};

/// Top-level keys that only appear in domain files.
const DOMAIN_KEYS: &[&str] = &["intents", "entities", "slots", "forms", "actions"];

/// Everything one invocation works on.
#[derive(Debug, Clone, Default)]
pub struct TrainingData {
    pub domain: Domain,
    /// Stories and rules, in load order.
    pub stories: Vec<StoryBlock>,
    pub nlu: NluData,
    pub config: AssistantConfig,
}

impl TrainingData {
    pub fn story_blocks(&self) -> impl Iterator<Item = &StoryBlock> {
        self.stories.iter().filter(|b| b.kind == BlockKind::Story)
    }

    pub fn rule_blocks(&self) -> impl Iterator<Item = &StoryBlock> {
        self.stories.iter().filter(|b| b.kind == BlockKind::Rule)
    }
}

/// Stories and rules read from a single file.
#[derive(Debug, Clone)]
pub struct DialogueFile {
    pub path: PathBuf,
    pub version: Option<String>,
    pub blocks: Vec<StoryBlock>,
}

/// What a training data file contains, judged by its top-level keys.
#[derive(Debug)]
enum TrainingFile {
    Nlu(NluData),
    Dialogue(Vec<StoryBlock>),
    Mixed(NluData, Vec<StoryBlock>),
    Skipped,
}

#[derive(Debug, Clone)]
pub struct TrainingDataImporter {
    domain: PathBuf,
    data: Vec<PathBuf>,
    config: Option<PathBuf>,
}

impl TrainingDataImporter {
    pub fn new(domain: impl Into<PathBuf>, data: Vec<PathBuf>, config: Option<PathBuf>) -> Self {
        Self {
            domain: domain.into(),
            data,
            config,
        }
    }

    pub fn from_options(options: &ValidateOptions) -> Self {
        Self::new(
            options.domain.clone(),
            options.data.clone(),
            options.config.clone(),
        )
    }

    pub fn load(&self) -> Result<TrainingData> {
        let mut domain = self.load_domain()?;
        let config = self.load_config()?;

        let mut stories = Vec::new();
        let mut nlu = NluData::default();
        for file in self.data_files()? {
            match classify(&file)? {
                TrainingFile::Nlu(data) => nlu.merge(data),
                TrainingFile::Dialogue(blocks) => stories.extend(blocks),
                TrainingFile::Mixed(data, blocks) => {
                    nlu.merge(data);
                    stories.extend(blocks);
                }
                TrainingFile::Skipped => {}
            }
        }

        for group in &nlu.responses {
            if !domain.has_response(&group.name) {
                domain.responses.push(group.clone());
            }
        }

        tracing::info!(
            "Loaded {} intent(s), {} story/rule block(s), {} NLU example(s)",
            domain.intents.len(),
            stories.len(),
            nlu.examples.len()
        );

        Ok(TrainingData {
            domain,
            stories,
            nlu,
            config,
        })
    }

    fn load_domain(&self) -> Result<Domain> {
        if !self.domain.exists() {
            tracing::warn!(
                "Domain '{}' does not exist, continuing with an empty domain",
                self.domain.display()
            );
            return Ok(Domain::default());
        }
        Domain::load(&self.domain)
            .with_context(|| format!("Failed to read domain from {}", self.domain.display()))
    }

    fn load_config(&self) -> Result<AssistantConfig> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        if !path.is_file() {
            tracing::warn!(
                "Config file '{}' not found, continuing with an empty config",
                path.display()
            );
            return Ok(AssistantConfig::default());
        }
        AssistantConfig::load_from(&path)
    }

    fn data_files(&self) -> Result<Vec<PathBuf>> {
        let domain = fs::canonicalize(&self.domain).ok();
        let mut files = Vec::new();
        for path in &self.data {
            if !path.exists() {
                tracing::warn!(
                    "Training data path '{}' does not exist, skipping it",
                    path.display()
                );
                continue;
            }
            for file in training_files(path)? {
                if domain.is_some() && fs::canonicalize(&file).ok() == domain {
                    tracing::debug!("Skipping domain file {} in data", file.display());
                    continue;
                }
                if !files.contains(&file) {
                    files.push(file);
                }
            }
        }
        Ok(files)
    }
}

fn classify(path: &Path) -> Result<TrainingFile> {
    if is_json_file(path) {
        return Ok(TrainingFile::Nlu(read_json_nlu(path)?));
    }
    if !is_yaml_file(path) {
        tracing::debug!("Skipping {}: not a training data file", path.display());
        return Ok(TrainingFile::Skipped);
    }

    let document = read_yaml_file(path)?;
    let Some(mapping) = document.as_mapping() else {
        tracing::debug!("Skipping {}: no training data keys", path.display());
        return Ok(TrainingFile::Skipped);
    };
    if DOMAIN_KEYS.iter().any(|key| mapping.contains_key(*key)) {
        tracing::debug!("Skipping {}: looks like a domain file", path.display());
        return Ok(TrainingFile::Skipped);
    }

    let has_nlu = mapping.contains_key(nlu::yaml::KEY_NLU)
        || mapping.contains_key(nlu::yaml::KEY_RESPONSES);
    let has_dialogue = mapping.contains_key(KEY_STORIES) || mapping.contains_key(KEY_RULES);

    let nlu_data = if has_nlu {
        Some(
            nlu::yaml::read(&document)
                .with_context(|| format!("Failed to read NLU data from {}", path.display()))?,
        )
    } else {
        None
    };
    let blocks = if has_dialogue {
        Some(
            dialogue::parse_blocks(&document, Some(path))
                .with_context(|| format!("Failed to read stories from {}", path.display()))?,
        )
    } else {
        None
    };

    Ok(match (nlu_data, blocks) {
        (Some(data), Some(blocks)) => TrainingFile::Mixed(data, blocks),
        (Some(data), None) => TrainingFile::Nlu(data),
        (None, Some(blocks)) => TrainingFile::Dialogue(blocks),
        (None, None) => {
            tracing::debug!("Skipping {}: no training data keys", path.display());
            TrainingFile::Skipped
        }
    })
}

fn read_json_nlu(path: &Path) -> Result<NluData> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    nlu::json::read_str(&content)
        .with_context(|| format!("Failed to read NLU data from {}", path.display()))
}

/// Load and merge the NLU data of every file below `paths`.
///
/// Files that carry no NLU data are skipped.
pub fn load_nlu(paths: &[PathBuf]) -> Result<NluData> {
    let mut data = NluData::default();
    for path in paths {
        for file in training_files(path)? {
            match classify(&file)? {
                TrainingFile::Nlu(nlu) | TrainingFile::Mixed(nlu, _) => data.merge(nlu),
                TrainingFile::Dialogue(_) | TrainingFile::Skipped => {}
            }
        }
    }
    Ok(data)
}

/// Add the responses of the domain at `domain` that `nlu` does not define yet.
///
/// A missing domain leaves the data untouched.
pub fn sync_domain_responses(nlu: &mut NluData, domain: &Path) -> Result<()> {
    if !domain.exists() {
        tracing::debug!("No domain at '{}', keeping NLU responses only", domain.display());
        return Ok(());
    }
    let domain = Domain::load(domain)
        .with_context(|| format!("Failed to read domain from {}", domain.display()))?;
    for group in domain.responses {
        if !nlu.responses.iter().any(|r| r.name == group.name) {
            nlu.responses.push(group);
        }
    }
    Ok(())
}

/// Stories and rules below `paths`, one entry per file that has any.
pub fn load_dialogue_files(paths: &[PathBuf]) -> Result<Vec<DialogueFile>> {
    let mut files = Vec::new();
    for path in paths {
        for file in training_files(path)?.into_iter().filter(|f| is_yaml_file(f)) {
            let document = read_yaml_file(&file)?;
            if document.get(KEY_STORIES).is_none() && document.get(KEY_RULES).is_none() {
                continue;
            }
            let blocks = dialogue::parse_blocks(&document, Some(&file))
                .with_context(|| format!("Failed to read stories from {}", file.display()))?;
            files.push(DialogueFile {
                version: document.get("version").map(crate::files::scalar_text),
                path: file,
                blocks,
            });
        }
    }
    Ok(files)
}
