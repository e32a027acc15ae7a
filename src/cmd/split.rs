//! `data split nlu` and `data split stories`.

use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use assistant_data::config::TrainingFraction;
use assistant_data::constants::LATEST_TRAINING_DATA_FORMAT_VERSION;
use assistant_data::dialogue::{self, BlockKind, StoryBlock};
use assistant_data::files::write_together;
use assistant_data::importer::{
    load_dialogue_files, load_nlu, sync_domain_responses, DialogueFile,
};
use assistant_data::nlu::yaml;
use assistant_data::split::{split_nlu, split_stories};

const TRAINING_DATA_FILE: &str = "training_data.yml";
const TEST_DATA_FILE: &str = "test_data.yml";
const NLG_PREFIX: &str = "nlg_";

fn render(document: &serde_yaml::Value) -> Result<String> {
    yaml::to_string(document)
}

fn print_written(outputs: &[(PathBuf, String)]) {
    for (path, _) in outputs {
        println!("{} Wrote {}", "✓".green(), path.display());
    }
}

pub fn cmd_split_nlu(
    nlu: &Path,
    domain: &Path,
    fraction: TrainingFraction,
    seed: u64,
    out: &Path,
) -> Result<()> {
    let mut data = load_nlu(&[nlu.to_path_buf()])?;
    sync_domain_responses(&mut data, domain)?;
    if data.examples.is_empty() {
        tracing::warn!("No NLU examples found in '{}'", nlu.display());
    }

    let split = split_nlu(&data, fraction, seed);
    tracing::info!(
        "Split {} example(s) into {} for training and {} for testing",
        data.examples.len(),
        split.train.examples.len(),
        split.test.examples.len()
    );

    let mut outputs = vec![
        (
            out.join(TRAINING_DATA_FILE),
            render(&yaml::nlu_document(&split.train))?,
        ),
        (
            out.join(TEST_DATA_FILE),
            render(&yaml::nlu_document(&split.test))?,
        ),
    ];
    if !data.responses.is_empty() {
        outputs.push((
            out.join(format!("{}{}", NLG_PREFIX, TRAINING_DATA_FILE)),
            render(&yaml::responses_document(&split.train.responses))?,
        ));
        outputs.push((
            out.join(format!("{}{}", NLG_PREFIX, TEST_DATA_FILE)),
            render(&yaml::responses_document(&split.test.responses))?,
        ));
    }

    write_together(&outputs).context("Failed to write the NLU split")?;
    print_written(&outputs);
    Ok(())
}

/// Story files that write to the same output name.
struct StoryGroup<'a> {
    name: String,
    version: &'a str,
    sources: Vec<String>,
    blocks: Vec<StoryBlock>,
}

/// Group files by base name, in order of first occurrence.
///
/// Files that share a base name in different directories are split as one
/// collection, so each input story lands in exactly one output file.
fn group_by_file_name(files: &[DialogueFile]) -> Result<Vec<StoryGroup<'_>>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<StoryGroup<'_>> = Vec::new();

    for file in files {
        let name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("Story path '{}' has no file name", file.path.display()))?;

        let slot = match index.get(&name) {
            Some(&slot) => {
                tracing::debug!(
                    "'{}' shares its name with an earlier story file, splitting them together",
                    file.path.display()
                );
                slot
            }
            None => {
                index.insert(name.clone(), groups.len());
                groups.push(StoryGroup {
                    name,
                    version: file
                        .version
                        .as_deref()
                        .unwrap_or(LATEST_TRAINING_DATA_FORMAT_VERSION),
                    sources: Vec::new(),
                    blocks: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[slot];
        group.sources.push(file.path.display().to_string());
        group.blocks.extend(file.blocks.iter().cloned());
    }

    Ok(groups)
}

pub fn cmd_split_stories(
    data: &[PathBuf],
    fraction: TrainingFraction,
    seed: u64,
    out: &Path,
) -> Result<()> {
    let files: Vec<_> = load_dialogue_files(data)?
        .into_iter()
        .filter(|file| file.blocks.iter().any(|b| b.kind == BlockKind::Story))
        .collect();
    if files.is_empty() {
        anyhow::bail!(
            "No story files found in {}",
            data.iter()
                .map(|p| format!("'{}'", p.display()))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let mut outputs = Vec::new();
    for group in group_by_file_name(&files)? {
        let part = split_stories(&group.blocks, fraction, seed);
        tracing::info!(
            "{}: {} story(ies) for training, {} for testing",
            group.sources.join(", "),
            part.train.len(),
            part.test.len()
        );

        for (prefix, stories) in [("train_", &part.train), ("test_", &part.test)] {
            let document = dialogue::to_document(group.version, BlockKind::Story, stories);
            outputs.push((
                out.join(format!("{}{}", prefix, group.name)),
                render(&document)?,
            ));
        }
    }

    write_together(&outputs).context("Failed to write the story split")?;
    print_written(&outputs);
    Ok(())
}
