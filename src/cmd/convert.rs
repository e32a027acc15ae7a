//! `data convert nlu`.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use assistant_data::errors::ArgumentError;
use assistant_data::files::write_together;
use assistant_data::importer::load_nlu;
use assistant_data::nlu::{json, yaml};

/// Target format of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NluFormat {
    Json,
    Yaml,
}

impl FromStr for NluFormat {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(ArgumentError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for NluFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

pub fn cmd_convert_nlu(format: NluFormat, data: &[PathBuf], out: &Path) -> Result<()> {
    let nlu = load_nlu(data)?;
    if nlu.is_empty() {
        tracing::warn!("No NLU data found to convert");
    }

    let content = match format {
        NluFormat::Json => {
            eprintln!("{} {}", "⚠".yellow(), json::DEPRECATION_WARNING);
            json::to_string(&nlu)?
        }
        NluFormat::Yaml => yaml::to_string(&yaml::to_document(&nlu))?,
    };

    write_together(&[(out.to_path_buf(), content)])
        .with_context(|| format!("Failed to write converted data to {}", out.display()))?;
    println!(
        "{} Converted {} example(s) to {} in {}",
        "✓".green(),
        nlu.examples.len(),
        format,
        out.display()
    );
    Ok(())
}
