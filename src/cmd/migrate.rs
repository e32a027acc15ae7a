//! `data migrate`.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use assistant_data::migrate::{backup_path, migrate_file};

pub fn cmd_migrate(domain: &Path, out: Option<&Path>) -> Result<()> {
    let written = migrate_file(domain, out)?;

    if written == domain {
        println!(
            "{} Kept the original domain as {}",
            "ℹ".blue(),
            backup_path(domain).display()
        );
    }
    println!(
        "{} Migrated domain written to {}",
        "✓".green(),
        written.display()
    );
    Ok(())
}
