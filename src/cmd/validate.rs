//! `data validate` and `data validate stories`.

use anyhow::Result;
use colored::Colorize;

use assistant_data::config::ValidateOptions;
use assistant_data::importer::TrainingDataImporter;
use assistant_data::validator::Validator;

pub fn cmd_validate(options: &ValidateOptions) -> Result<()> {
    let data = TrainingDataImporter::from_options(options).load()?;

    let settings = options.settings();
    tracing::debug!("Validating with {:?}", settings);
    let verdict = Validator::new(&data).validate(&settings);
    verdict.display();
    verdict.display_summary();

    if !verdict.is_ok() {
        eprintln!("{} Project validation completed with errors.", "✗".red());
        std::process::exit(verdict.exit_code());
    }

    Ok(())
}
