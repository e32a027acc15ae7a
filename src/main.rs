//! CLI entry point for the `assistant` binary.

mod cmd;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assistant_data::config::{MaxHistory, TrainingFraction, ValidateOptions};
use assistant_data::constants::{
    DEFAULT_CONFIG_PATH, DEFAULT_DATA_PATH, DEFAULT_DOMAIN_PATH, DEFAULT_SPLIT_OUT_PATH,
};

use cmd::convert::NluFormat;

#[derive(Parser)]
#[command(name = "assistant")]
#[command(version)]
#[command(about = "Validate, split, convert and migrate assistant training data", long_about = None)]
struct Cli {
    /// Log more (-v for progress, -vv for details)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Utils for the training data
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },
}

#[derive(Subcommand)]
enum DataCommands {
    /// Splits training data into train and test sets
    Split {
        #[command(subcommand)]
        command: SplitCommands,
    },
    /// Converts training data between formats
    Convert {
        #[command(subcommand)]
        command: ConvertCommands,
    },
    /// Checks the domain, NLU data and stories for inconsistencies
    Validate {
        /// Domain file or directory
        #[arg(short, long, default_value = DEFAULT_DOMAIN_PATH, global = true)]
        domain: PathBuf,
        /// Paths to files or directories with training data
        #[arg(long, num_args = 1.., default_value = DEFAULT_DATA_PATH, global = true)]
        data: Vec<PathBuf>,
        /// Assistant config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
        config: PathBuf,
        /// Number of turns taken into account for story structure validation
        #[arg(long, value_name = "MAX_HISTORY", global = true)]
        max_history: Option<MaxHistory>,
        /// Fail validation on warnings and errors
        #[arg(long, global = true)]
        fail_on_warnings: bool,
        #[command(subcommand)]
        mode: Option<ValidateMode>,
    },
    /// Migrates a 2.x domain to the 3.x format
    Migrate {
        /// Domain file to migrate
        #[arg(short, long, default_value = DEFAULT_DOMAIN_PATH)]
        domain: PathBuf,
        /// Where to write the migrated domain (defaults to overwriting the input)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum SplitCommands {
    /// Performs a split of your NLU data into training and test data according to the specified percentages
    Nlu {
        /// File or folder containing your NLU data
        #[arg(short = 'u', long, default_value = DEFAULT_DATA_PATH)]
        nlu: PathBuf,
        /// Domain whose responses are split along with the examples
        #[arg(short, long, default_value = DEFAULT_DOMAIN_PATH)]
        domain: PathBuf,
        /// Percentage of the data which should be in the training data
        #[arg(long, default_value_t = TrainingFraction::default())]
        training_fraction: TrainingFraction,
        /// Seed to generate the same train/test split
        #[arg(long, default_value_t = assistant_data::config::default_random_seed())]
        random_seed: u64,
        /// Directory where the split files are written
        #[arg(long, default_value = DEFAULT_SPLIT_OUT_PATH)]
        out: PathBuf,
    },
    /// Performs a split of your stories into training and test data according to the specified percentages
    Stories {
        /// Files or folders containing your stories
        #[arg(long, num_args = 1.., default_value = DEFAULT_DATA_PATH)]
        data: Vec<PathBuf>,
        /// Percentage of the data which should be in the training data
        #[arg(long, default_value_t = TrainingFraction::default())]
        training_fraction: TrainingFraction,
        /// Seed to generate the same train/test split
        #[arg(long, default_value_t = assistant_data::config::default_random_seed())]
        random_seed: u64,
        /// Directory where the split files are written
        #[arg(long, default_value = DEFAULT_SPLIT_OUT_PATH)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConvertCommands {
    /// Converts NLU data between formats
    Nlu {
        /// Output format
        #[arg(short = 'f', long, default_value = "yaml")]
        format: NluFormat,
        /// Paths to the files or directories to convert
        #[arg(long, num_args = 1.., default_value = DEFAULT_DATA_PATH)]
        data: Vec<PathBuf>,
        /// File where the converted data is written
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum ValidateMode {
    /// Checks for inconsistencies in the story files
    Stories,
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the flags.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Data { command } => match command {
            DataCommands::Split { command } => match command {
                SplitCommands::Nlu {
                    nlu,
                    domain,
                    training_fraction,
                    random_seed,
                    out,
                } => cmd::split::cmd_split_nlu(&nlu, &domain, training_fraction, random_seed, &out),
                SplitCommands::Stories {
                    data,
                    training_fraction,
                    random_seed,
                    out,
                } => cmd::split::cmd_split_stories(&data, training_fraction, random_seed, &out),
            },
            DataCommands::Convert { command } => match command {
                ConvertCommands::Nlu { format, data, out } => {
                    cmd::convert::cmd_convert_nlu(format, &data, &out)
                }
            },
            DataCommands::Validate {
                domain,
                data,
                config,
                max_history,
                fail_on_warnings,
                mode,
            } => {
                let mut options = ValidateOptions::new(domain)
                    .with_data(data)
                    .with_config(config)
                    .fail_on_warnings(fail_on_warnings)
                    .stories_only(matches!(mode, Some(ValidateMode::Stories)));
                if let Some(max_history) = max_history {
                    options = options.with_max_history(max_history);
                }
                cmd::validate::cmd_validate(&options)
            }
            DataCommands::Migrate { domain, out } => {
                cmd::migrate::cmd_migrate(&domain, out.as_deref())
            }
        },
    }
}
