use chrono::NaiveDate;
use clap::{Args, Subcommand};
use engine_config::settings::PipelineConfig;
use std::path::PathBuf;

use crate::error::CliError;

/// Where the pipeline's inputs come from.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        long,
        help = "Pipeline configuration file (JSON). Takes precedence over --data-dir"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "ETLV_DATA_DIR",
        default_value = "data",
        help = "Directory holding source_data.csv, target_data.csv and control_table.csv"
    )]
    pub data_dir: PathBuf,
}

impl ConfigArgs {
    pub fn resolve(&self) -> Result<PipelineConfig, CliError> {
        let config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::from_data_dir(&self.data_dir),
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load new source rows into the target and advance the checkpoint
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        #[arg(long, help = "Run every validation but leave the checkpoint unchanged")]
        dry_run: bool,

        #[arg(long, help = "Print the run report as JSON")]
        json: bool,
    },
    /// Validate the full source table against the full target table
    Check {
        #[command(flatten)]
        config: ConfigArgs,

        #[arg(long, help = "Print the audit report as JSON")]
        json: bool,
    },
    /// Data-quality profile of the source table
    Profile {
        #[command(flatten)]
        config: ConfigArgs,

        #[arg(
            long,
            help = "If specified, writes the JSON report to this file instead of stdout"
        )]
        output: Option<PathBuf>,
    },
    Checkpoint {
        #[command(subcommand)]
        command: CheckpointCommand,
    },
}

#[derive(Subcommand)]
pub enum CheckpointCommand {
    /// Print the stored last run date
    Show {
        #[command(flatten)]
        config: ConfigArgs,

        #[arg(long)]
        json: bool,
    },
    /// Store a new last run date
    Set {
        #[command(flatten)]
        config: ConfigArgs,

        #[arg(long, help = "Date to store (YYYY-MM-DD)")]
        date: NaiveDate,

        #[arg(long, help = "Allow moving the checkpoint backwards")]
        force: bool,
    },
}
