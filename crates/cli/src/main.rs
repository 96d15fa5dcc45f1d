use crate::error::CliError;
use clap::Parser;
use commands::{CheckpointCommand, Commands};
use engine_core::{events::sink::TracingSink, state::models::Checkpoint};
use engine_processing::profile::profile_tables;
use engine_runtime::{
    audit::audit_tables,
    execution::{executor::PipelineOptions, factory},
};
use serde::Serialize;
use std::process::ExitCode;
use tracing::{error, info};

mod commands;
mod error;
mod logging;
mod output;

#[derive(Parser)]
#[command(
    name = "etlv",
    version,
    about = "Incremental ETL load with validation gates"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log level when RUST_LOG is not set"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Serialize)]
struct CheckpointView {
    location: String,
    last_run_date: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(report_failure(&err)),
    }
}

fn report_failure(err: &CliError) -> u8 {
    if !err.already_logged() {
        error!("{err}");
    }
    err.exit_code()
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Run {
            config,
            dry_run,
            json,
        } => {
            let config = config.resolve()?;
            let pipeline = factory::create_pipeline(&config, PipelineOptions { dry_run })?;
            let report = pipeline
                .run(&mut TracingSink::new())
                .map_err(CliError::Run)?;

            if json {
                output::print_report(&report)?;
            }
        }
        Commands::Check { config, json } => {
            let config = config.resolve()?;
            let (source, target) = factory::read_tables(&config)?;
            let report = audit_tables(&source, &target, &config.primary_key)?;

            if json {
                output::print_report(&report)?;
            }
        }
        Commands::Profile {
            config,
            output: report_path,
        } => {
            let config = config.resolve()?;
            let (source, target) = factory::read_tables(&config)?;
            let profile = profile_tables(
                &source,
                &target,
                &config.primary_key,
                Some(&config.measure_column),
            );

            match report_path {
                Some(path) => {
                    output::write_report(&profile, &path)?;
                    info!(path = %path.display(), "Profile written");
                }
                None => output::print_report(&profile)?,
            }
        }
        Commands::Checkpoint { command } => checkpoint(command)?,
    }

    Ok(())
}

fn checkpoint(command: CheckpointCommand) -> Result<(), CliError> {
    match command {
        CheckpointCommand::Show { config, json } => {
            let config = config.resolve()?;
            let store = factory::create_checkpoint_store(&config)?;
            let current = store.read().map_err(CliError::CheckpointRead)?;

            if json {
                output::print_report(&CheckpointView {
                    location: store.location(),
                    last_run_date: current.to_string(),
                })?;
            } else {
                println!("{current}");
            }
        }
        CheckpointCommand::Set {
            config,
            date,
            force,
        } => {
            let config = config.resolve()?;
            let store = factory::create_checkpoint_store(&config)?;
            let next = Checkpoint::new(date);

            let written = if force {
                store.overwrite(&next)
            } else {
                store.write(&next)
            };
            written.map_err(CliError::CheckpointWrite)?;

            info!(location = %store.location(), checkpoint = %next, force, "Checkpoint set");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::ConfigArgs;
    use std::{fs, path::Path};
    use tempfile::{TempDir, tempdir};
    use tracing_test::traced_test;

    fn data_dir(source: &str, target: &str) -> TempDir {
        let dir = tempdir().unwrap();
        let header = "id,created_date,amount\n";
        fs::write(dir.path().join("source_data.csv"), format!("{header}{source}")).unwrap();
        fs::write(dir.path().join("target_data.csv"), format!("{header}{target}")).unwrap();
        fs::write(
            dir.path().join("control_table.csv"),
            "last_run_date\n2024-01-01\n",
        )
        .unwrap();
        dir
    }

    fn args(dir: &Path) -> ConfigArgs {
        ConfigArgs {
            config: None,
            data_dir: dir.to_path_buf(),
        }
    }

    const THREE_DAYS: &str = "1,2024-01-01,10\n2,2024-01-02,20\n3,2024-01-03,30\n";

    #[traced_test]
    #[test]
    fn failed_check_logs_the_missing_keys() {
        let dir = data_dir(THREE_DAYS, "1,2024-01-01,10\n");

        let err = run(Commands::Check {
            config: args(dir.path()),
            json: false,
        })
        .unwrap_err();

        assert_eq!(report_failure(&err), 5);
        assert!(logs_contain("ERROR"));
        assert!(logs_contain("keys missing in target: {2, 3}"));
    }

    #[traced_test]
    #[test]
    fn profile_without_source_logs_the_load_error() {
        let dir = data_dir(THREE_DAYS, "1,2024-01-01,10\n");
        fs::remove_file(dir.path().join("source_data.csv")).unwrap();

        let err = run(Commands::Profile {
            config: args(dir.path()),
            output: None,
        })
        .unwrap_err();

        assert_eq!(report_failure(&err), 2);
        assert!(logs_contain("Failed to load source"));
    }

    #[traced_test]
    #[test]
    fn failed_run_is_left_to_the_event_sink() {
        let dir = data_dir("1,2024-01-01,10\n", "1,2024-01-01,10\n2,2024-01-01,20\n");

        let err = run(Commands::Run {
            config: args(dir.path()),
            dry_run: false,
            json: false,
        })
        .unwrap_err();

        assert!(err.already_logged());
        assert_eq!(report_failure(&err), 3);
        logs_assert(|lines: &[&str]| {
            match lines
                .iter()
                .filter(|line| line.contains("Row count validation failed"))
                .count()
            {
                1 => Ok(()),
                n => Err(format!("failure logged {n} times")),
            }
        });
    }

    #[traced_test]
    #[test]
    fn run_validates_settings_once() {
        let dir = data_dir(THREE_DAYS, "1,2024-01-01,10\n");

        run(Commands::Run {
            config: args(dir.path()),
            dry_run: true,
            json: false,
        })
        .unwrap();

        logs_assert(|lines: &[&str]| {
            match lines
                .iter()
                .filter(|line| line.contains("Settings validation completed successfully"))
                .count()
            {
                1 => Ok(()),
                n => Err(format!("settings validated {n} times")),
            }
        });
    }
}
