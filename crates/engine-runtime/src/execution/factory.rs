use crate::{
    error::PipelineError,
    execution::executor::{ColumnRoles, Pipeline, PipelineOptions, load_tables},
};
use connectors::file::csv::{settings::CsvSettings, source::CsvTableReader};
use engine_config::settings::{CheckpointSettings, PipelineConfig, TableSettings};
use engine_core::{
    connectors::source::DataSource,
    state::{CheckpointStore, csv_store::CsvCheckpointStore, sled_store::SledCheckpointStore},
};
use model::records::table::Table;
use tracing::debug;

fn csv_reader(name: &str, table: &TableSettings, primary_key: &str) -> CsvTableReader {
    CsvTableReader::new(name, &table.path, CsvSettings::new(table.delimiter))
        .with_primary_key(primary_key)
}

/// Source and target readers. The source must also carry a parsable date
/// column.
pub fn create_sources(config: &PipelineConfig) -> (DataSource, DataSource) {
    let source = csv_reader("source", &config.source, &config.primary_key)
        .with_date_column(&config.date_column);
    let target = csv_reader("target", &config.target, &config.primary_key);
    (source.into(), target.into())
}

/// Reads source and target as configured, for commands that do not touch the
/// checkpoint.
pub fn read_tables(config: &PipelineConfig) -> Result<(Table, Table), PipelineError> {
    let (source, target) = create_sources(config);
    load_tables(&source, &target)
}

pub fn create_checkpoint_store(
    config: &PipelineConfig,
) -> Result<Box<dyn CheckpointStore>, PipelineError> {
    let store: Box<dyn CheckpointStore> = match &config.checkpoint {
        CheckpointSettings::Csv { path } => Box::new(CsvCheckpointStore::new(path)),
        CheckpointSettings::Sled { path, .. } => Box::new(
            SledCheckpointStore::open(path, config.checkpoint_key())
                .map_err(|e| PipelineError::io("checkpoint", e))?,
        ),
    };
    debug!(location = %store.location(), "Opened checkpoint store");
    Ok(store)
}

/// Wires a runnable pipeline from an already validated `config`.
pub fn create_pipeline(
    config: &PipelineConfig,
    options: PipelineOptions,
) -> Result<Pipeline, PipelineError> {
    let (source, target) = create_sources(config);
    let checkpoint = create_checkpoint_store(config)?;
    let columns = ColumnRoles {
        primary_key: config.primary_key.clone(),
        date_column: config.date_column.clone(),
        order_column: config.order_column().to_string(),
    };

    Ok(Pipeline::new(&config.name, source, target, checkpoint)
        .with_columns(columns)
        .with_options(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn data_dir_config_builds_csv_pipeline() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::from_data_dir(dir.path());

        let pipeline = create_pipeline(&config, PipelineOptions::default()).unwrap();

        assert_eq!(pipeline.name(), "default");
        assert_eq!(pipeline.columns(), &ColumnRoles::default());
        assert_eq!(
            pipeline.checkpoint_store().location(),
            dir.path().join("control_table.csv").display().to_string()
        );
    }

    #[test]
    fn sled_backend_uses_pipeline_name_as_key() {
        let dir = tempdir().unwrap();
        let mut config = PipelineConfig::from_data_dir(dir.path());
        config.name = "orders".into();
        config.checkpoint = CheckpointSettings::Sled {
            path: dir.path().join("state"),
            key: None,
        };

        let store = create_checkpoint_store(&config).unwrap();
        assert!(store.location().ends_with("#chk:orders"));
    }
}
