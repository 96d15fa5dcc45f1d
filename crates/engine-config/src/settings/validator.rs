use crate::settings::{CheckpointSettings, PipelineConfig, TableSettings, error::SettingsError};
use tracing::{debug, info};

/// Checks a configuration before any file is touched.
pub struct SettingsValidator<'a> {
    config: &'a PipelineConfig,
}

impl<'a> SettingsValidator<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        debug!(pipeline = %self.config.name, "Validating settings");
        let mut errors: Vec<String> = Vec::new();

        self.validate_name(&mut errors);
        self.validate_columns(&mut errors);
        self.validate_table("source", &self.config.source, &mut errors);
        self.validate_table("target", &self.config.target, &mut errors);
        self.validate_paths(&mut errors);

        if !errors.is_empty() {
            return Err(SettingsError::ValidationFailed(errors));
        }

        info!(pipeline = %self.config.name, "Settings validation completed successfully");
        Ok(())
    }

    fn validate_name(&self, errors: &mut Vec<String>) {
        if self.config.name.trim().is_empty() {
            errors.push("name must not be empty".to_string());
        }
    }

    fn validate_columns(&self, errors: &mut Vec<String>) {
        let columns = [
            ("primary_key", Some(self.config.primary_key.as_str())),
            ("date_column", Some(self.config.date_column.as_str())),
            ("order_column", self.config.order_column.as_deref()),
            ("measure_column", Some(self.config.measure_column.as_str())),
        ];

        for (field, column) in columns {
            if column.is_some_and(|c| c.trim().is_empty()) {
                errors.push(format!("{field} must not be empty"));
            }
        }
    }

    fn validate_table(&self, role: &str, table: &TableSettings, errors: &mut Vec<String>) {
        if table.path.as_os_str().is_empty() {
            errors.push(format!("{role}.path must not be empty"));
        }
        if !table.delimiter.is_ascii() || table.delimiter == '"' || table.delimiter == '\n' {
            errors.push(format!(
                "{role}.delimiter {:?} must be a single ASCII character other than a quote or newline",
                table.delimiter
            ));
        }
    }

    fn validate_paths(&self, errors: &mut Vec<String>) {
        let source = &self.config.source.path;
        let target = &self.config.target.path;

        if source == target {
            errors.push(format!(
                "source and target both point at {}",
                source.display()
            ));
        }

        let checkpoint = match &self.config.checkpoint {
            CheckpointSettings::Csv { path } | CheckpointSettings::Sled { path, .. } => path,
        };
        if checkpoint.as_os_str().is_empty() {
            errors.push("checkpoint.path must not be empty".to_string());
        }
        if checkpoint == source || checkpoint == target {
            errors.push(format!(
                "checkpoint path {} is also a data table",
                checkpoint.display()
            ));
        }
    }
}
