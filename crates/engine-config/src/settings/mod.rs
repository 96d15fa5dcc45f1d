use crate::settings::{error::SettingsError, validator::SettingsValidator};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

pub mod error;
pub mod validator;

pub const SOURCE_FILE: &str = "source_data.csv";
pub const TARGET_FILE: &str = "target_data.csv";
pub const CONTROL_FILE: &str = "control_table.csv";

fn default_name() -> String {
    "default".to_string()
}

fn default_primary_key() -> String {
    "id".to_string()
}

fn default_date_column() -> String {
    "created_date".to_string()
}

fn default_measure_column() -> String {
    "amount".to_string()
}

fn default_delimiter() -> char {
    ','
}

/// One CSV table the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSettings {
    pub path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl TableSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: default_delimiter(),
        }
    }
}

/// Where the checkpoint lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum CheckpointSettings {
    /// One-row control table.
    Csv { path: PathBuf },
    /// sled database; `key` defaults to the pipeline name.
    Sled {
        path: PathBuf,
        #[serde(default)]
        key: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub source: TableSettings,
    pub target: TableSettings,
    pub checkpoint: CheckpointSettings,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default = "default_date_column")]
    pub date_column: String,
    /// Column deduplication orders by. Falls back to `date_column`.
    #[serde(default)]
    pub order_column: Option<String>,
    #[serde(default = "default_measure_column")]
    pub measure_column: String,
}

impl PipelineConfig {
    /// The conventional layout: `source_data.csv`, `target_data.csv` and
    /// `control_table.csv` side by side in one directory.
    pub fn from_data_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        PipelineConfig {
            name: default_name(),
            source: TableSettings::new(dir.join(SOURCE_FILE)),
            target: TableSettings::new(dir.join(TARGET_FILE)),
            checkpoint: CheckpointSettings::Csv {
                path: dir.join(CONTROL_FILE),
            },
            primary_key: default_primary_key(),
            date_column: default_date_column(),
            order_column: None,
            measure_column: default_measure_column(),
        }
    }

    /// Reads a JSON configuration file. Relative paths inside it are taken
    /// relative to the file's own directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: PipelineConfig =
            serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_paths(base);

        info!(config = %path.display(), pipeline = %config.name, "Loaded pipeline configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        SettingsValidator::new(self).validate()
    }

    pub fn order_column(&self) -> &str {
        self.order_column.as_deref().unwrap_or(&self.date_column)
    }

    /// Key under which the sled backend stores this pipeline's checkpoint.
    pub fn checkpoint_key(&self) -> &str {
        match &self.checkpoint {
            CheckpointSettings::Sled { key: Some(key), .. } => key,
            _ => &self.name,
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        resolve(&mut self.source.path);
        resolve(&mut self.target.path);
        match &mut self.checkpoint {
            CheckpointSettings::Csv { path } | CheckpointSettings::Sled { path, .. } => {
                resolve(path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn data_dir_layout() {
        let config = PipelineConfig::from_data_dir("data");

        assert_eq!(config.source.path, Path::new("data/source_data.csv"));
        assert_eq!(config.target.path, Path::new("data/target_data.csv"));
        assert_eq!(
            config.checkpoint,
            CheckpointSettings::Csv {
                path: PathBuf::from("data/control_table.csv")
            }
        );
        assert_eq!(config.primary_key, "id");
        assert_eq!(config.order_column(), "created_date");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_fills_defaults_and_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(
            &path,
            r#"{
                "name": "orders",
                "source": { "path": "in/source.csv", "delimiter": ";" },
                "target": { "path": "/abs/target.csv" },
                "checkpoint": { "backend": "sled", "path": "state" },
                "order_column": "updated_at"
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::load(&path).unwrap();

        assert_eq!(config.source.path, dir.path().join("in/source.csv"));
        assert_eq!(config.source.delimiter, ';');
        assert_eq!(config.target.path, Path::new("/abs/target.csv"));
        assert_eq!(config.target.delimiter, ',');
        assert_eq!(
            config.checkpoint,
            CheckpointSettings::Sled {
                path: dir.path().join("state"),
                key: None
            }
        );
        assert_eq!(config.date_column, "created_date");
        assert_eq!(config.order_column(), "updated_at");
        assert_eq!(config.checkpoint_key(), "orders");
    }

    #[test]
    fn load_reports_unreadable_and_unparsable_files() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            PipelineConfig::load(&missing),
            Err(SettingsError::Io { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"{ "source": { "path": "a.csv" } }"#).unwrap();
        assert!(matches!(
            PipelineConfig::load(&bad),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn validate_collects_every_problem() {
        let mut config = PipelineConfig::from_data_dir("data");
        config.primary_key = " ".into();
        config.target.path = config.source.path.clone();
        config.source.delimiter = 'é';
        config.checkpoint = CheckpointSettings::Csv {
            path: config.source.path.clone(),
        };

        let Err(SettingsError::ValidationFailed(errors)) = config.validate() else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("primary_key")));
        assert!(errors.iter().any(|e| e.contains("delimiter")));
    }
}
