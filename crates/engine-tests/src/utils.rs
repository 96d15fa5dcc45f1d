use engine_config::settings::{CONTROL_FILE, CheckpointSettings, PipelineConfig, SOURCE_FILE, TARGET_FILE};
use engine_core::{
    error::StateStoreError,
    events::sink::{EventSink, MemorySink},
    state::{CheckpointStore, csv_store::CsvCheckpointStore, models::Checkpoint},
};
use engine_runtime::{
    error::PipelineError,
    execution::{
        executor::{Pipeline, PipelineOptions},
        factory,
    },
    report::RunReport,
};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

pub const SOURCE_HEADER: &str = "id,created_date,amount";
pub const TARGET_HEADER: &str = "id,created_date,amount";

/// Builds CSV text from a header and data lines.
pub fn csv(header: &str, lines: &[&str]) -> String {
    let mut out = String::from(header);
    out.push('\n');
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

pub fn control_table(date: &str) -> String {
    format!("last_run_date\n{date}\n")
}

/// A temporary directory in the conventional layout.
pub struct DataDir {
    dir: TempDir,
}

impl DataDir {
    pub fn new(source: &[&str], target: &[&str], last_run_date: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let data = DataDir { dir };
        data.write(SOURCE_FILE, &csv(SOURCE_HEADER, source));
        data.write(TARGET_FILE, &csv(TARGET_HEADER, target));
        data.write(CONTROL_FILE, &control_table(last_run_date));
        data
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) {
        fs::write(self.file(name), contents).expect("write fixture");
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.file(name)).expect("read fixture")
    }

    pub fn config(&self) -> PipelineConfig {
        PipelineConfig::from_data_dir(self.path())
    }

    /// Same layout, checkpoint kept in a sled database under `state/`.
    pub fn sled_config(&self, pipeline: &str) -> PipelineConfig {
        let mut config = self.config();
        config.name = pipeline.to_string();
        config.checkpoint = CheckpointSettings::Sled {
            path: self.file("state"),
            key: None,
        };
        config
    }

    /// Every regular file in the directory and its exact bytes.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        fs::read_dir(self.path())
            .expect("list temp dir")
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                let bytes = fs::read(e.path()).expect("read file");
                (name, bytes)
            })
            .collect()
    }
}

/// Runs the configured pipeline, collecting its events.
pub fn run_pipeline(
    config: &PipelineConfig,
    options: PipelineOptions,
) -> (Result<RunReport, PipelineError>, MemorySink) {
    let mut sink = MemorySink::new();
    let result = factory::create_pipeline(config, options).and_then(|p| p.run(&mut sink));
    (result, sink)
}

pub fn run_with(config: &PipelineConfig, sink: &mut dyn EventSink) -> Result<RunReport, PipelineError> {
    factory::create_pipeline(config, PipelineOptions::default())?.run(sink)
}

/// Control-table store whose writes always fail.
pub struct UnwritableStore(pub CsvCheckpointStore);

impl CheckpointStore for UnwritableStore {
    fn read(&self) -> Result<Checkpoint, StateStoreError> {
        self.0.read()
    }

    fn overwrite(&self, _cp: &Checkpoint) -> Result<(), StateStoreError> {
        Err(StateStoreError::Io {
            location: self.location(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume"),
        })
    }

    fn location(&self) -> String {
        self.0.location()
    }
}

/// The configured pipeline with its checkpoint store swapped out.
pub fn pipeline_with_store(config: &PipelineConfig, store: Box<dyn CheckpointStore>) -> Pipeline {
    let (source, target) = factory::create_sources(config);
    Pipeline::new(&config.name, source, target, store)
}
