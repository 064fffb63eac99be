use crate::error::Result;
use crate::utils::constants::{
    CHANNEL_SLOTS_PER_WORKER, DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_FILE, DEFAULT_SUB_BATCHES,
    DEFAULT_WINDOW_SIZE, ENV_PREFIX,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Tunables for one pipeline run.
///
/// Values are layered: built-in defaults, then an optional config file, then
/// `STATION_AGG_*` environment variables, then explicit `with_*` overrides.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    pub input_path: PathBuf,

    pub output_path: PathBuf,

    /// Bytes requested per read. Memory headroom, not a hard cap: a chunk grows past
    /// this when a single line is longer than the window.
    #[validate(range(min = 1))]
    pub window_size: usize,

    /// Number of sub-batches each chunk's lines are split into
    #[validate(range(min = 1, max = 4096))]
    pub sub_batches: usize,

    #[validate(range(min = 1))]
    pub max_workers: usize,

    /// Bounded work queue length between the chunk producer and the workers.
    /// Unset means `CHANNEL_SLOTS_PER_WORKER` slots per worker, resolved after every
    /// layer has been applied.
    #[validate(range(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_capacity: Option<usize>,
}

impl PipelineConfig {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            window_size: DEFAULT_WINDOW_SIZE,
            sub_batches: DEFAULT_SUB_BATCHES,
            max_workers: num_cpus::get(),
            channel_capacity: None,
        }
    }

    /// Load configuration from defaults, an optional file and the environment
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default(
                "input_path",
                defaults.input_path.to_string_lossy().into_owned(),
            )?
            .set_default(
                "output_path",
                defaults.output_path.to_string_lossy().into_owned(),
            )?
            .set_default("window_size", defaults.window_size as u64)?
            .set_default("sub_batches", defaults.sub_batches as u64)?
            .set_default("max_workers", defaults.max_workers as u64)?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn with_input_path(mut self, input_path: impl Into<PathBuf>) -> Self {
        self.input_path = input_path.into();
        self
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_sub_batches(mut self, sub_batches: usize) -> Self {
        self.sub_batches = sub_batches;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_channel_capacity(mut self, channel_capacity: usize) -> Self {
        self.channel_capacity = Some(channel_capacity);
        self
    }

    /// Work queue length: the explicit capacity, or a couple of slots per worker
    pub fn queue_capacity(&self) -> usize {
        self.channel_capacity
            .unwrap_or(self.max_workers * CHANNEL_SLOTS_PER_WORKER)
            .max(1)
    }

    /// Validate and return self, for use at the end of a builder chain
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_FILE)
    }
}
