/// Record layout
pub const FIELD_DELIMITER: u8 = b';';
pub const LINE_TERMINATOR: u8 = b'\n';

/// File names
pub const DEFAULT_INPUT_FILE: &str = "measurements.txt";
pub const DEFAULT_OUTPUT_FILE: &str = "output.txt";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "STATION_AGG";

/// Processing defaults
pub const DEFAULT_WINDOW_SIZE: usize = 128 * 1024 * 1024; // 128MB
pub const DEFAULT_SUB_BATCHES: usize = 16;
pub const CHANNEL_SLOTS_PER_WORKER: usize = 2;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Number of independently locked shards in the merged station map
pub const MERGE_SHARDS: usize = 64;

/// Output formatting
pub const OUTPUT_DECIMALS: usize = 2;
