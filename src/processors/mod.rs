pub mod merger;
pub mod parser;
pub mod partitioner;
pub mod pipeline;
pub mod reducer;

pub use merger::StationMerger;
pub use parser::{parse_batch, parse_line, parse_sequential, BatchStats};
pub use partitioner::{LinePartitioner, SubBatchSpan};
pub use pipeline::{IngestReport, Pipeline, PipelineOutput};
pub use reducer::{compute_outcome, StatisticsReducer};
