pub mod outcome_writer;

pub use outcome_writer::{OutcomeWriter, WriteSummary};
