pub mod chunk;
pub mod measurement;
pub mod outcome;
pub mod station_values;

pub use chunk::Chunk;
pub use measurement::Record;
pub use outcome::Outcome;
pub use station_values::StationValues;
