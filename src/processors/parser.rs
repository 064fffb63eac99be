use crate::models::{Record, StationValues};
use crate::processors::partitioner::line_spans;
use crate::utils::constants::{FIELD_DELIMITER, LINE_TERMINATOR};

/// Line counts from parsing one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub lines: u64,
    pub records: u64,
}

impl BatchStats {
    pub fn skipped(&self) -> u64 {
        self.lines - self.records
    }
}

/// Parse one `station;value` line.
///
/// Returns `None` for anything that is not exactly two fields with a finite
/// numeric second field, or that is not valid UTF-8. A single trailing `\r`
/// is ignored.
pub fn parse_line(line: &[u8]) -> Option<Record<'_>> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let line = std::str::from_utf8(line).ok()?;

    let mut fields = line.split(FIELD_DELIMITER as char);
    let station = fields.next()?;
    let value = fields.next()?;
    if fields.next().is_some() {
        return None;
    }

    let value = value.parse::<f32>().ok().filter(|v| v.is_finite())?;
    Some(Record::new(station, value))
}

/// Parse newline-separated lines into `local`, skipping malformed ones.
pub fn parse_batch(bytes: &[u8], local: &mut StationValues) -> BatchStats {
    let mut stats = BatchStats::default();

    for line in bytes.split(|b| *b == LINE_TERMINATOR) {
        stats.lines += 1;
        if let Some(record) = parse_line(line) {
            local.push(record.station, record.value);
            stats.records += 1;
        }
    }

    stats
}

/// Single-threaded parse of a whole buffer, used as the reference result for the
/// concurrent pipeline.
pub fn parse_sequential(bytes: &[u8]) -> (StationValues, BatchStats) {
    let mut values = StationValues::new();
    let mut stats = BatchStats::default();

    for span in line_spans(bytes) {
        stats.lines += 1;
        if let Some(record) = parse_line(&bytes[span]) {
            values.push(record.station, record.value);
            stats.records += 1;
        }
    }

    (values, stats)
}
