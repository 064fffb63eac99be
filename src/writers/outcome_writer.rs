use crate::error::{ProcessingError, Result};
use crate::models::Outcome;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes `station;min;max;avg` lines, one per outcome, in the order given.
pub struct OutcomeWriter {
    create_parent_dirs: bool,
}

impl OutcomeWriter {
    pub fn new() -> Self {
        Self {
            create_parent_dirs: true,
        }
    }

    pub fn with_create_parent_dirs(mut self, create_parent_dirs: bool) -> Self {
        self.create_parent_dirs = create_parent_dirs;
        self
    }

    /// Write outcomes to any sink. Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, outcomes: &[Outcome], sink: W) -> std::io::Result<u64> {
        let mut writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, sink);
        let mut bytes = 0u64;

        for outcome in outcomes {
            let line = format!("{}\n", outcome);
            writer.write_all(line.as_bytes())?;
            bytes += line.len() as u64;
        }

        writer.flush()?;
        Ok(bytes)
    }

    /// Create (or truncate) `path` and write every outcome to it
    pub fn write_outcomes(&self, outcomes: &[Outcome], path: &Path) -> Result<WriteSummary> {
        if self.create_parent_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| ProcessingError::file_access(parent, e))?;
            }
        }

        let file = File::create(path).map_err(|e| ProcessingError::file_access(path, e))?;
        let bytes = self
            .write_to(outcomes, file)
            .map_err(|e| ProcessingError::file_access(path, e))?;

        info!("Wrote {} stations to {}", outcomes.len(), path.display());

        Ok(WriteSummary {
            path: path.to_path_buf(),
            rows: outcomes.len(),
            bytes,
        })
    }
}

impl Default for OutcomeWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: u64,
}

impl WriteSummary {
    pub fn summary(&self) -> String {
        format!(
            "Output File Summary:\n\
            - Path: {}\n\
            - Stations: {}\n\
            - File size: {:.2} KB",
            self.path.display(),
            self.rows,
            self.bytes as f64 / 1024.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_outcomes() -> Vec<Outcome> {
        vec![
            Outcome::new("Huesca".to_string(), 10.0, 20.0, 15.0),
            Outcome::new("Zaragoza".to_string(), 5.5, 5.5, 5.5),
        ]
    }

    #[test]
    fn test_write_to_buffer() {
        let mut buffer = Vec::new();
        let bytes = OutcomeWriter::new()
            .write_to(&sample_outcomes(), &mut buffer)
            .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "Huesca;10.00;20.00;15.00\nZaragoza;5.50;5.50;5.50\n");
        assert_eq!(bytes, text.len() as u64);
    }

    #[test]
    fn test_write_outcomes_creates_parent_dirs() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested").join("output.txt");

        let summary = OutcomeWriter::new().write_outcomes(&sample_outcomes(), &path)?;

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.bytes, fs::metadata(&path)?.len());
        assert!(summary.summary().contains("Stations: 2"));
        Ok(())
    }

    #[test]
    fn test_empty_outcomes_write_empty_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("output.txt");

        OutcomeWriter::new().write_outcomes(&[], &path)?;

        assert_eq!(fs::read_to_string(&path)?, "");
        Ok(())
    }

    #[test]
    fn test_unwritable_path_is_descriptive() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory")?;
        let path = blocker.join("output.txt");

        let err = OutcomeWriter::new()
            .with_create_parent_dirs(false)
            .write_outcomes(&sample_outcomes(), &path)
            .unwrap_err();

        assert!(matches!(err, ProcessingError::FileAccess { .. }));
        assert!(err.to_string().contains("output.txt"));
        Ok(())
    }
}
