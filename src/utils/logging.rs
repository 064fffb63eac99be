use crate::error::{ProcessingError, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, dispatcher, Level};

/// Install the global fmt subscriber. Logs go to stderr unless a log file is given.
///
/// The first caller in a process decides the subscriber; later calls keep it.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    if dispatcher::has_been_set() {
        debug!("Logging already initialised; keeping the existing subscriber");
        return Ok(());
    }

    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| ProcessingError::file_access(path, e))?;
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    match installed {
        Ok(()) => Ok(()),
        // Lost a race with another thread installing one first
        Err(_) if dispatcher::has_been_set() => Ok(()),
        Err(e) => Err(ProcessingError::Config(format!(
            "Failed to initialise logging: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_keeps_first_subscriber() -> Result<()> {
        init_logging(false, None)?;
        init_logging(true, None)?;
        assert!(dispatcher::has_been_set());
        Ok(())
    }
}
