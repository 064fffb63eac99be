use crate::cli::args::{Cli, Commands, PipelineArgs};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::StationValues;
use crate::processors::{compute_outcome, parse_line, Pipeline};
use crate::readers::Chunker;
use crate::utils::constants::LINE_TERMINATOR;
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Process {
            pipeline,
            output_file,
        } => {
            let mut config = resolve_config(cli.config.as_deref(), &pipeline)?;
            if let Some(output_file) = output_file {
                config = config.with_output_path(output_file);
            }
            let config = config.validated()?;

            println!("Processing measurements...");
            println!("Input file: {}", config.input_path.display());
            println!("Output file: {}", config.output_path.display());
            println!(
                "Workers: {}, Sub-batches: {}, Window: {} bytes",
                config.max_workers, config.sub_batches, config.window_size
            );

            let quiet = cli.quiet;
            let (output, write_summary) = tokio::task::spawn_blocking(move || {
                let pipeline = Pipeline::new(config);
                let progress = progress_for(&pipeline.config().input_path, quiet);
                let result = pipeline.process_and_write(Some(&progress));
                progress.finish_with_message("Processing complete");
                result
            })
            .await??;

            println!("\n{}", output.report.summary());
            println!("{}", write_summary.summary());
            println!("Processing complete!");
        }

        Commands::Validate { pipeline } => {
            let config = resolve_config(cli.config.as_deref(), &pipeline)?.validated()?;

            println!("Validating measurements...");
            println!("Input file: {}", config.input_path.display());

            let quiet = cli.quiet;
            let output = tokio::task::spawn_blocking(move || {
                let pipeline = Pipeline::new(config);
                let progress = progress_for(&pipeline.config().input_path, quiet);
                let result = pipeline.process(Some(&progress));
                progress.finish_with_message("Validation complete");
                result
            })
            .await??;

            println!("\n{}", output.report.summary());

            if output.report.skipped_lines == 0 {
                println!("✅ All lines parsed as station;value records");
            } else {
                println!("⚠️  Skipped {} malformed lines", output.report.skipped_lines);
            }
            println!("Validation complete - no output file written");
        }

        Commands::Inspect {
            input_file,
            stations,
            sample,
        } => {
            let mut config = PipelineConfig::load(cli.config.as_deref())?;
            if let Some(input_file) = input_file {
                config = config.with_input_path(input_file);
            }

            println!("Inspecting: {}", config.input_path.display());
            let lines = tokio::task::spawn_blocking(move || {
                inspect_stations(&config.input_path, &stations, sample, config.window_size)
            })
            .await??;

            for line in lines {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

/// Layer CLI flags over the file/environment configuration
fn resolve_config(config_file: Option<&Path>, args: &PipelineArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(config_file)?;

    if let Some(ref input_file) = args.input_file {
        config = config.with_input_path(input_file);
    }
    if let Some(window_size) = args.window_size {
        config = config.with_window_size(window_size);
    }
    if let Some(sub_batches) = args.sub_batches {
        config = config.with_sub_batches(sub_batches);
    }
    if let Some(max_workers) = args.max_workers {
        config = config.with_max_workers(max_workers);
    }
    if let Some(channel_capacity) = args.channel_capacity {
        config = config.with_channel_capacity(channel_capacity);
    }

    info!("Resolved configuration: {:?}", config);
    Ok(config)
}

fn progress_for(input_path: &Path, quiet: bool) -> ProgressReporter {
    // A missing file is reported by the pipeline itself
    let total_bytes = fs::metadata(input_path).map(|m| m.len()).unwrap_or(0);
    ProgressReporter::new_bytes(total_bytes, "Reading measurements...", quiet)
}

/// Per-station report lines from a single-threaded scan of the file.
///
/// Reads in `window_size` windows and keeps values only for the requested stations.
pub fn inspect_stations(
    input_path: &Path,
    stations: &[String],
    sample: usize,
    window_size: usize,
) -> Result<Vec<String>> {
    let wanted: HashSet<&str> = stations.iter().map(String::as_str).collect();
    let mut values = StationValues::new();

    for chunk in Chunker::from_path(input_path, window_size)? {
        let chunk = chunk?;
        for line in chunk.bytes.split(|b| *b == LINE_TERMINATOR) {
            if let Some(record) = parse_line(line) {
                if wanted.contains(record.station) {
                    values.push(record.station, record.value);
                }
            }
        }
    }

    let mut lines = Vec::new();
    for station in stations {
        match values.get(station) {
            Some(station_values) => {
                let outcome = compute_outcome(station.clone(), station_values)?;
                lines.push(format!(
                    "{}: {} values, min={:.2}, max={:.2}, avg={:.2}",
                    station,
                    station_values.len(),
                    outcome.min,
                    outcome.max,
                    outcome.avg
                ));

                let shown: Vec<String> = station_values
                    .iter()
                    .take(sample)
                    .map(|v| v.to_string())
                    .collect();
                if !shown.is_empty() {
                    lines.push(format!("  values: [{}]", shown.join(", ")));
                }
            }
            None => lines.push(format!("{}: not found", station)),
        }
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_inspect_stations() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "Huesca;10.0\nHuesca;20.0\nZaragoza;5.5\n")?;

        let lines = inspect_stations(
            file.path(),
            &["Huesca".to_string(), "Teruel".to_string()],
            1,
            4096,
        )?;

        assert_eq!(
            lines,
            vec![
                "Huesca: 2 values, min=10.00, max=20.00, avg=15.00".to_string(),
                "  values: [10]".to_string(),
                "Teruel: not found".to_string(),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_inspect_stations_window_smaller_than_a_line() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(
            file,
            "Huesca;10.0\nZaragoza;5.5\nHuesca;20.0\nTeruel;bad\nHuesca;30.0"
        )?;
        let stations = ["Huesca".to_string(), "Zaragoza".to_string()];

        let windowed = inspect_stations(file.path(), &stations, 3, 3)?;
        let whole = inspect_stations(file.path(), &stations, 3, 1 << 20)?;

        assert_eq!(windowed, whole);
        assert_eq!(
            windowed,
            vec![
                "Huesca: 3 values, min=10.00, max=30.00, avg=20.00".to_string(),
                "  values: [10, 20, 30]".to_string(),
                "Zaragoza: 1 values, min=5.50, max=5.50, avg=5.50".to_string(),
                "  values: [5.5]".to_string(),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_inspect_missing_file_is_an_error() {
        let result = inspect_stations(
            Path::new("/nonexistent/measurements.txt"),
            &["Huesca".to_string()],
            1,
            64,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_flags_override_configuration() -> Result<()> {
        let args = PipelineArgs {
            input_file: Some(PathBuf::from("custom.txt")),
            window_size: Some(1024),
            sub_batches: Some(4),
            max_workers: Some(2),
            channel_capacity: Some(7),
        };

        let config = resolve_config(None, &args)?;

        assert_eq!(config.input_path, PathBuf::from("custom.txt"));
        assert_eq!(config.window_size, 1024);
        assert_eq!(config.sub_batches, 4);
        assert_eq!(config.max_workers, 2);
        assert_eq!(config.queue_capacity(), 7);
        Ok(())
    }
}
