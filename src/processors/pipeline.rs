use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{Chunk, Outcome, StationValues};
use crate::processors::parser::parse_batch;
use crate::processors::{LinePartitioner, StationMerger, StatisticsReducer};
use crate::readers::Chunker;
use crate::utils::progress::ProgressReporter;
use crate::writers::{OutcomeWriter, WriteSummary};
use crossbeam::channel::{self, Receiver, Sender};
use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// One unit of parser work: a run of whole lines inside a shared chunk
struct SubBatch {
    chunk: Arc<Chunk>,
    span: Range<usize>,
}

impl SubBatch {
    fn bytes(&self) -> &[u8] {
        &self.chunk.bytes[self.span.clone()]
    }
}

/// Counters and timings gathered while running the pipeline
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub bytes_read: u64,
    pub chunks: u64,
    pub sub_batches: u64,
    pub lines: u64,
    pub records: u64,
    pub skipped_lines: u64,
    pub stations: usize,
    pub ingest_time: Duration,
    pub reduce_time: Duration,
}

impl IngestReport {
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Ingest Report ===\n");
        summary.push_str(&format!("Bytes Read: {}\n", self.bytes_read));
        summary.push_str(&format!(
            "Chunks: {} ({} sub-batches)\n",
            self.chunks, self.sub_batches
        ));
        summary.push_str(&format!("Lines: {}\n", self.lines));
        summary.push_str(&format!("Records: {}\n", self.records));
        summary.push_str(&format!("Skipped Lines: {}\n", self.skipped_lines));
        summary.push_str(&format!("Stations: {}\n", self.stations));
        summary.push_str(&format!(
            "Ingest: {:.2?}, Reduce: {:.2?}\n",
            self.ingest_time, self.reduce_time
        ));

        summary
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Result of ingesting and reducing one input file
#[derive(Debug)]
pub struct PipelineOutput {
    pub outcomes: Vec<Outcome>,
    pub report: IngestReport,
}

#[derive(Default)]
struct Counters {
    bytes_read: AtomicU64,
    chunks: AtomicU64,
    sub_batches: AtomicU64,
    lines: AtomicU64,
    records: AtomicU64,
}

/// First fatal error wins; raising it tells the producer and workers to stop.
#[derive(Default)]
struct Cancellation {
    cancelled: AtomicBool,
    first_error: Mutex<Option<ProcessingError>>,
}

impl Cancellation {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn fail(&self, err: ProcessingError) {
        if let Ok(mut slot) = self.first_error.lock() {
            if slot.is_none() {
                error!("Pipeline failed: {}", err);
                *slot = Some(err);
            }
        }
        self.cancelled.store(true, Ordering::Release);
    }

    fn into_error(self) -> Option<ProcessingError> {
        match self.first_error.into_inner() {
            Ok(err) => err,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Chunk → partition → parse → merge → reduce, with a producer thread feeding a
/// flat pool of parser workers over a bounded channel.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ingest and reduce the configured input
    pub fn process(&self, progress: Option<&ProgressReporter>) -> Result<PipelineOutput> {
        let started = Instant::now();
        let (merged, mut report) = self.ingest(progress)?;
        report.ingest_time = started.elapsed();
        info!(
            "Ingested {} records for {} stations in {:.2?}",
            report.records, report.stations, report.ingest_time
        );

        if let Some(p) = progress {
            p.set_message(&format!("Reducing {} stations...", report.stations));
        }

        let started = Instant::now();
        let outcomes = StatisticsReducer::new(self.config.max_workers).reduce(merged)?;
        report.reduce_time = started.elapsed();
        info!(
            "Computed {} station outcomes in {:.2?}",
            outcomes.len(),
            report.reduce_time
        );

        Ok(PipelineOutput { outcomes, report })
    }

    /// Run the whole pipeline and write the configured output file
    pub fn process_and_write(
        &self,
        progress: Option<&ProgressReporter>,
    ) -> Result<(PipelineOutput, WriteSummary)> {
        let output = self.process(progress)?;

        if let Some(p) = progress {
            p.set_message("Writing output...");
        }

        let summary =
            OutcomeWriter::new().write_outcomes(&output.outcomes, &self.config.output_path)?;
        Ok((output, summary))
    }

    /// Read, parse and merge the input into one station map
    pub fn ingest(
        &self,
        progress: Option<&ProgressReporter>,
    ) -> Result<(StationValues, IngestReport)> {
        let config = &self.config;
        let chunker = Chunker::from_path(&config.input_path, config.window_size)?;
        let partitioner = LinePartitioner::new(config.sub_batches);
        let merger = StationMerger::new();
        let counters = Counters::default();
        let cancellation = Cancellation::default();

        info!(
            "Ingesting {} (window {} bytes, {} sub-batches, {} workers)",
            config.input_path.display(),
            config.window_size,
            partitioner.sub_batches(),
            config.max_workers
        );

        let (sender, receiver) = channel::bounded::<SubBatch>(config.queue_capacity());

        thread::scope(|scope| {
            let workers: Vec<_> = (0..config.max_workers.max(1))
                .map(|id| {
                    let receiver = receiver.clone();
                    let merger = &merger;
                    let counters = &counters;
                    let cancellation = &cancellation;
                    scope.spawn(move || run_worker(id, receiver, merger, counters, cancellation))
                })
                .collect();
            // Workers hold the only receivers; once they all exit, sends fail fast
            drop(receiver);

            let producer = scope.spawn(|| {
                run_producer(
                    chunker,
                    &partitioner,
                    sender,
                    &counters,
                    &cancellation,
                    progress,
                )
            });

            if let Err(payload) = producer.join() {
                cancellation.fail(ProcessingError::WorkerPanic(format!(
                    "chunk producer: {}",
                    panic_message(payload)
                )));
            }

            for (id, worker) in workers.into_iter().enumerate() {
                if let Err(payload) = worker.join() {
                    cancellation.fail(ProcessingError::WorkerPanic(format!(
                        "worker {}: {}",
                        id,
                        panic_message(payload)
                    )));
                }
            }
        });

        if let Some(err) = cancellation.into_error() {
            return Err(err);
        }

        let merged = merger.into_station_values()?;

        let lines = counters.lines.load(Ordering::Relaxed);
        let records = counters.records.load(Ordering::Relaxed);
        let report = IngestReport {
            bytes_read: counters.bytes_read.load(Ordering::Relaxed),
            chunks: counters.chunks.load(Ordering::Relaxed),
            sub_batches: counters.sub_batches.load(Ordering::Relaxed),
            lines,
            records,
            skipped_lines: lines - records,
            stations: merged.len(),
            ..IngestReport::default()
        };

        Ok((merged, report))
    }
}

/// Emit sub-batches for every chunk until EOF, an error, or cancellation.
/// Dropping `sender` on return closes the stream for the workers.
fn run_producer<R: std::io::Read>(
    chunker: Chunker<R>,
    partitioner: &LinePartitioner,
    sender: Sender<SubBatch>,
    counters: &Counters,
    cancellation: &Cancellation,
    progress: Option<&ProgressReporter>,
) {
    for chunk in chunker {
        if cancellation.is_cancelled() {
            debug!("Producer stopping: pipeline cancelled");
            return;
        }

        let chunk = match chunk {
            Ok(chunk) => Arc::new(chunk),
            Err(e) => {
                cancellation.fail(e);
                return;
            }
        };

        counters.chunks.fetch_add(1, Ordering::Relaxed);
        counters
            .bytes_read
            .fetch_add(chunk.len() as u64, Ordering::Relaxed);
        debug!("Chunk at offset {} ({} bytes)", chunk.offset, chunk.len());

        for span in partitioner.partition(&chunk.bytes) {
            if span.is_empty() {
                continue;
            }

            let batch = SubBatch {
                chunk: Arc::clone(&chunk),
                span: span.bytes,
            };
            if sender.send(batch).is_err() {
                // Every worker has gone away, which only happens after a failure
                debug!("Producer stopping: no workers left");
                return;
            }
            counters.sub_batches.fetch_add(1, Ordering::Relaxed);
        }

        if let Some(p) = progress {
            p.increment(chunk.len() as u64);
        }
    }
}

/// Parse sub-batches into fresh local maps and fold each into the merger
fn run_worker(
    id: usize,
    receiver: Receiver<SubBatch>,
    merger: &StationMerger,
    counters: &Counters,
    cancellation: &Cancellation,
) {
    let mut handled = 0u64;

    for batch in receiver.iter() {
        if cancellation.is_cancelled() {
            break;
        }

        let mut local = StationValues::new();
        let stats = parse_batch(batch.bytes(), &mut local);
        counters.lines.fetch_add(stats.lines, Ordering::Relaxed);
        counters.records.fetch_add(stats.records, Ordering::Relaxed);

        if let Err(e) = merger.merge(local) {
            cancellation.fail(e);
            break;
        }
        handled += 1;
    }

    debug!("Worker {} finished after {} sub-batches", id, handled);
}
