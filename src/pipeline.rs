//! Streaming decode loop.
//!
//! Reads newline-delimited JSON change payloads, decodes every row image and
//! writes one JSON document per change. A payload that cannot be parsed is
//! logged and skipped so one bad event never stops the stream.
//!
//! # Example
//!
//! ```rust,no_run
//! use pg_typecast::{Config, Pipeline};
//! use tokio::io::BufReader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Pipeline::new(Config::default());
//!     let mut stdout = tokio::io::stdout();
//!
//!     let stats = pipeline
//!         .run(BufReader::new(tokio::io::stdin()), &mut stdout)
//!         .await?;
//!     eprintln!("Decoded {} changes", stats.processed);
//!
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{debug, error, info};

use crate::postgres::{ChangePayload, CountingSink, DiagnosticSink, RecordDecoder, TracingSink};
use crate::{Config, Error, Result};

/// Counters for one [`Pipeline::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Changes decoded and written.
    pub processed: u64,
    /// Lines that were not a usable change payload.
    pub rejected: u64,
    /// Individual values that fell back to their raw string.
    pub conversion_failures: u64,
}

pub struct Pipeline {
    config: Config,
    decoder: RecordDecoder,
    sink: Arc<dyn DiagnosticSink>,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Reports conversion failures to `sink` instead of the tracing sink.
    pub fn with_sink(config: Config, sink: Arc<dyn DiagnosticSink>) -> Self {
        let decoder = RecordDecoder::new(config.decode_options());
        Self {
            config,
            decoder,
            sink,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decodes until `reader` is exhausted.
    pub async fn run<R, W>(&self, reader: R, writer: &mut W) -> Result<PipelineStats>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.run_until(reader, writer, std::future::pending()).await
    }

    /// Decodes until `reader` is exhausted or `shutdown` completes.
    ///
    /// Returns an error only when reading the input or writing the output
    /// fails.
    pub async fn run_until<R, W, F>(
        &self,
        reader: R,
        writer: &mut W,
        shutdown: F,
    ) -> Result<PipelineStats>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        F: Future<Output = ()>,
    {
        let counter = Arc::new(CountingSink::new(Arc::clone(&self.sink)));
        let decoder = self.decoder.clone().with_sink(counter.clone());
        let mut lines = LinesStream::new(reader.lines());
        let mut stats = PipelineStats::default();

        info!("Decode loop starting");
        tokio::pin!(shutdown);

        loop {
            let line = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping decode loop");
                    break;
                }
                line = lines.next() => line,
            };

            let Some(line) = line else {
                debug!("Input exhausted");
                break;
            };
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match self.process_line(&decoder, &line) {
                Ok(output) => {
                    writer.write_all(output.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                    stats.processed += 1;
                }
                Err(e) => {
                    error!(error = %e, "Rejected change payload");
                    stats.rejected += 1;
                }
            }
        }

        writer.flush().await?;
        stats.conversion_failures = counter.count();

        info!(
            processed = stats.processed,
            rejected = stats.rejected,
            conversion_failures = stats.conversion_failures,
            "Decode loop finished"
        );

        Ok(stats)
    }

    fn process_line(&self, decoder: &RecordDecoder, line: &str) -> Result<String> {
        let payload: ChangePayload = serde_json::from_str(line)?;

        if payload.record.is_none() && payload.old_record.is_none() {
            return Err(Error::InvalidMessage {
                message: format!(
                    "{:?} on {}.{} carries no row image",
                    payload.op, payload.schema, payload.table
                ),
            });
        }

        let change = decoder.decode_change(&payload);
        let output = if self.config.output.pretty {
            serde_json::to_string_pretty(&change)?
        } else {
            serde_json::to_string(&change)?
        };

        Ok(output)
    }
}
