//! The stdio request loop.
//!
//! Reads one line, answers it, reads the next. A line is fully answered
//! (including its HTTP round-trip) before the next one is read, so responses
//! leave in exactly the order requests arrived.

use std::future::Future;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::dispatch::Dispatcher;
use crate::error::{BridgeError, FramingError};
use crate::jsonrpc::ErrorResponse;

use super::ndjson::{MAX_MESSAGE_BYTES, bounded_read_line, parse_line};

/// Why the loop stopped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// stdin reached EOF.
    EndOfInput,
    /// The shutdown future resolved (SIGINT/SIGTERM).
    Interrupted,
}

/// Outcome of handling one input line.
enum Step {
    Continue,
    Eof,
}

/// Line-oriented JSON-RPC loop over any async reader/writer pair.
///
/// Production wires this to the process's stdin and stdout; tests use
/// in-memory buffers.
pub struct StdioBridge<R, W> {
    dispatcher: Dispatcher,
    reader: R,
    writer: W,
    max_message_bytes: usize,
    line_buf: Vec<u8>,
    responses_written: u64,
}

impl<R, W> StdioBridge<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(dispatcher: Dispatcher, reader: R, writer: W) -> Self {
        Self {
            dispatcher,
            reader,
            writer,
            max_message_bytes: MAX_MESSAGE_BYTES,
            line_buf: Vec::new(),
            responses_written: 0,
        }
    }

    /// Override the per-line size limit.
    #[must_use]
    pub fn with_max_message_bytes(mut self, max_message_bytes: usize) -> Self {
        self.max_message_bytes = max_message_bytes;
        self
    }

    /// Number of response lines written so far.
    pub fn responses_written(&self) -> u64 {
        self.responses_written
    }

    /// Give back the writer, e.g. to inspect buffered output in tests.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Run until EOF, until `shutdown` resolves, or until the loop itself
    /// fails.
    ///
    /// On failure one final `-32603` response with a null id is written on a
    /// best-effort basis before the error is returned.
    ///
    /// # Errors
    ///
    /// `BridgeError::StdinIo` or `BridgeError::StdoutIo`. Per-request
    /// failures never surface here; they are answered on the writer.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<LoopExit, BridgeError>
    where
        F: Future<Output = ()>,
    {
        info!("Starting MCP bridge stdio mode");

        let result = self.serve(shutdown).await;

        match &result {
            Ok(LoopExit::EndOfInput) => {
                info!(responses = self.responses_written, "stdin closed, exiting");
            }
            Ok(LoopExit::Interrupted) => {
                info!(
                    responses = self.responses_written,
                    "Received interrupt, shutting down"
                );
            }
            Err(e) => {
                error!(error = %e, "Unexpected error in main loop");
                let last = ErrorResponse::internal_error(Value::Null, e).into_value();
                if let Err(write_err) = self.write_response(&last).await {
                    debug!(error = %write_err, "final error response could not be written");
                }
            }
        }

        result
    }

    async fn serve<F>(&mut self, shutdown: F) -> Result<LoopExit, BridgeError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => return Ok(LoopExit::Interrupted),
                step = self.step() => {
                    if let Step::Eof = step? {
                        return Ok(LoopExit::EndOfInput);
                    }
                }
            }
        }
    }

    /// Read and answer one line.
    async fn step(&mut self) -> Result<Step, BridgeError> {
        self.line_buf.clear();

        match bounded_read_line(&mut self.reader, &mut self.line_buf, self.max_message_bytes).await
        {
            Ok(0) => return Ok(Step::Eof),
            Ok(_) => {}
            Err(FramingError::Io(e)) => return Err(BridgeError::StdinIo(e)),
            Err(e) => {
                warn!(error = %e, "Rejecting oversized input line");
                self.write_response(&ErrorResponse::parse_error(&e).into_value())
                    .await?;
                return Ok(Step::Continue);
            }
        }

        let request = match parse_line(&self.line_buf) {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(Step::Continue),
            Err(e) => {
                warn!(error = %e, "JSON decode error");
                self.write_response(&ErrorResponse::parse_error(&e).into_value())
                    .await?;
                return Ok(Step::Continue);
            }
        };

        debug!(request = %request, "Received line");

        let response = self.dispatcher.dispatch(&request).await;
        self.write_response(&response).await?;
        Ok(Step::Continue)
    }

    /// Write one response as a single line and flush.
    async fn write_response(&mut self, response: &Value) -> Result<(), BridgeError> {
        // Value's Display is compact JSON, so a multi-line upstream body
        // still goes out on one line.
        let mut line = response.to_string();
        debug!(response = %line, "Sending response");
        line.push('\n');

        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(BridgeError::StdoutIo)?;
        self.writer.flush().await.map_err(BridgeError::StdoutIo)?;

        self.responses_written += 1;
        Ok(())
    }
}
