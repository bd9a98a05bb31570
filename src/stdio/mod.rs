//! Stdio side of the bridge: NDJSON framing, the request loop, and signal
//! handling.

pub mod bridge;
pub mod ndjson;
pub mod shutdown;

pub use bridge::{LoopExit, StdioBridge};

use tokio::io::BufReader;

use crate::dispatch::Dispatcher;
use crate::error::BridgeError;

/// Serve the process's own stdin/stdout until EOF or a shutdown signal.
///
/// # Errors
///
/// See [`StdioBridge::run_until`].
pub async fn run_stdio(dispatcher: Dispatcher) -> Result<LoopExit, BridgeError> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    let mut bridge = StdioBridge::new(dispatcher, stdin, stdout);
    bridge.run_until(shutdown::shutdown_signal()).await
}
