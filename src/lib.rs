//! Stdio-to-HTTP bridge for line-delimited JSON-RPC (MCP) clients.
//!
//! A client that only speaks JSON-RPC over pipes writes one request per line
//! on stdin; the bridge POSTs it to the matching endpoint of a remote HTTP
//! service and writes the reply back as one line on stdout.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod jsonrpc;
pub mod logging;
pub mod smoke;
pub mod stdio;
pub mod transport;
