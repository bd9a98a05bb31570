//! CLI argument types for `mcp-bridge`.
//!
//! Defined separately from `main.rs` so integration tests can parse them
//! directly.

use std::convert::Infallible;

use clap::Args;

use crate::config::{DEBUG_ENV, DEFAULT_SERVER_URL, SERVER_URL_ENV};
use crate::smoke::SmokeCheck;

/// Arguments for `mcp-bridge`.
///
/// With no mode flag the bridge serves stdin/stdout until EOF.
#[derive(Args, Debug, Clone)]
pub struct BridgeArgs {
    /// Base URL of the remote MCP HTTP service.
    #[arg(long, env = SERVER_URL_ENV, default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Enable debug logging on stderr.
    ///
    /// Values other than true/1/yes/on leave debug off rather than failing.
    #[arg(long, env = DEBUG_ENV, value_parser = parse_debug_switch)]
    pub debug: bool,

    /// Send a canned tools/list request, print the response, and exit.
    #[arg(long, conflicts_with_all = ["test_init", "health"])]
    pub test: bool,

    /// Send a canned initialize request, print the response, and exit.
    #[arg(long = "test-init", conflicts_with = "health")]
    pub test_init: bool,

    /// Query the remote health endpoint, print the response, and exit.
    #[arg(long)]
    pub health: bool,
}

/// Lenient reading of the debug switch. Unrecognised values mean "off".
pub fn parse_debug_switch(value: &str) -> Result<bool, Infallible> {
    let value = value.trim();
    Ok(["true", "1", "yes", "on"]
        .iter()
        .any(|truthy| value.eq_ignore_ascii_case(truthy)))
}

/// What the process does after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Steady-state line-delimited JSON-RPC over stdin/stdout.
    Stdio,
    /// Send one canned request and exit.
    Smoke(SmokeCheck),
    /// GET the remote health endpoint and exit.
    Health,
}

impl BridgeArgs {
    pub fn mode(&self) -> RunMode {
        if self.test {
            RunMode::Smoke(SmokeCheck::ToolsList)
        } else if self.test_init {
            RunMode::Smoke(SmokeCheck::Initialize)
        } else if self.health {
            RunMode::Health
        } else {
            RunMode::Stdio
        }
    }
}
