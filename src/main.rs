//! mcp-bridge entry point.
//!
//! Parses flags and environment, builds the dispatcher, then either serves
//! stdin/stdout or runs one of the one-shot modes.

use clap::Parser;
use serde_json::Value;

use mcp_bridge::cli::{BridgeArgs, RunMode};
use mcp_bridge::config::BridgeConfig;
use mcp_bridge::dispatch::Dispatcher;
use mcp_bridge::jsonrpc::ErrorResponse;
use mcp_bridge::logging::init_tracing;
use mcp_bridge::smoke::{run_health, run_smoke};
use mcp_bridge::stdio::run_stdio;
use mcp_bridge::transport::UpstreamClient;

// ─────────────────────────────────────────────────────────────────────────────
// CLI Definitions
// ─────────────────────────────────────────────────────────────────────────────

/// Bridge line-delimited JSON-RPC on stdin/stdout to an HTTP MCP service.
#[derive(Parser)]
#[command(name = "mcp-bridge", version)]
struct Cli {
    #[command(flatten)]
    args: BridgeArgs,
}

/// Exit code for unusable configuration, matching clap's usage errors.
const EXIT_CONFIG: i32 = 2;

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.args.debug);

    let code = run(cli.args).await;
    std::process::exit(code);
}

async fn run(args: BridgeArgs) -> i32 {
    let dispatcher = match build_dispatcher(&args.server_url) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("mcp-bridge: {e}");
            return EXIT_CONFIG;
        }
    };

    match args.mode() {
        RunMode::Stdio => match run_stdio(dispatcher).await {
            Ok(_) => 0,
            Err(_) => 1,
        },
        RunMode::Smoke(check) => {
            let response = run_smoke(&dispatcher, check).await;
            print_pretty(&response);
            0
        }
        RunMode::Health => match run_health(dispatcher.upstream()).await {
            Ok(body) => {
                print_pretty(&body);
                0
            }
            Err(e) => {
                print_pretty(&ErrorResponse::internal_error(Value::Null, e).into_value());
                1
            }
        },
    }
}

fn build_dispatcher(server_url: &str) -> Result<Dispatcher, mcp_bridge::error::BridgeError> {
    let config = BridgeConfig::new(server_url)?;
    tracing::info!(server_url = %config.base_url, "Initializing MCP bridge");
    let upstream = UpstreamClient::new(config)?;
    Ok(Dispatcher::new(upstream))
}

fn print_pretty(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("mcp-bridge: failed to format response: {e}"),
    }
}
