//! Diagnostic logging to stderr.
//!
//! stdout carries protocol traffic only, so every diagnostic goes to stderr
//! through `tracing`. Each line starts with [`LOG_TAG`] and the level, so
//! the bridge's output is easy to pick out of a host application's log.

use std::fmt;

use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

/// Prefix on every diagnostic line.
pub const LOG_TAG: &str = "[MCP-BRIDGE]";

/// Event formatter producing `[MCP-BRIDGE] LEVEL: span{fields}: message fields`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedFormat;

impl<S, N> FormatEvent<S, N> for TaggedFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{LOG_TAG} {}: ", event.metadata().level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("info,mcp_bridge=debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Install the global subscriber. Call once, before anything logs.
///
/// `RUST_LOG` wins when set; otherwise `debug` selects between info and debug
/// verbosity for this crate.
pub fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug));

    // A subscriber can only be installed once per process; a second call is a
    // no-op.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .event_format(TaggedFormat)
        .try_init();
}
