//! NDJSON framing for the stdio side of the bridge.
//!
//! [`bounded_read_line`] pulls one newline-terminated line off an async reader
//! without letting a peer force unbounded buffering. [`parse_line`] turns the
//! raw bytes into a JSON value, or reports that the line was blank.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::FramingError;

/// Maximum NDJSON message size (10 MiB).
///
/// Lines longer than this are drained and answered with a parse error
/// instead of being buffered whole.
pub const MAX_MESSAGE_BYTES: usize = 10 * 1024 * 1024;

/// Read a single line from an async buffered reader, enforcing a byte limit.
///
/// Raw bytes are accumulated into `buf` so that multi-byte UTF-8 characters
/// straddling internal buffer boundaries are never split; the caller converts
/// to text once the full line is assembled. The trailing `\n`, if any, is
/// kept in `buf`.
///
/// # Returns
///
/// - `Ok(n)` where `n > 0`: a line was read into `buf` (the last line of the
///   input may lack a newline)
/// - `Ok(0)`: EOF reached
/// - `Err(FramingError::MessageTooLarge)`: the line exceeded `max_bytes`; the
///   rest of it has been consumed so the next call starts on a fresh line
/// - `Err(FramingError::Io)`: underlying I/O error
pub async fn bounded_read_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_bytes: usize,
) -> Result<usize, FramingError> {
    let mut total = 0usize;
    loop {
        let available = reader.fill_buf().await?;

        if available.is_empty() {
            return Ok(total);
        }

        match available.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                let to_consume = pos + 1;
                if total + to_consume > max_bytes {
                    reader.consume(to_consume);
                    buf.clear();
                    return Err(FramingError::MessageTooLarge { max_bytes });
                }

                buf.extend_from_slice(&available[..to_consume]);
                total += to_consume;
                reader.consume(to_consume);
                return Ok(total);
            }
            None => {
                let len = available.len();
                if total + len > max_bytes {
                    reader.consume(len);
                    buf.clear();
                    drain_until_newline(reader).await?;
                    return Err(FramingError::MessageTooLarge { max_bytes });
                }

                buf.extend_from_slice(available);
                total += len;
                reader.consume(len);
            }
        }
    }
}

/// Discard input up to and including the next newline, or until EOF.
async fn drain_until_newline<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<(), FramingError> {
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

/// Parse one raw line.
///
/// Returns `Ok(None)` for a line that is empty after trimming whitespace.
///
/// # Errors
///
/// - `InvalidUtf8` if the bytes are not UTF-8
/// - `MalformedJson` if the trimmed text is not a single JSON value
pub fn parse_line(raw: &[u8]) -> Result<Option<Value>, FramingError> {
    let text = std::str::from_utf8(raw)?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value = serde_json::from_str(trimmed)?;
    Ok(Some(value))
}
