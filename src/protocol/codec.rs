//! Protocol codec
//!
//! Stream-level framing for the management interface.
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! <command line>\n
//! ```
//!
//! ### Response
//! ```text
//! SUCCESS: <payload>\n                 single-line acknowledgement
//! ERROR: <message>\n                   single-line error
//!
//! <row>\n                              multi-line block, any number of rows
//! <row>\n
//! END\n                                terminator, part of the response
//! ```
//!
//! Lines starting with `>` are real-time notifications pushed by the daemon
//! at any time. They are never part of a response.

use std::io::{self, BufRead, Write};

use super::decode::{is_error_marker, is_failure_marker, SUCCESS_PREFIX};
use crate::error::{TransportError, TransportResult};

/// Line that closes a multi-line response
pub const END_MARKER: &str = "END";

/// Prefix of asynchronous daemon notifications
pub const NOTIFICATION_PREFIX: char = '>';

// =============================================================================
// Command Sender
// =============================================================================

/// Write one command line to a stream and flush it.
///
/// The line terminator is appended here; a trailing one in `command` is
/// dropped. A command spanning several lines would desynchronize the
/// conversation and is refused before anything is written.
pub fn send_command<W: Write>(writer: &mut W, command: &str) -> TransportResult<()> {
    let command = command.trim_end_matches(&['\r', '\n'][..]);
    if command.contains(&['\r', '\n'][..]) {
        return Err(TransportError::WriteFailed(io::Error::new(
            io::ErrorKind::InvalidInput,
            "command contains a line break",
        )));
    }

    let mut line = String::with_capacity(command.len() + 1);
    line.push_str(command);
    line.push('\n');

    writer
        .write_all(line.as_bytes())
        .map_err(TransportError::WriteFailed)?;
    writer.flush().map_err(TransportError::WriteFailed)?;

    tracing::trace!(command, "sent management command");
    Ok(())
}

// =============================================================================
// Response Reader
// =============================================================================

/// Read exactly one framed response from a stream.
///
/// A first line that is a status acknowledgement (`SUCCESS:`, `ERROR:`,
/// `failure`) is the whole response. Anything else starts a block that runs
/// up to and including the `END` line. Notification lines are skipped.
///
/// Blocks until the response is complete. Fails with
/// [`TransportError::Incomplete`] when the stream ends first.
pub fn read_response<R: BufRead>(reader: &mut R) -> TransportResult<String> {
    let mut response = String::new();
    let mut line = String::new();
    let mut lines_read = 0usize;

    loop {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .map_err(TransportError::ReadFailed)?;
        if n == 0 {
            return Err(TransportError::Incomplete {
                partial_lines: lines_read,
            });
        }

        let content = line.trim_end_matches(&['\r', '\n'][..]);
        if content.starts_with(NOTIFICATION_PREFIX) {
            tracing::trace!(notification = content, "skipping real-time notification");
            continue;
        }

        lines_read += 1;
        response.push_str(&line);

        if lines_read == 1 && is_acknowledgement(content) {
            break;
        }
        if content == END_MARKER {
            break;
        }
    }

    tracing::trace!(lines = lines_read, "framed management response");
    Ok(response)
}

/// Whether a first line is a complete single-line response
fn is_acknowledgement(line: &str) -> bool {
    line.starts_with(SUCCESS_PREFIX) || is_error_marker(line) || is_failure_marker(line)
}
