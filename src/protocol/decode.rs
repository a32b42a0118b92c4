//! Response decoders
//!
//! Pure functions from the raw text returned by
//! [`read_response`](super::read_response) to typed values. None of them
//! touch a stream, so they can be fed any string.
//!
//! ## Error markers
//!
//! Replies to `version`, `pid`, `load-stats`, `status` and `signal` report
//! failure with a line starting with `error` (any case). Replies to `kill`
//! report failure with a line starting with lowercase `failure`. The two
//! families are checked separately, each decoder only recognizing its own.

use super::codec::END_MARKER;
use super::response::{KillSessionResult, LoadStats, ProcessId, Version};
use crate::error::{DecodeError, DecodeResult};

/// Prefix of a successful single-line acknowledgement
pub(crate) const SUCCESS_PREFIX: &str = "SUCCESS:";

const ERROR_MARKER: &str = "error";
const FAILURE_MARKER: &str = "failure";

/// `error` prefix, case-insensitive
pub(crate) fn is_error_marker(line: &str) -> bool {
    line.get(..ERROR_MARKER.len())
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case(ERROR_MARKER))
}

/// `failure` prefix, case-sensitive
pub(crate) fn is_failure_marker(line: &str) -> bool {
    line.starts_with(FAILURE_MARKER)
}

/// Error-marker convention of a response family
#[derive(Debug, Clone, Copy)]
enum Marker {
    Error,
    Failure,
}

impl Marker {
    fn matches(self, line: &str) -> bool {
        match self {
            Marker::Error => is_error_marker(line),
            Marker::Failure => is_failure_marker(line),
        }
    }
}

// =============================================================================
// Line Helpers
// =============================================================================

/// Split into lines, dropping trailing blank ones.
///
/// Fails with [`DecodeError::Empty`] when nothing meaningful is left.
pub(crate) fn content_lines(text: &str) -> DecodeResult<Vec<&str>> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().map_or(false, |line| line.trim().is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(lines)
}

/// Payload of a one-line `SUCCESS: <payload>` acknowledgement
fn acknowledgement(text: &str, marker: Marker) -> DecodeResult<&str> {
    let mut lines = content_lines(text)?;

    let first = lines[0];
    if marker.matches(first) {
        return Err(DecodeError::DaemonReportedError(first.trim().to_string()));
    }

    if lines.len() > 1 && lines.last() == Some(&END_MARKER) {
        lines.pop();
    }
    if lines.len() != 1 {
        return Err(DecodeError::WrongShape(format!(
            "expected a single acknowledgement line, got {} lines",
            lines.len()
        )));
    }

    let payload = first.strip_prefix(SUCCESS_PREFIX).ok_or_else(|| {
        DecodeError::WrongShape(format!("expected `{}` prefix in {:?}", SUCCESS_PREFIX, first))
    })?;
    Ok(payload.strip_prefix(' ').unwrap_or(payload))
}

fn parse_counter(name: &str, value: &str) -> DecodeResult<u64> {
    value.trim().parse().map_err(|_| {
        DecodeError::Malformed(format!("`{}` is not an unsigned integer: {:?}", name, value))
    })
}

// =============================================================================
// Decoders
// =============================================================================

/// Decode the reply to `version`:
///
/// ```text
/// OpenVPN Version: OpenVPN 2.3.2 x86_64-pc-linux-gnu [SSL (OpenSSL)] ...
/// Management Version: 1
/// END
/// ```
pub fn decode_version(text: &str) -> DecodeResult<Version> {
    let lines = content_lines(text)?;
    if is_error_marker(lines[0]) {
        return Err(DecodeError::DaemonReportedError(lines[0].trim().to_string()));
    }

    let (last, body) = lines
        .split_last()
        .ok_or(DecodeError::Empty)?;
    if *last != END_MARKER {
        return Err(DecodeError::WrongShape(
            "version banner is not terminated by END".to_string(),
        ));
    }
    if body.len() != 2 {
        return Err(DecodeError::WrongShape(format!(
            "expected 2 version lines, got {}",
            body.len()
        )));
    }

    let mut openvpn = None;
    let mut management = None;
    for line in body {
        // Only the label is split off; the daemon text keeps its own colons
        let (label, value) = line.split_once(':').ok_or_else(|| {
            DecodeError::WrongShape(format!("unlabeled version line: {:?}", line))
        })?;
        match label.trim() {
            "OpenVPN Version" => openvpn = Some(value.trim().to_string()),
            "Management Version" => management = Some(value.trim().to_string()),
            other => {
                return Err(DecodeError::WrongShape(format!(
                    "unexpected version label: {:?}",
                    other
                )))
            }
        }
    }

    match (openvpn, management) {
        (Some(openvpn), Some(management)) => Ok(Version {
            openvpn,
            management,
        }),
        (None, _) => Err(DecodeError::WrongShape(
            "missing `OpenVPN Version` line".to_string(),
        )),
        (_, None) => Err(DecodeError::WrongShape(
            "missing `Management Version` line".to_string(),
        )),
    }
}

/// Decode the reply to `pid`: `SUCCESS: pid=<n>`
pub fn decode_pid(text: &str) -> DecodeResult<ProcessId> {
    let payload = acknowledgement(text, Marker::Error)?;
    let value = payload.strip_prefix("pid=").ok_or_else(|| {
        DecodeError::WrongShape(format!("expected `pid=` in {:?}", payload))
    })?;
    parse_counter("pid", value)
}

/// Decode the reply to `load-stats`:
/// `SUCCESS: nclients=<n>,bytesin=<n>,bytesout=<n>`
///
/// Every field must be present with a value; nothing defaults to zero.
pub fn decode_load_stats(text: &str) -> DecodeResult<LoadStats> {
    const FIELDS: [&str; 3] = ["nclients", "bytesin", "bytesout"];

    let payload = acknowledgement(text, Marker::Error)?;
    let fields: Vec<&str> = payload.split(',').collect();
    if fields.len() != FIELDS.len() {
        return Err(DecodeError::WrongShape(format!(
            "expected {} load-stats fields, got {}",
            FIELDS.len(),
            fields.len()
        )));
    }

    let mut values = [0u64; 3];
    for ((slot, expected), field) in values.iter_mut().zip(FIELDS).zip(fields) {
        let (key, value) = field.split_once('=').ok_or_else(|| {
            DecodeError::Malformed(format!("load-stats field {:?} has no value", field))
        })?;
        if key.trim() != expected {
            return Err(DecodeError::Malformed(format!(
                "expected load-stats field `{}`, got `{}`",
                expected, key
            )));
        }
        *slot = parse_counter(expected, value)?;
    }

    let [nclients, bytes_in, bytes_out] = values;
    Ok(LoadStats {
        nclients,
        bytes_in,
        bytes_out,
    })
}

/// Decode the reply to `kill`: `SUCCESS: <message>`
///
/// This family reports failure as `failure`, not `ERROR:`.
pub fn decode_kill_session(text: &str) -> DecodeResult<KillSessionResult> {
    let message = acknowledgement(text, Marker::Failure)?;
    Ok(KillSessionResult {
        message: message.to_string(),
    })
}

/// Decode the reply to `signal`: `SUCCESS: signal SIGHUP thrown`
pub fn decode_signal(text: &str) -> DecodeResult<String> {
    acknowledgement(text, Marker::Error).map(str::to_string)
}
