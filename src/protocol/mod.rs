//! Protocol Module
//!
//! The line-oriented management protocol: commands, framing, and decoding of
//! replies into typed values.
//!
//! ## Exchange
//! ```text
//!  caller ── send_command ──► "pid\n"
//!  caller ◄─ read_response ── "SUCCESS: pid=10869\n"
//!  caller ── decode_pid ────► 10869
//! ```
//!
//! ## Response Shapes
//! - single-line acknowledgement: `pid`, `load-stats`, `kill`, `signal`
//! - two-line banner + `END`:      `version`
//! - tagged rows + `END`:          `status 2`
//!
//! The decoders are pure; they only need the text [`read_response`] returned.

mod command;
mod response;
mod codec;
mod decode;
mod status;

pub use command::{Command, KillTarget, Signal};
pub use response::{ClientSession, KillSessionResult, LoadStats, ProcessId, RoutingEntry, Status, Version};
pub use codec::{read_response, send_command, END_MARKER, NOTIFICATION_PREFIX};
pub use decode::{decode_kill_session, decode_load_stats, decode_pid, decode_signal, decode_version};
pub use status::decode_status;
