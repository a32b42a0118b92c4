//! Codec Tests
//!
//! Tests for the command sender and the response reader against in-memory
//! streams.

use std::io::{self, BufReader, Cursor, Read, Write};
use openvpn_mi::protocol::{decode_pid, read_response, send_command};
use openvpn_mi::TransportError;

// =============================================================================
// Helper Streams
// =============================================================================

/// Writer that rejects every write
struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reader that yields one chunk, then fails any further read
struct OneChunk {
    chunk: Option<Vec<u8>>,
}

impl OneChunk {
    fn new(text: &str) -> Self {
        Self {
            chunk: Some(text.as_bytes().to_vec()),
        }
    }
}

impl Read for OneChunk {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.chunk.take() {
            Some(chunk) => {
                assert!(chunk.len() <= buf.len(), "test chunk larger than read buffer");
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "read past the end of the response",
            )),
        }
    }
}

/// Reader that always times out
struct TimingOut;

impl Read for TimingOut {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::TimedOut, "deadline exceeded"))
    }
}

// =============================================================================
// Command Sender Tests
// =============================================================================

#[test]
fn test_send_command_appends_newline() {
    let mut out = Vec::new();
    send_command(&mut out, "pid").unwrap();
    assert_eq!(out, b"pid\n");
}

#[test]
fn test_send_command_does_not_double_terminate() {
    let mut out = Vec::new();
    send_command(&mut out, "status 2\n").unwrap();
    send_command(&mut out, "load-stats\r\n").unwrap();
    assert_eq!(out, b"status 2\nload-stats\n");
}

#[test]
fn test_send_command_rejects_embedded_line_break() {
    let mut out = Vec::new();
    let result = send_command(&mut out, "kill a\nsignal SIGTERM");

    match result {
        Err(TransportError::WriteFailed(e)) => assert_eq!(e.kind(), io::ErrorKind::InvalidInput),
        other => panic!("Expected WriteFailed, got {:?}", other),
    }
    assert!(out.is_empty());
}

#[test]
fn test_send_command_write_failure_carries_cause() {
    match send_command(&mut BrokenPipe, "pid") {
        Err(TransportError::WriteFailed(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("Expected WriteFailed, got {:?}", other),
    }
}

// =============================================================================
// Response Reader Tests
// =============================================================================

#[test]
fn test_read_single_line_success() {
    let mut reader = Cursor::new("SUCCESS: pid=10869\n".as_bytes());
    let response = read_response(&mut reader).unwrap();
    assert_eq!(response, "SUCCESS: pid=10869\n");
}

#[test]
fn test_read_response_then_decode_pid() {
    let mut reader = Cursor::new("SUCCESS: pid=10869\n".as_bytes());
    let response = read_response(&mut reader).unwrap();
    assert_eq!(decode_pid(&response).unwrap(), 10869);
}

#[test]
fn test_read_single_line_error() {
    let mut reader = Cursor::new(
        "ERROR: unknown command, enter 'help' for more options\nSUCCESS: pid=1\n".as_bytes(),
    );
    let response = read_response(&mut reader).unwrap();
    assert_eq!(response, "ERROR: unknown command, enter 'help' for more options\n");
}

#[test]
fn test_read_failure_line_is_single_line() {
    let mut reader = Cursor::new("failure\nSUCCESS: pid=1\n".as_bytes());
    assert_eq!(read_response(&mut reader).unwrap(), "failure\n");
}

#[test]
fn test_read_consecutive_responses() {
    let mut reader = Cursor::new("SUCCESS: pid=1\nSUCCESS: pid=2\n".as_bytes());
    assert_eq!(read_response(&mut reader).unwrap(), "SUCCESS: pid=1\n");
    assert_eq!(read_response(&mut reader).unwrap(), "SUCCESS: pid=2\n");
}

#[test]
fn test_read_acknowledgement_does_not_wait_for_more_input() {
    let mut reader = BufReader::new(OneChunk::new("SUCCESS: pid=10869\n"));
    let response = read_response(&mut reader).unwrap();
    assert_eq!(response, "SUCCESS: pid=10869\n");
}

#[test]
fn test_read_multi_line_block_includes_end() {
    let text = "OpenVPN Version: OpenVPN 2.3.2 x86_64-pc-linux-gnu\nManagement Version: 1\nEND\n";
    let mut reader = Cursor::new(format!("{}SUCCESS: pid=1\n", text).into_bytes());

    assert_eq!(read_response(&mut reader).unwrap(), text);
    assert_eq!(read_response(&mut reader).unwrap(), "SUCCESS: pid=1\n");
}

#[test]
fn test_read_block_with_success_inside_is_not_cut() {
    // Only the first line of a response can be an acknowledgement
    let text = "TITLE,x\nSUCCESS: not really\nEND\n";
    let mut reader = Cursor::new(text.as_bytes());
    assert_eq!(read_response(&mut reader).unwrap(), text);
}

#[test]
fn test_read_block_without_end_is_incomplete() {
    let mut reader = Cursor::new("TITLE,x\nTIME,Mon Dec 26 21:02:26 2016,1482782546\n".as_bytes());
    match read_response(&mut reader) {
        Err(TransportError::Incomplete { partial_lines }) => assert_eq!(partial_lines, 2),
        other => panic!("Expected Incomplete, got {:?}", other),
    }
}

#[test]
fn test_read_empty_stream_is_incomplete() {
    let mut reader = Cursor::new("".as_bytes());
    match read_response(&mut reader) {
        Err(TransportError::Incomplete { partial_lines }) => assert_eq!(partial_lines, 0),
        other => panic!("Expected Incomplete, got {:?}", other),
    }
}

#[test]
fn test_read_skips_notifications() {
    let mut reader = Cursor::new(
        ">INFO:OpenVPN Management Interface Version 1 -- type 'help' for more info\n\
         SUCCESS: pid=5\n"
            .as_bytes(),
    );
    assert_eq!(read_response(&mut reader).unwrap(), "SUCCESS: pid=5\n");
}

#[test]
fn test_read_skips_notifications_inside_block() {
    let mut reader = Cursor::new("TITLE,x\n>BYTECOUNT:3860,3324\nTIME,t,1\nEND\n".as_bytes());
    assert_eq!(read_response(&mut reader).unwrap(), "TITLE,x\nTIME,t,1\nEND\n");
}

#[test]
fn test_read_only_notifications_is_incomplete() {
    let mut reader = Cursor::new(">INFO:hello\n>HOLD:Waiting for hold release\n".as_bytes());
    assert!(matches!(
        read_response(&mut reader),
        Err(TransportError::Incomplete { partial_lines: 0 })
    ));
}

#[test]
fn test_read_crlf_terminated_block() {
    let text = "TITLE,x\r\nTIME,t,1\r\nEND\r\n";
    let mut reader = Cursor::new(text.as_bytes());
    assert_eq!(read_response(&mut reader).unwrap(), text);
}

#[test]
fn test_read_stream_error_is_read_failed() {
    let mut reader = BufReader::new(TimingOut);
    match read_response(&mut reader) {
        Err(TransportError::ReadFailed(e)) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
        other => panic!("Expected ReadFailed, got {:?}", other),
    }
}
