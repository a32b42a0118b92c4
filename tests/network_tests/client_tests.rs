//! Client Tests
//!
//! Tests for full exchanges through `Client` and `SharedClient` over a
//! scripted in-memory stream.

use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;
use std::thread;

use openvpn_mi::protocol::{KillTarget, Signal};
use openvpn_mi::{Client, DecodeError, MiError, SharedClient, TransportError};

// =============================================================================
// Helper Stream
// =============================================================================

/// Duplex stream with canned daemon output that records what is written
struct ScriptedStream {
    input: Cursor<Vec<u8>>,
    written: Vec<u8>,
    fail_writes: bool,
}

impl ScriptedStream {
    fn new(daemon_output: &str) -> Self {
        Self {
            input: Cursor::new(daemon_output.as_bytes().to_vec()),
            written: Vec::new(),
            fail_writes: false,
        }
    }

    fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::new("")
        }
    }

    fn sent(&self) -> &str {
        std::str::from_utf8(&self.written).unwrap()
    }
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

const GREETING: &str =
    ">INFO:OpenVPN Management Interface Version 1 -- type 'help' for more info\n";

const RESPONSE_STATUS: &str = "TITLE,OpenVPN 2.3.2 x86_64-pc-linux-gnu
TIME,Mon Dec 26 21:02:26 2016,1482782546
HEADER,CLIENT_LIST,Common Name,Real Address,Virtual Address,Bytes Received,Bytes Sent,Connected Since,Connected Since (time_t),Username
CLIENT_LIST,rpi-v3,11.112.113.114:35331,10.8.0.14,5107,6909,Mon Dec 26 20:59:42 2016,1482782382,UNDEF
HEADER,ROUTING_TABLE,Virtual Address,Common Name,Real Address,Last Ref,Last Ref (time_t)
ROUTING_TABLE,10.8.0.14,rpi-v3,11.112.113.114:35331,Mon Dec 26 20:59:43 2016,1482782383
GLOBAL_STATS,Max bcast/mcast queue length,0
END
";

// =============================================================================
// Client Tests
// =============================================================================

#[test]
fn test_client_pid_skips_greeting() {
    let stream = ScriptedStream::new(&format!("{}SUCCESS: pid=10869\n", GREETING));
    let mut client = Client::new(stream);

    assert_eq!(client.pid().unwrap(), 10869);
    assert_eq!(client.into_inner().sent(), "pid\n");
}

#[test]
fn test_client_version() {
    let stream = ScriptedStream::new("OpenVPN Version: OpenVPN 2.3.2\nManagement Version: 1\nEND\n");
    let mut client = Client::new(stream);

    let version = client.version().unwrap();
    assert_eq!(version.openvpn, "OpenVPN 2.3.2");
    assert_eq!(version.management, "1");
    assert_eq!(client.get_ref().sent(), "version\n");
}

#[test]
fn test_client_sequential_exchanges_on_one_stream() {
    let script = format!(
        "SUCCESS: pid=42\nSUCCESS: nclients=1,bytesin=5107,bytesout=6909\n{}\
         SUCCESS: common name 'rpi-v3' found, 1 client(s) killed\n\
         SUCCESS: signal SIGUSR2 thrown\n",
        RESPONSE_STATUS
    );
    let mut client = Client::new(ScriptedStream::new(&script));

    assert_eq!(client.pid().unwrap(), 42);
    assert_eq!(client.load_stats().unwrap().nclients, 1);

    let status = client.status().unwrap();
    assert_eq!(status.client_list.len(), 1);
    assert_eq!(status.routing_table.len(), 1);

    let killed = client
        .kill_session(&KillTarget::CommonName("rpi-v3".to_string()))
        .unwrap();
    assert_eq!(killed.message, "common name 'rpi-v3' found, 1 client(s) killed");

    assert_eq!(client.signal(Signal::Usr2).unwrap(), "signal SIGUSR2 thrown");

    assert_eq!(
        client.into_inner().sent(),
        "pid\nload-stats\nstatus 2\nkill rpi-v3\nsignal SIGUSR2\n"
    );
}

#[test]
fn test_client_raw_exchange_returns_framed_text() {
    let mut client = Client::new(ScriptedStream::new(
        "ERROR: unknown command, enter 'help' for more options\n",
    ));

    let text = client
        .exchange(&openvpn_mi::protocol::Command::Raw("bogus".to_string()))
        .unwrap();
    assert_eq!(text, "ERROR: unknown command, enter 'help' for more options\n");
}

#[test]
fn test_client_daemon_error_is_decode_error() {
    let mut client = Client::new(ScriptedStream::new("ERROR: bad response\n"));

    let err = client.pid().unwrap_err();
    assert!(err.is_decode());
    assert!(matches!(
        err,
        MiError::Decode(DecodeError::DaemonReportedError(ref msg)) if msg == "ERROR: bad response"
    ));
}

#[test]
fn test_client_kill_failure() {
    let mut client = Client::new(ScriptedStream::new("failure\n"));

    let err = client
        .kill_session(&KillTarget::parse("11.112.113.114:35331"))
        .unwrap_err();
    assert!(matches!(
        err,
        MiError::Decode(DecodeError::DaemonReportedError(_))
    ));
    assert_eq!(client.into_inner().sent(), "kill 11.112.113.114:35331\n");
}

#[test]
fn test_client_closed_stream_is_incomplete() {
    let mut client = Client::new(ScriptedStream::new(GREETING));

    let err = client.status().unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(
        err,
        MiError::Transport(TransportError::Incomplete { .. })
    ));
}

#[test]
fn test_client_write_failure() {
    let mut client = Client::new(ScriptedStream::failing_writes());

    match client.pid() {
        Err(MiError::Transport(TransportError::WriteFailed(e))) => {
            assert_eq!(e.kind(), io::ErrorKind::ConnectionReset)
        }
        other => panic!("Expected WriteFailed, got {:?}", other),
    }
}

// =============================================================================
// Shared Client Tests
// =============================================================================

#[test]
fn test_shared_client_serializes_exchanges() {
    const CALLERS: usize = 8;

    let script = "SUCCESS: pid=10869\n".repeat(CALLERS);
    let shared = Arc::new(SharedClient::new(ScriptedStream::new(&script)));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || shared.pid())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 10869);
    }

    let client = Arc::try_unwrap(shared)
        .unwrap_or_else(|_| panic!("shared client still referenced"))
        .into_inner();
    assert_eq!(client.into_inner().sent(), "pid\n".repeat(CALLERS));
}

#[test]
fn test_shared_client_lock_holds_connection() {
    let shared = SharedClient::from(Client::new(ScriptedStream::new(
        "SUCCESS: pid=1\nSUCCESS: nclients=0,bytesin=0,bytesout=0\n",
    )));

    let mut client = shared.lock();
    assert_eq!(client.pid().unwrap(), 1);
    assert_eq!(client.load_stats().unwrap().bytes_out, 0);
}
