//! Management Client
//!
//! Drives command/response exchanges over one established stream.

use std::io::{BufReader, Read, Write};

use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;
use crate::protocol::{
    decode_kill_session, decode_load_stats, decode_pid, decode_signal, decode_status,
    decode_version, read_response, send_command, Command, KillSessionResult, KillTarget,
    LoadStats, ProcessId, Signal, Status, Version,
};

/// A blocking client over one management connection
///
/// Each call writes one command and reads exactly one response before
/// returning. Nothing is retried: on a transport error the stream should be
/// considered desynchronized and the caller decides whether to reconnect.
pub struct Client<S> {
    /// Stream, buffered for line reads. Writes go to the inner stream.
    stream: BufReader<S>,
}

impl<S: Read + Write> Client<S> {
    /// Wrap an already connected stream
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// Send a command and return the raw framed response
    pub fn exchange(&mut self, command: &Command) -> Result<String> {
        let line = command.to_line();
        send_command(self.stream.get_mut(), &line)?;
        let response = read_response(&mut self.stream)?;

        tracing::debug!(
            command = %line,
            lines = response.lines().count(),
            "management exchange completed"
        );
        Ok(response)
    }

    pub fn version(&mut self) -> Result<Version> {
        let text = self.exchange(&Command::Version)?;
        Ok(decode_version(&text)?)
    }

    pub fn pid(&mut self) -> Result<ProcessId> {
        let text = self.exchange(&Command::Pid)?;
        Ok(decode_pid(&text)?)
    }

    pub fn load_stats(&mut self) -> Result<LoadStats> {
        let text = self.exchange(&Command::LoadStats)?;
        Ok(decode_load_stats(&text)?)
    }

    pub fn status(&mut self) -> Result<Status> {
        let text = self.exchange(&Command::Status)?;
        Ok(decode_status(&text)?)
    }

    /// Terminate the session(s) matching `target`
    pub fn kill_session(&mut self, target: &KillTarget) -> Result<KillSessionResult> {
        let text = self.exchange(&Command::Kill(target.clone()))?;
        Ok(decode_kill_session(&text)?)
    }

    /// Deliver a signal to the daemon, returning its confirmation text
    pub fn signal(&mut self, signal: Signal) -> Result<String> {
        let text = self.exchange(&Command::Signal(signal))?;
        Ok(decode_signal(&text)?)
    }

    pub fn get_ref(&self) -> &S {
        self.stream.get_ref()
    }

    /// Unwrap the stream. Buffered but unread input is lost.
    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }
}

/// A client shared between threads
///
/// The lock is held across send and read, so every exchange is atomic with
/// respect to other callers on the same connection.
pub struct SharedClient<S> {
    inner: Mutex<Client<S>>,
}

impl<S: Read + Write> SharedClient<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: Mutex::new(Client::new(stream)),
        }
    }

    /// Hold the connection for several exchanges in a row
    pub fn lock(&self) -> MutexGuard<'_, Client<S>> {
        self.inner.lock()
    }

    pub fn exchange(&self, command: &Command) -> Result<String> {
        self.inner.lock().exchange(command)
    }

    pub fn version(&self) -> Result<Version> {
        self.inner.lock().version()
    }

    pub fn pid(&self) -> Result<ProcessId> {
        self.inner.lock().pid()
    }

    pub fn load_stats(&self) -> Result<LoadStats> {
        self.inner.lock().load_stats()
    }

    pub fn status(&self) -> Result<Status> {
        self.inner.lock().status()
    }

    pub fn kill_session(&self, target: &KillTarget) -> Result<KillSessionResult> {
        self.inner.lock().kill_session(target)
    }

    pub fn signal(&self, signal: Signal) -> Result<String> {
        self.inner.lock().signal(signal)
    }

    pub fn into_inner(self) -> Client<S> {
        self.inner.into_inner()
    }
}

impl<S: Read + Write> From<Client<S>> for SharedClient<S> {
    fn from(client: Client<S>) -> Self {
        Self {
            inner: Mutex::new(client),
        }
    }
}
