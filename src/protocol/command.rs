//! Command definitions
//!
//! Represents the commands this client sends to the management interface.

use std::fmt;
use std::str::FromStr;

use crate::config::SUPPORTED_STATUS_FORMAT;
use crate::error::MiError;

/// Signals the daemon accepts through `signal <name>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Restart: reread config, reconnect everything
    Hup,
    /// Exit
    Term,
    /// Conditional restart (soft)
    Usr1,
    /// Dump connection statistics to the log
    Usr2,
}

impl Signal {
    pub fn name(&self) -> &'static str {
        match self {
            Signal::Hup => "SIGHUP",
            Signal::Term => "SIGTERM",
            Signal::Usr1 => "SIGUSR1",
            Signal::Usr2 => "SIGUSR2",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Signal {
    type Err = MiError;

    /// Accepts `SIGHUP`, `sighup` or `hup`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("SIG").unwrap_or(&upper);
        match bare {
            "HUP" => Ok(Signal::Hup),
            "TERM" => Ok(Signal::Term),
            "USR1" => Ok(Signal::Usr1),
            "USR2" => Ok(Signal::Usr2),
            _ => Err(MiError::Config(format!("unknown signal: {}", s))),
        }
    }
}

/// Which session(s) a `kill` command targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillTarget {
    /// Every session authenticated with this common name
    CommonName(String),

    /// The session connected from this `host:port`
    RealAddress(String),
}

impl KillTarget {
    /// Classify a user-supplied target.
    ///
    /// Anything ending in `:<port>` whose host part parses as an IP address
    /// is a real address; everything else is a common name.
    pub fn parse(target: &str) -> Self {
        let target = target.trim();
        if let Some((host, port)) = target.rsplit_once(':') {
            let host = host.trim_start_matches('[').trim_end_matches(']');
            if port.parse::<u16>().is_ok() && host.parse::<std::net::IpAddr>().is_ok() {
                return KillTarget::RealAddress(target.to_string());
            }
        }
        KillTarget::CommonName(target.to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            KillTarget::CommonName(cn) => cn,
            KillTarget::RealAddress(addr) => addr,
        }
    }
}

/// A command understood by this client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `version`: daemon and management protocol version banner
    Version,

    /// `pid`: daemon process id
    Pid,

    /// `load-stats`: client count and byte counters
    LoadStats,

    /// `status 2`: client list and routing table
    Status,

    /// `kill <cn|addr>`: terminate session(s)
    Kill(KillTarget),

    /// `signal <SIG>`: deliver a signal to the daemon
    Signal(Signal),

    /// Any other single-line command, sent verbatim
    Raw(String),
}

impl Command {
    /// Render the command line, without the line terminator
    pub fn to_line(&self) -> String {
        match self {
            Command::Version => "version".to_string(),
            Command::Pid => "pid".to_string(),
            Command::LoadStats => "load-stats".to_string(),
            Command::Status => format!("status {}", SUPPORTED_STATUS_FORMAT),
            Command::Kill(target) => format!("kill {}", target.as_str()),
            Command::Signal(signal) => format!("signal {}", signal.name()),
            Command::Raw(line) => line.clone(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}
