//! Response definitions
//!
//! Typed values decoded from management interface replies. All of them are
//! plain immutable records; decoders build them whole or not at all.

use serde::Serialize;

/// Daemon process id, as reported by `pid`
pub type ProcessId = u64;

/// Reply to `version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    /// Daemon identification, e.g. `OpenVPN 2.3.2 x86_64-pc-linux-gnu [SSL] ...`
    pub openvpn: String,

    /// Management protocol version
    pub management: String,
}

/// Reply to `load-stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub nclients: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// One connected client, from a `CLIENT_LIST` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSession {
    pub common_name: String,

    /// Public `host:port` the client connects from
    pub real_address: String,

    /// Tunnel address assigned to the client
    pub virtual_address: String,

    /// Only present when the daemon's column layout has it
    pub virtual_ipv6_address: Option<String>,

    pub bytes_received: u64,
    pub bytes_sent: u64,

    pub connected_since: String,
    pub connected_since_epoch: i64,

    /// `None` when the daemon reports `UNDEF` or nothing
    pub username: Option<String>,

    /// Only present when the daemon's column layout has it
    pub client_id: Option<u64>,
}

/// One route, from a `ROUTING_TABLE` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingEntry {
    pub virtual_address: String,
    pub common_name: String,
    pub real_address: String,
    pub last_ref: String,
    pub last_ref_epoch: i64,
}

/// Reply to `status 2`
///
/// Client sessions and routes are kept in the order the daemon listed them.
/// No join between the two sections is computed while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub title: String,
    pub time: String,
    pub time_epoch: i64,
    pub client_list: Vec<ClientSession>,
    pub routing_table: Vec<RoutingEntry>,
}

impl Status {
    /// Routes whose virtual address matches the given session's
    pub fn routes_for<'a>(
        &'a self,
        session: &'a ClientSession,
    ) -> impl Iterator<Item = &'a RoutingEntry> + 'a {
        self.routing_table
            .iter()
            .filter(move |route| route.virtual_address == session.virtual_address)
    }

    /// Find a connected session by common name
    pub fn find_session(&self, common_name: &str) -> Option<&ClientSession> {
        self.client_list
            .iter()
            .find(|session| session.common_name == common_name)
    }
}

/// Reply to `kill`: the daemon's confirmation text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KillSessionResult {
    pub message: String,
}
