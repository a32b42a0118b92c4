//! Status decoder
//!
//! Decodes the reply to `status 2`, a block of comma-separated rows each
//! tagged by its first field:
//!
//! ```text
//! TITLE,OpenVPN 2.3.2 x86_64-pc-linux-gnu [SSL (OpenSSL)] ...
//! TIME,Mon Dec 26 21:02:26 2016,1482782546
//! HEADER,CLIENT_LIST,Common Name,Real Address,Virtual Address,...
//! CLIENT_LIST,rpi-v3,11.112.113.114:35331,10.8.0.14,5107,6909,...
//! HEADER,ROUTING_TABLE,Virtual Address,Common Name,Real Address,...
//! ROUTING_TABLE,10.8.0.14,rpi-v3,11.112.113.114:35331,...
//! GLOBAL_STATS,Max bcast/mcast queue length,0
//! END
//! ```
//!
//! `HEADER` rows describe the columns of their section and are used to
//! locate fields; daemons that add columns (IPv6 address, client id, ...)
//! still decode. Without a header the classic column order applies.
//! Rows with an unknown tag are skipped.

use super::codec::END_MARKER;
use super::decode::{content_lines, is_error_marker};
use super::response::{ClientSession, RoutingEntry, Status};
use crate::error::{DecodeError, DecodeResult};

/// Username the daemon prints when the client did not authenticate with one
const UNDEF_USERNAME: &str = "UNDEF";

// =============================================================================
// Row Classification
// =============================================================================

/// Sections that carry rows of data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    ClientList,
    RoutingTable,
}

/// A status line, classified by its leading tag
#[derive(Debug)]
enum Row<'a> {
    Title(&'a str),
    Time(&'a str),
    Header(Section, &'a str),
    ClientList(&'a str),
    RoutingTable(&'a str),
    End,
    /// GLOBAL_STATS, headers of other sections, blank lines, future tags
    Ignored,
}

impl<'a> Row<'a> {
    fn classify(line: &'a str) -> Self {
        let (tag, rest) = line.split_once(',').unwrap_or((line, ""));
        match tag {
            "TITLE" => Row::Title(rest),
            "TIME" => Row::Time(rest),
            "HEADER" => {
                let (section, columns) = rest.split_once(',').unwrap_or((rest, ""));
                match section {
                    "CLIENT_LIST" => Row::Header(Section::ClientList, columns),
                    "ROUTING_TABLE" => Row::Header(Section::RoutingTable, columns),
                    _ => Row::Ignored,
                }
            }
            "CLIENT_LIST" => Row::ClientList(rest),
            "ROUTING_TABLE" => Row::RoutingTable(rest),
            END_MARKER if rest.is_empty() => Row::End,
            _ => Row::Ignored,
        }
    }
}

// =============================================================================
// Column Layouts
// =============================================================================

fn column(columns: &[&str], name: &str) -> Option<usize> {
    columns.iter().position(|c| c.trim() == name)
}

fn required_column(columns: &[&str], name: &str, section: &str) -> DecodeResult<usize> {
    column(columns, name).ok_or_else(|| {
        DecodeError::WrongShape(format!("{} header has no `{}` column", section, name))
    })
}

/// Field positions in a CLIENT_LIST row, tag excluded
#[derive(Debug, Clone, Copy)]
struct ClientColumns {
    common_name: usize,
    real_address: usize,
    virtual_address: usize,
    virtual_ipv6_address: Option<usize>,
    bytes_received: usize,
    bytes_sent: usize,
    connected_since: usize,
    connected_since_epoch: usize,
    username: Option<usize>,
    client_id: Option<usize>,
}

impl Default for ClientColumns {
    fn default() -> Self {
        Self {
            common_name: 0,
            real_address: 1,
            virtual_address: 2,
            virtual_ipv6_address: None,
            bytes_received: 3,
            bytes_sent: 4,
            connected_since: 5,
            connected_since_epoch: 6,
            username: Some(7),
            client_id: None,
        }
    }
}

impl ClientColumns {
    fn from_header(header: &str) -> DecodeResult<Self> {
        const SECTION: &str = "CLIENT_LIST";
        let columns: Vec<&str> = header.split(',').collect();
        Ok(Self {
            common_name: required_column(&columns, "Common Name", SECTION)?,
            real_address: required_column(&columns, "Real Address", SECTION)?,
            virtual_address: required_column(&columns, "Virtual Address", SECTION)?,
            virtual_ipv6_address: column(&columns, "Virtual IPv6 Address"),
            bytes_received: required_column(&columns, "Bytes Received", SECTION)?,
            bytes_sent: required_column(&columns, "Bytes Sent", SECTION)?,
            connected_since: required_column(&columns, "Connected Since", SECTION)?,
            connected_since_epoch: required_column(&columns, "Connected Since (time_t)", SECTION)?,
            username: column(&columns, "Username"),
            client_id: column(&columns, "Client ID"),
        })
    }

    fn decode(&self, row: &str) -> DecodeResult<ClientSession> {
        let fields = Fields::new("CLIENT_LIST", row);
        Ok(ClientSession {
            common_name: fields.text(self.common_name)?,
            real_address: fields.text(self.real_address)?,
            virtual_address: fields.text(self.virtual_address)?,
            virtual_ipv6_address: fields.optional(self.virtual_ipv6_address),
            bytes_received: fields.unsigned(self.bytes_received, "Bytes Received")?,
            bytes_sent: fields.unsigned(self.bytes_sent, "Bytes Sent")?,
            connected_since: fields.text(self.connected_since)?,
            connected_since_epoch: fields
                .epoch(self.connected_since_epoch, "Connected Since (time_t)")?,
            username: fields
                .optional(self.username)
                .filter(|name| name != UNDEF_USERNAME),
            client_id: fields
                .optional(self.client_id)
                .map(|id| parse_unsigned(&id, "Client ID"))
                .transpose()?,
        })
    }
}

/// Field positions in a ROUTING_TABLE row, tag excluded
#[derive(Debug, Clone, Copy)]
struct RouteColumns {
    virtual_address: usize,
    common_name: usize,
    real_address: usize,
    last_ref: usize,
    last_ref_epoch: usize,
}

impl Default for RouteColumns {
    fn default() -> Self {
        Self {
            virtual_address: 0,
            common_name: 1,
            real_address: 2,
            last_ref: 3,
            last_ref_epoch: 4,
        }
    }
}

impl RouteColumns {
    fn from_header(header: &str) -> DecodeResult<Self> {
        const SECTION: &str = "ROUTING_TABLE";
        let columns: Vec<&str> = header.split(',').collect();
        Ok(Self {
            virtual_address: required_column(&columns, "Virtual Address", SECTION)?,
            common_name: required_column(&columns, "Common Name", SECTION)?,
            real_address: required_column(&columns, "Real Address", SECTION)?,
            last_ref: required_column(&columns, "Last Ref", SECTION)?,
            last_ref_epoch: required_column(&columns, "Last Ref (time_t)", SECTION)?,
        })
    }

    fn decode(&self, row: &str) -> DecodeResult<RoutingEntry> {
        let fields = Fields::new("ROUTING_TABLE", row);
        Ok(RoutingEntry {
            virtual_address: fields.text(self.virtual_address)?,
            common_name: fields.text(self.common_name)?,
            real_address: fields.text(self.real_address)?,
            last_ref: fields.text(self.last_ref)?,
            last_ref_epoch: fields.epoch(self.last_ref_epoch, "Last Ref (time_t)")?,
        })
    }
}

// =============================================================================
// Field Access
// =============================================================================

struct Fields<'a> {
    tag: &'static str,
    values: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn new(tag: &'static str, row: &'a str) -> Self {
        Self {
            tag,
            values: row.split(',').collect(),
        }
    }

    fn get(&self, index: usize) -> DecodeResult<&'a str> {
        self.values.get(index).copied().ok_or_else(|| {
            DecodeError::WrongShape(format!(
                "{} row has {} fields, expected at least {}",
                self.tag,
                self.values.len(),
                index + 1
            ))
        })
    }

    fn text(&self, index: usize) -> DecodeResult<String> {
        self.get(index).map(str::to_string)
    }

    /// Absent column, missing trailing field and empty field all read as `None`
    fn optional(&self, index: Option<usize>) -> Option<String> {
        index
            .and_then(|i| self.values.get(i))
            .filter(|value| !value.is_empty())
            .map(|value| value.to_string())
    }

    fn unsigned(&self, index: usize, name: &str) -> DecodeResult<u64> {
        parse_unsigned(self.get(index)?, name)
    }

    fn epoch(&self, index: usize, name: &str) -> DecodeResult<i64> {
        parse_epoch(self.get(index)?, name)
    }
}

fn parse_unsigned(value: &str, name: &str) -> DecodeResult<u64> {
    value.trim().parse().map_err(|_| {
        DecodeError::Malformed(format!("`{}` is not an unsigned integer: {:?}", name, value))
    })
}

fn parse_epoch(value: &str, name: &str) -> DecodeResult<i64> {
    value.trim().parse().map_err(|_| {
        DecodeError::Malformed(format!("`{}` is not a unix timestamp: {:?}", name, value))
    })
}

// =============================================================================
// Decoder
// =============================================================================

/// Decode the reply to `status 2`.
///
/// Client and routing rows are kept in the order they appear. A malformed
/// row fails the whole decode. Parsing stops at `END`.
pub fn decode_status(text: &str) -> DecodeResult<Status> {
    let lines = content_lines(text)?;
    if is_error_marker(lines[0]) {
        return Err(DecodeError::DaemonReportedError(lines[0].trim().to_string()));
    }

    let mut title = None;
    let mut time = None;
    let mut client_columns = ClientColumns::default();
    let mut route_columns = RouteColumns::default();
    let mut client_list = Vec::new();
    let mut routing_table = Vec::new();

    for line in lines {
        match Row::classify(line) {
            Row::Title(value) => title = Some(value.to_string()),
            Row::Time(rest) => {
                let (text, epoch) = rest.rsplit_once(',').ok_or_else(|| {
                    DecodeError::WrongShape(format!("TIME row without timestamp: {:?}", line))
                })?;
                time = Some((text.to_string(), parse_epoch(epoch, "TIME")?));
            }
            Row::Header(Section::ClientList, columns) => {
                client_columns = ClientColumns::from_header(columns)?;
            }
            Row::Header(Section::RoutingTable, columns) => {
                route_columns = RouteColumns::from_header(columns)?;
            }
            Row::ClientList(row) => client_list.push(client_columns.decode(row)?),
            Row::RoutingTable(row) => routing_table.push(route_columns.decode(row)?),
            Row::End => break,
            Row::Ignored => {}
        }
    }

    let title = title.ok_or_else(|| DecodeError::WrongShape("missing TITLE row".to_string()))?;
    let (time, time_epoch) =
        time.ok_or_else(|| DecodeError::WrongShape("missing TIME row".to_string()))?;

    Ok(Status {
        title,
        time,
        time_epoch,
        client_list,
        routing_table,
    })
}
