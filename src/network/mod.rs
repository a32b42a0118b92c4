//! Network Module
//!
//! Client side of a management connection.
//!
//! ## Architecture
//! - The caller dials the socket (TCP or unix) and sets timeouts
//! - `Client` runs one exchange at a time over that stream
//! - `SharedClient` serializes exchanges from several threads

mod client;

pub use client::{Client, SharedClient};
