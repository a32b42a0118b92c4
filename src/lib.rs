//! # openvpn-mi
//!
//! A blocking client for the OpenVPN management interface with:
//! - Line-based request/response framing over any `Read + Write` stream
//! - Typed decoding of `version`, `pid`, `load-stats`, `status` and `kill` replies
//! - Daemon-reported errors kept apart from transport and parse failures
//! - A mutex-guarded client for sharing one connection between threads
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │          Caller (CLI, automation) - owns the socket          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Client / SharedClient                       │
//! │              (one exchange at a time)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Command   │          │  Response   │
//!   │   Sender    │          │   Reader    │
//!   └─────────────┘          └──────┬──────┘
//!                                   │ raw text
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  Decoders   │
//!                           │   (pure)    │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DecodeError, MiError, Result, TransportError};
pub use config::{ClientConfig, Endpoint};
pub use network::{Client, SharedClient};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of openvpn-mi
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
