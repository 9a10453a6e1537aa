//! State management module for the overlay client.
//!
//! This module provides the mirrored state and the dispatcher that keeps it
//! current:
//!
//! - `packet` - Wire packet model and JSON codec
//! - `roster` - Coordinator and player maps
//! - `store` - Rosters plus the main coordinator and main match
//! - `notify` - Typed notification channels
//! - `pending` - Coordinator connects waiting for their name
//! - `sync` - Packet dispatch
//! - `transport` - Seam to the socket
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  TransportEvent  ┌──────────────────────────────────────┐
//! │  Transport  │─────────────────▶│             OverlaySync              │
//! │  (external) │◀──── heartbeat ──│                                      │
//! └─────────────┘                  │  Packet::decode ──▶ dispatch         │
//!                                  │                                      │
//!                                  │  ┌──────────────┐ ┌───────────────┐  │
//!                                  │  │  StateStore  │ │PendingConnects│  │
//!                                  │  │              │ │               │  │
//!                                  │  │ id → name    │ │ name →        │  │
//!                                  │  │ id → Player  │ │   deadline    │  │
//!                                  │  │ main coord   │ └───────────────┘  │
//!                                  │  │ main match   │                    │
//!                                  │  └──────┬───────┘                    │
//!                                  │         ▼                            │
//!                                  │  ┌────────────────────────────────┐  │
//!                                  │  │ Notifier                       │  │
//!                                  │  │  coordinator_changed           │  │
//!                                  │  │  match_changed  score_update   │  │
//!                                  │  │  log  error                    │  │
//!                                  │  └────────────────────────────────┘  │
//!                                  └──────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use overlay_sync::state::{OverlaySync, SyncConfig, TransportEvent};
//!
//! let mut sync = OverlaySync::new(SyncConfig::from_env()?);
//! sync.on_match_changed(|m| render(m));
//!
//! // From the socket's read loop
//! sync.handle(TransportEvent::Message(text));
//! ```

pub mod config;
pub mod error;
pub mod log;
pub mod notify;
pub mod packet;
pub mod pending;
pub mod roster;
pub mod store;
pub mod sync;
pub mod transport;

// Re-export commonly used types
pub use config::{
    SyncConfig, DEFAULT_HOST, DEFAULT_PASSWORD, DEFAULT_PORT, DEFAULT_RESOLUTION_TIMEOUT,
};
pub use error::SyncError;
pub use log::{Logger, Severity};
pub use notify::Notifier;
pub use packet::{
    ClientType, Connect, Coordinator, Event, EventType, ForwardingPacket, Match, Packet,
    PacketBody, PacketType, Player, HEARTBEAT_INTERVAL, ZERO_ID,
};
pub use pending::{PendingConnect, PendingConnects};
pub use roster::{CoordinatorRoster, PlayerRoster};
pub use store::StateStore;
pub use sync::OverlaySync;
pub use transport::{Transport, TransportEvent};
