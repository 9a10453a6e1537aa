//! Overlay Sync Library
//!
//! This crate keeps a live mirror of a tournament server's coordinators,
//! players and active match by consuming the packets the server pushes to an
//! overlay client.
//!
//! # Overview
//!
//! - **Packet Model** - Envelopes decoded into a closed set of variants.
//!   Unknown packet kinds are logged, never fatal.
//!
//! - **State Store** - Coordinator and player rosters, the main coordinator,
//!   and the main coordinator's active match.
//!
//! - **Dispatcher** - Applies one packet at a time with upsert/delete
//!   semantics and only follows matches led by the main coordinator.
//!
//! - **Notifications** - Typed channels for coordinator, match, score, log and
//!   error notifications.
//!
//! # Design Principles
//!
//! 1. **Nothing blocks** - A coordinator connect that arrives before its name
//!    is announced is parked with a deadline, not waited on.
//!
//! 2. **Snapshots, not live views** - Subscribers get borrowed snapshots for
//!    the duration of a notification.
//!
//! 3. **No networking** - The socket is an external collaborator behind the
//!    `Transport` trait.
//!
//! # Example
//!
//! ```rust
//! use overlay_sync::state::{OverlaySync, SyncConfig};
//!
//! let mut sync = OverlaySync::new(SyncConfig::new("secret"));
//!
//! sync.handle_message(
//!     r#"{"Type":4,"SpecificPacket":{"Type":1,"ChangedObject":{"Id":"c1","Name":"Moon"}}}"#,
//! );
//! sync.handle_message(
//!     r#"{"Type":2,"SpecificPacket":{"ClientType":1,"Password":"secret","Name":"Moon"}}"#,
//! );
//! assert_eq!(sync.main_coordinator(), Some("c1"));
//!
//! sync.handle_message(
//!     r#"{"Type":4,"SpecificPacket":{"Type":4,"ChangedObject":{"Leader":{"Id":"c1"},"Players":[]}}}"#,
//! );
//! assert!(sync.main_match().is_some());
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
