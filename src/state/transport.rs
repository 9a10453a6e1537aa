//! Seam to the socket that carries packets.
//!
//! The socket itself lives outside this crate. Inbound traffic is fed in as
//! [`TransportEvent`]s; outbound packets go through [`Transport`].

use super::error::SyncError;
use super::packet::Packet;

/// Lifecycle and data events from the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open,
    Close { code: u16, reason: String },
    Message(String),
}

/// Outbound sink for serialized packets.
pub trait Transport {
    fn is_open(&self) -> bool;

    /// Send one text frame.
    fn send(&mut self, text: String) -> Result<(), SyncError>;

    fn send_packet(&mut self, packet: &Packet) -> Result<(), SyncError> {
        self.send(packet.encode())
    }

    /// Send a keepalive if the socket is open. Returns whether one was sent.
    fn send_heartbeat(&mut self) -> Result<bool, SyncError> {
        if !self.is_open() {
            return Ok(false);
        }
        self.send_packet(&Packet::heartbeat())?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::packet::PacketType;

    #[derive(Default)]
    struct Outbox {
        open: bool,
        sent: Vec<String>,
    }

    impl Transport for Outbox {
        fn is_open(&self) -> bool {
            self.open
        }

        fn send(&mut self, text: String) -> Result<(), SyncError> {
            if !self.open {
                return Err(SyncError::Transport("closed".to_string()));
            }
            self.sent.push(text);
            Ok(())
        }
    }

    #[test]
    fn test_heartbeat_only_when_open() {
        let mut outbox = Outbox::default();
        assert!(!outbox.send_heartbeat().unwrap());
        assert!(outbox.sent.is_empty());

        outbox.open = true;
        assert!(outbox.send_heartbeat().unwrap());
        assert_eq!(outbox.sent.len(), 1);

        let packet = Packet::decode(&outbox.sent[0]).unwrap();
        assert_eq!(packet.packet_type(), Some(PacketType::Command));
    }

    #[test]
    fn test_send_error_propagates() {
        let mut outbox = Outbox::default();
        let err = outbox.send_packet(&Packet::heartbeat()).unwrap_err();
        assert_eq!(err.to_string(), "transport error: closed");
    }
}
