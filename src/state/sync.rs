//! Packet dispatch.
//!
//! [`OverlaySync`] owns the mirrored state and applies one packet at a time.
//! Every call runs to completion before the next packet is looked at, and
//! nothing here blocks: a coordinator connect that cannot be resolved yet is
//! parked in [`PendingConnects`] and finished by a later CoordinatorAdded
//! event, or reported as a timeout.

use std::time::{Duration, Instant};

use serde_json::Value;

use super::config::SyncConfig;
use super::error::SyncError;
use super::log::{Logger, Severity};
use super::notify::Notifier;
use super::packet::{
    ClientType, Connect, Coordinator, Event, ForwardingPacket, Match, Packet, PacketBody, Player,
};
use super::pending::PendingConnects;
use super::roster::{CoordinatorRoster, PlayerRoster};
use super::store::StateStore;
use super::transport::TransportEvent;

/// Live mirror of coordinators, players and the main match.
#[derive(Debug)]
pub struct OverlaySync {
    store: StateStore,
    logger: Logger,
    password: String,
    resolution_timeout: Duration,
    pending: PendingConnects,
}

impl OverlaySync {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            store: StateStore::new(),
            logger: Logger::new(config.log_enabled, config.min_severity),
            password: config.password,
            resolution_timeout: config.resolution_timeout,
            pending: PendingConnects::new(),
        }
    }

    // Subscriptions

    pub fn on_coordinator_changed(&mut self, f: impl FnMut(Option<&str>) + Send + 'static) {
        self.notifier().on_coordinator_changed(f);
    }

    pub fn on_match_changed(&mut self, f: impl FnMut(Option<&Match>) + Send + 'static) {
        self.notifier().on_match_changed(f);
    }

    pub fn on_score_update(&mut self, f: impl FnMut(&[String], &Player) + Send + 'static) {
        self.notifier().on_score_update(f);
    }

    pub fn on_log(&mut self, f: impl FnMut(&str) + Send + 'static) {
        self.notifier().on_log(f);
    }

    pub fn on_error(&mut self, f: impl FnMut(&SyncError) + Send + 'static) {
        self.notifier().on_error(f);
    }

    // Read access

    pub fn state(&self) -> &StateStore {
        &self.store
    }

    pub fn main_coordinator(&self) -> Option<&str> {
        self.store.main_coordinator()
    }

    pub fn main_match(&self) -> Option<&Match> {
        self.store.main_match()
    }

    pub fn coordinators(&self) -> &CoordinatorRoster {
        &self.store.coordinators
    }

    pub fn players(&self) -> &PlayerRoster {
        &self.store.players
    }

    /// Number of coordinator connects still waiting for their name.
    pub fn pending_connects(&self) -> usize {
        self.pending.len()
    }

    // Transport lifecycle

    /// Feed one socket event.
    pub fn handle(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Open => self.handle_open(),
            TransportEvent::Close { code, reason } => self.handle_close(code, &reason),
            TransportEvent::Message(text) => self.handle_message(&text),
        }
    }

    pub fn handle_open(&mut self) {
        self.log(Severity::Info, || "WebSocket connection opened.");
    }

    pub fn handle_close(&mut self, code: u16, reason: &str) {
        self.log(Severity::Info, || {
            format!("WebSocket connection closed. Reason: {} Code: {}", reason, code)
        });
    }

    /// Decode and dispatch one text message.
    ///
    /// A message that fails to decode is reported on the error channel and
    /// dropped.
    pub fn handle_message(&mut self, text: &str) {
        let packet = match Packet::decode(text) {
            Ok(packet) => packet,
            Err(err) => {
                self.log(Severity::Warn, || format!("Dropping message: {}", err));
                self.notifier().error(&err);
                return;
            }
        };

        // Heartbeats would drown everything else.
        let trace = !packet.body.is_command() && self.logger.accepts(Severity::Debug);
        let payload = if trace {
            self.log(Severity::Debug, || {
                format!("Packet type: {}", type_label(&packet.body))
            });
            Some(packet.body.to_json())
        } else {
            None
        };

        self.dispatch(packet);

        if let Some(payload) = payload {
            self.log(Severity::Debug, || payload);
        }
    }

    // Dispatch

    /// Apply one decoded packet.
    pub fn dispatch(&mut self, packet: Packet) {
        self.expire_pending_at(Instant::now());

        match packet.body {
            PacketBody::Event(event) => self.apply_event(event),
            PacketBody::Forwarding(forwarded) => self.apply_forwarded(forwarded),
            PacketBody::SongFinished(user) => self.store.players.upsert(user),
            PacketBody::Connect(connect) => self.apply_connect(connect),
            // Commands carry nothing an overlay needs.
            PacketBody::Command(_) => {}
            PacketBody::Unhandled { tag, .. } => {
                self.log(Severity::Warn, || format!("Not handled (type {})", tag));
            }
        }
    }

    fn apply_event(&mut self, event: Event) {
        match event {
            Event::PlayerAdded(player) | Event::PlayerUpdated(player) => {
                self.store.players.upsert(player);
            }
            Event::PlayerLeft(player) => {
                self.store.players.remove(&player.id);
            }
            Event::CoordinatorAdded(Coordinator { id, name, .. }) => {
                self.store.coordinators.upsert(id.clone(), name.clone());
                self.resolve_pending(id, &name);
            }
            Event::CoordinatorLeft(coordinator) => {
                self.store.coordinators.remove(&coordinator.id);
                if self.store.is_main(&coordinator.id) {
                    self.log(Severity::Info, || {
                        format!("Main coordinator {} left", coordinator.id)
                    });
                    self.store.set_main_coordinator(None);
                }
            }
            Event::MatchCreated(m) | Event::MatchUpdated(m) => {
                if self.led_by_main(&m) {
                    self.store.set_main_match(Some(m));
                } else {
                    self.store.republish_main_match();
                }
            }
            Event::MatchDeleted(m) => {
                if self.led_by_main(&m) {
                    self.store.set_main_match(None);
                } else {
                    self.store.republish_main_match();
                }
            }
            Event::Other(_) => {}
        }
    }

    fn apply_forwarded(&mut self, forwarded: ForwardingPacket) {
        let ForwardingPacket { forward_to, body } = forwarded;
        if let PacketBody::Event(Event::PlayerUpdated(player)) = *body {
            self.apply_score_update(&forward_to, &player);
            self.notifier().score_update(&forward_to, &player);
        }
    }

    /// Fold a forwarded score into the rosters when it is meant for the main
    /// coordinator.
    fn apply_score_update(&mut self, forward_to: &[String], player: &Player) {
        let addressed = match self.store.main_coordinator() {
            Some(main) => forward_to.iter().any(|id| id.as_str() == main),
            None => false,
        };
        if !addressed {
            return;
        }

        self.apply_event(Event::PlayerUpdated(player.clone()));
        self.store.refresh_main_match_players();
    }

    fn apply_connect(&mut self, connect: Connect) {
        if connect.client_type != Some(ClientType::Coordinator) {
            return;
        }
        // Wrong secret or a main coordinator already in place: ignore quietly.
        if connect.password != self.password || self.store.main_coordinator().is_some() {
            return;
        }

        let known = self
            .store
            .coordinators
            .id_for_name(&connect.name)
            .map(str::to_owned);

        match known {
            Some(id) => self.promote(id),
            None => {
                self.log(Severity::Debug, || {
                    format!("Waiting for coordinator {:?} to be announced", connect.name)
                });
                self.pending.park(connect.name, self.resolution_timeout);
            }
        }
    }

    fn resolve_pending(&mut self, id: String, name: &str) {
        if self.pending.take(name).is_none() || self.store.main_coordinator().is_some() {
            return;
        }
        self.promote(id);
    }

    fn promote(&mut self, id: String) {
        self.pending.clear();
        self.log(Severity::Info, || format!("Main coordinator is now {}", id));
        self.store.set_main_coordinator(Some(id));
    }

    /// Report and drop coordinator connects that waited too long.
    ///
    /// Runs on every dispatch; call it from a timer to get timeouts while the
    /// socket is quiet. Returns how many requests expired.
    pub fn expire_pending(&mut self) -> usize {
        self.expire_pending_at(Instant::now())
    }

    fn expire_pending_at(&mut self, now: Instant) -> usize {
        let expired = self.pending.expire_at(now);
        for request in &expired {
            let err = SyncError::ResolutionTimeout {
                name: request.name.clone(),
                waited: request.waited(now),
            };
            self.log(Severity::Warn, || err.to_string());
            self.notifier().error(&err);
        }
        expired.len()
    }

    fn led_by_main(&self, m: &Match) -> bool {
        self.store
            .main_coordinator()
            .is_some_and(|main| m.is_led_by(main))
    }

    fn notifier(&mut self) -> &mut Notifier {
        self.store.notifier_mut()
    }

    fn log<F, S>(&mut self, severity: Severity, message: F)
    where
        F: FnOnce() -> S,
        S: std::fmt::Display,
    {
        self.logger.log(self.store.notifier_mut(), severity, message);
    }
}

fn type_label(body: &PacketBody) -> String {
    match (body.packet_type(), body.tag()) {
        (Some(kind), _) => kind.to_string(),
        (None, Value::String(tag)) => tag,
        (None, tag) => tag.to_string(),
    }
}
