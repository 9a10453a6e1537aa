//! The mirrored state and its change notifications.

use super::notify::Notifier;
use super::packet::Match;
use super::roster::{CoordinatorRoster, PlayerRoster};

/// Rosters plus the main coordinator and its active match.
///
/// The main match, when present, is always led by the main coordinator.
/// Setting either of the "main" values notifies subscribers.
#[derive(Debug, Default)]
pub struct StateStore {
    pub coordinators: CoordinatorRoster,
    pub players: PlayerRoster,
    main_coordinator: Option<String>,
    main_match: Option<Match>,
    notifier: Notifier,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn main_coordinator(&self) -> Option<&str> {
        self.main_coordinator.as_deref()
    }

    pub fn main_match(&self) -> Option<&Match> {
        self.main_match.as_ref()
    }

    /// Check if the given identity is the main coordinator.
    pub fn is_main(&self, coordinator_id: &str) -> bool {
        self.main_coordinator.as_deref() == Some(coordinator_id)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Set or clear the main coordinator and emit `coordinator_changed`.
    ///
    /// A main match led by someone else is dropped, followed by a
    /// `match_changed(None)`.
    pub fn set_main_coordinator(&mut self, id: Option<String>) {
        self.main_coordinator = id;
        self.notifier.coordinator_changed(self.main_coordinator.as_deref());

        let stale = match (&self.main_coordinator, &self.main_match) {
            (Some(main), Some(m)) => !m.is_led_by(main),
            (None, Some(_)) => true,
            _ => false,
        };
        if stale {
            self.set_main_match(None);
        }
    }

    /// Set or clear the main match and emit `match_changed`.
    pub fn set_main_match(&mut self, m: Option<Match>) {
        self.main_match = m;
        self.republish_main_match();
    }

    /// Emit `match_changed` with the current main match.
    pub fn republish_main_match(&mut self) {
        self.notifier.match_changed(self.main_match.as_ref());
    }

    /// Rebuild the main match's slots from the live player roster.
    ///
    /// Returns false when there is no main match.
    pub fn refresh_main_match_players(&mut self) -> bool {
        let Some(m) = self.main_match.as_mut() else {
            return false;
        };
        m.players = self.players.resolve_slots(&m.players);
        self.republish_main_match();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::packet::{Coordinator, Player};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_set_main_coordinator_notifies() {
        let mut store = StateStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = seen.clone();
            store
                .notifier_mut()
                .on_coordinator_changed(move |id| seen.lock().unwrap().push(id.map(String::from)));
        }

        store.set_main_coordinator(Some("c1".to_string()));
        assert!(store.is_main("c1"));
        store.set_main_coordinator(None);
        assert_eq!(store.main_coordinator(), None);

        assert_eq!(*seen.lock().unwrap(), vec![Some("c1".to_string()), None]);
    }

    #[test]
    fn test_main_match_follows_coordinator() {
        let mut store = StateStore::new();
        store.set_main_coordinator(Some("c1".to_string()));
        store.set_main_match(Some(Match::new(Coordinator::new("c1", "Moon"), vec![])));
        assert!(store.main_match().is_some());

        let cleared = Arc::new(Mutex::new(0));
        {
            let cleared = cleared.clone();
            store.notifier_mut().on_match_changed(move |m| {
                assert!(m.is_none());
                *cleared.lock().unwrap() += 1;
            });
        }

        store.set_main_coordinator(None);
        assert!(store.main_match().is_none());
        assert_eq!(*cleared.lock().unwrap(), 1);
    }

    #[test]
    fn test_refresh_players() {
        let mut store = StateStore::new();
        assert!(!store.refresh_main_match_players());

        let updated = Player::new("p1", "Alice").with_field("Score", serde_json::json!(7));
        store.players.upsert(updated.clone());
        store.set_main_match(Some(Match::new(
            Coordinator::new("c1", "Moon"),
            vec![Some(Player::new("p1", "Alice")), Some(Player::new("p2", "Bob"))],
        )));

        let published = Arc::new(Mutex::new(Vec::new()));
        {
            let published = published.clone();
            store
                .notifier_mut()
                .on_match_changed(move |m| published.lock().unwrap().push(m.cloned()));
        }

        assert!(store.refresh_main_match_players());
        assert_eq!(store.main_match().unwrap().players, vec![Some(updated), None]);
        assert_eq!(published.lock().unwrap().len(), 1);
    }
}
