//! Coordinator and player rosters.
//!
//! Both are plain identity-keyed maps. Upserts replace the whole record and
//! removing an unknown identity is a no-op.

use std::collections::HashMap;

use super::packet::Player;

/// Coordinators by identity, storing only the display name.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorRoster {
    names: HashMap<String, String>,
}

impl CoordinatorRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or rename a coordinator.
    pub fn upsert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.names.remove(id)
    }

    /// Get a coordinator's name.
    pub fn name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.names.contains_key(id)
    }

    /// Find a coordinator identity by display name.
    ///
    /// Which one is returned when several share a name is unspecified.
    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(id, n)| (id.as_str(), n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Players by identity.
#[derive(Debug, Clone, Default)]
pub struct PlayerRoster {
    players: HashMap<String, Player>,
}

impl PlayerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a player.
    pub fn upsert(&mut self, player: Player) {
        self.players.insert(player.id.clone(), player);
    }

    pub fn remove(&mut self, id: &str) -> Option<Player> {
        self.players.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.players.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.players.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Re-resolve match slots against the live roster.
    ///
    /// Occupied slots are replaced by the current record for that identity,
    /// or emptied if the player is gone. Empty slots stay empty.
    pub fn resolve_slots(&self, slots: &[Option<Player>]) -> Vec<Option<Player>> {
        slots
            .iter()
            .map(|slot| slot.as_ref().and_then(|p| self.get(&p.id).cloned()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_coordinator_lookup_by_name() {
        let mut roster = CoordinatorRoster::new();
        roster.upsert("c1", "Moon");
        roster.upsert("c2", "Sun");

        assert_eq!(roster.id_for_name("Sun"), Some("c2"));
        assert_eq!(roster.id_for_name("Star"), None);

        // Rename keeps a single entry
        roster.upsert("c2", "Star");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.name("c2"), Some("Star"));
        assert_eq!(roster.id_for_name("Sun"), None);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut coordinators = CoordinatorRoster::new();
        assert_eq!(coordinators.remove("ghost"), None);

        let mut players = PlayerRoster::new();
        assert_eq!(players.remove("ghost"), None);
        assert!(players.is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let mut roster = PlayerRoster::new();
        roster.upsert(Player::new("p1", "Alice"));
        roster.upsert(Player::new("p2", "Bob"));
        roster.upsert(Player::new("p1", "Alice").with_field("Score", json!(90)));
        roster.remove("p2");

        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get("p1").unwrap().extra.get("Score"), Some(&json!(90)));
        assert!(!roster.contains("p2"));
    }

    #[test]
    fn test_resolve_slots() {
        let mut roster = PlayerRoster::new();
        let fresh = Player::new("p1", "Alice").with_field("Score", json!(500));
        roster.upsert(fresh.clone());

        let slots = vec![
            Some(Player::new("p1", "Alice")),
            None,
            Some(Player::new("gone", "Eve")),
        ];

        assert_eq!(roster.resolve_slots(&slots), vec![Some(fresh), None, None]);
    }
}
