//! Typed notification channels.
//!
//! Each notification kind has its own subscriber list and payload type.
//! Delivery is synchronous, on the caller's thread, in subscription order.
//! Subscribers see borrowed snapshots that are only valid for the duration of
//! the call; clone what you need to keep.

use std::fmt;

use super::error::SyncError;
use super::packet::{Match, Player};

type CoordinatorHandler = Box<dyn FnMut(Option<&str>) + Send>;
type MatchHandler = Box<dyn FnMut(Option<&Match>) + Send>;
type ScoreHandler = Box<dyn FnMut(&[String], &Player) + Send>;
type LogHandler = Box<dyn FnMut(&str) + Send>;
type ErrorHandler = Box<dyn FnMut(&SyncError) + Send>;

/// Subscriber registry for every notification kind.
#[derive(Default)]
pub struct Notifier {
    coordinator_changed: Vec<CoordinatorHandler>,
    match_changed: Vec<MatchHandler>,
    score_update: Vec<ScoreHandler>,
    log: Vec<LogHandler>,
    error: Vec<ErrorHandler>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("coordinator_changed", &self.coordinator_changed.len())
            .field("match_changed", &self.match_changed.len())
            .field("score_update", &self.score_update.len())
            .field("log", &self.log.len())
            .field("error", &self.error.len())
            .finish()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_coordinator_changed(&mut self, f: impl FnMut(Option<&str>) + Send + 'static) {
        self.coordinator_changed.push(Box::new(f));
    }

    pub fn on_match_changed(&mut self, f: impl FnMut(Option<&Match>) + Send + 'static) {
        self.match_changed.push(Box::new(f));
    }

    pub fn on_score_update(&mut self, f: impl FnMut(&[String], &Player) + Send + 'static) {
        self.score_update.push(Box::new(f));
    }

    pub fn on_log(&mut self, f: impl FnMut(&str) + Send + 'static) {
        self.log.push(Box::new(f));
    }

    pub fn on_error(&mut self, f: impl FnMut(&SyncError) + Send + 'static) {
        self.error.push(Box::new(f));
    }

    pub fn coordinator_changed(&mut self, id: Option<&str>) {
        for handler in &mut self.coordinator_changed {
            handler(id);
        }
    }

    pub fn match_changed(&mut self, m: Option<&Match>) {
        for handler in &mut self.match_changed {
            handler(m);
        }
    }

    pub fn score_update(&mut self, forward_to: &[String], player: &Player) {
        for handler in &mut self.score_update {
            handler(forward_to, player);
        }
    }

    pub fn log(&mut self, line: &str) {
        for handler in &mut self.log {
            handler(line);
        }
    }

    pub fn error(&mut self, err: &SyncError) {
        for handler in &mut self.error {
            handler(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_delivery_in_subscription_order() {
        let mut notifier = Notifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = seen.clone();
            notifier.on_coordinator_changed(move |id| {
                seen.lock()
                    .unwrap()
                    .push(format!("{}:{}", tag, id.unwrap_or("-")));
            });
        }

        notifier.coordinator_changed(Some("c1"));
        notifier.coordinator_changed(None);

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:c1", "second:c1", "first:-", "second:-"]
        );
    }

    #[test]
    fn test_channels_are_independent() {
        let mut notifier = Notifier::new();
        let lines = Arc::new(Mutex::new(Vec::new()));
        {
            let lines = lines.clone();
            notifier.on_log(move |line| lines.lock().unwrap().push(line.to_string()));
        }

        notifier.match_changed(None);
        notifier.score_update(&["c1".to_string()], &Player::new("p1", "Alice"));
        assert!(lines.lock().unwrap().is_empty());

        notifier.log("hello");
        assert_eq!(*lines.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_debug_shows_counts() {
        let mut notifier = Notifier::new();
        notifier.on_error(|_| {});
        assert!(format!("{:?}", notifier).contains("error: 1"));
    }
}
