use super::ballot::Ballot;
use super::event::EventRecord;
use super::ledger::Ledger;
use super::registry::Registry;
use serde::{Deserialize, Serialize};

/// The complete state of the three engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub ledger: Ledger,
    pub registry: Registry,
    pub ballot: Ballot,
}

impl Snapshot {
    pub fn new(ledger: Ledger, registry: Registry, ballot: Ballot) -> Self {
        Self {
            ledger,
            registry,
            ballot,
        }
    }

    /// Takes the committed-but-unpublished events of every engine.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        let mut records = self.ledger.drain_events();
        records.extend(self.registry.drain_events());
        records.extend(self.ballot.drain_events());
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::Identity;

    #[test]
    fn test_snapshot_json_keeps_state_but_not_buffered_events() {
        let mut ledger = Ledger::create("Token", "TKN", 1_000, 2, Identity(1));
        ledger.transfer(Identity(1), Identity(2), 10).unwrap();
        ledger.approve(Identity(1), Identity(3), 5);
        let mut registry = Registry::new();
        registry.mint(Identity(2), 7).unwrap();
        let ballot = Ballot::construct(&["Yes", "No"], Identity(1)).unwrap();
        let snapshot = Snapshot::new(ledger, registry, ballot);

        let json = serde_json::to_vec(&snapshot).unwrap();
        let restored: Snapshot = serde_json::from_slice(&json).unwrap();

        assert_eq!(restored.ledger.balance_of(Identity(2)), 10);
        assert_eq!(restored.ledger.allowance(Identity(1), Identity(3)), 5);
        assert_eq!(restored.registry.owner_of(7).unwrap(), Identity(2));
        assert_eq!(restored.ballot.all_options().len(), 2);
        assert!(restored.ledger.events().is_empty());
    }

    #[test]
    fn test_drain_events_collects_all_engines() {
        let mut snapshot = Snapshot::new(
            Ledger::create("Token", "TKN", 1_000, 2, Identity(1)),
            Registry::new(),
            Ballot::construct(&["Yes"], Identity(1)).unwrap(),
        );
        snapshot.ledger.transfer(Identity(1), Identity(2), 1).unwrap();
        snapshot.registry.mint(Identity(2), 1).unwrap();
        snapshot.ballot.vote(Identity(1), 0).unwrap();

        assert_eq!(snapshot.drain_events().len(), 3);
        assert!(snapshot.drain_events().is_empty());
    }
}
