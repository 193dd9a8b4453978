use crate::domain::identity::Identity;
use crate::domain::registry::ItemId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    Transfer {
        from: Identity,
        to: Identity,
        amount: u128,
    },
    Approval {
        owner: Identity,
        spender: Identity,
        amount: u128,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    Transfer {
        from: Identity,
        to: Identity,
        item_id: ItemId,
    },
    Approval {
        owner: Identity,
        approved: Identity,
        item_id: ItemId,
    },
    ApprovalForAll {
        owner: Identity,
        operator: Identity,
        approved: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotEvent {
    VoteCast { voter: Identity, option: String },
}

/// An event emitted by one of the engines, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Ledger(LedgerEvent),
    Registry(RegistryEvent),
    Ballot(BallotEvent),
}

impl From<LedgerEvent> for Event {
    fn from(event: LedgerEvent) -> Self {
        Event::Ledger(event)
    }
}

impl From<RegistryEvent> for Event {
    fn from(event: RegistryEvent) -> Self {
        Event::Registry(event)
    }
}

impl From<BallotEvent> for Event {
    fn from(event: BallotEvent) -> Self {
        Event::Ballot(event)
    }
}

/// A committed event together with its position in the engine's log.
///
/// `call` numbers successful mutating calls on one engine, starting at zero.
/// `seq` orders the events emitted within that call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub call: u64,
    pub seq: u32,
    pub event: Event,
}

/// Events buffered while a call is in flight.
///
/// Nothing reaches the log until the call commits, so a call that fails
/// midway leaves no trace.
#[derive(Debug)]
pub struct PendingEvents {
    call: u64,
    events: Vec<Event>,
}

impl PendingEvents {
    pub fn emit(&mut self, event: impl Into<Event>) {
        self.events.push(event.into());
    }
}

/// Ordered, append-only log owned by a single engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    #[serde(skip)]
    records: Vec<EventRecord>,
    next_call: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> PendingEvents {
        PendingEvents {
            call: self.next_call,
            events: Vec::new(),
        }
    }

    pub fn commit(&mut self, pending: PendingEvents) {
        debug_assert_eq!(pending.call, self.next_call);
        for (seq, event) in pending.events.into_iter().enumerate() {
            self.records.push(EventRecord {
                call: pending.call,
                seq: seq as u32,
                event,
            });
        }
        self.next_call += 1;
    }

    /// Commits a call that emits exactly one event.
    pub fn record(&mut self, event: impl Into<Event>) {
        let mut pending = self.begin();
        pending.emit(event);
        self.commit(pending);
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Hands the buffered records to the caller, keeping the call counter.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(voter: u64) -> BallotEvent {
        BallotEvent::VoteCast {
            voter: Identity(voter),
            option: "Bob".to_string(),
        }
    }

    #[test]
    fn test_commit_assigns_call_and_sequence() {
        let mut log = EventLog::new();
        log.record(vote(1));

        let mut pending = log.begin();
        pending.emit(vote(2));
        pending.emit(vote(3));
        log.commit(pending);

        let positions: Vec<(u64, u32)> = log.records().iter().map(|r| (r.call, r.seq)).collect();
        assert_eq!(positions, vec![(0, 0), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_dropped_pending_leaves_log_untouched() {
        let mut log = EventLog::new();
        let mut pending = log.begin();
        pending.emit(vote(1));
        drop(pending);

        assert!(log.records().is_empty());
        log.record(vote(2));
        assert_eq!(log.records()[0].call, 0);
    }

    #[test]
    fn test_drain_keeps_call_counter() {
        let mut log = EventLog::new();
        log.record(vote(1));
        assert_eq!(log.drain().len(), 1);
        assert!(log.records().is_empty());

        log.record(vote(2));
        assert_eq!(log.records()[0].call, 1);
    }
}
