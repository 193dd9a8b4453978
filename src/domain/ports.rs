use super::event::EventRecord;
use super::identity::Identity;
use super::registry::ItemId;
use super::snapshot::Snapshot;
use crate::error::Result;
use async_trait::async_trait;

/// Receives events once the call that emitted them has committed.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publishes the events of one request. Either all of them are kept or,
    /// on error, none are.
    async fn publish(&self, records: Vec<EventRecord>) -> Result<()>;
    async fn records(&self) -> Result<Vec<EventRecord>>;
}

/// Saves and restores the state of all three engines.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self) -> Result<Option<Snapshot>>;
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Receive hook of a contract-like recipient.
///
/// Returning `Ok(RECEIVED_TAG)` accepts the item; any other value, or an
/// `Err` carrying the refusal reason, makes the transfer fail.
pub trait ItemReceiver: Send + Sync {
    fn on_item_received(
        &self,
        operator: Identity,
        from: Identity,
        item_id: ItemId,
        data: &[u8],
    ) -> std::result::Result<u32, String>;
}

/// Resolves which identities are contract-like recipients.
pub trait ReceiverDirectory: Send + Sync {
    fn receiver(&self, identity: Identity) -> Option<&dyn ItemReceiver>;
}

pub type EventSinkBox = Box<dyn EventSink>;
pub type SnapshotStoreBox = Box<dyn SnapshotStore>;
pub type ReceiverDirectoryBox = Box<dyn ReceiverDirectory>;
