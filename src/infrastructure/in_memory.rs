use crate::domain::event::EventRecord;
use crate::domain::identity::Identity;
use crate::domain::ports::{EventSink, ItemReceiver, ReceiverDirectory, SnapshotStore};
use crate::domain::registry::{ItemId, RECEIVED_TAG};
use crate::domain::snapshot::Snapshot;
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory event sink.
///
/// Keeps every published record in arrival order.
#[derive(Default, Clone)]
pub struct InMemoryEventSink {
    records: Arc<RwLock<Vec<EventRecord>>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn publish(&self, records: Vec<EventRecord>) -> Result<()> {
        self.records.write().await.extend(records);
        Ok(())
    }

    async fn records(&self) -> Result<Vec<EventRecord>> {
        Ok(self.records.read().await.clone())
    }
}

/// A thread-safe in-memory snapshot store.
///
/// Clones share the same slot, so a snapshot saved through one handle can be
/// loaded through another.
#[derive(Default, Clone)]
pub struct InMemorySnapshotStore {
    snapshot: Arc<RwLock<Option<Snapshot>>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self) -> Result<Option<Snapshot>> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.snapshot.write().await = Some(snapshot.clone());
        Ok(())
    }
}

/// How a configured recipient answers its receive hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverBehavior {
    #[default]
    Accept,
    Reject,
    WrongTag,
}

/// A recipient whose answer is fixed up front.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedReceiver {
    behavior: ReceiverBehavior,
}

impl ScriptedReceiver {
    pub fn new(behavior: ReceiverBehavior) -> Self {
        Self { behavior }
    }
}

impl ItemReceiver for ScriptedReceiver {
    fn on_item_received(
        &self,
        operator: Identity,
        from: Identity,
        item_id: ItemId,
        _data: &[u8],
    ) -> std::result::Result<u32, String> {
        match self.behavior {
            ReceiverBehavior::Accept => Ok(RECEIVED_TAG),
            ReceiverBehavior::WrongTag => Ok(!RECEIVED_TAG),
            ReceiverBehavior::Reject => Err(format!(
                "item {item_id} from {from} via {operator} refused"
            )),
        }
    }
}

/// A fixed set of contract-like recipients; every other identity is a plain recipient.
#[derive(Default)]
pub struct StaticReceivers {
    receivers: HashMap<Identity, Box<dyn ItemReceiver>>,
}

impl StaticReceivers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, identity: Identity, receiver: impl ItemReceiver + 'static) -> Self {
        self.insert(identity, receiver);
        self
    }

    pub fn insert(&mut self, identity: Identity, receiver: impl ItemReceiver + 'static) {
        self.receivers.insert(identity, Box::new(receiver));
    }
}

impl ReceiverDirectory for StaticReceivers {
    fn receiver(&self, identity: Identity) -> Option<&dyn ItemReceiver> {
        self.receivers.get(&identity).map(|r| r.as_ref())
    }
}
