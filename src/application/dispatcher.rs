use crate::domain::ballot::BallotOption;
use crate::domain::event::EventRecord;
use crate::domain::identity::Identity;
use crate::domain::ports::{
    EventSinkBox, ReceiverDirectory, ReceiverDirectoryBox, SnapshotStoreBox,
};
use crate::domain::registry::ItemId;
use crate::domain::request::{Operation, Request};
use crate::domain::snapshot::Snapshot;
use crate::error::{AssetError, Result};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

/// The main entry point for applying requests to the engines.
///
/// `Dispatcher` owns the engine state behind a single mutex, so requests are
/// applied one at a time and each one either fully succeeds or leaves the
/// state untouched. Events committed by a request are forwarded to the event
/// sink before the next request is admitted.
pub struct Dispatcher {
    state: Mutex<Snapshot>,
    receivers: ReceiverDirectoryBox,
    event_sink: EventSinkBox,
    snapshot_store: SnapshotStoreBox,
}

/// Final query results across the three engines.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub token_name: String,
    pub token_symbol: String,
    pub decimals: u8,
    pub total_supply: Holding,
    pub balances: Vec<(Identity, Holding)>,
    pub items: Vec<(ItemId, Identity)>,
    pub options: Vec<BallotOption>,
    pub leader: std::result::Result<String, String>,
    pub winner: std::result::Result<String, String>,
}

/// A raw token amount with its whole-token rendering, when representable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Holding {
    pub raw: u128,
    pub units: Option<Decimal>,
}

impl Dispatcher {
    /// Creates a `Dispatcher`, resuming from the stored snapshot when one exists.
    ///
    /// # Arguments
    ///
    /// * `genesis` - State used when the snapshot store is empty.
    /// * `receivers` - Contract-like recipients consulted by safe transfers.
    /// * `event_sink` - Destination of committed events.
    /// * `snapshot_store` - Where state is loaded from and persisted to.
    pub async fn open(
        genesis: Snapshot,
        receivers: ReceiverDirectoryBox,
        event_sink: EventSinkBox,
        snapshot_store: SnapshotStoreBox,
    ) -> Result<Self> {
        let state = match snapshot_store.load().await? {
            Some(snapshot) => {
                tracing::info!("resuming from stored snapshot");
                snapshot
            }
            None => genesis,
        };
        Ok(Self {
            state: Mutex::new(state),
            receivers,
            event_sink,
            snapshot_store,
        })
    }

    /// Applies a single request.
    ///
    /// The request runs against a working copy of the state. The copy replaces
    /// the live state only once its events have been published, so a rejected
    /// request or a failing event sink returns the error and changes nothing.
    pub async fn process_request(&self, request: Request) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();

        if let Err(e) = apply(&mut next, &request, self.receivers.as_ref()) {
            tracing::warn!(
                op = request.op.name(),
                caller = %request.caller,
                error = %e,
                "request rejected"
            );
            return Err(e);
        }

        let records = next.drain_events();
        if !records.is_empty() {
            self.event_sink.publish(records).await?;
        }
        *state = next;

        tracing::debug!(op = request.op.name(), caller = %request.caller, "request applied");
        Ok(())
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.lock().await.clone()
    }

    /// Saves the current state to the snapshot store.
    pub async fn persist(&self) -> Result<()> {
        let state = self.state.lock().await;
        self.snapshot_store.save(&state).await
    }

    pub async fn events(&self) -> Result<Vec<EventRecord>> {
        self.event_sink.records().await
    }

    pub async fn report(&self) -> Report {
        let state = self.state.lock().await;
        let holding = |raw| Holding {
            raw,
            units: state.ledger.display_amount(raw),
        };
        let mut balances: Vec<(Identity, Holding)> = state
            .ledger
            .accounts()
            .map(|(account, raw)| (account, holding(raw)))
            .collect();
        balances.sort_unstable_by_key(|(account, _)| *account);

        Report {
            token_name: state.ledger.name().to_string(),
            token_symbol: state.ledger.symbol().to_string(),
            decimals: state.ledger.decimals(),
            total_supply: holding(state.ledger.total_supply()),
            balances,
            items: state.registry.items(),
            options: state.ballot.all_options().to_vec(),
            leader: state
                .ballot
                .current_leader_name()
                .map(str::to_string)
                .map_err(|e| e.to_string()),
            winner: state
                .ballot
                .confirmed_winner_name()
                .map(str::to_string)
                .map_err(|e| e.to_string()),
        }
    }
}

fn apply(state: &mut Snapshot, request: &Request, receivers: &dyn ReceiverDirectory) -> Result<()> {
    let op = request.op;
    let caller = request.caller;
    let from = || field(op, "from", request.from);
    let to = || field(op, "to", request.to);
    let value = || field(op, "value", request.value);

    match op {
        Operation::TokenTransfer => state
            .ledger
            .transfer(caller, to()?, u128::from(value()?)),
        Operation::TokenApprove => {
            state.ledger.approve(caller, to()?, u128::from(value()?));
            Ok(())
        }
        Operation::TokenTransferFrom => {
            state
                .ledger
                .transfer_from(caller, from()?, to()?, u128::from(value()?))
        }
        Operation::ItemMint => state.registry.mint(to()?, value()?),
        Operation::ItemBurn => state.registry.burn(caller, value()?),
        Operation::ItemApprove => state.registry.approve(caller, to()?, value()?),
        Operation::ItemSetApprovalForAll => {
            let approved = match value()? {
                0 => false,
                1 => true,
                other => {
                    return Err(AssetError::OutOfRange {
                        field: "value",
                        value: other,
                    });
                }
            };
            state.registry.set_approval_for_all(caller, to()?, approved);
            Ok(())
        }
        Operation::ItemTransferFrom => {
            state
                .registry
                .transfer_from(caller, from()?, to()?, value()?)
        }
        Operation::ItemSafeTransferFrom => {
            let data = request.data.as_deref().unwrap_or_default().as_bytes();
            state
                .registry
                .safe_transfer_from(caller, from()?, to()?, value()?, data, receivers)
        }
        Operation::BallotGiveRight => state.ballot.give_right_to_vote(caller, to()?),
        Operation::BallotVote => {
            let raw = value()?;
            let index = usize::try_from(raw).map_err(|_| AssetError::OutOfRange {
                field: "value",
                value: raw,
            })?;
            state.ballot.vote(caller, index)
        }
        Operation::BallotDelegate => state.ballot.delegate(caller, to()?),
    }
}

fn field<T>(op: Operation, name: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or(AssetError::MissingField {
        op: op.name(),
        field: name,
    })
}
