use crate::domain::event::{EventLog, EventRecord, RegistryEvent};
use crate::domain::identity::Identity;
use crate::domain::ports::ReceiverDirectory;
use crate::error::{AssetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type ItemId = u64;

/// Acknowledgment a recipient must return from its receive hook to accept an item.
pub const RECEIVED_TAG: u32 = 0x150b_7a02;

/// Operation contracts a registry can be queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Introspection,
    ItemRegistry,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::Introspection, Capability::ItemRegistry];

    pub fn interface_id(self) -> u32 {
        match self {
            Capability::Introspection => 0x01ff_c9a7,
            Capability::ItemRegistry => 0x80ac_58cd,
        }
    }

    pub fn from_interface_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.interface_id() == id)
    }
}

/// Ownership registry for uniquely identified items.
///
/// `balances` duplicates the count of entries in `owners` per identity and is
/// kept in lockstep with it by every mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    owners: HashMap<ItemId, Identity>,
    balances: HashMap<Identity, u64>,
    approvals: HashMap<ItemId, Identity>,
    operators: HashMap<Identity, HashMap<Identity, bool>>,
    #[serde(default)]
    events: EventLog,
}

/// Entries touched by a transfer, captured so a refused delivery can be undone exactly.
struct TransferCheckpoint {
    item_id: ItemId,
    from: Identity,
    to: Identity,
    owner: Option<Identity>,
    approval: Option<Identity>,
    from_balance: Option<u64>,
    to_balance: Option<u64>,
}

impl TransferCheckpoint {
    fn capture(registry: &Registry, from: Identity, to: Identity, item_id: ItemId) -> Self {
        Self {
            item_id,
            from,
            to,
            owner: registry.owners.get(&item_id).copied(),
            approval: registry.approvals.get(&item_id).copied(),
            from_balance: registry.balances.get(&from).copied(),
            to_balance: registry.balances.get(&to).copied(),
        }
    }

    fn restore(self, registry: &mut Registry) {
        restore_entry(&mut registry.owners, self.item_id, self.owner);
        restore_entry(&mut registry.approvals, self.item_id, self.approval);
        restore_entry(&mut registry.balances, self.to, self.to_balance);
        restore_entry(&mut registry.balances, self.from, self.from_balance);
    }
}

fn restore_entry<K, V>(map: &mut HashMap<K, V>, key: K, value: Option<V>)
where
    K: std::hash::Hash + Eq,
{
    match value {
        Some(value) => map.insert(key, value),
        None => map.remove(&key),
    };
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supports_capability(&self, interface_id: u32) -> bool {
        Capability::from_interface_id(interface_id).is_some()
    }

    pub fn balance_of(&self, owner: Identity) -> Result<u64> {
        if owner.is_null() {
            return Err(AssetError::NullOwner);
        }
        Ok(self.balances.get(&owner).copied().unwrap_or(0))
    }

    pub fn owner_of(&self, item_id: ItemId) -> Result<Identity> {
        self.owners
            .get(&item_id)
            .copied()
            .ok_or(AssetError::NonexistentItem { item_id })
    }

    pub fn mint(&mut self, to: Identity, item_id: ItemId) -> Result<()> {
        if to.is_null() {
            return Err(AssetError::NullOwner);
        }
        if self.owners.contains_key(&item_id) {
            return Err(AssetError::AlreadyMinted { item_id });
        }

        self.owners.insert(item_id, to);
        *self.balances.entry(to).or_default() += 1;
        self.events.record(RegistryEvent::Transfer {
            from: Identity::NULL,
            to,
            item_id,
        });
        tracing::debug!(%to, item_id, "item minted");
        Ok(())
    }

    /// Destroys `item_id`. Only its current owner may burn it.
    pub fn burn(&mut self, caller: Identity, item_id: ItemId) -> Result<()> {
        let owner = self.owners.get(&item_id).copied();
        if owner != Some(caller) {
            return Err(AssetError::NotOwner {
                claimed: caller,
                item_id,
            });
        }

        self.owners.remove(&item_id);
        self.approvals.remove(&item_id);
        if let Some(balance) = self.balances.get_mut(&caller) {
            *balance -= 1;
        }
        self.events.record(RegistryEvent::Transfer {
            from: caller,
            to: Identity::NULL,
            item_id,
        });
        tracing::debug!(owner = %caller, item_id, "item burned");
        Ok(())
    }

    /// Grants `spender` the right to transfer `item_id`.
    ///
    /// The caller must be the owner or one of the owner's operators. A
    /// nonexistent item has no owner, so approving it is never authorized.
    pub fn approve(&mut self, caller: Identity, spender: Identity, item_id: ItemId) -> Result<()> {
        let owner = match self.owners.get(&item_id) {
            Some(owner) if *owner == caller || self.is_approved_for_all(*owner, caller) => *owner,
            _ => return Err(AssetError::NotAuthorized { caller, item_id }),
        };

        self.approvals.insert(item_id, spender);
        self.events.record(RegistryEvent::Approval {
            owner,
            approved: spender,
            item_id,
        });
        tracing::debug!(%owner, %spender, item_id, "item approval set");
        Ok(())
    }

    pub fn set_approval_for_all(&mut self, caller: Identity, operator: Identity, approved: bool) {
        self.operators
            .entry(caller)
            .or_default()
            .insert(operator, approved);
        self.events.record(RegistryEvent::ApprovalForAll {
            owner: caller,
            operator,
            approved,
        });
        tracing::debug!(owner = %caller, %operator, approved, "operator approval set");
    }

    /// Returns the identity approved for `item_id`, or `Identity::NULL` when none is.
    pub fn get_approved(&self, item_id: ItemId) -> Result<Identity> {
        self.owner_of(item_id)?;
        Ok(self
            .approvals
            .get(&item_id)
            .copied()
            .unwrap_or(Identity::NULL))
    }

    pub fn is_approved_for_all(&self, owner: Identity, operator: Identity) -> bool {
        self.operators
            .get(&owner)
            .and_then(|operators| operators.get(&operator))
            .copied()
            .unwrap_or(false)
    }

    /// Transfers `item_id` from `from` to `to`.
    ///
    /// Checks run in order: `from` must be the current owner, `to` must not be
    /// null, and the caller must be `from`, an operator of `from`, or the
    /// approved spender for the item.
    pub fn transfer_from(
        &mut self,
        caller: Identity,
        from: Identity,
        to: Identity,
        item_id: ItemId,
    ) -> Result<()> {
        self.check_transfer(caller, from, to, item_id)?;
        self.move_item(from, to, item_id);
        self.events.record(RegistryEvent::Transfer { from, to, item_id });
        tracing::debug!(%caller, %from, %to, item_id, "item transferred");
        Ok(())
    }

    /// Transfers `item_id` and, when `to` is a contract-like recipient, asks it
    /// to acknowledge the delivery.
    ///
    /// If the recipient's hook fails or answers with anything other than
    /// [`RECEIVED_TAG`], the transfer is undone and no event is emitted.
    pub fn safe_transfer_from(
        &mut self,
        caller: Identity,
        from: Identity,
        to: Identity,
        item_id: ItemId,
        data: &[u8],
        receivers: &dyn ReceiverDirectory,
    ) -> Result<()> {
        self.check_transfer(caller, from, to, item_id)?;

        let checkpoint = TransferCheckpoint::capture(self, from, to, item_id);
        self.move_item(from, to, item_id);
        let mut pending = self.events.begin();
        pending.emit(RegistryEvent::Transfer { from, to, item_id });

        if let Some(receiver) = receivers.receiver(to) {
            let refusal = match receiver.on_item_received(caller, from, item_id, data) {
                Ok(RECEIVED_TAG) => None,
                Ok(tag) => Some(format!("unexpected acknowledgment 0x{tag:08x}")),
                Err(reason) => Some(reason),
            };
            if let Some(reason) = refusal {
                checkpoint.restore(self);
                tracing::debug!(%to, item_id, %reason, "recipient refused item");
                return Err(AssetError::UnsafeRecipient {
                    recipient: to,
                    item_id,
                    reason,
                });
            }
        }

        self.events.commit(pending);
        tracing::debug!(%caller, %from, %to, item_id, "item safely transferred");
        Ok(())
    }

    /// Items currently owned by `owner`, in ascending id order.
    pub fn items_of(&self, owner: Identity) -> Vec<ItemId> {
        let mut items: Vec<ItemId> = self
            .owners
            .iter()
            .filter(|(_, o)| **o == owner)
            .map(|(id, _)| *id)
            .collect();
        items.sort_unstable();
        items
    }

    /// All existing items with their owners, in ascending id order.
    pub fn items(&self) -> Vec<(ItemId, Identity)> {
        let mut items: Vec<(ItemId, Identity)> =
            self.owners.iter().map(|(id, owner)| (*id, *owner)).collect();
        items.sort_unstable();
        items
    }

    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }

    fn check_transfer(
        &self,
        caller: Identity,
        from: Identity,
        to: Identity,
        item_id: ItemId,
    ) -> Result<()> {
        if self.owners.get(&item_id) != Some(&from) {
            return Err(AssetError::NotOwner {
                claimed: from,
                item_id,
            });
        }
        if to.is_null() {
            return Err(AssetError::NullRecipient { item_id });
        }
        let authorized = caller == from
            || self.is_approved_for_all(from, caller)
            || self.approvals.get(&item_id) == Some(&caller);
        if !authorized {
            return Err(AssetError::NotAuthorized { caller, item_id });
        }
        Ok(())
    }

    fn move_item(&mut self, from: Identity, to: Identity, item_id: ItemId) {
        if let Some(balance) = self.balances.get_mut(&from) {
            *balance -= 1;
        }
        *self.balances.entry(to).or_default() += 1;
        self.owners.insert(item_id, to);
        self.approvals.remove(&item_id);
    }
}
