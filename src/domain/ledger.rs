use crate::domain::event::{EventLog, EventRecord, LedgerEvent};
use crate::domain::identity::Identity;
use crate::error::{AssetError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A fungible token ledger with a fixed total supply.
///
/// The whole supply is credited to the creator at construction and is only
/// ever moved between accounts afterwards, so the sum of all balances always
/// equals `total_supply`. Accounts and allowances that were never touched
/// read as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: u128,
    owner: Identity,
    balances: HashMap<Identity, u128>,
    allowances: HashMap<Identity, HashMap<Identity, u128>>,
    #[serde(default)]
    events: EventLog,
}

impl Ledger {
    pub fn create(
        name: impl Into<String>,
        symbol: impl Into<String>,
        total_supply: u128,
        decimals: u8,
        creator: Identity,
    ) -> Self {
        let mut balances = HashMap::new();
        balances.insert(creator, total_supply);
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply,
            owner: creator,
            balances,
            allowances: HashMap::new(),
            events: EventLog::new(),
        }
    }

    /// Moves `amount` from `from` to `to`.
    pub fn transfer(&mut self, from: Identity, to: Identity, amount: u128) -> Result<()> {
        self.ensure_balance(from, amount)?;
        self.move_balance(from, to, amount);
        self.events.record(LedgerEvent::Transfer { from, to, amount });
        tracing::debug!(%from, %to, %amount, "token transfer applied");
        Ok(())
    }

    /// Sets the allowance of `spender` over `owner`'s balance, replacing any previous value.
    pub fn approve(&mut self, owner: Identity, spender: Identity, amount: u128) {
        self.allowances
            .entry(owner)
            .or_default()
            .insert(spender, amount);
        self.events.record(LedgerEvent::Approval {
            owner,
            spender,
            amount,
        });
        tracing::debug!(%owner, %spender, %amount, "token allowance set");
    }

    /// Moves `amount` from `from` to `to` on behalf of `spender`, consuming allowance.
    ///
    /// The balance check runs before the allowance check.
    pub fn transfer_from(
        &mut self,
        spender: Identity,
        from: Identity,
        to: Identity,
        amount: u128,
    ) -> Result<()> {
        self.ensure_balance(from, amount)?;
        let remaining = self.allowance(from, spender);
        if remaining < amount {
            return Err(AssetError::InsufficientAllowance {
                owner: from,
                spender,
                remaining,
                required: amount,
            });
        }

        self.allowances
            .entry(from)
            .or_default()
            .insert(spender, remaining - amount);
        self.move_balance(from, to, amount);
        self.events.record(LedgerEvent::Transfer { from, to, amount });
        tracing::debug!(%spender, %from, %to, %amount, "delegated token transfer applied");
        Ok(())
    }

    pub fn balance_of(&self, account: Identity) -> u128 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: Identity, spender: Identity) -> u128 {
        self.allowances
            .get(&owner)
            .and_then(|spenders| spenders.get(&spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn owner(&self) -> Identity {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Renders a raw amount in whole-token units, e.g. `1500` with 3 decimals as `1.5`.
    ///
    /// Returns `None` when the amount or the number of decimals exceeds what
    /// `Decimal` can represent.
    pub fn display_amount(&self, amount: u128) -> Option<Decimal> {
        let value = i128::try_from(amount).ok()?;
        Decimal::try_from_i128_with_scale(value, u32::from(self.decimals))
            .ok()
            .map(|d| d.normalize())
    }

    /// Accounts that have been referenced at least once, with their balances.
    pub fn accounts(&self) -> impl Iterator<Item = (Identity, u128)> + '_ {
        self.balances.iter().map(|(id, balance)| (*id, *balance))
    }

    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }

    fn ensure_balance(&self, account: Identity, amount: u128) -> Result<()> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                account,
                available,
                required: amount,
            });
        }
        Ok(())
    }

    // Callers check the debit side first. The credit side cannot overflow:
    // every balance is bounded by the fixed total supply.
    fn move_balance(&mut self, from: Identity, to: Identity, amount: u128) {
        *self.balances.entry(from).or_default() -= amount;
        *self.balances.entry(to).or_default() += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::Event;
    use rust_decimal_macros::dec;

    const ALICE: Identity = Identity(1);
    const BOB: Identity = Identity(2);
    const CAROL: Identity = Identity(3);

    fn ledger() -> Ledger {
        Ledger::create("Token", "TKN", 10_000, 18, ALICE)
    }

    #[test]
    fn test_create_credits_creator() {
        let ledger = ledger();
        assert_eq!(ledger.balance_of(ALICE), 10_000);
        assert_eq!(ledger.balance_of(BOB), 0);
        assert_eq!(ledger.total_supply(), 10_000);
        assert_eq!(ledger.owner(), ALICE);
        assert_eq!(ledger.decimals(), 18);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut ledger = ledger();
        ledger.transfer(ALICE, BOB, 100).unwrap();

        assert_eq!(ledger.balance_of(ALICE), 9_900);
        assert_eq!(ledger.balance_of(BOB), 100);
        assert_eq!(
            ledger.events()[0].event,
            Event::Ledger(LedgerEvent::Transfer {
                from: ALICE,
                to: BOB,
                amount: 100
            })
        );
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut ledger = ledger();
        let before = ledger.clone();

        let result = ledger.transfer(BOB, ALICE, 1);
        assert!(matches!(
            result,
            Err(AssetError::InsufficientBalance {
                account: BOB,
                available: 0,
                required: 1
            })
        ));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_transfer_to_self_keeps_balance() {
        let mut ledger = ledger();
        ledger.transfer(ALICE, ALICE, 500).unwrap();
        assert_eq!(ledger.balance_of(ALICE), 10_000);
    }

    #[test]
    fn test_approve_overwrites() {
        let mut ledger = ledger();
        ledger.approve(ALICE, BOB, 50);
        ledger.approve(ALICE, BOB, 20);
        assert_eq!(ledger.allowance(ALICE, BOB), 20);
        assert_eq!(ledger.allowance(BOB, ALICE), 0);
        assert_eq!(ledger.events().len(), 2);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut ledger = ledger();
        ledger.approve(ALICE, BOB, 300);
        ledger.transfer_from(BOB, ALICE, CAROL, 200).unwrap();

        assert_eq!(ledger.balance_of(ALICE), 9_800);
        assert_eq!(ledger.balance_of(CAROL), 200);
        assert_eq!(ledger.balance_of(BOB), 0);
        assert_eq!(ledger.allowance(ALICE, BOB), 100);
    }

    #[test]
    fn test_transfer_from_checks_balance_before_allowance() {
        let mut ledger = ledger();
        ledger.transfer(ALICE, BOB, 10).unwrap();

        // No allowance either, but the balance shortfall is reported.
        let result = ledger.transfer_from(CAROL, BOB, CAROL, 11);
        assert!(matches!(
            result,
            Err(AssetError::InsufficientBalance { account: BOB, .. })
        ));
    }

    #[test]
    fn test_transfer_from_insufficient_allowance_is_atomic() {
        let mut ledger = ledger();
        ledger.approve(ALICE, BOB, 50);
        let before = ledger.clone();

        let result = ledger.transfer_from(BOB, ALICE, CAROL, 100);
        assert!(matches!(
            result,
            Err(AssetError::InsufficientAllowance {
                remaining: 50,
                required: 100,
                ..
            })
        ));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_display_amount() {
        let ledger = Ledger::create("Token", "TKN", 10_000, 3, ALICE);
        assert_eq!(ledger.display_amount(1_500), Some(dec!(1.5)));
        assert_eq!(ledger.display_amount(0), Some(dec!(0)));

        let wide = Ledger::create("Token", "TKN", 10_000, 200, ALICE);
        assert_eq!(wide.display_amount(1), None);
    }
}
