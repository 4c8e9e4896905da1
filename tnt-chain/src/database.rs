//! In-memory object database
//!
//! Holds account balances, tanks and custom authorities. Balances and tank
//! contents are [`AssetStore`]s, so value can only enter the database
//! through [`Database::import_balance`] and only leave it by being moved
//! between stores.

use crate::authority::AuthorityRegistry;
use crate::object::TankObject;
use std::collections::BTreeMap;
use tnt_protocol::{AccountId, Asset, AssetId, AssetStore, TankId, TankSchematic};
use tracing::debug;

/// Chain state
#[derive(Debug)]
pub struct Database {
    balances: BTreeMap<(AccountId, AssetId), AssetStore>,
    tanks: BTreeMap<TankId, TankObject>,
    authorities: AuthorityRegistry,
    next_tank_id: u64,
}

impl Database {
    /// Empty database
    pub fn new(max_restriction_count: usize) -> Self {
        Self {
            balances: BTreeMap::new(),
            tanks: BTreeMap::new(),
            authorities: AuthorityRegistry::new(max_restriction_count),
            next_tank_id: 1,
        }
    }

    /// Credit an account with value created outside the chain, such as genesis funds
    pub fn import_balance(&mut self, account: AccountId, amount: Asset) {
        let mut imported = AssetStore::unchecked_create(amount);
        imported.to(self.balance_store_mut(account, amount.asset_id));
        debug!(%account, %amount, "Balance imported");
    }

    /// Balance of `account` in `asset_id`
    pub fn balance(&self, account: AccountId, asset_id: AssetId) -> Asset {
        self.balances
            .get(&(account, asset_id))
            .map_or(Asset::new(0, asset_id), AssetStore::stored_asset)
    }

    /// Move `amount` out of an account into a fresh store
    ///
    /// # Panics
    ///
    /// If the account holds less than `amount`; evaluators check first.
    pub fn withdraw(&mut self, account: AccountId, amount: Asset) -> AssetStore {
        self.balance_store_mut(account, amount.asset_id)
            .move_amount(amount.amount)
            .into()
    }

    /// Move the entire contents of `store` into an account
    pub fn deposit(&mut self, account: AccountId, mut store: AssetStore) {
        let asset_id = store.asset_type();
        store.to(self.balance_store_mut(account, asset_id));
    }

    fn balance_store_mut(&mut self, account: AccountId, asset_id: AssetId) -> &mut AssetStore {
        self.balances
            .entry((account, asset_id))
            .or_insert_with(|| AssetStore::new(asset_id))
    }

    /// Tank by id
    pub fn tank(&self, id: TankId) -> Option<&TankObject> {
        self.tanks.get(&id)
    }

    /// Mutable tank by id
    pub fn tank_mut(&mut self, id: TankId) -> Option<&mut TankObject> {
        self.tanks.get_mut(&id)
    }

    /// Schematic of a tank, for sink lookups
    pub fn tank_schematic(&self, id: TankId) -> Option<&TankSchematic> {
        self.tanks.get(&id).map(|tank| &tank.schematic)
    }

    /// All tanks in id order
    pub fn tanks(&self) -> impl Iterator<Item = &TankObject> {
        self.tanks.values()
    }

    /// Id the next created tank will receive
    pub fn next_tank_id(&self) -> TankId {
        TankId(self.next_tank_id)
    }

    /// Store a new tank under the next id
    pub fn insert_tank(
        &mut self,
        owner: AccountId,
        schematic: TankSchematic,
        deposit: AssetStore,
    ) -> TankId {
        let id = self.next_tank_id();
        self.next_tank_id += 1;
        self.tanks
            .insert(id, TankObject::new(id, owner, schematic, deposit));
        id
    }

    /// Take a tank out of the database; its stores must be emptied by the caller
    pub fn remove_tank(&mut self, id: TankId) -> Option<TankObject> {
        self.tanks.remove(&id)
    }

    /// Custom authorities
    pub fn authorities(&self) -> &AuthorityRegistry {
        &self.authorities
    }

    /// Mutable custom authorities
    pub fn authorities_mut(&mut self) -> &mut AuthorityRegistry {
        &mut self.authorities
    }
}

impl Drop for Database {
    // Discarding the whole database is a persistence boundary, not a loss of value
    fn drop(&mut self) {
        for store in self.balances.values() {
            store.mark_serialized();
        }
        for tank in self.tanks.values() {
            tank.balance.mark_serialized();
            tank.deposit.mark_serialized();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE: AssetId = AssetId(0);

    #[test]
    fn test_import_and_move() {
        let mut db = Database::new(16);
        db.import_balance(AccountId(1), Asset::new(100, CORE));

        let moved = db.withdraw(AccountId(1), Asset::new(40, CORE));
        db.deposit(AccountId(2), moved);

        assert_eq!(db.balance(AccountId(1), CORE), Asset::new(60, CORE));
        assert_eq!(db.balance(AccountId(2), CORE), Asset::new(40, CORE));
        assert_eq!(db.balance(AccountId(3), CORE), Asset::new(0, CORE));
    }

    #[test]
    #[should_panic(expected = "insufficient value")]
    fn test_overdraw_panics() {
        let mut db = Database::new(16);
        db.import_balance(AccountId(1), Asset::new(10, CORE));
        let _ = db.withdraw(AccountId(1), Asset::new(11, CORE));
    }

    #[test]
    fn test_tank_ids_are_sequential() {
        let mut db = Database::new(16);
        let first = db.insert_tank(AccountId(1), TankSchematic::new(CORE), AssetStore::new(CORE));
        let second = db.insert_tank(AccountId(1), TankSchematic::new(CORE), AssetStore::new(CORE));

        assert_eq!(first, TankId(1));
        assert_eq!(second, TankId(2));
        assert_eq!(db.next_tank_id(), TankId(3));
        assert!(db.tank_schematic(first).is_some());

        assert!(db.remove_tank(first).is_some());
        assert!(db.tank(first).is_none());
        assert_eq!(db.tanks().count(), 1);
    }

    #[test]
    fn test_drop_with_funds_is_allowed() {
        let mut db = Database::new(16);
        db.import_balance(AccountId(1), Asset::new(10, CORE));
        let deposit = db.withdraw(AccountId(1), Asset::new(5, CORE));
        db.insert_tank(AccountId(1), TankSchematic::new(CORE), deposit);
        drop(db);
    }
}
