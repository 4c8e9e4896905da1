//! Conservation-checked storage of real value
//!
//! An [`AssetStore`] holds value that actually exists, as opposed to the
//! documentary amounts carried by [`Asset`]. Value cannot be created or
//! destroyed through it; it can only be moved from one store to another:
//!
//! ```
//! use tnt_protocol::{Asset, AssetId, AssetStore};
//!
//! let mut source = AssetStore::unchecked_create(Asset::new(100, AssetId(0)));
//! let mut destination = AssetStore::new(AssetId(0));
//!
//! source.move_amount(40).to(&mut destination);
//! let split: AssetStore = source.move_amount(60).into();
//!
//! assert!(source.is_empty());
//! # destination.unchecked_destroy();
//! # let mut split = split;
//! # split.unchecked_destroy();
//! ```
//!
//! Dropping or overwriting a store that still holds value panics, unless the
//! store was serialized since it was last modified. The serialization
//! boundary is the only place value may legitimately appear or vanish, and
//! [`AssetStore::unchecked_create`] / [`AssetStore::unchecked_destroy`]
//! exist for it.
//!
//! Stores are deliberately neither `Clone` nor `Sync`.

use crate::asset::{Asset, ShareType};
use crate::types::AssetId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;

/// Store of real value of a single asset kind
pub struct AssetStore {
    stored: Asset,
    serialized: Cell<bool>,
}

impl AssetStore {
    /// Create an empty store for the given asset
    pub fn new(asset_id: AssetId) -> Self {
        Self {
            stored: Asset::new(0, asset_id),
            serialized: Cell::new(false),
        }
    }

    /// Create a store holding `storage` without checking where it came from
    pub fn unchecked_create(storage: Asset) -> Self {
        Self {
            stored: storage,
            serialized: Cell::new(false),
        }
    }

    /// Empty the store without a destination
    pub fn unchecked_destroy(&mut self) {
        self.stored.amount = 0;
    }

    /// Record that the current contents are persisted elsewhere
    ///
    /// Until the next modification the store may be dropped while non-empty.
    pub fn mark_serialized(&self) {
        self.serialized.set(true);
    }

    /// Stored asset
    pub fn stored_asset(&self) -> Asset {
        self.stored
    }

    /// Stored amount
    pub fn amount(&self) -> ShareType {
        self.stored.amount
    }

    /// Stored asset kind
    pub fn asset_type(&self) -> AssetId {
        self.stored.asset_id
    }

    /// Whether the store holds nothing
    pub fn is_empty(&self) -> bool {
        self.stored.amount == 0
    }

    /// Begin moving `amount` out of this store
    ///
    /// The returned [`Mover`] must be consumed: either sent to a destination
    /// with [`Mover::to`] or turned into a fresh store with `.into()`.
    pub fn move_amount(&mut self, amount: ShareType) -> Mover<'_> {
        Mover {
            source: self,
            amount,
        }
    }

    /// Move the entire contents to `destination`
    pub fn to<'d>(&mut self, destination: &'d mut AssetStore) -> &'d mut AssetStore {
        let amount = self.amount();
        self.to_amount(destination, amount)
    }

    /// Move `amount` to `destination`
    ///
    /// # Panics
    ///
    /// If `amount` is negative or exceeds the stored amount, or if the
    /// destination holds value of a different kind.
    pub fn to_amount<'d>(
        &mut self,
        destination: &'d mut AssetStore,
        amount: ShareType,
    ) -> &'d mut AssetStore {
        assert!(amount >= 0, "cannot move a negative amount ({})", amount);
        assert!(
            amount <= self.stored.amount,
            "insufficient value in store: requested {}, holding {}",
            amount,
            self.stored
        );
        if destination.is_empty() {
            destination.stored.asset_id = self.stored.asset_id;
        } else {
            assert_eq!(
                destination.stored.asset_id, self.stored.asset_id,
                "cannot move {} into a store holding {}",
                self.stored.asset_id, destination.stored
            );
        }

        self.stored.amount -= amount;
        destination.stored.amount += amount;
        self.serialized.set(false);
        destination.serialized.set(false);
        destination
    }

    fn check_conservation(&self) {
        if std::thread::panicking() {
            return;
        }
        assert!(
            self.stored.amount == 0 || self.serialized.get(),
            "BUG: asset store destroyed or overwritten with {} remaining inside",
            self.stored
        );
    }
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new(AssetId::default())
    }
}

impl Drop for AssetStore {
    fn drop(&mut self) {
        self.check_conservation();
    }
}

impl fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetStore")
            .field("stored", &self.stored)
            .field("serialized", &self.serialized.get())
            .finish()
    }
}

impl From<&AssetStore> for Asset {
    fn from(store: &AssetStore) -> Self {
        store.stored
    }
}

impl PartialEq for AssetStore {
    fn eq(&self, other: &Self) -> bool {
        self.stored == other.stored
    }
}

impl PartialOrd for AssetStore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.stored.partial_cmp(&other.stored)
    }
}

impl Serialize for AssetStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.serialized.set(true);
        self.stored.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AssetStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = Asset::deserialize(deserializer)?;
        Ok(Self {
            stored,
            serialized: Cell::new(true),
        })
    }
}

/// Single-use handle for value leaving a store
///
/// Bound to one source and one amount. Every consuming method takes `self`,
/// so the same withdrawal cannot be delivered twice.
#[must_use = "a mover does nothing until sent to a destination"]
pub struct Mover<'a> {
    source: &'a mut AssetStore,
    amount: ShareType,
}

impl<'a> Mover<'a> {
    /// Amount being moved
    pub fn amount(&self) -> ShareType {
        self.amount
    }

    /// Deliver to an existing store
    pub fn to<'d>(self, destination: &'d mut AssetStore) -> &'d mut AssetStore {
        self.source.to_amount(destination, self.amount)
    }

    /// Discard the moved amount explicitly
    pub fn unchecked_destroy(self) {
        let mut discarded: AssetStore = self.into();
        discarded.unchecked_destroy();
    }
}

impl<'a> From<Mover<'a>> for AssetStore {
    fn from(mover: Mover<'a>) -> Self {
        let mut result = AssetStore::new(mover.source.asset_type());
        mover.source.to_amount(&mut result, mover.amount);
        result
    }
}

impl fmt::Debug for Mover<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mover")
            .field("source", &self.source.stored)
            .field("amount", &self.amount)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE: AssetId = AssetId(0);
    const USD: AssetId = AssetId(1);

    fn drain(mut store: AssetStore) {
        store.unchecked_destroy();
    }

    #[test]
    fn test_move_between_stores() {
        let mut source = AssetStore::unchecked_create(Asset::new(100, CORE));
        let mut destination = AssetStore::new(CORE);

        source.move_amount(30).to(&mut destination);
        assert_eq!(source.amount(), 70);
        assert_eq!(destination.amount(), 30);

        let split: AssetStore = source.move_amount(70).into();
        assert!(source.is_empty());
        assert_eq!(split.stored_asset(), Asset::new(70, CORE));

        drain(destination);
        drain(split);
    }

    #[test]
    fn test_to_moves_everything() {
        let mut source = AssetStore::unchecked_create(Asset::new(12, USD));
        let mut destination = AssetStore::default();

        source.to(&mut destination);
        assert!(source.is_empty());
        assert_eq!(destination.asset_type(), USD);
        assert_eq!(destination.amount(), 12);

        drain(destination);
    }

    #[test]
    #[should_panic(expected = "insufficient value")]
    fn test_overdraw_panics() {
        let mut source = AssetStore::unchecked_create(Asset::new(5, CORE));
        let mut destination = AssetStore::new(CORE);
        source.move_amount(6).to(&mut destination);
    }

    #[test]
    #[should_panic(expected = "cannot move")]
    fn test_kind_mismatch_panics() {
        let mut source = AssetStore::unchecked_create(Asset::new(5, CORE));
        let mut destination = AssetStore::unchecked_create(Asset::new(5, USD));
        source.move_amount(1).to(&mut destination);
    }

    #[test]
    #[should_panic(expected = "BUG: asset store destroyed")]
    fn test_drop_non_empty_panics() {
        let _store = AssetStore::unchecked_create(Asset::new(1, CORE));
    }

    #[test]
    #[should_panic(expected = "BUG: asset store destroyed")]
    fn test_overwrite_non_empty_panics() {
        let mut store = AssetStore::unchecked_create(Asset::new(1, CORE));
        assert_eq!(store.amount(), 1);
        store = AssetStore::new(CORE);
        drop(store);
    }

    #[test]
    fn test_drop_after_unchecked_destroy() {
        let mut store = AssetStore::unchecked_create(Asset::new(1, CORE));
        store.unchecked_destroy();
    }

    #[test]
    fn test_mover_unchecked_destroy() {
        let mut store = AssetStore::unchecked_create(Asset::new(9, CORE));
        store.move_amount(9).unchecked_destroy();
        assert!(store.is_empty());
    }

    #[test]
    fn test_serialized_store_may_drop() {
        let store = AssetStore::unchecked_create(Asset::new(50, CORE));
        let bytes = bincode::serialize(&store).unwrap();
        drop(store);

        let restored: AssetStore = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored.stored_asset(), Asset::new(50, CORE));
    }

    #[test]
    #[should_panic(expected = "BUG: asset store destroyed")]
    fn test_modification_clears_serialized_flag() {
        let mut store = AssetStore::unchecked_create(Asset::new(50, CORE));
        store.mark_serialized();
        let mut other = AssetStore::new(CORE);
        store.move_amount(10).to(&mut other);
        other.unchecked_destroy();
        drop(store);
    }
}
