//! Tank objects as stored by the chain

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tnt_protocol::{AccountId, AssetId, AssetStore, IndexType, ShareType, Tap, TankId, TankSchematic};

/// State kept by a stateful tap requirement between openings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementState {
    /// Running total for a cumulative flow limit
    CumulativeFlow {
        /// Amount released so far
        amount_released: ShareType,
    },
}

/// A tank and the value it holds
#[derive(Debug)]
pub struct TankObject {
    /// Tank id
    pub id: TankId,
    /// Account that created the tank
    pub owner: AccountId,
    /// Taps and attachments
    pub schematic: TankSchematic,
    /// Value held by the tank
    pub balance: AssetStore,
    /// Core asset escrowed by the owner
    pub deposit: AssetStore,
    /// Requirement state keyed by (tap index, requirement index)
    pub requirement_states: BTreeMap<(IndexType, IndexType), RequirementState>,
}

impl TankObject {
    /// Empty tank holding `deposit` in escrow
    pub fn new(id: TankId, owner: AccountId, schematic: TankSchematic, deposit: AssetStore) -> Self {
        let balance = AssetStore::new(schematic.asset_type);
        Self {
            id,
            owner,
            schematic,
            balance,
            deposit,
            requirement_states: BTreeMap::new(),
        }
    }

    /// Asset held by the tank
    pub fn asset_type(&self) -> AssetId {
        self.schematic.asset_type
    }

    /// Tap at `index`
    pub fn tap(&self, index: IndexType) -> Option<&Tap> {
        self.schematic.taps.get(&index)
    }

    /// Amount released so far under a cumulative requirement
    pub fn amount_released(&self, tap: IndexType, requirement: IndexType) -> ShareType {
        match self.requirement_states.get(&(tap, requirement)) {
            Some(RequirementState::CumulativeFlow { amount_released }) => *amount_released,
            None => 0,
        }
    }

    /// Add to the running total of a cumulative requirement
    pub fn record_release(&mut self, tap: IndexType, requirement: IndexType, amount: ShareType) {
        let state = self
            .requirement_states
            .entry((tap, requirement))
            .or_insert(RequirementState::CumulativeFlow { amount_released: 0 });
        match state {
            RequirementState::CumulativeFlow { amount_released } => *amount_released += amount,
        }
    }

    /// Forget all requirement state of a tap
    pub fn clear_tap_state(&mut self, tap: IndexType) {
        let stale: Vec<_> = self
            .requirement_states
            .range((tap, 0)..=(tap, IndexType::MAX))
            .map(|(key, _)| *key)
            .collect();
        for key in stale {
            self.requirement_states.remove(&key);
        }
    }
}
