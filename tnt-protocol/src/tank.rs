//! Tank schematics: taps, attachments and their configuration
//!
//! The attachment set is closed. Each variant answers two questions for the
//! resolver: which asset it receives, if that is fixed, and which sink it
//! forwards to, if any.

use crate::asset::ShareType;
use crate::error::IndexExhausted;
use crate::operations::{TankCreateOperation, TankUpdateOperation};
use crate::types::{AccountId, AssetId, IndexType, Sink};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Meters value flowing through it on its way to a destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFlowMeter {
    /// Asset the meter accepts
    pub asset_type: AssetId,
    /// Where metered value continues
    pub destination_sink: Sink,
    /// Account allowed to reset the meter
    #[serde(default)]
    pub reset_authority: Option<AccountId>,
}

/// Limits which sources may deposit into the tank
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositSourceRestrictor {
    /// Sources allowed to deposit
    pub legal_deposit_sources: Vec<Sink>,
}

/// Opens a tap on the tank when it receives value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapOpener {
    /// Tap to open
    pub tap_index: IndexType,
    /// Amount released when triggered
    pub release_amount: ShareType,
    /// Where the triggering value continues
    pub destination_sink: Sink,
    /// Asset the opener accepts
    pub asset_type: AssetId,
}

/// Grants an account the right to connect an attachment's output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentConnectAuthority {
    /// Account holding the right
    pub connect_authority: AccountId,
    /// Attachment it applies to
    pub attachment_id: IndexType,
}

/// Tank attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TankAttachment {
    /// Flow meter
    AssetFlowMeter(AssetFlowMeter),
    /// Deposit source restrictor
    DepositSourceRestrictor(DepositSourceRestrictor),
    /// Tap opener
    TapOpener(TapOpener),
    /// Connect authority
    AttachmentConnectAuthority(AttachmentConnectAuthority),
}

impl TankAttachment {
    /// Asset this attachment accepts, if fixed
    pub fn receives_asset(&self) -> Option<AssetId> {
        match self {
            TankAttachment::AssetFlowMeter(meter) => Some(meter.asset_type),
            TankAttachment::DepositSourceRestrictor(_) => None,
            TankAttachment::TapOpener(opener) => Some(opener.asset_type),
            TankAttachment::AttachmentConnectAuthority(_) => None,
        }
    }

    /// Sink this attachment forwards to, if any
    pub fn output_sink(&self) -> Option<&Sink> {
        match self {
            TankAttachment::AssetFlowMeter(meter) => Some(&meter.destination_sink),
            TankAttachment::DepositSourceRestrictor(_) => None,
            TankAttachment::TapOpener(opener) => Some(&opener.destination_sink),
            TankAttachment::AttachmentConnectAuthority(_) => None,
        }
    }

    /// Variant name, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            TankAttachment::AssetFlowMeter(_) => "asset_flow_meter",
            TankAttachment::DepositSourceRestrictor(_) => "deposit_source_restrictor",
            TankAttachment::TapOpener(_) => "tap_opener",
            TankAttachment::AttachmentConnectAuthority(_) => "attachment_connect_authority",
        }
    }
}

/// Condition that must hold for a tap to release value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapRequirement {
    /// At most `limit` per opening
    ImmediateFlowLimit {
        /// Maximum release per opening
        limit: ShareType,
    },
    /// At most `limit` over the tap's lifetime
    CumulativeFlowLimit {
        /// Maximum total release
        limit: ShareType,
    },
}

impl TapRequirement {
    /// Whether the requirement keeps state between openings
    pub fn is_stateful(&self) -> bool {
        matches!(self, TapRequirement::CumulativeFlowLimit { .. })
    }
}

/// Outlet releasing value from a tank to a sink
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tap {
    /// Where released value goes; a disconnected tap cannot be opened
    #[serde(default)]
    pub connected_sink: Option<Sink>,
    /// Account allowed to open the tap; the tank owner when absent
    #[serde(default)]
    pub open_authority: Option<AccountId>,
    /// Account allowed to reconnect the tap; the tank owner when absent
    #[serde(default)]
    pub connect_authority: Option<AccountId>,
    /// Conditions gating each opening
    #[serde(default)]
    pub requirements: Vec<TapRequirement>,
}

/// Full configuration of a tank
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TankSchematic {
    /// Taps by index
    #[serde(default)]
    pub taps: BTreeMap<IndexType, Tap>,
    /// Attachments by index
    #[serde(default)]
    pub attachments: BTreeMap<IndexType, TankAttachment>,
    /// Asset held by the tank
    pub asset_type: AssetId,
    /// Next tap index to hand out
    #[serde(default)]
    pub tap_counter: IndexType,
    /// Next attachment index to hand out
    #[serde(default)]
    pub attachment_counter: IndexType,
}

impl TankSchematic {
    /// Empty schematic for the given asset
    pub fn new(asset_type: AssetId) -> Self {
        Self {
            asset_type,
            ..Self::default()
        }
    }

    /// Schematic described by a create operation
    pub fn from_create_operation(op: &TankCreateOperation) -> Result<Self, IndexExhausted> {
        let mut schematic = Self::new(op.contained_asset);
        for tap in &op.taps {
            schematic.add_tap(tap.clone())?;
        }
        for attachment in &op.attachments {
            schematic.add_attachment(attachment.clone())?;
        }
        Ok(schematic)
    }

    /// Apply the removals, replacements and additions of an update operation
    ///
    /// Indices that do not exist are ignored; evaluators reject them first.
    /// On error the schematic is partially updated and must be discarded.
    pub fn update_from_operation(&mut self, op: &TankUpdateOperation) -> Result<(), IndexExhausted> {
        for index in &op.taps_to_remove {
            self.taps.remove(index);
        }
        for (index, tap) in &op.taps_to_replace {
            if let Some(existing) = self.taps.get_mut(index) {
                *existing = tap.clone();
            }
        }
        for tap in &op.taps_to_add {
            self.add_tap(tap.clone())?;
        }

        for index in &op.attachments_to_remove {
            self.attachments.remove(index);
        }
        for (index, attachment) in &op.attachments_to_replace {
            if let Some(existing) = self.attachments.get_mut(index) {
                *existing = attachment.clone();
            }
        }
        for attachment in &op.attachments_to_add {
            self.add_attachment(attachment.clone())?;
        }
        Ok(())
    }

    /// Add a tap under the next free index
    ///
    /// Indices are never reused, so a tank can hand out at most
    /// `IndexType::MAX` of them over its lifetime.
    pub fn add_tap(&mut self, tap: Tap) -> Result<IndexType, IndexExhausted> {
        let index = self.tap_counter;
        self.tap_counter = index
            .checked_add(1)
            .ok_or(IndexExhausted { kind: "tap" })?;
        self.taps.insert(index, tap);
        Ok(index)
    }

    /// Add an attachment under the next free index
    pub fn add_attachment(&mut self, attachment: TankAttachment) -> Result<IndexType, IndexExhausted> {
        let index = self.attachment_counter;
        self.attachment_counter = index
            .checked_add(1)
            .ok_or(IndexExhausted { kind: "attachment" })?;
        self.attachments.insert(index, attachment);
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttachmentId, TankId};

    fn meter(asset: u64, sink: Sink) -> TankAttachment {
        TankAttachment::AssetFlowMeter(AssetFlowMeter {
            asset_type: AssetId(asset),
            destination_sink: sink,
            reset_authority: None,
        })
    }

    #[test]
    fn test_attachment_queries() {
        let flow = meter(3, Sink::Account(AccountId(1)));
        assert_eq!(flow.receives_asset(), Some(AssetId(3)));
        assert_eq!(flow.output_sink(), Some(&Sink::Account(AccountId(1))));

        let restrictor = TankAttachment::DepositSourceRestrictor(DepositSourceRestrictor::default());
        assert_eq!(restrictor.receives_asset(), None);
        assert_eq!(restrictor.output_sink(), None);

        let opener = TankAttachment::TapOpener(TapOpener {
            tap_index: 0,
            release_amount: 10,
            destination_sink: Sink::Tank(TankId(4)),
            asset_type: AssetId(2),
        });
        assert_eq!(opener.receives_asset(), Some(AssetId(2)));
        assert_eq!(opener.output_sink(), Some(&Sink::Tank(TankId(4))));

        let authority = TankAttachment::AttachmentConnectAuthority(AttachmentConnectAuthority {
            connect_authority: AccountId(1),
            attachment_id: 0,
        });
        assert_eq!(authority.receives_asset(), None);
        assert_eq!(authority.output_sink(), None);
        assert_eq!(authority.kind(), "attachment_connect_authority");
    }

    #[test]
    fn test_update_keeps_indices_stable() {
        let mut schematic = TankSchematic::new(AssetId(0));
        schematic.add_tap(Tap::default()).unwrap();
        schematic.add_tap(Tap::default()).unwrap();
        schematic.add_attachment(meter(0, Sink::SameTank)).unwrap();

        let op = TankUpdateOperation {
            taps_to_remove: [1].into_iter().collect(),
            taps_to_add: vec![Tap {
                connected_sink: Some(Sink::Attachment(AttachmentId::local(0))),
                ..Tap::default()
            }],
            ..TankUpdateOperation::default()
        };
        schematic.update_from_operation(&op).unwrap();

        // Removed indices are never reused
        assert_eq!(schematic.taps.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(schematic.tap_counter, 3);
        assert_eq!(schematic.attachments.len(), 1);
    }

    #[test]
    fn test_exhausted_indices_are_not_reused() {
        let mut schematic = TankSchematic::new(AssetId(0));
        schematic.add_tap(Tap::default()).unwrap();
        schematic.tap_counter = IndexType::MAX - 1;

        assert_eq!(schematic.add_tap(Tap::default()), Ok(IndexType::MAX - 1));
        assert_eq!(
            schematic.add_tap(Tap::default()),
            Err(IndexExhausted { kind: "tap" })
        );
        assert_eq!(schematic.taps.len(), 2);
        assert_eq!(schematic.taps[&0], Tap::default());

        schematic.attachment_counter = IndexType::MAX;
        assert!(schematic.add_attachment(meter(0, Sink::SameTank)).is_err());
        assert!(schematic.attachments.is_empty());

        let op = TankUpdateOperation {
            taps_to_add: vec![Tap::default()],
            ..TankUpdateOperation::default()
        };
        assert!(schematic.update_from_operation(&op).is_err());
    }
}
