//! Sink resolution
//!
//! [`LookupUtilities`] answers questions about sinks relative to a tank under
//! evaluation: what asset a sink receives, where an attachment forwards, and
//! which terminal destination a sink ultimately reaches.
//!
//! Tanks other than the current one are only reachable through a caller
//! supplied lookup function. Its absence is reported as `NeedLookupFn`,
//! distinct from a lookup that finds nothing.
//!
//! # Sink chains
//!
//! [`LookupUtilities::get_sink_chain`] follows attachments until it reaches
//! an account or tank. Every sink added to the chain is checked against the
//! required asset as soon as it is resolved, so an incompatible hop is
//! reported at the point of divergence. Cycles are bounded by the caller's
//! maximum chain length rather than a visited set.

use crate::error::{
    AssetLookupError, BadSink, LookupError, ObjectId, SinkChainError, SinkLookupError,
};
use crate::tank::{TankAttachment, TankSchematic};
use crate::types::{AssetId, AttachmentId, Sink, TankId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Asset a sink is willing to receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkAsset {
    /// Any asset
    Any,
    /// Only the given asset
    Fixed(AssetId),
}

/// Resolved path from a starting sink to its terminal destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkChain {
    /// Sinks in resolution order; the first is the starting sink
    pub sinks: Vec<Sink>,
    /// Tank context when resolution finished; `None` is the current tank
    pub final_sink_tank: Option<TankId>,
}

impl SinkChain {
    fn new(start: Sink) -> Self {
        Self {
            sinks: vec![start],
            final_sink_tank: None,
        }
    }

    /// Number of sinks in the chain
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Chains always hold at least the starting sink
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Last sink reached
    pub fn terminal(&self) -> Option<&Sink> {
        self.sinks.last()
    }
}

impl fmt::Display for SinkChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sink) in self.sinks.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", sink)?;
        }
        Ok(())
    }
}

type TankLookupFn<'a> = dyn Fn(TankId) -> Option<&'a TankSchematic> + 'a;

/// Lookups relative to a tank under evaluation
pub struct LookupUtilities<'a> {
    current_tank: &'a TankSchematic,
    get_tank: Option<Box<TankLookupFn<'a>>>,
}

impl<'a> LookupUtilities<'a> {
    /// Lookups confined to `current_tank`
    pub fn new(current_tank: &'a TankSchematic) -> Self {
        Self {
            current_tank,
            get_tank: None,
        }
    }

    /// Allow lookups to reach other tanks through `get_tank`
    pub fn with_lookup<F>(mut self, get_tank: F) -> Self
    where
        F: Fn(TankId) -> Option<&'a TankSchematic> + 'a,
    {
        self.get_tank = Some(Box::new(get_tank));
        self
    }

    /// The tank under evaluation
    pub fn current_tank(&self) -> &'a TankSchematic {
        self.current_tank
    }

    /// Look up a tank; `None` is the current tank
    pub fn lookup_tank(&self, id: Option<TankId>) -> Result<&'a TankSchematic, LookupError> {
        let Some(id) = id else {
            return Ok(self.current_tank);
        };
        let get_tank = self.get_tank.as_ref().ok_or(LookupError::NeedLookupFn)?;
        get_tank(id).ok_or(LookupError::NotFound(ObjectId::Tank(id)))
    }

    /// Look up an attachment within its tank
    pub fn lookup_attachment(&self, id: &AttachmentId) -> Result<&'a TankAttachment, LookupError> {
        let tank = self.lookup_tank(id.tank_id)?;
        tank.attachments
            .get(&id.attachment_id)
            .ok_or(LookupError::NotFound(ObjectId::Attachment(*id)))
    }

    /// Asset an attachment receives
    pub fn get_attachment_asset(&self, id: &AttachmentId) -> Result<AssetId, AssetLookupError> {
        let attachment = self.lookup_attachment(id)?;
        attachment
            .receives_asset()
            .ok_or(AssetLookupError::NoAsset(*id))
    }

    /// Sink an attachment forwards to
    pub fn get_attachment_sink(&self, id: &AttachmentId) -> Result<&'a Sink, SinkLookupError> {
        let attachment = self.lookup_attachment(id)?;
        attachment
            .output_sink()
            .ok_or_else(|| BadSink::receives_no_asset(Sink::Attachment(*id)).into())
    }

    /// Asset a sink receives
    pub fn get_sink_asset(&self, sink: &Sink) -> Result<SinkAsset, AssetLookupError> {
        match sink {
            Sink::SameTank => Ok(SinkAsset::Fixed(self.current_tank.asset_type)),
            Sink::Account(_) => Ok(SinkAsset::Any),
            Sink::Tank(id) => Ok(SinkAsset::Fixed(self.lookup_tank(Some(*id))?.asset_type)),
            Sink::Attachment(id) => self.get_attachment_asset(id).map(SinkAsset::Fixed),
        }
    }

    /// Resolve `start` to its terminal destination
    ///
    /// Fails with `ExceededMaxLength` once the chain holds more than
    /// `max_chain_length` sinks without terminating. When `asset_type` is
    /// given, every sink in the chain must be able to receive it; sinks
    /// whose asset cannot be determined without a lookup function are let
    /// through.
    pub fn get_sink_chain(
        &self,
        start: &Sink,
        max_chain_length: usize,
        asset_type: Option<AssetId>,
    ) -> Result<SinkChain, SinkChainError> {
        self.check_sink_asset(start, None, asset_type)?;

        let mut chain = SinkChain::new(*start);
        let mut current = *start;
        while let Some(next) = self.next_hop(current, &mut chain, max_chain_length)? {
            self.check_sink_asset(&next, chain.final_sink_tank, asset_type)?;
            trace!(hop = chain.len(), sink = %next, "Resolved sink hop");
            chain.sinks.push(next);
            current = next;
        }

        Ok(chain)
    }

    /// Resolve one hop, updating the chain's tank context
    ///
    /// Returns `None` once `current` needs no further resolution.
    fn next_hop(
        &self,
        current: Sink,
        chain: &mut SinkChain,
        max_chain_length: usize,
    ) -> Result<Option<Sink>, SinkChainError> {
        match current {
            Sink::Account(_) | Sink::Tank(_) => return Ok(None),
            // The tank under evaluation has no id to resolve to
            Sink::SameTank if chain.final_sink_tank.is_none() => return Ok(None),
            Sink::SameTank | Sink::Attachment(_) => {}
        }

        if chain.len() > max_chain_length {
            return Err(SinkChainError::ExceededMaxLength { max_chain_length });
        }

        match current {
            Sink::Attachment(mut id) => {
                match id.tank_id {
                    Some(tank) => chain.final_sink_tank = Some(tank),
                    None => id.tank_id = chain.final_sink_tank,
                }
                Ok(Some(*self.get_attachment_sink(&id)?))
            }
            other => Ok(Some(other.in_context(chain.final_sink_tank))),
        }
    }

    fn check_sink_asset(
        &self,
        sink: &Sink,
        context: Option<TankId>,
        required: Option<AssetId>,
    ) -> Result<(), SinkChainError> {
        let Some(required) = required else {
            return Ok(());
        };
        let sink = sink.in_context(context);
        match self.get_sink_asset(&sink) {
            Ok(SinkAsset::Any) | Err(AssetLookupError::NeedLookupFn) => Ok(()),
            Ok(SinkAsset::Fixed(asset)) if asset == required => Ok(()),
            Ok(SinkAsset::Fixed(_)) => Err(BadSink::receives_wrong_asset(sink).into()),
            Err(AssetLookupError::NoAsset(_)) => Err(BadSink::receives_no_asset(sink).into()),
            Err(AssetLookupError::NotFound(id)) => Err(SinkChainError::NotFound(id)),
        }
    }
}

impl fmt::Debug for LookupUtilities<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupUtilities")
            .field("current_tank", &self.current_tank)
            .field("has_lookup", &self.get_tank.is_some())
            .finish()
    }
}
