//! Error types for sink resolution and restriction compilation
//!
//! Resolution errors form a ladder of closed enums. Each deeper lookup's
//! error converts into the wider error of its caller through an exhaustive
//! `From` impl, so a missing object three hops down still surfaces as
//! `NotFound` at the top.

use crate::types::{AttachmentId, Sink, TankId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier of an object that failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectId {
    /// A tank
    Tank(TankId),
    /// An attachment
    Attachment(AttachmentId),
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectId::Tank(id) => write!(f, "{}", id),
            ObjectId::Attachment(id) => write!(f, "{}", id),
        }
    }
}

/// Why a sink was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadSinkReason {
    /// The sink accepts a different asset than required
    ReceivesWrongAsset,
    /// The sink accepts no asset, or has nowhere to send it
    ReceivesNoAsset,
}

impl fmt::Display for BadSinkReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadSinkReason::ReceivesWrongAsset => write!(f, "receives wrong asset"),
            BadSinkReason::ReceivesNoAsset => write!(f, "receives no asset"),
        }
    }
}

/// A sink that cannot take part in a flow
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("Bad sink {sink}: {reason}")]
pub struct BadSink {
    /// Rejection reason
    pub reason: BadSinkReason,
    /// Offending sink
    pub sink: Sink,
}

impl BadSink {
    /// Sink accepting a different asset than required
    pub fn receives_wrong_asset(sink: Sink) -> Self {
        Self {
            reason: BadSinkReason::ReceivesWrongAsset,
            sink,
        }
    }

    /// Sink accepting no asset or forwarding nowhere
    pub fn receives_no_asset(sink: Sink) -> Self {
        Self {
            reason: BadSinkReason::ReceivesNoAsset,
            sink,
        }
    }
}

/// A tank has handed out every tap or attachment index
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Tank has no free {kind} index left")]
pub struct IndexExhausted {
    /// `"tap"` or `"attachment"`
    pub kind: &'static str,
}

/// Failure to look up a tank or attachment
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    /// Resolution left the current tank but no lookup function was supplied
    #[error("A tank lookup function is required but was not supplied")]
    NeedLookupFn,

    /// The referenced object does not exist
    #[error("Object does not exist: {0}")]
    NotFound(ObjectId),
}

/// Failure to determine the asset a sink or attachment receives
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetLookupError {
    /// Resolution left the current tank but no lookup function was supplied
    #[error("A tank lookup function is required but was not supplied")]
    NeedLookupFn,

    /// The referenced object does not exist
    #[error("Object does not exist: {0}")]
    NotFound(ObjectId),

    /// The attachment has no fixed receiving asset
    #[error("Attachment {0} receives no fixed asset")]
    NoAsset(AttachmentId),
}

impl From<LookupError> for AssetLookupError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NeedLookupFn => AssetLookupError::NeedLookupFn,
            LookupError::NotFound(id) => AssetLookupError::NotFound(id),
        }
    }
}

/// Failure to find the sink an attachment forwards to
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkLookupError {
    /// Resolution left the current tank but no lookup function was supplied
    #[error("A tank lookup function is required but was not supplied")]
    NeedLookupFn,

    /// The referenced object does not exist
    #[error("Object does not exist: {0}")]
    NotFound(ObjectId),

    /// The attachment has no output sink
    #[error(transparent)]
    BadSink(#[from] BadSink),
}

impl From<LookupError> for SinkLookupError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NeedLookupFn => SinkLookupError::NeedLookupFn,
            LookupError::NotFound(id) => SinkLookupError::NotFound(id),
        }
    }
}

/// Failure to resolve a full sink chain
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkChainError {
    /// Resolution left the current tank but no lookup function was supplied
    #[error("A tank lookup function is required but was not supplied")]
    NeedLookupFn,

    /// The referenced object does not exist
    #[error("Object does not exist: {0}")]
    NotFound(ObjectId),

    /// A sink in the chain is unusable
    #[error(transparent)]
    BadSink(#[from] BadSink),

    /// The chain did not terminate within the allowed length
    #[error("Sink chain exceeded maximum length of {max_chain_length}")]
    ExceededMaxLength {
        /// Configured ceiling
        max_chain_length: usize,
    },
}

impl From<LookupError> for SinkChainError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NeedLookupFn => SinkChainError::NeedLookupFn,
            LookupError::NotFound(id) => SinkChainError::NotFound(id),
        }
    }
}

impl From<SinkLookupError> for SinkChainError {
    fn from(err: SinkLookupError) -> Self {
        match err {
            SinkLookupError::NeedLookupFn => SinkChainError::NeedLookupFn,
            SinkLookupError::NotFound(id) => SinkChainError::NotFound(id),
            SinkLookupError::BadSink(bad) => SinkChainError::BadSink(bad),
        }
    }
}

/// Restriction tree that cannot be compiled against its operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestrictionError {
    /// The named field does not exist on the object
    #[error("Unknown field `{field}` on {object}")]
    UnknownField {
        /// Object being restricted
        object: &'static str,
        /// Requested field
        field: String,
    },

    /// The function is not defined for the field's type
    #[error("Function {function} is not supported on field `{field}` of type {field_type}")]
    UnsupportedFunction {
        /// Restricted field
        field: String,
        /// Requested function
        function: String,
        /// Field's type
        field_type: String,
    },

    /// The argument does not fit the field and function
    #[error("Argument for {function} on `{field}` must be {expected}, found {found}")]
    ArgumentMismatch {
        /// Restricted field
        field: String,
        /// Requested function
        function: String,
        /// Expected argument shape
        expected: String,
        /// Supplied argument shape
        found: String,
    },

    /// A nested field path does not lead anywhere
    #[error("Malformed field path at `{field}`: {reason}")]
    MalformedPath {
        /// Field where the path breaks
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_survives_widening() {
        let id = ObjectId::Tank(TankId(7));
        let narrow = LookupError::NotFound(id);

        let sink: SinkLookupError = narrow.into();
        assert_eq!(sink, SinkLookupError::NotFound(id));

        let chain: SinkChainError = sink.into();
        assert_eq!(chain, SinkChainError::NotFound(id));

        let asset: AssetLookupError = narrow.into();
        assert_eq!(asset, AssetLookupError::NotFound(id));
    }

    #[test]
    fn test_bad_sink_display() {
        let bad = BadSink::receives_no_asset(Sink::Tank(TankId(3)));
        assert_eq!(bad.to_string(), "Bad sink tank:3: receives no asset");

        let chain: SinkChainError = bad.into();
        assert_eq!(chain.to_string(), "Bad sink tank:3: receives no asset");
    }
}
