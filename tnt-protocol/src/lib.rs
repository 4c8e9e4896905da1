//! TNT Protocol
//!
//! Value routing and authorization primitives for tank/tap networks.
//!
//! # Architecture
//!
//! - **Asset Stores**: Real value that can only be moved, never created or lost
//! - **Sinks**: Typed references to where value goes next
//! - **Resolver**: Follows attachment sinks to a terminal account or tank
//! - **Restrictions**: Declarative policies compiled into operation predicates
//!
//! # Invariants
//!
//! - Value conservation: a non-empty store is never dropped unless serialized
//! - Every sink in a resolved chain receives the required asset
//! - Restriction trees are type-checked once, at compile time

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod asset;
pub mod asset_store;
pub mod error;
pub mod lookups;
pub mod operations;
pub mod predicate;
pub mod reflect;
pub mod restriction;
pub mod tank;
pub mod types;

// Re-exports
pub use asset::{Asset, Price, ShareType, MAX_PRECISION, MAX_SHARE_SUPPLY};
pub use asset_store::{AssetStore, Mover};
pub use error::{
    AssetLookupError, BadSink, BadSinkReason, IndexExhausted, LookupError, ObjectId, RestrictionError,
    SinkChainError, SinkLookupError,
};
pub use lookups::{LookupUtilities, SinkAsset, SinkChain};
pub use operations::{
    AccountFundSinkOperation, Operation, OperationTag, TankCreateOperation,
    TankDeleteOperation, TankUpdateOperation, TapConnectOperation, TapOpenOperation,
    TransferOperation,
};
pub use predicate::{get_restriction_predicate, RestrictionPredicate};
pub use restriction::{Argument, Restriction, RestrictionFunction};
pub use tank::{
    AssetFlowMeter, AttachmentConnectAuthority, DepositSourceRestrictor, Tap, TankAttachment,
    TankSchematic, TapOpener, TapRequirement,
};
pub use types::{AccountId, AssetId, AttachmentId, IndexType, Sink, TankId, TapId};
