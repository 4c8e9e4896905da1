//! Error types for the chain evaluators

use thiserror::Error;
use tnt_protocol::{
    AccountId, Asset, IndexExhausted, RestrictionError, SinkChainError, TankId, TapId,
};

/// Result type for chain operations
pub type Result<T> = std::result::Result<T, Error>;

/// Chain errors
#[derive(Error, Debug)]
pub enum Error {
    /// A sink in a tank schematic or operation failed to resolve
    #[error("Invalid sink: {0}")]
    Sink(#[from] SinkChainError),

    /// A custom authority's restrictions failed to compile
    #[error("Invalid restriction: {0}")]
    Restriction(#[from] RestrictionError),

    /// Tank ran out of tap or attachment indices
    #[error("Invalid schematic: {0}")]
    IndexExhausted(#[from] IndexExhausted),

    /// Signer may not act for the fee payer
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Tank does not exist
    #[error("Tank not found: {0}")]
    TankNotFound(TankId),

    /// Tap does not exist
    #[error("Tap not found: {0}")]
    TapNotFound(TapId),

    /// Account cannot cover an amount
    #[error("Insufficient balance: {account} needs {required}, holds {available}")]
    InsufficientBalance {
        /// Paying account
        account: AccountId,
        /// Amount needed
        required: Asset,
        /// Amount held
        available: Asset,
    },

    /// Tank still holds value
    #[error("Tank not empty: {0}")]
    TankNotEmpty(TankId),

    /// Operation is malformed or violates chain parameters
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
