//! TNT Chain
//!
//! Evaluates ledger operations against tanks, taps and account balances.
//!
//! # Architecture
//!
//! - **Database**: In-memory balances, tanks and custom authorities
//! - **Evaluators**: Two-phase evaluate/apply per operation kind
//! - **Authorities**: Restriction-gated signing rights, compiled on registration
//! - **Chain**: Authorize → evaluate → apply pipeline with metrics
//!
//! # Invariants
//!
//! - Value conservation: balances only change by moving value between stores
//! - All-or-nothing: a rejected operation leaves state untouched
//! - Every tank sink resolves within `max_sink_chain_length` to a compatible destination

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod authority;
pub mod chain;
pub mod config;
pub mod database;
pub mod error;
pub mod evaluators;
pub mod metrics;
pub mod network;
pub mod object;

// Re-exports
pub use authority::{AuthorityRegistry, CustomAuthority};
pub use chain::Chain;
pub use config::{Config, TntParameters};
pub use database::Database;
pub use error::{Error, Result};
pub use evaluators::{Evaluator, OperationResult};
pub use metrics::Metrics;
pub use network::{Network, Resolution, ResolveRequest};
pub use object::{RequirementState, TankObject};
