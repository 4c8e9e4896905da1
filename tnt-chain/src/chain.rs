//! Operation pipeline
//!
//! [`Chain::push_operation`] authorizes, evaluates and applies one operation.
//! A failure at any step rejects the operation with the specific error and
//! leaves the database as it was.

use crate::config::Config;
use crate::database::Database;
use crate::error::{Error, Result};
use crate::evaluators::{
    AccountFundSinkEvaluator, Evaluator, OperationResult, TankCreateEvaluator,
    TankDeleteEvaluator, TankUpdateEvaluator, TapConnectEvaluator, TapOpenEvaluator,
    TransferEvaluator,
};
use crate::metrics::Metrics;
use tnt_protocol::{AccountId, Operation, OperationTag, Restriction};
use tracing::{info, warn};

/// Chain state with its configuration and metrics
#[derive(Debug)]
pub struct Chain {
    config: Config,
    db: Database,
    metrics: Metrics,
}

impl Chain {
    /// Empty chain
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let metrics = Metrics::new()
            .map_err(|e| Error::Config(format!("Failed to create metrics: {}", e)))?;
        let db = Database::new(config.max_restriction_count);
        info!(
            service = %config.service_name,
            version = %config.service_version,
            "Chain initialized"
        );
        Ok(Self { config, db, metrics })
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current state
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Mutable state, for genesis setup
    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Grant `grantee` the right to sign `tag` operations paid by `grantor`
    pub fn register_authority(
        &mut self,
        grantor: AccountId,
        grantee: AccountId,
        tag: OperationTag,
        restrictions: Vec<Restriction>,
    ) -> Result<u64> {
        self.db
            .authorities_mut()
            .register(grantor, grantee, tag, restrictions)
    }

    /// Authorize, evaluate and apply `op` signed by `signer`
    pub fn push_operation(&mut self, signer: AccountId, op: &Operation) -> Result<OperationResult> {
        let tag = op.tag();
        match self.process(signer, op) {
            Ok(result) => {
                self.metrics.record_applied(tag);
                Ok(result)
            }
            Err(err) => {
                warn!(operation = %tag, %signer, error = %err, "Operation rejected");
                self.metrics.record_rejected(tag);
                Err(err)
            }
        }
    }

    fn process(&mut self, signer: AccountId, op: &Operation) -> Result<OperationResult> {
        self.db.authorities().authorize(signer, op)?;
        match op {
            Operation::Transfer(op) => self.run(TransferEvaluator, op),
            Operation::AccountFundSink(op) => self.run(AccountFundSinkEvaluator::default(), op),
            Operation::TankCreate(op) => self.run(TankCreateEvaluator::default(), op),
            Operation::TankUpdate(op) => self.run(TankUpdateEvaluator::default(), op),
            Operation::TankDelete(op) => self.run(TankDeleteEvaluator, op),
            Operation::TapOpen(op) => self.run(TapOpenEvaluator::default(), op),
            Operation::TapConnect(op) => self.run(TapConnectEvaluator::default(), op),
        }
    }

    fn run<E: Evaluator>(&mut self, mut evaluator: E, op: &E::Operation) -> Result<OperationResult> {
        evaluator.evaluate(&self.db, &self.config.tnt, op)?;
        let result = evaluator.apply(&mut self.db, op)?;
        for chain in evaluator.resolved_chains() {
            self.metrics.record_sink_chain(chain.len());
        }
        Ok(result)
    }
}
