//! Operation evaluators
//!
//! Each evaluator runs in two phases. `evaluate` checks the operation
//! against a read-only view of the database and remembers what it resolved;
//! `apply` performs the state change. Every check that can fail happens in
//! `evaluate` or before the first mutation in `apply`, so a rejected
//! operation leaves the database untouched.

use crate::config::TntParameters;
use crate::database::Database;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tnt_protocol::{
    AccountFundSinkOperation, AccountId, Asset, AssetStore, IndexType, LookupUtilities, Sink,
    SinkChain, TankAttachment, TankCreateOperation, TankDeleteOperation, TankId, TankSchematic,
    TankUpdateOperation, TapConnectOperation, TapId, TapOpenOperation, TapRequirement,
    TransferOperation,
};
use tracing::{debug, info};

/// What an applied operation produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationResult {
    /// Nothing beyond the state change
    None,
    /// Id of a newly created tank
    NewTank(TankId),
}

/// Two-phase operation evaluator
pub trait Evaluator {
    /// Operation payload handled by this evaluator
    type Operation;

    /// Check the operation without changing state
    fn evaluate(
        &mut self,
        db: &Database,
        params: &TntParameters,
        op: &Self::Operation,
    ) -> Result<()>;

    /// Change state; only called after a successful `evaluate`
    fn apply(&mut self, db: &mut Database, op: &Self::Operation) -> Result<OperationResult>;

    /// Sink chains resolved during evaluation
    fn resolved_chains(&self) -> &[SinkChain] {
        &[]
    }
}

/// Lookups relative to `current`, which replaces tank `current_id` in the database view
fn lookup_utilities<'a>(
    db: &'a Database,
    current: &'a TankSchematic,
    current_id: Option<TankId>,
) -> LookupUtilities<'a> {
    LookupUtilities::new(current).with_lookup(move |id| {
        if Some(id) == current_id {
            Some(current)
        } else {
            db.tank_schematic(id)
        }
    })
}

/// Check a schematic against chain parameters and resolve every outgoing sink
///
/// Tap sinks must accept the tank's asset; attachment sinks must accept
/// the asset the attachment receives.
pub fn validate_schematic(
    db: &Database,
    params: &TntParameters,
    schematic: &TankSchematic,
    tank_id: Option<TankId>,
) -> Result<Vec<SinkChain>> {
    if schematic.taps.len() > params.max_taps_per_tank {
        return Err(Error::InvalidOperation(format!(
            "Tank has {} taps, maximum is {}",
            schematic.taps.len(),
            params.max_taps_per_tank
        )));
    }
    if schematic.attachments.len() > params.max_attachments_per_tank {
        return Err(Error::InvalidOperation(format!(
            "Tank has {} attachments, maximum is {}",
            schematic.attachments.len(),
            params.max_attachments_per_tank
        )));
    }

    let utils = lookup_utilities(db, schematic, tank_id);
    let mut chains = Vec::new();

    for (index, tap) in &schematic.taps {
        for requirement in &tap.requirements {
            let limit = match requirement {
                TapRequirement::ImmediateFlowLimit { limit }
                | TapRequirement::CumulativeFlowLimit { limit } => *limit,
            };
            if limit <= 0 {
                return Err(Error::InvalidOperation(format!(
                    "Tap {} has a non-positive flow limit",
                    index
                )));
            }
        }
        if let Some(sink) = &tap.connected_sink {
            chains.push(utils.get_sink_chain(
                sink,
                params.max_sink_chain_length,
                Some(schematic.asset_type),
            )?);
        }
    }

    for (index, attachment) in &schematic.attachments {
        match attachment {
            TankAttachment::TapOpener(opener) => {
                if !schematic.taps.contains_key(&opener.tap_index) {
                    return Err(Error::InvalidOperation(format!(
                        "Tap opener {} references missing tap {}",
                        index, opener.tap_index
                    )));
                }
                if opener.release_amount <= 0 {
                    return Err(Error::InvalidOperation(format!(
                        "Tap opener {} has a non-positive release amount",
                        index
                    )));
                }
            }
            TankAttachment::AttachmentConnectAuthority(authority) => {
                let target = schematic.attachments.get(&authority.attachment_id);
                if target.and_then(TankAttachment::output_sink).is_none() {
                    return Err(Error::InvalidOperation(format!(
                        "Connect authority {} references attachment {} which has no output",
                        index, authority.attachment_id
                    )));
                }
            }
            TankAttachment::AssetFlowMeter(_) | TankAttachment::DepositSourceRestrictor(_) => {}
        }

        if let Some(sink) = attachment.output_sink() {
            chains.push(utils.get_sink_chain(
                sink,
                params.max_sink_chain_length,
                attachment.receives_asset(),
            )?);
        }
    }

    debug!(
        taps = schematic.taps.len(),
        attachments = schematic.attachments.len(),
        chains = chains.len(),
        "Schematic validated"
    );
    Ok(chains)
}

/// Terminal destination of a resolved chain; `home` is the tank resolution started in
fn terminal_destination(chain: &SinkChain, home: Option<TankId>) -> Result<Sink> {
    let context = chain.final_sink_tank.or(home);
    match chain.terminal().map(|sink| sink.in_context(context)) {
        Some(sink @ (Sink::Account(_) | Sink::Tank(_))) => Ok(sink),
        other => Err(Error::InvalidOperation(format!(
            "Sink does not resolve to an account or tank: {:?}",
            other
        ))),
    }
}

/// Move all of `value` into a terminal sink
///
/// # Panics
///
/// If `value` is non-empty and the destination is not an existing account
/// or tank; evaluators resolve destinations before applying.
fn deliver(db: &mut Database, destination: Sink, mut value: AssetStore) {
    match destination {
        Sink::Account(account) => db.deposit(account, value),
        Sink::Tank(id) => {
            if let Some(tank) = db.tank_mut(id) {
                value.to(&mut tank.balance);
            }
        }
        Sink::SameTank | Sink::Attachment(_) => {}
    }
}

fn check_balance(db: &Database, account: AccountId, required: Asset) -> Result<()> {
    let available = db.balance(account, required.asset_id);
    if available.amount < required.amount {
        return Err(Error::InsufficientBalance {
            account,
            required,
            available,
        });
    }
    Ok(())
}

fn require_positive(amount: Asset, what: &str) -> Result<()> {
    if amount.amount <= 0 {
        return Err(Error::InvalidOperation(format!(
            "{} must be positive, got {}",
            what, amount
        )));
    }
    Ok(())
}

fn require_tank_id(tap: &TapId) -> Result<TankId> {
    tap.tank_id
        .ok_or_else(|| Error::InvalidOperation(format!("Tap {} does not name its tank", tap)))
}

fn not_evaluated() -> Error {
    Error::InvalidOperation("Operation applied before evaluation".to_string())
}

/// Account to account transfer
#[derive(Debug, Default)]
pub struct TransferEvaluator;

impl Evaluator for TransferEvaluator {
    type Operation = TransferOperation;

    fn evaluate(&mut self, db: &Database, _: &TntParameters, op: &TransferOperation) -> Result<()> {
        if op.from == op.to {
            return Err(Error::InvalidOperation(format!(
                "Cannot transfer from {} to itself",
                op.from
            )));
        }
        require_positive(op.amount, "Transfer amount")?;
        check_balance(db, op.from, op.amount)
    }

    fn apply(&mut self, db: &mut Database, op: &TransferOperation) -> Result<OperationResult> {
        let moved = db.withdraw(op.from, op.amount);
        db.deposit(op.to, moved);
        info!(from = %op.from, to = %op.to, amount = %op.amount, "Transfer applied");
        Ok(OperationResult::None)
    }
}

/// Payment from an account into a sink
#[derive(Debug, Default)]
pub struct AccountFundSinkEvaluator {
    destination: Option<Sink>,
    chains: Vec<SinkChain>,
}

impl Evaluator for AccountFundSinkEvaluator {
    type Operation = AccountFundSinkOperation;

    fn evaluate(
        &mut self,
        db: &Database,
        params: &TntParameters,
        op: &AccountFundSinkOperation,
    ) -> Result<()> {
        require_positive(op.funding_amount, "Funding amount")?;
        match op.destination_sink {
            Sink::SameTank => {
                return Err(Error::InvalidOperation(
                    "Account funding cannot target the same tank".to_string(),
                ))
            }
            Sink::Attachment(id) if id.tank_id.is_none() => {
                return Err(Error::InvalidOperation(format!(
                    "Attachment {} does not name its tank",
                    id
                )))
            }
            _ => {}
        }
        check_balance(db, op.funding_account, op.funding_amount)?;

        // No tank is under evaluation; every sink here names its tank
        let detached = TankSchematic::new(op.funding_amount.asset_id);
        let utils = lookup_utilities(db, &detached, None);
        let chain = utils.get_sink_chain(
            &op.destination_sink,
            params.max_sink_chain_length,
            Some(op.funding_amount.asset_id),
        )?;
        self.destination = Some(terminal_destination(&chain, None)?);
        self.chains.push(chain);
        Ok(())
    }

    fn apply(&mut self, db: &mut Database, op: &AccountFundSinkOperation) -> Result<OperationResult> {
        let destination = self.destination.ok_or_else(not_evaluated)?;
        if let Sink::Tank(id) = destination {
            db.tank(id).ok_or(Error::TankNotFound(id))?;
        }
        let moved = db.withdraw(op.funding_account, op.funding_amount);
        deliver(db, destination, moved);
        info!(
            account = %op.funding_account,
            amount = %op.funding_amount,
            %destination,
            "Account funded sink"
        );
        Ok(OperationResult::None)
    }

    fn resolved_chains(&self) -> &[SinkChain] {
        &self.chains
    }
}

/// Tank creation
#[derive(Debug, Default)]
pub struct TankCreateEvaluator {
    schematic: Option<TankSchematic>,
    deposit: Asset,
    chains: Vec<SinkChain>,
}

impl Evaluator for TankCreateEvaluator {
    type Operation = TankCreateOperation;

    fn evaluate(
        &mut self,
        db: &Database,
        params: &TntParameters,
        op: &TankCreateOperation,
    ) -> Result<()> {
        if op.deposit_amount != params.tank_deposit {
            return Err(Error::InvalidOperation(format!(
                "Tank deposit must be {}, got {}",
                params.tank_deposit, op.deposit_amount
            )));
        }
        let deposit = Asset::new(op.deposit_amount, params.core_asset);
        check_balance(db, op.payer, deposit)?;

        let schematic = TankSchematic::from_create_operation(op)?;
        self.chains = validate_schematic(db, params, &schematic, None)?;
        self.schematic = Some(schematic);
        self.deposit = deposit;
        Ok(())
    }

    fn apply(&mut self, db: &mut Database, op: &TankCreateOperation) -> Result<OperationResult> {
        let schematic = self.schematic.take().ok_or_else(not_evaluated)?;
        let deposit = db.withdraw(op.payer, self.deposit);
        let id = db.insert_tank(op.payer, schematic, deposit);
        info!(tank = %id, owner = %op.payer, asset = %op.contained_asset, "Tank created");
        Ok(OperationResult::NewTank(id))
    }

    fn resolved_chains(&self) -> &[SinkChain] {
        &self.chains
    }
}

/// Tank update
#[derive(Debug, Default)]
pub struct TankUpdateEvaluator {
    schematic: Option<TankSchematic>,
    cleared_taps: Vec<IndexType>,
    deposit_change: Asset,
    chains: Vec<SinkChain>,
}

impl Evaluator for TankUpdateEvaluator {
    type Operation = TankUpdateOperation;

    fn evaluate(
        &mut self,
        db: &Database,
        params: &TntParameters,
        op: &TankUpdateOperation,
    ) -> Result<()> {
        let id = op.tank_to_update;
        let tank = db.tank(id).ok_or(Error::TankNotFound(id))?;
        if op.payer != tank.owner {
            return Err(Error::Unauthorized(format!(
                "{} does not own {}",
                op.payer, id
            )));
        }

        for index in op.taps_to_remove.iter().chain(op.taps_to_replace.keys()) {
            if tank.tap(*index).is_none() {
                return Err(Error::TapNotFound(TapId::new(id, *index)));
            }
        }
        if op.taps_to_replace.keys().any(|index| op.taps_to_remove.contains(index)) {
            return Err(Error::InvalidOperation(
                "A tap cannot be both removed and replaced".to_string(),
            ));
        }
        for index in op
            .attachments_to_remove
            .iter()
            .chain(op.attachments_to_replace.keys())
        {
            if !tank.schematic.attachments.contains_key(index) {
                return Err(Error::InvalidOperation(format!(
                    "Attachment {} does not exist on {}",
                    index, id
                )));
            }
        }
        if op
            .attachments_to_replace
            .keys()
            .any(|index| op.attachments_to_remove.contains(index))
        {
            return Err(Error::InvalidOperation(
                "An attachment cannot be both removed and replaced".to_string(),
            ));
        }

        let new_deposit = tank
            .deposit
            .amount()
            .checked_add(op.deposit_delta)
            .ok_or_else(|| {
                Error::InvalidOperation(format!("Deposit delta {} overflows", op.deposit_delta))
            })?;
        if new_deposit != params.tank_deposit {
            return Err(Error::InvalidOperation(format!(
                "Deposit after update must be {}, got {}",
                params.tank_deposit, new_deposit
            )));
        }
        let deposit_change = Asset::new(op.deposit_delta, params.core_asset);
        if op.deposit_delta > 0 {
            check_balance(db, op.payer, deposit_change)?;
        }

        let mut schematic = tank.schematic.clone();
        schematic.update_from_operation(op)?;
        self.chains = validate_schematic(db, params, &schematic, Some(id))?;

        self.cleared_taps = op
            .taps_to_remove
            .iter()
            .chain(op.taps_to_replace.keys())
            .copied()
            .collect();
        self.schematic = Some(schematic);
        self.deposit_change = deposit_change;
        Ok(())
    }

    fn apply(&mut self, db: &mut Database, op: &TankUpdateOperation) -> Result<OperationResult> {
        let id = op.tank_to_update;
        let schematic = self.schematic.take().ok_or_else(not_evaluated)?;
        db.tank(id).ok_or(Error::TankNotFound(id))?;

        let delta = self.deposit_change.amount;
        if delta > 0 {
            let mut added = db.withdraw(op.payer, self.deposit_change);
            if let Some(tank) = db.tank_mut(id) {
                added.to(&mut tank.deposit);
            }
        }
        let Some(tank) = db.tank_mut(id) else {
            return Err(Error::TankNotFound(id));
        };
        let refund: Option<AssetStore> = (delta < 0).then(|| tank.deposit.move_amount(-delta).into());

        tank.schematic = schematic;
        for index in &self.cleared_taps {
            tank.clear_tap_state(*index);
        }
        if let Some(refund) = refund {
            db.deposit(op.payer, refund);
        }

        info!(tank = %id, deposit_delta = delta, "Tank updated");
        Ok(OperationResult::None)
    }

    fn resolved_chains(&self) -> &[SinkChain] {
        &self.chains
    }
}

/// Tank deletion
#[derive(Debug, Default)]
pub struct TankDeleteEvaluator;

impl Evaluator for TankDeleteEvaluator {
    type Operation = TankDeleteOperation;

    fn evaluate(&mut self, db: &Database, _: &TntParameters, op: &TankDeleteOperation) -> Result<()> {
        let id = op.tank_to_delete;
        let tank = db.tank(id).ok_or(Error::TankNotFound(id))?;
        if op.payer != tank.owner {
            return Err(Error::Unauthorized(format!(
                "{} does not own {}",
                op.payer, id
            )));
        }
        if !tank.balance.is_empty() {
            return Err(Error::TankNotEmpty(id));
        }
        if op.deposit_claimed != tank.deposit.amount() {
            return Err(Error::InvalidOperation(format!(
                "Claimed deposit {} does not match escrowed {}",
                op.deposit_claimed,
                tank.deposit.amount()
            )));
        }
        Ok(())
    }

    fn apply(&mut self, db: &mut Database, op: &TankDeleteOperation) -> Result<OperationResult> {
        let id = op.tank_to_delete;
        let mut tank = db.remove_tank(id).ok_or(Error::TankNotFound(id))?;
        let escrowed = tank.deposit.amount();
        let refund: AssetStore = tank.deposit.move_amount(escrowed).into();
        db.deposit(op.payer, refund);
        info!(tank = %id, refund = escrowed, "Tank deleted");
        Ok(OperationResult::None)
    }
}

/// Release through a tap
#[derive(Debug, Default)]
pub struct TapOpenEvaluator {
    destination: Option<Sink>,
    cumulative_requirements: Vec<IndexType>,
    chains: Vec<SinkChain>,
}

impl Evaluator for TapOpenEvaluator {
    type Operation = TapOpenOperation;

    fn evaluate(&mut self, db: &Database, params: &TntParameters, op: &TapOpenOperation) -> Result<()> {
        let tank_id = require_tank_id(&op.tap_to_open)?;
        let tank = db.tank(tank_id).ok_or(Error::TankNotFound(tank_id))?;
        let tap_index = op.tap_to_open.tap_index;
        let tap = tank
            .tap(tap_index)
            .ok_or(Error::TapNotFound(op.tap_to_open))?;

        let authority = tap.open_authority.unwrap_or(tank.owner);
        if op.payer != authority {
            return Err(Error::Unauthorized(format!(
                "{} may not open {}",
                op.payer, op.tap_to_open
            )));
        }

        let release = Asset::new(op.release_amount, tank.asset_type());
        require_positive(release, "Release amount")?;
        if op.release_amount > tank.balance.amount() {
            return Err(Error::InvalidOperation(format!(
                "{} holds {}, cannot release {}",
                tank_id,
                tank.balance.stored_asset(),
                release
            )));
        }

        let mut cumulative = Vec::new();
        for (requirement_index, requirement) in (0..).zip(&tap.requirements) {
            let (allowed, kind) = match requirement {
                TapRequirement::ImmediateFlowLimit { limit } => (*limit, "immediate"),
                TapRequirement::CumulativeFlowLimit { limit } => {
                    cumulative.push(requirement_index);
                    (
                        limit - tank.amount_released(tap_index, requirement_index),
                        "cumulative",
                    )
                }
            };
            if op.release_amount > allowed {
                return Err(Error::InvalidOperation(format!(
                    "Release of {} exceeds {} flow limit of {} on {}",
                    op.release_amount, kind, allowed, op.tap_to_open
                )));
            }
        }

        let sink = tap.connected_sink.ok_or_else(|| {
            Error::InvalidOperation(format!("Tap {} is not connected", op.tap_to_open))
        })?;
        let utils = lookup_utilities(db, &tank.schematic, Some(tank_id));
        let chain = utils.get_sink_chain(&sink, params.max_sink_chain_length, Some(tank.asset_type()))?;

        self.destination = Some(terminal_destination(&chain, Some(tank_id))?);
        self.cumulative_requirements = cumulative;
        self.chains.push(chain);
        Ok(())
    }

    fn apply(&mut self, db: &mut Database, op: &TapOpenOperation) -> Result<OperationResult> {
        let destination = self.destination.ok_or_else(not_evaluated)?;
        let tank_id = require_tank_id(&op.tap_to_open)?;
        if let Sink::Tank(id) = destination {
            db.tank(id).ok_or(Error::TankNotFound(id))?;
        }
        let Some(tank) = db.tank_mut(tank_id) else {
            return Err(Error::TankNotFound(tank_id));
        };

        let released: AssetStore = tank.balance.move_amount(op.release_amount).into();
        for requirement_index in &self.cumulative_requirements {
            tank.record_release(op.tap_to_open.tap_index, *requirement_index, op.release_amount);
        }
        deliver(db, destination, released);

        info!(tap = %op.tap_to_open, amount = op.release_amount, %destination, "Tap opened");
        Ok(OperationResult::None)
    }

    fn resolved_chains(&self) -> &[SinkChain] {
        &self.chains
    }
}

/// Tap connection
#[derive(Debug, Default)]
pub struct TapConnectEvaluator {
    chains: Vec<SinkChain>,
}

impl Evaluator for TapConnectEvaluator {
    type Operation = TapConnectOperation;

    fn evaluate(
        &mut self,
        db: &Database,
        params: &TntParameters,
        op: &TapConnectOperation,
    ) -> Result<()> {
        let tank_id = require_tank_id(&op.tap_to_connect)?;
        let tank = db.tank(tank_id).ok_or(Error::TankNotFound(tank_id))?;
        let tap = tank
            .tap(op.tap_to_connect.tap_index)
            .ok_or(Error::TapNotFound(op.tap_to_connect))?;

        let authority = tap.connect_authority.unwrap_or(tank.owner);
        if op.payer != authority {
            return Err(Error::Unauthorized(format!(
                "{} may not connect {}",
                op.payer, op.tap_to_connect
            )));
        }

        if let Some(sink) = &op.new_sink {
            let utils = lookup_utilities(db, &tank.schematic, Some(tank_id));
            self.chains.push(utils.get_sink_chain(
                sink,
                params.max_sink_chain_length,
                Some(tank.asset_type()),
            )?);
        }
        Ok(())
    }

    fn apply(&mut self, db: &mut Database, op: &TapConnectOperation) -> Result<OperationResult> {
        let tank_id = require_tank_id(&op.tap_to_connect)?;
        let tank = db.tank_mut(tank_id).ok_or(Error::TankNotFound(tank_id))?;
        let tap = tank
            .schematic
            .taps
            .get_mut(&op.tap_to_connect.tap_index)
            .ok_or(Error::TapNotFound(op.tap_to_connect))?;

        tap.connected_sink = op.new_sink;
        if op.clear_connect_authority {
            tap.connect_authority = None;
        }
        info!(tap = %op.tap_to_connect, sink = ?op.new_sink, "Tap connected");
        Ok(OperationResult::None)
    }

    fn resolved_chains(&self) -> &[SinkChain] {
        &self.chains
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tnt_protocol::{AssetFlowMeter, AssetId, AttachmentId, Tap, TapOpener};

    const CORE: AssetId = AssetId(0);
    const USD: AssetId = AssetId(1);

    fn meter(asset: AssetId, sink: Sink) -> TankAttachment {
        TankAttachment::AssetFlowMeter(AssetFlowMeter {
            asset_type: asset,
            destination_sink: sink,
            reset_authority: None,
        })
    }

    #[test]
    fn test_validate_rejects_wrong_asset_tap() {
        let db = Database::new(16);
        let mut schematic = TankSchematic::new(CORE);
        schematic.add_attachment(meter(USD, Sink::Account(AccountId(1)))).unwrap();
        schematic.add_tap(Tap {
            connected_sink: Some(Sink::Attachment(AttachmentId::local(0))),
            ..Tap::default()
        }).unwrap();

        let err = validate_schematic(&db, &TntParameters::default(), &schematic, None).unwrap_err();
        assert!(matches!(err, Error::Sink(_)));
    }

    #[test]
    fn test_validate_checks_tap_opener_target() {
        let db = Database::new(16);
        let mut schematic = TankSchematic::new(CORE);
        schematic.add_attachment(TankAttachment::TapOpener(TapOpener {
            tap_index: 3,
            release_amount: 1,
            destination_sink: Sink::SameTank,
            asset_type: CORE,
        })).unwrap();

        let err = validate_schematic(&db, &TntParameters::default(), &schematic, None).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));

        schematic.add_tap(Tap::default()).unwrap();
        schematic.add_tap(Tap::default()).unwrap();
        schematic.add_tap(Tap::default()).unwrap();
        schematic.add_tap(Tap::default()).unwrap();
        let chains = validate_schematic(&db, &TntParameters::default(), &schematic, None).unwrap();
        assert_eq!(chains.len(), 1);
    }

    #[test]
    fn test_validate_enforces_limits() {
        let db = Database::new(16);
        let params = TntParameters {
            max_taps_per_tank: 1,
            ..TntParameters::default()
        };
        let mut schematic = TankSchematic::new(CORE);
        schematic.add_tap(Tap::default()).unwrap();
        schematic.add_tap(Tap::default()).unwrap();
        assert!(validate_schematic(&db, &params, &schematic, None).is_err());

        let mut limited = TankSchematic::new(CORE);
        limited.add_tap(Tap {
            requirements: vec![TapRequirement::ImmediateFlowLimit { limit: 0 }],
            ..Tap::default()
        }).unwrap();
        assert!(validate_schematic(&db, &TntParameters::default(), &limited, None).is_err());
    }

    #[test]
    fn test_terminal_destination_in_home_tank() {
        let chain = SinkChain {
            sinks: vec![Sink::SameTank],
            final_sink_tank: None,
        };
        assert_eq!(
            terminal_destination(&chain, Some(TankId(4))).unwrap(),
            Sink::Tank(TankId(4))
        );
        assert!(terminal_destination(&chain, None).is_err());
    }

    #[test]
    fn test_transfer_checks() {
        let mut db = Database::new(16);
        db.import_balance(AccountId(1), Asset::new(10, CORE));
        let params = TntParameters::default();

        let op = |from: u64, to: u64, amount: i64| TransferOperation {
            fee: Asset::default(),
            from: AccountId(from),
            to: AccountId(to),
            amount: Asset::new(amount, CORE),
            memo: None,
        };

        let mut evaluator = TransferEvaluator;
        assert!(evaluator.evaluate(&db, &params, &op(1, 1, 5)).is_err());
        assert!(evaluator.evaluate(&db, &params, &op(1, 2, 0)).is_err());
        assert!(matches!(
            evaluator.evaluate(&db, &params, &op(1, 2, 11)),
            Err(Error::InsufficientBalance { .. })
        ));

        let ok = op(1, 2, 10);
        evaluator.evaluate(&db, &params, &ok).unwrap();
        evaluator.apply(&mut db, &ok).unwrap();
        assert_eq!(db.balance(AccountId(2), CORE).amount, 10);
        assert_eq!(db.balance(AccountId(1), CORE).amount, 0);
    }
}
