//! Custom authorities
//!
//! An account may grant another account the right to sign one kind of
//! operation on its behalf, limited by a restriction list. Restrictions are
//! compiled when the grant is registered, so a malformed grant is rejected
//! up front and every later check is a plain predicate call.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use tnt_protocol::{
    get_restriction_predicate, AccountId, Operation, OperationTag, Restriction,
    RestrictionPredicate,
};
use tracing::{debug, info};

/// Grant of signing rights for one operation kind
#[derive(Debug)]
pub struct CustomAuthority {
    /// Account whose operations may be signed
    pub grantor: AccountId,
    /// Account allowed to sign
    pub grantee: AccountId,
    /// Restrictions the operation must satisfy
    pub restrictions: Vec<Restriction>,
    predicate: RestrictionPredicate,
}

impl CustomAuthority {
    /// Operation kind covered by the grant
    pub fn operation_tag(&self) -> OperationTag {
        self.predicate.tag()
    }

    /// Whether the grant lets `signer` sign `op`
    pub fn permits(&self, signer: AccountId, op: &Operation) -> bool {
        self.grantee == signer && op.fee_payer() == self.grantor && self.predicate.evaluate(op)
    }
}

/// All registered custom authorities
#[derive(Debug)]
pub struct AuthorityRegistry {
    authorities: BTreeMap<u64, CustomAuthority>,
    next_id: u64,
    max_restriction_count: usize,
}

impl AuthorityRegistry {
    /// Empty registry accepting restriction trees of up to `max_restriction_count` nodes
    pub fn new(max_restriction_count: usize) -> Self {
        Self {
            authorities: BTreeMap::new(),
            next_id: 0,
            max_restriction_count,
        }
    }

    /// Register a grant and return its id
    pub fn register(
        &mut self,
        grantor: AccountId,
        grantee: AccountId,
        tag: OperationTag,
        restrictions: Vec<Restriction>,
    ) -> Result<u64> {
        let count = Restriction::restriction_count(&restrictions);
        if count > self.max_restriction_count {
            return Err(Error::InvalidOperation(format!(
                "Custom authority has {} restrictions, maximum is {}",
                count, self.max_restriction_count
            )));
        }
        let predicate = get_restriction_predicate(&restrictions, tag)?;

        let id = self.next_id;
        self.next_id += 1;
        self.authorities.insert(
            id,
            CustomAuthority {
                grantor,
                grantee,
                restrictions,
                predicate,
            },
        );
        info!(id, %grantor, %grantee, operation = %tag, "Custom authority registered");
        Ok(id)
    }

    /// Remove a grant; returns whether it existed
    pub fn revoke(&mut self, id: u64) -> bool {
        self.authorities.remove(&id).is_some()
    }

    /// Grant by id
    pub fn get(&self, id: u64) -> Option<&CustomAuthority> {
        self.authorities.get(&id)
    }

    /// Number of grants
    pub fn len(&self) -> usize {
        self.authorities.len()
    }

    /// Whether there are no grants
    pub fn is_empty(&self) -> bool {
        self.authorities.is_empty()
    }

    /// Check that `signer` may sign `op`
    ///
    /// The fee payer may always sign its own operations; anyone else needs
    /// a grant from the fee payer whose restrictions accept the operation.
    pub fn authorize(&self, signer: AccountId, op: &Operation) -> Result<()> {
        let payer = op.fee_payer();
        if signer == payer {
            return Ok(());
        }
        match self
            .authorities
            .iter()
            .find(|(_, authority)| authority.permits(signer, op))
        {
            Some((id, _)) => {
                debug!(id, %signer, %payer, "Operation authorized by custom authority");
                Ok(())
            }
            None => Err(Error::Unauthorized(format!(
                "{} may not sign {} for {}",
                signer,
                op.tag(),
                payer
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tnt_protocol::{Argument, Asset, AssetId, RestrictionFunction, TransferOperation};

    fn transfer(from: u64, to: u64) -> Operation {
        Operation::Transfer(TransferOperation {
            fee: Asset::default(),
            from: AccountId(from),
            to: AccountId(to),
            amount: Asset::new(5, AssetId(0)),
            memo: None,
        })
    }

    fn only_to(account: u64) -> Vec<Restriction> {
        vec![Restriction::new(
            "to",
            RestrictionFunction::Eq,
            Argument::scalar(AccountId(account)),
        )]
    }

    #[test]
    fn test_payer_signs_own_operations() {
        let registry = AuthorityRegistry::new(10);
        assert!(registry.authorize(AccountId(1), &transfer(1, 2)).is_ok());
        assert!(matches!(
            registry.authorize(AccountId(3), &transfer(1, 2)),
            Err(Error::Unauthorized(_))
        ));
    }

    #[test]
    fn test_grant_is_restricted() {
        let mut registry = AuthorityRegistry::new(10);
        registry
            .register(AccountId(1), AccountId(3), OperationTag::Transfer, only_to(2))
            .unwrap();

        assert!(registry.authorize(AccountId(3), &transfer(1, 2)).is_ok());
        assert!(registry.authorize(AccountId(3), &transfer(1, 4)).is_err());
        // Grant is for account 1's operations only
        assert!(registry.authorize(AccountId(3), &transfer(5, 2)).is_err());
        assert!(registry.authorize(AccountId(4), &transfer(1, 2)).is_err());
    }

    #[test]
    fn test_revoke() {
        let mut registry = AuthorityRegistry::new(10);
        let id = registry
            .register(AccountId(1), AccountId(3), OperationTag::Transfer, vec![])
            .unwrap();
        assert_eq!(registry.get(id).map(CustomAuthority::operation_tag), Some(OperationTag::Transfer));

        assert!(registry.revoke(id));
        assert!(!registry.revoke(id));
        assert!(registry.is_empty());
        assert!(registry.authorize(AccountId(3), &transfer(1, 2)).is_err());
    }

    #[test]
    fn test_malformed_grant_rejected() {
        let mut registry = AuthorityRegistry::new(10);
        let bad = vec![Restriction::new(
            "recipient",
            RestrictionFunction::Eq,
            Argument::scalar(AccountId(2)),
        )];
        assert!(matches!(
            registry.register(AccountId(1), AccountId(3), OperationTag::Transfer, bad),
            Err(Error::Restriction(_))
        ));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_oversized_grant_rejected() {
        let mut registry = AuthorityRegistry::new(1);
        let restrictions = [only_to(2), only_to(2)].concat();
        assert!(matches!(
            registry.register(AccountId(1), AccountId(3), OperationTag::Transfer, restrictions),
            Err(Error::InvalidOperation(_))
        ));
    }
}
