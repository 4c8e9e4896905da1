//! Property-based tests for value and resolution invariants
//!
//! These tests use proptest to verify:
//! - Arithmetic round trip: (a + b) - b == a for assets of one kind
//! - Price inversion: ~~p == p and p == 1 / ~p as reals
//! - Conservation: moving n out of a store leaves exactly balance - n
//! - Chain bound: a chain of k hops resolves only when the bound allows k

use proptest::prelude::*;
use tnt_protocol::{
    AccountId, Asset, AssetFlowMeter, AssetId, AssetStore, AttachmentId, LookupUtilities, Price,
    Sink, SinkChainError, TankAttachment, TankSchematic,
};

const CORE: AssetId = AssetId(0);

/// Strategy for amounts that cannot overflow when added
fn amount_strategy() -> impl Strategy<Value = i64> {
    -1_000_000_000_000i64..1_000_000_000_000i64
}

/// Strategy for valid prices between two distinct assets
fn price_strategy() -> impl Strategy<Value = Price> {
    (1i64..1_000_000_000, 1i64..1_000_000_000).prop_map(|(base, quote)| {
        Price::new(Asset::new(base, AssetId(1)), Asset::new(quote, AssetId(2)))
    })
}

/// Tank whose attachments 0..k-1 forward to the next and k-1 pays `account`
fn linear_chain(hops: u16, account: AccountId) -> TankSchematic {
    let mut tank = TankSchematic::new(CORE);
    for i in 0..hops {
        let destination = if i + 1 == hops {
            Sink::Account(account)
        } else {
            Sink::Attachment(AttachmentId::local(i + 1))
        };
        tank.add_attachment(TankAttachment::AssetFlowMeter(AssetFlowMeter {
            asset_type: CORE,
            destination_sink: destination,
            reset_authority: None,
        })).unwrap();
    }
    tank
}

proptest! {
    #[test]
    fn prop_add_then_subtract_is_identity(a in amount_strategy(), b in amount_strategy()) {
        let a = Asset::new(a, CORE);
        let b = Asset::new(b, CORE);
        prop_assert_eq!((a + b) - b, a);
    }

    #[test]
    fn prop_double_inversion_is_identity(p in price_strategy()) {
        prop_assert_eq!(!!p, p);
        let inverse = (!p).to_real();
        prop_assert!((p.to_real() - 1.0 / inverse).abs() <= 1e-9 * p.to_real().abs().max(1.0));
    }

    #[test]
    fn prop_move_leaves_remainder(balance in 0i64..1_000_000, fraction in 0.0f64..=1.0) {
        let amount = (balance as f64 * fraction) as i64;
        let mut source = AssetStore::unchecked_create(Asset::new(balance, CORE));
        let mut destination = AssetStore::new(CORE);

        source.move_amount(amount).to(&mut destination);
        prop_assert_eq!(source.amount(), balance - amount);
        prop_assert_eq!(destination.amount(), amount);

        source.unchecked_destroy();
        destination.unchecked_destroy();
    }

    #[test]
    fn prop_chain_length_bound(hops in 1u16..40) {
        let tank = linear_chain(hops, AccountId(7));
        let utils = LookupUtilities::new(&tank);
        let start = Sink::Attachment(AttachmentId::local(0));
        let k = usize::from(hops);

        let chain = utils.get_sink_chain(&start, k, Some(CORE)).unwrap();
        prop_assert_eq!(chain.len(), k + 1);
        prop_assert_eq!(chain.terminal(), Some(&Sink::Account(AccountId(7))));

        prop_assert_eq!(
            utils.get_sink_chain(&start, k - 1, Some(CORE)),
            Err(SinkChainError::ExceededMaxLength { max_chain_length: k - 1 })
        );
    }
}

#[test]
#[should_panic(expected = "insufficient value")]
fn test_overdraw_by_one_panics() {
    let mut source = AssetStore::unchecked_create(Asset::new(10, CORE));
    let mut destination = AssetStore::new(CORE);
    source.move_amount(11).to(&mut destination);
}

#[test]
#[should_panic(expected = "asset kind mismatch")]
fn test_mixed_kind_addition_panics() {
    let _ = Asset::new(1, CORE) + Asset::new(1, AssetId(1));
}
