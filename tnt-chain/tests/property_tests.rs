//! Property-based tests for value conservation

use proptest::prelude::*;
use tnt_chain::{Chain, Config, OperationResult};
use tnt_protocol::{
    AccountFundSinkOperation, AccountId, Asset, AssetId, Operation, Sink, Tap,
    TankCreateOperation, TankId, TapId, TapOpenOperation, TransferOperation,
};

const CORE: AssetId = AssetId(0);
const FUNDS: i64 = 1_000_000;

fn total_core(chain: &Chain, accounts: &[AccountId]) -> i64 {
    let held: i64 = accounts
        .iter()
        .map(|account| chain.database().balance(*account, CORE).amount)
        .sum();
    let tanks: i64 = chain
        .database()
        .tanks()
        .map(|tank| tank.balance.amount() + tank.deposit.amount())
        .sum();
    held + tanks
}

proptest! {
    #[test]
    fn prop_transfers_conserve_value(
        transfers in prop::collection::vec((1u64..4, 1u64..4, 1i64..500_000), 1..20)
    ) {
        let accounts = [AccountId(1), AccountId(2), AccountId(3)];
        let mut chain = Chain::new(Config::default()).unwrap();
        chain.database_mut().import_balance(AccountId(1), Asset::new(FUNDS, CORE));

        for (from, to, amount) in transfers {
            let op = Operation::Transfer(TransferOperation {
                fee: Asset::default(),
                from: AccountId(from),
                to: AccountId(to),
                amount: Asset::new(amount, CORE),
                memo: None,
            });
            // Rejections are fine; they must not leak value either
            let _ = chain.push_operation(AccountId(from), &op);
            prop_assert_eq!(total_core(&chain, &accounts), FUNDS);
        }
    }

    #[test]
    fn prop_tap_releases_conserve_value(
        funding in 1i64..100_000,
        releases in prop::collection::vec(1i64..50_000, 1..10)
    ) {
        let owner = AccountId(1);
        let receiver = AccountId(2);
        let accounts = [owner, receiver];
        let mut chain = Chain::new(Config::default()).unwrap();
        chain.database_mut().import_balance(owner, Asset::new(FUNDS, CORE));

        let create = Operation::TankCreate(TankCreateOperation {
            fee: Asset::default(),
            payer: owner,
            deposit_amount: chain.config().tnt.tank_deposit,
            contained_asset: CORE,
            taps: vec![Tap {
                connected_sink: Some(Sink::Account(receiver)),
                ..Tap::default()
            }],
            attachments: vec![],
        });
        let tank = match chain.push_operation(owner, &create).unwrap() {
            OperationResult::NewTank(id) => id,
            other => panic!("expected new tank, got {:?}", other),
        };
        prop_assert_eq!(tank, TankId(1));

        let fund = Operation::AccountFundSink(AccountFundSinkOperation {
            fee: Asset::default(),
            funding_account: owner,
            funding_amount: Asset::new(funding, CORE),
            destination_sink: Sink::Tank(tank),
        });
        chain.push_operation(owner, &fund).unwrap();

        let mut released = 0;
        for amount in releases {
            let open = Operation::TapOpen(TapOpenOperation {
                fee: Asset::default(),
                payer: owner,
                tap_to_open: TapId::new(tank, 0),
                release_amount: amount,
            });
            if chain.push_operation(owner, &open).is_ok() {
                released += amount;
            }
            prop_assert_eq!(total_core(&chain, &accounts), FUNDS);
        }
        prop_assert!(released <= funding);
        prop_assert_eq!(chain.database().balance(receiver, CORE).amount, released);
    }
}
