use proptest::prelude::*;

use simplegov_app::{AppGenesis, AppMsg, Block, GenesisAccount, GovApp, KvBank, SendMsg, Tx};
use simplegov_nullables::NullKvStore;
use simplegov_store::Prefixed;
use simplegov_types::{Address, BlockHeight, Coins};

const ACCOUNTS: [&str; 3] = ["alice", "bob", "carol"];

fn genesis() -> AppGenesis {
    AppGenesis {
        accounts: ACCOUNTS
            .iter()
            .map(|a| GenesisAccount {
                address: Address::new(*a),
                coins: Coins::single("coin", 100),
            })
            .collect(),
        ..AppGenesis::default()
    }
}

fn send_strategy() -> impl Strategy<Value = Tx> {
    (0usize..3, 0usize..3, 1i128..150).prop_map(|(from, to, amount)| {
        Tx::signed(AppMsg::Send(SendMsg {
            from: Address::new(ACCOUNTS[from]),
            to: Address::new(ACCOUNTS[to]),
            amount: Coins::single("coin", amount),
        }))
    })
}

proptest! {
    /// Sends, successful or not, never create or destroy coins, and two
    /// replicas fed the same blocks end with the same app hash.
    #[test]
    fn sends_conserve_supply_and_replicas_agree(
        blocks in prop::collection::vec(prop::collection::vec(send_strategy(), 0..5), 1..8)
    ) {
        let mut left = GovApp::new(NullKvStore::new()).unwrap();
        let mut right = GovApp::new(NullKvStore::new()).unwrap();
        left.init_chain(&genesis()).unwrap();
        right.init_chain(&genesis()).unwrap();

        for (i, txs) in blocks.into_iter().enumerate() {
            let block = Block::new(BlockHeight::new(i as u64 + 1), txs);
            let a = left.apply_block(&block).unwrap();
            let b = right.apply_block(&block).unwrap();
            prop_assert_eq!(a.app_hash, b.app_hash);
        }

        let bank = KvBank::new(Prefixed::new(left.store(), b"bank/"));
        prop_assert_eq!(bank.supply().unwrap(), Coins::single("coin", 300));
    }
}
