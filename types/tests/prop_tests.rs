use proptest::prelude::*;

use simplegov_types::{BlockHeight, Coins, ProposalId};

fn coins_strategy() -> impl Strategy<Value = Coins> {
    prop::collection::btree_map("[a-z][a-z0-9]{2,6}", 1i128..1_000_000_000, 0..4)
        .prop_map(|m| Coins::new(m.into_iter().map(|(d, a)| simplegov_types::Coin::new(d, a)).collect()))
}

proptest! {
    /// Adding then subtracting the same amount restores the original set.
    #[test]
    fn add_then_sub_is_identity(a in coins_strategy(), b in coins_strategy()) {
        let sum = a.checked_add(&b).unwrap();
        prop_assert!(sum.is_valid());
        prop_assert_eq!(sum.checked_sub(&b).unwrap(), a);
    }

    /// A sum always covers each of its operands.
    #[test]
    fn sum_covers_operands(a in coins_strategy(), b in coins_strategy()) {
        let sum = a.checked_add(&b).unwrap();
        prop_assert!(sum.is_all_gte(&a));
        prop_assert!(sum.is_all_gte(&b));
    }

    /// Display output parses back to the same coin set.
    #[test]
    fn display_parses_back(a in coins_strategy()) {
        let parsed: Coins = a.to_string().parse().unwrap();
        prop_assert_eq!(parsed, a);
    }

    /// Big-endian id bytes sort in the same order as the ids.
    #[test]
    fn proposal_id_bytes_preserve_order(a in any::<u64>(), b in any::<u64>()) {
        let (ia, ib) = (ProposalId::new(a), ProposalId::new(b));
        prop_assert_eq!(ia.to_be_bytes() < ib.to_be_bytes(), ia < ib);
        prop_assert_eq!(ProposalId::from_be_bytes(ia.to_be_bytes()), ia);
    }

    /// A window is open strictly before start + window and closed from then on.
    #[test]
    fn window_boundary(start in 0u64..1_000_000, window in 1u64..1_000_000, offset in 0u64..2_000_000) {
        let opened = BlockHeight::new(start);
        let now = BlockHeight::new(start + offset);
        prop_assert_eq!(opened.has_elapsed(window, now), offset >= window);
    }

    /// Coins serialize through bincode unchanged.
    #[test]
    fn coins_bincode_roundtrip(a in coins_strategy()) {
        let encoded = bincode::serialize(&a).unwrap();
        let decoded: Coins = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, a);
    }
}
