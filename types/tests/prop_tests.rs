use proptest::prelude::*;

use rust_decimal::Decimal;
use synthstake_types::{Address, TokenAmount, TransactionState, TxHash, Wei};

fn any_state() -> impl Strategy<Value = TransactionState> {
    prop_oneof![
        Just(TransactionState::Idle),
        Just(TransactionState::AwaitingSignature),
        Just(TransactionState::Pending),
        Just(TransactionState::Success),
        Just(TransactionState::Failed),
    ]
}

proptest! {
    /// TxHash Display output parses back to the same hash.
    #[test]
    fn tx_hash_display_parses_back(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        prop_assert_eq!(TxHash::parse(&hash.to_string()).unwrap(), hash);
    }

    /// TxHash::is_zero is true only for all-zero bytes.
    #[test]
    fn tx_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        prop_assert_eq!(TxHash::new(bytes).is_zero(), bytes == [0u8; 32]);
    }

    /// Address Display output parses back to the same address.
    #[test]
    fn address_display_parses_back(bytes in prop::array::uniform20(0u8..)) {
        let address = Address::new(bytes);
        prop_assert_eq!(Address::parse(&address.to_string()).unwrap(), address);
    }

    /// Whole-token amounts convert to exactly units * 10^18 wei.
    #[test]
    fn whole_token_amounts_scale_exactly(units in 0u64..1_000_000_000) {
        let amount = TokenAmount::new(Decimal::from(units));
        prop_assert_eq!(
            amount.to_wei().unwrap(),
            Wei::new(u128::from(units) * 1_000_000_000_000_000_000)
        );
    }

    /// Any amount with at most 18 decimals survives the trip through wei.
    #[test]
    fn wei_conversion_is_lossless(mantissa in 0i64..i64::MAX, scale in 0u32..=18) {
        let amount = TokenAmount::new(Decimal::new(mantissa, scale));
        let wei = amount.to_wei().unwrap();
        prop_assert_eq!(wei.to_token_amount().unwrap(), amount);
    }

    /// The in-flight states are exactly those with no edge back to a fresh submit.
    #[test]
    fn in_flight_states_never_accept_submit(state in any_state()) {
        if state.is_in_flight() {
            prop_assert!(!state.can_transition_to(TransactionState::AwaitingSignature));
        }
    }

    /// Settled states only lead back to Idle.
    #[test]
    fn settled_states_only_return_to_idle(from in any_state(), to in any_state()) {
        if from.is_settled() && from.can_transition_to(to) {
            prop_assert_eq!(to, TransactionState::Idle);
        }
    }
}
