//! Bond deposits, withdrawals and the exposure policies.

use crate::setup::{
    external, setup_bridge, setup_bridge_with, CHALLENGE, FUNDS, LP_A, MINIMUM_BOND, OWNER,
};
use alloy_primitives::U256;
use balance::{Account, Transfer};
use config::ExposurePolicy;
use coordinator::BridgeError;


#[test]
fn test_withdraw_bond_decreases_by_exact_value() {
    let bridge = setup_bridge();
    bridge.deposit_bond(LP_A, U256::from(10_000)).unwrap();

    for value in [1u64, 10, 333, 4_000, 5_656] {
        let before = bridge.lp_bond(LP_A);
        let after = bridge.withdraw_bond(LP_A, U256::from(value)).unwrap();
        assert_eq!(after, before - U256::from(value));
        assert_eq!(bridge.lp_bond(LP_A), after);
    }
    assert_eq!(bridge.lp_bond(LP_A), U256::ZERO);
    assert_eq!(external(&bridge, LP_A), U256::from(FUNDS));
}

#[test]
fn test_withdraw_more_than_bonded() {
    let bridge = setup_bridge();
    bridge.deposit_bond(LP_A, U256::from(500)).unwrap();

    for value in [501u64, 1_000, u64::MAX] {
        assert_eq!(
            bridge.withdraw_bond(LP_A, U256::from(value)),
            Err(BridgeError::InsufficientBond {
                lp: LP_A,
                withdrawable: U256::from(500),
                requested: U256::from(value),
            })
        );
    }
    assert_eq!(bridge.lp_bond(LP_A), U256::from(500));
}

#[test]
fn test_withdraw_zero_or_unknown() {
    let bridge = setup_bridge();
    assert!(matches!(
        bridge.withdraw_bond(LP_A, U256::from(1)),
        Err(BridgeError::InsufficientBond { .. })
    ));

    bridge.deposit_bond(LP_A, U256::from(10)).unwrap();
    assert!(matches!(
        bridge.withdraw_bond(LP_A, U256::ZERO),
        Err(BridgeError::InsufficientBond { .. })
    ));
}

#[test]
fn test_deposit_bond_validation() {
    let bridge = setup_bridge();
    assert_eq!(
        bridge.deposit_bond(LP_A, U256::ZERO),
        Err(BridgeError::InvalidAmount)
    );
    assert!(matches!(
        bridge.deposit_bond(LP_A, U256::from(FUNDS + 1)),
        Err(BridgeError::TransferFailed(_))
    ));
    assert_eq!(bridge.lp_bond(LP_A), U256::ZERO);
    assert_eq!(bridge.transfer().balance_of(Account::BondCustody), U256::ZERO);
}

#[test]
fn test_eligibility_tracks_minimum_bond() {
    let bridge = setup_bridge();
    assert!(!bridge.can_provide_liquidity(LP_A));

    bridge.deposit_bond(LP_A, U256::from(MINIMUM_BOND - 1)).unwrap();
    assert!(!bridge.can_provide_liquidity(LP_A));

    bridge.deposit_bond(LP_A, U256::from(1)).unwrap();
    assert!(bridge.can_provide_liquidity(LP_A));

    bridge.withdraw_bond(LP_A, U256::from(1)).unwrap();
    assert!(!bridge.can_provide_liquidity(LP_A));
}

#[test]
fn test_binary_policy_allows_full_withdrawal_with_exposure() {
    let bridge = setup_bridge();
    bridge.deposit_bond(LP_A, U256::from(MINIMUM_BOND)).unwrap();
    let id = bridge.request_withdrawal(OWNER, U256::from(50_000)).unwrap();
    bridge.provide_liquidity(LP_A, id).unwrap();

    assert_eq!(bridge.outstanding_exposure(LP_A), U256::from(50_000));
    bridge.withdraw_bond(LP_A, U256::from(MINIMUM_BOND)).unwrap();

    // the advance still settles
    bridge.clock().advance(CHALLENGE);
    bridge.finalize_withdrawal(id).unwrap();
    assert_eq!(bridge.outstanding_exposure(LP_A), U256::ZERO);
}

#[test]
fn test_collateralized_policy_locks_exposure() {
    let bridge = setup_bridge_with(ExposurePolicy::Collateralized);
    bridge.deposit_bond(LP_A, U256::from(5_000)).unwrap();

    let small = bridge.request_withdrawal(OWNER, U256::from(3_000)).unwrap();
    let large = bridge.request_withdrawal(OWNER, U256::from(3_000)).unwrap();

    bridge.provide_liquidity(LP_A, small).unwrap();
    assert_eq!(
        bridge.provide_liquidity(LP_A, large),
        Err(BridgeError::IneligibleLP(LP_A))
    );

    assert_eq!(
        bridge.withdraw_bond(LP_A, U256::from(2_001)),
        Err(BridgeError::InsufficientBond {
            lp: LP_A,
            withdrawable: U256::from(2_000),
            requested: U256::from(2_001),
        })
    );

    bridge.clock().advance(CHALLENGE);
    bridge.finalize_withdrawal(small).unwrap();
    bridge.provide_liquidity(LP_A, large).unwrap();
    assert_eq!(bridge.outstanding_exposure(LP_A), U256::from(3_000));
}
