mod common;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolError;
use common::*;
use minimal_account_core::{
    entry_point::ENTRY_POINT_V07,
    testing::{
        mocks::{Reverted, SystemCallRequired},
        EntryPointSimulator, HandleOpError, MemoryChain, MockToken, RejectingReceiver, Reverter,
    },
    zksync::DEPLOYER_SYSTEM_CONTRACT,
    AccountError, AccountEvent, CallDescriptor, EntryPointEnvironment, SmartAccount,
    UserOperationEnvelope, ValidationSignal,
};

struct Setup {
    chain: MemoryChain,
    entry_point: EntryPointSimulator,
    account: SmartAccount<EntryPointEnvironment>,
}

fn setup() -> Setup {
    let mut chain = MemoryChain::with_zksync_system_contracts(421_614);
    chain.deploy(TOKEN, MockToken);
    let account = SmartAccount::new_with_entry_point(address_for(&owner_key()), ENTRY_POINT_V07)
        .expect("owner is non-zero");
    Setup {
        chain,
        entry_point: EntryPointSimulator::new(ENTRY_POINT_V07),
        account,
    }
}

#[test]
fn owner_signed_user_op_mints_through_entry_point() {
    let Setup {
        mut chain,
        entry_point,
        account,
    } = setup();
    let amount = ether(1);
    let nonce = entry_point.get_nonce(&chain, ACCOUNT, U256::ZERO);
    let op = sign_user_op(
        &chain,
        ENTRY_POINT_V07,
        &owner_key(),
        unsigned_user_op(ACCOUNT, nonce, &mint_call(ACCOUNT, amount)),
    );

    let receipt = entry_point
        .handle_op(&mut chain, &account, op, U256::ZERO)
        .expect("user op is valid");

    assert!(receipt.success);
    assert_eq!(MockToken::balance_of(chain.state(), TOKEN, ACCOUNT), amount);
    assert_eq!(
        entry_point.get_nonce(&chain, ACCOUNT, U256::ZERO),
        U256::from(1u64)
    );
}

#[test]
fn replayed_user_op_is_refused_by_nonce() {
    let Setup {
        mut chain,
        entry_point,
        account,
    } = setup();
    let op = sign_user_op(
        &chain,
        ENTRY_POINT_V07,
        &owner_key(),
        unsigned_user_op(ACCOUNT, U256::ZERO, &mint_call(ACCOUNT, U256::from(5u64))),
    );

    entry_point
        .handle_op(&mut chain, &account, op.clone(), U256::ZERO)
        .expect("first submission passes");
    let err = entry_point
        .handle_op(&mut chain, &account, op, U256::ZERO)
        .unwrap_err();

    assert_eq!(
        err,
        HandleOpError::InvalidNonce {
            expected: U256::from(1u64),
            actual: U256::ZERO,
        }
    );
    assert_eq!(MockToken::balance_of(chain.state(), TOKEN, ACCOUNT), U256::from(5u64));
}

#[test]
fn foreign_signature_rejects_whole_operation() {
    let Setup {
        mut chain,
        entry_point,
        account,
    } = setup();
    chain.fund(ACCOUNT, ether(1));
    let op = sign_user_op(
        &chain,
        ENTRY_POINT_V07,
        &signing_key(0x42),
        unsigned_user_op(ACCOUNT, U256::ZERO, &mint_call(ACCOUNT, ether(1))),
    );

    let err = entry_point
        .handle_op(&mut chain, &account, op, U256::from(1_000u64))
        .unwrap_err();

    assert_eq!(err, HandleOpError::SignatureRejected);
    assert!(MockToken::balance_of(chain.state(), TOKEN, ACCOUNT).is_zero());
    assert_eq!(chain.balance_of(ACCOUNT), ether(1));
    assert!(entry_point.get_nonce(&chain, ACCOUNT, U256::ZERO).is_zero());
}

#[test]
fn malformed_signatures_reject_without_error() {
    let Setup {
        mut chain, account, ..
    } = setup();
    let call = mint_call(ACCOUNT, U256::from(1u64));
    let mut op = unsigned_user_op(ACCOUNT, U256::ZERO, &call);
    let hash = minimal_account_core::entry_point::hash_user_operation(
        &op,
        ENTRY_POINT_V07,
        chain.chain_id(),
    );

    for signature in [vec![], vec![0u8; 64], vec![0u8; 65], vec![0xffu8; 66]] {
        op.signature = Bytes::from(signature);
        let envelope = UserOperationEnvelope::new(op.clone(), hash);
        let signal = chain
            .transact(ENTRY_POINT_V07, ACCOUNT, |frame| {
                account.validate_user_op(frame, &envelope, U256::ZERO)
            })
            .expect("malformed signature is not fatal");
        assert_eq!(signal, ValidationSignal::Rejected);
        assert_eq!(signal.validation_data(), U256::from(1u64));
    }
}

#[test]
fn prefund_is_paid_even_when_signature_is_rejected() {
    let Setup {
        mut chain, account, ..
    } = setup();
    chain.fund(ACCOUNT, ether(1));
    let missing = U256::from(777u64);
    let op = sign_user_op(
        &chain,
        ENTRY_POINT_V07,
        &signing_key(0x42),
        unsigned_user_op(ACCOUNT, U256::ZERO, &mint_call(ACCOUNT, U256::from(1u64))),
    );
    let hash = minimal_account_core::entry_point::hash_user_operation(
        &op,
        ENTRY_POINT_V07,
        chain.chain_id(),
    );
    let envelope = UserOperationEnvelope::new(op, hash);

    let signal = chain
        .transact(ENTRY_POINT_V07, ACCOUNT, |frame| {
            account.validate_user_op(frame, &envelope, missing)
        })
        .expect("validation completes");

    assert_eq!(signal, ValidationSignal::Rejected);
    assert_eq!(chain.balance_of(ENTRY_POINT_V07), missing);
    assert_eq!(chain.balance_of(ACCOUNT), ether(1) - missing);
}

#[test]
fn prefund_failure_is_ignored() {
    let Setup {
        mut chain, account, ..
    } = setup();
    chain.deploy(ENTRY_POINT_V07, RejectingReceiver);
    chain.fund(ACCOUNT, U256::from(10u64));
    let op = sign_user_op(
        &chain,
        ENTRY_POINT_V07,
        &owner_key(),
        unsigned_user_op(ACCOUNT, U256::ZERO, &mint_call(ACCOUNT, U256::from(1u64))),
    );
    let hash = minimal_account_core::entry_point::hash_user_operation(
        &op,
        ENTRY_POINT_V07,
        chain.chain_id(),
    );
    let envelope = UserOperationEnvelope::new(op, hash);

    let signal = chain
        .transact(ENTRY_POINT_V07, ACCOUNT, |frame| {
            account.validate_user_op(frame, &envelope, U256::from(10u64))
        })
        .expect("refused prefund does not fail validation");

    assert_eq!(signal, ValidationSignal::Authorized);
    assert_eq!(chain.balance_of(ACCOUNT), U256::from(10u64));
}

#[test]
fn validation_only_from_entry_point() {
    let Setup {
        mut chain, account, ..
    } = setup();
    let envelope = UserOperationEnvelope::new(Default::default(), Default::default());

    let err = chain
        .transact(STRANGER, ACCOUNT, |frame| {
            account.validate_user_op(frame, &envelope, U256::ZERO)
        })
        .unwrap_err();

    assert_eq!(err, AccountError::NotFromTrustedCaller { caller: STRANGER });
}

#[test]
fn execute_is_limited_to_entry_point_and_owner() {
    let Setup {
        mut chain, account, ..
    } = setup();
    let call = mint_call(ACCOUNT, ether(1));

    let err = chain
        .transact(STRANGER, ACCOUNT, |frame| account.execute(frame, &call))
        .unwrap_err();
    assert_eq!(err, AccountError::NotAuthorized { caller: STRANGER });
    assert!(MockToken::balance_of(chain.state(), TOKEN, ACCOUNT).is_zero());

    chain
        .transact(address_for(&owner_key()), ACCOUNT, |frame| {
            account.execute(frame, &call)
        })
        .expect("owner may execute directly");
    assert_eq!(MockToken::balance_of(chain.state(), TOKEN, ACCOUNT), ether(1));
}

#[test]
fn value_above_balance_fails_without_transfer() {
    let Setup {
        mut chain, account, ..
    } = setup();
    chain.fund(ACCOUNT, ether(1));
    let call = CallDescriptor::new(RECIPIENT, ether(2), Vec::new());

    let err = chain
        .transact(ENTRY_POINT_V07, ACCOUNT, |frame| account.execute(frame, &call))
        .unwrap_err();

    assert_eq!(err, AccountError::ExecutionFailed(Vec::new()));
    assert_eq!(chain.balance_of(ACCOUNT), ether(1));
    assert!(chain.balance_of(RECIPIENT).is_zero());
}

#[test]
fn callee_revert_data_is_surfaced() {
    let Setup {
        mut chain, account, ..
    } = setup();
    let target = Address::repeat_byte(0x0d);
    chain.deploy(
        target,
        Reverter {
            reason: b"nope".to_vec(),
        },
    );
    let call = CallDescriptor::new(target, U256::ZERO, vec![0x01]);

    let err = chain
        .transact(ENTRY_POINT_V07, ACCOUNT, |frame| account.execute(frame, &call))
        .unwrap_err();

    let expected = Reverted {
        reason: b"nope".to_vec().into(),
    }
    .abi_encode();
    assert_eq!(err, AccountError::ExecutionFailed(expected));
}

#[test]
fn failed_execution_keeps_nonce_and_prefund() {
    let Setup {
        mut chain,
        entry_point,
        account,
    } = setup();
    chain.fund(ACCOUNT, ether(1));
    let missing = U256::from(1_000u64);
    let call = CallDescriptor::new(RECIPIENT, ether(5), Vec::new());
    let op = sign_user_op(
        &chain,
        ENTRY_POINT_V07,
        &owner_key(),
        unsigned_user_op(ACCOUNT, U256::ZERO, &call),
    );

    let receipt = entry_point
        .handle_op(&mut chain, &account, op, missing)
        .expect("validation passes");

    assert!(!receipt.success);
    assert_eq!(chain.balance_of(ENTRY_POINT_V07), missing);
    assert_eq!(
        entry_point.get_nonce(&chain, ACCOUNT, U256::ZERO),
        U256::from(1u64)
    );
}

#[test]
fn undecodable_call_data_fails_after_validation() {
    let Setup {
        mut chain,
        entry_point,
        account,
    } = setup();
    chain.fund(ACCOUNT, ether(1));
    let missing = U256::from(1_000u64);
    let mut op = unsigned_user_op(ACCOUNT, U256::ZERO, &mint_call(ACCOUNT, ether(1)));
    op.callData = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
    let op = sign_user_op(&chain, ENTRY_POINT_V07, &owner_key(), op);

    let receipt = entry_point
        .handle_op(&mut chain, &account, op, missing)
        .expect("validation passes");

    assert!(!receipt.success);
    assert!(receipt.output.is_empty());
    assert_eq!(chain.balance_of(ENTRY_POINT_V07), missing);
    assert_eq!(
        entry_point.get_nonce(&chain, ACCOUNT, U256::ZERO),
        U256::from(1u64)
    );
    assert_eq!(MockToken::balance_of(chain.state(), TOKEN, ACCOUNT), U256::ZERO);
}

#[test]
fn undecodable_call_data_with_foreign_signature_is_rejected() {
    let Setup {
        mut chain,
        entry_point,
        account,
    } = setup();
    let mut op = unsigned_user_op(ACCOUNT, U256::ZERO, &mint_call(ACCOUNT, ether(1)));
    op.callData = Bytes::from(vec![0x01]);
    let op = sign_user_op(&chain, ENTRY_POINT_V07, &signing_key(0x42), op);

    let err = entry_point
        .handle_op(&mut chain, &account, op, U256::ZERO)
        .unwrap_err();

    assert_eq!(err, HandleOpError::SignatureRejected);
    assert_eq!(entry_point.get_nonce(&chain, ACCOUNT, U256::ZERO), U256::ZERO);
}

#[test]
fn deployer_is_not_special_for_entry_point_account() {
    let Setup {
        mut chain, account, ..
    } = setup();
    let call = CallDescriptor::new(DEPLOYER_SYSTEM_CONTRACT, U256::ZERO, vec![0u8; 4]);

    let err = chain
        .transact(ENTRY_POINT_V07, ACCOUNT, |frame| account.execute(frame, &call))
        .unwrap_err();

    assert_eq!(
        err,
        AccountError::ExecutionFailed(SystemCallRequired {}.abi_encode())
    );
}

#[test]
fn ownership_transfer_moves_signing_authority() {
    let Setup {
        mut chain,
        entry_point,
        mut account,
    } = setup();
    let old_owner = address_for(&owner_key());
    let new_key = signing_key(0x22);
    let new_owner = address_for(&new_key);

    let err = chain
        .transact(STRANGER, ACCOUNT, |frame| {
            account.transfer_ownership(frame, new_owner)
        })
        .unwrap_err();
    assert_eq!(err, AccountError::NotOwner { caller: STRANGER });

    let err = chain
        .transact(old_owner, ACCOUNT, |frame| {
            account.transfer_ownership(frame, Address::ZERO)
        })
        .unwrap_err();
    assert_eq!(err, AccountError::InvalidOwner);

    chain
        .transact(old_owner, ACCOUNT, |frame| {
            account.transfer_ownership(frame, new_owner)
        })
        .expect("owner hands over");
    assert_eq!(account.owner(), new_owner);
    assert_eq!(
        chain.logs(),
        &[(
            ACCOUNT,
            AccountEvent::OwnershipTransferred {
                previous_owner: old_owner,
                new_owner,
            }
        )]
    );

    let stale = sign_user_op(
        &chain,
        ENTRY_POINT_V07,
        &owner_key(),
        unsigned_user_op(ACCOUNT, U256::ZERO, &mint_call(ACCOUNT, U256::from(1u64))),
    );
    assert_eq!(
        entry_point.handle_op(&mut chain, &account, stale, U256::ZERO),
        Err(HandleOpError::SignatureRejected)
    );

    let fresh = sign_user_op(
        &chain,
        ENTRY_POINT_V07,
        &new_key,
        unsigned_user_op(ACCOUNT, U256::ZERO, &mint_call(ACCOUNT, U256::from(1u64))),
    );
    assert!(entry_point
        .handle_op(&mut chain, &account, fresh, U256::ZERO)
        .expect("new owner signs")
        .success);
}

#[test]
fn zero_owner_is_refused_at_construction() {
    assert_eq!(
        SmartAccount::new_with_entry_point(Address::ZERO, ENTRY_POINT_V07).unwrap_err(),
        AccountError::InvalidOwner
    );
}

#[test]
fn account_accepts_plain_value() {
    let Setup { mut chain, .. } = setup();
    chain.fund(STRANGER, ether(2));

    assert!(chain.send_value(STRANGER, ACCOUNT, ether(1)).is_success());
    assert!(!chain.send_value(STRANGER, ACCOUNT, ether(5)).is_success());

    assert_eq!(chain.balance_of(ACCOUNT), ether(1));
    assert_eq!(chain.balance_of(STRANGER), ether(1));
}
