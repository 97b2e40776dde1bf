#![allow(dead_code)]

use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::SolCall;
use k256::ecdsa::SigningKey;
use minimal_account_core::{
    entry_point::{pack_account_gas_limits, pack_gas_fees},
    signature::{address_of, sign_hash_eip191},
    testing::{mocks::IMockToken, MemoryChain},
    zksync::{address_to_word, EIP_712_TX_TYPE},
    CallDescriptor, PackedUserOperation, Transaction,
};

pub const ONE_ETHER: u64 = 1_000_000_000_000_000_000;

pub const ACCOUNT: Address = address!("00000000000000000000000000000000000a11ce");
pub const TOKEN: Address = address!("000000000000000000000000000000000000700c");
pub const RECIPIENT: Address = address!("00000000000000000000000000000000000000b0");
pub const STRANGER: Address = address!("00000000000000000000000000000000000000e5");

pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(ONE_ETHER)
}

pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32].into()).expect("seed is a valid scalar")
}

pub fn owner_key() -> SigningKey {
    signing_key(0x11)
}

pub fn address_for(key: &SigningKey) -> Address {
    address_of(key.verifying_key())
}

/// `execute(TOKEN, 0, mint(to, amount))`.
pub fn mint_call(to: Address, amount: U256) -> CallDescriptor {
    let payload = IMockToken::mintCall { to, amount }.abi_encode();
    CallDescriptor::new(TOKEN, U256::ZERO, payload)
}

pub fn unsigned_user_op(sender: Address, nonce: U256, call: &CallDescriptor) -> PackedUserOperation {
    PackedUserOperation {
        sender,
        nonce,
        initCode: Bytes::new(),
        callData: call.encode_execute().into(),
        accountGasLimits: pack_account_gas_limits(500_000, 200_000),
        preVerificationGas: U256::from(50_000u64),
        gasFees: pack_gas_fees(1_000_000, 2_000_000),
        paymasterAndData: Bytes::new(),
        signature: Bytes::new(),
    }
}

pub fn sign_user_op(
    chain: &MemoryChain,
    entry_point: Address,
    key: &SigningKey,
    mut user_op: PackedUserOperation,
) -> PackedUserOperation {
    let hash =
        minimal_account_core::entry_point::hash_user_operation(&user_op, entry_point, chain.chain_id());
    let signature = sign_hash_eip191(key, hash).expect("signing succeeds");
    user_op.signature = signature.to_vec().into();
    user_op
}

/// Plain transfer-or-call transaction from `ACCOUNT` with a small fee.
pub fn unsigned_tx(to: Address, value: U256, data: Vec<u8>, nonce: u64) -> Transaction {
    Transaction {
        txType: U256::from(EIP_712_TX_TYPE),
        from: address_to_word(ACCOUNT),
        to: address_to_word(to),
        gasLimit: U256::from(1_000_000u64),
        gasPerPubdataByteLimit: U256::from(50_000u64),
        maxFeePerGas: U256::from(100u64),
        maxPriorityFeePerGas: U256::ZERO,
        nonce: U256::from(nonce),
        value,
        data: data.into(),
        ..Default::default()
    }
}

pub fn sign_tx(chain_id: u64, key: &SigningKey, mut tx: Transaction) -> Transaction {
    let signature = sign_hash_eip191(key, tx.encode_hash(chain_id)).expect("signing succeeds");
    tx.signature = signature.to_vec().into();
    tx
}
