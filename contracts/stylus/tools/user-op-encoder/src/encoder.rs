use alloy_primitives::{Address, Bytes, FixedBytes, U256};
use eyre::{eyre, Result};
use k256::ecdsa::SigningKey;
use minimal_account_core::{
    entry_point::{hash_user_operation, pack_account_gas_limits, pack_gas_fees},
    signature::{address_of, sign_hash_eip191},
    zksync::{address_to_word, EIP_712_TX_TYPE},
    CallDescriptor, PackedUserOperation, Transaction,
};

use crate::types::UserOperationParams;

/// Decode a hex string, with or without `0x`.
pub fn parse_hex_bytes(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    Ok(hex::decode(digits)?)
}

/// Parse a 32-byte secp256k1 private key from hex.
pub fn parse_signing_key(input: &str) -> Result<SigningKey> {
    let bytes = parse_hex_bytes(input)?;
    if bytes.len() != 32 {
        return Err(eyre!(
            "Invalid private key length: expected 32 bytes, got {}",
            bytes.len()
        ));
    }
    SigningKey::from_slice(&bytes).map_err(|e| eyre!("invalid private key: {e}"))
}

pub fn signer_address(key: &SigningKey) -> Address {
    address_of(key.verifying_key())
}

/// `execute(target, value, data)` calldata for the account.
pub fn build_execute_call_data(target: Address, value: U256, data: &[u8]) -> Vec<u8> {
    CallDescriptor::new(target, value, data).encode_execute()
}

/// Unsigned operation with packed gas words and an empty signature.
pub fn build_user_operation(params: &UserOperationParams) -> PackedUserOperation {
    PackedUserOperation {
        sender: params.sender,
        nonce: params.nonce,
        initCode: Bytes::from(params.init_code.clone()),
        callData: Bytes::from(params.call_data.clone()),
        accountGasLimits: pack_account_gas_limits(
            params.verification_gas_limit,
            params.call_gas_limit,
        ),
        preVerificationGas: params.pre_verification_gas,
        gasFees: pack_gas_fees(params.max_priority_fee_per_gas, params.max_fee_per_gas),
        paymasterAndData: Bytes::new(),
        signature: Bytes::new(),
    }
}

/// Sign `userOpHash` as an owner wallet would (EIP-191) and attach the signature.
///
/// Returns the hash that was signed.
pub fn sign_user_operation(
    user_op: &mut PackedUserOperation,
    key: &SigningKey,
    entry_point: Address,
    chain_id: u64,
) -> Result<FixedBytes<32>> {
    let user_op_hash = hash_user_operation(user_op, entry_point, chain_id);
    let signature =
        sign_hash_eip191(key, user_op_hash).map_err(|e| eyre!("signing failed: {e}"))?;
    user_op.signature = Bytes::from(signature.to_vec());
    Ok(user_op_hash)
}

/// Unsigned EIP-712 (type `0x71`) transaction from `account`.
pub fn build_transaction(
    account: Address,
    to: Address,
    value: U256,
    data: Vec<u8>,
    nonce: U256,
    gas_limit: U256,
    max_fee_per_gas: U256,
) -> Transaction {
    Transaction {
        txType: U256::from(EIP_712_TX_TYPE),
        from: address_to_word(account),
        to: address_to_word(to),
        gasLimit: gas_limit,
        gasPerPubdataByteLimit: U256::from(50_000u64),
        maxFeePerGas: max_fee_per_gas,
        maxPriorityFeePerGas: U256::ZERO,
        nonce,
        value,
        data: Bytes::from(data),
        ..Default::default()
    }
}

/// Sign the transaction's canonical hash (EIP-191 over the EIP-712 digest) and attach it.
pub fn sign_transaction(
    transaction: &mut Transaction,
    key: &SigningKey,
    chain_id: u64,
) -> Result<FixedBytes<32>> {
    let tx_hash = transaction.encode_hash(chain_id);
    let signature = sign_hash_eip191(key, tx_hash).map_err(|e| eyre!("signing failed: {e}"))?;
    transaction.signature = Bytes::from(signature.to_vec());
    Ok(tx_hash)
}
