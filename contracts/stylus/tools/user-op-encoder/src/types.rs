use alloy_primitives::{Address, Bytes, FixedBytes, U256};
use minimal_account_core::{PackedUserOperation, Transaction};
use serde::Serialize;

/// Inputs for an unsigned ERC-4337 v0.7 user operation.
#[derive(Clone, Debug)]
pub struct UserOperationParams {
    /// The smart account.
    pub sender: Address,
    /// Full EntryPoint nonce (`key << 64 | sequence`).
    pub nonce: U256,
    pub init_code: Vec<u8>,
    /// Usually `execute(address,uint256,bytes)` calldata.
    pub call_data: Vec<u8>,
    pub verification_gas_limit: u128,
    pub call_gas_limit: u128,
    pub pre_verification_gas: U256,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
}

/// Signed user operation plus the hash that was signed, ready to print or submit.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUserOperation {
    pub sender: Address,
    pub nonce: U256,
    pub init_code: Bytes,
    pub call_data: Bytes,
    pub account_gas_limits: FixedBytes<32>,
    pub pre_verification_gas: U256,
    pub gas_fees: FixedBytes<32>,
    pub paymaster_and_data: Bytes,
    pub signature: Bytes,
    pub user_op_hash: FixedBytes<32>,
    pub signer: Address,
}

impl SignedUserOperation {
    pub fn new(user_op: &PackedUserOperation, user_op_hash: FixedBytes<32>, signer: Address) -> Self {
        Self {
            sender: user_op.sender,
            nonce: user_op.nonce,
            init_code: user_op.initCode.clone(),
            call_data: user_op.callData.clone(),
            account_gas_limits: user_op.accountGasLimits,
            pre_verification_gas: user_op.preVerificationGas,
            gas_fees: user_op.gasFees,
            paymaster_and_data: user_op.paymasterAndData.clone(),
            signature: user_op.signature.clone(),
            user_op_hash,
            signer,
        }
    }
}

/// Signed zkSync transaction summary.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub from: Address,
    pub to: Address,
    pub nonce: U256,
    pub value: U256,
    pub gas_limit: U256,
    pub max_fee_per_gas: U256,
    pub data: Bytes,
    pub signature: Bytes,
    pub tx_hash: FixedBytes<32>,
    pub signer: Address,
}

impl SignedTransaction {
    pub fn new(transaction: &Transaction, tx_hash: FixedBytes<32>, signer: Address) -> Self {
        Self {
            from: transaction.from_address(),
            to: transaction.to_address(),
            nonce: transaction.nonce,
            value: transaction.value,
            gas_limit: transaction.gasLimit,
            max_fee_per_gas: transaction.maxFeePerGas,
            data: transaction.data.clone(),
            signature: transaction.signature.clone(),
            tx_hash,
            signer,
        }
    }
}
