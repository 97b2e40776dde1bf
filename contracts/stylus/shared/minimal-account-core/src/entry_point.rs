/*
 * ERC-4337 v0.7 account surface.
 *
 * The EntryPoint computes userOpHash, owns nonce bookkeeping and decides whether to execute.
 * The account only:
 * 1. checks the caller is the EntryPoint
 * 2. verifies the owner signed toEthSignedMessageHash(userOpHash)
 * 3. pays missingAccountFunds back to the EntryPoint (best effort, even on a bad signature)
 * 4. returns validationData (0 = success, 1 = signature failure)
 */
use alloy_primitives::{address, keccak256, Address, FixedBytes, U256};
use alloy_sol_types::{sol, SolValue};

use crate::{
    account::SmartAccount,
    environment::Environment,
    errors::AccountError,
    host::Host,
    settlement::settle,
    types::{PaymentPolicy, ValidationSignal},
};

/// Canonical EntryPoint v0.7 deployment.
pub const ENTRY_POINT_V07: Address = address!("0000000071727De22E5E9d8BAf0edAc6f37da032");

sol! {
    #[derive(Default, Debug, PartialEq, Eq)]
    struct PackedUserOperation {
        address sender;
        uint256 nonce;
        bytes initCode;
        bytes callData;
        bytes32 accountGasLimits;
        uint256 preVerificationGas;
        bytes32 gasFees;
        bytes paymasterAndData;
        bytes signature;
    }

    #[derive(Default, Debug, PartialEq, Eq)]
    struct UserOperationHashEncoded {
        bytes32 encodedHash;
        address entryPoint;
        uint256 chainId;
    }

    #[derive(Default, Debug, PartialEq, Eq)]
    struct UserOperationPackedForHash {
        address sender;
        uint256 nonce;
        bytes32 hashInitCode;
        bytes32 hashCallData;
        bytes32 accountGasLimits;
        uint256 preVerificationGas;
        bytes32 gasFees;
        bytes32 hashPaymasterAndData;
    }
}

/// Pack two 128-bit quantities into one word: `high << 128 | low`.
pub fn pack_u128_pair(high: u128, low: u128) -> FixedBytes<32> {
    let combined: U256 = (U256::from(high) << 128usize) | U256::from(low);
    FixedBytes::from(combined.to_be_bytes::<32>())
}

/// `accountGasLimits = verificationGasLimit || callGasLimit`.
pub fn pack_account_gas_limits(verification_gas_limit: u128, call_gas_limit: u128) -> FixedBytes<32> {
    pack_u128_pair(verification_gas_limit, call_gas_limit)
}

/// `gasFees = maxPriorityFeePerGas || maxFeePerGas`.
pub fn pack_gas_fees(max_priority_fee_per_gas: u128, max_fee_per_gas: u128) -> FixedBytes<32> {
    pack_u128_pair(max_priority_fee_per_gas, max_fee_per_gas)
}

/// v0.7 `userOpHash`. The signature is not part of the hash.
pub fn hash_user_operation(
    user_op: &PackedUserOperation,
    entry_point: Address,
    chain_id: u64,
) -> FixedBytes<32> {
    let packed = UserOperationPackedForHash {
        sender: user_op.sender,
        nonce: user_op.nonce,
        hashInitCode: keccak256(&user_op.initCode),
        hashCallData: keccak256(&user_op.callData),
        accountGasLimits: user_op.accountGasLimits,
        preVerificationGas: user_op.preVerificationGas,
        gasFees: user_op.gasFees,
        hashPaymasterAndData: keccak256(&user_op.paymasterAndData),
    };
    let encoded = UserOperationHashEncoded {
        encodedHash: keccak256(packed.abi_encode()),
        entryPoint: entry_point,
        chainId: U256::from(chain_id),
    };
    keccak256(encoded.abi_encode())
}

/// What the EntryPoint hands to `validateUserOp`: the operation plus the hash it computed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserOperationEnvelope {
    pub user_op: PackedUserOperation,
    pub user_op_hash: FixedBytes<32>,
}

impl UserOperationEnvelope {
    pub fn new(user_op: PackedUserOperation, user_op_hash: FixedBytes<32>) -> Self {
        Self {
            user_op,
            user_op_hash,
        }
    }
}

/// ERC-4337 host: hash supplied by the EntryPoint, nonces and fees owned by the EntryPoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryPointEnvironment;

impl Environment for EntryPointEnvironment {
    type Envelope = UserOperationEnvelope;

    fn operation_hash(&self, envelope: &UserOperationEnvelope) -> Option<FixedBytes<32>> {
        Some(envelope.user_op_hash)
    }

    fn signature<'a>(&self, envelope: &'a UserOperationEnvelope) -> &'a [u8] {
        &envelope.user_op.signature
    }
}

impl SmartAccount<EntryPointEnvironment> {
    pub fn new_with_entry_point(owner: Address, entry_point: Address) -> Result<Self, AccountError> {
        Self::new(owner, entry_point, EntryPointEnvironment)
    }

    /// `validateUserOp(userOp, userOpHash, missingAccountFunds)`.
    ///
    /// The prefund is paid whatever the signature outcome.
    pub fn validate_user_op<H: Host>(
        &self,
        host: &mut H,
        envelope: &UserOperationEnvelope,
        missing_account_funds: U256,
    ) -> Result<ValidationSignal, AccountError> {
        self.require_trusted_caller(host)?;
        let signal = self.validate_envelope(host, envelope)?;
        self.pay_prefund(host, missing_account_funds)?;
        Ok(signal)
    }

    /// Send `missing_account_funds` back to the EntryPoint; a failed send is ignored.
    pub fn pay_prefund<H: Host>(
        &self,
        host: &mut H,
        missing_account_funds: U256,
    ) -> Result<(), AccountError> {
        self.require_trusted_caller(host)?;
        let recipient = host.msg_sender();
        settle(host, recipient, missing_account_funds, PaymentPolicy::BestEffort)
    }
}
