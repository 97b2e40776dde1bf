//! Minimal stand-ins for the privileged callers: an ERC-4337 EntryPoint and a zkSync bootloader.
//!
//! They only do what the account's contract with its caller requires: nonce bookkeeping on the
//! EntryPoint side, the validate → pay → execute sequence on the bootloader side.

use alloc::vec::Vec;

use alloy_primitives::{Address, FixedBytes, U256};

use super::{slot, MemoryChain};
use crate::{
    account::SmartAccount,
    entry_point::{hash_user_operation, EntryPointEnvironment, PackedUserOperation, UserOperationEnvelope},
    errors::AccountError,
    types::CallDescriptor,
    zksync::{Transaction, ZkSyncEnvironment, ACCOUNT_VALIDATION_SUCCESS_MAGIC},
};

/// Outcome of an operation that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpReceipt {
    pub success: bool,
    /// Return data on success, revert data otherwise.
    pub output: Vec<u8>,
}

impl OpReceipt {
    fn from_execution(result: Result<Vec<u8>, AccountError>) -> Result<Self, AccountError> {
        match result {
            Ok(output) => Ok(Self {
                success: true,
                output,
            }),
            Err(AccountError::ExecutionFailed(output)) => Ok(Self {
                success: false,
                output,
            }),
            Err(AccountError::MalformedCallData) => Ok(Self {
                success: false,
                output: Vec::new(),
            }),
            Err(other) => Err(other),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandleOpError {
    /// `nonce` does not match the sender's next sequence for its key.
    InvalidNonce { expected: U256, actual: U256 },
    SignatureRejected,
    Account(AccountError),
}

impl From<AccountError> for HandleOpError {
    fn from(err: AccountError) -> Self {
        HandleOpError::Account(err)
    }
}

/// EntryPoint v0.7 subset: 2D nonces (`key << 64 | sequence`), validation, then execution of
/// `execute(address,uint256,bytes)` call data.
pub struct EntryPointSimulator {
    pub address: Address,
}

impl EntryPointSimulator {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    fn nonce_slot(sender: Address, key: U256) -> FixedBytes<32> {
        slot(&[b"nonce", sender.as_slice(), &key.to_be_bytes::<32>()])
    }

    /// Next full nonce the EntryPoint expects from `sender` under `key`.
    pub fn get_nonce(&self, chain: &MemoryChain, sender: Address, key: U256) -> U256 {
        let sequence = chain.state().sload(self.address, Self::nonce_slot(sender, key));
        (key << 64) | sequence
    }

    pub fn user_op_hash(&self, chain: &MemoryChain, user_op: &PackedUserOperation) -> FixedBytes<32> {
        hash_user_operation(user_op, self.address, chain.chain_id())
    }

    /// Validate and execute one operation for `account` deployed at `user_op.sender`.
    ///
    /// A rejected signature aborts the whole operation (nothing, including the prefund,
    /// persists); a failed execution, undecodable call data included, keeps the consumed nonce
    /// and the prefund.
    pub fn handle_op(
        &self,
        chain: &mut MemoryChain,
        account: &SmartAccount<EntryPointEnvironment>,
        user_op: PackedUserOperation,
        missing_account_funds: U256,
    ) -> Result<OpReceipt, HandleOpError> {
        let user_op_hash = self.user_op_hash(chain, &user_op);
        let sender = user_op.sender;
        let entry_point = self.address;
        chain.transact(entry_point, sender, |frame| {
            let key = user_op.nonce >> 64;
            let nonce_slot = Self::nonce_slot(sender, key);
            let sequence = frame.state().sload(entry_point, nonce_slot);
            let expected = (key << 64) | sequence;
            if user_op.nonce != expected {
                return Err(HandleOpError::InvalidNonce {
                    expected,
                    actual: user_op.nonce,
                });
            }
            frame
                .state_mut()
                .sstore(entry_point, nonce_slot, sequence + U256::from(1u64));

            let envelope = UserOperationEnvelope::new(user_op, user_op_hash);
            let signal = account.validate_user_op(frame, &envelope, missing_account_funds)?;
            if !signal.is_authorized() {
                return Err(HandleOpError::SignatureRejected);
            }
            // Execution phase: undecodable call data is an execution failure.
            let result = CallDescriptor::decode_execute(&envelope.user_op.callData)
                .and_then(|call| account.execute(frame, &call));
            Ok(OpReceipt::from_execution(result)?)
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessTxError {
    /// Validation returned something other than the success magic.
    ValidationRejected(FixedBytes<4>),
    Account(AccountError),
}

impl From<AccountError> for ProcessTxError {
    fn from(err: AccountError) -> Self {
        ProcessTxError::Account(err)
    }
}

/// Bootloader subset: validate → pay → execute, as the formal bootloader address.
pub struct BootloaderSimulator;

impl BootloaderSimulator {
    pub fn process_transaction(
        chain: &mut MemoryChain,
        account: &SmartAccount<ZkSyncEnvironment>,
        account_address: Address,
        transaction: &Transaction,
    ) -> Result<OpReceipt, ProcessTxError> {
        let bootloader = account.trusted_caller();
        chain.transact(bootloader, account_address, |frame| {
            let magic = account.validate_transaction(frame, transaction)?;
            if magic != ACCOUNT_VALIDATION_SUCCESS_MAGIC {
                return Err(ProcessTxError::ValidationRejected(magic));
            }
            account.pay_for_transaction(frame, transaction)?;
            Ok(OpReceipt::from_execution(
                account.execute_transaction(frame, transaction),
            )?)
        })
    }
}
