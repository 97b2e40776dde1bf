//! zkSync-style bootloader account surface.
//!
//! Unlike the EntryPoint variant the account itself:
//! - advances its nonce through the nonce holder system contract before anything else;
//! - refuses transactions it cannot pay for;
//! - computes the canonical (EIP-712) transaction hash;
//! - pays the bootloader in a separate, checked step;
//! - routes calls to the deployer system contract through a system call.

use alloc::{borrow::Cow, vec::Vec};

use alloy_primitives::{address, Address, FixedBytes, U256};
use alloy_sol_types::{sol, Eip712Domain, SolCall, SolStruct};

use crate::{
    account::SmartAccount,
    environment::Environment,
    errors::AccountError,
    host::Host,
    settlement::settle,
    types::{CallDescriptor, CallOutcome, PaymentPolicy},
};

/// Formal address the bootloader calls accounts from.
pub const BOOTLOADER_FORMAL_ADDRESS: Address = address!("0000000000000000000000000000000000008001");
pub const NONCE_HOLDER_SYSTEM_CONTRACT: Address =
    address!("0000000000000000000000000000000000008003");
pub const DEPLOYER_SYSTEM_CONTRACT: Address = address!("0000000000000000000000000000000000008006");

/// Returned by `validateTransaction` when the signature is the owner's.
pub const ACCOUNT_VALIDATION_SUCCESS_MAGIC: FixedBytes<4> =
    FixedBytes(IAccount::validateTransactionCall::SELECTOR);

/// EIP-712 transaction type processed by custom accounts.
pub const EIP_712_TX_TYPE: u8 = 0x71;

sol! {
    /// Transaction as the bootloader passes it to accounts.
    #[derive(Default, Debug, PartialEq, Eq)]
    struct Transaction {
        uint256 txType;
        uint256 from;
        uint256 to;
        uint256 gasLimit;
        uint256 gasPerPubdataByteLimit;
        uint256 maxFeePerGas;
        uint256 maxPriorityFeePerGas;
        uint256 paymaster;
        uint256 nonce;
        uint256 value;
        uint256[4] reserved;
        bytes data;
        bytes signature;
        bytes32[] factoryDeps;
        bytes paymasterInput;
        bytes reservedDynamic;
    }

    interface IAccount {
        function validateTransaction(bytes32 txHash, bytes32 suggestedSignedHash, Transaction transaction)
            external
            payable
            returns (bytes4 magic);
    }

    interface INonceHolder {
        function incrementMinNonceIfEquals(uint256 expectedNonce) external;
        function getMinNonce(address account) external view returns (uint256);
    }

    interface IContractDeployer {
        function create(bytes32 salt, bytes32 bytecodeHash, bytes input) external payable returns (address);
        function create2(bytes32 salt, bytes32 bytecodeHash, bytes input) external payable returns (address);
    }
}

mod eip712 {
    alloy_sol_types::sol! {
        /// Signed view of a transaction: what the owner's EIP-712 signature covers.
        struct Transaction {
            uint256 txType;
            uint256 from;
            uint256 to;
            uint256 gasLimit;
            uint256 gasPerPubdataByteLimit;
            uint256 maxFeePerGas;
            uint256 maxPriorityFeePerGas;
            uint256 paymaster;
            uint256 nonce;
            uint256 value;
            bytes data;
            bytes32[] factoryDeps;
            bytes paymasterInput;
        }
    }
}

fn word_to_address(word: U256) -> Address {
    Address::from_word(FixedBytes::from(word.to_be_bytes::<32>()))
}

/// Widen an address into the `uint256` slots the transaction uses.
pub fn address_to_word(address: Address) -> U256 {
    U256::from_be_slice(address.as_slice())
}

/// `EIP712Domain(string name,string version,uint256 chainId)` with `zkSync` / `2`.
pub fn eip712_domain(chain_id: u64) -> Eip712Domain {
    Eip712Domain::new(
        Some(Cow::Borrowed("zkSync")),
        Some(Cow::Borrowed("2")),
        Some(U256::from(chain_id)),
        None,
        None,
    )
}

impl Transaction {
    pub fn from_address(&self) -> Address {
        word_to_address(self.from)
    }

    pub fn to_address(&self) -> Address {
        word_to_address(self.to)
    }

    pub fn paymaster_address(&self) -> Address {
        word_to_address(self.paymaster)
    }

    /// Fee reserved for the bootloader: `maxFeePerGas * gasLimit`.
    pub fn fee_amount(&self) -> U256 {
        self.maxFeePerGas.saturating_mul(self.gasLimit)
    }

    /// Balance the account must hold: the value, plus the fee unless a paymaster covers it.
    pub fn total_required_balance(&self) -> U256 {
        if self.paymaster_address() != Address::ZERO {
            self.value
        } else {
            self.fee_amount().saturating_add(self.value)
        }
    }

    /// Only EIP-712 (`0x71`) transactions are signed by this account; legacy, 2930 and 1559
    /// envelopes validate as rejected.
    pub fn is_eip712(&self) -> bool {
        self.txType == U256::from(EIP_712_TX_TYPE)
    }

    /// Canonical EIP-712 hash the owner signs. Defined for `0x71` transactions only; see
    /// [`Transaction::is_eip712`].
    pub fn encode_hash(&self, chain_id: u64) -> FixedBytes<32> {
        let signed = eip712::Transaction {
            txType: self.txType,
            from: self.from,
            to: self.to,
            gasLimit: self.gasLimit,
            gasPerPubdataByteLimit: self.gasPerPubdataByteLimit,
            maxFeePerGas: self.maxFeePerGas,
            maxPriorityFeePerGas: self.maxPriorityFeePerGas,
            paymaster: self.paymaster,
            nonce: self.nonce,
            value: self.value,
            data: self.data.clone(),
            factoryDeps: self.factoryDeps.clone(),
            paymasterInput: self.paymasterInput.clone(),
        };
        signed.eip712_signing_hash(&eip712_domain(chain_id))
    }

    pub fn call_descriptor(&self) -> CallDescriptor {
        CallDescriptor::new(self.to_address(), self.value, self.data.to_vec())
    }
}

/// Bootloader host for a given chain id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZkSyncEnvironment {
    pub chain_id: u64,
}

impl ZkSyncEnvironment {
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }
}

impl Environment for ZkSyncEnvironment {
    type Envelope = Transaction;

    fn operation_hash(&self, transaction: &Transaction) -> Option<FixedBytes<32>> {
        transaction
            .is_eip712()
            .then(|| transaction.encode_hash(self.chain_id))
    }

    fn signature<'a>(&self, transaction: &'a Transaction) -> &'a [u8] {
        &transaction.signature
    }

    fn advance_nonce<H: Host>(
        &self,
        host: &mut H,
        transaction: &Transaction,
    ) -> Result<(), AccountError> {
        let data = INonceHolder::incrementMinNonceIfEqualsCall {
            expectedNonce: transaction.nonce,
        }
        .abi_encode();
        match host.system_call(NONCE_HOLDER_SYSTEM_CONTRACT, U256::ZERO, &data) {
            CallOutcome::Success(_) => Ok(()),
            CallOutcome::Failure(revert) => Err(AccountError::NonceAdvanceFailed(revert)),
        }
    }

    fn check_balance<H: Host>(&self, host: &H, transaction: &Transaction) -> Result<(), AccountError> {
        let required = transaction.total_required_balance();
        let available = host.self_balance();
        if required > available {
            return Err(AccountError::InsufficientBalance {
                required,
                available,
            });
        }
        Ok(())
    }

    fn dispatch<H: Host>(&self, host: &mut H, call: &CallDescriptor) -> CallOutcome {
        if call.target == DEPLOYER_SYSTEM_CONTRACT {
            host.system_call(call.target, call.value, &call.payload)
        } else {
            host.call(call.target, call.value, &call.payload)
        }
    }

    fn not_trusted_caller(&self, caller: Address) -> AccountError {
        AccountError::NotBootloader { caller }
    }

    fn not_authorized(&self, caller: Address) -> AccountError {
        AccountError::NotBootloaderOrOwner { caller }
    }
}

impl SmartAccount<ZkSyncEnvironment> {
    /// Account trusting the formal bootloader address on `chain_id`.
    pub fn new_with_bootloader(owner: Address, chain_id: u64) -> Result<Self, AccountError> {
        Self::new(owner, BOOTLOADER_FORMAL_ADDRESS, ZkSyncEnvironment::new(chain_id))
    }

    /// `validateTransaction`: magic on success, zero when the signature is not the owner's.
    ///
    /// Nonce is consumed even when the signature is rejected.
    pub fn validate_transaction<H: Host>(
        &self,
        host: &mut H,
        transaction: &Transaction,
    ) -> Result<FixedBytes<4>, AccountError> {
        self.require_trusted_caller(host)?;
        let signal = self.validate_envelope(host, transaction)?;
        Ok(signal.magic())
    }

    /// `executeTransaction`: bootloader (after validation) or owner.
    pub fn execute_transaction<H: Host>(
        &self,
        host: &mut H,
        transaction: &Transaction,
    ) -> Result<Vec<u8>, AccountError> {
        self.execute(host, &transaction.call_descriptor())
    }

    /// `executeTransactionFromOutside`: anyone may submit; authorization comes from the signature.
    pub fn execute_transaction_from_outside<H: Host>(
        &self,
        host: &mut H,
        transaction: &Transaction,
    ) -> Result<Vec<u8>, AccountError> {
        let signal = self.validate_envelope(host, transaction)?;
        if !signal.is_authorized() {
            return Err(AccountError::InvalidSignature);
        }
        self.dispatch(host, &transaction.call_descriptor())
    }

    /// `payForTransaction`: send the fee to the bootloader; a failed send fails the call.
    pub fn pay_for_transaction<H: Host>(
        &self,
        host: &mut H,
        transaction: &Transaction,
    ) -> Result<(), AccountError> {
        self.require_trusted_caller(host)?;
        let bootloader = self.trusted_caller();
        settle(host, bootloader, transaction.fee_amount(), PaymentPolicy::Checked)
    }

    /// `prepareForPaymaster`: paymaster flows are not supported; accepted as a no-op.
    pub fn prepare_for_paymaster<H: Host>(
        &self,
        host: &mut H,
        _transaction: &Transaction,
    ) -> Result<(), AccountError> {
        self.require_trusted_caller(host)
    }
}
