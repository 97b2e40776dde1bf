//! Stylus binding of the ERC-4337 account.
//!
//! Storage holds the owner and the EntryPoint; every entry point rebuilds the core account from
//! storage, runs it against a [`StylusHost`], then writes back what changed.

use alloc::vec::Vec;

use alloy_sol_types::sol;
use minimal_account_core::{
    AccountEvent, CallDescriptor, EntryPointEnvironment, PackedUserOperation, SmartAccount,
    UserOperationEnvelope,
};
use stylus_sdk::{
    abi::Bytes,
    alloy_primitives::{Address, FixedBytes, U256},
    prelude::*,
    stylus_core::log,
};

use crate::{errors::AccountErrors, host::StylusHost};

sol! {
    event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);
}

/// `PackedUserOperation` as a tuple:
/// (sender, nonce, initCode, callData, accountGasLimits, preVerificationGas, gasFees,
/// paymasterAndData, signature).
pub type UserOpTuple = (
    Address,
    U256,
    Bytes,
    Bytes,
    FixedBytes<32>,
    U256,
    FixedBytes<32>,
    Bytes,
    Bytes,
);

fn user_op_from_tuple(user_op: UserOpTuple) -> PackedUserOperation {
    let (
        sender,
        nonce,
        init_code,
        call_data,
        account_gas_limits,
        pre_verification_gas,
        gas_fees,
        paymaster_and_data,
        signature,
    ) = user_op;
    PackedUserOperation {
        sender,
        nonce,
        initCode: init_code.0.into(),
        callData: call_data.0.into(),
        accountGasLimits: account_gas_limits,
        preVerificationGas: pre_verification_gas,
        gasFees: gas_fees,
        paymasterAndData: paymaster_and_data.0.into(),
        signature: signature.0.into(),
    }
}

sol_storage! {
    #[entrypoint]
    pub struct MinimalAccount {
        address owner;
        /// EntryPoint allowed to validate and execute; fixed at deployment.
        address entry_point;
    }
}

#[public]
impl MinimalAccount {
    /// Owner is the deploying EOA.
    #[constructor]
    pub fn constructor(&mut self, entry_point: Address) -> Result<(), AccountErrors> {
        let owner = self.vm().tx_origin();
        self.init(owner, entry_point)
    }

    #[receive]
    #[payable]
    pub fn receive(&mut self) -> Result<(), Vec<u8>> {
        Ok(())
    }

    /// ERC-4337 `validateUserOp`.
    ///
    /// Returns `0` when the owner signed `userOpHash` (EIP-191), `1` otherwise. The prefund is
    /// paid either way.
    pub fn validate_user_op(
        &mut self,
        // NOTE: tuple rather than a `sol!` struct; the ABI encoding is identical.
        user_op: UserOpTuple,
        user_op_hash: FixedBytes<32>,
        missing_account_funds: U256,
    ) -> Result<U256, AccountErrors> {
        let account = self.account()?;
        let envelope = UserOperationEnvelope::new(user_op_from_tuple(user_op), user_op_hash);
        let mut host = self.host();
        let signal = account.validate_user_op(&mut host, &envelope, missing_account_funds)?;
        Ok(signal.validation_data())
    }

    /// Call `dest` with `value` and `func`. EntryPoint or owner only.
    pub fn execute(&mut self, dest: Address, value: U256, func: Bytes) -> Result<Bytes, AccountErrors> {
        let account = self.account()?;
        let mut host = self.host();
        let output = account.execute(&mut host, &CallDescriptor::new(dest, value, func.0))?;
        Ok(output.into())
    }

    pub fn owner(&self) -> Address {
        self.owner.get()
    }

    pub fn get_entry_point(&self) -> Address {
        self.entry_point.get()
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) -> Result<(), AccountErrors> {
        let mut account = self.account()?;
        let mut host = self.host();
        account.transfer_ownership(&mut host, new_owner)?;
        let events = host.into_events();
        self.owner.set(account.owner());
        self.log_events(events);
        Ok(())
    }
}

impl MinimalAccount {
    /// Write the initial owner and EntryPoint. Zero owner is refused.
    pub fn init(&mut self, owner: Address, entry_point: Address) -> Result<(), AccountErrors> {
        let account = SmartAccount::new_with_entry_point(owner, entry_point)?;
        self.owner.set(account.owner());
        self.entry_point.set(account.get_entry_point());
        Ok(())
    }

    fn account(&self) -> Result<SmartAccount<EntryPointEnvironment>, AccountErrors> {
        Ok(SmartAccount::new_with_entry_point(
            self.owner.get(),
            self.entry_point.get(),
        )?)
    }

    fn host(&self) -> StylusHost<'_> {
        StylusHost::new(self.vm())
    }

    fn log_events(&self, events: Vec<AccountEvent>) {
        for event in events {
            match event {
                AccountEvent::OwnershipTransferred {
                    previous_owner,
                    new_owner,
                } => log(
                    self.vm(),
                    OwnershipTransferred {
                        previousOwner: previous_owner,
                        newOwner: new_owner,
                    },
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto::{ecrecover_input, ECRECOVER};
    use minimal_account_core::{entry_point::ENTRY_POINT_V07, signature::to_eth_signed_message_hash};
    use stylus_sdk::{alloy_primitives::address, testing::*};

    const OWNER: Address = address!("00000000000000000000000000000000000000a1");
    const STRANGER: Address = address!("00000000000000000000000000000000000000e5");
    const RECIPIENT: Address = address!("00000000000000000000000000000000000000b0");

    /// Well-formed `r || s || v`; what it recovers to is decided by the mocked precompile.
    fn owner_signature() -> [u8; 65] {
        let mut sig = [0x11u8; 65];
        sig[64] = 27;
        sig
    }

    /// Make the precompile recover `signer` for `sig` over the EIP-191 digest of `hash`.
    fn mock_recovery(vm: &TestVM, hash: FixedBytes<32>, sig: &[u8; 65], signer: Address) {
        let digest = to_eth_signed_message_hash(hash);
        let mut word = vec![0u8; 12];
        word.extend_from_slice(signer.as_slice());
        vm.mock_static_call(ECRECOVER, ecrecover_input(digest, sig).to_vec(), Ok(word));
    }

    fn signed_user_op(sig: &[u8; 65]) -> UserOpTuple {
        let mut user_op = empty_user_op();
        user_op.8 = Bytes(sig.to_vec());
        user_op
    }

    fn deployed(vm: &TestVM) -> MinimalAccount {
        let mut contract = MinimalAccount::from(vm);
        assert!(contract.init(OWNER, ENTRY_POINT_V07).is_ok());
        contract
    }

    fn empty_user_op() -> UserOpTuple {
        (
            STRANGER,
            U256::ZERO,
            Bytes(Vec::new()),
            Bytes(Vec::new()),
            FixedBytes::ZERO,
            U256::ZERO,
            FixedBytes::ZERO,
            Bytes(Vec::new()),
            Bytes(Vec::new()),
        )
    }

    #[test]
    fn init_stores_owner_and_entry_point() {
        let vm = TestVM::default();
        let contract = deployed(&vm);
        assert_eq!(contract.owner(), OWNER);
        assert_eq!(contract.get_entry_point(), ENTRY_POINT_V07);
    }

    #[test]
    fn zero_owner_is_refused() {
        let vm = TestVM::default();
        let mut contract = MinimalAccount::from(&vm);
        assert!(matches!(
            contract.init(Address::ZERO, ENTRY_POINT_V07),
            Err(AccountErrors::InvalidOwner(_))
        ));
    }

    #[test]
    fn validation_is_entry_point_only() {
        let vm = TestVM::default();
        let mut contract = deployed(&vm);
        vm.set_sender(STRANGER);
        let result = contract.validate_user_op(empty_user_op(), FixedBytes::ZERO, U256::ZERO);
        assert!(matches!(result, Err(AccountErrors::NotFromEntryPoint(_))));
    }

    #[test]
    fn execute_is_entry_point_or_owner_only() {
        let vm = TestVM::default();
        let mut contract = deployed(&vm);
        vm.set_sender(STRANGER);
        let result = contract.execute(OWNER, U256::ZERO, Bytes(Vec::new()));
        assert!(matches!(
            result,
            Err(AccountErrors::NotFromEntryPointOrOwner(_))
        ));
    }

    #[test]
    fn ownership_moves_only_at_owner_request() {
        let vm = TestVM::default();
        let mut contract = deployed(&vm);

        vm.set_sender(STRANGER);
        assert!(matches!(
            contract.transfer_ownership(STRANGER),
            Err(AccountErrors::NotOwner(_))
        ));

        vm.set_sender(OWNER);
        assert!(matches!(
            contract.transfer_ownership(Address::ZERO),
            Err(AccountErrors::InvalidOwner(_))
        ));
        assert!(contract.transfer_ownership(STRANGER).is_ok());
        assert_eq!(contract.owner(), STRANGER);
    }

    #[test]
    fn owner_executes_plain_transfer() {
        let vm = TestVM::default();
        let mut contract = deployed(&vm);
        vm.set_sender(OWNER);
        vm.mock_call(RECIPIENT, Vec::new(), Ok(vec![0x01]));

        let output = contract.execute(RECIPIENT, U256::from(5u64), Bytes(Vec::new()));
        assert!(matches!(output, Ok(ref data) if data.0 == vec![0x01]));
    }

    #[test]
    fn entry_point_execute_surfaces_callee_revert() {
        let vm = TestVM::default();
        let mut contract = deployed(&vm);
        vm.set_sender(ENTRY_POINT_V07);
        vm.mock_call(RECIPIENT, vec![0xab], Err(vec![0xee]));

        let result = contract.execute(RECIPIENT, U256::ZERO, Bytes(vec![0xab]));
        assert!(matches!(
            result,
            Err(AccountErrors::CallFailed(ref failed)) if failed.result.to_vec() == vec![0xee]
        ));
    }

    #[test]
    fn owner_signature_validates_with_zero_data() {
        let vm = TestVM::default();
        let mut contract = deployed(&vm);
        vm.set_sender(ENTRY_POINT_V07);
        let hash = FixedBytes::repeat_byte(0x42);
        let sig = owner_signature();
        mock_recovery(&vm, hash, &sig, OWNER);

        let result = contract.validate_user_op(signed_user_op(&sig), hash, U256::ZERO);
        assert!(matches!(result, Ok(data) if data == U256::ZERO));
    }

    #[test]
    fn foreign_signature_validates_with_failure_data() {
        let vm = TestVM::default();
        let mut contract = deployed(&vm);
        vm.set_sender(ENTRY_POINT_V07);
        let hash = FixedBytes::repeat_byte(0x42);
        let sig = owner_signature();
        mock_recovery(&vm, hash, &sig, STRANGER);

        let result = contract.validate_user_op(signed_user_op(&sig), hash, U256::ZERO);
        assert!(matches!(result, Ok(data) if data == U256::from(1u64)));
    }
}
