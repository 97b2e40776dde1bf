//! [`minimal_account_core::Host`] over the Stylus VM.
//!
//! Frame data (sender, self address, balance) is captured when the host is built. Calls and
//! signer recovery go through the contract's VM handle. Events are buffered and logged by the
//! contract once the core call returns.

use alloc::vec::Vec;

use minimal_account_core::{AccountEvent, CallOutcome, Host as AccountHost};
use stylus_sdk::{
    alloy_primitives::{Address, FixedBytes, U256},
    stylus_core::{
        calls::{context::Call, errors::Error as CallError},
        Host as StylusVm,
    },
};

use crate::utils::crypto::ecrecover_address;

pub struct StylusHost<'a> {
    vm: &'a dyn StylusVm,
    msg_sender: Address,
    contract_address: Address,
    balance: U256,
    events: Vec<AccountEvent>,
}

impl<'a> StylusHost<'a> {
    pub fn new(vm: &'a dyn StylusVm) -> Self {
        let contract_address = vm.contract_address();
        Self {
            vm,
            msg_sender: vm.msg_sender(),
            contract_address,
            balance: vm.balance(contract_address),
            events: Vec::new(),
        }
    }

    /// Events emitted during the call, in order.
    pub fn into_events(self) -> Vec<AccountEvent> {
        self.events
    }
}

impl AccountHost for StylusHost<'_> {
    fn msg_sender(&self) -> Address {
        self.msg_sender
    }

    fn contract_address(&self) -> Address {
        self.contract_address
    }

    fn self_balance(&self) -> U256 {
        self.balance
    }

    fn call(&mut self, target: Address, value: U256, data: &[u8]) -> CallOutcome {
        match self.vm.call(&Call::new().value(value), target, data) {
            Ok(output) => {
                self.balance = self.balance.saturating_sub(value);
                CallOutcome::Success(output)
            }
            Err(CallError::Revert(revert)) => CallOutcome::Failure(revert),
            Err(CallError::AbiDecodingFailed(_)) => CallOutcome::Failure(Vec::new()),
        }
    }

    fn recover_signer(&self, digest: FixedBytes<32>, signature: &[u8; 65]) -> Option<Address> {
        ecrecover_address(self.vm, digest, signature)
    }

    fn emit(&mut self, event: AccountEvent) {
        self.events.push(event);
    }
}
