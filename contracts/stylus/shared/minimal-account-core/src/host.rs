//! Chain capabilities an account needs during one top-level call.

use alloy_primitives::{Address, FixedBytes, U256};

use crate::types::{AccountEvent, CallOutcome};

/// Host abstraction, implemented differently on-chain (Stylus VM) vs off-chain (in-memory chain).
///
/// Every state change made through a host during a top-level call is expected to be rolled
/// back by the host if that call returns an error.
pub trait Host {
    /// Immediate caller of the current entry point.
    fn msg_sender(&self) -> Address;

    /// Address the account code is running at.
    fn contract_address(&self) -> Address;

    /// Native balance of the account itself.
    fn self_balance(&self) -> U256;

    /// Plain call carrying `value` and `data`, forwarding all available gas.
    fn call(&mut self, target: Address, value: U256, data: &[u8]) -> CallOutcome;

    /// Privileged call convention used for zkSync system contracts.
    fn system_call(&mut self, _target: Address, _value: U256, _data: &[u8]) -> CallOutcome {
        CallOutcome::Failure(alloc::vec::Vec::new())
    }

    /// Recover the signer of `digest`; `None` when recovery fails.
    fn recover_signer(&self, digest: FixedBytes<32>, signature: &[u8; 65]) -> Option<Address>;

    fn emit(&mut self, event: AccountEvent);
}
