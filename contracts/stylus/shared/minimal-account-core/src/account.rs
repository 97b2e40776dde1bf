//! The account aggregate: owner, trusted caller and the shared validate/execute pipeline.

use alloc::vec::Vec;

use alloy_primitives::{Address, FixedBytes};

use crate::{
    environment::Environment,
    errors::AccountError,
    host::Host,
    ownership::Ownership,
    signature::{parse_signature, to_eth_signed_message_hash},
    types::{CallDescriptor, ValidationSignal},
};

/// One deployed account instance.
///
/// `trusted_caller` (EntryPoint or bootloader) is fixed at construction; the owner can move
/// but never becomes the zero address.
#[derive(Clone, Debug)]
pub struct SmartAccount<E> {
    ownership: Ownership,
    trusted_caller: Address,
    environment: E,
}

impl<E: Environment> SmartAccount<E> {
    pub fn new(owner: Address, trusted_caller: Address, environment: E) -> Result<Self, AccountError> {
        Ok(Self {
            ownership: Ownership::new(owner)?,
            trusted_caller,
            environment,
        })
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn trusted_caller(&self) -> Address {
        self.trusted_caller
    }

    /// Alias of [`Self::trusted_caller`] under its ERC-4337 name.
    pub fn get_entry_point(&self) -> Address {
        self.trusted_caller
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    pub fn transfer_ownership<H: Host>(
        &mut self,
        host: &mut H,
        new_owner: Address,
    ) -> Result<(), AccountError> {
        self.ownership.transfer_ownership(host, new_owner)
    }

    /// Recover the signer of `operation_hash` (EIP-191 transformed) and compare to the owner.
    ///
    /// Malformed signatures and failed recoveries are `Rejected`, never errors.
    pub fn validate<H: Host>(
        &self,
        host: &H,
        operation_hash: FixedBytes<32>,
        signature: &[u8],
    ) -> ValidationSignal {
        let Some(signature) = parse_signature(signature) else {
            return ValidationSignal::Rejected;
        };
        let digest = to_eth_signed_message_hash(operation_hash);
        match host.recover_signer(digest, &signature) {
            Some(signer) if self.ownership.is_owner(signer) => ValidationSignal::Authorized,
            _ => ValidationSignal::Rejected,
        }
    }

    /// Environment pipeline: advance nonce, check balance, then verify the owner's signature.
    ///
    /// Nonce and balance failures are fatal; a bad signature is returned as `Rejected`.
    pub fn validate_envelope<H: Host>(
        &self,
        host: &mut H,
        envelope: &E::Envelope,
    ) -> Result<ValidationSignal, AccountError> {
        self.environment.advance_nonce(host, envelope)?;
        self.environment.check_balance(host, envelope)?;
        let Some(hash) = self.environment.operation_hash(envelope) else {
            return Ok(ValidationSignal::Rejected);
        };
        Ok(self.validate(host, hash, self.environment.signature(envelope)))
    }

    /// Execute a call on behalf of the account. Caller must be the trusted caller or the owner.
    pub fn execute<H: Host>(
        &self,
        host: &mut H,
        call: &CallDescriptor,
    ) -> Result<Vec<u8>, AccountError> {
        let caller = host.msg_sender();
        if caller != self.trusted_caller && !self.ownership.is_owner(caller) {
            return Err(self.environment.not_authorized(caller));
        }
        self.dispatch(host, call)
    }

    pub(crate) fn dispatch<H: Host>(
        &self,
        host: &mut H,
        call: &CallDescriptor,
    ) -> Result<Vec<u8>, AccountError> {
        self.environment.dispatch(host, call).into_result()
    }

    pub(crate) fn require_trusted_caller<H: Host>(&self, host: &H) -> Result<(), AccountError> {
        let caller = host.msg_sender();
        if caller != self.trusted_caller {
            return Err(self.environment.not_trusted_caller(caller));
        }
        Ok(())
    }
}
