//! Environment adapters: what differs between an EntryPoint host and a bootloader host.

use alloy_primitives::{Address, FixedBytes};

use crate::{
    errors::AccountError,
    host::Host,
    types::{CallDescriptor, CallOutcome},
};

/// Capability set a host environment plugs into [`crate::SmartAccount`].
///
/// Defaults describe the ERC-4337 shape: the caller owns nonces and fees, and every call is a
/// plain call.
pub trait Environment {
    /// Signed unit of intent this environment submits for validation.
    type Envelope;

    /// Canonical hash of the envelope's authorization-relevant fields, or `None` when the
    /// envelope has no hash this account can sign (it then validates as rejected).
    fn operation_hash(&self, envelope: &Self::Envelope) -> Option<FixedBytes<32>>;

    /// Raw owner signature carried by the envelope.
    fn signature<'a>(&self, envelope: &'a Self::Envelope) -> &'a [u8];

    /// Consume the envelope's nonce. Runs before any other validation step.
    fn advance_nonce<H: Host>(
        &self,
        _host: &mut H,
        _envelope: &Self::Envelope,
    ) -> Result<(), AccountError> {
        Ok(())
    }

    /// Fail if the account cannot cover what the envelope may spend.
    fn check_balance<H: Host>(
        &self,
        _host: &H,
        _envelope: &Self::Envelope,
    ) -> Result<(), AccountError> {
        Ok(())
    }

    /// Perform the call; environments may route some targets through privileged collaborators.
    fn dispatch<H: Host>(&self, host: &mut H, call: &CallDescriptor) -> CallOutcome {
        host.call(call.target, call.value, &call.payload)
    }

    fn not_trusted_caller(&self, caller: Address) -> AccountError {
        AccountError::NotFromTrustedCaller { caller }
    }

    fn not_authorized(&self, caller: Address) -> AccountError {
        AccountError::NotAuthorized { caller }
    }
}
