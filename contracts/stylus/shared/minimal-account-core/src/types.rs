//! Plain data shared by both account variants.

use alloc::vec::Vec;

use alloy_primitives::{Address, FixedBytes, U256};
use alloy_sol_types::{sol, SolCall};

use crate::errors::AccountError;

sol! {
    /// Call shape the owner signs over in `callData` (ERC-4337 variant).
    function execute(address dest, uint256 value, bytes functionData);
}

/// `{target, value, payload}` decoded from an envelope; drives the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallDescriptor {
    pub target: Address,
    pub value: U256,
    pub payload: Vec<u8>,
}

impl CallDescriptor {
    pub fn new(target: Address, value: U256, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            target,
            value,
            payload: payload.into(),
        }
    }

    /// Decode `execute(address,uint256,bytes)` calldata.
    pub fn decode_execute(call_data: &[u8]) -> Result<Self, AccountError> {
        let call =
            executeCall::abi_decode(call_data, true).map_err(|_| AccountError::MalformedCallData)?;
        Ok(Self {
            target: call.dest,
            value: call.value,
            payload: call.functionData.to_vec(),
        })
    }

    /// Encode as `execute(address,uint256,bytes)` calldata.
    pub fn encode_execute(&self) -> Vec<u8> {
        executeCall {
            dest: self.target,
            value: self.value,
            functionData: self.payload.clone().into(),
        }
        .abi_encode()
    }
}

/// Result of one low-level call: the success flag plus whatever bytes came back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    Success(Vec<u8>),
    Failure(Vec<u8>),
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    /// Success payload, or `ExecutionFailed` carrying the callee's revert data.
    pub fn into_result(self) -> Result<Vec<u8>, AccountError> {
        match self {
            CallOutcome::Success(data) => Ok(data),
            CallOutcome::Failure(data) => Err(AccountError::ExecutionFailed(data)),
        }
    }
}

/// Two-valued outcome of signature validation. Rejection is data, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationSignal {
    Authorized,
    Rejected,
}

/// ERC-4337 `SIG_VALIDATION_SUCCESS`.
pub const SIG_VALIDATION_SUCCESS: U256 = U256::ZERO;
/// ERC-4337 `SIG_VALIDATION_FAILED`.
pub const SIG_VALIDATION_FAILED: U256 = U256::from_limbs([1, 0, 0, 0]);

impl ValidationSignal {
    pub fn is_authorized(self) -> bool {
        self == ValidationSignal::Authorized
    }

    /// Packed `validationData` returned to an ERC-4337 EntryPoint (no time range, no aggregator).
    pub fn validation_data(self) -> U256 {
        match self {
            ValidationSignal::Authorized => SIG_VALIDATION_SUCCESS,
            ValidationSignal::Rejected => SIG_VALIDATION_FAILED,
        }
    }

    /// Magic value returned to a zkSync bootloader.
    pub fn magic(self) -> FixedBytes<4> {
        match self {
            ValidationSignal::Authorized => crate::zksync::ACCOUNT_VALIDATION_SUCCESS_MAGIC,
            ValidationSignal::Rejected => FixedBytes::ZERO,
        }
    }
}

/// How a settlement transfer treats a failed send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentPolicy {
    /// Send and ignore the outcome (ERC-4337 prefund).
    BestEffort,
    /// A failed send fails the whole call (bootloader payment).
    Checked,
}

/// Events an account emits through its host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountEvent {
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn execute_calldata_decodes_to_descriptor() {
        let call = CallDescriptor::new(
            address!("00000000000000000000000000000000000000aa"),
            U256::from(5u64),
            [0xde, 0xad],
        );
        let encoded = call.encode_execute();
        assert_eq!(&encoded[..4], executeCall::SELECTOR.as_slice());
        assert_eq!(CallDescriptor::decode_execute(&encoded), Ok(call));
    }

    #[test]
    fn truncated_calldata_is_malformed() {
        assert_eq!(
            CallDescriptor::decode_execute(&executeCall::SELECTOR),
            Err(AccountError::MalformedCallData)
        );
    }

    #[test]
    fn rejected_signal_maps_to_failure_codes() {
        assert_eq!(ValidationSignal::Rejected.validation_data(), SIG_VALIDATION_FAILED);
        assert_eq!(ValidationSignal::Rejected.magic(), FixedBytes::<4>::ZERO);
        assert_eq!(ValidationSignal::Authorized.validation_data(), U256::ZERO);
    }
}
