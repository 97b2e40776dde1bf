use alloc::vec::Vec;
use core::fmt;

use alloy_primitives::{Address, U256};

/// Fatal account failures. Any of these aborts the enclosing top-level call.
///
/// A signature that does not belong to the owner is deliberately absent: it surfaces as
/// [`crate::ValidationSignal::Rejected`] so the privileged caller can apply its own policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// Ownership change attempted by someone other than the owner.
    NotOwner { caller: Address },
    /// Ownership cannot move to the zero address.
    InvalidOwner,
    /// `execute` caller is neither the trusted caller nor the owner.
    NotAuthorized { caller: Address },
    /// Validation/settlement caller is not the EntryPoint.
    NotFromTrustedCaller { caller: Address },
    /// Validation/settlement caller is not the bootloader.
    NotBootloader { caller: Address },
    /// Execution caller is neither the bootloader nor the owner.
    NotBootloaderOrOwner { caller: Address },
    /// Inner call reverted; carries the callee's revert data.
    ExecutionFailed(Vec<u8>),
    InsufficientBalance { required: U256, available: U256 },
    /// Nonce holder refused to advance (nonce already used or out of order).
    NonceAdvanceFailed(Vec<u8>),
    FailedToPayBootloader,
    /// Inline validation rejected a transaction submitted from outside.
    InvalidSignature,
    MalformedCallData,
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountError::NotOwner { caller } => write!(f, "caller {caller} is not the owner"),
            AccountError::InvalidOwner => f.write_str("owner cannot be the zero address"),
            AccountError::NotAuthorized { caller } => {
                write!(f, "caller {caller} is neither the entry point nor the owner")
            }
            AccountError::NotFromTrustedCaller { caller } => {
                write!(f, "caller {caller} is not the entry point")
            }
            AccountError::NotBootloader { caller } => {
                write!(f, "caller {caller} is not the bootloader")
            }
            AccountError::NotBootloaderOrOwner { caller } => {
                write!(f, "caller {caller} is neither the bootloader nor the owner")
            }
            AccountError::ExecutionFailed(data) => {
                write!(f, "execution failed ({} bytes of revert data)", data.len())
            }
            AccountError::InsufficientBalance {
                required,
                available,
            } => write!(f, "insufficient balance: required {required}, available {available}"),
            AccountError::NonceAdvanceFailed(_) => f.write_str("nonce holder rejected the nonce"),
            AccountError::FailedToPayBootloader => f.write_str("failed to pay the bootloader"),
            AccountError::InvalidSignature => f.write_str("invalid signature"),
            AccountError::MalformedCallData => f.write_str("malformed call data"),
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for AccountError {}
