//! Solidity-facing revert errors.

use alloy_sol_types::sol;
use minimal_account_core::AccountError;
use stylus_sdk::stylus_proc::SolidityError;

sol! {
    error MinimalAccount__NotFromEntryPoint(address caller);
    error MinimalAccount__NotFromEntryPointOrOwner(address caller);
    error MinimalAccount__NotOwner(address caller);
    error MinimalAccount__InvalidOwner();
    error MinimalAccount__CallFailed(bytes result);
    error MinimalAccount__InsufficientBalance(uint256 required, uint256 available);
    error MinimalAccount__NonceAdvanceFailed(bytes result);
    error MinimalAccount__FailedToPay();
    error MinimalAccount__InvalidSignature();
    error MinimalAccount__MalformedCallData();
}

#[derive(SolidityError)]
pub enum AccountErrors {
    NotFromEntryPoint(MinimalAccount__NotFromEntryPoint),
    NotFromEntryPointOrOwner(MinimalAccount__NotFromEntryPointOrOwner),
    NotOwner(MinimalAccount__NotOwner),
    InvalidOwner(MinimalAccount__InvalidOwner),
    CallFailed(MinimalAccount__CallFailed),
    InsufficientBalance(MinimalAccount__InsufficientBalance),
    NonceAdvanceFailed(MinimalAccount__NonceAdvanceFailed),
    FailedToPay(MinimalAccount__FailedToPay),
    InvalidSignature(MinimalAccount__InvalidSignature),
    MalformedCallData(MinimalAccount__MalformedCallData),
}

impl From<AccountError> for AccountErrors {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFromTrustedCaller { caller } | AccountError::NotBootloader { caller } => {
                AccountErrors::NotFromEntryPoint(MinimalAccount__NotFromEntryPoint { caller })
            }
            AccountError::NotAuthorized { caller }
            | AccountError::NotBootloaderOrOwner { caller } => {
                AccountErrors::NotFromEntryPointOrOwner(MinimalAccount__NotFromEntryPointOrOwner {
                    caller,
                })
            }
            AccountError::NotOwner { caller } => {
                AccountErrors::NotOwner(MinimalAccount__NotOwner { caller })
            }
            AccountError::InvalidOwner => AccountErrors::InvalidOwner(MinimalAccount__InvalidOwner {}),
            AccountError::ExecutionFailed(result) => {
                AccountErrors::CallFailed(MinimalAccount__CallFailed {
                    result: result.into(),
                })
            }
            AccountError::InsufficientBalance {
                required,
                available,
            } => AccountErrors::InsufficientBalance(MinimalAccount__InsufficientBalance {
                required,
                available,
            }),
            AccountError::NonceAdvanceFailed(result) => {
                AccountErrors::NonceAdvanceFailed(MinimalAccount__NonceAdvanceFailed {
                    result: result.into(),
                })
            }
            AccountError::FailedToPayBootloader => {
                AccountErrors::FailedToPay(MinimalAccount__FailedToPay {})
            }
            AccountError::InvalidSignature => {
                AccountErrors::InvalidSignature(MinimalAccount__InvalidSignature {})
            }
            AccountError::MalformedCallData => {
                AccountErrors::MalformedCallData(MinimalAccount__MalformedCallData {})
            }
        }
    }
}
