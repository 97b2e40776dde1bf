//! Paying the privileged caller for gas it advanced on the account's behalf.

use alloy_primitives::{Address, U256};

use crate::{
    errors::AccountError,
    host::Host,
    types::{CallOutcome, PaymentPolicy},
};

/// Send `amount` of native value to `recipient`.
///
/// `BestEffort` skips zero amounts and never fails; `Checked` always sends and turns a failed
/// send into [`AccountError::FailedToPayBootloader`].
pub fn settle<H: Host>(
    host: &mut H,
    recipient: Address,
    amount: U256,
    policy: PaymentPolicy,
) -> Result<(), AccountError> {
    match policy {
        PaymentPolicy::BestEffort => {
            if !amount.is_zero() {
                // Outcome intentionally ignored.
                let _ = host.call(recipient, amount, &[]);
            }
            Ok(())
        }
        PaymentPolicy::Checked => match host.call(recipient, amount, &[]) {
            CallOutcome::Success(_) => Ok(()),
            CallOutcome::Failure(_) => Err(AccountError::FailedToPayBootloader),
        },
    }
}
