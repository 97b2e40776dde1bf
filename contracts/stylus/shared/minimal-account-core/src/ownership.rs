//! Single-owner guard: the authorization anchor of the account.

use alloy_primitives::Address;

use crate::{errors::AccountError, host::Host, types::AccountEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ownership {
    owner: Address,
}

impl Ownership {
    /// Initial owner, normally the deployer.
    pub fn new(owner: Address) -> Result<Self, AccountError> {
        if owner == Address::ZERO {
            return Err(AccountError::InvalidOwner);
        }
        Ok(Self { owner })
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_owner(&self, who: Address) -> bool {
        who == self.owner
    }

    /// Move ownership to `new_owner`. Only the current owner may call this.
    pub fn transfer_ownership<H: Host>(
        &mut self,
        host: &mut H,
        new_owner: Address,
    ) -> Result<(), AccountError> {
        let caller = host.msg_sender();
        if !self.is_owner(caller) {
            return Err(AccountError::NotOwner { caller });
        }
        if new_owner == Address::ZERO {
            return Err(AccountError::InvalidOwner);
        }
        let previous_owner = self.owner;
        self.owner = new_owner;
        host.emit(AccountEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }
}
