//! Authorization and execution core for the minimal smart account.
//!
//! The same owner-signature authorization pattern is served to two hosts:
//! - an ERC-4337 EntryPoint (see [`entry_point`]), where the relay owns nonce bookkeeping;
//! - a zkSync-style bootloader (see [`zksync`]), where the account advances its own nonce,
//!   checks its balance and routes deployments through a system contract.
//!
//! Both are expressed as one [`SmartAccount`] parameterised by an [`Environment`] adapter, and
//! every chain interaction goes through the [`Host`] trait so the core runs unchanged inside a
//! Stylus contract and inside the in-memory chain used by the tests.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod account;
pub mod entry_point;
pub mod environment;
pub mod errors;
pub mod host;
pub mod ownership;
pub mod settlement;
pub mod signature;
pub mod types;
pub mod zksync;

#[cfg(feature = "testing")]
pub mod testing;

pub use account::SmartAccount;
pub use entry_point::{EntryPointEnvironment, PackedUserOperation, UserOperationEnvelope};
pub use environment::Environment;
pub use errors::AccountError;
pub use host::Host;
pub use types::{AccountEvent, CallDescriptor, CallOutcome, PaymentPolicy, ValidationSignal};
pub use zksync::{Transaction, ZkSyncEnvironment};
