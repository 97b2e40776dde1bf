//! Minimal single-owner ERC-4337 account for Arbitrum Stylus.
//!
//! Authorization, execution and prefund settlement live in `minimal-account-core`; this crate
//! binds them to contract storage and the Stylus VM.

#![cfg_attr(not(any(test, feature = "export-abi")), no_main)]
#![cfg_attr(not(any(test, feature = "export-abi")), no_std)]

#[macro_use]
extern crate alloc;

pub mod account;
pub mod errors;
pub mod host;
pub mod utils;

pub use account::MinimalAccount;
pub use errors::AccountErrors;
