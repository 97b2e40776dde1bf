//! Off-chain helpers for the minimal account: calldata, user operations, zkSync transactions.

pub mod encoder;
pub mod types;

mod tests;
