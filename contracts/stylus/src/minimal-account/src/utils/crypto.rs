//! Signer recovery through the EVM `ecrecover` precompile.

use stylus_sdk::{
    alloy_primitives::{address, Address, FixedBytes},
    stylus_core::{calls::context::Call, Host},
};

/// Precompile address 0x01.
pub const ECRECOVER: Address = address!("0000000000000000000000000000000000000001");

/// `digest || v || r || s`, each a 32-byte word.
pub fn ecrecover_input(digest: FixedBytes<32>, sig: &[u8; 65]) -> [u8; 128] {
    let mut input = [0u8; 128];
    input[0..32].copy_from_slice(digest.as_slice());
    input[63] = sig[64];
    input[64..96].copy_from_slice(&sig[0..32]);
    input[96..128].copy_from_slice(&sig[32..64]);
    input
}

/// Recover an EOA address from a 32-byte digest and a normalised `r || s || v` signature
/// (`v` in {27,28}).
///
/// Returns `None` when the precompile fails or returns no address.
pub fn ecrecover_address(vm: &dyn Host, digest: FixedBytes<32>, sig: &[u8; 65]) -> Option<Address> {
    let input = ecrecover_input(digest, sig);
    let out = vm
        .static_call(&Call::new().gas(50_000), ECRECOVER, &input)
        .ok()?;
    if out.len() < 32 {
        return None;
    }
    // precompile returns 32-byte word with address in the low 20 bytes.
    let recovered = Address::from_slice(&out[12..32]);
    (recovered != Address::ZERO).then_some(recovered)
}
