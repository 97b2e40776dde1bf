//! Signature helpers shared by the on-chain validator and the off-chain signer.

use alloc::vec::Vec;

use alloy_primitives::{keccak256, uint, FixedBytes, U256};

/// `secp256k1n / 2`; larger `s` values are malleable and rejected.
pub const SECP256K1N_HALF: U256 =
    uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

/// EIP-191 personal-message digest of a 32-byte hash:
/// `keccak256("\x19Ethereum Signed Message:\n32" || hash)`.
pub fn to_eth_signed_message_hash(hash: FixedBytes<32>) -> FixedBytes<32> {
    let mut buf = Vec::with_capacity(28 + 32);
    buf.extend_from_slice(b"\x19Ethereum Signed Message:\n32");
    buf.extend_from_slice(hash.as_slice());
    keccak256(buf)
}

/// Normalise an `r || s || v` signature.
///
/// Accepts `v` in {0,1,27,28} and returns the signature with `v` in {27,28}. Anything else
/// (wrong length, zero `r`/`s`, high `s`, unknown `v`) yields `None`.
pub fn parse_signature(sig: &[u8]) -> Option<[u8; 65]> {
    if sig.len() != 65 {
        return None;
    }
    let r = U256::from_be_slice(&sig[0..32]);
    let s = U256::from_be_slice(&sig[32..64]);
    if r.is_zero() || s.is_zero() || s > SECP256K1N_HALF {
        return None;
    }
    let v = match sig[64] {
        0 | 1 => sig[64] + 27,
        27 | 28 => sig[64],
        _ => return None,
    };
    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&sig[..64]);
    out[64] = v;
    Some(out)
}

#[cfg(feature = "k256")]
pub use self::ecdsa::{address_of, recover_address, sign_digest, sign_hash_eip191};

#[cfg(feature = "k256")]
mod ecdsa {
    use alloy_primitives::{keccak256, Address, FixedBytes};
    use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

    /// Ethereum address of a secp256k1 public key.
    pub fn address_of(key: &VerifyingKey) -> Address {
        let point = key.to_encoded_point(false);
        let hash = keccak256(&point.as_bytes()[1..]);
        Address::from_slice(&hash[12..])
    }

    /// Recover the signer of a prehashed digest from a normalised (`v` in {27,28}) signature.
    pub fn recover_address(digest: FixedBytes<32>, sig: &[u8; 65]) -> Option<Address> {
        let signature = Signature::from_slice(&sig[..64]).ok()?;
        let recovery_id = RecoveryId::from_byte(sig[64].checked_sub(27)?)?;
        let key =
            VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery_id).ok()?;
        Some(address_of(&key))
    }

    /// Sign a prehashed digest, producing `r || s || v` with `v` in {27,28}.
    pub fn sign_digest(
        key: &SigningKey,
        digest: FixedBytes<32>,
    ) -> Result<[u8; 65], k256::ecdsa::Error> {
        let (signature, recovery_id) = key.sign_prehash_recoverable(digest.as_slice())?;
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte() + 27;
        Ok(out)
    }

    /// Sign `hash` the way an owner wallet does (`personal_sign` over the 32 hash bytes).
    pub fn sign_hash_eip191(
        key: &SigningKey,
        hash: FixedBytes<32>,
    ) -> Result<[u8; 65], k256::ecdsa::Error> {
        sign_digest(key, super::to_eth_signed_message_hash(hash))
    }
}
