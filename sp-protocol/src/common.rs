//! Helpers shared by the sending and scanning paths.
//!
//! Both sides of the protocol must serialize and order outpoints
//! identically; a disagreement here silently desynchronizes their input
//! hashes, so the comparator lives in exactly one place.

use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use bitcoin::OutPoint;

use crate::{Error, Result};

/// Serialized outpoint: the 32-byte txid in raw (little-endian) order
/// followed by the 4-byte little-endian vout.
pub(crate) fn serialize_outpoint(outpoint: &OutPoint) -> [u8; 36] {
    let mut bytes = [0u8; 36];
    bytes[..32].copy_from_slice(&outpoint.txid.to_raw_hash().to_byte_array());
    bytes[32..].copy_from_slice(&outpoint.vout.to_le_bytes());
    bytes
}

/// The byte-wise smallest serialized outpoint of the transaction.
pub(crate) fn smallest_outpoint(outpoints: &[OutPoint]) -> Result<[u8; 36]> {
    outpoints
        .iter()
        .map(serialize_outpoint)
        .min()
        .ok_or(Error::EmptyInputs)
}

/// Point-sum of the transaction's eligible input public keys.
pub(crate) fn sum_input_keys(input_keys: &[PublicKey]) -> Result<PublicKey> {
    let mut keys = input_keys.iter();
    let first = *keys.next().ok_or(Error::EmptyInputs)?;
    keys.try_fold(first, |sum, key| {
        sum.combine(key).map_err(|_| Error::DegenerateAggregate)
    })
}

/// `P_k = B_spend + t_k*G`.
pub(crate) fn output_key(spend_pubkey: &PublicKey, t_k: &SecretKey) -> Result<PublicKey> {
    let secp = Secp256k1::new();
    Ok(spend_pubkey.add_exp_tweak(&secp, &Scalar::from(*t_k))?)
}
