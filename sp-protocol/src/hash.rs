//! BIP0352 tagged hashes.
//!
//! All protocol hashing is domain-separated:
//! `H_tag(x) = SHA256(SHA256(tag) || SHA256(tag) || x)`.

use bitcoin::hashes::{sha256, Hash, HashEngine};
use bitcoin::secp256k1::{PublicKey, SecretKey};
use zeroize::Zeroize;

use crate::Result;

pub const INPUTS_TAG: &str = "BIP0352/Inputs";
pub const LABEL_TAG: &str = "BIP0352/Label";
pub const SHARED_SECRET_TAG: &str = "BIP0352/SharedSecret";

fn tagged_engine(tag: &str) -> sha256::HashEngine {
    let tag_hash = sha256::Hash::hash(tag.as_bytes());
    let mut engine = sha256::Hash::engine();
    engine.input(tag_hash.as_ref());
    engine.input(tag_hash.as_ref());
    engine
}

/// Domain-separated hash of `data` under `tag`.
pub fn tagged_hash(tag: &str, data: &[u8]) -> [u8; 32] {
    let mut engine = tagged_engine(tag);
    engine.input(data);
    sha256::Hash::from_engine(engine).to_byte_array()
}

/// Finalize a tagged engine into a scalar, wiping the digest buffer.
///
/// `SecretKey::from_slice` enforces the mod-n range and rejects zero; a
/// digest landing outside the group order is a ~2^-128 event surfaced as a
/// curve error rather than silently reduced.
fn scalar_from_engine(engine: sha256::HashEngine) -> Result<SecretKey> {
    let mut digest = sha256::Hash::from_engine(engine).to_byte_array();
    let scalar = SecretKey::from_slice(&digest)?;
    digest.zeroize();
    Ok(scalar)
}

/// `hash(outpoint_L || ser(A))`, binding every output of a transaction to
/// its input set.
pub(crate) fn input_hash(smallest_outpoint: &[u8; 36], input_sum: &PublicKey) -> Result<SecretKey> {
    let mut engine = tagged_engine(INPUTS_TAG);
    engine.input(smallest_outpoint);
    engine.input(&input_sum.serialize());
    scalar_from_engine(engine)
}

/// `hash(ser(b_scan) || be32(m))`, the label tweak scalar.
pub(crate) fn label_hash(scan_key: &SecretKey, label: u32) -> Result<SecretKey> {
    let mut engine = tagged_engine(LABEL_TAG);
    let mut scan_bytes = scan_key.secret_bytes();
    engine.input(&scan_bytes);
    scan_bytes.zeroize();
    engine.input(&label.to_be_bytes());
    scalar_from_engine(engine)
}

/// `t_k = hash(ser(S) || be32(k))`, the per-output tweak.
pub(crate) fn shared_secret_hash(ecdh_shared_secret: &PublicKey, k: u32) -> Result<SecretKey> {
    let mut engine = tagged_engine(SHARED_SECRET_TAG);
    engine.input(&ecdh_shared_secret.serialize());
    engine.input(&k.to_be_bytes());
    scalar_from_engine(engine)
}
