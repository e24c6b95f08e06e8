//! Silent payment address generation, including labeled variants.
//!
//! Labels let one base key pair publish distinguishable sub-addresses. The
//! tweak binds the label integer to the scan key, so only the recipient can
//! link a labeled address back to its base.

use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};
use sp_address::{Network, SilentPaymentAddress};

use crate::hash;
use crate::{Error, Result};

/// Labels occupy 31 bits.
pub const MAX_LABEL: u32 = (1 << 31) - 1;

/// Derive the published address for a scan/spend key pair.
///
/// With a label, the spend key is tweaked to `B_spend + label_tweak*G`
/// before encoding; the scan key is published unmodified so one scan key
/// serves every label.
pub fn generate(
    scan_key: &SecretKey,
    spend_key: &SecretKey,
    network: Network,
    label: Option<u32>,
) -> Result<SilentPaymentAddress> {
    let secp = Secp256k1::new();
    let scan_pubkey = scan_key.public_key(&secp);
    let mut spend_pubkey = spend_key.public_key(&secp);

    if let Some(label) = label {
        let tweak = label_tweak(scan_key, label)?;
        spend_pubkey = labeled_spend_key(&spend_pubkey, &tweak)?;
    }

    Ok(SilentPaymentAddress::new(
        scan_pubkey,
        spend_pubkey,
        network,
        0,
    )?)
}

/// `hash_label(ser(b_scan) || be32(m))`, the scalar behind label `m`.
///
/// Public so wallets can precompute the tweaks for their known labels and
/// feed the resulting spend keys to the scanner's candidate set.
pub fn label_tweak(scan_key: &SecretKey, label: u32) -> Result<SecretKey> {
    if label > MAX_LABEL {
        return Err(Error::LabelOutOfRange(label));
    }
    hash::label_hash(scan_key, label)
}

/// `B_spend + label_tweak*G`, the spend key a labeled address publishes.
pub fn labeled_spend_key(spend_pubkey: &PublicKey, label_tweak: &SecretKey) -> Result<PublicKey> {
    let secp = Secp256k1::new();
    Ok(spend_pubkey.combine(&label_tweak.public_key(&secp))?)
}
