//! Spending-key derivation for matched outputs.

use bitcoin::secp256k1::SecretKey;

use crate::receiving::ReceivedPayment;
use crate::Result;

/// `p_k = (b_spend + t_k) mod n`, the key-path signing key for the matched
/// output. `secret_bytes()` of the result is the 32-byte big-endian scalar.
///
/// Downstream signing may still need to negate for the output key's parity;
/// that is the signer's concern, not modeled here.
pub fn derive(spend_key: &SecretKey, payment: &ReceivedPayment) -> Result<SecretKey> {
    Ok(spend_key.add_tweak(&payment.tweak_data)?)
}
