//! Recipient-side transaction scanning.
//!
//! The scanner mirrors the sender's math from public data plus the scan
//! key: `(input_hash * b_scan) * A` equals the sender's
//! `(input_hash * a) * B_scan` because `A = a*G` and `B_scan = b_scan*G`.
//! Everything that depends only on the transaction, the input-key sum and
//! the shared secret, is computed once; per-output work is one tagged hash
//! and one point addition per candidate spend key.

use bitcoin::secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use bitcoin::{Amount, OutPoint, ScriptBuf, XOnlyPublicKey};

use crate::common;
use crate::hash;
use crate::Result;

/// A candidate output of the transaction under scan.
#[derive(Clone, Debug)]
pub struct OutputToScan {
    pub script_pubkey: ScriptBuf,
    pub amount: Amount,
}

/// An output recognized as paying one of our spend keys.
#[derive(Clone, Debug)]
pub struct ReceivedPayment {
    pub output_index: u32,
    pub amount: Amount,
    /// `t_k`, the scalar added to the spend key when signing for this output.
    pub tweak_data: Scalar,
    pub tweaked_pubkey: XOnlyPublicKey,
}

/// Scan one transaction's outputs against a set of candidate spend keys.
///
/// `spend_keys` is ordered; index 0 is conventionally the base spend key,
/// with label-tweaked variants (see [`crate::address::labeled_spend_key`])
/// after it. `input_keys` are the transaction's declared input public keys,
/// already filtered for eligibility by the caller.
///
/// Returns every match in output order. Non-taproot outputs are skipped
/// before any curve work; the output index still counts them, matching the
/// sender's use of the literal index as `k`.
pub fn scan_transaction(
    scan_key: &SecretKey,
    spend_keys: &[PublicKey],
    input_keys: &[PublicKey],
    outpoints: &[OutPoint],
    outputs: &[OutputToScan],
) -> Result<Vec<ReceivedPayment>> {
    let secp = Secp256k1::new();

    let input_sum = common::sum_input_keys(input_keys)?;
    let outpoint_l = common::smallest_outpoint(outpoints)?;
    let mut input_hash = hash::input_hash(&outpoint_l, &input_sum)?;

    let mut partial_secret = scan_key.mul_tweak(&Scalar::from(input_hash))?;
    input_hash.non_secure_erase();
    let ecdh_shared_secret = input_sum.mul_tweak(&secp, &Scalar::from(partial_secret))?;
    partial_secret.non_secure_erase();

    let mut payments = Vec::new();
    for (index, output) in outputs.iter().enumerate() {
        if !output.script_pubkey.is_p2tr() {
            continue;
        }
        let index = index as u32;
        let t_k = hash::shared_secret_hash(&ecdh_shared_secret, index)?;
        let witness_program = &output.script_pubkey.as_bytes()[2..];

        for spend_key in spend_keys {
            let (tweaked_pubkey, _) = common::output_key(spend_key, &t_k)?.x_only_public_key();
            if tweaked_pubkey.serialize().as_slice() == witness_program {
                log::debug!("matched silent payment output at index {index}");
                payments.push(ReceivedPayment {
                    output_index: index,
                    amount: output.amount,
                    tweak_data: Scalar::from(t_k),
                    tweaked_pubkey,
                });
                break;
            }
        }
    }

    Ok(payments)
}
