//! Sender-side derivation of silent payment outputs.
//!
//! The expensive part, aggregating the input scalars and running ECDH
//! against the recipient's scan key, depends only on the transaction's
//! inputs and the recipient address. [`OutputBuilder`] does that work once;
//! each call to [`OutputBuilder::output`] then derives one output key from
//! the cached shared secret and an output index.

use bitcoin::key::TweakedPublicKey;
use bitcoin::secp256k1::{Parity, PublicKey, Scalar, Secp256k1, SecretKey, Signing};
use bitcoin::{Amount, OutPoint, ScriptBuf, XOnlyPublicKey};
use sp_address::SilentPaymentAddress;

use crate::common;
use crate::hash;
use crate::{Error, Result};

/// One UTXO the sender is spending.
///
/// `private_key` is the key controlling the output; ownership is assumed,
/// not verified beyond scalar validity. For taproot key-path inputs it is
/// the output key's scalar, after any script-tree tweaking.
#[derive(Clone, Debug)]
pub struct SenderInput {
    pub outpoint: OutPoint,
    pub script_pubkey: ScriptBuf,
    pub private_key: SecretKey,
    pub is_taproot_key_path: bool,
    pub taproot_internal_key: Option<XOnlyPublicKey>,
}

/// A derived one-time taproot output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SilentPaymentOutput {
    /// 34-byte P2TR script: `OP_1 0x20 <x-only key>`.
    pub script_pubkey: ScriptBuf,
    pub amount: Amount,
    pub tweaked_pubkey: XOnlyPublicKey,
}

/// The scalar an input contributes to the aggregate.
///
/// Taproot key-path outputs commit to the even-Y lift of the output key, so
/// a key whose point has odd Y enters the sum negated.
fn eligible_scalar<C: Signing>(secp: &Secp256k1<C>, input: &SenderInput) -> SecretKey {
    let pubkey = input.private_key.public_key(secp);
    if input.is_taproot_key_path && pubkey.x_only_public_key().1 == Parity::Odd {
        input.private_key.negate()
    } else {
        input.private_key
    }
}

/// `a = sum(a_i) mod n` over the eligible input scalars.
fn aggregate_input_scalars<C: Signing>(
    secp: &Secp256k1<C>,
    inputs: &[SenderInput],
) -> Result<SecretKey> {
    let mut scalars = inputs.iter().map(|input| eligible_scalar(secp, input));
    let first = scalars.next().ok_or(Error::EmptyInputs)?;
    scalars.try_fold(first, |sum, scalar| {
        sum.add_tweak(&Scalar::from(scalar))
            .map_err(|_| Error::DegenerateAggregate)
    })
}

/// Per-recipient ECDH state for one transaction.
pub struct OutputBuilder {
    spend_pubkey: PublicKey,
    ecdh_shared_secret: PublicKey,
}

impl OutputBuilder {
    /// Aggregate the inputs and compute `S = (input_hash * a) * B_scan`.
    pub fn new(address: &SilentPaymentAddress, inputs: &[SenderInput]) -> Result<Self> {
        let secp = Secp256k1::new();

        let mut aggregate = aggregate_input_scalars(&secp, inputs)?;
        let input_pubkey_sum = aggregate.public_key(&secp);

        let outpoints: Vec<OutPoint> = inputs.iter().map(|input| input.outpoint).collect();
        let outpoint_l = common::smallest_outpoint(&outpoints)?;
        let mut input_hash = hash::input_hash(&outpoint_l, &input_pubkey_sum)?;

        let mut partial_secret = aggregate.mul_tweak(&Scalar::from(input_hash))?;
        aggregate.non_secure_erase();
        input_hash.non_secure_erase();

        let ecdh_shared_secret = address
            .scan_pubkey()
            .mul_tweak(&secp, &Scalar::from(partial_secret))?;
        partial_secret.non_secure_erase();

        Ok(OutputBuilder {
            spend_pubkey: address.spend_pubkey(),
            ecdh_shared_secret,
        })
    }

    /// Derive the output for index `k`: `P_k = B_spend + t_k*G`.
    pub fn output(&self, amount: Amount, k: u32) -> Result<SilentPaymentOutput> {
        if amount == Amount::ZERO {
            return Err(Error::InvalidAmount);
        }

        let mut t_k = hash::shared_secret_hash(&self.ecdh_shared_secret, k)?;
        let output_key = common::output_key(&self.spend_pubkey, &t_k)?;
        t_k.non_secure_erase();

        let (tweaked_pubkey, _) = output_key.x_only_public_key();
        let script_pubkey =
            ScriptBuf::new_p2tr_tweaked(TweakedPublicKey::dangerous_assume_tweaked(tweaked_pubkey));

        Ok(SilentPaymentOutput {
            script_pubkey,
            amount,
            tweaked_pubkey,
        })
    }
}

/// Parse `address`, build the shared secret, and derive one output.
pub fn create_output(
    address: &str,
    inputs: &[SenderInput],
    amount: Amount,
    k: u32,
) -> Result<SilentPaymentOutput> {
    let address = SilentPaymentAddress::try_from(address)?;
    OutputBuilder::new(&address, inputs)?.output(amount, k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::hashes::Hash;
    use bitcoin::Txid;

    fn input(private_key: SecretKey, vout: u32, taproot: bool) -> SenderInput {
        SenderInput {
            outpoint: OutPoint {
                txid: Txid::from_byte_array([0xab; 32]),
                vout,
            },
            script_pubkey: ScriptBuf::new(),
            private_key,
            is_taproot_key_path: taproot,
            taproot_internal_key: None,
        }
    }

    #[test]
    fn taproot_odd_y_key_is_negated() {
        let secp = Secp256k1::new();
        // 0x11..11 * G has odd Y; 0x22..22 * G has even Y.
        let odd = SecretKey::from_slice(&[0x11; 32]).unwrap();
        assert_eq!(odd.public_key(&secp).x_only_public_key().1, Parity::Odd);
        let even = SecretKey::from_slice(&[0x22; 32]).unwrap();
        assert_eq!(even.public_key(&secp).x_only_public_key().1, Parity::Even);

        assert_eq!(
            eligible_scalar(&secp, &input(odd, 0, true)),
            odd.negate()
        );
        assert_eq!(eligible_scalar(&secp, &input(odd, 0, false)), odd);
        assert_eq!(eligible_scalar(&secp, &input(even, 0, true)), even);
    }

    #[test]
    fn cancelling_inputs_are_rejected() {
        let secp = Secp256k1::new();
        let key = SecretKey::from_slice(&[0x11; 32]).unwrap();
        let inputs = [input(key, 0, false), input(key.negate(), 1, false)];
        assert!(matches!(
            aggregate_input_scalars(&secp, &inputs),
            Err(Error::DegenerateAggregate)
        ));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let secp = Secp256k1::new();
        assert!(matches!(
            aggregate_input_scalars(&secp, &[]),
            Err(Error::EmptyInputs)
        ));
    }
}
