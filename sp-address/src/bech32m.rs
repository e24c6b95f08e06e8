//! Bit-exact bech32m string codec (BIP-350).
//!
//! Silent payment addresses carry a 66-byte payload, which puts them past the
//! 90-character segwit limit. This codec accepts the 8..=120 character window
//! used for silent payments and keeps the rest of BIP-350 strict: the bech32m
//! checksum constant, canonical zero padding, and outright rejection of
//! mixed-case strings.

use thiserror::Error;

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const BECH32M_CONST: u32 = 0x2bc830a3;
const CHECKSUM_LENGTH: usize = 6;
const MIN_LENGTH: usize = 8;
const MAX_LENGTH: usize = 120;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid length {0}, expected {MIN_LENGTH} to {MAX_LENGTH} characters")]
    InvalidLength(usize),
    #[error("mixed-case string")]
    MixedCase,
    #[error("missing separator")]
    MissingSeparator,
    #[error("invalid character {0:?}")]
    InvalidCharacter(char),
    #[error("checksum mismatch")]
    InvalidChecksum,
    #[error("non-canonical padding")]
    InvalidPadding,
}

pub type Result<T> = std::result::Result<T, Error>;

fn polymod(values: &[u8]) -> u32 {
    const GEN: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];
    let mut chk: u32 = 1;
    for &v in values {
        let top = chk >> 25;
        chk = ((chk & 0x1ffffff) << 5) ^ u32::from(v);
        for (i, g) in GEN.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut values = Vec::with_capacity(hrp.len() * 2 + 1);
    values.extend(hrp.bytes().map(|b| b >> 5));
    values.push(0);
    values.extend(hrp.bytes().map(|b| b & 0x1f));
    values
}

/// Repack 8-bit bytes into 5-bit groups, zero-padding the final group.
fn to_base32(data: &[u8]) -> Vec<u8> {
    let mut groups = Vec::with_capacity((data.len() * 8 + 4) / 5);
    let mut acc = 0u32;
    let mut bits = 0;
    for &byte in data {
        acc = (acc << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            groups.push(((acc >> bits) & 0x1f) as u8);
        }
    }
    if bits > 0 {
        groups.push(((acc << (5 - bits)) & 0x1f) as u8);
    }
    groups
}

/// Repack 5-bit groups into bytes, rejecting non-canonical padding.
fn from_base32(groups: &[u8]) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(groups.len() * 5 / 8);
    let mut acc = 0u32;
    let mut bits = 0;
    for &group in groups {
        acc = (acc << 5) | u32::from(group);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            data.push(((acc >> bits) & 0xff) as u8);
        }
    }
    // Leftover bits must be the zero padding of the final byte, nothing more.
    if bits >= 5 || acc & ((1 << bits) - 1) != 0 {
        return Err(Error::InvalidPadding);
    }
    Ok(data)
}

/// Encode `version` (one 5-bit group) followed by `data` under `hrp`.
///
/// `hrp` must be lowercase US-ASCII and `version` must fit in 5 bits; both
/// hold for every silent payment network prefix, so encoding is infallible.
pub fn encode(hrp: &str, version: u8, data: &[u8]) -> String {
    debug_assert!(version < 32);
    debug_assert!(hrp.bytes().all(|b| (33..=126).contains(&b) && !b.is_ascii_uppercase()));

    let mut payload = Vec::with_capacity(1 + (data.len() * 8 + 4) / 5);
    payload.push(version);
    payload.extend(to_base32(data));

    let mut values = hrp_expand(hrp);
    values.extend_from_slice(&payload);
    values.extend_from_slice(&[0; CHECKSUM_LENGTH]);
    let residue = polymod(&values) ^ BECH32M_CONST;

    let mut encoded = String::with_capacity(hrp.len() + 1 + payload.len() + CHECKSUM_LENGTH);
    encoded.push_str(hrp);
    encoded.push('1');
    for &group in &payload {
        encoded.push(char::from(CHARSET[group as usize]));
    }
    for i in 0..CHECKSUM_LENGTH {
        let group = (residue >> (5 * (5 - i))) & 0x1f;
        encoded.push(char::from(CHARSET[group as usize]));
    }
    encoded
}

/// Decode a bech32m string into `(hrp, version, data)`.
///
/// Mixed-case input is rejected before lowercasing, per BIP-173/350.
pub fn decode(encoded: &str) -> Result<(String, u8, Vec<u8>)> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&encoded.len()) {
        return Err(Error::InvalidLength(encoded.len()));
    }
    let has_lower = encoded.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = encoded.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(Error::MixedCase);
    }
    let encoded = encoded.to_lowercase();

    let separator = encoded.rfind('1').ok_or(Error::MissingSeparator)?;
    if separator == 0 || encoded.len() - separator < 1 + 1 + CHECKSUM_LENGTH {
        return Err(Error::MissingSeparator);
    }
    let hrp = &encoded[..separator];
    if let Some(bad) = hrp.bytes().find(|b| !(33..=126).contains(b)) {
        return Err(Error::InvalidCharacter(char::from(bad)));
    }

    let mut values = Vec::with_capacity(encoded.len() - separator - 1);
    for c in encoded[separator + 1..].chars() {
        let group = CHARSET
            .iter()
            .position(|&s| char::from(s) == c)
            .ok_or(Error::InvalidCharacter(c))?;
        values.push(group as u8);
    }

    let mut checked = hrp_expand(hrp);
    checked.extend_from_slice(&values);
    if polymod(&checked) != BECH32M_CONST {
        return Err(Error::InvalidChecksum);
    }

    let version = values[0];
    let data = from_base32(&values[1..values.len() - CHECKSUM_LENGTH])?;
    Ok((hrp.to_string(), version, data))
}
