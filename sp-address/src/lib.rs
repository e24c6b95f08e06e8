//! Silent payment address parsing and encoding (BIP352).
//!
//! A silent payment address packages the recipient's scan and spend public
//! keys into a single bech32m string. This crate owns the string format only;
//! key generation, output derivation, and scanning live in `sp-protocol`.

pub mod bech32m;

use std::convert::TryFrom;
use std::fmt;

use secp256k1::PublicKey;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// scan key (33) followed by spend key (33).
const PAYLOAD_LENGTH: usize = 66;
const HRP_MAINNET: &str = "sp";
const HRP_TESTNET: &str = "tsp";

/// Error types for silent payment address operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("unsupported network prefix \"{0}\"")]
    UnsupportedNetwork(String),
    #[error("unsupported address version {0}")]
    UnsupportedVersion(u8),
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(#[from] secp256k1::Error),
}

impl From<bech32m::Error> for Error {
    fn from(e: bech32m::Error) -> Self {
        Error::InvalidEncoding(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The network format used for this silent payment address.
///
/// Mainnet addresses start with `sp1`, testnet addresses with `tsp1`.
/// Signet and regtest reuse the testnet prefix.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    fn hrp(self) -> &'static str {
        match self {
            Network::Mainnet => HRP_MAINNET,
            Network::Testnet => HRP_TESTNET,
        }
    }

    fn from_hrp(hrp: &str) -> Result<Self> {
        match hrp {
            HRP_MAINNET => Ok(Network::Mainnet),
            HRP_TESTNET => Ok(Network::Testnet),
            _ => Err(Error::UnsupportedNetwork(hrp.to_string())),
        }
    }
}

/// A parsed silent payment address.
///
/// Immutable once constructed; this is the recipient's long-term published
/// artifact. The spend key may already carry a label tweak.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct SilentPaymentAddress {
    version: u8,
    scan_pubkey: PublicKey,
    spend_pubkey: PublicKey,
    network: Network,
}

impl SilentPaymentAddress {
    pub fn new(
        scan_pubkey: PublicKey,
        spend_pubkey: PublicKey,
        network: Network,
        version: u8,
    ) -> Result<Self> {
        // Version 0 is the only deployed format; anything else is reserved
        // for future protocol upgrades.
        if version != 0 {
            return Err(Error::UnsupportedVersion(version));
        }

        Ok(SilentPaymentAddress {
            version,
            scan_pubkey,
            spend_pubkey,
            network,
        })
    }

    /// Get the scan public key.
    pub fn scan_pubkey(&self) -> PublicKey {
        self.scan_pubkey
    }

    /// Get the spend public key.
    pub fn spend_pubkey(&self) -> PublicKey {
        self.spend_pubkey
    }

    /// Get the network.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Get the address version.
    pub fn version(&self) -> u8 {
        self.version
    }
}

impl fmt::Display for SilentPaymentAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", <SilentPaymentAddress as Into<String>>::into(*self))
    }
}

impl TryFrom<&str> for SilentPaymentAddress {
    type Error = Error;

    fn try_from(addr: &str) -> Result<Self> {
        let (hrp, version, payload) = bech32m::decode(addr)?;

        let network = Network::from_hrp(&hrp)?;

        if version != 0 {
            return Err(Error::UnsupportedVersion(version));
        }

        if payload.len() != PAYLOAD_LENGTH {
            return Err(Error::InvalidEncoding(format!(
                "wrong payload length, expected {}, got {}",
                PAYLOAD_LENGTH,
                payload.len()
            )));
        }

        let scan_pubkey = PublicKey::from_slice(&payload[..33])?;
        let spend_pubkey = PublicKey::from_slice(&payload[33..])?;

        SilentPaymentAddress::new(scan_pubkey, spend_pubkey, network, version)
    }
}

impl TryFrom<String> for SilentPaymentAddress {
    type Error = Error;

    fn try_from(addr: String) -> Result<Self> {
        addr.as_str().try_into()
    }
}

impl From<SilentPaymentAddress> for String {
    fn from(val: SilentPaymentAddress) -> Self {
        let mut payload = [0; PAYLOAD_LENGTH];
        payload[..33].copy_from_slice(&val.scan_pubkey.serialize());
        payload[33..].copy_from_slice(&val.spend_pubkey.serialize());

        bech32m::encode(val.network.hrp(), val.version, &payload)
    }
}

#[cfg(feature = "serde")]
impl Serialize for SilentPaymentAddress {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded: String = (*self).into();
        serializer.serialize_str(&encoded)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for SilentPaymentAddress {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let addr: String = Deserialize::deserialize(deserializer)?;

        SilentPaymentAddress::try_from(addr.as_str()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::{Secp256k1, SecretKey};

    fn test_address(scan_byte: u8, spend_byte: u8, network: Network) -> SilentPaymentAddress {
        let secp = Secp256k1::new();
        let scan = SecretKey::from_slice(&[scan_byte; 32]).unwrap();
        let spend = SecretKey::from_slice(&[spend_byte; 32]).unwrap();
        SilentPaymentAddress::new(
            scan.public_key(&secp),
            spend.public_key(&secp),
            network,
            0,
        )
        .unwrap()
    }

    #[test]
    fn roundtrip_both_networks() {
        for network in [Network::Mainnet, Network::Testnet] {
            let address = test_address(0x11, 0x22, network);
            let encoded: String = address.into();
            let parsed = SilentPaymentAddress::try_from(encoded.as_str()).unwrap();
            assert_eq!(parsed, address);
        }
    }

    #[test]
    fn mainnet_prefix() {
        let encoded: String = test_address(0x11, 0x22, Network::Mainnet).into();
        assert!(encoded.starts_with("sp1q"));
        let encoded: String = test_address(0x11, 0x22, Network::Testnet).into();
        assert!(encoded.starts_with("tsp1q"));
    }

    #[test]
    fn rejects_nonzero_version() {
        let address = test_address(0x11, 0x22, Network::Mainnet);
        let mut payload = [0; PAYLOAD_LENGTH];
        payload[..33].copy_from_slice(&address.scan_pubkey().serialize());
        payload[33..].copy_from_slice(&address.spend_pubkey().serialize());
        let encoded = bech32m::encode("sp", 1, &payload);
        assert!(matches!(
            SilentPaymentAddress::try_from(encoded.as_str()),
            Err(Error::UnsupportedVersion(1))
        ));
    }

    #[test]
    fn rejects_unknown_hrp() {
        let address = test_address(0x11, 0x22, Network::Mainnet);
        let mut payload = [0; PAYLOAD_LENGTH];
        payload[..33].copy_from_slice(&address.scan_pubkey().serialize());
        payload[33..].copy_from_slice(&address.spend_pubkey().serialize());
        let encoded = bech32m::encode("xsp", 0, &payload);
        assert!(matches!(
            SilentPaymentAddress::try_from(encoded.as_str()),
            Err(Error::UnsupportedNetwork(hrp)) if hrp == "xsp"
        ));
    }

    #[test]
    fn rejects_wrong_payload_length() {
        let address = test_address(0x11, 0x22, Network::Mainnet);
        let mut payload = vec![0u8; PAYLOAD_LENGTH];
        payload[..33].copy_from_slice(&address.scan_pubkey().serialize());
        payload[33..].copy_from_slice(&address.spend_pubkey().serialize());

        for wrong_length in [PAYLOAD_LENGTH - 1, PAYLOAD_LENGTH + 1] {
            let mut truncated = payload.clone();
            truncated.resize(wrong_length, 0x02);
            let encoded = bech32m::encode("sp", 0, &truncated);
            assert!(matches!(
                SilentPaymentAddress::try_from(encoded.as_str()),
                Err(Error::InvalidEncoding(_))
            ));
        }
    }

    #[test]
    fn rejects_off_curve_keys() {
        // 0x05 is not a valid compressed-point prefix byte.
        let mut payload = [0x02; PAYLOAD_LENGTH];
        payload[0] = 0x05;
        let encoded = bech32m::encode("sp", 0, &payload);
        assert!(matches!(
            SilentPaymentAddress::try_from(encoded.as_str()),
            Err(Error::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn single_character_mutations_never_parse() {
        let secp = Secp256k1::new();
        let mut rng = secp256k1::rand::thread_rng();
        const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

        for trial in 0..100 {
            let scan = SecretKey::new(&mut rng);
            let spend = SecretKey::new(&mut rng);
            let network = if trial % 2 == 0 {
                Network::Mainnet
            } else {
                Network::Testnet
            };
            let address = SilentPaymentAddress::new(
                scan.public_key(&secp),
                spend.public_key(&secp),
                network,
                0,
            )
            .unwrap();
            let encoded: String = address.into();
            assert!(SilentPaymentAddress::try_from(encoded.as_str()).is_ok());

            let bytes = encoded.as_bytes();
            for position in 0..bytes.len() {
                for &candidate in CHARSET.iter() {
                    if candidate == bytes[position] {
                        continue;
                    }
                    let mut mutated = bytes.to_vec();
                    mutated[position] = candidate;
                    let mutated = String::from_utf8(mutated).unwrap();
                    assert!(
                        SilentPaymentAddress::try_from(mutated.as_str()).is_err(),
                        "false accept at position {position} in {encoded}"
                    );
                }
            }
        }
    }
}
