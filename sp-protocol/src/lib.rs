//! BIP352 Silent Payments: output construction, scanning, and spend key
//! derivation.
//!
//! Every operation here is a pure function over byte buffers and curve
//! points; nothing does I/O or holds state across calls. The `sending` and
//! `receiving` features gate the two sides of the protocol, both on by
//! default.

pub mod address;
mod error;
pub mod hash;

#[cfg(any(feature = "sending", feature = "receiving"))]
mod common;

#[cfg(feature = "receiving")]
pub mod receiving;
#[cfg(feature = "sending")]
pub mod sending;
#[cfg(feature = "receiving")]
pub mod spend;

pub use bitcoin;
pub use sp_address::{Network, SilentPaymentAddress};

pub use crate::error::{Error, Result};
