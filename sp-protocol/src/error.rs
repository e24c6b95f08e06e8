use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Address parsing and generation
    #[error(transparent)]
    Address(#[from] sp_address::Error),
    #[error("label {0} out of range, labels are limited to 31 bits")]
    LabelOutOfRange(u32),

    // Transaction material
    #[error("transaction has no eligible inputs")]
    EmptyInputs,
    #[error("aggregated input key sums to zero")]
    DegenerateAggregate,
    #[error("output amount must be a positive number of satoshis")]
    InvalidAmount,

    // Wrapped curve errors
    #[error(transparent)]
    Secp256k1(#[from] bitcoin::secp256k1::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
