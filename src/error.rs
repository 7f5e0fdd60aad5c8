use crate::storage::StorageId;

/// Failure of an encode or decode pass.
///
/// Every decode failure is an *invalid encoding*; the variants are the
/// machine-readable subcategories. No error is recovered internally and a
/// failed decode never yields a partial value.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum EncodingError {
    #[error("unknown value tag {0}")]
    UnknownTag(u64),

    #[error("unknown static type tag {0}")]
    UnknownStaticTypeTag(u64),

    #[error("expected {expected} items, got {actual}")]
    ArityMismatch { expected: u64, actual: u64 },

    #[error("{type_name} value out of range")]
    OutOfRange { type_name: &'static str },

    #[error("negative value for unsigned type {type_name}")]
    NegativeUnsigned { type_name: &'static str },

    #[error("unknown primitive static type {0}")]
    UnknownPrimitive(u64),

    #[error("unknown path domain {0}")]
    BadPathDomain(u64),

    #[error("unknown composite kind {0}")]
    UnknownCompositeKind(u64),

    #[error("address too long: {0} bytes")]
    OversizedAddress(usize),

    #[error("missing storage block {0}")]
    MissingBlock(StorageId),

    #[error("cyclic storage reference through block {0}")]
    CyclicReference(StorageId),

    #[error("non-canonical encoding: {0}")]
    NonCanonical(&'static str),

    #[error("malformed CBOR: {0}")]
    Cbor(#[from] minicbor::decode::Error),

    #[error("encode failed: {0}")]
    Encode(String),
}

// The codec encodes into in-memory buffers, so the CBOR writer itself cannot
// fail; this covers the type-level possibility.
impl From<minicbor::encode::Error<std::convert::Infallible>> for EncodingError {
    fn from(err: minicbor::encode::Error<std::convert::Infallible>) -> Self {
        EncodingError::Encode(err.to_string())
    }
}
