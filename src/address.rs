//! Account addresses (8 bytes, fixed width).

use std::fmt;

use crate::error::EncodingError;

/// Width of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 8;

/// An account address.
///
/// Addresses are stored and compared at their full fixed width. On the wire
/// the leading zero bytes are trimmed; [`Address::from_bytes`] reconstructs
/// the full width by left-padding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0; ADDRESS_LENGTH]);

    pub const fn new(raw: [u8; ADDRESS_LENGTH]) -> Self {
        Address(raw)
    }

    /// Builds an address from up to [`ADDRESS_LENGTH`] bytes, left-padding
    /// with zeros. Longer inputs fail with [`EncodingError::OversizedAddress`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncodingError> {
        if bytes.len() > ADDRESS_LENGTH {
            return Err(EncodingError::OversizedAddress(bytes.len()));
        }
        let mut raw = [0u8; ADDRESS_LENGTH];
        raw[ADDRESS_LENGTH - bytes.len()..].copy_from_slice(bytes);
        Ok(Address(raw))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// The wire form: the address bytes with leading zeros stripped.
    /// The zero address trims to the empty slice.
    pub fn trimmed(&self) -> &[u8] {
        let start = self
            .0
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(ADDRESS_LENGTH);
        &self.0[start..]
    }

    pub fn to_hex(&self) -> String {
        data_encoding::HEXLOWER.encode(&self.0)
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(raw: [u8; ADDRESS_LENGTH]) -> Self {
        Address(raw)
    }
}

impl From<Address> for [u8; ADDRESS_LENGTH] {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}
