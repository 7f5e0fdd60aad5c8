//! Origins of user-defined types.

use std::fmt;

use minicbor::data::Tag;
use minicbor::{Decoder, Encoder};

use crate::address::Address;
use crate::decode::{definite_array, read_tag};
use crate::error::EncodingError;
use crate::tags;

/// Where a user-defined type was declared.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Location {
    /// A named source unit.
    String(String),
    /// A bare identifier, for sources without a namespace.
    Identifier(String),
    /// A contract deployed under an account, addressed by name.
    Address { address: Address, name: String },
    /// A transaction, addressed by its identifier bytes.
    Transaction(Vec<u8>),
    /// A script, addressed by its identifier bytes.
    Script(Vec<u8>),
}

impl Location {
    pub(crate) fn encode(&self, e: &mut Encoder<&mut Vec<u8>>) -> Result<(), EncodingError> {
        match self {
            Location::String(name) => {
                e.tag(Tag::new(tags::STRING_LOCATION))?;
                e.str(name)?;
            }
            Location::Identifier(name) => {
                e.tag(Tag::new(tags::IDENTIFIER_LOCATION))?;
                e.str(name)?;
            }
            Location::Address { address, name } => {
                e.tag(Tag::new(tags::ADDRESS_LOCATION))?;
                e.array(2)?;
                e.bytes(address.trimmed())?;
                e.str(name)?;
            }
            Location::Transaction(id) => {
                e.tag(Tag::new(tags::TRANSACTION_LOCATION))?;
                e.bytes(id)?;
            }
            Location::Script(id) => {
                e.tag(Tag::new(tags::SCRIPT_LOCATION))?;
                e.bytes(id)?;
            }
        }
        Ok(())
    }

    pub(crate) fn decode(d: &mut Decoder<'_>) -> Result<Location, EncodingError> {
        let tag = read_tag(d)?;
        match tag {
            tags::STRING_LOCATION => Ok(Location::String(d.str()?.to_owned())),
            tags::IDENTIFIER_LOCATION => Ok(Location::Identifier(d.str()?.to_owned())),
            tags::ADDRESS_LOCATION => {
                definite_array(d, 2)?;
                let address = Address::from_bytes(d.bytes()?)?;
                let name = d.str()?.to_owned();
                Ok(Location::Address { address, name })
            }
            tags::TRANSACTION_LOCATION => Ok(Location::Transaction(d.bytes()?.to_vec())),
            tags::SCRIPT_LOCATION => Ok(Location::Script(d.bytes()?.to_vec())),
            other => Err(EncodingError::UnknownTag(other)),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::String(name) | Location::Identifier(name) => f.write_str(name),
            Location::Address { address, name } => write!(f, "{address}.{name}"),
            Location::Transaction(id) => {
                write!(f, "t.{}", data_encoding::HEXLOWER.encode(id))
            }
            Location::Script(id) => {
                write!(f, "s.{}", data_encoding::HEXLOWER.encode(id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(location: &Location) -> Location {
        let mut buf = Vec::new();
        let mut e = Encoder::new(&mut buf);
        location.encode(&mut e).unwrap();
        Location::decode(&mut Decoder::new(&buf)).unwrap()
    }

    #[test]
    fn string_location_bytes() {
        let mut buf = Vec::new();
        let mut e = Encoder::new(&mut buf);
        Location::String("test".into()).encode(&mut e).unwrap();
        assert_eq!(
            buf,
            vec![
                0xd8,
                tags::STRING_LOCATION as u8,
                0x64,
                b't',
                b'e',
                b's',
                b't',
            ]
        );
    }

    #[test]
    fn address_location_trims_address() {
        let location = Location::Address {
            address: Address::from_bytes(&[0x00, 0x01]).unwrap(),
            name: "C".into(),
        };
        let mut buf = Vec::new();
        let mut e = Encoder::new(&mut buf);
        location.encode(&mut e).unwrap();
        assert_eq!(
            buf,
            vec![
                0xd8,
                tags::ADDRESS_LOCATION as u8,
                0x82,
                0x41,
                0x01,
                0x61,
                b'C',
            ]
        );
        assert_eq!(roundtrip(&location), location);
    }

    #[test]
    fn all_variants_roundtrip() {
        for location in [
            Location::String("unit".into()),
            Location::Identifier("main".into()),
            Location::Address {
                address: Address::from_bytes(&[0x42]).unwrap(),
                name: "Registry".into(),
            },
            Location::Transaction(vec![1, 2, 3]),
            Location::Script(vec![]),
        ] {
            assert_eq!(roundtrip(&location), location);
        }
    }

    #[test]
    fn unknown_location_tag_fails() {
        // Tag 197 is inside the reserved location range but unassigned.
        let bytes = [0xd8, 197, 0x60];
        let result = Location::decode(&mut Decoder::new(&bytes));
        assert!(matches!(result, Err(EncodingError::UnknownTag(197))));
    }
}
