//! Static types: the compile-time type metadata carried inside values.
//!
//! Static types appear inside link values, type values, capability borrow
//! types, and container block headers. They are a closed family, distinct
//! from the runtime value variants.

use minicbor::data::{Tag, Type};
use minicbor::{Decoder, Encoder};

use crate::decode::{definite_array, definite_array_len, expect_null, read_tag};
use crate::error::EncodingError;
use crate::location::Location;
use crate::primitive::PrimitiveType;
use crate::tags;

/// A user-defined type named by its origin and qualified identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NominalType {
    pub location: Location,
    /// Dotted path uniquely naming the type within its location.
    pub qualified_identifier: String,
}

impl NominalType {
    pub fn new(location: Location, qualified_identifier: impl Into<String>) -> Self {
        NominalType {
            location,
            qualified_identifier: qualified_identifier.into(),
        }
    }
}

/// A static type descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum StaticType {
    Primitive(PrimitiveType),
    Optional(Box<StaticType>),
    VariableSized(Box<StaticType>),
    ConstantSized {
        size: u64,
        element: Box<StaticType>,
    },
    Dictionary {
        key: Box<StaticType>,
        value: Box<StaticType>,
    },
    Composite(NominalType),
    Interface(NominalType),
    Reference {
        authorized: bool,
        referenced: Box<StaticType>,
    },
    Restricted {
        base: Box<StaticType>,
        restrictions: Vec<NominalType>,
    },
    /// A capability, optionally constrained to a borrow type.
    Capability(Option<Box<StaticType>>),
}

impl StaticType {
    /// Shorthand for the common leaf case.
    pub fn primitive(primitive: PrimitiveType) -> Self {
        StaticType::Primitive(primitive)
    }

    pub fn variable_sized(element: StaticType) -> Self {
        StaticType::VariableSized(Box::new(element))
    }

    pub fn constant_sized(size: u64, element: StaticType) -> Self {
        StaticType::ConstantSized {
            size,
            element: Box::new(element),
        }
    }

    pub fn dictionary(key: StaticType, value: StaticType) -> Self {
        StaticType::Dictionary {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub(crate) fn encode(&self, e: &mut Encoder<&mut Vec<u8>>) -> Result<(), EncodingError> {
        match self {
            StaticType::Primitive(primitive) => {
                e.tag(Tag::new(tags::PRIMITIVE_STATIC_TYPE))?;
                e.u8(primitive.discriminator())?;
            }
            StaticType::Optional(inner) => {
                e.tag(Tag::new(tags::OPTIONAL_STATIC_TYPE))?;
                inner.encode(e)?;
            }
            StaticType::VariableSized(element) => {
                e.tag(Tag::new(tags::VARIABLE_SIZED_STATIC_TYPE))?;
                element.encode(e)?;
            }
            StaticType::ConstantSized { size, element } => {
                e.tag(Tag::new(tags::CONSTANT_SIZED_STATIC_TYPE))?;
                e.array(2)?;
                e.u64(*size)?;
                element.encode(e)?;
            }
            StaticType::Dictionary { key, value } => {
                e.tag(Tag::new(tags::DICTIONARY_STATIC_TYPE))?;
                e.array(2)?;
                key.encode(e)?;
                value.encode(e)?;
            }
            StaticType::Composite(nominal) => {
                encode_nominal(e, tags::COMPOSITE_STATIC_TYPE, nominal)?;
            }
            StaticType::Interface(nominal) => {
                encode_nominal(e, tags::INTERFACE_STATIC_TYPE, nominal)?;
            }
            StaticType::Reference {
                authorized,
                referenced,
            } => {
                e.tag(Tag::new(tags::REFERENCE_STATIC_TYPE))?;
                e.array(2)?;
                e.bool(*authorized)?;
                referenced.encode(e)?;
            }
            StaticType::Restricted { base, restrictions } => {
                e.tag(Tag::new(tags::RESTRICTED_STATIC_TYPE))?;
                e.array(2)?;
                base.encode(e)?;
                e.array(restrictions.len() as u64)?;
                for restriction in restrictions {
                    encode_nominal(e, tags::INTERFACE_STATIC_TYPE, restriction)?;
                }
            }
            StaticType::Capability(borrow_type) => {
                e.tag(Tag::new(tags::CAPABILITY_STATIC_TYPE))?;
                match borrow_type {
                    None => {
                        e.null()?;
                    }
                    Some(inner) => inner.encode(e)?,
                }
            }
        }
        Ok(())
    }

    pub(crate) fn decode(d: &mut Decoder<'_>) -> Result<StaticType, EncodingError> {
        let tag = read_tag(d)?;
        match tag {
            tags::PRIMITIVE_STATIC_TYPE => {
                let discriminator = d.u64()?;
                Ok(StaticType::Primitive(PrimitiveType::try_from(
                    discriminator,
                )?))
            }
            tags::OPTIONAL_STATIC_TYPE => {
                Ok(StaticType::Optional(Box::new(StaticType::decode(d)?)))
            }
            tags::VARIABLE_SIZED_STATIC_TYPE => {
                Ok(StaticType::VariableSized(Box::new(StaticType::decode(d)?)))
            }
            tags::CONSTANT_SIZED_STATIC_TYPE => {
                definite_array(d, 2)?;
                let size = d.u64()?;
                let element = Box::new(StaticType::decode(d)?);
                Ok(StaticType::ConstantSized { size, element })
            }
            tags::DICTIONARY_STATIC_TYPE => {
                definite_array(d, 2)?;
                let key = Box::new(StaticType::decode(d)?);
                let value = Box::new(StaticType::decode(d)?);
                Ok(StaticType::Dictionary { key, value })
            }
            tags::COMPOSITE_STATIC_TYPE => Ok(StaticType::Composite(decode_nominal(d)?)),
            tags::INTERFACE_STATIC_TYPE => Ok(StaticType::Interface(decode_nominal(d)?)),
            tags::REFERENCE_STATIC_TYPE => {
                definite_array(d, 2)?;
                let authorized = d.bool()?;
                let referenced = Box::new(StaticType::decode(d)?);
                Ok(StaticType::Reference {
                    authorized,
                    referenced,
                })
            }
            tags::RESTRICTED_STATIC_TYPE => {
                definite_array(d, 2)?;
                let base = Box::new(StaticType::decode(d)?);
                let count = definite_array_len(d)?;
                let mut restrictions = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    match StaticType::decode(d)? {
                        StaticType::Interface(nominal) => restrictions.push(nominal),
                        _ => {
                            return Err(minicbor::decode::Error::message(
                                "restriction must be an interface type",
                            )
                            .into())
                        }
                    }
                }
                Ok(StaticType::Restricted { base, restrictions })
            }
            tags::CAPABILITY_STATIC_TYPE => {
                if d.datatype()? == Type::Null {
                    expect_null(d)?;
                    Ok(StaticType::Capability(None))
                } else {
                    Ok(StaticType::Capability(Some(Box::new(StaticType::decode(
                        d,
                    )?))))
                }
            }
            other => Err(EncodingError::UnknownStaticTypeTag(other)),
        }
    }
}

fn encode_nominal(
    e: &mut Encoder<&mut Vec<u8>>,
    tag: u64,
    nominal: &NominalType,
) -> Result<(), EncodingError> {
    e.tag(Tag::new(tag))?;
    e.array(2)?;
    nominal.location.encode(e)?;
    e.str(&nominal.qualified_identifier)?;
    Ok(())
}

fn decode_nominal(d: &mut Decoder<'_>) -> Result<NominalType, EncodingError> {
    definite_array(d, 2)?;
    let location = Location::decode(d)?;
    let qualified_identifier = d.str()?.to_owned();
    Ok(NominalType {
        location,
        qualified_identifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(static_type: &StaticType) -> StaticType {
        let mut buf = Vec::new();
        let mut e = Encoder::new(&mut buf);
        static_type.encode(&mut e).unwrap();
        StaticType::decode(&mut Decoder::new(&buf)).unwrap()
    }

    #[test]
    fn primitive_bytes() {
        let mut buf = Vec::new();
        let mut e = Encoder::new(&mut buf);
        StaticType::primitive(PrimitiveType::Bool)
            .encode(&mut e)
            .unwrap();
        assert_eq!(buf, vec![0xd8, tags::PRIMITIVE_STATIC_TYPE as u8, 0x06]);
    }

    #[test]
    fn primitive_wide_discriminator_bytes() {
        let mut buf = Vec::new();
        let mut e = Encoder::new(&mut buf);
        StaticType::primitive(PrimitiveType::Int)
            .encode(&mut e)
            .unwrap();
        assert_eq!(
            buf,
            vec![0xd8, tags::PRIMITIVE_STATIC_TYPE as u8, 0x18, 0x24]
        );
    }

    #[test]
    fn nested_types_roundtrip() {
        let nominal = NominalType::new(Location::String("test".into()), "S");
        for static_type in [
            StaticType::Optional(Box::new(StaticType::primitive(PrimitiveType::String))),
            StaticType::variable_sized(StaticType::primitive(PrimitiveType::AnyStruct)),
            StaticType::constant_sized(42, StaticType::primitive(PrimitiveType::Bool)),
            StaticType::dictionary(
                StaticType::primitive(PrimitiveType::String),
                StaticType::variable_sized(StaticType::primitive(PrimitiveType::UInt64)),
            ),
            StaticType::Composite(nominal.clone()),
            StaticType::Interface(nominal.clone()),
            StaticType::Reference {
                authorized: true,
                referenced: Box::new(StaticType::primitive(PrimitiveType::Bool)),
            },
            StaticType::Restricted {
                base: Box::new(StaticType::Composite(nominal.clone())),
                restrictions: vec![
                    NominalType::new(Location::String("test".into()), "I1"),
                    NominalType::new(Location::String("test".into()), "I2"),
                ],
            },
            StaticType::Capability(None),
            StaticType::Capability(Some(Box::new(StaticType::primitive(PrimitiveType::Bool)))),
        ] {
            assert_eq!(roundtrip(&static_type), static_type);
        }
    }

    #[test]
    fn unknown_static_type_tag_fails() {
        let bytes = [0xd8, 230, 0xf6];
        let result = StaticType::decode(&mut Decoder::new(&bytes));
        assert!(matches!(
            result,
            Err(EncodingError::UnknownStaticTypeTag(230))
        ));
    }

    #[test]
    fn restriction_must_be_interface() {
        // Restricted type whose restriction list holds a primitive.
        let mut buf = Vec::new();
        let mut e = Encoder::new(&mut buf);
        e.tag(Tag::new(tags::RESTRICTED_STATIC_TYPE)).unwrap();
        e.array(2).unwrap();
        StaticType::primitive(PrimitiveType::Bool)
            .encode(&mut e)
            .unwrap();
        e.array(1).unwrap();
        StaticType::primitive(PrimitiveType::Bool)
            .encode(&mut e)
            .unwrap();
        let result = StaticType::decode(&mut Decoder::new(&buf));
        assert!(matches!(result, Err(EncodingError::Cbor(_))));
    }

    #[test]
    fn constant_sized_arity_checked() {
        // Constant-sized payload with a single element instead of [size, type].
        let bytes = [
            0xd8,
            tags::CONSTANT_SIZED_STATIC_TYPE as u8,
            0x81,
            0x00,
        ];
        let result = StaticType::decode(&mut Decoder::new(&bytes));
        assert!(matches!(
            result,
            Err(EncodingError::ArityMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
