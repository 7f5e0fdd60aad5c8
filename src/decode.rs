//! Decoding values from CBOR bytes.
//!
//! Decoding is the validating mirror of encoding: every tag must be in the
//! registry, every arity and range is checked, and storage references are
//! resolved through the block store. A failed decode never yields a partial
//! value. Resolved blocks are cached for the duration of one decode pass,
//! which also serves as the cycle guard.

use std::collections::{HashMap, HashSet};

use minicbor::data::Type;
use minicbor::Decoder;
use num_bigint::{BigInt, Sign};

use crate::address::Address;
use crate::error::EncodingError;
use crate::location::Location;
use crate::sema;
use crate::static_type::StaticType;
use crate::storage::{Storage, StorageId};
use crate::tags;
use crate::value::{
    ArrayValue, CapabilityValue, CompositeKind, CompositeValue, DictionaryValue, LinkValue,
    PathDomain, PathValue, TypeValue, Value,
};

/// Decodes one complete CBOR item into a value, resolving storage references
/// against `storage`.
///
/// The input may be an inline scalar encoding, a storage reference, or a
/// block body (the forms produced by [`crate::encode_storable`]). If `owner`
/// is given it is stamped on every reconstructed descendant, the way decoded
/// values inherit the outer block's account.
pub fn decode_value<S: Storage>(
    bytes: &[u8],
    storage: &S,
    owner: Option<Address>,
) -> Result<Value, EncodingError> {
    let mut ctx = DecodeCtx {
        storage,
        cache: HashMap::new(),
        visiting: HashSet::new(),
    };
    let mut d = Decoder::new(bytes);
    let mut value = ctx.value(&mut d)?;
    if d.position() != bytes.len() {
        return Err(EncodingError::NonCanonical("trailing bytes after value"));
    }
    if let Some(owner) = owner {
        value.set_owner(owner);
    }
    Ok(value)
}

/// Resolves a storage identifier to the value in its block.
///
/// Equivalent to decoding a storage reference to `id`: the block is fetched,
/// decoded, and any nested references are resolved through the same storage.
pub fn resolve<S: Storage>(
    id: StorageId,
    storage: &S,
    owner: Option<Address>,
) -> Result<Value, EncodingError> {
    let mut ctx = DecodeCtx {
        storage,
        cache: HashMap::new(),
        visiting: HashSet::new(),
    };
    let mut value = ctx.resolve(id)?;
    if let Some(owner) = owner {
        value.set_owner(owner);
    }
    Ok(value)
}

struct DecodeCtx<'s, S> {
    storage: &'s S,
    cache: HashMap<u64, Value>,
    visiting: HashSet<u64>,
}

impl<S: Storage> DecodeCtx<'_, S> {
    fn value(&mut self, d: &mut Decoder<'_>) -> Result<Value, EncodingError> {
        match d.datatype()? {
            Type::Null => {
                d.skip()?;
                Ok(Value::Nil)
            }
            Type::Bool => Ok(Value::Bool(d.bool()?)),
            Type::String => Ok(Value::String(d.str()?.to_owned())),
            // An untagged array head only ever opens an array block body.
            Type::Array => self.array_block(d),
            Type::Tag => self.tagged(d),
            other => Err(minicbor::decode::Error::message("unsupported value item")
                .at(d.position())
                .with_message(type_label(other))
                .into()),
        }
    }

    fn tagged(&mut self, d: &mut Decoder<'_>) -> Result<Value, EncodingError> {
        let tag = u64::from(d.tag()?);
        match tag {
            tags::STORAGE_REF => {
                let id = StorageId(d.u64()?);
                self.resolve(id)
            }

            tags::VOID_VALUE => {
                expect_null(d)?;
                Ok(Value::Void)
            }
            tags::SOME_VALUE => Ok(Value::Some(Box::new(self.value(d)?))),
            tags::ADDRESS_VALUE => Ok(Value::Address(Address::from_bytes(d.bytes()?)?)),

            tags::INT_VALUE => Ok(Value::Int(decode_bignum(d)?)),
            tags::INT8_VALUE => {
                decode_signed(d, i8::MIN as i128, i8::MAX as i128, "Int8")
                    .map(|n| Value::Int8(n as i8))
            }
            tags::INT16_VALUE => {
                decode_signed(d, i16::MIN as i128, i16::MAX as i128, "Int16")
                    .map(|n| Value::Int16(n as i16))
            }
            tags::INT32_VALUE => {
                decode_signed(d, i32::MIN as i128, i32::MAX as i128, "Int32")
                    .map(|n| Value::Int32(n as i32))
            }
            tags::INT64_VALUE => {
                decode_signed(d, i64::MIN as i128, i64::MAX as i128, "Int64")
                    .map(|n| Value::Int64(n as i64))
            }
            tags::INT128_VALUE => {
                let n = decode_bignum(d)?;
                if n < *sema::INT128_MIN || n > *sema::INT128_MAX {
                    return Err(EncodingError::OutOfRange { type_name: "Int128" });
                }
                Ok(Value::Int128(n))
            }
            tags::INT256_VALUE => {
                let n = decode_bignum(d)?;
                if n < *sema::INT256_MIN || n > *sema::INT256_MAX {
                    return Err(EncodingError::OutOfRange { type_name: "Int256" });
                }
                Ok(Value::Int256(n))
            }

            tags::UINT_VALUE => {
                let n = decode_bignum(d)?;
                if n.sign() == Sign::Minus {
                    return Err(EncodingError::NegativeUnsigned { type_name: "UInt" });
                }
                Ok(Value::UInt(n))
            }
            tags::UINT8_VALUE => {
                decode_unsigned(d, u8::MAX as u64, "UInt8").map(|n| Value::UInt8(n as u8))
            }
            tags::UINT16_VALUE => {
                decode_unsigned(d, u16::MAX as u64, "UInt16").map(|n| Value::UInt16(n as u16))
            }
            tags::UINT32_VALUE => {
                decode_unsigned(d, u32::MAX as u64, "UInt32").map(|n| Value::UInt32(n as u32))
            }
            tags::UINT64_VALUE => decode_unsigned(d, u64::MAX, "UInt64").map(Value::UInt64),
            tags::UINT128_VALUE => {
                let n = decode_bignum(d)?;
                if n.sign() == Sign::Minus {
                    return Err(EncodingError::NegativeUnsigned {
                        type_name: "UInt128",
                    });
                }
                if n > *sema::UINT128_MAX {
                    return Err(EncodingError::OutOfRange {
                        type_name: "UInt128",
                    });
                }
                Ok(Value::UInt128(n))
            }
            tags::UINT256_VALUE => {
                let n = decode_bignum(d)?;
                if n.sign() == Sign::Minus {
                    return Err(EncodingError::NegativeUnsigned {
                        type_name: "UInt256",
                    });
                }
                if n > *sema::UINT256_MAX {
                    return Err(EncodingError::OutOfRange {
                        type_name: "UInt256",
                    });
                }
                Ok(Value::UInt256(n))
            }

            tags::WORD8_VALUE => {
                decode_unsigned(d, u8::MAX as u64, "Word8").map(|n| Value::Word8(n as u8))
            }
            tags::WORD16_VALUE => {
                decode_unsigned(d, u16::MAX as u64, "Word16").map(|n| Value::Word16(n as u16))
            }
            tags::WORD32_VALUE => {
                decode_unsigned(d, u32::MAX as u64, "Word32").map(|n| Value::Word32(n as u32))
            }
            tags::WORD64_VALUE => decode_unsigned(d, u64::MAX, "Word64").map(Value::Word64),

            tags::FIX64_VALUE => {
                decode_signed(d, i64::MIN as i128, i64::MAX as i128, "Fix64")
                    .map(|n| Value::Fix64(n as i64))
            }
            tags::UFIX64_VALUE => decode_unsigned(d, u64::MAX, "UFix64").map(Value::UFix64),

            tags::PATH_VALUE => Ok(Value::Path(decode_path_body(d)?)),
            tags::CAPABILITY_VALUE => {
                definite_array(d, 3)?;
                let address_tag = read_tag(d)?;
                if address_tag != tags::ADDRESS_VALUE {
                    return Err(minicbor::decode::Error::message(
                        "capability address must be an address value",
                    )
                    .into());
                }
                let address = Address::from_bytes(d.bytes()?)?;
                let path = decode_path(d)?;
                let borrow_type = if d.datatype()? == Type::Null {
                    expect_null(d)?;
                    None
                } else {
                    Some(StaticType::decode(d)?)
                };
                Ok(Value::Capability(CapabilityValue {
                    address,
                    path,
                    borrow_type,
                }))
            }
            tags::LINK_VALUE => {
                definite_array(d, 2)?;
                let target_path = decode_path(d)?;
                let link_type = StaticType::decode(d)?;
                Ok(Value::Link(LinkValue {
                    target_path,
                    link_type,
                }))
            }
            tags::TYPE_VALUE => {
                definite_array(d, 1)?;
                let static_type = if d.datatype()? == Type::Null {
                    expect_null(d)?;
                    None
                } else {
                    Some(StaticType::decode(d)?)
                };
                Ok(Value::Type(TypeValue { static_type }))
            }

            tags::DICTIONARY_VALUE => self.dictionary_block(d),
            tags::COMPOSITE_VALUE => self.composite_block(d),

            other => Err(EncodingError::UnknownTag(other)),
        }
    }

    /// Resolves a storage reference to the value in the referenced block.
    fn resolve(&mut self, id: StorageId) -> Result<Value, EncodingError> {
        if let Some(value) = self.cache.get(&id.0) {
            return Ok(value.clone());
        }
        if !self.visiting.insert(id.0) {
            return Err(EncodingError::CyclicReference(id));
        }
        let block = self.storage.read(id)?;
        let mut d = Decoder::new(&block);
        let value = self.value(&mut d)?;
        if d.position() != block.len() {
            return Err(EncodingError::NonCanonical("trailing bytes after block"));
        }
        self.visiting.remove(&id.0);
        self.cache.insert(id.0, value.clone());
        Ok(value)
    }

    fn array_block(&mut self, d: &mut Decoder<'_>) -> Result<Value, EncodingError> {
        definite_array(d, 2)?;
        let array_type = StaticType::decode(d)?;
        let count = definite_array_len(d)?;
        let mut elements = Vec::with_capacity(count as usize);
        for _ in 0..count {
            elements.push(self.value(d)?);
        }
        Ok(Value::Array(ArrayValue {
            array_type,
            elements,
            owner: None,
        }))
    }

    fn dictionary_block(&mut self, d: &mut Decoder<'_>) -> Result<Value, EncodingError> {
        definite_array(d, 3)?;
        let dictionary_type = StaticType::decode(d)?;
        if !matches!(dictionary_type, StaticType::Dictionary { .. }) {
            return Err(
                minicbor::decode::Error::message("dictionary block with non-dictionary type")
                    .into(),
            );
        }
        let keys = match self.value(d)? {
            Value::Array(keys) => keys,
            _ => {
                return Err(minicbor::decode::Error::message(
                    "dictionary keys must reference an array block",
                )
                .into())
            }
        };
        let count = definite_array_len(d)?;
        if count != keys.elements.len() as u64 {
            return Err(EncodingError::ArityMismatch {
                expected: keys.elements.len() as u64,
                actual: count,
            });
        }
        let mut values = Vec::with_capacity(count as usize);
        for _ in 0..count {
            values.push(self.value(d)?);
        }
        Ok(Value::Dictionary(DictionaryValue {
            dictionary_type,
            keys,
            values,
            owner: None,
        }))
    }

    fn composite_block(&mut self, d: &mut Decoder<'_>) -> Result<Value, EncodingError> {
        definite_array(d, 4)?;
        let location = Location::decode(d)?;
        let kind = CompositeKind::try_from(d.u64()?)?;
        let pair_count = definite_array_len(d)?;
        if pair_count % 2 != 0 {
            return Err(EncodingError::ArityMismatch {
                expected: pair_count + 1,
                actual: pair_count,
            });
        }
        let mut fields = Vec::with_capacity((pair_count / 2) as usize);
        for _ in 0..pair_count / 2 {
            let name = d.str()?.to_owned();
            let value = self.value(d)?;
            fields.push((name, value));
        }
        let qualified_identifier = d.str()?.to_owned();
        Ok(Value::Composite(CompositeValue {
            location,
            qualified_identifier,
            kind,
            fields,
            owner: None,
        }))
    }
}

/// Reads a tag head, failing on any other item.
pub(crate) fn read_tag(d: &mut Decoder<'_>) -> Result<u64, EncodingError> {
    if d.datatype()? != Type::Tag {
        return Err(minicbor::decode::Error::message("expected tag")
            .at(d.position())
            .into());
    }
    Ok(u64::from(d.tag()?))
}

/// Reads an array head and checks its arity. Indefinite-length arrays are
/// rejected as non-canonical.
pub(crate) fn definite_array(d: &mut Decoder<'_>, expected: u64) -> Result<(), EncodingError> {
    let actual = definite_array_len(d)?;
    if actual != expected {
        return Err(EncodingError::ArityMismatch { expected, actual });
    }
    Ok(())
}

pub(crate) fn definite_array_len(d: &mut Decoder<'_>) -> Result<u64, EncodingError> {
    d.array()?
        .ok_or(EncodingError::NonCanonical("indefinite-length array"))
}

pub(crate) fn expect_null(d: &mut Decoder<'_>) -> Result<(), EncodingError> {
    if d.datatype()? != Type::Null {
        return Err(minicbor::decode::Error::message("expected null")
            .at(d.position())
            .into());
    }
    d.skip()?;
    Ok(())
}

fn decode_path(d: &mut Decoder<'_>) -> Result<PathValue, EncodingError> {
    let tag = read_tag(d)?;
    if tag != tags::PATH_VALUE {
        return Err(minicbor::decode::Error::message("expected path value").into());
    }
    decode_path_body(d)
}

fn decode_path_body(d: &mut Decoder<'_>) -> Result<PathValue, EncodingError> {
    definite_array(d, 2)?;
    let domain = PathDomain::try_from(d.u64()?)?;
    let identifier = d.str()?.to_owned();
    Ok(PathValue { domain, identifier })
}

/// Decodes a CBOR integer head of either sign and range-checks it.
fn decode_signed(
    d: &mut Decoder<'_>,
    min: i128,
    max: i128,
    type_name: &'static str,
) -> Result<i128, EncodingError> {
    match d.datatype()? {
        Type::U8
        | Type::U16
        | Type::U32
        | Type::U64
        | Type::I8
        | Type::I16
        | Type::I32
        | Type::I64
        | Type::Int => {
            let n = i128::from(d.int()?);
            if n < min || n > max {
                return Err(EncodingError::OutOfRange { type_name });
            }
            Ok(n)
        }
        _ => Err(minicbor::decode::Error::message("expected integer")
            .at(d.position())
            .into()),
    }
}

/// Decodes a CBOR unsigned integer head; any negative head is a sign error.
fn decode_unsigned(
    d: &mut Decoder<'_>,
    max: u64,
    type_name: &'static str,
) -> Result<u64, EncodingError> {
    match d.datatype()? {
        Type::U8 | Type::U16 | Type::U32 | Type::U64 => {
            let n = d.u64()?;
            if n > max {
                return Err(EncodingError::OutOfRange { type_name });
            }
            Ok(n)
        }
        Type::I8 | Type::I16 | Type::I32 | Type::I64 | Type::Int => {
            Err(EncodingError::NegativeUnsigned { type_name })
        }
        _ => Err(minicbor::decode::Error::message("expected unsigned integer")
            .at(d.position())
            .into()),
    }
}

/// Decodes a CBOR bignum: tag 2 or 3 followed by the magnitude byte string.
fn decode_bignum(d: &mut Decoder<'_>) -> Result<BigInt, EncodingError> {
    let tag = read_tag(d)?;
    match tag {
        tags::POSITIVE_BIGNUM => Ok(BigInt::from_bytes_be(Sign::Plus, d.bytes()?)),
        tags::NEGATIVE_BIGNUM => {
            let magnitude = BigInt::from_bytes_be(Sign::Plus, d.bytes()?);
            Ok(-magnitude - BigInt::from(1))
        }
        _ => Err(minicbor::decode::Error::message("expected bignum").into()),
    }
}

fn type_label(datatype: Type) -> &'static str {
    match datatype {
        Type::Map | Type::MapIndef => "map",
        Type::Bytes | Type::BytesIndef => "byte string",
        Type::Undefined => "undefined",
        Type::Simple => "simple value",
        _ => "unsupported item",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bignum_empty_magnitudes() {
        let positive = [0xc2, 0x40];
        assert_eq!(
            decode_bignum(&mut Decoder::new(&positive)).unwrap(),
            BigInt::from(0)
        );
        let negative = [0xc3, 0x40];
        assert_eq!(
            decode_bignum(&mut Decoder::new(&negative)).unwrap(),
            BigInt::from(-1)
        );
    }

    #[test]
    fn bignum_applies_minus_one_convention() {
        // 0x29 = 41, so the negative bignum decodes to -42.
        let bytes = [0xc3, 0x41, 0x29];
        assert_eq!(
            decode_bignum(&mut Decoder::new(&bytes)).unwrap(),
            BigInt::from(-42)
        );
    }

    #[test]
    fn signed_range_is_checked() {
        // Negative integer 0xff = -256, below Int8 minimum.
        let bytes = [0x38, 0xff];
        let result = decode_signed(&mut Decoder::new(&bytes), i8::MIN as i128, i8::MAX as i128, "Int8");
        assert!(matches!(
            result,
            Err(EncodingError::OutOfRange { type_name: "Int8" })
        ));
    }

    #[test]
    fn unsigned_rejects_negative_head() {
        let bytes = [0x38, 0x29];
        let result = decode_unsigned(&mut Decoder::new(&bytes), u8::MAX as u64, "UInt8");
        assert!(matches!(
            result,
            Err(EncodingError::NegativeUnsigned { type_name: "UInt8" })
        ));
    }

    #[test]
    fn indefinite_arrays_are_non_canonical() {
        // 0x9f: indefinite-length array head.
        let bytes = [0x9f, 0xff];
        let result = definite_array_len(&mut Decoder::new(&bytes));
        assert!(matches!(result, Err(EncodingError::NonCanonical(_))));
    }
}
