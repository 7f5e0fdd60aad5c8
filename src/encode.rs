//! Encoding values into canonical CBOR.
//!
//! Encoding is a single-pass, depth-first traversal. Scalars emit their CBOR
//! inline; arrays, dictionaries, and composites claim a block identifier at
//! first encounter, encode their body into that block, and leave a storage
//! reference at the owning site. The claim order (container before its
//! children, dictionary before its keys) is part of the deterministic
//! contract: re-running the same encode against a fresh storage reproduces
//! identical bytes and identical block identifiers.

use bytes::Bytes;
use minicbor::data::Tag;
use minicbor::Encoder;
use num_bigint::{BigInt, Sign};
use tracing::trace;

use crate::error::EncodingError;
use crate::storage::{Storage, StorageId};
use crate::tags;
use crate::value::{ArrayValue, CompositeValue, DictionaryValue, PathValue, Value};

/// A value prepared for persistence: either an inline CBOR body or a
/// reference into block storage.
///
/// The block-body forms (`Array`, `Dictionary`, `Composite`) encode the
/// referenced block itself and are primarily useful for exercising block
/// layouts directly; [`Value::storable`] always produces `Inline` or
/// `Reference`.
#[derive(Debug)]
pub enum Storable<'a> {
    /// A scalar whose CBOR is emitted at the owning site.
    Inline(&'a Value),
    /// An indirect reference to an already-stored block.
    Reference(StorageId),
    /// The block body of an array.
    Array(&'a ArrayValue),
    /// The block body of a dictionary.
    Dictionary(&'a DictionaryValue),
    /// The block body of a composite.
    Composite(&'a CompositeValue),
}

impl Value {
    /// Produces the storable representation of this value against a storage.
    ///
    /// For arrays, dictionaries, and composites this persists the value's
    /// blocks as a side effect and returns a reference storable; scalars
    /// yield an inline storable and touch no storage.
    pub fn storable<S: Storage>(&self, storage: &S) -> Result<Storable<'_>, EncodingError> {
        match self {
            Value::Array(array) => Ok(Storable::Reference(store_array(array, storage)?)),
            Value::Dictionary(dictionary) => {
                Ok(Storable::Reference(store_dictionary(dictionary, storage)?))
            }
            Value::Composite(composite) => {
                Ok(Storable::Reference(store_composite(composite, storage)?))
            }
            _ => Ok(Storable::Inline(self)),
        }
    }
}

/// Encodes a storable into its byte sequence.
///
/// Block-body storables store the block (claiming identifiers exactly as the
/// value-level encode would) and return the stored bytes.
pub fn encode_storable<S: Storage>(
    storable: &Storable<'_>,
    storage: &S,
) -> Result<Bytes, EncodingError> {
    match storable {
        Storable::Inline(value) => {
            let mut buf = Vec::new();
            let mut e = Encoder::new(&mut buf);
            encode_value_into(&mut e, value, storage)?;
            Ok(Bytes::from(buf))
        }
        Storable::Reference(id) => {
            let mut buf = Vec::new();
            let mut e = Encoder::new(&mut buf);
            emit_reference(&mut e, *id)?;
            Ok(Bytes::from(buf))
        }
        Storable::Array(array) => {
            let id = store_array(array, storage)?;
            storage.read(id)
        }
        Storable::Dictionary(dictionary) => {
            let id = store_dictionary(dictionary, storage)?;
            storage.read(id)
        }
        Storable::Composite(composite) => {
            let id = store_composite(composite, storage)?;
            storage.read(id)
        }
    }
}

/// Encodes a value against a storage: derives its storable and encodes it.
pub fn encode_value<S: Storage>(value: &Value, storage: &S) -> Result<Bytes, EncodingError> {
    let storable = value.storable(storage)?;
    encode_storable(&storable, storage)
}

fn encode_value_into<S: Storage>(
    e: &mut Encoder<&mut Vec<u8>>,
    value: &Value,
    storage: &S,
) -> Result<(), EncodingError> {
    match value {
        Value::Nil => {
            e.null()?;
        }
        Value::Void => {
            e.tag(Tag::new(tags::VOID_VALUE))?;
            e.null()?;
        }
        Value::Bool(b) => {
            e.bool(*b)?;
        }
        Value::String(s) => {
            e.str(s)?;
        }
        Value::Address(address) => {
            e.tag(Tag::new(tags::ADDRESS_VALUE))?;
            e.bytes(address.trimmed())?;
        }

        Value::Int(n) => encode_bignum(e, tags::INT_VALUE, n)?,
        Value::Int8(n) => encode_signed(e, tags::INT8_VALUE, *n as i64)?,
        Value::Int16(n) => encode_signed(e, tags::INT16_VALUE, *n as i64)?,
        Value::Int32(n) => encode_signed(e, tags::INT32_VALUE, *n as i64)?,
        Value::Int64(n) => encode_signed(e, tags::INT64_VALUE, *n)?,
        Value::Int128(n) => encode_bignum(e, tags::INT128_VALUE, n)?,
        Value::Int256(n) => encode_bignum(e, tags::INT256_VALUE, n)?,

        Value::UInt(n) => encode_bignum(e, tags::UINT_VALUE, n)?,
        Value::UInt8(n) => encode_unsigned(e, tags::UINT8_VALUE, *n as u64)?,
        Value::UInt16(n) => encode_unsigned(e, tags::UINT16_VALUE, *n as u64)?,
        Value::UInt32(n) => encode_unsigned(e, tags::UINT32_VALUE, *n as u64)?,
        Value::UInt64(n) => encode_unsigned(e, tags::UINT64_VALUE, *n)?,
        Value::UInt128(n) => encode_bignum(e, tags::UINT128_VALUE, n)?,
        Value::UInt256(n) => encode_bignum(e, tags::UINT256_VALUE, n)?,

        Value::Word8(n) => encode_unsigned(e, tags::WORD8_VALUE, *n as u64)?,
        Value::Word16(n) => encode_unsigned(e, tags::WORD16_VALUE, *n as u64)?,
        Value::Word32(n) => encode_unsigned(e, tags::WORD32_VALUE, *n as u64)?,
        Value::Word64(n) => encode_unsigned(e, tags::WORD64_VALUE, *n)?,

        Value::Fix64(n) => encode_signed(e, tags::FIX64_VALUE, *n)?,
        Value::UFix64(n) => encode_unsigned(e, tags::UFIX64_VALUE, *n)?,

        Value::Path(path) => encode_path(e, path)?,
        Value::Capability(capability) => {
            e.tag(Tag::new(tags::CAPABILITY_VALUE))?;
            e.array(3)?;
            e.tag(Tag::new(tags::ADDRESS_VALUE))?;
            e.bytes(capability.address.trimmed())?;
            encode_path(e, &capability.path)?;
            match &capability.borrow_type {
                None => {
                    e.null()?;
                }
                Some(borrow_type) => borrow_type.encode(e)?,
            }
        }
        Value::Link(link) => {
            e.tag(Tag::new(tags::LINK_VALUE))?;
            e.array(2)?;
            encode_path(e, &link.target_path)?;
            link.link_type.encode(e)?;
        }
        Value::Type(type_value) => {
            e.tag(Tag::new(tags::TYPE_VALUE))?;
            e.array(1)?;
            match &type_value.static_type {
                None => {
                    e.null()?;
                }
                Some(static_type) => static_type.encode(e)?,
            }
        }

        // Some wraps the inner value's storable encoding directly, so a
        // contained container still indirects through its own block.
        Value::Some(inner) => {
            e.tag(Tag::new(tags::SOME_VALUE))?;
            encode_value_into(e, inner, storage)?;
        }

        Value::Array(array) => {
            let id = store_array(array, storage)?;
            emit_reference(e, id)?;
        }
        Value::Dictionary(dictionary) => {
            let id = store_dictionary(dictionary, storage)?;
            emit_reference(e, id)?;
        }
        Value::Composite(composite) => {
            let id = store_composite(composite, storage)?;
            emit_reference(e, id)?;
        }
    }
    Ok(())
}

fn emit_reference(e: &mut Encoder<&mut Vec<u8>>, id: StorageId) -> Result<(), EncodingError> {
    e.tag(Tag::new(tags::STORAGE_REF))?;
    e.u64(id.0)?;
    Ok(())
}

fn encode_signed(
    e: &mut Encoder<&mut Vec<u8>>,
    tag: u64,
    n: i64,
) -> Result<(), EncodingError> {
    e.tag(Tag::new(tag))?;
    e.i64(n)?;
    Ok(())
}

fn encode_unsigned(
    e: &mut Encoder<&mut Vec<u8>>,
    tag: u64,
    n: u64,
) -> Result<(), EncodingError> {
    e.tag(Tag::new(tag))?;
    e.u64(n)?;
    Ok(())
}

fn encode_path(e: &mut Encoder<&mut Vec<u8>>, path: &PathValue) -> Result<(), EncodingError> {
    e.tag(Tag::new(tags::PATH_VALUE))?;
    e.array(2)?;
    e.u64(path.domain.as_u64())?;
    e.str(&path.identifier)?;
    Ok(())
}

/// Emits a CBOR bignum under a value tag. The magnitude is the big-endian
/// byte string without leading zeros; zero is the empty string; negative
/// values use the `-1 - n` convention.
fn encode_bignum(
    e: &mut Encoder<&mut Vec<u8>>,
    tag: u64,
    n: &BigInt,
) -> Result<(), EncodingError> {
    e.tag(Tag::new(tag))?;
    if n.sign() == Sign::Minus {
        e.tag(Tag::new(tags::NEGATIVE_BIGNUM))?;
        let magnitude = -n - BigInt::from(1);
        e.bytes(&magnitude_bytes(&magnitude))?;
    } else {
        e.tag(Tag::new(tags::POSITIVE_BIGNUM))?;
        e.bytes(&magnitude_bytes(n))?;
    }
    Ok(())
}

fn magnitude_bytes(n: &BigInt) -> Vec<u8> {
    if n.sign() == Sign::NoSign {
        Vec::new()
    } else {
        n.magnitude().to_bytes_be()
    }
}

fn store_array<S: Storage>(array: &ArrayValue, storage: &S) -> Result<StorageId, EncodingError> {
    let id = storage.allocate();
    let mut buf = Vec::new();
    let mut e = Encoder::new(&mut buf);
    e.array(2)?;
    array.array_type.encode(&mut e)?;
    e.array(array.elements.len() as u64)?;
    for element in &array.elements {
        encode_value_into(&mut e, element, storage)?;
    }
    trace!(id = %id, len = buf.len(), "stored array block");
    storage.write(id, Bytes::from(buf))?;
    Ok(id)
}

fn store_dictionary<S: Storage>(
    dictionary: &DictionaryValue,
    storage: &S,
) -> Result<StorageId, EncodingError> {
    // The dictionary claims its identifier before the keys array claims the
    // next one; the key-only block allows iterating keys without the values.
    let id = storage.allocate();
    let mut buf = Vec::new();
    let mut e = Encoder::new(&mut buf);
    e.tag(Tag::new(tags::DICTIONARY_VALUE))?;
    e.array(3)?;
    dictionary.dictionary_type.encode(&mut e)?;
    let keys_id = store_array(&dictionary.keys, storage)?;
    emit_reference(&mut e, keys_id)?;
    e.array(dictionary.values.len() as u64)?;
    for value in &dictionary.values {
        encode_value_into(&mut e, value, storage)?;
    }
    trace!(id = %id, keys = %keys_id, len = buf.len(), "stored dictionary block");
    storage.write(id, Bytes::from(buf))?;
    Ok(id)
}

fn store_composite<S: Storage>(
    composite: &CompositeValue,
    storage: &S,
) -> Result<StorageId, EncodingError> {
    let id = storage.allocate();
    let mut buf = Vec::new();
    let mut e = Encoder::new(&mut buf);
    e.tag(Tag::new(tags::COMPOSITE_VALUE))?;
    e.array(4)?;
    composite.location.encode(&mut e)?;
    e.u64(composite.kind.as_u64())?;
    e.array(composite.fields.len() as u64 * 2)?;
    for (name, value) in &composite.fields {
        e.str(name)?;
        encode_value_into(&mut e, value, storage)?;
    }
    e.str(&composite.qualified_identifier)?;
    trace!(id = %id, len = buf.len(), "stored composite block");
    storage.write(id, Bytes::from(buf))?;
    Ok(id)
}
