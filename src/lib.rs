//! Deterministic CBOR codec for the persistent values of a resource-oriented
//! contract runtime.
//!
//! Contract storage holds typed, possibly large graphs of values owned by
//! accounts. This crate encodes any such value into a deterministic,
//! self-describing byte sequence and decodes it back with identical
//! semantics, byte-for-byte reproducible across independent nodes that must
//! reach agreement.
//!
//! ## Wire-stable surface
//!
//! The following are on-the-wire formats; changes to them are protocol
//! changes:
//!
//! - The value taxonomy and its CBOR shapes (`value::Value`)
//! - Static type descriptors (`static_type::StaticType`) and primitive
//!   discriminators (`primitive::PrimitiveType`)
//! - Type origins (`location::Location`)
//! - The CBOR tag registry (`tags`)
//! - Account addresses and their trimmed wire form (`address::Address`)
//! - The numeric bounds of the wide integer types (`sema`)
//!
//! ## Convenience APIs (non-wire)
//!
//! - The storage abstraction and in-memory implementation
//!   (`storage::Storage`, `storage::InMemoryStorage`)
//! - The encode/decode entry points (`encode_value`, `encode_storable`,
//!   `decode_value`)
//! - The round-trip test harness (`testutil`)
//!
//! ## Encoding model
//!
//! Scalars encode inline. Arrays, dictionaries, and composites always spill
//! into blocks of the [`storage::Storage`] they are encoded against, claiming
//! 64-bit identifiers in depth-first encounter order starting at 1; the
//! owning site holds only a tagged reference. Decoding validates every tag,
//! arity, and numeric range, and resolves references back through the same
//! storage. A decode either yields a complete value or fails; there is no
//! partial result and no recovery.
//!
//! ```no_run
//! use resin::{decode_value, encode_value, Address, InMemoryStorage, Value};
//!
//! # fn main() -> Result<(), resin::EncodingError> {
//! let storage = InMemoryStorage::new();
//! let mut value = Value::String("foo".into());
//! value.set_owner(Address::from_bytes(&[0x42])?);
//!
//! let bytes = encode_value(&value, &storage)?;
//! let decoded = decode_value(&bytes, &storage, value.owner())?;
//! assert!(value.equal(&decoded));
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod decode;
pub mod encode;
pub mod error;
pub mod location;
pub mod primitive;
pub mod sema;
pub mod static_type;
pub mod storage;
pub mod tags;
pub mod testutil;
pub mod value;

pub use address::{Address, ADDRESS_LENGTH};
pub use decode::{decode_value, resolve};
pub use encode::{encode_storable, encode_value, Storable};
pub use error::EncodingError;
pub use location::Location;
pub use primitive::PrimitiveType;
pub use static_type::{NominalType, StaticType};
pub use storage::{InMemoryStorage, Storage, StorageId};
pub use value::{
    ArrayValue, CapabilityValue, CompositeKind, CompositeValue, DictionaryValue, LinkValue,
    PathDomain, PathValue, TypeValue, Value,
};
