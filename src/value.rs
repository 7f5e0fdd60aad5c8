//! The runtime value model.
//!
//! `Value` is the closed sum of every variant the codec can persist. Scalars
//! are plain data; arrays, dictionaries, and composites additionally carry an
//! owner, the account under whose storage the value lives. Owners are
//! optional during construction and stamped recursively on insertion and on
//! decode.

use std::fmt;

use num_bigint::BigInt;

use crate::address::Address;
use crate::error::EncodingError;
use crate::location::Location;
use crate::static_type::StaticType;

/// The partition of an account's storage namespace a path points into.
#[repr(u64)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathDomain {
    Storage = 1,
    Private = 2,
    Public = 3,
}

impl PathDomain {
    pub(crate) fn as_u64(self) -> u64 {
        self as u64
    }
}

impl TryFrom<u64> for PathDomain {
    type Error = EncodingError;

    fn try_from(domain: u64) -> Result<Self, Self::Error> {
        match domain {
            1 => Ok(PathDomain::Storage),
            2 => Ok(PathDomain::Private),
            3 => Ok(PathDomain::Public),
            other => Err(EncodingError::BadPathDomain(other)),
        }
    }
}

impl fmt::Display for PathDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PathDomain::Storage => "storage",
            PathDomain::Private => "private",
            PathDomain::Public => "public",
        })
    }
}

/// The kind of a user-defined composite type.
#[repr(u64)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Structure = 1,
    Resource = 2,
    Contract = 3,
    Event = 4,
    Enum = 5,
}

impl CompositeKind {
    pub(crate) fn as_u64(self) -> u64 {
        self as u64
    }
}

impl TryFrom<u64> for CompositeKind {
    type Error = EncodingError;

    fn try_from(kind: u64) -> Result<Self, Self::Error> {
        match kind {
            1 => Ok(CompositeKind::Structure),
            2 => Ok(CompositeKind::Resource),
            3 => Ok(CompositeKind::Contract),
            4 => Ok(CompositeKind::Event),
            5 => Ok(CompositeKind::Enum),
            other => Err(EncodingError::UnknownCompositeKind(other)),
        }
    }
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompositeKind::Structure => "structure",
            CompositeKind::Resource => "resource",
            CompositeKind::Contract => "contract",
            CompositeKind::Event => "event",
            CompositeKind::Enum => "enum",
        })
    }
}

/// A path into an account's storage namespace, e.g. `/public/bar`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathValue {
    pub domain: PathDomain,
    pub identifier: String,
}

impl PathValue {
    pub fn new(domain: PathDomain, identifier: impl Into<String>) -> Self {
        PathValue {
            domain,
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.domain, self.identifier)
    }
}

/// A capability to borrow a value reachable under a path of an account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityValue {
    pub address: Address,
    pub path: PathValue,
    pub borrow_type: Option<StaticType>,
}

/// A link from one path to another, carrying the type the target is
/// expected to have.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkValue {
    pub target_path: PathValue,
    pub link_type: StaticType,
}

/// A first-class type value.
///
/// A type value may carry no static type at all (an unknown type); two such
/// values are never semantically equal, only structurally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeValue {
    pub static_type: Option<StaticType>,
}

/// An ordered collection. Always stored indirectly as its own block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayValue {
    pub array_type: StaticType,
    pub elements: Vec<Value>,
    pub owner: Option<Address>,
}

impl ArrayValue {
    pub fn new(array_type: StaticType, elements: Vec<Value>) -> Self {
        ArrayValue {
            array_type,
            elements,
            owner: None,
        }
    }

    /// Appends an element, stamping it with this array's owner.
    pub fn push(&mut self, mut element: Value) {
        if let Some(owner) = self.owner {
            element.set_owner(owner);
        }
        self.elements.push(element);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub(crate) fn set_owner(&mut self, owner: Address) {
        self.owner = Some(owner);
        for element in &mut self.elements {
            element.set_owner(owner);
        }
    }

    fn equal(&self, other: &ArrayValue) -> bool {
        self.array_type == other.array_type
            && self.elements.len() == other.elements.len()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| a.equal(b))
    }
}

/// An ordered key/value mapping. Always stored indirectly; the keys claim a
/// separate block of their own so they can be iterated without materializing
/// the values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DictionaryValue {
    pub dictionary_type: StaticType,
    pub keys: ArrayValue,
    pub values: Vec<Value>,
    pub owner: Option<Address>,
}

impl DictionaryValue {
    /// Builds a dictionary from entries in insertion order. The keys array
    /// is typed as a variable-sized array of the key type.
    pub fn new(
        key_type: StaticType,
        value_type: StaticType,
        entries: Vec<(Value, Value)>,
    ) -> Self {
        let mut keys = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            keys.push(key);
            values.push(value);
        }
        DictionaryValue {
            dictionary_type: StaticType::dictionary(key_type.clone(), value_type),
            keys: ArrayValue::new(StaticType::variable_sized(key_type), keys),
            values,
            owner: None,
        }
    }

    /// Appends an entry, stamping both key and value with this dictionary's
    /// owner.
    pub fn insert(&mut self, key: Value, mut value: Value) {
        if let Some(owner) = self.owner {
            value.set_owner(owner);
        }
        self.keys.push(key);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn set_owner(&mut self, owner: Address) {
        self.owner = Some(owner);
        self.keys.set_owner(owner);
        for value in &mut self.values {
            value.set_owner(owner);
        }
    }

    fn equal(&self, other: &DictionaryValue) -> bool {
        self.dictionary_type == other.dictionary_type
            && self.keys.equal(&other.keys)
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.equal(b))
    }
}

/// A user-defined structure, resource, contract, event, or enum instance.
/// Always stored indirectly. Field order is insertion order and is preserved
/// verbatim by the codec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeValue {
    pub location: Location,
    pub qualified_identifier: String,
    pub kind: CompositeKind,
    pub fields: Vec<(String, Value)>,
    pub owner: Option<Address>,
}

impl CompositeValue {
    pub fn new(
        location: Location,
        qualified_identifier: impl Into<String>,
        kind: CompositeKind,
        fields: Vec<(String, Value)>,
    ) -> Self {
        CompositeValue {
            location,
            qualified_identifier: qualified_identifier.into(),
            kind,
            fields,
            owner: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, value)| value)
    }

    /// Appends a field, stamping the value with this composite's owner.
    pub fn set_field(&mut self, name: impl Into<String>, mut value: Value) {
        if let Some(owner) = self.owner {
            value.set_owner(owner);
        }
        self.fields.push((name.into(), value));
    }

    pub(crate) fn set_owner(&mut self, owner: Address) {
        self.owner = Some(owner);
        for (_, value) in &mut self.fields {
            value.set_owner(owner);
        }
    }

    fn equal(&self, other: &CompositeValue) -> bool {
        self.location == other.location
            && self.qualified_identifier == other.qualified_identifier
            && self.kind == other.kind
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|((name_a, a), (name_b, b))| name_a == name_b && a.equal(b))
    }
}

/// A persistable runtime value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Value {
    Nil,
    Void,
    Bool(bool),
    String(String),
    Address(Address),

    Int(BigInt),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Int128(BigInt),
    Int256(BigInt),

    UInt(BigInt),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    UInt128(BigInt),
    UInt256(BigInt),

    Word8(u8),
    Word16(u16),
    Word32(u32),
    Word64(u64),

    /// Signed 64-bit fixed-point, raw scaled representation.
    Fix64(i64),
    /// Unsigned 64-bit fixed-point, raw scaled representation.
    UFix64(u64),

    Path(PathValue),
    Capability(CapabilityValue),
    Link(LinkValue),
    Type(TypeValue),

    Some(Box<Value>),

    Array(ArrayValue),
    Dictionary(DictionaryValue),
    Composite(CompositeValue),
}

impl Value {
    /// Assigns an owner to this value and every reachable descendant.
    ///
    /// Scalars carry no owner of their own; for them this is a no-op, as it
    /// is for the values inside a decoded scalar.
    pub fn set_owner(&mut self, owner: Address) {
        match self {
            Value::Some(inner) => inner.set_owner(owner),
            Value::Array(array) => array.set_owner(owner),
            Value::Dictionary(dictionary) => dictionary.set_owner(owner),
            Value::Composite(composite) => composite.set_owner(owner),
            _ => {}
        }
    }

    /// The owner, for variants that track one. `Some` reports its inner
    /// value's owner.
    pub fn owner(&self) -> Option<Address> {
        match self {
            Value::Some(inner) => inner.owner(),
            Value::Array(array) => array.owner,
            Value::Dictionary(dictionary) => dictionary.owner,
            Value::Composite(composite) => composite.owner,
            _ => None,
        }
    }

    /// Semantic value equality.
    ///
    /// Compares variant and contents, ignoring owners. Two type values
    /// without a static type are *not* equal under this predicate (an
    /// unknown type is not provably the same type); use `==` for structural
    /// comparison in that case.
    pub fn equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Void, Value::Void) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Address(a), Value::Address(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int8(a), Value::Int8(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Int128(a), Value::Int128(b)) => a == b,
            (Value::Int256(a), Value::Int256(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::UInt8(a), Value::UInt8(b)) => a == b,
            (Value::UInt16(a), Value::UInt16(b)) => a == b,
            (Value::UInt32(a), Value::UInt32(b)) => a == b,
            (Value::UInt64(a), Value::UInt64(b)) => a == b,
            (Value::UInt128(a), Value::UInt128(b)) => a == b,
            (Value::UInt256(a), Value::UInt256(b)) => a == b,
            (Value::Word8(a), Value::Word8(b)) => a == b,
            (Value::Word16(a), Value::Word16(b)) => a == b,
            (Value::Word32(a), Value::Word32(b)) => a == b,
            (Value::Word64(a), Value::Word64(b)) => a == b,
            (Value::Fix64(a), Value::Fix64(b)) => a == b,
            (Value::UFix64(a), Value::UFix64(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            (Value::Capability(a), Value::Capability(b)) => a == b,
            (Value::Link(a), Value::Link(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => match (&a.static_type, &b.static_type) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
            (Value::Some(a), Value::Some(b)) => a.equal(b),
            (Value::Array(a), Value::Array(b)) => a.equal(b),
            (Value::Dictionary(a), Value::Dictionary(b)) => a.equal(b),
            (Value::Composite(a), Value::Composite(b)) => a.equal(b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::PrimitiveType;

    fn owner() -> Address {
        Address::from_bytes(&[0x42]).unwrap()
    }

    #[test]
    fn set_owner_reaches_all_descendants() {
        let inner = ArrayValue::new(
            StaticType::variable_sized(StaticType::primitive(PrimitiveType::Bool)),
            vec![Value::Bool(true)],
        );
        let mut dictionary = Value::Dictionary(DictionaryValue::new(
            StaticType::primitive(PrimitiveType::String),
            StaticType::primitive(PrimitiveType::AnyStruct),
            vec![(
                Value::String("a".into()),
                Value::Some(Box::new(Value::Array(inner))),
            )],
        ));
        assert_eq!(dictionary.owner(), None);

        dictionary.set_owner(owner());
        let Value::Dictionary(dictionary) = &dictionary else {
            unreachable!()
        };
        assert_eq!(dictionary.owner, Some(owner()));
        assert_eq!(dictionary.keys.owner, Some(owner()));
        assert_eq!(dictionary.values[0].owner(), Some(owner()));
    }

    #[test]
    fn insertion_propagates_owner() {
        let mut array = ArrayValue::new(
            StaticType::variable_sized(StaticType::primitive(PrimitiveType::AnyStruct)),
            vec![],
        );
        array.set_owner(owner());
        array.push(Value::Composite(CompositeValue::new(
            Location::String("test".into()),
            "S",
            CompositeKind::Structure,
            vec![],
        )));
        assert_eq!(array.elements[0].owner(), Some(owner()));
    }

    #[test]
    fn semantic_equality_ignores_owner() {
        let mut a = Value::Array(ArrayValue::new(
            StaticType::variable_sized(StaticType::primitive(PrimitiveType::Bool)),
            vec![Value::Bool(false)],
        ));
        let b = a.clone();
        a.set_owner(owner());
        assert!(a.equal(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn untyped_type_values_only_deeply_equal() {
        let a = Value::Type(TypeValue { static_type: None });
        let b = Value::Type(TypeValue { static_type: None });
        assert!(!a.equal(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn typed_type_values_semantically_equal() {
        let a = Value::Type(TypeValue {
            static_type: Some(StaticType::primitive(PrimitiveType::Bool)),
        });
        let b = a.clone();
        assert!(a.equal(&b));
    }

    #[test]
    fn cross_variant_comparison_is_false() {
        assert!(!Value::Int8(1).equal(&Value::Int16(1)));
        assert!(!Value::Nil.equal(&Value::Void));
    }

    #[test]
    fn path_displays_as_slash_form() {
        let path = PathValue::new(PathDomain::Public, "bar");
        assert_eq!(path.to_string(), "/public/bar");
    }

    #[test]
    fn composite_field_lookup() {
        let composite = CompositeValue::new(
            Location::String("test".into()),
            "S",
            CompositeKind::Structure,
            vec![("x".into(), Value::UInt8(7))],
        );
        assert_eq!(composite.field("x"), Some(&Value::UInt8(7)));
        assert_eq!(composite.field("y"), None);
    }
}
