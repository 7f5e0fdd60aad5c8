//! Primitive static types and their wire discriminators.

use crate::error::EncodingError;

/// A primitive (non-parameterized) static type.
///
/// The discriminator namespace is closed and stable; the gaps between groups
/// are reserved for future types. Unknown discriminators fail decoding.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PrimitiveType {
    Void = 1,
    Any = 2,
    Never = 3,
    AnyStruct = 4,
    AnyResource = 5,
    Bool = 6,
    Address = 7,
    String = 8,
    Character = 9,
    MetaType = 10,
    Block = 11,

    // Abstract numeric supertypes.
    Number = 18,
    SignedNumber = 19,
    Integer = 24,
    SignedInteger = 25,
    FixedPoint = 30,
    SignedFixedPoint = 31,

    Int = 36,
    Int8 = 37,
    Int16 = 38,
    Int32 = 39,
    Int64 = 40,
    Int128 = 41,
    Int256 = 42,

    UInt = 44,
    UInt8 = 45,
    UInt16 = 46,
    UInt32 = 47,
    UInt64 = 48,
    UInt128 = 49,
    UInt256 = 50,

    Word8 = 53,
    Word16 = 54,
    Word32 = 55,
    Word64 = 56,

    Fix64 = 64,
    UFix64 = 72,

    Path = 76,
    Capability = 77,

    AuthAccount = 90,
    PublicAccount = 91,
    DeployedContract = 92,
    AuthAccountContracts = 93,
    PublicAccountContracts = 94,
    AccountKey = 95,
}

impl PrimitiveType {
    /// The 1-byte wire discriminator.
    pub fn discriminator(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u64> for PrimitiveType {
    type Error = EncodingError;

    fn try_from(discriminator: u64) -> Result<Self, Self::Error> {
        use PrimitiveType::*;
        Ok(match discriminator {
            1 => Void,
            2 => Any,
            3 => Never,
            4 => AnyStruct,
            5 => AnyResource,
            6 => Bool,
            7 => Address,
            8 => String,
            9 => Character,
            10 => MetaType,
            11 => Block,
            18 => Number,
            19 => SignedNumber,
            24 => Integer,
            25 => SignedInteger,
            30 => FixedPoint,
            31 => SignedFixedPoint,
            36 => Int,
            37 => Int8,
            38 => Int16,
            39 => Int32,
            40 => Int64,
            41 => Int128,
            42 => Int256,
            44 => UInt,
            45 => UInt8,
            46 => UInt16,
            47 => UInt32,
            48 => UInt64,
            49 => UInt128,
            50 => UInt256,
            53 => Word8,
            54 => Word16,
            55 => Word32,
            56 => Word64,
            64 => Fix64,
            72 => UFix64,
            76 => Path,
            77 => Capability,
            90 => AuthAccount,
            91 => PublicAccount,
            92 => DeployedContract,
            93 => AuthAccountContracts,
            94 => PublicAccountContracts,
            95 => AccountKey,
            other => return Err(EncodingError::UnknownPrimitive(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_anchor_discriminators() {
        assert_eq!(PrimitiveType::Bool.discriminator(), 6);
        assert_eq!(PrimitiveType::String.discriminator(), 8);
        assert_eq!(PrimitiveType::AnyStruct.discriminator(), 4);
        assert_eq!(PrimitiveType::Int.discriminator(), 36);
        assert_eq!(PrimitiveType::PublicAccount.discriminator(), 0x5b);
    }

    #[test]
    fn roundtrip_through_discriminator() {
        for ty in [
            PrimitiveType::Void,
            PrimitiveType::Bool,
            PrimitiveType::String,
            PrimitiveType::Int128,
            PrimitiveType::UFix64,
            PrimitiveType::AccountKey,
        ] {
            let back = PrimitiveType::try_from(ty.discriminator() as u64).unwrap();
            assert_eq!(ty, back);
        }
    }

    #[test]
    fn unknown_discriminator_fails() {
        assert!(matches!(
            PrimitiveType::try_from(12),
            Err(EncodingError::UnknownPrimitive(12))
        ));
        assert!(matches!(
            PrimitiveType::try_from(200),
            Err(EncodingError::UnknownPrimitive(200))
        ));
    }
}
