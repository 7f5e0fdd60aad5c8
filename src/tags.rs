//! The closed CBOR tag registry.
//!
//! Every value variant, location variant, and static type variant encodes
//! under a fixed tag number. The table is append-only: numbers are never
//! removed or reassigned, and the gaps are deliberate reserved ranges for
//! future variants. Anything outside this table fails decoding.
//!
//! All tags live in `128..=255`, so each one encodes as the two-byte
//! `0xd8 <n>` form.

/// RFC 8949 positive bignum (magnitude byte string follows).
pub const POSITIVE_BIGNUM: u64 = 2;
/// RFC 8949 negative bignum (`-1 - magnitude`).
pub const NEGATIVE_BIGNUM: u64 = 3;

// Values. 134..=151 are reserved.
pub const VOID_VALUE: u64 = 128;
pub const DICTIONARY_VALUE: u64 = 129;
pub const SOME_VALUE: u64 = 130;
pub const ADDRESS_VALUE: u64 = 131;
pub const COMPOSITE_VALUE: u64 = 132;
pub const TYPE_VALUE: u64 = 133;

// Signed integers. 159 is reserved.
pub const INT_VALUE: u64 = 152;
pub const INT8_VALUE: u64 = 153;
pub const INT16_VALUE: u64 = 154;
pub const INT32_VALUE: u64 = 155;
pub const INT64_VALUE: u64 = 156;
pub const INT128_VALUE: u64 = 157;
pub const INT256_VALUE: u64 = 158;

// Unsigned integers. 167 is reserved.
pub const UINT_VALUE: u64 = 160;
pub const UINT8_VALUE: u64 = 161;
pub const UINT16_VALUE: u64 = 162;
pub const UINT32_VALUE: u64 = 163;
pub const UINT64_VALUE: u64 = 164;
pub const UINT128_VALUE: u64 = 165;
pub const UINT256_VALUE: u64 = 166;

// Words. 168 and 173..=175 are reserved (Word128/Word256 would extend here).
pub const WORD8_VALUE: u64 = 169;
pub const WORD16_VALUE: u64 = 170;
pub const WORD32_VALUE: u64 = 171;
pub const WORD64_VALUE: u64 = 172;

// Fixed-point. 176..=179 and 181..=183 reserved for other widths.
pub const FIX64_VALUE: u64 = 180;
// 184..=187 and 189..=191 reserved for other widths.
pub const UFIX64_VALUE: u64 = 188;

// Locations. 197..=199 are reserved.
pub const ADDRESS_LOCATION: u64 = 192;
pub const STRING_LOCATION: u64 = 193;
pub const IDENTIFIER_LOCATION: u64 = 194;
pub const TRANSACTION_LOCATION: u64 = 195;
pub const SCRIPT_LOCATION: u64 = 196;

// Storage-domain values. 202 was used by an earlier storage-reference
// encoding and must never be reassigned; 204..=207 are reserved.
pub const PATH_VALUE: u64 = 200;
pub const CAPABILITY_VALUE: u64 = 201;
pub const LINK_VALUE: u64 = 203;

// Static types. 218..=239 are reserved.
pub const PRIMITIVE_STATIC_TYPE: u64 = 208;
pub const COMPOSITE_STATIC_TYPE: u64 = 209;
pub const INTERFACE_STATIC_TYPE: u64 = 210;
pub const VARIABLE_SIZED_STATIC_TYPE: u64 = 211;
pub const CONSTANT_SIZED_STATIC_TYPE: u64 = 212;
pub const DICTIONARY_STATIC_TYPE: u64 = 213;
pub const OPTIONAL_STATIC_TYPE: u64 = 214;
pub const REFERENCE_STATIC_TYPE: u64 = 215;
pub const RESTRICTED_STATIC_TYPE: u64 = 216;
pub const CAPABILITY_STATIC_TYPE: u64 = 217;

/// Indirect reference to a storage block. `240..=255` is reserved for the
/// block storage layer; only this tag is currently assigned.
pub const STORAGE_REF: u64 = 255;
