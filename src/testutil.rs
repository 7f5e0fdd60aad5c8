//! Test utilities: the encode/decode round-trip harness used by the crate's
//! own test suites.

use crate::address::Address;
use crate::decode::decode_value;
use crate::encode::{encode_storable, Storable};
use crate::storage::InMemoryStorage;
use crate::value::Value;

/// The account every round-trip test persists under.
pub const TEST_OWNER: Address = Address::new([0, 0, 0, 0, 0, 0, 0, 0x42]);

/// One encode/decode round-trip scenario.
///
/// Either `value` or `storable` (or both) drives the encode side; `encoded`
/// bytes, when given, are asserted against the encoder output, or serve as
/// the decode input when nothing is encoded. `invalid` scenarios must fail
/// decoding. Decoded output is compared against `decoded_value` (falling
/// back to `value`): structurally when `deep_equality` is set, otherwise
/// with the semantic equality predicate.
#[derive(Default)]
pub struct EncodeDecodeTest<'a> {
    pub value: Option<Value>,
    pub storable: Option<Storable<'a>>,
    pub encoded: Option<Vec<u8>>,
    pub invalid: bool,
    pub decode_only: bool,
    pub deep_equality: bool,
    pub decoded_value: Option<Value>,
    pub storage: Option<InMemoryStorage>,
}

/// Runs one scenario, panicking with a diagnostic on any mismatch.
pub fn check(mut test: EncodeDecodeTest<'_>) {
    let storage = test.storage.take().unwrap_or_default();

    if let Some(value) = test.value.as_mut() {
        value.set_owner(TEST_OWNER);
    }

    let encoded: Vec<u8> = if !test.decode_only && (test.value.is_some() || test.storable.is_some())
    {
        let bytes = match &test.storable {
            Some(storable) => encode_storable(storable, &storage).expect("encode storable"),
            None => {
                let value = test.value.as_ref().expect("test needs a value or storable");
                let storable = value.storable(&storage).expect("derive storable");
                encode_storable(&storable, &storage).expect("encode value")
            }
        };
        if let Some(expected) = &test.encoded {
            assert_eq!(
                expected.as_slice(),
                bytes.as_ref(),
                "encoded bytes mismatch",
            );
        }
        bytes.to_vec()
    } else {
        test.encoded.clone().expect("decode test needs encoded bytes")
    };

    let decoded = decode_value(&encoded, &storage, Some(TEST_OWNER));

    if test.invalid {
        assert!(
            decoded.is_err(),
            "decode unexpectedly succeeded: {:?}",
            decoded,
        );
        return;
    }

    let decoded = decoded.expect("decode");
    let expected = match test.decoded_value {
        Some(mut expected) => {
            expected.set_owner(TEST_OWNER);
            expected
        }
        None => test.value.expect("test needs an expected value"),
    };

    if test.deep_equality {
        assert_eq!(expected, decoded);
    } else {
        assert!(
            expected.equal(&decoded),
            "values not equal\n expected: {expected:?}\n  decoded: {decoded:?}",
        );
    }
}
