//! Adversarial-input tests for the ABI decoder: hostile buffers must fail
//! with a typed error, never panic, and never drive allocations from
//! unvalidated length words.

use ethereum_types::U256;
use proptest::prelude::*;

use contract_codec::abi::{decode, encode, AbiError, DecoderConfig};
use contract_codec::{parse_signature, Value};

fn word(low: u64) -> [u8; 32] {
    let mut w = [0u8; 32];
    w[24..].copy_from_slice(&low.to_be_bytes());
    w
}

#[test]
fn offset_at_exact_buffer_end_underflows() {
    // offset == frame length is in bounds but leaves a zero-byte tail
    let desc = parse_signature("(string)").unwrap();
    let data = word(32);
    let err = decode(&desc, &data, &DecoderConfig::default()).unwrap_err();
    assert_eq!(err, AbiError::BufferUnderflow { need: 32, got: 0 });
}

#[test]
fn offset_one_past_buffer_is_malformed() {
    let desc = parse_signature("(string)").unwrap();
    let data = word(33);
    let err = decode(&desc, &data, &DecoderConfig::default()).unwrap_err();
    assert_eq!(
        err,
        AbiError::MalformedOffset {
            offset: U256::from(33u64),
            limit: 32,
        }
    );
}

#[test]
fn nested_offset_checked_against_inner_frame() {
    // outer offset lands at the last word; the inner array's own offset
    // word then points outside the already-shrunk inner frame
    let desc = parse_signature("((uint256[]))").unwrap();
    let mut data = Vec::new();
    data.extend_from_slice(&word(32)); // outer tuple tail at 0x20
    data.extend_from_slice(&word(64)); // inner array offset, frame is 32 bytes
    let err = decode(&desc, &data, &DecoderConfig::default()).unwrap_err();
    assert_eq!(
        err,
        AbiError::MalformedOffset {
            offset: U256::from(64u64),
            limit: 32,
        }
    );
}

#[test]
fn length_word_larger_than_u64_is_rejected() {
    let desc = parse_signature("(bytes)").unwrap();
    let mut data = Vec::new();
    data.extend_from_slice(&word(32));
    data.extend_from_slice(&[0xff; 32]); // length 2^256 - 1
    let err = decode(&desc, &data, &DecoderConfig::default()).unwrap_err();
    assert!(matches!(err, AbiError::BufferUnderflow { .. }));
}

#[test]
fn array_length_exceeding_payload_is_rejected_before_allocation() {
    // a billion claimed elements backed by one word of payload
    let desc = parse_signature("(uint256[])").unwrap();
    let mut data = Vec::new();
    data.extend_from_slice(&word(32));
    data.extend_from_slice(&word(1_000_000_000));
    data.extend_from_slice(&word(0));
    let err = decode(&desc, &data, &DecoderConfig::default()).unwrap_err();
    assert!(matches!(err, AbiError::MalformedOffset { .. }));
}

#[test]
fn hostile_length_in_nested_dynamic_array() {
    // outer T[][] with one element whose inner length word is hostile
    let desc = parse_signature("(uint8[][])").unwrap();
    let mut data = Vec::new();
    data.extend_from_slice(&word(32)); // outer offset
    data.extend_from_slice(&word(1)); // outer length 1
    data.extend_from_slice(&word(32)); // element offset
    data.extend_from_slice(&word(u64::MAX)); // inner length
    let err = decode(&desc, &data, &DecoderConfig::default()).unwrap_err();
    assert!(matches!(err, AbiError::MalformedOffset { .. }));
}

#[test]
fn string_payload_crossing_buffer_end() {
    let desc = parse_signature("(string)").unwrap();
    let mut data = Vec::new();
    data.extend_from_slice(&word(32));
    data.extend_from_slice(&word(33)); // claims 33 bytes, 32 present
    data.extend_from_slice(&[b'a'; 32]);
    let err = decode(&desc, &data, &DecoderConfig::default()).unwrap_err();
    assert!(matches!(err, AbiError::BufferUnderflow { .. }));
}

#[test]
fn empty_buffer_fails_for_nonempty_tuple() {
    let desc = parse_signature("(uint256,bool)").unwrap();
    let err = decode(&desc, &[], &DecoderConfig::default()).unwrap_err();
    assert_eq!(err, AbiError::BufferUnderflow { need: 32, got: 0 });
}

#[test]
fn empty_tuple_accepts_empty_buffer() {
    let desc = parse_signature("()").unwrap();
    assert_eq!(
        decode(&desc, &[], &DecoderConfig::default()).unwrap(),
        Vec::<Value>::new()
    );
}

proptest! {
    /// Random bytes against a fixed mixed signature either decode or fail
    /// with an error; the decoder must not panic on anything.
    #[test]
    fn arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let desc = parse_signature("(uint64,string,uint8[],(int128,bytes)[2])").unwrap();
        let _ = decode(&desc, &data, &DecoderConfig::default());
        let lenient = DecoderConfig {
            strict_padding: false,
            require_ordered_offsets: false,
        };
        let _ = decode(&desc, &data, &lenient);
    }

    /// Every strict prefix of a valid encoding fails to decode.
    #[test]
    fn truncated_valid_encodings_fail(n in 1usize..40, s in "[a-z]{0,20}") {
        let desc = parse_signature("(uint256[],string)").unwrap();
        let values = vec![
            Value::Array((0..n as u64).map(Value::uint).collect()),
            Value::String(s),
        ];
        let full = encode(&desc, &values).unwrap();
        prop_assert_eq!(
            decode(&desc, &full, &DecoderConfig::default()).unwrap(),
            values
        );
        for cut in 0..full.len() {
            prop_assert!(decode(&desc, &full[..cut], &DecoderConfig::default()).is_err());
        }
    }
}
