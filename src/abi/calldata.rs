//! Call-data framing: a 4-byte selector ahead of the argument encoding
//!
//! The selector is opaque here. Callers derive it however their dispatch
//! scheme requires and this module only prepends, strips, and compares it.

use std::fmt;

use super::decoder::{decode, DecoderConfig};
use super::encoder::encode;
use super::types::TypeDescriptor;
use super::value::Value;
use super::{AbiError, AbiResult};

/// Length of a call-data selector in bytes
pub const SELECTOR_LEN: usize = 4;

/// A 4-byte call-data selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector(pub [u8; SELECTOR_LEN]);

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Encode `values` as call data under `selector`
pub fn encode_call(
    selector: Selector,
    root: &TypeDescriptor,
    values: &[Value],
) -> AbiResult<Vec<u8>> {
    let body = encode(root, values)?;
    let mut out = Vec::with_capacity(SELECTOR_LEN + body.len());
    out.extend_from_slice(&selector.0);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Split call data into its selector and argument bytes
pub fn strip_selector(data: &[u8]) -> AbiResult<(Selector, &[u8])> {
    if data.len() < SELECTOR_LEN {
        return Err(AbiError::BufferUnderflow {
            need: SELECTOR_LEN,
            got: data.len(),
        });
    }
    let mut selector = [0u8; SELECTOR_LEN];
    selector.copy_from_slice(&data[..SELECTOR_LEN]);
    Ok((Selector(selector), &data[SELECTOR_LEN..]))
}

/// Decode call data, verifying its selector first
pub fn decode_call(
    expected: Selector,
    root: &TypeDescriptor,
    data: &[u8],
    config: &DecoderConfig,
) -> AbiResult<Vec<Value>> {
    let (got, body) = strip_selector(data)?;
    if got != expected {
        return Err(AbiError::SelectorMismatch { expected, got });
    }
    decode(root, body, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::parse_signature;

    const SEL: Selector = Selector([0xa9, 0x05, 0x9c, 0xbb]);

    #[test]
    fn test_call_roundtrip() {
        let desc = parse_signature("(address,uint256)").unwrap();
        let values = vec![Value::Address([0x22; 20]), Value::uint(1000)];
        let data = encode_call(SEL, &desc, &values).unwrap();
        assert_eq!(&data[..4], &SEL.0);
        assert_eq!(data.len(), 4 + 64);

        let decoded = decode_call(SEL, &desc, &data, &DecoderConfig::default()).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_selector_mismatch() {
        let desc = parse_signature("(uint256)").unwrap();
        let data = encode_call(SEL, &desc, &[Value::uint(1)]).unwrap();
        let other = Selector([0, 1, 2, 3]);
        let err = decode_call(other, &desc, &data, &DecoderConfig::default()).unwrap_err();
        assert_eq!(
            err,
            AbiError::SelectorMismatch {
                expected: other,
                got: SEL,
            }
        );
    }

    #[test]
    fn test_short_call_data() {
        let err = strip_selector(&[0xaa, 0xbb]).unwrap_err();
        assert_eq!(err, AbiError::BufferUnderflow { need: 4, got: 2 });
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(SEL.to_string(), "0xa9059cbb");
    }
}
