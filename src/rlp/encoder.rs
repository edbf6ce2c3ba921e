//! Canonical RLP encoder
//!
//! Every item has exactly one encoding here: single bytes below 0x80 stand
//! for themselves, short payloads use the one-byte length form, and long
//! payloads carry a minimal big-endian length with no leading zeros.

use super::item::RlpItem;

pub(crate) const STRING_SHORT: u8 = 0x80;
pub(crate) const STRING_LONG: u8 = 0xb7;
pub(crate) const LIST_SHORT: u8 = 0xc0;
pub(crate) const LIST_LONG: u8 = 0xf7;

/// Payload lengths below this use the short form
pub(crate) const SHORT_LIMIT: usize = 56;

/// Encode an item to its canonical byte form
pub fn encode(item: &RlpItem) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(item, &mut out);
    out
}

/// Append an item's canonical encoding to `out`
pub fn encode_into(item: &RlpItem, out: &mut Vec<u8>) {
    match item {
        RlpItem::ByteString(data) => {
            if data.len() == 1 && data[0] < STRING_SHORT {
                out.push(data[0]);
            } else {
                write_frame(out, STRING_SHORT, STRING_LONG, data.len());
                out.extend_from_slice(data);
            }
        }
        RlpItem::List(items) => {
            let mut payload = Vec::new();
            for child in items {
                encode_into(child, &mut payload);
            }
            write_frame(out, LIST_SHORT, LIST_LONG, payload.len());
            out.extend_from_slice(&payload);
        }
    }
}

/// Writes the length prefix for a payload of `len` bytes.
fn write_frame(out: &mut Vec<u8>, short_base: u8, long_base: u8, len: usize) {
    if len < SHORT_LIMIT {
        out.push(short_base + len as u8);
    } else {
        let be = (len as u64).to_be_bytes();
        let first = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
        let len_bytes = &be[first..];
        out.push(long_base + len_bytes.len() as u8);
        out.extend_from_slice(len_bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dog() {
        assert_eq!(
            encode(&RlpItem::bytes(*b"dog")),
            vec![0x83, b'd', b'o', b'g']
        );
    }

    #[test]
    fn test_single_bytes() {
        assert_eq!(encode(&RlpItem::bytes([0x00])), vec![0x00]);
        assert_eq!(encode(&RlpItem::bytes([0x7f])), vec![0x7f]);
        // 0x80 no longer stands for itself
        assert_eq!(encode(&RlpItem::bytes([0x80])), vec![0x81, 0x80]);
    }

    #[test]
    fn test_empty_forms() {
        assert_eq!(encode(&RlpItem::bytes([])), vec![0x80]);
        assert_eq!(encode(&RlpItem::list([])), vec![0xc0]);
    }

    #[test]
    fn test_long_string_boundary() {
        let d55 = RlpItem::bytes(vec![b'x'; 55]);
        let e55 = encode(&d55);
        assert_eq!(e55[0], 0x80 + 55);
        assert_eq!(e55.len(), 56);

        let d56 = RlpItem::bytes(vec![b'x'; 56]);
        let e56 = encode(&d56);
        assert_eq!(&e56[..2], &[0xb8, 56]);
        assert_eq!(e56.len(), 58);
    }

    #[test]
    fn test_two_byte_length() {
        let item = RlpItem::bytes(vec![0u8; 300]);
        let encoded = encode(&item);
        assert_eq!(&encoded[..3], &[0xb9, 0x01, 0x2c]);
    }

    #[test]
    fn test_nested_lists() {
        // [ [], [[]], [ [], [[]] ] ]
        let item = RlpItem::list([
            RlpItem::list([]),
            RlpItem::list([RlpItem::list([])]),
            RlpItem::list([RlpItem::list([]), RlpItem::list([RlpItem::list([])])]),
        ]);
        assert_eq!(
            encode(&item),
            vec![0xc7, 0xc0, 0xc1, 0xc0, 0xc3, 0xc0, 0xc1, 0xc0]
        );
    }

    #[test]
    fn test_cat_dog_list() {
        let item = RlpItem::list([RlpItem::bytes(*b"cat"), RlpItem::bytes(*b"dog")]);
        assert_eq!(
            encode(&item),
            vec![0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g']
        );
    }
}
