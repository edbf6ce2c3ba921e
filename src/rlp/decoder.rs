//! Strict RLP decoder
//!
//! Inverse of the encoder over untrusted bytes. Each item's payload bounds
//! are checked against the enclosing region before the payload is touched,
//! and list children may never read past their list's declared end. Under
//! the default config every non-shortest form is rejected, which makes
//! decode a true inverse of the canonical encoder.

use byteorder::{BigEndian, ByteOrder};
use tracing::trace;

use super::encoder::{LIST_LONG, LIST_SHORT, SHORT_LIMIT, STRING_LONG, STRING_SHORT};
use super::item::RlpItem;
use super::{RlpError, RlpResult};

/// Decoder strictness knob
#[derive(Debug, Clone, Default)]
pub struct RlpDecoderConfig {
    /// Accept non-shortest encodings: wrapped single bytes, long forms for
    /// short payloads, and length fields with leading zeros.
    pub allow_non_canonical: bool,
}

/// Decode one item occupying the entire input under the default config
pub fn decode(data: &[u8]) -> RlpResult<RlpItem> {
    decode_with(data, &RlpDecoderConfig::default())
}

/// Decode one item occupying the entire input
pub fn decode_with(data: &[u8], config: &RlpDecoderConfig) -> RlpResult<RlpItem> {
    let (item, used) = decode_item(data, 0, data.len(), config)?;
    if used != data.len() {
        return Err(RlpError::TrailingBytes {
            count: data.len() - used,
        });
    }
    Ok(item)
}

/// Decodes the item starting at `at`, never reading at or past `end`.
/// Returns the item and the bytes it consumed.
fn decode_item(
    data: &[u8],
    at: usize,
    end: usize,
    config: &RlpDecoderConfig,
) -> RlpResult<(RlpItem, usize)> {
    let lead = *data.get(at).filter(|_| at < end).ok_or(RlpError::Truncated {
        need: at + 1,
        got: end,
    })?;

    if lead < STRING_SHORT {
        return Ok((RlpItem::ByteString(vec![lead]), 1));
    }

    if lead < LIST_SHORT {
        // byte string
        let (payload_at, len) = read_length(data, at, end, lead, STRING_SHORT, STRING_LONG, config)?;
        let payload = contain(data, payload_at, len, end)?;
        if !config.allow_non_canonical && len == 1 && payload[0] < STRING_SHORT {
            trace!(at, "wrapped single byte");
            return Err(RlpError::NonCanonical {
                offset: at,
                reason: "single byte below 0x80 must encode as itself",
            });
        }
        let consumed = payload_at - at + len;
        return Ok((RlpItem::ByteString(payload.to_vec()), consumed));
    }

    // list
    let (payload_at, len) = read_length(data, at, end, lead, LIST_SHORT, LIST_LONG, config)?;
    contain(data, payload_at, len, end)?;
    let payload_end = payload_at + len;
    let mut items = Vec::new();
    let mut cursor = payload_at;
    while cursor < payload_end {
        let (child, used) = decode_item(data, cursor, payload_end, config)?;
        items.push(child);
        cursor += used;
    }
    Ok((RlpItem::List(items), payload_end - at))
}

/// Resolves the payload position and length for a short or long form lead
/// byte. `lead` is already known to be in the string or list range.
fn read_length(
    data: &[u8],
    at: usize,
    end: usize,
    lead: u8,
    short_base: u8,
    long_base: u8,
    config: &RlpDecoderConfig,
) -> RlpResult<(usize, usize)> {
    if lead <= long_base {
        return Ok((at + 1, (lead - short_base) as usize));
    }

    let lol = (lead - long_base) as usize; // 1..=8
    let len_at = at + 1;
    let len_bytes = contain(data, len_at, lol, end)?;
    if !config.allow_non_canonical && len_bytes[0] == 0 {
        return Err(RlpError::NonCanonical {
            offset: len_at,
            reason: "length field has a leading zero",
        });
    }
    let len64 = BigEndian::read_uint(len_bytes, lol);
    let len = usize::try_from(len64).map_err(|_| RlpError::Truncated {
        need: usize::MAX,
        got: end,
    })?;
    if !config.allow_non_canonical && len < SHORT_LIMIT {
        return Err(RlpError::NonCanonical {
            offset: at,
            reason: "long form used for a short payload",
        });
    }
    Ok((len_at + lol, len))
}

/// Returns `data[at..at + len]` after proving the region sits inside `end`.
fn contain(data: &[u8], at: usize, len: usize, end: usize) -> RlpResult<&[u8]> {
    let stop = at.checked_add(len).ok_or(RlpError::Truncated {
        need: usize::MAX,
        got: end,
    })?;
    if stop > end {
        return Err(RlpError::Truncated { need: stop, got: end });
    }
    Ok(&data[at..stop])
}
