//! Bounds-checked ABI decoder
//!
//! The decoder walks the descriptor tree against an untrusted byte slice.
//! Every offset word and length word is validated against the enclosing
//! frame before any slice or allocation happens, so hostile buffers fail
//! with a typed error and can never index out of bounds or reserve memory
//! proportional to a fabricated length word.
//!
//! Offsets are interpreted relative to the frame they appear in, matching
//! the encoder. Forward jumps past unused gap bytes are accepted; an
//! offset may not exceed the frame length.

use ethereum_types::U256;
use tracing::trace;

use super::types::{TypeDescriptor, TypeKind, FUNCTION_BYTES, WORD_BYTES};
use super::value::{sign_extend, Value};
use super::{AbiError, AbiResult};

/// Decoder strictness knobs
///
/// The defaults reject buffers the canonical encoder would never produce
/// while still accepting the offset gaps some encoders emit.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Require padding bytes to be zero (and sign extension bytes to match
    /// the sign bit). When false, padding is masked off instead.
    pub strict_padding: bool,
    /// Require each dynamic sibling's offset to be strictly greater than
    /// the previous sibling's, forcing tails into declaration order.
    pub require_ordered_offsets: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            strict_padding: true,
            require_ordered_offsets: false,
        }
    }
}

/// Decode `data` against a tuple descriptor
///
/// The whole buffer is one frame; trailing bytes past the last tail are
/// tolerated because offsets may legitimately skip regions.
pub fn decode(root: &TypeDescriptor, data: &[u8], config: &DecoderConfig) -> AbiResult<Vec<Value>> {
    let TypeKind::Tuple { components } = root.kind() else {
        return Err(AbiError::ValueMismatch {
            expected: "tuple descriptor".to_string(),
            got: root.canonical().to_string(),
        });
    };
    let descs: Vec<&TypeDescriptor> = components.iter().map(|c| c.as_ref()).collect();
    decode_sequence(&descs, data, config)
}

/// Decodes one head/tail frame. `frame` starts at the head of the sequence
/// and extends to the end of the region offsets may point into.
fn decode_sequence(
    descs: &[&TypeDescriptor],
    frame: &[u8],
    config: &DecoderConfig,
) -> AbiResult<Vec<Value>> {
    let mut values = Vec::with_capacity(descs.len());
    let mut cursor = 0usize;
    let mut last_offset: Option<usize> = None;
    for desc in descs {
        if desc.is_dynamic() {
            let word = read_word(frame, cursor)?;
            cursor += WORD_BYTES;
            let offset = checked_offset(word, frame.len())?;
            if config.require_ordered_offsets {
                if let Some(prev) = last_offset {
                    if offset <= prev {
                        trace!(offset, prev, "out-of-order tail offset");
                        return Err(AbiError::MalformedOffset {
                            offset: word,
                            limit: frame.len(),
                        });
                    }
                }
                last_offset = Some(offset);
            }
            values.push(decode_tail(desc, &frame[offset..], config)?);
        } else {
            values.push(decode_inline(desc, frame, cursor, config)?);
            cursor += desc.head_words() * WORD_BYTES;
        }
    }
    Ok(values)
}

/// Decodes a static value at head position `at`.
fn decode_inline(
    desc: &TypeDescriptor,
    frame: &[u8],
    at: usize,
    config: &DecoderConfig,
) -> AbiResult<Value> {
    match desc.kind() {
        TypeKind::Uint { bits } => {
            let bits = *bits;
            let word = read_word(frame, at)?;
            if config.strict_padding {
                check_zero_padding(frame, at, WORD_BYTES - bits / 8)?;
                Ok(Value::Uint(word))
            } else if bits >= 256 {
                Ok(Value::Uint(word))
            } else {
                Ok(Value::Uint(word & ((U256::one() << bits) - U256::one())))
            }
        }
        TypeKind::Int { bits } => {
            let word = read_word(frame, at)?;
            let extended = sign_extend(word, *bits);
            if config.strict_padding && extended != word {
                return Err(AbiError::InvalidPadding { position: at });
            }
            Ok(Value::Int(extended))
        }
        TypeKind::Bool => {
            let word = read_word(frame, at)?;
            if config.strict_padding && word > U256::one() {
                return Err(AbiError::InvalidPadding { position: at });
            }
            Ok(Value::Bool(!word.is_zero()))
        }
        TypeKind::Address => {
            let word = require(frame, at, WORD_BYTES)?;
            if config.strict_padding {
                check_zero_padding(frame, at, WORD_BYTES - 20)?;
            }
            let mut address = [0u8; 20];
            address.copy_from_slice(&word[WORD_BYTES - 20..]);
            Ok(Value::Address(address))
        }
        TypeKind::FixedBytes { width } => decode_fixed_bytes(frame, at, *width, config),
        TypeKind::Function => decode_fixed_bytes(frame, at, FUNCTION_BYTES, config),
        TypeKind::Array {
            element,
            length: Some(k),
        } => {
            // static fixed array: elements are inline at the head position
            let descs = vec![element.as_ref(); *k];
            let body = require(frame, at, desc.head_words() * WORD_BYTES)?;
            Ok(Value::Array(decode_sequence(&descs, body, config)?))
        }
        TypeKind::Tuple { components } => {
            let descs: Vec<&TypeDescriptor> = components.iter().map(|c| c.as_ref()).collect();
            let body = require(frame, at, desc.head_words() * WORD_BYTES)?;
            Ok(Value::Tuple(decode_sequence(&descs, body, config)?))
        }
        // dynamic kinds never appear inline; their head slot holds an offset
        TypeKind::Bytes | TypeKind::String | TypeKind::Array { length: None, .. } => {
            unreachable!("dynamic type in inline position")
        }
    }
}

/// Decodes a dynamic value whose tail starts at the beginning of `tail`.
fn decode_tail(desc: &TypeDescriptor, tail: &[u8], config: &DecoderConfig) -> AbiResult<Value> {
    match desc.kind() {
        TypeKind::Bytes => Ok(Value::Bytes(decode_byte_payload(tail, config)?)),
        TypeKind::String => {
            let raw = decode_byte_payload(tail, config)?;
            let text = String::from_utf8(raw).map_err(|_| AbiError::ValueMismatch {
                expected: "string".to_string(),
                got: "invalid utf-8 payload".to_string(),
            })?;
            Ok(Value::String(text))
        }
        TypeKind::Array {
            element,
            length: None,
        } => {
            let word = read_word(tail, 0)?;
            let len = word_to_len(word, tail.len())?;
            check_array_fits(element, len, tail.len() - WORD_BYTES, word, tail.len())?;
            let descs = vec![element.as_ref(); len];
            Ok(Value::Array(decode_sequence(
                &descs,
                &tail[WORD_BYTES..],
                config,
            )?))
        }
        TypeKind::Array {
            element,
            length: Some(k),
        } => {
            // fixed array of dynamic elements: head/tail frame, no length word
            let descs = vec![element.as_ref(); *k];
            Ok(Value::Array(decode_sequence(&descs, tail, config)?))
        }
        TypeKind::Tuple { components } => {
            let descs: Vec<&TypeDescriptor> = components.iter().map(|c| c.as_ref()).collect();
            Ok(Value::Tuple(decode_sequence(&descs, tail, config)?))
        }
        _ => unreachable!("static type in tail position"),
    }
}

/// Length word plus right-padded payload, shared by `bytes` and `string`.
fn decode_byte_payload(tail: &[u8], config: &DecoderConfig) -> AbiResult<Vec<u8>> {
    let word = read_word(tail, 0)?;
    let len = word_to_len(word, tail.len())?;
    let end = WORD_BYTES
        .checked_add(len)
        .ok_or(AbiError::BufferUnderflow {
            need: usize::MAX,
            got: tail.len(),
        })?;
    if config.strict_padding {
        // proves end <= tail.len(), so the padded end cannot overflow
        require(tail, 0, end)?;
        let padded_end = end + (WORD_BYTES - len % WORD_BYTES) % WORD_BYTES;
        require(tail, 0, padded_end)?;
        if let Some(nonzero) = tail[end..padded_end].iter().position(|&b| b != 0) {
            return Err(AbiError::InvalidPadding {
                position: end + nonzero,
            });
        }
    } else {
        require(tail, 0, end)?;
    }
    Ok(tail[WORD_BYTES..end].to_vec())
}

fn decode_fixed_bytes(
    frame: &[u8],
    at: usize,
    width: usize,
    config: &DecoderConfig,
) -> AbiResult<Value> {
    let word = require(frame, at, WORD_BYTES)?;
    if config.strict_padding {
        if let Some(nonzero) = word[width..].iter().position(|&b| b != 0) {
            return Err(AbiError::InvalidPadding {
                position: at + width + nonzero,
            });
        }
    }
    Ok(Value::FixedBytes(word[..width].to_vec()))
}

/// Rejects length words a buffer of `available` bytes can never satisfy
/// before the length is used for anything.
fn word_to_len(word: U256, available: usize) -> AbiResult<usize> {
    if word.bits() > 64 {
        return Err(AbiError::BufferUnderflow {
            need: usize::MAX,
            got: available,
        });
    }
    usize::try_from(word.low_u64()).map_err(|_| AbiError::BufferUnderflow {
        need: usize::MAX,
        got: available,
    })
}

/// Bounds an unbounded array's element count by the bytes actually present.
/// Every element consumes at least one byte of footprint, so `len` larger
/// than the remaining payload is unsatisfiable and is rejected before the
/// element vector is allocated.
fn check_array_fits(
    element: &TypeDescriptor,
    len: usize,
    payload_len: usize,
    word: U256,
    limit: usize,
) -> AbiResult<()> {
    let per_elem = if element.is_dynamic() {
        WORD_BYTES
    } else {
        element.head_words() * WORD_BYTES
    }
    .max(1);
    let need = len.checked_mul(per_elem);
    match need {
        Some(need) if need <= payload_len => Ok(()),
        _ => {
            trace!(len, payload_len, "array length exceeds available payload");
            Err(AbiError::MalformedOffset {
                offset: word,
                limit,
            })
        }
    }
}

/// Validates an offset word against the frame before it is used as an index.
fn checked_offset(word: U256, limit: usize) -> AbiResult<usize> {
    if word.bits() > 64 {
        return Err(AbiError::MalformedOffset {
            offset: word,
            limit,
        });
    }
    let offset = usize::try_from(word.low_u64()).map_err(|_| AbiError::MalformedOffset {
        offset: word,
        limit,
    })?;
    if offset > limit {
        return Err(AbiError::MalformedOffset {
            offset: word,
            limit,
        });
    }
    Ok(offset)
}

fn read_word(frame: &[u8], at: usize) -> AbiResult<U256> {
    let bytes = require(frame, at, WORD_BYTES)?;
    Ok(U256::from_big_endian(bytes))
}

/// Returns `frame[at..at + len]` or the underflow error with the absolute
/// byte counts a caller can report.
fn require(frame: &[u8], at: usize, len: usize) -> AbiResult<&[u8]> {
    let end = at.checked_add(len).ok_or(AbiError::BufferUnderflow {
        need: usize::MAX,
        got: frame.len(),
    })?;
    frame.get(at..end).ok_or(AbiError::BufferUnderflow {
        need: end,
        got: frame.len(),
    })
}

fn check_zero_padding(frame: &[u8], at: usize, pad_bytes: usize) -> AbiResult<()> {
    let word = require(frame, at, WORD_BYTES)?;
    if let Some(nonzero) = word[..pad_bytes].iter().position(|&b| b != 0) {
        return Err(AbiError::InvalidPadding {
            position: at + nonzero,
        });
    }
    Ok(())
}
