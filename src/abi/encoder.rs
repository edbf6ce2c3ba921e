//! Head/tail ABI encoder
//!
//! Encoding a sequence is two passes over the same elements: the head pass
//! writes static values inline and one 32-byte offset word per dynamic
//! value, the tail pass appends every dynamic value's payload in the same
//! left-to-right order. Offsets are relative to the start of the enclosing
//! sequence's own head, so nested dynamic containers apply the identical
//! scheme recursively.

use ethereum_types::U256;

use super::types::{TypeDescriptor, TypeKind, FUNCTION_BYTES, MAX_HEAD_WORDS, WORD_BYTES};
use super::value::{fits_int, fits_uint, Value};
use super::{AbiError, AbiResult};

/// Encode `values` against a tuple descriptor
///
/// `root` must describe a tuple; the result is the head/tail encoding of
/// its components with no selector prefix.
pub fn encode(root: &TypeDescriptor, values: &[Value]) -> AbiResult<Vec<u8>> {
    let TypeKind::Tuple { components } = root.kind() else {
        return Err(AbiError::ValueMismatch {
            expected: "tuple descriptor".to_string(),
            got: root.canonical().to_string(),
        });
    };
    let descs: Vec<&TypeDescriptor> = components.iter().map(|c| c.as_ref()).collect();
    let mut out = Vec::new();
    encode_sequence(&descs, values, &mut out)?;
    Ok(out)
}

/// Encodes one head/tail frame: a tuple body or an array's element area.
fn encode_sequence(descs: &[&TypeDescriptor], values: &[Value], out: &mut Vec<u8>) -> AbiResult<()> {
    if values.len() < descs.len() {
        return Err(AbiError::NullValue {
            index: values.len(),
        });
    }
    if values.len() > descs.len() {
        return Err(AbiError::ValueMismatch {
            expected: format!("{} values", descs.len()),
            got: format!("{} values", values.len()),
        });
    }

    let head_size: usize = descs.iter().map(|d| d.head_words() * WORD_BYTES).sum();

    let mut tails: Vec<Option<Vec<u8>>> = Vec::with_capacity(descs.len());
    for (desc, value) in descs.iter().zip(values) {
        if desc.is_dynamic() {
            let mut tail = Vec::new();
            encode_tail(desc, value, &mut tail)?;
            tails.push(Some(tail));
        } else {
            tails.push(None);
        }
    }

    let mut tail_offset = head_size;
    for ((desc, value), tail) in descs.iter().zip(values).zip(&tails) {
        match tail {
            Some(tail) => {
                push_word(out, U256::from(tail_offset));
                tail_offset += tail.len();
            }
            None => encode_inline(desc, value, out)?,
        }
    }
    for tail in tails.into_iter().flatten() {
        out.extend_from_slice(&tail);
    }
    Ok(())
}

/// Writes a static value at its head position.
fn encode_inline(desc: &TypeDescriptor, value: &Value, out: &mut Vec<u8>) -> AbiResult<()> {
    match (desc.kind(), value) {
        (TypeKind::Uint { bits }, Value::Uint(v)) => {
            if !fits_uint(v, *bits) {
                return Err(overflow(desc));
            }
            push_word(out, *v);
            Ok(())
        }
        (TypeKind::Int { bits }, Value::Int(v)) => {
            if !fits_int(v, *bits) {
                return Err(overflow(desc));
            }
            push_word(out, *v);
            Ok(())
        }
        (TypeKind::Bool, Value::Bool(b)) => {
            push_word(out, U256::from(*b as u8));
            Ok(())
        }
        (TypeKind::Address, Value::Address(a)) => {
            out.extend_from_slice(&[0u8; WORD_BYTES - 20]);
            out.extend_from_slice(a);
            Ok(())
        }
        (TypeKind::FixedBytes { width }, Value::FixedBytes(b)) => push_fixed_bytes(desc, b, *width, out),
        (TypeKind::Function, Value::FixedBytes(b)) => push_fixed_bytes(desc, b, FUNCTION_BYTES, out),
        (
            TypeKind::Array {
                element,
                length: Some(k),
            },
            Value::Array(items),
        ) => {
            let descs = vec![element.as_ref(); *k];
            encode_sequence(&descs, items, out)
        }
        (TypeKind::Tuple { components }, Value::Tuple(items)) => {
            let descs: Vec<&TypeDescriptor> = components.iter().map(|c| c.as_ref()).collect();
            encode_sequence(&descs, items, out)
        }
        _ => Err(mismatch(desc, value)),
    }
}

/// Writes a dynamic value's tail payload.
fn encode_tail(desc: &TypeDescriptor, value: &Value, out: &mut Vec<u8>) -> AbiResult<()> {
    match (desc.kind(), value) {
        (TypeKind::Bytes, Value::Bytes(b)) => {
            push_length_prefixed(out, b);
            Ok(())
        }
        (TypeKind::String, Value::String(s)) => {
            push_length_prefixed(out, s.as_bytes());
            Ok(())
        }
        (
            TypeKind::Array {
                element,
                length: None,
            },
            Value::Array(items),
        ) => {
            // runtime length is not bounded by the descriptor, so the
            // frame-size cap applies here instead of at construction
            if items
                .len()
                .checked_mul(element.head_words())
                .filter(|&w| w <= MAX_HEAD_WORDS)
                .is_none()
            {
                return Err(overflow(desc));
            }
            push_word(out, U256::from(items.len()));
            let descs = vec![element.as_ref(); items.len()];
            encode_sequence(&descs, items, out)
        }
        (
            TypeKind::Array {
                element,
                length: Some(k),
            },
            Value::Array(items),
        ) => {
            // dynamic because the element type is dynamic; no length word
            let descs = vec![element.as_ref(); *k];
            encode_sequence(&descs, items, out)
        }
        (TypeKind::Tuple { components }, Value::Tuple(items)) => {
            let descs: Vec<&TypeDescriptor> = components.iter().map(|c| c.as_ref()).collect();
            encode_sequence(&descs, items, out)
        }
        _ => Err(mismatch(desc, value)),
    }
}

fn push_word(out: &mut Vec<u8>, v: U256) {
    let mut word = [0u8; WORD_BYTES];
    v.to_big_endian(&mut word);
    out.extend_from_slice(&word);
}

fn push_fixed_bytes(
    desc: &TypeDescriptor,
    bytes: &[u8],
    width: usize,
    out: &mut Vec<u8>,
) -> AbiResult<()> {
    if bytes.len() != width {
        return Err(overflow(desc));
    }
    out.extend_from_slice(bytes);
    out.extend_from_slice(&vec![0u8; WORD_BYTES - width]);
    Ok(())
}

fn push_length_prefixed(out: &mut Vec<u8>, data: &[u8]) {
    push_word(out, U256::from(data.len()));
    out.extend_from_slice(data);
    let pad = (WORD_BYTES - data.len() % WORD_BYTES) % WORD_BYTES;
    out.extend_from_slice(&vec![0u8; pad]);
}

fn mismatch(desc: &TypeDescriptor, value: &Value) -> AbiError {
    AbiError::ValueMismatch {
        expected: desc.canonical().to_string(),
        got: value.kind_name().to_string(),
    }
}

fn overflow(desc: &TypeDescriptor) -> AbiError {
    AbiError::EncodeOverflow {
        canonical: desc.canonical().to_string(),
    }
}
