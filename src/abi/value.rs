//! Runtime values for ABI encoding
//!
//! [`Value`] mirrors [`TypeKind`](super::types::TypeKind) shape for shape.
//! Integers are carried as 256-bit words; signed values use the full-width
//! two's-complement representation, so `Value::int(-1)` is a word of all
//! ones regardless of the declared `intN` width. Width checks happen at
//! encode time against the descriptor.

use ethereum_types::U256;

/// One ABI value, structurally matching its descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Unsigned integer, right-aligned in a word
    Uint(U256),
    /// Signed integer as full-width two's complement
    Int(U256),
    Bool(bool),
    Address([u8; 20]),
    /// Payload for `bytesN` and `function`
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Value {
    /// Convenience constructor for small unsigned integers
    pub fn uint(v: u64) -> Self {
        Value::Uint(U256::from(v))
    }

    /// Convenience constructor for small signed integers, sign-extended to
    /// the full 256-bit two's-complement representation
    pub fn int(v: i64) -> Self {
        if v >= 0 {
            Value::Int(U256::from(v as u64))
        } else {
            // 2^256 + v, computed without negating i64::MIN
            Value::Int(U256::MAX - U256::from(-(v + 1) as u64))
        }
    }

    /// Kind label used in mismatch errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Address(_) => "address",
            Value::FixedBytes(_) => "fixed bytes",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Tuple(_) => "tuple",
        }
    }
}

/// True when `value` is representable as an unsigned integer of `bits` bits
pub fn fits_uint(value: &U256, bits: usize) -> bool {
    bits >= 256 || (*value >> bits).is_zero()
}

/// True when `value` is a valid sign-extended two's-complement integer of
/// `bits` bits: every bit above the sign bit must repeat it
pub fn fits_int(value: &U256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    let upper = *value >> (bits - 1);
    upper.is_zero() || upper == U256::MAX >> (bits - 1)
}

/// Sign-extend the low `bits` bits of `value` to the full word
pub fn sign_extend(value: U256, bits: usize) -> U256 {
    if bits >= 256 {
        return value;
    }
    let mask = (U256::one() << bits) - U256::one();
    let low = value & mask;
    if (low >> (bits - 1)).is_zero() {
        low
    } else {
        low | !mask
    }
}
