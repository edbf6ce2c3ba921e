//! # Contract ABI codec
//!
//! ## Purpose
//!
//! Canonical encoding and decoding of contract call data: a type-signature
//! parser producing an immutable [`TypeDescriptor`] tree, a head/tail
//! encoder and a bounds-checked decoder operating against that tree, and a
//! thin call-data wrapper that prepends an externally supplied 4-byte
//! selector.
//!
//! ## Architecture Role
//!
//! ```text
//! "(uint256,bool)" → [signature parser] → TypeDescriptor (cached, shared)
//!                                              ↓
//!                    values + descriptor → [encoder] → bytes
//!                    bytes  + descriptor → [decoder] → values
//! ```
//!
//! Descriptor trees are built once, cached process-wide, and safe for
//! unsynchronized concurrent reads. Encode and decode are pure functions
//! over their inputs; the decoder validates every offset and length against
//! the buffer before use so that adversarial input fails with a typed error
//! instead of corrupting anything.

use ethereum_types::U256;
use thiserror::Error;

pub mod calldata;
pub mod decoder;
pub mod encoder;
pub mod signature;
pub mod types;
pub mod value;

pub use calldata::{decode_call, encode_call, strip_selector, Selector, SELECTOR_LEN};
pub use decoder::{decode, DecoderConfig};
pub use encoder::encode;
pub use signature::parse_signature;
pub use types::{TypeDescriptor, TypeKind, WORD_BYTES};
pub use value::Value;

/// ABI codec errors with the context needed to act on them
///
/// Every failure mode is a distinct variant carrying the numbers a caller
/// needs for diagnostics. Malformed input never panics and never corrupts
/// state; all variants are returned synchronously to the immediate caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("signature syntax error at byte {position}: {reason}")]
    SignatureSyntax { position: usize, reason: String },

    #[error("value does not match descriptor: expected {expected}, got {got}")]
    ValueMismatch { expected: String, got: String },

    #[error("value exceeds the declared width of {canonical}")]
    EncodeOverflow { canonical: String },

    #[error("missing value at index {index}")]
    NullValue { index: usize },

    #[error("decode buffer underflow: need {need} bytes, got {got}")]
    BufferUnderflow { need: usize, got: usize },

    #[error("malformed offset {offset} for a region of {limit} bytes")]
    MalformedOffset { offset: U256, limit: usize },

    #[error("nonzero padding at byte {position}")]
    InvalidPadding { position: usize },

    #[error("selector mismatch: expected {expected}, got {got}")]
    SelectorMismatch { expected: Selector, got: Selector },
}

/// Result type for ABI operations
pub type AbiResult<T> = std::result::Result<T, AbiError>;
