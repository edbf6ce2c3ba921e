//! # Recursive length prefix codec
//!
//! ## Purpose
//!
//! Canonical RLP over the two-variant item model in [`item`]: byte strings
//! and heterogeneous lists. The encoder always emits the unique shortest
//! form; the decoder rejects every non-shortest form by default and treats
//! all input as untrusted.
//!
//! ## Architecture Role
//!
//! ```text
//! RlpItem → [encoder] → bytes   (canonical, injective)
//! bytes   → [decoder] → RlpItem (strict by default, lenient opt-in)
//! ```
//!
//! Canonical encoding is injective, so distinct items never share an
//! encoding and an encode/decode pair is the identity under the default
//! decoder config.

use thiserror::Error;

pub mod decoder;
pub mod encoder;
pub mod item;

pub use decoder::{decode, decode_with, RlpDecoderConfig};
pub use encoder::{encode, encode_into};
pub use item::RlpItem;

/// RLP codec errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RlpError {
    #[error("truncated input: need {need} bytes, got {got}")]
    Truncated { need: usize, got: usize },

    #[error("non-canonical encoding at byte {offset}: {reason}")]
    NonCanonical { offset: usize, reason: &'static str },

    #[error("{count} trailing bytes after the root item")]
    TrailingBytes { count: usize },
}

/// Result type for RLP operations
pub type RlpResult<T> = std::result::Result<T, RlpError>;
