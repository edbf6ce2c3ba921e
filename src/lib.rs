//! # Contract ABI and RLP codec
//!
//! Two serialization schemes over contract call data and node payloads:
//!
//! - **ABI** ([`abi`]): type signatures parse into cached
//!   [`TypeDescriptor`] trees; values encode with the head/tail word layout
//!   and decode with every offset and length checked against the buffer.
//!   A thin call-data layer frames the encoding behind a 4-byte selector.
//! - **RLP** ([`rlp`]): canonical recursive length prefix over byte strings
//!   and lists, with a strict decoder that rejects every non-shortest form
//!   by default.
//!
//! ## Quick Start
//!
//! ```rust
//! use contract_codec::{parse_signature, DecoderConfig, Value};
//!
//! let desc = parse_signature("(uint256,bool)")?;
//! let encoded = contract_codec::abi::encode(&desc, &[Value::uint(1), Value::Bool(true)])?;
//! let decoded = contract_codec::abi::decode(&desc, &encoded, &DecoderConfig::default())?;
//! assert_eq!(decoded, vec![Value::uint(1), Value::Bool(true)]);
//! # Ok::<(), contract_codec::CodecError>(())
//! ```
//!
//! ```rust
//! use contract_codec::RlpItem;
//!
//! let encoded = contract_codec::rlp::encode(&RlpItem::bytes(*b"dog"));
//! assert_eq!(encoded, vec![0x83, b'd', b'o', b'g']);
//! assert_eq!(contract_codec::rlp::decode(&encoded)?, RlpItem::bytes(*b"dog"));
//! # Ok::<(), contract_codec::CodecError>(())
//! ```
//!
//! Both decoders treat input as adversarial: malformed bytes return a typed
//! error, never a panic, and never an allocation sized by an unvalidated
//! length field.

use thiserror::Error;

pub mod abi;
pub mod rlp;

pub use abi::{
    decode_call, encode_call, parse_signature, strip_selector, AbiError, DecoderConfig, Selector,
    TypeDescriptor, TypeKind, Value, SELECTOR_LEN, WORD_BYTES,
};
pub use rlp::{RlpDecoderConfig, RlpError, RlpItem};

/// Top-level error wrapping both codec families
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("ABI: {0}")]
    Abi(#[from] AbiError),

    #[error("RLP: {0}")]
    Rlp(#[from] RlpError),
}

/// Result type for mixed codec call sites
pub type Result<T> = std::result::Result<T, CodecError>;
