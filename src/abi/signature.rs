//! Type-signature parser and process-wide descriptor cache
//!
//! Grammar:
//!
//! ```text
//! tuple := '(' type (',' type)* ')'
//! type  := base ('[' digits? ']')*
//! base  := elementary name | tuple
//! ```
//!
//! Width-less aliases canonicalize during parsing (`uint` → `uint256`,
//! `int` → `int256`). Identical signatures recur across many calls;
//! parsing memoizes into a read-mostly map keyed by canonical text, with
//! an extra key per non-canonical spelling seen. The miss path may race,
//! but only fully constructed descriptors are ever published, and racers
//! converge on the first published node.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::trace;

use super::types::{TypeDescriptor, WORD_BYTES};
use super::{AbiError, AbiResult};

static DESCRIPTOR_CACHE: Lazy<RwLock<HashMap<String, Arc<TypeDescriptor>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Parse a type signature into a shared, immutable descriptor
///
/// Accepts any single type; call-data signatures are tuples such as
/// `"(uint256,bool)"`. Results are cached process-wide under their
/// canonical text for the life of the process.
pub fn parse_signature(signature: &str) -> AbiResult<Arc<TypeDescriptor>> {
    if let Some(hit) = DESCRIPTOR_CACHE.read().get(signature) {
        return Ok(hit.clone());
    }
    trace!(signature, "type descriptor cache miss");

    let descriptor = Arc::new(Parser::new(signature).parse_root()?);

    let mut cache = DESCRIPTOR_CACHE.write();
    let published = cache
        .entry(descriptor.canonical().to_string())
        .or_insert_with(|| descriptor.clone())
        .clone();
    if signature != published.canonical() {
        // non-canonical spellings get their own key so they hit the read
        // path next time instead of re-parsing
        cache.insert(signature.to_string(), published.clone());
    }
    Ok(published)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(signature: &'a str) -> Self {
        Self {
            input: signature.as_bytes(),
            pos: 0,
        }
    }

    fn parse_root(mut self) -> AbiResult<TypeDescriptor> {
        let descriptor = self.parse_type()?;
        if self.pos != self.input.len() {
            return Err(self.error("unexpected trailing characters"));
        }
        Ok(descriptor)
    }

    fn parse_type(&mut self) -> AbiResult<TypeDescriptor> {
        let base = if self.peek() == Some(b'(') {
            self.parse_tuple()?
        } else {
            self.parse_elementary()?
        };
        self.parse_array_suffixes(base)
    }

    fn parse_tuple(&mut self) -> AbiResult<TypeDescriptor> {
        let start = self.pos;
        self.expect(b'(')?;
        let mut components = Vec::new();
        if self.peek() == Some(b')') {
            self.pos += 1;
            return TypeDescriptor::tuple_of(components).map_err(|e| self.rebase(e, start));
        }
        loop {
            components.push(Arc::new(self.parse_type()?));
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    return TypeDescriptor::tuple_of(components).map_err(|e| self.rebase(e, start));
                }
                Some(_) => return Err(self.error("expected ',' or ')'")),
                None => return Err(self.error("unbalanced parentheses")),
            }
        }
    }

    fn parse_elementary(&mut self) -> AbiResult<TypeDescriptor> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() {
                self.pos += 1;
            } else {
                break;
            }
        }
        let token = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error_at(start, "signature must be ASCII"))?;
        if token.is_empty() {
            return Err(self.error_at(start, "expected a type name"));
        }

        if let Some(width) = token.strip_prefix("uint") {
            let bits = self.parse_width(width, start, 256)?;
            return TypeDescriptor::uint(bits).map_err(|e| self.rebase(e, start));
        }
        if let Some(width) = token.strip_prefix("int") {
            let bits = self.parse_width(width, start, 256)?;
            return TypeDescriptor::int(bits).map_err(|e| self.rebase(e, start));
        }
        match token {
            "address" => return Ok(TypeDescriptor::address()),
            "bool" => return Ok(TypeDescriptor::boolean()),
            "function" => return Ok(TypeDescriptor::function()),
            "bytes" => return Ok(TypeDescriptor::bytes()),
            "string" => return Ok(TypeDescriptor::string()),
            _ => {}
        }
        if let Some(width) = token.strip_prefix("bytes") {
            let width = self.parse_width(width, start, WORD_BYTES)?;
            return TypeDescriptor::fixed_bytes(width).map_err(|e| self.rebase(e, start));
        }
        Err(self.error_at(start, &format!("unknown base type '{token}'")))
    }

    /// Parses the numeric suffix of `uintN`/`intN`/`bytesN`. An absent
    /// suffix canonicalizes to the alias default.
    fn parse_width(&self, digits: &str, start: usize, default: usize) -> AbiResult<usize> {
        if digits.is_empty() {
            return Ok(default);
        }
        if digits.starts_with('0') {
            return Err(self.error_at(start, "width must not have leading zeros"));
        }
        digits
            .parse::<usize>()
            .map_err(|_| self.error_at(start, "invalid width"))
    }

    fn parse_array_suffixes(&mut self, mut inner: TypeDescriptor) -> AbiResult<TypeDescriptor> {
        while self.peek() == Some(b'[') {
            let bracket = self.pos;
            self.pos += 1;
            let digits_start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
            let digits = &self.input[digits_start..self.pos];
            let length = if digits.is_empty() {
                None
            } else if digits[0] == b'0' {
                // covers both "[0]" and non-canonical "[007]"
                return Err(self.error_at(bracket, "invalid array dimension"));
            } else {
                let text = std::str::from_utf8(digits)
                    .map_err(|_| self.error_at(bracket, "invalid array dimension"))?;
                Some(
                    text.parse::<usize>()
                        .map_err(|_| self.error_at(bracket, "array dimension out of range"))?,
                )
            };
            self.expect(b']')?;
            inner = TypeDescriptor::array_of(Arc::new(inner), length)
                .map_err(|e| self.rebase(e, bracket))?;
        }
        Ok(inner)
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn expect(&mut self, c: u8) -> AbiResult<()> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c as char)))
        }
    }

    fn error(&self, reason: &str) -> AbiError {
        self.error_at(self.pos, reason)
    }

    fn error_at(&self, position: usize, reason: &str) -> AbiError {
        AbiError::SignatureSyntax {
            position,
            reason: reason.to_string(),
        }
    }

    /// Width errors from descriptor constructors carry no position; pin
    /// them to where the offending token started.
    fn rebase(&self, err: AbiError, position: usize) -> AbiError {
        match err {
            AbiError::SignatureSyntax { reason, .. } => AbiError::SignatureSyntax {
                position,
                reason,
            },
            other => other,
        }
    }
}
