//! ABI type descriptor model
//!
//! A [`TypeDescriptor`] is an immutable, recursive description of an ABI
//! type. Static/dynamic classification and the static head size are
//! computed once at construction and cached on the node, so encode and
//! decode never re-derive them. Nodes are shared via `Arc` and are safe for
//! unsynchronized concurrent reads.

use std::sync::Arc;

use super::{AbiError, AbiResult};

/// Width of one ABI word in bytes
pub const WORD_BYTES: usize = 32;

/// Encoded width of the `function` elementary type (20-byte address plus
/// 4-byte selector, left-justified in one word)
pub const FUNCTION_BYTES: usize = 24;

/// Head sizes above this cannot be expressed in bytes without overflowing
/// `usize`, so the constructors reject them outright. Enforced for every
/// container, dynamic or not, because a dynamic container's sequence frame
/// still lays its children's heads out contiguously.
pub(crate) const MAX_HEAD_WORDS: usize = usize::MAX / WORD_BYTES;

/// The kind of an ABI type, as an exhaustive tagged variant
///
/// All type-specific codec logic dispatches on this enum; there is no
/// virtual dispatch and no open extension point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// `uintN`, N in [8,256] and a multiple of 8
    Uint { bits: usize },
    /// `intN`, two's complement, N in [8,256] and a multiple of 8
    Int { bits: usize },
    /// `address`, low 20 bytes of a word
    Address,
    /// `bool`, encoded as the integer 0 or 1
    Bool,
    /// `function`, a 24-byte address+selector pair encoded like `bytes24`
    Function,
    /// `bytesN`, N in [1,32], left-justified in one word
    FixedBytes { width: usize },
    /// `bytes`, dynamic length
    Bytes,
    /// `string`, dynamic length UTF-8
    String,
    /// `T[k]` when `length` is `Some(k)`, `T[]` when `None`
    Array {
        element: Arc<TypeDescriptor>,
        length: Option<usize>,
    },
    /// `(T0,T1,...)`
    Tuple { components: Vec<Arc<TypeDescriptor>> },
}

/// Immutable descriptor for one ABI type
///
/// Construction validates widths and precomputes the three properties the
/// codecs need on every call: the dynamic flag, the head size in words,
/// and the canonical type text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    kind: TypeKind,
    dynamic: bool,
    head_words: usize,
    canonical: String,
}

impl TypeDescriptor {
    pub fn uint(bits: usize) -> AbiResult<Self> {
        check_int_width("uint", bits)?;
        Ok(Self::elementary(
            TypeKind::Uint { bits },
            format!("uint{bits}"),
        ))
    }

    pub fn int(bits: usize) -> AbiResult<Self> {
        check_int_width("int", bits)?;
        Ok(Self::elementary(TypeKind::Int { bits }, format!("int{bits}")))
    }

    pub fn address() -> Self {
        Self::elementary(TypeKind::Address, "address".to_string())
    }

    pub fn boolean() -> Self {
        Self::elementary(TypeKind::Bool, "bool".to_string())
    }

    pub fn function() -> Self {
        Self::elementary(TypeKind::Function, "function".to_string())
    }

    pub fn fixed_bytes(width: usize) -> AbiResult<Self> {
        if width == 0 || width > WORD_BYTES {
            return Err(AbiError::SignatureSyntax {
                position: 0,
                reason: format!("bytes{width} is outside bytes1..bytes32"),
            });
        }
        Ok(Self::elementary(
            TypeKind::FixedBytes { width },
            format!("bytes{width}"),
        ))
    }

    pub fn bytes() -> Self {
        Self {
            kind: TypeKind::Bytes,
            dynamic: true,
            head_words: 1,
            canonical: "bytes".to_string(),
        }
    }

    pub fn string() -> Self {
        Self {
            kind: TypeKind::String,
            dynamic: true,
            head_words: 1,
            canonical: "string".to_string(),
        }
    }

    pub fn array_of(element: Arc<TypeDescriptor>, length: Option<usize>) -> AbiResult<Self> {
        if length == Some(0) {
            return Err(AbiError::SignatureSyntax {
                position: 0,
                reason: "array dimension must be nonzero".to_string(),
            });
        }
        let canonical = match length {
            Some(k) => format!("{}[{k}]", element.canonical),
            None => format!("{}[]", element.canonical),
        };
        // k copies of the element's head, inline when static, one offset
        // word each when dynamic; either way the frame must be addressable
        let frame_words = match length {
            Some(k) => k
                .checked_mul(element.head_words)
                .filter(|&w| w <= MAX_HEAD_WORDS)
                .ok_or_else(|| head_overflow(&canonical))?,
            None => 1,
        };
        let dynamic = length.is_none() || element.dynamic;
        let head_words = if dynamic { 1 } else { frame_words };
        Ok(Self {
            kind: TypeKind::Array { element, length },
            dynamic,
            head_words,
            canonical,
        })
    }

    pub fn tuple_of(components: Vec<Arc<TypeDescriptor>>) -> AbiResult<Self> {
        let mut canonical = String::from("(");
        for (i, c) in components.iter().enumerate() {
            if i > 0 {
                canonical.push(',');
            }
            canonical.push_str(&c.canonical);
        }
        canonical.push(')');
        let dynamic = components.iter().any(|c| c.dynamic);
        let frame_words = components
            .iter()
            .try_fold(0usize, |sum, c| sum.checked_add(c.head_words))
            .filter(|&w| w <= MAX_HEAD_WORDS)
            .ok_or_else(|| head_overflow(&canonical))?;
        let head_words = if dynamic { 1 } else { frame_words };
        Ok(Self {
            kind: TypeKind::Tuple { components },
            dynamic,
            head_words,
            canonical,
        })
    }

    fn elementary(kind: TypeKind, canonical: String) -> Self {
        Self {
            kind,
            dynamic: false,
            head_words: 1,
            canonical,
        }
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// True when encoding this type requires a length prefix and an offset
    /// pointer; computed transitively at construction.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Words this type occupies in its enclosing head region: one offset
    /// word when dynamic, the full inline word count when static.
    pub fn head_words(&self) -> usize {
        self.head_words
    }

    /// Canonical type text, e.g. `(uint256,bool[2])`
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

fn head_overflow(canonical: &str) -> AbiError {
    AbiError::SignatureSyntax {
        position: 0,
        reason: format!("{canonical} has a head too large to encode"),
    }
}

fn check_int_width(base: &str, bits: usize) -> AbiResult<()> {
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(AbiError::SignatureSyntax {
            position: 0,
            reason: format!("{base}{bits} has a width outside [8,256] or not a multiple of 8"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(d: TypeDescriptor) -> Arc<TypeDescriptor> {
        Arc::new(d)
    }

    #[test]
    fn test_elementary_classification() {
        assert!(!TypeDescriptor::uint(256).unwrap().is_dynamic());
        assert!(!TypeDescriptor::address().is_dynamic());
        assert!(TypeDescriptor::bytes().is_dynamic());
        assert!(TypeDescriptor::string().is_dynamic());
        assert_eq!(TypeDescriptor::uint(8).unwrap().head_words(), 1);
    }

    #[test]
    fn test_width_validation() {
        assert!(TypeDescriptor::uint(7).is_err());
        assert!(TypeDescriptor::uint(0).is_err());
        assert!(TypeDescriptor::int(264).is_err());
        assert!(TypeDescriptor::fixed_bytes(0).is_err());
        assert!(TypeDescriptor::fixed_bytes(33).is_err());
        assert!(TypeDescriptor::fixed_bytes(32).is_ok());
    }

    #[test]
    fn test_static_array_head_size() {
        let e = arc(TypeDescriptor::uint(256).unwrap());
        let a = TypeDescriptor::array_of(e, Some(3)).unwrap();
        assert!(!a.is_dynamic());
        assert_eq!(a.head_words(), 3);

        let nested = TypeDescriptor::array_of(arc(a), Some(2)).unwrap();
        assert_eq!(nested.head_words(), 6);
        assert_eq!(nested.canonical(), "uint256[3][2]");
    }

    #[test]
    fn test_dynamic_propagates_through_containers() {
        let s = arc(TypeDescriptor::string());
        let fixed = TypeDescriptor::array_of(s.clone(), Some(4)).unwrap();
        assert!(fixed.is_dynamic());
        assert_eq!(fixed.head_words(), 1);

        let t = TypeDescriptor::tuple_of(vec![arc(TypeDescriptor::boolean()), s]).unwrap();
        assert!(t.is_dynamic());
        assert_eq!(t.head_words(), 1);
    }

    #[test]
    fn test_static_tuple_head_is_sum_of_children() {
        let t = TypeDescriptor::tuple_of(vec![
            arc(TypeDescriptor::uint(8).unwrap()),
            arc(TypeDescriptor::array_of(arc(TypeDescriptor::boolean()), Some(2)).unwrap()),
        ])
        .unwrap();
        assert!(!t.is_dynamic());
        assert_eq!(t.head_words(), 3);
        assert_eq!(t.canonical(), "(uint8,bool[2])");
    }

    #[test]
    fn test_unbounded_array_is_always_dynamic() {
        let a = TypeDescriptor::array_of(arc(TypeDescriptor::uint(256).unwrap()), None).unwrap();
        assert!(a.is_dynamic());
        assert_eq!(a.canonical(), "uint256[]");
    }

    #[test]
    fn test_zero_array_dimension_rejected() {
        let e = arc(TypeDescriptor::uint(256).unwrap());
        assert!(TypeDescriptor::array_of(e, Some(0)).is_err());
    }

    #[test]
    fn test_head_size_overflow_rejected() {
        let e = arc(TypeDescriptor::uint(256).unwrap());
        let err = TypeDescriptor::array_of(e.clone(), Some(usize::MAX)).unwrap_err();
        assert!(matches!(err, AbiError::SignatureSyntax { .. }));

        // dimensions that individually fit but whose product or sum does not
        let big = arc(TypeDescriptor::array_of(e, Some(1 << 58)).unwrap());
        assert!(TypeDescriptor::array_of(big.clone(), Some(1 << 33)).is_err());
        assert!(TypeDescriptor::tuple_of(vec![big.clone(), big]).is_err());
    }
}
