//! RLP item model

/// One RLP item: an opaque byte string or a list of items
///
/// RLP carries no further type information. Integers, addresses, and any
/// other payload semantics live in the byte strings a caller supplies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    ByteString(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        RlpItem::ByteString(data.into())
    }

    pub fn list(items: impl Into<Vec<RlpItem>>) -> Self {
        RlpItem::List(items.into())
    }
}
