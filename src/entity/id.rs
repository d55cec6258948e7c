use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of an entity.
///
/// Every id type reserves a placeholder space that real server ids never
/// occupy. Optimistic inserts use it until the server assigns the real id.
pub trait EntityId: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {
    fn placeholder(seq: u64) -> Self;

    fn is_placeholder(&self) -> bool;
}

/// Placeholder ids for `i64` start at `i64::MIN`. The first 2^32 values
/// below zero are reserved.
const I64_PLACEHOLDER_SPAN: u64 = 1 << 32;

impl EntityId for i64 {
    fn placeholder(seq: u64) -> Self {
        i64::MIN + (seq % I64_PLACEHOLDER_SPAN) as i64
    }

    fn is_placeholder(&self) -> bool {
        *self < i64::MIN + I64_PLACEHOLDER_SPAN as i64
    }
}

const STRING_PLACEHOLDER_PREFIX: &str = "tmp:";

impl EntityId for String {
    fn placeholder(seq: u64) -> Self {
        format!("{}{}", STRING_PLACEHOLDER_PREFIX, seq)
    }

    fn is_placeholder(&self) -> bool {
        self.starts_with(STRING_PLACEHOLDER_PREFIX)
    }
}

/// Monotonic source of placeholder sequence numbers.
///
/// Shared across stores so that two concurrent adds never produce the same
/// placeholder.
#[derive(Debug, Default)]
pub struct PlaceholderIds {
    next: AtomicU64,
}

impl PlaceholderIds {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    pub fn next<I: EntityId>(&self) -> I {
        I::placeholder(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
