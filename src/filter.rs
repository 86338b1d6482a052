use crate::error::JsonPointer;

/// The kind of value a [`Filter`] is being asked about, before it has been
/// materialised. Mirrors the pending-value-kind vocabulary the
/// [`EventReader`](crate::reader::EventReader) tracks internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Null,
    Boolean,
    Number,
    String,
    Object,
    Array,
}

/// A caller-supplied predicate consulted before a child is materialised.
///
/// Rejection causes the [`TreeBuilder`](crate::builder::TreeBuilder) to
/// skip the subtree (or discard the scalar) rather than raise an error.
pub trait Filter {
    /// Called before building the value of an object field.
    fn accept_field(&self, key: &str, pending_kind: PendingKind, path: &JsonPointer) -> bool;

    /// Called before building the value of an array element.
    fn accept_index(&self, index: usize, pending_kind: PendingKind, path: &JsonPointer) -> bool;
}

impl<F> Filter for F
where
    F: Fn(Option<&str>, Option<usize>, PendingKind, &JsonPointer) -> bool,
{
    fn accept_field(&self, key: &str, pending_kind: PendingKind, path: &JsonPointer) -> bool {
        self(Some(key), None, pending_kind, path)
    }

    fn accept_index(&self, index: usize, pending_kind: PendingKind, path: &JsonPointer) -> bool {
        self(None, Some(index), pending_kind, path)
    }
}

/// A filter that accepts every field and every element. Useful as an
/// explicit default when a caller wants to pass `BuilderLimits` without
/// filtering.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl Filter for AcceptAll {
    fn accept_field(&self, _key: &str, _pending_kind: PendingKind, _path: &JsonPointer) -> bool {
        true
    }

    fn accept_index(&self, _index: usize, _pending_kind: PendingKind, _path: &JsonPointer) -> bool {
        true
    }
}
