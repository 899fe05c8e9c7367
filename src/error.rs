use thiserror::Error;

/// Errors surfaced by tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// No node with the requested key exists in the tree. Returned by
    /// [`search`][crate::arena::Tree::search] on a miss. Note that
    /// [`remove`][crate::arena::Tree::remove] treats the same condition as a
    /// silent no-op instead.
    #[error("key not found")]
    KeyNotFound,

    /// A structural relink named a node that is not a child of the given
    /// parent. Every deletion case funnels its relinking through one child
    /// replacement routine, which checks both child slots before overwriting
    /// either; this variant is that check failing. Internal callers treat it
    /// as a broken-invariant assertion, so seeing it escape means the tree's
    /// parent back-references no longer match its structure.
    #[error("node is not a child of the given parent")]
    NotAChild,
}
