//! This crate exposes a Binary Search Tree (BST) that permits duplicate
//! keys, mostly for educational purposes.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of this
//! duplicate-permitting BST are:
//!
//! 1. For every `Node` in the tree, all the `Node`s in its left subtree have
//!    a key less than its own key.
//! 2. For every `Node` in the tree, all the `Node`s in its right subtree have
//!    a key greater than *or equal to* its own key.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Because equal keys always route right, the tree can hold any number of
//! nodes with the same key. Searching returns the shallowest match on the
//! search path, and removal restructures the tree around that same node.
//!
//! The tree performs no rebalancing: inserting keys in sorted order degrades
//! it to a linked list with linear-depth operations. This is deliberate -
//! the point is the plain BST algorithms, not AVL/red-black maintenance.
//! Sorted iteration falls out of the structure by visiting the left subtree,
//! then the subtree root, then the right subtree.

#![deny(missing_docs)]

pub mod arena;
mod error;

pub use error::Error;

#[cfg(test)]
mod test;
