//! An arena-backed BST that permits duplicate keys. Nodes live in slot
//! storage owned by the tree and point at each other through stable indices
//! instead of `Rc`s or raw pointers. Each node keeps a parent back-reference
//! (an index, never an owning edge) so deletion and in-order iteration can
//! navigate upward without a side stack.
//!
//! Equal keys always route into the right subtree, so inserting an existing
//! key adds another node rather than overwriting a value.
//!
//! # Examples
//!
//! ```
//! use dupbst::arena::Tree;
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert!(tree.search(&1).is_err());
//!
//! tree.insert(1, "first");
//! tree.insert(1, "second");
//! assert_eq!(tree.len(), 2);
//!
//! // Searching finds the shallowest node with the key.
//! assert_eq!(tree.search(&1), Ok(&"first"));
//!
//! // Removing detaches one matching node at a time.
//! tree.remove(&1);
//! assert_eq!(tree.len(), 1);
//! tree.remove(&1);
//! assert!(tree.search(&1).is_err());
//!
//! // Removing a missing key is a no-op, not an error.
//! tree.remove(&42);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::{FromIterator, FusedIterator};
use std::mem;

use crate::Error;

/// A stable index into a [`Tree`]'s slot storage. Identifies one node for as
/// long as that node is alive; freed slots are recycled for later insertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

struct Node<K, V> {
    key: K,
    value: V,
    left: Option<NodeId>,
    right: Option<NodeId>,
    /// Back-reference to the structural parent, `None` for the root. Used
    /// only for upward navigation - ownership runs strictly downward through
    /// `left` and `right`.
    parent: Option<NodeId>,
}

/// A Binary Search Tree permitting duplicate keys. This can be used for
/// inserting, finding, and deleting keys and values. Equal keys route right,
/// so the same key may be stored any number of times.
///
/// The tree performs no rebalancing; see the [crate docs](crate) for why.
pub struct Tree<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
}

impl<K, V> Default for Tree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Tree<K, V> {
    /// Generates a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// The number of nodes currently stored. Duplicate keys count once per
    /// node holding them.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupbst::arena::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1, 2);
    /// tree.insert(1, 3);
    ///
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Finds the value associated with the given key, or fails with
    /// [`Error::KeyNotFound`]. With duplicate keys present, this returns the
    /// value of the shallowest matching node on the search path - the same
    /// node [`remove`][Self::remove] would detach.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupbst::{arena::Tree, Error};
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1, 2);
    ///
    /// assert_eq!(tree.search(&1), Ok(&2));
    /// assert_eq!(tree.search(&42), Err(Error::KeyNotFound));
    /// ```
    pub fn search(&self, key: &K) -> Result<&V, Error>
    where
        K: Ord,
    {
        match self.locate(key) {
            Some(id) => Ok(&self.node(id).value),
            None => Err(Error::KeyNotFound),
        }
    }

    /// Inserts the given key and value as a fresh leaf. Never rejects or
    /// overwrites: inserting an existing key stores a second node for it.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupbst::arena::Tree;
    ///
    /// let mut tree = Tree::new();
    ///
    /// tree.insert(1, 2);
    /// tree.insert(1, 3);
    ///
    /// assert_eq!(tree.len(), 2);
    /// assert_eq!(tree.search(&1), Ok(&2));
    /// ```
    pub fn insert(&mut self, key: K, value: V)
    where
        K: Ord,
    {
        let mut current = match self.root {
            Some(root) => root,
            None => {
                let id = self.alloc(key, value, None);
                self.root = Some(id);
                return;
            }
        };
        let id = self.alloc(key, value, None);

        // Only a strictly smaller key branches left; equal keys descend
        // right along with the greater ones. The new node lands in the first
        // absent child slot on that path.
        loop {
            if self.node(id).key < self.node(current).key {
                match self.node(current).left {
                    Some(left) => current = left,
                    None => {
                        self.node_mut(current).left = Some(id);
                        self.node_mut(id).parent = Some(current);
                        return;
                    }
                }
            } else {
                match self.node(current).right {
                    Some(right) => current = right,
                    None => {
                        self.node_mut(current).right = Some(id);
                        self.node_mut(id).parent = Some(current);
                        return;
                    }
                }
            }
        }
    }

    /// Removes the first node found matching the given key, restructuring
    /// the tree around it. If no node matches, nothing happens - unlike
    /// [`search`][Self::search], a miss here is **not** an error. That
    /// asymmetry is intentional, if debatable.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupbst::arena::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1, 2);
    ///
    /// tree.remove(&1);
    /// assert!(tree.search(&1).is_err());
    ///
    /// // A second remove of the same key does nothing.
    /// tree.remove(&1);
    /// ```
    pub fn remove(&mut self, key: &K)
    where
        K: Ord,
    {
        if let Some(id) = self.locate(key) {
            self.remove_node(id);
        }
    }

    /// Returns an iterator over the tree's entries in ascending key order.
    /// Duplicate keys appear once per node holding them.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupbst::arena::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(2, "b");
    /// tree.insert(1, "a");
    /// tree.insert(3, "c");
    ///
    /// let entries: Vec<_> = tree.iter().collect();
    /// assert_eq!(entries, [(&1, &"a"), (&2, &"b"), (&3, &"c")]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: self,
            next: self.root.map(|root| self.leftmost(root)),
            remaining: self.len,
        }
    }

    /// The height of the tree: the number of edges on the longest root-to-leaf
    /// path. An empty tree has height `-1` and a lone root has height `0`.
    ///
    /// Computed by a full walk each call; nothing is cached.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupbst::arena::Tree;
    ///
    /// let mut tree = Tree::new();
    /// assert_eq!(tree.height(), -1);
    ///
    /// tree.insert(1, 1);
    /// assert_eq!(tree.height(), 0);
    ///
    /// tree.insert(2, 2);
    /// tree.insert(3, 3);
    /// assert_eq!(tree.height(), 2);
    /// ```
    pub fn height(&self) -> i32 {
        self.height_below(self.root)
    }

    /// Releases every node and returns the tree to the empty state.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupbst::arena::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1, 2);
    /// tree.clear();
    ///
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.height(), -1);
    /// ```
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    /// The iterative search walk shared by `search` and `remove`: equal keys
    /// stop at the shallowest match, smaller keys descend left, greater
    /// descend right.
    fn locate(&self, key: &K) -> Option<NodeId>
    where
        K: Ord,
    {
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.node(id);
            match key.cmp(&node.key) {
                Ordering::Equal => return Some(id),
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
            }
        }
        None
    }

    /// Detaches the node with the given identity. Recurses at most once: the
    /// two-children case hands its payload to the in-order successor and
    /// deletes that node instead, and a successor never has a left child.
    fn remove_node(&mut self, id: NodeId) {
        let (left, right) = {
            let node = self.node(id);
            (node.left, node.right)
        };

        if let (Some(_), Some(right)) = (left, right) {
            // The in-order successor is the leftmost node of the right
            // subtree. Trading payloads keeps the target node's identity and
            // links in place; the successor now carries the doomed payload
            // and falls into a zero-or-one-child case below.
            let successor = self.leftmost(right);
            self.swap_payload(id, successor);
            self.remove_node(successor);
        } else {
            let child = left.or(right);
            if self.root == Some(id) {
                self.root = child;
                if let Some(child) = child {
                    self.node_mut(child).parent = None;
                }
            } else {
                let parent = self.node(id).parent.expect("non-root node has a parent");
                self.replace_child(parent, id, child)
                    .expect("detached node is a child of its recorded parent");
            }
            self.release(id);
        }
    }

    /// Overwrites whichever of `parent`'s child slots holds `current` with
    /// `new`, and points `new`'s parent back-reference at `parent`. Every
    /// deletion case relinks through here so the back-references can't drift
    /// out of sync with the structure.
    fn replace_child(
        &mut self,
        parent: NodeId,
        current: NodeId,
        new: Option<NodeId>,
    ) -> Result<(), Error> {
        let parent_node = self.node_mut(parent);
        if parent_node.left == Some(current) {
            parent_node.left = new;
        } else if parent_node.right == Some(current) {
            parent_node.right = new;
        } else {
            return Err(Error::NotAChild);
        }

        if let Some(new) = new {
            self.node_mut(new).parent = Some(parent);
        }
        Ok(())
    }

    /// Follows left edges from `id` down to the smallest key in its subtree.
    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.node(id).left {
            id = left;
        }
        id
    }

    /// The next node in key order after `id`: the leftmost node of the right
    /// subtree if there is one, otherwise the first ancestor reached by
    /// climbing out of a left child.
    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.node(id).right {
            return Some(self.leftmost(right));
        }

        let mut current = id;
        loop {
            let parent = self.node(current).parent?;
            if self.node(parent).right == Some(current) {
                current = parent;
            } else {
                return Some(parent);
            }
        }
    }

    fn height_below(&self, id: Option<NodeId>) -> i32 {
        match id {
            None => -1,
            Some(id) => {
                let node = self.node(id);
                1 + self
                    .height_below(node.left)
                    .max(self.height_below(node.right))
            }
        }
    }

    fn node(&self, id: NodeId) -> &Node<K, V> {
        self.slots[id.0]
            .as_ref()
            .expect("node id refers to an occupied slot")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.slots[id.0]
            .as_mut()
            .expect("node id refers to an occupied slot")
    }

    /// Stores a fresh leaf, reusing a vacated slot when one is available.
    fn alloc(&mut self, key: K, value: V, parent: Option<NodeId>) -> NodeId {
        self.len += 1;
        let node = Node {
            key,
            value,
            left: None,
            right: None,
            parent,
        };
        match self.free.pop() {
            Some(id) => {
                debug_assert!(self.slots[id.0].is_none());
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Drops a detached node and recycles its slot. The caller must already
    /// have unlinked it from the structure.
    fn release(&mut self, id: NodeId) {
        let _node = self.slots[id.0]
            .take()
            .expect("released node occupies its slot");
        self.free.push(id);
        self.len -= 1;
    }

    /// Exchanges the key/value payloads of two live nodes, leaving both
    /// nodes' structural links untouched.
    fn swap_payload(&mut self, a: NodeId, b: NodeId) {
        debug_assert_ne!(a.0, b.0);
        let (low, high) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (front, back) = self.slots.split_at_mut(high);
        let x = front[low]
            .as_mut()
            .expect("node id refers to an occupied slot");
        let y = back[0]
            .as_mut()
            .expect("node id refers to an occupied slot");
        mem::swap(&mut x.key, &mut y.key);
        mem::swap(&mut x.value, &mut y.value);
    }

    /// Recursively clones the subtree rooted at `id` in `source` into this
    /// tree: payload first, then both subtrees, with each clone's parent
    /// back-reference pointing at its structural parent in the *new* graph.
    /// Nothing is shared with `source`.
    fn clone_subtree(&mut self, source: &Self, id: NodeId, parent: Option<NodeId>) -> NodeId
    where
        K: Clone,
        V: Clone,
    {
        let (key, value) = {
            let node = source.node(id);
            (node.key.clone(), node.value.clone())
        };
        let copy = self.alloc(key, value, parent);

        let (left, right) = {
            let node = source.node(id);
            (node.left, node.right)
        };
        let left = left.map(|left| self.clone_subtree(source, left, Some(copy)));
        let right = right.map(|right| self.clone_subtree(source, right, Some(copy)));

        let copy_node = self.node_mut(copy);
        copy_node.left = left;
        copy_node.right = right;
        copy
    }
}

/// Manual implementation so the bounds land on `K` and `V` themselves rather
/// than requiring the whole `Node` storage to be `Clone`-derivable, and so
/// `clone_from` can use the copy-and-swap idiom below.
impl<K, V> Clone for Tree<K, V>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        let mut copy = Self::new();
        if let Some(root) = self.root {
            let new_root = copy.clone_subtree(self, root, None);
            copy.root = Some(new_root);
        }
        copy
    }

    /// Copy-and-swap: build the replacement as a fully independent tree,
    /// then trade owned state with `self`. The previously owned graph is
    /// released exactly once when the temporary drops, and a clone failure
    /// (panic) leaves `self` untouched.
    fn clone_from(&mut self, source: &Self) {
        let mut fresh = source.clone();
        mem::swap(self, &mut fresh);
    }
}

impl<K, V> fmt::Debug for Tree<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> Extend<(K, V)> for Tree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for Tree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, K, V> IntoIterator for &'a Tree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An in-order iterator over a [`Tree`]'s entries, created by
/// [`Tree::iter`]. Yields `(&K, &V)` pairs in ascending key order by walking
/// the parent back-references, so it needs no side stack.
pub struct Iter<'a, K, V> {
    tree: &'a Tree<K, V>,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.successor(id);
        self.remaining -= 1;
        let node = self.tree.node(id);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}
