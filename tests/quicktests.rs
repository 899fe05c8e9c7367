use dupbst::arena::Tree;
use dupbst::Error;

use quickcheck::{Arbitrary, Gen};

use std::collections::{BTreeMap, HashSet};

/// An enum for the various kinds of "things" to do to
/// binary search trees in a quicktest.
#[derive(Copy, Clone, Debug)]
enum Op<K, V> {
    /// Insert the K, V into the data structure
    Insert(K, V),
    /// Remove one node with the K from the data structure
    Remove(K),
}

impl<K, V> Arbitrary for Op<K, V>
where
    K: Arbitrary,
    V: Arbitrary,
{
    /// Tells quickcheck how to randomly choose an operation
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0, 1]).unwrap() {
            0 => Op::Insert(K::arbitrary(g), V::arbitrary(g)),
            1 => Op::Remove(K::arbitrary(g)),
            _ => unreachable!(),
        }
    }
}

/// Applies a set of operations to a tree and a reference multimap. This way
/// we can ensure that after a random smattering of inserts and removes the
/// tree holds the same key/value multiset as the model.
///
/// The tree removes the first match on its search path, which is exactly the
/// node `search` reports, so the model asks the tree which value is about to
/// go before mirroring the removal.
fn do_ops(ops: &[Op<i8, i8>], tree: &mut Tree<i8, i8>, model: &mut BTreeMap<i8, Vec<i8>>) {
    for op in ops {
        match op {
            Op::Insert(k, v) => {
                tree.insert(*k, *v);
                model.entry(*k).or_insert_with(Vec::new).push(*v);
            }
            Op::Remove(k) => {
                if let Ok(&hit) = tree.search(k) {
                    let values = model.get_mut(k).expect("model tracks every stored key");
                    let at = values
                        .iter()
                        .position(|&v| v == hit)
                        .expect("model tracks every stored value");
                    values.swap_remove(at);
                    if values.is_empty() {
                        model.remove(k);
                    }
                }
                tree.remove(k);
            }
        }
    }
}

quickcheck::quickcheck! {
    fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>) -> bool {
        let mut tree = Tree::new();
        let mut model = BTreeMap::new();

        do_ops(&ops, &mut tree, &mut model);

        let entries: Vec<(i8, i8)> = tree.iter().map(|(k, v)| (*k, *v)).collect();

        // Keys come out sorted, the length accounting holds, and every
        // surviving key resolves to one of the values stored under it.
        entries.windows(2).all(|pair| pair[0].0 <= pair[1].0)
            && entries.len() == tree.len()
            && entries.len() == model.values().map(Vec::len).sum::<usize>()
            && model
                .iter()
                .all(|(k, values)| matches!(tree.search(k), Ok(v) if values.contains(v)))
    }
}

quickcheck::quickcheck! {
    fn insert_search_round_trip(xs: Vec<(i8, i8)>) -> bool {
        let mut tree = Tree::new();
        let mut model: BTreeMap<i8, Vec<i8>> = BTreeMap::new();
        for (k, v) in &xs {
            tree.insert(*k, *v);
            model.entry(*k).or_insert_with(Vec::new).push(*v);
        }

        // Each inserted key resolves to one of the values inserted for it.
        model
            .iter()
            .all(|(k, values)| matches!(tree.search(k), Ok(v) if values.contains(v)))
    }
}

quickcheck::quickcheck! {
    fn miss_semantics(xs: Vec<i8>, nots: Vec<i8>) -> bool {
        let mut tree = Tree::new();
        for x in &xs {
            tree.insert(*x, *x);
        }

        let added: HashSet<_> = xs.iter().copied().collect();
        let misses: Vec<i8> = nots.iter().copied().filter(|x| !added.contains(x)).collect();

        // A key never inserted fails to search ...
        if !misses.iter().all(|x| tree.search(x) == Err(Error::KeyNotFound)) {
            return false;
        }

        // ... while removing it is a no-op that leaves the tree unchanged.
        let before: Vec<(i8, i8)> = tree.iter().map(|(k, v)| (*k, *v)).collect();
        for miss in &misses {
            tree.remove(miss);
        }
        let after: Vec<(i8, i8)> = tree.iter().map(|(k, v)| (*k, *v)).collect();

        before == after
    }
}

quickcheck::quickcheck! {
    fn copy_independence(ops: Vec<Op<i8, i8>>, more_ops: Vec<Op<i8, i8>>) -> bool {
        let mut tree = Tree::new();
        let mut model = BTreeMap::new();
        do_ops(&ops, &mut tree, &mut model);

        let copy = tree.clone();
        let snapshot: Vec<(i8, i8)> = copy.iter().map(|(k, v)| (*k, *v)).collect();

        // Mutating the original does not leak into the copy.
        do_ops(&more_ops, &mut tree, &mut model);
        let after: Vec<(i8, i8)> = copy.iter().map(|(k, v)| (*k, *v)).collect();
        if snapshot != after {
            return false;
        }

        // And mutating a copy does not leak into its source.
        let frozen: Vec<(i8, i8)> = tree.iter().map(|(k, v)| (*k, *v)).collect();
        let mut scratch = tree.clone();
        let mut scratch_model = model.clone();
        do_ops(&more_ops, &mut scratch, &mut scratch_model);
        let unchanged: Vec<(i8, i8)> = tree.iter().map(|(k, v)| (*k, *v)).collect();

        frozen == unchanged
    }
}

quickcheck::quickcheck! {
    fn empty_out_round_trip(xs: Vec<i8>) -> bool {
        let mut tree = Tree::new();
        for x in &xs {
            tree.insert(*x, *x);
        }

        // Remove every inserted key once; duplicates were inserted once per
        // occurrence so each removal finds a node.
        for x in &xs {
            tree.remove(x);
        }

        tree.is_empty() && tree.height() == -1 && tree.iter().next().is_none()
    }
}

quickcheck::quickcheck! {
    fn height_bounds(xs: Vec<i8>) -> bool {
        let mut tree = Tree::new();
        for x in &xs {
            tree.insert(*x, *x);
        }

        let height = tree.height();
        if xs.is_empty() {
            return height == -1;
        }

        // Without rebalancing the height can reach len - 1, but a walk of n
        // nodes can never produce fewer than floor(log2(n)) levels.
        let n = tree.len() as i32;
        let floor_log2 = 31 - n.leading_zeros() as i32;
        height >= floor_log2 && height <= n - 1
    }
}
