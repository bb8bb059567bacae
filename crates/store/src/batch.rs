//! Page-then-batch stitching for one-to-many aggregates.
//!
//! Listing an aggregate whose children live in a separate table is done in
//! three steps: fetch a page of parents, fetch the children of every parent
//! on that page with one keyed query, then distribute the children back to
//! their owners. [`attach_children`] is the last step.

use std::collections::HashMap;
use std::hash::Hash;

/// Distributes `children` to the parents they belong to.
///
/// Each child arrives paired with its parent key. Children are attached in
/// the order they are yielded, so a query ordered by insertion yields items
/// in insertion order on every parent. Children whose key matches no parent
/// are dropped and counted in the return value.
pub fn attach_children<P, C, K>(
    parents: &mut [P],
    children: impl IntoIterator<Item = (K, C)>,
    parent_key: impl Fn(&P) -> K,
    mut attach: impl FnMut(&mut P, C),
) -> usize
where
    K: Eq + Hash,
{
    let index: HashMap<K, usize> = parents
        .iter()
        .enumerate()
        .map(|(position, parent)| (parent_key(parent), position))
        .collect();

    let mut orphans = 0;
    for (key, child) in children {
        match index.get(&key) {
            Some(&position) => attach(&mut parents[position], child),
            None => orphans += 1,
        }
    }
    orphans
}
