//! Structural self-check.
//!
//! `check` walks the whole tree and verifies the structural invariants
//! that every public operation must preserve:
//!
//! 1. all leaves sit at the same depth as the tree height
//! 2. the recorded item count matches a full recount, per node and overall
//! 3. every non-root node keeps `min..=max` items, internal nodes hold
//!    exactly one more child than items
//! 4. an in-order traversal is strictly increasing
//!
//! The check is a diagnostic: normal operations never report errors, so a
//! failure here means a bug in the engine (or an ordering predicate that
//! is not a strict weak order). Tests run it after operation bursts.

use std::fmt;

use eyre::{bail, Result};

use super::node::Node;
use super::tree::BTree;

/// The invariant category a failed [`BTree::check`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckError {
    /// A leaf sits at a depth other than the tree height.
    Height,
    /// A node's recorded subtree count disagrees with a recount.
    Count,
    /// Occupancy bounds or child arity are violated.
    Props,
    /// The in-order item sequence is not strictly increasing.
    Order,
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Height => write!(f, "leaf depths disagree with the tree height"),
            CheckError::Count => write!(f, "subtree counts disagree with node contents"),
            CheckError::Props => write!(f, "node occupancy or child arity out of bounds"),
            CheckError::Order => write!(f, "items are not in strictly increasing order"),
        }
    }
}

impl std::error::Error for CheckError {}

impl<T: Clone> BTree<T> {
    /// Verify the tree's structural invariants, reporting the first
    /// violated category.
    pub fn check(&self) -> Result<()> {
        let Some(root) = self.root.as_deref() else {
            if self.count != 0 {
                bail!(CheckError::Count);
            }
            return Ok(());
        };
        let height = self.height();
        if !sane_height(root, 1, height) {
            bail!(CheckError::Height);
        }
        if deep_count(root) != Some(self.count) {
            bail!(CheckError::Count);
        }
        if !self.sane_props(root, 1, height) {
            bail!(CheckError::Props);
        }
        if !self.sane_order() {
            bail!(CheckError::Order);
        }
        Ok(())
    }

    fn sane_props(&self, n: &Node<T>, depth: usize, height: usize) -> bool {
        let occupancy_ok = if depth == 1 {
            !n.items.is_empty() && n.items.len() <= self.max
        } else {
            n.items.len() >= self.min && n.items.len() <= self.max
        };
        if !occupancy_ok {
            return false;
        }
        match &n.children {
            None => depth == height,
            Some(children) => {
                children.len() == n.items.len() + 1
                    && children
                        .iter()
                        .all(|child| self.sane_props(child, depth + 1, height))
            }
        }
    }

    fn sane_order(&self) -> bool {
        let mut prev: Option<T> = None;
        let mut ordered = true;
        self.scan(|item| {
            if let Some(prev) = &prev {
                if !(self.less)(prev, item) {
                    ordered = false;
                    return false;
                }
            }
            prev = Some(item.clone());
            true
        });
        ordered
    }
}

fn sane_height<T>(n: &Node<T>, depth: usize, height: usize) -> bool {
    match &n.children {
        None => depth == height,
        Some(children) => children
            .iter()
            .all(|child| sane_height(child, depth + 1, height)),
    }
}

/// Recount the subtree; `None` flags any node whose recorded count lies.
fn deep_count<T>(n: &Node<T>) -> Option<usize> {
    let mut count = n.items.len();
    if let Some(children) = &n.children {
        for child in children {
            count += deep_count(child)?;
        }
    }
    if n.count != count {
        return None;
    }
    Some(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree::node::{self, Node};
    use std::sync::Arc;

    fn new_tree() -> BTree<u32> {
        BTree::new(|a: &u32, b: &u32| a < b)
    }

    #[test]
    fn empty_and_populated_trees_pass() {
        let mut tree = new_tree();
        tree.check().unwrap();
        for i in 0..5000 {
            tree.set(i);
        }
        tree.check().unwrap();
    }

    #[test]
    fn corrupted_count_is_reported() {
        let mut tree = new_tree();
        for i in 0..100 {
            tree.set(i);
        }
        let ctx = tree.cow_ctx();
        if let Some(root) = tree.root.as_mut() {
            node::cow_load(root, &ctx).count += 1;
        }
        let err = tree.check().unwrap_err();
        assert_eq!(err.downcast_ref::<CheckError>(), Some(&CheckError::Count));
    }

    #[test]
    fn corrupted_order_is_reported() {
        let mut tree = new_tree();
        for i in 0..10 {
            tree.set(i);
        }
        let ctx = tree.cow_ctx();
        if let Some(root) = tree.root.as_mut() {
            node::cow_load(root, &ctx).items.swap(2, 7);
        }
        let err = tree.check().unwrap_err();
        assert_eq!(err.downcast_ref::<CheckError>(), Some(&CheckError::Order));
    }

    #[test]
    fn uneven_leaf_depth_is_reported() {
        let mut tree = new_tree();
        for i in 0..200 {
            tree.set(i);
        }
        // wrap the leftmost leaf in an extra level so leaf depths diverge
        let ctx = tree.cow_ctx();
        if let Some(root) = tree.root.as_mut() {
            let root = node::cow_load(root, &ctx);
            let old = root.children()[0].clone();
            let mut extra = Node::new(true, &ctx);
            extra.items.push(5000);
            extra.count = 1;
            let mut wrapper = Node::new(false, &ctx);
            wrapper.items.push(4999);
            wrapper.children_mut().push(old);
            wrapper.children_mut().push(Arc::new(extra));
            wrapper.update_count();
            root.children_mut()[0] = Arc::new(wrapper);
        }
        let err = tree.check().unwrap_err();
        assert_eq!(err.downcast_ref::<CheckError>(), Some(&CheckError::Height));
    }
}
