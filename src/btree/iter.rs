//! A reusable bidirectional cursor.
//!
//! The cursor keeps an explicit stack of `(node, index)` frames so hot
//! loops can seek repeatedly without reallocating: the stack is a
//! `SmallVec` sized for the default degree, and resets keep its capacity.
//! Frames hold owned node handles, which lets the same state machine back
//! both the borrowing engine cursor and the guard-holding shared cursor.
//!
//! State machine:
//!
//! ```text
//!  ┌───────┐  first/last/seek   ┌──────────┐  next/prev        ┌──────────┐
//!  │ fresh │ ─────────────────► │ on-item  │ ────────────────► │ on-item  │
//!  └───────┘                    └──────────┘  off top/bottom   └──────────┘
//!                                      │
//!                                      └─────► { atstart | atend }
//!                                                   │ first/last
//!                                                   ▼
//!                                              back to on-item
//! ```
//!
//! A fresh cursor treats `next` as `first`; `prev` on a fresh cursor
//! reports `false`. Falling off either end parks the cursor on a sentinel
//! from which `next`/`prev` resume over the matching edge.

use smallvec::SmallVec;

use super::node::NodeRef;
use super::search;
use super::tree::BTree;

struct Frame<T> {
    node: NodeRef<T>,
    index: usize,
}

/// Lifetime-free cursor core; every operation takes the tree it walks.
pub(crate) struct CursorState<T> {
    stack: SmallVec<[Frame<T>; 8]>,
    seeked: bool,
    atstart: bool,
    atend: bool,
}

impl<T: Clone> CursorState<T> {
    pub(crate) fn new() -> Self {
        CursorState {
            stack: SmallVec::new(),
            seeked: false,
            atstart: false,
            atend: false,
        }
    }

    pub(crate) fn first(&mut self, tree: &BTree<T>) -> bool {
        self.atend = false;
        self.atstart = false;
        self.seeked = true;
        self.stack.clear();
        let Some(root) = tree.root_ref() else {
            return false;
        };
        self.push_leftmost(root.clone());
        true
    }

    pub(crate) fn last(&mut self, tree: &BTree<T>) -> bool {
        self.seeked = true;
        self.stack.clear();
        let Some(root) = tree.root_ref() else {
            return false;
        };
        self.push_rightmost(root.clone());
        true
    }

    /// Position on the first item not ordering below `key`.
    pub(crate) fn seek(&mut self, tree: &BTree<T>, key: &T) -> bool {
        self.seeked = true;
        self.stack.clear();
        let Some(root) = tree.root_ref() else {
            return false;
        };
        let mut n = root.clone();
        loop {
            let (i, found) = search::bsearch(tree.less_ref(), &n, key);
            self.stack.push(Frame {
                node: n.clone(),
                index: i,
            });
            if found {
                return true;
            }
            if n.leaf() {
                if i < n.items.len() {
                    return true;
                }
                // ran off the leaf: the successor sits in an ancestor
                return self.pop_forward();
            }
            let child = n.children()[i].clone();
            n = child;
        }
    }

    pub(crate) fn next(&mut self, tree: &BTree<T>) -> bool {
        if !self.seeked {
            return self.first(tree);
        }
        let Some(top) = self.stack.last_mut() else {
            return self.atstart && self.first(tree) && self.next(tree);
        };
        top.index += 1;
        let descend = if top.node.leaf() {
            if top.index < top.node.items.len() {
                return true;
            }
            None
        } else {
            Some(top.node.children()[top.index].clone())
        };
        match descend {
            None => self.pop_forward(),
            Some(child) => {
                self.push_leftmost(child);
                true
            }
        }
    }

    pub(crate) fn prev(&mut self, tree: &BTree<T>) -> bool {
        if !self.seeked {
            return false;
        }
        let Some(top) = self.stack.last_mut() else {
            return self.atend && self.last(tree) && self.prev(tree);
        };
        let descend = if top.node.leaf() {
            if top.index > 0 {
                top.index -= 1;
                return true;
            }
            None
        } else {
            Some(top.node.children()[top.index].clone())
        };
        match descend {
            None => self.pop_backward(),
            Some(child) => {
                self.push_rightmost(child);
                true
            }
        }
    }

    pub(crate) fn item(&self) -> Option<&T> {
        let top = self.stack.last()?;
        top.node.items.get(top.index)
    }

    /// Drop the stack contents but keep its allocation for reuse.
    pub(crate) fn reset(&mut self) {
        self.stack.clear();
        self.seeked = false;
        self.atstart = false;
        self.atend = false;
    }

    fn push_leftmost(&mut self, mut n: NodeRef<T>) {
        loop {
            self.stack.push(Frame {
                node: n.clone(),
                index: 0,
            });
            if n.leaf() {
                return;
            }
            let child = n.children()[0].clone();
            n = child;
        }
    }

    fn push_rightmost(&mut self, mut n: NodeRef<T>) {
        loop {
            let index = n.items.len();
            if n.leaf() {
                self.stack.push(Frame {
                    node: n.clone(),
                    index: index - 1,
                });
                return;
            }
            self.stack.push(Frame {
                node: n.clone(),
                index,
            });
            let child = n.children()[index].clone();
            n = child;
        }
    }

    /// Pop exhausted frames until one still has an item to emit; parks on
    /// `atend` when the stack drains.
    fn pop_forward(&mut self) -> bool {
        loop {
            self.stack.pop();
            let Some(top) = self.stack.last() else {
                self.atend = true;
                return false;
            };
            if top.index < top.node.items.len() {
                return true;
            }
        }
    }

    /// Mirror of `pop_forward`; parks on `atstart`.
    fn pop_backward(&mut self) -> bool {
        loop {
            self.stack.pop();
            let Some(top) = self.stack.last_mut() else {
                self.atstart = true;
                return false;
            };
            if top.index > 0 {
                top.index -= 1;
                return true;
            }
        }
    }
}

/// A bidirectional cursor borrowing its tree.
///
/// Obtained from [`BTree::iter`]. Not a `std::iter::Iterator`: navigation
/// returns `bool` and the current item is read separately with
/// [`item`](Iter::item), which keeps the cursor reusable and free of
/// per-step allocation.
pub struct Iter<'a, T> {
    tree: &'a BTree<T>,
    cursor: CursorState<T>,
}

impl<'a, T: Clone> Iter<'a, T> {
    pub(crate) fn new(tree: &'a BTree<T>, mut cursor: CursorState<T>) -> Self {
        cursor.reset();
        Iter { tree, cursor }
    }

    /// Move to the smallest item. Returns `false` on an empty tree.
    pub fn first(&mut self) -> bool {
        self.cursor.first(self.tree)
    }

    /// Move to the largest item. Returns `false` on an empty tree.
    pub fn last(&mut self) -> bool {
        self.cursor.last(self.tree)
    }

    /// Move to the first item not ordering below `key`.
    pub fn seek(&mut self, key: &T) -> bool {
        self.cursor.seek(self.tree, key)
    }

    /// Advance. On a fresh cursor this is [`first`](Self::first).
    pub fn next(&mut self) -> bool {
        self.cursor.next(self.tree)
    }

    /// Step back. On a fresh cursor this returns `false`.
    pub fn prev(&mut self) -> bool {
        self.cursor.prev(self.tree)
    }

    /// The item the cursor is positioned on, if any.
    pub fn item(&self) -> Option<&T> {
        self.cursor.item()
    }

    /// Return to the fresh state, keeping the stack allocation for reuse.
    pub fn reset(&mut self) {
        self.cursor.reset();
    }

    /// Consume the cursor. Equivalent to dropping it; provided so callers
    /// can mark the end of a scan explicitly.
    pub fn release(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(n: u32) -> BTree<u32> {
        let mut tree = BTree::new(|a: &u32, b: &u32| a < b);
        for i in 0..n {
            tree.set(i);
        }
        tree
    }

    #[test]
    fn fresh_cursor_next_acts_as_first() {
        let tree = tree_of(10);
        let mut it = tree.iter();
        assert!(it.next());
        assert_eq!(it.item(), Some(&0));
    }

    #[test]
    fn fresh_cursor_prev_is_false() {
        let tree = tree_of(10);
        let mut it = tree.iter();
        assert!(!it.prev());
        assert_eq!(it.item(), None);
    }

    #[test]
    fn empty_tree_cursor() {
        let tree: BTree<u32> = BTree::new(|a, b| a < b);
        let mut it = tree.iter();
        assert!(!it.first());
        assert!(!it.last());
        assert!(!it.next());
        assert!(!it.seek(&1));
        assert_eq!(it.item(), None);
    }

    #[test]
    fn full_forward_and_backward_walk() {
        let tree = tree_of(1000);
        let mut it = tree.iter();

        let mut fwd = Vec::new();
        let mut ok = it.first();
        while ok {
            fwd.push(*it.item().unwrap());
            ok = it.next();
        }
        assert_eq!(fwd, (0..1000).collect::<Vec<_>>());

        let mut rev = Vec::new();
        ok = it.last();
        while ok {
            rev.push(*it.item().unwrap());
            ok = it.prev();
        }
        rev.reverse();
        assert_eq!(fwd, rev);
    }

    #[test]
    fn sentinels_resume_over_the_edge() {
        let tree = tree_of(5);
        let mut it = tree.iter();
        assert!(it.last());
        assert_eq!(it.item(), Some(&4));
        assert!(!it.next()); // parked at end
        // reversing from the sentinel steps past the edge item
        assert!(it.prev());
        assert_eq!(it.item(), Some(&3));

        assert!(it.first());
        assert_eq!(it.item(), Some(&0));
        assert!(!it.prev()); // parked at start
        assert!(it.next());
        assert_eq!(it.item(), Some(&1));
    }

    #[test]
    fn seek_lands_on_lower_bound() {
        let mut tree = BTree::new(|a: &u32, b: &u32| a < b);
        for i in 0..100 {
            tree.set(i * 2); // evens 0..=198
        }
        let mut it = tree.iter();
        assert!(it.seek(&50));
        assert_eq!(it.item(), Some(&50));
        assert!(it.seek(&51));
        assert_eq!(it.item(), Some(&52));
        assert!(it.seek(&0));
        assert_eq!(it.item(), Some(&0));
        assert!(!it.seek(&199));
        assert!(!it.next());
    }

    #[test]
    fn seek_then_walk_both_ways() {
        let tree = tree_of(500);
        let mut it = tree.iter();
        assert!(it.seek(&250));
        assert!(it.next());
        assert_eq!(it.item(), Some(&251));
        assert!(it.prev());
        assert!(it.prev());
        assert_eq!(it.item(), Some(&249));
    }
}
