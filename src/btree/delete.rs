//! The delete path: keyed and positional removal, min/max pops, and the
//! merge/rotate rebalancing that restores minimum occupancy.

use smallvec::SmallVec;

use super::node::{self, CowCtx, Node, NodeRef};
use super::search::{PathHint, HINT_DEPTH};
use super::tree::BTree;

/// What `node_delete` is looking for: a specific key, or the rightmost
/// item of the subtree (used for in-order predecessor extraction).
enum Target<'a, T> {
    Key(&'a T),
    Max,
}

impl<T> Clone for Target<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Target<'_, T> {}

impl<T: Clone> BTree<T> {
    /// Remove the item ordering equal to `key` and return it.
    pub fn delete(&mut self, key: &T) -> Option<T> {
        self.delete_hint_opt(key, None)
    }

    /// [`delete`](Self::delete) guided by a path hint.
    pub fn delete_hint(&mut self, key: &T, hint: &mut PathHint) -> Option<T> {
        self.delete_hint_opt(key, Some(hint))
    }

    fn delete_hint_opt(&mut self, key: &T, hint: Option<&mut PathHint>) -> Option<T> {
        let mut root = self.root.take()?;
        match self.node_delete(&mut root, Target::Key(key), hint, 0) {
            None => {
                self.root = Some(root);
                None
            }
            Some(prev) => {
                if !root.leaf() && root.items.is_empty() {
                    // the root emptied out: the tree loses one level
                    let child = root.children()[0].clone();
                    root = child;
                }
                self.count -= 1;
                self.root = if self.count == 0 { None } else { Some(root) };
                Some(prev)
            }
        }
    }

    fn node_delete(
        &self,
        cell: &mut NodeRef<T>,
        target: Target<'_, T>,
        mut hint: Option<&mut PathHint>,
        depth: usize,
    ) -> Option<T> {
        let ctx = self.cow_ctx();
        let n = node::cow_load(cell, &ctx);
        let (i, found) = match target {
            Target::Max => (n.items.len() - 1, true),
            Target::Key(key) => self.find(n, key, hint.as_deref_mut(), depth),
        };

        if n.leaf() {
            if !found {
                return None;
            }
            let prev = n.items.remove(i);
            n.count -= 1;
            return Some(prev);
        }

        let (deleted, child_index) = if found {
            match target {
                Target::Max => {
                    // keep walking the rightmost spine
                    let d = self.node_delete(&mut n.children_mut()[i + 1], Target::Max, None, 0);
                    (d, i + 1)
                }
                Target::Key(_) => {
                    // the hit is a separator: swap in the in-order
                    // predecessor extracted from the left child
                    let swap = self
                        .node_delete(&mut n.children_mut()[i], Target::Max, None, 0)
                        .expect("a non-empty subtree yields a maximum");
                    let prev = std::mem::replace(&mut n.items[i], swap);
                    (Some(prev), i)
                }
            }
        } else {
            let Target::Key(key) = target else {
                unreachable!("max-mode search always reports found");
            };
            let d = self.node_delete(&mut n.children_mut()[i], Target::Key(key), hint, depth + 1);
            (d, i)
        };

        let prev = deleted?;
        n.count -= 1;
        if n.children()[child_index].items.len() < self.min {
            self.node_rebalance(n, child_index);
        }
        Some(prev)
    }

    /// Restore minimum occupancy after child `i` fell below `min`, using
    /// the sibling pair `(i, i + 1)`: merge when the pair fits in one
    /// node, otherwise rotate one slot from the heavier side through the
    /// parent separator.
    fn node_rebalance(&self, n: &mut Node<T>, i: usize) {
        let i = if i == n.items.len() { i - 1 } else { i };
        let ctx = self.cow_ctx();
        let max = self.max;

        let Node { items, children, .. } = n;
        let children = children.as_mut().expect("rebalance runs on internal nodes");
        let (head, tail) = children.split_at_mut(i + 1);
        let left = node::cow_load(&mut head[i], &ctx);
        let right = node::cow_load(&mut tail[0], &ctx);

        if left.items.len() + right.items.len() < max {
            // merge (left, separator, right) into left and drop right
            let right_count = right.count;
            left.items.push(items.remove(i));
            left.items.append(&mut right.items);
            if let Some(spill) = right.children.as_mut() {
                left.children
                    .as_mut()
                    .expect("merge peers have the same shape")
                    .append(spill);
            }
            left.count += right_count + 1;
            children.remove(i + 1);
        } else if left.items.len() > right.items.len() {
            // rotate one slot left -> right through the separator
            let donor = left.items.pop().expect("heavier sibling is non-empty");
            let sep = std::mem::replace(&mut items[i], donor);
            right.items.insert(0, sep);
            left.count -= 1;
            right.count += 1;
            if !left.leaf() {
                let moved = left
                    .children_mut()
                    .pop()
                    .expect("internal donor has children");
                left.count -= moved.count;
                right.count += moved.count;
                right.children_mut().insert(0, moved);
            }
        } else {
            // rotate one slot right -> left
            let donor = right.items.remove(0);
            let sep = std::mem::replace(&mut items[i], donor);
            left.items.push(sep);
            left.count += 1;
            right.count -= 1;
            if !left.leaf() {
                let moved = right.children_mut().remove(0);
                left.count += moved.count;
                right.count -= moved.count;
                left.children_mut().push(moved);
            }
        }
    }

    // ---- pops ------------------------------------------------------------

    /// Remove and return the smallest item.
    pub fn pop_min(&mut self) -> Option<T> {
        self.pop_edge(true)
    }

    /// Remove and return the largest item.
    pub fn pop_max(&mut self) -> Option<T> {
        self.pop_edge(false)
    }

    fn pop_edge(&mut self, leftmost: bool) -> Option<T> {
        let ctx = self.cow_ctx();
        let mut root = self.root.take()?;

        enum Outcome<T> {
            Removed(T),
            Underflow(T),
        }
        let outcome = {
            let mut n = node::cow_load(&mut root, &ctx);
            loop {
                n.count -= 1; // optimistic; reverted on underflow
                if n.leaf() {
                    if n.items.len() == self.min {
                        let i = if leftmost { 0 } else { n.items.len() - 1 };
                        break Outcome::Underflow(n.items[i].clone());
                    }
                    let item = if leftmost {
                        n.items.remove(0)
                    } else {
                        n.items.pop().expect("reached leaves hold items")
                    };
                    break Outcome::Removed(item);
                }
                let i = if leftmost { 0 } else { n.children().len() - 1 };
                n = node::cow_load(&mut n.children_mut()[i], &ctx);
            }
        };

        match outcome {
            Outcome::Removed(item) => {
                self.count -= 1;
                self.root = if self.count == 0 { None } else { Some(root) };
                Some(item)
            }
            Outcome::Underflow(key) => {
                // removing in place would break occupancy: put the counts
                // back and go through the rebalancing delete
                revert_edge_counts(&mut root, &ctx, leftmost);
                self.root = Some(root);
                self.delete(&key)
            }
        }
    }

    // ---- positional delete -----------------------------------------------

    /// Remove and return the item at position `index`.
    pub fn delete_at(&mut self, index: usize) -> Option<T> {
        if index >= self.count {
            return None;
        }
        let ctx = self.cow_ctx();
        let mut root = self.root.take()?;
        let mut path: SmallVec<[u8; 8]> = SmallVec::new();

        enum Outcome<T> {
            Removed(T),
            Underflow(T),
        }
        let outcome = {
            let mut n = node::cow_load(&mut root, &ctx);
            let mut index = index;
            'descent: loop {
                n.count -= 1; // optimistic; reverted on underflow
                if n.leaf() {
                    if n.items.len() == self.min {
                        path.push(index as u8);
                        break 'descent Outcome::Underflow(n.items[index].clone());
                    }
                    break 'descent Outcome::Removed(n.items.remove(index));
                }
                let mut i = 0;
                loop {
                    let child_count = n.children()[i].count;
                    if index < child_count {
                        break;
                    }
                    if index == child_count {
                        // the index lands exactly on this separator
                        path.push(i as u8);
                        break 'descent Outcome::Underflow(n.items[i].clone());
                    }
                    index -= child_count + 1;
                    i += 1;
                }
                path.push(i as u8);
                n = node::cow_load(&mut n.children_mut()[i], &ctx);
            }
        };

        match outcome {
            Outcome::Removed(item) => {
                self.count -= 1;
                self.root = if self.count == 0 { None } else { Some(root) };
                Some(item)
            }
            Outcome::Underflow(key) => {
                // revert the optimistic counts along the recorded path and
                // re-run as a keyed delete primed with that path as a hint
                let mut hint = PathHint::default();
                for (depth, &p) in path.iter().enumerate().take(HINT_DEPTH) {
                    hint.path[depth] = p;
                    hint.used[depth] = true;
                }
                let mut n = node::cow_load(&mut root, &ctx);
                for &p in path.iter() {
                    n.count += 1;
                    if n.leaf() {
                        break;
                    }
                    n = node::cow_load(&mut n.children_mut()[p as usize], &ctx);
                }
                self.root = Some(root);
                self.delete_hint(&key, &mut hint)
            }
        }
    }
}

fn revert_edge_counts<T: Clone>(root: &mut NodeRef<T>, ctx: &CowCtx<T>, leftmost: bool) {
    let mut n = node::cow_load(root, ctx);
    loop {
        n.count += 1;
        if n.leaf() {
            break;
        }
        let i = if leftmost { 0 } else { n.children().len() - 1 };
        n = node::cow_load(&mut n.children_mut()[i], ctx);
    }
}
