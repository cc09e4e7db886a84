//! # Shared Tree Handle
//!
//! [`SharedBTree`] puts the engine behind a single-writer/multi-reader
//! gate so one logical tree can be used from many threads. The layering
//! mirrors a connection-handle design: cloning a `SharedBTree` produces
//! another handle to the *same* tree (state shared through an `Arc`),
//! while [`snapshot`](SharedBTree::snapshot) produces an *independent*
//! copy-on-write tree.
//!
//! Every public operation acquires the gate for its duration - writes
//! exclusively, reads shared. Traversals hold the shared guard across the
//! whole iteration, and a [`SharedIter`] keeps a read hold from creation
//! until [`release`](SharedIter::release) or drop. A cursor that is never
//! released blocks writers, so treat it like any other guard.
//!
//! Operations within one tree are linearizable in guard-acquisition
//! order. Snapshots taken with `snapshot` are unordered with respect to
//! each other afterwards: each evolves independently.

use std::sync::Arc;

use parking_lot::lock_api::ArcRwLockReadGuard;
use parking_lot::{RawRwLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::btree::{BTree, CursorState, Options, PathHint};

/// A cloneable, thread-safe handle to a gated [`BTree`].
pub struct SharedBTree<T> {
    inner: Arc<RwLock<BTree<T>>>,
}

impl<T> Clone for SharedBTree<T> {
    /// Another handle to the same tree (not a snapshot).
    fn clone(&self) -> Self {
        SharedBTree {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone> SharedBTree<T> {
    /// A gated empty tree ordered by `less`, with the default degree.
    pub fn new(less: impl Fn(&T, &T) -> bool + Send + Sync + 'static) -> Self {
        Self::new_with(less, Options::default())
    }

    pub fn new_with(
        less: impl Fn(&T, &T) -> bool + Send + Sync + 'static,
        options: Options,
    ) -> Self {
        Self::from_tree(BTree::new_with(less, options))
    }

    /// Put an existing tree behind a gate.
    pub fn from_tree(tree: BTree<T>) -> Self {
        SharedBTree {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// An independent copy-on-write snapshot of the current state,
    /// itself gated.
    pub fn snapshot(&self) -> SharedBTree<T> {
        Self::from_tree(self.inner.write().clone())
    }

    /// Shared access to the underlying tree for compound read sequences.
    pub fn read(&self) -> RwLockReadGuard<'_, BTree<T>> {
        self.inner.read()
    }

    /// Exclusive access to the underlying tree for compound edits.
    pub fn write(&self) -> RwLockWriteGuard<'_, BTree<T>> {
        self.inner.write()
    }

    pub fn set(&self, item: T) -> Option<T> {
        self.inner.write().set(item)
    }

    pub fn set_hint(&self, item: T, hint: &mut PathHint) -> Option<T> {
        self.inner.write().set_hint(item, hint)
    }

    pub fn load(&self, item: T) -> Option<T> {
        self.inner.write().load(item)
    }

    pub fn get(&self, key: &T) -> Option<T> {
        self.inner.read().get(key).cloned()
    }

    pub fn get_hint(&self, key: &T, hint: &mut PathHint) -> Option<T> {
        self.inner.read().get_hint(key, hint).cloned()
    }

    pub fn contains(&self, key: &T) -> bool {
        self.inner.read().contains(key)
    }

    pub fn delete(&self, key: &T) -> Option<T> {
        self.inner.write().delete(key)
    }

    pub fn delete_hint(&self, key: &T, hint: &mut PathHint) -> Option<T> {
        self.inner.write().delete_hint(key, hint)
    }

    pub fn pop_min(&self) -> Option<T> {
        self.inner.write().pop_min()
    }

    pub fn pop_max(&self) -> Option<T> {
        self.inner.write().pop_max()
    }

    pub fn delete_at(&self, index: usize) -> Option<T> {
        self.inner.write().delete_at(index)
    }

    pub fn get_at(&self, index: usize) -> Option<T> {
        self.inner.read().get_at(index).cloned()
    }

    pub fn min(&self) -> Option<T> {
        self.inner.read().min().cloned()
    }

    pub fn max(&self) -> Option<T> {
        self.inner.read().max().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn height(&self) -> usize {
        self.inner.read().height()
    }

    pub fn clear(&self) {
        self.inner.write().clear()
    }

    /// Visit every item in order while holding the shared guard.
    pub fn scan(&self, f: impl FnMut(&T) -> bool) {
        self.inner.read().scan(f)
    }

    pub fn reverse(&self, f: impl FnMut(&T) -> bool) {
        self.inner.read().reverse(f)
    }

    pub fn ascend(&self, pivot: &T, f: impl FnMut(&T) -> bool) {
        self.inner.read().ascend(pivot, f)
    }

    pub fn descend(&self, pivot: &T, f: impl FnMut(&T) -> bool) {
        self.inner.read().descend(pivot, f)
    }

    pub fn walk(&self, f: impl FnMut(&[T]) -> bool) {
        self.inner.read().walk(f)
    }

    pub fn items(&self) -> Vec<T> {
        self.inner.read().items()
    }

    /// A cursor holding a read guard on the tree until released/dropped.
    pub fn iter(&self) -> SharedIter<T> {
        SharedIter {
            guard: self.inner.read_arc(),
            cursor: CursorState::new(),
        }
    }
}

/// A bidirectional cursor owning a read hold on its [`SharedBTree`].
///
/// Writers block until the cursor is released or dropped.
pub struct SharedIter<T> {
    guard: ArcRwLockReadGuard<RawRwLock, BTree<T>>,
    cursor: CursorState<T>,
}

impl<T: Clone> SharedIter<T> {
    /// Move to the smallest item. Returns `false` on an empty tree.
    pub fn first(&mut self) -> bool {
        self.cursor.first(&self.guard)
    }

    /// Move to the largest item. Returns `false` on an empty tree.
    pub fn last(&mut self) -> bool {
        self.cursor.last(&self.guard)
    }

    /// Move to the first item not ordering below `key`.
    pub fn seek(&mut self, key: &T) -> bool {
        self.cursor.seek(&self.guard, key)
    }

    /// Advance. On a fresh cursor this acts as [`first`](Self::first).
    pub fn next(&mut self) -> bool {
        self.cursor.next(&self.guard)
    }

    /// Step back. On a fresh cursor this returns `false`.
    pub fn prev(&mut self) -> bool {
        self.cursor.prev(&self.guard)
    }

    /// The item the cursor is positioned on, if any.
    pub fn item(&self) -> Option<&T> {
        self.cursor.item()
    }

    /// Return to the fresh state, keeping the stack allocation for reuse.
    /// The read hold is kept.
    pub fn reset(&mut self) {
        self.cursor.reset();
    }

    /// Drop the read hold, unblocking writers.
    pub fn release(self) {}
}
