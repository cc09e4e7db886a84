//! # B-Tree Engine
//!
//! This module implements the core ordered-container engine backing every
//! collection type in the crate. It is a classic B-tree (all items live in
//! every node, not just the leaves) with per-node subtree counts for rank
//! operations and an isolation-tag scheme for copy-on-write snapshots.
//!
//! ## Node Layout
//!
//! Each node holds a bounded, sorted run of items and - for internal nodes -
//! one more child handle than items:
//!
//! ```text
//! Internal node (degree 4, max = 7):
//! ┌──────────────────────────────────────────────┐
//! │ isoid: 17      count: 203                    │
//! │ items:    [ i0 | i1 | i2 ]                   │
//! │ children: [ c0 | c1 | c2 | c3 ]              │
//! └──────────────────────────────────────────────┘
//!   every item in c1 orders between i0 and i1
//! ```
//!
//! Occupancy bounds are `max = 2 * degree - 1` items per node and
//! `min = max / 2`; only the root may hold fewer than `min`. Item and child
//! vectors are allocated at full capacity up front so inserts on the hot
//! path never reallocate.
//!
//! ## Copy-on-Write
//!
//! Nodes are shared between snapshots through [`Arc`](std::sync::Arc)
//! handles. A node is writable by a tree only when its isolation tag
//! matches the tree's; otherwise the write path installs a shallow copy
//! tagged for the writing tree and descends into that. Cloning a tree
//! retags both handles, so the first write from either side peels off a
//! private root-to-leaf path while everything untouched stays shared.
//!
//! ## Search
//!
//! Lookups run a lower-bound binary search per node. Callers that touch
//! clustered keys can pass a [`PathHint`], an 8-deep breadcrumb of recent
//! descent indices: the hinted slot and its immediate neighbors are probed
//! first, and only on a miss does the search fall back to a binary search
//! over the narrowed window. Hints are updated in place and deeper entries
//! are invalidated only when a level's index actually changes, which keeps
//! consecutive near-neighbor operations on the fast path.
//!
//! ## Mutation Paths
//!
//! Insertion descends recursively and splits full nodes on the way back
//! up, retrying at the parent after a split so the promoted median is
//! accounted for; the root grows upward when a split reaches it. Deletion
//! locates the item (substituting the in-order predecessor when the hit is
//! in an internal node) and rebalances underfull children while unwinding,
//! merging siblings when their combined occupancy allows it and otherwise
//! rotating one slot through the parent separator. Positional deletes and
//! the min/max pops first try an optimistic fast path that edits the leaf
//! in place, reverting their count updates and falling back to the full
//! delete path when the leaf would underflow.
//!
//! ## Thread Safety
//!
//! The engine itself performs no locking: writers take `&mut self`, so a
//! single tree handle is single-writer/multi-reader by construction. The
//! [`shared`](crate::shared) module wraps the engine in a reader-writer
//! gate for shared-handle use across threads.

mod check;
mod delete;
mod iter;
mod node;
mod scan;
mod search;
mod tree;

pub use check::CheckError;
pub use iter::Iter;
pub use search::PathHint;
pub use tree::{BTree, Options};

pub(crate) use iter::CursorState;
