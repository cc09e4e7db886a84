//! # cowtree - Ordered Collections on a Copy-on-Write B-Tree
//!
//! cowtree provides three ordered, in-memory collection surfaces - a generic
//! ordered sequence ([`BTree`]), a key/value map ([`Map`]), and a set
//! ([`Set`]) - all backed by a single B-tree engine with copy-on-write
//! snapshots. The design prioritizes:
//!
//! - **O(1) snapshots**: cloning a tree is a constant-time handle copy;
//!   physical node copying is deferred to the first write on either side
//! - **Zero allocation on hot paths**: cursors reuse their descent stack,
//!   and path hints skip binary search for clustered key access
//! - **Compile-time or gate-based concurrency**: the plain types use Rust
//!   ownership as their single-writer/multi-reader discipline; [`SharedBTree`]
//!   puts the same engine behind a reader-writer gate for cross-thread use
//!
//! ## Quick Start
//!
//! ```
//! use cowtree::BTree;
//!
//! let mut tree = BTree::new(|a: &u64, b: &u64| a < b);
//! tree.set(54);
//! tree.set(12);
//! tree.set(33);
//!
//! assert_eq!(tree.min(), Some(&12));
//! assert_eq!(tree.get_at(1), Some(&33));
//!
//! let snapshot = tree.clone();
//! tree.delete(&33);
//! assert_eq!(tree.len(), 2);
//! assert_eq!(snapshot.len(), 3);
//! ```
//!
//! ## Architecture
//!
//! The crate uses a layered architecture:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Facades (Map, Set)  │  SharedBTree (RwLock) │
//! ├──────────────────────┴───────────────────────┤
//! │            Public engine (BTree)             │
//! ├──────────────────────────────────────────────┤
//! │  Insert / Delete / Rank / Traversal paths    │
//! ├──────────────────────────────────────────────┤
//! │  Search primitives (binary + path-hinted)    │
//! ├──────────────────────────────────────────────┤
//! │  Nodes + isolation tags (copy-on-write)      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Model
//!
//! Every tree handle carries an isolation tag drawn from a global counter,
//! and every node records the tag of the tree that created it. Cloning a
//! tree retags both handles and shares the whole node graph; a mutation
//! copies only the nodes on its root-to-leaf path whose tag differs from
//! the writing tree. Two handles therefore never observe each other's
//! edits, and the cost of a snapshot is amortized over subsequent writes.
//!
//! ## Module Overview
//!
//! - [`btree`]: the engine - nodes, search, insert/delete, rank, cursor,
//!   traversal, and the invariant self-check
//! - [`map`]: ordered key/value facade over pair items
//! - [`set`]: ordered set facade over bare keys
//! - [`shared`]: reader-writer-gated handle and guard-holding cursor

pub mod btree;
pub mod map;
pub mod set;
pub mod shared;

pub use btree::{BTree, CheckError, Iter, Options, PathHint};
pub use map::{Map, MapIter};
pub use set::Set;
pub use shared::{SharedBTree, SharedIter};
