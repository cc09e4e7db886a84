//! Tree nodes and the copy-on-write ownership protocol.
//!
//! Isolation tags are allocated from a global counter, the same scheme used
//! for transaction ids in MVCC stores: a fresh tag can never collide with a
//! tag already stamped on a node, so `tag == tree tag` proves the node was
//! created by this tree handle after its last snapshot and is reachable
//! from no other handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub(crate) type NodeRef<T> = Arc<Node<T>>;

static NEXT_ISOID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_isoid() -> u64 {
    NEXT_ISOID.fetch_add(1, Ordering::Relaxed)
}

/// Everything the write path needs to isolate a node, detached from the
/// tree handle so descent loops can hold `&mut` borrows into the tree.
pub(crate) struct CowCtx<T> {
    pub(crate) iso: u64,
    pub(crate) max: usize,
    pub(crate) copy_item: Option<fn(&T) -> T>,
}

impl<T> Clone for CowCtx<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CowCtx<T> {}

pub(crate) struct Node<T> {
    pub(crate) isoid: u64,
    pub(crate) count: usize,
    pub(crate) items: Vec<T>,
    pub(crate) children: Option<Vec<NodeRef<T>>>,
}

impl<T> Node<T> {
    pub(crate) fn new(leaf: bool, ctx: &CowCtx<T>) -> Self {
        Node {
            isoid: ctx.iso,
            count: 0,
            items: Vec::with_capacity(ctx.max),
            children: if leaf {
                None
            } else {
                Some(Vec::with_capacity(ctx.max + 1))
            },
        }
    }

    pub(crate) fn leaf(&self) -> bool {
        self.children.is_none()
    }

    pub(crate) fn children(&self) -> &[NodeRef<T>] {
        match &self.children {
            Some(children) => children,
            None => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeRef<T>> {
        self.children.as_mut().expect("node is internal")
    }

    /// Recompute the subtree count from the node's current content.
    pub(crate) fn update_count(&mut self) {
        let mut count = self.items.len();
        if let Some(children) = &self.children {
            for child in children {
                count += child.count;
            }
        }
        self.count = count;
    }
}

/// Load the node behind `cell` for writing, installing a copy tagged for
/// the current tree when the cell still points at a shared node.
pub(crate) fn cow_load<'a, T: Clone>(
    cell: &'a mut NodeRef<T>,
    ctx: &CowCtx<T>,
) -> &'a mut Node<T> {
    if cell.isoid != ctx.iso || Arc::strong_count(cell) != 1 {
        *cell = Arc::new(copy_node(cell, ctx));
    }
    Arc::get_mut(cell).expect("a node tagged for this tree has a single owner")
}

/// Shallow copy: items are cloned (through the tree's copier when one was
/// supplied), child handles are shared by reference.
fn copy_node<T: Clone>(n: &Node<T>, ctx: &CowCtx<T>) -> Node<T> {
    let mut items = Vec::with_capacity(ctx.max);
    match ctx.copy_item {
        Some(copy) => items.extend(n.items.iter().map(copy)),
        None => items.extend_from_slice(&n.items),
    }
    let children = n.children.as_ref().map(|children| {
        let mut shared = Vec::with_capacity(ctx.max + 1);
        shared.extend(children.iter().cloned());
        shared
    });
    Node {
        isoid: ctx.iso,
        count: n.count,
        items,
        children,
    }
}
