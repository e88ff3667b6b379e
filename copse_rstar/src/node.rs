// Copyright 2026 the Copse Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena-backed node storage.
//!
//! Nodes live in a slot vector owned by the tree and refer to each other by
//! [`NodeIdx`]. Slots are never reused within a tree's lifetime, so a handle
//! observed once always denotes the same node until it is released.

use copse_aabb::Box2;

/// A stored rectangle together with its stable handle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Entry {
    /// Tree-unique handle, assigned monotonically by insertion order.
    pub id: u64,
    /// The rectangle supplied at insertion.
    pub bbox: Box2,
}

/// Handle of a node slot in the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    const fn get(self) -> usize {
        self.0
    }
}

/// One child of a node: a subtree in a branch, an entry in a leaf.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Child {
    Node(NodeIdx),
    Entry(Entry),
}

/// A tree node. Leaves hold [`Child::Entry`] children, branches hold
/// [`Child::Node`] children; `bbox` is the MBR of the children whenever the
/// node is attached to the tree.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub parent: Option<NodeIdx>,
    pub leaf: bool,
    pub children: Vec<Child>,
    pub bbox: Box2,
}

impl Node {
    pub fn new(leaf: bool) -> Self {
        Self {
            parent: None,
            leaf,
            children: Vec::new(),
            bbox: Box2::ZERO,
        }
    }
}

/// Slot storage for nodes. Released slots stay empty; indices are monotonic.
#[derive(Clone, Debug, Default)]
pub(crate) struct Arena {
    slots: Vec<Option<Node>>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeIdx {
        self.slots.push(Some(node));
        NodeIdx::new(self.slots.len() - 1)
    }

    pub fn release(&mut self, idx: NodeIdx) -> Node {
        self.slots[idx.get()].take().expect("released node slot")
    }

    pub fn get(&self, idx: NodeIdx) -> &Node {
        self.slots[idx.get()].as_ref().expect("released node slot")
    }

    pub fn get_mut(&mut self, idx: NodeIdx) -> &mut Node {
        self.slots[idx.get()].as_mut().expect("released node slot")
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of live (unreleased) nodes.
    #[cfg(test)]
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
