//! # Route Resolver
//!
//! Read-only lookups over a [`NavigationState`] tree. Searches are
//! depth-first and pre-order, so a container is visited before its
//! children and earlier routes before later ones. Absence is `None`;
//! callers decide whether that is an error.

use crate::core::scene::Props;
use crate::core::state::{LeafRoute, NavNode, NavigationState};

/// A borrowed node found in a state tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    State(&'a NavigationState),
    Leaf(&'a LeafRoute),
}

impl<'a> NodeRef<'a> {
    pub fn key(&self) -> &'a str {
        match self {
            NodeRef::State(s) => &s.key,
            NodeRef::Leaf(l) => &l.key,
        }
    }

    pub fn props(&self) -> &'a Props {
        match self {
            NodeRef::State(s) => &s.props,
            NodeRef::Leaf(l) => &l.props,
        }
    }
}

impl<'a> From<&'a NavNode> for NodeRef<'a> {
    fn from(node: &'a NavNode) -> Self {
        match node {
            NavNode::State(s) => NodeRef::State(s),
            NavNode::Leaf(l) => NodeRef::Leaf(l),
        }
    }
}

/// Finds the first node whose key matches, anywhere in the tree.
pub fn find<'a>(state: &'a NavigationState, key: &str) -> Option<NodeRef<'a>> {
    if state.key == key {
        return Some(NodeRef::State(state));
    }
    state.routes.iter().find_map(|child| match child.as_ref() {
        NavNode::Leaf(leaf) => (leaf.key == key).then_some(NodeRef::Leaf(leaf)),
        NavNode::State(nested) => find(nested, key),
    })
}

/// Like [`find`], but returns the chain of `routes` positions leading from
/// the root to the match. An empty path means the root itself matched.
pub fn locate(state: &NavigationState, key: &str) -> Option<Vec<usize>> {
    let mut path = Vec::new();
    locate_into(state, key, &mut path).then_some(path)
}

fn locate_into(state: &NavigationState, key: &str, path: &mut Vec<usize>) -> bool {
    if state.key == key {
        return true;
    }
    for (i, child) in state.routes.iter().enumerate() {
        path.push(i);
        let hit = match child.as_ref() {
            NavNode::Leaf(leaf) => leaf.key == key,
            NavNode::State(nested) => locate_into(nested, key, path),
        };
        if hit {
            return true;
        }
        path.pop();
    }
    false
}

/// Every node on the focused path, root first.
pub fn focused_path(state: &NavigationState) -> Vec<NodeRef<'_>> {
    let mut path = vec![NodeRef::State(state)];
    let mut current = state;
    while let Some(child) = current.focused() {
        path.push(NodeRef::from(child.as_ref()));
        match child.as_ref() {
            NavNode::State(nested) => current = nested,
            NavNode::Leaf(_) => break,
        }
    }
    path
}

/// The deepest focused leaf, if the focused path ends in one.
pub fn focused_leaf(state: &NavigationState) -> Option<&LeafRoute> {
    match focused_path(state).last()? {
        NodeRef::Leaf(leaf) => Some(*leaf),
        NodeRef::State(_) => None,
    }
}
