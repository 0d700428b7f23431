//! # Navigation Reducer
//!
//! The pure transition function: `(NavigationState, Action) → Transition`.
//! There is no hidden state. The input tree is never touched; each
//! transition rebuilds only the spine it changes and shares the rest.
//!
//! ```text
//! PUSH / REPLACE / JUMP / RESET / POP_TO
//!     target key ──registry──▶ parent container
//!     walk the focused path down to the parent, apply there
//!     (JUMP/RESET may switch tabs on the way; the others may not)
//!
//! POP / BACK
//!     deepest focused stack with > 1 entry absorbs it,
//!     otherwise bubble up; nothing left to pop ──▶ Exhausted
//!
//! REFRESH
//!     resolve key anywhere in the tree, merge props; missing ──▶ Unchanged
//! ```

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::action::{Action, ActionError, ActionType};
use crate::core::compiler::{Route, SceneGraph};
use crate::core::resolver;
use crate::core::scene::{ContainerType, Props, merge_props};
use crate::core::state::{LeafRoute, NavNode, NavigationState, build_node};

/// Result of a successful reduction.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Updated(NavigationState),
    /// The action was valid but changed nothing.
    Unchanged,
    /// POP/BACK found no level able to absorb it.
    Exhausted,
}

/// What a POP/BACK does when it reaches a tabs or drawer container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TabBackPolicy {
    /// Escalate straight to the parent container.
    #[default]
    Bubble,
    /// Return to the initial tab first, escalating only from there.
    InitialTab,
}

/// A navigation state machine. Routers hold one behind a trait object so
/// hosts can swap in their own.
pub trait Reducer {
    fn reduce(
        &self,
        graph: &SceneGraph,
        state: &NavigationState,
        action: &Action,
    ) -> Result<Transition, ActionError>;
}

#[derive(Debug, Clone, Default)]
pub struct NavigationReducer {
    tab_back: TabBackPolicy,
}

impl NavigationReducer {
    pub fn new(tab_back: TabBackPolicy) -> Self {
        Self { tab_back }
    }

    pub fn tab_back(&self) -> TabBackPolicy {
        self.tab_back
    }

    /// Removes one entry from the deepest focused level able to lose one.
    fn pop(&self, graph: &SceneGraph, node: &NavigationState) -> Option<NavigationState> {
        if let Some(NavNode::State(child)) = node.focused().map(|n| n.as_ref())
            && let Some(child) = self.pop(graph, child)
        {
            let mut next = node.clone();
            next.routes[node.index] = Arc::new(NavNode::State(child));
            return Some(next);
        }

        match node.container {
            ContainerType::Stack if node.routes.len() > 1 => {
                let mut next = node.clone();
                next.routes.remove(node.index);
                next.index = next.routes.len() - 1;
                Some(next)
            }
            ContainerType::Tabs | ContainerType::Drawer
                if self.tab_back == TabBackPolicy::InitialTab =>
            {
                let initial = graph.route(&node.key)?.initial_child?;
                (initial != node.index).then(|| NavigationState {
                    index: initial,
                    ..node.clone()
                })
            }
            _ => None,
        }
    }
}

impl Reducer for NavigationReducer {
    fn reduce(
        &self,
        graph: &SceneGraph,
        state: &NavigationState,
        action: &Action,
    ) -> Result<Transition, ActionError> {
        debug!("Reducing {} {:?}", action.kind, action.key);
        match action.kind {
            ActionType::Pop | ActionType::Back => Ok(match self.pop(graph, state) {
                Some(next) => Transition::Updated(next),
                None => Transition::Exhausted,
            }),
            ActionType::Refresh => Ok(refresh(state, action.key.as_deref(), &action.props)),
            ActionType::Push => {
                let route = target(graph, action)?;
                at_parent(graph, state, route, Focus::Current, |level| {
                    require_stack(level, route, action.kind)?;
                    let mut next = level.clone();
                    next.routes.push(Arc::new(fresh(graph, route, &action.props)));
                    next.index = next.routes.len() - 1;
                    Ok(Some(next))
                })
            }
            ActionType::Replace => {
                let route = target(graph, action)?;
                at_parent(graph, state, route, Focus::Current, |level| {
                    require_stack(level, route, action.kind)?;
                    let mut next = level.clone();
                    next.routes[level.index] = Arc::new(fresh(graph, route, &action.props));
                    Ok(Some(next))
                })
            }
            ActionType::Jump => {
                let route = target(graph, action)?;
                at_parent(graph, state, route, Focus::Switch, |level| {
                    if !level.container.is_tabbed() {
                        return Err(invalid(route, action.kind, level.container));
                    }
                    Ok(focus_tab(level, &route.key))
                })
            }
            ActionType::Reset => {
                let route = target(graph, action)?;
                at_parent(graph, state, route, Focus::Switch, |level| {
                    if level.container.is_tabbed() {
                        return Ok(focus_tab(level, &route.key));
                    }
                    Ok(Some(NavigationState {
                        index: 0,
                        routes: vec![Arc::new(fresh(graph, route, &action.props))],
                        ..level.clone()
                    }))
                })
            }
            ActionType::PopTo => {
                let route = target(graph, action)?;
                at_parent(graph, state, route, Focus::Current, |level| {
                    require_stack(level, route, action.kind)?;
                    let pos = level
                        .routes
                        .iter()
                        .rposition(|n| n.key() == route.key)
                        .ok_or_else(|| ActionError::Unreachable(route.key.clone()))?;
                    if pos == level.index {
                        return Ok(None);
                    }
                    let mut next = level.clone();
                    next.routes.truncate(pos + 1);
                    next.index = pos;
                    Ok(Some(next))
                })
            }
        }
    }
}

/// Registry entry for the action's key. The root has no parent and can't
/// be targeted.
fn target<'g>(graph: &'g SceneGraph, action: &Action) -> Result<&'g Route, ActionError> {
    let key = action
        .key
        .as_deref()
        .ok_or(ActionError::MissingKey(action.kind))?;
    match graph.route(key) {
        Some(route) if route.parent.is_some() => Ok(route),
        Some(_) => Err(ActionError::Unreachable(key.to_string())),
        None => Err(ActionError::UnknownKey(key.to_string())),
    }
}

fn fresh(graph: &SceneGraph, route: &Route, props: &Props) -> NavNode {
    // `route` came from this graph, so the lookup can't miss.
    build_node(graph, &route.key, props).unwrap_or_else(|| {
        NavNode::Leaf(LeafRoute {
            key: route.key.clone(),
            props: props.clone(),
        })
    })
}

fn invalid(route: &Route, action: ActionType, container: ContainerType) -> ActionError {
    ActionError::InvalidContainer {
        key: route.key.clone(),
        action,
        container,
    }
}

fn require_stack(
    level: &NavigationState,
    route: &Route,
    action: ActionType,
) -> Result<(), ActionError> {
    match level.container {
        ContainerType::Stack => Ok(()),
        other => Err(invalid(route, action, other)),
    }
}

fn focus_tab(level: &NavigationState, key: &str) -> Option<NavigationState> {
    let pos = level.routes.iter().position(|n| n.key() == key)?;
    (pos != level.index).then(|| NavigationState {
        index: pos,
        ..level.clone()
    })
}

/// Whether reaching the target's parent may move a tabs/drawer index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    /// Only JUMP and RESET switch tabs on the way down.
    Switch,
    /// The parent must already sit on the focused path.
    Current,
}

/// Applies `apply` at the container that holds `route`, walking down from
/// the root. `Ok(None)` means nothing changed.
fn at_parent<F>(
    graph: &SceneGraph,
    state: &NavigationState,
    route: &Route,
    focus: Focus,
    apply: F,
) -> Result<Transition, ActionError>
where
    F: FnOnce(&NavigationState) -> Result<Option<NavigationState>, ActionError>,
{
    let mut chain = graph.ancestry(&route.key);
    chain.pop();
    if chain.first().copied() != Some(state.key.as_str()) {
        return Err(ActionError::Unreachable(route.key.clone()));
    }
    Ok(match focus_and_apply(state, &chain[1..], &route.key, focus, apply)? {
        Some(next) => Transition::Updated(next),
        None => Transition::Unchanged,
    })
}

fn focus_and_apply<F>(
    node: &NavigationState,
    rest: &[&str],
    target: &str,
    focus: Focus,
    apply: F,
) -> Result<Option<NavigationState>, ActionError>
where
    F: FnOnce(&NavigationState) -> Result<Option<NavigationState>, ActionError>,
{
    let Some((next_key, rest)) = rest.split_first() else {
        return apply(node);
    };

    // A stack only exposes its top entry; tabs expose every child to JUMP/RESET.
    let pos = if node.container.is_tabbed() && focus == Focus::Switch {
        node.routes.iter().position(|n| n.key() == *next_key)
    } else {
        (node.focused_key() == Some(*next_key)).then_some(node.index)
    };
    let Some(pos) = pos else {
        return Err(ActionError::Unreachable(target.to_string()));
    };
    let Some(child) = node.routes[pos].as_state() else {
        return Err(ActionError::Unreachable(target.to_string()));
    };

    let changed = focus_and_apply(child, rest, target, focus, apply)?;
    if changed.is_none() && pos == node.index {
        return Ok(None);
    }
    let mut next = node.clone();
    next.index = pos;
    if let Some(child) = changed {
        next.routes[pos] = Arc::new(NavNode::State(child));
    }
    Ok(Some(next))
}

/// Merges props into the node matching `key`, or into the focused leaf when
/// no key is given.
fn refresh(state: &NavigationState, key: Option<&str>, props: &Props) -> Transition {
    let target = match key {
        Some(key) => key.to_string(),
        None => match resolver::focused_leaf(state) {
            Some(leaf) => leaf.key.clone(),
            None => return Transition::Unchanged,
        },
    };
    let Some(path) = resolver::locate(state, &target) else {
        debug!("Refresh target {target} is not mounted");
        return Transition::Unchanged;
    };
    match refresh_at(state, &path, props) {
        Some(next) => Transition::Updated(next),
        None => Transition::Unchanged,
    }
}

fn refresh_at(node: &NavigationState, path: &[usize], props: &Props) -> Option<NavigationState> {
    let Some((&pos, rest)) = path.split_first() else {
        let merged = merged(&node.props, props)?;
        return Some(NavigationState {
            props: merged,
            ..node.clone()
        });
    };
    let replacement = match node.routes.get(pos)?.as_ref() {
        NavNode::State(child) => NavNode::State(refresh_at(child, rest, props)?),
        NavNode::Leaf(leaf) => {
            let mut leaf = leaf.clone();
            leaf.props = merged(&leaf.props, props)?;
            NavNode::Leaf(leaf)
        }
    };
    let mut next = node.clone();
    next.routes[pos] = Arc::new(replacement);
    Some(next)
}

/// `None` when the overlay wouldn't change anything.
fn merged(current: &Props, overlay: &Props) -> Option<Props> {
    if overlay.iter().all(|(k, v)| current.get(k) == Some(v)) {
        return None;
    }
    let mut next = current.clone();
    merge_props(&mut next, overlay);
    Some(next)
}
