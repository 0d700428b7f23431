//! # Navigation State
//!
//! The live, recursive tree of focused routes. Each container node mirrors a
//! container scene; each leaf is a renderable [`LeafRoute`].
//!
//! ```text
//! NavigationState (root, always a container)
//! ├── key, type, props
//! ├── index ─────────────┐     // active element of `routes`
//! └── routes: Vec<Arc<NavNode>>
//!         ├── NavNode::State(NavigationState)   // nested container
//!         └── NavNode::Leaf(LeafRoute)          // { key, props }
//! ```
//!
//! Nodes are never mutated once shared. Every transition clones only the
//! spine it touches; untouched children stay behind the same `Arc`, so a
//! renderer can compare with `Arc::ptr_eq` to skip unchanged subtrees.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Map;

use crate::core::compiler::{Route, SceneGraph};
use crate::core::scene::{ContainerType, Props, merge_props};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationState {
    pub key: String,
    #[serde(rename = "type")]
    pub container: ContainerType,
    pub index: usize,
    pub routes: Vec<Arc<NavNode>>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub props: Props,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafRoute {
    pub key: String,
    pub props: Props,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NavNode {
    State(NavigationState),
    Leaf(LeafRoute),
}

impl NavNode {
    pub fn key(&self) -> &str {
        match self {
            NavNode::State(s) => &s.key,
            NavNode::Leaf(l) => &l.key,
        }
    }

    pub fn props(&self) -> &Props {
        match self {
            NavNode::State(s) => &s.props,
            NavNode::Leaf(l) => &l.props,
        }
    }

    pub fn as_state(&self) -> Option<&NavigationState> {
        match self {
            NavNode::State(s) => Some(s),
            NavNode::Leaf(_) => None,
        }
    }
}

impl NavigationState {
    /// The active child at this level.
    pub fn focused(&self) -> Option<&Arc<NavNode>> {
        self.routes.get(self.index)
    }

    pub fn focused_key(&self) -> Option<&str> {
        self.focused().map(|n| n.key())
    }

    /// Checks the structural invariants against the registry: every index in
    /// range, no empty container, stacks focused on their top entry, tab
    /// containers holding every declared child, every key registered.
    pub fn is_well_formed(&self, graph: &SceneGraph) -> bool {
        let Some(route) = graph.route(&self.key) else {
            return false;
        };
        if self.routes.is_empty() || self.index >= self.routes.len() {
            return false;
        }
        let shape_ok = match self.container {
            ContainerType::Stack => self.index == self.routes.len() - 1,
            ContainerType::Tabs | ContainerType::Drawer => {
                self.routes.iter().map(|n| n.key()).eq(route.children.iter().map(String::as_str))
            }
            ContainerType::Leaf => false,
        };
        shape_ok
            && self.routes.iter().all(|node| match node.as_ref() {
                NavNode::State(s) => s.is_well_formed(graph),
                NavNode::Leaf(l) => graph.contains(&l.key),
            })
    }
}

/// Builds the single deterministic starting state for a compiled graph.
///
/// Stacks start with only their initial child; tabs and drawers materialize
/// every child and point `index` at the initial one. Router-level root props
/// are merged into the root node.
pub fn initial_state(graph: &SceneGraph) -> NavigationState {
    let mut root = build_container(graph, graph.root_route(), &Props::new());
    merge_props(&mut root.props, graph.root_props());
    root
}

/// Materializes the route registered under `key`, with `props` merged over
/// its static props. Containers come back in their initial configuration.
pub fn build_node(graph: &SceneGraph, key: &str, props: &Props) -> Option<NavNode> {
    graph.route(key).map(|route| materialize(graph, route, props))
}

fn materialize(graph: &SceneGraph, route: &Route, props: &Props) -> NavNode {
    if route.container.is_container() {
        NavNode::State(build_container(graph, route, props))
    } else {
        let mut leaf_props = route.props.clone();
        merge_props(&mut leaf_props, props);
        NavNode::Leaf(LeafRoute {
            key: route.key.clone(),
            props: leaf_props,
        })
    }
}

fn build_container(graph: &SceneGraph, route: &Route, props: &Props) -> NavigationState {
    let initial = route.initial_child.unwrap_or(0);
    let empty = Props::new();

    let (routes, index) = if route.container.is_tabbed() {
        let routes: Vec<Arc<NavNode>> = graph
            .children(route)
            .map(|child| Arc::new(materialize(graph, child, &empty)))
            .collect();
        (routes, initial)
    } else {
        let routes: Vec<Arc<NavNode>> = route
            .children
            .get(initial)
            .and_then(|k| graph.route(k))
            .map(|child| Arc::new(materialize(graph, child, &empty)))
            .into_iter()
            .collect();
        (routes, 0)
    };

    let mut state_props = route.props.clone();
    merge_props(&mut state_props, props);
    NavigationState {
        key: route.key.clone(),
        container: route.container,
        index,
        routes,
        props: state_props,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compiler::{CompileOptions, compile};
    use crate::core::scene::Scene;
    use crate::test_support::{props, sample_graph, sample_scenes};
    use serde_json::json;

    #[test]
    fn test_stack_root_starts_with_initial_child_only() {
        let graph = sample_graph();
        let state = initial_state(&graph);
        assert_eq!(state.container, ContainerType::Stack);
        assert_eq!(state.index, 0);
        assert_eq!(state.routes.len(), 1);
        assert_eq!(state.focused_key(), Some("home"));
        assert!(state.is_well_formed(&graph));
    }

    #[test]
    fn test_non_first_initial_in_stack() {
        let scenes = vec![Scene::leaf("a"), Scene::leaf("b").initial()];
        let graph = compile(scenes.into(), &CompileOptions::default()).unwrap();
        let state = initial_state(&graph);
        assert_eq!(state.index, 0);
        assert_eq!(state.focused_key(), Some("b"));
    }

    #[test]
    fn test_tabs_materialize_every_child() {
        let graph = sample_graph();
        let NavNode::State(main) = build_node(&graph, "main", &Props::new()).unwrap() else {
            panic!("main is a container");
        };
        assert_eq!(main.index, 0);
        let keys: Vec<&str> = main.routes.iter().map(|n| n.key()).collect();
        assert_eq!(keys, vec!["feed", "inbox", "profile"]);

        let feed = main.routes[0].as_state().unwrap();
        assert_eq!(feed.focused_key(), Some("feed_list"));
        let inbox = main.routes[1].as_state().unwrap();
        assert_eq!(inbox.routes.len(), 1);
        assert_eq!(inbox.focused_key(), Some("threads"));
    }

    #[test]
    fn test_tabs_index_points_at_initial() {
        let root = Scene::tabs(
            "app",
            vec![Scene::leaf("a"), Scene::leaf("b"), Scene::leaf("c").initial()],
        );
        let graph = compile(root.into(), &CompileOptions::default()).unwrap();
        let state = initial_state(&graph);
        assert_eq!(state.index, 2);
        assert_eq!(state.routes.len(), 3);
        assert!(state.is_well_formed(&graph));
    }

    #[test]
    fn test_leaf_props_merge_over_static_props() {
        let scenes = vec![
            Scene::leaf("home")
                .initial()
                .with_props(props(&[("title", json!("Home")), ("id", json!(0))])),
        ];
        let graph = compile(scenes.into(), &CompileOptions::default()).unwrap();
        let node = build_node(&graph, "home", &props(&[("id", json!(7))])).unwrap();
        assert_eq!(node.props().get("title"), Some(&json!("Home")));
        assert_eq!(node.props().get("id"), Some(&json!(7)));
    }

    #[test]
    fn test_root_props_land_on_root() {
        let options = CompileOptions {
            root_props: props(&[("theme", json!("dark"))]),
            ..Default::default()
        };
        let graph = compile(sample_scenes().into(), &options).unwrap();
        let state = initial_state(&graph);
        assert_eq!(state.props.get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_build_node_unknown_key() {
        assert!(build_node(&sample_graph(), "missing", &Props::new()).is_none());
    }

    #[test]
    fn test_nested_initial_containers_recurse() {
        let root = Scene::drawer(
            "app",
            vec![Scene::tabs(
                "tabs",
                vec![
                    Scene::leaf("one"),
                    Scene::stack("two", vec![Scene::leaf("two_a")]).initial(),
                ],
            )],
        );
        let graph = compile(root.into(), &CompileOptions::default()).unwrap();
        let state = initial_state(&graph);
        let tabs = state.routes[0].as_state().unwrap();
        assert_eq!(tabs.index, 1);
        let two = tabs.routes[1].as_state().unwrap();
        assert_eq!(two.focused_key(), Some("two_a"));
        assert!(state.is_well_formed(&graph));
    }

    #[test]
    fn test_state_serializes_as_nested_routes() {
        let graph = sample_graph();
        let value = serde_json::to_value(initial_state(&graph)).unwrap();
        assert_eq!(
            value,
            json!({
                "key": "__root",
                "type": "stack",
                "index": 0,
                "routes": [{"key": "home", "props": {}}]
            })
        );
    }
}
