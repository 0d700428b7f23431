//! # Scene Graph Compiler
//!
//! Flattens a [`SceneInput`] into a registry of [`Route`]s keyed by scene key.
//! Container semantics and each container's initial child are resolved here,
//! once, so nothing downstream ever has to look at the raw tree again.
//!
//! Compilation is all-or-nothing: any [`ConfigError`] aborts it and no
//! partial registry escapes.

use std::collections::HashMap;
use std::fmt;

use log::{debug, info};

use crate::core::action::ActionType;
use crate::core::scene::{ContainerType, Props, Scene, SceneInput};

/// Key of the synthetic stack that wraps list input.
pub const DEFAULT_ROOT_KEY: &str = "__root";

/// Invalid scene trees. Fatal at router construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    DuplicateKey(String),
    /// A tabs/drawer container with several children and none marked initial.
    MissingInitial(String),
    MultipleInitial(String),
    EmptyContainer(String),
    LeafWithChildren(String),
    EmptyKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DuplicateKey(key) => write!(f, "duplicate scene key: {key}"),
            ConfigError::MissingInitial(key) => {
                write!(f, "container {key} has several children but none is initial")
            }
            ConfigError::MultipleInitial(key) => {
                write!(f, "container {key} has more than one initial child")
            }
            ConfigError::EmptyContainer(key) => write!(f, "container {key} has no children"),
            ConfigError::LeafWithChildren(key) => {
                write!(f, "scene {key} is declared as a leaf but has children")
            }
            ConfigError::EmptyKey => write!(f, "scene key must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Router-wide compile settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    pub root_key: String,
    /// Wrapper applied to scenes that don't name their own.
    pub wrap_by: Option<String>,
    /// Merged into the root state node's props.
    pub root_props: Props,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            root_key: DEFAULT_ROOT_KEY.to_string(),
            wrap_by: None,
            root_props: Props::new(),
        }
    }
}

/// A compiled registry entry. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub key: String,
    pub parent: Option<String>,
    pub container: ContainerType,
    /// Position among the parent's declared children.
    pub position: usize,
    pub children: Vec<String>,
    /// Position of the initially focused child; `None` for leaves.
    pub initial_child: Option<usize>,
    pub wrapper: Option<String>,
    pub props: Props,
    /// Action used when navigating to this scene by key.
    pub action: ActionType,
}

/// The compiled scene tree: a flat registry plus the resolved root.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    root: Scene,
    routes: HashMap<String, Route>,
    root_props: Props,
}

impl SceneGraph {
    pub fn root(&self) -> &Scene {
        &self.root
    }

    pub fn root_key(&self) -> &str {
        &self.root.key
    }

    pub fn root_route(&self) -> &Route {
        // Registered first during compilation.
        &self.routes[&self.root.key]
    }

    pub fn root_props(&self) -> &Props {
        &self.root_props
    }

    pub fn route(&self, key: &str) -> Option<&Route> {
        self.routes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.routes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    /// Child routes of `route` in declaration order.
    pub fn children<'a>(&'a self, route: &'a Route) -> impl Iterator<Item = &'a Route> + 'a {
        route.children.iter().filter_map(|k| self.routes.get(k))
    }

    /// Keys from the root down to `key`, inclusive. Empty if unregistered.
    pub fn ancestry(&self, key: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut cursor = self.routes.get(key);
        while let Some(route) = cursor {
            chain.push(route.key.as_str());
            cursor = route.parent.as_deref().and_then(|p| self.routes.get(p));
        }
        chain.reverse();
        chain
    }
}

/// Compiles scene input into a [`SceneGraph`].
pub fn compile(input: SceneInput, options: &CompileOptions) -> Result<SceneGraph, ConfigError> {
    let root = match input {
        SceneInput::Root(scene) if scene.container_type().is_container() => scene,
        SceneInput::Root(scene) => synthetic_root(&options.root_key, vec![scene]),
        SceneInput::List(scenes) => synthetic_root(&options.root_key, scenes),
    };

    let mut routes = HashMap::new();
    register(&root, None, 0, ActionType::Push, options, &mut routes)?;
    info!("Compiled scene graph rooted at {} ({} routes)", root.key, routes.len());

    Ok(SceneGraph {
        root,
        routes,
        root_props: options.root_props.clone(),
    })
}

fn synthetic_root(key: &str, children: Vec<Scene>) -> Scene {
    Scene::stack(key, children)
}

fn register(
    scene: &Scene,
    parent: Option<&str>,
    position: usize,
    default_action: ActionType,
    options: &CompileOptions,
    routes: &mut HashMap<String, Route>,
) -> Result<(), ConfigError> {
    if scene.key.is_empty() {
        return Err(ConfigError::EmptyKey);
    }
    if routes.contains_key(&scene.key) {
        return Err(ConfigError::DuplicateKey(scene.key.clone()));
    }

    let container = scene.container_type();
    let initial_child = match container {
        ContainerType::Leaf if !scene.children.is_empty() => {
            return Err(ConfigError::LeafWithChildren(scene.key.clone()));
        }
        ContainerType::Leaf => None,
        _ if scene.children.is_empty() => {
            return Err(ConfigError::EmptyContainer(scene.key.clone()));
        }
        _ => Some(select_initial(scene, container)?),
    };

    let wrapper = scene.wrapper.clone().or_else(|| options.wrap_by.clone());
    debug!(
        "Registering {} ({:?}) under {:?} at {}",
        scene.key, container, parent, position
    );
    routes.insert(
        scene.key.clone(),
        Route {
            key: scene.key.clone(),
            parent: parent.map(str::to_string),
            container,
            position,
            children: scene.children.iter().map(|c| c.key.clone()).collect(),
            initial_child,
            wrapper,
            props: scene.props.clone(),
            action: scene.action.unwrap_or(default_action),
        },
    );

    // Tab and drawer children are reached by switching, not by stacking.
    let child_action = if container.is_tabbed() {
        ActionType::Jump
    } else {
        ActionType::Push
    };
    for (i, child) in scene.children.iter().enumerate() {
        register(child, Some(&scene.key), i, child_action, options, routes)?;
    }
    Ok(())
}

/// Explicit `initial` flag, else the sole child, else the first child of a stack.
fn select_initial(scene: &Scene, container: ContainerType) -> Result<usize, ConfigError> {
    let flagged: Vec<usize> = scene
        .children
        .iter()
        .enumerate()
        .filter(|(_, c)| c.initial)
        .map(|(i, _)| i)
        .collect();

    match flagged.as_slice() {
        [only] => Ok(*only),
        [] if scene.children.len() == 1 => Ok(0),
        [] if container.is_tabbed() => Err(ConfigError::MissingInitial(scene.key.clone())),
        [] => Ok(0),
        _ => Err(ConfigError::MultipleInitial(scene.key.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{props, sample_scenes};

    #[test]
    fn test_list_input_gets_synthetic_root() {
        let graph = compile(sample_scenes().into(), &CompileOptions::default()).unwrap();
        assert_eq!(graph.root_key(), DEFAULT_ROOT_KEY);
        let root = graph.root_route();
        assert_eq!(root.container, ContainerType::Stack);
        assert_eq!(root.parent, None);
        assert_eq!(root.children[0], "home");
    }

    #[test]
    fn test_lone_leaf_is_wrapped() {
        let graph = compile(Scene::leaf("home").into(), &CompileOptions::default()).unwrap();
        assert_eq!(graph.root_key(), DEFAULT_ROOT_KEY);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.route("home").unwrap().parent.as_deref(), Some(DEFAULT_ROOT_KEY));
    }

    #[test]
    fn test_container_root_is_kept() {
        let root = Scene::tabs("app", vec![Scene::leaf("a").initial(), Scene::leaf("b")]);
        let graph = compile(root.into(), &CompileOptions::default()).unwrap();
        assert_eq!(graph.root_key(), "app");
        assert!(!graph.contains(DEFAULT_ROOT_KEY));
    }

    #[test]
    fn test_routes_record_position_and_parent() {
        let graph = compile(sample_scenes().into(), &CompileOptions::default()).unwrap();
        let inbox = graph.route("inbox").unwrap();
        assert_eq!(inbox.parent.as_deref(), Some("main"));
        assert_eq!(inbox.position, 1);
        assert_eq!(inbox.container, ContainerType::Stack);
        assert_eq!(inbox.initial_child, Some(0));

        let main = graph.route("main").unwrap();
        assert_eq!(main.initial_child, Some(0));
        assert_eq!(main.children, vec!["feed", "inbox", "profile"]);
    }

    #[test]
    fn test_duplicate_key_fails() {
        let scenes = vec![
            Scene::leaf("home").initial(),
            Scene::stack("nested", vec![Scene::leaf("home")]),
        ];
        let err = compile(scenes.into(), &CompileOptions::default()).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateKey("home".into()));
    }

    #[test]
    fn test_duplicate_of_synthetic_root_fails() {
        let scenes = vec![Scene::leaf(DEFAULT_ROOT_KEY)];
        let err = compile(scenes.into(), &CompileOptions::default()).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateKey(DEFAULT_ROOT_KEY.into()));
    }

    #[test]
    fn test_tabs_without_initial_fails() {
        let root = Scene::tabs("app", vec![Scene::leaf("a"), Scene::leaf("b")]);
        let err = compile(root.into(), &CompileOptions::default()).unwrap_err();
        assert_eq!(err, ConfigError::MissingInitial("app".into()));
    }

    #[test]
    fn test_sole_tab_is_implicitly_initial() {
        let root = Scene::drawer("app", vec![Scene::leaf("only")]);
        let graph = compile(root.into(), &CompileOptions::default()).unwrap();
        assert_eq!(graph.root_route().initial_child, Some(0));
    }

    #[test]
    fn test_stack_defaults_to_first_child() {
        let scenes = vec![Scene::leaf("a"), Scene::leaf("b")];
        let graph = compile(scenes.into(), &CompileOptions::default()).unwrap();
        assert_eq!(graph.root_route().initial_child, Some(0));
    }

    #[test]
    fn test_multiple_initial_fails() {
        let scenes = vec![Scene::leaf("a").initial(), Scene::leaf("b").initial()];
        let err = compile(scenes.into(), &CompileOptions::default()).unwrap_err();
        assert_eq!(err, ConfigError::MultipleInitial(DEFAULT_ROOT_KEY.into()));
    }

    #[test]
    fn test_structural_errors() {
        let empty: Vec<Scene> = Vec::new();
        assert_eq!(
            compile(empty.into(), &CompileOptions::default()).unwrap_err(),
            ConfigError::EmptyContainer(DEFAULT_ROOT_KEY.into())
        );

        let mut leaf = Scene::leaf("odd");
        leaf.children.push(Scene::leaf("child"));
        assert_eq!(
            compile(vec![leaf].into(), &CompileOptions::default()).unwrap_err(),
            ConfigError::LeafWithChildren("odd".into())
        );

        assert_eq!(
            compile(vec![Scene::leaf("")].into(), &CompileOptions::default()).unwrap_err(),
            ConfigError::EmptyKey
        );
    }

    #[test]
    fn test_wrappers_and_default_action() {
        let options = CompileOptions {
            wrap_by: Some("frame".into()),
            ..Default::default()
        };
        let graph = compile(sample_scenes().into(), &options).unwrap();
        assert_eq!(graph.route("login").unwrap().wrapper.as_deref(), Some("modal"));
        assert_eq!(graph.route("home").unwrap().wrapper.as_deref(), Some("frame"));
        assert_eq!(graph.route("settings").unwrap().action, ActionType::Replace);
        assert_eq!(graph.route("detail").unwrap().action, ActionType::Push);
        assert_eq!(graph.route("profile").unwrap().action, ActionType::Jump);
        assert_eq!(graph.route("post").unwrap().action, ActionType::Push);
    }

    #[test]
    fn test_static_props_are_recorded() {
        let scenes = vec![Scene::leaf("home").with_props(props(&[("title", "Home".into())]))];
        let graph = compile(scenes.into(), &CompileOptions::default()).unwrap();
        assert_eq!(graph.route("home").unwrap().props["title"], "Home");
    }

    #[test]
    fn test_ancestry() {
        let graph = compile(sample_scenes().into(), &CompileOptions::default()).unwrap();
        assert_eq!(graph.ancestry("thread"), vec![DEFAULT_ROOT_KEY, "main", "inbox", "thread"]);
        assert_eq!(graph.ancestry(DEFAULT_ROOT_KEY), vec![DEFAULT_ROOT_KEY]);
        assert!(graph.ancestry("missing").is_empty());
    }
}
