//! # Scene Declarations
//!
//! The already-parsed declarative tree a router is built from. Scenes are
//! plain data: they carry a key, a container type, children and static props.
//! Nothing in here knows about navigation state.
//!
//! ```text
//! Scene
//! ├── key: String                  // unique across the whole tree
//! ├── container: Option<Type>      // stack | tabs | drawer | leaf
//! ├── children: Vec<Scene>
//! ├── initial: bool                // initially focused sibling
//! ├── wrapper: Option<String>      // opaque decorator reference
//! ├── props: Props                 // static props
//! └── action: Option<ActionType>   // default action for `navigate`
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::action::ActionType;

/// Props attached to scenes, routes and actions.
pub type Props = Map<String, Value>;

/// Merges `overlay` into `target`, overwriting existing keys.
pub fn merge_props(target: &mut Props, overlay: &Props) {
    for (k, v) in overlay {
        target.insert(k.clone(), v.clone());
    }
}

/// How a scene arranges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerType {
    #[default]
    Leaf,
    Stack,
    Tabs,
    Drawer,
}

impl ContainerType {
    /// Tabs and drawers hold every child at once and only move their index.
    pub fn is_tabbed(&self) -> bool {
        matches!(self, ContainerType::Tabs | ContainerType::Drawer)
    }

    pub fn is_container(&self) -> bool {
        !matches!(self, ContainerType::Leaf)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub key: String,
    /// Omitted: `stack` when the scene has children, `leaf` otherwise.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Scene>,
    #[serde(default)]
    pub initial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapper: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionType>,
}

impl Scene {
    pub fn leaf(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            container: Some(ContainerType::Leaf),
            children: Vec::new(),
            initial: false,
            wrapper: None,
            props: Props::new(),
            action: None,
        }
    }

    pub fn stack(key: impl Into<String>, children: Vec<Scene>) -> Self {
        Self::container(key, ContainerType::Stack, children)
    }

    pub fn tabs(key: impl Into<String>, children: Vec<Scene>) -> Self {
        Self::container(key, ContainerType::Tabs, children)
    }

    pub fn drawer(key: impl Into<String>, children: Vec<Scene>) -> Self {
        Self::container(key, ContainerType::Drawer, children)
    }

    fn container(key: impl Into<String>, container: ContainerType, children: Vec<Scene>) -> Self {
        Self {
            container: Some(container),
            children,
            ..Self::leaf(key)
        }
    }

    /// Marks this scene as the initially focused sibling.
    pub fn initial(mut self) -> Self {
        self.initial = true;
        self
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn wrapped_by(mut self, wrapper: impl Into<String>) -> Self {
        self.wrapper = Some(wrapper.into());
        self
    }

    pub fn with_action(mut self, action: ActionType) -> Self {
        self.action = Some(action);
        self
    }

    /// The effective container type after applying the omitted-type default.
    pub fn container_type(&self) -> ContainerType {
        self.container.unwrap_or(if self.children.is_empty() {
            ContainerType::Leaf
        } else {
            ContainerType::Stack
        })
    }
}

/// Router input: either one root scene or a bare list of top-level scenes.
///
/// A list (or a lone leaf) is wrapped in a synthetic hidden stack root
/// by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SceneInput {
    Root(Scene),
    List(Vec<Scene>),
}

impl From<Scene> for SceneInput {
    fn from(scene: Scene) -> Self {
        SceneInput::Root(scene)
    }
}

impl From<Vec<Scene>> for SceneInput {
    fn from(scenes: Vec<Scene>) -> Self {
        SceneInput::List(scenes)
    }
}

/// On-disk layout for TOML scene files, whose top level must be a table.
///
/// Either `[root]` or one or more `[[scenes]]` entries.
#[derive(Debug, Default, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub root: Option<Scene>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl SceneFile {
    pub fn into_input(self) -> SceneInput {
        match self.root {
            Some(root) => SceneInput::Root(root),
            None => SceneInput::List(self.scenes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_container_type_defaults_from_children() {
        let mut scene = Scene::leaf("home");
        scene.container = None;
        assert_eq!(scene.container_type(), ContainerType::Leaf);

        scene.children.push(Scene::leaf("detail"));
        assert_eq!(scene.container_type(), ContainerType::Stack);
    }

    #[test]
    fn test_merge_props_overwrites() {
        let mut target = json!({"a": 1, "b": 2}).as_object().cloned().unwrap();
        let overlay = json!({"b": 3, "c": 4}).as_object().cloned().unwrap();
        merge_props(&mut target, &overlay);
        assert_eq!(Value::Object(target), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_scene_input_parses_single_root() {
        let input: SceneInput = serde_json::from_value(json!({
            "key": "app",
            "type": "tabs",
            "children": [{"key": "a", "initial": true}, {"key": "b"}]
        }))
        .unwrap();
        let SceneInput::Root(root) = input else {
            panic!("expected a root scene");
        };
        assert_eq!(root.container_type(), ContainerType::Tabs);
        assert!(root.children[0].initial);
        assert_eq!(root.children[1].container_type(), ContainerType::Leaf);
    }

    #[test]
    fn test_scene_input_parses_list() {
        let input: SceneInput =
            serde_json::from_value(json!([{"key": "home"}, {"key": "detail", "action": "replace"}]))
                .unwrap();
        let SceneInput::List(scenes) = input else {
            panic!("expected a scene list");
        };
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[1].action, Some(ActionType::Replace));
    }

    #[test]
    fn test_scene_file_toml_list() {
        let toml_str = r#"
[[scenes]]
key = "home"
initial = true

[[scenes]]
key = "detail"
wrapper = "modal"

[scenes.props]
title = "Detail"
"#;
        let file: SceneFile = toml::from_str(toml_str).unwrap();
        let SceneInput::List(scenes) = file.into_input() else {
            panic!("expected a scene list");
        };
        assert_eq!(scenes[1].wrapper.as_deref(), Some("modal"));
        assert_eq!(scenes[1].props.get("title"), Some(&json!("Detail")));
    }

    #[test]
    fn test_scene_file_toml_root_wins() {
        let toml_str = r#"
[root]
key = "app"
type = "drawer"

[[root.children]]
key = "only"
"#;
        let file: SceneFile = toml::from_str(toml_str).unwrap();
        assert!(matches!(file.into_input(), SceneInput::Root(s) if s.key == "app"));
    }
}
