//! # Actions
//!
//! Everything that can happen to navigation state becomes an `Action`.
//! A push from a button? That's `Action::push("detail", props)`.
//! A hardware back press? That's `Action::back()`.
//!
//! The reducer takes the current state and an action, then returns the
//! next state. No side effects there. Callbacks happen elsewhere.
//!
//! ```text
//! NavigationState + Action  →  reduce()  →  Transition
//! ```
//!
//! Externally dispatched actions arrive as [`RawAction`] literals with a
//! free-form `type` string. They only become typed `Action`s once their verb
//! has been normalized to one of the canonical constants below.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::core::scene::{ContainerType, Props};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    Push,
    Pop,
    Back,
    Replace,
    Jump,
    Reset,
    Refresh,
    PopTo,
}

impl ActionType {
    pub const ALL: [ActionType; 8] = [
        ActionType::Push,
        ActionType::Pop,
        ActionType::Back,
        ActionType::Replace,
        ActionType::Jump,
        ActionType::Reset,
        ActionType::Refresh,
        ActionType::PopTo,
    ];

    /// The canonical `type` string carried by normalized raw actions.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Push => "SCENE_ROUTER_PUSH",
            ActionType::Pop => "SCENE_ROUTER_POP",
            ActionType::Back => "SCENE_ROUTER_BACK",
            ActionType::Replace => "SCENE_ROUTER_REPLACE",
            ActionType::Jump => "SCENE_ROUTER_JUMP",
            ActionType::Reset => "SCENE_ROUTER_RESET",
            ActionType::Refresh => "SCENE_ROUTER_REFRESH",
            ActionType::PopTo => "SCENE_ROUTER_POP_TO",
        }
    }

    pub fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// POP, BACK and REFRESH may be dispatched without a key.
    pub fn requires_key(&self) -> bool {
        !matches!(
            self,
            ActionType::Pop | ActionType::Back | ActionType::Refresh
        )
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action literal as it crosses the dispatch boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Props,
}

impl RawAction {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            key: None,
            props: Props::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub kind: ActionType,
    pub key: Option<String>,
    pub props: Props,
}

impl Action {
    pub fn new(kind: ActionType, key: Option<String>, props: Props) -> Self {
        Self { kind, key, props }
    }

    pub fn push(key: impl Into<String>, props: Props) -> Self {
        Self::new(ActionType::Push, Some(key.into()), props)
    }

    pub fn pop() -> Self {
        Self::new(ActionType::Pop, None, Props::new())
    }

    pub fn back() -> Self {
        Self::new(ActionType::Back, None, Props::new())
    }

    pub fn replace(key: impl Into<String>, props: Props) -> Self {
        Self::new(ActionType::Replace, Some(key.into()), props)
    }

    pub fn jump(key: impl Into<String>) -> Self {
        Self::new(ActionType::Jump, Some(key.into()), Props::new())
    }

    pub fn reset(key: impl Into<String>) -> Self {
        Self::new(ActionType::Reset, Some(key.into()), Props::new())
    }

    pub fn refresh(key: impl Into<String>, props: Props) -> Self {
        Self::new(ActionType::Refresh, Some(key.into()), props)
    }

    /// Refreshes whichever leaf is currently focused.
    pub fn refresh_focused(props: Props) -> Self {
        Self::new(ActionType::Refresh, None, props)
    }

    pub fn pop_to(key: impl Into<String>) -> Self {
        Self::new(ActionType::PopTo, Some(key.into()), Props::new())
    }

    /// Converts a raw action whose type is already canonical.
    /// Returns `None` for verbs that were never normalized.
    pub fn from_raw(raw: &RawAction) -> Option<Self> {
        let kind = ActionType::from_canonical(&raw.action_type)?;
        Some(Self::new(kind, raw.key.clone(), raw.props.clone()))
    }

    pub fn to_raw(&self) -> RawAction {
        RawAction {
            action_type: self.kind.as_str().to_string(),
            key: self.key.clone(),
            props: self.props.clone(),
        }
    }
}

/// Rejected transitions. State is always left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The key names no registered scene.
    UnknownKey(String),
    /// The action needs a key and none was given.
    MissingKey(ActionType),
    /// The target's container can't be focused without popping a stack.
    Unreachable(String),
    /// The target's container type doesn't support the action.
    InvalidContainer {
        key: String,
        action: ActionType,
        container: ContainerType,
    },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::UnknownKey(key) => write!(f, "unknown scene key: {key}"),
            ActionError::MissingKey(action) => write!(f, "{action} requires a key"),
            ActionError::Unreachable(key) => {
                write!(f, "scene {key} is not reachable from the focused path")
            }
            ActionError::InvalidContainer {
                key,
                action,
                container,
            } => write!(
                f,
                "{action} cannot target {key} inside a {container:?} container"
            ),
        }
    }
}

impl std::error::Error for ActionError {}
