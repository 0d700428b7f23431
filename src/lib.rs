//! scene-router: navigation state for tree-structured UIs.
//!
//! Compile a scene tree once, then drive its navigation state with actions.
//!
//! ```rust,ignore
//! let mut router = Router::new(scenes, RouterOptions::default())?;
//! router.dispatch(RawAction::new("push").with_key("detail"))?;
//! let outcome = BackNavigationController::new().handle_back(&mut router);
//! ```

pub mod core;
pub mod router;

#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    Action, ActionError, ActionType, ConfigError, ContainerType, NavNode, NavigationState, Props,
    RawAction, Scene, SceneInput, TabBackPolicy, Transition,
};
pub use crate::router::{BackNavigationController, BackOutcome, Dispatched, Router, RouterOptions};
