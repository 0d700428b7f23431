//! # Core Navigation Logic
//!
//! Scene compilation, navigation state and its reducer.
//! It knows nothing about renderers, platforms or callbacks.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Scene (input tree)   │
//!                    │  • compile() (registry) │
//!                    │  • State (nav tree)     │
//!                    │  • Action (events)      │
//!                    │  • reduce() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │   Router   │      │    Back    │      │    CLI     │
//!     │  (bridge,  │      │ controller │      │  (replay)  │
//!     │  observer) │      │            │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`scene`]: `Scene` and `SceneInput`, the declarative tree
//! - [`compiler`]: `compile()` turns scenes into a `SceneGraph` of `Route`s
//! - [`state`]: `NavigationState` and the initial state builder
//! - [`action`]: the `Action` vocabulary and `ActionError`
//! - [`reducer`]: `NavigationReducer`, the transition function
//! - [`resolver`]: key lookups over a state tree
//! - [`config`]: layered settings for routers and the CLI

pub mod action;
pub mod compiler;
pub mod config;
pub mod reducer;
pub mod resolver;
pub mod scene;
pub mod state;

pub use action::{Action, ActionError, ActionType, RawAction};
pub use compiler::{CompileOptions, ConfigError, Route, SceneGraph, compile};
pub use reducer::{NavigationReducer, Reducer, TabBackPolicy, Transition};
pub use scene::{ContainerType, Props, Scene, SceneInput};
pub use state::{LeafRoute, NavNode, NavigationState, initial_state};
