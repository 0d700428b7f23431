//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use serde_json::Value;

use crate::core::action::{Action, ActionType};
use crate::core::compiler::{CompileOptions, SceneGraph, compile};
use crate::core::reducer::{NavigationReducer, Reducer, Transition};
use crate::core::scene::{Props, Scene};
use crate::core::state::{NavigationState, initial_state};

/// Builds a props map from literal pairs.
pub fn props(pairs: &[(&str, Value)]) -> Props {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// ```text
/// __root (synthetic stack)
/// ├── home (initial)
/// ├── detail
/// ├── settings (default action: replace)
/// ├── login (wrapper: modal)
/// └── main (tabs)
///     ├── feed (stack, initial)
///     │   ├── feed_list
///     │   └── post
///     ├── inbox (stack)
///     │   ├── threads
///     │   └── thread
///     └── profile
/// ```
pub fn sample_scenes() -> Vec<Scene> {
    vec![
        Scene::leaf("home").initial(),
        Scene::leaf("detail"),
        Scene::leaf("settings").with_action(ActionType::Replace),
        Scene::leaf("login").wrapped_by("modal"),
        Scene::tabs(
            "main",
            vec![
                Scene::stack("feed", vec![Scene::leaf("feed_list"), Scene::leaf("post")]).initial(),
                Scene::stack("inbox", vec![Scene::leaf("threads"), Scene::leaf("thread")]),
                Scene::leaf("profile"),
            ],
        ),
    ]
}

pub fn sample_graph() -> SceneGraph {
    compile(sample_scenes().into(), &CompileOptions::default()).unwrap()
}

/// The sample graph's initial state with `main` pushed on the root stack.
pub fn pushed_main_state() -> NavigationState {
    let graph = sample_graph();
    let state = initial_state(&graph);
    match NavigationReducer::default()
        .reduce(&graph, &state, &Action::push("main", Props::new()))
        .unwrap()
    {
        Transition::Updated(next) => next,
        other => panic!("pushing main should update the state, got {other:?}"),
    }
}
