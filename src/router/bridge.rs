//! # Action Dispatch Bridge
//!
//! Hosts dispatch actions with loose verbs (`"push"`, `"BackAction"`, ...).
//! The bridge rewrites known verbs to their canonical constant, then hands
//! the action to the external observer and to the reducer, in that order,
//! so an application store never sees something the router didn't.
//!
//! The bridge holds nothing but its lookup table.

use std::collections::HashMap;

use crate::core::action::{ActionType, RawAction};

/// Generic verbs accepted from hosts, and what they mean.
const VERBS: &[(&str, ActionType)] = &[
    ("push", ActionType::Push),
    ("pop", ActionType::Pop),
    ("back", ActionType::Back),
    ("BackAction", ActionType::Back),
    ("androidBack", ActionType::Back),
    ("replace", ActionType::Replace),
    ("jump", ActionType::Jump),
    ("reset", ActionType::Reset),
    ("refresh", ActionType::Refresh),
    ("popTo", ActionType::PopTo),
];

/// Something outside the router that wants to see every dispatched action,
/// typically an application-level store.
///
/// Observers get a shared reference: they can't change the action, and they
/// can't re-enter the router. Follow-up actions go through
/// [`Router::sender`](crate::router::Router::sender) instead.
pub trait ActionObserver {
    fn observe(&self, action: &RawAction);
}

impl<F> ActionObserver for F
where
    F: Fn(&RawAction),
{
    fn observe(&self, action: &RawAction) {
        self(action)
    }
}

#[derive(Debug, Clone)]
pub struct DispatchBridge {
    table: HashMap<&'static str, ActionType>,
}

impl Default for DispatchBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchBridge {
    pub fn new() -> Self {
        let mut table: HashMap<&'static str, ActionType> = VERBS.iter().copied().collect();
        for kind in ActionType::ALL {
            table.insert(kind.as_str(), kind);
        }
        Self { table }
    }

    /// The canonical type for a verb, if it is known.
    pub fn canonical(&self, verb: &str) -> Option<ActionType> {
        self.table.get(verb).copied()
    }

    /// Rewrites a known verb to its canonical constant. Unknown verbs pass
    /// through untouched.
    pub fn normalize(&self, mut raw: RawAction) -> RawAction {
        if let Some(kind) = self.canonical(&raw.action_type) {
            raw.action_type = kind.as_str().to_string();
        }
        raw
    }

    /// Normalizes `raw`, shows it to `observer`, then passes it to `render`.
    pub fn forward<R>(
        &self,
        raw: RawAction,
        observer: Option<&dyn ActionObserver>,
        render: impl FnOnce(&RawAction) -> R,
    ) -> R {
        let action = self.normalize(raw);
        if let Some(observer) = observer {
            observer.observe(&action);
        }
        render(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_known_verbs_are_rewritten() {
        let bridge = DispatchBridge::new();
        let raw = bridge.normalize(RawAction::new("push").with_key("detail"));
        assert_eq!(raw.action_type, "SCENE_ROUTER_PUSH");
        assert_eq!(raw.key.as_deref(), Some("detail"));

        assert_eq!(bridge.canonical("BackAction"), Some(ActionType::Back));
        assert_eq!(bridge.canonical("popTo"), Some(ActionType::PopTo));
    }

    #[test]
    fn test_canonical_constants_map_to_themselves() {
        let bridge = DispatchBridge::new();
        for kind in ActionType::ALL {
            assert_eq!(bridge.canonical(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_verbs_pass_through() {
        let bridge = DispatchBridge::new();
        let raw = bridge.normalize(RawAction::new("focus").with_key("home"));
        assert_eq!(raw.action_type, "focus");
        assert_eq!(bridge.canonical("PUSH"), None);
    }

    #[test]
    fn test_observer_sees_action_before_render() {
        let bridge = DispatchBridge::new();
        let log = RefCell::new(Vec::new());
        let observer = |action: &RawAction| {
            log.borrow_mut().push(format!("observer:{}", action.action_type))
        };

        let raw = RawAction::new("jump").with_key("inbox");
        let rendered = bridge.forward(raw, Some(&observer), |action| {
            log.borrow_mut().push(format!("render:{}", action.action_type));
            action.key.clone()
        });

        assert_eq!(rendered.as_deref(), Some("inbox"));
        assert_eq!(
            *log.borrow(),
            vec!["observer:SCENE_ROUTER_JUMP", "render:SCENE_ROUTER_JUMP"]
        );
    }

    #[test]
    fn test_forward_without_observer() {
        let bridge = DispatchBridge::new();
        let kind = bridge.forward(RawAction::new("pop"), None, |action| action.action_type.clone());
        assert_eq!(kind, "SCENE_ROUTER_POP");
    }
}
