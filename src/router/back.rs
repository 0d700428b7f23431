//! # Back Navigation
//!
//! Turns a platform back gesture into a BACK action and tells the platform
//! whether it was handled. When the navigation stack is exhausted the app-exit
//! callback decides what happens next.
//!
//! ```text
//! gesture ─▶ override? ──yes──▶ override() ─▶ outcome
//!               │no
//!               ▼
//!          dispatch BACK ──Exhausted/Err──▶ on_exit() ─▶ ExitRequested
//!               │ok
//!               ▼
//!          on_back() ─▶ Handled
//! ```

use std::sync::Arc;

use log::{debug, info, warn};

use crate::core::action::Action;
use crate::router::{Dispatched, Router};

/// What the platform should do with the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// The router consumed the gesture.
    Handled,
    /// Nothing left to pop. `consumed` is the exit callback's answer.
    ExitRequested { consumed: bool },
}

impl BackOutcome {
    /// True when the platform should suppress its default back behavior.
    pub fn is_handled(&self) -> bool {
        matches!(
            self,
            BackOutcome::Handled | BackOutcome::ExitRequested { consumed: true }
        )
    }
}

pub type SubscriptionId = u64;

/// Platform source of back-gesture events.
pub trait BackEventSource {
    fn subscribe(&self) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Keeps a back-gesture subscription alive. Unsubscribes on drop.
pub struct BackSubscription {
    source: Arc<dyn BackEventSource>,
    id: SubscriptionId,
}

impl BackSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for BackSubscription {
    fn drop(&mut self) {
        debug!("Releasing back gesture subscription {}", self.id);
        self.source.unsubscribe(self.id);
    }
}

#[derive(Default)]
pub struct BackNavigationController {
    override_handler: Option<Box<dyn FnMut() -> bool>>,
    on_back: Option<Box<dyn FnMut()>>,
    on_exit: Option<Box<dyn FnMut() -> bool>>,
}

impl BackNavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the default behavior entirely. The handler's return value
    /// says whether the gesture was handled.
    pub fn with_override(mut self, handler: impl FnMut() -> bool + 'static) -> Self {
        self.override_handler = Some(Box::new(handler));
        self
    }

    /// Called after every successful back.
    pub fn on_back(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_back = Some(Box::new(callback));
        self
    }

    /// Called when nothing is left to pop. Returns whether the exit request
    /// was consumed.
    pub fn on_exit(mut self, callback: impl FnMut() -> bool + 'static) -> Self {
        self.on_exit = Some(Box::new(callback));
        self
    }

    /// Subscribes to `source` for as long as the returned guard lives.
    pub fn activate(&self, source: Arc<dyn BackEventSource>) -> BackSubscription {
        let id = source.subscribe();
        debug!("Subscribed to back gestures as {}", id);
        BackSubscription { source, id }
    }

    pub fn handle_back(&mut self, router: &mut Router) -> BackOutcome {
        if let Some(handler) = self.override_handler.as_mut() {
            return if handler() {
                BackOutcome::Handled
            } else {
                BackOutcome::ExitRequested { consumed: false }
            };
        }

        match router.apply(Action::back()) {
            Ok(Dispatched::Exhausted) => self.request_exit(),
            Ok(_) => {
                if let Some(callback) = self.on_back.as_mut() {
                    callback();
                }
                BackOutcome::Handled
            }
            Err(e) => {
                warn!("Back navigation failed: {}", e);
                self.request_exit()
            }
        }
    }

    fn request_exit(&mut self) -> BackOutcome {
        info!("Navigation exhausted, requesting app exit");
        let consumed = self.on_exit.as_mut().is_some_and(|callback| callback());
        BackOutcome::ExitRequested { consumed }
    }
}
