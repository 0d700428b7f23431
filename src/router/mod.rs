//! # Router
//!
//! One `Router` per navigation tree. It owns everything a mounted router
//! needs: the compiled graph, the current state, the reducer, the dispatch
//! bridge and an optional external observer. Nothing is shared between
//! routers and nothing is global; dropping a router is its teardown.
//!
//! ## Dispatch
//!
//! ```text
//! RawAction ─▶ bridge.normalize ─▶ observer.observe ─▶ reducer ─▶ new state
//!                                        │
//!                                        └─ may enqueue follow-ups via sender()
//!                                           (drained FIFO once this one is done)
//! ```
//!
//! Anything already queued runs before a new dispatch, so actions sent from
//! callbacks between dispatches keep their place in line. Rejected follow-ups
//! are kept until the host collects them with `take_rejected`.
//!
//! `dispatch` takes `&mut self`, so an action always runs to completion
//! before the next one starts.

pub mod back;
pub mod bridge;

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::core::action::{Action, ActionError, RawAction};
use crate::core::compiler::{CompileOptions, ConfigError, Route, SceneGraph, compile};
use crate::core::reducer::{NavigationReducer, Reducer, TabBackPolicy, Transition};
use crate::core::resolver::{self, NodeRef};
use crate::core::scene::{Props, SceneInput};
use crate::core::state::{LeafRoute, NavigationState, initial_state};

pub use back::{BackEventSource, BackNavigationController, BackOutcome, BackSubscription};
pub use bridge::{ActionObserver, DispatchBridge};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouterOptions {
    pub compile: CompileOptions,
    pub tab_back: TabBackPolicy,
}

/// What a dispatch did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Updated,
    Unchanged,
    /// POP/BACK with nothing left to pop. State is unchanged.
    Exhausted,
    /// The verb isn't part of the vocabulary. The observer still saw it.
    Ignored,
}

pub struct Router {
    id: Uuid,
    options: RouterOptions,
    graph: Arc<SceneGraph>,
    state: Arc<NavigationState>,
    reducer: Box<dyn Reducer>,
    bridge: DispatchBridge,
    observer: Option<Box<dyn ActionObserver>>,
    queue_tx: Sender<RawAction>,
    queue_rx: Receiver<RawAction>,
    rejected: Vec<(RawAction, ActionError)>,
}

impl Router {
    pub fn new(input: impl Into<SceneInput>, options: RouterOptions) -> Result<Self, ConfigError> {
        let graph = compile(input.into(), &options.compile)?;
        Ok(Self::from_graph(graph, options))
    }

    /// Builds a router around an already compiled graph.
    pub fn from_graph(graph: SceneGraph, options: RouterOptions) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel();
        let state = Arc::new(initial_state(&graph));
        let router = Self {
            id: Uuid::new_v4(),
            reducer: Box::new(NavigationReducer::new(options.tab_back)),
            options,
            graph: Arc::new(graph),
            state,
            bridge: DispatchBridge::new(),
            observer: None,
            queue_tx,
            queue_rx,
            rejected: Vec::new(),
        };
        info!(
            "[router {}] mounted with {} routes, focused on {:?}",
            router.id,
            router.graph.len(),
            router.focused_leaf().map(|l| &l.key)
        );
        router
    }

    pub fn with_reducer(mut self, reducer: impl Reducer + 'static) -> Self {
        self.reducer = Box::new(reducer);
        self
    }

    pub fn with_observer(mut self, observer: impl ActionObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    pub fn graph(&self) -> &Arc<SceneGraph> {
        &self.graph
    }

    pub fn state(&self) -> &Arc<NavigationState> {
        &self.state
    }

    pub fn route(&self, key: &str) -> Option<&Route> {
        self.graph.route(key)
    }

    /// Looks up a mounted node anywhere in the current state.
    pub fn get(&self, key: &str) -> Option<NodeRef<'_>> {
        resolver::find(&self.state, key)
    }

    pub fn focused_leaf(&self) -> Option<&LeafRoute> {
        resolver::focused_leaf(&self.state)
    }

    /// A handle for enqueueing actions from observers or callbacks. Queued
    /// actions run after the dispatch in progress, in the order sent.
    pub fn sender(&self) -> Sender<RawAction> {
        self.queue_tx.clone()
    }

    /// Rebuilds the graph and resets to its initial state. On error the
    /// router keeps its previous graph and state.
    pub fn reconfigure(&mut self, input: impl Into<SceneInput>) -> Result<(), ConfigError> {
        let graph = compile(input.into(), &self.options.compile)?;
        self.state = Arc::new(initial_state(&graph));
        self.graph = Arc::new(graph);
        info!("[router {}] reconfigured with {} routes", self.id, self.graph.len());
        Ok(())
    }

    pub fn dispatch(&mut self, raw: RawAction) -> Result<Dispatched, ActionError> {
        self.drain_queue();
        let result = self.process(raw);
        self.drain_queue();
        result
    }

    /// Runs every queued action now instead of waiting for the next dispatch.
    pub fn flush(&mut self) {
        self.drain_queue();
    }

    /// Queued actions the reducer rejected since the last call, oldest first.
    pub fn take_rejected(&mut self) -> Vec<(RawAction, ActionError)> {
        std::mem::take(&mut self.rejected)
    }

    pub fn apply(&mut self, action: Action) -> Result<Dispatched, ActionError> {
        self.dispatch(action.to_raw())
    }

    /// Navigates to `key` using the scene's default action type.
    pub fn navigate(&mut self, key: &str, props: Props) -> Result<Dispatched, ActionError> {
        let kind = self
            .route(key)
            .map(|r| r.action)
            .ok_or_else(|| ActionError::UnknownKey(key.to_string()))?;
        self.apply(Action::new(kind, Some(key.to_string()), props))
    }

    fn process(&mut self, raw: RawAction) -> Result<Dispatched, ActionError> {
        let Self {
            id,
            graph,
            state,
            reducer,
            bridge,
            observer,
            ..
        } = self;
        let (id, graph) = (*id, &**graph);

        bridge.forward(raw, observer.as_deref(), |raw| {
            let Some(action) = Action::from_raw(raw) else {
                warn!("[router {}] ignoring unknown action type {}", id, raw.action_type);
                return Ok(Dispatched::Ignored);
            };
            debug!("[router {}] dispatch {} {:?}", id, action.kind, action.key);

            match reducer.reduce(graph, &**state, &action)? {
                Transition::Updated(next) => {
                    *state = Arc::new(next);
                    Ok(Dispatched::Updated)
                }
                Transition::Unchanged => Ok(Dispatched::Unchanged),
                Transition::Exhausted => {
                    info!("[router {}] {} exhausted the navigation stack", id, action.kind);
                    Ok(Dispatched::Exhausted)
                }
            }
        })
    }

    fn drain_queue(&mut self) {
        while let Ok(raw) = self.queue_rx.try_recv() {
            debug!("[router {}] running queued {}", self.id, raw.action_type);
            if let Err(e) = self.process(raw.clone()) {
                warn!("[router {}] queued action rejected: {}", self.id, e);
                self.rejected.push((raw, e));
            }
        }
    }
}
