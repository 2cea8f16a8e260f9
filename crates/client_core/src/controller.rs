//! View state for the meal list and per-id detail lookups.
//!
//! State lives behind a plain mutex that is never held across an `.await`, so
//! selection actions stay synchronous while detail fetches run as tokio tasks.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::sort_by_title;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    state::{AsyncState, DetailState, ListState},
    MealClient,
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Emitted after every state assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    ListChanged(ListState),
    DetailChanged { id: String, state: DetailState },
    SelectionChanged(Option<String>),
}

struct InflightDetail {
    ticket: u64,
    task: JoinHandle<()>,
}

struct ControllerState {
    list: ListState,
    details: HashMap<String, DetailState>,
    selection: Option<String>,
    inflight_details: HashMap<String, InflightDetail>,
    next_ticket: u64,
}

pub struct MealsController {
    client: Arc<dyn MealClient>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl MealsController {
    pub fn new(client: Arc<dyn MealClient>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            client,
            inner: Mutex::new(ControllerState {
                list: AsyncState::Loading,
                details: HashMap::new(),
                selection: None,
                inflight_details: HashMap::new(),
                next_ticket: 0,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ControllerEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    fn set_list(&self, list: ListState) {
        let mut state = self.lock_state();
        state.list = list.clone();
        self.emit(ControllerEvent::ListChanged(list));
    }

    /// Loads the list, sorted by title. Concurrent calls are not coordinated;
    /// whichever fetch finishes last decides the final state.
    pub async fn on_start(&self) {
        self.set_list(AsyncState::Loading);
        debug!("loading meal list");

        let list = match self.client.fetch_list().await {
            Ok(mut items) => {
                sort_by_title(&mut items);
                info!(count = items.len(), "meal list loaded");
                AsyncState::Loaded(items)
            }
            Err(err) => {
                warn!(error = %err, "meal list failed to load");
                AsyncState::Failed(err)
            }
        };
        self.set_list(list);
    }

    pub async fn on_retry_list(&self) {
        self.on_start().await;
    }

    /// Selects `id` and starts a fresh detail fetch for it, even when the
    /// cached entry is already loaded. A fetch still running for the same id
    /// is aborted and its result discarded.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_select(self: &Arc<Self>, id: impl Into<String>) {
        let id = id.into();
        let mut state = self.lock_state();

        state.selection = Some(id.clone());
        self.emit(ControllerEvent::SelectionChanged(Some(id.clone())));

        state.details.insert(id.clone(), AsyncState::Loading);
        self.emit(ControllerEvent::DetailChanged {
            id: id.clone(),
            state: AsyncState::Loading,
        });

        if let Some(previous) = state.inflight_details.remove(&id) {
            debug!(%id, ticket = previous.ticket, "aborting superseded detail fetch");
            previous.task.abort();
        }

        state.next_ticket += 1;
        let ticket = state.next_ticket;
        let controller = Arc::clone(self);
        let task_id = id.clone();
        let task = tokio::spawn(async move {
            controller.run_detail_fetch(task_id, ticket).await;
        });
        state
            .inflight_details
            .insert(id, InflightDetail { ticket, task });
    }

    async fn run_detail_fetch(&self, id: String, ticket: u64) {
        debug!(%id, ticket, "loading meal detail");
        let result = self.client.fetch_detail(&id).await;

        let mut state = self.lock_state();
        let is_current = state
            .inflight_details
            .get(&id)
            .is_some_and(|inflight| inflight.ticket == ticket);
        if !is_current {
            debug!(%id, ticket, "discarding stale detail result");
            return;
        }
        state.inflight_details.remove(&id);

        let detail = match result {
            Ok(detail) => {
                info!(%id, title = %detail.title, "meal detail loaded");
                AsyncState::Loaded(detail)
            }
            Err(err) => {
                warn!(%id, error = %err, "meal detail failed to load");
                AsyncState::Failed(err)
            }
        };
        state.details.insert(id.clone(), detail.clone());
        self.emit(ControllerEvent::DetailChanged { id, state: detail });
    }

    /// Clears the cursor. Cached entries and running fetches are left alone.
    pub fn on_deselect(&self) {
        let mut state = self.lock_state();
        if state.selection.take().is_some() {
            self.emit(ControllerEvent::SelectionChanged(None));
        }
    }

    /// Refetches the selected id. Returns `false` when nothing is selected.
    pub fn on_retry_detail(self: &Arc<Self>) -> bool {
        let Some(id) = self.selection() else {
            return false;
        };
        self.on_select(id);
        true
    }

    pub fn list_state(&self) -> ListState {
        self.lock_state().list.clone()
    }

    pub fn selection(&self) -> Option<String> {
        self.lock_state().selection.clone()
    }

    pub fn detail_state(&self, id: &str) -> Option<DetailState> {
        self.lock_state().details.get(id).cloned()
    }

    pub fn current_detail_state(&self) -> Option<DetailState> {
        let state = self.lock_state();
        state
            .selection
            .as_ref()
            .and_then(|id| state.details.get(id))
            .cloned()
    }

    pub fn is_detail_inflight(&self, id: &str) -> bool {
        self.lock_state().inflight_details.contains_key(id)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
