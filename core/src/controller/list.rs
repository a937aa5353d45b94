//! List-users controller: Loading -> {Loaded | Failed}.
//!
//! # Design
//! State starts in Loading because the hosting page calls `load()` as soon
//! as it activates. A failed load discards whatever was loaded before.
//!
//! Each `load()` takes a generation ticket. `deactivate()` and any newer
//! `load()` advance the generation, and a response that arrives holding an
//! outdated ticket is dropped. This keeps a page that has gone away, or a
//! superseded reload, from overwriting fresher state. Requests themselves are
//! never cancelled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::client::UserApi;
use crate::types::UserRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListUsersState {
    pub users: Vec<UserRecord>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for ListUsersState {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            is_loading: true,
            error: None,
        }
    }
}

pub struct ListUsersController<A: ?Sized> {
    api: Arc<A>,
    state: watch::Sender<ListUsersState>,
    generation: AtomicU64,
}

impl<A: UserApi + ?Sized> ListUsersController<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (state, _) = watch::channel(ListUsersState::default());
        Self {
            api,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> ListUsersState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListUsersState> {
        self.state.subscribe()
    }

    /// Fetch every user and replace the collection wholesale.
    pub async fn load(&self) {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let result = self.api.list_users().await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "discarding stale user list response");
            return;
        }

        match result {
            Ok(users) => {
                debug!(count = users.len(), "user list loaded");
                self.state.send_modify(|state| {
                    state.users = users;
                    state.is_loading = false;
                });
            }
            Err(err) => {
                self.state.send_modify(|state| {
                    state.users = Vec::new();
                    state.error = Some(err.message);
                    state.is_loading = false;
                });
            }
        }
    }

    /// Re-enter Loading from either terminal state.
    pub async fn reload(&self) {
        self.load().await
    }

    /// Ignore any response still in flight. Called when the page goes away.
    pub fn deactivate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl<A: ?Sized> std::fmt::Debug for ListUsersController<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListUsersController")
            .field("state", &*self.state.borrow())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
