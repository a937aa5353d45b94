//! Create-user controller: Idle -> Submitting -> {Succeeded | Failed}.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::client::UserApi;
use crate::types::{UserCreateInput, UserRecord};

/// Observable state of a create-user submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateUserState {
    pub is_loading: bool,
    pub error: Option<String>,
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl CreateUserState {
    pub fn phase(&self) -> SubmitPhase {
        if self.is_loading {
            SubmitPhase::Submitting
        } else if self.success {
            SubmitPhase::Succeeded
        } else if self.error.is_some() {
            SubmitPhase::Failed
        } else {
            SubmitPhase::Idle
        }
    }
}

pub struct CreateUserController<A: ?Sized> {
    api: Arc<A>,
    state: watch::Sender<CreateUserState>,
}

impl<A: UserApi + ?Sized> CreateUserController<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (state, _) = watch::channel(CreateUserState::default());
        Self { api, state }
    }

    pub fn state(&self) -> CreateUserState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> SubmitPhase {
        self.state.borrow().phase()
    }

    pub fn subscribe(&self) -> watch::Receiver<CreateUserState> {
        self.state.subscribe()
    }

    /// Submit `input` and return the created record, or `None` on failure.
    ///
    /// Failures are never returned to the caller; they land in
    /// `state().error`. Every call restarts the cycle from Submitting,
    /// whatever the previous outcome was.
    pub async fn submit(&self, input: UserCreateInput) -> Option<UserRecord> {
        self.state.send_replace(CreateUserState {
            is_loading: true,
            error: None,
            success: false,
        });
        debug!(username = %input.username, "submitting new user");

        match self.api.create_user(input).await {
            Ok(record) => {
                self.state.send_replace(CreateUserState {
                    is_loading: false,
                    error: None,
                    success: true,
                });
                info!(id = %record.id, "create-user submission succeeded");
                Some(record)
            }
            Err(err) => {
                self.state.send_replace(CreateUserState {
                    is_loading: false,
                    error: Some(err.message),
                    success: false,
                });
                None
            }
        }
    }
}

impl<A: ?Sized> std::fmt::Debug for CreateUserController<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserController")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;

    use super::*;
    use crate::controller::testing::{record, FakeApi};
    use crate::error::ServiceError;

    fn input() -> UserCreateInput {
        UserCreateInput {
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password: Some("correct-horse".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn starts_idle() {
        let controller = CreateUserController::new(Arc::new(FakeApi::default()));
        assert_eq!(controller.state(), CreateUserState::default());
        assert_eq!(controller.phase(), SubmitPhase::Idle);
    }

    #[tokio::test]
    async fn loading_while_pending_then_success() {
        let (release, gate) = oneshot::channel();
        let api = FakeApi::default().with_create(Ok(record("1", "jdoe"))).gated(gate);
        let controller = CreateUserController::new(Arc::new(api));
        let mut observed = controller.subscribe();

        let watcher = async {
            let state = observed.wait_for(|s| s.is_loading).await.unwrap().clone();
            assert_eq!(state.error, None);
            assert!(!state.success);
            release.send(()).unwrap();
        };
        let (created, ()) = tokio::join!(controller.submit(input()), watcher);

        assert_eq!(created, Some(record("1", "jdoe")));
        assert_eq!(
            controller.state(),
            CreateUserState {
                is_loading: false,
                error: None,
                success: true,
            }
        );
        assert_eq!(controller.phase(), SubmitPhase::Succeeded);
    }

    #[tokio::test]
    async fn failure_is_stored_not_returned() {
        let api = FakeApi::default().with_create(Err(ServiceError::new("Username 'jdoe' already exists.")));
        let controller = CreateUserController::new(Arc::new(api));

        let created = controller.submit(input()).await;

        assert_eq!(created, None);
        let state = controller.state();
        assert!(!state.is_loading);
        assert!(!state.success);
        assert_eq!(state.error.as_deref(), Some("Username 'jdoe' already exists."));
        assert_eq!(controller.phase(), SubmitPhase::Failed);
    }

    #[tokio::test]
    async fn resubmit_clears_previous_error() {
        let api = FakeApi::default()
            .with_create(Err(ServiceError::new("Network Error")))
            .with_create(Ok(record("7", "jdoe")));
        let controller = CreateUserController::new(Arc::new(api));

        assert_eq!(controller.submit(input()).await, None);
        assert_eq!(controller.phase(), SubmitPhase::Failed);

        let created = controller.submit(input()).await.unwrap();
        assert_eq!(created.id, "7");
        assert_eq!(controller.state().error, None);
        assert!(controller.state().success);
    }

    #[tokio::test]
    async fn input_reaches_the_api_unchanged() {
        let api = Arc::new(FakeApi::default().with_create(Ok(record("1", "jdoe"))));
        let controller = CreateUserController::new(api.clone());
        controller.submit(input()).await;
        assert_eq!(*api.create_inputs.lock().unwrap(), vec![input()]);
    }
}
