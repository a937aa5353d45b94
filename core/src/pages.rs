//! Page composition: the create page and the list page.
//!
//! # Design
//! A page wires one controller to its presentation collaborators. Navigation
//! and alerts are traits the host implements (a router, a terminal, a test
//! double); pages never render anything themselves. The list page runs its
//! load once per activation, and `deactivate` is its unmount hook.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::client::UserApi;
use crate::controller::{CreateUserController, ListUsersController, ListUsersState};
use crate::error::ValidationErrors;
use crate::form::UserForm;
use crate::types::UserRecord;
use crate::view::UserRow;

pub const USERS_PATH: &str = "/users";
pub const CREATE_USER_PATH: &str = "/users/create";

pub const ADMIN_HINT: &str = "This page requires ADMIN privileges. If you are not logged in as an admin, \
or if there's a network issue, this error will appear.";

/// Imperative "go to path".
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// One-shot user-facing notice.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("{action} is not implemented (user {username}, id {id})")]
    NotImplemented {
        action: &'static str,
        id: String,
        username: String,
    },
}

pub struct CreateUserPage<A: ?Sized> {
    controller: CreateUserController<A>,
    form: UserForm,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl<A: UserApi + ?Sized> CreateUserPage<A> {
    pub const TITLE: &'static str = "Create New User";

    pub fn new(api: Arc<A>, navigator: Arc<dyn Navigator>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            controller: CreateUserController::new(api),
            form: UserForm::create(),
            navigator,
            notifier,
        }
    }

    pub fn title(&self) -> &'static str {
        Self::TITLE
    }

    pub fn form(&self) -> &UserForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut UserForm {
        &mut self.form
    }

    pub fn controller(&self) -> &CreateUserController<A> {
        &self.controller
    }

    /// Validate the form and, if valid, submit it.
    ///
    /// On success the user is told and sent to the list; on failure the
    /// page stays where it is and the form shows the controller's error.
    pub async fn handle_submit(&mut self) -> Result<Option<UserRecord>, ValidationErrors> {
        let Some(input) = self.form.submit()? else {
            return Ok(None);
        };

        self.form.is_loading = true;
        self.form.error = None;
        let created = self.controller.submit(input).await;
        self.form.apply_state(&self.controller.state());

        if let Some(user) = &created {
            self.notifier
                .notify(&format!("User \"{}\" created successfully!", user.username));
            self.navigator.navigate(USERS_PATH);
        }
        Ok(created)
    }
}

/// What the list page should show right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Loading,
    Failed { message: String, hint: &'static str },
    Empty,
    Table(Vec<UserRow>),
}

impl From<&ListUsersState> for ListView {
    fn from(state: &ListUsersState) -> Self {
        if state.is_loading {
            ListView::Loading
        } else if let Some(message) = &state.error {
            ListView::Failed {
                message: message.clone(),
                hint: ADMIN_HINT,
            }
        } else if state.users.is_empty() {
            ListView::Empty
        } else {
            ListView::Table(state.users.iter().map(UserRow::from_record).collect())
        }
    }
}

pub struct UserListPage<A: ?Sized> {
    controller: ListUsersController<A>,
    notifier: Arc<dyn Notifier>,
    active: AtomicBool,
}

impl<A: UserApi + ?Sized> UserListPage<A> {
    pub const TITLE: &'static str = "User List";

    pub fn new(api: Arc<A>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            controller: ListUsersController::new(api),
            notifier,
            active: AtomicBool::new(false),
        }
    }

    pub fn title(&self) -> &'static str {
        Self::TITLE
    }

    pub fn controller(&self) -> &ListUsersController<A> {
        &self.controller
    }

    /// Mount hook. Loads the list once; repeated calls while active do nothing.
    pub async fn activate(&self) {
        if self.active.swap(true, Ordering::SeqCst) {
            return;
        }
        self.controller.load().await;
    }

    /// Unmount hook.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.controller.deactivate();
    }

    pub fn view(&self) -> ListView {
        ListView::from(&self.controller.state())
    }

    pub fn create_path(&self) -> &'static str {
        CREATE_USER_PATH
    }

    /// Delete is not wired to the backend. The user is told so, the caller
    /// gets `NotImplemented`, and no request is made.
    pub fn delete_user(&self, id: &str, username: &str) -> Result<(), PageError> {
        warn!(id, username, "delete requested but not implemented");
        self.notifier.notify(&format!(
            "Delete is not implemented yet for user: {username} (ID: {id})"
        ));
        Err(PageError::NotImplemented {
            action: "delete",
            id: id.to_string(),
            username: username.to_string(),
        })
    }
}
