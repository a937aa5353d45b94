//! Explicit session state for the signed-in user.
//!
//! Constructed once by the host and passed by reference to whatever needs
//! it; there is no process-wide instance.

use tracing::info;

use crate::types::UserRecord;

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current_user: Option<UserRecord>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&mut self, user: UserRecord) {
        info!(id = %user.id, username = %user.username, "session started");
        self.current_user = Some(user);
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.current_user.take() {
            info!(id = %user.id, "session ended");
        }
    }

    pub fn current_user(&self) -> Option<&UserRecord> {
        self.current_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}
