//! Display rows for the user table.

use crate::types::UserRecord;

/// One rendered row of the user list. Derived from a record, never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub status: &'static str,
    pub edit_path: String,
    pub delete_label: String,
}

impl UserRow {
    pub const HEADERS: [&'static str; 6] = ["Username", "Email", "Full Name", "Phone", "Status", "Actions"];

    pub fn from_record(user: &UserRecord) -> Self {
        let full_name = format!(
            "{} {}",
            user.first_name.as_deref().unwrap_or_default(),
            user.last_name.as_deref().unwrap_or_default()
        );
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: full_name.trim().to_string(),
            phone: user
                .phone_number
                .as_deref()
                .filter(|p| !p.is_empty())
                .unwrap_or("N/A")
                .to_string(),
            status: if user.active { "Active" } else { "Inactive" },
            edit_path: format!("/users/edit/{}", user.id),
            delete_label: format!("Delete user {}", user.username),
        }
    }
}
