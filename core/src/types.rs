//! User DTOs exchanged with the user-management backend.
//!
//! # Design
//! These types mirror the backend's JSON schema (camelCase keys) but are
//! defined independently from the mock-server crate; integration tests catch
//! any schema drift between the two. Optional input fields are omitted from
//! the serialized body when `None`, so "no password change" means "no
//! `password` key", never an empty string.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload for creating a user, or for editing one through the shared form.
///
/// `password` is required by the backend on creation and must be left out
/// entirely when an edit does not change it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateInput {
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Payload for updating a user's profile. Carries no password.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateInput {
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl From<UserCreateInput> for UserUpdateInput {
    fn from(input: UserCreateInput) -> Self {
        Self {
            username: input.username,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            phone_number: input.phone_number,
        }
    }
}

/// A user as reported by the server.
///
/// `id`, `created_at` and `updated_at` are assigned by the server and are
/// never produced client-side. There is deliberately no password field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

/// Error envelope returned by the backend on non-2xx responses.
///
/// Every field is optional: proxies and older servers return partial bodies
/// (or none at all), and decoding must never fail because of that.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub validation_errors: Option<BTreeMap<String, String>>,
}
