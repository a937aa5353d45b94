use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_PREFIX: &str = "/api/v1";

/// A user as the server reports it. Carries no password.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub roles: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<BTreeMap<String, String>>,
}

type Db = Arc<RwLock<Vec<User>>>;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

pub fn app() -> Router {
    app_with_prefix(DEFAULT_PREFIX)
}

/// Mount the users resource under `prefix` (e.g. `/api/v1`, or `""` for root).
pub fn app_with_prefix(prefix: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    let users = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .with_state(db);

    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        users
    } else {
        Router::new().nest(prefix, users)
    }
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_prefix(listener: TcpListener, prefix: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_prefix(prefix)).await
}

fn error_response(
    status: StatusCode,
    path: &str,
    message: impl Into<String>,
    validation_errors: Option<BTreeMap<String, String>>,
) -> (StatusCode, Json<ErrorResponse>) {
    let body = ErrorResponse {
        timestamp: Utc::now(),
        status: status.as_u16(),
        error: status.canonical_reason().unwrap_or("Error").to_string(),
        message: message.into(),
        path: path.to_string(),
        validation_errors,
    };
    (status, Json(body))
}

/// Field rules matching the production backend's request DTO.
fn validate(input: &CreateUser) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    let len = |s: &str| s.chars().count();

    if input.username.trim().is_empty() {
        errors.insert("username".into(), "Username cannot be blank".into());
    } else if !(3..=100).contains(&len(&input.username)) {
        errors.insert("username".into(), "Username must be between 3 and 100 characters".into());
    }

    if input.email.trim().is_empty() {
        errors.insert("email".into(), "Email cannot be blank".into());
    } else if !input.email.contains('@') {
        errors.insert("email".into(), "Email should be valid".into());
    } else if len(&input.email) > 150 {
        errors.insert("email".into(), "Email cannot exceed 150 characters".into());
    }

    match input.password.as_deref() {
        None | Some("") => {
            errors.insert("password".into(), "Password cannot be blank".into());
        }
        Some(p) if len(p) < 8 => {
            errors.insert("password".into(), "Password must be at least 8 characters long".into());
        }
        Some(_) => {}
    }

    for (key, value, max, label) in [
        ("firstName", &input.first_name, 50, "First name"),
        ("lastName", &input.last_name, 50, "Last name"),
        ("phoneNumber", &input.phone_number, 20, "Phone number"),
    ] {
        if value.as_deref().is_some_and(|v| len(v) > max) {
            errors.insert(key.into(), format!("{label} cannot exceed {max} characters"));
        }
    }
    errors
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    let users = db.read().await;
    info!(count = users.len(), "listing users");
    Json(users.clone())
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<CreateUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let path = "/users";
    let errors = validate(&input);
    if !errors.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, path, "Validation failed", Some(errors)));
    }

    let mut users = db.write().await;
    if users.iter().any(|u| u.username == input.username) {
        let message = format!("Username '{}' already exists.", input.username);
        return Err(error_response(StatusCode::CONFLICT, path, message, None));
    }
    if users.iter().any(|u| u.email == input.email) {
        let message = format!("Email '{}' already exists.", input.email);
        return Err(error_response(StatusCode::CONFLICT, path, message, None));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        username: input.username,
        email: input.email,
        first_name: input.first_name,
        last_name: input.last_name,
        phone_number: input.phone_number,
        active: true,
        created_at: now,
        updated_at: now,
        roles: vec!["USER".to_string()],
    };
    info!(id = %user.id, username = %user.username, "user created");
    users.push(user.clone());
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Json<User>> {
    let users = db.read().await;
    users
        .iter()
        .find(|u| u.id.to_string() == id)
        .map(|u| Json(u.clone()))
        .ok_or_else(|| {
            error_response(
                StatusCode::NOT_FOUND,
                &format!("/users/{id}"),
                format!("User not found with id: {id}"),
                None,
            )
        })
}
