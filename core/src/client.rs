//! User API client: request building, response parsing, and the async
//! operations controllers call.
//!
//! # Design
//! `UserClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`, so
//! the I/O boundary stays explicit and testable without a network.
//!
//! `HttpUserApi` joins a `UserClient` to a `Transport` and implements
//! `UserApi`. Each call is exactly one round trip: no retries, no caching, no
//! timeout override. Every failure is collapsed into a single message (server
//! message, then transport message, then a per-operation fallback).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{error, info};

use crate::config::ClientConfig;
use crate::error::{ApiError, ServiceError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, Transport};
use crate::types::{ErrorBody, UserCreateInput, UserRecord};

pub const CREATE_USER_FALLBACK: &str = "An unknown error occurred during user creation.";
pub const LIST_USERS_FALLBACK: &str = "An unknown error occurred while fetching users.";
pub const GET_USER_FALLBACK: &str = "An unknown error occurred while fetching user by ID.";

/// Stateless request builder and response parser for the users resource.
#[derive(Debug, Clone)]
pub struct UserClient {
    base_url: String,
}

impl UserClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_create_user(&self, input: &UserCreateInput) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Unknown(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/users", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_list_users(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/users", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_user(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/users/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_create_user(&self, response: HttpResponse) -> Result<UserRecord, ApiError> {
        parse_json(response)
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Vec<UserRecord>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<UserRecord, ApiError> {
        parse_json(response)
    }
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Unknown(e.to_string()))
}

/// Map a non-2xx response to the matching `ApiError` variant.
///
/// The error body is decoded on a best-effort basis; a body that is not the
/// server's JSON envelope still yields an `Http` error with no message.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let envelope: ErrorBody = serde_json::from_str(&response.body).unwrap_or_default();
    match envelope.validation_errors {
        Some(fields) if response.status == 400 && !fields.is_empty() => Err(ApiError::Validation {
            message: envelope.message,
            fields,
        }),
        _ => Err(ApiError::Http {
            status: response.status,
            message: envelope.message,
            body: response.body.clone(),
        }),
    }
}

/// The three user operations as seen by controllers.
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn create_user(&self, input: UserCreateInput) -> Result<UserRecord, ServiceError>;
    async fn list_users(&self) -> Result<Vec<UserRecord>, ServiceError>;
    async fn get_user_by_id(&self, id: &str) -> Result<UserRecord, ServiceError>;
}

/// `UserApi` over a real transport.
#[derive(Debug, Clone)]
pub struct HttpUserApi<T> {
    client: UserClient,
    transport: T,
}

impl HttpUserApi<HttpTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(&config.base_url, transport))
    }
}

impl<T: Transport> HttpUserApi<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: UserClient::new(base_url),
            transport,
        }
    }

    pub fn client(&self) -> &UserClient {
        &self.client
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        Ok(self.transport.execute(request).await?)
    }
}

fn normalize(operation: &str, err: ApiError, fallback: &str) -> ServiceError {
    let message = err.user_message(fallback);
    error!(operation, error = %err, "{message}");
    ServiceError::new(message)
}

#[async_trait]
impl<T: Transport> UserApi for HttpUserApi<T> {
    async fn create_user(&self, input: UserCreateInput) -> Result<UserRecord, ServiceError> {
        let result: Result<UserRecord, ApiError> = async {
            let request = self.client.build_create_user(&input)?;
            let response = self.send(request).await?;
            self.client.parse_create_user(response)
        }
        .await;

        match result {
            Ok(record) => {
                info!(id = %record.id, username = %record.username, "user created");
                Ok(record)
            }
            Err(err) => Err(normalize("create_user", err, CREATE_USER_FALLBACK)),
        }
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, ServiceError> {
        let response = self.send(self.client.build_list_users()).await;
        response
            .and_then(|r| self.client.parse_list_users(r))
            .map_err(|err| normalize("list_users", err, LIST_USERS_FALLBACK))
    }

    async fn get_user_by_id(&self, id: &str) -> Result<UserRecord, ServiceError> {
        let response = self.send(self.client.build_get_user(id)).await;
        response
            .and_then(|r| self.client.parse_get_user(r))
            .map_err(|err| normalize("get_user_by_id", err, GET_USER_FALLBACK))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    fn client() -> UserClient {
        UserClient::new("http://localhost:8080/api/v1")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    const RECORD: &str = r#"{"id":"1","username":"jdoe","email":"jdoe@example.com","active":true,
        "createdAt":"2025-05-06T10:20:30Z","updatedAt":"2025-05-06T10:20:30Z"}"#;

    /// Replays canned transport outcomes and records the requests it saw.
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn new(outcomes: Vec<Result<HttpResponse, TransportError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            self.outcomes.lock().unwrap().pop_front().expect("no scripted outcome left")
        }
    }

    fn api(outcomes: Vec<Result<HttpResponse, TransportError>>) -> HttpUserApi<ScriptedTransport> {
        HttpUserApi::new("http://localhost:8080/api/v1", ScriptedTransport::new(outcomes))
    }

    #[test]
    fn build_create_user_produces_correct_request() {
        let input = UserCreateInput {
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password: Some("correct-horse".to_string()),
            ..Default::default()
        };
        let req = client().build_create_user(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8080/api/v1/users");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["username"], "jdoe");
        assert_eq!(body["password"], "correct-horse");
        assert!(body.get("firstName").is_none());
    }

    #[test]
    fn build_list_and_get_requests() {
        let req = client().build_list_users();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8080/api/v1/users");
        assert!(req.body.is_none());

        let req = client().build_get_user("abc-123");
        assert_eq!(req.path, "http://localhost:8080/api/v1/users/abc-123");
        assert!(req.headers.is_empty());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let req = UserClient::new("http://localhost:8080/api/v1/").build_list_users();
        assert_eq!(req.path, "http://localhost:8080/api/v1/users");
    }

    #[test]
    fn parse_create_accepts_201() {
        let user = client().parse_create_user(response(201, RECORD)).unwrap();
        assert_eq!(user.id, "1");
        assert!(user.active);
    }

    #[test]
    fn parse_conflict_keeps_server_message() {
        let err = client()
            .parse_create_user(response(409, r#"{"status":409,"message":"Username 'jdoe' already exists."}"#))
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Username 'jdoe' already exists."));
        assert!(matches!(err, ApiError::Http { status: 409, .. }));
    }

    #[test]
    fn parse_bad_request_with_field_map_is_validation() {
        let body = r#"{"status":400,"message":"Validation failed","validationErrors":{"email":"Email should be valid"}}"#;
        let err = client().parse_create_user(response(400, body)).unwrap_err();
        match err {
            ApiError::Validation { message, fields } => {
                assert_eq!(message.as_deref(), Some("Validation failed"));
                assert_eq!(fields["email"], "Email should be valid");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn parse_get_not_found_with_plain_body() {
        let err = client().parse_get_user(response(404, "Not Found")).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn parse_list_bad_json() {
        let err = client().parse_list_users(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Unknown(_)));
    }

    #[tokio::test]
    async fn create_user_surfaces_server_message() {
        let api = api(vec![Ok(response(409, r#"{"message":"Email 'a@b.co' already exists."}"#))]);
        let err = api.create_user(UserCreateInput::default()).await.unwrap_err();
        assert_eq!(err.message, "Email 'a@b.co' already exists.");
    }

    #[tokio::test]
    async fn list_users_reports_network_error() {
        let api = api(vec![Err(TransportError::Network("connection refused".to_string()))]);
        let err = api.list_users().await.unwrap_err();
        assert_eq!(err.message, "Network Error");
    }

    #[tokio::test]
    async fn get_user_falls_back_when_nothing_is_known() {
        let api = api(vec![Err(TransportError::Setup(String::new()))]);
        let err = api.get_user_by_id("1").await.unwrap_err();
        assert_eq!(err.message, GET_USER_FALLBACK);
    }

    #[tokio::test]
    async fn each_call_is_a_single_round_trip() {
        let api = api(vec![Ok(response(500, "")), Ok(response(200, &format!("[{RECORD}]")))]);
        let err = api.list_users().await.unwrap_err();
        assert_eq!(err.message, "Request failed with status code 500");
        assert_eq!(api.transport.seen.lock().unwrap().len(), 1);

        let users = api.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(api.transport.seen.lock().unwrap().len(), 2);
    }
}
