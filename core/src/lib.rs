//! Client core for the user-management service.
//!
//! # Overview
//! Everything between a page and the REST backend: the user DTOs, the HTTP
//! transport, the user API client, the create/list controllers, the user
//! form, list rows, and page composition. Rendering and routing belong to
//! the host (see the `ums` CLI) and reach in through the `Navigator` and
//! `Notifier` traits.
//!
//! # Design
//! - `UserClient` is stateless and split into `build_*` / `parse_*`, so the
//!   I/O boundary is explicit; `HttpUserApi` pairs it with a `Transport`.
//! - Failures are a typed `ApiError`; controllers only ever see one message.
//! - Controllers publish state through `tokio::sync::watch` and hold no locks.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod http;
pub mod pages;
pub mod session;
pub mod types;
pub mod view;

pub use client::{HttpUserApi, UserApi, UserClient};
pub use config::ClientConfig;
pub use controller::{CreateUserController, CreateUserState, ListUsersController, ListUsersState, SubmitPhase};
pub use error::{ApiError, ServiceError, TransportError, ValidationErrors};
pub use form::{Field, UserForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, Transport};
pub use pages::{CreateUserPage, ListView, Navigator, Notifier, PageError, UserListPage};
pub use session::SessionStore;
pub use types::{ErrorBody, UserCreateInput, UserRecord, UserUpdateInput};
pub use view::UserRow;
