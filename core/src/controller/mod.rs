//! Stateful wrappers around user API operations.
//!
//! # Design
//! Each controller owns its state exclusively and publishes it through a
//! `tokio::sync::watch` channel: presentation code either takes a snapshot
//! with `state()` or subscribes and re-renders on change. Controllers know
//! nothing about page lifecycles; the hosting page decides when to call
//! them. There is no internal lock or queue: keeping a second submission
//! from starting while one is pending is the presentation layer's job.

pub mod create;
pub mod list;

pub use create::{CreateUserController, CreateUserState, SubmitPhase};
pub use list::{ListUsersController, ListUsersState};
