//! Typed access to the reminder backend's HTTP surface.
//!
//! [`ApiClient`] is the request wrapper: it resolves URLs against the
//! configured base URL, injects auth headers and normalizes failures into
//! [`ApiError`]. The sibling modules add one method per endpoint.

mod admin;
mod billing;
mod calendar;
mod chat;
mod client;
mod error;
mod memories;
mod reminders;
mod speech;
mod system;
mod types;
mod users;

pub use client::*;
pub use error::*;
pub use speech::AudioUpload;
pub use types::*;
