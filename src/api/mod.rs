//! HTTP API: router, handlers, response envelopes, and bearer-token auth

pub mod auth;
pub mod handlers;
pub mod models;
pub mod server;

pub use auth::{AuthUser, Role, TokenVerifier};
pub use server::{build_router, start_http_server, AppState};
