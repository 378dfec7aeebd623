pub mod auth;
pub mod errors;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;

pub use server::{ServerConfig, issue_token, list_tokens, provision_user, revoke_token, serve};
