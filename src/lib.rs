pub mod aggregate;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod upstream;

pub use state::{app, AppState};
