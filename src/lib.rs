//! HTTP service skeleton: env-driven config, a Postgres pool, and HS256 bearer
//! authentication wired into the axum middleware chain.
//!
//! The token codec lives in [`services::auth`], the request gate in
//! [`middleware::auth::access`].

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
