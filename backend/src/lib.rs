//! # Todo Service
//!
//! CRUD HTTP API for users, todos and statuses with validation, soft
//! delete and a uniform `{status, message}` error envelope.
//!
//! ## Architecture
//!
//! - [`models`]: Resource field sets, validation rules and partial-update merge
//! - [`db`]: Repository traits with in-memory and Postgres (Diesel) backends
//! - [`http`]: Axum router, generic handlers and error mapping
//! - [`config`]: Process settings from the environment

// RepositoryError carries context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod http;
pub mod models;
