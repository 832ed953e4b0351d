//! HTTP server module.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Body parsing and validation                            │
//! │  - Envelope rendering, CORS, request tracing              │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - LocalRepository / PostgresRepository                   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod context;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use context::RequestContext;
pub use dto::Envelope;
pub use error::AppError;
pub use router::create_router;
pub use state::AppState;
