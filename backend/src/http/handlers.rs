//! HTTP handlers for the REST API.
//!
//! The CRUD handlers are generic over the resource field set; the router
//! instantiates them once per resource and [`Stored`] picks the table.
//! Bodies arrive as raw bytes so that parse failures map to the envelope
//! instead of axum's own JSON rejection.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::context::RequestContext;
use super::dto::{Envelope, HealthResponse};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::{EntityRepository, RepositoryError, Stored, RECORD_NOT_FOUND};
use crate::models::{Draft, Entity, Merge, Operation, Patch, Validate};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn table<F: Stored>(state: &AppState) -> &dyn EntityRepository<F> {
    F::repository(state.repository.as_ref())
}

// =============================================================================
// Service
// =============================================================================

/// GET /
pub async fn index() -> Json<Envelope> {
    Json(Envelope::success())
}

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Resource CRUD
// =============================================================================

/// POST /{resource}
pub async fn create<F: Stored>(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Bytes,
) -> HandlerResult<Entity<F>> {
    let draft: Draft<F> = parse_body(&body)?;

    if let Some(message) = draft.fields.validate(Operation::Create) {
        return Err(AppError::BadRequest(message));
    }

    match table::<F>(&state).insert(draft).await {
        Ok(entity) => {
            info!(
                entity = F::NAME,
                id = entity.id,
                user_id = ?ctx.user_id,
                language = %ctx.language,
                "created"
            );
            Ok(Json(entity))
        }
        Err(e) if e.is_constraint_violation() => {
            warn!(entity = F::NAME, error = %e, "duplicate on create");
            Err(AppError::Conflict(format!("Duplicate {}", F::NAME)))
        }
        Err(e) => {
            warn!(entity = F::NAME, error = %e, "create failed");
            Err(AppError::Internal(e.message().to_string()))
        }
    }
}

/// GET /{resource}
pub async fn list<F: Stored>(State(state): State<AppState>) -> HandlerResult<Vec<Entity<F>>> {
    let rows = table::<F>(&state)
        .list()
        .await
        .map_err(|e| internal::<F>("list", e))?;
    debug!(entity = F::NAME, count = rows.len(), "listed");
    Ok(Json(rows))
}

/// GET /{resource}/{id}
pub async fn get<F: Stored>(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> HandlerResult<Entity<F>> {
    let id = parse_id(&raw_id).ok_or_else(|| AppError::NotFound(String::new()))?;

    match table::<F>(&state).find(id).await {
        Ok(entity) => Ok(Json(entity)),
        Err(e) if e.is_not_found() => Err(AppError::NotFound(String::new())),
        Err(e) => Err(internal::<F>("get", e)),
    }
}

/// PUT /{resource}/{id}
///
/// Fields absent from the body (or `null`) keep their stored value. The body
/// must be a JSON object; a bare `null` body changes nothing.
pub async fn update<F: Stored>(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> HandlerResult<Entity<F>> {
    let repo = table::<F>(&state);

    let lookup = match parse_id(&raw_id) {
        Some(id) => repo.find(id).await,
        None => Err(RepositoryError::not_found(RECORD_NOT_FOUND)),
    };
    let mut current =
        lookup.map_err(|e| AppError::NotFound(format!("{} {}", e.message(), raw_id)))?;

    let patch: F = Patch::into_fields(parse_body(&body)?);
    if let Some(message) = patch.validate(Operation::Update) {
        return Err(AppError::BadRequest(message));
    }

    current.fields.merge(patch);

    let updated = repo.update(&current).await.map_err(|e| {
        warn!(entity = F::NAME, id = current.id, error = %e, "update failed");
        AppError::Conflict(e.message().to_string())
    })?;

    info!(
        entity = F::NAME,
        id = updated.id,
        user_id = ?ctx.user_id,
        language = %ctx.language,
        "updated"
    );
    Ok(Json(updated))
}

/// DELETE /{resource}/{id}
pub async fn delete<F: Stored>(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw_id): Path<String>,
) -> HandlerResult<Envelope> {
    let id = parse_id(&raw_id).ok_or_else(|| AppError::NotFound(String::new()))?;

    match table::<F>(&state).soft_delete(id).await {
        Ok(()) => {
            info!(
                entity = F::NAME,
                id,
                user_id = ?ctx.user_id,
                language = %ctx.language,
                "deleted"
            );
            Ok(Json(Envelope::success()))
        }
        Err(e) if e.is_not_found() => Err(AppError::NotFound(String::new())),
        Err(e) => Err(internal::<F>("delete", e)),
    }
}

fn internal<F: Stored>(operation: &str, e: RepositoryError) -> AppError {
    warn!(entity = F::NAME, operation, error = %e, "storage error");
    AppError::Internal(e.message().to_string())
}
