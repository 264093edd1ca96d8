//! HTTP handlers for the record resource
//!
//! One generic handler set serves every record kind; the `{kind}` path
//! segment is resolved against the configured [`ResourceKind`]s. Status
//! mapping follows the historical API surface: the public lookup is the only
//! route that reports a missing record as 404 — on the protected routes a
//! missing id surfaces as a 500 persistence error.

use crate::core::error::ApiError;
use crate::core::record::{CreateRecord, UpdateRecord};
use crate::core::resource::ResourceKind;
use crate::core::store::StoreError;
use crate::core::{Identity, Record};
use crate::server::AppState;
use crate::server::extract::ValidatedJson;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

/// Resolve the `{kind}` path segment; unknown kinds are a 404.
fn resolve_kind(plural: &str) -> Result<&'static ResourceKind, ApiError> {
    ResourceKind::resolve(plural)
        .ok_or_else(|| ApiError::NotFound(format!("unknown resource '{plural}'")))
}

/// Parse the external id. An unparseable id cannot match any record, so it
/// reports the same way a missing record does on the calling route.
fn parse_id(kind: &ResourceKind, raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::NotFound {
        kind: kind.singular,
        id: raw.to_string(),
    })
}

fn to_wire<T: Serialize>(kind: &ResourceKind, value: &T) -> Result<Value, ApiError> {
    kind.externalize(value).map_err(|e| {
        tracing::error!(kind = kind.singular, error = %e, "failed to serialize response");
        ApiError::Internal
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// POST /api/{kind} — create a record for the authenticated caller.
pub async fn create_record(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    identity: Identity,
    ValidatedJson(body): ValidatedJson<CreateRecord>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let kind = resolve_kind(&kind)?;

    let record = state
        .store
        .create(kind, body.with_owner(identity.subject_id))
        .await
        .map_err(ApiError::persistence)?;

    tracing::info!(kind = kind.singular, id = %record.id, "record created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("{} saved successfully", capitalize(kind.singular)),
            (kind.singular): to_wire(kind, &record.summary())?,
        })),
    ))
}

/// GET /api/{kind} — list the authenticated caller's records.
pub async fn list_records(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    identity: Identity,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve_kind(&kind)?;

    let summaries = state
        .store
        .list_by_owner(kind, &identity.subject_id)
        .await
        .map_err(ApiError::persistence)?;

    let items = summaries
        .iter()
        .map(|summary| to_wire(kind, summary))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(Value::Array(items)))
}

/// GET /api/{kind}/{id} — fetch one record, authenticated.
///
/// Any lookup failure here, including a missing id, is a 500.
pub async fn get_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    _identity: Identity,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve_kind(&kind)?;

    let record = fetch(&state, kind, &id).await.map_err(ApiError::persistence)?;

    Ok(Json(to_wire(kind, &record)?))
}

/// GET /{kind}/{id} — public single-record view.
///
/// No identity check: possession of the opaque id is the access control.
/// A missing record is a 404 here.
pub async fn get_record_public(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve_kind(&kind)?;

    tracing::debug!(kind = kind.singular, id = %id, "public record fetch");

    let record = fetch(&state, kind, &id).await.map_err(ApiError::lookup)?;

    Ok(Json(to_wire(kind, &record)?))
}

/// PUT /api/{kind}/{id} — shallow-merge update, authenticated.
///
/// Ownership is not checked: any authenticated caller who knows the id may
/// update the record.
pub async fn update_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    _identity: Identity,
    ValidatedJson(body): ValidatedJson<UpdateRecord>,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve_kind(&kind)?;

    let id = parse_id(kind, &id).map_err(ApiError::persistence)?;
    let record = state
        .store
        .update(kind, &id, body)
        .await
        .map_err(ApiError::persistence)?;

    tracing::info!(kind = kind.singular, id = %record.id, "record updated");

    Ok(Json(json!({
        "message": format!("{} updated successfully", capitalize(kind.singular)),
        (kind.singular): to_wire(kind, &record)?,
    })))
}

/// DELETE /api/{kind}/{id} — hard delete, authenticated.
///
/// Ownership is not checked, matching the update route.
pub async fn delete_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    _identity: Identity,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve_kind(&kind)?;

    let id = parse_id(kind, &id).map_err(ApiError::persistence)?;
    state
        .store
        .delete(kind, &id)
        .await
        .map_err(ApiError::persistence)?;

    tracing::info!(kind = kind.singular, id = %id, "record deleted");

    Ok(Json(json!({
        "message": format!("{} deleted successfully", capitalize(kind.singular)),
    })))
}

async fn fetch(state: &AppState, kind: &ResourceKind, raw_id: &str) -> Result<Record, StoreError> {
    let id = parse_id(kind, raw_id)?;
    state.store.get_by_id(kind, &id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("consultation"), "Consultation");
        assert_eq!(capitalize("survey"), "Survey");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn parse_id_rejects_malformed_id_as_not_found() {
        let err = parse_id(&crate::core::resource::CONSULTATION, "not-a-uuid").unwrap_err();
        assert!(err.is_not_found());
    }
}
