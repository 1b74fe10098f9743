//! Generic CRUD routes over every declared resource type.
//!
//! Reads are public. Writes need a bearer token and are logged with the
//! token subject.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::assets::read_file;
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};
use campus_core::catalog;
use campus_core::resource::{Record, key_from_json};

/// Read-only routes.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/resources/{resource}", get(list_or_get))
        .route("/resources/{resource}/{id}", get(get_one))
}

/// Mutating routes; mounted behind the access gate.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/resources/{resource}",
            axum::routing::post(create)
                .put(update_from_body)
                .delete(delete_by_query),
        )
        .route(
            "/resources/{resource}/{id}",
            axum::routing::patch(update).delete(delete_one),
        )
        .route(
            "/resources/{resource}/{id}/assets/{field}",
            put(replace_asset),
        )
}

/// `?id=` selector for the collection path.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    /// Record id.
    pub id: Option<String>,
}

/// Acknowledgement body for deletes.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Always `true`; failures are reported as errors.
    pub success: bool,
}

/// `GET /resources/{resource}`: one record with `?id=`, otherwise a list.
async fn list_or_get(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(mut params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let def = catalog::lookup(&resource)?;

    if let Some(id) = params.remove("id") {
        let record = state.resources.get(def, &id).await?;
        return Ok(Json(Value::Object(record)));
    }

    let records = state.resources.list(def, &params).await?;
    Ok(Json(Value::Array(
        records.into_iter().map(Value::Object).collect(),
    )))
}

async fn get_one(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Json<Record>> {
    let def = catalog::lookup(&resource)?;
    let record = state.resources.get(def, &id).await?;
    Ok(Json(record))
}

async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Record>)> {
    let def = catalog::lookup(&resource)?;
    let record = state.resources.create(def, &body).await?;

    info!(resource = def.name, subject = user.subject(), "Create requested");
    Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /resources/{resource}` with the id carried in the body.
async fn update_from_body(
    State(state): State<AppState>,
    user: AuthUser,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Record>> {
    let def = catalog::lookup(&resource)?;
    let raw_id = body
        .get(def.key.name)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ApiError::validation(format!("'{}' is required", def.key.name)))?;
    let key = key_from_json(def, raw_id)?;

    let record = state.resources.update(def, &key.to_string(), &body).await?;
    info!(resource = def.name, id = %key, subject = user.subject(), "Update requested");
    Ok(Json(record))
}

async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path((resource, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Record>> {
    let def = catalog::lookup(&resource)?;
    let record = state.resources.update(def, &id, &body).await?;

    info!(resource = def.name, id = %id, subject = user.subject(), "Update requested");
    Ok(Json(record))
}

async fn delete_by_query(
    State(state): State<AppState>,
    user: AuthUser,
    Path(resource): Path<String>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<DeleteResponse>> {
    let def = catalog::lookup(&resource)?;
    let id = query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::validation("'id' query parameter is required"))?;

    remove(&state, &user, def, &id).await
}

async fn delete_one(
    State(state): State<AppState>,
    user: AuthUser,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Json<DeleteResponse>> {
    let def = catalog::lookup(&resource)?;
    remove(&state, &user, def, &id).await
}

async fn remove(
    state: &AppState,
    user: &AuthUser,
    def: &'static campus_core::resource::ResourceDefinition,
    id: &str,
) -> ApiResult<Json<DeleteResponse>> {
    state.resources.delete(def, id).await?;

    info!(resource = def.name, id = %id, subject = user.subject(), "Delete requested");
    Ok(Json(DeleteResponse { success: true }))
}

/// `PUT /resources/{resource}/{id}/assets/{field}`: multipart `file`.
async fn replace_asset(
    State(state): State<AppState>,
    user: AuthUser,
    Path((resource, id, field)): Path<(String, String, String)>,
    multipart: Multipart,
) -> ApiResult<Json<Record>> {
    let def = catalog::lookup(&resource)?;
    let upload = read_file(multipart).await?;
    let file = upload
        .file
        .ok_or_else(|| ApiError::validation("multipart field 'file' is required"))?;

    let record = state.resources.replace_asset(def, &id, &field, file).await?;
    info!(
        resource = def.name,
        id = %id,
        field = %field,
        subject = user.subject(),
        "Asset replacement requested"
    );
    Ok(Json(record))
}
