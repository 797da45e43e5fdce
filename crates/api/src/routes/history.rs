//! Browsing history endpoints.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Json,
};
use history_core::{
    product_id_from_body, product_id_from_query, CategoryActivity, Error, HistoryEntry,
};
use serde::Deserialize;
use telemetry::metrics;
use tracing::debug;

use crate::extractors::{AuthContext, HistoryQuery};
use crate::response::{ApiError, ClearResponse, ListResponse, TrackResponse};
use crate::state::AppState;

/// Raw listing query. Parsed by the service so bad values map to VALID_001.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
}

/// Raw clear query.
#[derive(Debug, Default, Deserialize)]
pub struct ClearQuery {
    pub product_id: Option<String>,
}

/// POST /browsing-history/track/ - Record a product view.
///
/// Body: `{"product_id": 5}` (a numeric string is accepted too).
/// Responds 201 with the enriched entry and whether it was newly created.
pub async fn track_handler(
    State(state): State<AppState>,
    auth: AuthContext,
    body: Bytes,
) -> Result<(StatusCode, Json<TrackResponse>), ApiError> {
    let _timer = metrics().request_latency.start();

    let payload: serde_json::Value = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            debug!(error = %e, "Malformed track body");
            Error::invalid_argument("Request body must be valid JSON")
        })?
    };

    let product_id = product_id_from_body(&payload)?;
    let tracked = state.service.track(auth.user_id, product_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(TrackResponse::new(tracked.entry, tracked.created)),
    ))
}

/// GET /browsing-history/?limit=N - Most recently viewed products.
pub async fn list_handler(
    State(state): State<AppState>,
    auth: AuthContext,
    HistoryQuery(query): HistoryQuery<ListQuery>,
) -> Result<Json<ListResponse<HistoryEntry>>, ApiError> {
    let _timer = metrics().request_latency.start();

    let params = state.service.list_params(query.limit.as_deref())?;
    let entries = state.service.list(auth.user_id, &params).await?;

    Ok(Json(entries.into()))
}

/// GET /browsing-history/categories/ - Per-category browsing activity.
pub async fn categories_handler(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ListResponse<CategoryActivity>>, ApiError> {
    let _timer = metrics().request_latency.start();

    let activity = state.service.aggregate_categories(auth.user_id).await?;

    Ok(Json(activity.into()))
}

/// DELETE /browsing-history/clear/?product_id=N - Clear one item or everything.
pub async fn clear_handler(
    State(state): State<AppState>,
    auth: AuthContext,
    HistoryQuery(query): HistoryQuery<ClearQuery>,
) -> Result<Json<ClearResponse>, ApiError> {
    let _timer = metrics().request_latency.start();

    let product_id = product_id_from_query(query.product_id.as_deref())?;
    let cleared = state.service.clear(auth.user_id, product_id).await?;

    Ok(Json(ClearResponse::new(cleared)))
}
