//! REST endpoints for listing and saving businesses.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::business::model::{BusinessCategory, BusinessFormData, BusinessPatch, BusinessSummary};
use crate::error::DatabaseError;
use crate::store::{BusinessFilter, BusinessStore};

const NO_OWNER: &str = "No user found to assign as business owner";

/// Shared state for business routes.
#[derive(Clone)]
pub struct BusinessRouteState {
    pub store: Arc<dyn BusinessStore>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub location: Option<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Map a store failure; `context` is the client-facing message for 500s.
fn store_error(e: DatabaseError, context: &str) -> Response {
    match e {
        DatabaseError::Constraint(message) => error_response(StatusCode::BAD_REQUEST, message),
        DatabaseError::NotFound { .. } => {
            error_response(StatusCode::NOT_FOUND, "Business not found")
        }
        other => {
            error!(error = %other, "{context}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, context)
        }
    }
}

/// `ownerId` from the payload, else the first owner in the store.
async fn resolve_owner(
    store: &dyn BusinessStore,
    data: &BusinessFormData,
) -> Result<String, Response> {
    if let Some(owner) = data.owner_id.as_deref().filter(|o| !o.is_empty()) {
        return Ok(owner.to_string());
    }
    match store.first_owner_id().await {
        Ok(Some(owner)) => Ok(owner),
        Ok(None) => Err(error_response(StatusCode::BAD_REQUEST, NO_OWNER)),
        Err(e) => Err(store_error(e, "Failed to resolve business owner")),
    }
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/businesses?category=&location=
///
/// An unknown category matches nothing.
async fn list_businesses(
    State(state): State<BusinessRouteState>,
    Query(params): Query<ListParams>,
) -> Response {
    let category = match params.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(label) => match BusinessCategory::from_label(label) {
            Some(c) => Some(c),
            None => return Json(Vec::<BusinessSummary>::new()).into_response(),
        },
    };
    let filter = BusinessFilter {
        category,
        location: params.location,
    };

    match state.store.list_businesses(&filter).await {
        Ok(businesses) => {
            let summaries: Vec<BusinessSummary> =
                businesses.iter().map(BusinessSummary::from).collect();
            Json(summaries).into_response()
        }
        Err(e) => store_error(e, "Failed to fetch businesses"),
    }
}

/// GET /api/businesses/{id}
async fn get_business(
    State(state): State<BusinessRouteState>,
    Path(id): Path<String>,
) -> Response {
    match state.store.get_business(&id).await {
        Ok(Some(business)) => Json(business).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Business not found"),
        Err(e) => store_error(e, "Failed to fetch business"),
    }
}

/// POST /api/businesses
///
/// Creates a business from a full payload. Numeric strings are parsed and the
/// category label mapped.
async fn create_business(
    State(state): State<BusinessRouteState>,
    Json(data): Json<BusinessFormData>,
) -> Response {
    let owner_id = match resolve_owner(state.store.as_ref(), &data).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match state
        .store
        .create_business(&owner_id, &BusinessPatch::from_form_data(&data))
        .await
    {
        Ok(business) => (StatusCode::CREATED, Json(business)).into_response(),
        Err(e) => store_error(e, "Failed to create business"),
    }
}

/// POST /api/businesses/basic-info
///
/// Saves the first wizard step. Updates the record named by `id` when it
/// exists, otherwise creates one.
async fn save_basic_info(
    State(state): State<BusinessRouteState>,
    Json(data): Json<BusinessFormData>,
) -> Response {
    let owner_id = match resolve_owner(state.store.as_ref(), &data).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let id = data.id.as_deref().filter(|id| !id.is_empty());
    match state
        .store
        .upsert_business(id, &owner_id, &BusinessPatch::basic_info(&data))
        .await
    {
        Ok(business) => Json(business).into_response(),
        Err(e) => store_error(e, "Failed to save data"),
    }
}

/// POST /api/businesses/onboarding
///
/// Creates a business from everything the wizard collected.
async fn complete_onboarding(
    State(state): State<BusinessRouteState>,
    Json(data): Json<BusinessFormData>,
) -> Response {
    let owner_id = match resolve_owner(state.store.as_ref(), &data).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match state
        .store
        .create_business(&owner_id, &BusinessPatch::from_form_data(&data))
        .await
    {
        Ok(business) => {
            info!(business_id = %business.id, "Business onboarded");
            (StatusCode::CREATED, Json(business)).into_response()
        }
        Err(e) => store_error(e, "Failed to create business"),
    }
}

/// Build the business REST routes.
pub fn business_routes(state: BusinessRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/businesses", get(list_businesses).post(create_business))
        .route("/api/businesses/basic-info", post(save_basic_info))
        .route("/api/businesses/onboarding", post(complete_onboarding))
        .route("/api/businesses/{id}", get(get_business))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
