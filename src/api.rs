//! REST surface for one darknode epoch.
//!
//! Used by the binary and by integration tests. Create with [`create_router`].
//! Peers POST the fragments they are responsible for; responses carry the delta
//! fragments the caller must broadcast to the rest of the pool.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::warn;

use crate::{Delta, DeltaFragment, DeltaId, Epoch, OrderFragment};

/// Shared app state: one epoch per process.
#[derive(Clone)]
pub struct AppState {
    pub(crate) epoch: Arc<Epoch>,
}

/// Builds the REST router. Returns `Router<()>` so it can be passed to `axum::serve`.
pub fn create_router(epoch: Arc<Epoch>) -> Router<()> {
    let state = AppState { epoch };
    Router::new()
        .route("/health", get(health))
        .route("/order_fragments", post(submit_order_fragment))
        .route("/order_fragments/remove", post(remove_order_fragment))
        .route("/delta_fragments", post(submit_delta_fragment))
        .route("/deltas/:id", get(get_delta))
        .layer(Extension(state))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

fn bad_request(error: impl ToString) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": error.to_string() })),
    )
        .into_response()
}

async fn submit_order_fragment(
    Extension(state): Extension<AppState>,
    Json(fragment): Json<OrderFragment>,
) -> Response {
    if !fragment.verify_id() {
        warn!("order fragment id does not match content id={}", fragment.id);
        return bad_request("order fragment id does not match its content");
    }
    match state.epoch.submit_order_fragment(fragment) {
        Ok(delta_fragments) => {
            #[derive(serde::Serialize)]
            struct Out {
                delta_fragments: Vec<DeltaFragment>,
            }
            (StatusCode::OK, Json(Out { delta_fragments })).into_response()
        }
        Err(e) => bad_request(e),
    }
}

async fn remove_order_fragment(
    Extension(state): Extension<AppState>,
    Json(fragment): Json<OrderFragment>,
) -> Response {
    state.epoch.remove_order_fragment(&fragment);
    (StatusCode::OK, Json(serde_json::json!({ "removed": true }))).into_response()
}

async fn submit_delta_fragment(
    Extension(state): Extension<AppState>,
    Json(fragment): Json<DeltaFragment>,
) -> Response {
    match state.epoch.submit_delta_fragment(fragment) {
        Ok(delta) => {
            #[derive(serde::Serialize)]
            struct Out {
                is_match: Option<bool>,
                delta: Option<Delta>,
            }
            let prime = &state.epoch.config().prime;
            let is_match = delta.as_ref().map(|d| d.is_match(prime));
            (StatusCode::OK, Json(Out { is_match, delta })).into_response()
        }
        Err(e) => bad_request(e),
    }
}

async fn get_delta(Extension(state): Extension<AppState>, Path(id): Path<String>) -> Response {
    let id: DeltaId = match id.parse() {
        Ok(id) => id,
        Err(e) => return bad_request(e),
    };
    match state.epoch.delta(&id) {
        Some(delta) => (StatusCode::OK, Json(delta)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "delta not found" })),
        )
            .into_response(),
    }
}
