//! Cart endpoint routes.

use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
    routing::{get, post},
    Json, Router,
};

use crate::auth::AuthAccount;
use crate::error::Result;
use crate::handlers::{
    handle_clear, handle_fetch, handle_reconcile, handle_store, handle_websocket_connection,
    CartStateResponse, ReconcileRequest, ReconcileResponse, StoreCartRequest,
};
use crate::AppState;

/// Create cart routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cart",
            get(fetch_handler).put(store_handler).delete(clear_handler),
        )
        .route("/cart/reconcile", post(reconcile_handler))
        .route("/ws", get(ws_handler))
}

/// GET /cart - Fetch the cart stored for the account.
async fn fetch_handler(
    State(state): State<AppState>,
    auth: AuthAccount,
) -> Result<Json<CartStateResponse>> {
    let response = handle_fetch(&state, &auth.account_id).await?;
    Ok(Json(response))
}

/// PUT /cart - Replace the stored cart.
async fn store_handler(
    State(state): State<AppState>,
    auth: AuthAccount,
    Json(request): Json<StoreCartRequest>,
) -> Result<Json<CartStateResponse>> {
    let response = handle_store(&state, &auth.account_id, request.cart, None).await?;
    Ok(Json(response))
}

/// DELETE /cart - Drop the stored cart.
async fn clear_handler(
    State(state): State<AppState>,
    auth: AuthAccount,
) -> Result<Json<CartStateResponse>> {
    let response = handle_clear(&state, &auth.account_id, None).await?;
    Ok(Json(response))
}

/// POST /cart/reconcile - Reconcile a client cart against the stored one.
async fn reconcile_handler(
    State(state): State<AppState>,
    auth: AuthAccount,
    Json(request): Json<ReconcileRequest>,
) -> Result<Json<ReconcileResponse>> {
    let response = handle_reconcile(&state, &auth.account_id, request, None).await?;
    Ok(Json(response))
}

/// GET /ws - Upgrade to the cart sync WebSocket.
async fn ws_handler(
    State(state): State<AppState>,
    auth: AuthAccount,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, state, auth.account_id))
}
