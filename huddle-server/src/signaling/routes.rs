use crate::room::RoomManager;
use crate::signaling::ws_handler;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};
use huddle_core::RoomId;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub rooms: RoomManager,
}

pub fn router(rooms: RoomManager) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/create-room", get(create_room))
        .route("/ws/{room_id}", get(ws_handler))
        .layer(cors)
        .with_state(AppState { rooms })
}

/// Mint a fresh room id. The room itself is registered lazily at first
/// join, so allocation holds no server-side state.
async fn create_room(State(state): State<AppState>) -> Response {
    if state.rooms.at_capacity() {
        return (StatusCode::SERVICE_UNAVAILABLE, "room capacity reached").into_response();
    }

    let room_id = RoomId::generate();
    info!(room = %room_id, "allocated room id");

    Json(json!({ "roomID": room_id })).into_response()
}
