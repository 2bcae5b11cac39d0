use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::chat::{ChatRequest, ChatResponse, ChatService};
use crate::config::ServerConfig;

const INDEX_HTML: &str = include_str!("../templates/index.html");

pub fn router(service: Arc<ChatService>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/ask", post(ask_handler))
        .with_state(service)
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// The body is decoded as JSON whatever `Content-Type` the client sent.
async fn ask_handler(State(service): State<Arc<ChatService>>, body: Bytes) -> Response {
    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected /ask body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": format!("invalid JSON body: {}", e) })),
            )
                .into_response();
        }
    };

    let response: ChatResponse = service.handle(&request.message).await;
    Json(response).into_response()
}

/// Bind the listener and serve until the process is stopped.
pub async fn serve(config: &ServerConfig, service: Arc<ChatService>) -> Result<()> {
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Chat assistant listening on http://{}", addr);

    axum::serve(listener, router(service))
        .await
        .context("HTTP server error")
}
