//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        http::{
            create_profile, create_room, delete_profile, get_profile, get_room, health_check,
            log_in, me, my_profiles, sign_up, update_profile, update_room,
        },
        websocket::channel_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Every HTTP and WebSocket route, wrapped in a request trace layer.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket エンドポイント
        .route("/room/{room_id}/channel", get(channel_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route("/sign-up", post(sign_up))
        .route("/log-in", post(log_in))
        .route("/me", get(me))
        .route("/profile/create", post(create_profile))
        .route("/profile/my", get(my_profiles))
        .route("/profile/{profile_id}", get(get_profile))
        .route("/profile/{profile_id}/update", post(update_profile))
        .route("/profile/{profile_id}/delete", post(delete_profile))
        .route("/room/create", post(create_room))
        .route("/room/{room_id}", get(get_room))
        .route("/room/{room_id}/update", post(update_room))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Antenna game server
///
/// # Example
///
/// ```ignore
/// let state = AppState::in_memory(&config, CardCatalog::builtin()?, Arc::new(SystemClock));
/// Server::new(state).run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Run the server until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = build_router(self.state);

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Antenna server listening on {}", listener.local_addr()?);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
