//! HTTP facade for Drawport.
//!
//! Routes:
//!
//! - `GET /health` returns `OK`
//! - `POST /convert/svg`, `/convert/emf`, `/convert/png` take a multipart
//!   form with a `file` field holding a `.drawio` upload and answer with the
//!   converted file
//!
//! Each request gets its own scratch directory, removed once the response
//! has been built. Nothing else is shared between requests.

pub mod error;
mod routes;

pub use error::{ApiError, ServerError};
pub use routes::UPLOAD_FIELD;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderMap, header},
    routing::{get, post},
};
use log::{info, warn};
use tokio::net::TcpListener;

use drawport::{config::AppConfig, convert::Converter};

/// Shared, read-only request state.
#[derive(Debug, Clone)]
pub struct AppState {
    converter: Arc<Converter>,
    auth_token: Option<Arc<str>>,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(converter: Converter, auth_token: Option<String>, max_upload_bytes: usize) -> Self {
        Self {
            converter: Arc::new(converter),
            auth_token: auth_token.filter(|t| !t.is_empty()).map(Arc::from),
            max_upload_bytes,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Converter::new(config.convert.clone(), config.tools.clone()),
            config.server.auth_token.clone(),
            config.server.max_upload_bytes,
        )
    }

    /// Check the bearer token when one is configured.
    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let Some(expected) = self.auth_token.as_deref() else {
            return Ok(());
        };

        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        if provided == Some(expected) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(routes::health))
        .route("/convert/{format}", post(routes::convert))
        .layer(body_limit)
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be bound and
/// [`ServerError::Serve`] if the server fails while running.
pub async fn serve(config: &AppConfig) -> Result<(), ServerError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let local_addr = listener.local_addr()?;
    info!(addr = local_addr.to_string(); "Listening");

    axum::serve(listener, router(AppState::from_config(config)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(err:err; "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
