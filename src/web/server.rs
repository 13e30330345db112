//! Web server for docvault.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::{FilesConfig, WebConfig};
use crate::db::RefreshTokenRepository;
use crate::file::BlobStore;
use crate::{Database, Result, VaultError};

use super::handlers::AppState;
use super::middleware::{JwtState, RateLimitState};
use super::openapi::create_swagger_router;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    rate_limit: Arc<RateLimitState>,
    web_config: WebConfig,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(
        config: &WebConfig,
        files_config: &FilesConfig,
        db: Arc<Database>,
        storage: Arc<dyn BlobStore>,
    ) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| VaultError::Config(format!("invalid web server address: {e}")))?;

        let app_state = AppState::new(
            db,
            storage,
            &config.jwt_secret,
            config.jwt_access_token_expiry_secs,
            config.jwt_refresh_token_expiry_days,
        )
        .with_max_upload_size(files_config.max_upload_size_bytes());

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            jwt_state: Arc::new(JwtState::new(&config.jwt_secret)),
            rate_limit: Arc::new(RateLimitState::new(
                config.login_rate_limit,
                config.api_rate_limit,
            )),
            web_config: config.clone(),
        })
    }

    /// Get the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the refresh token cleanup background task.
    ///
    /// Runs every hour and removes expired and revoked refresh tokens.
    fn start_token_cleanup_task(db: Arc<Database>) {
        tokio::spawn(async move {
            const CLEANUP_INTERVAL_SECS: u64 = 3600;

            let mut interval = tokio::time::interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                match RefreshTokenRepository::new(db.pool()).cleanup_expired().await {
                    Ok(0) => tracing::debug!("No expired refresh tokens to clean up"),
                    Ok(count) => tracing::info!(
                        deleted_count = count,
                        "Cleaned up expired/revoked refresh tokens"
                    ),
                    Err(e) => tracing::warn!(error = %e, "Failed to cleanup refresh tokens"),
                }
            }
        });
    }

    fn into_app(self) -> (Router, SocketAddr, Arc<Database>, Arc<RateLimitState>) {
        let db = self.app_state.db.clone();
        let rate_limit = self.rate_limit.clone();

        let router = create_router(
            self.app_state,
            self.jwt_state,
            self.rate_limit,
            &self.web_config.cors_origins,
        )
        .merge(create_health_router())
        .merge(create_swagger_router())
        .layer(CompressionLayer::new());

        (router, self.addr, db, rate_limit)
    }

    async fn bind(self) -> std::io::Result<(TcpListener, Router)> {
        let (router, addr, db, rate_limit) = self.into_app();

        let listener = TcpListener::bind(addr).await?;

        // Background tasks start once the port is ours.
        Self::start_token_cleanup_task(db);
        rate_limit.start_cleanup_task();
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        Ok((listener, router))
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.bind().await?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }

    /// Run the server in the background and return the bound address.
    ///
    /// Useful for tests that bind to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
