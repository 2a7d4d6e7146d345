//! Reusable parking service runtime.
//!
//! Provides [`ServerHandle`] that encapsulates the full server lifecycle:
//! storage init, demo data, REST API, metrics, and graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::{ParkingService, RateLimiter};
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::{init_database, seed_demo_data, InMemoryRepositoryProvider, SeaOrmRepositoryProvider};
use crate::interfaces::http::create_api_router;
use crate::interfaces::http::modules::health::HealthState;
use crate::interfaces::http::modules::metrics::MetricsState;
use crate::interfaces::http::modules::parking_spots::ParkingState;
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the parking service.
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Load demo data into an empty store (default: `config.seed.enabled`).
    pub seed: bool,
}

impl ServerOptions {
    pub fn new(config: AppConfig) -> Self {
        let seed = config.seed.enabled;
        Self { config, seed }
    }
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running parking service.
///
/// # Examples
///
/// ```rust,no_run
/// use parking_iot::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     // ... wait for shutdown signal ...
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Repository provider for data access.
    pub repos: Arc<dyn RepositoryProvider>,
    /// Parking operations, shared with the HTTP handlers.
    pub service: Arc<ParkingService>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the REST API is bound to.
    pub local_addr: SocketAddr,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the parking service with the given options.
    ///
    /// This will:
    /// 1. Install Prometheus metrics recorder
    /// 2. Open the configured store (SQLite or memory)
    /// 3. Load demo data (if enabled and the store is empty)
    /// 4. Start REST API server (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;

        info!("Starting parking IoT service...");

        let prometheus_handle = prometheus_handle()?;
        info!("📊 Prometheus metrics recorder ready");

        // ── Storage ────────────────────────────────────────────
        info!("Storage: {}", app_cfg.database.connection_url());
        let (repos, db): (Arc<dyn RepositoryProvider>, Option<DatabaseConnection>) =
            match app_cfg.database.database_config() {
                Some(db_config) => {
                    let db = init_database(&db_config).await?;
                    (Arc::new(SeaOrmRepositoryProvider::new(db.clone())), Some(db))
                }
                None => (Arc::new(InMemoryRepositoryProvider::new()), None),
            };

        if opts.seed {
            seed_demo_data(repos.as_ref()).await?;
        }

        // ── Services ───────────────────────────────────────────
        let rate_limit = app_cfg.rate_limit_config();
        info!(
            cooldown_secs = rate_limit.cooldown.as_secs(),
            retention_secs = rate_limit.retention.as_secs(),
            "Per-device rate limit configured"
        );
        let rate_limiter = Arc::new(RateLimiter::new(rate_limit));
        let service = Arc::new(ParkingService::new(repos.clone(), rate_limiter));

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(
            ParkingState {
                service: service.clone(),
            },
            HealthState::new(db.clone()),
            MetricsState {
                handle: prometheus_handle,
            },
        );

        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Server started.");

        Ok(Self {
            repos,
            service,
            config: app_cfg,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to fully stop after shutdown has been triggered.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            ..
        } = self;

        info!("⏳ Waiting for server tasks to complete...");

        let drained = shutdown
            .drain(async {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
            })
            .await;
        if !drained {
            warn!("REST API server did not stop in time");
        }

        if let Some(db) = db {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("✅ Database connection closed");
            }
        }

        info!("👋 Parking IoT service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down parking IoT service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if the server is still running.
    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global metrics recorder can only be installed once per process.
/// A restart within the same process reuses it.
fn prometheus_handle() -> Result<PrometheusHandle, String> {
    static PROM_HANDLE: OnceLock<Result<PrometheusHandle, String>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| {
            let installed = PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| format!("Failed to install Prometheus metrics recorder: {}", e));
            if installed.is_ok() {
                info!("📊 Prometheus metrics recorder installed");
            }
            installed
        })
        .clone()
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
