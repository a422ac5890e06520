//! Access Admin Server
//!
//! Serves the setup API for roles, role membership and user claims:
//! - `/api/setup/*`: administration endpoints
//! - `/swagger-ui`: API explorer, `/q/openapi` for the raw document
//! - `/health`, `/ready`: probes
//!
//! Configuration comes from `config.toml` (or `ACCESS_ADMIN_CONFIG`) with
//! `ACCESS_ADMIN_*` environment overrides; see `ia-config`.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ACCESS_ADMIN_HTTP_PORT` | `8080` | HTTP port |
//! | `ACCESS_ADMIN_STORE_BACKEND` | `memory` | `memory` or `mongodb` |
//! | `ACCESS_ADMIN_MONGODB_URI` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `ACCESS_ADMIN_MONGODB_DATABASE` | `access_admin` | MongoDB database name |
//! | `ACCESS_ADMIN_DEV_MODE` | `false` | Seed development users and roles |
//! | `LOG_FORMAT` | `text` | `json` for structured output |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{http::HeaderValue, response::Json, routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use utoipa::openapi::Info;
use utoipa_swagger_ui::SwaggerUi;

use ia_config::{AppConfig, ConfigLoader, StoreBackend};
use ia_platform::access::build_app;
use ia_platform::store::initialize_indexes;
use ia_platform::{
    AccessAdminService, AccessState, AuditLogRepository, AuditService, DevDataSeeder,
    InMemoryAuditLogRepository, InMemoryRoleStore, InMemoryUserStore, MongoAuditLogRepository,
    MongoRoleStore, MongoUserStore, RoleStore, UserStore,
};

struct Backends {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    audit_logs: Arc<dyn AuditLogRepository>,
}

async fn connect_backends(config: &AppConfig) -> Result<Backends> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory stores; data is lost on restart");
            Ok(Backends {
                users: Arc::new(InMemoryUserStore::new()),
                roles: Arc::new(InMemoryRoleStore::new()),
                audit_logs: Arc::new(InMemoryAuditLogRepository::new()),
            })
        }
        StoreBackend::Mongodb => {
            info!("Connecting to MongoDB: {}/{}", config.mongodb.uri, config.mongodb.database);
            let client = mongodb::Client::with_uri_str(&config.mongodb.uri).await?;
            let db = client.database(&config.mongodb.database);
            initialize_indexes(&db).await?;

            Ok(Backends {
                users: Arc::new(MongoUserStore::new(&db)),
                roles: Arc::new(MongoRoleStore::new(&db)),
                audit_logs: Arc::new(MongoAuditLogRepository::new(&db)),
            })
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    ia_common::logging::init_logging("ia-server");

    info!("Starting Access Admin Server");

    let config = ConfigLoader::new().load()?;
    let backends = connect_backends(&config).await?;

    if config.dev_mode {
        info!("Dev mode enabled, seeding development data...");
        DevDataSeeder::new(backends.users.clone(), backends.roles.clone())
            .seed()
            .await?;
    }

    let audit = AuditService::new(backends.audit_logs.clone());
    let service = AccessAdminService::new(backends.users.clone(), backends.roles.clone())
        .with_audit(audit)
        .with_read_timeout(Duration::from_millis(config.access.operation_timeout_ms));

    let (api_router, mut openapi) = build_app(AccessState { service });
    openapi.info = Info::new("Access Admin API", env!("CARGO_PKG_VERSION"));

    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http.cors_origins));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Access Admin Server shutdown complete");
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn ready_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "READY"
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight requests...");
}
