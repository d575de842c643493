//! AuthPlane Auth Server
//!
//! Production server for the authentication/authorization REST APIs:
//! - RBAC administration: roles, permission modules, module groups,
//!   special roles
//! - OTP issuance and validation
//! - Internal lookups for sibling services
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AP_API_PORT` | `8080` | HTTP API port |
//! | `AP_MONGO_URL` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `AP_MONGO_DB` | `authplane` | MongoDB database name |
//! | `AP_JWT_SECRET` | - | HS256 signing secret |
//! | `AP_JWT_EXPIRY_SECS` | `3600` | Access token expiry |
//! | `AP_JWT_REFRESH_EXPIRY_SECS` | `2592000` | Refresh token expiry |
//! | `AP_OTP_TTL_SECS` | `300` | OTP time-to-live |
//! | `AP_SMS_BASE_URL` | - | External OTP/SMS service base URL |
//! | `AP_DEV_MODE` | `false` | Echo issued OTP codes in responses |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;
use axum::{routing::get, response::Json, Router};
use utoipa_axum::router::OpenApiRouter;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use anyhow::Result;
use tracing::info;
use tokio::{signal, net::TcpListener};
use utoipa_swagger_ui::SwaggerUi;

use ap_platform::auth::{
    AuthConfig, AuthState, NotificationClient, OtpRepository, OtpService, TokenService, auth_router,
};
use ap_platform::module_group::{ModuleGroupRepository, ModuleGroupsState, module_groups_router};
use ap_platform::module_permission::{
    ModulePermissionRepository, ModulePermissionsState, module_permissions_router,
};
use ap_platform::role::{RoleDetailLoader, RoleModuleLinkRepository, RoleRepository, RolesState, roles_router};
use ap_platform::shared::indexes;
use ap_platform::special_role::{
    SpecialRoleRepository, SpecialRolesState, internal_router, special_roles_router,
};
use ap_platform::usecase::MongoUnitOfWork;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    ap_common::logging::init_logging("ap-auth-server");

    info!("Starting AuthPlane Auth Server");

    // Configuration from environment
    let api_port: u16 = env_or_parse("AP_API_PORT", 8080);
    let mongo_url = env_or("AP_MONGO_URL", "mongodb://localhost:27017");
    let mongo_db = env_or("AP_MONGO_DB", "authplane");
    let dev_mode = std::env::var("AP_DEV_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let auth_config = AuthConfig {
        jwt_secret: env_or("AP_JWT_SECRET", ""),
        access_token_expiry_secs: env_or_parse("AP_JWT_EXPIRY_SECS", 3600),
        refresh_token_expiry_secs: env_or_parse("AP_JWT_REFRESH_EXPIRY_SECS", 86400 * 30),
        otp_ttl_secs: env_or_parse("AP_OTP_TTL_SECS", 300),
        sms_base_url: std::env::var("AP_SMS_BASE_URL").ok(),
        dev_mode,
    };

    // Connect to MongoDB
    info!("Connecting to MongoDB: {}/{}", mongo_url, mongo_db);
    let mongo_client = mongodb::Client::with_uri_str(&mongo_url).await?;
    let db = mongo_client.database(&mongo_db);

    indexes::initialize_indexes(&db).await?;

    // Initialize repositories
    let module_repo = Arc::new(ModulePermissionRepository::new(&db));
    let group_repo = Arc::new(ModuleGroupRepository::new(&db));
    let role_repo = Arc::new(RoleRepository::new(&db));
    let link_repo = Arc::new(RoleModuleLinkRepository::new(&db));
    let special_role_repo = Arc::new(SpecialRoleRepository::new(&db));
    let otp_repo = Arc::new(OtpRepository::new(&db));
    info!("Repositories initialized");

    // Unit of work for atomic role writes
    let unit_of_work = Arc::new(MongoUnitOfWork::new(mongo_client.clone(), db.clone()));

    // Auth services
    let token_service = Arc::new(TokenService::new(&auth_config));
    let notifier = Arc::new(NotificationClient::new(auth_config.sms_base_url.clone()));
    let otp_service = Arc::new(OtpService::new(
        otp_repo,
        notifier,
        auth_config.otp_ttl_secs,
    ));
    info!("Auth services initialized");

    // Build API states
    let loader = RoleDetailLoader::new(
        link_repo.clone(),
        module_repo.clone(),
        group_repo.clone(),
        special_role_repo.clone(),
    );
    let roles_state = RolesState {
        roles: role_repo.clone(),
        modules: module_repo.clone(),
        special_roles: special_role_repo.clone(),
        loader,
        unit_of_work,
    };
    let module_permissions_state = ModulePermissionsState {
        modules: module_repo.clone(),
        groups: group_repo.clone(),
    };
    let module_groups_state = ModuleGroupsState {
        groups: group_repo,
        modules: module_repo,
    };
    let special_roles_state = SpecialRolesState {
        special_roles: special_role_repo,
        roles: role_repo,
    };
    let auth_state = AuthState {
        otp_service,
        token_service,
        expose_otp_codes: auth_config.dev_mode,
    };

    // Build the API router; OpenAPI paths are auto-collected
    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/api/v1/auth/roles/groups", module_groups_router(module_groups_state))
        .nest("/api/v1/auth/roles/modules", module_permissions_router(module_permissions_state))
        .nest("/api/v1/auth/roles", roles_router(roles_state))
        .nest("/api/v1/auth/special-roles", special_roles_router(special_roles_state.clone()))
        .nest("/api/v1/auth/internal", internal_router(special_roles_state))
        .nest("/api/v1/auth", auth_router(auth_state))
        .split_for_parts();

    // PaginationParams is used in query params with #[serde(flatten)] and
    // is not auto-collected
    use utoipa::openapi::{ObjectBuilder, schema::Type};
    if let Some(components) = openapi.components.as_mut() {
        components.schemas.insert(
            "PaginationParams".to_string(),
            ObjectBuilder::new()
                .property("page", ObjectBuilder::new().schema_type(Type::Integer))
                .property("limit", ObjectBuilder::new().schema_type(Type::Integer))
                .into(),
        );
    }

    openapi.info.title = "AuthPlane Auth API".to_string();
    openapi.info.version = "1.0.0".to_string();
    openapi.info.description =
        Some("REST APIs for RBAC administration, OTP, and tokens".to_string());

    let app = Router::new()
        .merge(router)
        .route("/health", get(health_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    // Start API server
    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let api_listener = TcpListener::bind(&api_addr).await?;
    let api_task = tokio::spawn(async move {
        axum::serve(api_listener, app).await.unwrap();
    });

    info!("AuthPlane Auth Server started");
    info!("Press Ctrl+C to shutdown");

    shutdown_signal().await;
    info!("Shutdown signal received...");

    api_task.abort();

    info!("AuthPlane Auth Server shutdown complete");
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "UP" }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
