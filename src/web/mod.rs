use axum::http::{HeaderValue, Method, header};
use migration::MigratorTrait;
use sea_orm::Database;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::task::api::{TaskState, create_task_router};
use crate::transcription::WhisperTranscriber;
use crate::transcription::api::{TranscriptionState, create_upload_router};

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: String) -> Self {
        Self { error }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::task::api::get_tasks_handler,
        crate::task::api::add_task_handler,
        crate::task::api::toggle_task_handler,
        crate::task::api::update_task_handler,
        crate::task::api::delete_task_handler,
        crate::transcription::api::upload_audio_handler,
    ),
    components(schemas(
        crate::task::api::TaskJson,
        crate::task::api::TaskPayload,
        crate::task::api::TaskResponse,
        crate::task::api::MessageResponse,
        crate::transcription::api::TranscriptionResponse,
        ErrorResponse,
    )),
    tags(
        (name = "Tasks", description = "Task management endpoints"),
        (name = "Transcription", description = "Audio transcription endpoints")
    )
)]
struct ApiDoc;

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    use axum::Router;

    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    prepare_storage_dirs(&config).await?;

    let db = Database::connect(&config.database_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let engine = WhisperTranscriber::load(&config.whisper_model_path)?;
    tracing::info!("Whisper model loaded from {}", config.whisper_model_path);

    let cors_layer = build_cors_layer(&config)?;
    let config = Arc::new(config);

    let task_state = Arc::new(TaskState { db: Arc::new(db) });
    let transcription_state = Arc::new(TranscriptionState {
        config: config.clone(),
        engine: Arc::new(engine),
    });

    let app = Router::new()
        .merge(create_task_router(task_state))
        .merge(create_upload_router(transcription_state))
        .route("/health", axum::routing::get(health_check_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        );

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

/// Builds the CORS layer from the configured origin list.
fn build_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let origins = config
        .origins()
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Creates the upload directory and the database file's parent directory.
async fn prepare_storage_dirs(config: &Config) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    if let Some(dir) = sqlite_parent_dir(&config.database_url) {
        tokio::fs::create_dir_all(&dir).await?;
    }
    Ok(())
}

/// Extracts the parent directory of a file-backed SQLite URL, if any.
/// In-memory databases and non-SQLite URLs yield `None`.
fn sqlite_parent_dir(database_url: &str) -> Option<PathBuf> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.starts_with(':') {
        return None;
    }

    let parent = Path::new(path).parent()?;
    if parent.as_os_str().is_empty() {
        return None;
    }
    Some(parent.to_path_buf())
}
