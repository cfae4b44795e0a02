use crate::config::Config;
use crate::transcription::{SpeechToText, TranscriptionError, audio};
use crate::upload::{self, UploadError};
use crate::web::ErrorResponse;
use axum::{
    Json, Router,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use utoipa::ToSchema;

/// Shared state for the transcription endpoint.
#[derive(Clone)]
pub struct TranscriptionState {
    pub config: Arc<Config>,
    pub engine: Arc<dyn SpeechToText>,
}

/// API response for a successful transcription.
#[derive(Debug, Serialize, ToSchema)]
pub struct TranscriptionResponse {
    /// Always true on the success path
    success: bool,
    /// Text recognised from the uploaded audio
    transcription: String,
}

/// Custom error type for upload handler operations.
#[derive(Debug, thiserror::Error)]
pub enum UploadApiError {
    /// Represents an invalid upload.
    #[error(transparent)]
    Upload(#[from] UploadError),
    /// Represents a malformed multipart request body.
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    /// Represents a decode or inference failure.
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
}

impl IntoResponse for UploadApiError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, message) = match &self {
            UploadApiError::Upload(UploadError::Io(err)) => {
                tracing::error!("Failed to store uploaded file: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store uploaded file".to_string(),
                )
            }
            UploadApiError::Upload(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            UploadApiError::Multipart(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            UploadApiError::Transcription(err) => {
                tracing::error!("Transcription failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Transcription failed".to_string(),
                )
            }
        };

        (status_code, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Handler for POST /upload - Transcribes an uploaded audio file.
///
/// The stored file is transient: it is removed before the response is
/// produced on every path that wrote it, success or failure.
#[tracing::instrument(skip(state, multipart))]
#[utoipa::path(
    post,
    path = "/upload",
    responses(
        (status = 200, description = "Audio transcribed", body = TranscriptionResponse),
        (status = 400, description = "Missing file, empty filename, or disallowed format", body = ErrorResponse),
        (status = 500, description = "Transcription failed", body = ErrorResponse)
    ),
    tag = "Transcription"
)]
pub async fn upload_audio_handler(
    State(state): State<Arc<TranscriptionState>>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, UploadApiError> {
    let mut uploaded_file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            uploaded_file = Some((filename, bytes));
            break;
        }
    }

    let (filename, bytes) = uploaded_file.ok_or(UploadError::MissingFile)?;
    if filename.is_empty() {
        return Err(UploadError::EmptyFilename.into());
    }

    let path = upload::store_upload(
        &state.config.upload_dir,
        &filename,
        &bytes,
        &state.config.allowed_extensions(),
    )
    .await?;

    let transcription = transcribe_stored_file(state.engine.clone(), path).await?;

    Ok(Json(TranscriptionResponse {
        success: true,
        transcription,
    }))
}

/// Runs inference on a stored upload and unconditionally removes the file
/// afterwards, regardless of the outcome.
async fn transcribe_stored_file(
    engine: Arc<dyn SpeechToText>,
    path: PathBuf,
) -> Result<String, TranscriptionError> {
    let result = run_inference(engine, path.clone()).await;

    if let Err(err) = tokio::fs::remove_file(&path).await {
        tracing::warn!("Failed to remove uploaded file {}: {}", path.display(), err);
    }

    result
}

/// Decodes and transcribes on a blocking thread; whisper inference is
/// synchronous CPU work and must not stall the async executor.
async fn run_inference(
    engine: Arc<dyn SpeechToText>,
    path: PathBuf,
) -> Result<String, TranscriptionError> {
    let handle = tokio::task::spawn_blocking(move || {
        let samples = audio::load_pcm_mono_16khz(&path)?;
        engine.transcribe(&samples)
    });

    match handle.await {
        Ok(result) => result,
        Err(err) => {
            tracing::error!("Transcription task failed to complete: {}", err);
            Err(TranscriptionError::Aborted)
        }
    }
}

/// Creates and returns the upload API router.
pub fn create_upload_router(state: Arc<TranscriptionState>) -> Router {
    Router::new()
        .route("/upload", post(upload_audio_handler))
        .with_state(state)
}
