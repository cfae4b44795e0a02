use std::path::{Path, PathBuf};

/// Error type for upload handling.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The multipart request carried no `file` field.
    #[error("No file uploaded")]
    MissingFile,
    /// The `file` field carried an empty filename.
    #[error("No selected file")]
    EmptyFilename,
    /// The filename extension is not in the configured allow-list.
    #[error("Invalid file format")]
    DisallowedExtension,
    /// Represents an I/O error while persisting the upload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Checks whether a filename carries an extension from the allow-list.
/// Matching is case-insensitive; a filename without an extension never matches.
pub fn has_allowed_extension(filename: &str, allowed_extensions: &[String]) -> bool {
    let Some((_, extension)) = filename.rsplit_once('.') else {
        return false;
    };
    let extension = extension.to_ascii_lowercase();
    allowed_extensions.iter().any(|allowed| *allowed == extension)
}

/// Reduces an untrusted filename to a safe basename: path components are
/// dropped, whitespace becomes underscores, and anything outside
/// `[A-Za-z0-9._-]` is removed. Leading dots are stripped so the result can
/// never be a hidden file or a traversal component.
pub fn secure_file_name(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let cleaned: String = basename
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    cleaned.trim_start_matches('.').to_string()
}

/// Validates an uploaded filename and writes the payload into the upload
/// directory, returning the path of the stored file.
///
/// # Arguments
///
/// * `upload_dir` - The configured transient upload directory.
/// * `filename` - The client-supplied filename, untrusted.
/// * `bytes` - The uploaded file contents.
/// * `allowed_extensions` - Lowercased extension allow-list.
#[tracing::instrument(skip(bytes))]
pub async fn store_upload(
    upload_dir: &Path,
    filename: &str,
    bytes: &[u8],
    allowed_extensions: &[String],
) -> Result<PathBuf, UploadError> {
    if !has_allowed_extension(filename, allowed_extensions) {
        return Err(UploadError::DisallowedExtension);
    }

    let safe_name = secure_file_name(filename);
    if safe_name.is_empty() {
        return Err(UploadError::EmptyFilename);
    }

    let path = upload_dir.join(safe_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}
