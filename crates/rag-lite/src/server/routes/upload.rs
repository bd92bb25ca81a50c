//! Document upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::ingestion::FileParser;
use crate::providers::ApiKey;
use crate::server::state::AppState;
use crate::types::{Chunk, FileType, UploadResponse};

/// Multipart field holding the document
const FILE_FIELD: &str = "file";

/// Save `data` under a unique name in `dir` and extract its text.
///
/// The saved file is removed when this returns, on every path.
fn save_and_parse(dir: &Path, data: &[u8], file_type: FileType) -> Result<String> {
    let mut saved = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(file_type.extension())
        .tempfile_in(dir)?;
    saved.write_all(data)?;
    saved.flush()?;
    tracing::debug!("Saved upload to {}", saved.path().display());

    FileParser::parse_file(saved.path(), file_type)
}

/// Reduce a client-supplied filename to its final path component
fn sanitize_filename(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    match name {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// POST /upload/ - Parse, chunk, embed and store one document
pub async fn upload_document(
    State(state): State<AppState>,
    api_key: ApiKey,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let start = Instant::now();

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .and_then(sanitize_filename)
            .ok_or_else(|| Error::InvalidRequest("Uploaded file has no filename".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidRequest(format!("Failed to read file: {}", e)))?;

        upload = Some((filename, data));
        break;
    }

    let (filename, data) = upload.ok_or_else(|| {
        Error::InvalidRequest(format!("Missing multipart field '{}'", FILE_FIELD))
    })?;

    let file_type = FileType::from_filename(&filename).ok_or_else(|| {
        let ext = Path::new(&filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        Error::UnsupportedFileType(format!(
            "'{}'. Supported types: {}",
            ext,
            FileType::supported_list()
        ))
    })?;

    tracing::info!("Processing upload: {} ({} bytes)", filename, data.len());

    let dir = state.upload_dir().to_path_buf();
    let text = tokio::task::spawn_blocking(move || save_and_parse(&dir, &data, file_type))
        .await
        .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

    if text.trim().is_empty() {
        return Err(Error::EmptyDocument(
            "Failed to parse document content. Check file format and content.".to_string(),
        ));
    }

    let chunks = Chunk::from_texts(&filename, state.chunker().split(&text));
    if chunks.is_empty() {
        return Err(Error::EmptyDocument(
            "Failed to chunk document text. Document might be empty or unprocessable.".to_string(),
        ));
    }
    tracing::info!("Split {} into {} chunks", filename, chunks.len());

    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let embeddings = state.embedder().embed_batch(&texts, &api_key).await?;
    if embeddings.len() != chunks.len() {
        return Err(Error::CountMismatch {
            chunks: chunks.len(),
            embeddings: embeddings.len(),
        });
    }

    let metadatas = chunks.iter().map(Chunk::metadata).collect();
    let chunk_count = chunks.len();
    let vector_count = state
        .vector_store()
        .add(texts, embeddings, metadatas)
        .await?;

    tracing::info!(
        "Stored {} vectors for {} in {}ms",
        vector_count,
        filename,
        start.elapsed().as_millis()
    );

    Ok(Json(UploadResponse {
        filename,
        message: "Document processed and embeddings stored successfully.".to_string(),
        chunk_count,
        vector_count,
    }))
}
