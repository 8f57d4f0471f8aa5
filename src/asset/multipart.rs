//! Multipart parsing for the upload and replace endpoints.
//!
//! The file part is streamed chunk by chunk into a spool file under the data
//! directory; the blob backend later promotes that file with a rename, so the
//! payload is never buffered whole in memory.

use std::io::Write;
use std::path::Path;

use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures::StreamExt;
use sanitize_filename::sanitize;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("Invalid metadata: {0}")]
    MetadataError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data: {0}")]
    Utf8Error(String),
}

impl From<MultipartParseError> for HttpResponse {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::IoError(_) => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("{}", error))),
            _ => HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!("{}", error))),
        }
    }
}

/// Fields extracted from an upload or replace request. Only `file` is
/// mandatory; the store validates the rest.
pub struct ParsedUpload {
    pub spooled: NamedTempFile,
    pub filename: String,
    pub content_type: Option<String>,
    pub category: Option<String>,
    pub section: Option<String>,
    pub slug: Option<String>,
    pub order: Option<i64>,
    pub poster_asset_id: Option<Uuid>,
}

async fn read_text_field(
    field: &mut actix_multipart::Field,
) -> Result<String, MultipartParseError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
        bytes.extend_from_slice(&data);
    }
    String::from_utf8(bytes).map_err(|e| MultipartParseError::Utf8Error(e.to_string()))
}

pub async fn parse_asset_multipart(
    mut multipart: Multipart,
    spool_dir: &Path,
) -> Result<ParsedUpload, MultipartParseError> {
    let mut spooled: Option<NamedTempFile> = None;
    let mut filename = String::new();
    let mut content_type: Option<String> = None;
    let mut category: Option<String> = None;
    let mut section: Option<String> = None;
    let mut slug: Option<String> = None;
    let mut order: Option<i64> = None;
    let mut poster_asset_id: Option<Uuid> = None;

    while let Some(item) = multipart.next().await {
        let mut field = item.map_err(|e| MultipartParseError::FieldError(e.to_string()))?;
        let content_disposition = field.content_disposition().ok_or_else(|| {
            MultipartParseError::FieldError("Content disposition not found".to_string())
        })?;
        let field_name = content_disposition
            .get_name()
            .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?
            .to_string();

        match field_name.as_str() {
            "file" => {
                let original = content_disposition
                    .get_filename()
                    .ok_or_else(|| {
                        MultipartParseError::FieldError("No filename in file field".to_string())
                    })?
                    .to_string();
                filename = sanitize(&original);
                // The part's own MIME type is a fallback; an explicit
                // content_type field still wins.
                let part_mime = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .filter(|m| m != "application/octet-stream");

                let mut temp = NamedTempFile::new_in(spool_dir)
                    .map_err(|e| MultipartParseError::IoError(e.to_string()))?;
                while let Some(chunk) = field.next().await {
                    let data = chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
                    temp.write_all(&data)
                        .map_err(|e| MultipartParseError::IoError(e.to_string()))?;
                }
                temp.flush()
                    .map_err(|e| MultipartParseError::IoError(e.to_string()))?;

                if content_type.is_none() {
                    content_type = part_mime;
                }
                spooled = Some(temp);
            }
            "content_type" => {
                content_type = Some(read_text_field(&mut field).await?);
            }
            "category" => {
                category = Some(read_text_field(&mut field).await?);
            }
            "section" => {
                section = Some(read_text_field(&mut field).await?);
            }
            "slug" => {
                slug = Some(read_text_field(&mut field).await?);
            }
            "order" => {
                let value = read_text_field(&mut field).await?;
                order = Some(value.trim().parse().map_err(|_| {
                    MultipartParseError::MetadataError(format!("invalid order '{}'", value))
                })?);
            }
            "poster_asset_id" => {
                let value = read_text_field(&mut field).await?;
                poster_asset_id = Some(Uuid::parse_str(value.trim()).map_err(|_| {
                    MultipartParseError::MetadataError(format!(
                        "invalid poster asset id '{}'",
                        value
                    ))
                })?);
            }
            _ => {
                continue;
            }
        }
    }

    match spooled {
        Some(spooled) => Ok(ParsedUpload {
            spooled,
            filename,
            content_type,
            category,
            section,
            slug,
            order,
            poster_asset_id,
        }),
        None => Err(MultipartParseError::FieldError(
            "No file was uploaded".to_string(),
        )),
    }
}
