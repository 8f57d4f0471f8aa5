use actix_web::HttpResponse;

use crate::ErrorResponse;

/// Store-level failures returned to the immediate caller.
///
/// Duplicate slugs on upload are deliberately not an error variant: they are
/// a logged, non-fatal conflict risk and the upload still succeeds.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        StoreError::Validation(reason.into())
    }
}

impl From<StoreError> for HttpResponse {
    fn from(error: StoreError) -> Self {
        match &error {
            StoreError::NotFound(_) => {
                HttpResponse::NotFound().json(ErrorResponse::not_found(&error.to_string()))
            }
            StoreError::Validation(_) => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(&error.to_string()))
            }
            StoreError::Io(_) => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&error.to_string())),
        }
    }
}
