use actix_web::{http::StatusCode, HttpResponse};
use slotbook_api_structs::APIErrorResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotbookError {
    #[error("Internal server error")]
    InternalError,
    #[error("Invalid time format. Error message: `{0}`")]
    InvalidTimeFormat(String),
    #[error("Invalid time range. Error message: `{0}`")]
    InvalidRange(String),
    #[error("Invalid data provided. Error message: `{0}`")]
    BadClientData(String),
    #[error("404 Not found. Error message: `{0}`")]
    NotFound(String),
    #[error("The requested state change is not allowed. Error message: `{0}`")]
    InvalidState(String),
    #[error("There was a conflict with the request. Error message: `{0}`")]
    Conflict(String),
}

impl SlotbookError {
    /// Stable identifier of the error kind, sent along with every error response
    pub fn category(&self) -> &'static str {
        match self {
            Self::InternalError => "INTERNAL_ERROR",
            Self::InvalidTimeFormat(_) => "INVALID_TIME_FORMAT",
            Self::InvalidRange(_) => "INVALID_RANGE",
            Self::BadClientData(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Conflict(_) => "CONFLICT",
        }
    }
}

impl actix_web::error::ResponseError for SlotbookError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidTimeFormat(_) | Self::InvalidRange(_) | Self::BadClientData(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidState(_) | Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(APIErrorResponse {
            category: self.category().into(),
            message: self.to_string(),
        })
    }
}
