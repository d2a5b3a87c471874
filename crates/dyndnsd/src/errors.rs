use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dyndns_core::{DirectoryStage, Error};

/// Core error rendered as a dyndns plain-text reply
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status and body for this error
    pub fn status_and_body(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            Error::MissingFields => (StatusCode::BAD_REQUEST, "Missing hostname or IP address"),
            Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid hostname"),
            Error::NoValidAddress(_) => (StatusCode::BAD_REQUEST, "Invalid IPv4/6 address"),
            Error::HostnameNotAllowed(_) => (
                StatusCode::FORBIDDEN,
                "Forbidden: This hostname is not allowed",
            ),
            Error::HostnameNotManaged(_) => (StatusCode::NOT_FOUND, "Hostname not managed"),
            Error::ZoneNotFound(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching zone ID"),
            Error::Directory { stage, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                match stage {
                    DirectoryStage::ZoneLookup => "Error fetching zone ID",
                    DirectoryStage::Listing => "Error fetching DNS records",
                    DirectoryStage::Mutation => "Error updating the record",
                },
            ),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Error updating the record"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.status_and_body().into_response()
    }
}
