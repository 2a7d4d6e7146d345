//! Shared HTTP types: error body, domain error mapping, paging wrapper

mod validated_json;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::{IntoParams, ToSchema};

use crate::shared::errors::{DomainError, ErrorClass};
use crate::shared::{PagedResult, PaginationParams};

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status code, repeated in the body
    pub status_code: u16,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
        }
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Domain failure on its way out of a handler
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

pub fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::Conflict => StatusCode::CONFLICT,
        ErrorClass::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorClass::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.class());

        let message = if self.0.is_expected() {
            warn!(reason = self.0.reason(), "Controlled error: {}", self.0);
            self.0.to_string()
        } else {
            error!(error = ?self.0, "Unexpected error: {}", self.0);
            format!("An unexpected error occurred: {}.", self.0)
        };

        ErrorResponse::new(status, message).into_response_with(status)
    }
}

/// `?pageNumber=&pageSize=` query
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct PageQuery {
    /// 1-based page number. Default: 1
    #[serde(default = "default_page_number")]
    pub page_number: u64,
    /// Items per page. Default: 10
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page_number() -> u64 {
    1
}

fn default_page_size() -> u64 {
    10
}

impl PageQuery {
    pub fn params(&self) -> Result<PaginationParams, ApiError> {
        Ok(PaginationParams::new(self.page_number, self.page_size)?)
    }
}

/// Paged listing body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    /// Size of the whole result set, across all pages
    pub total_count: u64,
    pub page_number: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T, U: Into<T>> From<PagedResult<U>> for PagedResponse<T> {
    fn from(page: PagedResult<U>) -> Self {
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            total_count: page.total_count,
            page_number: page.page_number,
            page_size: page.page_size,
            total_pages: page.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::errors::InfraError;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn expected_errors_keep_their_message() {
        let response = ApiError(DomainError::AlreadyOccupied {
            spot_id: "S1".into(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_of(response).await;
        assert_eq!(body.status_code, 409);
        assert!(body.message.contains("already occupied"));
    }

    #[tokio::test]
    async fn internal_errors_are_wrapped() {
        let err = DomainError::Storage(InfraError::Database(sea_orm::DbErr::Custom(
            "disk full".into(),
        )));
        let response = ApiError(err).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert!(body.message.starts_with("An unexpected error occurred:"));
        assert!(body.message.contains("disk full"));
    }

    #[test]
    fn every_class_has_a_status() {
        assert_eq!(status_for(ErrorClass::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorClass::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status_for(ErrorClass::InvalidArgument), StatusCode::BAD_REQUEST);
    }
}
