//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::app::catalog::validation::ValidationError;

/// 核心错误类型
///
/// `Display` 即调用方看到的错误信息；`Internal` 的细节只写日志。
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: Invalid or missing API key")]
    Unauthorized,
    #[error("{0}")]
    InvalidInput(#[from] ValidationError),
    #[error("Product not found")]
    NotFound,
    #[error("Route not found")]
    RouteNotFound,
    #[error("Something went wrong!")]
    Internal(String),
}

/// 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!("请求处理内部错误: {}", detail);
        }

        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
