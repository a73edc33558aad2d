//! 核心中间件模块
//!
//! 请求依次经过：日志（所有请求）→ API Key 校验（写操作）→ 请求体校验（创建/更新）→ 处理器。
//! 后两步以提取器的形式挂在处理器参数上，axum 保证先执行 parts 提取器，再读取请求体。
//! 因此缺少密钥的请求即使请求体无法解析也先得到 401。

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRef, FromRequest, FromRequestParts, Request},
    http::{header::CONTENT_TYPE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use super::error::ApiError;
use crate::app::catalog::{
    model::ProductDraft,
    validation::{validate_product, ProductCandidate},
};

/// 携带共享密钥的请求头
pub const API_KEY_HEADER: &str = "x-api-key";

/// 请求日志中间件
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    info!("[{}] {} {}", chrono::Utc::now().to_rfc3339(), method, uri);

    let response = next.run(req).await;

    info!(
        "{} {} - {} - {}ms",
        method,
        uri,
        response.status(),
        start.elapsed().as_millis()
    );

    response
}

/// 配置的共享密钥
#[derive(Clone)]
pub struct ApiKey(pub Arc<str>);

impl ApiKey {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    fn matches(&self, candidate: &str) -> bool {
        *self.0 == *candidate
    }
}

/// API Key 守卫，只挂在写操作的处理器上
#[derive(Debug, Clone, Copy)]
pub struct RequireApiKey;

#[async_trait]
impl<S> FromRequestParts<S> for RequireApiKey
where
    ApiKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let expected = ApiKey::from_ref(state);
        let supplied = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|h| h.to_str().ok());

        match supplied {
            Some(key) if expected.matches(key) => Ok(RequireApiKey),
            _ => {
                warn!("拒绝未授权请求: {} {}", parts.method, parts.uri);
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// 已通过校验的商品请求体
#[derive(Debug, Clone)]
pub struct ValidatedProduct(pub ProductDraft);

#[async_trait]
impl<S> FromRequest<S> for ValidatedProduct
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(str::to_owned);

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Internal(format!("读取请求体失败: {}", e)))?;

        // 无法解析的 JSON 与其他意外故障一样返回 500
        let candidate = ProductCandidate::from_body(content_type.as_deref(), &body)
            .map_err(|e| ApiError::Internal(format!("请求体解析失败: {}", e)))?;
        let draft = validate_product(candidate).map_err(|e| {
            warn!("请求体校验失败: 字段 {} - {}", e.field(), e);
            e
        })?;

        Ok(ValidatedProduct(draft))
    }
}

/// 处理器 panic 时的兜底响应，细节只进日志
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::Internal(format!("处理器 panic: {}", detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_api_key_matching() {
        let key = ApiKey::new("secret");
        assert!(key.matches("secret"));
        assert!(!key.matches("Secret"));
        assert!(!key.matches(""));
    }

    #[test]
    fn test_panic_maps_to_internal_error() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = handle_panic(Box::new(String::from("boom")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = handle_panic(Box::new(42_u8));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
