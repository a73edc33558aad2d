//! 应用层：路由装配

pub mod catalog;

use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
};

use crate::core::{
    error::ApiError,
    middleware::{handle_panic, request_logging_middleware},
};
use catalog::handler::{self, AppState};

pub const WELCOME_BANNER: &str =
    "Welcome to the Product API! Go to /api/products to see all products.";

/// 构建完整的路由（生产与测试共用）
///
/// `/api/products/stats` 是静态段，优先于 `/api/products/:id` 匹配。
/// 已知路径上的未注册方法同样返回 404。
/// 末尾斜杠在路由之前去掉，`/api/products/` 与 `/api/products` 等价。
///
/// 返回值需通过 `axum::ServiceExt::into_make_service` 交给 `axum::serve`。
pub fn build_app(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/", get(welcome).fallback(route_not_found))
        .route(
            "/api/products",
            get(handler::list_products)
                .post(handler::create_product)
                .fallback(route_not_found),
        )
        .route(
            "/api/products/stats",
            get(handler::product_stats).fallback(route_not_found),
        )
        .route(
            "/api/products/:id",
            get(handler::get_product)
                .put(handler::update_product)
                .delete(handler::delete_product)
                .fallback(route_not_found),
        )
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state);

    ServiceBuilder::new()
        .layer(NormalizePathLayer::trim_trailing_slash())
        .service(router)
}

async fn welcome() -> &'static str {
    WELCOME_BANNER
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}
