//! # 商品目录 REST API
//!
//! 基于 Axum 的单资源内存商品目录服务：
//! - 列表查询（分类过滤、名称搜索、分页）、按 id 查询、分类统计
//! - 创建、更新、删除，写操作需要 `x-api-key` 共享密钥
//! - 数据只保存在进程内存中，重启后恢复为三条示例数据

pub mod app;
pub mod core;
pub mod infrastructure;

pub use app::build_app;
pub use app::catalog::handler::AppState;
pub use infrastructure::config::Config;
