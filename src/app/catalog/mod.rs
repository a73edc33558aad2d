//! 商品目录

pub mod handler;
pub mod model;
pub mod query;
pub mod service;
pub mod validation;
