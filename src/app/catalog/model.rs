//! 商品目录数据模型

use serde::{Deserialize, Serialize};
use serde_json::Number;
use uuid::Uuid;

/// 商品记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// 保留调用方提交时的数字写法
    pub price: Number,
    pub category: String,
    pub in_stock: bool,
}

/// 通过校验并规范化之后的商品字段
///
/// `description` 与 `in_stock` 为可选字段：创建时缺省为 `""` / `true`，
/// 更新时缺省则沿用已有记录的值。
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Number,
    pub category: String,
    pub in_stock: Option<bool>,
}

impl Product {
    /// 用新生成的 id 构建记录，调用方传入的 id 一律忽略
    pub fn create(draft: ProductDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            description: draft.description.unwrap_or_default(),
            price: draft.price,
            category: draft.category,
            in_stock: draft.in_stock.unwrap_or(true),
        }
    }

    /// 合并更新：必填字段总是覆盖，可选字段缺省时保留原值
    pub fn merged(&self, draft: ProductDraft) -> Self {
        Self {
            id: self.id.clone(),
            name: draft.name,
            description: draft
                .description
                .unwrap_or_else(|| self.description.clone()),
            price: draft.price,
            category: draft.category,
            in_stock: draft.in_stock.unwrap_or(self.in_stock),
        }
    }
}
