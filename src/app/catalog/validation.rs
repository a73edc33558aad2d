//! 商品请求体校验
//!
//! 先把请求体解码成 [`ProductCandidate`]，再按固定顺序逐条检查，第一条失败即返回。

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use super::model::ProductDraft;

/// 校验失败原因，`Display` 即返回给调用方的错误信息
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required and must be a non-empty string")]
    Name,
    #[error("Price must be a positive number")]
    Price,
    #[error("Category is required and must be a non-empty string")]
    Category,
    #[error("Description must be a string")]
    Description,
    #[error("inStock must be a boolean")]
    InStock,
}

impl ValidationError {
    /// 出错的字段名
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Name => "name",
            ValidationError::Price => "price",
            ValidationError::Category => "category",
            ValidationError::Description => "description",
            ValidationError::InStock => "inStock",
        }
    }
}

/// 待校验的请求体
///
/// 每个字段区分“缺失”(`None`) 与“出现但为 null”(`Some(Value::Null)`)。
/// 未知字段（包括调用方传入的 `id`）直接忽略。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCandidate {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub price: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub in_stock: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// 请求体无法按 JSON 解码，属于内部错误而非校验失败
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("JSON 请求体顶层必须是对象或数组")]
    NotStrict,
    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),
}

/// `application/json` 或 `application/*+json`
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

impl ProductCandidate {
    /// 从原始请求体解码
    ///
    /// 非 JSON 类型或空体视为没有任何字段；JSON 顶层只接受对象或数组，数组同样视为没有字段。
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> Result<Self, BodyError> {
        if !content_type.is_some_and(is_json_content_type) {
            return Ok(Self::default());
        }

        match body.iter().find(|b| !b.is_ascii_whitespace()) {
            None => return Ok(Self::default()),
            Some(b'{') | Some(b'[') => {}
            Some(_) => return Err(BodyError::NotStrict),
        }

        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

/// 按顺序校验并规范化：name → price → category → description → inStock
pub fn validate_product(candidate: ProductCandidate) -> Result<ProductDraft, ValidationError> {
    let name = required_text(candidate.name).ok_or(ValidationError::Name)?;

    // 保留调用方的数字写法，20 原样返回而不是 20.0
    let price = match candidate.price {
        Some(Value::Number(n)) if n.as_f64().is_some_and(|p| p > 0.0) => n,
        _ => return Err(ValidationError::Price),
    };

    let category = required_text(candidate.category).ok_or(ValidationError::Category)?;

    let description = match candidate.description {
        None => None,
        Some(Value::String(text)) => Some(text.trim().to_string()),
        Some(_) => return Err(ValidationError::Description),
    };

    let in_stock = match candidate.in_stock {
        None => None,
        Some(Value::Bool(flag)) => Some(flag),
        Some(_) => return Err(ValidationError::InStock),
    };

    Ok(ProductDraft {
        name,
        description,
        price,
        category: category.to_lowercase(),
        in_stock,
    })
}

fn required_text(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}
