//! 商品查询：过滤、搜索、分页与分类统计

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::model::Product;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// 规范化之后的查询参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ProductQuery {
    /// 从原始查询字符串参数构建
    ///
    /// 非数字的 page/limit 取默认值；page 为 0 视为 1，负数保留；
    /// limit 不大于 0 取默认值，超过上限截断为 100。
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let page = params
            .get("page")
            .and_then(|raw| leading_int(raw))
            .filter(|page| *page != 0)
            .unwrap_or(DEFAULT_PAGE);

        let limit = params
            .get("limit")
            .and_then(|raw| leading_int(raw))
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);

        Self {
            category: non_empty(params.get("category")),
            search: non_empty(params.get("search")),
            page,
            limit,
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// 解析字符串开头的整数部分，如 `"2abc"` → 2，`"2.9"` → 2，`"abc"` → None
fn leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    // 溢出时饱和到边界值
    let magnitude = rest[..digits_end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// 一页查询结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: usize,
    pub page: i64,
    pub total_pages: usize,
}

/// 在快照上执行过滤与分页
pub fn query_products(snapshot: Vec<Product>, query: &ProductQuery) -> ProductPage {
    let category = query.category.as_ref().map(|c| c.to_lowercase());
    let search = query.search.as_ref().map(|s| s.to_lowercase());

    let filtered: Vec<Product> = snapshot
        .into_iter()
        .filter(|p| {
            category
                .as_ref()
                .map_or(true, |c| p.category.to_lowercase() == *c)
        })
        .filter(|p| {
            search
                .as_ref()
                .map_or(true, |s| p.name.to_lowercase().contains(s.as_str()))
        })
        .collect();

    let total = filtered.len();
    let limit = query.limit.max(1);
    let total_pages = total.div_ceil(limit as usize);

    let products = match query.page.checked_sub(1).and_then(|p| p.checked_mul(limit)) {
        Some(start) if start >= 0 => filtered
            .into_iter()
            .skip(start as usize)
            .take(limit as usize)
            .collect(),
        _ => Vec::new(),
    };

    ProductPage {
        products,
        total,
        page: query.page,
        total_pages,
    }
}

/// 按分类统计全部记录
pub fn category_stats(snapshot: &[Product]) -> BTreeMap<String, usize> {
    snapshot.iter().fold(BTreeMap::new(), |mut acc, product| {
        *acc.entry(product.category.clone()).or_insert(0) += 1;
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::catalog::service::CatalogStore;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn seed() -> Vec<Product> {
        CatalogStore::seeded().list()
    }

    #[test]
    fn test_defaults() {
        let query = ProductQuery::from_params(&HashMap::new());
        assert_eq!(query, ProductQuery::default());
    }

    #[test]
    fn test_page_and_limit_parsing() {
        let query = ProductQuery::from_params(&params(&[("page", "abc"), ("limit", "xyz")]));
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);

        let query = ProductQuery::from_params(&params(&[("page", "2abc"), ("limit", "2.9")]));
        assert_eq!(query.page, 2);
        assert_eq!(query.limit, 2);

        let query = ProductQuery::from_params(&params(&[("page", "0"), ("limit", "0")]));
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);

        let query = ProductQuery::from_params(&params(&[("page", "-2"), ("limit", "-5")]));
        assert_eq!(query.page, -2);
        assert_eq!(query.limit, 10);
    }

    #[test]
    fn test_limit_is_clamped() {
        let query = ProductQuery::from_params(&params(&[("limit", "500")]));
        assert_eq!(query.limit, MAX_LIMIT);
    }

    #[test]
    fn test_empty_filters_are_ignored() {
        let query = ProductQuery::from_params(&params(&[("category", ""), ("search", "")]));
        assert_eq!(query.category, None);
        assert_eq!(query.search, None);
    }

    #[test]
    fn test_category_filter_is_case_insensitive() {
        let query = ProductQuery::from_params(&params(&[("category", "ELECTRONICS")]));
        let page = query_products(seed(), &query);

        assert_eq!(page.total, 2);
        assert!(page.products.iter().all(|p| p.category == "electronics"));
    }

    #[test]
    fn test_search_matches_substring() {
        let query = ProductQuery::from_params(&params(&[("search", "PHONE")]));
        let page = query_products(seed(), &query);

        assert_eq!(page.total, 1);
        assert_eq!(page.products[0].name, "Smartphone");
    }

    #[test]
    fn test_pagination_slices_and_counts_pages() {
        let query = ProductQuery::from_params(&params(&[("page", "2"), ("limit", "2")]));
        let page = query_products(seed(), &query);

        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.products[0].id, "3");
    }

    #[test]
    fn test_out_of_range_pages_are_empty() {
        let beyond = query_products(seed(), &ProductQuery { page: 9, ..Default::default() });
        assert!(beyond.products.is_empty());
        assert_eq!(beyond.total, 3);

        let negative = query_products(seed(), &ProductQuery { page: -1, ..Default::default() });
        assert!(negative.products.is_empty());
        assert_eq!(negative.page, -1);
    }

    #[test]
    fn test_no_matches_yield_zero_pages() {
        let query = ProductQuery::from_params(&params(&[("category", "garden")]));
        let page = query_products(seed(), &query);

        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_category_stats() {
        let stats = category_stats(&seed());
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["electronics"], 2);
        assert_eq!(stats["kitchen"], 1);
    }
}
