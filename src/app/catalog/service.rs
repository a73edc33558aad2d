//! 商品目录存储与业务服务

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Number;
use thiserror::Error;
use tracing::{debug, info};

use super::model::{Product, ProductDraft};
use super::query::{self, ProductPage, ProductQuery};
use crate::core::error::ApiError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("商品 {0} 不存在")]
    NotFound(String),
    #[error("商品目录锁已中毒")]
    LockPoisoned,
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => ApiError::NotFound,
            CatalogError::LockPoisoned => ApiError::Internal(err.to_string()),
        }
    }
}

/// 内存商品存储，保持插入顺序
#[derive(Debug, Default)]
pub struct CatalogStore {
    products: Vec<Product>,
}

impl CatalogStore {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// 启动时的三条示例数据
    pub fn seeded() -> Self {
        Self::new(vec![
            seed_product(
                "1",
                "Laptop",
                "High-performance laptop with 16GB RAM",
                1200,
                "electronics",
                true,
            ),
            seed_product(
                "2",
                "Smartphone",
                "Latest model with 128GB storage",
                800,
                "electronics",
                true,
            ),
            seed_product(
                "3",
                "Coffee Maker",
                "Programmable coffee maker with timer",
                50,
                "kitchen",
                false,
            ),
        ])
    }

    /// 当前全部记录的快照
    pub fn list(&self) -> Vec<Product> {
        self.products.clone()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// 追加记录，id 由调用方保证唯一
    pub fn insert(&mut self, product: Product) {
        self.products.push(product);
    }

    pub fn replace(&mut self, id: &str, product: Product) -> Result<(), CatalogError> {
        let slot = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        *slot = product;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Product, CatalogError> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        Ok(self.products.remove(index))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn seed_product(
    id: &str,
    name: &str,
    description: &str,
    price: u64,
    category: &str,
    in_stock: bool,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price: Number::from(price),
        category: category.to_string(),
        in_stock,
    }
}

/// 进程内共享的商品服务
///
/// 所有读写都经过同一把读写锁。
#[derive(Clone, Default)]
pub struct ProductService {
    store: Arc<RwLock<CatalogStore>>,
}

impl ProductService {
    pub fn new(store: CatalogStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogStore>, CatalogError> {
        self.store.read().map_err(|_| CatalogError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CatalogStore>, CatalogError> {
        self.store.write().map_err(|_| CatalogError::LockPoisoned)
    }

    pub fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let snapshot = self.read()?.list();
        let page = query::query_products(snapshot, query);
        debug!(
            "查询商品: 匹配 {} 条, 第 {} 页 / 共 {} 页",
            page.total, page.page, page.total_pages
        );
        Ok(page)
    }

    pub fn stats(&self) -> Result<BTreeMap<String, usize>, ApiError> {
        let store = self.read()?;
        Ok(query::category_stats(&store.products))
    }

    pub fn get_product(&self, id: &str) -> Result<Product, ApiError> {
        self.read()?
            .find_by_id(id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    pub fn create_product(&self, draft: ProductDraft) -> Result<Product, ApiError> {
        let product = Product::create(draft);
        self.write()?.insert(product.clone());
        info!("✅ 已创建商品 {} ({})", product.id, product.name);
        Ok(product)
    }

    pub fn update_product(&self, id: &str, draft: ProductDraft) -> Result<Product, ApiError> {
        let mut store = self.write()?;
        let updated = store
            .find_by_id(id)
            .ok_or(ApiError::NotFound)?
            .merged(draft);
        store.replace(id, updated.clone())?;
        info!("✅ 已更新商品 {}", id);
        Ok(updated)
    }

    pub fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        let removed = self.write()?.remove(id)?;
        info!("🗑️ 已删除商品 {} ({})", removed.id, removed.name);
        Ok(())
    }

    pub fn count(&self) -> Result<usize, ApiError> {
        Ok(self.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Item {}", id),
            description: String::new(),
            price: Number::from(10),
            category: "misc".to_string(),
            in_stock: true,
        }
    }

    fn draft(price: u64) -> ProductDraft {
        ProductDraft {
            name: "Desk Lamp".to_string(),
            description: None,
            price: Number::from(price),
            category: "home".to_string(),
            in_stock: None,
        }
    }

    #[test]
    fn test_seeded_store() {
        let store = CatalogStore::seeded();
        assert_eq!(store.len(), 3);
        let ids: Vec<_> = store.list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_store_insert_find_replace_remove() {
        let mut store = CatalogStore::default();
        assert!(store.is_empty());

        store.insert(product("a"));
        store.insert(product("b"));
        assert_eq!(store.find_by_id("b").unwrap().name, "Item b");
        assert!(store.find_by_id("c").is_none());

        let mut renamed = product("a");
        renamed.name = "Renamed".to_string();
        store.replace("a", renamed).unwrap();
        assert_eq!(store.list()[0].name, "Renamed");

        assert_eq!(
            store.replace("zzz", product("zzz")),
            Err(CatalogError::NotFound("zzz".to_string()))
        );

        store.remove("a").unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.remove("a").is_err());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut store = CatalogStore::seeded();
        let snapshot = store.list();
        store.remove("1").unwrap();
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_service_create_then_get() {
        let service = ProductService::new(CatalogStore::seeded());
        let created = service.create_product(draft(25)).unwrap();

        assert_eq!(service.get_product(&created.id).unwrap(), created);
        assert_eq!(service.count().unwrap(), 4);
    }

    #[test]
    fn test_service_update_merges() {
        let service = ProductService::new(CatalogStore::seeded());
        let updated = service.update_product("3", draft(60)).unwrap();

        assert_eq!(updated.id, "3");
        assert_eq!(updated.price, Number::from(60));
        assert!(!updated.in_stock);
        assert_eq!(updated.description, "Programmable coffee maker with timer");
        assert_eq!(service.get_product("3").unwrap(), updated);
    }

    #[test]
    fn test_service_missing_ids() {
        let service = ProductService::new(CatalogStore::seeded());

        assert!(matches!(service.get_product("nope"), Err(ApiError::NotFound)));
        assert!(matches!(
            service.update_product("nope", draft(1)),
            Err(ApiError::NotFound)
        ));
        service.delete_product("1").unwrap();
        assert!(matches!(service.delete_product("1"), Err(ApiError::NotFound)));
    }

    #[test]
    fn test_service_stats() {
        let service = ProductService::new(CatalogStore::seeded());
        let stats = service.stats().unwrap();
        assert_eq!(stats.get("electronics"), Some(&2));
        assert_eq!(stats.get("kitchen"), Some(&1));
    }

    #[test]
    fn test_concurrent_inserts_are_serialized() {
        let service = ProductService::new(CatalogStore::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        service.create_product(draft(1)).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(service.count().unwrap(), 400);
    }
}
