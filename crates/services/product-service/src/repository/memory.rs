//! In-memory product repository for tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::ProductRepository;
use common::{AppError, AppResult};
use domain::{DeleteState, NewProduct, Product, ProductDelta, Visibility};

/// Mirrors [`super::ProductStore`] semantics over a `Vec`, including the
/// guarded writes.
#[derive(Default)]
pub struct InMemoryProductStore {
    products: Mutex<Vec<Product>>,
    next_code: AtomicI64,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing products.
    pub fn with_products(products: Vec<Product>) -> Self {
        let next_code = products.iter().map(|p| p.code).max().unwrap_or(0);
        Self {
            products: Mutex::new(products),
            next_code: AtomicI64::new(next_code),
        }
    }

    /// Copy of every stored product, soft-deleted included.
    pub fn snapshot(&self) -> Vec<Product> {
        self.lock().map(|products| products.clone()).unwrap_or_default()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Vec<Product>>> {
        self.products
            .lock()
            .map_err(|_| AppError::internal("product store lock poisoned"))
    }

    fn modify<F>(&self, id: Uuid, f: F) -> AppResult<Option<Product>>
    where
        F: FnOnce(&mut Product) -> bool,
    {
        let mut products = self.lock()?;
        Ok(products
            .iter_mut()
            .find(|p| p.id == id)
            .and_then(|p| f(p).then(|| p.clone())))
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductStore {
    async fn count(&self, visibility: Visibility) -> AppResult<u64> {
        let products = self.lock()?;
        Ok(products.iter().filter(|p| visibility.admits(p.is_deleted())).count() as u64)
    }

    async fn find_page(&self, visibility: Visibility, skip: u64, limit: u64) -> AppResult<Vec<Product>> {
        let mut visible: Vec<Product> = self
            .lock()?
            .iter()
            .filter(|p| visibility.admits(p.is_deleted()))
            .cloned()
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.code.cmp(&a.code)));

        Ok(visible
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_by_id(&self, id: Uuid, visibility: Visibility) -> AppResult<Option<Product>> {
        let products = self.lock()?;
        Ok(products
            .iter()
            .find(|p| p.id == id && visibility.admits(p.is_deleted()))
            .cloned())
    }

    async fn find_by_code(&self, code: i64, visibility: Visibility) -> AppResult<Option<Product>> {
        let products = self.lock()?;
        Ok(products
            .iter()
            .find(|p| p.code == code && visibility.admits(p.is_deleted()))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        let products = self.lock()?;
        Ok(products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn insert(&self, product: NewProduct) -> AppResult<Product> {
        let product = Product {
            id: Uuid::new_v4(),
            name: product.name,
            price: product.price.amount(),
            code: self.next_code.fetch_add(1, Ordering::SeqCst) + 1,
            created_at: Utc::now(),
            created_by_id: product.created_by_id,
            updated_by_id: None,
            delete_state: DeleteState::Active,
        };

        self.lock()?.push(product.clone());
        Ok(product)
    }

    async fn update_fields(
        &self,
        id: Uuid,
        delta: ProductDelta,
        updated_by: Uuid,
        visibility: Visibility,
    ) -> AppResult<Option<Product>> {
        self.modify(id, |p| {
            if !visibility.admits(p.is_deleted()) {
                return false;
            }
            p.apply(&delta, updated_by);
            true
        })
    }

    async fn mark_deleted(&self, id: Uuid, deleted_by: Uuid, at: DateTime<Utc>) -> AppResult<Option<Product>> {
        self.modify(id, |p| p.remove(deleted_by, at).is_ok())
    }

    async fn mark_restored(&self, id: Uuid, restored_by: Uuid) -> AppResult<Option<Product>> {
        self.modify(id, |p| p.restore(restored_by).is_ok())
    }
}
