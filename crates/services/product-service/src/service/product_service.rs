//! Product service - Handles product catalog business logic.
//!
//! Applies the role-based visibility rule, the soft-delete state machine and
//! enrichment of every full product response.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{
    Actor, CreateProduct, EnrichedProduct, PageMeta, PageRequest, Paginated, Product,
    ProductReference, ProductSummary, UpdateProduct,
};

use crate::client::UserDirectory;
use crate::repository::ProductRepository;
use crate::service::UserResolver;

/// Product service trait for dependency injection.
///
/// Admins observe active and soft-deleted products; every other actor only
/// observes active ones. The visibility rule applies to every read as well
/// as to the lookups that precede `update`, `restore` and `remove`.
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Create a product owned by `actor`
    async fn create(&self, input: CreateProduct, actor: &Actor) -> AppResult<EnrichedProduct>;

    /// Page through visible products, newest first
    async fn find_all(&self, page: PageRequest, actor: &Actor) -> AppResult<Paginated<EnrichedProduct>>;

    /// Page through visible products without enrichment
    async fn find_all_summary(
        &self,
        page: PageRequest,
        actor: &Actor,
    ) -> AppResult<Paginated<ProductSummary>>;

    /// Get a visible product by ID
    async fn find_one(&self, id: Uuid, actor: &Actor) -> AppResult<EnrichedProduct>;

    /// Get a visible product by code
    async fn find_one_by_code(&self, code: i64, actor: &Actor) -> AppResult<EnrichedProduct>;

    /// Get a visible product by ID without enrichment
    async fn find_one_summary(&self, id: Uuid, actor: &Actor) -> AppResult<ProductSummary>;

    /// Check that every id names an existing product, soft-deleted included
    async fn validate_batch(&self, ids: Vec<Uuid>) -> AppResult<Vec<ProductReference>>;

    /// Apply a field delta to a visible product
    async fn update(&self, input: UpdateProduct, actor: &Actor) -> AppResult<EnrichedProduct>;

    /// Move a soft-deleted product back to active
    async fn restore(&self, id: Uuid, actor: &Actor) -> AppResult<EnrichedProduct>;

    /// Soft delete an active product
    async fn remove(&self, id: Uuid, actor: &Actor) -> AppResult<EnrichedProduct>;
}

/// Concrete implementation of ProductService using repository and identity
/// service.
pub struct ProductManager {
    repo: Arc<dyn ProductRepository>,
    users: UserResolver,
}

impl ProductManager {
    /// Create new product service instance
    pub fn new(repo: Arc<dyn ProductRepository>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            repo,
            users: UserResolver::new(directory),
        }
    }

    /// Load a product under the actor's visibility filter.
    async fn find_visible(&self, id: Uuid, actor: &Actor) -> AppResult<Product> {
        self.repo
            .find_by_id(id, actor.visibility())
            .await?
            .ok_or_not_found(format!("Product with id {} not found", id))
    }

    /// Count and fetch one page under the actor's visibility filter.
    async fn find_page(&self, page: PageRequest, actor: &Actor) -> AppResult<(Vec<Product>, PageMeta)> {
        let visibility = actor.visibility();
        let (total, products) = futures::try_join!(
            self.repo.count(visibility),
            self.repo.find_page(visibility, page.skip(), page.limit()),
        )?;

        Ok((products, PageMeta::new(total, &page)))
    }
}

#[async_trait]
impl ProductService for ProductManager {
    async fn create(&self, input: CreateProduct, actor: &Actor) -> AppResult<EnrichedProduct> {
        let new_product = input.into_new_product(actor.id)?;
        let product = self.repo.insert(new_product).await?;

        info!(product_id = %product.id, code = product.code, actor_id = %actor.id, "Product created");
        self.users.enrich_one(product).await
    }

    async fn find_all(&self, page: PageRequest, actor: &Actor) -> AppResult<Paginated<EnrichedProduct>> {
        let (products, meta) = self.find_page(page, actor).await?;
        let data = self.users.enrich(products).await?;

        Ok(Paginated::new(data, meta))
    }

    async fn find_all_summary(
        &self,
        page: PageRequest,
        actor: &Actor,
    ) -> AppResult<Paginated<ProductSummary>> {
        let (products, meta) = self.find_page(page, actor).await?;

        Ok(Paginated::new(products, meta).map(|p| p.summary()))
    }

    async fn find_one(&self, id: Uuid, actor: &Actor) -> AppResult<EnrichedProduct> {
        let product = self.find_visible(id, actor).await?;
        self.users.enrich_one(product).await
    }

    async fn find_one_by_code(&self, code: i64, actor: &Actor) -> AppResult<EnrichedProduct> {
        let product = self
            .repo
            .find_by_code(code, actor.visibility())
            .await?
            .ok_or_not_found(format!("Product with code {} not found", code))?;

        self.users.enrich_one(product).await
    }

    async fn find_one_summary(&self, id: Uuid, actor: &Actor) -> AppResult<ProductSummary> {
        Ok(self.find_visible(id, actor).await?.summary())
    }

    async fn validate_batch(&self, ids: Vec<Uuid>) -> AppResult<Vec<ProductReference>> {
        let mut seen = HashSet::with_capacity(ids.len());
        let unique: Vec<Uuid> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let products = self.repo.find_by_ids(&unique).await?;

        if products.len() != unique.len() {
            let requested: Vec<String> = ids.iter().map(Uuid::to_string).collect();
            return Err(AppError::invalid_input(format!(
                "Some products were not found: {}",
                requested.join(", ")
            )));
        }

        Ok(products.iter().map(Product::reference).collect())
    }

    async fn update(&self, input: UpdateProduct, actor: &Actor) -> AppResult<EnrichedProduct> {
        let (id, delta) = input.into_parts()?;
        let visibility = actor.visibility();

        self.find_one_summary(id, actor).await?;

        let product = self
            .repo
            .update_fields(id, delta, actor.id, visibility)
            .await?
            .ok_or_else(|| {
                warn!(product_id = %id, "Product deleted while being updated");
                AppError::invalid_state(format!("Product with id {} was deleted while being updated", id))
            })?;

        info!(product_id = %id, actor_id = %actor.id, "Product updated");
        self.users.enrich_one(product).await
    }

    async fn restore(&self, id: Uuid, actor: &Actor) -> AppResult<EnrichedProduct> {
        let product = self.find_visible(id, actor).await?;
        product.ensure_restorable()?;

        let restored = self
            .repo
            .mark_restored(id, actor.id)
            .await?
            .ok_or_else(|| AppError::invalid_state(format!("Product with id {} is not deleted", id)))?;

        info!(product_id = %id, actor_id = %actor.id, "Product restored");
        self.users.enrich_one(restored).await
    }

    async fn remove(&self, id: Uuid, actor: &Actor) -> AppResult<EnrichedProduct> {
        let product = self.find_visible(id, actor).await?;
        product.ensure_removable()?;

        let removed = self
            .repo
            .mark_deleted(id, actor.id, Utc::now())
            .await?
            .ok_or_else(|| AppError::invalid_state(format!("Product with id {} is already deleted", id)))?;

        info!(product_id = %id, actor_id = %actor.id, "Product removed");
        self.users.enrich_one(removed).await
    }
}
