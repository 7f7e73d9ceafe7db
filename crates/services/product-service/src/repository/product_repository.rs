//! Product repository implementation with soft delete support.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, UpdateMany,
};
use uuid::Uuid;

use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use common::{AppError, AppResult};
use domain::{NewProduct, Product, ProductDelta, Visibility};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product repository trait for dependency injection.
///
/// Read methods take a [`Visibility`] so that the caller's role decides
/// whether soft-deleted rows are considered. The three write methods that
/// follow a read are guarded: they only touch the row if it is still in the
/// state the caller checked, and return `Ok(None)` otherwise.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Count products passing the visibility filter
    async fn count(&self, visibility: Visibility) -> AppResult<u64>;

    /// Fetch one page, newest first
    async fn find_page(&self, visibility: Visibility, skip: u64, limit: u64) -> AppResult<Vec<Product>>;

    /// Find product by ID under the visibility filter
    async fn find_by_id(&self, id: Uuid, visibility: Visibility) -> AppResult<Option<Product>>;

    /// Find product by code under the visibility filter
    async fn find_by_code(&self, code: i64, visibility: Visibility) -> AppResult<Option<Product>>;

    /// Find all products with the given IDs, soft-deleted included
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Product>>;

    /// Insert a new product; the store assigns id, code and creation time
    async fn insert(&self, product: NewProduct) -> AppResult<Product>;

    /// Apply a field delta if the product still passes `visibility`
    async fn update_fields(
        &self,
        id: Uuid,
        delta: ProductDelta,
        updated_by: Uuid,
        visibility: Visibility,
    ) -> AppResult<Option<Product>>;

    /// Set the delete pair if the product is still active
    async fn mark_deleted(&self, id: Uuid, deleted_by: Uuid, at: DateTime<Utc>) -> AppResult<Option<Product>>;

    /// Clear the delete pair if the product is still deleted
    async fn mark_restored(&self, id: Uuid, restored_by: Uuid) -> AppResult<Option<Product>>;
}

/// Concrete implementation of ProductRepository with soft delete
pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Restrict a query or update to the rows `visibility` admits.
fn visible<Q: QueryFilter>(query: Q, visibility: Visibility) -> Q {
    match visibility {
        Visibility::ActiveOnly => query.filter(product::Column::DeletedAt.is_null()),
        Visibility::IncludeDeleted => query,
    }
}

/// Apply a delta to a product still admitted by `visibility`.
fn guarded_update(
    id: Uuid,
    delta: ProductDelta,
    updated_by: Uuid,
    visibility: Visibility,
) -> UpdateMany<ProductEntity> {
    let mut update = ProductEntity::update_many()
        .col_expr(product::Column::UpdatedById, Expr::value(Some(updated_by)))
        .filter(product::Column::Id.eq(id));

    if let Some(name) = delta.name {
        update = update.col_expr(product::Column::Name, Expr::value(name));
    }
    if let Some(price) = delta.price {
        update = update.col_expr(product::Column::Price, Expr::value(price.amount()));
    }

    visible(update, visibility)
}

/// Soft delete: set the delete pair only while the row is still active.
fn guarded_delete(id: Uuid, deleted_by: Uuid, at: DateTime<Utc>) -> UpdateMany<ProductEntity> {
    ProductEntity::update_many()
        .col_expr(product::Column::DeletedAt, Expr::value(Some(at)))
        .col_expr(product::Column::DeletedById, Expr::value(Some(deleted_by)))
        .filter(product::Column::Id.eq(id))
        .filter(product::Column::DeletedAt.is_null())
}

/// Clear the delete pair only while the row is still deleted.
fn guarded_restore(id: Uuid, restored_by: Uuid) -> UpdateMany<ProductEntity> {
    ProductEntity::update_many()
        .col_expr(product::Column::DeletedAt, Expr::value(Option::<DateTime<Utc>>::None))
        .col_expr(product::Column::DeletedById, Expr::value(Option::<Uuid>::None))
        .col_expr(product::Column::UpdatedById, Expr::value(Some(restored_by)))
        .filter(product::Column::Id.eq(id))
        .filter(product::Column::DeletedAt.is_not_null())
}

fn to_domain(model: product::Model) -> AppResult<Product> {
    Product::try_from(model).map_err(AppError::from)
}

fn to_domain_all(models: Vec<product::Model>) -> AppResult<Vec<Product>> {
    models.into_iter().map(to_domain).collect()
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn count(&self, visibility: Visibility) -> AppResult<u64> {
        let total = visible(ProductEntity::find(), visibility)
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(total)
    }

    async fn find_page(&self, visibility: Visibility, skip: u64, limit: u64) -> AppResult<Vec<Product>> {
        let models = visible(ProductEntity::find(), visibility)
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Code)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        to_domain_all(models)
    }

    async fn find_by_id(&self, id: Uuid, visibility: Visibility) -> AppResult<Option<Product>> {
        let result = visible(ProductEntity::find_by_id(id), visibility)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(to_domain).transpose()
    }

    async fn find_by_code(&self, code: i64, visibility: Visibility) -> AppResult<Option<Product>> {
        let result = visible(ProductEntity::find(), visibility)
            .filter(product::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(to_domain).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = ProductEntity::find()
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        to_domain_all(models)
    }

    async fn insert(&self, product: NewProduct) -> AppResult<Product> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(product.name),
            price: Set(product.price.amount()),
            code: NotSet,
            created_at: Set(Utc::now()),
            created_by_id: Set(product.created_by_id),
            updated_by_id: Set(None),
            deleted_at: Set(None),
            deleted_by_id: Set(None),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        to_domain(model)
    }

    async fn update_fields(
        &self,
        id: Uuid,
        delta: ProductDelta,
        updated_by: Uuid,
        visibility: Visibility,
    ) -> AppResult<Option<Product>> {
        let result = guarded_update(id, delta, updated_by, visibility)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id, Visibility::IncludeDeleted).await
    }

    async fn mark_deleted(&self, id: Uuid, deleted_by: Uuid, at: DateTime<Utc>) -> AppResult<Option<Product>> {
        let result = guarded_delete(id, deleted_by, at)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id, Visibility::IncludeDeleted).await
    }

    async fn mark_restored(&self, id: Uuid, restored_by: Uuid) -> AppResult<Option<Product>> {
        let result = guarded_restore(id, restored_by)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id, Visibility::IncludeDeleted).await
    }
}
