//! Enrichment of products with user summaries from the identity service.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, error};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{EnrichedProduct, Product, UserSummary};

use crate::client::UserDirectory;

/// Resolves creator, updater and deleter ids for a batch of products with a
/// single call to the identity service.
#[derive(Clone)]
pub struct UserResolver {
    directory: Arc<dyn UserDirectory>,
}

impl UserResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Enrich a batch of products.
    ///
    /// No remote call is made when the batch references no user. Ids the
    /// identity service does not know resolve to `None`. A failed lookup is
    /// logged and returned as is.
    pub async fn enrich(&self, products: Vec<Product>) -> AppResult<Vec<EnrichedProduct>> {
        let ids: BTreeSet<Uuid> = products
            .iter()
            .flat_map(Product::user_references)
            .flatten()
            .collect();

        if ids.is_empty() {
            return Ok(products.into_iter().map(|p| p.enrich(|_| None)).collect());
        }

        let ids: Vec<Uuid> = ids.into_iter().collect();
        debug!("Resolving {} user ids for {} products", ids.len(), products.len());

        let users = self.directory.find_summaries(&ids).await.map_err(|e| {
            error!("Error fetching user data: {}", e);
            e
        })?;

        let by_id: HashMap<Uuid, UserSummary> = users.into_iter().map(|u| (u.id, u)).collect();

        Ok(products
            .into_iter()
            .map(|p| p.enrich(|id| by_id.get(id).cloned()))
            .collect())
    }

    /// Enrich a single product.
    pub async fn enrich_one(&self, product: Product) -> AppResult<EnrichedProduct> {
        self.enrich(vec![product])
            .await?
            .pop()
            .ok_or_else(|| AppError::internal("Enrichment returned no product"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    use domain::DeleteState;

    use crate::client::MockUserDirectory;

    fn product(created_by: Uuid) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Lamp".to_string(),
            price: Decimal::new(1_250_000_000, 8),
            code: 1,
            created_at: Utc::now(),
            created_by_id: created_by,
            updated_by_id: None,
            delete_state: DeleteState::Active,
        }
    }

    fn summary(id: Uuid, name: &str) -> UserSummary {
        UserSummary {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    #[tokio::test]
    async fn test_creator_is_resolved() {
        let ann = Uuid::new_v4();

        let mut directory = MockUserDirectory::new();
        directory
            .expect_find_summaries()
            .withf(move |ids| ids == [ann])
            .times(1)
            .returning(move |_| Ok(vec![summary(ann, "Ann")]));

        let resolver = UserResolver::new(Arc::new(directory));
        let enriched = resolver.enrich_one(product(ann)).await.unwrap();

        assert_eq!(enriched.created_by, Some(summary(ann, "Ann")));
        assert_eq!(enriched.updated_by, None);
        assert_eq!(enriched.deleted_by, None);
    }

    #[tokio::test]
    async fn test_batch_makes_one_call_with_distinct_ids() {
        let ann = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let mut first = product(ann);
        first.updated_by_id = Some(bob);
        let mut second = product(bob);
        second.delete_state = DeleteState::Deleted { at: Utc::now(), by: ann };
        let third = product(ann);

        let mut expected = vec![ann, bob];
        expected.sort();

        let mut directory = MockUserDirectory::new();
        directory
            .expect_find_summaries()
            .with(eq(expected))
            .times(1)
            .returning(move |_| Ok(vec![summary(ann, "Ann"), summary(bob, "Bob")]));

        let resolver = UserResolver::new(Arc::new(directory));
        let enriched = resolver.enrich(vec![first, second, third]).await.unwrap();

        assert_eq!(enriched.len(), 3);
        assert_eq!(enriched[0].updated_by.as_ref().map(|u| u.name.as_str()), Some("Bob"));
        assert_eq!(enriched[1].deleted_by.as_ref().map(|u| u.name.as_str()), Some("Ann"));
        assert!(enriched[1].deleted_at.is_some());
        assert_eq!(enriched[2].created_by.as_ref().map(|u| u.name.as_str()), Some("Ann"));
    }

    #[tokio::test]
    async fn test_unknown_user_resolves_to_none() {
        let ghost = Uuid::new_v4();

        let mut directory = MockUserDirectory::new();
        directory
            .expect_find_summaries()
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let resolver = UserResolver::new(Arc::new(directory));
        let enriched = resolver.enrich_one(product(ghost)).await.unwrap();

        assert_eq!(enriched.created_by, None);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_remote_call() {
        let mut directory = MockUserDirectory::new();
        directory.expect_find_summaries().times(0);

        let resolver = UserResolver::new(Arc::new(directory));
        let enriched = resolver.enrich(Vec::new()).await.unwrap();

        assert!(enriched.is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_propagates_unchanged() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_find_summaries()
            .returning(|_| Err(AppError::remote_dependency("user-service", "Unavailable: down")));

        let resolver = UserResolver::new(Arc::new(directory));
        let err = resolver.enrich_one(product(Uuid::new_v4())).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::RemoteDependency { ref message, .. } if message == "Unavailable: down"
        ));
    }
}
