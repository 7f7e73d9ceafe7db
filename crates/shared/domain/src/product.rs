//! Product domain entity, its soft-delete lifecycle and response shapes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{DomainError, DomainResult};
use crate::price::Price;
use crate::user::UserSummary;

/// Soft-delete state of a product.
///
/// The deletion timestamp and the deleting user only exist together, so a
/// product can never be half-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DeleteState {
    Active,
    Deleted { at: DateTime<Utc>, by: Uuid },
}

impl DeleteState {
    /// Rebuild the state from the stored column pair.
    ///
    /// # Errors
    /// Returns an internal error if exactly one of the two columns is set.
    pub fn from_columns(at: Option<DateTime<Utc>>, by: Option<Uuid>) -> DomainResult<Self> {
        match (at, by) {
            (None, None) => Ok(DeleteState::Active),
            (Some(at), Some(by)) => Ok(DeleteState::Deleted { at, by }),
            _ => Err(DomainError::internal(
                "deleted_at and deleted_by_id must be set or cleared together",
            )),
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteState::Deleted { .. })
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            DeleteState::Deleted { at, .. } => Some(*at),
            DeleteState::Active => None,
        }
    }

    pub fn deleted_by(&self) -> Option<Uuid> {
        match self {
            DeleteState::Deleted { by, .. } => Some(*by),
            DeleteState::Active => None,
        }
    }
}

/// Product domain entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    /// Store-assigned numeric code, an alternate lookup key
    pub code: i64,
    pub created_at: DateTime<Utc>,
    pub created_by_id: Uuid,
    pub updated_by_id: Option<Uuid>,
    pub delete_state: DeleteState,
}

impl Product {
    /// Check if product is soft deleted
    pub fn is_deleted(&self) -> bool {
        self.delete_state.is_deleted()
    }

    /// Fail unless the product can move from `Active` to `Deleted`.
    pub fn ensure_removable(&self) -> DomainResult<()> {
        if self.is_deleted() {
            return Err(DomainError::invalid_state(format!(
                "Product with id {} is already deleted",
                self.id
            )));
        }
        Ok(())
    }

    /// Fail unless the product can move from `Deleted` to `Active`.
    pub fn ensure_restorable(&self) -> DomainResult<()> {
        if !self.is_deleted() {
            return Err(DomainError::invalid_state(format!(
                "Product with id {} is not deleted",
                self.id
            )));
        }
        Ok(())
    }

    /// Soft delete the product
    pub fn remove(&mut self, by: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_removable()?;
        self.delete_state = DeleteState::Deleted { at, by };
        Ok(())
    }

    /// Restore a soft-deleted product
    pub fn restore(&mut self, by: Uuid) -> DomainResult<()> {
        self.ensure_restorable()?;
        self.delete_state = DeleteState::Active;
        self.updated_by_id = Some(by);
        Ok(())
    }

    /// Apply a field delta on behalf of `by`.
    pub fn apply(&mut self, delta: &ProductDelta, by: Uuid) {
        if let Some(name) = &delta.name {
            self.name = name.clone();
        }
        if let Some(price) = delta.price {
            self.price = price.amount();
        }
        self.updated_by_id = Some(by);
    }

    /// User ids this product refers to: creator, updater, deleter.
    pub fn user_references(&self) -> [Option<Uuid>; 3] {
        [
            Some(self.created_by_id),
            self.updated_by_id,
            self.delete_state.deleted_by(),
        ]
    }

    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            code: self.code,
            created_at: self.created_at,
        }
    }

    pub fn reference(&self) -> ProductReference {
        ProductReference {
            id: self.id,
            name: self.name.clone(),
            code: self.code,
        }
    }

    /// Replace user ids with the summaries `lookup` resolves them to.
    pub fn enrich<F>(self, lookup: F) -> EnrichedProduct
    where
        F: Fn(&Uuid) -> Option<UserSummary>,
    {
        EnrichedProduct {
            created_by: lookup(&self.created_by_id),
            updated_by: self.updated_by_id.as_ref().and_then(&lookup),
            deleted_at: self.delete_state.deleted_at(),
            deleted_by: self.delete_state.deleted_by().as_ref().and_then(&lookup),
            id: self.id,
            name: self.name,
            price: self.price,
            code: self.code,
            created_at: self.created_at,
        }
    }
}

/// Product with its user references resolved to summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedProduct {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub code: i64,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserSummary>,
    pub updated_by: Option<UserSummary>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<UserSummary>,
}

/// Unenriched product projection used by summary reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub code: i64,
    pub created_at: DateTime<Utc>,
}

/// Minimal projection returned by batch validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReference {
    pub id: Uuid,
    pub name: String,
    pub code: i64,
}

/// Product creation data transfer object
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProduct {
    /// Product display name
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    /// Decimal price, positive, at most 8 fractional digits
    pub price: String,
}

impl CreateProduct {
    /// Validate the payload into a record ready for insertion.
    pub fn into_new_product(mut self, created_by_id: Uuid) -> DomainResult<NewProduct> {
        self.name = self.name.trim().to_string();
        self.validate()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        Ok(NewProduct {
            name: self.name,
            price: Price::parse(&self.price)?,
            created_by_id,
        })
    }
}

/// Validated product ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub created_by_id: Uuid,
}

/// Product update data transfer object
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProduct {
    /// Target product
    pub id: Uuid,
    /// New display name
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    /// New decimal price
    pub price: Option<String>,
}

impl UpdateProduct {
    /// Split into the target id and the validated field delta.
    pub fn into_parts(mut self) -> DomainResult<(Uuid, ProductDelta)> {
        self.name = self.name.map(|name| name.trim().to_string());
        self.validate()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let price = self.price.as_deref().map(Price::parse).transpose()?;
        Ok((
            self.id,
            ProductDelta {
                name: self.name,
                price,
            },
        ))
    }
}

/// The updatable fields of a product; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDelta {
    pub name: Option<String>,
    pub price: Option<Price>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_product() -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Keyboard".to_string(),
            price: Decimal::new(4_999_000_000, 8),
            code: 1,
            created_at: Utc::now(),
            created_by_id: Uuid::new_v4(),
            updated_by_id: None,
            delete_state: DeleteState::Active,
        }
    }

    #[test]
    fn test_remove_then_restore() {
        let mut product = active_product();
        let admin = Uuid::new_v4();
        let now = Utc::now();

        product.remove(admin, now).unwrap();
        assert_eq!(product.delete_state, DeleteState::Deleted { at: now, by: admin });

        product.restore(admin).unwrap();
        assert_eq!(product.delete_state, DeleteState::Active);
        assert_eq!(product.updated_by_id, Some(admin));
    }

    #[test]
    fn test_remove_twice_is_invalid_state() {
        let mut product = active_product();
        product.remove(Uuid::new_v4(), Utc::now()).unwrap();

        let err = product.remove(Uuid::new_v4(), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(msg) if msg.contains("already deleted")));
    }

    #[test]
    fn test_restore_active_is_invalid_state() {
        let mut product = active_product();
        let err = product.restore(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(msg) if msg.contains("is not deleted")));
    }

    #[test]
    fn test_delete_columns_must_be_paired() {
        let now = Utc::now();
        let by = Uuid::new_v4();

        assert_eq!(DeleteState::from_columns(None, None).unwrap(), DeleteState::Active);
        assert!(DeleteState::from_columns(Some(now), Some(by)).unwrap().is_deleted());
        assert!(DeleteState::from_columns(Some(now), None).is_err());
        assert!(DeleteState::from_columns(None, Some(by)).is_err());
    }

    #[test]
    fn test_user_references_follow_delete_state() {
        let mut product = active_product();
        assert_eq!(product.user_references()[2], None);

        let deleter = Uuid::new_v4();
        product.remove(deleter, Utc::now()).unwrap();
        assert_eq!(product.user_references()[2], Some(deleter));
    }

    #[test]
    fn test_enrich_replaces_ids_with_summaries() {
        let product = active_product();
        let creator = UserSummary {
            id: product.created_by_id,
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
        };
        let expected = creator.clone();

        let enriched = product.enrich(|id| (*id == creator.id).then(|| creator.clone()));

        assert_eq!(enriched.created_by, Some(expected));
        assert_eq!(enriched.updated_by, None);
        assert_eq!(enriched.deleted_by, None);
        assert_eq!(enriched.deleted_at, None);

        let json = serde_json::to_value(&enriched).unwrap();
        assert!(json.get("created_by_id").is_none());
        assert_eq!(json["created_by"]["name"], "Ann");
    }

    #[test]
    fn test_apply_delta_sets_updater() {
        let mut product = active_product();
        let editor = Uuid::new_v4();
        let delta = ProductDelta {
            name: Some("Mechanical keyboard".to_string()),
            price: None,
        };

        product.apply(&delta, editor);

        assert_eq!(product.name, "Mechanical keyboard");
        assert_eq!(product.price, Decimal::new(4_999_000_000, 8));
        assert_eq!(product.updated_by_id, Some(editor));
    }

    #[test]
    fn test_create_payload_validation() {
        let creator = Uuid::new_v4();

        let ok = CreateProduct {
            name: " Mouse ".to_string(),
            price: "12.5".to_string(),
        }
        .into_new_product(creator)
        .unwrap();
        assert_eq!(ok.name, "Mouse");
        assert_eq!(ok.created_by_id, creator);

        let empty_name = CreateProduct {
            name: "   ".to_string(),
            price: "12.5".to_string(),
        }
        .into_new_product(creator);
        assert!(matches!(empty_name, Err(DomainError::Validation(_))));

        let zero_price = CreateProduct {
            name: "Mouse".to_string(),
            price: "0".to_string(),
        }
        .into_new_product(creator);
        assert!(matches!(zero_price, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_update_payload_validation() {
        let id = Uuid::new_v4();

        let (target, delta) = UpdateProduct {
            id,
            name: None,
            price: Some("3.25".to_string()),
        }
        .into_parts()
        .unwrap();
        assert_eq!(target, id);
        assert_eq!(delta.name, None);
        assert_eq!(delta.price, Some(Price::parse("3.25").unwrap()));

        let negative = UpdateProduct {
            id,
            name: None,
            price: Some("-1".to_string()),
        }
        .into_parts();
        assert!(matches!(negative, Err(DomainError::Validation(_))));
    }
}
