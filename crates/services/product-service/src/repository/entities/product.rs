//! Product database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DeleteState, DomainError, Product};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub price: Decimal,
    /// Assigned by the database sequence on insert
    #[sea_orm(unique)]
    pub code: i64,
    pub created_at: DateTimeUtc,
    pub created_by_id: Uuid,
    pub updated_by_id: Option<Uuid>,
    /// Soft delete timestamp (NULL = active, set = deleted)
    pub deleted_at: Option<DateTimeUtc>,
    /// Set and cleared together with `deleted_at`
    pub deleted_by_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl TryFrom<Model> for Product {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Product {
            delete_state: DeleteState::from_columns(model.deleted_at, model.deleted_by_id)?,
            id: model.id,
            name: model.name,
            price: model.price,
            code: model.code,
            created_at: model.created_at,
            created_by_id: model.created_by_id,
            updated_by_id: model.updated_by_id,
        })
    }
}
