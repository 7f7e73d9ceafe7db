//! Migration: Add soft delete support to products table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const DELETE_PAIR_CHECK: &str = "chk_products_delete_pair";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Products::Table)
                    .add_column(
                        ColumnDef::new(Products::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .add_column(ColumnDef::new(Products::DeletedById).uuid().null())
                    .to_owned(),
            )
            .await?;

        // deleted_at and deleted_by_id are set and cleared together
        manager
            .get_connection()
            .execute_unprepared(&format!(
                "ALTER TABLE products ADD CONSTRAINT {} \
                 CHECK ((deleted_at IS NULL) = (deleted_by_id IS NULL))",
                DELETE_PAIR_CHECK
            ))
            .await?;

        // Add index for efficient filtering of active products
        manager
            .create_index(
                Index::create()
                    .name("idx_products_deleted_at")
                    .table(Products::Table)
                    .col(Products::DeletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_products_deleted_at")
                    .table(Products::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(&format!(
                "ALTER TABLE products DROP CONSTRAINT IF EXISTS {}",
                DELETE_PAIR_CHECK
            ))
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Products::Table)
                    .drop_column(Products::DeletedById)
                    .drop_column(Products::DeletedAt)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Products {
    Table,
    DeletedAt,
    DeletedById,
}
