//! Create `role` table.
//!
//! `normalized_name` is the upper-cased name; its unique key backs the
//! case-insensitive existence check.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Role::Table)
                    .if_not_exists()
                    .col(uuid(Role::Id).primary_key())
                    .col(string_len(Role::Name, 256).not_null())
                    .col(string_len(Role::NormalizedName, 256).unique_key().not_null())
                    .col(timestamp_with_time_zone(Role::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Role::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Role { Table, Id, Name, NormalizedName, CreatedAt }
