//! Create `car` table.
//! `version` is the optimistic concurrency token bumped on every update.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Car::Table)
                    .if_not_exists()
                    .col(pk_auto(Car::Id))
                    .col(string_len(Car::Make, 64).not_null())
                    .col(string_len(Car::Model, 64).not_null())
                    .col(integer(Car::Year).not_null())
                    .col(string_len(Car::Color, 32).not_null())
                    .col(integer(Car::Mileage).not_null())
                    .col(string_len(Car::FuelType, 32).not_null())
                    .col(string_len(Car::Transmission, 32).not_null())
                    .col(decimal_len(Car::Price, 12, 2).not_null())
                    .col(text(Car::Description).not_null())
                    .col(string_len(Car::ImageUrl, 512).not_null())
                    .col(string_len(Car::Status, 32).not_null())
                    .col(integer(Car::Version).not_null().default(0))
                    .col(timestamp_with_time_zone(Car::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Car::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Car::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Car {
    Table,
    Id,
    Make,
    Model,
    Year,
    Color,
    Mileage,
    FuelType,
    Transmission,
    Price,
    Description,
    ImageUrl,
    Status,
    Version,
    CreatedAt,
    UpdatedAt,
}
