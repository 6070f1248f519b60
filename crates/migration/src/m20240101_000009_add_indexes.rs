use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Car: listing sorts by price (default) or year
        manager
            .create_index(
                Index::create()
                    .name("idx_car_price")
                    .table(Car::Table)
                    .col(Car::Price)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_car_year")
                    .table(Car::Table)
                    .col(Car::Year)
                    .to_owned(),
            )
            .await?;

        // UserRole: lookups by role when listing members
        manager
            .create_index(
                Index::create()
                    .name("idx_user_role_role")
                    .table(UserRole::Table)
                    .col(UserRole::RoleId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_index(Index::drop().name("idx_user_role_role").table(UserRole::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_car_year").table(Car::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_car_price").table(Car::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Car { Table, Price, Year }

#[derive(DeriveIden)]
enum UserRole { Table, RoleId }
