use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use models::car::{self, CarFields, Entity as CarEntity};

use crate::catalog::domain::{CarQuery, SortOrder};
use crate::catalog::repository::CarRepository;
use crate::errors::ServiceError;

/// SeaORM-backed car repository.
pub struct SeaOrmCarRepository {
    pub db: DatabaseConnection,
}

/// Escape LIKE metacharacters so the needle matches literally.
fn like_contains(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

#[async_trait]
impl CarRepository for SeaOrmCarRepository {
    async fn list(&self, query: &CarQuery) -> Result<Vec<car::Model>, ServiceError> {
        let mut finder = CarEntity::find();
        if let Some(s) = &query.search {
            let pattern = like_contains(s);
            finder = finder.filter(
                Condition::any()
                    .add(car::Column::Make.like(pattern.as_str()))
                    .add(car::Column::Model.like(pattern.as_str())),
            );
        }
        finder = match query.sort {
            SortOrder::PriceAsc => finder.order_by_asc(car::Column::Price),
            SortOrder::PriceDesc => finder.order_by_desc(car::Column::Price),
            SortOrder::YearAsc => finder.order_by_asc(car::Column::Year),
            SortOrder::YearDesc => finder.order_by_desc(car::Column::Year),
        };
        let rows = finder.order_by_asc(car::Column::Id).all(&self.db).await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> Result<Option<car::Model>, ServiceError> {
        Ok(CarEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn exists(&self, id: i32) -> Result<bool, ServiceError> {
        let n = CarEntity::find().filter(car::Column::Id.eq(id)).count(&self.db).await?;
        Ok(n > 0)
    }

    async fn insert(&self, f: &CarFields, status: &str) -> Result<car::Model, ServiceError> {
        let now = Utc::now();
        let am = car::ActiveModel {
            make: Set(f.make.clone()),
            model: Set(f.model.clone()),
            year: Set(f.year),
            color: Set(f.color.clone()),
            mileage: Set(f.mileage),
            fuel_type: Set(f.fuel_type.clone()),
            transmission: Set(f.transmission.clone()),
            price: Set(f.price),
            description: Set(f.description.clone()),
            image_url: Set(f.image_url.clone()),
            status: Set(status.to_string()),
            version: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        Ok(am.insert(&self.db).await?)
    }

    async fn update(&self, id: i32, expected_version: i32, f: &CarFields, status: &str) -> Result<Option<car::Model>, ServiceError> {
        let res = CarEntity::update_many()
            .col_expr(car::Column::Make, Expr::value(f.make.clone()))
            .col_expr(car::Column::Model, Expr::value(f.model.clone()))
            .col_expr(car::Column::Year, Expr::value(f.year))
            .col_expr(car::Column::Color, Expr::value(f.color.clone()))
            .col_expr(car::Column::Mileage, Expr::value(f.mileage))
            .col_expr(car::Column::FuelType, Expr::value(f.fuel_type.clone()))
            .col_expr(car::Column::Transmission, Expr::value(f.transmission.clone()))
            .col_expr(car::Column::Price, Expr::value(f.price))
            .col_expr(car::Column::Description, Expr::value(f.description.clone()))
            .col_expr(car::Column::ImageUrl, Expr::value(f.image_url.clone()))
            .col_expr(car::Column::Status, Expr::value(status.to_string()))
            .col_expr(car::Column::Version, Expr::value(expected_version + 1))
            .col_expr(car::Column::UpdatedAt, Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now())))
            .filter(car::Column::Id.eq(id))
            .filter(car::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        Ok(CarEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let res = CarEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
