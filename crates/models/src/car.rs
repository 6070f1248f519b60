use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors;

/// Status every newly listed car starts with.
pub const STATUS_AVAILABLE: &str = "Available";

/// Oldest model year accepted by validation.
pub const MIN_YEAR: i32 = 1886;

/// Largest price the `NUMERIC(12,2)` column holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Decimal places kept for prices.
pub const PRICE_SCALE: u32 = 2;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "car")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub mileage: i32,
    pub fuel_type: String,
    pub transmission: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub image_url: String,
    pub status: String,
    /// Concurrency token; bumped on every successful update.
    pub version: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

/// Car fields as submitted by a caller (create and edit forms).
///
/// Missing fields deserialize to their defaults so that validation can
/// report them instead of the request being rejected wholesale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarInput {
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: String,
    pub mileage: i32,
    pub fuel_type: String,
    pub transmission: String,
    pub price: Option<Decimal>,
    pub description: String,
    pub image_url: String,
    pub status: Option<String>,
}

/// Checked field set produced by [`CarInput::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct CarFields {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub mileage: i32,
    pub fuel_type: String,
    pub transmission: String,
    pub price: Decimal,
    pub description: String,
    pub image_url: String,
    pub status: Option<String>,
}

impl CarInput {
    /// Validate against the car schema, collecting every failing field.
    pub fn validate(&self) -> Result<CarFields, errors::ModelError> {
        let mut problems: Vec<String> = Vec::new();

        if self.make.trim().is_empty() { problems.push("make is required".into()); }
        if self.model.trim().is_empty() { problems.push("model is required".into()); }
        for (field, value, max) in [
            ("make", self.make.as_str(), 64),
            ("model", self.model.as_str(), 64),
            ("color", self.color.as_str(), 32),
            ("fuel_type", self.fuel_type.as_str(), 32),
            ("transmission", self.transmission.as_str(), 32),
            ("image_url", self.image_url.as_str(), 512),
            ("status", self.status.as_deref().unwrap_or_default(), 32),
        ] {
            if value.trim().chars().count() > max {
                problems.push(format!("{field} too long (<={max})"));
            }
        }

        let max_year = max_model_year();
        match self.year {
            None => problems.push("year is required".into()),
            Some(y) if !(MIN_YEAR..=max_year).contains(&y) => {
                problems.push(format!("year must be between {MIN_YEAR} and {max_year}"))
            }
            Some(_) => {}
        }

        if self.mileage < 0 { problems.push("mileage must not be negative".into()); }

        match self.price {
            None => problems.push("price is required".into()),
            Some(p) if p.is_sign_negative() => problems.push("price must not be negative".into()),
            Some(p) if p > MAX_PRICE => problems.push(format!("price must not exceed {MAX_PRICE}")),
            Some(p) if p.normalize().scale() > PRICE_SCALE => {
                problems.push(format!("price allows at most {PRICE_SCALE} decimal places"))
            }
            Some(_) => {}
        }

        if !self.image_url.is_empty()
            && !(self.image_url.starts_with("http://") || self.image_url.starts_with("https://") || self.image_url.starts_with('/'))
        {
            problems.push("image_url must be an http(s) URL or an absolute path".into());
        }

        let (Some(year), Some(price), true) = (self.year, self.price, problems.is_empty()) else {
            return Err(errors::ModelError::Validation(problems.join("; ")));
        };

        Ok(CarFields {
            make: self.make.trim().to_string(),
            model: self.model.trim().to_string(),
            year,
            color: self.color.trim().to_string(),
            mileage: self.mileage,
            fuel_type: self.fuel_type.trim().to_string(),
            transmission: self.transmission.trim().to_string(),
            price,
            description: self.description.clone(),
            image_url: self.image_url.trim().to_string(),
            status: self.status.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        })
    }
}

impl From<Model> for CarInput {
    fn from(m: Model) -> Self {
        Self {
            make: m.make,
            model: m.model,
            year: Some(m.year),
            color: m.color,
            mileage: m.mileage,
            fuel_type: m.fuel_type,
            transmission: m.transmission,
            price: Some(m.price),
            description: m.description,
            image_url: m.image_url,
            status: Some(m.status),
        }
    }
}

/// Next calendar year; dealers list upcoming model years early.
fn max_model_year() -> i32 {
    use chrono::Datelike;
    chrono::Utc::now().year() + 1
}
