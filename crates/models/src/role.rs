use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryFilter};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, user_role};

/// Name of the role that carries the Admin capability.
pub const ADMIN: &str = "Admin";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "role")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Upper-cased `name`, unique.
    pub normalized_name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { UserRole }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::UserRole => Entity::has_many(user_role::Entity).into() }
    }
}

impl Related<user_role::Entity> for Entity {
    fn to() -> RelationDef { Relation::UserRole.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Key used for case-insensitive role lookups.
pub fn normalize(name: &str) -> String {
    name.trim().to_uppercase()
}

pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::NormalizedName.eq(normalize(name)))
        .one(db)
        .await?)
}

pub async fn create(db: &DatabaseConnection, name: &str) -> Result<Model, errors::ModelError> {
    let name = name.trim();
    if name.is_empty() { return Err(errors::ModelError::Validation("role name required".into())); }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        normalized_name: Set(normalize(name)),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}
