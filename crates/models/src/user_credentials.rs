//! Password hashes, one row per user. Hashing happens in the auth service;
//! this module only stores and fetches the opaque hash and its algorithm tag.
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::{errors::ModelError, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_credentials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Stored credentials for `user_id`, if a password was ever set.
pub async fn find_by_user(db: &DatabaseConnection, user_id: Uuid) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::UserId.eq(user_id)).one(db).await?)
}

/// Replace the stored hash for `user_id`, creating the row on first use.
pub async fn upsert_password(
    db: &DatabaseConnection,
    user_id: Uuid,
    password_hash: String,
    algorithm: &str,
) -> Result<Model, ModelError> {
    if password_hash.trim().is_empty() {
        return Err(ModelError::Validation("password hash required".into()));
    }
    if algorithm.trim().is_empty() {
        return Err(ModelError::Validation("password algorithm required".into()));
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut am: ActiveModel = match find_by_user(db, user_id).await? {
        Some(existing) => existing.into(),
        None => ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            created_at: Set(now),
            password_hash: NotSet,
            password_algorithm: NotSet,
            updated_at: NotSet,
        },
    };
    am.password_hash = Set(password_hash);
    am.password_algorithm = Set(algorithm.to_string());
    am.updated_at = Set(now);

    let saved = if am.id.is_unchanged() { am.update(db).await? } else { am.insert(db).await? };
    Ok(saved)
}
