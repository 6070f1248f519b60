use sea_orm::{DatabaseConnection, EntityTrait, ColumnTrait, QueryFilter};
use uuid::Uuid;

use models::errors::ModelError;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn model_err(e: ModelError) -> AuthError {
    match e {
        ModelError::Validation(m) => AuthError::Validation(m),
        ModelError::Duplicate(_) => AuthError::Conflict,
        ModelError::Db(m) => AuthError::Repository(m),
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::Entity::find()
            .filter(models::user::Column::Email.eq(email.trim()))
            .one(&self.db)
            .await?;
        Ok(res.map(|u| AuthUser { id: u.id, email: u.email, name: u.name }))
    }

    async fn create_user(&self, email: &str, name: &str) -> Result<AuthUser, AuthError> {
        let created = models::user::create(&self.db, email, name).await.map_err(model_err)?;
        Ok(AuthUser { id: created.id, email: created.email, name: created.name })
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let found = models::user_credentials::find_by_user(&self.db, user_id).await.map_err(model_err)?;
        Ok(found.map(Credentials::from))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = models::user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm)
            .await
            .map_err(model_err)?;
        Ok(c.into())
    }
}
