use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait};
use uuid::Uuid;

use models::errors::ModelError;
use models::{role, user, user_role};

use crate::access::domain::{IdentityUser, Role};
use crate::access::repository::IdentityRepository;
use crate::access::service::{ALREADY_IN_ROLE, ROLE_ALREADY_EXISTS};
use crate::errors::ServiceError;

/// A unique-key refusal from a racing writer reads as the same rule the
/// service checks up front.
fn duplicate_as(e: ModelError, message: &str) -> ServiceError {
    match e {
        ModelError::Duplicate(_) => ServiceError::Validation(message.to_string()),
        other => other.into(),
    }
}

/// SeaORM-backed identity store (users, roles, memberships).
pub struct SeaOrmIdentityRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl IdentityRepository for SeaOrmIdentityRepository {
    async fn list_roles(&self) -> Result<Vec<Role>, ServiceError> {
        let rows = role::Entity::find().order_by_asc(role::Column::Name).all(&self.db).await?;
        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn find_role(&self, name: &str) -> Result<Option<Role>, ServiceError> {
        Ok(role::find_by_name(&self.db, name).await?.map(Role::from))
    }

    async fn create_role(&self, name: &str) -> Result<Role, ServiceError> {
        let created = role::create(&self.db, name).await.map_err(|e| duplicate_as(e, ROLE_ALREADY_EXISTS))?;
        Ok(created.into())
    }

    async fn list_users(&self) -> Result<Vec<IdentityUser>, ServiceError> {
        let rows = user::Entity::find().order_by_asc(user::Column::Email).all(&self.db).await?;
        Ok(rows.into_iter().map(IdentityUser::from).collect())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<IdentityUser>, ServiceError> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?.map(IdentityUser::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<IdentityUser>, ServiceError> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email.trim()))
            .one(&self.db)
            .await?;
        Ok(found.map(IdentityUser::from))
    }

    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, ServiceError> {
        let rows = role::Entity::find()
            .join(JoinType::InnerJoin, role::Relation::UserRole.def())
            .filter(user_role::Column::UserId.eq(user_id))
            .order_by_asc(role::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn is_in_role(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, ServiceError> {
        Ok(user_role::exists(&self.db, user_id, role_id).await?)
    }

    async fn add_to_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), ServiceError> {
        user_role::create(&self.db, user_id, role_id)
            .await
            .map_err(|e| duplicate_as(e, ALREADY_IN_ROLE))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[test]
    fn unique_violations_become_rule_violations() {
        match duplicate_as(ModelError::Duplicate("role_normalized_name_key".into()), ROLE_ALREADY_EXISTS) {
            ServiceError::Validation(m) => assert_eq!(m, ROLE_ALREADY_EXISTS),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(duplicate_as(ModelError::Db("down".into()), ALREADY_IN_ROLE), ServiceError::Model(ModelError::Db(_))));
    }

    #[tokio::test]
    async fn identity_repository_roundtrip() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let repo = SeaOrmIdentityRepository { db: db.clone() };

        let tag = Uuid::new_v4().simple().to_string();
        let u = user::create(&db, &format!("{tag}@example.com"), "Repo Test").await?;
        let role_name = format!("Role{tag}");
        let r = repo.create_role(&role_name).await?;

        let found = repo.find_role(&role_name.to_lowercase()).await?;
        assert_eq!(found.as_ref().map(|x| x.id), Some(r.id));
        assert_eq!(repo.find_user_by_email(&u.email).await?.map(|x| x.id), Some(u.id));

        assert!(!repo.is_in_role(u.id, r.id).await?);
        repo.add_to_role(u.id, r.id).await?;
        assert!(repo.is_in_role(u.id, r.id).await?);
        // a second membership row or a same-named role lost a race with the service check
        match repo.add_to_role(u.id, r.id).await {
            Err(ServiceError::Validation(m)) => assert_eq!(m, ALREADY_IN_ROLE),
            other => panic!("expected duplicate membership rejection, got {other:?}"),
        }
        match repo.create_role(&role_name.to_uppercase()).await {
            Err(ServiceError::Validation(m)) => assert_eq!(m, ROLE_ALREADY_EXISTS),
            other => panic!("expected duplicate role rejection, got {other:?}"),
        }

        let held = repo.roles_of(u.id).await?;
        assert_eq!(held, vec![r]);
        Ok(())
    }
}
