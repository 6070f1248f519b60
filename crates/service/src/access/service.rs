use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{AssignableRoles, Role, RoleInput, UserWithRoles};
use super::repository::IdentityRepository;
use crate::caller::Caller;
use crate::errors::ServiceError;

pub const ROLE_NAME_REQUIRED: &str = "role name is required";
pub const ROLE_ALREADY_EXISTS: &str = "role already exists";
pub const ROLE_DOES_NOT_EXIST: &str = "role does not exist";
pub const ALREADY_IN_ROLE: &str = "user already has this role";

/// Entry point of role administration.
pub struct AccessControlService<R: IdentityRepository + ?Sized = dyn IdentityRepository> {
    repo: Arc<R>,
}

impl<R: IdentityRepository + ?Sized> AccessControlService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// The single Admin gate. Nothing below it runs for a non-admin caller.
    pub fn authorize(&self, caller: &Caller) -> Result<AdminScope<'_, R>, ServiceError> {
        if let Err(e) = caller.require_admin() {
            warn!(user_id = ?caller.user_id, "role administration denied");
            return Err(e);
        }
        Ok(AdminScope { repo: self.repo.as_ref() })
    }

    /// Build the request caller for an authenticated user id. `None` when the
    /// user no longer exists.
    pub async fn resolve_caller(&self, user_id: Uuid) -> Result<Option<Caller>, ServiceError> {
        if self.repo.find_user(user_id).await?.is_none() {
            return Ok(None);
        }
        let roles = self.repo.roles_of(user_id).await?.into_iter().map(|r| r.name).collect();
        Ok(Some(Caller::user(user_id, roles)))
    }
}

/// Role administration operations, available only to admins.
pub struct AdminScope<'a, R: IdentityRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: IdentityRepository + ?Sized> AdminScope<'a, R> {
    pub async fn list_roles(&self) -> Result<Vec<Role>, ServiceError> {
        self.repo.list_roles().await
    }

    /// Blank create-role form.
    pub fn create_form(&self) -> RoleInput { RoleInput::default() }

    /// Create a role after rejecting blank names and case-insensitive duplicates.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::{Caller, access::{AccessControlService, repository::mock::MockIdentityRepository}};
    ///
    /// let repo = Arc::new(MockIdentityRepository::default());
    /// let svc = AccessControlService::new(repo);
    /// let admin = Caller::user(uuid::Uuid::new_v4(), vec!["Admin".into()]);
    /// let scope = svc.authorize(&admin).unwrap();
    /// tokio_test::block_on(scope.create_role(Some("Sales"))).unwrap();
    /// assert!(tokio_test::block_on(scope.create_role(Some("SALES"))).is_err());
    /// assert!(tokio_test::block_on(scope.create_role(Some("  "))).is_err());
    /// ```
    #[instrument(skip(self))]
    pub async fn create_role(&self, name: Option<&str>) -> Result<Role, ServiceError> {
        let name = name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(ServiceError::Validation(ROLE_NAME_REQUIRED.into()));
        }
        if self.repo.find_role(name).await?.is_some() {
            return Err(ServiceError::Validation(ROLE_ALREADY_EXISTS.into()));
        }
        let role = self.repo.create_role(name).await?;
        info!(role_id = %role.id, "role_created");
        Ok(role)
    }

    /// All roles plus the ones `user_id` currently holds.
    pub async fn assignable_roles(&self, user_id: Option<Uuid>) -> Result<AssignableRoles, ServiceError> {
        let user = match user_id {
            Some(id) => self.repo.find_user(id).await?,
            None => None,
        };
        let user = user.ok_or_else(|| ServiceError::not_found("user"))?;
        let all_roles = self.repo.list_roles().await?;
        let user_roles = self.repo.roles_of(user.id).await?.into_iter().map(|r| r.name).collect();
        Ok(AssignableRoles { user, all_roles, user_roles })
    }

    /// Add `user_id` to `role_name`. Assigning a held role is a validation error
    /// and leaves the memberships untouched.
    #[instrument(skip(self))]
    pub async fn assign_role(&self, user_id: Uuid, role_name: &str) -> Result<(), ServiceError> {
        let user = self.repo.find_user(user_id).await?.ok_or_else(|| ServiceError::not_found("user"))?;
        let Some(role) = self.repo.find_role(role_name).await? else {
            return Err(ServiceError::Validation(ROLE_DOES_NOT_EXIST.into()));
        };
        if self.repo.is_in_role(user.id, role.id).await? {
            return Err(ServiceError::Validation(ALREADY_IN_ROLE.into()));
        }
        self.repo.add_to_role(user.id, role.id).await?;
        info!(user_id = %user.id, role = %role.name, "role_assigned");
        Ok(())
    }

    /// Users with the names of their roles, for the user listing.
    pub async fn list_users(&self) -> Result<Vec<UserWithRoles>, ServiceError> {
        let users = self.repo.list_users().await?;
        let mut out = Vec::with_capacity(users.len());
        for user in users {
            let roles = self.repo.roles_of(user.id).await?.into_iter().map(|r| r.name).collect();
            out.push(UserWithRoles { user, roles });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::repository::mock::MockIdentityRepository;

    fn setup() -> (Arc<MockIdentityRepository>, AccessControlService<MockIdentityRepository>, Caller) {
        let repo = Arc::new(MockIdentityRepository::default());
        let boss = repo.add_user("boss@example.com", "Boss");
        repo.grant(boss.id, models::role::ADMIN);
        let svc = AccessControlService::new(repo.clone());
        (repo, svc, Caller::user(boss.id, vec![models::role::ADMIN.into()]))
    }

    fn message(e: ServiceError) -> String {
        assert!(e.is_validation(), "expected validation error, got {e:?}");
        e.user_message()
    }

    #[test]
    fn non_admins_never_get_a_scope() {
        let (_, svc, _) = setup();
        assert!(matches!(svc.authorize(&Caller::anonymous()), Err(ServiceError::Forbidden)));
        let sales = Caller::user(Uuid::new_v4(), vec!["Sales".into()]);
        assert!(matches!(svc.authorize(&sales), Err(ServiceError::Forbidden)));
    }

    #[tokio::test]
    async fn create_role_rejects_blank_and_missing_names() {
        let (_, svc, admin) = setup();
        let scope = svc.authorize(&admin).unwrap();
        assert_eq!(message(scope.create_role(None).await.unwrap_err()), ROLE_NAME_REQUIRED);
        assert_eq!(message(scope.create_role(Some("")).await.unwrap_err()), ROLE_NAME_REQUIRED);
        assert_eq!(message(scope.create_role(Some("   ")).await.unwrap_err()), ROLE_NAME_REQUIRED);
    }

    #[tokio::test]
    async fn create_role_rejects_case_insensitive_duplicates() {
        let (_, svc, admin) = setup();
        let scope = svc.authorize(&admin).unwrap();
        let sales = scope.create_role(Some(" Sales ")).await.unwrap();
        assert_eq!(sales.name, "Sales");
        assert_eq!(message(scope.create_role(Some("sales")).await.unwrap_err()), ROLE_ALREADY_EXISTS);
        assert_eq!(message(scope.create_role(Some("admin")).await.unwrap_err()), ROLE_ALREADY_EXISTS);
        let names: Vec<_> = scope.list_roles().await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Admin", "Sales"]);
    }

    #[tokio::test]
    async fn assignable_roles_for_known_and_unknown_users() {
        let (repo, svc, admin) = setup();
        let scope = svc.authorize(&admin).unwrap();
        scope.create_role(Some("Sales")).await.unwrap();
        let u = repo.add_user("u@example.com", "U");
        repo.grant(u.id, "Sales");

        let view = scope.assignable_roles(Some(u.id)).await.unwrap();
        assert_eq!(view.user, u);
        assert_eq!(view.all_roles.len(), 2);
        assert_eq!(view.user_roles, vec!["Sales"]);

        assert!(matches!(scope.assignable_roles(Some(Uuid::new_v4())).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(scope.assignable_roles(None).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn assign_role_checks_user_then_role_then_membership() {
        let (repo, svc, admin) = setup();
        let scope = svc.authorize(&admin).unwrap();
        let u = repo.add_user("u@example.com", "U");

        assert!(matches!(scope.assign_role(Uuid::new_v4(), "Admin").await, Err(ServiceError::NotFound(_))));
        assert_eq!(message(scope.assign_role(u.id, "Ghost").await.unwrap_err()), ROLE_DOES_NOT_EXIST);

        scope.assign_role(u.id, "admin").await.unwrap();
        let resolved = svc.resolve_caller(u.id).await.unwrap().unwrap();
        assert!(resolved.is_admin());
    }

    #[tokio::test]
    async fn reassigning_a_held_role_keeps_one_membership() {
        let (repo, svc, admin) = setup();
        let scope = svc.authorize(&admin).unwrap();
        let u = repo.add_user("u@example.com", "U");
        let role = repo.grant(u.id, "Admin");

        let err = scope.assign_role(u.id, "Admin").await.unwrap_err();
        assert_eq!(message(err), ALREADY_IN_ROLE);
        assert_eq!(repo.membership_count(u.id, role.id), 1);
    }

    #[tokio::test]
    async fn list_users_carries_role_names() {
        let (repo, svc, admin) = setup();
        repo.add_user("zed@example.com", "Zed");
        let scope = svc.authorize(&admin).unwrap();
        let users = scope.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].user.email, "boss@example.com");
        assert_eq!(users[0].roles, vec!["Admin"]);
        assert!(users[1].roles.is_empty());
    }

    #[tokio::test]
    async fn resolve_caller_for_missing_user_is_none() {
        let (_, svc, _) = setup();
        assert!(svc.resolve_caller(Uuid::new_v4()).await.unwrap().is_none());
    }
}
