use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{IdentityUser, Role};
use crate::errors::ServiceError;

/// Identity store operations used by role administration and caller resolution.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn list_roles(&self) -> Result<Vec<Role>, ServiceError>;
    /// Case-insensitive lookup by name.
    async fn find_role(&self, name: &str) -> Result<Option<Role>, ServiceError>;
    async fn create_role(&self, name: &str) -> Result<Role, ServiceError>;

    async fn list_users(&self) -> Result<Vec<IdentityUser>, ServiceError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<IdentityUser>, ServiceError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<IdentityUser>, ServiceError>;

    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, ServiceError>;
    async fn is_in_role(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, ServiceError>;
    async fn add_to_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), ServiceError>;
}

/// In-memory identity store for tests and doc examples.
///
/// Implements both [`IdentityRepository`] and the auth repository so that
/// registration, login and role administration share one set of users.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::auth::domain::{AuthUser, Credentials};
    use crate::auth::errors::AuthError;
    use crate::auth::repository::AuthRepository;

    #[derive(Default)]
    struct State {
        users: Vec<IdentityUser>,
        roles: Vec<Role>,
        // Kept as a plain list (no uniqueness) so duplicate writes are observable.
        memberships: Vec<(Uuid, Uuid)>,
        creds: HashMap<Uuid, Credentials>,
    }

    #[derive(Default)]
    pub struct MockIdentityRepository {
        state: Mutex<State>,
    }

    impl MockIdentityRepository {
        pub fn add_user(&self, email: &str, name: &str) -> IdentityUser {
            let user = IdentityUser { id: Uuid::new_v4(), email: email.to_string(), name: name.to_string() };
            self.state.lock().unwrap().users.push(user.clone());
            user
        }

        /// Give `user_id` the role `role_name`, creating the role if needed.
        pub fn grant(&self, user_id: Uuid, role_name: &str) -> Role {
            let mut st = self.state.lock().unwrap();
            let wanted = models::role::normalize(role_name);
            let existing = st.roles.iter().find(|r| models::role::normalize(&r.name) == wanted).cloned();
            let role = existing.unwrap_or_else(|| {
                let r = Role { id: Uuid::new_v4(), name: role_name.trim().to_string() };
                st.roles.push(r.clone());
                r
            });
            st.memberships.push((user_id, role.id));
            role
        }

        /// Number of membership rows for the pair.
        pub fn membership_count(&self, user_id: Uuid, role_id: Uuid) -> usize {
            self.state.lock().unwrap().memberships.iter().filter(|m| **m == (user_id, role_id)).count()
        }
    }

    #[async_trait]
    impl IdentityRepository for MockIdentityRepository {
        async fn list_roles(&self) -> Result<Vec<Role>, ServiceError> {
            let mut roles = self.state.lock().unwrap().roles.clone();
            roles.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(roles)
        }

        async fn find_role(&self, name: &str) -> Result<Option<Role>, ServiceError> {
            let wanted = models::role::normalize(name);
            let st = self.state.lock().unwrap();
            Ok(st.roles.iter().find(|r| models::role::normalize(&r.name) == wanted).cloned())
        }

        async fn create_role(&self, name: &str) -> Result<Role, ServiceError> {
            let mut st = self.state.lock().unwrap();
            let wanted = models::role::normalize(name);
            if st.roles.iter().any(|r| models::role::normalize(&r.name) == wanted) {
                return Err(ServiceError::Db(format!("duplicate role {}", name)));
            }
            let role = Role { id: Uuid::new_v4(), name: name.trim().to_string() };
            st.roles.push(role.clone());
            Ok(role)
        }

        async fn list_users(&self) -> Result<Vec<IdentityUser>, ServiceError> {
            let mut users = self.state.lock().unwrap().users.clone();
            users.sort_by(|a, b| a.email.cmp(&b.email));
            Ok(users)
        }

        async fn find_user(&self, id: Uuid) -> Result<Option<IdentityUser>, ServiceError> {
            Ok(self.state.lock().unwrap().users.iter().find(|u| u.id == id).cloned())
        }

        async fn find_user_by_email(&self, email: &str) -> Result<Option<IdentityUser>, ServiceError> {
            Ok(self.state.lock().unwrap().users.iter().find(|u| u.email == email).cloned())
        }

        async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, ServiceError> {
            let st = self.state.lock().unwrap();
            let mut roles: Vec<Role> = st
                .roles
                .iter()
                .filter(|r| st.memberships.iter().any(|m| *m == (user_id, r.id)))
                .cloned()
                .collect();
            roles.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(roles)
        }

        async fn is_in_role(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.state.lock().unwrap().memberships.contains(&(user_id, role_id)))
        }

        async fn add_to_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), ServiceError> {
            self.state.lock().unwrap().memberships.push((user_id, role_id));
            Ok(())
        }
    }

    #[async_trait]
    impl AuthRepository for MockIdentityRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let st = self.state.lock().unwrap();
            Ok(st.users.iter().find(|u| u.email == email).map(|u| AuthUser { id: u.id, email: u.email.clone(), name: u.name.clone() }))
        }

        async fn create_user(&self, email: &str, name: &str) -> Result<AuthUser, AuthError> {
            models::user::validate_email(email).map_err(|e| AuthError::Validation(e.to_string()))?;
            models::user::validate_name(name).map_err(|e| AuthError::Validation(e.to_string()))?;
            let mut st = self.state.lock().unwrap();
            if st.users.iter().any(|u| u.email == email) {
                return Err(AuthError::Conflict);
            }
            let user = IdentityUser { id: Uuid::new_v4(), email: email.to_string(), name: name.to_string() };
            st.users.push(user.clone());
            Ok(AuthUser { id: user.id, email: user.email, name: user.name })
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            Ok(self.state.lock().unwrap().creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let c = Credentials { user_id, password_hash, password_algorithm };
            self.state.lock().unwrap().creds.insert(user_id, c.clone());
            Ok(c)
        }
    }
}
