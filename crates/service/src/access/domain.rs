use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

impl From<models::role::Model> for Role {
    fn from(m: models::role::Model) -> Self { Self { id: m.id, name: m.name } }
}

/// User as seen by role administration (no credentials).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<models::user::Model> for IdentityUser {
    fn from(m: models::user::Model) -> Self { Self { id: m.id, email: m.email, name: m.name } }
}

/// Role form payload. `name` stays optional so a missing field is reported
/// the same way as a blank one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleInput {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleInput {
    #[serde(alias = "user_id")]
    pub user_id: Uuid,
    #[serde(default, alias = "role_name")]
    pub role_name: String,
}

/// Data behind the assign-role form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignableRoles {
    pub user: IdentityUser,
    pub all_roles: Vec<Role>,
    /// Names of the roles the user already holds.
    pub user_roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: IdentityUser,
    pub roles: Vec<String>,
}
