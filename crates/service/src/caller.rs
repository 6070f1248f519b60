//! The caller on whose behalf an operation runs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Identity and role names resolved for one request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Option<Uuid>,
    pub roles: Vec<String>,
}

impl Caller {
    pub fn anonymous() -> Self { Self::default() }

    pub fn user(user_id: Uuid, roles: Vec<String>) -> Self {
        Self { user_id: Some(user_id), roles }
    }

    pub fn is_authenticated(&self) -> bool { self.user_id.is_some() }

    /// Role membership, compared case-insensitively.
    pub fn has_role(&self, role: &str) -> bool {
        let wanted = models::role::normalize(role);
        self.roles.iter().any(|r| models::role::normalize(r) == wanted)
    }

    pub fn is_admin(&self) -> bool { self.has_role(models::role::ADMIN) }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() { Ok(()) } else { Err(ServiceError::Forbidden) }
    }
}
