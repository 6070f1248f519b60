//! Startup seeding so a fresh deployment has a reachable Admin.

use tracing::{info, warn};

use super::repository::IdentityRepository;
use crate::errors::ServiceError;

/// Create the `Admin` role if missing and grant it to `bootstrap_email`
/// when that user exists. Safe to run on every start.
pub async fn seed_admin<R: IdentityRepository + ?Sized>(repo: &R, bootstrap_email: Option<&str>) -> Result<(), ServiceError> {
    let admin = match repo.find_role(models::role::ADMIN).await? {
        Some(role) => role,
        None => {
            let role = repo.create_role(models::role::ADMIN).await?;
            info!(role_id = %role.id, "admin_role_created");
            role
        }
    };

    let Some(email) = bootstrap_email.map(str::trim).filter(|e| !e.is_empty()) else { return Ok(()) };
    let Some(user) = repo.find_user_by_email(email).await? else {
        warn!(email, "bootstrap admin not registered yet; skipping grant");
        return Ok(());
    };
    if !repo.is_in_role(user.id, admin.id).await? {
        repo.add_to_role(user.id, admin.id).await?;
        info!(user_id = %user.id, email, "bootstrap_admin_granted");
    }
    Ok(())
}
