use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

/// Car fields; missing fields default and are reported by validation.
#[derive(ToSchema)]
pub struct CarInputDoc {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub mileage: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    /// Decimal as string, e.g. "15000.00"
    pub price: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Ignored on create.
    pub status: Option<String>,
}

/// Car fields plus `id` and the `version` read by the edit form.
#[derive(ToSchema)]
pub struct CarUpdateDoc {
    pub id: i32,
    pub version: i32,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: String,
    pub status: Option<String>,
}

#[derive(ToSchema)]
pub struct RoleInputDoc { pub name: String }

#[derive(ToSchema)]
pub struct AssignRoleDoc {
    #[allow(non_snake_case)]
    pub userId: Uuid,
    #[allow(non_snake_case)]
    pub roleName: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::cars::list,
        crate::routes::cars::get,
        crate::routes::cars::create_form,
        crate::routes::cars::create,
        crate::routes::cars::edit_form,
        crate::routes::cars::update,
        crate::routes::cars::delete_form,
        crate::routes::cars::delete,
        crate::routes::roles::list,
        crate::routes::roles::create_form,
        crate::routes::roles::create,
        crate::routes::roles::assign_form,
        crate::routes::roles::assign,
        crate::routes::roles::users,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            CarInputDoc,
            CarUpdateDoc,
            RoleInputDoc,
            AssignRoleDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "cars"),
        (name = "roles")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_catalog_and_role_paths() {
        let doc = ApiDoc::openapi();
        for p in ["/cars", "/cars/{id}/edit", "/roles/assign", "/users", "/auth/login"] {
            assert!(doc.paths.paths.contains_key(p), "missing {p}");
        }
    }
}
