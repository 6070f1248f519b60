mod support;

use axum::http::StatusCode;
use serde_json::json;

use service::access::repository::IdentityRepository;
use support::app;

#[tokio::test]
async fn role_routes_require_admin() {
    let app = app();
    let (_, sales) = app.user_with_roles("sales@example.com", &["Sales"]);
    for uri in ["/roles", "/roles/create", "/roles/assign?userId=x", "/users"] {
        assert_eq!(app.get(uri, None).await.status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(app.get(uri, Some(&sales)).await.status, StatusCode::FORBIDDEN, "{uri}");
    }
    let res = app.post("/roles/create", Some(&sales), json!({"name": "Sneaky"})).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(app.identity.find_role("Sneaky").await.unwrap().is_none());
}

#[tokio::test]
async fn create_role_validation_and_redirect() {
    let app = app();
    let admin = app.admin_token();

    let form = app.get("/roles/create", Some(&admin)).await;
    assert_eq!(form.status, StatusCode::OK);

    for body in [json!({}), json!({"name": ""}), json!({"name": "  "})] {
        let res = app.post("/roles/create", Some(&admin), body).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["message"], "role name is required");
    }

    let res = app.post("/roles/create", Some(&admin), json!({"name": "Sales"})).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert_eq!(res.location(), Some("/roles"));

    let dup = app.post("/roles/create", Some(&admin), json!({"name": "SALES"})).await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body["message"], "role already exists");
    assert_eq!(dup.body["input"]["name"], "SALES");

    let roles = app.get("/roles", Some(&admin)).await;
    let names: Vec<_> = roles.body.as_array().unwrap().iter().map(|r| r["name"].as_str().unwrap().to_string()).collect();
    assert_eq!(names, vec!["Admin", "Sales"]);
}

#[tokio::test]
async fn assign_form_for_known_and_unknown_users() {
    let app = app();
    let admin = app.admin_token();
    let user = app.identity.add_user("u@example.com", "U");

    let res = app.get(&format!("/roles/assign?userId={}", user.id), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["email"], "u@example.com");
    assert_eq!(res.body["user_roles"], json!([]));
    assert_eq!(res.body["all_roles"].as_array().map(Vec::len), Some(1));

    let missing = app.get(&format!("/roles/assign?userId={}", uuid::Uuid::new_v4()), Some(&admin)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/roles/assign", Some(&admin)).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/roles/assign?userId=nope", Some(&admin)).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assign_role_once_then_reject_duplicate() {
    let app = app();
    let admin = app.admin_token();
    let (uid, user_token) = app.user_with_roles("u@example.com", &[]);

    // not an admin yet
    let car = json!({"make": "Toyota", "model": "Corolla", "year": 2020, "price": "15000"});
    assert_eq!(app.post("/cars/create", Some(&user_token), car.clone()).await.status, StatusCode::FORBIDDEN);

    let res = app.post("/roles/assign", Some(&admin), json!({"userId": uid, "roleName": "Admin"})).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert_eq!(res.location(), Some("/users"));

    // memberships are re-read per request: the same token now carries Admin
    assert_eq!(app.post("/cars/create", Some(&user_token), car).await.status, StatusCode::FOUND);

    let again = app.post("/roles/assign", Some(&admin), json!({"userId": uid, "roleName": "admin"})).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["message"], "user already has this role");
    let admin_role = app.identity.find_role("Admin").await.unwrap().unwrap();
    assert_eq!(app.identity.membership_count(uid, admin_role.id), 1);
}

#[tokio::test]
async fn assign_unknown_role_or_user() {
    let app = app();
    let admin = app.admin_token();
    let user = app.identity.add_user("u@example.com", "U");

    let res = app.post("/roles/assign", Some(&admin), json!({"userId": user.id, "roleName": "Ghost"})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "role does not exist");

    let res = app.post("/roles/assign", Some(&admin), json!({"userId": uuid::Uuid::new_v4(), "roleName": "Admin"})).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_assignment_is_rejected_after_the_admin_check() {
    let app = app();
    let admin = app.admin_token();
    let body = json!({"userId": "not-a-uuid", "roleName": "Admin"});

    let res = app.post("/roles/assign", Some(&admin), body.clone()).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["input"]["userId"], "not-a-uuid");

    let (_, sales) = app.user_with_roles("sales@example.com", &["Sales"]);
    assert_eq!(app.post("/roles/assign", Some(&sales), body).await.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn users_listing_shows_roles() {
    let app = app();
    let admin = app.admin_token();
    app.user_with_roles("sales@example.com", &["Sales"]);

    let res = app.get("/users", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    let users = res.body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["email"], "admin@example.com");
    assert_eq!(users[0]["roles"], json!(["Admin"]));
    assert_eq!(users[1]["roles"], json!(["Sales"]));
}
