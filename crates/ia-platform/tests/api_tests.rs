//! Setup API integration tests
//!
//! Drives the `/api/setup` router end to end with `tower::ServiceExt::oneshot`.

mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use common::*;
use ia_platform::access::build_app;
use ia_platform::{
    AccessAdminService, AccessState, AuditService, InMemoryAuditLogRepository, InMemoryRoleStore,
};

async fn app() -> Router {
    let (service, _, _) = memory_service().await;
    build_app(AccessState { service }).0
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send_request(app, request).await
}

async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

mod roles {
    use super::*;

    #[tokio::test]
    async fn test_create_and_list_roles() {
        let app = app().await;

        let (status, body) = send(&app, Method::POST, "/api/setup?name=Admin").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "The Role Admin has been added successfully");

        let (status, body) = send(&app, Method::GET, "/api/setup").await;
        assert_eq!(status, StatusCode::OK);
        let roles = body.as_array().unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0]["name"], "Admin");
        assert!(roles[0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_duplicate_role_is_conflict() {
        let app = app().await;
        send(&app, Method::POST, "/api/setup?name=Admin").await;

        let (status, body) = send(&app, Method::POST, "/api/setup?name=Admin").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "ROLE_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_missing_role_name_is_bad_request() {
        let app = app().await;

        let (status, body) = send(&app, Method::POST, "/api/setup").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        let service = AccessAdminService::new(
            Arc::new(FaultyUserStore::new()),
            Arc::new(BrokenRoleStore::default()),
        );
        let app = build_app(AccessState { service }).0;

        let (status, body) = send(&app, Method::POST, "/api/setup?name=Admin").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "CREATE_FAILED");
    }
}

mod users {
    use super::*;

    #[tokio::test]
    async fn test_list_users_hides_credentials() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/api/setup/getallusers").await;
        assert_eq!(status, StatusCode::OK);

        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 2);
        for user in users {
            assert!(user.get("passwordHash").is_none());
            assert!(user.get("normalizedEmail").is_none());
            assert!(user["email"].is_string());
        }
    }

    #[tokio::test]
    async fn test_membership_flow() {
        let app = app().await;
        send(&app, Method::POST, "/api/setup?name=Admin").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/setup/addusertorole?email=bob@x.com&roleName=Admin",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "Success, user bob@x.com has been added to the role Admin");

        let (_, body) = send(&app, Method::GET, "/api/setup/getuserroles?email=bob@x.com").await;
        assert_eq!(body, serde_json::json!(["Admin"]));

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/setup/removeuserfromrole?email=bob@x.com&roleName=Admin",
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, Method::GET, "/api/setup/getuserroles?email=bob@x.com").await;
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_user_and_role_are_not_found() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/setup/addusertorole?email=missing@x.com&roleName=Admin",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "USER_NOT_FOUND");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/setup/addusertorole?email=bob@x.com&roleName=Ghost",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "ROLE_NOT_FOUND");
    }
}

mod claims {
    use super::*;

    #[tokio::test]
    async fn test_add_and_list_claims() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/setup/addclaimstouser?email=bob@x.com&claimName=dept&claimValue=eng",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "User bob@x.com has a claim dept added to them");

        let (status, body) = send(&app, Method::GET, "/api/setup/getalluserclaims?email=bob@x.com").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([{ "type": "dept", "value": "eng" }]));
    }

    #[tokio::test]
    async fn test_empty_claim_value_is_bad_request() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/setup/addclaimstouser?email=bob@x.com&claimName=dept",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_claims_of_unknown_user_is_not_found() {
        let app = app().await;

        let (status, _) = send(&app, Method::GET, "/api/setup/getalluserclaims?email=missing@x.com").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod request_context {
    use super::*;

    #[tokio::test]
    async fn test_headers_reach_the_audit_trail() {
        let users = Arc::new(FaultyUserStore::new());
        let repo = Arc::new(InMemoryAuditLogRepository::new());
        let audit = AuditService::new(repo.clone());
        let service = AccessAdminService::new(users, Arc::new(InMemoryRoleStore::new()))
            .with_audit(audit.clone());
        let app = build_app(AccessState { service }).0;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/setup?name=Admin")
            .header("X-Correlation-ID", "corr-42")
            .header("X-Principal-ID", "ops@x.com")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send_request(&app, request).await;
        assert_eq!(status, StatusCode::OK);

        let history = audit.history("Role", "Admin", 1).await.unwrap();
        assert_eq!(history[0].correlation_id, "corr-42");
        assert_eq!(history[0].principal_id, "ops@x.com");
    }

    #[tokio::test]
    async fn test_openapi_lists_setup_paths() {
        let (service, _, _) = memory_service().await;
        let (_, openapi) = build_app(AccessState { service });

        let paths: Vec<&String> = openapi.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/setup/addusertorole"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/setup/getalluserclaims"));
    }
}
