//! REST backend tests against a mock HTTP server.
//!
//! Each test mounts the exact request the backend is expected to send and
//! checks how the response is mapped back into domain results and errors.

use lounge_client::{
    AuthError, BackendConfig, IdentityProvider, MemoryBackend, MembershipMutator,
    MembershipStore, MutationError, RestBackend, StoreError,
};
use lounge_core::{Identity, LoungeId, Membership, UserId};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

const ANON_KEY: &str = "anon-key";
const TOKEN: &str = "user-jwt";

fn backend(server: &MockServer, token: Option<&str>) -> RestBackend {
    RestBackend::new(BackendConfig {
        url: server.uri(),
        anon_key: ANON_KEY.to_string(),
        access_token: token.map(str::to_string),
    })
    .unwrap()
}

fn ids() -> (UserId, LoungeId) {
    (
        "11111111-1111-4111-8111-111111111111".parse().unwrap(),
        "22222222-2222-4222-8222-222222222222".parse().unwrap(),
    )
}

#[tokio::test]
async fn insert_posts_membership_row() {
    let server = MockServer::start().await;
    let (user, lounge) = ids();

    Mock::given(method("POST"))
        .and(path("/rest/v1/memberships"))
        .and(header("apikey", ANON_KEY))
        .and(header("authorization", "Bearer user-jwt"))
        .and(body_json(json!({ "user_id": user, "lounge_id": lounge })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    backend(&server, Some(TOKEN)).insert_membership(Membership::new(user, lounge)).await.unwrap();
}

#[tokio::test]
async fn duplicate_insert_maps_to_conflict() {
    let server = MockServer::start().await;
    let (user, lounge) = ids();

    Mock::given(method("POST"))
        .and(path("/rest/v1/memberships"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "details": "Key (user_id, lounge_id) already exists.",
            "hint": null,
            "message": "duplicate key value violates unique constraint \"memberships_pkey\""
        })))
        .mount(&server)
        .await;

    let mutator = MembershipMutator::new(backend(&server, Some(TOKEN)));
    let err = mutator.join(user, lounge).await.unwrap_err();

    assert!(matches!(err, MutationError::Store(StoreError::Conflict { .. })));
    assert_eq!(
        err.to_string(),
        "duplicate key value violates unique constraint \"memberships_pkey\""
    );
}

#[tokio::test]
async fn foreign_key_violation_is_rejected_like_memory_backend() {
    let server = MockServer::start().await;
    let (user, lounge) = ids();

    Mock::given(method("POST"))
        .and(path("/rest/v1/memberships"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23503",
            "details": "Key (lounge_id) is not present in table \"lounges\".",
            "hint": null,
            "message": "insert or update on table \"memberships\" violates foreign key constraint \"memberships_lounge_id_fkey\""
        })))
        .mount(&server)
        .await;

    let rest_err = backend(&server, Some(TOKEN))
        .insert_membership(Membership::new(user, lounge))
        .await
        .unwrap_err();

    let memory = MemoryBackend::new();
    memory.set_session(Some(Identity::new(user, None)));
    let memory_err = memory.insert_membership(Membership::new(user, lounge)).await.unwrap_err();

    assert_eq!(rest_err, memory_err);
    assert!(matches!(
        &rest_err,
        StoreError::Rejected { status: 409, code: Some(code), .. } if code == "23503"
    ));
}

#[tokio::test]
async fn conflict_without_code_is_still_a_duplicate() {
    let server = MockServer::start().await;
    let (user, lounge) = ids();

    Mock::given(method("POST"))
        .and(path("/rest/v1/memberships"))
        .respond_with(ResponseTemplate::new(409).set_body_string("already a member"))
        .mount(&server)
        .await;

    let err = backend(&server, Some(TOKEN))
        .insert_membership(Membership::new(user, lounge))
        .await
        .unwrap_err();

    assert_eq!(err, StoreError::Conflict { message: "already a member".to_string() });
}

#[tokio::test]
async fn delete_filters_on_both_columns() {
    let server = MockServer::start().await;
    let (user, lounge) = ids();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/memberships"))
        .and(query_param("user_id", format!("eq.{user}")))
        .and(query_param("lounge_id", format!("eq.{lounge}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mutator = MembershipMutator::new(backend(&server, Some(TOKEN)));
    mutator.leave(user, lounge).await.unwrap();
}

#[tokio::test]
async fn expired_session_is_not_authenticated() {
    let server = MockServer::start().await;
    let (user, lounge) = ids();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/memberships"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "code": "PGRST301", "message": "JWT expired" })),
        )
        .mount(&server)
        .await;

    let mutator = MembershipMutator::new(backend(&server, Some(TOKEN)));
    let err = mutator.leave(user, lounge).await.unwrap_err();

    assert_eq!(err, MutationError::NotAuthenticated);
}

#[tokio::test]
async fn rpc_rows_decode_into_lounges() {
    let server = MockServer::start().await;
    let (_, lounge) = ids();

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/get_lounges_with_user_membership"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": lounge,
            "slug": "rustaceans",
            "title": "Rustaceans",
            "description": null,
            "image_url": "https://img.example/rust.png",
            "member_count": 12,
            "is_member": false
        }])))
        .mount(&server)
        .await;

    let lounges = backend(&server, None).lounges_with_membership().await.unwrap();

    assert_eq!(lounges.len(), 1);
    assert_eq!(lounges[0].id, lounge);
    assert_eq!(lounges[0].member_count, 12);
    assert_eq!(lounges[0].description, None);
}

#[tokio::test]
async fn lounge_by_slug_passes_slug_argument() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/get_lounge_by_slug"))
        .and(body_json(json!({ "slug": "missing" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = backend(&server, None).lounge_by_slug("missing").await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn read_failure_is_surfaced_not_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/get_my_lounges"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = backend(&server, Some(TOKEN)).my_lounges().await.unwrap_err();

    assert_eq!(err, StoreError::Rejected {
        status: 500,
        code: None,
        message: "upstream exploded".to_string()
    });
}

#[tokio::test]
async fn malformed_rows_are_decode_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/get_my_lounges"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "not": "a list" })))
        .mount(&server)
        .await;

    let err = backend(&server, Some(TOKEN)).my_lounges().await.unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)));
}

#[tokio::test]
async fn current_user_without_token_skips_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(backend(&server, None).current_user().await.unwrap(), None);
}

#[tokio::test]
async fn current_user_decodes_identity() {
    let server = MockServer::start().await;
    let (user, _) = ids();

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer user-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": user,
            "aud": "authenticated",
            "email": "ada@example.com"
        })))
        .mount(&server)
        .await;

    let identity = backend(&server, Some(TOKEN)).current_user().await.unwrap().unwrap();
    assert_eq!(identity.user_id, user);
    assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn rejected_token_reads_as_signed_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "msg": "invalid JWT" })))
        .mount(&server)
        .await;

    assert_eq!(backend(&server, Some(TOKEN)).current_user().await.unwrap(), None);
}

#[tokio::test]
async fn magic_link_request_and_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/otp"))
        .and(body_json(json!({ "email": "ada@example.com", "create_user": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/otp"))
        .and(body_json(json!({ "email": "spam@example.com", "create_user": true })))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({ "msg": "Email rate limit exceeded" })),
        )
        .mount(&server)
        .await;

    let backend = backend(&server, None);
    backend.sign_in_with_email("ada@example.com").await.unwrap();

    let err = backend.sign_in_with_email("spam@example.com").await.unwrap_err();
    assert_eq!(err, AuthError::Rejected {
        status: 429,
        message: "Email rate limit exceeded".to_string()
    });

    let err = backend.sign_in_with_email("nope").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidEmail(_)));
}

#[tokio::test]
async fn sign_out_clears_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer user-jwt"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server, Some(TOKEN));
    backend.sign_out().await.unwrap();

    assert_eq!(backend.access_token().await, None);
    // Second sign-out has no token and must not hit the server again.
    backend.sign_out().await.unwrap();
}
