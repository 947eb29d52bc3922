//! End-to-end tests of the REST API against the in-memory store

use bson::{oid::ObjectId, DateTime};
use bytes::Bytes;
use clap::Parser;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

use openalt::auth::JwtValidator;
use openalt::db::schemas::{CategoryDoc, Metadata, PaymentOrderDoc, PaymentStatus};
use openalt::services::{
    CapturedOrder, CreatedOrder, Directory, DirectorySettings, PaymentGateway, RepoStats,
    RepoStatsSource,
};
use openalt::store::{DirectoryStore, MemoryStore};
use openalt::{server, AppState, Args, Result};

const ADMIN: &str = "admin@example.com";

struct FakeGitHub;

#[async_trait::async_trait]
impl RepoStatsSource for FakeGitHub {
    async fn fetch_stats(&self, _owner: &str, _repo: &str) -> Result<RepoStats> {
        Ok(RepoStats {
            stars: 1200,
            forks: 90,
            contributors: 45,
            license: Some("GPL-3.0".into()),
            pushed_at: Some(DateTime::now()),
        })
    }
}

struct FakePayPal;

#[async_trait::async_trait]
impl PaymentGateway for FakePayPal {
    async fn create_order(&self, _amount: &str, _currency: &str, _reference: &str)
        -> Result<CreatedOrder> {
        Ok(CreatedOrder {
            order_id: "ORDER-1".into(),
            status: "CREATED".into(),
            approve_url: Some("https://paypal.example/approve/ORDER-1".into()),
        })
    }

    async fn capture_order(&self, _order_id: &str) -> Result<CapturedOrder> {
        Ok(CapturedOrder {
            status: "COMPLETED".into(),
            capture_id: Some("CAPTURE-1".into()),
        })
    }
}

struct DeclinedPayPal;

#[async_trait::async_trait]
impl PaymentGateway for DeclinedPayPal {
    async fn create_order(&self, amount: &str, currency: &str, reference: &str)
        -> Result<CreatedOrder> {
        FakePayPal.create_order(amount, currency, reference).await
    }

    async fn capture_order(&self, _order_id: &str) -> Result<CapturedOrder> {
        Ok(CapturedOrder {
            status: "DECLINED".into(),
            capture_id: None,
        })
    }
}

fn app() -> Arc<AppState> {
    app_with(Some(Arc::new(FakePayPal)))
}

fn app_with(payments: Option<Arc<dyn PaymentGateway>>) -> Arc<AppState> {
    let args = Args::parse_from(["openalt", "--dev-mode", "--max-body-bytes", "4096"]);
    let settings = DirectorySettings {
        admin_emails: vec![ADMIN.to_string()],
        ad_interval: 2,
        ad_max_per_page: 3,
        ..Default::default()
    };
    let mut directory =
        Directory::new(Arc::new(MemoryStore::new()), JwtValidator::new_dev(), settings)
            .with_github(Arc::new(FakeGitHub));
    if let Some(payments) = payments {
        directory = directory.with_payments(payments);
    }
    Arc::new(AppState::new(args, directory))
}

async fn call(
    state: &Arc<AppState>,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    let req = builder.body(Full::new(Bytes::from(body))).unwrap();

    let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
    let response = server::handle_request(Arc::clone(state), addr, req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn signup(state: &Arc<AppState>, email: &str, name: &str) -> String {
    let (status, body) = call(
        state,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "email": email, "name": name, "password": "correct horse battery" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn submit(state: &Arc<AppState>, token: &str, name: &str) -> Value {
    let (status, body) = call(
        state,
        Method::POST,
        "/api/alternatives",
        Some(token),
        Some(json!({
            "name": name,
            "description": format!("{name} is an open-source project"),
            "githubUrl": format!("https://github.com/example/{}", name.to_lowercase()),
            "tags": ["Desktop"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn test_signup_login_me() {
    let state = app();
    signup(&state, "Ada@Example.com", "Ada").await;

    let (status, body) = call(
        &state,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "correct horse battery" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = call(&state, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ada@example.com");
    assert_eq!(me["permissionLevel"], "AUTHENTICATED");

    let (status, body) = call(
        &state,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = call(
        &state,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "email": "ada@example.com", "name": "Ada", "password": "another password" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_submission_moderation() {
    let state = app();
    let admin = signup(&state, ADMIN, "Admin").await;
    let user = signup(&state, "user@example.com", "User").await;

    let created = submit(&state, &user, "Penpot").await;
    assert_eq!(created["status"], "pending");
    assert_eq!(created["stars"], 1200);

    let (status, _) = call(&state, Method::GET, "/api/alternatives/penpot", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, detail) =
        call(&state, Method::GET, "/api/alternatives/penpot", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["canEdit"], true);

    let (status, _) = call(
        &state,
        Method::PUT,
        "/api/alternatives/penpot/status",
        Some(&user),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, approved) = call(
        &state,
        Method::PUT,
        "/api/alternatives/penpot/status",
        Some(&admin),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let (status, _) = call(&state, Method::GET, "/api/alternatives/penpot", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, notifications) =
        call(&state, Method::GET, "/api/notifications", Some(&user), None).await;
    assert_eq!(notifications.as_array().unwrap().len(), 1);

    let (status, body) = call(
        &state,
        Method::POST,
        "/api/alternatives",
        Some(&user),
        Some(json!({ "name": "penpot", "description": "Duplicate" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_vote_toggles() {
    let state = app();
    let admin = signup(&state, ADMIN, "Admin").await;
    let user = signup(&state, "voter@example.com", "Voter").await;
    submit(&state, &admin, "Jellyfin").await;

    let uri = "/api/alternatives/jellyfin/vote";
    let (status, body) = call(&state, Method::POST, uri, Some(&user), Some(json!({ "value": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 1);
    assert_eq!(body["userVote"], 1);

    let (_, body) = call(&state, Method::POST, uri, Some(&admin), Some(json!({ "value": -1 }))).await;
    assert_eq!(body["score"], 0);

    let (_, body) = call(&state, Method::POST, uri, Some(&user), Some(json!({ "value": 1 }))).await;
    assert_eq!(body["score"], -1);
    assert_eq!(body["userVote"], Value::Null);

    let (status, _) = call(&state, Method::POST, uri, Some(&user), Some(json!({ "value": 3 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&state, Method::POST, uri, None, Some(json!({ "value": 1 }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_listing_pages() {
    let state = app();
    let admin = signup(&state, ADMIN, "Admin").await;
    for name in ["Audacity", "Blender", "Krita"] {
        submit(&state, &admin, name).await;
    }

    let (status, page) = call(
        &state,
        Method::GET,
        "/api/alternatives?limit=2&page=2&sort=name",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);

    let (status, _) = call(&state, Method::GET, "/api/alternatives?sort=bogus", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, page) =
        call(&state, Method::GET, "/api/alternatives?search=BLEND", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"][0]["slug"], "blender");

    let (status, _) =
        call(&state, Method::GET, "/api/alternatives?status=pending", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_discussion_reply_notifies() {
    let state = app();
    let admin = signup(&state, ADMIN, "Admin").await;
    let user = signup(&state, "talker@example.com", "Talker").await;
    submit(&state, &admin, "Zulip").await;

    let uri = "/api/alternatives/zulip/discussions";
    let (status, comment) = call(
        &state,
        Method::POST,
        uri,
        Some(&user),
        Some(json!({ "body": "Does it support SSO?" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let parent_id = comment["id"].as_str().unwrap().to_string();

    let (status, reply) = call(
        &state,
        Method::POST,
        uri,
        Some(&admin),
        Some(json!({ "body": "Yes, via SAML.", "parentId": parent_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reply["isCreator"], true);

    let reply_id = reply["id"].as_str().unwrap().to_string();
    let (status, _) = call(
        &state,
        Method::POST,
        uri,
        Some(&user),
        Some(json!({ "body": "Nested", "parentId": reply_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, threads) = call(&state, Method::GET, uri, None, None).await;
    assert_eq!(threads.as_array().unwrap().len(), 1);
    assert_eq!(threads[0]["replies"].as_array().unwrap().len(), 1);

    let (_, unread) =
        call(&state, Method::GET, "/api/notifications?unread=true", Some(&user), None).await;
    assert_eq!(unread.as_array().unwrap().len(), 1);

    let (status, marked) =
        call(&state, Method::POST, "/api/notifications/read-all", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(marked["updated"], 1);

    let (_, unread) =
        call(&state, Method::GET, "/api/notifications?unread=true", Some(&user), None).await;
    assert!(unread.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_ads_in_listing() {
    let state = app();
    let admin = signup(&state, ADMIN, "Admin").await;
    let advertiser = signup(&state, "ads@example.com", "Advertiser").await;
    for name in ["Gitea", "Forgejo", "Mattermost"] {
        submit(&state, &admin, name).await;
    }

    let (status, ad) = call(
        &state,
        Method::POST,
        "/api/advertisements",
        Some(&advertiser),
        Some(json!({
            "title": "Managed hosting",
            "targetUrl": "https://hosting.example.com",
            "format": "card",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ad["status"], "pending");
    let ad_id = ad["id"].as_str().unwrap().to_string();

    let (_, page) = call(&state, Method::GET, "/api/alternatives?ads=true", None, None).await;
    assert!(page["items"].as_array().unwrap().iter().all(|e| e["type"] == "item"));

    let (status, _) = call(
        &state,
        Method::PUT,
        &format!("/api/advertisements/{ad_id}/status"),
        Some(&admin),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, page) = call(&state, Method::GET, "/api/alternatives?ads=true", None, None).await;
    let entries = page["items"].as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[2]["type"], "ad");
    assert_eq!(entries[2]["data"]["id"], ad_id.as_str());

    let (status, click) = call(
        &state,
        Method::POST,
        &format!("/api/advertisements/{ad_id}/click"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(click["recorded"], true);
    assert_eq!(click["targetUrl"], "https://hosting.example.com");

    let (_, running) = call(&state, Method::GET, "/api/advertisements", None, None).await;
    assert_eq!(running[0]["clicks"], 1);
}

#[tokio::test]
async fn test_sponsor_checkout() {
    let state = app();
    let admin = signup(&state, ADMIN, "Admin").await;
    let owner = signup(&state, "owner@example.com", "Owner").await;
    let stranger = signup(&state, "stranger@example.com", "Stranger").await;
    submit(&state, &owner, "Plausible").await;

    let order = json!({ "alternativeSlug": "plausible" });
    let (status, _) =
        call(&state, Method::POST, "/api/payments/orders", Some(&owner), Some(order.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    call(
        &state,
        Method::PUT,
        "/api/alternatives/plausible/status",
        Some(&admin),
        Some(json!({ "status": "approved" })),
    )
    .await;

    let (status, _) =
        call(&state, Method::POST, "/api/payments/orders", Some(&stranger), Some(order.clone()))
            .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) =
        call(&state, Method::POST, "/api/payments/orders", Some(&owner), Some(order)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["orderId"], "ORDER-1");
    assert_eq!(created["amount"], "49.00");

    let capture = "/api/payments/orders/ORDER-1/capture";
    let (status, captured) = call(&state, Method::POST, capture, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(captured["status"], "captured");
    assert_eq!(captured["alternativeSlug"], "plausible");

    let (status, _) = call(&state, Method::POST, capture, Some(&owner), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, detail) = call(&state, Method::GET, "/api/alternatives/plausible", None, None).await;
    assert_eq!(detail["plan"], "sponsor");
    assert_eq!(detail["sponsored"], true);
}

#[tokio::test]
async fn test_edit_keeps_vote_score() {
    let state = app();
    let admin = signup(&state, ADMIN, "Admin").await;
    let user = signup(&state, "editor@example.com", "Editor").await;
    submit(&state, &admin, "Nextcloud").await;

    let (_, body) = call(
        &state,
        Method::POST,
        "/api/alternatives/nextcloud/vote",
        Some(&user),
        Some(json!({ "value": 1 })),
    )
    .await;
    assert_eq!(body["score"], 1);

    let (status, edited) = call(
        &state,
        Method::PUT,
        "/api/alternatives/nextcloud",
        Some(&admin),
        Some(json!({ "description": "Self-hosted file sync" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{edited}");
    assert_eq!(edited["voteScore"], 1);

    let store = state.directory.store();
    let stored = store.find_alternative("nextcloud").await.unwrap().unwrap();
    let votes = store.list_votes(stored.id.unwrap()).await.unwrap();
    let sum: i64 = votes.iter().map(|v| i64::from(v.value)).sum();
    assert_eq!(stored.vote_score, sum);
    assert_eq!(stored.description, "Self-hosted file sync");
}

#[tokio::test]
async fn test_payments_without_gateway() {
    let state = app_with(None);
    let admin = signup(&state, ADMIN, "Admin").await;
    submit(&state, &admin, "Umami").await;

    let (status, body) = call(
        &state,
        Method::POST,
        "/api/payments/orders",
        Some(&admin),
        Some(json!({ "alternativeSlug": "umami" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_declined_capture_fails_order() {
    let state = app_with(Some(Arc::new(DeclinedPayPal)));
    let admin = signup(&state, ADMIN, "Admin").await;
    submit(&state, &admin, "Matomo").await;

    let (status, _) = call(
        &state,
        Method::POST,
        "/api/payments/orders",
        Some(&admin),
        Some(json!({ "alternativeSlug": "matomo" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &state,
        Method::POST,
        "/api/payments/orders/ORDER-1/capture",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let payment = state.directory.store().find_payment("ORDER-1").await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);

    let (_, detail) = call(&state, Method::GET, "/api/alternatives/matomo", None, None).await;
    assert_eq!(detail["plan"], "free");
}

#[tokio::test]
async fn test_capture_for_missing_alternative() {
    let state = app_with(Some(Arc::new(DeclinedPayPal)));
    let admin = signup(&state, ADMIN, "Admin").await;

    let store = state.directory.store();
    store
        .insert_payment(PaymentOrderDoc {
            id: None,
            metadata: Metadata::new(),
            order_id: "ORDER-9".into(),
            alternative_id: ObjectId::new(),
            user_id: ObjectId::new(),
            amount: "49.00".into(),
            currency: "USD".into(),
            status: PaymentStatus::Created,
            capture_id: None,
        })
        .await
        .unwrap();

    let (status, _) = call(
        &state,
        Method::POST,
        "/api/payments/orders/ORDER-9/capture",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The gateway was never asked to capture
    let payment = store.find_payment("ORDER-9").await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Created);
}

#[tokio::test]
async fn test_category_filter_includes_subcategories() {
    let state = app();
    let admin = signup(&state, ADMIN, "Admin").await;

    let store = state.directory.store();
    let media = store
        .upsert_category(CategoryDoc {
            id: None,
            metadata: Metadata::new(),
            name: "Media".into(),
            slug: "media".into(),
            parent: None,
        })
        .await
        .unwrap();
    store
        .upsert_category(CategoryDoc {
            id: None,
            metadata: Metadata::new(),
            name: "Video Editing".into(),
            slug: "video-editing".into(),
            parent: Some(media),
        })
        .await
        .unwrap();

    let (status, _) = call(
        &state,
        Method::POST,
        "/api/alternatives",
        Some(&admin),
        Some(json!({
            "name": "Kdenlive",
            "description": "Video editor",
            "categories": ["video-editing"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    submit(&state, &admin, "Bitwarden").await;

    let (status, page) =
        call(&state, Method::GET, "/api/alternatives?category=media", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["slug"], "kdenlive");

    let (_, page) =
        call(&state, Method::GET, "/api/alternatives?category=video-editing", None, None).await;
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn test_protocol_edges() {
    let state = app();

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/alternatives")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
    let response = server::handle_request(Arc::clone(&state), addr, req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let (status, body) = call(&state, Method::GET, "/api/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let huge = json!({ "email": "x@example.com", "name": "x".repeat(5000), "password": "long enough" });
    let (status, _) = call(&state, Method::POST, "/auth/signup", None, Some(huge)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, health) = call(&state, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["healthy"], true);
    assert_eq!(health["store"], "memory");

    let (status, _) = call(&state, Method::GET, "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
