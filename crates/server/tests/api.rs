use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, Role};
use server::{ServerState, router};

const ALICE: (&str, &str) = ("alice@example.com", "alice-pw");
const BOB: (&str, &str) = ("bob@example.com", "bob-pw");
const ROOT: (&str, &str) = ("root@example.com", "root-pw");

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine
        .create_user("Alice", ALICE.0, ALICE.1, Role::User)
        .await
        .unwrap();
    engine
        .create_user("Bob", BOB.0, BOB.1, Role::User)
        .await
        .unwrap();
    engine
        .create_user("Root", ROOT.0, ROOT.1, Role::Admin)
        .await
        .unwrap();

    router(ServerState {
        engine: Arc::new(engine),
    })
}

fn basic(credentials: (&str, &str)) -> String {
    let token = base64::engine::general_purpose::STANDARD
        .encode(format!("{}:{}", credentials.0, credentials.1));
    format!("Basic {token}")
}

async fn call(
    app: &Router,
    credentials: Option<(&str, &str)>,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(credentials) = credentials {
        request = request.header(header::AUTHORIZATION, basic(credentials));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn id(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

/// Creates a currency, a category and an account with an opening balance for
/// `who`, returning `(account_id, category_id)`.
async fn setup_account(app: &Router, who: (&str, &str), initial: i64) -> (String, String) {
    let (status, currency) = call(
        app,
        Some(who),
        Method::POST,
        "/api/currencies",
        Some(json!({ "name": "EUR" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, category) = call(
        app,
        Some(who),
        Method::POST,
        "/api/categories",
        Some(json!({ "name": "Groceries" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, types) = call(app, Some(who), Method::GET, "/api/accounttypes", None).await;
    let cash = types
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["name"] == "Cash")
        .unwrap()
        .clone();

    let (status, account) = call(
        app,
        Some(who),
        Method::POST,
        "/api/accounts",
        Some(json!({
            "name": "Wallet",
            "account_type_id": id(&cash),
            "currency_id": id(&currency),
            "initial_balance_minor": initial,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(account["balance"], initial);

    (id(&account), id(&category))
}

#[tokio::test]
async fn requests_without_valid_credentials_are_rejected() {
    let app = app().await;

    let (status, _) = call(&app, None, Method::GET, "/api/accounts", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        Some((ALICE.0, "wrong")),
        Method::GET,
        "/api/accounts",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, me) = call(&app, Some(ALICE), Method::GET, "/api/users/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], ALICE.0);
    assert_eq!(me["role"], "user");
}

#[tokio::test]
async fn transaction_writes_keep_balance_in_sync() {
    let app = app().await;
    let (account_id, category_id) = setup_account(&app, ALICE, 10_000).await;

    let (status, tx) = call(
        &app,
        Some(ALICE),
        Method::POST,
        "/api/transactions",
        Some(json!({
            "account_id": account_id,
            "category_id": category_id,
            "kind": "expense",
            "amount_minor": 2_500,
            "created_on": "2026-03-01T10:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tx_id = id(&tx);

    let (_, account) = call(
        &app,
        Some(ALICE),
        Method::GET,
        &format!("/api/accounts/{account_id}"),
        None,
    )
    .await;
    assert_eq!(account["account"]["balance"], 7_500);
    assert_eq!(account["initial_balance"], 10_000);

    let (status, _) = call(
        &app,
        Some(ALICE),
        Method::PATCH,
        &format!("/api/transactions/{tx_id}"),
        Some(json!({ "kind": "income" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, deleted) = call(
        &app,
        Some(ALICE),
        Method::DELETE,
        &format!("/api/transactions/{tx_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["balance_minor"], 10_000);

    let (status, recomputed) = call(
        &app,
        Some(ALICE),
        Method::POST,
        &format!("/api/accounts/{account_id}/recompute"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recomputed["balance_minor"], 10_000);
}

#[tokio::test]
async fn engine_errors_map_to_status_codes() {
    let app = app().await;
    let (account_id, category_id) = setup_account(&app, ALICE, 0).await;

    let (status, body) = call(
        &app,
        Some(ALICE),
        Method::POST,
        "/api/transactions",
        Some(json!({
            "account_id": account_id,
            "category_id": category_id,
            "kind": "income",
            "amount_minor": 0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("amount"));

    let (status, _) = call(
        &app,
        Some(BOB),
        Method::GET,
        &format!("/api/accounts/{account_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        Some(ROOT),
        Method::GET,
        &format!("/api/accounts/{account_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        Some(ALICE),
        Method::GET,
        "/api/accounts/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        Some(ALICE),
        Method::POST,
        "/api/categories",
        Some(json!({ "name": "  groceries " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already present"));

    // A balance past i64 is a client error, not a storage failure.
    let huge = json!({
        "account_id": account_id,
        "category_id": category_id,
        "kind": "income",
        "amount_minor": i64::MAX,
    });
    let (status, _) = call(
        &app,
        Some(ALICE),
        Method::POST,
        "/api/transactions",
        Some(huge.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(
        &app,
        Some(ALICE),
        Method::POST,
        "/api/transactions",
        Some(huge),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, account) = call(
        &app,
        Some(ALICE),
        Method::GET,
        &format!("/api/accounts/{account_id}"),
        None,
    )
    .await;
    assert_eq!(account["account"]["balance"], i64::MAX);

    let (status, _) = call(&app, Some(ALICE), Method::GET, "/api/users", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn listing_pages_and_cash_flow() {
    let app = app().await;
    let (account_id, category_id) = setup_account(&app, ALICE, 0).await;

    for (day, amount) in [(1, 100), (2, 200), (3, 300)] {
        let (status, _) = call(
            &app,
            Some(ALICE),
            Method::POST,
            "/api/transactions",
            Some(json!({
                "account_id": account_id,
                "category_id": category_id,
                "kind": "income",
                "amount_minor": amount,
                "created_on": format!("2026-03-0{day}T12:00:00Z"),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = call(
        &app,
        Some(ALICE),
        Method::GET,
        "/api/transactions?limit=2",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["transaction"]["amount"], 300);
    assert_eq!(items[0]["category"], "Groceries");
    let cursor = page["next_cursor"].as_str().unwrap().to_string();

    let (_, page) = call(
        &app,
        Some(ALICE),
        Method::GET,
        &format!("/api/transactions?limit=2&cursor={cursor}"),
        None,
    )
    .await;
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["transaction"]["amount"], 100);
    assert!(page["next_cursor"].is_null());

    let (status, flow) = call(
        &app,
        Some(ALICE),
        Method::GET,
        "/api/transactions/cashflow?from=2026-03-02T00:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flow[0]["currency"], "EUR");
    assert_eq!(flow[0]["income"], 500);
    assert_eq!(flow[0]["expense"], 0);

    let (status, balances) = call(
        &app,
        Some(ALICE),
        Method::GET,
        "/api/accounts/balances",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balances[0]["balance"], 600);
}

#[tokio::test]
async fn reference_delete_archives_used_entries() {
    let app = app().await;
    let (account_id, category_id) = setup_account(&app, ALICE, 0).await;

    let (status, _) = call(
        &app,
        Some(ALICE),
        Method::POST,
        "/api/transactions",
        Some(json!({
            "account_id": account_id,
            "category_id": category_id,
            "kind": "expense",
            "amount_minor": 150,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, deleted) = call(
        &app,
        Some(ALICE),
        Method::DELETE,
        &format!("/api/categories/{category_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["outcome"], "archived");

    let (_, active) = call(&app, Some(ALICE), Method::GET, "/api/categories", None).await;
    assert!(active.as_array().unwrap().is_empty());

    let (_, with_deleted) = call(
        &app,
        Some(ALICE),
        Method::GET,
        "/api/categories?include_deleted=true",
        None,
    )
    .await;
    let items = with_deleted.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["status"], "deleted");

    let (status, renamed) = call(
        &app,
        Some(ALICE),
        Method::POST,
        "/api/categories",
        Some(json!({ "name": "Groceries" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(id(&renamed), category_id);
    assert_eq!(renamed["status"], "active");

    let (_, dropdown) = call(
        &app,
        Some(ALICE),
        Method::GET,
        "/api/accounts/dropdown",
        None,
    )
    .await;
    assert_eq!(dropdown[0]["name"], "Wallet");
}

#[tokio::test]
async fn messages_round_trip_between_user_and_admin() {
    let app = app().await;

    let (status, message) = call(
        &app,
        Some(ALICE),
        Method::POST,
        "/api/messages",
        Some(json!({ "subject": "Import", "body": "Can I import CSV files?" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let message_id = id(&message);

    let (_, unseen) = call(&app, Some(ROOT), Method::GET, "/api/messages/unseen", None).await;
    assert_eq!(unseen["unseen"], 1);

    let (status, _) = call(
        &app,
        Some(ROOT),
        Method::POST,
        &format!("/api/messages/{message_id}/replies"),
        Some(json!({ "body": "Not yet." })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, unseen) = call(&app, Some(ROOT), Method::GET, "/api/messages/unseen", None).await;
    assert_eq!(unseen["unseen"], 0);
    let (_, unseen) = call(&app, Some(ALICE), Method::GET, "/api/messages/unseen", None).await;
    assert_eq!(unseen["unseen"], 1);

    let (status, thread) = call(
        &app,
        Some(ALICE),
        Method::GET,
        &format!("/api/messages/{message_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread["replies"].as_array().unwrap().len(), 1);

    let (status, _) = call(
        &app,
        Some(BOB),
        Method::GET,
        &format!("/api/messages/{message_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_manages_roles() {
    let app = app().await;
    let (_, users) = call(&app, Some(ROOT), Method::GET, "/api/users", None).await;
    let bob = users
        .as_array()
        .unwrap()
        .iter()
        .find(|summary| summary["user"]["email"] == BOB.0)
        .unwrap()
        .clone();
    let bob_id = bob["user"]["id"].as_str().unwrap().to_string();

    let (status, updated) = call(
        &app,
        Some(ROOT),
        Method::PUT,
        &format!("/api/users/{bob_id}/role"),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "admin");

    let (status, _) = call(&app, Some(BOB), Method::GET, "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
}
