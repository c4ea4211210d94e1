//! Integration tests for the business REST API.
//!
//! Each test spins up an Axum server on a random port backed by an in-memory
//! libSQL store and exercises the real HTTP contract with reqwest.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use business_onboarding::routes::{BusinessRouteState, business_routes};
use business_onboarding::store::{BusinessStore, LibSqlStore};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Start an Axum server on a random port, return (base url, store).
async fn start_server() -> (String, Arc<LibSqlStore>) {
    let store = Arc::new(LibSqlStore::new_memory().await.unwrap());
    let app = business_routes(BusinessRouteState {
        store: store.clone(),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), store)
}

/// Server with one owner already registered.
async fn start_with_owner() -> (String, Arc<LibSqlStore>, String) {
    let (base, store) = start_server().await;
    let owner = store.create_owner("Ada", None).await.unwrap();
    (base, store, owner.id)
}

async fn post(base: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{base}{path}"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

async fn get(base: &str, path: &str) -> (StatusCode, Value) {
    let resp = reqwest::get(format!("{base}{path}")).await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn health_check() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let (status, body) = get(&base, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn create_parses_numbers_and_maps_category() {
    timeout(TEST_TIMEOUT, async {
        let (base, _, owner) = start_with_owner().await;
        let (status, body) = post(
            &base,
            "/api/businesses",
            json!({
                "name": "Calm Rooms",
                "category": "touch",
                "city": "Austin",
                "serviceRadius": "15",
                "capacity": "",
                "yearsInBusiness": 3.7
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Calm Rooms");
        assert_eq!(body["category"], "TOUCH");
        assert_eq!(body["serviceRadius"], 15);
        assert_eq!(body["capacity"], Value::Null);
        assert_eq!(body["yearsInBusiness"], 3);
        assert_eq!(body["ownerId"], owner.as_str());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn create_without_owner_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let (status, body) = post(&base, "/api/businesses/onboarding", json!({"name": "X"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No user found to assign as business owner");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn create_without_name_is_bad_request() {
    timeout(TEST_TIMEOUT, async {
        let (base, _, _) = start_with_owner().await;
        let (status, body) = post(&base, "/api/businesses", json!({"city": "Austin"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("name"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn basic_info_upserts_by_id() {
    timeout(TEST_TIMEOUT, async {
        let (base, store, _) = start_with_owner().await;
        let payload = json!({
            "businessName": "Sound Bath Co",
            "description": "Gongs and bowls.",
            "category": "SOUND",
            "phone": "555 123 4567",
            "email": "hi@sound.example"
        });

        let (status, first) = post(&base, "/api/businesses/basic-info", payload).await;
        assert_eq!(status, StatusCode::OK);
        let id = first["id"].as_str().unwrap().to_string();

        let (status, second) = post(
            &base,
            "/api/businesses/basic-info",
            json!({"id": id, "businessName": "Sound Bath Collective"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["id"], id.as_str());
        assert_eq!(second["name"], "Sound Bath Collective");
        assert_eq!(second["email"], "hi@sound.example");

        let (_, fresh) = post(
            &base,
            "/api/businesses/basic-info",
            json!({"id": "temp-1", "businessName": "Another"}),
        )
        .await;
        assert_ne!(fresh["id"], "temp-1");

        let all = store.list_businesses(&Default::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn onboarding_creates_from_wizard_data() {
    timeout(TEST_TIMEOUT, async {
        let (base, _, owner) = start_with_owner().await;
        let (status, body) = post(
            &base,
            "/api/businesses/onboarding",
            json!({
                "businessName": "Tea House",
                "name": "Tea House",
                "category": "TASTE",
                "state": "OR",
                "serviceRadius": 5,
                "capacity": "8",
                "promotionalText": "Slow tea.",
                "ownerId": owner
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Tea House");
        assert_eq!(body["capacity"], 8);
        assert_eq!(body["promotionalText"], "Slow tea.");

        let id = body["id"].as_str().unwrap();
        let (status, fetched) = get(&base, &format!("/api/businesses/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["category"], "TASTE");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn get_missing_is_not_found() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let (status, body) = get(&base, "/api/businesses/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Business not found");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn list_filters_and_projects() {
    timeout(TEST_TIMEOUT, async {
        let (base, _, _) = start_with_owner().await;
        for (name, category, city, state) in [
            ("Calm Rooms", "touch", "Austin", "TX"),
            ("Sound Bath", "sound", "Dallas", "TX"),
            ("Tea House", "taste", "Portland", "OR"),
        ] {
            let (status, _) = post(
                &base,
                "/api/businesses",
                json!({"name": name, "category": category, "city": city, "state": state}),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, all) = get(&base, "/api/businesses").await;
        assert_eq!(all.as_array().unwrap().len(), 3);
        let first = &all[0];
        assert!(first.get("profileImage").is_some());
        assert!(first.get("phone").is_none());

        let (_, texas) = get(&base, "/api/businesses?location=tx").await;
        assert_eq!(texas.as_array().unwrap().len(), 2);

        let (_, sound) = get(&base, "/api/businesses?category=Sound&location=dallas").await;
        assert_eq!(sound.as_array().unwrap().len(), 1);
        assert_eq!(sound[0]["name"], "Sound Bath");

        let (status, unknown) = get(&base, "/api/businesses?category=hearing").await;
        assert_eq!(status, StatusCode::OK);
        assert!(unknown.as_array().unwrap().is_empty());
    })
    .await
    .expect("test timed out");
}
