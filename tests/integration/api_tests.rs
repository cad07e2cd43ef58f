//! API integration tests
//!
//! These run against a live server (with `calendar.backend = "memory"` and a
//! migrated database). Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

async fn create_request(client: &Client) -> Value {
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .json(&json!({
            "company": "Hartline Machining",
            "contact_name": "R. Hartline",
            "email": "shop@hartline.example",
            "address": "41 Forge Rd",
            "city": "Dayton",
            "state": "OH",
            "machine_model": "VF-2SS",
            "training_days": 3
        }))
        .send()
        .await
        .expect("Failed to send create request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse create response")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_create_request_assigns_reference_and_quote() {
    let client = Client::new();
    let body = create_request(&client).await;

    let reference = body["reference_code"].as_str().expect("No reference code");
    assert!(reference.starts_with("TR-"));
    assert_eq!(body["status"], 0);
    assert_eq!(body["assigned_technician"], "p.kowalski");
    assert!(body["total_price"].is_string() || body["total_price"].is_number());

    // Lookup by reference round-trips
    let response = client
        .get(format!("{}/requests/{}", BASE_URL, reference))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_create_request_rejects_bad_payload() {
    let client = Client::new();

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .json(&json!({
            "company": "Hartline Machining",
            "contact_name": "R. Hartline",
            "email": "not-an-email",
            "address": "41 Forge Rd",
            "city": "Dayton",
            "state": "OH",
            "training_days": 0
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_select_dates_with_wrong_length_fails() {
    let client = Client::new();
    let body = create_request(&client).await;
    let reference = body["reference_code"].as_str().expect("No reference code");

    // 2 days for a 3-day request
    let response = client
        .post(format!("{}/requests/{}/dates", BASE_URL, reference))
        .json(&json!({
            "start_date": "2027-03-10",
            "end_date": "2027-03-11"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_select_dates_books_tentatively() {
    let client = Client::new();
    let body = create_request(&client).await;
    let reference = body["reference_code"].as_str().expect("No reference code");

    let response = client
        .post(format!("{}/requests/{}/dates", BASE_URL, reference))
        .json(&json!({
            "start_date": "2027-03-10",
            "end_date": "2027-03-12"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "scheduled");
    assert_eq!(body["request"]["status"], 2);

    // Re-check of the caller's own range reports available
    let response = client
        .get(format!(
            "{}/requests/{}/availability?start_date=2027-03-10",
            BASE_URL, reference
        ))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available"], true);
}

#[tokio::test]
#[ignore]
async fn test_raw_availability() {
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/availability?technician=s.reed&start_date=2027-06-01&days=2",
            BASE_URL
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["available"].is_boolean());
    assert!(body["conflicts"].is_array());
}
