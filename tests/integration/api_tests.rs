//! API integration tests
//!
//! Drive a running server against a migrated database:
//! `cargo test -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";

async fn post(client: &Client, path: &str, body: Value) -> (StatusCode, Value) {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.expect("Failed to parse response"))
}

async fn put(client: &Client, path: &str, body: Value) -> (StatusCode, Value) {
    let response = client
        .put(format!("{}{}", BASE_URL, path))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.expect("Failed to parse response"))
}

async fn get(client: &Client, path: &str) -> (StatusCode, Value) {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.expect("Failed to parse response"))
}

/// Create a user and return its id
async fn create_user(client: &Client, role: &str) -> String {
    let (status, body) = post(
        client,
        "/users",
        json!({
            "firstName": "Binh",
            "lastName": "Nguyen Van",
            "dateOfBirth": "1990-01-15",
            "joinedDate": "2020-01-06",
            "gender": "Male",
            "role": role,
            "location": "HaNoi"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["id"].as_str().expect("user id").to_string()
}

/// Create an available asset and return its id
async fn create_asset(client: &Client) -> String {
    let code = format!("IT{}", &Uuid::new_v4().simple().to_string()[..10]);
    let (status, body) = post(
        client,
        "/assets",
        json!({
            "assetCode": code,
            "assetName": "Laptop HP Probook 450 G1",
            "category": "Laptop",
            "location": "HaNoi"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["id"].as_str().expect("asset id").to_string()
}

fn assignment_body(asset_id: &str, to: &str, by: &str, date: &str) -> Value {
    json!({
        "assetId": asset_id,
        "assignedIdTo": to,
        "assignedIdBy": by,
        "assignedDate": date,
        "note": "  onboarding laptop  "
    })
}

fn ids_of(body: &Value) -> Vec<&str> {
    body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|a| a["id"].as_str()).collect())
        .unwrap_or_default()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let (status, body) = get(&client, "/health").await;
    assert!(status.is_success());
    assert_eq!(body["status"], "healthy");

    let (status, body) = get(&client, "/ready").await;
    assert!(status.is_success());
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_unknown_asset_is_reported() {
    let client = Client::new();
    let admin = create_user(&client, "Admin").await;
    let staff = create_user(&client, "Staff").await;

    let (status, body) = post(
        &client,
        "/assignments",
        assignment_body(&Uuid::new_v4().to_string(), &staff, &admin, "2024-06-12"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["succeeded"], false);
    assert_eq!(body["message"], "Asset not found.");
}

#[tokio::test]
#[ignore]
async fn test_validation_lists_every_error() {
    let client = Client::new();

    let (status, body) = post(&client, "/assignments", json!({ "note": "x" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["succeeded"], false);
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
#[ignore]
async fn test_assignment_lifecycle() {
    let client = Client::new();
    let admin = create_user(&client, "Admin").await;
    let staff = create_user(&client, "Staff").await;
    let asset = create_asset(&client).await;

    // Assigned on the admin's joined date
    let (status, body) = post(
        &client,
        "/assignments",
        assignment_body(&asset, &staff, &admin, "2020-01-06"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["note"], "onboarding laptop");
    assert_eq!(body["data"]["state"], "WaitingForAcceptance");
    let assignment = body["data"]["id"].as_str().unwrap().to_string();

    // Nothing to return before acceptance
    let (status, body) = post(
        &client,
        "/return-requests",
        json!({ "assignmentId": assignment, "requestedBy": staff }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Only accepted assignments can be returned.");

    // The asset is now taken
    let (status, _) = post(
        &client,
        "/assignments",
        assignment_body(&asset, &staff, &admin, "2024-06-12"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = put(
        &client,
        &format!("/assignments/{}/state", assignment),
        json!({ "newState": "Accepted" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["state"], "Accepted");

    // Accepted is terminal
    let (status, body) = put(
        &client,
        &format!("/assignments/{}/state", assignment),
        json!({ "newState": "Declined" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Assignment state cannot be changed.");

    // Return it
    let (status, body) = post(
        &client,
        "/return-requests",
        json!({ "assignmentId": assignment, "requestedBy": staff }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let request = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = post(
        &client,
        "/return-requests",
        json!({ "assignmentId": assignment, "requestedBy": staff }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["message"],
        "A return request for this assignment is already in progress."
    );

    // A rejection leaves the assignment open for another request
    let (status, body) = put(
        &client,
        &format!("/return-requests/{}/state", request),
        json!({ "newState": "Rejected", "acceptedBy": admin }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["state"], "Rejected");

    let (status, body) = post(
        &client,
        "/return-requests",
        json!({ "assignmentId": assignment, "requestedBy": staff }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let request = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = put(
        &client,
        &format!("/return-requests/{}/state", request),
        json!({ "newState": "Completed", "acceptedBy": admin }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["state"], "Completed");

    // Completed assignments drop out of the user's filtered list only
    let (status, body) = get(&client, &format!("/users/{}/assignments/filter", staff)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!ids_of(&body).contains(&assignment.as_str()));

    let (status, body) = get(&client, &format!("/users/{}/assignments", staff)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(ids_of(&body).contains(&assignment.as_str()));

    // And the asset can be assigned again
    let (status, body) = get(&client, &format!("/assets/{}", asset)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "Available");

    let (status, _) = post(
        &client,
        "/assignments",
        assignment_body(&asset, &staff, &admin, "2024-06-12"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_assignment_of_one_asset() {
    let client = Client::new();
    let admin = create_user(&client, "Admin").await;
    let staff = create_user(&client, "Staff").await;
    let asset = create_asset(&client).await;

    let body = assignment_body(&asset, &staff, &admin, "2024-06-12");
    let (first, second) = tokio::join!(
        post(&client, "/assignments", body.clone()),
        post(&client, "/assignments", body.clone())
    );

    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
#[ignore]
async fn test_user_with_assignment_cannot_be_disabled() {
    let client = Client::new();
    let admin = create_user(&client, "Admin").await;
    let staff = create_user(&client, "Staff").await;
    let asset = create_asset(&client).await;

    let (status, _) = post(
        &client,
        "/assignments",
        assignment_body(&asset, &staff, &admin, "2024-06-12"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let response = client
        .delete(format!("{}/users/{}", BASE_URL, staff))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore]
async fn test_list_is_paged() {
    let client = Client::new();
    create_user(&client, "Staff").await;

    let (status, body) = get(&client, "/users?location=HaNoi&pageIndex=1&pageSize=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["succeeded"], true);
    assert_eq!(body["pageIndex"], 1);
    assert_eq!(body["pageSize"], 1);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert!(body["previousPage"].is_null());
    assert!(body["firstPage"]
        .as_str()
        .unwrap()
        .ends_with("/api/v1/users?location=HaNoi&pageIndex=1&pageSize=1"));
}
