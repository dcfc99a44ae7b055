//! Integration tests for ride endpoints.
//!
//! Run with: cargo test --test rides_integration

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{
    create_test_app, create_test_app_with_store, create_test_ride, empty_request, json_request,
    parse_response_body, request_to_join, test_config, test_config_with, TestRide,
};
use domain::services::InMemoryRideStore;
use serde_json::json;
use tower::ServiceExt;

// ============================================================================
// Create Ride Tests
// ============================================================================

#[tokio::test]
async fn test_create_ride_success() {
    let app = create_test_app(test_config());

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/rides/add",
            TestRide::new().seats(3).to_json(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Ride created successfully!");
    assert_eq!(body["ride"]["seatsAvailable"], 3);
    assert_eq!(body["ride"]["isFull"], false);
    assert_eq!(body["ride"]["creatorId"], "123456");
    assert_eq!(body["ride"]["pendingJoinRequests"], json!([]));
    assert_eq!(body["ride"]["joinedUsers"], json!([]));
    assert!(body["ride"].get("version").is_none());
}

#[tokio::test]
async fn test_create_ride_default_seats() {
    let app = create_test_app(test_config());
    let ride = create_test_ride(&app, &TestRide::new()).await;
    assert_eq!(ride["seatsAvailable"], 1);
}

#[tokio::test]
async fn test_create_ride_missing_fields() {
    let app = create_test_app(test_config());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/rides/add",
            json!({ "name": "Alice", "pickup": "A" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("contact"));
    assert!(message.contains("destination"));
    assert!(message.contains("datetime"));
}

#[tokio::test]
async fn test_create_ride_zero_seats_rejected() {
    let app = create_test_app(test_config());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/rides/add",
            TestRide::new().seats(0).to_json(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_ride_malformed_body() {
    let app = create_test_app(test_config());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/rides/add",
            json!({ "seatsAvailable": "many" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_create_ride_incomplete_coordinates_are_dropped() {
    let app = create_test_app(test_config());

    let mut payload = TestRide::new().to_json();
    payload["pickupCoords"] = json!({ "lat": 52.5 });
    payload["destinationCoords"] = json!({ "lat": null, "lng": null });
    let response = app
        .oneshot(json_request(Method::POST, "/api/rides/add", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert!(body["ride"].get("pickupCoords").is_none());
    assert!(body["ride"].get("destinationCoords").is_none());
}

#[tokio::test]
async fn test_create_ride_keeps_full_coordinates() {
    let app = create_test_app(test_config());

    let mut payload = TestRide::new().to_json();
    payload["pickupCoords"] = json!({ "lat": 52.5, "lng": 13.4 });
    let response = app
        .oneshot(json_request(Method::POST, "/api/rides/add", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["ride"]["pickupCoords"], json!({ "lat": 52.5, "lng": 13.4 }));
}

#[tokio::test]
async fn test_create_ride_local_datetime() {
    let app = create_test_app(test_config());

    let mut payload = TestRide::new().to_json();
    payload["datetime"] = json!("2026-11-01T08:30");
    let response = app
        .oneshot(json_request(Method::POST, "/api/rides/add", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["ride"]["datetime"], "2026-11-01T08:30:00Z");
}

#[tokio::test]
async fn test_create_ride_unparsable_datetime() {
    let app = create_test_app(test_config());

    let mut payload = TestRide::new().to_json();
    payload["datetime"] = json!("tomorrow morning");
    let response = app
        .oneshot(json_request(Method::POST, "/api/rides/add", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_ride_server_creator_id() {
    let app = create_test_app(test_config_with(&[("rides.creator_id_mode", "server")]));

    let mut payload = TestRide::new().to_json();
    payload.as_object_mut().unwrap().remove("creatorId");
    let response = app
        .oneshot(json_request(Method::POST, "/api/rides/add", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    let creator_id = body["ride"]["creatorId"].as_str().unwrap();
    assert_eq!(creator_id.len(), 6);
    assert!(creator_id.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_create_ride_store_failure() {
    let app = create_test_app_with_store(test_config(), Arc::new(InMemoryRideStore::failing()));

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/rides/add",
            TestRide::new().to_json(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "An internal error occurred");
}

// ============================================================================
// Listing and Search Tests
// ============================================================================

#[tokio::test]
async fn test_list_rides_newest_first() {
    let app = create_test_app(test_config());
    let first = create_test_ride(&app, &TestRide::new()).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = create_test_ride(&app, &TestRide::new()).await;

    let response = app
        .oneshot(empty_request(Method::GET, "/api/rides"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let rides = body.as_array().unwrap();
    assert_eq!(rides.len(), 2);
    assert_eq!(rides[0]["id"], second["id"]);
    assert_eq!(rides[1]["id"], first["id"]);
}

#[tokio::test]
async fn test_find_rides_case_insensitive_substring() {
    let app = create_test_app(test_config());
    let matching =
        create_test_ride(&app, &TestRide::new().route("Central Station", "Airport T2")).await;
    create_test_ride(&app, &TestRide::new().route("Harbor", "Airport T2")).await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/rides/find",
            json!({ "pickup": "central", "destination": "airport" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let rides = body.as_array().unwrap();
    assert_eq!(rides.len(), 1);
    assert_eq!(rides[0]["id"], matching["id"]);
}

#[tokio::test]
async fn test_find_rides_literal_matching() {
    let app = create_test_app(test_config());
    create_test_ride(&app, &TestRide::new().route("Main St", "Airport")).await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/rides/find",
            json!({ "pickup": "M.*", "destination": "" }),
        ))
        .await
        .unwrap();

    let body = parse_response_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_find_rides_empty_body_matches_all() {
    let app = create_test_app(test_config());
    create_test_ride(&app, &TestRide::new()).await;
    create_test_ride(&app, &TestRide::new().route("Harbor", "Museum")).await;

    let response = app
        .oneshot(json_request(Method::POST, "/api/rides/find", json!({})))
        .await
        .unwrap();

    let body = parse_response_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_find_rides_skips_full_rides() {
    let app = create_test_app(test_config());
    let ride = create_test_ride(&app, &TestRide::new().seats(1)).await;
    let ride_id = ride["id"].as_str().unwrap();
    request_to_join(&app, ride_id, "Bob", "bob@example.com").await;

    let response = app
        .clone()
        .oneshot(empty_request(
            Method::PATCH,
            &format!("/api/rides/{}/accept/0", ride_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/rides/find",
            json!({ "pickup": "central", "destination": "airport" }),
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_list_rides_by_creator() {
    let app = create_test_app(test_config());
    create_test_ride(&app, &TestRide::new().creator("111111")).await;
    create_test_ride(&app, &TestRide::new().creator("222222")).await;
    create_test_ride(&app, &TestRide::new().creator("111111")).await;

    let response = app
        .oneshot(empty_request(Method::GET, "/api/rides/my/111111"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let rides = body.as_array().unwrap();
    assert_eq!(rides.len(), 2);
    assert!(rides.iter().all(|r| r["creatorId"] == "111111"));
}

#[tokio::test]
async fn test_list_rides_by_unknown_creator_is_empty() {
    let app = create_test_app(test_config());

    let response = app
        .oneshot(empty_request(Method::GET, "/api/rides/my/999999"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await, json!([]));
}

// ============================================================================
// Get / Delete Tests
// ============================================================================

#[tokio::test]
async fn test_get_ride() {
    let app = create_test_app(test_config());
    let ride = create_test_ride(&app, &TestRide::new()).await;

    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/rides/{}", ride["id"].as_str().unwrap()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await["id"], ride["id"]);
}

#[tokio::test]
async fn test_get_ride_invalid_id_is_not_found() {
    let app = create_test_app(test_config());

    let response = app
        .oneshot(empty_request(Method::GET, "/api/rides/not-a-ride"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Ride not found");
}

#[tokio::test]
async fn test_delete_ride() {
    let app = create_test_app(test_config());
    let ride = create_test_ride(&app, &TestRide::new()).await;
    let uri = format!("/api/rides/{}", ride["id"].as_str().unwrap());

    let response = app
        .clone()
        .oneshot(empty_request(Method::DELETE, &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        parse_response_body(response).await["message"],
        "Ride deleted successfully"
    );

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting again still succeeds
    let response = app
        .oneshot(empty_request(Method::DELETE, &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Join Request Tests
// ============================================================================

#[tokio::test]
async fn test_request_join_success() {
    let app = create_test_app(test_config());
    let ride = create_test_ride(&app, &TestRide::new()).await;
    let ride_id = ride["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/rides/{}/request", ride_id),
            json!({ "name": "Bob", "contact": "bob@example.com", "message": "Two bags" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Join request sent!");
    assert_eq!(body["request"]["status"], "pending");
    assert_eq!(body["request"]["message"], "Two bags");

    let response = app
        .oneshot(empty_request(Method::GET, &format!("/api/rides/{}", ride_id)))
        .await
        .unwrap();
    let ride = parse_response_body(response).await;
    assert_eq!(ride["pendingJoinRequests"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_request_join_missing_contact() {
    let app = create_test_app(test_config());
    let ride = create_test_ride(&app, &TestRide::new()).await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/rides/{}/request", ride["id"].as_str().unwrap()),
            json!({ "name": "Bob" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_join_unknown_ride() {
    let app = create_test_app(test_config());

    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/rides/{}/request", uuid::Uuid::new_v4()),
            json!({ "name": "Bob", "contact": "bob@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        parse_response_body(response).await["message"],
        "Ride not found"
    );
}

#[tokio::test]
async fn test_request_join_unknown_ride_with_blank_body() {
    let app = create_test_app(test_config());

    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/rides/{}/request", uuid::Uuid::new_v4()),
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        parse_response_body(response).await["message"],
        "Ride not found"
    );
}

#[tokio::test]
async fn test_request_join_duplicate_pending() {
    let app = create_test_app(test_config());
    let ride = create_test_ride(&app, &TestRide::new()).await;
    let ride_id = ride["id"].as_str().unwrap();
    request_to_join(&app, ride_id, "Bob", "bob@example.com").await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/rides/{}/request", ride_id),
            json!({ "name": "Bobby", "contact": "bob@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_accept_last_seat_fills_ride() {
    let app = create_test_app(test_config());
    let ride = create_test_ride(&app, &TestRide::new().seats(1)).await;
    let ride_id = ride["id"].as_str().unwrap();
    request_to_join(&app, ride_id, "Bob", "bob@example.com").await;

    let response = app
        .oneshot(empty_request(
            Method::PATCH,
            &format!("/api/rides/{}/accept/0", ride_id),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Join request accepted!");
    assert_eq!(body["ride"]["seatsAvailable"], 0);
    assert_eq!(body["ride"]["isFull"], true);
    assert_eq!(
        body["ride"]["joinedUsers"],
        json!([{ "name": "Bob", "contact": "bob@example.com" }])
    );
    assert_eq!(body["ride"]["pendingJoinRequests"][0]["status"], "accepted");
}

#[tokio::test]
async fn test_accept_twice_is_refused() {
    let app = create_test_app(test_config());
    let ride = create_test_ride(&app, &TestRide::new().seats(2)).await;
    let ride_id = ride["id"].as_str().unwrap();
    request_to_join(&app, ride_id, "Bob", "bob@example.com").await;
    let uri = format!("/api/rides/{}/accept/0", ride_id);

    let response = app
        .clone()
        .oneshot(empty_request(Method::PATCH, &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request(Method::PATCH, &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        parse_response_body(response).await["message"],
        "Join request is already accepted"
    );
}

#[tokio::test]
async fn test_accept_unknown_index() {
    let app = create_test_app(test_config());
    let ride = create_test_ride(&app, &TestRide::new()).await;
    let ride_id = ride["id"].as_str().unwrap();

    for index in ["0", "5", "-1", "first"] {
        let response = app
            .clone()
            .oneshot(empty_request(
                Method::PATCH,
                &format!("/api/rides/{}/accept/{}", ride_id, index),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            parse_response_body(response).await["message"],
            "Request not found"
        );
    }
}

#[tokio::test]
async fn test_reject_keeps_seats() {
    let app = create_test_app(test_config());
    let ride = create_test_ride(&app, &TestRide::new().seats(2)).await;
    let ride_id = ride["id"].as_str().unwrap();
    request_to_join(&app, ride_id, "Bob", "bob@example.com").await;

    let response = app
        .oneshot(empty_request(
            Method::PATCH,
            &format!("/api/rides/{}/reject/0", ride_id),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Join request rejected!");
    assert_eq!(body["ride"]["seatsAvailable"], 2);
    assert_eq!(body["ride"]["joinedUsers"], json!([]));
    assert_eq!(body["ride"]["pendingJoinRequests"][0]["status"], "rejected");
}

#[tokio::test]
async fn test_decide_by_request_id() {
    let app = create_test_app(test_config());
    let ride = create_test_ride(&app, &TestRide::new().seats(3)).await;
    let ride_id = ride["id"].as_str().unwrap();
    let bob = request_to_join(&app, ride_id, "Bob", "bob@example.com").await;
    let carol = request_to_join(&app, ride_id, "Carol", "carol@example.com").await;

    let response = app
        .clone()
        .oneshot(empty_request(
            Method::PATCH,
            &format!(
                "/api/rides/{}/requests/{}/accept",
                ride_id,
                carol["id"].as_str().unwrap()
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["ride"]["seatsAvailable"], 2);
    assert_eq!(body["ride"]["joinedUsers"][0]["name"], "Carol");

    let response = app
        .clone()
        .oneshot(empty_request(
            Method::PATCH,
            &format!(
                "/api/rides/{}/requests/{}/reject",
                ride_id,
                bob["id"].as_str().unwrap()
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request(
            Method::PATCH,
            &format!(
                "/api/rides/{}/requests/{}/accept",
                ride_id,
                uuid::Uuid::new_v4()
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Middleware Tests
// ============================================================================

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let app = create_test_app(test_config());

    let response = app
        .oneshot(empty_request(Method::GET, "/api/rides"))
        .await
        .unwrap();

    assert!(response.headers().get("x-request-id").is_some());
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
}
