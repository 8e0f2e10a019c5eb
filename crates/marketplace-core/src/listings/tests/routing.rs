use super::common::*;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use crate::access::Role;
use crate::listings::{ApprovalStatus, PropertyRepository};

#[tokio::test]
async fn submission_requires_credentials() {
    let harness = Harness::new();
    let response = harness
        .router()
        .oneshot(json_request(
            "POST",
            "/api/v1/properties",
            None,
            json!({
                "title": "Unsigned listing",
                "price": 900_000,
                "location": {"governorate": "Giza", "city": "Sheikh Zayed"},
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert!(payload.get("message").is_some());
}

#[tokio::test]
async fn submit_review_and_read_back() {
    let harness = Harness::new();
    let user = harness.account("owner@example.com", Role::User);
    let agent = harness.account("agent@example.com", Role::SalesAgent);
    let leader = harness.account("leader@example.com", Role::SalesTeamLeader);
    let router = harness.router();

    let body = json!({
        "title": "Sea-facing chalet",
        "price": 2_100_000,
        "location": {"governorate": "Matrouh", "city": "Sidi Abdel Rahman"},
        "images": [{"url": "https://cdn.example.com/c.jpg", "publicId": "c"}],
    });
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/properties",
            Some(&harness.bearer(&user)),
            body,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], "property submitted");
    assert_eq!(payload["property"]["approvalStatus"], "PENDING");
    let id = payload["property"]["id"]
        .as_str()
        .expect("id present")
        .to_string();

    let anonymous = router
        .clone()
        .oneshot(empty_request("GET", &format!("/api/v1/properties/{id}"), None))
        .await
        .expect("route executes");
    assert_eq!(anonymous.status(), StatusCode::NOT_FOUND);

    let forbidden = router
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/properties/{id}/approve"),
            Some(&harness.bearer(&agent)),
        ))
        .await
        .expect("route executes");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let approved = router
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/properties/{id}/approve"),
            Some(&harness.bearer(&leader)),
        ))
        .await
        .expect("route executes");
    assert_eq!(approved.status(), StatusCode::OK);

    let again = router
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/properties/{id}/reject"),
            Some(&harness.bearer(&leader)),
        ))
        .await
        .expect("route executes");
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let public = router
        .oneshot(empty_request("GET", &format!("/api/v1/properties/{id}"), None))
        .await
        .expect("route executes");
    assert_eq!(public.status(), StatusCode::OK);
    let view = read_json_body(public).await;
    assert_eq!(view["approvalStatus"], "APPROVED");
    assert!(view.get("approvedById").is_none());
}

#[tokio::test]
async fn reject_without_body_uses_default_reason() {
    let harness = Harness::new();
    let user = harness.account("owner@example.com", Role::User);
    let manager = harness.account("manager@example.com", Role::SalesManager);
    let record = harness
        .marketplace
        .listings()
        .create(&user, draft())
        .expect("create");

    let response = harness
        .router()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/properties/{}/reject", record.id),
            Some(&harness.bearer(&manager)),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["property"]["rejectionReason"], "No reason provided");
    assert_eq!(harness.images.deleted().len(), 2);
}

#[tokio::test]
async fn malformed_reject_body_is_refused() {
    let harness = Harness::new();
    let user = harness.account("owner@example.com", Role::User);
    let manager = harness.account("manager@example.com", Role::SalesManager);
    let record = harness
        .marketplace
        .listings()
        .create(&user, draft())
        .expect("create");

    let response = harness
        .router()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/properties/{}/reject", record.id),
            Some(&harness.bearer(&manager)),
            json!({"reason": 5}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["message"].as_str().is_some_and(|text| !text.is_empty()));
    let stored = harness
        .store
        .fetch_property(&record.id)
        .expect("fetch")
        .expect("listing present");
    assert_eq!(stored.approval_status, ApprovalStatus::Pending);
    assert!(harness.images.deleted().is_empty());
}

#[tokio::test]
async fn unparseable_query_uses_message_body() {
    let harness = Harness::new();
    let response = harness
        .router()
        .oneshot(empty_request("GET", "/api/v1/properties?limit=many", None))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["message"].is_string());
}

#[tokio::test]
async fn public_listing_only_shows_approved() {
    let harness = Harness::new();
    let admin = harness.account("admin@example.com", Role::Admin);
    let agent = harness.account("agent@example.com", Role::SalesAgent);
    let listings = harness.marketplace.listings();
    listings.create(&admin, draft()).expect("approved on create");
    listings.create(&agent, draft()).expect("pending on create");

    let response = harness
        .router()
        .oneshot(empty_request(
            "GET",
            "/api/v1/properties?status=PENDING&limit=5",
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let page = read_json_body(response).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["pages"], 1);
    assert_eq!(page["limit"], 5);
    assert_eq!(page["items"][0]["approvalStatus"], "APPROVED");

    let staff = harness
        .router()
        .oneshot(empty_request(
            "GET",
            "/api/v1/properties?status=PENDING",
            Some(&harness.bearer(&admin)),
        ))
        .await
        .expect("route executes");
    let page = read_json_body(staff).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["approvalStatus"], "PENDING");
}

#[tokio::test]
async fn invalid_paging_and_ids_are_unprocessable() {
    let harness = Harness::new();

    let response = harness
        .router()
        .oneshot(empty_request("GET", "/api/v1/properties?limit=500", None))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "limit");

    let response = harness
        .router()
        .oneshot(empty_request("GET", "/api/v1/properties/not-a-uuid", None))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn stats_and_queue_are_staff_only() {
    let harness = Harness::new();
    let user = harness.account("owner@example.com", Role::User);
    let leader = harness.account("leader@example.com", Role::SalesTeamLeader);
    harness
        .marketplace
        .listings()
        .create(&user, draft())
        .expect("create");

    let denied = harness
        .router()
        .oneshot(empty_request(
            "GET",
            "/api/v1/properties/stats",
            Some(&harness.bearer(&user)),
        ))
        .await
        .expect("route executes");
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let stats = harness
        .router()
        .oneshot(empty_request(
            "GET",
            "/api/v1/properties/stats?fresh=true",
            Some(&harness.bearer(&leader)),
        ))
        .await
        .expect("route executes");
    assert_eq!(stats.status(), StatusCode::OK);
    let body = read_json_body(stats).await;
    assert_eq!(body["pending"], 1);
    assert_eq!(body["total"], 1);

    let queue = harness
        .router()
        .oneshot(empty_request(
            "GET",
            "/api/v1/properties/pending",
            Some(&harness.bearer(&leader)),
        ))
        .await
        .expect("route executes");
    assert_eq!(queue.status(), StatusCode::OK);
    let page = read_json_body(queue).await;
    assert_eq!(page["items"].as_array().map(Vec::len), Some(1));
    assert!(harness.store.property_count() == 1);
}
