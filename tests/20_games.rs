mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_game, register, send_json, test_app};

#[tokio::test]
async fn created_plans_come_back_on_list_owned_by_the_caller() {
    let app = test_app();
    let (user, token) = register(&app, "frances", "frances@example.com").await;

    let created = create_game(&app, &token, "Outer Wilds", "2025-03-01").await;
    assert_eq!(created["user"], user["id"]);
    assert_eq!(created["status"], "Not Started");

    let (status, body) = send_json(&app, "GET", "/api/games", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let plans = body.as_array().unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0]["id"], created["id"]);
    assert_eq!(plans[0]["title"], "Outer Wilds");
}

#[tokio::test]
async fn create_rejects_empty_body_with_per_field_errors() {
    let app = test_app();
    let (_, token) = register(&app, "frances", "frances@example.com").await;

    let (status, body) = send_json(&app, "POST", "/api/games", Some(&token), Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    for field in ["title", "genre", "plannedDate", "duration"] {
        assert_eq!(body["field_errors"][field], "This field is required");
    }
}

#[tokio::test]
async fn list_is_ordered_by_planned_date_ascending() {
    let app = test_app();
    let (_, token) = register(&app, "frances", "frances@example.com").await;

    create_game(&app, &token, "Later", "2025-06-01").await;
    create_game(&app, &token, "Sooner", "2025-03-01").await;

    let (_, body) = send_json(&app, "GET", "/api/games", Some(&token), None).await;
    let plans = body.as_array().unwrap();
    assert_eq!(plans[0]["title"], "Sooner");
    assert_eq!(plans[1]["title"], "Later");
}

#[tokio::test]
async fn foreign_plans_are_invisible_to_update_and_delete() {
    let app = test_app();
    let (_, owner_token) = register(&app, "owner", "owner@example.com").await;
    let (_, stranger_token) = register(&app, "stranger", "stranger@example.com").await;

    let plan = create_game(&app, &owner_token, "Celeste", "2025-03-01").await;
    let uri = format!("/api/games/{}", plan["id"].as_str().unwrap());

    let (status, body) = send_json(
        &app,
        "PUT",
        &uri,
        Some(&stranger_token),
        Some(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Game not found");

    let (status, _) = send_json(&app, "DELETE", &uri, Some(&stranger_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Still there for the owner, untouched.
    let (_, body) = send_json(&app, "GET", "/api/games", Some(&owner_token), None).await;
    assert_eq!(body.as_array().unwrap()[0]["title"], "Celeste");
}

#[tokio::test]
async fn put_rejects_unknown_fields_without_modifying_the_plan() {
    let app = test_app();
    let (_, token) = register(&app, "frances", "frances@example.com").await;
    let plan = create_game(&app, &token, "Celeste", "2025-03-01").await;
    let uri = format!("/api/games/{}", plan["id"].as_str().unwrap());

    let (status, body) = send_json(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "title": "Renamed", "owner": "someone-else" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["owner"], "Unknown field");

    let (_, listed) = send_json(&app, "GET", "/api/games", Some(&token), None).await;
    assert_eq!(listed.as_array().unwrap()[0]["title"], "Celeste");
}

#[tokio::test]
async fn put_applies_allowed_fields_and_bumps_updated_at() {
    let app = test_app();
    let (_, token) = register(&app, "frances", "frances@example.com").await;
    let plan = create_game(&app, &token, "Celeste", "2025-03-01").await;
    let uri = format!("/api/games/{}", plan["id"].as_str().unwrap());

    let (status, body) = send_json(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "status": "Completed", "rating": 5, "notes": "Summited." })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Completed");
    assert_eq!(body["rating"], 5);
    assert_eq!(body["notes"], "Summited.");
    assert_eq!(body["title"], "Celeste");
    assert_ne!(body["updatedAt"], plan["updatedAt"]);
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let app = test_app();
    let (_, token) = register(&app, "frances", "frances@example.com").await;
    let plan = create_game(&app, &token, "Celeste", "2025-03-01").await;
    let uri = format!("/api/games/{}", plan["id"].as_str().unwrap());

    let (status, body) =
        send_json(&app, "PUT", &uri, Some(&token), Some(json!({ "rating": 6 }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["rating"], "Rating must be between 1 and 5");
}

#[tokio::test]
async fn patch_is_restricted_to_progress_fields() {
    let app = test_app();
    let (_, token) = register(&app, "frances", "frances@example.com").await;
    let plan = create_game(&app, &token, "Celeste", "2025-03-01").await;
    let uri = format!("/api/games/{}", plan["id"].as_str().unwrap());

    let (status, body) = send_json(
        &app,
        "PATCH",
        &uri,
        Some(&token),
        Some(json!({ "title": "Renamed" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_UPDATE");
    assert_eq!(body["message"], "Invalid updates");

    let (_, listed) = send_json(&app, "GET", "/api/games", Some(&token), None).await;
    assert_eq!(listed.as_array().unwrap()[0]["title"], "Celeste");
}

#[tokio::test]
async fn patch_works_without_a_token() {
    // The status-patch route has always been served ungated; see DESIGN.md.
    let app = test_app();
    let (_, token) = register(&app, "frances", "frances@example.com").await;
    let plan = create_game(&app, &token, "Celeste", "2025-03-01").await;
    let uri = format!("/api/games/{}", plan["id"].as_str().unwrap());

    let (status, body) = send_json(
        &app,
        "PATCH",
        &uri,
        None,
        Some(json!({ "status": "In Progress", "rating": 4 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "In Progress");
    assert_eq!(body["rating"], 4);
}

#[tokio::test]
async fn delete_removes_the_plan_once() {
    let app = test_app();
    let (_, token) = register(&app, "frances", "frances@example.com").await;
    let plan = create_game(&app, &token, "Celeste", "2025-03-01").await;
    let uri = format!("/api/games/{}", plan["id"].as_str().unwrap());

    let (status, body) = send_json(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Game deleted successfully");

    let (status, body) = send_json(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn recommendations_return_top_five_by_rating_unrated_last() {
    let app = test_app();
    let (_, token) = register(&app, "frances", "frances@example.com").await;

    for (title, rating) in [
        ("Two", Some(2)),
        ("Five", Some(5)),
        ("Unrated", None),
        ("Three", Some(3)),
        ("One", Some(1)),
        ("Four", Some(4)),
    ] {
        let plan = create_game(&app, &token, title, "2025-03-01").await;
        if let Some(rating) = rating {
            let uri = format!("/api/games/{}", plan["id"].as_str().unwrap());
            let (status, _) = send_json(
                &app,
                "PUT",
                &uri,
                Some(&token),
                Some(json!({ "rating": rating })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    let (status, body) =
        send_json(&app, "GET", "/api/games/recommendations", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|plan| plan["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Five", "Four", "Three", "Two", "One"]);
}

#[tokio::test]
async fn recommendations_require_a_token() {
    let app = test_app();

    let (status, body) = send_json(&app, "GET", "/api/games/recommendations", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn trending_aggregates_across_all_users() {
    let app = test_app();
    let (_, alice) = register(&app, "alice", "alice@example.com").await;
    let (_, bob) = register(&app, "bob", "bob@example.com").await;

    for (token, title, rating) in [
        (&alice, "Celeste", Some(5)),
        (&bob, "Celeste", Some(3)),
        (&bob, "Hades", Some(4)),
    ] {
        let plan = create_game(&app, token, title, "2025-03-01").await;
        let uri = format!("/api/games/{}", plan["id"].as_str().unwrap());
        send_json(
            &app,
            "PUT",
            &uri,
            Some(token),
            Some(json!({ "rating": rating })),
        )
        .await;
    }

    // Trending is public.
    let (status, body) = send_json(&app, "GET", "/api/games/trending", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["_id"], "Celeste");
    assert_eq!(rows[0]["count"], 2);
    assert_eq!(rows[0]["avgRating"], 4.0);
    assert_eq!(rows[1]["_id"], "Hades");
    assert_eq!(rows[1]["count"], 1);
    assert_eq!(rows[1]["avgRating"], 4.0);
}

#[tokio::test]
async fn bare_dates_are_accepted_for_planned_date() {
    let app = test_app();
    let (_, token) = register(&app, "frances", "frances@example.com").await;

    let plan = create_game(&app, &token, "Celeste", "2025-03-01").await;

    assert_eq!(plan["plannedDate"], "2025-03-01T00:00:00Z");
}

#[tokio::test]
async fn malformed_planned_date_is_a_validation_error() {
    let app = test_app();
    let (_, token) = register(&app, "frances", "frances@example.com").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/games",
        Some(&token),
        Some(json!({
            "title": "Celeste",
            "genre": "Platformer",
            "plannedDate": "next tuesday",
            "duration": "2 hours"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["plannedDate"], "Invalid date: next tuesday");
}
