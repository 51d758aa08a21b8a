// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Router tests against the Firestore emulator.
//!
//! These cover the handler paths that need real storage: 201/409 on
//! creation, 404 for callers who never initialized, and the coach gate.
//! Run with: ./scripts/test-with-emulator.sh

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use gym_checkin::error::AppError;
use gym_checkin::models::UserRole;
use gym_checkin::services::identity::{TEST_USER_ID_HEADER, TEST_USER_NAME_HEADER};
use gym_checkin::services::users;
use tower::ServiceExt;

mod common;
use common::{create_emulator_app, json_body, unique_user_id};

fn get(uri: &str, user_id: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(TEST_USER_ID_HEADER, user_id)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, user_id: &str, name: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(TEST_USER_ID_HEADER, user_id)
        .header(TEST_USER_NAME_HEADER, name)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// CHECK-IN CREATION
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_workout_checkin_created() {
    require_emulator!();

    let (app, _) = create_emulator_app().await;
    let id = unique_user_id("http_workout");

    let response = app
        .oneshot(post_json(
            "/api/checkin/workout",
            &id,
            "Jordan",
            r#"{"muscleGroup":"Legs","note":"Squats<script>x()</script>","sharedNote":true}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;

    assert_eq!(body["log"]["type"], "WORKOUT");
    assert_eq!(body["log"]["whopUserId"], id.as_str());
    assert_eq!(body["log"]["muscleGroup"], "Legs");
    assert_eq!(body["log"]["note"], "Squats");
    assert_eq!(body["log"]["sharedNote"], true);
    assert_eq!(body["user"]["id"], id.as_str());
    assert_eq!(body["user"]["name"], "Jordan");
    assert!(body["user"]["avatarUrl"].is_null());
}

#[tokio::test]
async fn test_second_checkin_same_day_is_conflict() {
    require_emulator!();

    let (app, _) = create_emulator_app().await;
    let id = unique_user_id("http_dup");

    let response = app
        .clone()
        .oneshot(post_json("/api/checkin/rest", &id, "Casey", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/logs",
            &id,
            "Casey",
            r#"{"type":"WORKOUT","workoutKind":"Back"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], AppError::ALREADY_CHECKED_IN);

    let response = app
        .oneshot(get("/api/checkins", &id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["checkins"].as_array().unwrap().len(), 1);
    assert_eq!(body["checkins"][0]["type"], "REST");
}

#[tokio::test]
async fn test_logs_rest_with_photo_stays_out_of_feed() {
    require_emulator!();

    let (app, _) = create_emulator_app().await;
    let id = unique_user_id("http_rest_photo");

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/logs",
            &id,
            "Riley",
            r#"{"type":"REST","isPublic":true,"photoId":"photos/rest.jpg"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert!(body["log"]["photoUrl"].is_null());
    assert_eq!(body["log"]["sharedPhoto"], false);

    let response = app
        .oneshot(Request::builder().uri("/api/feed").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let feed = json_body(response).await;
    assert!(!feed
        .as_array()
        .unwrap()
        .iter()
        .any(|entry| entry["whopUserId"] == id.as_str()));
}

// ═══════════════════════════════════════════════════════════════════════════
// UNINITIALIZED CALLERS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_calendar_and_stats_need_initialized_user() {
    require_emulator!();

    let (app, _) = create_emulator_app().await;
    let id = unique_user_id("http_ghost");

    for uri in ["/api/calendar", "/api/stats"] {
        let response = app.clone().oneshot(get(uri, &id)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        let body = json_body(response).await;
        assert_eq!(body["error"], "not_found");
    }

    // After init the same caller gets data.
    let response = app
        .clone()
        .oneshot(get("/api/user/init", &id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["role"], "MEMBER");

    let response = app.oneshot(get("/api/stats", &id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["streak"], 0);
    assert_eq!(body["photoCompliance"]["compliant"], false);
}

// ═══════════════════════════════════════════════════════════════════════════
// COACH GATE
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_coach_routes_forbidden_for_members_and_unknown_callers() {
    require_emulator!();

    let (app, state) = create_emulator_app().await;
    let member = unique_user_id("http_member");
    users::get_or_create_user(&state.db, &member, "Member", UserRole::Member)
        .await
        .unwrap();
    let stranger = unique_user_id("http_stranger");

    for caller in [&member, &stranger] {
        for uri in [
            "/api/coach/dashboard".to_string(),
            format!("/api/coach/member-calendar?userId={member}"),
        ] {
            let response = app.clone().oneshot(get(&uri, caller)).await.unwrap();

            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{caller} {uri}");
            let body = json_body(response).await;
            assert_eq!(body["error"], "forbidden");
        }
    }
}

#[tokio::test]
async fn test_coach_sees_dashboard_and_member_calendar() {
    require_emulator!();

    let (app, state) = create_emulator_app().await;
    let coach = unique_user_id("http_coach");
    let member = unique_user_id("http_trainee");

    users::get_or_create_user(&state.db, &coach, "Coach", UserRole::Member)
        .await
        .unwrap();
    users::set_role(&state.db, &coach, UserRole::Coach)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/checkin/workout",
            &member,
            "Trainee",
            r#"{"muscleGroup":"Chest"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get("/api/coach/dashboard", &coach))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["coach"]["whopUserId"], coach.as_str());
    assert!(body["communityStats"]["activeToday"].as_u64().unwrap() >= 1);
    let summary = body["members"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["whopUserId"] == member.as_str())
        .expect("member should be on the dashboard");
    assert_eq!(summary["hasCheckedInToday"], true);
    assert_eq!(summary["streak"], 1);

    let response = app
        .oneshot(get(
            &format!("/api/coach/member-calendar?userId={member}"),
            &coach,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["muscleGroup"], "Chest");
}
