mod support;

use axum::http::StatusCode;
use chrono::NaiveDate;
use serde_json::json;

use support::{Fixture, TestApp};

#[tokio::test]
async fn manager_creates_resident_in_assigned_carehome() {
    let fx = Fixture::new().await;
    let res = fx
        .app
        .post(
            "/api/residents/",
            &fx.manager_token(),
            json!({ "name": "  Eleanor Watson ", "date_of_birth": "1938-06-15" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["name"], "Eleanor Watson");
    assert_eq!(res.body["date_of_birth"], "1938-06-15");
    assert_eq!(res.body["care_home"]["id"], fx.home.id.to_string());
    assert_eq!(res.body["care_home"]["name"], "Sunrise Manor");
    assert_eq!(res.body["created_by"], fx.manager.id.to_string());
}

#[tokio::test]
async fn admin_without_carehome_cannot_create_residents() {
    let app = TestApp::new();
    let admin = app.admin("homeless@virtuaid.test", None).await;
    let res = app
        .post(
            "/api/residents/",
            &app.token_for(&admin),
            json!({ "name": "Arthur Green", "date_of_birth": "1941-01-02" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.detail(),
        "Failed to create resident. Creating user does not have a care home assigned."
    );
}

#[tokio::test]
async fn superadmin_names_the_carehome_explicitly() {
    let fx = Fixture::new().await;
    let res = fx
        .app
        .post(
            "/api/residents/",
            &fx.root_token(),
            json!({ "name": "Arthur Green", "date_of_birth": "1941-01-02", "carehome": fx.home.id }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["care_home"]["id"], fx.home.id.to_string());
}

#[tokio::test]
async fn future_birth_dates_are_rejected() {
    let fx = Fixture::new().await;
    let res = fx
        .app
        .post(
            "/api/residents/",
            &fx.admin_token(),
            json!({ "name": "Time Traveller", "date_of_birth": "2999-01-01" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.detail(), "Date of birth must be in the past.");
}

#[tokio::test]
async fn listing_is_scoped_paginated_and_searchable() {
    let fx = Fixture::new().await;
    for name in ["Mary Brown", "Alice Jones", "Bob Marley"] {
        fx.app.resident(&fx.home, name).await;
    }
    let elsewhere = fx.app.carehome("Elsewhere", None).await;
    fx.app.resident(&elsewhere, "Hidden Person").await;

    let res = fx
        .app
        .get("/api/residents/?page_size=2", &fx.manager_token())
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["count"], 3);
    assert_eq!(res.body["previous"], serde_json::Value::Null);
    assert_eq!(res.body["next"], 2);
    let names: Vec<&str> = res.body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice Jones", "Bob Marley"]);

    let res = fx
        .app
        .get("/api/residents/?search=MAR", &fx.manager_token())
        .await;
    assert_eq!(res.body["count"], 2);

    let res = fx.app.get("/api/residents/", &fx.root_token()).await;
    assert_eq!(res.body["count"], 4);
}

#[tokio::test]
async fn page_past_the_end_keeps_the_total() {
    let fx = Fixture::new().await;
    for name in ["Alice Jones", "Bob Marley", "Cara Marsh"] {
        fx.app.resident(&fx.home, name).await;
    }

    let res = fx
        .app
        .get("/api/residents/?page=5&page_size=2", &fx.manager_token())
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["count"], 3);
    assert!(res.body["results"].as_array().unwrap().is_empty());
    assert_eq!(res.body["next"], serde_json::Value::Null);
    assert_eq!(res.body["previous"], 4);
}

#[tokio::test]
async fn residents_outside_scope_are_not_found() {
    let fx = Fixture::new().await;
    let elsewhere = fx.app.carehome("Elsewhere", None).await;
    let hidden = fx.app.resident(&elsewhere, "Hidden Person").await;
    let res = fx
        .app
        .get(&format!("/api/residents/{}/", hidden.id), &fx.admin_token())
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_updates_name_and_birth_date() {
    let fx = Fixture::new().await;
    let resident = fx.app.resident(&fx.home, "Old Name").await;
    let uri = format!("/api/residents/{}/", resident.id);
    let res = fx
        .app
        .patch(
            &uri,
            &fx.manager_token(),
            json!({ "name": "New Name", "date_of_birth": "1950-05-05" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "New Name");
    assert_eq!(res.body["date_of_birth"], "1950-05-05");

    let res = fx
        .app
        .patch(&uri, &fx.manager_token(), json!({ "name": "   " }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_is_blocked_by_feedback_but_cascades_sessions() {
    let fx = Fixture::new().await;
    let kept = fx.app.resident(&fx.home, "Has Feedback").await;
    fx.app
        .feedback(&kept, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
        .await;
    let res = fx
        .app
        .delete(&format!("/api/residents/{}/", kept.id), &fx.admin_token())
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let gone = fx.app.resident(&fx.home, "Only Sessions").await;
    fx.app
        .session(
            &gone,
            chrono::Utc::now(),
            virtuaid_api::domain::sessions::session::SessionStatus::Scheduled,
        )
        .await;
    let res = fx
        .app
        .delete(&format!("/api/residents/{}/", gone.id), &fx.admin_token())
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(fx.app.store.session_ids().is_empty());
}
