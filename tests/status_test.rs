mod common;

use civic_report::config::workflow::TransitionPolicy;
use serde_json::{json, Value};

async fn patch_status(
    app: &common::TestApp,
    token: Option<&str>,
    report_id: &str,
    body: Value,
) -> reqwest::Response {
    let mut req = app
        .client
        .patch(app.url(&format!("/issues/{}/status", report_id)))
        .json(&body);
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    req.send().await.unwrap()
}

#[tokio::test]
async fn resolve_issue_appends_one_update() {
    let app = common::spawn_app().await;
    let token = common::admin_token(&app).await;
    let report_id = common::create_issue(&app, "Pothole", "pothole").await;

    let before = common::get_issue(&app, &report_id).await;
    let before_updates = before["updates"].as_array().unwrap().clone();

    let resp = patch_status(
        &app,
        Some(&token),
        &report_id,
        json!({"status": "resolved", "updateMessage": "Fixed"}),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Issue status updated successfully");
    assert_eq!(body["issue"]["status"], "resolved");

    let after = common::get_issue(&app, &report_id).await;
    assert_eq!(after["status"], "resolved");
    let updates = after["updates"].as_array().unwrap();
    assert_eq!(updates.len(), before_updates.len() + 1);
    assert_eq!(updates.last().unwrap()["message"], "Fixed");
    assert_eq!(&updates[..before_updates.len()], &before_updates[..]);
}

#[tokio::test]
async fn blank_message_gets_default_text() {
    let app = common::spawn_app().await;
    let token = common::admin_token(&app).await;
    let report_id = common::create_issue(&app, "Dark street", "streetlight").await;

    let resp = patch_status(
        &app,
        Some(&token),
        &report_id,
        json!({"status": "in-progress", "updateMessage": "  "}),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let issue = common::get_issue(&app, &report_id).await;
    let updates = issue["updates"].as_array().unwrap();
    assert_eq!(
        updates.last().unwrap()["message"],
        "Status changed to in-progress"
    );
}

#[tokio::test]
async fn history_only_grows() {
    let app = common::spawn_app().await;
    let token = common::admin_token(&app).await;
    let report_id = common::create_issue(&app, "Leak", "water").await;

    for (i, status) in ["reviewed", "assigned", "in-progress", "resolved"]
        .iter()
        .enumerate()
    {
        let resp = patch_status(&app, Some(&token), &report_id, json!({"status": status})).await;
        assert_eq!(resp.status(), 200);

        let issue = common::get_issue(&app, &report_id).await;
        assert_eq!(issue["status"], *status);
        assert_eq!(issue["updates"].as_array().unwrap().len(), i + 2);
    }
    assert_eq!(common::count_rows(&app.db, "issue_updates").await, 5);
}

#[tokio::test]
async fn permissive_policy_allows_going_back() {
    let app = common::spawn_app().await;
    let token = common::admin_token(&app).await;
    let report_id = common::create_issue(&app, "Reopened", "road").await;

    let resp = patch_status(&app, Some(&token), &report_id, json!({"status": "resolved"})).await;
    assert_eq!(resp.status(), 200);
    let resp = patch_status(&app, Some(&token), &report_id, json!({"status": "reviewed"})).await;
    assert_eq!(resp.status(), 200);

    let issue = common::get_issue(&app, &report_id).await;
    assert_eq!(issue["status"], "reviewed");
}

#[tokio::test]
async fn forward_only_policy_rejects_going_back() {
    let app = common::spawn_app_with_policy(TransitionPolicy::ForwardOnly).await;
    let token = common::admin_token(&app).await;
    let report_id = common::create_issue(&app, "Strict", "road").await;

    let resp = patch_status(&app, Some(&token), &report_id, json!({"status": "in-progress"})).await;
    assert_eq!(resp.status(), 200);

    let resp = patch_status(&app, Some(&token), &report_id, json!({"status": "submitted"})).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);

    let issue = common::get_issue(&app, &report_id).await;
    assert_eq!(issue["status"], "in-progress");
    assert_eq!(issue["updates"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn status_change_requires_admin_token() {
    let app = common::spawn_app().await;
    let report_id = common::create_issue(&app, "Unauthorised", "garbage").await;

    let resp = patch_status(&app, None, &report_id, json!({"status": "resolved"})).await;
    assert_eq!(resp.status(), 401);

    let resp = patch_status(
        &app,
        Some("not.a.token"),
        &report_id,
        json!({"status": "resolved"}),
    )
    .await;
    assert_eq!(resp.status(), 401);

    let issue = common::get_issue(&app, &report_id).await;
    assert_eq!(issue["status"], "submitted");
    assert_eq!(issue["updates"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_status_rejected() {
    let app = common::spawn_app().await;
    let token = common::admin_token(&app).await;
    let report_id = common::create_issue(&app, "Typo", "other").await;

    let resp = patch_status(&app, Some(&token), &report_id, json!({"status": "closed"})).await;
    assert_eq!(resp.status(), 400);

    let resp = patch_status(&app, Some(&token), &report_id, json!({})).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "status is required");

    assert_eq!(common::count_rows(&app.db, "issue_updates").await, 1);
}

#[tokio::test]
async fn status_change_on_unknown_issue_is_not_found() {
    let app = common::spawn_app().await;
    let token = common::admin_token(&app).await;

    let resp = patch_status(
        &app,
        Some(&token),
        "CR-9999-000000",
        json!({"status": "resolved"}),
    )
    .await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn mistyped_status_body_gets_json_error() {
    let app = common::spawn_app().await;
    let token = common::admin_token(&app).await;
    let report_id = common::create_issue(&app, "Leaking pipe", "water").await;

    let resp = patch_status(&app, Some(&token), &report_id, json!({"status": 5})).await;

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("status"));
    assert_eq!(common::count_rows(&app.db, "issue_updates").await, 1);
}
