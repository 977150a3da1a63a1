mod common;

use common::{send, spawn_server};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn buy_milk_lifecycle() {
    let server = spawn_server().await;
    let token = server.register("ada@example.com").await;

    let created = server
        .create_task(&token, json!({ "title": "Buy milk" }))
        .await;
    assert_eq!(created["status"], "pending");
    assert_eq!(created["priority"], "medium");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        server
            .put(&format!("/api/tasks/{id}"), &token)
            .json(&json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["task"]["status"], "completed");
    assert_eq!(body["task"]["title"], "Buy milk");
    assert_eq!(body["task"]["priority"], "medium");
    assert_eq!(body["task"]["createdAt"], created["createdAt"]);
    assert_ne!(body["task"]["updatedAt"], created["updatedAt"]);

    let (_, completed) = send(server.get("/api/tasks?status=completed", &token)).await;
    assert_eq!(completed["count"], 1);
    assert_eq!(completed["tasks"][0]["id"], id.as_str());

    let (_, pending) = send(server.get("/api/tasks?status=pending", &token)).await;
    assert_eq!(pending["count"], 0);
    assert_eq!(pending["tasks"], json!([]));
}

#[tokio::test]
async fn create_validates_title_and_fields() {
    let server = spawn_server().await;
    let token = server.register("ada@example.com").await;

    for body in [json!({}), json!({ "title": "   " })] {
        let (status, body) = send(server.post("/api/tasks", &token).json(&body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "success": false, "message": "Please provide a task title" })
        );
    }

    let (status, body) = send(
        server
            .post("/api/tasks", &token)
            .json(&json!({ "title": "x", "priority": "urgent" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Invalid request body" })
    );

    let (status, body) = send(
        server
            .post("/api/tasks", &token)
            .header("content-type", "application/json")
            .body("{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Malformed JSON body");
}

#[tokio::test]
async fn create_accepts_full_body_and_date_formats() {
    let server = spawn_server().await;
    let token = server.register("ada@example.com").await;

    let task = server
        .create_task(
            &token,
            json!({
                "title": "Dentist",
                "description": "bring forms",
                "priority": "high",
                "dueDate": "2025-03-09T10:30:00.000Z"
            }),
        )
        .await;
    assert_eq!(task["description"], "bring forms");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["dueDate"], "2025-03-09");
}

#[tokio::test]
async fn task_routes_require_a_valid_token() {
    let server = spawn_server().await;

    let (status, body) = send(server.http.get(server.url("/api/tasks"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Not authorized, no token" })
    );

    let (status, body) = send(server.get("/api/tasks", "forged-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, token failed");
}

#[tokio::test]
async fn other_users_are_forbidden() {
    let server = spawn_server().await;
    let ada = server.register("ada@example.com").await;
    let bob = server.register("bob@example.com").await;

    let task = server.create_task(&ada, json!({ "title": "Private" })).await;
    let path = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    let (status, body) = send(server.get(&path, &bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to access this task");

    let (status, body) = send(server.put(&path, &bob).json(&json!({ "title": "Mine" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to update this task");

    let (status, body) = send(server.delete(&path, &bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to delete this task");

    let (_, bobs_list) = send(server.get("/api/tasks", &bob)).await;
    assert_eq!(bobs_list["count"], 0);

    let (status, body) = send(server.get(&path, &ada)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["title"], "Private");
}

#[tokio::test]
async fn update_checks_ownership_before_field_values() {
    let server = spawn_server().await;
    let ada = server.register("ada@example.com").await;
    let bob = server.register("bob@example.com").await;
    let task = server.create_task(&ada, json!({ "title": "Private" })).await;
    let path = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    let (status, body) = send(server.put(&path, &bob).json(&json!({ "status": "done" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to update this task");

    let (status, body) = send(
        server
            .put("/api/tasks/7d1c3b52-5f7e-4c2a-9a55-0f4d1f7d2c11", &ada)
            .json(&json!({ "priority": "urgent" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");

    let (status, body) = send(server.put(&path, &ada).json(&json!({ "status": "done" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Invalid request body" })
    );

    let (_, unchanged) = send(server.get(&path, &ada)).await;
    assert_eq!(unchanged["task"], task);
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let server = spawn_server().await;
    let token = server.register("ada@example.com").await;

    for path in [
        "/api/tasks/7d1c3b52-5f7e-4c2a-9a55-0f4d1f7d2c11",
        "/api/tasks/not-a-uuid",
    ] {
        let (status, body) = send(server.get(path, &token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Task not found");
    }
}

#[tokio::test]
async fn delete_twice_is_not_found() {
    let server = spawn_server().await;
    let token = server.register("ada@example.com").await;
    let task = server.create_task(&token, json!({ "title": "Once" })).await;
    let path = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    let (status, body) = send(server.delete(&path, &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "message": "Task deleted successfully" })
    );

    let (status, _) = send(server.delete(&path, &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_ignores_identity_fields_and_clears_with_null() {
    let server = spawn_server().await;
    let token = server.register("ada@example.com").await;
    let task = server
        .create_task(
            &token,
            json!({ "title": "Report", "description": "draft", "dueDate": "2025-01-31" }),
        )
        .await;
    let path = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    let (status, body) = send(server.put(&path, &token).json(&json!({
        "id": "00000000-0000-4000-8000-000000000000",
        "owner": "00000000-0000-4000-8000-000000000000",
        "createdAt": "1999-01-01T00:00:00Z",
        "description": null,
        "dueDate": null
    })))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["id"], task["id"]);
    assert_eq!(body["task"]["owner"], task["owner"]);
    assert_eq!(body["task"]["createdAt"], task["createdAt"]);
    assert_eq!(body["task"]["description"], serde_json::Value::Null);
    assert_eq!(body["task"]["dueDate"], serde_json::Value::Null);

    let (status, body) = send(server.put(&path, &token).json(&json!({ "title": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide a task title");
}

#[tokio::test]
async fn list_filters_combine_and_search_is_literal() {
    let server = spawn_server().await;
    let token = server.register("ada@example.com").await;

    server
        .create_task(&token, json!({ "title": "Buy milk", "priority": "high" }))
        .await;
    server
        .create_task(
            &token,
            json!({ "title": "Pay rent", "description": "Ask the LANDLORD" }),
        )
        .await;
    server
        .create_task(&token, json!({ "title": "Fix (urgent) bug", "priority": "high" }))
        .await;

    let (_, all) = send(server.get("/api/tasks", &token)).await;
    assert_eq!(all["count"], 3);
    assert_eq!(all["tasks"][0]["title"], "Fix (urgent) bug");
    assert_eq!(all["tasks"][2]["title"], "Buy milk");

    let (_, high) = send(server.get("/api/tasks?priority=high&search=MILK", &token)).await;
    assert_eq!(high["count"], 1);
    assert_eq!(high["tasks"][0]["title"], "Buy milk");

    let (_, landlord) = send(server.get("/api/tasks?search=landlord", &token)).await;
    assert_eq!(landlord["tasks"][0]["title"], "Pay rent");

    let (_, parens) = send(server.get("/api/tasks?search=%28urgent%29", &token)).await;
    assert_eq!(parens["count"], 1);

    let (_, wildcard) = send(server.get("/api/tasks?search=.*", &token)).await;
    assert_eq!(wildcard["count"], 0);

    let (_, empty) = send(server.get("/api/tasks?status=&search=", &token)).await;
    assert_eq!(empty["count"], 3);

    let (status, body) = send(server.get("/api/tasks?status=done", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_routes_and_health() {
    let server = spawn_server().await;

    let (status, body) = send(server.http.get(server.url("/api/nope"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "message": "Route not found" }));

    let (status, body) = send(server.http.get(server.url("/api/health"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], taskflow_core::core_version());
}
