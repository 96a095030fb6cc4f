use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, ActiveValue, Database};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use engine::{Engine, admins};
use server::{ServerState, router};

async fn app() -> (Router, Uuid) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let admin_id = Uuid::new_v4();
    admins::ActiveModel {
        id: ActiveValue::Set(admin_id),
        name: ActiveValue::Set("Amina".to_string()),
        email: ActiveValue::Set("amina@site.test".to_string()),
        role: ActiveValue::Set("engineer".to_string()),
        phone: ActiveValue::Set(None),
        is_active: ActiveValue::Set(true),
        last_login: ActiveValue::Set(None),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(&db)
    .await
    .unwrap();

    let engine = Engine::builder().database(db).build().await.unwrap();
    let state = ServerState {
        engine: Arc::new(engine),
    };
    (router(state), admin_id)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn seed_task(app: &Router, admin_id: Uuid) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/projects",
        Some(json!({
            "name": "Riverside Flats",
            "construction_type": "building",
            "start_date": "2026-03-01",
            "budget_estimate": "50000",
            "engineer_in_charge": admin_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let project_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["currency"], "KES");

    let (status, body) = send(
        app,
        "POST",
        "/tasks",
        Some(json!({
            "project_id": project_id,
            "name": "Foundation",
            "start_date": "2026-03-01",
            "due_date": "2099-04-01",
            "assigned_to_admin": admin_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let task_id = body["data"]["id"].as_str().unwrap().to_string();
    (project_id, task_id)
}

#[tokio::test]
async fn task_cost_rolls_up_resources_and_budgets() {
    let (app, admin_id) = app().await;
    let (_, task_id) = seed_task(&app, admin_id).await;

    let (status, body) = send(
        &app,
        "POST",
        "/materials",
        Some(json!({
            "task_id": task_id,
            "name": "Cement",
            "unit": "bag",
            "unit_cost": "10",
            "quantity_required": 5,
            "quantity_used": 5,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, _) = send(
        &app,
        "POST",
        "/labor",
        Some(json!({
            "task_id": task_id,
            "worker_name": "Otieno",
            "worker_type": "skilled_worker",
            "hourly_rate": 20,
            "hours_worked": "8",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/budgets",
        Some(json!({
            "task_id": task_id,
            "category": "Materials",
            "budget_type": "budgeted",
            "amount": 500,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, "GET", &format!("/tasks/{task_id}/cost"), None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["materials"]["cost"], 50.0);
    assert_eq!(data["labor"]["actual_cost"], 160.0);
    assert_eq!(data["budget"]["budgeted"], 500.0);
    assert_eq!(data["total"]["estimated"], 550.0);
    assert_eq!(data["total"]["actual"], 210.0);
    assert_eq!(data["total"]["variance"], -340.0);
}

#[tokio::test]
async fn unknown_task_is_a_404_envelope() {
    let (app, _) = app().await;
    let (status, body) = send(
        &app,
        "GET",
        &format!("/tasks/{}/cost", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "task not found");
}

#[tokio::test]
async fn invalid_enum_values_are_422() {
    let (app, admin_id) = app().await;
    let (_, task_id) = seed_task(&app, admin_id).await;

    let (status, body) = send(
        &app,
        "POST",
        "/budgets",
        Some(json!({
            "task_id": task_id,
            "category": "Materials",
            "budget_type": "forecast",
            "amount": 10,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn non_numeric_text_is_400() {
    let (app, admin_id) = app().await;
    let (_, task_id) = seed_task(&app, admin_id).await;

    let (status, body) = send(
        &app,
        "POST",
        "/materials",
        Some(json!({
            "task_id": task_id,
            "name": "Sand",
            "unit": "t",
            "unit_cost": "cheap",
            "quantity_required": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "unit_cost must be a number");
}

#[tokio::test]
async fn dashboard_renders_counts_as_strings() {
    let (app, admin_id) = app().await;
    seed_task(&app, admin_id).await;

    let (status, body) = send(&app, "GET", "/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["overview"]["total_projects"], "1");
    assert_eq!(data["projects_by_status"]["planning"], "1");
    assert_eq!(data["projects_by_status"]["cancelled"], "0");
    assert_eq!(data["equipment"]["by_availability"]["true"], "0");
    assert_eq!(data["budget"]["utilization_percent"], "0.00");
    assert_eq!(data["performance"]["task_completion_rate"], "0.00");

    let (status, _) = send(
        &app,
        "GET",
        "/dashboard?startDate=2026-05-01&endDate=2026-04-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn timelines_validate_grouping() {
    let (app, admin_id) = app().await;
    seed_task(&app, admin_id).await;

    let (status, body) = send(
        &app,
        "GET",
        "/dashboard/projects-by-date?startDate=2026-01-01&endDate=2026-12-31&groupBy=month",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["points"][0]["date"], "2026-03");

    let (status, body) = send(
        &app,
        "GET",
        "/dashboard/projects-by-date?startDate=2026-01-01&endDate=2026-12-31&groupBy=year",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["message"],
        "Validation failed: groupBy must be one of: day, week, month"
    );
}

#[tokio::test]
async fn quotation_hides_the_actual_side() {
    let (app, admin_id) = app().await;
    let (project_id, task_id) = seed_task(&app, admin_id).await;

    for (budget_type, amount) in [("budgeted", 1000), ("actual", 1200)] {
        let (status, _) = send(
            &app,
            "POST",
            "/budgets",
            Some(json!({
                "task_id": task_id,
                "category": "Materials",
                "budget_type": budget_type,
                "amount": amount,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/projects/{project_id}/quotation?quotationType=budgeted"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["quotation_type"], "budgeted");
    assert_eq!(data["engineer"]["name"], "Amina");
    assert_eq!(data["summary"]["total_budgeted"], 1000.0);
    assert_eq!(data["summary"]["total_actual"], 0.0);
    assert_eq!(data["tasks"][0]["lines"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_a_task_reports_the_cascade() {
    let (app, admin_id) = app().await;
    let (_, task_id) = seed_task(&app, admin_id).await;

    let (status, body) = send(
        &app,
        "POST",
        "/equipment",
        Some(json!({"name": "Mixer", "type": "concrete", "rental_cost_per_day": "80"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let equipment_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/equipment/{equipment_id}/assign"),
        Some(json!({"task_id": task_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["availability"], false);

    let (status, body) = send(&app, "DELETE", &format!("/tasks/{task_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["released_equipment"], 1);

    let (status, _) = send(&app, "GET", &format!("/tasks/{task_id}/budget"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
