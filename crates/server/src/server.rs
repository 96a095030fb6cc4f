use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use std::sync::Arc;

use crate::{budgets, dashboard, projects, quotation, resources, tasks};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/tasks", post(tasks::create))
        .route("/tasks/{id}", axum::routing::delete(tasks::delete))
        .route("/tasks/{id}/cost", get(tasks::cost))
        .route("/tasks/{id}/budget", get(tasks::budget))
        .route("/tasks/{id}/resources", get(tasks::resources))
        .route("/tasks/{id}/labor-cost", get(tasks::labor_cost))
        .route("/projects", post(projects::create))
        .route("/projects/{id}/budget-summary", get(projects::budget_summary))
        .route("/projects/{id}/stats", get(projects::stats))
        .route("/projects/{id}/materials/usage", get(projects::material_usage))
        .route("/projects/{id}/quotation", get(quotation::get))
        .route("/dashboard", get(dashboard::stats))
        .route("/dashboard/projects-by-date", get(dashboard::projects_by_date))
        .route("/dashboard/tasks-by-date", get(dashboard::tasks_by_date))
        .route("/budgets", post(budgets::create))
        .route(
            "/budgets/{id}",
            patch(budgets::update).delete(budgets::delete),
        )
        .route("/materials", post(resources::material_new))
        .route("/materials/{id}", patch(resources::material_update))
        .route("/materials/{id}/usage", patch(resources::material_usage))
        .route("/equipment", post(resources::equipment_new))
        .route("/equipment/{id}", patch(resources::equipment_update))
        .route("/equipment/{id}/assign", post(resources::equipment_assign))
        .route("/equipment/{id}/release", post(resources::equipment_release))
        .route("/labor", post(resources::labor_new))
        .route("/labor/{id}", patch(resources::labor_update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
