//! Project API endpoints.

use api_types::project::{
    BudgetFigures, IssueCounts, MaterialUsage, MaterialUsageSummary, ProjectBudgetSummary,
    ProjectNew, ProjectStats, ProjectView, TaskCounts,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{Envelope, Reply, ServerError, ok, optional_number, parse, server::ServerState, views};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProjectNew>,
) -> Result<(StatusCode, Json<Envelope<ProjectView>>), ServerError> {
    let construction_type: engine::ConstructionType = payload.construction_type.parse()?;
    let project = state
        .engine
        .create_project(engine::ProjectInput {
            name: payload.name,
            description: payload.description,
            location_name: payload.location_name,
            status: parse(payload.status.as_deref())?,
            construction_type,
            start_date: payload.start_date,
            end_date: payload.end_date,
            budget_estimate: optional_number(payload.budget_estimate.as_ref(), "budget_estimate")?,
            actual_cost: optional_number(payload.actual_cost.as_ref(), "actual_cost")?,
            currency: payload.currency,
            contractor_name: payload.contractor_name,
            client_name: payload.client_name,
            engineer_in_charge: payload.engineer_in_charge,
            progress_percent: payload.progress_percent,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "project created",
            views::project(project),
        )),
    ))
}

pub async fn budget_summary(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Reply<ProjectBudgetSummary> {
    let summary = state.engine.project_budget_summary(id).await?;
    ok(ProjectBudgetSummary {
        project_id: summary.project_id,
        totals: views::split(summary.totals),
        variance: views::money(summary.variance),
        variance_percentage: summary.variance_percentage,
        category_breakdown: views::splits(summary.category_breakdown),
        total_entries: summary.total_entries,
    })
}

pub async fn stats(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Reply<ProjectStats> {
    let stats = state.engine.project_stats(id).await?;
    ok(ProjectStats {
        project_id: stats.project_id,
        tasks: TaskCounts {
            total: stats.tasks.total,
            completed: stats.tasks.completed,
            in_progress: stats.tasks.in_progress,
            pending: stats.tasks.pending,
            completion_rate: stats.tasks.completion_rate,
        },
        budget: BudgetFigures {
            estimated: stats.budget.estimated.map(views::money),
            budgeted: views::money(stats.budget.budgeted),
            actual: views::money(stats.budget.actual),
            variance: views::money(stats.budget.variance),
            variance_percentage: stats.budget.variance_percentage,
        },
        issues: IssueCounts {
            total: stats.issues.total,
            open: stats.issues.open,
            resolved: stats.issues.resolved,
            in_review: stats.issues.in_review,
        },
    })
}

pub async fn material_usage(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Reply<MaterialUsageSummary> {
    let summary = state.engine.material_usage_summary(id).await?;
    ok(MaterialUsageSummary {
        project_id: summary.project_id,
        materials: summary
            .materials
            .into_iter()
            .map(|usage| MaterialUsage {
                material: views::material(usage.material),
                remaining: usage.remaining,
                usage_percentage: usage.usage_percentage,
                actual_cost: views::money(usage.actual_cost),
            })
            .collect(),
        total_cost: views::money(summary.total_cost),
        total_materials: summary.total_materials,
    })
}
