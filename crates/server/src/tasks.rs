//! Task API endpoints: creation, cascading delete and the per-task rollups.

use api_types::task::{
    AvailableResources, CostTotals, Estimated, LaborCost, LaborCostSummary, ResourceCost,
    TaskBudget, TaskCost, TaskDeleted, TaskNew, TaskView, WorkerTypeCost,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{Envelope, Reply, ServerError, ok, ok_with, parse, server::ServerState, views};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TaskNew>,
) -> Result<(StatusCode, Json<Envelope<TaskView>>), ServerError> {
    let task = state
        .engine
        .create_task(engine::TaskInput {
            project_id: payload.project_id,
            name: payload.name,
            description: payload.description,
            start_date: payload.start_date,
            due_date: payload.due_date,
            status: parse(payload.status.as_deref())?,
            progress_percent: payload.progress_percent,
            assigned_to_admin: payload.assigned_to_admin,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message("task created", views::task(task))),
    ))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Reply<TaskDeleted> {
    let deleted = state.engine.delete_task_cascade(id).await?;
    ok_with(
        "task and related records deleted",
        TaskDeleted {
            task_id: deleted.task_id,
            budgets: deleted.budgets,
            labor: deleted.labor,
            materials: deleted.materials,
            progress_updates: deleted.progress_updates,
            released_equipment: deleted.released_equipment,
        },
    )
}

pub async fn cost(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Reply<TaskCost> {
    let summary = state.engine.task_cost(id).await?;
    ok(TaskCost {
        task_id: summary.task_id,
        materials: ResourceCost {
            cost: views::money(summary.materials.cost),
            count: summary.materials.count,
        },
        equipment: ResourceCost {
            cost: views::money(summary.equipment.cost),
            count: summary.equipment.count,
        },
        labor: LaborCost {
            actual_cost: views::money(summary.labor.actual_cost),
            required_cost: views::money(summary.labor.required_cost),
            actual_workers: summary.labor.actual_workers,
            required_workers: summary.labor.required_workers,
        },
        budget: views::split(summary.budget),
        total: CostTotals {
            estimated: views::money(summary.total.estimated),
            actual: views::money(summary.total.actual),
            variance: views::money(summary.total.variance),
        },
    })
}

pub async fn budget(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Reply<TaskBudget> {
    let summary = state.engine.task_budget_summary(id).await?;
    ok(TaskBudget {
        task_id: summary.task_id,
        totals: views::split(summary.totals),
        by_category: views::splits(summary.by_category),
        entries: views::lines(summary.entries),
    })
}

pub async fn resources(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Reply<AvailableResources> {
    let available = state.engine.available_resources(id).await?;
    ok(AvailableResources {
        task_id: available.task_id,
        materials: available
            .materials
            .into_iter()
            .map(|r| Estimated {
                item: views::material(r.item),
                estimated_cost: views::money(r.estimated_cost),
            })
            .collect(),
        equipment: available
            .equipment
            .into_iter()
            .map(|r| Estimated {
                item: views::equipment(r.item),
                estimated_cost: views::money(r.estimated_cost),
            })
            .collect(),
        labor: available
            .labor
            .into_iter()
            .map(|r| Estimated {
                item: views::labor(r.item),
                estimated_cost: views::money(r.estimated_cost),
            })
            .collect(),
    })
}

pub async fn labor_cost(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Reply<LaborCostSummary> {
    let summary = state.engine.labor_cost_summary(id).await?;
    ok(LaborCostSummary {
        task_id: summary.task_id,
        total_workers: summary.total_workers,
        total_cost: views::money(summary.total_cost),
        total_hours: summary.total_hours,
        average_hourly_rate: views::money(summary.average_hourly_rate),
        by_worker_type: summary
            .by_worker_type
            .into_iter()
            .map(|group| WorkerTypeCost {
                worker_type: group.worker_type.to_string(),
                workers: group.workers,
                hours: group.hours,
                cost: views::money(group.cost),
            })
            .collect(),
    })
}
