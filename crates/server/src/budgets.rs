//! Budget entry API endpoints.

use api_types::budget::{BudgetCreated, BudgetNew, BudgetUpdate, BudgetView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{BudgetType, EntryType};
use uuid::Uuid;

use crate::{
    Envelope, Reply, ServerError, ok, ok_with, optional_number, parse, server::ServerState, views,
};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<Envelope<BudgetCreated>>), ServerError> {
    let budget_type: BudgetType = payload.budget_type.parse()?;
    let entry_type: EntryType =
        parse(payload.entry_type.as_deref())?.unwrap_or(EntryType::Manual);

    let created = state
        .engine
        .create_budget_entry(engine::BudgetEntryInput {
            task_id: payload.task_id,
            category: payload.category,
            budget_type,
            date: payload.date,
            entry_type,
            quantity: optional_number(payload.quantity.as_ref(), "quantity")?,
            amount: optional_number(payload.amount.as_ref(), "amount")?,
            material_id: payload.material_id,
            equipment_id: payload.equipment_id,
            labor_id: payload.labor_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "budget entry created",
            BudgetCreated {
                budget: views::budget(created.entry),
                resource_details: created.resource.map(views::resource),
            },
        )),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BudgetUpdate>,
) -> Reply<BudgetView> {
    let entry = state
        .engine
        .update_budget_entry(
            id,
            engine::BudgetEntryPatch {
                task_id: payload.task_id,
                category: payload.category,
                amount: optional_number(payload.amount.as_ref(), "amount")?,
                budget_type: parse(payload.budget_type.as_deref())?,
                date: payload.date,
            },
        )
        .await?;
    ok(views::budget(entry))
}

pub async fn delete(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Reply<()> {
    state.engine.delete_budget_entry(id).await?;
    ok_with("budget entry deleted", ())
}
