//! Material, equipment and labor API endpoints.

use api_types::resource::{
    EquipmentAssign, EquipmentNew, EquipmentUpdate, EquipmentView, LaborNew, LaborUpdate,
    LaborView, MaterialNew, MaterialUpdate, MaterialUsageUpdate, MaterialView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::WorkerType;
use uuid::Uuid;

use crate::{
    Envelope, Reply, ServerError, number, ok, optional_number, parse, server::ServerState, views,
};

type Created<T> = Result<(StatusCode, Json<Envelope<T>>), ServerError>;

fn created<T>(message: &str, data: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(Envelope::with_message(message, data))))
}

pub async fn material_new(
    State(state): State<ServerState>,
    Json(payload): Json<MaterialNew>,
) -> Created<MaterialView> {
    let material = state
        .engine
        .create_material(engine::MaterialInput {
            task_id: payload.task_id,
            name: payload.name,
            unit: payload.unit,
            unit_cost: number(&payload.unit_cost, "unit_cost")?,
            quantity_required: number(&payload.quantity_required, "quantity_required")?,
            quantity_used: optional_number(payload.quantity_used.as_ref(), "quantity_used")?,
        })
        .await?;
    created("material created", views::material(material))
}

pub async fn material_update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MaterialUpdate>,
) -> Reply<MaterialView> {
    let material = state
        .engine
        .update_material(
            id,
            engine::MaterialPatch {
                name: payload.name,
                unit: payload.unit,
                unit_cost: optional_number(payload.unit_cost.as_ref(), "unit_cost")?,
                quantity_required: optional_number(
                    payload.quantity_required.as_ref(),
                    "quantity_required",
                )?,
            },
        )
        .await?;
    ok(views::material(material))
}

pub async fn material_usage(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MaterialUsageUpdate>,
) -> Reply<MaterialView> {
    let quantity_used = number(&payload.quantity_used, "quantity_used")?;
    let material = state
        .engine
        .update_material_usage(id, quantity_used)
        .await?;
    ok(views::material(material))
}

pub async fn equipment_new(
    State(state): State<ServerState>,
    Json(payload): Json<EquipmentNew>,
) -> Created<EquipmentView> {
    let equipment = state
        .engine
        .create_equipment(engine::EquipmentInput {
            name: payload.name,
            equipment_type: payload.equipment_type,
            rental_cost_per_day: optional_number(
                payload.rental_cost_per_day.as_ref(),
                "rental_cost_per_day",
            )?,
        })
        .await?;
    created("equipment created", views::equipment(equipment))
}

pub async fn equipment_update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EquipmentUpdate>,
) -> Reply<EquipmentView> {
    let equipment = state
        .engine
        .update_equipment(
            id,
            engine::EquipmentPatch {
                name: payload.name,
                equipment_type: payload.equipment_type,
                rental_cost_per_day: optional_number(
                    payload.rental_cost_per_day.as_ref(),
                    "rental_cost_per_day",
                )?,
                days_used: optional_number(payload.days_used.as_ref(), "days_used")?,
            },
        )
        .await?;
    ok(views::equipment(equipment))
}

pub async fn equipment_assign(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EquipmentAssign>,
) -> Reply<EquipmentView> {
    let equipment = state.engine.assign_equipment(id, payload.task_id).await?;
    ok(views::equipment(equipment))
}

pub async fn equipment_release(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Reply<EquipmentView> {
    let equipment = state.engine.release_equipment(id).await?;
    ok(views::equipment(equipment))
}

pub async fn labor_new(
    State(state): State<ServerState>,
    Json(payload): Json<LaborNew>,
) -> Created<LaborView> {
    let worker_type: WorkerType = payload.worker_type.parse()?;
    let labor = state
        .engine
        .create_labor(engine::LaborInput {
            task_id: payload.task_id,
            worker_name: payload.worker_name,
            worker_type,
            hourly_rate: number(&payload.hourly_rate, "hourly_rate")?,
            hours_worked: optional_number(payload.hours_worked.as_ref(), "hours_worked")?,
            start_date: payload.start_date,
            end_date: payload.end_date,
            status: parse(payload.status.as_deref())?,
            phone: payload.phone,
            is_requirement: payload.is_requirement,
            required_quantity: payload.required_quantity,
        })
        .await?;
    created("labor created", views::labor(labor))
}

pub async fn labor_update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LaborUpdate>,
) -> Reply<LaborView> {
    let labor = state
        .engine
        .update_labor(
            id,
            engine::LaborPatch {
                worker_name: payload.worker_name,
                worker_type: parse(payload.worker_type.as_deref())?,
                hourly_rate: optional_number(payload.hourly_rate.as_ref(), "hourly_rate")?,
                hours_worked: optional_number(payload.hours_worked.as_ref(), "hours_worked")?,
                end_date: payload.end_date,
                status: parse(payload.status.as_deref())?,
                phone: payload.phone,
                required_quantity: payload.required_quantity,
            },
        )
        .await?;
    ok(views::labor(labor))
}
