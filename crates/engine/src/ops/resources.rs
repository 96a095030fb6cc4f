use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, LaborStatus, ResultEngine, WorkerType, equipment, labor, materials,
    util::{optional_text, required_text, validate_non_negative},
};

use super::{Engine, with_tx};

#[derive(Clone, Debug)]
pub struct MaterialInput {
    pub task_id: Uuid,
    pub name: String,
    pub unit: String,
    pub unit_cost: f64,
    pub quantity_required: f64,
    /// Defaults to `0`. Not bounded by the requirement at creation.
    pub quantity_used: Option<f64>,
}

/// Partial update of a material. Budget entries created from the material
/// keep the amounts they were created with.
#[derive(Clone, Debug, Default)]
pub struct MaterialPatch {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub unit_cost: Option<f64>,
    pub quantity_required: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct EquipmentInput {
    pub name: String,
    pub equipment_type: String,
    pub rental_cost_per_day: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct EquipmentPatch {
    pub name: Option<String>,
    pub equipment_type: Option<String>,
    pub rental_cost_per_day: Option<f64>,
    pub days_used: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct LaborInput {
    pub task_id: Uuid,
    pub worker_name: String,
    pub worker_type: WorkerType,
    pub hourly_rate: f64,
    /// Defaults to `0`.
    pub hours_worked: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<LaborStatus>,
    pub phone: Option<String>,
    pub is_requirement: bool,
    pub required_quantity: Option<i32>,
}

#[derive(Clone, Debug, Default)]
pub struct LaborPatch {
    pub worker_name: Option<String>,
    pub worker_type: Option<WorkerType>,
    pub hourly_rate: Option<f64>,
    pub hours_worked: Option<f64>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<LaborStatus>,
    pub phone: Option<String>,
    pub required_quantity: Option<i32>,
}

fn validate_headcount(value: Option<i32>) -> ResultEngine<Option<i32>> {
    if let Some(quantity) = value
        && quantity < 1
    {
        return Err(EngineError::Validation(
            "required_quantity must be >= 1".to_string(),
        ));
    }
    Ok(value)
}

impl Engine {
    pub async fn create_material(&self, input: MaterialInput) -> ResultEngine<materials::Model> {
        with_tx!(self, |db_tx| {
            self.require_task(&db_tx, input.task_id).await?;
            let model = materials::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                task_id: ActiveValue::Set(input.task_id),
                name: ActiveValue::Set(required_text(&input.name, "material name")?),
                unit: ActiveValue::Set(required_text(&input.unit, "unit")?),
                unit_cost: ActiveValue::Set(validate_non_negative(input.unit_cost, "unit_cost")?),
                quantity_required: ActiveValue::Set(validate_non_negative(
                    input.quantity_required,
                    "quantity_required",
                )?),
                quantity_used: ActiveValue::Set(validate_non_negative(
                    input.quantity_used.unwrap_or(0.0),
                    "quantity_used",
                )?),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(model)
        })
    }

    pub async fn update_material(
        &self,
        id: Uuid,
        patch: MaterialPatch,
    ) -> ResultEngine<materials::Model> {
        with_tx!(self, |db_tx| {
            let mut active: materials::ActiveModel =
                self.require_material(&db_tx, id).await?.into();
            if let Some(name) = patch.name {
                active.name = ActiveValue::Set(required_text(&name, "material name")?);
            }
            if let Some(unit) = patch.unit {
                active.unit = ActiveValue::Set(required_text(&unit, "unit")?);
            }
            if let Some(unit_cost) = patch.unit_cost {
                active.unit_cost = ActiveValue::Set(validate_non_negative(unit_cost, "unit_cost")?);
            }
            if let Some(required) = patch.quantity_required {
                active.quantity_required =
                    ActiveValue::Set(validate_non_negative(required, "quantity_required")?);
            }
            let model = active.update(&db_tx).await?;
            Ok(model)
        })
    }

    /// Records how much of a material has been used.
    ///
    /// The used quantity must stay within `0..=quantity_required`.
    pub async fn update_material_usage(
        &self,
        id: Uuid,
        quantity_used: f64,
    ) -> ResultEngine<materials::Model> {
        with_tx!(self, |db_tx| {
            let material = self.require_material(&db_tx, id).await?;
            if !quantity_used.is_finite()
                || quantity_used < 0.0
                || quantity_used > material.quantity_required
            {
                return Err(EngineError::Validation(format!(
                    "quantity_used must be between 0 and {}",
                    material.quantity_required
                )));
            }
            let mut active: materials::ActiveModel = material.into();
            active.quantity_used = ActiveValue::Set(quantity_used);
            let model = active.update(&db_tx).await?;
            Ok(model)
        })
    }

    pub async fn create_equipment(&self, input: EquipmentInput) -> ResultEngine<equipment::Model> {
        let rental_cost_per_day = input
            .rental_cost_per_day
            .map(|rate| validate_non_negative(rate, "rental_cost_per_day"))
            .transpose()?;
        let model = equipment::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(required_text(&input.name, "equipment name")?),
            equipment_type: ActiveValue::Set(required_text(&input.equipment_type, "type")?),
            availability: ActiveValue::Set(true),
            rental_cost_per_day: ActiveValue::Set(rental_cost_per_day),
            assigned_task_id: ActiveValue::Set(None),
            days_used: ActiveValue::Set(0.0),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await?;
        Ok(model)
    }

    pub async fn update_equipment(
        &self,
        id: Uuid,
        patch: EquipmentPatch,
    ) -> ResultEngine<equipment::Model> {
        with_tx!(self, |db_tx| {
            let mut active: equipment::ActiveModel =
                self.require_equipment(&db_tx, id).await?.into();
            if let Some(name) = patch.name {
                active.name = ActiveValue::Set(required_text(&name, "equipment name")?);
            }
            if let Some(equipment_type) = patch.equipment_type {
                active.equipment_type = ActiveValue::Set(required_text(&equipment_type, "type")?);
            }
            if let Some(rate) = patch.rental_cost_per_day {
                active.rental_cost_per_day =
                    ActiveValue::Set(Some(validate_non_negative(rate, "rental_cost_per_day")?));
            }
            if let Some(days) = patch.days_used {
                active.days_used = ActiveValue::Set(validate_non_negative(days, "days_used")?);
            }
            let model = active.update(&db_tx).await?;
            Ok(model)
        })
    }

    /// Binds available equipment to a task, making it unavailable.
    pub async fn assign_equipment(
        &self,
        id: Uuid,
        task_id: Uuid,
    ) -> ResultEngine<equipment::Model> {
        with_tx!(self, |db_tx| {
            let item = self.require_equipment(&db_tx, id).await?;
            if !item.availability {
                return Err(EngineError::Validation(format!(
                    "equipment '{}' is not available",
                    item.name
                )));
            }
            self.require_task(&db_tx, task_id).await?;

            let mut active: equipment::ActiveModel = item.into();
            active.assigned_task_id = ActiveValue::Set(Some(task_id));
            active.availability = ActiveValue::Set(false);
            let model = active.update(&db_tx).await?;
            Ok(model)
        })
    }

    /// Detaches equipment from its task and makes it available again.
    pub async fn release_equipment(&self, id: Uuid) -> ResultEngine<equipment::Model> {
        with_tx!(self, |db_tx| {
            let mut active: equipment::ActiveModel =
                self.require_equipment(&db_tx, id).await?.into();
            active.assigned_task_id = ActiveValue::Set(None);
            active.availability = ActiveValue::Set(true);
            let model = active.update(&db_tx).await?;
            Ok(model)
        })
    }

    /// Adds a worker or a labor requirement to a task. `total_cost` is
    /// derived from rate and hours when the row is saved.
    pub async fn create_labor(&self, input: LaborInput) -> ResultEngine<labor::Model> {
        with_tx!(self, |db_tx| {
            self.require_task(&db_tx, input.task_id).await?;
            let model = labor::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                task_id: ActiveValue::Set(input.task_id),
                worker_name: ActiveValue::Set(required_text(&input.worker_name, "worker name")?),
                worker_type: ActiveValue::Set(input.worker_type),
                hourly_rate: ActiveValue::Set(validate_non_negative(
                    input.hourly_rate,
                    "hourly_rate",
                )?),
                hours_worked: ActiveValue::Set(validate_non_negative(
                    input.hours_worked.unwrap_or(0.0),
                    "hours_worked",
                )?),
                total_cost: ActiveValue::NotSet,
                start_date: ActiveValue::Set(input.start_date),
                end_date: ActiveValue::Set(input.end_date),
                status: ActiveValue::Set(input.status.unwrap_or(LaborStatus::Active)),
                phone: ActiveValue::Set(optional_text(input.phone.as_deref())),
                is_requirement: ActiveValue::Set(input.is_requirement),
                required_quantity: ActiveValue::Set(validate_headcount(input.required_quantity)?),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(model)
        })
    }

    pub async fn update_labor(&self, id: Uuid, patch: LaborPatch) -> ResultEngine<labor::Model> {
        with_tx!(self, |db_tx| {
            let mut active: labor::ActiveModel = self.require_labor(&db_tx, id).await?.into();
            if let Some(name) = patch.worker_name {
                active.worker_name = ActiveValue::Set(required_text(&name, "worker name")?);
            }
            if let Some(worker_type) = patch.worker_type {
                active.worker_type = ActiveValue::Set(worker_type);
            }
            if let Some(rate) = patch.hourly_rate {
                active.hourly_rate = ActiveValue::Set(validate_non_negative(rate, "hourly_rate")?);
            }
            if let Some(hours) = patch.hours_worked {
                active.hours_worked =
                    ActiveValue::Set(validate_non_negative(hours, "hours_worked")?);
            }
            if let Some(end_date) = patch.end_date {
                active.end_date = ActiveValue::Set(Some(end_date));
            }
            if let Some(status) = patch.status {
                active.status = ActiveValue::Set(status);
            }
            if let Some(phone) = patch.phone {
                active.phone = ActiveValue::Set(optional_text(Some(&phone)));
            }
            if patch.required_quantity.is_some() {
                active.required_quantity =
                    ActiveValue::Set(validate_headcount(patch.required_quantity)?);
            }
            let model = active.update(&db_tx).await?;
            Ok(model)
        })
    }
}
