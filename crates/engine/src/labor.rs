//! Labor assigned to a task.
//!
//! Rows with `is_requirement = false` are workers actually on site; rows with
//! `is_requirement = true` describe planned needs (`required_quantity` heads
//! for `hours_worked` hours each). `total_cost` is derived from rate and
//! hours every time the row is saved.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{cost, util::str_enum};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum WorkerType {
    #[sea_orm(string_value = "foreman")]
    Foreman,
    #[sea_orm(string_value = "skilled_worker")]
    SkilledWorker,
    #[sea_orm(string_value = "unskilled_worker")]
    UnskilledWorker,
    #[sea_orm(string_value = "engineer")]
    Engineer,
    #[sea_orm(string_value = "supervisor")]
    Supervisor,
}

str_enum!(WorkerType, "worker type");

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum LaborStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "on_leave")]
    OnLeave,
}

str_enum!(LaborStatus, "labor status");

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "labor")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub task_id: Uuid,
    pub worker_name: String,
    pub worker_type: WorkerType,
    pub hourly_rate: f64,
    pub hours_worked: f64,
    pub total_cost: f64,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub status: LaborStatus,
    pub phone: Option<String>,
    pub is_requirement: bool,
    pub required_quantity: Option<i32>,
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Planned cost of a requirement row: every required head works the
    /// recorded hours at the recorded rate.
    pub fn required_cost(&self) -> f64 {
        cost::labor_cost(
            self.hourly_rate,
            self.hours_worked,
            cost::required_headcount(self.required_quantity),
        )
    }

    /// Cost shown when listing the resources available to a task.
    pub fn estimated_cost(&self) -> f64 {
        if self.is_requirement {
            self.required_cost()
        } else {
            cost::labor_cost(self.hourly_rate, self.hours_worked, 1)
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tasks::Entity",
        from = "Column::TaskId",
        to = "super::tasks::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Task,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

fn current(value: &ActiveValue<f64>) -> Option<f64> {
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(*v),
        ActiveValue::NotSet => None,
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let (Some(rate), Some(hours)) = (current(&self.hourly_rate), current(&self.hours_worked))
        {
            self.total_cost = ActiveValue::Set(cost::round_cents(cost::labor_cost(rate, hours, 1)));
        }
        Ok(self)
    }
}
