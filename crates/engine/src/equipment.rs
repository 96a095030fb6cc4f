//! Equipment fleet. An item is bound to at most one task at a time through
//! `assigned_task_id`; `availability` is false while it is assigned.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::cost;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "equipment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_name = "type")]
    pub equipment_type: String,
    pub availability: bool,
    pub rental_cost_per_day: Option<f64>,
    pub assigned_task_id: Option<Uuid>,
    pub days_used: f64,
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Rental cost accrued over the recorded days.
    pub fn rental_cost(&self) -> f64 {
        cost::equipment_cost(self.rental_cost_per_day, self.days_used)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tasks::Entity",
        from = "Column::AssignedTaskId",
        to = "super::tasks::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Task,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
