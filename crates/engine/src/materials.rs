//! Materials consumed by a task.
//!
//! `quantity_used` may only move within `0..=quantity_required`; the bound
//! is checked when usage is recorded, not when the row is created.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::cost;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub task_id: Uuid,
    pub name: String,
    pub unit: String,
    pub unit_cost: f64,
    pub quantity_required: f64,
    pub quantity_used: f64,
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Cost of what has been used so far.
    pub fn actual_cost(&self) -> f64 {
        cost::material_cost(self.unit_cost, self.quantity_used)
    }

    /// Cost of the full requirement.
    pub fn estimated_cost(&self) -> f64 {
        cost::material_cost(self.unit_cost, self.quantity_required)
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

impl ActiveModelBehavior for ActiveModel {}
