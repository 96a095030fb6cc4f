//! Budget entries.
//!
//! A `resource_based` entry snapshots the cost of the referenced material,
//! equipment or labor row at creation time into both `amount` and
//! `calculated_amount`. Later edits of the resource never touch the entry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::str_enum;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum BudgetType {
    #[sea_orm(string_value = "budgeted")]
    Budgeted,
    #[sea_orm(string_value = "actual")]
    Actual,
}

str_enum!(BudgetType, "budget type");

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    #[default]
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "resource_based")]
    ResourceBased,
}

str_enum!(EntryType, "entry type");

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub task_id: Uuid,
    pub category: String,
    pub amount: f64,
    #[sea_orm(column_name = "type")]
    pub budget_type: BudgetType,
    pub date: Date,
    pub entry_type: EntryType,
    pub material_id: Option<Uuid>,
    pub equipment_id: Option<Uuid>,
    pub labor_id: Option<Uuid>,
    pub calculated_amount: Option<f64>,
    pub quantity: Option<f64>,
    pub created_at: DateTimeUtc,
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
    #[sea_orm(
        belongs_to = "super::materials::Entity",
        from = "Column::MaterialId",
        to = "super::materials::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Material,
    #[sea_orm(
        belongs_to = "super::equipment::Entity",
        from = "Column::EquipmentId",
        to = "super::equipment::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Equipment,
    #[sea_orm(
        belongs_to = "super::labor::Entity",
        from = "Column::LaborId",
        to = "super::labor::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Labor,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
