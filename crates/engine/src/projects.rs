//! Construction projects.
//!
//! `budget_estimate` and `actual_cost` are scalar figures entered by hand.
//! They are reported next to the budget rollup but never reconciled with it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::str_enum;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[sea_orm(string_value = "planning")]
    Planning,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "on_hold")]
    OnHold,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

str_enum!(ProjectStatus, "project status");

impl ProjectStatus {
    /// Statuses a project can still slip in.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Planning | Self::InProgress)
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ConstructionType {
    #[sea_orm(string_value = "building")]
    Building,
    #[sea_orm(string_value = "infrastructure")]
    Infrastructure,
    #[sea_orm(string_value = "industrial")]
    Industrial,
    #[sea_orm(string_value = "specialized")]
    Specialized,
    #[sea_orm(string_value = "other")]
    Other,
}

str_enum!(ConstructionType, "construction type");

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub status: ProjectStatus,
    pub construction_type: ConstructionType,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub budget_estimate: Option<f64>,
    pub actual_cost: Option<f64>,
    pub currency: String,
    pub contractor_name: Option<String>,
    pub client_name: Option<String>,
    pub engineer_in_charge: Uuid,
    pub progress_percent: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::admins::Entity",
        from = "Column::EngineerInCharge",
        to = "super::admins::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Engineer,
    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,
    #[sea_orm(has_many = "super::issues::Entity")]
    Issues,
}

impl Related<super::admins::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Engineer.def()
    }
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl Related<super::issues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
