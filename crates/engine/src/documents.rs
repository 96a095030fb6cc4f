use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::str_enum;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[sea_orm(string_value = "project_document")]
    ProjectDocument,
    #[sea_orm(string_value = "company_document")]
    CompanyDocument,
    #[sea_orm(string_value = "template")]
    Template,
    #[sea_orm(string_value = "policy")]
    Policy,
    #[sea_orm(string_value = "contract")]
    Contract,
    #[sea_orm(string_value = "other")]
    Other,
}

str_enum!(DocumentType, "document type");

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub document_type: DocumentType,
    pub file_name: String,
    pub uploaded_by_admin_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
