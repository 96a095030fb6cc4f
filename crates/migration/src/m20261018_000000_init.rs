//! Initial schema migration.
//!
//! Creates the complete schema for Sitebook:
//!
//! - `admins`: engineers and office staff that own projects and tasks
//! - `users`: site users (counted on the dashboard only)
//! - `projects`: construction projects
//! - `tasks`: work packages of a project
//! - `materials`, `equipment`, `labor`: resources consumed by tasks
//! - `budgets`: budgeted and actual cost entries per task
//! - `issues`, `documents`, `task_progress_updates`: dashboard inputs

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Admins {
    Table,
    Id,
    Name,
    Email,
    Role,
    Phone,
    IsActive,
    LastLogin,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    CreatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Name,
    Description,
    LocationName,
    Status,
    ConstructionType,
    StartDate,
    EndDate,
    BudgetEstimate,
    ActualCost,
    Currency,
    ContractorName,
    ClientName,
    EngineerInCharge,
    ProgressPercent,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    ProjectId,
    Name,
    Description,
    StartDate,
    DueDate,
    Status,
    ProgressPercent,
    AssignedToAdmin,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Materials {
    Table,
    Id,
    TaskId,
    Name,
    Unit,
    UnitCost,
    QuantityRequired,
    QuantityUsed,
    CreatedAt,
}

#[derive(Iden)]
enum Equipment {
    Table,
    Id,
    Name,
    Type,
    Availability,
    RentalCostPerDay,
    AssignedTaskId,
    DaysUsed,
    CreatedAt,
}

#[derive(Iden)]
enum Labor {
    Table,
    Id,
    TaskId,
    WorkerName,
    WorkerType,
    HourlyRate,
    HoursWorked,
    TotalCost,
    StartDate,
    EndDate,
    Status,
    Phone,
    IsRequirement,
    RequiredQuantity,
    CreatedAt,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    TaskId,
    Category,
    Amount,
    Type,
    Date,
    EntryType,
    MaterialId,
    EquipmentId,
    LaborId,
    CalculatedAmount,
    Quantity,
    CreatedAt,
}

#[derive(Iden)]
enum Issues {
    Table,
    Id,
    Name,
    Email,
    Description,
    Category,
    ProjectId,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Documents {
    Table,
    Id,
    DocumentType,
    FileName,
    UploadedByAdminId,
    CreatedAt,
}

#[derive(Iden)]
enum TaskProgressUpdates {
    Table,
    Id,
    TaskId,
    Description,
    ProgressPercent,
    Date,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. People
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Admins::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Admins::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Admins::Name).string().not_null())
                    .col(ColumnDef::new(Admins::Email).string().not_null())
                    .col(
                        ColumnDef::new(Admins::Role)
                            .string()
                            .not_null()
                            .default("admin"),
                    )
                    .col(ColumnDef::new(Admins::Phone).string())
                    .col(
                        ColumnDef::new(Admins::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Admins::LastLogin).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Admins::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Projects and tasks
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Projects::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(ColumnDef::new(Projects::LocationName).string())
                    .col(
                        ColumnDef::new(Projects::Status)
                            .string()
                            .not_null()
                            .default("planning"),
                    )
                    .col(
                        ColumnDef::new(Projects::ConstructionType)
                            .string()
                            .not_null()
                            .default("building"),
                    )
                    .col(ColumnDef::new(Projects::StartDate).date().not_null())
                    .col(ColumnDef::new(Projects::EndDate).date())
                    .col(ColumnDef::new(Projects::BudgetEstimate).double())
                    .col(ColumnDef::new(Projects::ActualCost).double().default(0.0))
                    .col(
                        ColumnDef::new(Projects::Currency)
                            .string()
                            .not_null()
                            .default("KES"),
                    )
                    .col(ColumnDef::new(Projects::ContractorName).string())
                    .col(ColumnDef::new(Projects::ClientName).string())
                    .col(ColumnDef::new(Projects::EngineerInCharge).blob().not_null())
                    .col(
                        ColumnDef::new(Projects::ProgressPercent)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Projects::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Projects::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-projects-engineer_in_charge")
                            .from(Projects::Table, Projects::EngineerInCharge)
                            .to(Admins::Table, Admins::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-projects-engineer_in_charge")
                    .table(Projects::Table)
                    .col(Projects::EngineerInCharge)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tasks::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Tasks::ProjectId).blob().not_null())
                    .col(ColumnDef::new(Tasks::Name).string().not_null())
                    .col(ColumnDef::new(Tasks::Description).text())
                    .col(ColumnDef::new(Tasks::StartDate).date().not_null())
                    .col(ColumnDef::new(Tasks::DueDate).date().not_null())
                    .col(
                        ColumnDef::new(Tasks::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Tasks::ProgressPercent)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Tasks::AssignedToAdmin).blob().not_null())
                    .col(
                        ColumnDef::new(Tasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tasks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tasks-project_id")
                            .from(Tasks::Table, Tasks::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tasks-assigned_to_admin")
                            .from(Tasks::Table, Tasks::AssignedToAdmin)
                            .to(Admins::Table, Admins::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-tasks-project_id")
                    .table(Tasks::Table)
                    .col(Tasks::ProjectId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Resources
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Materials::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Materials::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Materials::TaskId).blob().not_null())
                    .col(ColumnDef::new(Materials::Name).string().not_null())
                    .col(ColumnDef::new(Materials::Unit).string().not_null())
                    .col(ColumnDef::new(Materials::UnitCost).double().not_null())
                    .col(
                        ColumnDef::new(Materials::QuantityRequired)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Materials::QuantityUsed)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Materials::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-materials-task_id")
                            .from(Materials::Table, Materials::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-materials-task_id")
                    .table(Materials::Table)
                    .col(Materials::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Equipment::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Equipment::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Equipment::Name).string().not_null())
                    .col(ColumnDef::new(Equipment::Type).string().not_null())
                    .col(
                        ColumnDef::new(Equipment::Availability)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Equipment::RentalCostPerDay).double())
                    .col(ColumnDef::new(Equipment::AssignedTaskId).blob())
                    .col(
                        ColumnDef::new(Equipment::DaysUsed)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Equipment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-equipment-assigned_task_id")
                            .from(Equipment::Table, Equipment::AssignedTaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-equipment-assigned_task_id")
                    .table(Equipment::Table)
                    .col(Equipment::AssignedTaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Labor::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Labor::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Labor::TaskId).blob().not_null())
                    .col(ColumnDef::new(Labor::WorkerName).string().not_null())
                    .col(ColumnDef::new(Labor::WorkerType).string().not_null())
                    .col(ColumnDef::new(Labor::HourlyRate).double().not_null())
                    .col(
                        ColumnDef::new(Labor::HoursWorked)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Labor::TotalCost)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Labor::StartDate).date())
                    .col(ColumnDef::new(Labor::EndDate).date())
                    .col(
                        ColumnDef::new(Labor::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Labor::Phone).string())
                    .col(
                        ColumnDef::new(Labor::IsRequirement)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Labor::RequiredQuantity).integer())
                    .col(
                        ColumnDef::new(Labor::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-labor-task_id")
                            .from(Labor::Table, Labor::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-labor-task_id")
                    .table(Labor::Table)
                    .col(Labor::TaskId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Budget entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Budgets::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Budgets::TaskId).blob().not_null())
                    .col(ColumnDef::new(Budgets::Category).string().not_null())
                    .col(ColumnDef::new(Budgets::Amount).double().not_null())
                    .col(ColumnDef::new(Budgets::Type).string().not_null())
                    .col(ColumnDef::new(Budgets::Date).date().not_null())
                    .col(
                        ColumnDef::new(Budgets::EntryType)
                            .string()
                            .not_null()
                            .default("manual"),
                    )
                    .col(ColumnDef::new(Budgets::MaterialId).blob())
                    .col(ColumnDef::new(Budgets::EquipmentId).blob())
                    .col(ColumnDef::new(Budgets::LaborId).blob())
                    .col(ColumnDef::new(Budgets::CalculatedAmount).double())
                    .col(ColumnDef::new(Budgets::Quantity).double().default(1.0))
                    .col(
                        ColumnDef::new(Budgets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-task_id")
                            .from(Budgets::Table, Budgets::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-material_id")
                            .from(Budgets::Table, Budgets::MaterialId)
                            .to(Materials::Table, Materials::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-equipment_id")
                            .from(Budgets::Table, Budgets::EquipmentId)
                            .to(Equipment::Table, Equipment::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-labor_id")
                            .from(Budgets::Table, Budgets::LaborId)
                            .to(Labor::Table, Labor::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budgets-task_id-type")
                    .table(Budgets::Table)
                    .col(Budgets::TaskId)
                    .col(Budgets::Type)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Dashboard inputs
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Issues::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Issues::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Issues::Name).string().not_null())
                    .col(ColumnDef::new(Issues::Email).string().not_null())
                    .col(ColumnDef::new(Issues::Description).text().not_null())
                    .col(
                        ColumnDef::new(Issues::Category)
                            .string()
                            .not_null()
                            .default("other"),
                    )
                    .col(ColumnDef::new(Issues::ProjectId).blob())
                    .col(
                        ColumnDef::new(Issues::Status)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .col(
                        ColumnDef::new(Issues::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-issues-project_id")
                            .from(Issues::Table, Issues::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Documents::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Documents::DocumentType).string().not_null())
                    .col(ColumnDef::new(Documents::FileName).string().not_null())
                    .col(ColumnDef::new(Documents::UploadedByAdminId).blob())
                    .col(
                        ColumnDef::new(Documents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-documents-uploaded_by_admin_id")
                            .from(Documents::Table, Documents::UploadedByAdminId)
                            .to(Admins::Table, Admins::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TaskProgressUpdates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskProgressUpdates::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskProgressUpdates::TaskId).blob().not_null())
                    .col(ColumnDef::new(TaskProgressUpdates::Description).text().not_null())
                    .col(
                        ColumnDef::new(TaskProgressUpdates::ProgressPercent)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TaskProgressUpdates::Date).date().not_null())
                    .col(
                        ColumnDef::new(TaskProgressUpdates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-task_progress_updates-task_id")
                            .from(TaskProgressUpdates::Table, TaskProgressUpdates::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-task_progress_updates-task_id")
                    .table(TaskProgressUpdates::Table)
                    .col(TaskProgressUpdates::TaskId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(TaskProgressUpdates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Issues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Labor::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Equipment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Materials::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Admins::Table).to_owned())
            .await?;
        Ok(())
    }
}
