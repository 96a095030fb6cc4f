use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveEnum, ActiveValue, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    ConstructionType, EngineError, EnumCount, IssueStatus, ProjectStatus, ResultEngine,
    TaskStatus, budgets, equipment, issues, labor, materials,
    money::{completion_rate, variance_percentage},
    progress_updates, projects,
    rollup::BudgetSplit,
    tasks,
    util::{optional_text, required_text, validate_non_negative, validate_percent},
};

use super::{Engine, lookup::grouped_counts, with_tx};

#[derive(Clone, Debug)]
pub struct ProjectInput {
    pub name: String,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub construction_type: ConstructionType,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub budget_estimate: Option<f64>,
    pub actual_cost: Option<f64>,
    /// Defaults to `KES`.
    pub currency: Option<String>,
    pub contractor_name: Option<String>,
    pub client_name: Option<String>,
    pub engineer_in_charge: Uuid,
    pub progress_percent: Option<i32>,
}

#[derive(Clone, Debug)]
pub struct TaskInput {
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: Option<TaskStatus>,
    pub progress_percent: Option<i32>,
    pub assigned_to_admin: Uuid,
}

/// Rows removed (or released) by [`Engine::delete_task_cascade`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskDeletion {
    pub task_id: Uuid,
    pub budgets: u64,
    pub labor: u64,
    pub materials: u64,
    pub progress_updates: u64,
    pub released_equipment: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: u64,
    pub completed: u64,
    pub in_progress: u64,
    pub pending: u64,
    pub completion_rate: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProjectBudgetFigures {
    /// The scalar estimate entered on the project, not derived from entries.
    pub estimated: Option<f64>,
    pub budgeted: f64,
    pub actual: f64,
    pub variance: f64,
    pub variance_percentage: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IssueCounts {
    pub total: u64,
    pub open: u64,
    pub resolved: u64,
    pub in_review: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectStats {
    pub project_id: Uuid,
    pub tasks: TaskCounts,
    pub budget: ProjectBudgetFigures,
    pub issues: IssueCounts,
}

fn count_of<E: ActiveEnum<Value = String>>(counts: &[EnumCount], value: E) -> u64 {
    let key = value.to_value();
    counts.iter().find(|c| c.key == key).map_or(0, |c| c.count)
}

fn validate_date_order(start: NaiveDate, end: Option<NaiveDate>, label: &str) -> ResultEngine<()> {
    match end {
        Some(end) if end < start => Err(EngineError::Validation(format!(
            "{label} must not be before start_date"
        ))),
        _ => Ok(()),
    }
}

impl Engine {
    pub async fn create_project(&self, input: ProjectInput) -> ResultEngine<projects::Model> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, input.engineer_in_charge).await?;
            validate_date_order(input.start_date, input.end_date, "end_date")?;
            let budget_estimate = input
                .budget_estimate
                .map(|v| validate_non_negative(v, "budget_estimate"))
                .transpose()?;
            let actual_cost = input
                .actual_cost
                .map(|v| validate_non_negative(v, "actual_cost"))
                .transpose()?;
            let currency = match input.currency.as_deref() {
                Some(code) => required_text(code, "currency")?.to_uppercase(),
                None => "KES".to_string(),
            };

            let now = Utc::now();
            let model = projects::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(required_text(&input.name, "project name")?),
                description: ActiveValue::Set(optional_text(input.description.as_deref())),
                location_name: ActiveValue::Set(optional_text(input.location_name.as_deref())),
                status: ActiveValue::Set(input.status.unwrap_or(ProjectStatus::Planning)),
                construction_type: ActiveValue::Set(input.construction_type),
                start_date: ActiveValue::Set(input.start_date),
                end_date: ActiveValue::Set(input.end_date),
                budget_estimate: ActiveValue::Set(budget_estimate),
                actual_cost: ActiveValue::Set(actual_cost),
                currency: ActiveValue::Set(currency),
                contractor_name: ActiveValue::Set(optional_text(input.contractor_name.as_deref())),
                client_name: ActiveValue::Set(optional_text(input.client_name.as_deref())),
                engineer_in_charge: ActiveValue::Set(input.engineer_in_charge),
                progress_percent: ActiveValue::Set(validate_percent(
                    input.progress_percent.unwrap_or(0),
                    "progress_percent",
                )?),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok(model)
        })
    }

    pub async fn create_task(&self, input: TaskInput) -> ResultEngine<tasks::Model> {
        with_tx!(self, |db_tx| {
            self.require_project(&db_tx, input.project_id).await?;
            self.require_admin(&db_tx, input.assigned_to_admin).await?;
            validate_date_order(input.start_date, Some(input.due_date), "due_date")?;

            let now = Utc::now();
            let model = tasks::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                project_id: ActiveValue::Set(input.project_id),
                name: ActiveValue::Set(required_text(&input.name, "task name")?),
                description: ActiveValue::Set(optional_text(input.description.as_deref())),
                start_date: ActiveValue::Set(input.start_date),
                due_date: ActiveValue::Set(input.due_date),
                status: ActiveValue::Set(input.status.unwrap_or(TaskStatus::Pending)),
                progress_percent: ActiveValue::Set(validate_percent(
                    input.progress_percent.unwrap_or(0),
                    "progress_percent",
                )?),
                assigned_to_admin: ActiveValue::Set(input.assigned_to_admin),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok(model)
        })
    }

    /// Deletes a task together with its budget entries, labor, materials and
    /// progress updates. Equipment assigned to the task is released, not
    /// deleted. Nothing is removed unless everything is.
    pub async fn delete_task_cascade(&self, task_id: Uuid) -> ResultEngine<TaskDeletion> {
        with_tx!(self, |db_tx| {
            self.require_task(&db_tx, task_id).await?;

            let budgets = budgets::Entity::delete_many()
                .filter(budgets::Column::TaskId.eq(task_id))
                .exec(&db_tx)
                .await?
                .rows_affected;
            let labor = labor::Entity::delete_many()
                .filter(labor::Column::TaskId.eq(task_id))
                .exec(&db_tx)
                .await?
                .rows_affected;
            let materials = materials::Entity::delete_many()
                .filter(materials::Column::TaskId.eq(task_id))
                .exec(&db_tx)
                .await?
                .rows_affected;
            let progress_updates = progress_updates::Entity::delete_many()
                .filter(progress_updates::Column::TaskId.eq(task_id))
                .exec(&db_tx)
                .await?
                .rows_affected;
            let released_equipment = equipment::Entity::update_many()
                .col_expr(
                    equipment::Column::AssignedTaskId,
                    Expr::value(Option::<Uuid>::None),
                )
                .col_expr(equipment::Column::Availability, Expr::value(true))
                .filter(equipment::Column::AssignedTaskId.eq(task_id))
                .exec(&db_tx)
                .await?
                .rows_affected;

            tasks::Entity::delete_by_id(task_id).exec(&db_tx).await?;
            tracing::info!(%task_id, budgets, labor, materials, "task deleted");

            Ok(TaskDeletion {
                task_id,
                budgets,
                labor,
                materials,
                progress_updates,
                released_equipment,
            })
        })
    }

    /// Task, budget and issue figures of one project.
    pub async fn project_stats(&self, project_id: Uuid) -> ResultEngine<ProjectStats> {
        let db = &self.database;
        let project = self.require_project(db, project_id).await?;

        let task_status = grouped_counts::<TaskStatus, _, _>(
            db,
            tasks::Entity::find().filter(tasks::Column::ProjectId.eq(project_id)),
            tasks::Column::Status,
        )
        .await?;
        let issue_status = grouped_counts::<IssueStatus, _, _>(
            db,
            issues::Entity::find().filter(issues::Column::ProjectId.eq(project_id)),
            issues::Column::Status,
        )
        .await?;

        let task_ids = self.project_task_ids(db, project_id).await?;
        let entries = budgets::Entity::find()
            .filter(budgets::Column::TaskId.is_in(task_ids))
            .all(db)
            .await?;
        let split = BudgetSplit::from_entries(&entries);

        let total_tasks = task_status.iter().map(|c| c.count).sum();
        let completed = count_of(&task_status, TaskStatus::Completed);

        Ok(ProjectStats {
            project_id,
            tasks: TaskCounts {
                total: total_tasks,
                completed,
                in_progress: count_of(&task_status, TaskStatus::InProgress),
                pending: count_of(&task_status, TaskStatus::Pending),
                completion_rate: completion_rate(completed, total_tasks),
            },
            budget: ProjectBudgetFigures {
                estimated: project.budget_estimate,
                budgeted: split.budgeted,
                actual: split.actual,
                variance: split.variance(),
                variance_percentage: variance_percentage(split.actual, split.budgeted),
            },
            issues: IssueCounts {
                total: issue_status.iter().map(|c| c.count).sum(),
                open: count_of(&issue_status, IssueStatus::Open),
                resolved: count_of(&issue_status, IssueStatus::Resolved),
                in_review: count_of(&issue_status, IssueStatus::InReview),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill_enum_counts;

    #[test]
    fn end_before_start_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let before = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert!(validate_date_order(start, Some(before), "end_date").is_err());
        assert!(validate_date_order(start, Some(start), "end_date").is_ok());
        assert!(validate_date_order(start, None, "end_date").is_ok());
    }

    #[test]
    fn count_of_reads_the_matching_key() {
        let counts = fill_enum_counts::<TaskStatus>(vec![("completed".to_string(), 2)]);
        assert_eq!(count_of(&counts, TaskStatus::Completed), 2);
        assert_eq!(count_of(&counts, TaskStatus::Pending), 0);
    }
}
