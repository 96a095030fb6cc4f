//! Portfolio dashboard and date timelines.
//!
//! Every section of the dashboard is computed by its own query. Sections run
//! concurrently and a failing section is replaced by its empty value, so a
//! single broken query never hides the rest of the dashboard.

use std::{collections::BTreeMap, str::FromStr};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveEnum, Iterable, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, prelude::*,
};
use uuid::Uuid;

use crate::{
    BudgetType, ConstructionType, DocumentType, EngineError, EnumCount, IssueStatus, LaborStatus,
    ProjectResourceCounts, ProjectStatus, ResultEngine, TaskStatus, WorkerType, admins, budgets,
    cost, documents, equipment, fill_bool_counts, fill_enum_counts, issues, labor, materials,
    money::{bounded_percent, fixed2, percent_of},
    progress_updates, projects, tasks, users,
};

use super::{Engine, lookup::grouped_counts};

const RECENT_LIMIT: u64 = 5;
const TOP_ENGINEERS: usize = 5;
const ACTIVE_ADMIN_DAYS: i64 = 7;

/// Narrows the project-based sections of the dashboard.
///
/// Both dates are inclusive and compared with the project creation time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DashboardFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub project_id: Option<Uuid>,
    pub engineer_id: Option<Uuid>,
}

fn validate_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> ResultEngine<()> {
    if let (Some(start), Some(end)) = (start, end)
        && start > end
    {
        return Err(EngineError::Validation(
            "invalid range: start_date must be <= end_date".to_string(),
        ));
    }
    Ok(())
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// First instant after `date`.
fn day_end(date: NaiveDate) -> DateTime<Utc> {
    date.succ_opt().map_or(DateTime::<Utc>::MAX_UTC, day_start)
}

trait ApplyProjectScope: QueryFilter + Sized {
    fn apply_project_scope(self, filter: &DashboardFilter) -> Self;
}

impl<T> ApplyProjectScope for T
where
    T: QueryFilter + Sized,
{
    fn apply_project_scope(mut self, filter: &DashboardFilter) -> Self {
        if let Some(project_id) = filter.project_id {
            self = self.filter(projects::Column::Id.eq(project_id));
        }
        if let Some(engineer_id) = filter.engineer_id {
            self = self.filter(projects::Column::EngineerInCharge.eq(engineer_id));
        }
        if let Some(start) = filter.start_date {
            self = self.filter(projects::Column::CreatedAt.gte(day_start(start)));
        }
        if let Some(end) = filter.end_date {
            self = self.filter(projects::Column::CreatedAt.lt(day_end(end)));
        }
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overview {
    pub total_projects: u64,
    pub total_tasks: u64,
    pub total_users: u64,
    pub total_admins: u64,
    pub total_materials: u64,
    pub total_equipment: u64,
    pub total_labor: u64,
    pub total_issues: u64,
    pub total_documents: u64,
    /// Admins who logged in during the last seven days.
    pub active_admins: u64,
    pub overdue_tasks: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProgressRange {
    pub average: f64,
    pub min: i32,
    pub max: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecentProject {
    pub id: Uuid,
    pub name: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub engineer_name: Option<String>,
    pub engineer_email: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecentTask {
    pub id: Uuid,
    pub name: String,
    pub status: TaskStatus,
    pub progress_percent: i32,
    pub created_at: DateTime<Utc>,
    pub project_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecentIssue {
    pub id: Uuid,
    pub description: String,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
    pub project_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecentProgressUpdate {
    pub id: Uuid,
    pub task_id: Uuid,
    pub task_name: Option<String>,
    pub description: String,
    pub progress_percent: i32,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BudgetByCategory {
    pub category: String,
    pub budget_type: BudgetType,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectBudgetLine {
    pub project_id: Uuid,
    pub name: String,
    pub budget_estimate: Option<f64>,
    pub actual_cost: Option<f64>,
    /// `budget_estimate − actual_cost`, absent when either side is.
    pub budget_remaining: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BudgetOverview {
    pub total_budgeted: f64,
    pub total_actual: f64,
    /// `actual − budgeted`.
    pub variance: f64,
    /// `actual / budgeted × 100`, `"0.00"` when nothing is budgeted.
    pub utilization_percent: String,
    pub by_category: Vec<BudgetByCategory>,
    pub project_budgets: Vec<ProjectBudgetLine>,
}

impl Default for BudgetOverview {
    fn default() -> Self {
        Self {
            total_budgeted: 0.0,
            total_actual: 0.0,
            variance: 0.0,
            utilization_percent: fixed2(0.0),
            by_category: Vec::new(),
            project_budgets: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LaborOverview {
    pub by_status: Vec<EnumCount>,
    pub by_worker_type: Vec<EnumCount>,
    pub total_hours: f64,
    pub total_cost: f64,
    pub average_hourly_rate: f64,
}

impl Default for LaborOverview {
    fn default() -> Self {
        Self {
            by_status: fill_enum_counts::<LaborStatus>(Vec::new()),
            by_worker_type: fill_enum_counts::<WorkerType>(Vec::new()),
            total_hours: 0.0,
            total_cost: 0.0,
            average_hourly_rate: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialOverview {
    pub total_required: f64,
    pub total_used: f64,
    /// `used / required × 100` clamped to `[0, 100]`.
    pub utilization_percent: String,
    /// Cost of every requirement.
    pub total_cost: f64,
    /// Cost of what has been used.
    pub total_spent: f64,
}

impl Default for MaterialOverview {
    fn default() -> Self {
        Self {
            total_required: 0.0,
            total_used: 0.0,
            utilization_percent: fixed2(0.0),
            total_cost: 0.0,
            total_spent: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EquipmentSummary {
    pub total_daily_rental_cost: f64,
    pub available_equipment: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PerformanceOverview {
    pub task_completion_rate: String,
    pub completed_tasks: u64,
    pub in_progress_tasks: u64,
    pub projects_at_risk: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TopEngineer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Absent when the ranking could not be computed and plain admins are
    /// listed instead.
    pub project_count: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardStats {
    pub overview: Overview,
    pub projects_by_status: Vec<EnumCount>,
    pub projects_by_type: Vec<EnumCount>,
    pub project_progress: ProgressRange,
    pub recent_projects: Vec<RecentProject>,
    pub project_resources: Vec<ProjectResourceCounts>,
    pub tasks_by_status: Vec<EnumCount>,
    pub recent_tasks: Vec<RecentTask>,
    pub budget: BudgetOverview,
    pub issues_by_status: Vec<EnumCount>,
    pub recent_issues: Vec<RecentIssue>,
    pub equipment_by_availability: Vec<EnumCount>,
    pub labor: LaborOverview,
    pub materials: MaterialOverview,
    pub equipment: EquipmentSummary,
    pub performance: PerformanceOverview,
    pub recent_progress_updates: Vec<RecentProgressUpdate>,
    pub documents_by_type: Vec<EnumCount>,
    pub top_engineers: Vec<TopEngineer>,
}

fn degrade<T: Default>(section: &'static str, result: ResultEngine<T>) -> T {
    result.unwrap_or_else(|err| {
        tracing::warn!(section, error = %err, "dashboard section degraded");
        T::default()
    })
}

fn degrade_count(section: &'static str, result: Result<u64, DbErr>) -> u64 {
    degrade(section, result.map_err(EngineError::from))
}

fn degrade_counts<E>(section: &'static str, result: ResultEngine<Vec<EnumCount>>) -> Vec<EnumCount>
where
    E: ActiveEnum<Value = String> + Iterable,
{
    result.unwrap_or_else(|err| {
        tracing::warn!(section, error = %err, "dashboard section degraded");
        fill_enum_counts::<E>(Vec::new())
    })
}

fn count_of(counts: &[EnumCount], key: &str) -> u64 {
    counts.iter().find(|c| c.key == key).map_or(0, |c| c.count)
}

/// Ranks engineers by number of projects, then by name.
fn rank_engineers(counts: Vec<(Uuid, i64)>, admins: Vec<admins::Model>) -> Vec<TopEngineer> {
    let counts: BTreeMap<Uuid, u64> = counts
        .into_iter()
        .map(|(id, count)| (id, u64::try_from(count).unwrap_or(0)))
        .filter(|(_, count)| *count > 0)
        .collect();
    let mut ranked: Vec<TopEngineer> = admins
        .into_iter()
        .filter_map(|admin| {
            counts.get(&admin.id).map(|count| TopEngineer {
                id: admin.id,
                name: admin.name,
                email: admin.email,
                project_count: Some(*count),
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.project_count
            .cmp(&a.project_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(TOP_ENGINEERS);
    ranked
}

impl Engine {
    /// Portfolio-wide statistics.
    ///
    /// The filter narrows the project sections (counts, breakdowns, recent
    /// projects, resources, budgets per project, projects at risk and the
    /// engineer ranking). Other sections cover the whole store.
    pub async fn dashboard_stats(&self, filter: DashboardFilter) -> ResultEngine<DashboardStats> {
        validate_range(filter.start_date, filter.end_date)?;
        let now = Utc::now();
        let today = now.date_naive();
        let filter = &filter;

        let (
            overview,
            projects_by_status,
            projects_by_type,
            project_progress,
            recent_projects,
            project_resources,
            tasks_by_status,
            recent_tasks,
            budget,
            issues_by_status,
            recent_issues,
            equipment_by_availability,
            labor,
            materials,
            equipment,
            projects_at_risk,
            recent_progress_updates,
            documents_by_type,
            top_engineers,
        ) = tokio::join!(
            self.overview(filter, now),
            grouped_counts::<ProjectStatus, _, _>(
                &self.database,
                projects::Entity::find().apply_project_scope(filter),
                projects::Column::Status,
            ),
            grouped_counts::<ConstructionType, _, _>(
                &self.database,
                projects::Entity::find().apply_project_scope(filter),
                projects::Column::ConstructionType,
            ),
            self.project_progress(filter),
            self.recent_projects(filter),
            self.project_resource_counts(filter),
            grouped_counts::<TaskStatus, _, _>(
                &self.database,
                tasks::Entity::find(),
                tasks::Column::Status,
            ),
            self.recent_tasks(),
            self.budget_overview(filter),
            grouped_counts::<IssueStatus, _, _>(
                &self.database,
                issues::Entity::find(),
                issues::Column::Status,
            ),
            self.recent_issues(),
            self.equipment_by_availability(),
            self.labor_overview(),
            self.material_overview(),
            self.equipment_summary(),
            self.projects_at_risk(filter, today),
            self.recent_progress_updates(),
            grouped_counts::<DocumentType, _, _>(
                &self.database,
                documents::Entity::find(),
                documents::Column::DocumentType,
            ),
            self.top_engineers(filter),
        );

        let tasks_by_status = degrade_counts::<TaskStatus>("tasks_by_status", tasks_by_status);
        let completed_tasks = count_of(&tasks_by_status, "completed");
        let total_tasks: u64 = tasks_by_status.iter().map(|c| c.count).sum();
        let performance = PerformanceOverview {
            task_completion_rate: fixed2(percent_of(completed_tasks as f64, total_tasks as f64)),
            completed_tasks,
            in_progress_tasks: count_of(&tasks_by_status, "in_progress"),
            projects_at_risk: degrade("projects_at_risk", projects_at_risk),
        };

        let top_engineers = match top_engineers {
            Ok(ranked) => ranked,
            Err(err) => {
                tracing::warn!(error = %err, "engineer ranking failed, listing admins instead");
                degrade("top_engineers", self.first_admins().await)
            }
        };

        Ok(DashboardStats {
            overview,
            projects_by_status: degrade_counts::<ProjectStatus>(
                "projects_by_status",
                projects_by_status,
            ),
            projects_by_type: degrade_counts::<ConstructionType>(
                "projects_by_type",
                projects_by_type,
            ),
            project_progress: degrade("project_progress", project_progress),
            recent_projects: degrade("recent_projects", recent_projects),
            project_resources: degrade("project_resources", project_resources),
            tasks_by_status,
            recent_tasks: degrade("recent_tasks", recent_tasks),
            budget: degrade("budget", budget),
            issues_by_status: degrade_counts::<IssueStatus>("issues_by_status", issues_by_status),
            recent_issues: degrade("recent_issues", recent_issues),
            equipment_by_availability: equipment_by_availability.unwrap_or_else(|err| {
                tracing::warn!(
                    section = "equipment_by_availability",
                    error = %err,
                    "dashboard section degraded"
                );
                fill_bool_counts(Vec::new())
            }),
            labor: degrade("labor", labor),
            materials: degrade("materials", materials),
            equipment: degrade("equipment", equipment),
            performance,
            recent_progress_updates: degrade("recent_progress_updates", recent_progress_updates),
            documents_by_type: degrade_counts::<DocumentType>(
                "documents_by_type",
                documents_by_type,
            ),
            top_engineers,
        })
    }

    /// Each count degrades on its own, so one broken table zeroes only its
    /// own figure.
    async fn overview(&self, filter: &DashboardFilter, now: DateTime<Utc>) -> Overview {
        let db = &self.database;
        let today = now.date_naive();
        let active_since = now - Duration::days(ACTIVE_ADMIN_DAYS);

        let (
            total_projects,
            total_tasks,
            total_users,
            total_admins,
            total_materials,
            total_equipment,
            total_labor,
            total_issues,
            total_documents,
            active_admins,
            overdue_tasks,
        ) = tokio::join!(
            projects::Entity::find()
                .apply_project_scope(filter)
                .count(db),
            tasks::Entity::find().count(db),
            users::Entity::find().count(db),
            admins::Entity::find().count(db),
            materials::Entity::find().count(db),
            equipment::Entity::find().count(db),
            labor::Entity::find().count(db),
            issues::Entity::find().count(db),
            documents::Entity::find().count(db),
            admins::Entity::find()
                .filter(admins::Column::LastLogin.gte(active_since))
                .count(db),
            tasks::Entity::find()
                .filter(tasks::Column::DueDate.lt(today))
                .filter(tasks::Column::Status.ne(TaskStatus::Completed))
                .count(db),
        );

        Overview {
            total_projects: degrade_count("overview.total_projects", total_projects),
            total_tasks: degrade_count("overview.total_tasks", total_tasks),
            total_users: degrade_count("overview.total_users", total_users),
            total_admins: degrade_count("overview.total_admins", total_admins),
            total_materials: degrade_count("overview.total_materials", total_materials),
            total_equipment: degrade_count("overview.total_equipment", total_equipment),
            total_labor: degrade_count("overview.total_labor", total_labor),
            total_issues: degrade_count("overview.total_issues", total_issues),
            total_documents: degrade_count("overview.total_documents", total_documents),
            active_admins: degrade_count("overview.active_admins", active_admins),
            overdue_tasks: degrade_count("overview.overdue_tasks", overdue_tasks),
        }
    }

    async fn project_progress(&self, filter: &DashboardFilter) -> ResultEngine<ProgressRange> {
        let values: Vec<i32> = projects::Entity::find()
            .apply_project_scope(filter)
            .select_only()
            .column(projects::Column::ProgressPercent)
            .into_tuple()
            .all(&self.database)
            .await?;
        if values.is_empty() {
            return Ok(ProgressRange::default());
        }
        let sum: i64 = values.iter().map(|v| i64::from(*v)).sum();
        Ok(ProgressRange {
            average: sum as f64 / values.len() as f64,
            min: values.iter().copied().min().unwrap_or(0),
            max: values.iter().copied().max().unwrap_or(0),
        })
    }

    async fn recent_projects(&self, filter: &DashboardFilter) -> ResultEngine<Vec<RecentProject>> {
        let rows = projects::Entity::find()
            .find_also_related(admins::Entity)
            .apply_project_scope(filter)
            .order_by_desc(projects::Column::CreatedAt)
            .limit(RECENT_LIMIT)
            .all(&self.database)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(project, engineer)| RecentProject {
                id: project.id,
                name: project.name,
                status: project.status,
                created_at: project.created_at,
                engineer_name: engineer.as_ref().map(|a| a.name.clone()),
                engineer_email: engineer.map(|a| a.email),
            })
            .collect())
    }

    async fn project_resource_counts(
        &self,
        filter: &DashboardFilter,
    ) -> ResultEngine<Vec<ProjectResourceCounts>> {
        let projects: Vec<(Uuid, String)> = projects::Entity::find()
            .apply_project_scope(filter)
            .select_only()
            .column(projects::Column::Id)
            .column(projects::Column::Name)
            .order_by_asc(projects::Column::Name)
            .into_tuple()
            .all(&self.database)
            .await?;
        self.resource_counts(&self.database, projects).await
    }

    async fn recent_tasks(&self) -> ResultEngine<Vec<RecentTask>> {
        let rows = tasks::Entity::find()
            .find_also_related(projects::Entity)
            .order_by_desc(tasks::Column::CreatedAt)
            .limit(RECENT_LIMIT)
            .all(&self.database)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(task, project)| RecentTask {
                id: task.id,
                name: task.name,
                status: task.status,
                progress_percent: task.progress_percent,
                created_at: task.created_at,
                project_name: project.map(|p| p.name),
            })
            .collect())
    }

    async fn budget_overview(&self, filter: &DashboardFilter) -> ResultEngine<BudgetOverview> {
        let db = &self.database;
        let rows: Vec<(String, BudgetType, f64)> = budgets::Entity::find()
            .select_only()
            .column(budgets::Column::Category)
            .column(budgets::Column::BudgetType)
            .column(budgets::Column::Amount)
            .into_tuple()
            .all(db)
            .await?;

        let mut by_category: BTreeMap<(String, String), BudgetByCategory> = BTreeMap::new();
        let (mut total_budgeted, mut total_actual) = (0.0, 0.0);
        for (category, budget_type, amount) in rows {
            let amount = cost::amount(amount);
            match budget_type {
                BudgetType::Budgeted => total_budgeted += amount,
                BudgetType::Actual => total_actual += amount,
            }
            by_category
                .entry((category.clone(), budget_type.to_value()))
                .or_insert_with(|| BudgetByCategory {
                    category,
                    budget_type,
                    total: 0.0,
                })
                .total += amount;
        }

        let project_budgets = projects::Entity::find()
            .apply_project_scope(filter)
            .order_by_asc(projects::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(|project| ProjectBudgetLine {
                project_id: project.id,
                budget_remaining: project
                    .budget_estimate
                    .zip(project.actual_cost)
                    .map(|(estimate, actual)| estimate - actual),
                name: project.name,
                budget_estimate: project.budget_estimate,
                actual_cost: project.actual_cost,
            })
            .collect();

        Ok(BudgetOverview {
            total_budgeted,
            total_actual,
            variance: total_actual - total_budgeted,
            utilization_percent: fixed2(percent_of(total_actual, total_budgeted)),
            by_category: by_category.into_values().collect(),
            project_budgets,
        })
    }

    async fn recent_issues(&self) -> ResultEngine<Vec<RecentIssue>> {
        let rows = issues::Entity::find()
            .find_also_related(projects::Entity)
            .order_by_desc(issues::Column::CreatedAt)
            .limit(RECENT_LIMIT)
            .all(&self.database)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(issue, project)| RecentIssue {
                id: issue.id,
                description: issue.description,
                status: issue.status,
                created_at: issue.created_at,
                project_name: project.map(|p| p.name),
            })
            .collect())
    }

    async fn equipment_by_availability(&self) -> ResultEngine<Vec<EnumCount>> {
        let rows = equipment::Entity::find()
            .select_only()
            .column(equipment::Column::Availability)
            .column_as(equipment::Column::Id.count(), "count")
            .group_by(equipment::Column::Availability)
            .into_tuple::<(bool, i64)>()
            .all(&self.database)
            .await?;
        Ok(fill_bool_counts(rows))
    }

    async fn labor_overview(&self) -> ResultEngine<LaborOverview> {
        let db = &self.database;
        let by_status =
            grouped_counts::<LaborStatus, _, _>(db, labor::Entity::find(), labor::Column::Status)
                .await?;
        let by_worker_type = grouped_counts::<WorkerType, _, _>(
            db,
            labor::Entity::find(),
            labor::Column::WorkerType,
        )
        .await?;
        let rows: Vec<(f64, f64, f64)> = labor::Entity::find()
            .select_only()
            .column(labor::Column::HourlyRate)
            .column(labor::Column::HoursWorked)
            .column(labor::Column::TotalCost)
            .into_tuple()
            .all(db)
            .await?;

        let total_hours: f64 = rows.iter().map(|(_, hours, _)| cost::amount(*hours)).sum();
        let total_cost: f64 = rows.iter().map(|(_, _, total)| cost::amount(*total)).sum();
        let rate_sum: f64 = rows.iter().map(|(rate, _, _)| cost::amount(*rate)).sum();
        let average_hourly_rate = if rows.is_empty() {
            0.0
        } else {
            rate_sum / rows.len() as f64
        };

        Ok(LaborOverview {
            by_status,
            by_worker_type,
            total_hours,
            total_cost,
            average_hourly_rate,
        })
    }

    async fn material_overview(&self) -> ResultEngine<MaterialOverview> {
        let rows: Vec<(f64, f64, f64)> = materials::Entity::find()
            .select_only()
            .column(materials::Column::UnitCost)
            .column(materials::Column::QuantityRequired)
            .column(materials::Column::QuantityUsed)
            .into_tuple()
            .all(&self.database)
            .await?;

        let mut overview = MaterialOverview::default();
        for (unit_cost, required, used) in rows {
            overview.total_required += cost::amount(required);
            overview.total_used += cost::amount(used);
            overview.total_cost += cost::material_cost(unit_cost, required);
            overview.total_spent += cost::material_cost(unit_cost, used);
        }
        overview.utilization_percent =
            fixed2(bounded_percent(overview.total_used, overview.total_required));
        Ok(overview)
    }

    /// Daily rental cost and count of the equipment not assigned to a task.
    async fn equipment_summary(&self) -> ResultEngine<EquipmentSummary> {
        let rates: Vec<Option<f64>> = equipment::Entity::find()
            .select_only()
            .column(equipment::Column::RentalCostPerDay)
            .filter(equipment::Column::Availability.eq(true))
            .into_tuple()
            .all(&self.database)
            .await?;
        Ok(EquipmentSummary {
            total_daily_rental_cost: rates.iter().map(|rate| cost::amount(*rate)).sum(),
            available_equipment: rates.len() as u64,
        })
    }

    async fn projects_at_risk(
        &self,
        filter: &DashboardFilter,
        today: NaiveDate,
    ) -> ResultEngine<u64> {
        let count = projects::Entity::find()
            .apply_project_scope(filter)
            .filter(projects::Column::EndDate.lt(today))
            .filter(
                projects::Column::Status.is_in(ProjectStatus::iter().filter(|s| s.is_open())),
            )
            .count(&self.database)
            .await?;
        Ok(count)
    }

    async fn recent_progress_updates(&self) -> ResultEngine<Vec<RecentProgressUpdate>> {
        let rows = progress_updates::Entity::find()
            .find_also_related(tasks::Entity)
            .order_by_desc(progress_updates::Column::CreatedAt)
            .limit(RECENT_LIMIT)
            .all(&self.database)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(update, task)| RecentProgressUpdate {
                id: update.id,
                task_id: update.task_id,
                task_name: task.map(|t| t.name),
                description: update.description,
                progress_percent: update.progress_percent,
                date: update.date,
                created_at: update.created_at,
            })
            .collect())
    }

    async fn top_engineers(&self, filter: &DashboardFilter) -> ResultEngine<Vec<TopEngineer>> {
        let db = &self.database;
        let counts: Vec<(Uuid, i64)> = projects::Entity::find()
            .apply_project_scope(filter)
            .select_only()
            .column(projects::Column::EngineerInCharge)
            .column_as(projects::Column::Id.count(), "count")
            .group_by(projects::Column::EngineerInCharge)
            .into_tuple()
            .all(db)
            .await?;
        if counts.is_empty() {
            return Ok(Vec::new());
        }
        let admins = admins::Entity::find()
            .filter(admins::Column::Id.is_in(counts.iter().map(|(id, _)| *id)))
            .all(db)
            .await?;
        Ok(rank_engineers(counts, admins))
    }

    async fn first_admins(&self) -> ResultEngine<Vec<TopEngineer>> {
        let admins = admins::Entity::find()
            .order_by_asc(admins::Column::CreatedAt)
            .limit(TOP_ENGINEERS as u64)
            .all(&self.database)
            .await?;
        Ok(admins
            .into_iter()
            .map(|admin| TopEngineer {
                id: admin.id,
                name: admin.name,
                email: admin.email,
                project_count: None,
            })
            .collect())
    }
}

/// Width of the buckets of a timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimelineGrouping {
    #[default]
    Day,
    Week,
    Month,
}

impl TimelineGrouping {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Bucket label of `date`: `YYYY-MM-DD`, `YYYY-WW` or `YYYY-MM`.
    ///
    /// Weeks are counted from January 1st: days 1 to 7 are week `01`.
    pub fn bucket(self, date: NaiveDate) -> String {
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Week => format!("{}-{:02}", date.year(), date.ordinal0() / 7 + 1),
            Self::Month => date.format("%Y-%m").to_string(),
        }
    }
}

impl FromStr for TimelineGrouping {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(EngineError::Validation(
                "groupBy must be one of: day, week, month".to_string(),
            )),
        }
    }
}

/// Inclusive date range of a timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimelineQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub grouping: TimelineGrouping,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimelinePoint {
    pub bucket: String,
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
}

/// Counts per bucket, in chronological order. Empty buckets are omitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelineBucket {
    pub query: TimelineQuery,
    pub points: Vec<TimelinePoint>,
    pub total: u64,
}

impl TimelineBucket {
    fn collect<S: ActiveEnum<Value = String>>(
        query: TimelineQuery,
        rows: impl IntoIterator<Item = (NaiveDate, S)>,
    ) -> Self {
        let mut points: BTreeMap<String, TimelinePoint> = BTreeMap::new();
        for (date, status) in rows {
            let bucket = query.grouping.bucket(date);
            let point = points.entry(bucket.clone()).or_insert_with(|| TimelinePoint {
                bucket,
                ..TimelinePoint::default()
            });
            point.total += 1;
            *point.by_status.entry(status.to_value()).or_default() += 1;
        }
        let points: Vec<TimelinePoint> = points.into_values().collect();
        Self {
            query,
            total: points.iter().map(|p| p.total).sum(),
            points,
        }
    }
}

impl Engine {
    /// Projects bucketed by start date.
    pub async fn projects_by_date(&self, query: TimelineQuery) -> ResultEngine<TimelineBucket> {
        validate_range(Some(query.start_date), Some(query.end_date))?;
        let rows: Vec<(NaiveDate, ProjectStatus)> = projects::Entity::find()
            .select_only()
            .column(projects::Column::StartDate)
            .column(projects::Column::Status)
            .filter(projects::Column::StartDate.gte(query.start_date))
            .filter(projects::Column::StartDate.lte(query.end_date))
            .into_tuple()
            .all(&self.database)
            .await?;
        Ok(TimelineBucket::collect(query, rows))
    }

    /// Tasks bucketed by creation day (UTC).
    pub async fn tasks_by_date(&self, query: TimelineQuery) -> ResultEngine<TimelineBucket> {
        validate_range(Some(query.start_date), Some(query.end_date))?;
        let rows: Vec<(DateTime<Utc>, TaskStatus)> = tasks::Entity::find()
            .select_only()
            .column(tasks::Column::CreatedAt)
            .column(tasks::Column::Status)
            .filter(tasks::Column::CreatedAt.gte(day_start(query.start_date)))
            .filter(tasks::Column::CreatedAt.lt(day_end(query.end_date)))
            .into_tuple()
            .all(&self.database)
            .await?;
        Ok(TimelineBucket::collect(
            query,
            rows.into_iter()
                .map(|(created_at, status)| (created_at.date_naive(), status)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn admin(name: &str) -> admins::Model {
        admins::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@site.test", name.to_lowercase()),
            role: "engineer".to_string(),
            phone: None,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn week_buckets_count_from_january_first() {
        assert_eq!(TimelineGrouping::Week.bucket(date(2026, 1, 1)), "2026-01");
        assert_eq!(TimelineGrouping::Week.bucket(date(2026, 1, 7)), "2026-01");
        assert_eq!(TimelineGrouping::Week.bucket(date(2026, 1, 8)), "2026-02");
        assert_eq!(TimelineGrouping::Week.bucket(date(2026, 12, 31)), "2026-53");
    }

    #[test]
    fn day_and_month_buckets() {
        assert_eq!(TimelineGrouping::Day.bucket(date(2026, 3, 4)), "2026-03-04");
        assert_eq!(TimelineGrouping::Month.bucket(date(2026, 3, 4)), "2026-03");
    }

    #[test]
    fn unknown_grouping_is_rejected() {
        assert!("year".parse::<TimelineGrouping>().is_err());
        assert_eq!(
            "month".parse::<TimelineGrouping>().unwrap(),
            TimelineGrouping::Month
        );
    }

    #[test]
    fn timeline_points_are_split_by_status() {
        let query = TimelineQuery {
            start_date: date(2026, 1, 1),
            end_date: date(2026, 2, 28),
            grouping: TimelineGrouping::Month,
        };
        let timeline = TimelineBucket::collect(
            query,
            vec![
                (date(2026, 2, 3), TaskStatus::Pending),
                (date(2026, 1, 9), TaskStatus::Completed),
                (date(2026, 1, 20), TaskStatus::Completed),
            ],
        );
        assert_eq!(timeline.total, 3);
        assert_eq!(timeline.points.len(), 2);
        assert_eq!(timeline.points[0].bucket, "2026-01");
        assert_eq!(timeline.points[0].by_status["completed"], 2);
        assert_eq!(timeline.points[1].by_status["pending"], 1);
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert!(validate_range(Some(date(2026, 2, 1)), Some(date(2026, 1, 1))).is_err());
        assert!(validate_range(Some(date(2026, 1, 1)), Some(date(2026, 1, 1))).is_ok());
        assert!(validate_range(None, Some(date(2026, 1, 1))).is_ok());
    }

    #[test]
    fn end_date_covers_the_whole_day() {
        let end = date(2026, 5, 10);
        assert_eq!(day_end(end), day_start(date(2026, 5, 11)));
    }

    #[test]
    fn engineers_rank_by_count_then_name() {
        let (ann, bob, cid, dan) = (admin("Ann"), admin("Bob"), admin("Cid"), admin("Dan"));
        let counts = vec![(bob.id, 2), (ann.id, 2), (cid.id, 5), (dan.id, 0)];
        let ranked = rank_engineers(counts, vec![dan, cid, bob, ann]);
        let names: Vec<&str> = ranked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Cid", "Ann", "Bob"]);
        assert_eq!(ranked[0].project_count, Some(5));
    }
}
