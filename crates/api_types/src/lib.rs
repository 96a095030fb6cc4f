use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of every response.
///
/// Successful calls carry `data`; failed calls carry `error` and a
/// human-readable `message`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }
}

impl Envelope<()> {
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error: Some(error.into()),
        }
    }
}

/// A number sent either as a JSON number or as a numeric string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// The value as `f64`, `None` when the text is not a finite number.
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            Self::Number(number) => *number,
            Self::Text(text) => text.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Budgeted and actual totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetSplit {
    pub budgeted: f64,
    pub actual: f64,
}

pub mod project {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectNew {
        pub name: String,
        pub description: Option<String>,
        pub location_name: Option<String>,
        /// Defaults to `planning`.
        pub status: Option<String>,
        pub construction_type: String,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
        pub budget_estimate: Option<Numeric>,
        pub actual_cost: Option<Numeric>,
        /// ISO currency code, `KES` when absent.
        pub currency: Option<String>,
        pub contractor_name: Option<String>,
        pub client_name: Option<String>,
        pub engineer_in_charge: Uuid,
        pub progress_percent: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub location_name: Option<String>,
        pub status: String,
        pub construction_type: String,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
        pub budget_estimate: Option<f64>,
        pub actual_cost: Option<f64>,
        pub currency: String,
        pub contractor_name: Option<String>,
        pub client_name: Option<String>,
        pub engineer_in_charge: Uuid,
        pub progress_percent: i32,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectBudgetSummary {
        pub project_id: Uuid,
        pub totals: BudgetSplit,
        pub variance: f64,
        pub variance_percentage: i64,
        pub category_breakdown: BTreeMap<String, BudgetSplit>,
        pub total_entries: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TaskCounts {
        pub total: u64,
        pub completed: u64,
        pub in_progress: u64,
        pub pending: u64,
        pub completion_rate: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetFigures {
        pub estimated: Option<f64>,
        pub budgeted: f64,
        pub actual: f64,
        pub variance: f64,
        pub variance_percentage: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IssueCounts {
        pub total: u64,
        pub open: u64,
        pub resolved: u64,
        pub in_review: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectStats {
        pub project_id: Uuid,
        pub tasks: TaskCounts,
        pub budget: BudgetFigures,
        pub issues: IssueCounts,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MaterialUsage {
        pub material: super::resource::MaterialView,
        pub remaining: f64,
        pub usage_percentage: i64,
        pub actual_cost: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MaterialUsageSummary {
        pub project_id: Uuid,
        pub materials: Vec<MaterialUsage>,
        pub total_cost: f64,
        pub total_materials: u64,
    }
}

pub mod task {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TaskNew {
        pub project_id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub start_date: NaiveDate,
        pub due_date: NaiveDate,
        /// Defaults to `pending`.
        pub status: Option<String>,
        pub progress_percent: Option<i32>,
        pub assigned_to_admin: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TaskView {
        pub id: Uuid,
        pub project_id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub start_date: NaiveDate,
        pub due_date: NaiveDate,
        pub status: String,
        pub progress_percent: i32,
        pub assigned_to_admin: Uuid,
        pub created_at: DateTime<Utc>,
    }

    /// Rows removed (or released) along with a task.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TaskDeleted {
        pub task_id: Uuid,
        pub budgets: u64,
        pub labor: u64,
        pub materials: u64,
        pub progress_updates: u64,
        pub released_equipment: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ResourceCost {
        pub cost: f64,
        pub count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LaborCost {
        pub actual_cost: f64,
        pub required_cost: f64,
        pub actual_workers: u64,
        pub required_workers: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CostTotals {
        pub estimated: f64,
        pub actual: f64,
        pub variance: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TaskCost {
        pub task_id: Uuid,
        pub materials: ResourceCost,
        pub equipment: ResourceCost,
        pub labor: LaborCost,
        pub budget: BudgetSplit,
        pub total: CostTotals,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TaskBudget {
        pub task_id: Uuid,
        pub totals: BudgetSplit,
        pub by_category: BTreeMap<String, BudgetSplit>,
        pub entries: Vec<super::budget::BudgetLine>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Estimated<T> {
        #[serde(flatten)]
        pub item: T,
        pub estimated_cost: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AvailableResources {
        pub task_id: Uuid,
        pub materials: Vec<Estimated<super::resource::MaterialView>>,
        pub equipment: Vec<Estimated<super::resource::EquipmentView>>,
        pub labor: Vec<Estimated<super::resource::LaborView>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WorkerTypeCost {
        pub worker_type: String,
        pub workers: u64,
        pub hours: f64,
        pub cost: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LaborCostSummary {
        pub task_id: Uuid,
        pub total_workers: u64,
        pub total_cost: f64,
        pub total_hours: f64,
        pub average_hourly_rate: f64,
        pub by_worker_type: Vec<WorkerTypeCost>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub task_id: Uuid,
        pub category: String,
        pub budget_type: String,
        pub date: Option<NaiveDate>,
        /// `manual` or `resource_based`; defaults to `manual`.
        pub entry_type: Option<String>,
        pub quantity: Option<Numeric>,
        pub amount: Option<Numeric>,
        pub material_id: Option<Uuid>,
        pub equipment_id: Option<Uuid>,
        pub labor_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub task_id: Option<Uuid>,
        pub category: Option<String>,
        pub amount: Option<Numeric>,
        pub budget_type: Option<String>,
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub task_id: Uuid,
        pub category: String,
        pub amount: f64,
        pub budget_type: String,
        pub date: NaiveDate,
        pub entry_type: String,
        pub material_id: Option<Uuid>,
        pub equipment_id: Option<Uuid>,
        pub labor_id: Option<Uuid>,
        pub calculated_amount: Option<f64>,
        pub quantity: Option<f64>,
        pub created_at: DateTime<Utc>,
    }

    /// Display form of the resource a budget entry was derived from.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(tag = "resource_type", rename_all = "snake_case")]
    pub enum ResourceDetails {
        Material {
            id: Uuid,
            name: String,
            unit: String,
            unit_cost: f64,
        },
        Equipment {
            id: Uuid,
            name: String,
            equipment_type: String,
            rental_cost_per_day: Option<f64>,
        },
        Labor {
            id: Uuid,
            worker_name: String,
            worker_type: String,
            hourly_rate: f64,
            hours_worked: f64,
        },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetLine {
        #[serde(flatten)]
        pub budget: BudgetView,
        pub resource_details: Option<ResourceDetails>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetCreated {
        pub budget: BudgetView,
        pub resource_details: Option<ResourceDetails>,
    }
}

pub mod resource {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MaterialNew {
        pub task_id: Uuid,
        pub name: String,
        pub unit: String,
        pub unit_cost: Numeric,
        pub quantity_required: Numeric,
        pub quantity_used: Option<Numeric>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MaterialUpdate {
        pub name: Option<String>,
        pub unit: Option<String>,
        pub unit_cost: Option<Numeric>,
        pub quantity_required: Option<Numeric>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MaterialUsageUpdate {
        pub quantity_used: Numeric,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MaterialView {
        pub id: Uuid,
        pub task_id: Uuid,
        pub name: String,
        pub unit: String,
        pub unit_cost: f64,
        pub quantity_required: f64,
        pub quantity_used: f64,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EquipmentNew {
        pub name: String,
        #[serde(rename = "type")]
        pub equipment_type: String,
        pub rental_cost_per_day: Option<Numeric>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EquipmentUpdate {
        pub name: Option<String>,
        #[serde(rename = "type")]
        pub equipment_type: Option<String>,
        pub rental_cost_per_day: Option<Numeric>,
        pub days_used: Option<Numeric>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EquipmentAssign {
        pub task_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EquipmentView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub equipment_type: String,
        pub availability: bool,
        pub rental_cost_per_day: Option<f64>,
        pub assigned_task_id: Option<Uuid>,
        pub days_used: f64,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LaborNew {
        pub task_id: Uuid,
        pub worker_name: String,
        pub worker_type: String,
        pub hourly_rate: Numeric,
        pub hours_worked: Option<Numeric>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub status: Option<String>,
        pub phone: Option<String>,
        #[serde(default)]
        pub is_requirement: bool,
        pub required_quantity: Option<i32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LaborUpdate {
        pub worker_name: Option<String>,
        pub worker_type: Option<String>,
        pub hourly_rate: Option<Numeric>,
        pub hours_worked: Option<Numeric>,
        pub end_date: Option<NaiveDate>,
        pub status: Option<String>,
        pub phone: Option<String>,
        pub required_quantity: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LaborView {
        pub id: Uuid,
        pub task_id: Uuid,
        pub worker_name: String,
        pub worker_type: String,
        pub hourly_rate: f64,
        pub hours_worked: f64,
        pub total_cost: f64,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub status: String,
        pub phone: Option<String>,
        pub is_requirement: bool,
        pub required_quantity: Option<i32>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardQuery {
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub project_id: Option<Uuid>,
        pub engineer_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TimelineQuery {
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        /// `day`, `week` or `month`; defaults to `day`.
        pub group_by: Option<String>,
    }

    /// Counts are rendered as strings, keyed by enum value.
    pub type Counts = BTreeMap<String, String>;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Overview {
        pub total_projects: String,
        pub total_tasks: String,
        pub total_users: String,
        pub total_admins: String,
        pub total_materials: String,
        pub total_equipment: String,
        pub total_labor: String,
        pub total_issues: String,
        pub total_documents: String,
        pub active_admins: String,
        pub overdue_tasks: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProgressRange {
        pub average: String,
        pub min: i32,
        pub max: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecentProject {
        pub id: Uuid,
        pub name: String,
        pub status: String,
        pub created_at: DateTime<Utc>,
        pub engineer_name: Option<String>,
        pub engineer_email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectResources {
        pub project_id: Uuid,
        pub name: String,
        pub materials: String,
        pub labor: String,
        pub equipment: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecentTask {
        pub id: Uuid,
        pub name: String,
        pub status: String,
        pub progress_percent: i32,
        pub created_at: DateTime<Utc>,
        pub project_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecentIssue {
        pub id: Uuid,
        pub description: String,
        pub status: String,
        pub created_at: DateTime<Utc>,
        pub project_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecentProgressUpdate {
        pub id: Uuid,
        pub task_id: Uuid,
        pub task_name: Option<String>,
        pub description: String,
        pub progress_percent: i32,
        pub date: NaiveDate,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotal {
        pub category: String,
        pub budget_type: String,
        pub total: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectBudget {
        pub project_id: Uuid,
        pub name: String,
        pub budget_estimate: Option<String>,
        pub actual_cost: Option<String>,
        pub budget_remaining: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Budget {
        pub total_budgeted: String,
        pub total_actual: String,
        pub variance: String,
        pub utilization_percent: String,
        pub by_category: Vec<CategoryTotal>,
        pub project_budgets: Vec<ProjectBudget>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Labor {
        pub by_status: Counts,
        pub by_worker_type: Counts,
        pub total_hours: String,
        pub total_cost: String,
        pub average_hourly_rate: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Materials {
        pub total_required: String,
        pub total_used: String,
        pub utilization_percent: String,
        pub total_cost: String,
        pub total_spent: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Equipment {
        pub by_availability: Counts,
        pub total_daily_rental_cost: String,
        pub available_equipment: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Performance {
        pub task_completion_rate: String,
        pub completed_tasks: String,
        pub in_progress_tasks: String,
        pub projects_at_risk: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TopEngineer {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub project_count: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardStats {
        pub overview: Overview,
        pub projects_by_status: Counts,
        pub projects_by_type: Counts,
        pub project_progress: ProgressRange,
        pub recent_projects: Vec<RecentProject>,
        pub project_resources: Vec<ProjectResources>,
        pub tasks_by_status: Counts,
        pub recent_tasks: Vec<RecentTask>,
        pub budget: Budget,
        pub issues_by_status: Counts,
        pub recent_issues: Vec<RecentIssue>,
        pub labor: Labor,
        pub materials: Materials,
        pub equipment: Equipment,
        pub performance: Performance,
        pub recent_progress_updates: Vec<RecentProgressUpdate>,
        pub documents_by_type: Counts,
        pub top_engineers: Vec<TopEngineer>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TimelinePoint {
        pub date: String,
        pub total: u64,
        pub by_status: BTreeMap<String, u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Timeline {
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub group_by: String,
        pub points: Vec<TimelinePoint>,
        pub total: u64,
    }
}

pub mod quotation {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QuotationQuery {
        /// `budgeted`, `actual` or `both`; defaults to `both`.
        pub quotation_type: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Engineer {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Summary {
        pub total_budgeted: f64,
        pub total_actual: f64,
        pub total_variance: f64,
        pub total_variance_percentage: f64,
        pub category_breakdown: BTreeMap<String, BudgetSplit>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TaskQuotation {
        pub task: super::task::TaskView,
        pub budgeted: f64,
        pub actual: f64,
        pub variance: f64,
        pub variance_percentage: f64,
        pub lines: Vec<super::budget::BudgetLine>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Quotation {
        pub quotation_type: String,
        pub project: super::project::ProjectView,
        pub engineer: Option<Engineer>,
        pub summary: Summary,
        pub tasks: Vec<TaskQuotation>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_accepts_numbers_and_strings() {
        let values: Vec<Numeric> = serde_json::from_str(r#"[12.5, "7.25", " 3 ", "abc"]"#).unwrap();
        let parsed: Vec<Option<f64>> = values.iter().map(Numeric::value).collect();
        assert_eq!(parsed, [Some(12.5), Some(7.25), Some(3.0), None]);
    }

    #[test]
    fn failure_envelope_omits_data() {
        let body = serde_json::to_value(Envelope::failure("task not found", "Not Found")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "message": "task not found",
                "error": "Not Found",
            })
        );
    }

    #[test]
    fn dashboard_query_uses_camel_case() {
        let query: dashboard::DashboardQuery =
            serde_json::from_str(r#"{"startDate":"2026-01-01","engineerId":null}"#).unwrap();
        assert_eq!(query.start_date, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert!(query.engineer_id.is_none());
    }
}
