//! Dashboard API endpoints.
//!
//! Counts and monetary figures are rendered as strings, money fixed to two
//! decimals.

use api_types::dashboard::{
    Budget, CategoryTotal, Counts, DashboardQuery, DashboardStats, Equipment, Labor, Materials,
    Overview, Performance, ProgressRange, ProjectBudget, ProjectResources, RecentIssue,
    RecentProgressUpdate, RecentProject, RecentTask, Timeline, TimelinePoint, TimelineQuery,
    TopEngineer,
};
use axum::extract::{Query, State};
use engine::{EnumCount, TimelineGrouping, money::fixed2};

use crate::{Reply, ok, parse, server::ServerState};

fn counts(values: Vec<EnumCount>) -> Counts {
    values
        .into_iter()
        .map(|c| (c.key, c.count.to_string()))
        .collect()
}

pub async fn stats(
    State(state): State<ServerState>,
    Query(query): Query<DashboardQuery>,
) -> Reply<DashboardStats> {
    let stats = state
        .engine
        .dashboard_stats(engine::DashboardFilter {
            start_date: query.start_date,
            end_date: query.end_date,
            project_id: query.project_id,
            engineer_id: query.engineer_id,
        })
        .await?;

    let overview = stats.overview;
    let budget = stats.budget;
    let labor = stats.labor;
    let materials = stats.materials;
    let performance = stats.performance;

    ok(DashboardStats {
        overview: Overview {
            total_projects: overview.total_projects.to_string(),
            total_tasks: overview.total_tasks.to_string(),
            total_users: overview.total_users.to_string(),
            total_admins: overview.total_admins.to_string(),
            total_materials: overview.total_materials.to_string(),
            total_equipment: overview.total_equipment.to_string(),
            total_labor: overview.total_labor.to_string(),
            total_issues: overview.total_issues.to_string(),
            total_documents: overview.total_documents.to_string(),
            active_admins: overview.active_admins.to_string(),
            overdue_tasks: overview.overdue_tasks.to_string(),
        },
        projects_by_status: counts(stats.projects_by_status),
        projects_by_type: counts(stats.projects_by_type),
        project_progress: ProgressRange {
            average: fixed2(stats.project_progress.average),
            min: stats.project_progress.min,
            max: stats.project_progress.max,
        },
        recent_projects: stats
            .recent_projects
            .into_iter()
            .map(|p| RecentProject {
                id: p.id,
                name: p.name,
                status: p.status.to_string(),
                created_at: p.created_at,
                engineer_name: p.engineer_name,
                engineer_email: p.engineer_email,
            })
            .collect(),
        project_resources: stats
            .project_resources
            .into_iter()
            .map(|r| ProjectResources {
                project_id: r.project_id,
                name: r.name,
                materials: r.materials.to_string(),
                labor: r.labor.to_string(),
                equipment: r.equipment.to_string(),
            })
            .collect(),
        tasks_by_status: counts(stats.tasks_by_status),
        recent_tasks: stats
            .recent_tasks
            .into_iter()
            .map(|t| RecentTask {
                id: t.id,
                name: t.name,
                status: t.status.to_string(),
                progress_percent: t.progress_percent,
                created_at: t.created_at,
                project_name: t.project_name,
            })
            .collect(),
        budget: Budget {
            total_budgeted: fixed2(budget.total_budgeted),
            total_actual: fixed2(budget.total_actual),
            variance: fixed2(budget.variance),
            utilization_percent: budget.utilization_percent,
            by_category: budget
                .by_category
                .into_iter()
                .map(|c| CategoryTotal {
                    category: c.category,
                    budget_type: c.budget_type.to_string(),
                    total: fixed2(c.total),
                })
                .collect(),
            project_budgets: budget
                .project_budgets
                .into_iter()
                .map(|p| ProjectBudget {
                    project_id: p.project_id,
                    name: p.name,
                    budget_estimate: p.budget_estimate.map(fixed2),
                    actual_cost: p.actual_cost.map(fixed2),
                    budget_remaining: p.budget_remaining.map(fixed2),
                })
                .collect(),
        },
        issues_by_status: counts(stats.issues_by_status),
        recent_issues: stats
            .recent_issues
            .into_iter()
            .map(|i| RecentIssue {
                id: i.id,
                description: i.description,
                status: i.status.to_string(),
                created_at: i.created_at,
                project_name: i.project_name,
            })
            .collect(),
        labor: Labor {
            by_status: counts(labor.by_status),
            by_worker_type: counts(labor.by_worker_type),
            total_hours: fixed2(labor.total_hours),
            total_cost: fixed2(labor.total_cost),
            average_hourly_rate: fixed2(labor.average_hourly_rate),
        },
        materials: Materials {
            total_required: fixed2(materials.total_required),
            total_used: fixed2(materials.total_used),
            utilization_percent: materials.utilization_percent,
            total_cost: fixed2(materials.total_cost),
            total_spent: fixed2(materials.total_spent),
        },
        equipment: Equipment {
            by_availability: counts(stats.equipment_by_availability),
            total_daily_rental_cost: fixed2(stats.equipment.total_daily_rental_cost),
            available_equipment: stats.equipment.available_equipment.to_string(),
        },
        performance: Performance {
            task_completion_rate: performance.task_completion_rate,
            completed_tasks: performance.completed_tasks.to_string(),
            in_progress_tasks: performance.in_progress_tasks.to_string(),
            projects_at_risk: performance.projects_at_risk.to_string(),
        },
        recent_progress_updates: stats
            .recent_progress_updates
            .into_iter()
            .map(|u| RecentProgressUpdate {
                id: u.id,
                task_id: u.task_id,
                task_name: u.task_name,
                description: u.description,
                progress_percent: u.progress_percent,
                date: u.date,
                created_at: u.created_at,
            })
            .collect(),
        documents_by_type: counts(stats.documents_by_type),
        top_engineers: stats
            .top_engineers
            .into_iter()
            .map(|e| TopEngineer {
                id: e.id,
                name: e.name,
                email: e.email,
                project_count: e.project_count.map(|count| count.to_string()),
            })
            .collect(),
    })
}

fn timeline_query(query: &TimelineQuery) -> Result<engine::TimelineQuery, crate::ServerError> {
    let grouping: Option<TimelineGrouping> = parse(query.group_by.as_deref())?;
    Ok(engine::TimelineQuery {
        start_date: query.start_date,
        end_date: query.end_date,
        grouping: grouping.unwrap_or_default(),
    })
}

fn timeline(bucket: engine::TimelineBucket) -> Timeline {
    Timeline {
        start_date: bucket.query.start_date,
        end_date: bucket.query.end_date,
        group_by: bucket.query.grouping.as_str().to_string(),
        points: bucket
            .points
            .into_iter()
            .map(|p| TimelinePoint {
                date: p.bucket,
                total: p.total,
                by_status: p.by_status,
            })
            .collect(),
        total: bucket.total,
    }
}

pub async fn projects_by_date(
    State(state): State<ServerState>,
    Query(query): Query<TimelineQuery>,
) -> Reply<Timeline> {
    let bucket = state
        .engine
        .projects_by_date(timeline_query(&query)?)
        .await?;
    ok(timeline(bucket))
}

pub async fn tasks_by_date(
    State(state): State<ServerState>,
    Query(query): Query<TimelineQuery>,
) -> Reply<Timeline> {
    let bucket = state.engine.tasks_by_date(timeline_query(&query)?).await?;
    ok(timeline(bucket))
}
