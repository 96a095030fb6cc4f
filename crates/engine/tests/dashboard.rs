use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, Database, DatabaseConnection};

use engine::{
    BudgetEntryInput, BudgetType, ConstructionType, DashboardFilter, Engine, EngineError,
    EntryType, EnumCount, EquipmentInput, IssueStatus, MaterialInput, ProjectInput, ProjectStatus,
    QuotationType, TaskInput, TaskStatus, TimelineGrouping, TimelineQuery, admins, issues,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn add_admin(db: &DatabaseConnection, name: &str, logged_in_days_ago: Option<i64>) -> Uuid {
    let id = Uuid::new_v4();
    admins::ActiveModel {
        id: ActiveValue::Set(id),
        name: ActiveValue::Set(name.to_string()),
        email: ActiveValue::Set(format!("{}@site.test", name.to_lowercase())),
        role: ActiveValue::Set("engineer".to_string()),
        phone: ActiveValue::Set(None),
        is_active: ActiveValue::Set(true),
        last_login: ActiveValue::Set(logged_in_days_ago.map(|d| Utc::now() - Duration::days(d))),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap();
    id
}

async fn add_issue(db: &DatabaseConnection, project_id: Uuid, status: IssueStatus) {
    issues::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        name: ActiveValue::Set("Site neighbour".to_string()),
        email: ActiveValue::Set("neighbour@site.test".to_string()),
        description: ActiveValue::Set("Dust on the access road".to_string()),
        category: ActiveValue::Set("environment".to_string()),
        project_id: ActiveValue::Set(Some(project_id)),
        status: ActiveValue::Set(status),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap();
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn project_input(name: &str, engineer: Uuid) -> ProjectInput {
    ProjectInput {
        name: name.to_string(),
        description: None,
        location_name: None,
        status: Some(ProjectStatus::InProgress),
        construction_type: ConstructionType::Infrastructure,
        start_date: date(2026, 2, 1),
        end_date: None,
        budget_estimate: Some(10_000.0),
        actual_cost: Some(2_500.0),
        currency: None,
        contractor_name: None,
        client_name: None,
        engineer_in_charge: engineer,
        progress_percent: Some(40),
    }
}

fn task_input(project_id: Uuid, admin: Uuid, name: &str, status: TaskStatus) -> TaskInput {
    TaskInput {
        project_id,
        name: name.to_string(),
        description: None,
        start_date: date(2026, 2, 1),
        due_date: date(2099, 3, 1),
        status: Some(status),
        progress_percent: None,
        assigned_to_admin: admin,
    }
}

fn entry(task_id: Uuid, category: &str, budget_type: BudgetType, amount: f64) -> BudgetEntryInput {
    BudgetEntryInput {
        task_id,
        category: category.to_string(),
        budget_type,
        date: None,
        entry_type: EntryType::Manual,
        quantity: None,
        amount: Some(amount),
        material_id: None,
        equipment_id: None,
        labor_id: None,
    }
}

fn keys(counts: &[EnumCount]) -> Vec<&str> {
    counts.iter().map(|c| c.key.as_str()).collect()
}

#[tokio::test]
async fn empty_store_lists_every_enum_value() {
    let (engine, _db) = engine_with_db().await;

    let stats = engine
        .dashboard_stats(DashboardFilter::default())
        .await
        .unwrap();

    assert_eq!(stats.overview.total_projects, 0);
    assert_eq!(
        keys(&stats.projects_by_status),
        ["planning", "in_progress", "completed", "on_hold", "cancelled"]
    );
    assert_eq!(stats.projects_by_type.len(), 5);
    assert_eq!(keys(&stats.tasks_by_status), ["pending", "in_progress", "completed"]);
    assert_eq!(keys(&stats.issues_by_status), ["open", "resolved", "in_review"]);
    assert_eq!(keys(&stats.equipment_by_availability), ["true", "false"]);
    assert_eq!(stats.labor.by_status.len(), 3);
    assert_eq!(stats.labor.by_worker_type.len(), 5);
    assert_eq!(stats.documents_by_type.len(), 6);
    assert!(
        stats
            .projects_by_status
            .iter()
            .chain(&stats.tasks_by_status)
            .chain(&stats.documents_by_type)
            .all(|c| c.count == 0)
    );

    assert_eq!(stats.budget.utilization_percent, "0.00");
    assert_eq!(stats.materials.utilization_percent, "0.00");
    assert_eq!(stats.performance.task_completion_rate, "0.00");
    assert!(stats.top_engineers.is_empty());
    assert!(stats.recent_projects.is_empty());
}

#[tokio::test]
async fn dashboard_rolls_up_the_portfolio() {
    let (engine, db) = engine_with_db().await;
    let amina = add_admin(&db, "Amina", Some(2)).await;
    let brian = add_admin(&db, "Brian", Some(30)).await;

    let bridge = engine
        .create_project(project_input("Bridge", amina))
        .await
        .unwrap();
    let depot = engine
        .create_project(project_input("Depot", amina))
        .await
        .unwrap();
    let school = engine
        .create_project(ProjectInput {
            status: Some(ProjectStatus::Planning),
            construction_type: ConstructionType::Building,
            start_date: date(2020, 1, 1),
            end_date: Some(date(2020, 6, 1)),
            ..project_input("School", brian)
        })
        .await
        .unwrap();

    let deck = engine
        .create_task(task_input(bridge.id, amina, "Deck", TaskStatus::Completed))
        .await
        .unwrap();
    engine
        .create_task(TaskInput {
            start_date: date(2020, 1, 1),
            due_date: date(2020, 2, 1),
            ..task_input(school.id, brian, "Survey", TaskStatus::InProgress)
        })
        .await
        .unwrap();
    engine
        .create_task(task_input(depot.id, amina, "Slab", TaskStatus::Pending))
        .await
        .unwrap();

    engine
        .create_material(MaterialInput {
            task_id: deck.id,
            name: "Steel".to_string(),
            unit: "t".to_string(),
            unit_cost: 100.0,
            quantity_required: 10.0,
            quantity_used: Some(4.0),
        })
        .await
        .unwrap();
    engine
        .create_equipment(EquipmentInput {
            name: "Crane".to_string(),
            equipment_type: "lifting".to_string(),
            rental_cost_per_day: Some(250.0),
        })
        .await
        .unwrap();
    engine
        .create_budget_entry(entry(deck.id, "Materials", BudgetType::Budgeted, 1000.0))
        .await
        .unwrap();
    engine
        .create_budget_entry(entry(deck.id, "Materials", BudgetType::Actual, 1200.0))
        .await
        .unwrap();
    add_issue(&db, bridge.id, IssueStatus::Open).await;

    let stats = engine
        .dashboard_stats(DashboardFilter::default())
        .await
        .unwrap();

    assert_eq!(stats.overview.total_projects, 3);
    assert_eq!(stats.overview.total_tasks, 3);
    assert_eq!(stats.overview.total_admins, 2);
    assert_eq!(stats.overview.active_admins, 1);
    assert_eq!(stats.overview.overdue_tasks, 1);
    assert_eq!(stats.overview.total_issues, 1);

    let in_progress = &stats.projects_by_status[1];
    assert_eq!((in_progress.key.as_str(), in_progress.count), ("in_progress", 2));

    assert_eq!(stats.budget.total_budgeted, 1000.0);
    assert_eq!(stats.budget.total_actual, 1200.0);
    assert_eq!(stats.budget.variance, 200.0);
    assert_eq!(stats.budget.utilization_percent, "120.00");
    assert_eq!(stats.budget.project_budgets.len(), 3);
    assert_eq!(stats.budget.project_budgets[0].budget_remaining, Some(7_500.0));

    assert_eq!(stats.materials.utilization_percent, "40.00");
    assert_eq!(stats.materials.total_cost, 1000.0);
    assert_eq!(stats.materials.total_spent, 400.0);
    assert_eq!(stats.equipment.available_equipment, 1);
    assert_eq!(stats.equipment.total_daily_rental_cost, 250.0);

    assert_eq!(stats.performance.task_completion_rate, "33.33");
    assert_eq!(stats.performance.completed_tasks, 1);
    assert_eq!(stats.performance.projects_at_risk, 1);

    assert_eq!(stats.top_engineers.len(), 2);
    assert_eq!(stats.top_engineers[0].name, "Amina");
    assert_eq!(stats.top_engineers[0].project_count, Some(2));

    let bridge_resources = stats
        .project_resources
        .iter()
        .find(|r| r.project_id == bridge.id)
        .unwrap();
    assert_eq!(bridge_resources.materials, 1);
    let depot_resources = stats
        .project_resources
        .iter()
        .find(|r| r.project_id == depot.id)
        .unwrap();
    assert_eq!(
        (depot_resources.materials, depot_resources.labor, depot_resources.equipment),
        (0, 0, 0)
    );

    let scoped = engine
        .dashboard_stats(DashboardFilter {
            engineer_id: Some(brian),
            ..DashboardFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(scoped.overview.total_projects, 1);
    assert_eq!(scoped.projects_by_status[0].count, 1);
    assert_eq!(scoped.top_engineers.len(), 1);
    assert_eq!(scoped.top_engineers[0].name, "Brian");
}

#[tokio::test]
async fn dashboard_date_range_is_inclusive_and_ordered() {
    let (engine, db) = engine_with_db().await;
    let amina = add_admin(&db, "Amina", None).await;
    engine
        .create_project(project_input("Bridge", amina))
        .await
        .unwrap();

    let today = Utc::now().date_naive();
    let stats = engine
        .dashboard_stats(DashboardFilter {
            start_date: Some(today),
            end_date: Some(today),
            ..DashboardFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(stats.overview.total_projects, 1);

    let err = engine
        .dashboard_stats(DashboardFilter {
            start_date: Some(today),
            end_date: Some(today - Duration::days(1)),
            ..DashboardFilter::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn project_stats_combine_tasks_budget_and_issues() {
    let (engine, db) = engine_with_db().await;
    let amina = add_admin(&db, "Amina", None).await;
    let project = engine
        .create_project(project_input("Bridge", amina))
        .await
        .unwrap();

    let empty = engine.project_stats(project.id).await.unwrap();
    assert_eq!(empty.tasks.completion_rate, 0);
    assert_eq!(empty.budget.variance_percentage, 0);

    let done = engine
        .create_task(task_input(project.id, amina, "Piers", TaskStatus::Completed))
        .await
        .unwrap();
    for name in ["Deck", "Railings"] {
        engine
            .create_task(task_input(project.id, amina, name, TaskStatus::Pending))
            .await
            .unwrap();
    }
    engine
        .create_budget_entry(entry(done.id, "Labor", BudgetType::Budgeted, 800.0))
        .await
        .unwrap();
    engine
        .create_budget_entry(entry(done.id, "Labor", BudgetType::Actual, 600.0))
        .await
        .unwrap();
    add_issue(&db, project.id, IssueStatus::Open).await;
    add_issue(&db, project.id, IssueStatus::Resolved).await;

    let stats = engine.project_stats(project.id).await.unwrap();
    assert_eq!(stats.tasks.total, 3);
    assert_eq!(stats.tasks.completed, 1);
    assert_eq!(stats.tasks.pending, 2);
    assert_eq!(stats.tasks.completion_rate, 33);
    assert_eq!(stats.budget.estimated, Some(10_000.0));
    assert_eq!(stats.budget.variance, -200.0);
    assert_eq!(stats.budget.variance_percentage, -25);
    assert_eq!(stats.issues.total, 2);
    assert_eq!(stats.issues.open, 1);
    assert_eq!(stats.issues.resolved, 1);
}

#[tokio::test]
async fn quotation_masks_the_hidden_side() {
    let (engine, db) = engine_with_db().await;
    let amina = add_admin(&db, "Amina", None).await;
    let project = engine
        .create_project(project_input("Bridge", amina))
        .await
        .unwrap();
    let piers = engine
        .create_task(task_input(project.id, amina, "Piers", TaskStatus::Pending))
        .await
        .unwrap();
    let deck = engine
        .create_task(task_input(project.id, amina, "Deck", TaskStatus::Pending))
        .await
        .unwrap();
    engine
        .create_budget_entry(entry(piers.id, "Materials", BudgetType::Budgeted, 1000.0))
        .await
        .unwrap();
    engine
        .create_budget_entry(entry(piers.id, "Materials", BudgetType::Actual, 1200.0))
        .await
        .unwrap();
    engine
        .create_budget_entry(entry(deck.id, "Labor", BudgetType::Budgeted, 300.0))
        .await
        .unwrap();

    let both = engine
        .compose_quotation(project.id, QuotationType::Both)
        .await
        .unwrap();
    assert_eq!(both.engineer.as_ref().map(|e| e.name.as_str()), Some("Amina"));
    assert_eq!(both.summary.totals.budgeted, 1300.0);
    assert_eq!(both.summary.totals.actual, 1200.0);
    assert_eq!(both.summary.total_variance, -100.0);
    let task_names: Vec<&str> = both.tasks.iter().map(|t| t.task.name.as_str()).collect();
    assert_eq!(task_names, ["Deck", "Piers"]);
    assert_eq!(both.tasks[1].lines.len(), 2);

    let budgeted = engine
        .compose_quotation(project.id, QuotationType::Budgeted)
        .await
        .unwrap();
    assert_eq!(budgeted.summary.totals.actual, 0.0);
    assert_eq!(budgeted.summary.category_breakdown["Materials"].actual, 0.0);
    assert!(budgeted.tasks.iter().all(|t| t.budget.actual == 0.0));

    assert_eq!(
        engine
            .compose_quotation(Uuid::new_v4(), QuotationType::Both)
            .await
            .unwrap_err(),
        EngineError::NotFound("project not found".to_string())
    );
}

#[tokio::test]
async fn timelines_bucket_by_date_and_status() {
    let (engine, db) = engine_with_db().await;
    let amina = add_admin(&db, "Amina", None).await;
    for (name, start, status) in [
        ("Bridge", date(2026, 1, 3), ProjectStatus::Planning),
        ("Depot", date(2026, 1, 28), ProjectStatus::InProgress),
        ("School", date(2026, 2, 14), ProjectStatus::Planning),
        ("Clinic", date(2026, 4, 1), ProjectStatus::Planning),
    ] {
        engine
            .create_project(ProjectInput {
                start_date: start,
                status: Some(status),
                ..project_input(name, amina)
            })
            .await
            .unwrap();
    }

    let timeline = engine
        .projects_by_date(TimelineQuery {
            start_date: date(2026, 1, 1),
            end_date: date(2026, 2, 14),
            grouping: TimelineGrouping::Month,
        })
        .await
        .unwrap();
    assert_eq!(timeline.total, 3);
    assert_eq!(timeline.points.len(), 2);
    assert_eq!(timeline.points[0].bucket, "2026-01");
    assert_eq!(timeline.points[0].by_status["planning"], 1);
    assert_eq!(timeline.points[0].by_status["in_progress"], 1);

    let today = Utc::now().date_naive();
    let project = engine
        .create_project(project_input("Harbour", amina))
        .await
        .unwrap();
    engine
        .create_task(task_input(project.id, amina, "Dredging", TaskStatus::Pending))
        .await
        .unwrap();
    let tasks = engine
        .tasks_by_date(TimelineQuery {
            start_date: today,
            end_date: today,
            grouping: TimelineGrouping::Day,
        })
        .await
        .unwrap();
    assert_eq!(tasks.total, 1);
    assert_eq!(tasks.points[0].bucket, today.format("%Y-%m-%d").to_string());
}

#[tokio::test]
async fn resource_counts_default_to_zero() {
    let (engine, db) = engine_with_db().await;
    let amina = add_admin(&db, "Amina", None).await;
    let project = engine
        .create_project(project_input("Bridge", amina))
        .await
        .unwrap();

    let stats = engine
        .dashboard_stats(DashboardFilter::default())
        .await
        .unwrap();
    let counts = &stats.project_resources;
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].project_id, project.id);
    assert_eq!((counts[0].materials, counts[0].labor, counts[0].equipment), (0, 0, 0));
}

async fn drop_table(db: &DatabaseConnection, table: &str) {
    db.execute_unprepared("PRAGMA foreign_keys = OFF")
        .await
        .unwrap();
    db.execute_unprepared(&format!("DROP TABLE {table}"))
        .await
        .unwrap();
}

#[tokio::test]
async fn broken_section_falls_back_to_its_default() {
    let (engine, db) = engine_with_db().await;
    let amina = add_admin(&db, "Amina", None).await;
    engine
        .create_project(project_input("Bridge", amina))
        .await
        .unwrap();

    drop_table(&db, "documents").await;

    let stats = engine
        .dashboard_stats(DashboardFilter::default())
        .await
        .unwrap();
    assert_eq!(
        keys(&stats.documents_by_type),
        [
            "project_document",
            "company_document",
            "template",
            "policy",
            "contract",
            "other"
        ]
    );
    assert!(stats.documents_by_type.iter().all(|c| c.count == 0));
    assert_eq!(stats.overview.total_documents, 0);
    assert_eq!(stats.overview.total_projects, 1);
    assert_eq!(stats.overview.total_admins, 1);
    let by_status: u64 = stats.projects_by_status.iter().map(|c| c.count).sum();
    assert_eq!(by_status, stats.overview.total_projects);
}

#[tokio::test]
async fn failed_ranking_lists_admins_without_counts() {
    let (engine, db) = engine_with_db().await;
    let amina = add_admin(&db, "Amina", None).await;
    let brian = add_admin(&db, "Brian", None).await;
    engine
        .create_project(project_input("Bridge", amina))
        .await
        .unwrap();

    drop_table(&db, "projects").await;

    let stats = engine
        .dashboard_stats(DashboardFilter::default())
        .await
        .unwrap();
    assert_eq!(stats.overview.total_projects, 0);
    assert_eq!(stats.overview.total_admins, 2);
    assert!(stats.projects_by_status.iter().all(|c| c.count == 0));

    let mut ids: Vec<Uuid> = stats.top_engineers.iter().map(|e| e.id).collect();
    ids.sort();
    let mut expected = vec![amina, brian];
    expected.sort();
    assert_eq!(ids, expected);
    assert!(
        stats
            .top_engineers
            .iter()
            .all(|e| e.project_count.is_none())
    );
}
