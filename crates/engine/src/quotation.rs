//! Quotation composition.
//!
//! A quotation is the budget picture of a project prepared for a client. The
//! quotation type decides which side of the budget is shown; the hidden side
//! is reported as `0` everywhere (totals, task rows and categories).
//! Rendering the quotation to a document happens outside the engine.

use std::{collections::BTreeMap, str::FromStr};

use crate::{
    EngineError, admins,
    money::variance_percentage_cents,
    projects,
    rollup::{BudgetLine, BudgetSplit},
    tasks,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuotationType {
    Budgeted,
    Actual,
    #[default]
    Both,
}

impl QuotationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Budgeted => "budgeted",
            Self::Actual => "actual",
            Self::Both => "both",
        }
    }

    /// Zeroes the side of `split` this quotation does not show.
    pub fn mask(self, split: BudgetSplit) -> BudgetSplit {
        match self {
            Self::Budgeted => BudgetSplit {
                actual: 0.0,
                ..split
            },
            Self::Actual => BudgetSplit {
                budgeted: 0.0,
                ..split
            },
            Self::Both => split,
        }
    }
}

impl FromStr for QuotationType {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "budgeted" => Ok(Self::Budgeted),
            "actual" => Ok(Self::Actual),
            "both" => Ok(Self::Both),
            other => Err(EngineError::Validation(format!(
                "invalid quotation type: {other}"
            ))),
        }
    }
}

/// One task row of the quotation.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskQuotation {
    pub task: tasks::Model,
    pub budget: BudgetSplit,
    pub variance: f64,
    pub variance_percentage: f64,
    pub lines: Vec<BudgetLine>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuotationSummary {
    pub totals: BudgetSplit,
    pub total_variance: f64,
    pub total_variance_percentage: f64,
    pub category_breakdown: BTreeMap<String, BudgetSplit>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Quotation {
    pub quotation_type: QuotationType,
    pub project: projects::Model,
    pub engineer: Option<admins::Model>,
    pub summary: QuotationSummary,
    pub tasks: Vec<TaskQuotation>,
}

impl Quotation {
    pub fn compose(
        project: projects::Model,
        engineer: Option<admins::Model>,
        tasks: Vec<(tasks::Model, Vec<BudgetLine>)>,
        quotation_type: QuotationType,
    ) -> Self {
        let mut totals = BudgetSplit::default();
        let mut category_breakdown: BTreeMap<String, BudgetSplit> = BTreeMap::new();
        let mut rows = Vec::with_capacity(tasks.len());

        for (task, lines) in tasks {
            let budget = quotation_type
                .mask(BudgetSplit::from_entries(lines.iter().map(|line| &line.entry)));
            totals.budgeted += budget.budgeted;
            totals.actual += budget.actual;

            for line in &lines {
                let category = category_breakdown
                    .entry(line.entry.category.clone())
                    .or_default();
                let mut single = BudgetSplit::default();
                single.record(line.entry.budget_type, line.entry.amount);
                let single = quotation_type.mask(single);
                category.budgeted += single.budgeted;
                category.actual += single.actual;
            }

            rows.push(TaskQuotation {
                task,
                variance: budget.variance(),
                variance_percentage: variance_percentage_cents(budget.actual, budget.budgeted),
                budget,
                lines,
            });
        }

        Self {
            quotation_type,
            project,
            engineer,
            summary: QuotationSummary {
                totals,
                total_variance: totals.variance(),
                total_variance_percentage: variance_percentage_cents(
                    totals.actual,
                    totals.budgeted,
                ),
                category_breakdown,
            },
            tasks: rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::{BudgetType, ConstructionType, EntryType, ProjectStatus, TaskStatus, budgets};

    fn project() -> projects::Model {
        let now = Utc::now();
        projects::Model {
            id: Uuid::new_v4(),
            name: "Riverside Flats".to_string(),
            description: None,
            location_name: Some("Nairobi".to_string()),
            status: ProjectStatus::InProgress,
            construction_type: ConstructionType::Building,
            start_date: now.date_naive(),
            end_date: None,
            budget_estimate: Some(50_000.0),
            actual_cost: None,
            currency: "KES".to_string(),
            contractor_name: None,
            client_name: Some("Acme".to_string()),
            engineer_in_charge: Uuid::new_v4(),
            progress_percent: 10,
            created_at: now,
            updated_at: now,
        }
    }

    fn task(name: &str) -> tasks::Model {
        let now = Utc::now();
        tasks::Model {
            id: Uuid::new_v4(),
            project_id: Uuid::nil(),
            name: name.to_string(),
            description: None,
            start_date: now.date_naive(),
            due_date: now.date_naive(),
            status: TaskStatus::Pending,
            progress_percent: 0,
            assigned_to_admin: Uuid::nil(),
            created_at: now,
            updated_at: now,
        }
    }

    fn line(category: &str, kind: BudgetType, amount: f64) -> BudgetLine {
        BudgetLine {
            entry: budgets::Model {
                id: Uuid::new_v4(),
                task_id: Uuid::nil(),
                category: category.to_string(),
                amount,
                budget_type: kind,
                date: NaiveDate::default(),
                entry_type: EntryType::Manual,
                material_id: None,
                equipment_id: None,
                labor_id: None,
                calculated_amount: None,
                quantity: None,
                created_at: Utc::now(),
            },
            resource: None,
        }
    }

    fn sample() -> Vec<(tasks::Model, Vec<BudgetLine>)> {
        vec![
            (
                task("Foundation"),
                vec![
                    line("Materials", BudgetType::Budgeted, 1000.0),
                    line("Materials", BudgetType::Actual, 1200.0),
                ],
            ),
            (
                task("Roofing"),
                vec![
                    line("Labor", BudgetType::Budgeted, 300.0),
                    line("Labor", BudgetType::Actual, 200.0),
                ],
            ),
        ]
    }

    #[test]
    fn both_shows_both_sides() {
        let quotation = Quotation::compose(project(), None, sample(), QuotationType::Both);
        assert_eq!(quotation.summary.totals.budgeted, 1300.0);
        assert_eq!(quotation.summary.totals.actual, 1400.0);
        assert_eq!(quotation.summary.total_variance, 100.0);
        assert_eq!(quotation.summary.total_variance_percentage, 7.69);
        assert_eq!(quotation.tasks[0].variance_percentage, 20.0);
        assert_eq!(quotation.tasks[1].variance_percentage, -33.33);
    }

    #[test]
    fn budgeted_hides_actual_everywhere() {
        let quotation = Quotation::compose(project(), None, sample(), QuotationType::Budgeted);
        assert_eq!(quotation.summary.totals.actual, 0.0);
        assert_eq!(quotation.summary.totals.budgeted, 1300.0);
        assert!(quotation.tasks.iter().all(|t| t.budget.actual == 0.0));
        assert!(
            quotation
                .summary
                .category_breakdown
                .values()
                .all(|c| c.actual == 0.0)
        );
        assert_eq!(quotation.summary.total_variance, -1300.0);
    }

    #[test]
    fn actual_hides_budgeted_and_variance_percentage() {
        let quotation = Quotation::compose(project(), None, sample(), QuotationType::Actual);
        assert_eq!(quotation.summary.totals.budgeted, 0.0);
        assert_eq!(quotation.summary.totals.actual, 1400.0);
        assert_eq!(quotation.summary.total_variance_percentage, 0.0);
        assert_eq!(quotation.summary.category_breakdown["Labor"].actual, 200.0);
    }

    #[test]
    fn quotation_type_parsing() {
        assert_eq!("both".parse::<QuotationType>().unwrap(), QuotationType::Both);
        assert!("everything".parse::<QuotationType>().is_err());
    }
}
