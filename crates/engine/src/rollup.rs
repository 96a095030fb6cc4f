//! Cost rollups.
//!
//! Everything here folds rows that were already loaded; nothing is cached or
//! written back. The `Engine` methods in `ops` load the rows and call into
//! these functions, so the figures always reflect the current store.

use std::collections::BTreeMap;

use sea_orm::Iterable;
use uuid::Uuid;

use crate::{
    BudgetType, WorkerType, budgets, cost, equipment, labor, materials,
    money::{percent_of, variance_percentage},
};

/// Budgeted and actual sides of a set of budget entries.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BudgetSplit {
    pub budgeted: f64,
    pub actual: f64,
}

impl BudgetSplit {
    pub fn record(&mut self, kind: BudgetType, amount: f64) {
        let amount = cost::amount(amount);
        match kind {
            BudgetType::Budgeted => self.budgeted += amount,
            BudgetType::Actual => self.actual += amount,
        }
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a budgets::Model>) -> Self {
        let mut split = Self::default();
        for entry in entries {
            split.record(entry.budget_type, entry.amount);
        }
        split
    }

    /// `actual − budgeted`.
    pub fn variance(&self) -> f64 {
        self.actual - self.budgeted
    }

    pub fn variance_percentage(&self) -> i64 {
        variance_percentage(self.actual, self.budgeted)
    }

    pub fn total(&self) -> f64 {
        self.budgeted + self.actual
    }
}

/// Groups entries by their free-form category.
pub fn by_category<'a>(
    entries: impl IntoIterator<Item = &'a budgets::Model>,
) -> BTreeMap<String, BudgetSplit> {
    let mut out: BTreeMap<String, BudgetSplit> = BTreeMap::new();
    for entry in entries {
        out.entry(entry.category.clone())
            .or_default()
            .record(entry.budget_type, entry.amount);
    }
    out
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResourceCost {
    pub cost: f64,
    pub count: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LaborCost {
    /// Cost of workers on site.
    pub actual_cost: f64,
    /// Planned cost of labor requirements.
    pub required_cost: f64,
    pub actual_workers: u64,
    /// Sum of the head counts of all requirements.
    pub required_workers: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CostTotals {
    pub estimated: f64,
    pub actual: f64,
    pub variance: f64,
}

/// Full cost picture of one task.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskCostSummary {
    pub task_id: Uuid,
    pub materials: ResourceCost,
    pub equipment: ResourceCost,
    pub labor: LaborCost,
    pub budget: BudgetSplit,
    pub total: CostTotals,
}

impl TaskCostSummary {
    /// Material and equipment cost count on both sides: the estimate has no
    /// separate source for them.
    pub fn compute(
        task_id: Uuid,
        materials: &[materials::Model],
        equipment: &[equipment::Model],
        labor: &[labor::Model],
        budgets: &[budgets::Model],
    ) -> Self {
        let materials = ResourceCost {
            cost: materials.iter().map(materials::Model::actual_cost).sum(),
            count: materials.len() as u64,
        };
        let equipment = ResourceCost {
            cost: equipment.iter().map(equipment::Model::rental_cost).sum(),
            count: equipment.len() as u64,
        };

        let mut labor_cost = LaborCost::default();
        for worker in labor {
            if worker.is_requirement {
                labor_cost.required_cost += worker.required_cost();
                labor_cost.required_workers += cost::required_headcount(worker.required_quantity);
            } else {
                labor_cost.actual_cost += cost::amount(worker.total_cost);
                labor_cost.actual_workers += 1;
            }
        }

        let budget = BudgetSplit::from_entries(budgets);
        let estimated =
            materials.cost + equipment.cost + labor_cost.required_cost + budget.budgeted;
        let actual = materials.cost + equipment.cost + labor_cost.actual_cost + budget.actual;

        Self {
            task_id,
            materials,
            equipment,
            labor: labor_cost,
            budget,
            total: CostTotals {
                estimated,
                actual,
                variance: actual - estimated,
            },
        }
    }
}

/// Budget rollup over every task of a project.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectBudgetSummary {
    pub project_id: Uuid,
    pub totals: BudgetSplit,
    pub variance: f64,
    pub variance_percentage: i64,
    pub category_breakdown: BTreeMap<String, BudgetSplit>,
    pub total_entries: u64,
}

impl ProjectBudgetSummary {
    pub fn compute(project_id: Uuid, entries: &[budgets::Model]) -> Self {
        let totals = BudgetSplit::from_entries(entries);
        Self {
            project_id,
            totals,
            variance: totals.variance(),
            variance_percentage: totals.variance_percentage(),
            category_breakdown: by_category(entries),
            total_entries: entries.len() as u64,
        }
    }
}

/// Resource a budget entry points at, in display form.
#[derive(Clone, Debug, PartialEq)]
pub enum ResourceRef {
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
        worker_type: WorkerType,
        hourly_rate: f64,
        hours_worked: f64,
    },
}

impl From<&materials::Model> for ResourceRef {
    fn from(model: &materials::Model) -> Self {
        Self::Material {
            id: model.id,
            name: model.name.clone(),
            unit: model.unit.clone(),
            unit_cost: model.unit_cost,
        }
    }
}

impl From<&equipment::Model> for ResourceRef {
    fn from(model: &equipment::Model) -> Self {
        Self::Equipment {
            id: model.id,
            name: model.name.clone(),
            equipment_type: model.equipment_type.clone(),
            rental_cost_per_day: model.rental_cost_per_day,
        }
    }
}

impl From<&labor::Model> for ResourceRef {
    fn from(model: &labor::Model) -> Self {
        Self::Labor {
            id: model.id,
            worker_name: model.worker_name.clone(),
            worker_type: model.worker_type,
            hourly_rate: model.hourly_rate,
            hours_worked: model.hours_worked,
        }
    }
}

/// A budget entry together with the resource it references, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetLine {
    pub entry: budgets::Model,
    pub resource: Option<ResourceRef>,
}

/// Looks up the display form of the resources referenced by budget entries.
#[derive(Debug, Default)]
pub struct ResourceIndex {
    pub materials: BTreeMap<Uuid, materials::Model>,
    pub equipment: BTreeMap<Uuid, equipment::Model>,
    pub labor: BTreeMap<Uuid, labor::Model>,
}

impl ResourceIndex {
    pub fn resolve(&self, entry: &budgets::Model) -> Option<ResourceRef> {
        if let Some(model) = entry.material_id.and_then(|id| self.materials.get(&id)) {
            return Some(model.into());
        }
        if let Some(model) = entry.equipment_id.and_then(|id| self.equipment.get(&id)) {
            return Some(model.into());
        }
        entry
            .labor_id
            .and_then(|id| self.labor.get(&id))
            .map(Into::into)
    }

    pub fn lines(&self, entries: Vec<budgets::Model>) -> Vec<BudgetLine> {
        entries
            .into_iter()
            .map(|entry| BudgetLine {
                resource: self.resolve(&entry),
                entry,
            })
            .collect()
    }
}

/// Budget totals of one task with every entry listed.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskBudgetSummary {
    pub task_id: Uuid,
    pub totals: BudgetSplit,
    pub by_category: BTreeMap<String, BudgetSplit>,
    pub entries: Vec<BudgetLine>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorkerTypeCost {
    pub worker_type: WorkerType,
    pub workers: u64,
    pub hours: f64,
    pub cost: f64,
}

/// Labor spending of one task. Requirement rows are plans, not spending, and
/// are left out.
#[derive(Clone, Debug, PartialEq)]
pub struct LaborCostSummary {
    pub task_id: Uuid,
    pub total_workers: u64,
    pub total_cost: f64,
    pub total_hours: f64,
    pub average_hourly_rate: f64,
    pub by_worker_type: Vec<WorkerTypeCost>,
}

impl LaborCostSummary {
    pub fn compute(task_id: Uuid, labor: &[labor::Model]) -> Self {
        let workers: Vec<&labor::Model> = labor.iter().filter(|l| !l.is_requirement).collect();
        let total_cost: f64 = workers.iter().map(|l| cost::amount(l.total_cost)).sum();
        let total_hours: f64 = workers.iter().map(|l| cost::amount(l.hours_worked)).sum();
        let average_hourly_rate = if total_hours > 0.0 {
            total_cost / total_hours
        } else {
            0.0
        };

        let by_worker_type = WorkerType::iter()
            .map(|worker_type| {
                let of_type = workers.iter().filter(|l| l.worker_type == worker_type);
                let mut row = WorkerTypeCost {
                    worker_type,
                    workers: 0,
                    hours: 0.0,
                    cost: 0.0,
                };
                for worker in of_type {
                    row.workers += 1;
                    row.hours += cost::amount(worker.hours_worked);
                    row.cost += cost::amount(worker.total_cost);
                }
                row
            })
            .collect();

        Self {
            task_id,
            total_workers: workers.len() as u64,
            total_cost,
            total_hours,
            average_hourly_rate,
            by_worker_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialUsage {
    pub material: materials::Model,
    pub remaining: f64,
    /// Rounded share of the requirement already used, `0` without requirement.
    pub usage_percentage: i64,
    pub actual_cost: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialUsageSummary {
    pub project_id: Uuid,
    pub materials: Vec<MaterialUsage>,
    pub total_cost: f64,
    pub total_materials: u64,
}

impl MaterialUsageSummary {
    pub fn compute(project_id: Uuid, materials: Vec<materials::Model>) -> Self {
        let materials: Vec<MaterialUsage> = materials
            .into_iter()
            .map(|material| MaterialUsage {
                remaining: material.quantity_required - material.quantity_used,
                usage_percentage: percent_of(material.quantity_used, material.quantity_required)
                    .round() as i64,
                actual_cost: material.actual_cost(),
                material,
            })
            .collect();
        Self {
            project_id,
            total_cost: materials.iter().map(|m| m.actual_cost).sum(),
            total_materials: materials.len() as u64,
            materials,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::{EntryType, LaborStatus};

    fn material(unit_cost: f64, required: f64, used: f64) -> materials::Model {
        materials::Model {
            id: Uuid::new_v4(),
            task_id: Uuid::nil(),
            name: "Cement".to_string(),
            unit: "bag".to_string(),
            unit_cost,
            quantity_required: required,
            quantity_used: used,
            created_at: Utc::now(),
        }
    }

    fn worker(rate: f64, hours: f64, requirement: Option<i32>) -> labor::Model {
        labor::Model {
            id: Uuid::new_v4(),
            task_id: Uuid::nil(),
            worker_name: "Otieno".to_string(),
            worker_type: WorkerType::SkilledWorker,
            hourly_rate: rate,
            hours_worked: hours,
            total_cost: cost::round_cents(rate * hours),
            start_date: None,
            end_date: None,
            status: LaborStatus::Active,
            phone: None,
            is_requirement: requirement.is_some(),
            required_quantity: requirement,
            created_at: Utc::now(),
        }
    }

    fn entry(category: &str, kind: BudgetType, amount: f64) -> budgets::Model {
        budgets::Model {
            id: Uuid::new_v4(),
            task_id: Uuid::nil(),
            category: category.to_string(),
            amount,
            budget_type: kind,
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
            entry_type: EntryType::Manual,
            material_id: None,
            equipment_id: None,
            labor_id: None,
            calculated_amount: None,
            quantity: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_task_rolls_up_to_zero() {
        let summary = TaskCostSummary::compute(Uuid::nil(), &[], &[], &[], &[]);
        assert_eq!(summary.total, CostTotals::default());
        assert_eq!(summary.materials.count, 0);
        assert_eq!(summary.labor.required_workers, 0);
    }

    #[test]
    fn material_cost_counts_on_both_sides() {
        let summary =
            TaskCostSummary::compute(Uuid::nil(), &[material(10.0, 5.0, 3.0)], &[], &[], &[]);
        assert_eq!(summary.materials.cost, 30.0);
        assert_eq!(summary.total.estimated, 30.0);
        assert_eq!(summary.total.actual, 30.0);
        assert_eq!(summary.total.variance, 0.0);
    }

    #[test]
    fn requirements_only_feed_the_estimate() {
        let labor = [worker(20.0, 8.0, None), worker(15.0, 10.0, Some(3))];
        let summary = TaskCostSummary::compute(Uuid::nil(), &[], &[], &labor, &[]);
        assert_eq!(summary.labor.actual_cost, 160.0);
        assert_eq!(summary.labor.required_cost, 450.0);
        assert_eq!(summary.labor.actual_workers, 1);
        assert_eq!(summary.labor.required_workers, 3);
        assert_eq!(summary.total.estimated, 450.0);
        assert_eq!(summary.total.actual, 160.0);
        assert_eq!(summary.total.variance, -290.0);
    }

    #[test]
    fn budget_entries_split_by_type() {
        let entries = [
            entry("Materials", BudgetType::Budgeted, 1000.0),
            entry("Materials", BudgetType::Actual, 700.0),
            entry("Labor", BudgetType::Actual, 500.0),
        ];
        let summary = ProjectBudgetSummary::compute(Uuid::nil(), &entries);
        assert_eq!(summary.totals.budgeted, 1000.0);
        assert_eq!(summary.totals.actual, 1200.0);
        assert_eq!(summary.variance, 200.0);
        assert_eq!(summary.variance_percentage, 20);
        assert_eq!(summary.total_entries, 3);
        assert_eq!(summary.category_breakdown["Labor"].budgeted, 0.0);
        assert_eq!(summary.category_breakdown["Materials"].actual, 700.0);
    }

    #[test]
    fn labor_summary_skips_requirements() {
        let labor = [
            worker(20.0, 8.0, None),
            worker(30.0, 2.0, None),
            worker(99.0, 99.0, Some(2)),
        ];
        let summary = LaborCostSummary::compute(Uuid::nil(), &labor);
        assert_eq!(summary.total_workers, 2);
        assert_eq!(summary.total_cost, 220.0);
        assert_eq!(summary.total_hours, 10.0);
        assert_eq!(summary.average_hourly_rate, 22.0);
        assert_eq!(summary.by_worker_type.len(), 5);
    }

    #[test]
    fn material_usage_handles_zero_requirement() {
        let summary = MaterialUsageSummary::compute(
            Uuid::nil(),
            vec![material(10.0, 0.0, 0.0), material(2.5, 8.0, 2.0)],
        );
        assert_eq!(summary.materials[0].usage_percentage, 0);
        assert_eq!(summary.materials[1].usage_percentage, 25);
        assert_eq!(summary.materials[1].remaining, 6.0);
        assert_eq!(summary.total_cost, 5.0);
        assert_eq!(summary.total_materials, 2);
    }
}
