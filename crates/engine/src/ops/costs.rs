use std::collections::{BTreeMap, HashMap};

use sea_orm::{ConnectionTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{
    LaborCostSummary, MaterialUsageSummary, ProjectBudgetSummary, ResultEngine, TaskBudgetSummary,
    TaskCostSummary, budgets, equipment, labor, materials,
    rollup::{BudgetSplit, ResourceIndex, by_category},
    tasks,
};

use super::Engine;

/// A resource of a task together with what it is expected to cost.
#[derive(Clone, Debug, PartialEq)]
pub struct EstimatedResource<T> {
    pub item: T,
    pub estimated_cost: f64,
}

/// Resources a budget entry of a task can be derived from.
#[derive(Clone, Debug, PartialEq)]
pub struct AvailableResources {
    pub task_id: Uuid,
    pub materials: Vec<EstimatedResource<materials::Model>>,
    pub equipment: Vec<EstimatedResource<equipment::Model>>,
    pub labor: Vec<EstimatedResource<labor::Model>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectResourceCounts {
    pub project_id: Uuid,
    pub name: String,
    pub materials: u64,
    pub labor: u64,
    pub equipment: u64,
}

fn count_map(rows: Vec<(Uuid, i64)>) -> HashMap<Uuid, u64> {
    rows.into_iter()
        .map(|(id, count)| (id, u64::try_from(count).unwrap_or(0)))
        .collect()
}

impl Engine {
    pub(super) async fn task_budget_entries<C: ConnectionTrait>(
        &self,
        db: &C,
        task_ids: Vec<Uuid>,
    ) -> ResultEngine<Vec<budgets::Model>> {
        let entries = budgets::Entity::find()
            .filter(budgets::Column::TaskId.is_in(task_ids))
            .order_by_asc(budgets::Column::Date)
            .order_by_asc(budgets::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(entries)
    }

    /// Loads the resources referenced by `entries` so they can be shown next
    /// to the entry.
    pub(super) async fn resource_index<C: ConnectionTrait>(
        &self,
        db: &C,
        entries: &[budgets::Model],
    ) -> ResultEngine<ResourceIndex> {
        let material_ids: Vec<Uuid> = entries.iter().filter_map(|e| e.material_id).collect();
        let equipment_ids: Vec<Uuid> = entries.iter().filter_map(|e| e.equipment_id).collect();
        let labor_ids: Vec<Uuid> = entries.iter().filter_map(|e| e.labor_id).collect();

        let mut index = ResourceIndex::default();
        if !material_ids.is_empty() {
            index.materials = materials::Entity::find()
                .filter(materials::Column::Id.is_in(material_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|m| (m.id, m))
                .collect();
        }
        if !equipment_ids.is_empty() {
            index.equipment = equipment::Entity::find()
                .filter(equipment::Column::Id.is_in(equipment_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|e| (e.id, e))
                .collect();
        }
        if !labor_ids.is_empty() {
            index.labor = labor::Entity::find()
                .filter(labor::Column::Id.is_in(labor_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|l| (l.id, l))
                .collect();
        }
        Ok(index)
    }

    /// Rolls up materials, assigned equipment, labor and budget entries of a
    /// task.
    pub async fn task_cost(&self, task_id: Uuid) -> ResultEngine<TaskCostSummary> {
        let db = &self.database;
        self.require_task(db, task_id).await?;

        let materials = materials::Entity::find()
            .filter(materials::Column::TaskId.eq(task_id))
            .all(db)
            .await?;
        let equipment = equipment::Entity::find()
            .filter(equipment::Column::AssignedTaskId.eq(task_id))
            .all(db)
            .await?;
        let labor = labor::Entity::find()
            .filter(labor::Column::TaskId.eq(task_id))
            .all(db)
            .await?;
        let budgets = self.task_budget_entries(db, vec![task_id]).await?;

        Ok(TaskCostSummary::compute(
            task_id, &materials, &equipment, &labor, &budgets,
        ))
    }

    pub async fn task_budget_summary(&self, task_id: Uuid) -> ResultEngine<TaskBudgetSummary> {
        let db = &self.database;
        self.require_task(db, task_id).await?;

        let entries = self.task_budget_entries(db, vec![task_id]).await?;
        let index = self.resource_index(db, &entries).await?;
        Ok(TaskBudgetSummary {
            task_id,
            totals: BudgetSplit::from_entries(&entries),
            by_category: by_category(&entries),
            entries: index.lines(entries),
        })
    }

    /// Budget rollup over every task of a project.
    pub async fn project_budget_summary(
        &self,
        project_id: Uuid,
    ) -> ResultEngine<ProjectBudgetSummary> {
        let db = &self.database;
        self.require_project(db, project_id).await?;

        let task_ids = self.project_task_ids(db, project_id).await?;
        let entries = self.task_budget_entries(db, task_ids).await?;
        Ok(ProjectBudgetSummary::compute(project_id, &entries))
    }

    pub async fn labor_cost_summary(&self, task_id: Uuid) -> ResultEngine<LaborCostSummary> {
        let db = &self.database;
        self.require_task(db, task_id).await?;

        let labor = labor::Entity::find()
            .filter(labor::Column::TaskId.eq(task_id))
            .order_by_asc(labor::Column::WorkerName)
            .all(db)
            .await?;
        Ok(LaborCostSummary::compute(task_id, &labor))
    }

    pub async fn material_usage_summary(
        &self,
        project_id: Uuid,
    ) -> ResultEngine<MaterialUsageSummary> {
        let db = &self.database;
        self.require_project(db, project_id).await?;

        let task_ids = self.project_task_ids(db, project_id).await?;
        let materials = materials::Entity::find()
            .filter(materials::Column::TaskId.is_in(task_ids))
            .order_by_asc(materials::Column::Name)
            .all(db)
            .await?;
        Ok(MaterialUsageSummary::compute(project_id, materials))
    }

    /// Lists the resources of a task with their estimated cost. Materials are
    /// priced on the full requirement.
    pub async fn available_resources(&self, task_id: Uuid) -> ResultEngine<AvailableResources> {
        let db = &self.database;
        self.require_task(db, task_id).await?;

        let materials = materials::Entity::find()
            .filter(materials::Column::TaskId.eq(task_id))
            .order_by_asc(materials::Column::Name)
            .all(db)
            .await?;
        let equipment = equipment::Entity::find()
            .filter(equipment::Column::AssignedTaskId.eq(task_id))
            .order_by_asc(equipment::Column::Name)
            .all(db)
            .await?;
        let labor = labor::Entity::find()
            .filter(labor::Column::TaskId.eq(task_id))
            .order_by_asc(labor::Column::WorkerName)
            .all(db)
            .await?;

        Ok(AvailableResources {
            task_id,
            materials: materials
                .into_iter()
                .map(|item| EstimatedResource {
                    estimated_cost: item.estimated_cost(),
                    item,
                })
                .collect(),
            equipment: equipment
                .into_iter()
                .map(|item| EstimatedResource {
                    estimated_cost: item.rental_cost(),
                    item,
                })
                .collect(),
            labor: labor
                .into_iter()
                .map(|item| EstimatedResource {
                    estimated_cost: item.estimated_cost(),
                    item,
                })
                .collect(),
        })
    }

    /// Resource counts joined through tasks for the given `(id, name)`
    /// projects, keeping their order.
    pub(super) async fn resource_counts<C: ConnectionTrait>(
        &self,
        db: &C,
        projects: Vec<(Uuid, String)>,
    ) -> ResultEngine<Vec<ProjectResourceCounts>> {
        let ids: Vec<Uuid> = projects.iter().map(|(id, _)| *id).collect();

        let materials = materials::Entity::find()
            .select_only()
            .column(tasks::Column::ProjectId)
            .column_as(materials::Column::Id.count(), "count")
            .join(JoinType::InnerJoin, materials::Relation::Task.def())
            .filter(tasks::Column::ProjectId.is_in(ids.clone()))
            .group_by(tasks::Column::ProjectId)
            .into_tuple::<(Uuid, i64)>()
            .all(db)
            .await?;
        let labor = labor::Entity::find()
            .select_only()
            .column(tasks::Column::ProjectId)
            .column_as(labor::Column::Id.count(), "count")
            .join(JoinType::InnerJoin, labor::Relation::Task.def())
            .filter(tasks::Column::ProjectId.is_in(ids.clone()))
            .group_by(tasks::Column::ProjectId)
            .into_tuple::<(Uuid, i64)>()
            .all(db)
            .await?;
        let equipment = equipment::Entity::find()
            .select_only()
            .column(tasks::Column::ProjectId)
            .column_as(equipment::Column::Id.count(), "count")
            .join(JoinType::InnerJoin, equipment::Relation::Task.def())
            .filter(tasks::Column::ProjectId.is_in(ids))
            .group_by(tasks::Column::ProjectId)
            .into_tuple::<(Uuid, i64)>()
            .all(db)
            .await?;

        let (materials, labor, equipment) =
            (count_map(materials), count_map(labor), count_map(equipment));
        let counts = projects
            .into_iter()
            .map(|(project_id, name)| ProjectResourceCounts {
                materials: materials.get(&project_id).copied().unwrap_or(0),
                labor: labor.get(&project_id).copied().unwrap_or(0),
                equipment: equipment.get(&project_id).copied().unwrap_or(0),
                project_id,
                name,
            })
            .collect();
        Ok(counts)
    }
}

/// Index entries by task, keeping the load order inside each task.
pub(super) fn entries_by_task(
    entries: Vec<budgets::Model>,
) -> BTreeMap<Uuid, Vec<budgets::Model>> {
    let mut out: BTreeMap<Uuid, Vec<budgets::Model>> = BTreeMap::new();
    for entry in entries {
        out.entry(entry.task_id).or_default().push(entry);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_map_drops_negative_counts() {
        let id = Uuid::new_v4();
        let map = count_map(vec![(id, -3)]);
        assert_eq!(map[&id], 0);
    }
}
