use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{Quotation, QuotationType, ResultEngine, admins, tasks};

use super::{Engine, costs::entries_by_task};

impl Engine {
    /// Builds the quotation of a project. Tasks come in schedule order; each
    /// carries its budget lines with the referenced resource for display.
    pub async fn compose_quotation(
        &self,
        project_id: Uuid,
        quotation_type: QuotationType,
    ) -> ResultEngine<Quotation> {
        let db = &self.database;
        let project = self.require_project(db, project_id).await?;
        let engineer = admins::Entity::find_by_id(project.engineer_in_charge)
            .one(db)
            .await?;

        let tasks = tasks::Entity::find()
            .filter(tasks::Column::ProjectId.eq(project_id))
            .order_by_asc(tasks::Column::StartDate)
            .order_by_asc(tasks::Column::Name)
            .all(db)
            .await?;
        let task_ids = tasks.iter().map(|t| t.id).collect();
        let entries = self.task_budget_entries(db, task_ids).await?;
        let index = self.resource_index(db, &entries).await?;
        let mut by_task = entries_by_task(entries);

        let rows = tasks
            .into_iter()
            .map(|task| {
                let lines = index.lines(by_task.remove(&task.id).unwrap_or_default());
                (task, lines)
            })
            .collect();

        tracing::debug!(
            %project_id,
            quotation_type = quotation_type.as_str(),
            "composing quotation"
        );
        Ok(Quotation::compose(project, engineer, rows, quotation_type))
    }
}
