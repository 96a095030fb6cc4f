use sea_orm::{
    ActiveEnum, ConnectionTrait, Iterable, QueryFilter, QueryOrder, QuerySelect, Select, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, EnumCount, ResultEngine, admins, budgets, equipment, fill_enum_counts, labor,
    materials, projects, tasks,
};

use super::Engine;

/// Generates a `require_*` method loading a row by id or failing with
/// `NotFound`.
macro_rules! impl_require {
    ($require_fn:ident, $module:ident, $label:literal) => {
        pub(super) async fn $require_fn<C: ConnectionTrait>(
            &self,
            db: &C,
            id: Uuid,
        ) -> ResultEngine<$module::Model> {
            $module::Entity::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| EngineError::not_found($label))
        }
    };
}

impl Engine {
    impl_require!(require_admin, admins, "admin");
    impl_require!(require_project, projects, "project");
    impl_require!(require_task, tasks, "task");
    impl_require!(require_material, materials, "material");
    impl_require!(require_equipment, equipment, "equipment");
    impl_require!(require_labor, labor, "labor");
    impl_require!(require_budget_entry, budgets, "budget entry");

    /// Ids of every task of a project, in creation order.
    pub(super) async fn project_task_ids<C: ConnectionTrait>(
        &self,
        db: &C,
        project_id: Uuid,
    ) -> ResultEngine<Vec<Uuid>> {
        let ids = tasks::Entity::find()
            .select_only()
            .column(tasks::Column::Id)
            .filter(tasks::Column::ProjectId.eq(project_id))
            .order_by_asc(tasks::Column::CreatedAt)
            .into_tuple::<Uuid>()
            .all(db)
            .await?;
        Ok(ids)
    }
}

/// Counts the rows of `query` per value of the enum stored in `column`,
/// listing every value of `E`.
pub(super) async fn grouped_counts<E, Q, C>(
    db: &C,
    query: Select<Q>,
    column: Q::Column,
) -> ResultEngine<Vec<EnumCount>>
where
    E: ActiveEnum<Value = String> + Iterable,
    Q: EntityTrait,
    C: ConnectionTrait,
{
    let rows = query
        .select_only()
        .column(column)
        .column_as(column.count(), "count")
        .group_by(column)
        .into_tuple::<(String, i64)>()
        .all(db)
        .await?;
    Ok(fill_enum_counts::<E>(rows))
}
