use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, ConnectionTrait, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    BudgetType, EngineError, EntryType, ResultEngine, ResourceRef, budgets, cost,
    util::{required_text, validate_non_negative},
};

use super::{Engine, with_tx};

/// Request to record a budget entry against a task.
///
/// For `resource_based` entries the amount is derived from exactly one of
/// `material_id`, `equipment_id` or `labor_id` and `amount` is ignored.
#[derive(Clone, Debug)]
pub struct BudgetEntryInput {
    pub task_id: Uuid,
    pub category: String,
    pub budget_type: BudgetType,
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
    pub entry_type: EntryType,
    /// Multiplier applied to the resource rate, defaults to `1`.
    pub quantity: Option<f64>,
    pub amount: Option<f64>,
    pub material_id: Option<Uuid>,
    pub equipment_id: Option<Uuid>,
    pub labor_id: Option<Uuid>,
}

/// Partial update of a budget entry. Resource references and the creation
/// snapshot cannot be changed.
#[derive(Clone, Debug, Default)]
pub struct BudgetEntryPatch {
    pub task_id: Option<Uuid>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub budget_type: Option<BudgetType>,
    pub date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreatedBudgetEntry {
    pub entry: budgets::Model,
    /// The resource the amount was taken from, if any.
    pub resource: Option<ResourceRef>,
}

#[derive(Clone, Copy, Debug)]
enum ResourceKey {
    Material(Uuid),
    Equipment(Uuid),
    Labor(Uuid),
}

fn resource_key(input: &BudgetEntryInput) -> ResultEngine<Option<ResourceKey>> {
    let keys: Vec<ResourceKey> = [
        input.material_id.map(ResourceKey::Material),
        input.equipment_id.map(ResourceKey::Equipment),
        input.labor_id.map(ResourceKey::Labor),
    ]
    .into_iter()
    .flatten()
    .collect();

    match keys.as_slice() {
        [] => Ok(None),
        [key] => Ok(Some(*key)),
        _ => Err(EngineError::Validation(
            "only one of material_id, equipment_id or labor_id may be set".to_string(),
        )),
    }
}

impl Engine {
    /// Loads the referenced resource and prices `quantity` units of it.
    async fn priced_resource<C: ConnectionTrait>(
        &self,
        db: &C,
        key: ResourceKey,
        quantity: f64,
    ) -> ResultEngine<(ResourceRef, f64)> {
        let priced = match key {
            ResourceKey::Material(id) => {
                let material = self.require_material(db, id).await?;
                let amount = cost::material_cost(material.unit_cost, quantity);
                (ResourceRef::from(&material), amount)
            }
            ResourceKey::Equipment(id) => {
                let equipment = self.require_equipment(db, id).await?;
                let amount = cost::equipment_cost(equipment.rental_cost_per_day, quantity);
                (ResourceRef::from(&equipment), amount)
            }
            ResourceKey::Labor(id) => {
                let labor = self.require_labor(db, id).await?;
                let amount = cost::labor_cost(labor.hourly_rate, labor.hours_worked, quantity);
                (ResourceRef::from(&labor), amount)
            }
        };
        Ok(priced)
    }

    /// Records a budget entry.
    ///
    /// Resource-based entries store the computed amount in both `amount` and
    /// `calculated_amount`; the value is a snapshot and is not refreshed when
    /// the resource changes later. Project and task scalar cost fields are
    /// left untouched.
    pub async fn create_budget_entry(
        &self,
        input: BudgetEntryInput,
    ) -> ResultEngine<CreatedBudgetEntry> {
        with_tx!(self, |db_tx| {
            self.require_task(&db_tx, input.task_id).await?;
            let category = required_text(&input.category, "category")?;
            let key = resource_key(&input)?;

            let (amount, calculated_amount, quantity, resource) = match input.entry_type {
                EntryType::Manual => {
                    let amount = input.amount.ok_or_else(|| {
                        EngineError::Validation(
                            "amount is required for manual entries".to_string(),
                        )
                    })?;
                    let amount = validate_non_negative(amount, "amount")?;
                    let resource = match key {
                        Some(key) => Some(self.priced_resource(&db_tx, key, 1.0).await?.0),
                        None => None,
                    };
                    (amount, None, input.quantity.unwrap_or(1.0), resource)
                }
                EntryType::ResourceBased => {
                    let key = key.ok_or_else(|| {
                        EngineError::Validation(
                            "resource-based entries need material_id, equipment_id or labor_id"
                                .to_string(),
                        )
                    })?;
                    let quantity = input.quantity.unwrap_or(1.0);
                    if !quantity.is_finite() || quantity <= 0.0 {
                        return Err(EngineError::Validation(
                            "quantity must be > 0".to_string(),
                        ));
                    }
                    let (resource, amount) =
                        self.priced_resource(&db_tx, key, quantity).await?;
                    (amount, Some(amount), quantity, Some(resource))
                }
            };

            let entry = budgets::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                task_id: ActiveValue::Set(input.task_id),
                category: ActiveValue::Set(category),
                amount: ActiveValue::Set(amount),
                budget_type: ActiveValue::Set(input.budget_type),
                date: ActiveValue::Set(input.date.unwrap_or_else(|| Utc::now().date_naive())),
                entry_type: ActiveValue::Set(input.entry_type),
                material_id: ActiveValue::Set(input.material_id),
                equipment_id: ActiveValue::Set(input.equipment_id),
                labor_id: ActiveValue::Set(input.labor_id),
                calculated_amount: ActiveValue::Set(calculated_amount),
                quantity: ActiveValue::Set(Some(quantity)),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            Ok(CreatedBudgetEntry { entry, resource })
        })
    }

    /// Applies a partial update. The stored amounts are never recomputed from
    /// the referenced resource.
    pub async fn update_budget_entry(
        &self,
        id: Uuid,
        patch: BudgetEntryPatch,
    ) -> ResultEngine<budgets::Model> {
        with_tx!(self, |db_tx| {
            let current = self.require_budget_entry(&db_tx, id).await?;
            let mut active: budgets::ActiveModel = current.into();

            if let Some(task_id) = patch.task_id {
                self.require_task(&db_tx, task_id).await?;
                active.task_id = ActiveValue::Set(task_id);
            }
            if let Some(category) = patch.category {
                active.category = ActiveValue::Set(required_text(&category, "category")?);
            }
            if let Some(amount) = patch.amount {
                active.amount = ActiveValue::Set(validate_non_negative(amount, "amount")?);
            }
            if let Some(budget_type) = patch.budget_type {
                active.budget_type = ActiveValue::Set(budget_type);
            }
            if let Some(date) = patch.date {
                active.date = ActiveValue::Set(date);
            }

            let updated = active.update(&db_tx).await?;
            Ok(updated)
        })
    }

    pub async fn delete_budget_entry(&self, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget_entry(&db_tx, id).await?;
            budgets::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> BudgetEntryInput {
        BudgetEntryInput {
            task_id: Uuid::new_v4(),
            category: "Materials".to_string(),
            budget_type: BudgetType::Budgeted,
            date: None,
            entry_type: EntryType::ResourceBased,
            quantity: None,
            amount: None,
            material_id: None,
            equipment_id: None,
            labor_id: None,
        }
    }

    #[test]
    fn no_reference_yields_none() {
        assert!(resource_key(&input()).unwrap().is_none());
    }

    #[test]
    fn single_reference_is_accepted() {
        let mut input = input();
        input.labor_id = Some(Uuid::new_v4());
        assert!(matches!(
            resource_key(&input).unwrap(),
            Some(ResourceKey::Labor(_))
        ));
    }

    #[test]
    fn two_references_are_rejected() {
        let mut input = input();
        input.material_id = Some(Uuid::new_v4());
        input.equipment_id = Some(Uuid::new_v4());
        assert!(matches!(
            resource_key(&input),
            Err(EngineError::Validation(_))
        ));
    }
}
