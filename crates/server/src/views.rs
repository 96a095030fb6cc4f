//! Conversions from engine values to wire views.
//!
//! Monetary figures are rounded to cents on the way out.

use std::collections::BTreeMap;

use api_types::{
    BudgetSplit,
    budget::{BudgetLine, BudgetView, ResourceDetails},
    project::ProjectView,
    resource::{EquipmentView, LaborView, MaterialView},
    task::TaskView,
};
use engine::{budgets, cost::round_cents, equipment, labor, materials, projects, tasks};

pub fn money(value: f64) -> f64 {
    round_cents(value)
}

pub fn split(split: engine::BudgetSplit) -> BudgetSplit {
    BudgetSplit {
        budgeted: money(split.budgeted),
        actual: money(split.actual),
    }
}

pub fn splits(map: BTreeMap<String, engine::BudgetSplit>) -> BTreeMap<String, BudgetSplit> {
    map.into_iter()
        .map(|(category, value)| (category, split(value)))
        .collect()
}

pub fn project(model: projects::Model) -> ProjectView {
    ProjectView {
        id: model.id,
        name: model.name,
        description: model.description,
        location_name: model.location_name,
        status: model.status.to_string(),
        construction_type: model.construction_type.to_string(),
        start_date: model.start_date,
        end_date: model.end_date,
        budget_estimate: model.budget_estimate.map(money),
        actual_cost: model.actual_cost.map(money),
        currency: model.currency,
        contractor_name: model.contractor_name,
        client_name: model.client_name,
        engineer_in_charge: model.engineer_in_charge,
        progress_percent: model.progress_percent,
        created_at: model.created_at,
    }
}

pub fn task(model: tasks::Model) -> TaskView {
    TaskView {
        id: model.id,
        project_id: model.project_id,
        name: model.name,
        description: model.description,
        start_date: model.start_date,
        due_date: model.due_date,
        status: model.status.to_string(),
        progress_percent: model.progress_percent,
        assigned_to_admin: model.assigned_to_admin,
        created_at: model.created_at,
    }
}

pub fn budget(model: budgets::Model) -> BudgetView {
    BudgetView {
        id: model.id,
        task_id: model.task_id,
        category: model.category,
        amount: money(model.amount),
        budget_type: model.budget_type.to_string(),
        date: model.date,
        entry_type: model.entry_type.to_string(),
        material_id: model.material_id,
        equipment_id: model.equipment_id,
        labor_id: model.labor_id,
        calculated_amount: model.calculated_amount.map(money),
        quantity: model.quantity,
        created_at: model.created_at,
    }
}

pub fn resource(resource: engine::ResourceRef) -> ResourceDetails {
    match resource {
        engine::ResourceRef::Material {
            id,
            name,
            unit,
            unit_cost,
        } => ResourceDetails::Material {
            id,
            name,
            unit,
            unit_cost: money(unit_cost),
        },
        engine::ResourceRef::Equipment {
            id,
            name,
            equipment_type,
            rental_cost_per_day,
        } => ResourceDetails::Equipment {
            id,
            name,
            equipment_type,
            rental_cost_per_day: rental_cost_per_day.map(money),
        },
        engine::ResourceRef::Labor {
            id,
            worker_name,
            worker_type,
            hourly_rate,
            hours_worked,
        } => ResourceDetails::Labor {
            id,
            worker_name,
            worker_type: worker_type.to_string(),
            hourly_rate: money(hourly_rate),
            hours_worked,
        },
    }
}

pub fn lines(lines: Vec<engine::BudgetLine>) -> Vec<BudgetLine> {
    lines
        .into_iter()
        .map(|line| BudgetLine {
            budget: budget(line.entry),
            resource_details: line.resource.map(resource),
        })
        .collect()
}

pub fn material(model: materials::Model) -> MaterialView {
    MaterialView {
        id: model.id,
        task_id: model.task_id,
        name: model.name,
        unit: model.unit,
        unit_cost: money(model.unit_cost),
        quantity_required: model.quantity_required,
        quantity_used: model.quantity_used,
        created_at: model.created_at,
    }
}

pub fn equipment(model: equipment::Model) -> EquipmentView {
    EquipmentView {
        id: model.id,
        name: model.name,
        equipment_type: model.equipment_type,
        availability: model.availability,
        rental_cost_per_day: model.rental_cost_per_day.map(money),
        assigned_task_id: model.assigned_task_id,
        days_used: model.days_used,
        created_at: model.created_at,
    }
}

pub fn labor(model: labor::Model) -> LaborView {
    LaborView {
        id: model.id,
        task_id: model.task_id,
        worker_name: model.worker_name,
        worker_type: model.worker_type.to_string(),
        hourly_rate: money(model.hourly_rate),
        hours_worked: model.hours_worked,
        total_cost: money(model.total_cost),
        start_date: model.start_date,
        end_date: model.end_date,
        status: model.status.to_string(),
        phone: model.phone,
        is_requirement: model.is_requirement,
        required_quantity: model.required_quantity,
        created_at: model.created_at,
    }
}
