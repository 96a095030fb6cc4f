//! Cost rollup engine for construction projects.
//!
//! The engine reads projects, tasks and their resources (materials,
//! equipment, labor) plus budget entries from the store, and derives:
//!
//! - per-task cost rollups and budget summaries,
//! - per-project budget summaries and statistics,
//! - portfolio dashboard statistics,
//! - client quotations.
//!
//! Derived figures are never persisted; they are recomputed on every call.

pub use breakdown::{EnumCount, fill_bool_counts, fill_enum_counts};
pub use budgets::{BudgetType, EntryType};
pub use documents::DocumentType;
pub use error::EngineError;
pub use issues::IssueStatus;
pub use labor::{LaborStatus, WorkerType};
pub use ops::*;
pub use projects::{ConstructionType, ProjectStatus};
pub use quotation::{Quotation, QuotationSummary, QuotationType, TaskQuotation};
pub use rollup::{
    BudgetLine, BudgetSplit, CostTotals, LaborCost, LaborCostSummary, MaterialUsage,
    MaterialUsageSummary, ProjectBudgetSummary, ResourceCost, ResourceRef, TaskBudgetSummary,
    TaskCostSummary, WorkerTypeCost,
};
pub use tasks::TaskStatus;

pub mod admins;
pub mod budgets;
pub mod cost;
pub mod documents;
pub mod equipment;
pub mod issues;
pub mod labor;
pub mod materials;
pub mod money;
pub mod progress_updates;
pub mod projects;
pub mod tasks;
pub mod users;

mod breakdown;
mod error;
mod ops;
mod quotation;
mod rollup;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
