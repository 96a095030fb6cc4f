use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod budgets;
mod costs;
mod dashboard;
mod lookup;
mod projects;
mod quotation;
mod resources;

pub use budgets::{BudgetEntryInput, BudgetEntryPatch, CreatedBudgetEntry};
pub use costs::{AvailableResources, EstimatedResource, ProjectResourceCounts};
pub use dashboard::{
    BudgetByCategory, BudgetOverview, DashboardFilter, DashboardStats, EquipmentSummary,
    LaborOverview, MaterialOverview, Overview, PerformanceOverview, ProgressRange,
    ProjectBudgetLine, RecentIssue, RecentProgressUpdate, RecentProject, RecentTask,
    TimelineBucket, TimelineGrouping, TimelinePoint, TimelineQuery, TopEngineer,
};
pub use projects::{
    IssueCounts, ProjectBudgetFigures, ProjectInput, ProjectStats, TaskCounts, TaskDeletion,
    TaskInput,
};
pub use resources::{
    EquipmentInput, EquipmentPatch, LaborInput, LaborPatch, MaterialInput, MaterialPatch,
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every cost, rollup and dashboard operation.
///
/// The engine holds no state besides the connection: every figure is
/// computed from the store when asked for.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
