//! Quotation API endpoint. Rendering to a document is left to the client.

use api_types::quotation::{Engineer, Quotation, QuotationQuery, Summary, TaskQuotation};
use axum::extract::{Path, Query, State};
use engine::QuotationType;
use uuid::Uuid;

use crate::{Reply, ok, parse, server::ServerState, views};

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<QuotationQuery>,
) -> Reply<Quotation> {
    let quotation_type: QuotationType =
        parse(query.quotation_type.as_deref())?.unwrap_or_default();
    let quotation = state.engine.compose_quotation(id, quotation_type).await?;
    let summary = quotation.summary;

    ok(Quotation {
        quotation_type: quotation.quotation_type.as_str().to_string(),
        project: views::project(quotation.project),
        engineer: quotation.engineer.map(|admin| Engineer {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            phone: admin.phone,
        }),
        summary: Summary {
            total_budgeted: views::money(summary.totals.budgeted),
            total_actual: views::money(summary.totals.actual),
            total_variance: views::money(summary.total_variance),
            total_variance_percentage: summary.total_variance_percentage,
            category_breakdown: views::splits(summary.category_breakdown),
        },
        tasks: quotation
            .tasks
            .into_iter()
            .map(|row| TaskQuotation {
                task: views::task(row.task),
                budgeted: views::money(row.budget.budgeted),
                actual: views::money(row.budget.actual),
                variance: views::money(row.variance),
                variance_percentage: row.variance_percentage,
                lines: views::lines(row.lines),
            })
            .collect(),
    })
}
