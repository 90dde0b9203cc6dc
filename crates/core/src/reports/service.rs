//! Report generation service.

use rust_decimal::Decimal;
use sitebook_shared::types::{MaterialId, ProjectId};
use tracing::debug;

use super::error::ReportError;
use super::types::{COMPLETED_STATUS, DashboardTotals, ProjectSummary, StockSummary};
use crate::batch::{BatchQuery, BatchTracker};
use crate::settlement::SettlementCalculator;
use crate::store::{LedgerState, Material, Project};

const PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// Service for generating aggregate reports.
pub struct ReportService;

impl ReportService {
    /// Summary of one project.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::ProjectNotFound` if the project does not exist.
    pub fn project_summary(
        state: &LedgerState,
        project_id: ProjectId,
    ) -> Result<ProjectSummary, ReportError> {
        let project = state
            .project(project_id)
            .ok_or(ReportError::ProjectNotFound(project_id))?;
        Ok(Self::summarize_project(state, project))
    }

    /// Summaries of every project, in store order.
    #[must_use]
    pub fn project_summaries(state: &LedgerState) -> Vec<ProjectSummary> {
        state
            .projects
            .iter()
            .map(|p| Self::summarize_project(state, p))
            .collect()
    }

    /// Stock position of one material.
    ///
    /// With a project in `query`, only batches sitting at that project count
    /// towards the value and open-batch figures.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::MaterialNotFound` if the material does not exist.
    pub fn stock_summary(
        state: &LedgerState,
        material_id: MaterialId,
        query: BatchQuery,
    ) -> Result<StockSummary, ReportError> {
        let material = state
            .material(material_id)
            .ok_or(ReportError::MaterialNotFound(material_id))?;
        Ok(Self::summarize_stock(material, query))
    }

    /// Stock position of every material, in store order.
    #[must_use]
    pub fn stock_summaries(state: &LedgerState) -> Vec<StockSummary> {
        state
            .materials
            .iter()
            .map(|m| Self::summarize_stock(m, BatchQuery::all()))
            .collect()
    }

    /// Firm-wide totals.
    #[must_use]
    pub fn dashboard(state: &LedgerState) -> DashboardTotals {
        let totals = DashboardTotals {
            expenses: state.expenses.iter().map(|e| e.amount).sum(),
            incomes: state.incomes.iter().map(|i| i.amount).sum(),
            vendor_payables: SettlementCalculator::vendors(state)
                .iter()
                .map(|v| v.balance)
                .sum(),
            receivables: SettlementCalculator::invoices(state)
                .iter()
                .map(|i| i.remaining)
                .sum(),
            stock_value: Self::stock_summaries(state)
                .iter()
                .map(|s| s.stock_value)
                .sum(),
            active_projects: state
                .projects
                .iter()
                .filter(|p| p.status != COMPLETED_STATUS)
                .count(),
        };
        debug!(revision = state.revision, ?totals, "dashboard computed");
        totals
    }

    /// `spent` as a percentage of `budget`, rounded to 2 dp.
    #[must_use]
    pub fn utilization(spent: Decimal, budget: Option<Decimal>) -> Decimal {
        match budget {
            Some(budget) if budget > Decimal::ZERO => (spent / budget * PERCENT).round_dp(2),
            _ => Decimal::ZERO,
        }
    }

    fn summarize_project(state: &LedgerState, project: &Project) -> ProjectSummary {
        let spent: Decimal = state
            .expenses
            .iter()
            .filter(|e| e.project_id == Some(project.id))
            .map(|e| e.amount)
            .sum();
        let collected: Decimal = state
            .incomes
            .iter()
            .filter(|i| i.project_id == Some(project.id))
            .map(|i| i.amount)
            .sum();

        let mut invoiced = Decimal::ZERO;
        let mut receivable = Decimal::ZERO;
        for invoice in state.invoices.iter().filter(|i| i.project_id == project.id) {
            let settlement = SettlementCalculator::invoice(invoice, &state.incomes, None);
            invoiced += settlement.amount;
            receivable += settlement.remaining;
        }

        ProjectSummary {
            project_id: project.id,
            name: project.name.clone(),
            is_godown: project.is_godown,
            budget: project.budget,
            spent,
            invoiced,
            collected,
            receivable,
            utilization_percent: Self::utilization(spent, project.budget),
        }
    }

    fn summarize_stock(material: &Material, query: BatchQuery) -> StockSummary {
        let query = query.project.map_or(query, BatchQuery::at);
        let batches = BatchTracker::open_batches(material, query);

        StockSummary {
            material_id: material.id,
            name: material.name.clone(),
            unit: material.unit.clone(),
            purchased: material.total_purchased(),
            used: material.total_used(),
            in_stock: material.in_stock(),
            stock_value: batches.iter().map(crate::batch::Batch::stock_value).sum(),
            open_batches: batches.len(),
        }
    }
}
