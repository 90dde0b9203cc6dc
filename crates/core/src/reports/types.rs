//! Report data types.

use rust_decimal::Decimal;
use serde::Serialize;
use sitebook_shared::types::{MaterialId, ProjectId};

/// Status label that marks a project as no longer active.
pub const COMPLETED_STATUS: &str = "Completed";

/// Spend and billing position of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// Project ID.
    pub project_id: ProjectId,
    /// Project name.
    pub name: String,
    /// Whether the project is a godown.
    pub is_godown: bool,
    /// Budget, if set.
    pub budget: Option<Decimal>,
    /// Sum of all expenses booked against the project.
    pub spent: Decimal,
    /// Sum of invoice amounts.
    pub invoiced: Decimal,
    /// Sum of incomes received for the project.
    pub collected: Decimal,
    /// Outstanding on the project's invoices.
    pub receivable: Decimal,
    /// `spent / budget` as a percentage, 2 dp; zero without a budget.
    pub utilization_percent: Decimal,
}

impl ProjectSummary {
    /// True when spend is past the budget.
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.budget.is_some_and(|budget| self.spent > budget)
    }
}

/// Stock position of one material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    /// Material ID.
    pub material_id: MaterialId,
    /// Material name.
    pub name: String,
    /// Unit of measure.
    pub unit: String,
    /// Sum of inward quantities.
    pub purchased: Decimal,
    /// Sum of outward quantities, as a positive number.
    pub used: Decimal,
    /// Purchased minus used.
    pub in_stock: Decimal,
    /// Value of remaining stock at batch prices.
    pub stock_value: Decimal,
    /// Number of batches with stock left.
    pub open_batches: usize,
}

/// Firm-wide totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    /// Sum of all expenses.
    pub expenses: Decimal,
    /// Sum of all incomes.
    pub incomes: Decimal,
    /// Owed to vendors.
    pub vendor_payables: Decimal,
    /// Owed by clients on invoices.
    pub receivables: Decimal,
    /// Value of stock on hand.
    pub stock_value: Decimal,
    /// Projects not marked completed.
    pub active_projects: usize,
}

impl DashboardTotals {
    /// Incomes minus expenses.
    #[must_use]
    pub fn net_cash(&self) -> Decimal {
        self.incomes - self.expenses
    }
}
