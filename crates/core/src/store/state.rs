//! The ledger snapshot and its permissive lookups.

use serde::{Deserialize, Serialize};
use sitebook_shared::types::{
    ExpenseId, IncomeId, InvoiceId, MaterialId, PaymentId, ProjectId, StockEntryId, VendorId,
};

use super::entities::{
    Expense, Income, Invoice, Material, Payment, Project, StockHistoryEntry, Vendor,
};

/// Label for a record with no project or vendor reference.
pub const GENERAL_LABEL: &str = "General";

/// Label for a reference to an entity that no longer exists.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// The signed-in user. Kept across imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Admin".to_string(),
            email: None,
        }
    }
}

/// User-editable option lists consumed by entry forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigLists {
    /// Trade categories for vendors and expenses.
    pub categories: Vec<String>,
    /// Stocking units for materials.
    pub units: Vec<String>,
    /// Site statuses for projects.
    pub statuses: Vec<String>,
}

impl Default for ConfigLists {
    fn default() -> Self {
        fn owned(values: &[&str]) -> Vec<String> {
            values.iter().map(|v| (*v).to_string()).collect()
        }

        Self {
            categories: owned(&[
                "Cement",
                "Steel",
                "Sand & Aggregate",
                "Bricks & Blocks",
                "Electrical",
                "Plumbing",
                "Hardware",
                "Labour",
                "Transport",
            ]),
            units: owned(&["Bags", "Kg", "Tons", "Cft", "Nos", "Litres", "Sqft"]),
            statuses: owned(&["Planning", "In Progress", "On Hold", "Completed"]),
        }
    }
}

/// Which configuration list a change targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigList {
    /// Trade categories.
    Categories,
    /// Stocking units.
    Units,
    /// Site statuses.
    Statuses,
}

impl ConfigLists {
    /// Returns the list for `which`.
    #[must_use]
    pub fn list(&self, which: ConfigList) -> &[String] {
        match which {
            ConfigList::Categories => &self.categories,
            ConfigList::Units => &self.units,
            ConfigList::Statuses => &self.statuses,
        }
    }

    pub(crate) fn list_mut(&mut self, which: ConfigList) -> &mut Vec<String> {
        match which {
            ConfigList::Categories => &mut self.categories,
            ConfigList::Units => &mut self.units,
            ConfigList::Statuses => &mut self.statuses,
        }
    }
}

/// A complete, self-consistent copy of all ledger state.
///
/// Snapshots are never edited in place once published; the mutation engine
/// builds a new one per accepted command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    /// Incremented by every accepted command.
    #[serde(default)]
    pub revision: u64,
    /// Sites and godowns.
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Suppliers.
    #[serde(default)]
    pub vendors: Vec<Vendor>,
    /// Materials with their stock history.
    #[serde(default)]
    pub materials: Vec<Material>,
    /// Expenses.
    #[serde(default)]
    pub expenses: Vec<Expense>,
    /// Vendor payments.
    #[serde(default)]
    pub payments: Vec<Payment>,
    /// Collections against invoices.
    #[serde(default)]
    pub incomes: Vec<Income>,
    /// Client invoices.
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    /// Option lists.
    #[serde(default)]
    pub config: ConfigLists,
    /// Signed-in user.
    #[serde(default)]
    pub current_user: UserProfile,
}

impl LedgerState {
    /// Looks up a project.
    #[must_use]
    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Looks up a vendor.
    #[must_use]
    pub fn vendor(&self, id: VendorId) -> Option<&Vendor> {
        self.vendors.iter().find(|v| v.id == id)
    }

    /// Looks up a material.
    #[must_use]
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Looks up an expense.
    #[must_use]
    pub fn expense(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    /// Looks up a payment.
    #[must_use]
    pub fn payment(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id == id)
    }

    /// Looks up an invoice.
    #[must_use]
    pub fn invoice(&self, id: InvoiceId) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    /// Looks up an income.
    #[must_use]
    pub fn income(&self, id: IncomeId) -> Option<&Income> {
        self.incomes.iter().find(|i| i.id == id)
    }

    /// Finds a stock entry in any material's history.
    #[must_use]
    pub fn stock_entry(&self, id: StockEntryId) -> Option<(&Material, &StockHistoryEntry)> {
        self.materials
            .iter()
            .find_map(|m| m.entry(id).map(|entry| (m, entry)))
    }

    /// Display name for an optional project reference.
    #[must_use]
    pub fn project_label(&self, id: Option<ProjectId>) -> &str {
        match id {
            None => GENERAL_LABEL,
            Some(id) => self.project(id).map_or(UNKNOWN_LABEL, |p| p.name.as_str()),
        }
    }

    /// Display name for an optional vendor reference.
    #[must_use]
    pub fn vendor_label(&self, id: Option<VendorId>) -> &str {
        match id {
            None => GENERAL_LABEL,
            Some(id) => self.vendor(id).map_or(UNKNOWN_LABEL, |v| v.name.as_str()),
        }
    }

    /// Display name for a material reference.
    #[must_use]
    pub fn material_label(&self, id: MaterialId) -> &str {
        self.material(id).map_or(UNKNOWN_LABEL, |m| m.name.as_str())
    }
}
