//! Entity records held in the ledger snapshot.
//!
//! Field names serialize in camelCase because the snapshot document is also
//! the sync payload and the export file format.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sitebook_shared::types::{
    ExpenseId, IncomeId, InvoiceId, MaterialId, PaymentId, ProjectId, StockEntryId, VendorId,
};

/// A construction site or a godown (storage hub).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// The project ID.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// Client for sites, supervisor for godowns.
    #[serde(default)]
    pub client: String,
    /// Free-form location.
    #[serde(default)]
    pub location: String,
    /// Budget (sites only).
    #[serde(default)]
    pub budget: Option<Decimal>,
    /// Status label from the configurable status list.
    #[serde(default)]
    pub status: String,
    /// Start date.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// End date.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// True for storage hubs.
    #[serde(default)]
    pub is_godown: bool,
}

/// A supplier.
///
/// The payable balance is not stored; see
/// [`SettlementCalculator::vendor`](crate::settlement::SettlementCalculator::vendor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    /// The vendor ID.
    pub id: VendorId,
    /// Display name.
    pub name: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Postal address.
    #[serde(default)]
    pub address: String,
    /// Trade category from the configurable list.
    #[serde(default)]
    pub category: String,
    /// Amount already owed when the vendor was added.
    #[serde(default)]
    pub opening_balance: Decimal,
}

/// Kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockMovement {
    /// Bought from a vendor.
    Purchase,
    /// Consumed on a site.
    Usage,
    /// Moved between projects.
    Transfer,
}

impl StockMovement {
    /// Returns the lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Usage => "usage",
            Self::Transfer => "transfer",
        }
    }
}

/// One immutable line of a material's stock history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockHistoryEntry {
    /// The entry ID; inward entries use it as their batch id.
    pub id: StockEntryId,
    /// Movement date.
    pub date: NaiveDate,
    /// Movement kind.
    #[serde(rename = "type")]
    pub kind: StockMovement,
    /// Signed quantity: positive inbound, negative outbound.
    pub quantity: Decimal,
    /// Project the stock sits at (inward) or leaves from (outward).
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Supplier of the stock.
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    /// Price at the time of this entry.
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    /// Free-form note.
    #[serde(default)]
    pub note: Option<String>,
    /// Batch drawn down by an outbound entry.
    #[serde(default)]
    pub parent_purchase_id: Option<StockEntryId>,
    /// Expense that produced this entry.
    #[serde(default)]
    pub expense_id: Option<ExpenseId>,
    /// Other leg of a paired transfer.
    #[serde(default)]
    pub transfer_peer_id: Option<StockEntryId>,
}

impl StockHistoryEntry {
    /// Inbound purchase or transfer with a positive quantity.
    #[must_use]
    pub fn is_inward(&self) -> bool {
        matches!(self.kind, StockMovement::Purchase | StockMovement::Transfer)
            && self.quantity > Decimal::ZERO
    }

    /// Negative quantity, or any usage line.
    #[must_use]
    pub fn is_outward(&self) -> bool {
        self.quantity < Decimal::ZERO || self.kind == StockMovement::Usage
    }
}

/// An inventory asset type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// The material ID.
    pub id: MaterialId,
    /// Display name.
    pub name: String,
    /// Stocking unit from the configurable list.
    #[serde(default)]
    pub unit: String,
    /// Fallback price for entries without their own.
    #[serde(default)]
    pub cost_per_unit: Decimal,
    /// Ordered stock history, the source of truth for all quantities.
    #[serde(default)]
    pub history: Vec<StockHistoryEntry>,
}

impl Material {
    /// Sum of all inbound quantities.
    #[must_use]
    pub fn total_purchased(&self) -> Decimal {
        self.history
            .iter()
            .map(|e| e.quantity)
            .filter(|q| *q > Decimal::ZERO)
            .sum()
    }

    /// Sum of all outbound quantities, as a positive number.
    #[must_use]
    pub fn total_used(&self) -> Decimal {
        self.history
            .iter()
            .map(|e| e.quantity)
            .filter(|q| *q < Decimal::ZERO)
            .map(|q| -q)
            .sum()
    }

    /// Quantity currently on hand across all projects.
    #[must_use]
    pub fn in_stock(&self) -> Decimal {
        self.total_purchased() - self.total_used()
    }

    /// Looks up a history entry by id.
    #[must_use]
    pub fn entry(&self, id: StockEntryId) -> Option<&StockHistoryEntry> {
        self.history.iter().find(|e| e.id == id)
    }
}

/// Inventory effect recorded on an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryAction {
    /// Opened a batch.
    Purchase,
    /// Drew down a batch.
    Usage,
    /// Moved stock between projects.
    Transfer,
}

/// A financial outflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The expense ID.
    pub id: ExpenseId,
    /// Expense date.
    pub date: NaiveDate,
    /// Project charged; `None` is a general expense.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Supplier involved.
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    /// Material involved.
    #[serde(default)]
    pub material_id: Option<MaterialId>,
    /// Signed material quantity.
    #[serde(default)]
    pub material_quantity: Option<Decimal>,
    /// Amount spent.
    pub amount: Decimal,
    /// Category label.
    #[serde(default)]
    pub category: String,
    /// How it was paid.
    #[serde(default)]
    pub payment_method: String,
    /// Notes.
    #[serde(default)]
    pub notes: String,
    /// Inventory effect, if any.
    #[serde(default)]
    pub inventory_action: Option<InventoryAction>,
    /// Batch drawn down by a usage expense.
    #[serde(default)]
    pub parent_purchase_id: Option<StockEntryId>,
}

impl Expense {
    /// True for a purchase that accrues to a vendor's payable.
    #[must_use]
    pub fn accrues_to(&self, vendor_id: VendorId) -> bool {
        self.inventory_action == Some(InventoryAction::Purchase)
            && self.vendor_id == Some(vendor_id)
    }
}

/// A settlement from the firm to a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// The payment ID.
    pub id: PaymentId,
    /// Payment date.
    pub date: NaiveDate,
    /// Vendor paid.
    pub vendor_id: VendorId,
    /// Project the payment is booked against.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Amount paid.
    pub amount: Decimal,
    /// Payment method.
    #[serde(default)]
    pub method: String,
    /// Cheque number, transfer reference, etc.
    #[serde(default)]
    pub reference: Option<String>,
    /// Purchase batch this payment settles.
    #[serde(default)]
    pub material_batch_id: Option<StockEntryId>,
}

/// A bill issued to a project's client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// The invoice ID.
    pub id: InvoiceId,
    /// Project billed.
    pub project_id: ProjectId,
    /// Issue date.
    pub date: NaiveDate,
    /// Due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Billed amount.
    pub amount: Decimal,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// User-facing status label.
    #[serde(default)]
    pub status: String,
}

/// A collection received against an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    /// The income ID.
    pub id: IncomeId,
    /// Project credited.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Collection date.
    pub date: NaiveDate,
    /// Amount received.
    pub amount: Decimal,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Payment method.
    #[serde(default)]
    pub method: String,
    /// Invoice this collection settles.
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
}
