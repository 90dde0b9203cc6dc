//! Commands accepted by the mutation engine.
//!
//! Inputs carry an optional `id`: `None` creates a new record, `Some` replaces
//! the existing record with that id.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sitebook_shared::types::{
    BatchId, ExpenseId, IncomeId, InvoiceId, MaterialId, PaymentId, ProjectId, StockEntryId,
    VendorId,
};

use crate::store::ConfigList;

/// Site or godown details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInput {
    /// Existing project to replace.
    pub id: Option<ProjectId>,
    /// Display name.
    pub name: String,
    /// Client (sites) or supervisor (godowns).
    pub client: String,
    /// Location.
    pub location: String,
    /// Budget; must be `None` for godowns.
    pub budget: Option<Decimal>,
    /// Status label.
    pub status: String,
    /// Start date.
    pub start_date: Option<NaiveDate>,
    /// End date.
    pub end_date: Option<NaiveDate>,
    /// Storage hub rather than a job site.
    pub is_godown: bool,
}

/// Supplier details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorInput {
    /// Existing vendor to replace.
    pub id: Option<VendorId>,
    /// Display name.
    pub name: String,
    /// Phone.
    pub phone: String,
    /// Address.
    pub address: String,
    /// Trade category.
    pub category: String,
    /// Payable carried in from before the ledger.
    pub opening_balance: Decimal,
}

/// Material metadata. History is never replaced through this input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialInput {
    /// Existing material to replace.
    pub id: Option<MaterialId>,
    /// Display name.
    pub name: String,
    /// Stocking unit.
    pub unit: String,
    /// Fallback unit price.
    pub cost_per_unit: Decimal,
}

/// A plain expense with no inventory effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseInput {
    /// Existing expense to replace.
    pub id: Option<ExpenseId>,
    /// Expense date.
    pub date: NaiveDate,
    /// Project charged.
    pub project_id: Option<ProjectId>,
    /// Vendor involved.
    pub vendor_id: Option<VendorId>,
    /// Amount spent.
    pub amount: Decimal,
    /// Category label.
    pub category: String,
    /// Payment method.
    pub payment_method: String,
    /// Notes.
    pub notes: String,
}

/// Stock bought into a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseInput {
    /// Project receiving the stock.
    pub project_id: Option<ProjectId>,
    /// Supplier; the purchase accrues to their payable.
    pub vendor_id: Option<VendorId>,
    /// Material bought.
    pub material_id: MaterialId,
    /// Quantity received.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Purchase date.
    pub date: NaiveDate,
    /// Payment method recorded on the expense.
    pub payment_method: String,
    /// Free-form note.
    pub note: Option<String>,
}

/// Stock consumed from a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInput {
    /// Material consumed.
    pub material_id: MaterialId,
    /// Batch drawn down.
    pub batch_id: BatchId,
    /// Quantity consumed.
    pub quantity: Decimal,
    /// Project where it was consumed.
    pub project_id: Option<ProjectId>,
    /// Usage date.
    pub date: NaiveDate,
    /// Free-form note.
    pub note: Option<String>,
}

/// Stock moved from a batch to another project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInput {
    /// Material moved.
    pub material_id: MaterialId,
    /// Source batch.
    pub batch_id: BatchId,
    /// Quantity moved.
    pub quantity: Decimal,
    /// Destination project.
    pub to_project_id: ProjectId,
    /// Transfer date.
    pub date: NaiveDate,
    /// Free-form note.
    pub note: Option<String>,
}

/// A payment to a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInput {
    /// Existing payment to replace.
    pub id: Option<PaymentId>,
    /// Vendor paid.
    pub vendor_id: VendorId,
    /// Amount paid.
    pub amount: Decimal,
    /// Purchase batch settled by this payment.
    pub batch_id: Option<BatchId>,
    /// Project the payment is booked against.
    pub project_id: Option<ProjectId>,
    /// Payment date.
    pub date: NaiveDate,
    /// Payment method.
    pub method: String,
    /// Cheque number or transfer reference.
    pub reference: Option<String>,
}

/// A client invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceInput {
    /// Existing invoice to replace.
    pub id: Option<InvoiceId>,
    /// Project billed.
    pub project_id: ProjectId,
    /// Issue date.
    pub date: NaiveDate,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Billed amount.
    pub amount: Decimal,
    /// Description.
    pub description: String,
    /// Status label.
    pub status: String,
}

/// A collection against an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeInput {
    /// Existing income to replace.
    pub id: Option<IncomeId>,
    /// Invoice collected against.
    pub invoice_id: InvoiceId,
    /// Amount received.
    pub amount: Decimal,
    /// Project credited; defaults to the invoice's project.
    pub project_id: Option<ProjectId>,
    /// Collection date.
    pub date: NaiveDate,
    /// Payment method.
    pub method: String,
    /// Description.
    pub description: String,
}

/// Edit to a configuration list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigChange {
    /// Append a value unless already present.
    Add(String),
    /// Remove a value if present.
    Remove(String),
}

/// Reference to a single record in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    /// A project.
    Project(ProjectId),
    /// A vendor.
    Vendor(VendorId),
    /// A material.
    Material(MaterialId),
    /// A stock history entry.
    StockEntry(StockEntryId),
    /// An expense.
    Expense(ExpenseId),
    /// A payment.
    Payment(PaymentId),
    /// An invoice.
    Invoice(InvoiceId),
    /// An income.
    Income(IncomeId),
}

impl EntityRef {
    /// Entity kind label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Project(_) => "project",
            Self::Vendor(_) => "vendor",
            Self::Material(_) => "material",
            Self::StockEntry(_) => "stock entry",
            Self::Expense(_) => "expense",
            Self::Payment(_) => "payment",
            Self::Invoice(_) => "invoice",
            Self::Income(_) => "income",
        }
    }

    /// The id as a string.
    #[must_use]
    pub fn id_string(&self) -> String {
        match self {
            Self::Project(id) => id.to_string(),
            Self::Vendor(id) => id.to_string(),
            Self::Material(id) => id.to_string(),
            Self::StockEntry(id) => id.to_string(),
            Self::Expense(id) => id.to_string(),
            Self::Payment(id) => id.to_string(),
            Self::Invoice(id) => id.to_string(),
            Self::Income(id) => id.to_string(),
        }
    }
}

/// A state transition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Create or replace a project.
    UpsertProject(ProjectInput),
    /// Create or replace a vendor.
    UpsertVendor(VendorInput),
    /// Create or replace material metadata.
    UpsertMaterial(MaterialInput),
    /// Create or replace a plain expense.
    RecordExpense(ExpenseInput),
    /// Buy stock into a new batch.
    RecordPurchase(PurchaseInput),
    /// Consume stock from a batch.
    RecordUsage(UsageInput),
    /// Move stock from a batch to another project.
    RecordTransfer(TransferInput),
    /// Create or replace a vendor payment.
    RecordPayment(PaymentInput),
    /// Create or replace an invoice.
    UpsertInvoice(InvoiceInput),
    /// Create or replace a collection.
    RecordIncome(IncomeInput),
    /// Remove one record from its collection.
    Delete(EntityRef),
    /// Remove a line from a material's stock history.
    DeleteStockEntry {
        /// Material owning the entry.
        material_id: MaterialId,
        /// The entry.
        entry_id: StockEntryId,
    },
    /// Edit a configuration list.
    UpdateConfig {
        /// Target list.
        list: ConfigList,
        /// The edit.
        change: ConfigChange,
    },
}

impl Command {
    /// Command name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpsertProject(_) => "upsert_project",
            Self::UpsertVendor(_) => "upsert_vendor",
            Self::UpsertMaterial(_) => "upsert_material",
            Self::RecordExpense(_) => "record_expense",
            Self::RecordPurchase(_) => "record_purchase",
            Self::RecordUsage(_) => "record_usage",
            Self::RecordTransfer(_) => "record_transfer",
            Self::RecordPayment(_) => "record_payment",
            Self::UpsertInvoice(_) => "upsert_invoice",
            Self::RecordIncome(_) => "record_income",
            Self::Delete(_) => "delete",
            Self::DeleteStockEntry { .. } => "delete_stock_entry",
            Self::UpdateConfig { .. } => "update_config",
        }
    }

    /// True for commands that touch more than one collection or check headroom.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            Self::RecordPurchase(_)
                | Self::RecordUsage(_)
                | Self::RecordTransfer(_)
                | Self::RecordPayment(_)
                | Self::RecordIncome(_)
        )
    }
}
