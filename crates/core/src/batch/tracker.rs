//! Derives open inward batches from a material's stock history.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sitebook_shared::types::money::line_total;
use sitebook_shared::types::{BatchId, MaterialId, ProjectId, VendorId};
use tracing::error;

use crate::ledger::LedgerError;
use crate::store::{LedgerState, Material, StockHistoryEntry, StockMovement};

/// Which inward entries a query surfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchQuery {
    /// Project being viewed; drives `is_local_to_project`.
    pub project: Option<ProjectId>,
    /// Restrict to batches whose inward entry sits at `project`.
    pub local_only: bool,
}

impl BatchQuery {
    /// All batches, none marked local.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            project: None,
            local_only: false,
        }
    }

    /// All batches, those at `project` marked local.
    #[must_use]
    pub const fn viewing(project: ProjectId) -> Self {
        Self {
            project: Some(project),
            local_only: false,
        }
    }

    /// Only batches sitting at `project`.
    #[must_use]
    pub const fn at(project: ProjectId) -> Self {
        Self {
            project: Some(project),
            local_only: true,
        }
    }
}

/// An inward stock entry viewed as a depletable pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Material held.
    pub material_id: MaterialId,
    /// Material display name.
    pub material_name: String,
    /// The inward entry id.
    pub batch_id: BatchId,
    /// Purchase or inbound transfer.
    pub kind: StockMovement,
    /// Supplier of the stock.
    pub vendor_id: Option<VendorId>,
    /// Where the batch sits.
    pub project_id: Option<ProjectId>,
    /// Entry price, or the material's fallback cost.
    pub unit_price: Decimal,
    /// Quantity received.
    pub original_quantity: Decimal,
    /// Quantity left after linked deductions, never below zero.
    pub available: Decimal,
    /// Quantity drawn beyond the original; non-zero only for corrupt data.
    pub deficit: Decimal,
    /// Arrival date.
    pub origin_date: NaiveDate,
    /// Sits at the project being viewed.
    pub is_local_to_project: bool,
}

impl Batch {
    /// Quantity × unit price owed for the batch, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn bill_value(&self) -> Decimal {
        line_total(self.original_quantity, self.unit_price).unwrap_or(Decimal::MAX)
    }

    /// True while stock remains.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.available > Decimal::ZERO
    }

    /// Value of the stock still on hand, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn stock_value(&self) -> Decimal {
        line_total(self.available, self.unit_price).unwrap_or(Decimal::MAX)
    }
}

/// Stateless batch derivation over stock history.
///
/// `available` is always recomputed from the full set of linked
/// deductions, so deleting or editing deductions out of order cannot drift.
pub struct BatchTracker;

impl BatchTracker {
    /// Every inward batch of `material` matching `query`, exhausted ones included.
    #[must_use]
    pub fn inward_batches(material: &Material, query: BatchQuery) -> Vec<Batch> {
        material
            .history
            .iter()
            .filter(|entry| entry.is_inward())
            .filter_map(|entry| {
                let is_local = query.project.is_some() && entry.project_id == query.project;
                if query.local_only && !is_local {
                    return None;
                }
                Some(Self::derive(material, entry, is_local))
            })
            .collect()
    }

    /// Inward batches with stock remaining.
    #[must_use]
    pub fn open_batches(material: &Material, query: BatchQuery) -> Vec<Batch> {
        Self::inward_batches(material, query)
            .into_iter()
            .filter(Batch::is_open)
            .collect()
    }

    /// Open batches of every material, in consumption order.
    #[must_use]
    pub fn open_batches_across(state: &LedgerState, query: BatchQuery) -> Vec<Batch> {
        let mut batches: Vec<Batch> = state
            .materials
            .iter()
            .flat_map(|m| Self::open_batches(m, query))
            .collect();
        Self::sort_for_consumption(&mut batches);
        batches
    }

    /// Looks up one batch of `material`, whether open or exhausted.
    #[must_use]
    pub fn find(material: &Material, batch_id: BatchId) -> Option<Batch> {
        material
            .entry(batch_id)
            .filter(|entry| entry.is_inward())
            .map(|entry| Self::derive(material, entry, false))
    }

    /// Sum of linked deductions for `batch_id` (zero or negative).
    #[must_use]
    pub fn linked_outward(material: &Material, batch_id: BatchId) -> Decimal {
        material
            .history
            .iter()
            .filter(|e| e.is_outward() && e.parent_purchase_id == Some(batch_id))
            .map(|e| e.quantity)
            .sum()
    }

    /// Strict check of a material's batches.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DataIntegrity` if any batch is overdrawn or a
    /// deduction points at a batch that does not exist.
    pub fn verify(material: &Material) -> Result<(), LedgerError> {
        for batch in Self::inward_batches(material, BatchQuery::all()) {
            if batch.deficit > Decimal::ZERO {
                return Err(LedgerError::DataIntegrity(format!(
                    "batch {} of {} overdrawn by {}",
                    batch.batch_id, material.name, batch.deficit
                )));
            }
        }

        for entry in material.history.iter().filter(|e| e.is_outward()) {
            if let Some(parent) = entry.parent_purchase_id {
                if !material.entry(parent).is_some_and(StockHistoryEntry::is_inward) {
                    return Err(LedgerError::DataIntegrity(format!(
                        "entry {} of {} draws from unknown batch {parent}",
                        entry.id, material.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Local batches first, then by material name.
    pub fn sort_for_consumption(batches: &mut [Batch]) {
        batches.sort_by(|a, b| {
            b.is_local_to_project
                .cmp(&a.is_local_to_project)
                .then_with(|| a.material_name.cmp(&b.material_name))
                .then_with(|| a.origin_date.cmp(&b.origin_date))
        });
    }

    /// Newest arrivals first.
    pub fn sort_by_arrival(batches: &mut [Batch]) {
        batches.sort_by(|a, b| match b.origin_date.cmp(&a.origin_date) {
            Ordering::Equal => b.batch_id.cmp(&a.batch_id),
            other => other,
        });
    }

    fn derive(material: &Material, entry: &StockHistoryEntry, is_local: bool) -> Batch {
        let raw_available = entry.quantity + Self::linked_outward(material, entry.id);

        let deficit = if raw_available < Decimal::ZERO {
            error!(
                material_id = %material.id,
                batch_id = %entry.id,
                available = %raw_available,
                "batch overdrawn; stock history is inconsistent"
            );
            -raw_available
        } else {
            Decimal::ZERO
        };

        Batch {
            material_id: material.id,
            material_name: material.name.clone(),
            batch_id: entry.id,
            kind: entry.kind,
            vendor_id: entry.vendor_id,
            project_id: entry.project_id,
            unit_price: entry.unit_price.unwrap_or(material.cost_per_unit),
            original_quantity: entry.quantity,
            available: raw_available.max(Decimal::ZERO),
            deficit,
            origin_date: entry.date,
            is_local_to_project: is_local,
        }
    }
}
