//! The mutation engine.
//!
//! Every command is validated against the input snapshot first. Only when
//! all checks pass is the snapshot cloned and the change applied, so a
//! rejected command never leaves a partially edited state behind.

use rust_decimal::Decimal;
use sitebook_shared::types::money::{exceeds, line_total};
use sitebook_shared::types::{
    ExpenseId, InvoiceId, MaterialId, ProjectId, StockEntryId, VendorId,
};
use tracing::{debug, info, warn};

use super::command::{
    Command, ConfigChange, EntityRef, ExpenseInput, IncomeInput, InvoiceInput, MaterialInput,
    PaymentInput, ProjectInput, PurchaseInput, TransferInput, UsageInput, VendorInput,
};
use super::error::{LedgerError, SettlementTarget};
use crate::batch::{Batch, BatchTracker};
use crate::settlement::SettlementCalculator;
use crate::store::{
    ConfigList, Expense, Income, InventoryAction, Invoice, LedgerState, Material, Payment,
    Project, StockHistoryEntry, StockMovement, Vendor,
};

/// Expense category stamped on stock purchases and usage.
pub const MATERIAL_CATEGORY: &str = "Material";

/// Result of an accepted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The new snapshot.
    pub state: LedgerState,
    /// Record created, updated, or removed.
    pub affected: Option<EntityRef>,
}

/// Pure reducer from (snapshot, command) to a new snapshot.
pub struct LedgerEngine;

impl LedgerEngine {
    /// Applies `command` to `state`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the command is rejected; `state` is left as is.
    pub fn apply(state: &LedgerState, command: Command) -> Result<Transition, LedgerError> {
        let name = command.name();
        let compound = command.is_compound();

        let result = match command {
            Command::UpsertProject(input) => Self::upsert_project(state, input),
            Command::UpsertVendor(input) => Self::upsert_vendor(state, input),
            Command::UpsertMaterial(input) => Self::upsert_material(state, input),
            Command::RecordExpense(input) => Self::record_expense(state, input),
            Command::RecordPurchase(input) => Self::record_purchase(state, input),
            Command::RecordUsage(input) => Self::record_usage(state, input),
            Command::RecordTransfer(input) => Self::record_transfer(state, input),
            Command::RecordPayment(input) => Self::record_payment(state, input),
            Command::UpsertInvoice(input) => Self::upsert_invoice(state, input),
            Command::RecordIncome(input) => Self::record_income(state, input),
            Command::Delete(target) => Self::delete(state, target),
            Command::DeleteStockEntry {
                material_id,
                entry_id,
            } => Self::delete_stock_entry(state, material_id, entry_id),
            Command::UpdateConfig { list, change } => Self::update_config(state, list, change),
        };

        match &result {
            Ok(transition) if compound => info!(
                command = name,
                revision = transition.state.revision,
                affected = ?transition.affected,
                "command applied"
            ),
            Ok(transition) => debug!(
                command = name,
                revision = transition.state.revision,
                "command applied"
            ),
            Err(e) => warn!(command = name, code = e.error_code(), error = %e, "command rejected"),
        }

        result
    }

    // ========== Flat lifecycle ==========

    fn upsert_project(state: &LedgerState, input: ProjectInput) -> Result<Transition, LedgerError> {
        require_text("project name", &input.name)?;
        if let Some(budget) = input.budget {
            if input.is_godown {
                return Err(LedgerError::validation("a godown carries no budget"));
            }
            require_non_negative("budget", budget)?;
        }
        if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
            if end < start {
                return Err(LedgerError::validation("end date precedes start date"));
            }
        }
        if let Some(id) = input.id {
            require_project(state, id)?;
        }

        let project = Project {
            id: input.id.unwrap_or_default(),
            name: input.name.trim().to_string(),
            client: input.client,
            location: input.location,
            budget: input.budget,
            status: input.status,
            start_date: input.start_date,
            end_date: input.end_date,
            is_godown: input.is_godown,
        };
        let id = project.id;

        let mut next = state.clone();
        upsert(&mut next.projects, project, |p| p.id == id);
        Ok(commit(next, EntityRef::Project(id)))
    }

    fn upsert_vendor(state: &LedgerState, input: VendorInput) -> Result<Transition, LedgerError> {
        require_text("vendor name", &input.name)?;
        require_non_negative("opening balance", input.opening_balance)?;

        if let Some(id) = input.id {
            let current = require_vendor(state, id)?;
            // Lowering the opening balance must not leave payments above what is owed.
            let settlement = SettlementCalculator::vendor(state, id, None);
            let owed = input.opening_balance + settlement.purchased;
            if exceeds(settlement.paid, owed) {
                return Err(LedgerError::validation(format!(
                    "opening balance of {} would leave {} paid against {} owed",
                    current.name, settlement.paid, owed
                )));
            }
        }

        let vendor = Vendor {
            id: input.id.unwrap_or_default(),
            name: input.name.trim().to_string(),
            phone: input.phone,
            address: input.address,
            category: input.category,
            opening_balance: input.opening_balance,
        };
        let id = vendor.id;

        let mut next = state.clone();
        upsert(&mut next.vendors, vendor, |v| v.id == id);
        Ok(commit(next, EntityRef::Vendor(id)))
    }

    fn upsert_material(
        state: &LedgerState,
        input: MaterialInput,
    ) -> Result<Transition, LedgerError> {
        require_text("material name", &input.name)?;
        require_non_negative("cost per unit", input.cost_per_unit)?;

        let history = match input.id {
            Some(id) => require_material(state, id)?.history.clone(),
            None => Vec::new(),
        };
        let material = Material {
            id: input.id.unwrap_or_default(),
            name: input.name.trim().to_string(),
            unit: input.unit,
            cost_per_unit: input.cost_per_unit,
            history,
        };
        let id = material.id;

        let mut next = state.clone();
        upsert(&mut next.materials, material, |m| m.id == id);
        Ok(commit(next, EntityRef::Material(id)))
    }

    fn record_expense(state: &LedgerState, input: ExpenseInput) -> Result<Transition, LedgerError> {
        require_positive("amount", input.amount)?;
        require_optional_project(state, input.project_id)?;
        if let Some(vendor_id) = input.vendor_id {
            require_vendor(state, vendor_id)?;
        }
        if let Some(id) = input.id {
            let current = state
                .expense(id)
                .ok_or_else(|| LedgerError::not_found("expense", id))?;
            if current.inventory_action.is_some() {
                return Err(LedgerError::validation(
                    "inventory expenses change only through their stock entries",
                ));
            }
        }

        let expense = Expense {
            id: input.id.unwrap_or_default(),
            date: input.date,
            project_id: input.project_id,
            vendor_id: input.vendor_id,
            material_id: None,
            material_quantity: None,
            amount: input.amount,
            category: input.category,
            payment_method: input.payment_method,
            notes: input.notes,
            inventory_action: None,
            parent_purchase_id: None,
        };
        let id = expense.id;

        let mut next = state.clone();
        upsert(&mut next.expenses, expense, |e| e.id == id);
        Ok(commit(next, EntityRef::Expense(id)))
    }

    // ========== Stock movements ==========

    fn record_purchase(
        state: &LedgerState,
        input: PurchaseInput,
    ) -> Result<Transition, LedgerError> {
        // 1. Validate input
        require_positive("quantity", input.quantity)?;
        require_non_negative("unit price", input.unit_price)?;
        let material = require_material(state, input.material_id)?;
        require_optional_project(state, input.project_id)?;
        if let Some(vendor_id) = input.vendor_id {
            require_vendor(state, vendor_id)?;
        }

        // 2. Build the expense and the inward entry
        let expense_id = ExpenseId::new();
        let entry_id = StockEntryId::new();
        let amount = require_line_total(input.quantity, input.unit_price)?;

        let expense = Expense {
            id: expense_id,
            date: input.date,
            project_id: input.project_id,
            vendor_id: input.vendor_id,
            material_id: Some(material.id),
            material_quantity: Some(input.quantity),
            amount,
            category: MATERIAL_CATEGORY.to_string(),
            payment_method: input.payment_method,
            notes: input.note.clone().unwrap_or_default(),
            inventory_action: Some(InventoryAction::Purchase),
            parent_purchase_id: None,
        };
        let entry = StockHistoryEntry {
            id: entry_id,
            date: input.date,
            kind: StockMovement::Purchase,
            quantity: input.quantity,
            project_id: input.project_id,
            vendor_id: input.vendor_id,
            unit_price: Some(input.unit_price),
            note: input.note,
            parent_purchase_id: None,
            expense_id: Some(expense_id),
            transfer_peer_id: None,
        };

        // 3. Commit
        let mut next = state.clone();
        next.expenses.push(expense);
        append_history(&mut next, input.material_id, [entry]);
        Ok(commit(next, EntityRef::StockEntry(entry_id)))
    }

    fn record_usage(state: &LedgerState, input: UsageInput) -> Result<Transition, LedgerError> {
        // 1. Validate input
        require_positive("quantity", input.quantity)?;
        let material = require_material(state, input.material_id)?;
        require_optional_project(state, input.project_id)?;
        let batch = require_batch(material, input.batch_id)?;
        require_available(&batch, input.quantity)?;
        let amount = require_line_total(input.quantity, batch.unit_price)?;

        // 2. Build the expense and the outward entry
        let expense_id = ExpenseId::new();
        let entry_id = StockEntryId::new();

        let expense = Expense {
            id: expense_id,
            date: input.date,
            project_id: input.project_id,
            vendor_id: batch.vendor_id,
            material_id: Some(material.id),
            material_quantity: Some(-input.quantity),
            amount,
            category: MATERIAL_CATEGORY.to_string(),
            payment_method: String::new(),
            notes: input.note.clone().unwrap_or_default(),
            inventory_action: Some(InventoryAction::Usage),
            parent_purchase_id: Some(batch.batch_id),
        };
        let entry = StockHistoryEntry {
            id: entry_id,
            date: input.date,
            kind: StockMovement::Usage,
            quantity: -input.quantity,
            project_id: input.project_id,
            vendor_id: batch.vendor_id,
            unit_price: Some(batch.unit_price),
            note: input.note,
            parent_purchase_id: Some(batch.batch_id),
            expense_id: Some(expense_id),
            transfer_peer_id: None,
        };

        // 3. Commit
        let mut next = state.clone();
        next.expenses.push(expense);
        append_history(&mut next, input.material_id, [entry]);
        Ok(commit(next, EntityRef::StockEntry(entry_id)))
    }

    fn record_transfer(
        state: &LedgerState,
        input: TransferInput,
    ) -> Result<Transition, LedgerError> {
        // 1. Validate input
        require_positive("quantity", input.quantity)?;
        let material = require_material(state, input.material_id)?;
        require_project(state, input.to_project_id)?;
        let batch = require_batch(material, input.batch_id)?;
        if batch.project_id == Some(input.to_project_id) {
            return Err(LedgerError::validation(
                "transfer destination is where the batch already sits",
            ));
        }
        require_available(&batch, input.quantity)?;

        // 2. Build the paired legs
        let outward_id = StockEntryId::new();
        let inward_id = StockEntryId::new();

        let outward = StockHistoryEntry {
            id: outward_id,
            date: input.date,
            kind: StockMovement::Transfer,
            quantity: -input.quantity,
            project_id: batch.project_id,
            vendor_id: batch.vendor_id,
            unit_price: Some(batch.unit_price),
            note: input.note.clone(),
            parent_purchase_id: Some(batch.batch_id),
            expense_id: None,
            transfer_peer_id: Some(inward_id),
        };
        let inward = StockHistoryEntry {
            id: inward_id,
            date: input.date,
            kind: StockMovement::Transfer,
            quantity: input.quantity,
            project_id: Some(input.to_project_id),
            vendor_id: batch.vendor_id,
            unit_price: Some(batch.unit_price),
            note: input.note,
            parent_purchase_id: None,
            expense_id: None,
            transfer_peer_id: Some(outward_id),
        };

        // 3. Commit
        let mut next = state.clone();
        append_history(&mut next, input.material_id, [outward, inward]);
        Ok(commit(next, EntityRef::StockEntry(inward_id)))
    }

    // ========== Settlements ==========

    fn record_payment(state: &LedgerState, input: PaymentInput) -> Result<Transition, LedgerError> {
        // 1. Validate input
        require_positive("amount", input.amount)?;
        require_vendor(state, input.vendor_id)?;
        require_optional_project(state, input.project_id)?;
        if let Some(id) = input.id {
            state
                .payment(id)
                .ok_or_else(|| LedgerError::not_found("payment", id))?;
        }

        // 2. Batch headroom, excluding the payment under edit
        if let Some(batch_id) = input.batch_id {
            let (material, entry) = state
                .stock_entry(batch_id)
                .ok_or_else(|| LedgerError::not_found("batch", batch_id))?;
            if entry.kind != StockMovement::Purchase || !entry.is_inward() {
                return Err(LedgerError::validation(
                    "payments settle purchase batches only",
                ));
            }
            if entry.vendor_id != Some(input.vendor_id) {
                return Err(LedgerError::validation(
                    "batch was not bought from this vendor",
                ));
            }
            let batch = require_batch(material, batch_id)?;
            let settlement = SettlementCalculator::batch(&batch, &state.payments, input.id);
            if exceeds(input.amount, settlement.remaining) {
                return Err(LedgerError::Overpayment {
                    target: SettlementTarget::Batch,
                    requested: input.amount,
                    headroom: settlement.remaining,
                });
            }
        }

        // 3. Vendor headroom, excluding the payment under edit
        let vendor = SettlementCalculator::vendor(state, input.vendor_id, input.id);
        if exceeds(input.amount, vendor.balance) {
            return Err(LedgerError::Overpayment {
                target: SettlementTarget::Vendor,
                requested: input.amount,
                headroom: vendor.balance,
            });
        }

        // 4. Commit
        let payment = Payment {
            id: input.id.unwrap_or_default(),
            date: input.date,
            vendor_id: input.vendor_id,
            project_id: input.project_id,
            amount: input.amount,
            method: input.method,
            reference: input.reference,
            material_batch_id: input.batch_id,
        };
        let id = payment.id;

        let mut next = state.clone();
        upsert(&mut next.payments, payment, |p| p.id == id);
        Ok(commit(next, EntityRef::Payment(id)))
    }

    fn upsert_invoice(state: &LedgerState, input: InvoiceInput) -> Result<Transition, LedgerError> {
        require_positive("amount", input.amount)?;
        let project = require_project(state, input.project_id)?;
        if project.is_godown {
            return Err(LedgerError::validation("godowns are not invoiced"));
        }
        if input.due_date.is_some_and(|due| due < input.date) {
            return Err(LedgerError::validation("due date precedes invoice date"));
        }

        if let Some(id) = input.id {
            let current = require_invoice(state, id)?;
            let collected = SettlementCalculator::invoice(current, &state.incomes, None).collected;
            if exceeds(collected, input.amount) {
                return Err(LedgerError::validation(format!(
                    "invoice amount {} is below the {collected} already collected",
                    input.amount
                )));
            }
        }

        let invoice = Invoice {
            id: input.id.unwrap_or_default(),
            project_id: input.project_id,
            date: input.date,
            due_date: input.due_date,
            amount: input.amount,
            description: input.description,
            status: input.status,
        };
        let id = invoice.id;

        let mut next = state.clone();
        upsert(&mut next.invoices, invoice, |i| i.id == id);
        Ok(commit(next, EntityRef::Invoice(id)))
    }

    fn record_income(state: &LedgerState, input: IncomeInput) -> Result<Transition, LedgerError> {
        // 1. Validate input
        require_positive("amount", input.amount)?;
        let invoice = require_invoice(state, input.invoice_id)?;
        require_optional_project(state, input.project_id)?;
        if let Some(id) = input.id {
            state
                .income(id)
                .ok_or_else(|| LedgerError::not_found("income", id))?;
        }

        // 2. Invoice headroom, excluding the income under edit
        let settlement = SettlementCalculator::invoice(invoice, &state.incomes, input.id);
        if exceeds(input.amount, settlement.remaining) {
            return Err(LedgerError::Overpayment {
                target: SettlementTarget::Invoice,
                requested: input.amount,
                headroom: settlement.remaining,
            });
        }

        // 3. Commit
        let income = Income {
            id: input.id.unwrap_or_default(),
            project_id: input.project_id.or(Some(invoice.project_id)),
            date: input.date,
            amount: input.amount,
            description: input.description,
            method: input.method,
            invoice_id: Some(invoice.id),
        };
        let id = income.id;

        let mut next = state.clone();
        upsert(&mut next.incomes, income, |i| i.id == id);
        Ok(commit(next, EntityRef::Income(id)))
    }

    // ========== Removal ==========

    fn delete(state: &LedgerState, target: EntityRef) -> Result<Transition, LedgerError> {
        if let EntityRef::StockEntry(entry_id) = target {
            let (material, _) = state
                .stock_entry(entry_id)
                .ok_or_else(|| LedgerError::not_found("stock entry", entry_id))?;
            return Self::delete_stock_entry(state, material.id, entry_id);
        }

        let mut next = state.clone();
        let removed = match target {
            EntityRef::Project(id) => remove(&mut next.projects, |p| p.id == id),
            EntityRef::Vendor(id) => remove(&mut next.vendors, |v| v.id == id),
            EntityRef::Material(id) => remove(&mut next.materials, |m| m.id == id),
            EntityRef::Expense(id) => remove(&mut next.expenses, |e| e.id == id),
            EntityRef::Payment(id) => remove(&mut next.payments, |p| p.id == id),
            EntityRef::Invoice(id) => remove(&mut next.invoices, |i| i.id == id),
            EntityRef::Income(id) => remove(&mut next.incomes, |i| i.id == id),
            EntityRef::StockEntry(_) => false,
        };
        if !removed {
            return Err(LedgerError::not_found(target.kind(), target.id_string()));
        }
        Ok(commit(next, target))
    }

    fn delete_stock_entry(
        state: &LedgerState,
        material_id: MaterialId,
        entry_id: StockEntryId,
    ) -> Result<Transition, LedgerError> {
        let material = require_material(state, material_id)?;
        let entry = material
            .entry(entry_id)
            .ok_or_else(|| LedgerError::not_found("stock entry", entry_id))?;

        // A transfer leg never outlives its peer.
        let mut doomed = vec![entry_id];
        if let Some(peer) = entry.transfer_peer_id {
            if material.entry(peer).is_some() {
                doomed.push(peer);
            }
        }

        for id in &doomed {
            let drawn = material
                .history
                .iter()
                .any(|e| e.parent_purchase_id == Some(*id) && !doomed.contains(&e.id));
            if drawn {
                return Err(LedgerError::validation(format!(
                    "batch {id} still has deductions drawn from it"
                )));
            }
            if state.payments.iter().any(|p| p.material_batch_id == Some(*id)) {
                return Err(LedgerError::validation(format!(
                    "batch {id} still has payments settled against it"
                )));
            }
        }

        let mut next = state.clone();
        if let Some(m) = next.materials.iter_mut().find(|m| m.id == material_id) {
            m.history.retain(|e| !doomed.contains(&e.id));
        }
        Ok(commit(next, EntityRef::StockEntry(entry_id)))
    }

    fn update_config(
        state: &LedgerState,
        list: ConfigList,
        change: ConfigChange,
    ) -> Result<Transition, LedgerError> {
        let mut next = state.clone();
        let values = next.config.list_mut(list);

        match change {
            ConfigChange::Add(value) => {
                let value = value.trim();
                require_text("list entry", value)?;
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
            ConfigChange::Remove(value) => {
                let value = value.trim();
                values.retain(|v| v != value);
            }
        }

        next.revision += 1;
        Ok(Transition {
            state: next,
            affected: None,
        })
    }
}

fn commit(mut next: LedgerState, affected: EntityRef) -> Transition {
    next.revision += 1;
    Transition {
        state: next,
        affected: Some(affected),
    }
}

fn upsert<T>(items: &mut Vec<T>, item: T, matches: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|existing| matches(existing)) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}

fn remove<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !matches(item));
    items.len() != before
}

fn append_history<const N: usize>(
    state: &mut LedgerState,
    material_id: MaterialId,
    entries: [StockHistoryEntry; N],
) {
    if let Some(material) = state.materials.iter_mut().find(|m| m.id == material_id) {
        material.history.extend(entries);
    }
}

// ========== Checks ==========

fn require_text(field: &str, value: &str) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        return Err(LedgerError::validation(format!("{field} must not be blank")));
    }
    Ok(())
}

fn require_positive(field: &str, value: Decimal) -> Result<(), LedgerError> {
    if value <= Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "{field} must be positive, got {value}"
        )));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: Decimal) -> Result<(), LedgerError> {
    if value < Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    Ok(())
}

fn require_line_total(quantity: Decimal, unit_price: Decimal) -> Result<Decimal, LedgerError> {
    line_total(quantity, unit_price).ok_or_else(|| {
        LedgerError::validation(format!(
            "amount out of range for {quantity} at {unit_price}"
        ))
    })
}

fn require_available(batch: &Batch, quantity: Decimal) -> Result<(), LedgerError> {
    if quantity > batch.available {
        return Err(LedgerError::InsufficientStock {
            batch_id: batch.batch_id,
            requested: quantity,
            available: batch.available,
        });
    }
    Ok(())
}

fn require_project(state: &LedgerState, id: ProjectId) -> Result<&Project, LedgerError> {
    state
        .project(id)
        .ok_or_else(|| LedgerError::not_found("project", id))
}

fn require_optional_project(
    state: &LedgerState,
    id: Option<ProjectId>,
) -> Result<(), LedgerError> {
    if let Some(id) = id {
        require_project(state, id)?;
    }
    Ok(())
}

fn require_vendor(state: &LedgerState, id: VendorId) -> Result<&Vendor, LedgerError> {
    state
        .vendor(id)
        .ok_or_else(|| LedgerError::not_found("vendor", id))
}

fn require_material(state: &LedgerState, id: MaterialId) -> Result<&Material, LedgerError> {
    state
        .material(id)
        .ok_or_else(|| LedgerError::not_found("material", id))
}

fn require_invoice(state: &LedgerState, id: InvoiceId) -> Result<&Invoice, LedgerError> {
    state
        .invoice(id)
        .ok_or_else(|| LedgerError::not_found("invoice", id))
}

fn require_batch(material: &Material, batch_id: StockEntryId) -> Result<Batch, LedgerError> {
    BatchTracker::find(material, batch_id).ok_or_else(|| LedgerError::not_found("batch", batch_id))
}
