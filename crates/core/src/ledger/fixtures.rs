//! Test helpers driving the engine the way an entry form would.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sitebook_shared::types::{
    BatchId, IncomeId, InvoiceId, MaterialId, PaymentId, ProjectId, VendorId,
};

use super::command::{
    Command, EntityRef, IncomeInput, InvoiceInput, MaterialInput, PaymentInput, ProjectInput,
    PurchaseInput, TransferInput, UsageInput, VendorInput,
};
use super::engine::LedgerEngine;
use super::error::LedgerError;
use crate::batch::{Batch, BatchTracker};
use crate::store::LedgerState;

pub(crate) fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

/// A snapshot advanced only by accepted commands.
#[derive(Default)]
pub(crate) struct Fixture {
    pub state: LedgerState,
}

impl Fixture {
    pub fn apply(&mut self, command: Command) -> Result<Option<EntityRef>, LedgerError> {
        let transition = LedgerEngine::apply(&self.state, command)?;
        self.state = transition.state;
        Ok(transition.affected)
    }

    fn project(&mut self, name: &str, is_godown: bool, budget: Option<Decimal>) -> ProjectId {
        match self.apply(Command::UpsertProject(ProjectInput {
            id: None,
            name: name.to_string(),
            client: String::new(),
            location: String::new(),
            budget,
            status: "In Progress".to_string(),
            start_date: None,
            end_date: None,
            is_godown,
        })) {
            Ok(Some(EntityRef::Project(id))) => id,
            other => panic!("unexpected {other:?}"),
        }
    }

    pub fn site(&mut self, name: &str, budget: Decimal) -> ProjectId {
        self.project(name, false, Some(budget))
    }

    pub fn godown(&mut self, name: &str) -> ProjectId {
        self.project(name, true, None)
    }

    pub fn vendor(&mut self, name: &str) -> VendorId {
        match self.apply(Command::UpsertVendor(VendorInput {
            id: None,
            name: name.to_string(),
            phone: String::new(),
            address: String::new(),
            category: "Cement".to_string(),
            opening_balance: Decimal::ZERO,
        })) {
            Ok(Some(EntityRef::Vendor(id))) => id,
            other => panic!("unexpected {other:?}"),
        }
    }

    pub fn material(&mut self, name: &str) -> MaterialId {
        match self.apply(Command::UpsertMaterial(MaterialInput {
            id: None,
            name: name.to_string(),
            unit: "Bags".to_string(),
            cost_per_unit: Decimal::ONE,
        })) {
            Ok(Some(EntityRef::Material(id))) => id,
            other => panic!("unexpected {other:?}"),
        }
    }

    pub fn purchase(
        &mut self,
        material_id: MaterialId,
        vendor_id: Option<VendorId>,
        project_id: Option<ProjectId>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<BatchId, LedgerError> {
        self.apply(Command::RecordPurchase(PurchaseInput {
            project_id,
            vendor_id,
            material_id,
            quantity,
            unit_price,
            date: day(1),
            payment_method: "Credit".to_string(),
            note: None,
        }))
        .map(stock_entry)
    }

    pub fn usage(
        &mut self,
        material_id: MaterialId,
        batch_id: BatchId,
        quantity: Decimal,
        project_id: Option<ProjectId>,
    ) -> Result<BatchId, LedgerError> {
        self.apply(Command::RecordUsage(UsageInput {
            material_id,
            batch_id,
            quantity,
            project_id,
            date: day(2),
            note: None,
        }))
        .map(stock_entry)
    }

    pub fn transfer(
        &mut self,
        material_id: MaterialId,
        batch_id: BatchId,
        quantity: Decimal,
        to_project_id: ProjectId,
    ) -> Result<BatchId, LedgerError> {
        self.apply(Command::RecordTransfer(TransferInput {
            material_id,
            batch_id,
            quantity,
            to_project_id,
            date: day(3),
            note: None,
        }))
        .map(stock_entry)
    }

    pub fn pay(
        &mut self,
        id: Option<PaymentId>,
        vendor_id: VendorId,
        batch_id: Option<BatchId>,
        amount: Decimal,
    ) -> Result<PaymentId, LedgerError> {
        self.apply(Command::RecordPayment(PaymentInput {
            id,
            vendor_id,
            amount,
            batch_id,
            project_id: None,
            date: day(4),
            method: "Bank".to_string(),
            reference: None,
        }))
        .map(|affected| match affected {
            Some(EntityRef::Payment(id)) => id,
            other => panic!("unexpected {other:?}"),
        })
    }

    pub fn invoice(&mut self, project_id: ProjectId, amount: Decimal) -> InvoiceId {
        match self.apply(Command::UpsertInvoice(InvoiceInput {
            id: None,
            project_id,
            date: day(5),
            due_date: Some(day(25)),
            amount,
            description: "Running bill".to_string(),
            status: "Sent".to_string(),
        })) {
            Ok(Some(EntityRef::Invoice(id))) => id,
            other => panic!("unexpected {other:?}"),
        }
    }

    pub fn collect(
        &mut self,
        id: Option<IncomeId>,
        invoice_id: InvoiceId,
        amount: Decimal,
    ) -> Result<IncomeId, LedgerError> {
        self.apply(Command::RecordIncome(IncomeInput {
            id,
            invoice_id,
            amount,
            project_id: None,
            date: day(6),
            method: "Cheque".to_string(),
            description: String::new(),
        }))
        .map(|affected| match affected {
            Some(EntityRef::Income(id)) => id,
            other => panic!("unexpected {other:?}"),
        })
    }

    pub fn batch(&self, material_id: MaterialId, batch_id: BatchId) -> Batch {
        let material = self.state.material(material_id).unwrap();
        BatchTracker::find(material, batch_id).unwrap()
    }
}

fn stock_entry(affected: Option<EntityRef>) -> BatchId {
    match affected {
        Some(EntityRef::StockEntry(id)) => id,
        other => panic!("unexpected {other:?}"),
    }
}
