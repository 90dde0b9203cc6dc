//! Property-based tests for LedgerEngine.
//!
//! - No negative stock after any sequence of movements, edits and deletes
//! - No batch overpayment, no invoice overcollection
//! - Vendor balance never below zero
//! - A rejected command leaves the snapshot unchanged

use proptest::prelude::*;
use rust_decimal::Decimal;
use sitebook_shared::types::{BatchId, InvoiceId, MaterialId, ProjectId, VendorId};

use super::command::{Command, EntityRef, InvoiceInput, VendorInput};
use super::fixtures::{Fixture, day};
use super::integrity::audit;
use crate::batch::{BatchQuery, BatchTracker};
use crate::settlement::SettlementCalculator;

/// Strategy for amounts and quantities (0.01 to 500.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..50_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

#[derive(Debug, Clone)]
enum Op {
    Use(usize, Decimal),
    Transfer(usize, Decimal),
    PayBatch(usize, Decimal),
    PayVendor(Decimal),
    Collect(Decimal),
    EditPayment(usize, Option<usize>, Decimal),
    EditIncome(usize, Decimal),
    DeletePayment(usize),
    DeleteIncome(usize),
    DeleteEntry(usize),
    ReviseInvoice(Decimal),
    ReviseOpening(Decimal),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3, amount()).prop_map(|(b, q)| Op::Use(b, q)),
        (0usize..3, amount()).prop_map(|(b, q)| Op::Transfer(b, q)),
        (0usize..3, amount()).prop_map(|(b, a)| Op::PayBatch(b, a)),
        amount().prop_map(Op::PayVendor),
        amount().prop_map(Op::Collect),
        (0usize..8, prop::option::of(0usize..3), amount())
            .prop_map(|(i, b, a)| Op::EditPayment(i, b, a)),
        (0usize..8, amount()).prop_map(|(i, a)| Op::EditIncome(i, a)),
        (0usize..8).prop_map(Op::DeletePayment),
        (0usize..8).prop_map(Op::DeleteIncome),
        (0usize..16).prop_map(Op::DeleteEntry),
        (1i64..300_000i64).prop_map(|cents| Op::ReviseInvoice(Decimal::new(cents, 2))),
        amount().prop_map(Op::ReviseOpening),
    ]
}

struct World {
    f: Fixture,
    vendor: VendorId,
    site: ProjectId,
    material: MaterialId,
    batches: Vec<BatchId>,
    invoice: InvoiceId,
}

fn world() -> World {
    let mut f = Fixture::default();
    let vendor = f.vendor("Shree Cement Traders");
    let godown = f.godown("Central Godown");
    let site = f.site("Riverside Towers", Decimal::new(1_000_000, 0));
    let material = f.material("Cement");
    let batches = [(100, 10), (40, 25), (75, 3)]
        .into_iter()
        .map(|(q, p)| {
            f.purchase(material, Some(vendor), Some(godown), Decimal::from(q), Decimal::from(p))
                .unwrap()
        })
        .collect();
    let invoice = f.invoice(site, Decimal::new(2_500, 0));
    World {
        f,
        vendor,
        site,
        material,
        batches,
        invoice,
    }
}

/// The `i`th item of `items`, wrapping; `None` when empty.
fn pick<T>(mut items: impl ExactSizeIterator<Item = T>, i: usize) -> Option<T> {
    let len = items.len();
    if len == 0 {
        return None;
    }
    items.nth(i % len)
}

impl World {
    fn run(&mut self, op: &Op) -> bool {
        let result = match op {
            Op::Use(b, q) => self
                .f
                .usage(self.material, self.batches[*b], *q, Some(self.site))
                .map(|_| ()),
            Op::Transfer(b, q) => self
                .f
                .transfer(self.material, self.batches[*b], *q, self.site)
                .map(|_| ()),
            Op::PayBatch(b, a) => self
                .f
                .pay(None, self.vendor, Some(self.batches[*b]), *a)
                .map(|_| ()),
            Op::PayVendor(a) => self.f.pay(None, self.vendor, None, *a).map(|_| ()),
            Op::Collect(a) => self.f.collect(None, self.invoice, *a).map(|_| ()),
            Op::EditPayment(i, b, a) => {
                let Some(id) = pick(self.f.state.payments.iter().map(|p| p.id), *i) else {
                    return false;
                };
                let batch = b.map(|b| self.batches[b]);
                self.f.pay(Some(id), self.vendor, batch, *a).map(|_| ())
            }
            Op::EditIncome(i, a) => {
                let Some(id) = pick(self.f.state.incomes.iter().map(|r| r.id), *i) else {
                    return false;
                };
                self.f.collect(Some(id), self.invoice, *a).map(|_| ())
            }
            Op::DeletePayment(i) => {
                let Some(id) = pick(self.f.state.payments.iter().map(|p| p.id), *i) else {
                    return false;
                };
                self.f.apply(Command::Delete(EntityRef::Payment(id))).map(|_| ())
            }
            Op::DeleteIncome(i) => {
                let Some(id) = pick(self.f.state.incomes.iter().map(|r| r.id), *i) else {
                    return false;
                };
                self.f.apply(Command::Delete(EntityRef::Income(id))).map(|_| ())
            }
            Op::DeleteEntry(i) => {
                let material = self.f.state.material(self.material);
                let history = material.map_or(&[][..], |m| m.history.as_slice());
                let Some(entry_id) = pick(history.iter().map(|e| e.id), *i) else {
                    return false;
                };
                self.f
                    .apply(Command::DeleteStockEntry {
                        material_id: self.material,
                        entry_id,
                    })
                    .map(|_| ())
            }
            Op::ReviseInvoice(a) => self
                .f
                .apply(Command::UpsertInvoice(InvoiceInput {
                    id: Some(self.invoice),
                    project_id: self.site,
                    date: day(5),
                    due_date: Some(day(25)),
                    amount: *a,
                    description: "Running bill".to_string(),
                    status: "Sent".to_string(),
                }))
                .map(|_| ()),
            Op::ReviseOpening(a) => self
                .f
                .apply(Command::UpsertVendor(VendorInput {
                    id: Some(self.vendor),
                    name: "Shree Cement Traders".to_string(),
                    phone: String::new(),
                    address: String::new(),
                    category: "Cement".to_string(),
                    opening_balance: *a,
                }))
                .map(|_| ()),
        };
        result.is_ok()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every ledger invariant holds after any command sequence.
    #[test]
    fn prop_invariants_hold_after_any_sequence(ops in prop::collection::vec(op(), 1..25)) {
        let mut w = world();
        for op in &ops {
            let before = w.f.state.clone();
            if !w.run(op) {
                prop_assert_eq!(&w.f.state, &before);
            }
        }

        let state = &w.f.state;
        let material = state.material(w.material).unwrap();
        for batch in BatchTracker::inward_batches(material, BatchQuery::all()) {
            prop_assert!(batch.available >= Decimal::ZERO);
            prop_assert_eq!(batch.deficit, Decimal::ZERO);
            let settlement = SettlementCalculator::batch(&batch, &state.payments, None);
            prop_assert!(!settlement.overpaid);
        }

        for invoice in SettlementCalculator::invoices(state) {
            prop_assert!(!invoice.overcollected);
        }

        let vendor = SettlementCalculator::vendor(state, w.vendor, None);
        prop_assert!(vendor.balance >= Decimal::ZERO);
        prop_assert!(!vendor.overpaid);

        prop_assert!(audit(state).is_empty());
    }

    /// Usage lowers stock by its quantity and transfers move none. Stock on
    /// hand always equals what the batches still hold.
    #[test]
    fn prop_transfers_conserve_stock(ops in prop::collection::vec(op(), 1..25)) {
        let mut w = world();
        for op in &ops {
            let before = w.f.state.material(w.material).unwrap().in_stock();
            if !w.run(op) {
                continue;
            }
            let after = w.f.state.material(w.material).unwrap().in_stock();
            match op {
                Op::Use(_, q) => prop_assert_eq!(after, before - *q),
                Op::DeleteEntry(_) => {}
                _ => prop_assert_eq!(after, before),
            }
        }

        let material = w.f.state.material(w.material).unwrap();
        let held: Decimal = BatchTracker::inward_batches(material, BatchQuery::all())
            .iter()
            .map(|b| b.available)
            .sum();
        prop_assert_eq!(material.in_stock(), held);
    }

    /// Projections on the final snapshot are repeatable.
    #[test]
    fn prop_projections_idempotent(ops in prop::collection::vec(op(), 1..15)) {
        let mut w = world();
        for op in &ops {
            w.run(op);
        }
        let state = w.f.state.clone();

        prop_assert_eq!(
            BatchTracker::open_batches_across(&state, BatchQuery::viewing(w.site)),
            BatchTracker::open_batches_across(&state, BatchQuery::viewing(w.site))
        );
        prop_assert_eq!(SettlementCalculator::vendors(&state), SettlementCalculator::vendors(&state));
        prop_assert_eq!(state, w.f.state);
    }
}
