//! Unit tests for LedgerEngine.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sitebook_shared::types::ExpenseId;

use super::command::{Command, ConfigChange, EntityRef, ExpenseInput, InvoiceInput, VendorInput};
use super::engine::LedgerEngine;
use super::error::{LedgerError, SettlementTarget};
use super::fixtures::{Fixture, day};
use super::integrity::audit;
use crate::batch::{BatchQuery, BatchTracker};
use crate::settlement::SettlementCalculator;
use crate::store::{ConfigList, InventoryAction, StockMovement};

// ========== Worked scenarios ==========

#[test]
fn test_usage_draws_down_and_rejects_overdraw() {
    let mut f = Fixture::default();
    let m = f.material("Cement");
    let batch = f.purchase(m, None, None, dec!(100), dec!(10)).unwrap();
    assert_eq!(f.batch(m, batch).bill_value(), dec!(1000));

    f.usage(m, batch, dec!(30), None).unwrap();
    assert_eq!(f.batch(m, batch).available, dec!(70));

    let before = f.state.clone();
    let err = f.usage(m, batch, dec!(80), None).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientStock { requested, available, .. }
            if requested == dec!(80) && available == dec!(70)
    ));
    assert_eq!(f.state, before);
    assert_eq!(f.batch(m, batch).available, dec!(70));
}

#[test]
fn test_purchase_then_partial_payment() {
    let mut f = Fixture::default();
    let v = f.vendor("Shree Cement Traders");
    let m = f.material("Cement");
    assert_eq!(SettlementCalculator::vendor(&f.state, v, None).balance, Decimal::ZERO);

    let batch = f.purchase(m, Some(v), None, dec!(50), dec!(20)).unwrap();
    assert_eq!(SettlementCalculator::vendor(&f.state, v, None).balance, dec!(1000));
    assert_eq!(f.batch(m, batch).bill_value(), dec!(1000));

    f.pay(None, v, Some(batch), dec!(600)).unwrap();
    let settled = SettlementCalculator::batch(&f.batch(m, batch), &f.state.payments, None);
    assert_eq!(SettlementCalculator::vendor(&f.state, v, None).balance, dec!(400));
    assert_eq!(settled.remaining, dec!(400));
    assert!(!settled.is_fully_paid);

    let err = f.pay(None, v, Some(batch), dec!(500)).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Overpayment { target: SettlementTarget::Batch, headroom, .. }
            if headroom == dec!(400)
    ));
    assert_eq!(SettlementCalculator::vendor(&f.state, v, None).balance, dec!(400));
}

#[test]
fn test_invoice_collection_and_overcollection() {
    let mut f = Fixture::default();
    let site = f.site("Riverside Towers", dec!(500000));
    let inv = f.invoice(site, dec!(10000));

    f.collect(None, inv, dec!(10000)).unwrap();
    let s = SettlementCalculator::invoice(f.state.invoice(inv).unwrap(), &f.state.incomes, None);
    assert_eq!(s.remaining, Decimal::ZERO);
    assert!(s.is_paid);

    let err = f.collect(None, inv, dec!(1)).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Overpayment { target: SettlementTarget::Invoice, .. }
    ));
}

#[test]
fn test_editing_payment_uses_its_old_amount_as_headroom() {
    let mut f = Fixture::default();
    let v = f.vendor("Balaji Steel");
    let m = f.material("TMT Bars");
    let batch = f.purchase(m, Some(v), None, dec!(10), dec!(50)).unwrap();
    let paid = f.pay(None, v, Some(batch), dec!(200)).unwrap();
    let s = SettlementCalculator::batch(&f.batch(m, batch), &f.state.payments, None);
    assert_eq!(s.remaining, dec!(300));

    f.pay(Some(paid), v, Some(batch), dec!(450)).unwrap();
    assert_eq!(f.state.payments.len(), 1);
    assert_eq!(f.state.payment(paid).unwrap().amount, dec!(450));

    let err = f.pay(Some(paid), v, Some(batch), dec!(600)).unwrap_err();
    assert!(matches!(err, LedgerError::Overpayment { .. }));
    assert_eq!(f.state.payment(paid).unwrap().amount, dec!(450));
}

// ========== Stock movements ==========

#[test]
fn test_purchase_records_expense_and_stamped_entry() {
    let mut f = Fixture::default();
    let v = f.vendor("Shree Cement Traders");
    let m = f.material("Cement");
    let batch = f.purchase(m, Some(v), None, dec!(50), dec!(385.50)).unwrap();

    let (_, entry) = f.state.stock_entry(batch).unwrap();
    assert_eq!(entry.kind, StockMovement::Purchase);
    assert_eq!(entry.unit_price, Some(dec!(385.50)));

    let expense = f.state.expense(entry.expense_id.unwrap()).unwrap();
    assert_eq!(expense.inventory_action, Some(InventoryAction::Purchase));
    assert_eq!(expense.amount, dec!(19275));
    assert_eq!(f.state.material(m).unwrap().total_purchased(), dec!(50));
    assert_eq!(f.state.revision, 3);
}

#[rstest::rstest]
#[case(dec!(0), dec!(10))]
#[case(dec!(-5), dec!(10))]
#[case(dec!(5), dec!(-1))]
fn test_purchase_rejects_bad_quantities(#[case] quantity: Decimal, #[case] price: Decimal) {
    let mut f = Fixture::default();
    let m = f.material("Sand");
    let err = f.purchase(m, None, None, quantity, price).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn test_purchase_total_out_of_range_is_rejected() {
    let mut f = Fixture::default();
    let m = f.material("Sand");
    let before = f.state.clone();

    let err = f.purchase(m, None, None, Decimal::MAX, dec!(2)).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(ref msg) if msg.contains("out of range")));
    assert_eq!(f.state, before);
}

#[test]
fn test_purchase_rejects_missing_vendor() {
    let mut f = Fixture::default();
    let m = f.material("Sand");
    let err = f
        .purchase(m, Some(sitebook_shared::types::VendorId::new()), None, dec!(1), dec!(1))
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "vendor", .. }));
}

#[test]
fn test_usage_records_negative_expense_quantity_and_keeps_vendor_balance() {
    let mut f = Fixture::default();
    let v = f.vendor("Shree Cement Traders");
    let site = f.site("Riverside Towers", dec!(100000));
    let m = f.material("Cement");
    let batch = f.purchase(m, Some(v), Some(site), dec!(20), dec!(400)).unwrap();
    let balance = SettlementCalculator::vendor(&f.state, v, None).balance;

    let used = f.usage(m, batch, dec!(5), Some(site)).unwrap();

    let (_, entry) = f.state.stock_entry(used).unwrap();
    assert_eq!(entry.quantity, dec!(-5));
    assert_eq!(entry.parent_purchase_id, Some(batch));
    let expense = f.state.expense(entry.expense_id.unwrap()).unwrap();
    assert_eq!(expense.material_quantity, Some(dec!(-5)));
    assert_eq!(expense.amount, dec!(2000));
    assert_eq!(SettlementCalculator::vendor(&f.state, v, None).balance, balance);
}

#[test]
fn test_transfer_creates_paired_legs() {
    let mut f = Fixture::default();
    let v = f.vendor("Shree Cement Traders");
    let godown = f.godown("Central Godown");
    let site = f.site("Riverside Towers", dec!(100000));
    let m = f.material("Cement");
    let source = f.purchase(m, Some(v), Some(godown), dec!(100), dec!(10)).unwrap();
    let expenses = f.state.expenses.len();
    let balance = SettlementCalculator::vendor(&f.state, v, None).balance;

    let arrived = f.transfer(m, source, dec!(40), site).unwrap();

    assert_eq!(f.batch(m, source).available, dec!(60));
    let landed = f.batch(m, arrived);
    assert_eq!(landed.available, dec!(40));
    assert_eq!(landed.unit_price, dec!(10));
    assert_eq!(landed.vendor_id, Some(v));
    assert_eq!(landed.project_id, Some(site));

    let (material, inward) = f.state.stock_entry(arrived).unwrap();
    let outward = material.entry(inward.transfer_peer_id.unwrap()).unwrap();
    assert_eq!(outward.transfer_peer_id, Some(arrived));
    assert_eq!(outward.quantity, dec!(-40));
    assert_eq!(material.in_stock(), dec!(100));

    assert_eq!(f.state.expenses.len(), expenses);
    assert_eq!(SettlementCalculator::vendor(&f.state, v, None).balance, balance);

    let at_site = BatchTracker::open_batches(material, BatchQuery::at(site));
    assert_eq!(at_site.len(), 1);
    assert_eq!(at_site[0].batch_id, arrived);
}

#[test]
fn test_transfer_rejects_same_project_and_overdraw() {
    let mut f = Fixture::default();
    let godown = f.godown("Central Godown");
    let site = f.site("Riverside Towers", dec!(100000));
    let m = f.material("Bricks");
    let batch = f.purchase(m, None, Some(godown), dec!(10), dec!(8)).unwrap();

    assert!(matches!(
        f.transfer(m, batch, dec!(1), godown),
        Err(LedgerError::Validation(_))
    ));
    assert!(matches!(
        f.transfer(m, batch, dec!(11), site),
        Err(LedgerError::InsufficientStock { .. })
    ));
}

#[test]
fn test_transferred_batch_cannot_be_paid() {
    let mut f = Fixture::default();
    let v = f.vendor("Shree Cement Traders");
    let godown = f.godown("Central Godown");
    let site = f.site("Riverside Towers", dec!(100000));
    let m = f.material("Cement");
    let source = f.purchase(m, Some(v), Some(godown), dec!(10), dec!(10)).unwrap();
    let arrived = f.transfer(m, source, dec!(5), site).unwrap();

    let err = f.pay(None, v, Some(arrived), dec!(10)).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

// ========== Settlements ==========

#[test]
fn test_payment_bounded_by_vendor_balance_without_batch() {
    let mut f = Fixture::default();
    let v = f.vendor("Balaji Steel");
    let m = f.material("TMT Bars");
    f.purchase(m, Some(v), None, dec!(2), dec!(100)).unwrap();

    f.pay(None, v, None, dec!(200.01)).unwrap();
    assert_eq!(SettlementCalculator::vendor(&f.state, v, None).balance, Decimal::ZERO);

    let err = f.pay(None, v, None, dec!(1)).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Overpayment { target: SettlementTarget::Vendor, .. }
    ));
}

#[test]
fn test_payment_rejects_batch_from_other_vendor() {
    let mut f = Fixture::default();
    let a = f.vendor("Shree Cement Traders");
    let b = f.vendor("Balaji Steel");
    let m = f.material("Cement");
    let batch = f.purchase(m, Some(a), None, dec!(10), dec!(10)).unwrap();
    f.purchase(m, Some(b), None, dec!(10), dec!(10)).unwrap();

    let err = f.pay(None, b, Some(batch), dec!(10)).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn test_opening_balance_counts_as_payable() {
    let mut f = Fixture::default();
    let v = f.vendor("Old Supplier");
    f.apply(Command::UpsertVendor(VendorInput {
        id: Some(v),
        name: "Old Supplier".to_string(),
        phone: String::new(),
        address: String::new(),
        category: "Hardware".to_string(),
        opening_balance: dec!(750),
    }))
    .unwrap();

    f.pay(None, v, None, dec!(700)).unwrap();

    let lowered = f.apply(Command::UpsertVendor(VendorInput {
        id: Some(v),
        name: "Old Supplier".to_string(),
        phone: String::new(),
        address: String::new(),
        category: "Hardware".to_string(),
        opening_balance: dec!(500),
    }));
    assert!(matches!(lowered, Err(LedgerError::Validation(_))));
}

#[test]
fn test_editing_income_reuses_its_headroom() {
    let mut f = Fixture::default();
    let site = f.site("Riverside Towers", dec!(500000));
    let inv = f.invoice(site, dec!(1000));
    let income = f.collect(None, inv, dec!(400)).unwrap();
    f.collect(None, inv, dec!(500)).unwrap();

    f.collect(Some(income), inv, dec!(500)).unwrap();
    assert!(f.collect(Some(income), inv, dec!(501)).is_err());
    assert_eq!(f.state.income(income).unwrap().project_id, Some(site));
}

#[test]
fn test_invoice_amount_cannot_drop_below_collected() {
    let mut f = Fixture::default();
    let site = f.site("Riverside Towers", dec!(500000));
    let inv = f.invoice(site, dec!(1000));
    f.collect(None, inv, dec!(800)).unwrap();

    let shrink = |amount| {
        Command::UpsertInvoice(InvoiceInput {
            id: Some(inv),
            project_id: site,
            date: day(5),
            due_date: None,
            amount,
            description: "Running bill".to_string(),
            status: "Sent".to_string(),
        })
    };
    assert!(matches!(
        f.apply(shrink(dec!(799))),
        Err(LedgerError::Validation(_))
    ));
    f.apply(shrink(dec!(800))).unwrap();
}

#[test]
fn test_godown_rules() {
    let mut f = Fixture::default();
    let godown = f.godown("Central Godown");

    let invoiced = f.apply(Command::UpsertInvoice(InvoiceInput {
        id: None,
        project_id: godown,
        date: day(1),
        due_date: None,
        amount: dec!(10),
        description: String::new(),
        status: "Sent".to_string(),
    }));
    assert!(matches!(invoiced, Err(LedgerError::Validation(_))));
}

// ========== Flat lifecycle ==========

#[test]
fn test_plain_expense_create_and_edit() {
    let mut f = Fixture::default();
    let site = f.site("Riverside Towers", dec!(100000));
    let input = ExpenseInput {
        id: None,
        date: day(7),
        project_id: Some(site),
        vendor_id: None,
        amount: dec!(1200),
        category: "Labour".to_string(),
        payment_method: "Cash".to_string(),
        notes: "Masons, week 10".to_string(),
    };
    let id = match f.apply(Command::RecordExpense(input.clone())).unwrap() {
        Some(EntityRef::Expense(id)) => id,
        other => panic!("unexpected {other:?}"),
    };

    f.apply(Command::RecordExpense(ExpenseInput {
        id: Some(id),
        amount: dec!(1500),
        ..input
    }))
    .unwrap();
    assert_eq!(f.state.expenses.len(), 1);
    assert_eq!(f.state.expense(id).unwrap().amount, dec!(1500));
}

#[test]
fn test_inventory_expense_not_editable_as_plain() {
    let mut f = Fixture::default();
    let m = f.material("Cement");
    let batch = f.purchase(m, None, None, dec!(1), dec!(1)).unwrap();
    let expense_id: ExpenseId = f.state.stock_entry(batch).unwrap().1.expense_id.unwrap();

    let err = f
        .apply(Command::RecordExpense(ExpenseInput {
            id: Some(expense_id),
            date: day(1),
            project_id: None,
            vendor_id: None,
            amount: dec!(5),
            category: "Misc".to_string(),
            payment_method: String::new(),
            notes: String::new(),
        }))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn test_delete_is_local_to_its_collection() {
    let mut f = Fixture::default();
    let v = f.vendor("Shree Cement Traders");
    let m = f.material("Cement");
    f.purchase(m, Some(v), None, dec!(10), dec!(10)).unwrap();

    f.apply(Command::Delete(EntityRef::Vendor(v))).unwrap();

    assert!(f.state.vendors.is_empty());
    assert_eq!(f.state.expenses.len(), 1);
    assert_eq!(f.state.vendor_label(f.state.expenses[0].vendor_id), "Unknown");

    let again = f.apply(Command::Delete(EntityRef::Vendor(v)));
    assert!(matches!(again, Err(LedgerError::NotFound { .. })));
}

#[test]
fn test_deleting_drawn_batch_is_rejected_but_transfer_pair_goes_together() {
    let mut f = Fixture::default();
    let godown = f.godown("Central Godown");
    let site = f.site("Riverside Towers", dec!(100000));
    let m = f.material("Cement");
    let batch = f.purchase(m, None, Some(godown), dec!(10), dec!(10)).unwrap();
    let arrived = f.transfer(m, batch, dec!(4), site).unwrap();

    let err = f.apply(Command::DeleteStockEntry {
        material_id: m,
        entry_id: batch,
    });
    assert!(matches!(err, Err(LedgerError::Validation(_))));

    f.apply(Command::Delete(EntityRef::StockEntry(arrived))).unwrap();
    let material = f.state.material(m).unwrap();
    assert_eq!(material.history.len(), 1);
    assert_eq!(f.batch(m, batch).available, dec!(10));
}

#[test]
fn test_deleting_paid_batch_is_rejected() {
    let mut f = Fixture::default();
    let v = f.vendor("Shree Cement Traders");
    let m = f.material("Cement");
    let batch = f.purchase(m, Some(v), None, dec!(50), dec!(20)).unwrap();
    let payment = f.pay(None, v, Some(batch), dec!(600)).unwrap();

    let before = f.state.clone();
    let err = f.apply(Command::DeleteStockEntry {
        material_id: m,
        entry_id: batch,
    });
    assert!(matches!(err, Err(LedgerError::Validation(ref msg)) if msg.contains("payments")));
    assert_eq!(f.state, before);

    f.apply(Command::Delete(EntityRef::Payment(payment))).unwrap();
    f.apply(Command::Delete(EntityRef::StockEntry(batch))).unwrap();
    assert!(f.state.material(m).unwrap().history.is_empty());
    assert!(audit(&f.state).is_empty());
}

#[test]
fn test_update_config_trims_and_deduplicates() {
    let mut f = Fixture::default();
    let units = |f: &Fixture| f.state.config.list(ConfigList::Units).len();
    let start = units(&f);

    f.apply(Command::UpdateConfig {
        list: ConfigList::Units,
        change: ConfigChange::Add(" Rft ".to_string()),
    })
    .unwrap();
    f.apply(Command::UpdateConfig {
        list: ConfigList::Units,
        change: ConfigChange::Add("Rft".to_string()),
    })
    .unwrap();
    assert_eq!(units(&f), start + 1);

    let blank = f.apply(Command::UpdateConfig {
        list: ConfigList::Units,
        change: ConfigChange::Add("   ".to_string()),
    });
    assert!(matches!(blank, Err(LedgerError::Validation(_))));

    f.apply(Command::UpdateConfig {
        list: ConfigList::Units,
        change: ConfigChange::Remove("Rft".to_string()),
    })
    .unwrap();
    assert_eq!(units(&f), start);
}

#[test]
fn test_apply_never_touches_input_snapshot() {
    let mut f = Fixture::default();
    let m = f.material("Cement");
    let before = f.state.clone();

    let transition = LedgerEngine::apply(
        &before,
        Command::RecordPurchase(super::command::PurchaseInput {
            project_id: None,
            vendor_id: None,
            material_id: m,
            quantity: dec!(5),
            unit_price: dec!(5),
            date: day(1),
            payment_method: String::new(),
            note: None,
        }),
    )
    .unwrap();

    assert_eq!(before, f.state);
    assert_eq!(transition.state.revision, before.revision + 1);
}
