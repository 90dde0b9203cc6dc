//! Property-based tests for SettlementCalculator.
//!
//! - Remaining is never negative and never exceeds the bill
//! - Projections are idempotent and leave the snapshot untouched

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use sitebook_shared::types::{IncomeId, InvoiceId, PaymentId, ProjectId, VendorId};

use super::calculator::SettlementCalculator;
use crate::store::{Income, Invoice, LedgerState, Payment, Vendor};

/// Strategy for amounts (0.01 to 10,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
}

fn invoice(amount: Decimal) -> Invoice {
    Invoice {
        id: InvoiceId::new(),
        project_id: ProjectId::new(),
        date: date(),
        due_date: None,
        amount,
        description: String::new(),
        status: "Sent".to_string(),
    }
}

fn income(invoice_id: InvoiceId, amount: Decimal) -> Income {
    Income {
        id: IncomeId::new(),
        project_id: None,
        date: date(),
        amount,
        description: String::new(),
        method: "Bank".to_string(),
        invoice_id: Some(invoice_id),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Remaining stays within [0, amount] whatever has been collected.
    #[test]
    fn prop_invoice_remaining_bounded(
        billed in amount(),
        collections in prop::collection::vec(amount(), 0..6),
    ) {
        let inv = invoice(billed);
        let incomes: Vec<Income> = collections.iter().map(|a| income(inv.id, *a)).collect();

        let s = SettlementCalculator::invoice(&inv, &incomes, None);
        prop_assert!(s.remaining >= Decimal::ZERO);
        prop_assert!(s.remaining <= billed);
        prop_assert_eq!(s.collected, collections.iter().copied().sum::<Decimal>());
    }

    /// Excluding an income adds exactly its amount back to the headroom.
    #[test]
    fn prop_excluding_income_restores_its_amount(
        billed in amount(),
        edited in amount(),
    ) {
        prop_assume!(edited <= billed);
        let inv = invoice(billed);
        let existing = income(inv.id, edited);

        let s = SettlementCalculator::invoice(&inv, std::slice::from_ref(&existing), Some(existing.id));
        prop_assert_eq!(s.remaining, billed);
    }

    /// Vendor projection twice on one snapshot gives the same answer.
    #[test]
    fn prop_vendor_projection_idempotent(
        opening in amount(),
        payments in prop::collection::vec(amount(), 0..5),
    ) {
        let vendor = Vendor {
            id: VendorId::new(),
            name: "Balaji Steel".to_string(),
            phone: String::new(),
            address: String::new(),
            category: "Steel".to_string(),
            opening_balance: opening,
        };
        let state = LedgerState {
            payments: payments
                .iter()
                .map(|a| Payment {
                    id: PaymentId::new(),
                    date: date(),
                    vendor_id: vendor.id,
                    project_id: None,
                    amount: *a,
                    method: "Cash".to_string(),
                    reference: None,
                    material_batch_id: None,
                })
                .collect(),
            vendors: vec![vendor.clone()],
            ..LedgerState::default()
        };
        let snapshot = state.clone();

        let first = SettlementCalculator::vendor(&state, vendor.id, None);
        let second = SettlementCalculator::vendor(&state, vendor.id, None);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.balance >= Decimal::ZERO);
        prop_assert_eq!(state, snapshot);
    }
}
