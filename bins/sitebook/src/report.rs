//! Plain-text and JSON rendering of ledger reports.

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::{Value, json};
use sitebook_core::batch::{BatchQuery, BatchTracker};
use sitebook_core::ledger::IntegrityIssue;
use sitebook_core::reports::ReportService;
use sitebook_core::settlement::{InvoiceState, SettlementCalculator};
use sitebook_core::store::LedgerState;
use sitebook_shared::types::ProjectId;

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn summary(state: &LedgerState, as_json: bool) -> Result<()> {
    let projects = ReportService::project_summaries(state);
    let totals = ReportService::dashboard(state);
    if as_json {
        return print_json(&json!({ "projects": projects, "totals": totals }));
    }

    println!(
        "{:<28} {:>14} {:>14} {:>14} {:>14} {:>8}",
        "PROJECT", "BUDGET", "SPENT", "INVOICED", "RECEIVABLE", "USED %"
    );
    for p in &projects {
        let budget = p.budget.map_or_else(|| "-".to_string(), |b| b.to_string());
        let marker = if p.is_over_budget() { "!" } else { "" };
        println!(
            "{:<28} {:>14} {:>14} {:>14} {:>14} {:>7}{marker}",
            p.name, budget, p.spent, p.invoiced, p.receivable, p.utilization_percent
        );
    }

    println!();
    println!("expenses          {}", totals.expenses);
    println!("incomes           {}", totals.incomes);
    println!("vendor payables   {}", totals.vendor_payables);
    println!("receivables       {}", totals.receivables);
    println!("stock value       {}", totals.stock_value);
    println!("active projects   {}", totals.active_projects);
    Ok(())
}

pub fn batches(state: &LedgerState, project: Option<ProjectId>, as_json: bool) -> Result<()> {
    let query = project.map_or(BatchQuery::all(), BatchQuery::at);
    let batches = BatchTracker::open_batches_across(state, query);

    if as_json {
        let rows: Vec<Value> = batches
            .iter()
            .map(|b| {
                json!({
                    "batchId": b.batch_id,
                    "material": b.material_name,
                    "kind": b.kind.as_str(),
                    "project": state.project_label(b.project_id),
                    "vendor": state.vendor_label(b.vendor_id),
                    "unitPrice": b.unit_price,
                    "available": b.available,
                    "stockValue": b.stock_value(),
                    "date": b.origin_date,
                })
            })
            .collect();
        return print_json(&rows);
    }

    println!(
        "{:<36} {:<18} {:<20} {:>10} {:>10} {:>12}",
        "BATCH", "MATERIAL", "AT", "AVAILABLE", "PRICE", "VALUE"
    );
    for b in &batches {
        println!(
            "{:<36} {:<18} {:<20} {:>10} {:>10} {:>12}",
            b.batch_id,
            b.material_name,
            state.project_label(b.project_id),
            b.available,
            b.unit_price,
            b.stock_value()
        );
    }
    Ok(())
}

pub fn vendors(state: &LedgerState, as_json: bool) -> Result<()> {
    let settlements = SettlementCalculator::vendors(state);
    if as_json {
        return print_json(&settlements);
    }

    println!(
        "{:<28} {:>14} {:>14} {:>14} {:>14}",
        "VENDOR", "OPENING", "PURCHASED", "PAID", "BALANCE"
    );
    for v in &settlements {
        println!(
            "{:<28} {:>14} {:>14} {:>14} {:>14}",
            state.vendor_label(Some(v.vendor_id)),
            v.opening_balance,
            v.purchased,
            v.paid,
            v.balance
        );
    }
    Ok(())
}

pub fn invoices(state: &LedgerState, today: NaiveDate, as_json: bool) -> Result<()> {
    let settlements = SettlementCalculator::invoices(state);
    if as_json {
        let rows: Vec<Value> = settlements
            .iter()
            .map(|s| json!({ "settlement": s, "state": s.state_on(today) }))
            .collect();
        return print_json(&rows);
    }

    println!(
        "{:<36} {:>14} {:>14} {:>14} {:<14}",
        "INVOICE", "AMOUNT", "COLLECTED", "REMAINING", "STATE"
    );
    for s in &settlements {
        println!(
            "{:<36} {:>14} {:>14} {:>14} {:<14}",
            s.invoice_id,
            s.amount,
            s.collected,
            s.remaining,
            state_label(s.state_on(today))
        );
    }
    Ok(())
}

pub fn issues(issues: &[IntegrityIssue], as_json: bool) -> Result<()> {
    if as_json {
        return print_json(&issues);
    }
    if issues.is_empty() {
        println!("no integrity issues");
    }
    for issue in issues {
        println!("- {issue}");
    }
    Ok(())
}

fn state_label(state: InvoiceState) -> &'static str {
    match state {
        InvoiceState::Unpaid => "unpaid",
        InvoiceState::PartiallyPaid => "partially paid",
        InvoiceState::Paid => "paid",
        InvoiceState::Overdue => "overdue",
    }
}
