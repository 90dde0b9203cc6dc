//! Demonstration snapshot seeder for Sitebook development and testing.
//!
//! Seeds a godown, a site, two vendors, and materials that have been
//! purchased, moved to site, used and partly paid for, plus a running bill
//! with a partial collection. The snapshot is written to the configured
//! persistence gateway under the configured sync id.
//!
//! Usage: cargo run --bin seeder [-- --force]

use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate, Utc};
use clap::Parser;
use rust_decimal::Decimal;
use sitebook_core::ledger::{
    Command, EntityRef, IncomeInput, InvoiceInput, LedgerStore, MaterialInput, PaymentInput,
    ProjectInput, PurchaseInput, TransferInput, UsageInput, VendorInput,
};
use sitebook_core::storage::open_gateway;
use sitebook_shared::AppConfig;
use sitebook_shared::types::{BatchId, InvoiceId, MaterialId, ProjectId, VendorId};

#[derive(Parser)]
#[command(name = "seeder", about = "Seed a demonstration ledger snapshot")]
struct Args {
    /// Overwrite a snapshot already stored under the sync id.
    #[arg(long)]
    force: bool,
}

struct Sites {
    godown: ProjectId,
    tower: ProjectId,
}

struct Vendors {
    cement: VendorId,
    steel: VendorId,
}

struct Materials {
    cement: MaterialId,
    steel: MaterialId,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = AppConfig::load().context("loading configuration")?;
    let gateway = open_gateway(&config.storage)?;
    let sync_id = config.sync.sync_id;

    println!("Connecting to {} storage...", gateway.name());
    if !args.force && gateway.load_state(&sync_id).await?.is_some() {
        println!("  Snapshot '{sync_id}' already exists, skipping (pass --force to overwrite)");
        return Ok(());
    }

    let mut store = LedgerStore::default();

    println!("Seeding projects...");
    let sites = seed_projects(&mut store)?;

    println!("Seeding vendors...");
    let vendors = seed_vendors(&mut store)?;

    println!("Seeding materials...");
    let materials = seed_materials(&mut store)?;

    println!("Seeding stock movements...");
    let batches = seed_stock(&mut store, &sites, &vendors, &materials)?;

    println!("Seeding vendor payments...");
    seed_payments(&mut store, &vendors, &batches)?;

    println!("Seeding client billing...");
    seed_billing(&mut store, &sites)?;

    let snapshot = store.snapshot();
    gateway.save_state(&sync_id, &snapshot).await?;
    println!(
        "Seeding complete! Revision {} stored under '{sync_id}'",
        snapshot.revision
    );
    Ok(())
}

fn days_ago(days: i64) -> NaiveDate {
    (Utc::now() - Duration::days(days)).date_naive()
}

fn amount(value: i64) -> Decimal {
    Decimal::from(value)
}

fn dispatch(store: &mut LedgerStore, command: Command) -> Result<EntityRef> {
    let name = command.name();
    match store.dispatch(command)? {
        Some(affected) => Ok(affected),
        None => bail!("{name} did not report the record it touched"),
    }
}

fn project(store: &mut LedgerStore, input: ProjectInput) -> Result<ProjectId> {
    let name = input.name.clone();
    let EntityRef::Project(id) = dispatch(store, Command::UpsertProject(input))? else {
        bail!("unexpected record for project {name}");
    };
    println!("  Created project: {name}");
    Ok(id)
}

fn vendor(store: &mut LedgerStore, name: &str, category: &str, opening: i64) -> Result<VendorId> {
    let command = Command::UpsertVendor(VendorInput {
        id: None,
        name: name.to_string(),
        phone: "+91 98450 00000".to_string(),
        address: "Industrial Area, Phase 2".to_string(),
        category: category.to_string(),
        opening_balance: amount(opening),
    });
    let EntityRef::Vendor(id) = dispatch(store, command)? else {
        bail!("unexpected record for vendor {name}");
    };
    println!("  Created vendor: {name}");
    Ok(id)
}

fn material(store: &mut LedgerStore, name: &str, unit: &str, cost: i64) -> Result<MaterialId> {
    let command = Command::UpsertMaterial(MaterialInput {
        id: None,
        name: name.to_string(),
        unit: unit.to_string(),
        cost_per_unit: amount(cost),
    });
    let EntityRef::Material(id) = dispatch(store, command)? else {
        bail!("unexpected record for material {name}");
    };
    println!("  Created material: {name}");
    Ok(id)
}

fn stock_entry(affected: EntityRef) -> Result<BatchId> {
    match affected {
        EntityRef::StockEntry(id) => Ok(id),
        other => bail!("expected a stock entry, got {other:?}"),
    }
}

fn seed_projects(store: &mut LedgerStore) -> Result<Sites> {
    let godown = project(
        store,
        ProjectInput {
            id: None,
            name: "Central Godown".to_string(),
            client: String::new(),
            location: "Peenya".to_string(),
            budget: None,
            status: "In Progress".to_string(),
            start_date: None,
            end_date: None,
            is_godown: true,
        },
    )?;
    let tower = project(
        store,
        ProjectInput {
            id: None,
            name: "Lakeview Residency - Tower A".to_string(),
            client: "Lakeview Developers".to_string(),
            location: "Hebbal".to_string(),
            budget: Some(amount(4_500_000)),
            status: "In Progress".to_string(),
            start_date: Some(days_ago(60)),
            end_date: Some(days_ago(-300)),
            is_godown: false,
        },
    )?;
    Ok(Sites { godown, tower })
}

fn seed_vendors(store: &mut LedgerStore) -> Result<Vendors> {
    Ok(Vendors {
        cement: vendor(store, "Shree Cement Traders", "Cement", 0)?,
        steel: vendor(store, "Karnataka Steel Co.", "Steel", 25_000)?,
    })
}

fn seed_materials(store: &mut LedgerStore) -> Result<Materials> {
    Ok(Materials {
        cement: material(store, "OPC 53 Cement", "Bags", 380)?,
        steel: material(store, "TMT Bar 12mm", "Kg", 68)?,
    })
}

struct Batches {
    cement: BatchId,
    steel: BatchId,
}

fn seed_stock(
    store: &mut LedgerStore,
    sites: &Sites,
    vendors: &Vendors,
    materials: &Materials,
) -> Result<Batches> {
    let cement = stock_entry(dispatch(
        store,
        Command::RecordPurchase(PurchaseInput {
            project_id: Some(sites.godown),
            vendor_id: Some(vendors.cement),
            material_id: materials.cement,
            quantity: amount(500),
            unit_price: amount(365),
            date: days_ago(30),
            payment_method: "Credit".to_string(),
            note: Some("Monthly cement lot".to_string()),
        }),
    )?)?;
    println!("  Purchased 500 bags of cement into the godown");

    let steel = stock_entry(dispatch(
        store,
        Command::RecordPurchase(PurchaseInput {
            project_id: Some(sites.tower),
            vendor_id: Some(vendors.steel),
            material_id: materials.steel,
            quantity: amount(2_000),
            unit_price: amount(66),
            date: days_ago(25),
            payment_method: "Credit".to_string(),
            note: None,
        }),
    )?)?;
    println!("  Purchased 2000 kg of steel at site");

    let at_site = stock_entry(dispatch(
        store,
        Command::RecordTransfer(TransferInput {
            material_id: materials.cement,
            batch_id: cement,
            quantity: amount(200),
            to_project_id: sites.tower,
            date: days_ago(20),
            note: Some("Slab casting, level 3".to_string()),
        }),
    )?)?;
    println!("  Moved 200 bags of cement to site");

    dispatch(
        store,
        Command::RecordUsage(UsageInput {
            material_id: materials.cement,
            batch_id: at_site,
            quantity: amount(120),
            project_id: Some(sites.tower),
            date: days_ago(18),
            note: Some("Level 3 slab".to_string()),
        }),
    )?;
    dispatch(
        store,
        Command::RecordUsage(UsageInput {
            material_id: materials.steel,
            batch_id: steel,
            quantity: amount(1_400),
            project_id: Some(sites.tower),
            date: days_ago(17),
            note: None,
        }),
    )?;
    println!("  Recorded usage of cement and steel at site");

    Ok(Batches { cement, steel })
}

fn seed_payments(store: &mut LedgerStore, vendors: &Vendors, batches: &Batches) -> Result<()> {
    dispatch(
        store,
        Command::RecordPayment(PaymentInput {
            id: None,
            vendor_id: vendors.cement,
            amount: amount(100_000),
            batch_id: Some(batches.cement),
            project_id: None,
            date: days_ago(10),
            method: "Bank Transfer".to_string(),
            reference: Some("NEFT-20931".to_string()),
        }),
    )?;
    dispatch(
        store,
        Command::RecordPayment(PaymentInput {
            id: None,
            vendor_id: vendors.steel,
            amount: amount(25_000),
            batch_id: None,
            project_id: None,
            date: days_ago(8),
            method: "Cheque".to_string(),
            reference: Some("CHQ-004512".to_string()),
        }),
    )?;
    dispatch(
        store,
        Command::RecordPayment(PaymentInput {
            id: None,
            vendor_id: vendors.steel,
            amount: amount(60_000),
            batch_id: Some(batches.steel),
            project_id: None,
            date: days_ago(5),
            method: "Bank Transfer".to_string(),
            reference: None,
        }),
    )?;
    println!("  Recorded 3 vendor payments");
    Ok(())
}

fn seed_billing(store: &mut LedgerStore, sites: &Sites) -> Result<()> {
    let EntityRef::Invoice(invoice) = dispatch(
        store,
        Command::UpsertInvoice(InvoiceInput {
            id: None,
            project_id: sites.tower,
            date: days_ago(15),
            due_date: Some(days_ago(-15)),
            amount: amount(850_000),
            description: "Running bill 1 - foundation and level 1-3 slabs".to_string(),
            status: "Sent".to_string(),
        }),
    )?
    else {
        bail!("unexpected record for invoice");
    };
    collect(store, invoice, 500_000)?;
    println!("  Raised running bill 1 with a partial collection");
    Ok(())
}

fn collect(store: &mut LedgerStore, invoice_id: InvoiceId, value: i64) -> Result<()> {
    dispatch(
        store,
        Command::RecordIncome(IncomeInput {
            id: None,
            invoice_id,
            amount: amount(value),
            project_id: None,
            date: days_ago(3),
            method: "RTGS".to_string(),
            description: "Part payment, running bill 1".to_string(),
        }),
    )?;
    Ok(())
}
