//! # Seed Data Generator
//!
//! Populates the database with demo data for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./meridian_dev.db with the default 12 products per category
//! cargo run -p meridian-db --bin seed
//!
//! # Custom size and database
//! cargo run -p meridian-db --bin seed -- --count 40 --db ./data/meridian.db
//! ```
//!
//! ## Generated Data
//! - Sales channels (web shop, marketplace, social store, retail)
//! - Suppliers with a shipment each
//! - Products across categories, each with an inventory row; every
//!   seventh one starts below its threshold and raises an alert
//! - Sales orders spread over the last two weeks
//! - Imported marketplace orders with their sync log
//! - Quick replies and message templates

use chrono::{Duration, Utc};
use serde_json::json;
use std::env;
use tracing_subscriber::EnvFilter;

use meridian_core::{
    Money, NewInventory, NewLogistics, NewMessageTemplate, NewProduct, NewQuickReply,
    NewSalesChannel, NewSalesOrder, NewSalesOrderItem, NewSupplier, NewSyncedOrder,
    NewSyncedOrderItem, ProductFilter, ProductStatus, Rate, SUPPLIER_ACTIVE_STATUS,
};
use meridian_db::{Database, DbConfig};

/// (id, name, code, platform, commission bps)
const CHANNELS: &[(i64, &str, &str, &str, u32)] = &[
    (1, "Meridian Web Shop", "WEB", "ecommerce", 0),
    (2, "Tmall Flagship", "TMALL", "marketplace", 500),
    (3, "Douyin Store", "DOUYIN", "social", 800),
    (4, "Downtown Retail", "RETAIL", "direct", 0),
];

/// (id, name, email)
const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("SUP-001", "Acme Components", "sales@acme.example"),
    ("SUP-002", "Northwind Trading", "orders@northwind.example"),
    ("SUP-003", "Globex Accessories", "b2b@globex.example"),
];

/// (category id, SKU prefix, names)
const CATEGORIES: &[(i64, &str, &[&str])] = &[
    (
        1,
        "PHN",
        &["iPhone 15 Pro", "iPhone 15", "Galaxy S24", "Pixel 8", "Xperia 5"],
    ),
    (
        2,
        "AUD",
        &["AirPods Pro", "Galaxy Buds", "Studio Headphones", "Bluetooth Speaker"],
    ),
    (
        3,
        "ACC",
        &["Silicone Case", "Screen Protector", "USB-C Cable", "20W Charger", "Power Bank"],
    ),
];

const VARIANTS: &[(&str, i64)] = &[
    ("Black", 0),
    ("White", 0),
    ("Blue", 500),
    ("128GB", 0),
    ("256GB", 10_000),
    ("512GB", 30_000),
];

const QUICK_REPLIES: &[&str] = &[
    "Thanks, received.",
    "We will check and get back to you today.",
    "Please send the tracking number.",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 12;
    let mut db_path = String::from("./meridian_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(12);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Meridian Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Products per category (default: 12)");
                println!("  -d, --db <PATH>    Database file path (default: ./meridian_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    // Repository logs stay quiet unless RUST_LOG asks for them
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("🌱 Meridian Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Products per category: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let (_, existing) = db.products().list(&ProductFilter::default()).await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Channels
    for &(channel_id, name, code, platform, bps) in CHANNELS {
        db.channels()
            .create(&NewSalesChannel {
                channel_id,
                channel_name: name.to_string(),
                channel_code: Some(code.to_string()),
                platform_type: platform.to_string(),
                api_address: None,
                commission_rate_bps: Rate::from_bps(bps),
                channel_status: "active".to_string(),
                description: None,
            })
            .await?;
    }
    println!("✓ {} sales channels", CHANNELS.len());

    // Suppliers, one inbound shipment each
    for (idx, &(supplier_id, name, email)) in SUPPLIERS.iter().enumerate() {
        db.suppliers()
            .create(&NewSupplier {
                supplier_id: supplier_id.to_string(),
                supplier_name: name.to_string(),
                contact_info: Some(format!("+1 555 01{:02}", idx)),
                cooperation_status: SUPPLIER_ACTIVE_STATUS.to_string(),
                address: None,
                email: Some(email.to_string()),
            })
            .await?;

        db.logistics()
            .create(&NewLogistics {
                logistics_id: format!("LOG-{:04}", idx + 1),
                supplier_id: supplier_id.to_string(),
                order_reference_id: Some(format!("PO-{:04}", 100 + idx)),
                logistics_status: "in_transit".to_string(),
                logistics_details: None,
                tracking_number: Some(format!("1Z{:08}", 4242 + idx)),
                carrier_name: Some("UPS".to_string()),
                estimated_delivery_date: Some((Utc::now() + Duration::days(3)).date_naive()),
                actual_delivery_date: None,
            })
            .await?;
    }
    println!("✓ {} suppliers with shipments", SUPPLIERS.len());

    // Products + inventory
    let mut product_ids = Vec::new();
    let mut alerts = 0;
    for &(category_id, prefix, names) in CATEGORIES {
        let mut generated = 0;
        'names: for (name_idx, name) in names.iter().enumerate() {
            for (variant_idx, (variant, price_addon)) in VARIANTS.iter().enumerate() {
                if generated >= count {
                    break 'names;
                }

                let seed = (category_id as usize) * 1000 + name_idx * 20 + variant_idx;
                let product_id = seed as i64;
                let base_price = 1_999 + ((seed * 37) % 90_000) as i64;

                db.products()
                    .create(&NewProduct {
                        product_id,
                        product_name: format!("{} {}", name, variant),
                        sku: format!("{}-{:04}", prefix, seed),
                        description: None,
                        unit_price_cents: Some(Money::from_cents(base_price + price_addon)),
                        category_id,
                        status: if seed % 5 == 0 {
                            ProductStatus::Inactive
                        } else {
                            ProductStatus::Active
                        },
                        supplier_id: Some(SUPPLIERS[seed % SUPPLIERS.len()].0.to_string()),
                    })
                    .await?;

                let threshold = 20;
                let stock = if seed % 7 == 0 { 5 } else { 20 + (seed % 80) as i64 };
                let write = db
                    .inventory()
                    .create(&NewInventory {
                        inventory_id: product_id,
                        product_id,
                        current_stock_quantity: stock,
                        alert_threshold: threshold,
                    })
                    .await?;
                if write.raised_alert.is_some() {
                    alerts += 1;
                }

                product_ids.push((product_id, base_price + price_addon));
                generated += 1;
            }
        }
    }
    println!(
        "✓ {} products with inventory ({} low-stock alerts)",
        product_ids.len(),
        alerts
    );

    // Orders over the last 14 days
    let statuses = ["pending", "paid", "shipped", "completed", "cancelled"];
    let mut orders = 0;
    for n in 0..(product_ids.len() * 2) {
        let (product_id, unit_price) = product_ids[(n * 7) % product_ids.len()];
        let quantity = 1 + (n % 3) as i64;
        let total = Money::from_cents(unit_price * quantity);

        db.sales_orders()
            .create(&NewSalesOrder {
                order_id: 10_000 + n as i64,
                customer_user_id: format!("CUST-{:04}", n % 37),
                channel_id: CHANNELS[n % CHANNELS.len()].0,
                order_amount_cents: total,
                order_status: statuses[n % statuses.len()].to_string(),
                order_date: Some(Utc::now() - Duration::hours((n as i64 * 7) % (14 * 24))),
                order_items: vec![NewSalesOrderItem {
                    product_id,
                    quantity,
                    unit_price_cents: Money::from_cents(unit_price),
                    total_price_cents: total,
                }],
            })
            .await?;
        orders += 1;
    }
    println!("✓ {} sales orders", orders);

    // Imported marketplace orders
    for n in 0..5 {
        let synced_order_id = format!("TM-{}-{:04}", Utc::now().format("%Y%m%d"), n);
        let order = db
            .order_sync()
            .record_order(&NewSyncedOrder {
                synced_order_id: synced_order_id.clone(),
                external_customer_user_id: Some(format!("tm_buyer_{n}")),
                external_channel_code: "TMALL".to_string(),
                order_status_external: "WAIT_SELLER_SEND_GOODS".to_string(),
                order_amount_external_cents: Some(Money::from_cents(4_500)),
                order_created_at_external: Utc::now() - Duration::hours(n),
                raw_order_data: Some(json!({ "tid": synced_order_id, "payment": 45.0 })),
                internal_sales_order_id: None,
                items: vec![NewSyncedOrderItem {
                    external_product_id: Some(format!("TM-ITEM-{n}")),
                    product_sku: Some("ACC-3040".to_string()),
                    product_name_external: Some("Silicone Case".to_string()),
                    quantity: 3,
                    unit_price_external_cents: Money::from_cents(1_500),
                    total_price_external_cents: Money::from_cents(4_500),
                    raw_item_data: None,
                }],
            })
            .await?;

        db.order_sync()
            .append_log(&order.synced_order_id, "TMALL", "success", Some("Imported"))
            .await?;
    }
    println!("✓ 5 imported marketplace orders");

    // Messaging helpers
    for (sort_order, text) in QUICK_REPLIES.iter().enumerate() {
        db.communication()
            .create_quick_reply(&NewQuickReply {
                text: text.to_string(),
                sort_order: sort_order as i64,
                is_active: true,
            })
            .await?;
    }
    db.communication()
        .create_template(&NewMessageTemplate {
            title: "Restock request".to_string(),
            content: "Please confirm availability and lead time for the items below.".to_string(),
            category: Some("inventory".to_string()),
            is_active: true,
            created_by: None,
        })
        .await?;
    println!("✓ {} quick replies, 1 template", QUICK_REPLIES.len());

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}
