//! # Seed Data Generator
//!
//! Populates the database with products and a few sales for development.
//!
//! ## Usage
//! ```bash
//! # Generate 100 products and 20 sales (default)
//! cargo run -p shopkeep-db --bin seed
//!
//! # Generate custom amounts
//! cargo run -p shopkeep-db --bin seed -- --count 500 --sales 50
//!
//! # Specify database path
//! cargo run -p shopkeep-db --bin seed -- --db ./data/shopkeep.db
//! ```
//!
//! ## Generated Data
//! - Products named `{item} {size}` across a handful of categories
//! - Price: $0.99 - $12.49
//! - Stock: 0 - 40 (so some products show up as low stock)
//! - Sales of 1-3 lines against products that still have stock

use std::env;

use shopkeep_core::{Money, ProductInput, SaleLine};
use shopkeep_db::{Database, DbConfig, DbError};

/// Product names by category for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Beverages",
        &[
            "Cola", "Lemonade", "Iced Tea", "Orange Juice", "Sparkling Water", "Cold Brew",
        ],
    ),
    (
        "Snacks",
        &["Potato Chips", "Pretzels", "Trail Mix", "Granola Bar", "Popcorn", "Chocolate Bar"],
    ),
    (
        "Dairy",
        &["Whole Milk", "Greek Yogurt", "Cheddar", "Butter", "Cream Cheese"],
    ),
    (
        "Grocery",
        &["Spaghetti", "White Rice", "Peanut Butter", "Honey", "Oatmeal", "Flour"],
    ),
];

/// Size variants and their price add-on in cents
const SIZES: &[(&str, i64)] = &[("Small", 0), ("Regular", 100), ("Large", 250), ("Family", 450)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 100;
    let mut sales: usize = 20;
    let mut db_path = String::from("./shopkeep_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(100);
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(20);
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
                println!("Shopkeep Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 100)");
                println!("  -s, --sales <N>    Number of sales to record (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./shopkeep_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Shopkeep Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!("Sales:    {}", sales);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut product_ids = Vec::with_capacity(count);

    'outer: for (category_idx, (_category, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
                if product_ids.len() >= count {
                    break 'outer;
                }

                let input = generate_product(
                    name,
                    size,
                    *price_addon,
                    category_idx * 100 + name_idx * 10 + size_idx,
                );

                match db.products().create(&input).await {
                    Ok(product) => product_ids.push(product.id),
                    Err(e) => eprintln!("Failed to insert {}: {}", input.name, e),
                }
            }
        }
    }

    println!(
        "✓ Generated {} products in {:?}",
        product_ids.len(),
        start.elapsed()
    );

    println!();
    println!("Recording sales...");

    let mut recorded = 0;
    let mut rejected = 0;
    for seed in 0..sales {
        let lines = generate_sale(&product_ids, seed);
        match db.sales().process_sale(&lines).await {
            Ok(_) => recorded += 1,
            // Stock ran out for a generated line; that's expected with low stock
            Err(DbError::Core(_)) => rejected += 1,
            Err(e) => return Err(e.into()),
        }
    }

    println!("✓ Recorded {} sales ({} rejected for stock)", recorded, rejected);

    let summary = db.dashboard().summary().await?;
    println!();
    println!("Dashboard:");
    println!("  Products:   {}", summary.total_products);
    println!("  Low stock:  {}", summary.low_stock_products);
    println!("  Sales:      {}", summary.total_sales);
    println!("  Revenue:    {}", summary.total_revenue);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates a single product with realistic data.
fn generate_product(name: &str, size: &str, price_addon: i64, seed: usize) -> ProductInput {
    // Base $0.99 - $7.99 plus the size add-on
    let base_price = 99 + ((seed * 37) % 700) as i64;

    ProductInput {
        name: format!("{} {}", name, size),
        description: String::new(),
        price: Money::from_cents(base_price + price_addon),
        stock_quantity: ((seed * 13) % 41) as i64,
    }
}

/// Picks 1-3 lines from the generated products.
fn generate_sale(product_ids: &[i64], seed: usize) -> Vec<SaleLine> {
    if product_ids.is_empty() {
        return Vec::new();
    }

    let line_count = 1 + seed % 3;
    (0..line_count)
        .map(|line| {
            let idx = (seed * 7 + line * 11) % product_ids.len();
            SaleLine::new(product_ids[idx], 1 + ((seed + line) % 3) as i64)
        })
        .collect()
}
