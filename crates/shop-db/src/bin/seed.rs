//! # Seed Data Generator
//!
//! Populates a development database with a small catalog, a few coupons
//! and an administrator account.
//!
//! ## Usage
//! ```bash
//! # Default database file
//! cargo run -p shop-db --bin seed
//!
//! # Specify database path and admin email
//! cargo run -p shop-db --bin seed -- --db ./data/shop.db --admin ops@shop.local
//! ```
//!
//! ## Generated Data
//! - Products: one per catalog entry, priced $4.99 - $89.99, stock 0 - 40
//! - Coupons: WELCOME10 (new users, 10%), FIVEOFF ($5, 100 uses), SPRING25 (25%, 30 days)
//! - Admin: `--admin` email, ACTIVE

use chrono::{Duration, Utc};
use std::env;

use shop_core::DiscountType;
use shop_db::{CouponInput, Database, DbConfig, DbError, ProductInput};

/// Catalog entries: (name, base price in cents)
const CATALOG: &[(&str, i64)] = &[
    ("Ceramic Mug", 1299),
    ("Travel Tumbler", 2499),
    ("Pour-Over Kettle", 5999),
    ("Burr Grinder", 8999),
    ("Paper Filters (100)", 499),
    ("Espresso Cups (Set of 2)", 1899),
    ("Cold Brew Jar", 2999),
    ("Milk Frother", 3499),
    ("Tea Infuser", 799),
    ("Canvas Tote", 1599),
    ("Coffee Scale", 4299),
    ("Gift Card Sleeve", 599),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./shop_dev.db");
    let mut admin_email = String::from("admin@shop.local");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin" | "-a" => {
                if i + 1 < args.len() {
                    admin_email = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: ./shop_dev.db)");
                println!("  -a, --admin <EMAIL>   Admin account email (default: admin@shop.local)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Storefront Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let admin = db.users().ensure_admin(&admin_email, "Store Administrator").await?;
    println!("✓ Admin account: {} ({})", admin.email, admin.id);

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping catalog seed to avoid duplicates.");
    } else {
        let mut generated = 0;
        for (idx, (name, price_cents)) in CATALOG.iter().enumerate() {
            let input = generate_product(name, *price_cents, idx);
            match db.products().insert(&input).await {
                Ok(product) => {
                    generated += 1;
                    println!("  {} {} @ {} ({} in stock)", product.sku, product.name, product.price(), product.stock);
                }
                Err(e) => eprintln!("Failed to insert {}: {}", name, e),
            }
        }
        println!("✓ Generated {} products", generated);
    }

    for coupon in coupons() {
        match db.coupons().insert(&coupon).await {
            Ok(created) => println!("✓ Coupon {}", created.code),
            Err(DbError::Domain(e)) => println!("  Coupon {} skipped: {}", coupon.code, e),
            Err(e) => return Err(e.into()),
        }
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Builds a catalog entry with deterministic stock.
fn generate_product(name: &str, price_cents: i64, seed: usize) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: Some(format!("{} from the house collection", name)),
        price_cents,
        // Every fifth product starts sold out
        stock: if seed % 5 == 4 { 0 } else { ((seed * 7) % 40 + 1) as i64 },
    }
}

fn coupons() -> Vec<CouponInput> {
    let now = Utc::now();
    vec![
        CouponInput {
            code: "WELCOME10".to_string(),
            description: Some("10% off your first order".to_string()),
            discount_type: DiscountType::Percentage,
            discount_value: 1000,
            new_user_only: true,
            valid_from: None,
            valid_to: None,
            max_redemptions: None,
        },
        CouponInput {
            code: "FIVEOFF".to_string(),
            description: Some("$5 off".to_string()),
            discount_type: DiscountType::FixedAmount,
            discount_value: 500,
            new_user_only: false,
            valid_from: None,
            valid_to: None,
            max_redemptions: Some(100),
        },
        CouponInput {
            code: "SPRING25".to_string(),
            description: Some("Spring sale".to_string()),
            discount_type: DiscountType::Percentage,
            discount_value: 2500,
            new_user_only: false,
            valid_from: Some(now),
            valid_to: Some(now + Duration::days(30)),
            max_redemptions: None,
        },
    ]
}
