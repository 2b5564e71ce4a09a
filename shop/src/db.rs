// src/db.rs

//! Pool creation, embedded migrations and catalog seeding.

use crate::errors::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{info, instrument};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// One catalog row as shipped with the application.
#[derive(Debug, Clone, Copy)]
pub struct SeedProduct {
  pub name: &'static str,
  pub description: &'static str,
  pub price_cents: i64,
  pub image_url: &'static str,
  pub category: &'static str,
}

pub const DEFAULT_CATALOG: &[SeedProduct] = &[
  SeedProduct {
    name: "Minimalist T-Shirt",
    description: "Soft cotton tee in a clean, modern cut.",
    price_cents: 1999,
    image_url: "https://images.pexels.com/photos/1002638/pexels-photo-1002638.jpeg",
    category: "Fashion",
  },
  SeedProduct {
    name: "Everyday Backpack",
    description: "Versatile backpack with padded laptop sleeve.",
    price_cents: 5999,
    image_url: "https://images.pexels.com/photos/374592/pexels-photo-374592.jpeg",
    category: "Bags & Luggage",
  },
  SeedProduct {
    name: "Wireless Headphones",
    description: "Noise-cancelling over-ear headphones with long battery life.",
    price_cents: 12999,
    image_url: "https://images.pexels.com/photos/3394664/pexels-photo-3394664.jpeg",
    category: "Electronics",
  },
  SeedProduct {
    name: "Android Smartphone",
    description: "6.5\" display, 5G ready, all-day battery life.",
    price_cents: 24999,
    image_url: "https://images.pexels.com/photos/6078121/pexels-photo-6078121.jpeg",
    category: "Mobiles & Tablets",
  },
  SeedProduct {
    name: "Ultrabook Laptop",
    description: "Thin and light laptop for work and entertainment.",
    price_cents: 79900,
    image_url: "https://images.pexels.com/photos/18105/pexels-photo.jpg",
    category: "Laptops",
  },
  SeedProduct {
    name: "Home Coffee Maker",
    description: "Brew rich coffee at home with one-touch control.",
    price_cents: 8999,
    image_url: "https://images.pexels.com/photos/302899/pexels-photo-302899.jpeg",
    category: "Home & Kitchen",
  },
  SeedProduct {
    name: "Yoga Mat Pro",
    description: "Non-slip yoga mat with extra cushioning.",
    price_cents: 2999,
    image_url: "https://images.pexels.com/photos/3823086/pexels-photo-3823086.jpeg",
    category: "Sports & Fitness",
  },
  SeedProduct {
    name: "Skincare Essentials Kit",
    description: "Cleanser, toner and moisturizer for daily care.",
    price_cents: 3999,
    image_url: "https://images.pexels.com/photos/3738364/pexels-photo-3738364.jpeg",
    category: "Beauty & Personal Care",
  },
  SeedProduct {
    name: "LED Desk Lamp",
    description: "Adjustable desk lamp with warm and cool modes.",
    price_cents: 2499,
    image_url: "https://images.pexels.com/photos/8132693/pexels-photo-8132693.jpeg",
    category: "Home & Lighting",
  },
  SeedProduct {
    name: "Bluetooth Speaker",
    description: "Portable speaker with deep bass and 12h playtime.",
    price_cents: 4999,
    image_url: "https://images.pexels.com/photos/63703/pexels-photo-63703.jpeg",
    category: "Electronics",
  },
  SeedProduct {
    name: "Running Shoes",
    description: "Lightweight running shoes for everyday training.",
    price_cents: 6499,
    image_url: "https://images.pexels.com/photos/2529148/pexels-photo-2529148.jpeg",
    category: "Footwear",
  },
  SeedProduct {
    name: "Study Chair",
    description: "Ergonomic chair with lumbar support for long study hours.",
    price_cents: 11900,
    image_url: "https://images.pexels.com/photos/6964079/pexels-photo-6964079.jpeg",
    category: "Furniture",
  },
];

/// Opens a pool for `database_url`, creating the database file when missing.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
  let options = SqliteConnectOptions::from_str(database_url)?
    .create_if_missing(true)
    .foreign_keys(true);
  let mut pool_options = SqlitePoolOptions::new().max_connections(5);
  if database_url.contains(":memory:") {
    // An in-memory database lives and dies with its single connection.
    pool_options = pool_options
      .max_connections(1)
      .min_connections(1)
      .idle_timeout(None)
      .max_lifetime(None);
  }
  let pool = pool_options.connect_with(options).await?;
  Ok(pool)
}

/// Runs pending migrations and, when `seed` is set, inserts the default catalog.
#[instrument(name = "db::prepare", skip(pool))]
pub async fn prepare_database(pool: &SqlitePool, seed: bool) -> Result<()> {
  MIGRATOR.run(pool).await?;
  info!("Database migrations applied.");
  if seed {
    let inserted = seed_products(pool, DEFAULT_CATALOG).await?;
    info!(inserted, "Catalog seeding finished.");
  }
  Ok(())
}

/// Inserts every product whose name is not in the catalog yet. Returns how many were added.
pub async fn seed_products(pool: &SqlitePool, products: &[SeedProduct]) -> Result<usize> {
  let existing: HashSet<String> = sqlx::query_scalar::<_, String>("SELECT name FROM products")
    .fetch_all(pool)
    .await?
    .into_iter()
    .collect();

  let mut tx = pool.begin().await?;
  let mut inserted = 0;
  for product in products.iter().filter(|p| !existing.contains(p.name)) {
    sqlx::query(
      "INSERT INTO products (name, description, price_cents, image_url, category) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(product.name)
    .bind(product.description)
    .bind(product.price_cents)
    .bind(product.image_url)
    .bind(product.category)
    .execute(&mut *tx)
    .await?;
    inserted += 1;
  }
  tx.commit().await?;
  Ok(inserted)
}
