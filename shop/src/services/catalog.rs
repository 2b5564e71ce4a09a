// src/services/catalog.rs

use crate::errors::{AppError, Result};
use crate::models::Product;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, instrument};

const PRODUCT_COLUMNS: &str = "SELECT id, name, description, price_cents, image_url, category FROM products";

/// Inclusive price ranges offered on the catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBand {
  Low,
  Mid,
  High,
}

impl PriceBand {
  /// Unknown band names are ignored rather than rejected.
  pub fn parse(raw: &str) -> Option<Self> {
    match raw.trim().to_ascii_lowercase().as_str() {
      "low" => Some(PriceBand::Low),
      "mid" => Some(PriceBand::Mid),
      "high" => Some(PriceBand::High),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      PriceBand::Low => "low",
      PriceBand::Mid => "mid",
      PriceBand::High => "high",
    }
  }

  /// Bounds in minor units, both inclusive.
  pub fn bounds_cents(self) -> (i64, i64) {
    match self {
      PriceBand::Low => (0, 50_000),
      PriceBand::Mid => (50_000, 100_000),
      PriceBand::High => (100_000, 500_000),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
  pub query: Option<String>,
  pub category: Option<String>,
  pub price_band: Option<PriceBand>,
}

impl CatalogFilter {
  /// Builds a filter from raw query-string values; blanks mean "no constraint".
  pub fn from_params(q: Option<&str>, category: Option<&str>, price: Option<&str>) -> Self {
    let non_blank = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
    Self {
      query: non_blank(q),
      category: non_blank(category),
      price_band: price.and_then(PriceBand::parse),
    }
  }
}

fn escape_like(raw: &str) -> String {
  let mut escaped = String::with_capacity(raw.len());
  for ch in raw.chars() {
    if matches!(ch, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(ch);
  }
  escaped
}

/// Products matching `filter`, in catalog (id) order.
#[instrument(name = "catalog::list_products", skip(pool))]
pub async fn list_products(pool: &SqlitePool, filter: &CatalogFilter) -> Result<Vec<Product>> {
  let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(PRODUCT_COLUMNS);
  qb.push(" WHERE 1 = 1");
  if let Some(category) = &filter.category {
    qb.push(" AND category = ").push_bind(category.clone());
  }
  if let Some(query) = &filter.query {
    // SQLite's LIKE folds ASCII case only; the query is compared as typed.
    qb.push(" AND name LIKE ")
      .push_bind(format!("%{}%", escape_like(query)))
      .push(" ESCAPE '\\'");
  }
  if let Some(band) = filter.price_band {
    let (min, max) = band.bounds_cents();
    qb.push(" AND price_cents >= ")
      .push_bind(min)
      .push(" AND price_cents <= ")
      .push_bind(max);
  }
  qb.push(" ORDER BY id ASC");

  let products = qb.build_query_as::<Product>().fetch_all(pool).await?;
  debug!(count = products.len(), "Products listed.");
  Ok(products)
}

/// Distinct non-empty categories, sorted.
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<String>> {
  let categories = sqlx::query_scalar::<_, String>(
    "SELECT DISTINCT category FROM products WHERE category IS NOT NULL AND category <> '' ORDER BY category ASC",
  )
  .fetch_all(pool)
  .await?;
  Ok(categories)
}

#[instrument(name = "catalog::get_product", skip(pool))]
pub async fn get_product(pool: &SqlitePool, product_id: i64) -> Result<Product> {
  sqlx::query_as::<_, Product>(&format!("{} WHERE id = ?", PRODUCT_COLUMNS))
    .bind(product_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", product_id)))
}

/// Products for the given ids, in id order. Unknown ids are simply absent.
pub async fn products_by_ids(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<Product>> {
  if ids.is_empty() {
    return Ok(Vec::new());
  }
  let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(PRODUCT_COLUMNS);
  qb.push(" WHERE id IN (");
  let mut separated = qb.separated(", ");
  for id in ids {
    separated.push_bind(*id);
  }
  separated.push_unseparated(") ORDER BY id ASC");
  Ok(qb.build_query_as::<Product>().fetch_all(pool).await?)
}
