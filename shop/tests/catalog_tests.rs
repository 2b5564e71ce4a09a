// tests/catalog_tests.rs
#[macro_use]
mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use common::*;
use serial_test::serial;
use simple_shop::db::{self, SeedProduct};
use simple_shop::services::catalog::{self, CatalogFilter, PriceBand};
use simple_shop::services::sessions::SessionId;

async fn body_of(resp: actix_web::dev::ServiceResponse) -> String {
  String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

#[actix_web::test]
#[serial]
async fn test_default_catalog_seeding_is_idempotent() {
  setup_tracing();
  let pool = db::connect("sqlite::memory:").await.unwrap();
  db::prepare_database(&pool, true).await.unwrap();

  let products = catalog::list_products(&pool, &CatalogFilter::default()).await.unwrap();
  assert_eq!(products.len(), db::DEFAULT_CATALOG.len());
  assert_eq!(products[0].name, "Minimalist T-Shirt");

  assert_eq!(db::seed_products(&pool, db::DEFAULT_CATALOG).await.unwrap(), 0);
  db::prepare_database(&pool, true).await.unwrap();
  let again = catalog::list_products(&pool, &CatalogFilter::default()).await.unwrap();
  assert_eq!(again.len(), db::DEFAULT_CATALOG.len());

  let categories = catalog::list_categories(&pool).await.unwrap();
  assert!(categories.windows(2).all(|w| w[0] < w[1]));
  assert!(categories.contains(&"Electronics".to_string()));
}

#[actix_web::test]
#[serial]
async fn test_catalog_filters() {
  let shop = TestShop::new(None).await;
  let pool = &shop.state.db_pool;

  let by_name = catalog::list_products(pool, &CatalogFilter::from_params(Some("PRODUCT"), None, None))
    .await
    .unwrap();
  assert_eq!(
    by_name.iter().map(|p| p.id).collect::<Vec<_>>(),
    vec![shop.product_a, shop.product_b]
  );

  let gadgets = catalog::list_products(pool, &CatalogFilter::from_params(None, Some("Gadgets"), None))
    .await
    .unwrap();
  assert_eq!(gadgets.len(), 2);

  let mid = catalog::list_products(
    pool,
    &CatalogFilter {
      price_band: Some(PriceBand::Mid),
      ..Default::default()
    },
  )
  .await
  .unwrap();
  assert_eq!(mid.len(), 1);
  assert_eq!(mid[0].id, shop.product_pricey);

  let low_gadgets = catalog::list_products(pool, &CatalogFilter::from_params(None, Some("Gadgets"), Some("low")))
    .await
    .unwrap();
  assert_eq!(low_gadgets.len(), 1);
  assert_eq!(low_gadgets[0].id, shop.product_b);

  let ignored_band = catalog::list_products(pool, &CatalogFilter::from_params(None, None, Some("bogus")))
    .await
    .unwrap();
  assert_eq!(ignored_band.len(), 3);

  let wildcard = catalog::list_products(pool, &CatalogFilter::from_params(Some("%"), None, None))
    .await
    .unwrap();
  assert!(wildcard.is_empty());
}

#[actix_web::test]
#[serial]
async fn test_name_search_with_non_ascii_names() {
  let shop = TestShop::new(None).await;
  let pool = &shop.state.db_pool;
  db::seed_products(
    pool,
    &[SeedProduct {
      name: "Crème ÉCLAIR Tin",
      description: "Accented name.",
      price_cents: 1_500,
      image_url: "https://img.example/eclair.jpg",
      category: "Pantry",
    }],
  )
  .await
  .unwrap();

  for query in ["ÉCLAIR", "crème", "TIN"] {
    let found = catalog::list_products(pool, &CatalogFilter::from_params(Some(query), None, None))
      .await
      .unwrap();
    assert_eq!(found.len(), 1, "query {:?}", query);
    assert_eq!(found[0].name, "Crème ÉCLAIR Tin");
  }
}

#[actix_web::test]
#[serial]
async fn test_catalog_page_renders_products_and_sets_cookie() {
  let shop = TestShop::new(None).await;
  let app = shop_app!(shop.state.clone());

  let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(resp
    .response()
    .cookies()
    .any(|c| c.name() == "shop_session" && SessionId::parse(c.value()).is_some()));
  let body = body_of(resp).await;
  assert!(body.contains("Product A"));
  assert!(body.contains("INR 10.00"));
  assert!(body.contains("Pricey Gadget"));

  let req = test::TestRequest::get().uri("/?q=pricey&price=mid").to_request();
  let body = body_of(test::call_service(&app, req).await).await;
  assert!(body.contains("Pricey Gadget"));
  assert!(!body.contains("Product A"));
}

#[actix_web::test]
#[serial]
async fn test_product_detail_and_missing_pages() {
  let shop = TestShop::new(None).await;
  let app = shop_app!(shop.state.clone());

  let req = test::TestRequest::get()
    .uri(&format!("/products/{}", shop.product_b))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(body_of(resp).await.contains("Five units of currency."));

  for uri in ["/products/999999", "/products/not-a-number", "/no/such/page"] {
    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND, "uri {}", uri);
    assert!(resp
      .headers()
      .get(header::CONTENT_TYPE)
      .is_some_and(|v| v.to_str().unwrap_or("").starts_with("text/html")));
    assert!(body_of(resp).await.contains("Error 404"));
  }
}

#[actix_web::test]
#[serial]
async fn test_health_reports_database() {
  let shop = TestShop::new(None).await;
  let app = shop_app!(shop.state.clone());

  let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: serde_json::Value = test::read_body_json(resp).await;
  assert_eq!(body["status"], "ok");
  assert_eq!(body["database"], "ok");
}
