// tests/common/mod.rs
#![allow(dead_code, unused_macros)]

use actix_web::cookie::Cookie;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use simple_shop::config::AppConfig;
use simple_shop::db::{self, SeedProduct};
use simple_shop::errors::AppError;
use simple_shop::pipelines;
use simple_shop::services::payment::{
  HostedCheckoutRequest, HostedCheckoutSession, PaymentProvider, PaymentProviderError,
};
use simple_shop::services::sessions::{
  InMemorySessionStore, SessionError, SessionId, SessionState, SessionStore, DEFAULT_MAX_SESSIONS,
};
use simple_shop::state::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stepflow::Registry;
use tracing::Level;

/// Builds and initializes the full application service for `$state`.
macro_rules! shop_app {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state))
        .configure(simple_shop::web::configure_app_routes)
        .default_service(actix_web::web::to(simple_shop::web::handlers::not_found_handler)),
    )
    .await
  };
}

pub const PRODUCT_A: SeedProduct = SeedProduct {
  name: "Product A",
  description: "Ten units of currency.",
  price_cents: 1000,
  image_url: "https://img.example/a.jpg",
  category: "Testing",
};

pub const PRODUCT_B: SeedProduct = SeedProduct {
  name: "Product B",
  description: "Five units of currency.",
  price_cents: 500,
  image_url: "https://img.example/b.jpg",
  category: "Gadgets",
};

pub const PRODUCT_PRICEY: SeedProduct = SeedProduct {
  name: "Pricey Gadget",
  description: "Sits in the mid price band.",
  price_cents: 75_000,
  image_url: "https://img.example/pricey.jpg",
  category: "Gadgets",
};

pub const FAKE_SESSION_ID: &str = "cs_test_123";
pub const FAKE_REDIRECT_URL: &str = "https://pay.example/cs_test_123";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn test_config(with_secret: bool) -> AppConfig {
  AppConfig::from_lookup(|key| match key {
    "DATABASE_URL" => Some("sqlite::memory:".to_string()),
    "APP_BASE_URL" => Some("http://shop.test".to_string()),
    "SEED_DB" => Some("false".to_string()),
    "STRIPE_SECRET_KEY" if with_secret => Some("sk_test_fake".to_string()),
    _ => None,
  })
  .expect("test configuration must be valid")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeMode {
  Succeed,
  Reject,
}

/// Payment provider double that counts calls and keeps the last request.
pub struct FakeProvider {
  mode: FakeMode,
  calls: AtomicUsize,
  last_request: Mutex<Option<HostedCheckoutRequest>>,
}

impl FakeProvider {
  pub fn new(mode: FakeMode) -> Arc<Self> {
    Arc::new(Self {
      mode,
      calls: AtomicUsize::new(0),
      last_request: Mutex::new(None),
    })
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn last_request(&self) -> Option<HostedCheckoutRequest> {
    self.last_request.lock().clone()
  }
}

#[async_trait]
impl PaymentProvider for FakeProvider {
  fn name(&self) -> &'static str {
    "fake"
  }

  async fn create_checkout_session(
    &self,
    request: &HostedCheckoutRequest,
  ) -> Result<HostedCheckoutSession, PaymentProviderError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    *self.last_request.lock() = Some(request.clone());
    match self.mode {
      FakeMode::Succeed => Ok(HostedCheckoutSession {
        id: FAKE_SESSION_ID.to_string(),
        url: FAKE_REDIRECT_URL.to_string(),
      }),
      FakeMode::Reject => Err(PaymentProviderError::Rejected {
        status: 401,
        message: "Invalid API Key provided".to_string(),
      }),
    }
  }
}

/// Session store that records every write.
pub struct CountingSessionStore {
  inner: InMemorySessionStore,
  writes: Mutex<Vec<(SessionId, SessionState)>>,
}

impl CountingSessionStore {
  pub fn new(ttl: Duration) -> Arc<Self> {
    Arc::new(Self {
      inner: InMemorySessionStore::new(ttl, DEFAULT_MAX_SESSIONS),
      writes: Mutex::new(Vec::new()),
    })
  }

  pub fn write_count(&self) -> usize {
    self.writes.lock().len()
  }

  pub fn writes_for(&self, id: &SessionId) -> Vec<SessionState> {
    self
      .writes
      .lock()
      .iter()
      .filter(|(sid, _)| sid == id)
      .map(|(_, state)| state.clone())
      .collect()
  }
}

#[async_trait]
impl SessionStore for CountingSessionStore {
  async fn get(&self, id: &SessionId) -> Result<Option<SessionState>, SessionError> {
    self.inner.get(id).await
  }

  async fn set(&self, id: &SessionId, state: SessionState) -> Result<(), SessionError> {
    self.writes.lock().push((*id, state.clone()));
    self.inner.set(id, state).await
  }

  async fn purge_expired(&self) -> Result<usize, SessionError> {
    self.inner.purge_expired().await
  }
}

pub struct TestShop {
  pub state: AppState,
  pub sessions: Arc<CountingSessionStore>,
  pub product_a: i64,
  pub product_b: i64,
  pub product_pricey: i64,
}

impl TestShop {
  pub async fn new(provider: Option<Arc<FakeProvider>>) -> Self {
    Self::with_ttl(provider, Duration::from_secs(3600)).await
  }

  pub async fn with_ttl(provider: Option<Arc<FakeProvider>>, ttl: Duration) -> Self {
    setup_tracing();
    let config = Arc::new(test_config(provider.is_some()));
    let db_pool = db::connect(&config.database_url).await.expect("in-memory database");
    db::prepare_database(&db_pool, false).await.expect("migrations");
    db::seed_products(&db_pool, &[PRODUCT_A, PRODUCT_B, PRODUCT_PRICEY])
      .await
      .expect("seed");

    let flows = Arc::new(Registry::<AppError>::new());
    pipelines::register_all_pipelines(&flows).expect("pipelines register");

    let sessions = CountingSessionStore::new(ttl);
    let payments = provider.map(|p| p as Arc<dyn PaymentProvider>);
    let state = AppState {
      db_pool: db_pool.clone(),
      flows,
      config,
      sessions: sessions.clone(),
      payments,
    };

    let id_of = |name: &'static str| {
      let pool = db_pool.clone();
      async move {
        sqlx::query_scalar::<_, i64>("SELECT id FROM products WHERE name = ?")
          .bind(name)
          .fetch_one(&pool)
          .await
          .expect("seeded product")
      }
    };
    let product_a = id_of(PRODUCT_A.name).await;
    let product_b = id_of(PRODUCT_B.name).await;
    let product_pricey = id_of(PRODUCT_PRICEY.name).await;

    Self {
      state,
      sessions,
      product_a,
      product_b,
      product_pricey,
    }
  }

  pub async fn cart_of(&self, id: &SessionId) -> SessionState {
    self.sessions.get(id).await.unwrap().unwrap_or_default()
  }

  pub async fn order_status(&self, order_id: i64) -> (String, Option<String>) {
    sqlx::query_as::<_, (String, Option<String>)>("SELECT status, provider_session_id FROM orders WHERE id = ?")
      .bind(order_id)
      .fetch_one(&self.state.db_pool)
      .await
      .unwrap()
  }

  pub async fn order_count(&self) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
      .fetch_one(&self.state.db_pool)
      .await
      .unwrap()
  }
}

pub fn session_cookie(id: &SessionId) -> Cookie<'static> {
  Cookie::new("shop_session", id.to_string())
}

pub fn form(pairs: &[(&str, String)]) -> Vec<(String, String)> {
  pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}
