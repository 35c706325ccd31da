use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use redb::Database;

use crate::auth::JwtService;
use crate::catalog::{CatalogService, seed};
use crate::core::{Config, Result};
use crate::db;
use crate::message::EventBroadcaster;
use crate::orders::{OrderNumberAllocator, OrderStorage, OrdersManager};

/// Services shared by every handler
///
/// Cheap to clone: every field is reference counted.
///
/// | Field | Role |
/// |-------|------|
/// | config | immutable settings |
/// | catalog | product cache, pricing source |
/// | orders | submission, lifecycle, queries |
/// | bus | live order events |
/// | jwt_service | staff token validation |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub catalog: CatalogService,
    pub orders: OrdersManager,
    pub bus: EventBroadcaster,
    pub jwt_service: Arc<JwtService>,
    pub started_at: Instant,
}

impl ServerState {
    /// Open the database under `WORK_DIR` and wire the services
    ///
    /// 1. `{work_dir}/database/orders.redb`
    /// 2. catalog cache warmup
    /// 3. catalog seed when empty and `CATALOG_SEED_PATH` is set
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(config.database_dir())?;
        let database = db::open(config.database_path())?;
        let state = Self::with_database(config, database)?;

        let cached = state.catalog.warmup()?;
        tracing::info!(products = cached, "Catalog loaded");

        if let Some(path) = &config.catalog_seed_path {
            let seeded = seed::seed_if_empty(&state.catalog, Path::new(path))?;
            if seeded > 0 {
                tracing::info!(products = seeded, path = %path, "Catalog seeded");
            }
        }

        Ok(state)
    }

    /// Wire the services over an already open database
    pub fn with_database(config: &Config, database: Arc<Database>) -> Result<Self> {
        let tz = config.timezone()?;
        let catalog = CatalogService::new(database.clone());
        let bus = EventBroadcaster::with_capacity(config.event_channel_capacity);
        let orders = OrdersManager::new(
            OrderStorage::new(database),
            Arc::new(catalog.clone()),
            OrderNumberAllocator::new(tz),
            bus.clone(),
        );

        Ok(Self {
            config: config.clone(),
            catalog,
            orders,
            bus,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            started_at: Instant::now(),
        })
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
