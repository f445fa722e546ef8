//! Application context - dependency injection container

use std::sync::Arc;

use fyxed_core::{
    CommissionService, HierarchyService, PayoutService, SaleRepository, SettingsService,
    SnapshotService, UserRepository,
};
use fyxed_domain::{Config, FyxedError, Result};
use fyxed_infra::{DbManager, SqliteSaleRepository, SqliteSettingsRepository, SqliteUserRepository};
use tracing::info;

/// Type alias for user repository port trait object
type DynUserRepositoryPort = dyn UserRepository;

/// Type alias for sale repository port trait object
type DynSaleRepositoryPort = dyn SaleRepository;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub users: Arc<DynUserRepositoryPort>,
    pub sales: Arc<DynSaleRepositoryPort>,

    // Services
    pub settings: Arc<SettingsService>,
    pub commissions: Arc<CommissionService>,
    pub hierarchy: Arc<HierarchyService>,
    pub payouts: Arc<PayoutService>,
    pub snapshots: Arc<SnapshotService>,
}

impl AppContext {
    /// Open the database, apply the schema and wire every service
    ///
    /// # Errors
    /// Fails if the database can't be opened, migrated or health-checked,
    /// or if the configured default rates sum above 100%.
    pub fn new(config: Config) -> Result<Self> {
        config.commission.default_rates.validate()?;

        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let health = db.health_check()?;
        if !health.healthy {
            return Err(FyxedError::Database(
                health.message.unwrap_or_else(|| "database pool is unhealthy".to_string()),
            ));
        }

        let users: Arc<DynUserRepositoryPort> =
            Arc::new(SqliteUserRepository::new(Arc::clone(&db)));
        let sales: Arc<DynSaleRepositoryPort> =
            Arc::new(SqliteSaleRepository::new(Arc::clone(&db)));
        let settings = Arc::new(SettingsService::new(
            Arc::new(SqliteSettingsRepository::new(Arc::clone(&db))),
            config.commission.default_rates,
        ));

        let commissions = Arc::new(CommissionService::new(
            Arc::clone(&users),
            Arc::clone(&sales),
            Arc::clone(&settings),
            config.commission.currency.clone(),
        ));
        let hierarchy = Arc::new(HierarchyService::new(
            Arc::clone(&users),
            Arc::clone(&sales),
            Arc::clone(&settings),
        ));
        let payouts = Arc::new(PayoutService::new(Arc::clone(&sales)));
        let snapshots = Arc::new(SnapshotService::new(Arc::clone(&users), Arc::clone(&sales)));

        let metrics = db.metrics();
        info!(
            db_path = %db.path().display(),
            currency = %config.commission.currency,
            pool_size = health.max_connections,
            connections_acquired = metrics.connections_acquired,
            avg_acquisition_ms = metrics.avg_acquisition_time_ms,
            "Application context initialised"
        );

        Ok(Self { config, db, users, sales, settings, commissions, hierarchy, payouts, snapshots })
    }
}
