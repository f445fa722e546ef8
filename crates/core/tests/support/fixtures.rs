//! Fixture builders and a fully wired service set

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use fyxed_core::{CommissionService, HierarchyService, PayoutService, SettingsService, SnapshotService};
use fyxed_domain::{
    BasisPoints, CommissionRates, ComputedShares, Money, Sale, SaleStatus, User, UserRole,
};

use super::repositories::{
    InMemorySaleRepository, InMemorySettingsRepository, InMemoryUserRepository,
};

pub fn money(minor: i64) -> Money {
    Money::from_minor(minor)
}

pub fn user(id: &str, role: UserRole, sponsor: Option<&str>) -> User {
    User::new(id, id.to_uppercase(), role, sponsor.map(str::to_string))
}

/// Jan 1 2024 plus `day` days, noon UTC
pub fn day(day: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::days(day)
}

pub fn sale(id: &str, seller: &str, amount: i64, status: SaleStatus, on: i64) -> Sale {
    Sale {
        id: id.to_string(),
        seller_id: seller.to_string(),
        amount: money(amount),
        currency: "USD".to_string(),
        status,
        created_at: day(on),
        computed: None,
    }
}

pub fn with_computed(mut sale: Sale, computed: ComputedShares) -> Sale {
    sale.computed = Some(computed);
    sale
}

pub fn rates(seller: u32, leader: u32, sponsor: u32, fyxed: u32) -> CommissionRates {
    CommissionRates::new(
        BasisPoints::from_percent(seller),
        BasisPoints::from_percent(leader),
        BasisPoints::from_percent(sponsor),
        BasisPoints::from_percent(fyxed),
    )
}

/// owner -> leader -> agent, plus an orphan agent
pub fn org() -> Vec<User> {
    vec![
        user("owner", UserRole::Owner, None),
        user("leader", UserRole::Leader, Some("owner")),
        user("agent", UserRole::Agent, Some("leader")),
        user("orphan", UserRole::Agent, None),
    ]
}

pub struct Harness {
    pub users: InMemoryUserRepository,
    pub sales: InMemorySaleRepository,
    pub settings_repo: InMemorySettingsRepository,
    pub settings: Arc<SettingsService>,
    pub commissions: CommissionService,
    pub hierarchy: HierarchyService,
    pub payouts: PayoutService,
    pub snapshots: SnapshotService,
}

impl Harness {
    pub fn new(users: Vec<User>, sales: Vec<Sale>) -> Self {
        let users = InMemoryUserRepository::new(users);
        let sales = InMemorySaleRepository::new(sales);
        let settings_repo = InMemorySettingsRepository::default();
        let settings =
            Arc::new(SettingsService::new(Arc::new(settings_repo.clone()), CommissionRates::default()));

        Self {
            commissions: CommissionService::new(
                Arc::new(users.clone()),
                Arc::new(sales.clone()),
                Arc::clone(&settings),
                "USD",
            ),
            hierarchy: HierarchyService::new(
                Arc::new(users.clone()),
                Arc::new(sales.clone()),
                Arc::clone(&settings),
            ),
            payouts: PayoutService::new(Arc::new(sales.clone())),
            snapshots: SnapshotService::new(Arc::new(users.clone()), Arc::new(sales.clone())),
            users,
            sales,
            settings_repo,
            settings,
        }
    }
}
