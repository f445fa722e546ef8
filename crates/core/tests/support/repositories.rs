//! In-memory implementations of the core repository ports
//!
//! Multi-row writes validate every row before touching any of them, which
//! mirrors the all-or-nothing transactions of the SQLite adapters.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fyxed_core::{ComputedUpdate, SaleRepository, SettingsRepository, UserRepository};
use fyxed_domain::{
    CommissionRates, FyxedError, Result as DomainResult, Sale, SaleFilter, SaleStatus, User,
};

/// In-memory mock for `UserRepository`.
#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new(users: Vec<User>) -> Self {
        Self { users: Arc::new(Mutex::new(users)) }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list_users(&self) -> DomainResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn get_user(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn upsert_users(&self, users: Vec<User>) -> DomainResult<usize> {
        let mut stored = self.users.lock().unwrap();
        let count = users.len();
        for user in users {
            match stored.iter_mut().find(|u| u.id == user.id) {
                Some(existing) => *existing = user,
                None => stored.push(user),
            }
        }
        Ok(count)
    }
}

/// In-memory mock for `SaleRepository`.
///
/// `fail_writes` makes every write return a database error, to check that
/// services surface storage failures.
#[derive(Default, Clone)]
pub struct InMemorySaleRepository {
    sales: Arc<Mutex<Vec<Sale>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemorySaleRepository {
    pub fn new(sales: Vec<Sale>) -> Self {
        Self { sales: Arc::new(Mutex::new(sales)), fail_writes: Arc::default() }
    }

    pub fn snapshot(&self) -> Vec<Sale> {
        self.sales.lock().unwrap().clone()
    }

    pub fn get(&self, id: &str) -> Option<Sale> {
        self.sales.lock().unwrap().iter().find(|s| s.id == id).cloned()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> DomainResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(FyxedError::Database("injected write failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SaleRepository for InMemorySaleRepository {
    async fn list_sales(&self, filter: &SaleFilter) -> DomainResult<Vec<Sale>> {
        let mut sales: Vec<Sale> =
            self.sales.lock().unwrap().iter().filter(|s| filter.matches(s)).cloned().collect();
        sales.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(sales)
    }

    async fn get_sale(&self, id: &str) -> DomainResult<Option<Sale>> {
        Ok(self.get(id))
    }

    async fn insert_sales(&self, sales: Vec<Sale>) -> DomainResult<usize> {
        self.check_writable()?;
        let mut stored = self.sales.lock().unwrap();
        if let Some(dup) = sales.iter().find(|s| stored.iter().any(|e| e.id == s.id)) {
            return Err(FyxedError::Database(format!("duplicate sale id '{}'", dup.id)));
        }
        let count = sales.len();
        stored.extend(sales);
        Ok(count)
    }

    async fn update_status(&self, id: &str, from: SaleStatus, to: SaleStatus) -> DomainResult<()> {
        self.check_writable()?;
        let mut stored = self.sales.lock().unwrap();
        let sale = stored
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| FyxedError::NotFound(format!("sale '{id}'")))?;
        if sale.status != from {
            return Err(FyxedError::InvalidTransition {
                from: sale.status.to_string(),
                to: to.to_string(),
            });
        }
        sale.status = to;
        Ok(())
    }

    async fn apply_computed(&self, updates: Vec<ComputedUpdate>) -> DomainResult<usize> {
        self.check_writable()?;
        let mut stored = self.sales.lock().unwrap();
        if let Some(missing) = updates.iter().find(|u| !stored.iter().any(|s| s.id == u.sale_id)) {
            return Err(FyxedError::NotFound(format!("sale '{}'", missing.sale_id)));
        }
        let count = updates.len();
        for update in updates {
            if let Some(sale) = stored.iter_mut().find(|s| s.id == update.sale_id) {
                sale.computed = Some(update.computed);
            }
        }
        Ok(count)
    }

    async fn mark_paid(&self, sale_ids: &[String]) -> DomainResult<usize> {
        self.check_writable()?;
        let mut stored = self.sales.lock().unwrap();
        for id in sale_ids {
            match stored.iter().find(|s| &s.id == id) {
                Some(sale) if sale.status == SaleStatus::Approved => {}
                Some(sale) => {
                    return Err(FyxedError::InvalidTransition {
                        from: sale.status.to_string(),
                        to: SaleStatus::Paid.to_string(),
                    })
                }
                None => return Err(FyxedError::NotFound(format!("sale '{id}'"))),
            }
        }
        for sale in stored.iter_mut().filter(|s| sale_ids.contains(&s.id)) {
            sale.status = SaleStatus::Paid;
        }
        Ok(sale_ids.len())
    }
}

/// In-memory mock for `SettingsRepository`.
#[derive(Default, Clone)]
pub struct InMemorySettingsRepository {
    rates: Arc<Mutex<Option<CommissionRates>>>,
}

impl InMemorySettingsRepository {
    pub fn with_rates(rates: CommissionRates) -> Self {
        Self { rates: Arc::new(Mutex::new(Some(rates))) }
    }

    pub fn stored(&self) -> Option<CommissionRates> {
        *self.rates.lock().unwrap()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn load_rates(&self) -> DomainResult<Option<CommissionRates>> {
        Ok(*self.rates.lock().unwrap())
    }

    async fn save_rates(&self, rates: CommissionRates) -> DomainResult<()> {
        *self.rates.lock().unwrap() = Some(rates);
        Ok(())
    }
}
