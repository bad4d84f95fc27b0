// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use finledger::application::{LedgerError, LedgerService};
use finledger::domain::{BalanceChanged, BalanceObserver, BankAccount, Category, EntityType};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Helper to create an empty service and a scratch directory for files
pub fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    Ok((LedgerService::default(), temp_dir))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Test double counting balance notifications
#[derive(Default)]
pub struct CountingObserver {
    calls: AtomicUsize,
}

impl CountingObserver {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BalanceObserver for CountingObserver {
    fn on_balance_changed(
        &self,
        _account: &BankAccount,
        _event: &BalanceChanged,
    ) -> Result<(), LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn counted_service() -> (LedgerService, Arc<CountingObserver>) {
    let counter = Arc::new(CountingObserver::default());
    let observers: Vec<Arc<dyn BalanceObserver>> = vec![counter.clone() as Arc<dyn BalanceObserver>];
    (LedgerService::with_observers(observers), counter)
}

/// Test fixture: standard categories
pub struct StandardCategories {
    pub salary: Category,
    pub groceries: Category,
    pub rent: Category,
}

impl StandardCategories {
    pub fn create(service: &mut LedgerService) -> Self {
        Self {
            salary: service.create_category(EntityType::Income, "Salary"),
            groceries: service.create_category(EntityType::Expense, "Groceries"),
            rent: service.create_category(EntityType::Expense, "Rent"),
        }
    }
}
