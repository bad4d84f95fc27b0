//! Ledger actions as values, so they can be wrapped (e.g. timed) before running.

use std::time::Instant;
use tracing::info;

use crate::domain::{BankAccount, Cents, format_cents};

use super::{LedgerError, LedgerService};

/// An action run against the ledger.
pub trait Command {
    type Output;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn execute(&self, service: &mut LedgerService) -> Result<Self::Output, LedgerError>;
}

/// Create a bank account seeded with a starting balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccount {
    pub name: String,
    pub balance: Cents,
}

impl CreateAccount {
    pub fn new(name: impl Into<String>, balance: Cents) -> Self {
        Self {
            name: name.into(),
            balance,
        }
    }
}

impl Command for CreateAccount {
    type Output = BankAccount;

    fn name(&self) -> &'static str {
        "CreateAccount"
    }

    fn execute(&self, service: &mut LedgerService) -> Result<BankAccount, LedgerError> {
        let account = service.create_bank_account(self.name.clone(), self.balance)?;
        info!(
            account = %account.id,
            "Created account {} with balance {}",
            account.name,
            format_cents(account.balance())
        );
        Ok(account)
    }
}

/// Runs the wrapped command and logs how long it took, whether it failed or not.
#[derive(Debug, Clone)]
pub struct Timed<C> {
    inner: C,
}

impl<C> Timed<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Command> Command for Timed<C> {
    type Output = C::Output;

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn execute(&self, service: &mut LedgerService) -> Result<C::Output, LedgerError> {
        let started = Instant::now();
        let result = self.inner.execute(service);
        let elapsed = started.elapsed();

        info!(
            command = self.name(),
            elapsed_us = elapsed.as_micros() as u64,
            ok = result.is_ok(),
            "{} executed in {:?}",
            self.name(),
            elapsed
        );
        result
    }
}
