use crate::application::LedgerError;

use super::{BankAccount, Cents};

/// Payload passed to observers on every balance assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChanged {
    pub previous: Cents,
    pub current: Cents,
}

impl BalanceChanged {
    pub fn delta(&self) -> Cents {
        self.current - self.previous
    }
}

/// Receives a callback each time an account's balance is assigned.
///
/// Handlers run synchronously, in the order they were attached, before the
/// mutating call returns. An error from a handler is returned to whoever
/// changed the balance; handlers attached after the failing one are skipped.
pub trait BalanceObserver: Send + Sync {
    fn on_balance_changed(
        &self,
        account: &BankAccount,
        event: &BalanceChanged,
    ) -> Result<(), LedgerError>;
}

impl<F> BalanceObserver for F
where
    F: Fn(&BankAccount, &BalanceChanged) -> Result<(), LedgerError> + Send + Sync,
{
    fn on_balance_changed(
        &self,
        account: &BankAccount,
        event: &BalanceChanged,
    ) -> Result<(), LedgerError> {
        self(account, event)
    }
}
