use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::LedgerError;

use super::{BalanceChanged, BalanceObserver, Cents, cents_as_units};

pub type AccountId = Uuid;

/// A bank account with a running balance.
///
/// The balance is private: every assignment goes through [`BankAccount::set_balance`]
/// so attached observers see each change.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BankAccount {
    pub id: AccountId,
    pub name: String,
    #[serde(with = "cents_as_units")]
    balance: Cents,
    #[serde(skip)]
    observers: Vec<Arc<dyn BalanceObserver>>,
}

impl BankAccount {
    /// Create an account seeded with `balance`. No observer is attached yet,
    /// so construction never notifies.
    pub fn new(name: impl Into<String>, balance: Cents) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            balance,
            observers: Vec::new(),
        }
    }

    pub fn balance(&self) -> Cents {
        self.balance
    }

    /// Replace the balance without notifying. Meant for building an edited
    /// copy that is then handed to `update_bank_account`.
    pub fn with_balance(mut self, balance: Cents) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Assign a new balance and notify every attached observer, even when
    /// the value is unchanged.
    pub fn set_balance(&mut self, balance: Cents) -> Result<(), LedgerError> {
        let event = BalanceChanged {
            previous: self.balance,
            current: balance,
        };
        self.balance = balance;

        for observer in &self.observers {
            observer.on_balance_changed(self, &event)?;
        }
        Ok(())
    }

    pub fn attach(&mut self, observer: Arc<dyn BalanceObserver>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl fmt::Debug for BankAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BankAccount")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("balance", &self.balance)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_new_account_has_exact_balance_and_no_observers() {
        let account = BankAccount::new("Checking", 10000);
        assert_eq!(account.balance(), 10000);
        assert_eq!(account.observer_count(), 0);
    }

    #[test]
    fn test_set_balance_notifies_in_attachment_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut account = BankAccount::new("Checking", 0);

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            account.attach(Arc::new(
                move |acc: &BankAccount, event: &BalanceChanged| -> Result<(), LedgerError> {
                    seen.lock().unwrap().push((tag, acc.balance(), event.delta()));
                    Ok(())
                },
            ));
        }

        account.set_balance(2500).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![("first", 2500, 2500), ("second", 2500, 2500)]);
    }

    #[test]
    fn test_same_value_assignment_still_notifies() {
        let calls = Arc::new(Mutex::new(0));
        let mut account = BankAccount::new("Savings", 500);
        let counter = Arc::clone(&calls);
        account.attach(Arc::new(
            move |_: &BankAccount, _: &BalanceChanged| -> Result<(), LedgerError> {
                *counter.lock().unwrap() += 1;
                Ok(())
            },
        ));

        account.set_balance(500).unwrap();
        account.set_balance(500).unwrap();

        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[test]
    fn test_observer_error_propagates_after_assignment() {
        let mut account = BankAccount::new("Checking", 0);
        account.attach(Arc::new(
            |_: &BankAccount, _: &BalanceChanged| -> Result<(), LedgerError> {
                Err(LedgerError::Observer("audit sink offline".into()))
            },
        ));

        let result = account.set_balance(700);

        assert!(matches!(result, Err(LedgerError::Observer(_))));
        assert_eq!(account.balance(), 700);
    }

    #[test]
    fn test_serializes_balance_in_units_without_observers() {
        let account = BankAccount::new("Wallet", 1999);
        let value = serde_json::to_value(&account).unwrap();

        assert_eq!(value["Name"], "Wallet");
        assert_eq!(value["Balance"], 19.99);
        assert!(value.get("Observers").is_none());
    }
}
