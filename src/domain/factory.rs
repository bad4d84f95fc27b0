//! Invariant-checking constructors. Every entity the ledger holds is built here.

use chrono::{DateTime, Utc};

use crate::application::LedgerError;

use super::{AccountId, BankAccount, Category, Cents, EntityType, Operation};

/// Create a bank account seeded with `balance`.
pub fn create_bank_account(name: impl Into<String>, balance: Cents) -> Result<BankAccount, LedgerError> {
    if balance < 0 {
        return Err(LedgerError::InvalidArgument(
            "Balance cannot be negative".to_string(),
        ));
    }
    Ok(BankAccount::new(name, balance))
}

pub fn create_category(entity_type: EntityType, name: impl Into<String>) -> Category {
    Category::new(entity_type, name)
}

/// Create an operation timestamped now.
pub fn create_operation(
    entity_type: EntityType,
    bank_id: AccountId,
    amount: Cents,
    description: impl Into<String>,
    category: Category,
) -> Result<Operation, LedgerError> {
    create_operation_at(entity_type, bank_id, amount, Utc::now(), description, category)
}

/// Create an operation with an explicit timestamp.
pub fn create_operation_at(
    entity_type: EntityType,
    bank_id: AccountId,
    amount: Cents,
    date: DateTime<Utc>,
    description: impl Into<String>,
    category: Category,
) -> Result<Operation, LedgerError> {
    validate_amount(amount)?;
    Ok(Operation::new(entity_type, bank_id, amount, date, description, category))
}

pub(crate) fn validate_amount(amount: Cents) -> Result<(), LedgerError> {
    if amount < 0 {
        return Err(LedgerError::InvalidArgument(
            "Amount cannot be negative".to_string(),
        ));
    }
    Ok(())
}
