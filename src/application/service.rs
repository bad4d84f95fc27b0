use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::{
    AccountId, BalanceObserver, BankAccount, Category, Cents, EntityType, Operation, OperationId,
    factory,
};
use crate::storage::{EntityRef, LedgerStore};

use super::{Command, LedgerError};

/// Application service providing high-level operations for the ledger.
/// This is the primary interface for any client (CLI, importers, exporters).
pub struct LedgerService {
    store: LedgerStore,
    observers: Vec<Arc<dyn BalanceObserver>>,
}

impl LedgerService {
    /// Create a service over an existing store. Every observer is attached to
    /// each account created through this service.
    pub fn new(store: LedgerStore, observers: Vec<Arc<dyn BalanceObserver>>) -> Self {
        Self { store, observers }
    }

    /// Create a service over an empty store.
    pub fn with_observers(observers: Vec<Arc<dyn BalanceObserver>>) -> Self {
        Self::new(LedgerStore::new(), observers)
    }

    // ========================
    // Account operations
    // ========================

    /// Create a bank account seeded with `balance` and attach the configured
    /// observers. The seed assignment itself is not reported to them.
    pub fn create_bank_account(
        &mut self,
        name: impl Into<String>,
        balance: Cents,
    ) -> Result<BankAccount, LedgerError> {
        let mut account = factory::create_bank_account(name, balance)?;
        for observer in &self.observers {
            account.attach(Arc::clone(observer));
        }
        self.store.add_bank_account(account.clone());
        Ok(account)
    }

    /// Create a bank account with a zero balance.
    pub fn create_empty_bank_account(
        &mut self,
        name: impl Into<String>,
    ) -> Result<BankAccount, LedgerError> {
        self.create_bank_account(name, 0)
    }

    pub fn bank_accounts(&self) -> &[BankAccount] {
        self.store.accounts()
    }

    pub fn bank_account(&self, id: AccountId) -> Result<&BankAccount, LedgerError> {
        self.store
            .account(id)
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    pub fn find_bank_account_by_name(&self, name: &str) -> Option<&BankAccount> {
        self.store.account_by_name(name)
    }

    /// Raw overwrite of name and balance; see [`LedgerStore::update_bank_account`].
    pub fn update_bank_account(&mut self, account: &BankAccount) -> Result<(), LedgerError> {
        self.store.update_bank_account(account)
    }

    pub fn remove_bank_account(&mut self, id: AccountId) {
        self.store.remove_bank_account(id);
    }

    pub fn deposit(
        &mut self,
        account_id: AccountId,
        amount: Cents,
        description: &str,
        category: &Category,
    ) -> Result<Operation, LedgerError> {
        self.store.deposit(account_id, amount, description, category)
    }

    pub fn withdraw(
        &mut self,
        account_id: AccountId,
        amount: Cents,
        description: &str,
        category: &Category,
    ) -> Result<Operation, LedgerError> {
        self.store.withdraw(account_id, amount, description, category)
    }

    /// Recompute an account's balance from all of its operations and assign
    /// it. Observers are notified.
    pub fn recalculate_balance(&mut self, account_id: AccountId) -> Result<Cents, LedgerError> {
        self.bank_account(account_id)?;
        let balance = self
            .store
            .operations()
            .iter()
            .filter(|o| o.bank_id == account_id)
            .map(Operation::signed_amount)
            .try_fold(0, Cents::checked_add)
            .ok_or_else(LedgerError::balance_overflow)?;
        self.store.assign_balance(account_id, balance)?;
        Ok(balance)
    }

    // ========================
    // Category operations
    // ========================

    pub fn create_category(&mut self, entity_type: EntityType, name: impl Into<String>) -> Category {
        let category = factory::create_category(entity_type, name);
        self.store.add_category(category.clone());
        category
    }

    pub fn categories(&self) -> &[Category] {
        self.store.categories()
    }

    /// Categories applicable to operations of the given type.
    pub fn categories_of(&self, entity_type: EntityType) -> impl Iterator<Item = &Category> {
        self.store
            .categories()
            .iter()
            .filter(move |c| c.entity_type == entity_type)
    }

    pub fn find_category(&self, name: &str, entity_type: EntityType) -> Option<&Category> {
        self.store.category_by_name(name, entity_type)
    }

    pub fn update_category(&mut self, category: &Category) -> Result<(), LedgerError> {
        self.store.update_category(category)
    }

    pub fn remove_category(&mut self, category: &Category) {
        self.store.remove_category(category);
    }

    // ========================
    // Operation operations
    // ========================

    /// Create an operation timestamped now, record it and apply it to the
    /// account balance.
    pub fn create_operation(
        &mut self,
        entity_type: EntityType,
        account_id: AccountId,
        amount: Cents,
        description: impl Into<String>,
        category: &Category,
    ) -> Result<Operation, LedgerError> {
        let operation =
            factory::create_operation(entity_type, account_id, amount, description, category.clone())?;
        self.store.record_operation(operation)
    }

    /// Same as [`LedgerService::create_operation`] with an explicit date.
    pub fn create_operation_at(
        &mut self,
        entity_type: EntityType,
        account_id: AccountId,
        amount: Cents,
        date: DateTime<Utc>,
        description: impl Into<String>,
        category: &Category,
    ) -> Result<Operation, LedgerError> {
        let operation = factory::create_operation_at(
            entity_type,
            account_id,
            amount,
            date,
            description,
            category.clone(),
        )?;
        self.store.record_operation(operation)
    }

    pub fn operations(&self) -> &[Operation] {
        self.store.operations()
    }

    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.store.operation(id)
    }

    pub fn update_operation(&mut self, operation: &Operation) -> Result<(), LedgerError> {
        self.store.update_operation(operation)
    }

    pub fn remove_operation(&mut self, id: OperationId) -> Result<(), LedgerError> {
        self.store.remove_operation(id)
    }

    /// Income minus expense over operations dated within `[start, end]`.
    ///
    /// Fails only when the total does not fit in `Cents`.
    pub fn calculate_net_balance(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Cents, LedgerError> {
        self.store
            .operations()
            .iter()
            .filter(|o| o.is_within(start, end))
            .map(Operation::signed_amount)
            .try_fold(0, Cents::checked_add)
            .ok_or_else(LedgerError::balance_overflow)
    }

    /// Run a command against this ledger.
    pub fn execute<C: Command>(&mut self, command: &C) -> Result<C::Output, LedgerError> {
        command.execute(self)
    }

    // ========================
    // Traversal
    // ========================

    /// Visit every entity: accounts, then categories, then operations.
    pub fn for_each_entity<F>(&self, visit: F)
    where
        F: FnMut(EntityRef<'_>),
    {
        self.store.for_each_entity(visit);
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::with_observers(Vec::new())
    }
}
