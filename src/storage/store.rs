use tracing::debug;

use crate::application::LedgerError;
use crate::domain::{
    AccountId, BankAccount, Category, CategoryId, Cents, EntityType, Operation, OperationId,
    factory,
};

/// In-memory home of every account, category and operation.
///
/// All balance arithmetic happens here. Lookups by id that miss are no-ops for
/// update/remove calls and `NotFound` errors for deposit/withdraw.
#[derive(Debug, Default)]
pub struct LedgerStore {
    accounts: Vec<BankAccount>,
    categories: Vec<Category>,
    operations: Vec<Operation>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Account operations
    // ========================

    pub fn add_bank_account(&mut self, account: BankAccount) {
        debug!(account = %account.id, name = %account.name, "adding bank account");
        self.accounts.push(account);
    }

    pub fn accounts(&self) -> &[BankAccount] {
        &self.accounts
    }

    pub fn account(&self, id: AccountId) -> Option<&BankAccount> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn account_by_name(&self, name: &str) -> Option<&BankAccount> {
        self.accounts.iter().find(|a| a.name == name)
    }

    /// Overwrite name and balance of the stored account with the same id.
    ///
    /// The balance is replaced as-is: nothing is re-derived from operations
    /// and no overdraft rule applies. Observers still see the assignment.
    pub fn update_bank_account(&mut self, account: &BankAccount) -> Result<(), LedgerError> {
        let Some(existing) = self.accounts.iter_mut().find(|a| a.id == account.id) else {
            return Ok(());
        };
        existing.name = account.name.clone();
        existing.set_balance(account.balance())
    }

    /// Remove an account together with every operation booked against it.
    pub fn remove_bank_account(&mut self, id: AccountId) {
        self.accounts.retain(|a| a.id != id);
        let before = self.operations.len();
        self.operations.retain(|o| o.bank_id != id);
        debug!(account = %id, cascaded = before - self.operations.len(), "removed bank account");
    }

    /// Assign a balance directly, e.g. after recomputing it from operations.
    pub fn assign_balance(&mut self, id: AccountId, balance: Cents) -> Result<(), LedgerError> {
        let index = self
            .account_index(id)
            .ok_or_else(|| LedgerError::account_not_found(id))?;
        self.accounts[index].set_balance(balance)
    }

    /// Credit an account and record the matching Income operation.
    pub fn deposit(
        &mut self,
        account_id: AccountId,
        amount: Cents,
        description: &str,
        category: &Category,
    ) -> Result<Operation, LedgerError> {
        let operation =
            self.prepare_movement(EntityType::Income, account_id, amount, description, category)?;
        self.record_operation(operation)
    }

    /// Debit an account and record the matching Expense operation.
    /// Overdrafts are refused.
    pub fn withdraw(
        &mut self,
        account_id: AccountId,
        amount: Cents,
        description: &str,
        category: &Category,
    ) -> Result<Operation, LedgerError> {
        let operation =
            self.prepare_movement(EntityType::Expense, account_id, amount, description, category)?;
        self.record_operation(operation)
    }

    fn prepare_movement(
        &self,
        entity_type: EntityType,
        account_id: AccountId,
        amount: Cents,
        description: &str,
        category: &Category,
    ) -> Result<Operation, LedgerError> {
        if self.account_index(account_id).is_none() {
            return Err(LedgerError::account_not_found(account_id));
        }
        factory::create_operation(
            entity_type,
            account_id,
            amount,
            description,
            category.clone(),
        )
    }

    /// Append an operation and apply its effect to the owning account.
    ///
    /// Fails with `NotFound` for an unknown account and `InvalidArgument` for
    /// a negative amount or an expense larger than the current balance.
    pub fn record_operation(&mut self, operation: Operation) -> Result<Operation, LedgerError> {
        let index = self
            .account_index(operation.bank_id)
            .ok_or_else(|| LedgerError::account_not_found(operation.bank_id))?;
        factory::validate_amount(operation.amount)?;

        let balance = self.accounts[index].balance();
        if !operation.is_income() && balance < operation.amount {
            return Err(LedgerError::insufficient_funds(balance, operation.amount));
        }

        let next = shifted(balance, operation.signed_amount())?;

        debug!(
            operation = %operation.id,
            kind = %operation.entity_type,
            amount = operation.amount,
            "recording operation"
        );
        self.operations.push(operation.clone());
        self.accounts[index].set_balance(next)?;
        Ok(operation)
    }

    fn account_index(&self, id: AccountId) -> Option<usize> {
        self.accounts.iter().position(|a| a.id == id)
    }

    // ========================
    // Category operations
    // ========================

    pub fn add_category(&mut self, category: Category) {
        self.categories.push(category);
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_by_name(&self, name: &str, entity_type: EntityType) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name == name && c.entity_type == entity_type)
    }

    /// Overwrite type and name of the stored category and refresh the copy
    /// carried by every operation filed under it.
    ///
    /// All copies are refreshed before any observer runs, so an observer error
    /// never leaves operations out of sync with the category. A category change
    /// never moves a balance; each refreshed operation still re-assigns its
    /// account's balance once.
    pub fn update_category(&mut self, category: &Category) -> Result<(), LedgerError> {
        if let Some(existing) = self.categories.iter_mut().find(|c| c.id == category.id) {
            existing.entity_type = category.entity_type;
            existing.name = category.name.clone();
        }

        let mut touched = Vec::new();
        for operation in self
            .operations
            .iter_mut()
            .filter(|o| o.category.id == category.id)
        {
            operation.category = category.clone();
            touched.push(operation.bank_id);
        }

        for bank_id in touched {
            if let Some(index) = self.account_index(bank_id) {
                let balance = self.accounts[index].balance();
                self.accounts[index].set_balance(balance)?;
            }
        }
        Ok(())
    }

    /// Remove a category together with every operation filed under it.
    pub fn remove_category(&mut self, category: &Category) {
        self.categories.retain(|c| c.id != category.id);
        self.operations.retain(|o| o.category.id != category.id);
    }

    // ========================
    // Operation operations
    // ========================

    /// Append without touching any balance.
    pub fn add_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.operations.iter().find(|o| o.id == id)
    }

    /// Overwrite amount, date, description and category of the stored
    /// operation with the same id.
    ///
    /// The account balance is corrected by the difference between the new and
    /// the old effect, so an update never counts an operation twice. An
    /// expense increase that the balance cannot cover is refused.
    pub fn update_operation(&mut self, updated: &Operation) -> Result<(), LedgerError> {
        let Some(op_index) = self.operations.iter().position(|o| o.id == updated.id) else {
            return Ok(());
        };
        factory::validate_amount(updated.amount)?;

        let existing = &self.operations[op_index];
        let delta = (existing.entity_type.sign() * updated.amount)
            .checked_sub(existing.signed_amount())
            .ok_or_else(LedgerError::balance_overflow)?;

        let target = match self.account_index(existing.bank_id) {
            Some(index) => {
                let balance = self.accounts[index].balance();
                let next = shifted(balance, delta)?;
                if delta < 0 && next < 0 {
                    return Err(LedgerError::insufficient_funds(balance, -delta));
                }
                Some((index, next))
            }
            None => None,
        };

        let operation = &mut self.operations[op_index];
        operation.amount = updated.amount;
        operation.date = updated.date;
        operation.description = updated.description.clone();
        operation.category = updated.category.clone();

        match target {
            Some((index, next)) => self.accounts[index].set_balance(next),
            None => Ok(()),
        }
    }

    /// Delete an operation and take its effect back out of the account balance.
    pub fn remove_operation(&mut self, id: OperationId) -> Result<(), LedgerError> {
        let Some(op_index) = self.operations.iter().position(|o| o.id == id) else {
            return Ok(());
        };

        let removed = &self.operations[op_index];
        let target = self
            .account_index(removed.bank_id)
            .map(|index| {
                shifted(self.accounts[index].balance(), -removed.signed_amount())
                    .map(|next| (index, next))
            })
            .transpose()?;

        self.operations.remove(op_index);
        match target {
            Some((index, next)) => self.accounts[index].set_balance(next),
            None => Ok(()),
        }
    }
}

/// `balance + delta`, refusing results outside the `Cents` range.
fn shifted(balance: Cents, delta: Cents) -> Result<Cents, LedgerError> {
    balance
        .checked_add(delta)
        .ok_or_else(LedgerError::balance_overflow)
}
