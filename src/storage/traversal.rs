use crate::domain::{BankAccount, Category, Operation};

use super::LedgerStore;

/// Borrowed view of any entity held by the ledger.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Account(&'a BankAccount),
    Category(&'a Category),
    Operation(&'a Operation),
}

impl EntityRef<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            EntityRef::Account(_) => "account",
            EntityRef::Category(_) => "category",
            EntityRef::Operation(_) => "operation",
        }
    }
}

impl LedgerStore {
    /// Walk every entity: all accounts, then all categories, then all operations.
    pub fn for_each_entity<F>(&self, visit: F)
    where
        F: FnMut(EntityRef<'_>),
    {
        self.accounts()
            .iter()
            .map(EntityRef::Account)
            .chain(self.categories().iter().map(EntityRef::Category))
            .chain(self.operations().iter().map(EntityRef::Operation))
            .for_each(visit);
    }
}
