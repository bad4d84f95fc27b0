use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, Category, Cents, EntityType, cents_as_units};

pub type OperationId = Uuid;

/// A single income or expense affecting exactly one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Operation {
    pub id: OperationId,
    /// Income or Expense; fixed at creation
    pub entity_type: EntityType,
    /// Owning account (lookup key, not ownership)
    pub bank_id: AccountId,
    /// Amount in cents (never negative)
    #[serde(with = "cents_as_units")]
    pub amount: Cents,
    pub date: DateTime<Utc>,
    pub description: String,
    /// Current field values of the category this operation is filed under
    pub category: Category,
}

impl Operation {
    /// Build an operation. Amount validation lives in the factory.
    pub fn new(
        entity_type: EntityType,
        bank_id: AccountId,
        amount: Cents,
        date: DateTime<Utc>,
        description: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_type,
            bank_id,
            amount,
            date,
            description: description.into(),
            category,
        }
    }

    /// Effect of this operation on its account's balance.
    pub fn signed_amount(&self) -> Cents {
        self.entity_type.sign() * self.amount
    }

    pub fn is_income(&self) -> bool {
        self.entity_type == EntityType::Income
    }

    pub fn is_within(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.date >= start && self.date <= end
    }
}
