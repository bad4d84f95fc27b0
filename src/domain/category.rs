use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

pub type CategoryId = Uuid;

/// Direction of money flow, shared by categories and operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// Money entering an account
    Income,
    /// Money leaving an account
    Expense,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Income => "Income",
            EntityType::Expense => "Expense",
        }
    }

    /// Lenient mapping used for imported records: "income" in any casing is
    /// Income, every other label is Expense.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("income") {
            EntityType::Income
        } else {
            EntityType::Expense
        }
    }

    /// Sign applied to an amount of this type when it hits a balance.
    pub fn sign(&self) -> i64 {
        match self {
            EntityType::Income => 1,
            EntityType::Expense => -1,
        }
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(EntityType::Income),
            "expense" => Ok(EntityType::Expense),
            other => Err(format!("unknown entity type '{}'", other)),
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification label for operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Category {
    pub id: CategoryId,
    pub entity_type: EntityType,
    pub name: String,
}

impl Category {
    pub fn new(entity_type: EntityType, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_type,
            name: name.into(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.entity_type == EntityType::Income
    }
}
