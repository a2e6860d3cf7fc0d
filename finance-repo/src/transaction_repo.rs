use crate::transaction_table::TransactionTable;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Inclusive date bounds for listing transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl Filter {
    pub const NONE: Filter = Filter {
        from: None,
        until: None,
    };

    pub const fn period(from: NaiveDate, until: NaiveDate) -> Filter {
        Filter {
            from: Some(from),
            until: Some(until),
        }
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.until.map_or(true, |until| date <= until)
    }
}

#[async_trait]
pub trait TransactionRepo: Sync + Send {
    async fn table_exists(&self, table: &TransactionTable) -> Result<bool, TransactionRepoError>;

    /// Creates the table if it does not exist yet. Safe to call concurrently for the same table.
    async fn ensure_table(&self, table: &TransactionTable) -> Result<(), TransactionRepoError>;

    async fn get_transaction(
        &self,
        table: &TransactionTable,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError>;

    /// Transactions matching `filter`, newest date first. Ties are ordered by descending id.
    async fn get_all_transactions(
        &self,
        table: &TransactionTable,
        filter: Filter,
    ) -> Result<Vec<Transaction>, TransactionRepoError>;

    async fn create_new_transaction(
        &self,
        table: &TransactionTable,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn update_transaction(
        &self,
        table: &TransactionTable,
        transaction_id: i32,
        update: TransactionUpdate,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn delete_transaction(
        &self,
        table: &TransactionTable,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError>;

    /// Net amount per category, income counted positive and expense negative.
    async fn get_category_totals(
        &self,
        table: &TransactionTable,
        filter: Filter,
    ) -> Result<BTreeMap<String, Decimal>, TransactionRepoError>;
}

#[derive(Error, Debug)]
pub enum TransactionRepoError {
    #[error("Table {0} does not exist")]
    NoTable(String),
    #[error("Transaction with id {0} not found")]
    TransactionNotFound(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// `amount` with the sign this type contributes to a balance
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => -amount,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid transaction type {0:?}")]
pub struct InvalidTransactionType(pub String);

impl FromStr for TransactionType {
    type Err = InvalidTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(InvalidTransactionType(s.to_owned())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Transaction {
    pub id: i32,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub place: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

impl Transaction {
    pub const fn new(
        id: i32,
        date: NaiveDate,
        kind: TransactionType,
        category: String,
        place: String,
        amount: Decimal,
        description: Option<String>,
    ) -> Transaction {
        Transaction {
            id,
            date,
            kind,
            category,
            place,
            amount,
            description,
        }
    }

    /// Listing order: date descending, then id descending
    pub fn listing_order(a: &Transaction, b: &Transaction) -> std::cmp::Ordering {
        b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id))
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct NewTransaction {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub place: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

impl NewTransaction {
    pub const fn new(
        date: NaiveDate,
        kind: TransactionType,
        category: String,
        place: String,
        amount: Decimal,
        description: Option<String>,
    ) -> NewTransaction {
        NewTransaction {
            date,
            kind,
            category,
            place,
            amount,
            description,
        }
    }

    pub fn to_transaction(self, id: i32) -> Transaction {
        Transaction::new(
            id,
            self.date,
            self.kind,
            self.category,
            self.place,
            self.amount,
            self.description,
        )
    }
}

/// Partial update of a transaction. `None` leaves the stored value as is.
///
/// `description` is doubly optional: `Some(None)` clears the description.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TransactionUpdate {
    pub date: Option<NaiveDate>,
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    pub place: Option<String>,
    pub amount: Option<Decimal>,
    pub description: Option<Option<String>>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self == &TransactionUpdate::default()
    }

    pub fn apply_to(self, transaction: Transaction) -> Transaction {
        Transaction {
            id: transaction.id,
            date: self.date.unwrap_or(transaction.date),
            kind: self.kind.unwrap_or(transaction.kind),
            category: self.category.unwrap_or(transaction.category),
            place: self.place.unwrap_or(transaction.place),
            amount: self.amount.unwrap_or(transaction.amount),
            description: self.description.unwrap_or(transaction.description),
        }
    }
}
