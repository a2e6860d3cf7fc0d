use crate::transaction::{TransactionPatch, TransactionPayload};
use crate::user::UserId;
use chrono::NaiveDate;
use finance_repo::transaction_repo::{
    Filter, InvalidTransactionType, Transaction, TransactionRepo, TransactionRepoError,
};
use finance_repo::transaction_table::{InvalidUserId, TransactionTable};
use finance_repo::user_repo::{UserRepo, UserRepoError};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("User not found")]
    UserNotFound(UserId),
    #[error("No transactions found for this user")]
    NoTransactions(UserId),
    #[error("Transaction not found")]
    TransactionNotFound(i32),
    #[error("Invalid transaction type")]
    InvalidTransactionType(#[from] InvalidTransactionType),
    #[error(transparent)]
    InvalidUserId(#[from] InvalidUserId),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ServiceError {
    fn from_repo(table: &TransactionTable) -> impl Fn(TransactionRepoError) -> ServiceError + '_ {
        move |e| match e {
            TransactionRepoError::NoTable(_) => {
                ServiceError::NoTransactions(table.user_id().to_owned())
            }
            TransactionRepoError::TransactionNotFound(id) => ServiceError::TransactionNotFound(id),
            TransactionRepoError::Other(e) => ServiceError::Other(e),
        }
    }
}

/// Per-user transaction operations on top of the repositories
pub struct TransactionService {
    user_repo: Arc<dyn UserRepo>,
    transaction_repo: Arc<dyn TransactionRepo>,
}

impl TransactionService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        transaction_repo: Arc<dyn TransactionRepo>,
    ) -> TransactionService {
        TransactionService {
            user_repo,
            transaction_repo,
        }
    }

    /// Records a transaction for an existing user, creating the user's table on first use
    #[instrument(skip(self, payload))]
    pub async fn create(
        &self,
        user_id: &str,
        payload: TransactionPayload,
    ) -> Result<Transaction, ServiceError> {
        match self.user_repo.get_user(user_id).await {
            Ok(_) => {}
            Err(UserRepoError::UserNotFound(_)) => {
                return Err(ServiceError::UserNotFound(user_id.to_owned()))
            }
            Err(e) => return Err(ServiceError::Other(e.into())),
        }

        let new_transaction = payload.into_new_transaction()?;
        let table = TransactionTable::resolve(user_id)?;

        self.transaction_repo
            .ensure_table(&table)
            .await
            .map_err(ServiceError::from_repo(&table))?;
        let transaction = self
            .transaction_repo
            .create_new_transaction(&table, new_transaction)
            .await
            .map_err(ServiceError::from_repo(&table))?;

        info!(transaction_id = transaction.id, "Created transaction");
        Ok(transaction)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: &str) -> Result<Vec<Transaction>, ServiceError> {
        let table = self.existing_table(user_id).await?;
        self.transaction_repo
            .get_all_transactions(&table, Filter::NONE)
            .await
            .map_err(ServiceError::from_repo(&table))
    }

    /// Transactions dated within `start..=end`. An inverted range yields nothing.
    #[instrument(skip(self))]
    pub async fn list_by_period(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>, ServiceError> {
        let table = self.existing_table(user_id).await?;
        self.transaction_repo
            .get_all_transactions(&table, Filter::period(start, end))
            .await
            .map_err(ServiceError::from_repo(&table))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: &str, transaction_id: i32) -> Result<Transaction, ServiceError> {
        let table = self.existing_table(user_id).await?;
        self.transaction_repo
            .get_transaction(&table, transaction_id)
            .await
            .map_err(ServiceError::from_repo(&table))
    }

    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        user_id: &str,
        transaction_id: i32,
        patch: TransactionPatch,
    ) -> Result<Transaction, ServiceError> {
        let table = self.existing_table(user_id).await?;
        let update = patch.into_update()?;

        let transaction = self
            .transaction_repo
            .update_transaction(&table, transaction_id, update)
            .await
            .map_err(ServiceError::from_repo(&table))?;

        info!("Updated transaction");
        Ok(transaction)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: &str, transaction_id: i32) -> Result<(), ServiceError> {
        let table = self.existing_table(user_id).await?;
        self.transaction_repo
            .delete_transaction(&table, transaction_id)
            .await
            .map_err(ServiceError::from_repo(&table))?;

        info!("Deleted transaction");
        Ok(())
    }

    /// Net amount per category over `start..=end`
    #[instrument(skip(self))]
    pub async fn stats_by_period(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<String, Decimal>, ServiceError> {
        let table = self.existing_table(user_id).await?;
        self.transaction_repo
            .get_category_totals(&table, Filter::period(start, end))
            .await
            .map_err(ServiceError::from_repo(&table))
    }

    /// Table of a user who has recorded at least one transaction. An id that cannot name a
    /// table never had one.
    async fn existing_table(&self, user_id: &str) -> Result<TransactionTable, ServiceError> {
        let table = TransactionTable::resolve(user_id)
            .map_err(|_| ServiceError::NoTransactions(user_id.to_owned()))?;

        let exists = self
            .transaction_repo
            .table_exists(&table)
            .await
            .map_err(ServiceError::from_repo(&table))?;
        if !exists {
            return Err(ServiceError::NoTransactions(user_id.to_owned()));
        }

        Ok(table)
    }
}
