use crate::transaction_repo::TransactionRepoError::{NoTable, TransactionNotFound};
use crate::transaction_repo::{
    Filter, NewTransaction, Transaction, TransactionRepo, TransactionRepoError, TransactionUpdate,
};
use crate::transaction_table::TransactionTable;
use anyhow::anyhow;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory stand-in for one user's table. Ids start at 1 and are never reused.
struct MemTable {
    rows: BTreeMap<i32, Transaction>,
    last_id: i32,
}

impl MemTable {
    fn new() -> MemTable {
        MemTable {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

type Tables = HashMap<String, MemTable>;

pub struct MemTransactionRepo {
    tables: RwLock<Tables>,
}

impl MemTransactionRepo {
    pub fn new() -> MemTransactionRepo {
        MemTransactionRepo {
            tables: RwLock::new(HashMap::new()),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<Tables>, anyhow::Error> {
        self.tables
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<Tables>, anyhow::Error> {
        self.tables
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemTransactionRepo {
    fn default() -> Self {
        MemTransactionRepo::new()
    }
}

#[async_trait]
impl TransactionRepo for MemTransactionRepo {
    async fn table_exists(&self, table: &TransactionTable) -> Result<bool, TransactionRepoError> {
        Ok(self.read_lock()?.contains_key(table.name()))
    }

    async fn ensure_table(&self, table: &TransactionTable) -> Result<(), TransactionRepoError> {
        self.write_lock()?
            .entry(table.name().to_owned())
            .or_insert_with(MemTable::new);
        Ok(())
    }

    async fn get_transaction(
        &self,
        table: &TransactionTable,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let read_guard = self.read_lock()?;
        let mem_table = read_guard
            .get(table.name())
            .ok_or_else(|| NoTable(table.name().to_owned()))?;

        mem_table
            .rows
            .get(&transaction_id)
            .cloned()
            .ok_or(TransactionNotFound(transaction_id))
    }

    async fn get_all_transactions(
        &self,
        table: &TransactionTable,
        filter: Filter,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let read_guard = self.read_lock()?;
        let mem_table = read_guard
            .get(table.name())
            .ok_or_else(|| NoTable(table.name().to_owned()))?;

        let mut transactions: Vec<Transaction> = mem_table
            .rows
            .values()
            .filter(|t| filter.matches(t.date))
            .cloned()
            .collect();
        transactions.sort_by(Transaction::listing_order);

        Ok(transactions)
    }

    async fn create_new_transaction(
        &self,
        table: &TransactionTable,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;
        let mem_table = write_guard
            .get_mut(table.name())
            .ok_or_else(|| NoTable(table.name().to_owned()))?;

        mem_table.last_id += 1;
        let transaction = new_transaction.to_transaction(mem_table.last_id);
        mem_table.rows.insert(transaction.id, transaction.clone());

        Ok(transaction)
    }

    async fn update_transaction(
        &self,
        table: &TransactionTable,
        transaction_id: i32,
        update: TransactionUpdate,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;
        let mem_table = write_guard
            .get_mut(table.name())
            .ok_or_else(|| NoTable(table.name().to_owned()))?;

        let stored = mem_table
            .rows
            .get_mut(&transaction_id)
            .ok_or(TransactionNotFound(transaction_id))?;
        *stored = update.apply_to(stored.clone());

        Ok(stored.clone())
    }

    async fn delete_transaction(
        &self,
        table: &TransactionTable,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;
        let mem_table = write_guard
            .get_mut(table.name())
            .ok_or_else(|| NoTable(table.name().to_owned()))?;

        mem_table
            .rows
            .remove(&transaction_id)
            .ok_or(TransactionNotFound(transaction_id))
    }

    async fn get_category_totals(
        &self,
        table: &TransactionTable,
        filter: Filter,
    ) -> Result<BTreeMap<String, Decimal>, TransactionRepoError> {
        let transactions = self.get_all_transactions(table, filter).await?;

        let mut totals = BTreeMap::new();
        for t in transactions {
            *totals.entry(t.category).or_insert(Decimal::ZERO) += t.kind.signed(t.amount);
        }

        Ok(totals)
    }
}
