use crate::sqlx_repo::SQLxRepo;
use crate::transaction_repo::TransactionRepoError::{NoTable, TransactionNotFound};
use crate::transaction_repo::{
    Filter, NewTransaction, Transaction, TransactionRepo, TransactionRepoError, TransactionUpdate,
};
use crate::transaction_table::TransactionTable;
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{query, query_as, query_scalar, Postgres, QueryBuilder};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

const COLUMNS: &str = "id, date, type, category, place, amount, description";

// SQLSTATE undefined_table
const UNDEFINED_TABLE: &str = "42P01";

#[derive(sqlx::FromRow)]
struct TransactionEntry {
    id: i32,
    date: NaiveDate,
    #[sqlx(rename = "type")]
    kind: String,
    category: String,
    place: String,
    amount: Decimal,
    description: Option<String>,
}

impl TryFrom<TransactionEntry> for Transaction {
    type Error = anyhow::Error;

    fn try_from(value: TransactionEntry) -> Result<Self, Self::Error> {
        let kind = value
            .kind
            .parse()
            .with_context(|| format!("Transaction {} has an unknown type", value.id))?;
        Ok(Transaction::new(
            value.id,
            value.date,
            kind,
            value.category,
            value.place,
            value.amount,
            value.description,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct CategoryTotalEntry {
    category: String,
    total: Option<Decimal>,
}

fn into_transactions(entries: Vec<TransactionEntry>) -> Result<Vec<Transaction>, anyhow::Error> {
    entries.into_iter().map(Transaction::try_from).collect()
}

/// Wraps a database error, turning a query against a table that was never provisioned into
/// [`NoTable`]
fn storage_error(table: &TransactionTable, e: sqlx::Error, action: String) -> TransactionRepoError {
    let undefined_table = e
        .as_database_error()
        .and_then(|db_error| db_error.code())
        .map_or(false, |code| code == UNDEFINED_TABLE);
    if undefined_table {
        NoTable(table.name().to_owned())
    } else {
        TransactionRepoError::Other(anyhow::Error::new(e).context(action))
    }
}

fn push_filter(query_builder: &mut QueryBuilder<Postgres>, filter: Filter) {
    if let Some(from) = filter.from {
        query_builder.push(" AND date >= ").push_bind(from);
    }
    if let Some(until) = filter.until {
        query_builder.push(" AND date <= ").push_bind(until);
    }
}

impl SQLxRepo {
    #[instrument(skip(self))]
    async fn create_table(&self, table: &TransactionTable) -> Result<(), TransactionRepoError> {
        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {}
            (
                id          SERIAL PRIMARY KEY,
                date        DATE    NOT NULL,
                type        TEXT    NOT NULL CHECK (type IN ('income', 'expense')),
                category    TEXT    NOT NULL,
                place       TEXT    NOT NULL,
                amount      NUMERIC NOT NULL,
                description TEXT
            )
            "#,
            table.quoted_name()
        );
        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS \"{}_date_idx\" ON {} (date DESC, id DESC)",
            table.name(),
            table.quoted_name()
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to begin transaction")?;

        // Concurrent CREATE TABLE IF NOT EXISTS for the same name can still collide in the
        // catalog, so provisioning of one table is serialised.
        query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(table.name())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to lock {}", table.name()))?;
        query(&create_table)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to create {}", table.name()))?;
        query(&create_index)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to create index on {}", table.name()))?;
        query(
            "INSERT INTO transaction_tables(user_id, table_name) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(table.user_id())
        .bind(table.name())
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Unable to register {}", table.name()))?;

        tx.commit()
            .await
            .with_context(|| format!("Unable to commit creation of {}", table.name()))?;
        info!(table = table.name(), "Created transaction table");
        Ok(())
    }
}

#[async_trait]
impl TransactionRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn table_exists(&self, table: &TransactionTable) -> Result<bool, TransactionRepoError> {
        let exists: bool =
            query_scalar("SELECT EXISTS(SELECT 1 FROM transaction_tables WHERE table_name = $1)")
                .bind(table.name())
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("Unable to look up {}", table.name()))?;
        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn ensure_table(&self, table: &TransactionTable) -> Result<(), TransactionRepoError> {
        if self.table_exists(table).await? {
            debug!(table = table.name(), "Transaction table already exists");
            return Ok(());
        }
        self.create_table(table).await
    }

    #[instrument(skip(self))]
    async fn get_transaction(
        &self,
        table: &TransactionTable,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            COLUMNS,
            table.quoted_name()
        );
        let entry: Option<TransactionEntry> = query_as(&sql)
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                storage_error(
                    table,
                    e,
                    format!("Unable to get transaction {}", transaction_id),
                )
            })?;

        let entry = entry.ok_or(TransactionNotFound(transaction_id))?;
        Ok(Transaction::try_from(entry)?)
    }

    #[instrument(skip(self))]
    async fn get_all_transactions(
        &self,
        table: &TransactionTable,
        filter: Filter,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM {} WHERE TRUE",
            COLUMNS,
            table.quoted_name()
        ));
        push_filter(&mut query_builder, filter);
        query_builder.push(" ORDER BY date DESC, id DESC");

        let entries: Vec<TransactionEntry> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                storage_error(
                    table,
                    e,
                    format!("Unable to get transactions from {}", table.name()),
                )
            })?;

        Ok(into_transactions(entries)?)
    }

    #[instrument(skip(self, new_transaction))]
    async fn create_new_transaction(
        &self,
        table: &TransactionTable,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let sql = format!(
            "INSERT INTO {}(date, type, category, place, amount, description) VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
            table.quoted_name()
        );
        let id: i32 = query_scalar(&sql)
            .bind(new_transaction.date)
            .bind(new_transaction.kind.as_str())
            .bind(&new_transaction.category)
            .bind(&new_transaction.place)
            .bind(new_transaction.amount)
            .bind(&new_transaction.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error(table, e, "Unable to insert transaction".to_string()))?;

        Ok(new_transaction.to_transaction(id))
    }

    #[instrument(skip(self))]
    async fn update_transaction(
        &self,
        table: &TransactionTable,
        transaction_id: i32,
        update: TransactionUpdate,
    ) -> Result<Transaction, TransactionRepoError> {
        let select = format!(
            "SELECT {} FROM {} WHERE id = $1 FOR UPDATE",
            COLUMNS,
            table.quoted_name()
        );
        let update_sql = format!(
            "UPDATE {} SET date = $1, type = $2, category = $3, place = $4, amount = $5, description = $6 WHERE id = $7",
            table.quoted_name()
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to begin transaction")?;

        let entry: Option<TransactionEntry> = query_as(&select)
            .bind(transaction_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                storage_error(
                    table,
                    e,
                    format!("Unable to get transaction {}", transaction_id),
                )
            })?;
        let stored = Transaction::try_from(entry.ok_or(TransactionNotFound(transaction_id))?)?;
        let updated = update.apply_to(stored);

        query(&update_sql)
            .bind(updated.date)
            .bind(updated.kind.as_str())
            .bind(&updated.category)
            .bind(&updated.place)
            .bind(updated.amount)
            .bind(&updated.description)
            .bind(transaction_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to update transaction {}", transaction_id))?;

        tx.commit()
            .await
            .with_context(|| format!("Unable to commit update of transaction {}", transaction_id))?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete_transaction(
        &self,
        table: &TransactionTable,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 RETURNING {}",
            table.quoted_name(),
            COLUMNS
        );
        let entry: Option<TransactionEntry> = query_as(&sql)
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                storage_error(
                    table,
                    e,
                    format!("Unable to delete transaction {}", transaction_id),
                )
            })?;

        let entry = entry.ok_or(TransactionNotFound(transaction_id))?;
        Ok(Transaction::try_from(entry)?)
    }

    #[instrument(skip(self))]
    async fn get_category_totals(
        &self,
        table: &TransactionTable,
        filter: Filter,
    ) -> Result<BTreeMap<String, Decimal>, TransactionRepoError> {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            r#"
            SELECT category,
                   SUM(CASE WHEN type = 'income' THEN amount ELSE -amount END) AS total
            FROM {}
            WHERE TRUE
            "#,
            table.quoted_name()
        ));
        push_filter(&mut query_builder, filter);
        query_builder.push(" GROUP BY category");

        let totals: Vec<CategoryTotalEntry> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                storage_error(
                    table,
                    e,
                    format!("Unable to get category totals from {}", table.name()),
                )
            })?;

        Ok(totals
            .into_iter()
            .map(|entry| (entry.category, entry.total.unwrap_or(Decimal::ZERO)))
            .collect())
    }
}
