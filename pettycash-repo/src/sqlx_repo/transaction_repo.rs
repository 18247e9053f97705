use crate::sqlx_repo::SQLxRepo;
use crate::transaction_repo::TransactionRepoError::{NotOwner, TransactionNotFound};
use crate::transaction_repo::{
    Filter, NewTransaction, PageOptions, Transaction, TransactionRepo, TransactionRepoError,
    TransactionTotals, TransactionType,
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{query, query_as, query_scalar, QueryBuilder};
use tracing::instrument;

const TRANSACTION_COLUMNS: &str =
    "id, category_id, description, used_by, transaction_type, date, amount, receipt_path";

#[derive(sqlx::FromRow)]
struct TransactionEntry {
    id: i32,
    category_id: i32,
    description: String,
    used_by: Option<String>,
    transaction_type: String,
    date: NaiveDate,
    amount: Decimal,
    receipt_path: Option<String>,
}

impl TryFrom<TransactionEntry> for Transaction {
    type Error = TransactionRepoError;

    fn try_from(value: TransactionEntry) -> Result<Self, Self::Error> {
        let transaction_type = value
            .transaction_type
            .parse::<TransactionType>()
            .with_context(|| format!("Transaction {} has an invalid type", value.id))?;
        Ok(Transaction::new(
            value.id,
            value.category_id,
            value.description,
            value.used_by,
            transaction_type,
            value.date,
            value.amount,
            value.receipt_path,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct TotalsResult {
    income: Option<Decimal>,
    expenses: Option<Decimal>,
}

impl SQLxRepo {
    /// Distinguishes a transaction that does not exist from one owned by another user.
    #[instrument(skip(self))]
    async fn missing_transaction_error(
        &self,
        transaction_id: i32,
    ) -> Result<TransactionRepoError, TransactionRepoError> {
        let exists: bool =
            query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM transactions WHERE id = $1)")
                .bind(transaction_id)
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("Unable to look up transaction {}", transaction_id))?;
        Ok(if exists {
            NotOwner(transaction_id)
        } else {
            TransactionNotFound(transaction_id)
        })
    }

    #[instrument(skip(self))]
    async fn get_transaction_entries(
        &self,
        user: &str,
        filter: Filter,
        page_options: Option<PageOptions>,
    ) -> Result<Vec<TransactionEntry>, TransactionRepoError> {
        let mut query_builder = QueryBuilder::new(format!(
            "SELECT {} FROM transactions WHERE user_id = ",
            TRANSACTION_COLUMNS
        ));
        query_builder.push_bind(user);
        if let Some(from) = filter.from {
            query_builder.push(" AND date >= ").push_bind(from);
        }
        if let Some(until) = filter.until {
            query_builder.push(" AND date <= ").push_bind(until);
        }
        if let Some(category_id) = filter.category_id {
            query_builder.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(transaction_type) = filter.transaction_type {
            query_builder
                .push(" AND transaction_type = ")
                .push_bind(transaction_type.as_str());
        }
        query_builder.push(" ORDER BY date DESC, id DESC");
        if let Some(po) = page_options {
            query_builder
                .push(" OFFSET ")
                .push_bind(po.offset)
                .push(" LIMIT ")
                .push_bind(po.limit);
        }
        let transaction_entries: Vec<TransactionEntry> = query_builder
            .build_query_as::<TransactionEntry>()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get transactions for user {}", user))?;
        Ok(transaction_entries)
    }
}

#[async_trait]
impl TransactionRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let entry: Option<TransactionEntry> = query_as::<_, TransactionEntry>(&format!(
            "SELECT {} FROM transactions WHERE id = $1 AND user_id = $2",
            TRANSACTION_COLUMNS
        ))
        .bind(transaction_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get transaction {}", transaction_id))?;

        match entry {
            Some(entry) => entry.try_into(),
            None => Err(self.missing_transaction_error(transaction_id).await?),
        }
    }

    #[instrument(skip(self))]
    async fn get_all_transactions(
        &self,
        user: &str,
        filter: Filter,
        page_options: Option<PageOptions>,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        self.get_transaction_entries(user, filter, page_options)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    #[instrument(skip(self, new_transaction))]
    async fn create_new_transaction(
        &self,
        user: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let id = query_scalar::<_, i32>(
            "INSERT INTO transactions(category_id, description, used_by, transaction_type, date, amount, receipt_path, user_id) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(new_transaction.category_id)
        .bind(&new_transaction.description)
        .bind(&new_transaction.used_by)
        .bind(new_transaction.transaction_type.as_str())
        .bind(new_transaction.date)
        .bind(new_transaction.amount)
        .bind(&new_transaction.receipt_path)
        .bind(user)
        .fetch_one(&self.pool)
        .await
        .context("Unable to insert transaction")?;

        Ok(new_transaction.to_transaction(id))
    }

    #[instrument(skip(self, updated_transaction))]
    async fn update_transaction(
        &self,
        user: &str,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let result = query(
            "UPDATE transactions SET category_id = $1, description = $2, used_by = $3, transaction_type = $4, date = $5, amount = $6, receipt_path = $7 WHERE user_id = $8 AND id = $9",
        )
        .bind(updated_transaction.category_id)
        .bind(&updated_transaction.description)
        .bind(&updated_transaction.used_by)
        .bind(updated_transaction.transaction_type.as_str())
        .bind(updated_transaction.date)
        .bind(updated_transaction.amount)
        .bind(&updated_transaction.receipt_path)
        .bind(user)
        .bind(transaction_id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Unable to update transaction {}", transaction_id))?;

        if result.rows_affected() == 0 {
            return Err(self.missing_transaction_error(transaction_id).await?);
        }
        Ok(updated_transaction.to_transaction(transaction_id))
    }

    #[instrument(skip(self))]
    async fn delete_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let entry: Option<TransactionEntry> = query_as::<_, TransactionEntry>(&format!(
            "DELETE FROM transactions WHERE user_id = $1 AND id = $2 RETURNING {}",
            TRANSACTION_COLUMNS
        ))
        .bind(user)
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to delete transaction {}", transaction_id))?;

        match entry {
            Some(entry) => entry.try_into(),
            None => Err(self.missing_transaction_error(transaction_id).await?),
        }
    }

    #[instrument(skip(self))]
    async fn count_category_transactions(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<i64, TransactionRepoError> {
        let count: i64 =
            query_scalar::<_, i64>("SELECT COUNT(*) FROM transactions WHERE user_id = $1 AND category_id = $2")
                .bind(user)
                .bind(category_id)
                .fetch_one(&self.pool)
                .await
                .with_context(|| {
                    format!("Unable to count transactions in category {}", category_id)
                })?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn get_totals(&self, user: &str) -> Result<TransactionTotals, TransactionRepoError> {
        let totals = query_as::<_, TotalsResult>(
            r#"
            SELECT SUM(amount) FILTER (WHERE transaction_type = 'income')  AS income,
                   SUM(amount) FILTER (WHERE transaction_type = 'expense') AS expenses
            FROM transactions
            WHERE user_id = $1
            "#,
        )
        .bind(user)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Unable to get totals for user {}", user))?;

        Ok(TransactionTotals {
            income: totals.income.unwrap_or(Decimal::ZERO),
            expenses: totals.expenses.unwrap_or(Decimal::ZERO),
        })
    }
}
