use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug)]
pub struct PageOptions {
    pub offset: i64,
    pub limit: i64,
}

#[derive(Default, Clone, Debug)]
pub struct Filter {
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub category_id: Option<i32>,
    pub transaction_type: Option<TransactionType>,
}

impl Filter {
    pub const NONE: Filter = Filter {
        from: None,
        until: None,
        category_id: None,
        transaction_type: None,
    };

    pub(crate) fn matches(&self, transaction: &Transaction) -> bool {
        self.from.map_or(true, |from| transaction.date >= from)
            && self.until.map_or(true, |until| transaction.date <= until)
            && self
                .category_id
                .map_or(true, |id| transaction.category_id == id)
            && self
                .transaction_type
                .map_or(true, |t| transaction.transaction_type == t)
    }
}

#[async_trait]
pub trait TransactionRepo: Sync + Send {
    async fn get_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError>;

    /// Returns the user's transactions, newest date first. Transactions on the same date are
    /// ordered by descending id.
    async fn get_all_transactions(
        &self,
        user: &str,
        filter: Filter,
        page_options: Option<PageOptions>,
    ) -> Result<Vec<Transaction>, TransactionRepoError>;

    async fn create_new_transaction(
        &self,
        user: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn update_transaction(
        &self,
        user: &str,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn delete_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn count_category_transactions(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<i64, TransactionRepoError>;

    async fn get_totals(&self, user: &str) -> Result<TransactionTotals, TransactionRepoError>;
}

#[derive(Error, Debug)]
pub enum TransactionRepoError {
    #[error("Transaction with id {0} not found")]
    TransactionNotFound(i32),
    #[error("Transaction with id {0} belongs to another user")]
    NotOwner(i32),
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

    /// Sign applied to an amount of this type when computing a balance.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => -amount,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid transaction type: {0}")]
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

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Transaction {
    pub id: i32,
    pub category_id: i32,
    pub description: String,
    pub used_by: Option<String>,
    pub transaction_type: TransactionType,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub receipt_path: Option<String>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        id: i32,
        category_id: i32,
        description: String,
        used_by: Option<String>,
        transaction_type: TransactionType,
        date: NaiveDate,
        amount: Decimal,
        receipt_path: Option<String>,
    ) -> Transaction {
        Transaction {
            id,
            category_id,
            description,
            used_by,
            transaction_type,
            date,
            amount,
            receipt_path,
        }
    }

    /// The amount with the sign of its type: positive for income, negative for expenses.
    pub fn signed_amount(&self) -> Decimal {
        self.transaction_type.signed(self.amount)
    }
}

impl PartialOrd for Transaction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Transaction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct NewTransaction {
    pub category_id: i32,
    pub description: String,
    pub used_by: Option<String>,
    pub transaction_type: TransactionType,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub receipt_path: Option<String>,
}

impl NewTransaction {
    pub const fn new(
        category_id: i32,
        description: String,
        used_by: Option<String>,
        transaction_type: TransactionType,
        date: NaiveDate,
        amount: Decimal,
        receipt_path: Option<String>,
    ) -> NewTransaction {
        NewTransaction {
            category_id,
            description,
            used_by,
            transaction_type,
            date,
            amount,
            receipt_path,
        }
    }

    pub fn to_transaction(self, id: i32) -> Transaction {
        Transaction {
            id,
            category_id: self.category_id,
            description: self.description,
            used_by: self.used_by,
            transaction_type: self.transaction_type,
            date: self.date,
            amount: self.amount,
            receipt_path: self.receipt_path,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TransactionTotals {
    pub income: Decimal,
    pub expenses: Decimal,
}

impl TransactionTotals {
    pub fn balance(&self) -> Decimal {
        self.income - self.expenses
    }
}
