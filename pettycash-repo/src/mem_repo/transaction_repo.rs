use super::{MemRepo, Ownership};
use crate::transaction_repo::TransactionRepoError::{NotOwner, TransactionNotFound};
use crate::transaction_repo::{
    Filter, NewTransaction, PageOptions, Transaction, TransactionRepo, TransactionRepoError,
    TransactionTotals, TransactionType,
};
use async_trait::async_trait;
use std::collections::HashSet;

impl MemRepo {
    fn user_transactions(
        &self,
        user: &str,
        filter: &Filter,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let read_guard = self.read_lock()?;

        let Some(transaction_ids) = read_guard.user_transactions.get(user) else {
            return Ok(Vec::new());
        };

        let mut transactions: Vec<Transaction> = transaction_ids
            .iter()
            .map(|id| {
                read_guard
                    .transactions
                    .get(id)
                    .expect("transactions should have all the ids from user_transactions")
            })
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.cmp(a));
        Ok(transactions)
    }
}

fn check_owner(ownership: Ownership, transaction_id: i32) -> Result<(), TransactionRepoError> {
    match ownership {
        Ownership::Owned => Ok(()),
        Ownership::NotOwned => Err(NotOwner(transaction_id)),
        Ownership::Missing => Err(TransactionNotFound(transaction_id)),
    }
}

#[async_trait]
impl TransactionRepo for MemRepo {
    async fn get_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let read_guard = self.read_lock()?;
        check_owner(
            read_guard.transaction_ownership(user, transaction_id),
            transaction_id,
        )?;

        let transaction = read_guard
            .transactions
            .get(&transaction_id)
            .expect("owned transaction ids should be present in transactions")
            .clone();
        Ok(transaction)
    }

    async fn get_all_transactions(
        &self,
        user: &str,
        filter: Filter,
        page_options: Option<PageOptions>,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let transactions = self.user_transactions(user, &filter)?;

        let transactions = match page_options {
            Some(page_options) => transactions
                .into_iter()
                .skip(page_options.offset as usize)
                .take(page_options.limit as usize)
                .collect(),
            None => transactions,
        };
        Ok(transactions)
    }

    async fn create_new_transaction(
        &self,
        user: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = write_guard.next_transaction_id;
        write_guard.next_transaction_id += 1;

        let transaction = new_transaction.to_transaction(id);

        write_guard.transactions.insert(id, transaction.clone());
        write_guard
            .user_transactions
            .entry(user.to_owned())
            .or_insert_with(HashSet::new)
            .insert(id);

        Ok(transaction)
    }

    async fn update_transaction(
        &self,
        user: &str,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;
        check_owner(
            write_guard.transaction_ownership(user, transaction_id),
            transaction_id,
        )?;

        let transaction = updated_transaction.to_transaction(transaction_id);
        write_guard
            .transactions
            .insert(transaction_id, transaction.clone());
        Ok(transaction)
    }

    async fn delete_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;
        check_owner(
            write_guard.transaction_ownership(user, transaction_id),
            transaction_id,
        )?;

        write_guard
            .user_transactions
            .get_mut(user)
            .expect("owned transaction ids should be present in user_transactions")
            .remove(&transaction_id);
        let transaction = write_guard
            .transactions
            .remove(&transaction_id)
            .expect("owned transaction ids should be present in transactions");
        Ok(transaction)
    }

    async fn count_category_transactions(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<i64, TransactionRepoError> {
        let filter = Filter {
            category_id: Some(category_id),
            ..Filter::NONE
        };
        Ok(self.user_transactions(user, &filter)?.len() as i64)
    }

    async fn get_totals(&self, user: &str) -> Result<TransactionTotals, TransactionRepoError> {
        let totals = self.user_transactions(user, &Filter::NONE)?.into_iter().fold(
            TransactionTotals::default(),
            |mut totals, t| {
                match t.transaction_type {
                    TransactionType::Income => totals.income += t.amount,
                    TransactionType::Expense => totals.expenses += t.amount,
                }
                totals
            },
        );
        Ok(totals)
    }
}
