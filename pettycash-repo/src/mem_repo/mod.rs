use crate::category_repo::{Category, CategoryRepo};
use crate::receipt_store::ReceiptStore;
use crate::transaction_repo::{Transaction, TransactionRepo};
use crate::user_repo::UserRepo;
use anyhow::anyhow;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod category_repo;
mod receipt_store;
mod transaction_repo;
mod user_repo;

pub use receipt_store::MemReceiptStore;

#[derive(Default)]
struct State {
    users: HashMap<String, String>,
    transactions: HashMap<i32, Transaction>,
    user_transactions: HashMap<String, HashSet<i32>>,
    next_transaction_id: i32,
    categories: HashMap<i32, Category>,
    user_categories: HashMap<String, HashSet<i32>>,
    next_category_id: i32,
}

/// Whether `id` is present in a store keyed by id, and if so, whether `user` owns it.
enum Ownership {
    Owned,
    NotOwned,
    Missing,
}

impl State {
    fn ownership(
        owned: &HashMap<String, HashSet<i32>>,
        all_ids: impl Fn(&i32) -> bool,
        user: &str,
        id: i32,
    ) -> Ownership {
        if !all_ids(&id) {
            Ownership::Missing
        } else if owned.get(user).map_or(false, |ids| ids.contains(&id)) {
            Ownership::Owned
        } else {
            Ownership::NotOwned
        }
    }

    fn transaction_ownership(&self, user: &str, transaction_id: i32) -> Ownership {
        Self::ownership(
            &self.user_transactions,
            |id| self.transactions.contains_key(id),
            user,
            transaction_id,
        )
    }

    fn category_ownership(&self, user: &str, category_id: i32) -> Ownership {
        Self::ownership(
            &self.user_categories,
            |id| self.categories.contains_key(id),
            user,
            category_id,
        )
    }
}

/// Keeps users, categories and transactions in memory. Intended for tests and local runs.
pub struct MemRepo {
    state: RwLock<State>,
}

impl MemRepo {
    pub fn new() -> MemRepo {
        MemRepo {
            state: RwLock::new(State::default()),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<State>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<State>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemRepo {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_repos() -> (
    Arc<dyn UserRepo>,
    Arc<dyn TransactionRepo>,
    Arc<dyn CategoryRepo>,
) {
    let repo = Arc::new(MemRepo::new());
    (repo.clone(), repo.clone(), repo)
}

pub fn create_receipt_store() -> Arc<dyn ReceiptStore> {
    Arc::new(MemReceiptStore::new())
}
