pub mod generator;
pub mod test_user;

use pettycash_repo::category_repo::CategoryRepo;
use pettycash_repo::transaction_repo::TransactionRepo;
use pettycash_repo::user_repo::UserRepo;
use serde::Deserialize;
use std::fs;
use std::sync::Arc;
use tracing::warn;

#[derive(Deserialize)]
struct TestConfig {
    database_url: String,
}

#[derive(Debug)]
pub enum RepoType {
    SQLx,
    Mem,
}

pub type Repos = (
    Arc<dyn UserRepo>,
    Arc<dyn TransactionRepo>,
    Arc<dyn CategoryRepo>,
);

/// Builds the repos under test. The SQLx repos need a `config_test.toml` with a `database_url`;
/// without one, `None` is returned and the case is skipped.
pub async fn build_repos(repo_type: RepoType) -> Option<Repos> {
    match repo_type {
        RepoType::SQLx => {
            let Ok(config) = fs::read_to_string("config_test.toml") else {
                warn!("config_test.toml not found, skipping SQLx case");
                return None;
            };
            let config: TestConfig = toml::from_str(config.as_str()).unwrap();
            Some(
                pettycash_repo::sqlx_repo::create_repos(config.database_url, 1)
                    .await
                    .unwrap(),
            )
        }
        RepoType::Mem => Some(pettycash_repo::mem_repo::create_repos()),
    }
}
