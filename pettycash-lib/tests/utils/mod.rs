use std::sync::Arc;

use chrono::NaiveDate;
use pettycash_lib::user::UserId;
use pettycash_lib::AppSettings;
use pettycash_repo::category_repo::{Category, CategoryRepo, NewCategory};
use pettycash_repo::mem_repo::MemReceiptStore;
use pettycash_repo::transaction_repo::{NewTransaction, Transaction, TransactionRepo, TransactionType};
use pettycash_repo::user_repo::User;
use pettycash_repo::user_repo::UserRepo;
use rstest::*;
use rust_decimal::Decimal;
use tracing::info;
use tracing::Level;
use uuid::Uuid;

/// Wraps a scope so every request is made as the given cashier, in place of bearer
/// authentication.
macro_rules! as_cashier {
    ($scope:expr, $user_id:expr) => {{
        let user_id: pettycash_lib::user::UserId = $user_id;
        $scope.wrap_fn(move |req, srv| {
            actix_web::HttpMessage::extensions_mut(&req).insert(user_id.clone());
            actix_web::dev::Service::call(srv, req)
        })
    }};
}

macro_rules! build_app {
    ($repos:ident, $user_id:expr) => {{
        let receipt_store: std::sync::Arc<dyn pettycash_repo::receipt_store::ReceiptStore> =
            $repos.receipt_store.clone();
        let user_id: pettycash_lib::user::UserId = $user_id;
        let app = App::new()
            .app_data(Data::new($repos.user_repo.clone()))
            .app_data(Data::new($repos.transaction_repo.clone()))
            .app_data(Data::new($repos.category_repo.clone()))
            .app_data(Data::new(receipt_store))
            .app_data(Data::new(utils::settings()))
            .app_data(pettycash_lib::json_config())
            .wrap(pettycash_lib::tracing::create_middleware())
            .service(as_cashier!(
                pettycash_lib::transaction::transaction_service(),
                user_id.clone()
            ))
            .service(as_cashier!(
                pettycash_lib::category::category_service(),
                user_id.clone()
            ))
            .service(as_cashier!(pettycash_lib::report::report_service(), user_id));
        tracing::info!("Built app");
        app
    }};
}

pub struct Repos {
    pub user_repo: Arc<dyn UserRepo>,
    pub transaction_repo: Arc<dyn TransactionRepo>,
    pub category_repo: Arc<dyn CategoryRepo>,
    pub receipt_store: Arc<MemReceiptStore>,
}

pub fn settings() -> AppSettings {
    AppSettings {
        signups_enabled: true,
        seed_default_categories: true,
        report: Default::default(),
    }
}

pub struct TestUser {
    pub user_id: UserId,
    repo: Arc<dyn UserRepo>,
}

impl TestUser {
    pub async fn new(user_repo: Arc<dyn UserRepo>) -> TestUser {
        let user_id = "test-user-".to_owned() + &Uuid::new_v4().to_string();
        let user = User::new(
            user_id.to_string(),
            pettycash_lib::auth::password::encode_password("pass".to_string()).unwrap(),
        );
        user_repo.create_user(user).await.unwrap();
        info!(%user_id, "Created user");
        TestUser {
            user_id,
            repo: user_repo,
        }
    }

    pub async fn create_category(
        &self,
        category_repo: &Arc<dyn CategoryRepo>,
        name: &str,
        category_type: TransactionType,
    ) -> Category {
        category_repo
            .create_category(
                &self.user_id,
                NewCategory::new(name.to_owned(), category_type, "#10B981".to_owned()),
            )
            .await
            .unwrap()
    }

    pub async fn create_transaction(
        &self,
        transaction_repo: &Arc<dyn TransactionRepo>,
        category: &Category,
        date: NaiveDate,
        amount: Decimal,
    ) -> Transaction {
        transaction_repo
            .create_new_transaction(
                &self.user_id,
                NewTransaction::new(
                    category.id,
                    format!("{} on {}", category.name, date),
                    None,
                    category.category_type,
                    date,
                    amount,
                    None,
                ),
            )
            .await
            .unwrap()
    }

    pub async fn delete(&self) {
        self.repo.delete_user(&self.user_id).await.unwrap()
    }
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[fixture]
pub fn repos() -> Repos {
    let (user_repo, transaction_repo, category_repo) = pettycash_repo::mem_repo::create_repos();
    Repos {
        user_repo,
        transaction_repo,
        category_repo,
        receipt_store: Arc::new(MemReceiptStore::new()),
    }
}
