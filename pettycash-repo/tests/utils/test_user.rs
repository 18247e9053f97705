use pettycash_repo::category_repo::{Category, CategoryRepo, NewCategory};
use pettycash_repo::transaction_repo::TransactionType;
use pettycash_repo::user_repo::{User, UserRepo};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestUser {
    pub id: String,
    repo: Arc<dyn UserRepo>,
}

#[allow(dead_code)]
impl TestUser {
    pub async fn new(user_repo: &Arc<dyn UserRepo>) -> TestUser {
        let user_id = "test-user-".to_owned() + &Uuid::new_v4().to_string();
        let user = User::new(user_id.clone(), "not a real hash".to_owned());
        user_repo.create_user(user).await.unwrap();
        info!(%user_id, "Created user");
        TestUser {
            id: user_id,
            repo: user_repo.clone(),
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
                &self.id,
                NewCategory::new(name.to_owned(), category_type, "#10B981".to_owned()),
            )
            .await
            .unwrap()
    }

    pub async fn delete(&self) {
        self.repo.delete_user(&self.id).await.unwrap()
    }
}
