use crate::transaction_repo::TransactionType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[async_trait]
pub trait CategoryRepo: Sync + Send {
    async fn get_category(&self, user: &str, category_id: i32)
        -> Result<Category, CategoryRepoError>;

    /// Returns the user's categories in creation order.
    async fn get_all_categories(&self, user: &str) -> Result<Vec<Category>, CategoryRepoError>;

    async fn create_category(
        &self,
        user: &str,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError>;

    async fn update_category(
        &self,
        user: &str,
        category_id: i32,
        updated_category: NewCategory,
    ) -> Result<Category, CategoryRepoError>;

    async fn delete_category(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError>;
}

#[derive(Error, Debug)]
pub enum CategoryRepoError {
    #[error("Category with id {0} not found")]
    CategoryNotFound(i32),
    #[error("Category with id {0} belongs to another user")]
    NotOwner(i32),
    #[error("Category with id {0} still has transactions")]
    CategoryInUse(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Category {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    pub color: String,
}

impl Category {
    pub const fn new(
        id: i32,
        name: String,
        category_type: TransactionType,
        color: String,
    ) -> Category {
        Category {
            id,
            name,
            category_type,
            color,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    pub color: String,
}

impl NewCategory {
    pub const fn new(name: String, category_type: TransactionType, color: String) -> NewCategory {
        NewCategory {
            name,
            category_type,
            color,
        }
    }

    pub fn to_category(self, id: i32) -> Category {
        Category::new(id, self.name, self.category_type, self.color)
    }
}
