use async_trait::async_trait;
use thiserror::Error;

#[async_trait]
pub trait UserRepo: Sync + Send {
    async fn get_user(&self, user_id: &str) -> Result<User, UserRepoError>;
    async fn create_user(&self, user: User) -> Result<(), UserRepoError>;
    /// Deletes the user together with every category and transaction they own.
    async fn delete_user(&self, user_id: &str) -> Result<(), UserRepoError>;
}

#[derive(Clone, PartialEq, Eq, Debug, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub password_hash: String,
}

impl User {
    pub fn new(id: String, password_hash: String) -> User {
        User { id, password_hash }
    }
}

#[derive(Error, Debug)]
pub enum UserRepoError {
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("User {0} already exists")]
    UserAlreadyExists(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
