use super::MemRepo;
use crate::user_repo::UserRepoError::{UserAlreadyExists, UserNotFound};
use crate::user_repo::{User, UserRepo, UserRepoError};
use async_trait::async_trait;
use std::collections::hash_map::Entry;

#[async_trait]
impl UserRepo for MemRepo {
    async fn get_user(&self, user_id: &str) -> Result<User, UserRepoError> {
        let read_guard = self.read_lock()?;

        if let Some(h) = read_guard.users.get(user_id) {
            Ok(User::new(user_id.to_string(), h.to_owned()))
        } else {
            Err(UserNotFound(user_id.to_owned()))
        }
    }

    async fn create_user(&self, user: User) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;

        match write_guard.users.entry(user.id.clone()) {
            Entry::Occupied(_) => Err(UserAlreadyExists(user.id)),
            Entry::Vacant(e) => {
                e.insert(user.password_hash);
                Ok(())
            }
        }
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.users.remove(user_id).is_none() {
            return Err(UserNotFound(user_id.to_owned()));
        }

        let state = &mut *write_guard;
        for id in state.user_transactions.remove(user_id).unwrap_or_default() {
            state.transactions.remove(&id);
        }
        for id in state.user_categories.remove(user_id).unwrap_or_default() {
            state.categories.remove(&id);
        }
        Ok(())
    }
}
