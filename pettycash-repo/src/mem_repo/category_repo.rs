use super::{MemRepo, Ownership};
use crate::category_repo::CategoryRepoError::{CategoryInUse, CategoryNotFound, NotOwner};
use crate::category_repo::{Category, CategoryRepo, CategoryRepoError, NewCategory};
use async_trait::async_trait;
use std::collections::HashSet;

fn check_owner(ownership: Ownership, category_id: i32) -> Result<(), CategoryRepoError> {
    match ownership {
        Ownership::Owned => Ok(()),
        Ownership::NotOwned => Err(NotOwner(category_id)),
        Ownership::Missing => Err(CategoryNotFound(category_id)),
    }
}

#[async_trait]
impl CategoryRepo for MemRepo {
    async fn get_category(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError> {
        let read_guard = self.read_lock()?;
        check_owner(read_guard.category_ownership(user, category_id), category_id)?;

        let category = read_guard
            .categories
            .get(&category_id)
            .expect("owned category ids should be present in categories")
            .clone();
        Ok(category)
    }

    async fn get_all_categories(&self, user: &str) -> Result<Vec<Category>, CategoryRepoError> {
        let read_guard = self.read_lock()?;

        let Some(category_ids) = read_guard.user_categories.get(user) else {
            return Ok(Vec::new());
        };

        let mut categories: Vec<Category> = category_ids
            .iter()
            .map(|id| {
                read_guard
                    .categories
                    .get(id)
                    .expect("categories should have all the ids from user_categories")
            })
            .cloned()
            .collect();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn create_category(
        &self,
        user: &str,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = write_guard.next_category_id;
        write_guard.next_category_id += 1;

        let category = new_category.to_category(id);

        write_guard.categories.insert(id, category.clone());
        write_guard
            .user_categories
            .entry(user.to_owned())
            .or_insert_with(HashSet::new)
            .insert(id);

        Ok(category)
    }

    async fn update_category(
        &self,
        user: &str,
        category_id: i32,
        updated_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let mut write_guard = self.write_lock()?;
        check_owner(write_guard.category_ownership(user, category_id), category_id)?;

        let category = updated_category.to_category(category_id);
        write_guard.categories.insert(category_id, category.clone());
        Ok(category)
    }

    async fn delete_category(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError> {
        let mut write_guard = self.write_lock()?;
        check_owner(write_guard.category_ownership(user, category_id), category_id)?;

        let in_use = write_guard
            .transactions
            .values()
            .any(|t| t.category_id == category_id);
        if in_use {
            return Err(CategoryInUse(category_id));
        }

        write_guard
            .user_categories
            .get_mut(user)
            .expect("owned category ids should be present in user_categories")
            .remove(&category_id);
        let category = write_guard
            .categories
            .remove(&category_id)
            .expect("owned category ids should be present in categories");
        Ok(category)
    }
}
