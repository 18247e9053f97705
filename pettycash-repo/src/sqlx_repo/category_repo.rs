use crate::category_repo::CategoryRepoError::{CategoryInUse, CategoryNotFound, NotOwner};
use crate::category_repo::{Category, CategoryRepo, CategoryRepoError, NewCategory};
use crate::sqlx_repo::{is_foreign_key_violation, SQLxRepo};
use crate::transaction_repo::TransactionType;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{query_as, query_scalar};
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct CategoryEntry {
    id: i32,
    name: String,
    category_type: String,
    color: String,
}

impl TryFrom<CategoryEntry> for Category {
    type Error = CategoryRepoError;

    fn try_from(value: CategoryEntry) -> Result<Self, Self::Error> {
        let category_type = value
            .category_type
            .parse::<TransactionType>()
            .with_context(|| format!("Category {} has an invalid type", value.id))?;
        Ok(Category::new(value.id, value.name, category_type, value.color))
    }
}

impl SQLxRepo {
    #[instrument(skip(self))]
    async fn missing_category_error(
        &self,
        category_id: i32,
    ) -> Result<CategoryRepoError, CategoryRepoError> {
        let exists = query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Unable to look up category {}", category_id))?;
        Ok(if exists {
            NotOwner(category_id)
        } else {
            CategoryNotFound(category_id)
        })
    }
}

#[async_trait]
impl CategoryRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_category(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError> {
        let entry = query_as::<_, CategoryEntry>(
            "SELECT id, name, category_type, color FROM categories WHERE id = $1 AND user_id = $2",
        )
        .bind(category_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get category {}", category_id))?;

        match entry {
            Some(entry) => entry.try_into(),
            None => Err(self.missing_category_error(category_id).await?),
        }
    }

    #[instrument(skip(self))]
    async fn get_all_categories(&self, user: &str) -> Result<Vec<Category>, CategoryRepoError> {
        query_as::<_, CategoryEntry>(
            "SELECT id, name, category_type, color FROM categories WHERE user_id = $1 ORDER BY id",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to get categories for user {}", user))?
        .into_iter()
        .map(Category::try_from)
        .collect()
    }

    #[instrument(skip(self))]
    async fn create_category(
        &self,
        user: &str,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let id = query_scalar::<_, i32>(
            "INSERT INTO categories(name, category_type, color, user_id) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&new_category.name)
        .bind(new_category.category_type.as_str())
        .bind(&new_category.color)
        .bind(user)
        .fetch_one(&self.pool)
        .await
        .context("Unable to insert category")?;

        Ok(new_category.to_category(id))
    }

    #[instrument(skip(self))]
    async fn update_category(
        &self,
        user: &str,
        category_id: i32,
        updated_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let result = sqlx::query(
            "UPDATE categories SET name = $1, category_type = $2, color = $3 WHERE user_id = $4 AND id = $5",
        )
        .bind(&updated_category.name)
        .bind(updated_category.category_type.as_str())
        .bind(&updated_category.color)
        .bind(user)
        .bind(category_id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Unable to update category {}", category_id))?;

        if result.rows_affected() == 0 {
            return Err(self.missing_category_error(category_id).await?);
        }
        Ok(updated_category.to_category(category_id))
    }

    #[instrument(skip(self))]
    async fn delete_category(
        &self,
        user: &str,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError> {
        let result = query_as::<_, CategoryEntry>(
            "DELETE FROM categories WHERE user_id = $1 AND id = $2 RETURNING id, name, category_type, color",
        )
        .bind(user)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(entry)) => entry.try_into(),
            Ok(None) => Err(self.missing_category_error(category_id).await?),
            Err(e) if is_foreign_key_violation(&e) => Err(CategoryInUse(category_id)),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Unable to delete category {}", category_id))
                .into()),
        }
    }
}
