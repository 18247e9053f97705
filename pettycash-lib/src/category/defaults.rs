use pettycash_repo::category_repo::{Category, CategoryRepo, CategoryRepoError, NewCategory};
use pettycash_repo::transaction_repo::TransactionType;
use pettycash_repo::transaction_repo::TransactionType::{Expense, Income};
use tracing::{info, instrument};

/// Categories every new user starts with.
pub const DEFAULT_CATEGORIES: [(&str, TransactionType, &str); 12] = [
    ("Sales Revenue", Income, "#10B981"),
    ("Refunds", Income, "#059669"),
    ("Interest", Income, "#047857"),
    ("Other Income", Income, "#065F46"),
    ("Office Supplies", Expense, "#EF4444"),
    ("Travel", Expense, "#DC2626"),
    ("Meals & Entertainment", Expense, "#B91C1C"),
    ("Transportation", Expense, "#991B1B"),
    ("Utilities", Expense, "#7F1D1D"),
    ("Maintenance", Expense, "#F97316"),
    ("Marketing", Expense, "#EA580C"),
    ("Other Expenses", Expense, "#9A3412"),
];

#[instrument(skip(category_repo))]
pub async fn seed_default_categories(
    category_repo: &dyn CategoryRepo,
    user: &str,
) -> Result<Vec<Category>, CategoryRepoError> {
    let mut categories = Vec::with_capacity(DEFAULT_CATEGORIES.len());
    for (name, category_type, color) in DEFAULT_CATEGORIES {
        let new_category = NewCategory::new(name.to_owned(), category_type, color.to_owned());
        categories.push(category_repo.create_category(user, new_category).await?);
    }
    info!(count = categories.len(), "Seeded default categories");
    Ok(categories)
}
