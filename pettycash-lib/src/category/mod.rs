use crate::validation::ValidationErrors;
use actix_web::{web, Scope};
use pettycash_repo::category_repo::NewCategory;
use pettycash_repo::transaction_repo::TransactionType;
use serde::{Deserialize, Serialize};

pub mod defaults;
mod handlers;

pub const MAX_NAME_LENGTH: usize = 255;

pub fn category_service() -> Scope {
    web::scope("/categories")
        .service(handlers::get_all_categories)
        .service(handlers::create_category)
        .service(handlers::update_category)
        .service(handlers::delete_category)
}

/// `#RRGGBB`
pub fn is_valid_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Category fields as submitted. Everything is optional so that missing fields are reported as
/// validation errors.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CategoryForm {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub category_type: Option<String>,
    pub color: Option<String>,
}

impl CategoryForm {
    pub fn validate(self) -> Result<NewCategory, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = match self.name.map(|n| n.trim().to_owned()) {
            Some(name) if name.chars().count() > MAX_NAME_LENGTH => {
                errors.add("name", "The name may not be greater than 255 characters.");
                None
            }
            Some(name) if !name.is_empty() => Some(name),
            _ => {
                errors.add("name", "The name field is required.");
                None
            }
        };

        let category_type = match self.category_type.as_deref() {
            None | Some("") => {
                errors.add("type", "The type field is required.");
                None
            }
            Some(category_type) => match category_type.parse::<TransactionType>() {
                Ok(category_type) => Some(category_type),
                Err(_) => {
                    errors.add("type", "The selected type is invalid.");
                    None
                }
            },
        };

        let color = match self.color {
            None => {
                errors.add("color", "The color field is required.");
                None
            }
            Some(color) if color.is_empty() => {
                errors.add("color", "The color field is required.");
                None
            }
            Some(color) if !is_valid_color(&color) => {
                errors.add("color", "The color format is invalid.");
                None
            }
            Some(color) => Some(color),
        };

        match (name, category_type, color) {
            (Some(name), Some(category_type), Some(color)) if errors.is_empty() => {
                Ok(NewCategory::new(name, category_type, color))
            }
            _ => Err(errors),
        }
    }
}
