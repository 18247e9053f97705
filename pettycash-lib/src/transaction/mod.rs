use crate::validation::ValidationErrors;
use actix_web::{web, Scope};
use chrono::NaiveDate;
use pettycash_repo::category_repo::Category;
use pettycash_repo::transaction_repo::{NewTransaction, TransactionType};
use receipt::{ReceiptImage, ReceiptUpload};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

mod handlers;
pub mod receipt;

pub const MAX_TEXT_LENGTH: usize = 255;

pub fn transaction_service() -> Scope {
    web::scope("/transactions")
        .service(handlers::get_all_transactions)
        .service(handlers::get_receipt)
        .service(handlers::get_transaction)
        .service(handlers::create_new_transaction)
        .service(handlers::update_transaction)
        .service(handlers::delete_transaction)
}

/// Transaction fields as submitted. Fields are loosely typed so that every problem is reported
/// per field instead of failing deserialization.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TransactionForm {
    pub amount: Option<Value>,
    pub description: Option<String>,
    pub used_by: Option<String>,
    pub category_id: Option<i32>,
    pub transaction_type: Option<String>,
    pub date: Option<String>,
    pub receipt: Option<ReceiptUpload>,
}

/// A form that passed validation. `new_transaction` has no receipt path yet.
#[derive(Debug)]
pub struct ValidTransaction {
    pub new_transaction: NewTransaction,
    pub receipt: Option<ReceiptImage>,
}

/// Largest amount that fits a `NUMERIC(12, 2)` column.
const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

fn parse_amount(amount: &Value) -> Option<Decimal> {
    match amount {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

impl TransactionForm {
    /// `category` is the caller's category named by `category_id`, if there is one.
    pub fn validate(self, category: Option<&Category>) -> Result<ValidTransaction, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let amount = match self.amount.as_ref() {
            None | Some(Value::Null) => {
                errors.add("amount", "The amount field is required.");
                None
            }
            Some(value) => match parse_amount(value) {
                None => {
                    errors.add("amount", "The amount must be a number.");
                    None
                }
                Some(amount) if amount < Decimal::new(1, 2) => {
                    errors.add("amount", "The amount must be at least 0.01.");
                    None
                }
                Some(amount) if amount.normalize().scale() > 2 => {
                    errors.add("amount", "The amount must have at most 2 decimal places.");
                    None
                }
                Some(amount) if amount > MAX_AMOUNT => {
                    errors.add("amount", "The amount may not be greater than 9999999999.99.");
                    None
                }
                Some(amount) => Some(amount),
            },
        };

        let description = match self.description.map(|d| d.trim().to_owned()) {
            Some(d) if d.chars().count() > MAX_TEXT_LENGTH => {
                errors.add(
                    "description",
                    "The description may not be greater than 255 characters.",
                );
                None
            }
            Some(d) if !d.is_empty() => Some(d),
            _ => {
                errors.add("description", "The description field is required.");
                None
            }
        };

        let used_by = self
            .used_by
            .map(|u| u.trim().to_owned())
            .filter(|u| !u.is_empty());
        if used_by
            .as_ref()
            .map_or(false, |u| u.chars().count() > MAX_TEXT_LENGTH)
        {
            errors.add(
                "used_by",
                "The used by may not be greater than 255 characters.",
            );
        }

        let transaction_type = match self.transaction_type.as_deref() {
            None | Some("") => {
                errors.add(
                    "transaction_type",
                    "The transaction type field is required.",
                );
                None
            }
            Some(t) => match t.parse::<TransactionType>() {
                Ok(t) => Some(t),
                Err(_) => {
                    errors.add("transaction_type", "The selected transaction type is invalid.");
                    None
                }
            },
        };

        let category_id = match (self.category_id, category) {
            (None, _) => {
                errors.add("category_id", "The category id field is required.");
                None
            }
            (Some(id), Some(category)) if category.id == id => {
                if let Some(t) = transaction_type {
                    if category.category_type != t {
                        errors.add(
                            "category_id",
                            "The category type must match the transaction type.",
                        );
                    }
                }
                Some(id)
            }
            (Some(_), _) => {
                errors.add("category_id", "The selected category id is invalid.");
                None
            }
        };

        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add("date", "The date field is required.");
                None
            }
            Some(date) => match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("date", "The date is not a valid date.");
                    None
                }
            },
        };

        let receipt = match self.receipt.as_ref().map(ReceiptUpload::decode) {
            None => None,
            Some(Ok(image)) => Some(image),
            Some(Err(message)) => {
                errors.add("receipt", message);
                None
            }
        };

        match (amount, description, category_id, transaction_type, date) {
            (Some(amount), Some(description), Some(category_id), Some(transaction_type), Some(date))
                if errors.is_empty() =>
            {
                Ok(ValidTransaction {
                    new_transaction: NewTransaction::new(
                        category_id,
                        description,
                        used_by,
                        transaction_type,
                        date,
                        amount,
                        None,
                    ),
                    receipt,
                })
            }
            _ => Err(errors),
        }
    }
}
