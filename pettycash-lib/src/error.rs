use crate::validation::ValidationErrors;
use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use pettycash_repo::category_repo::CategoryRepoError;
use pettycash_repo::receipt_store::ReceiptStoreError;
use pettycash_repo::transaction_repo::TransactionRepoError;
use pettycash_repo::user_repo::UserRepoError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    TransactionRepo(#[from] TransactionRepoError),
    #[error(transparent)]
    CategoryRepo(#[from] CategoryRepoError),
    #[error(transparent)]
    UserRepo(#[from] UserRepoError),
    #[error(transparent)]
    ReceiptStore(#[from] ReceiptStoreError),
    #[error("{}", .0.message())]
    Validation(ValidationErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unable to process password")]
    Password(#[from] argon2::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ValidationErrors> for HandlerError {
    fn from(errors: ValidationErrors) -> Self {
        HandlerError::Validation(errors)
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::TransactionRepo(TransactionRepoError::TransactionNotFound(_))
            | HandlerError::CategoryRepo(CategoryRepoError::CategoryNotFound(_))
            | HandlerError::UserRepo(UserRepoError::UserNotFound(_))
            | HandlerError::ReceiptStore(ReceiptStoreError::ReceiptNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            HandlerError::TransactionRepo(TransactionRepoError::NotOwner(_))
            | HandlerError::CategoryRepo(CategoryRepoError::NotOwner(_)) => StatusCode::FORBIDDEN,
            HandlerError::CategoryRepo(CategoryRepoError::CategoryInUse(_))
            | HandlerError::UserRepo(UserRepoError::UserAlreadyExists(_)) => StatusCode::CONFLICT,
            HandlerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HandlerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HandlerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();
        let body = match self {
            HandlerError::Validation(errors) => json!({
                "message": errors.message(),
                "errors": errors,
            }),
            HandlerError::CategoryRepo(CategoryRepoError::CategoryInUse(_)) => json!({
                "message": "Cannot delete category with existing transactions.",
            }),
            _ if status.is_server_error() => {
                error!(error = ?self, "Request failed");
                json!({ "message": "Internal server error" })
            }
            _ => json!({ "message": self.to_string() }),
        };
        HttpResponse::build(status).json(body)
    }
}
