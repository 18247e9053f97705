use crate::error::HandlerError;
use crate::transaction::receipt::ImageFormat;
use crate::transaction::TransactionForm;
use crate::user::UserId;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::NaiveDate;
use pettycash_repo::category_repo::{Category, CategoryRepo, CategoryRepoError};
use pettycash_repo::receipt_store::{ReceiptStore, ReceiptStoreError};
use pettycash_repo::transaction_repo::{Filter, PageOptions, TransactionRepo, TransactionType};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub category_id: Option<i32>,
    pub transaction_type: Option<TransactionType>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl ListQuery {
    fn page_options(&self) -> Result<Option<PageOptions>, HandlerError> {
        if self.offset.is_none() && self.limit.is_none() {
            return Ok(None);
        }
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(i64::MAX);
        if offset < 0 || limit < 0 {
            return Err(HandlerError::BadRequest(
                "offset and limit must not be negative".to_owned(),
            ));
        }
        Ok(Some(PageOptions { offset, limit }))
    }

    fn filter(&self) -> Filter {
        Filter {
            from: self.from,
            until: self.until,
            category_id: self.category_id,
            transaction_type: self.transaction_type,
        }
    }
}

/// The caller's category with the given id. Missing and foreign categories are both `None`.
async fn find_category(
    category_repo: &dyn CategoryRepo,
    user_id: &str,
    category_id: Option<i32>,
) -> Result<Option<Category>, HandlerError> {
    let Some(category_id) = category_id else {
        return Ok(None);
    };
    match category_repo.get_category(user_id, category_id).await {
        Ok(category) => Ok(Some(category)),
        Err(CategoryRepoError::CategoryNotFound(_) | CategoryRepoError::NotOwner(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn remove_receipt(receipt_store: &dyn ReceiptStore, path: &str) {
    match receipt_store.delete(path).await {
        Ok(true) => info!(%path, "Removed receipt"),
        Ok(false) => warn!(%path, "Receipt was already gone"),
        Err(e) => warn!(%path, error = %e, "Unable to remove receipt"),
    }
}

#[get("")]
pub async fn get_all_transactions(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, HandlerError> {
    let page_options = query.page_options()?;
    let transactions = transaction_repo
        .get_all_transactions(&user_id.into_inner(), query.filter(), page_options)
        .await?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[get("/{transaction_id}")]
pub async fn get_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .get_transaction(&user_id.into_inner(), transaction_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[get("/{transaction_id}/receipt")]
pub async fn get_receipt(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    receipt_store: web::Data<Arc<dyn ReceiptStore>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let transaction_id = transaction_id.into_inner();
    let transaction = transaction_repo
        .get_transaction(&user_id.into_inner(), transaction_id)
        .await?;
    let Some(path) = transaction.receipt_path else {
        return Err(ReceiptStoreError::ReceiptNotFound(format!(
            "for transaction {}",
            transaction_id
        ))
        .into());
    };

    let bytes = receipt_store.load(&path).await?;
    let content_type = ImageFormat::from_extension(&path)
        .map_or("application/octet-stream", |format| format.content_type());
    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}

#[post("")]
pub async fn create_new_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    receipt_store: web::Data<Arc<dyn ReceiptStore>>,
    user_id: web::ReqData<UserId>,
    form: web::Json<TransactionForm>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let form = form.into_inner();

    let category = find_category(category_repo.get_ref().as_ref(), &user_id, form.category_id).await?;
    let valid = form.validate(category.as_ref())?;

    let mut new_transaction = valid.new_transaction;
    if let Some(receipt) = valid.receipt {
        let path = receipt_store
            .store(&receipt.bytes, receipt.format.extension())
            .await?;
        new_transaction.receipt_path = Some(path);
    }

    let receipt_path = new_transaction.receipt_path.clone();
    match transaction_repo
        .create_new_transaction(&user_id, new_transaction)
        .await
    {
        Ok(transaction) => {
            info!(transaction_id = transaction.id, "Created transaction");
            Ok(HttpResponse::Ok().json(transaction))
        }
        Err(e) => {
            if let Some(path) = receipt_path {
                remove_receipt(receipt_store.get_ref().as_ref(), &path).await;
            }
            Err(e.into())
        }
    }
}

#[put("/{transaction_id}")]
pub async fn update_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    receipt_store: web::Data<Arc<dyn ReceiptStore>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
    form: web::Json<TransactionForm>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let transaction_id = transaction_id.into_inner();
    let form = form.into_inner();

    let existing = transaction_repo
        .get_transaction(&user_id, transaction_id)
        .await?;
    let category = find_category(category_repo.get_ref().as_ref(), &user_id, form.category_id).await?;
    let valid = form.validate(category.as_ref())?;

    let mut updated_transaction = valid.new_transaction;
    updated_transaction.receipt_path = match valid.receipt {
        Some(receipt) => Some(
            receipt_store
                .store(&receipt.bytes, receipt.format.extension())
                .await?,
        ),
        None => existing.receipt_path.clone(),
    };

    let new_path = updated_transaction.receipt_path.clone();
    let result = transaction_repo
        .update_transaction(&user_id, transaction_id, updated_transaction)
        .await;

    let replaced = new_path != existing.receipt_path;
    match result {
        Ok(transaction) => {
            if let (true, Some(old_path)) = (replaced, existing.receipt_path) {
                remove_receipt(receipt_store.get_ref().as_ref(), &old_path).await;
            }
            Ok(HttpResponse::Ok().json(transaction))
        }
        Err(e) => {
            if let (true, Some(new_path)) = (replaced, new_path) {
                remove_receipt(receipt_store.get_ref().as_ref(), &new_path).await;
            }
            Err(e.into())
        }
    }
}

#[delete("/{transaction_id}")]
pub async fn delete_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    receipt_store: web::Data<Arc<dyn ReceiptStore>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .delete_transaction(&user_id.into_inner(), transaction_id.into_inner())
        .await?;
    if let Some(path) = &transaction.receipt_path {
        remove_receipt(receipt_store.get_ref().as_ref(), path).await;
    }
    info!(transaction_id = transaction.id, "Deleted transaction");
    Ok(HttpResponse::Ok().json(transaction))
}
