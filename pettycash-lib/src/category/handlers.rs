use crate::category::CategoryForm;
use crate::error::HandlerError;
use crate::user::UserId;
use crate::validation::ValidationErrors;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use pettycash_repo::category_repo::CategoryRepo;
use pettycash_repo::transaction_repo::TransactionRepo;
use std::sync::Arc;
use tracing::info;

#[get("")]
pub async fn get_all_categories(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let categories = category_repo
        .get_all_categories(&user_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[post("")]
pub async fn create_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
    form: web::Json<CategoryForm>,
) -> Result<impl Responder, HandlerError> {
    let new_category = form.into_inner().validate()?;
    let category = category_repo
        .create_category(&user_id.into_inner(), new_category)
        .await?;
    info!(category_id = category.id, "Created category");
    Ok(HttpResponse::Ok().json(category))
}

#[put("/{category_id}")]
pub async fn update_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    category_id: web::Path<i32>,
    form: web::Json<CategoryForm>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let category_id = category_id.into_inner();

    let existing = category_repo.get_category(&user_id, category_id).await?;
    let updated_category = form.into_inner().validate()?;

    if updated_category.category_type != existing.category_type
        && transaction_repo
            .count_category_transactions(&user_id, category_id)
            .await?
            > 0
    {
        let mut errors = ValidationErrors::new();
        errors.add(
            "type",
            "The type cannot be changed while the category has transactions.",
        );
        return Err(errors.into());
    }

    let category = category_repo
        .update_category(&user_id, category_id, updated_category)
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[delete("/{category_id}")]
pub async fn delete_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
    category_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let category = category_repo
        .delete_category(&user_id.into_inner(), category_id.into_inner())
        .await?;
    info!(category_id = category.id, "Deleted category");
    Ok(HttpResponse::Ok().json(category))
}
