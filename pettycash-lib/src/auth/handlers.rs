use crate::auth::session::SessionKeys;
use crate::auth::password;
use crate::category::defaults::seed_default_categories;
use crate::error::HandlerError;
use crate::user::UserId;
use crate::AppSettings;
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use anyhow::{anyhow, Context};
use pettycash_repo::category_repo::CategoryRepo;
use pettycash_repo::user_repo::{User, UserRepo, UserRepoError};
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Serialize, Deserialize)]
pub struct UserCredentials {
    pub id: UserId,
    pub password: String,
}

#[post("/signup")]
pub async fn signup(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    settings: web::Data<AppSettings>,
    credentials: web::Json<UserCredentials>,
) -> Result<impl Responder, HandlerError> {
    let credentials = credentials.into_inner();
    if credentials.id.trim().is_empty() || credentials.password.is_empty() {
        return Err(HandlerError::BadRequest(
            "id and password are required".to_owned(),
        ));
    }
    let password_hash = password::encode_password(credentials.password)?;

    user_repo
        .create_user(User::new(credentials.id.clone(), password_hash))
        .await?;
    info!(user_id = %credentials.id, "Created user");

    if settings.seed_default_categories {
        seed_default_categories(category_repo.get_ref().as_ref(), &credentials.id).await?;
    }

    Ok(HttpResponse::Ok())
}

#[post("/get_token")]
pub async fn get_token(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    credentials: web::Json<UserCredentials>,
    req: HttpRequest,
) -> Result<impl Responder, HandlerError> {
    let credentials = credentials.into_inner();

    let user = match user_repo.get_user(&credentials.id).await {
        Ok(user) => user,
        Err(UserRepoError::UserNotFound(_)) => return Err(HandlerError::InvalidCredentials),
        Err(e) => return Err(e.into()),
    };

    if !password::verify_password(credentials.password, user.password_hash)? {
        return Err(HandlerError::InvalidCredentials);
    }

    let keys = req
        .app_data::<SessionKeys>()
        .ok_or_else(|| anyhow!("SessionKeys missing from app data"))?;
    let token = keys.issue(user.id).context("Unable to issue session token")?;
    Ok(HttpResponse::Ok().body(token))
}
