use crate::auth::session::SessionKeys;
use crate::config::ReportConfig;
use actix_web::error::JsonPayloadError;
use actix_web::web::{Data, ServiceConfig};
use actix_web::{web, HttpResponse};
use actix_web_httpauth::middleware::HttpAuthentication;
use pettycash_repo::category_repo::CategoryRepo;
use pettycash_repo::receipt_store::ReceiptStore;
use pettycash_repo::transaction_repo::TransactionRepo;
use pettycash_repo::user_repo::UserRepo;
use std::sync::Arc;

pub mod auth;
pub mod category;
pub mod config;
pub mod error;
pub mod flow;
pub mod report;
pub mod tracing;
pub mod transaction;
pub mod user;
pub mod validation;

/// Settings the handlers read at request time.
#[derive(Clone, Debug)]
pub struct AppSettings {
    pub signups_enabled: bool,
    pub seed_default_categories: bool,
    pub report: ReportConfig,
}

impl From<&config::Config> for AppSettings {
    fn from(config: &config::Config) -> Self {
        AppSettings {
            signups_enabled: config.signups_enabled,
            seed_default_categories: config.seed_default_categories,
            report: config.report.clone(),
        }
    }
}

/// Large enough for a base64 encoded receipt of the maximum size.
pub const JSON_PAYLOAD_LIMIT: usize = 4 * 1024 * 1024;

/// Turns JSON body errors into 400 responses with a JSON body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_PAYLOAD_LIMIT)
        .error_handler(|err, req| {
        ::tracing::error!(req_path = req.path(), %err);
        match err {
            JsonPayloadError::Deserialize(deserialize_err) => {
                let error_body = serde_json::json!({
                    "message": "Unable to parse JSON payload",
                    "detail": format!("{}", deserialize_err),
                });
                actix_web::error::InternalError::from_response(
                    deserialize_err,
                    HttpResponse::BadRequest()
                        .content_type("application/json")
                        .body(error_body.to_string()),
                )
                .into()
            }
            _ => err.into(),
        }
    })
}

pub fn app_config_func(
    session_keys: SessionKeys,
    user_repo: Arc<dyn UserRepo>,
    transaction_repo: Arc<dyn TransactionRepo>,
    category_repo: Arc<dyn CategoryRepo>,
    receipt_store: Arc<dyn ReceiptStore>,
    settings: AppSettings,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let bearer_auth_middleware = HttpAuthentication::bearer(auth::credentials_validator);
        let signups_enabled = settings.signups_enabled;
        cfg.app_data(session_keys)
            .app_data(Data::new(user_repo))
            .app_data(Data::new(transaction_repo))
            .app_data(Data::new(category_repo))
            .app_data(Data::new(receipt_store))
            .app_data(Data::new(settings))
            .app_data(json_config())
            .service(transaction::transaction_service().wrap(bearer_auth_middleware.clone()))
            .service(category::category_service().wrap(bearer_auth_middleware.clone()))
            .service(report::report_service().wrap(bearer_auth_middleware))
            .service(auth::auth_service(signups_enabled));
    }
}
