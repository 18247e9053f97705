use crate::error::HandlerError;
use crate::report::aggregation::{
    category_breakdown, daily_series, daily_window, export_window, filter_for_export, totals,
    weekly_series, ReportTab, Totals,
};
use crate::report::render::{period_label, render_export, ExportDocument, TabTable};
use crate::report::{ReportQuery, RECENT_TRANSACTIONS};
use crate::user::UserId;
use crate::AppSettings;
use actix_web::http::header::ContentType;
use actix_web::{get, web, HttpResponse, Responder};
use chrono::{Local, NaiveDate};
use pettycash_repo::category_repo::CategoryRepo;
use pettycash_repo::transaction_repo::{Filter, Transaction, TransactionRepo};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct Summary {
    #[serde(flatten)]
    totals: Totals,
    recent_transactions: Vec<Transaction>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn all_transactions(
    transaction_repo: &dyn TransactionRepo,
    user_id: &str,
) -> Result<Vec<Transaction>, HandlerError> {
    Ok(transaction_repo
        .get_all_transactions(user_id, Filter::NONE, None)
        .await?)
}

#[get("/summary")]
pub async fn summary(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let repo_totals = transaction_repo.get_totals(&user_id).await?;

    let mut recent_transactions = all_transactions(transaction_repo.get_ref().as_ref(), &user_id).await?;
    recent_transactions.sort_by(|a, b| b.id.cmp(&a.id));
    recent_transactions.truncate(RECENT_TRANSACTIONS);

    Ok(HttpResponse::Ok().json(Summary {
        totals: Totals {
            total_income: repo_totals.income,
            total_expenses: repo_totals.expenses,
            balance: repo_totals.balance(),
        },
        recent_transactions,
    }))
}

#[get("/daily")]
pub async fn daily(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    query: web::Query<ReportQuery>,
) -> Result<impl Responder, HandlerError> {
    let days = query.days()?;
    let explicit = query.explicit_window()?;
    let transactions =
        all_transactions(transaction_repo.get_ref().as_ref(), &user_id.into_inner()).await?;

    let window = daily_window(&transactions, days, explicit, today());
    Ok(HttpResponse::Ok().json(daily_series(&transactions, window)))
}

#[get("/weekly")]
pub async fn weekly(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let transactions =
        all_transactions(transaction_repo.get_ref().as_ref(), &user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(weekly_series(&transactions, today())))
}

#[get("/categories")]
pub async fn category_report(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let transactions = all_transactions(transaction_repo.get_ref().as_ref(), &user_id).await?;
    let user_categories = category_repo.get_all_categories(&user_id).await?;
    Ok(HttpResponse::Ok().json(category_breakdown(&transactions, &user_categories)))
}

#[get("/export")]
pub async fn export(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    settings: web::Data<AppSettings>,
    user_id: web::ReqData<UserId>,
    query: web::Query<ReportQuery>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let days = query.days()?;
    let explicit = query.explicit_window()?;
    let today = today();

    let transactions = all_transactions(transaction_repo.get_ref().as_ref(), &user_id).await?;
    let user_categories = category_repo.get_all_categories(&user_id).await?;

    // The tab tables always show the dashboard windows. An explicit range only narrows the
    // transaction details.
    let table = match query.tab {
        ReportTab::Daily => {
            let window = daily_window(&transactions, days, None, today);
            TabTable::Daily(daily_series(&transactions, window).days)
        }
        ReportTab::Weekly => TabTable::Weekly(weekly_series(&transactions, today)),
        ReportTab::Categories => {
            TabTable::Categories(category_breakdown(&transactions, &user_categories))
        }
    };

    let exported = filter_for_export(
        &transactions,
        export_window(query.tab, days, explicit, today),
    );
    let document = ExportDocument {
        company_name: &settings.report.company_name,
        logo_url: settings.report.logo_url.as_deref(),
        tab: query.tab,
        period: period_label(query.tab, days, explicit),
        generated_on: today,
        totals: totals(&transactions),
        table,
        transactions: &exported,
        categories: &user_categories,
    };

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(render_export(&document).into_string()))
}
