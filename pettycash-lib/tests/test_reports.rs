use std::str::FromStr;

use actix_web::http::StatusCode;
use actix_web::test;
use actix_web::test::{read_body, read_body_json, TestRequest};
use actix_web::web::Data;
use actix_web::App;
use chrono::{Duration, Local, NaiveDate};
use pettycash_repo::transaction_repo::TransactionType;
use rstest::rstest;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::instrument;

use utils::repos;
use utils::tracing_setup;
use utils::{Repos, TestUser};

#[macro_use]
mod utils;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap()
}

#[instrument(skip(repos))]
#[rstest]
#[actix_rt::test]
async fn summary_has_totals_and_recent_transactions(_tracing_setup: &(), repos: Repos) {
    let test_user = TestUser::new(repos.user_repo.clone()).await;
    let sales = test_user
        .create_category(&repos.category_repo, "Sales", TransactionType::Income)
        .await;
    let travel = test_user
        .create_category(&repos.category_repo, "Travel", TransactionType::Expense)
        .await;
    let mut created = Vec::new();
    for day in 0..4 {
        created.push(
            test_user
                .create_transaction(
                    &repos.transaction_repo,
                    &sales,
                    today() - Duration::days(day),
                    Decimal::from(100),
                )
                .await,
        );
    }
    for day in 0..3 {
        created.push(
            test_user
                .create_transaction(
                    &repos.transaction_repo,
                    &travel,
                    today() - Duration::days(day),
                    Decimal::from(30),
                )
                .await,
        );
    }
    let service = test::init_service(build_app!(repos, test_user.user_id.clone())).await;

    let request = TestRequest::get().uri("/reports/summary").to_request();
    let body: Value = test::call_and_read_body_json(&service, request).await;
    assert_eq!(decimal(&body["total_income"]), Decimal::from(400));
    assert_eq!(decimal(&body["total_expenses"]), Decimal::from(90));
    assert_eq!(decimal(&body["balance"]), Decimal::from(310));

    let recent_ids: Vec<i64> = body["recent_transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    let mut expected: Vec<i64> = created.iter().map(|t| i64::from(t.id)).collect();
    expected.sort_unstable_by(|a, b| b.cmp(a));
    expected.truncate(5);
    assert_eq!(recent_ids, expected);

    test_user.delete().await
}

#[instrument(skip(repos))]
#[rstest]
#[actix_rt::test]
async fn daily_report_carries_running_balance(_tracing_setup: &(), repos: Repos) {
    let test_user = TestUser::new(repos.user_repo.clone()).await;
    let sales = test_user
        .create_category(&repos.category_repo, "Sales", TransactionType::Income)
        .await;
    let travel = test_user
        .create_category(&repos.category_repo, "Travel", TransactionType::Expense)
        .await;
    let first_day = today() - Duration::days(2);
    test_user
        .create_transaction(&repos.transaction_repo, &sales, first_day, Decimal::from(100))
        .await;
    test_user
        .create_transaction(&repos.transaction_repo, &travel, first_day, Decimal::from(40))
        .await;
    test_user
        .create_transaction(&repos.transaction_repo, &travel, today(), Decimal::from(10))
        .await;
    let service = test::init_service(build_app!(repos, test_user.user_id.clone())).await;

    let request = TestRequest::get().uri("/reports/daily").to_request();
    let body: Value = test::call_and_read_body_json(&service, request).await;
    let days = body["days"].as_array().unwrap();
    assert_eq!(days.len(), 3);

    let balances: Vec<Decimal> = days.iter().map(|d| decimal(&d["running_balance"])).collect();
    assert_eq!(
        balances,
        vec![Decimal::from(60), Decimal::from(60), Decimal::from(50)]
    );
    assert_eq!(days[1]["transaction_count"], 0);
    assert_eq!(decimal(&days[2]["net"]), Decimal::from(-10));
    assert_eq!(body["summary"]["transaction_count"], 3);

    let request = TestRequest::get().uri("/reports/daily?days=7").to_request();
    let body: Value = test::call_and_read_body_json(&service, request).await;
    assert_eq!(body["days"].as_array().unwrap().len(), 7);

    test_user.delete().await
}

#[rstest]
#[case::not_an_option("/reports/daily?days=4")]
#[case::zero("/reports/export?days=0")]
#[actix_rt::test]
async fn unsupported_period_is_bad_request(
    _tracing_setup: &(),
    repos: Repos,
    #[case] uri: &str,
) {
    let test_user = TestUser::new(repos.user_repo.clone()).await;
    let service = test::init_service(build_app!(repos, test_user.user_id.clone())).await;

    let request = TestRequest::get().uri(uri).to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_body_json(response).await;
    assert_eq!(body["message"], "The days must be one of 3, 5, 7, 14, 30.");

    test_user.delete().await
}

#[instrument(skip(repos))]
#[rstest]
#[actix_rt::test]
async fn weekly_report_skips_empty_weeks(_tracing_setup: &(), repos: Repos) {
    let test_user = TestUser::new(repos.user_repo.clone()).await;
    let travel = test_user
        .create_category(&repos.category_repo, "Travel", TransactionType::Expense)
        .await;
    test_user
        .create_transaction(&repos.transaction_repo, &travel, today(), Decimal::from(10))
        .await;
    test_user
        .create_transaction(
            &repos.transaction_repo,
            &travel,
            today() - Duration::days(15),
            Decimal::from(25),
        )
        .await;
    let service = test::init_service(build_app!(repos, test_user.user_id.clone())).await;

    let request = TestRequest::get().uri("/reports/weekly").to_request();
    let body: Value = test::call_and_read_body_json(&service, request).await;
    let labels: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|week| week["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Week 2", "Week 4"]);
    assert_eq!(decimal(&body[0]["expenses"]), Decimal::from(25));

    test_user.delete().await
}

#[instrument(skip(repos))]
#[rstest]
#[actix_rt::test]
async fn category_breakdown_is_sorted_by_total(_tracing_setup: &(), repos: Repos) {
    let test_user = TestUser::new(repos.user_repo.clone()).await;
    let sales = test_user
        .create_category(&repos.category_repo, "Sales", TransactionType::Income)
        .await;
    let travel = test_user
        .create_category(&repos.category_repo, "Travel", TransactionType::Expense)
        .await;
    test_user
        .create_category(&repos.category_repo, "Unused", TransactionType::Expense)
        .await;
    test_user
        .create_transaction(&repos.transaction_repo, &travel, today(), Decimal::from(25))
        .await;
    test_user
        .create_transaction(&repos.transaction_repo, &sales, today(), Decimal::from(75))
        .await;
    let service = test::init_service(build_app!(repos, test_user.user_id.clone())).await;

    let request = TestRequest::get().uri("/reports/categories").to_request();
    let body: Value = test::call_and_read_body_json(&service, request).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Sales");
    assert_eq!(decimal(&rows[0]["percentage"]), Decimal::from(75));
    assert_eq!(rows[1]["name"], "Travel");
    assert_eq!(decimal(&rows[1]["percentage"]), Decimal::from(25));

    test_user.delete().await
}

#[instrument(skip(repos))]
#[rstest]
#[actix_rt::test]
async fn export_renders_html_document(_tracing_setup: &(), repos: Repos) {
    let test_user = TestUser::new(repos.user_repo.clone()).await;
    let travel = test_user
        .create_category(&repos.category_repo, "Travel", TransactionType::Expense)
        .await;
    let recent = test_user
        .create_transaction(&repos.transaction_repo, &travel, today(), Decimal::from(10))
        .await;
    let old = test_user
        .create_transaction(
            &repos.transaction_repo,
            &travel,
            today() - Duration::days(60),
            Decimal::from(25),
        )
        .await;
    let service = test::init_service(build_app!(repos, test_user.user_id.clone())).await;

    let request = TestRequest::get()
        .uri("/reports/export?tab=daily&days=7")
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let html = String::from_utf8(read_body(response).await.to_vec()).unwrap();
    assert!(html.contains("SYU Business Co."));
    assert!(html.contains("Daily (Last 7 days)"));
    assert!(html.contains("Transaction Details"));
    assert!(html.contains(&recent.description));
    assert!(!html.contains(&old.description));
    // Summary totals cover every transaction, not just the exported window.
    assert!(html.contains(r#"<div class="summary-value expense">₱35.00</div>"#));

    let request = TestRequest::get()
        .uri("/reports/export?tab=categories")
        .to_request();
    let html = String::from_utf8(test::call_and_read_body(&service, request).await.to_vec())
        .unwrap();
    assert!(html.contains("Categories (All time)"));
    assert!(html.contains(&recent.description));
    assert!(html.contains(&old.description));

    let request = TestRequest::get()
        .uri(&format!(
            "/reports/export?tab=weekly&start={}&end={}",
            old.date, old.date
        ))
        .to_request();
    let html = String::from_utf8(test::call_and_read_body(&service, request).await.to_vec())
        .unwrap();
    assert!(html.contains(&old.description));
    assert!(!html.contains(&recent.description));
    assert!(html.contains(r#"<div class="summary-value expense">₱35.00</div>"#));

    test_user.delete().await
}

#[instrument(skip(repos))]
#[rstest]
#[actix_rt::test]
async fn export_date_range_only_narrows_details(_tracing_setup: &(), repos: Repos) {
    let test_user = TestUser::new(repos.user_repo.clone()).await;
    let travel = test_user
        .create_category(&repos.category_repo, "Travel", TransactionType::Expense)
        .await;
    let recent = test_user
        .create_transaction(&repos.transaction_repo, &travel, today(), Decimal::from(10))
        .await;
    let old = test_user
        .create_transaction(
            &repos.transaction_repo,
            &travel,
            today() - Duration::days(60),
            Decimal::from(25),
        )
        .await;
    let service = test::init_service(build_app!(repos, test_user.user_id.clone())).await;

    let request = TestRequest::get()
        .uri(&format!(
            "/reports/export?tab=daily&days=7&start={}&end={}",
            old.date, old.date
        ))
        .to_request();
    let html = String::from_utf8(test::call_and_read_body(&service, request).await.to_vec())
        .unwrap();
    assert!(html.contains(&old.description));
    assert!(!html.contains(&recent.description));
    // The daily table still ends today.
    assert!(html.contains(&format!("<td>{}</td>", today().format("%b %-d, %Y"))));
    assert!(html.contains(&format!(
        "<td>{}</td>",
        (today() - Duration::days(6)).format("%b %-d, %Y")
    )));

    test_user.delete().await
}

#[rstest]
#[case::daily("/reports/daily?start=0001-01-01&end=9999-12-31")]
#[case::export("/reports/export?start=2024-01-01&end=2025-01-01")]
#[actix_rt::test]
async fn oversized_date_range_is_bad_request(
    _tracing_setup: &(),
    repos: Repos,
    #[case] uri: &str,
) {
    let test_user = TestUser::new(repos.user_repo.clone()).await;
    let service = test::init_service(build_app!(repos, test_user.user_id.clone())).await;

    let request = TestRequest::get().uri(uri).to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_body_json(response).await;
    assert_eq!(
        body["message"],
        "The date range may not be longer than 366 days."
    );

    test_user.delete().await
}
