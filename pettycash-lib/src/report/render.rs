//! HTML export of a report. The document opens the browser's print dialog on load so it can be
//! saved as a PDF.

use crate::report::aggregation::{
    CategoryRow, DailyRow, DateWindow, ReportTab, Totals, WeeklyRow, WEEKS,
};
use crate::report::currency::{format_currency, format_date, format_long_date};
use chrono::NaiveDate;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use pettycash_repo::category_repo::Category;
use pettycash_repo::transaction_repo::{Transaction, TransactionType};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

const INCOME_COLOR: &str = "#059669";
const EXPENSE_COLOR: &str = "#dc2626";

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; margin: 20px; color: #1f2937; }
.header { display: flex; justify-content: space-between; align-items: center; border-bottom: 2px solid #e5e7eb; padding-bottom: 16px; margin-bottom: 24px; }
.logo-section { display: flex; align-items: center; gap: 12px; }
.logo { height: 60px; }
.company-name { font-size: 22px; margin: 0; }
.report-info { text-align: right; }
.report-title { font-size: 24px; margin: 0; }
.report-subtitle { font-size: 16px; margin: 4px 0; color: #4b5563; }
.report-date { font-size: 12px; color: #6b7280; margin: 0; }
.summary-grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 16px; }
.summary-item { border: 1px solid #e5e7eb; border-radius: 6px; padding: 12px; }
.summary-label { font-size: 12px; color: #6b7280; }
.summary-value { font-size: 18px; font-weight: bold; }
.income { color: #059669; }
.expense { color: #dc2626; }
table { width: 100%; border-collapse: collapse; margin-top: 16px; font-size: 13px; }
th, td { border: 1px solid #d1d5db; padding: 6px 8px; }
th { background-color: #f3f4f6; text-align: left; }
.text-right { text-align: right; }
.text-center { text-align: center; }
.capitalize { text-transform: capitalize; }
.swatch { display: inline-block; width: 10px; height: 10px; border-radius: 50%; margin-right: 6px; }
@media print { body { margin: 0; } }
"#;

const PRINT_SCRIPT: &str = r#"
window.onload = function() {
    window.print();
    window.onafterprint = function() { window.close(); };
};
"#;

/// The table specific to the report tab that was exported.
pub enum TabTable {
    Daily(Vec<DailyRow>),
    Weekly(Vec<WeeklyRow>),
    Categories(Vec<CategoryRow>),
}

impl TabTable {
    fn is_empty(&self) -> bool {
        match self {
            TabTable::Daily(rows) => rows.is_empty(),
            TabTable::Weekly(rows) => rows.is_empty(),
            TabTable::Categories(rows) => rows.is_empty(),
        }
    }
}

pub struct ExportDocument<'a> {
    pub company_name: &'a str,
    pub logo_url: Option<&'a str>,
    pub tab: ReportTab,
    pub period: String,
    pub generated_on: NaiveDate,
    pub totals: Totals,
    pub table: TabTable,
    /// Listed under "Transaction Details" in the given order.
    pub transactions: &'a [Transaction],
    pub categories: &'a [Category],
}

/// Describes the period covered by an export, e.g. `Last 7 days` or `Jan 1, 2025 - Jan 31, 2025`.
pub fn period_label(tab: ReportTab, days: u32, explicit: Option<DateWindow>) -> String {
    match (explicit, tab) {
        (Some(window), _) => format!(
            "{} - {}",
            format_date(window.start),
            format_date(window.end)
        ),
        (None, ReportTab::Daily) => format!("Last {} days", days),
        // Weekly exports ignore `days` and always cover the fixed week window.
        (None, ReportTab::Weekly) => format!("Last {} weeks", WEEKS),
        (None, ReportTab::Categories) => "All time".to_owned(),
    }
}

fn type_color(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Income => INCOME_COLOR,
        TransactionType::Expense => EXPENSE_COLOR,
    }
}

fn sign_class(amount: Decimal) -> &'static str {
    if amount.is_sign_negative() && !amount.is_zero() {
        "expense"
    } else {
        "income"
    }
}

fn format_percentage(percentage: Decimal) -> String {
    format!(
        "{:.1}%",
        percentage.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn swatch(color: &str) -> Markup {
    html! {
        span class="swatch" style={ "background-color: " (color) ";" } {}
    }
}

pub fn render_export(document: &ExportDocument) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Petty Cash Report - " (document.tab) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                (header(document))
                (summary(&document.totals))
                @if !document.table.is_empty() {
                    div class="table-container" {
                        h3 { (document.tab) " Details" }
                        (tab_table(&document.table))
                    }
                }
                @if !document.transactions.is_empty() {
                    (transaction_details(document.transactions, document.categories))
                }
                script { (PreEscaped(PRINT_SCRIPT)) }
            }
        }
    }
}

fn header(document: &ExportDocument) -> Markup {
    html! {
        div class="header" {
            div class="logo-section" {
                @if let Some(logo_url) = document.logo_url {
                    img class="logo" src=(logo_url) alt="Company Logo";
                }
                h1 class="company-name" { (document.company_name) }
            }
            div class="report-info" {
                h1 class="report-title" { "Petty Cash Report" }
                h2 class="report-subtitle" { (document.tab) " (" (document.period) ")" }
                p class="report-date" { "Generated on " (format_long_date(document.generated_on)) }
            }
        }
    }
}

fn summary(totals: &Totals) -> Markup {
    html! {
        div class="summary" {
            h3 { "Summary Statistics" }
            div class="summary-grid" {
                div class="summary-item" {
                    div class="summary-label" { "Total Income" }
                    div class="summary-value income" { (format_currency(totals.total_income)) }
                }
                div class="summary-item" {
                    div class="summary-label" { "Total Expenses" }
                    div class="summary-value expense" { (format_currency(totals.total_expenses)) }
                }
                div class="summary-item" {
                    div class="summary-label" { "Net Balance" }
                    div class={ "summary-value " (sign_class(totals.balance)) } {
                        (format_currency(totals.balance))
                    }
                }
            }
        }
    }
}

fn tab_table(table: &TabTable) -> Markup {
    match table {
        TabTable::Daily(rows) => html! {
            table {
                thead {
                    tr {
                        th { "Date" }
                        th class="text-right" { "Income" }
                        th class="text-right" { "Expenses" }
                        th class="text-right" { "Ending Balance" }
                        th class="text-center" { "Transactions" }
                    }
                }
                tbody {
                    @for day in rows {
                        tr {
                            td { (format_date(day.date)) }
                            td class="text-right income" { (format_currency(day.income)) }
                            td class="text-right expense" { (format_currency(day.expenses)) }
                            td class={ "text-right " (sign_class(day.running_balance)) } {
                                (format_currency(day.running_balance))
                            }
                            td class="text-center" { (day.transaction_count) }
                        }
                    }
                }
            }
        },
        TabTable::Weekly(rows) => html! {
            table {
                thead {
                    tr {
                        th { "Week" }
                        th { "Period" }
                        th class="text-right" { "Income" }
                        th class="text-right" { "Expenses" }
                        th class="text-right" { "Net" }
                        th class="text-center" { "Transactions" }
                    }
                }
                tbody {
                    @for week in rows {
                        tr {
                            td { (week.label) }
                            td { (format_date(week.window.start)) " - " (format_date(week.window.end)) }
                            td class="text-right income" { (format_currency(week.income)) }
                            td class="text-right expense" { (format_currency(week.expenses)) }
                            td class={ "text-right " (sign_class(week.net)) } { (format_currency(week.net)) }
                            td class="text-center" { (week.transaction_count) }
                        }
                    }
                }
            }
        },
        TabTable::Categories(rows) => html! {
            table {
                thead {
                    tr {
                        th { "Category" }
                        th class="text-center" { "Type" }
                        th class="text-right" { "Total Amount" }
                        th class="text-center" { "Percentage" }
                        th class="text-center" { "Transactions" }
                    }
                }
                tbody {
                    @for row in rows {
                        tr {
                            td { (swatch(&row.category.color)) (row.category.name) }
                            td class="text-center capitalize" { (row.category.category_type) }
                            td class="text-right" style={ "color: " (type_color(row.category.category_type)) ";" } {
                                (format_currency(row.total))
                            }
                            td class="text-center" { (format_percentage(row.percentage)) }
                            td class="text-center" { (row.transaction_count) }
                        }
                    }
                }
            }
        },
    }
}

fn transaction_details(transactions: &[Transaction], categories: &[Category]) -> Markup {
    let categories: HashMap<i32, &Category> = categories.iter().map(|c| (c.id, c)).collect();
    html! {
        div class="transactions" {
            h3 { "Transaction Details" }
            table {
                thead {
                    tr {
                        th { "Date" }
                        th { "Description" }
                        th { "Category" }
                        th class="text-center" { "Type" }
                        th { "Used By" }
                        th class="text-right" { "Amount" }
                    }
                }
                tbody {
                    @for transaction in transactions {
                        tr {
                            td { (format_date(transaction.date)) }
                            td { (transaction.description) }
                            td {
                                @if let Some(category) = categories.get(&transaction.category_id) {
                                    (swatch(&category.color)) (category.name)
                                }
                            }
                            td class="text-center capitalize" { (transaction.transaction_type) }
                            td { (transaction.used_by.as_deref().unwrap_or("N/A")) }
                            td class="text-right" style={ "color: " (type_color(transaction.transaction_type)) "; font-weight: bold;" } {
                                (format_currency(transaction.amount))
                            }
                        }
                    }
                }
            }
        }
    }
}
