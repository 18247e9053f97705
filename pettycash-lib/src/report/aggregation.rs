//! Pure rollups over a snapshot of a user's transactions.
//!
//! Nothing here touches a store or fails: callers load the transactions they want summarised and
//! pass them in together with the reference date.

use chrono::{Duration, NaiveDate};
use pettycash_repo::category_repo::Category;
use pettycash_repo::transaction_repo::{Transaction, TransactionType};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Number of 7-day windows in the weekly report.
pub const WEEKS: u32 = 4;

/// Inclusive range of calendar days. A window whose start is after its end is empty.
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub const fn new(start: NaiveDate, end: NaiveDate) -> DateWindow {
        DateWindow { start, end }
    }

    /// The `days` days up to and including `end`.
    pub fn ending_at(end: NaiveDate, days: u32) -> DateWindow {
        DateWindow {
            start: end - Duration::days(i64::from(days) - 1),
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn len_days(&self) -> u32 {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start).num_days() as u32 + 1
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.len_days()).map(move |offset| start + Duration::days(i64::from(offset)))
    }
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Totals {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
}

impl Totals {
    fn add(&mut self, transaction: &Transaction) {
        match transaction.transaction_type {
            TransactionType::Income => self.total_income += transaction.amount,
            TransactionType::Expense => self.total_expenses += transaction.amount,
        }
        self.balance = self.total_income - self.total_expenses;
    }
}

pub fn totals<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Totals {
    transactions
        .into_iter()
        .fold(Totals::default(), |mut totals, t| {
            totals.add(t);
            totals
        })
}

#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    pub running_balance: Decimal,
    pub transaction_count: usize,
}

#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct DailySummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub average_daily_income: Decimal,
    pub average_daily_expenses: Decimal,
    pub transaction_count: usize,
}

#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct DailyReport {
    pub window: DateWindow,
    pub starting_balance: Decimal,
    pub days: Vec<DailyRow>,
    pub summary: DailySummary,
}

/// Picks the window of the daily report.
///
/// An explicit range wins. Otherwise the window is the `days` days ending at the latest
/// transaction date, or at `today` when there are no transactions.
pub fn daily_window(
    transactions: &[Transaction],
    days: u32,
    explicit: Option<DateWindow>,
    today: NaiveDate,
) -> DateWindow {
    if let Some(window) = explicit {
        return window;
    }
    let end = transactions
        .iter()
        .map(|t| t.date)
        .max()
        .unwrap_or(today);
    DateWindow::ending_at(end, days)
}

/// One row per day of `window`, including days without transactions, with the balance carried
/// forward from everything dated before the window.
pub fn daily_series(transactions: &[Transaction], window: DateWindow) -> DailyReport {
    let starting_balance = totals(transactions.iter().filter(|t| t.date < window.start)).balance;

    let mut by_day: HashMap<NaiveDate, Vec<&Transaction>> = HashMap::new();
    for transaction in transactions.iter().filter(|t| window.contains(t.date)) {
        by_day.entry(transaction.date).or_default().push(transaction);
    }

    let mut running_balance = starting_balance;
    let mut window_totals = Totals::default();
    let mut transaction_count = 0;
    let days: Vec<DailyRow> = window
        .days()
        .map(|date| {
            let day_transactions = by_day.get(&date).map(Vec::as_slice).unwrap_or_default();
            let day_totals = totals(day_transactions.iter().copied());
            running_balance += day_totals.balance;
            window_totals.total_income += day_totals.total_income;
            window_totals.total_expenses += day_totals.total_expenses;
            transaction_count += day_transactions.len();
            DailyRow {
                date,
                income: day_totals.total_income,
                expenses: day_totals.total_expenses,
                net: day_totals.balance,
                running_balance,
                transaction_count: day_transactions.len(),
            }
        })
        .collect();

    let summary = DailySummary {
        total_income: window_totals.total_income,
        total_expenses: window_totals.total_expenses,
        average_daily_income: daily_average(window_totals.total_income, window.len_days()),
        average_daily_expenses: daily_average(window_totals.total_expenses, window.len_days()),
        transaction_count,
    };

    DailyReport {
        window,
        starting_balance,
        days,
        summary,
    }
}

fn daily_average(total: Decimal, days: u32) -> Decimal {
    if days == 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(days)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct WeeklyRow {
    pub label: String,
    pub window: DateWindow,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    pub transaction_count: usize,
}

/// The last [WEEKS] 7-day windows ending at `today`, oldest first and labelled `Week 1` to
/// `Week 4`. Weeks without transactions are left out.
pub fn weekly_series(transactions: &[Transaction], today: NaiveDate) -> Vec<WeeklyRow> {
    (0..WEEKS)
        .rev()
        .filter_map(|weeks_ago| {
            let end = today - Duration::days(7 * i64::from(weeks_ago));
            let window = DateWindow::ending_at(end, 7);
            let in_window: Vec<&Transaction> =
                transactions.iter().filter(|t| window.contains(t.date)).collect();
            if in_window.is_empty() {
                return None;
            }
            let week_totals = totals(in_window.iter().copied());
            Some(WeeklyRow {
                label: format!("Week {}", WEEKS - weeks_ago),
                window,
                income: week_totals.total_income,
                expenses: week_totals.total_expenses,
                net: week_totals.balance,
                transaction_count: in_window.len(),
            })
        })
        .collect()
}

#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct CategoryRow {
    #[serde(flatten)]
    pub category: Category,
    pub total: Decimal,
    pub transaction_count: usize,
    /// Share of the grand total, in percent, to 2 decimal places.
    pub percentage: Decimal,
}

/// Totals per category, largest first. Categories without transactions are left out.
pub fn category_breakdown(transactions: &[Transaction], categories: &[Category]) -> Vec<CategoryRow> {
    let mut sums: HashMap<i32, (Decimal, usize)> = HashMap::new();
    for transaction in transactions {
        let entry = sums.entry(transaction.category_id).or_default();
        entry.0 += transaction.amount;
        entry.1 += 1;
    }

    let mut rows: Vec<CategoryRow> = categories
        .iter()
        .filter_map(|category| {
            let (total, transaction_count) = sums.get(&category.id).copied()?;
            Some(CategoryRow {
                category: category.clone(),
                total,
                transaction_count,
                percentage: Decimal::ZERO,
            })
        })
        .filter(|row| !row.total.is_zero())
        .collect();

    let grand_total: Decimal = rows.iter().map(|row| row.total).sum();
    if !grand_total.is_zero() {
        for row in rows.iter_mut() {
            row.percentage = (row.total / grand_total * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        }
    }
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportTab {
    #[default]
    Daily,
    Weekly,
    Categories,
}

impl Display for ReportTab {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ReportTab::Daily => "Daily",
            ReportTab::Weekly => "Weekly",
            ReportTab::Categories => "Categories",
        })
    }
}

/// Date range of the transactions listed in an export. `None` means every transaction.
pub fn export_window(
    tab: ReportTab,
    days: u32,
    explicit: Option<DateWindow>,
    today: NaiveDate,
) -> Option<DateWindow> {
    if explicit.is_some() {
        return explicit;
    }
    match tab {
        ReportTab::Daily => Some(DateWindow::ending_at(today, days)),
        ReportTab::Weekly => Some(DateWindow::ending_at(today, 7 * WEEKS)),
        ReportTab::Categories => None,
    }
}

/// Transactions inside `window`, newest date first. Same-day transactions keep their input order.
pub fn filter_for_export(
    transactions: &[Transaction],
    window: Option<DateWindow>,
) -> Vec<Transaction> {
    let mut filtered: Vec<Transaction> = transactions
        .iter()
        .filter(|t| window.map_or(true, |w| w.contains(t.date)))
        .cloned()
        .collect();
    filtered.sort_by(|a, b| b.date.cmp(&a.date));
    filtered
}
