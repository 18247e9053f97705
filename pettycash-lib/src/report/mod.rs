use crate::error::HandlerError;
use actix_web::{web, Scope};
use aggregation::{DateWindow, ReportTab};
use chrono::NaiveDate;
use serde::Deserialize;

pub mod aggregation;
pub mod currency;
mod handlers;
pub mod render;

/// Window lengths the daily report can be asked for.
pub const PERIOD_OPTIONS: [u32; 5] = [3, 5, 7, 14, 30];
pub const DEFAULT_PERIOD: u32 = 3;
/// Longest explicit date range a report accepts.
pub const MAX_RANGE_DAYS: i64 = 366;
/// Number of transactions listed on the dashboard summary.
pub const RECENT_TRANSACTIONS: usize = 5;

pub fn report_service() -> Scope {
    web::scope("/reports")
        .service(handlers::summary)
        .service(handlers::daily)
        .service(handlers::weekly)
        .service(handlers::category_report)
        .service(handlers::export)
}

#[derive(Deserialize, Clone, Copy, Debug, Default)]
pub struct ReportQuery {
    pub days: Option<u32>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub tab: ReportTab,
}

impl ReportQuery {
    pub fn days(&self) -> Result<u32, HandlerError> {
        match self.days {
            None => Ok(DEFAULT_PERIOD),
            Some(days) if PERIOD_OPTIONS.contains(&days) => Ok(days),
            Some(_) => Err(HandlerError::BadRequest(
                "The days must be one of 3, 5, 7, 14, 30.".to_owned(),
            )),
        }
    }

    /// Only a range with both ends is used. A start after the end gives an empty window.
    pub fn explicit_window(&self) -> Result<Option<DateWindow>, HandlerError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if (end - start).num_days() >= MAX_RANGE_DAYS => {
                Err(HandlerError::BadRequest(format!(
                    "The date range may not be longer than {} days.",
                    MAX_RANGE_DAYS
                )))
            }
            (Some(start), Some(end)) => Ok(Some(DateWindow::new(start, end))),
            _ => Ok(None),
        }
    }
}
