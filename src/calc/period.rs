// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar window arithmetic shared by every calculator.
//!
//! Windows are inclusive on both ends. Stepping never does day-of-month
//! arithmetic: the previous window is the one containing `start - 1 day`
//! and the next is the one containing `end + 1 day`, which keeps month and
//! year rollover exact.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::error::{FinanceError, Result};
use crate::models::BudgetPeriod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PeriodWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PeriodWindow {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// A window with `start > end` matches nothing.
    pub fn is_empty(&self) -> bool {
        self.start_date > self.end_date
    }

    /// The window of kind `period` that contains `date`.
    pub fn containing(period: BudgetPeriod, date: NaiveDate) -> Self {
        match period {
            BudgetPeriod::Daily => Self::new(date, date),
            BudgetPeriod::Weekly => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                let start = date.checked_sub_days(Days::new(offset)).unwrap_or(date);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
                Self::new(start, end)
            }
            BudgetPeriod::Monthly => {
                let start = first_of_month(date);
                let end = last_day_of_month(date.year(), date.month()).unwrap_or(date);
                Self::new(start, end)
            }
            BudgetPeriod::Yearly => {
                let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
                let end = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
                Self::new(start, end)
            }
        }
    }

    pub fn month(year: i32, month: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            FinanceError::Validation(format!("invalid month {}-{:02}", year, month))
        })?;
        let end = last_day_of_month(year, month).ok_or_else(|| {
            FinanceError::Validation(format!("month {}-{:02} is out of range", year, month))
        })?;
        Ok(Self::new(start, end))
    }

    pub fn year(year: i32) -> Result<Self> {
        match (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) {
            (Some(start), Some(end)) => Ok(Self::new(start, end)),
            _ => Err(FinanceError::Validation(format!("invalid year {}", year))),
        }
    }

    pub fn previous(&self, period: BudgetPeriod) -> Option<Self> {
        self.start_date
            .pred_opt()
            .map(|d| Self::containing(period, d))
    }

    pub fn next(&self, period: BudgetPeriod) -> Option<Self> {
        self.end_date
            .succ_opt()
            .map(|d| Self::containing(period, d))
    }

    /// `[today - days, today]`.
    pub fn trailing_days(today: NaiveDate, days: u32) -> Self {
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self::new(start, today)
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = shift_month(year, month, 1);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Moves `(year, month)` by `delta` months, rolling the year over in both directions.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Calendar months ending with the month of `today`, oldest first.
pub fn trailing_months(today: NaiveDate, months: u32) -> Vec<PeriodWindow> {
    (0..months as i32)
        .rev()
        .filter_map(|back| {
            let (year, month) = shift_month(today.year(), today.month(), -back);
            PeriodWindow::month(year, month).ok()
        })
        .collect()
}
