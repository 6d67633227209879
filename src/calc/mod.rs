// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calculation engine. Every calculator is a short-lived value that borrows
//! its snapshot for one computation and never touches storage.

pub mod balance;
pub mod budget;
pub mod duplicates;
pub mod period;
pub mod statistics;

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

pub use balance::{BalanceCalculator, BalanceHistory, BalanceHistoryEntry, CategoryTotals};
pub use budget::{BudgetAlert, BudgetCalculator, BudgetStatus, BudgetSummary, BudgetUsage};
pub use duplicates::DuplicateDetector;
pub use period::PeriodWindow;
pub use statistics::{
    AmountBucket, CategoryAnalysis, PeriodSummary, SpendingPatterns, StatisticsCalculator,
    TimeOfDay, TrendAnalysis, TrendDirection,
};

/// Aggregation key for per-category totals. Transactions without a category,
/// or whose category is unknown to the caller, land in `Uncategorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum CategoryKey {
    Id(i64),
    Uncategorized,
}

impl From<Option<i64>> for CategoryKey {
    fn from(id: Option<i64>) -> Self {
        id.map_or(CategoryKey::Uncategorized, CategoryKey::Id)
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKey::Id(id) => write!(f, "{}", id),
            CategoryKey::Uncategorized => f.write_str("(uncategorized)"),
        }
    }
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// `numerator / denominator`, with a zero denominator defined as 0.
pub(crate) fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
    }
}
