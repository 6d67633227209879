// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::period::{PeriodWindow, trailing_months};
use super::{CategoryKey, ratio, today};
use crate::error::{FinanceError, Result};
use crate::models::Transaction;

/// Slope magnitude below which a series counts as flat.
const TREND_EPSILON: Decimal = Decimal::from_parts(5, 0, 0, false, 2);
const TOP_CATEGORIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: PeriodWindow,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    pub transaction_count: usize,
    pub average_transaction: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub percentage: Decimal,
    pub slope: Decimal,
    pub first_value: Decimal,
    pub last_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net_income: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSet {
    pub income: Trend,
    pub expenses: Trend,
    pub net_income: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverages {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net_income: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub period_months: u32,
    pub monthly_data: Vec<MonthlyPoint>,
    pub trends: TrendSet,
    pub average_monthly: MonthlyAverages,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category_id: CategoryKey,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAnalysis {
    pub period: PeriodWindow,
    pub categories: Vec<CategoryStats>,
    pub top_expense_categories: Vec<CategoryStats>,
    pub total_categories: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    /// Morning 06-11, afternoon 12-17, evening 18-21, night otherwise.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            18..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountBucket {
    Small,
    Medium,
    Large,
    VeryLarge,
}

impl AmountBucket {
    pub const ALL: [AmountBucket; 4] = [
        AmountBucket::Small,
        AmountBucket::Medium,
        AmountBucket::Large,
        AmountBucket::VeryLarge,
    ];

    /// Half-open ranges: [0, 1000), [1000, 5000), [5000, 20000), [20000, inf).
    pub fn for_amount(amount: Decimal) -> Self {
        if amount < Decimal::from(1_000) {
            AmountBucket::Small
        } else if amount < Decimal::from(5_000) {
            AmountBucket::Medium
        } else if amount < Decimal::from(20_000) {
            AmountBucket::Large
        } else {
            AmountBucket::VeryLarge
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AmountBucket::Small => "small",
            AmountBucket::Medium => "medium",
            AmountBucket::Large => "large",
            AmountBucket::VeryLarge => "very_large",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdaySpending {
    pub weekday: Weekday,
    pub amount: Decimal,
    pub count: usize,
    pub average: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeOfDaySpending {
    pub time_of_day: TimeOfDay,
    pub amount: Decimal,
    pub count: usize,
    pub average: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountBucketSpending {
    pub bucket: AmountBucket,
    pub amount: Decimal,
    pub count: usize,
    pub average: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingPatterns {
    pub period_days: u32,
    pub period: PeriodWindow,
    pub weekday_analysis: Vec<WeekdaySpending>,
    pub time_analysis: Vec<TimeOfDaySpending>,
    pub amount_analysis: Vec<AmountBucketSpending>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    amount: Decimal,
    count: usize,
}

impl Tally {
    fn push(&mut self, amount: Decimal) {
        self.amount += amount;
        self.count += 1;
    }

    fn average(&self) -> Decimal {
        ratio(self.amount, Decimal::from(self.count))
    }
}

/// Descriptive statistics over a ledger snapshot.
#[derive(Debug, Clone, Copy)]
pub struct StatisticsCalculator<'a> {
    transactions: &'a [Transaction],
    today: NaiveDate,
}

impl<'a> StatisticsCalculator<'a> {
    pub fn new(transactions: &'a [Transaction]) -> Self {
        Self {
            transactions,
            today: today(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn period_summary(&self, start: NaiveDate, end: NaiveDate) -> PeriodSummary {
        let period = PeriodWindow::new(start, end);
        let mut income = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;
        let mut count = 0usize;
        for t in self.in_window(period) {
            if t.is_income() {
                income += t.amount;
            } else if t.is_expense() {
                expenses += t.amount;
            }
            count += 1;
        }
        PeriodSummary {
            period,
            total_income: income,
            total_expenses: expenses,
            net_income: income - expenses,
            transaction_count: count,
            average_transaction: ratio(income + expenses, Decimal::from(count)),
        }
    }

    pub fn monthly_summary(&self, year: i32, month: u32) -> Result<PeriodSummary> {
        let window = PeriodWindow::month(year, month)?;
        Ok(self.period_summary(window.start_date, window.end_date))
    }

    pub fn yearly_summary(&self, year: i32) -> Result<PeriodSummary> {
        let window = PeriodWindow::year(year)?;
        Ok(self.period_summary(window.start_date, window.end_date))
    }

    /// Per-month totals for the `months` calendar months ending with the
    /// current one, with a least-squares trend for each series.
    pub fn trend_analysis(&self, months: u32) -> Result<TrendAnalysis> {
        if months == 0 {
            return Err(FinanceError::NoData(
                "trend analysis needs at least one month".to_string(),
            ));
        }
        let monthly_data: Vec<MonthlyPoint> = trailing_months(self.today, months)
            .into_iter()
            .map(|window| {
                let summary = self.period_summary(window.start_date, window.end_date);
                MonthlyPoint {
                    year: window.start_date.year(),
                    month: window.start_date.month(),
                    income: summary.total_income,
                    expenses: summary.total_expenses,
                    net_income: summary.net_income,
                }
            })
            .collect();
        if monthly_data.is_empty() {
            return Err(FinanceError::NoData(format!(
                "no calendar months resolved before {}",
                self.today
            )));
        }

        let income: Vec<Decimal> = monthly_data.iter().map(|m| m.income).collect();
        let expenses: Vec<Decimal> = monthly_data.iter().map(|m| m.expenses).collect();
        let net: Vec<Decimal> = monthly_data.iter().map(|m| m.net_income).collect();
        let points = Decimal::from(monthly_data.len());
        debug!(months, points = monthly_data.len(), "trend analysis");

        Ok(TrendAnalysis {
            period_months: months,
            average_monthly: MonthlyAverages {
                income: ratio(income.iter().sum(), points),
                expenses: ratio(expenses.iter().sum(), points),
                net_income: ratio(net.iter().sum(), points),
            },
            trends: TrendSet {
                income: calculate_trend(&income),
                expenses: calculate_trend(&expenses),
                net_income: calculate_trend(&net),
            },
            monthly_data,
        })
    }

    pub fn category_analysis(&self, start: NaiveDate, end: NaiveDate) -> CategoryAnalysis {
        let period = PeriodWindow::new(start, end);
        let mut stats: BTreeMap<CategoryKey, (Decimal, Decimal, usize)> = BTreeMap::new();
        for t in self.in_window(period) {
            let slot = stats
                .entry(CategoryKey::from(t.category_id))
                .or_insert((Decimal::ZERO, Decimal::ZERO, 0));
            if t.is_income() {
                slot.0 += t.amount;
            } else if t.is_expense() {
                slot.1 += t.amount;
            }
            slot.2 += 1;
        }

        let mut categories: Vec<CategoryStats> = stats
            .into_iter()
            .map(|(category_id, (income, expense, transaction_count))| CategoryStats {
                category_id,
                income,
                expense,
                net: income - expense,
                transaction_count,
            })
            .collect();
        categories.sort_by(|a, b| {
            b.expense
                .cmp(&a.expense)
                .then_with(|| a.category_id.cmp(&b.category_id))
        });

        CategoryAnalysis {
            period,
            top_expense_categories: categories.iter().take(TOP_CATEGORIES).cloned().collect(),
            total_categories: categories.len(),
            categories,
        }
    }

    /// Expenses of the last `days` days grouped by weekday, time of day and size.
    pub fn spending_patterns(&self, days: u32) -> SpendingPatterns {
        let period = PeriodWindow::trailing_days(self.today, days);
        let mut weekdays = [Tally::default(); 7];
        let mut times = [Tally::default(); 4];
        let mut buckets = [Tally::default(); 4];

        for t in self.in_window(period).filter(|t| t.is_expense()) {
            let weekday = t.occurred_at.weekday().num_days_from_monday() as usize;
            weekdays[weekday].push(t.amount);
            times[TimeOfDay::from_hour(t.occurred_at.hour()).index()].push(t.amount);
            buckets[AmountBucket::for_amount(t.amount).index()].push(t.amount);
        }

        let total: Decimal = buckets.iter().map(|b| b.amount).sum();
        let mut weekday = Weekday::Mon;
        let weekday_analysis = weekdays
            .iter()
            .map(|tally| {
                let row = WeekdaySpending {
                    weekday,
                    amount: tally.amount,
                    count: tally.count,
                    average: tally.average(),
                };
                weekday = weekday.succ();
                row
            })
            .collect();
        let time_analysis = TimeOfDay::ALL
            .iter()
            .map(|&time_of_day| {
                let tally = times[time_of_day.index()];
                TimeOfDaySpending {
                    time_of_day,
                    amount: tally.amount,
                    count: tally.count,
                    average: tally.average(),
                }
            })
            .collect();
        let amount_analysis = AmountBucket::ALL
            .iter()
            .map(|&bucket| {
                let tally = buckets[bucket.index()];
                AmountBucketSpending {
                    bucket,
                    amount: tally.amount,
                    count: tally.count,
                    average: tally.average(),
                    percentage: ratio(tally.amount, total) * Decimal::ONE_HUNDRED,
                }
            })
            .collect();

        SpendingPatterns {
            period_days: days,
            period,
            weekday_analysis,
            time_analysis,
            amount_analysis,
        }
    }

    fn in_window(&self, window: PeriodWindow) -> impl Iterator<Item = &'a Transaction> + 'a {
        let transactions = self.transactions;
        transactions
            .iter()
            .filter(move |t| window.contains(t.date()))
    }
}

/// Least-squares slope over `x = 0..n`, with direction and first-to-last change.
pub fn calculate_trend(values: &[Decimal]) -> Trend {
    let first_value = values.first().copied().unwrap_or_default();
    let last_value = values.last().copied().unwrap_or_default();
    if values.len() < 2 {
        return Trend {
            direction: TrendDirection::Stable,
            percentage: Decimal::ZERO,
            slope: Decimal::ZERO,
            first_value,
            last_value,
        };
    }

    let n = Decimal::from(values.len());
    let mut sum_x = Decimal::ZERO;
    let mut sum_y = Decimal::ZERO;
    let mut sum_xy = Decimal::ZERO;
    let mut sum_x2 = Decimal::ZERO;
    for (i, y) in values.iter().enumerate() {
        let x = Decimal::from(i);
        sum_x += x;
        sum_y += *y;
        sum_xy += x * *y;
        sum_x2 += x * x;
    }
    let slope = ratio(n * sum_xy - sum_x * sum_y, n * sum_x2 - sum_x * sum_x);

    let direction = if slope > TREND_EPSILON {
        TrendDirection::Increasing
    } else if slope < -TREND_EPSILON {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    Trend {
        direction,
        percentage: ratio(last_value - first_value, first_value) * Decimal::ONE_HUNDRED,
        slope,
        first_value,
        last_value,
    }
}
