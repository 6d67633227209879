// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use pennywise::calc::statistics::calculate_trend;
use pennywise::calc::{AmountBucket, CategoryKey, StatisticsCalculator, TimeOfDay, TrendDirection};
use pennywise::error::FinanceError;
use pennywise::models::{Transaction, TransactionKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(date: NaiveDate, h: u32) -> NaiveDateTime {
    date.and_hms_opt(h, 30, 0).unwrap()
}

fn income(amount: Decimal, when: NaiveDateTime) -> Transaction {
    Transaction::new(TransactionKind::Income, amount, when)
}

fn expense(amount: Decimal, when: NaiveDateTime) -> Transaction {
    Transaction::new(TransactionKind::Expense, amount, when)
}

#[test]
fn steadily_rising_series_trends_up() {
    let trend = calculate_trend(&[dec!(100), dec!(200), dec!(300), dec!(400)]);
    assert_eq!(trend.direction, TrendDirection::Increasing);
    assert_eq!(trend.percentage, dec!(300));
    assert_eq!(trend.slope, dec!(100));
    assert_eq!(trend.first_value, dec!(100));
    assert_eq!(trend.last_value, dec!(400));
}

#[test]
fn flat_falling_and_short_series() {
    let flat = calculate_trend(&[dec!(50), dec!(50), dec!(50)]);
    assert_eq!(flat.direction, TrendDirection::Stable);
    assert_eq!(flat.percentage, Decimal::ZERO);

    let falling = calculate_trend(&[dec!(400), dec!(300), dec!(100)]);
    assert_eq!(falling.direction, TrendDirection::Decreasing);
    assert_eq!(falling.percentage, dec!(-75));

    let single = calculate_trend(&[dec!(10)]);
    assert_eq!(single.direction, TrendDirection::Stable);
    assert_eq!(single.slope, Decimal::ZERO);

    // percentage is undefined from a zero start and reported as 0
    let from_zero = calculate_trend(&[Decimal::ZERO, dec!(10)]);
    assert_eq!(from_zero.direction, TrendDirection::Increasing);
    assert_eq!(from_zero.percentage, Decimal::ZERO);
}

#[test]
fn trend_analysis_uses_trailing_calendar_months() {
    let txs = vec![
        income(dec!(100), at(day(2026, 7, 15), 9)),
        income(dec!(200), at(day(2026, 8, 15), 9)),
        income(dec!(300), at(day(2026, 9, 15), 9)),
        income(dec!(400), at(day(2026, 10, 15), 9)),
        expense(dec!(50), at(day(2026, 10, 16), 9)),
        // outside the four-month window
        income(dec!(9000), at(day(2026, 6, 30), 9)),
    ];
    let analysis = StatisticsCalculator::new(&txs)
        .with_today(day(2026, 10, 18))
        .trend_analysis(4)
        .unwrap();

    let months: Vec<(i32, u32)> = analysis
        .monthly_data
        .iter()
        .map(|m| (m.year, m.month))
        .collect();
    assert_eq!(months, vec![(2026, 7), (2026, 8), (2026, 9), (2026, 10)]);
    assert_eq!(analysis.trends.income.direction, TrendDirection::Increasing);
    assert_eq!(analysis.trends.income.percentage, dec!(300));
    assert_eq!(analysis.average_monthly.income, dec!(250));
    assert_eq!(analysis.monthly_data[3].net_income, dec!(350));
}

#[test]
fn trend_analysis_rolls_back_over_new_year() {
    let txs = vec![expense(dec!(10), at(day(2025, 12, 31), 23))];
    let analysis = StatisticsCalculator::new(&txs)
        .with_today(day(2026, 1, 5))
        .trend_analysis(2)
        .unwrap();
    assert_eq!(analysis.monthly_data[0].year, 2025);
    assert_eq!(analysis.monthly_data[0].month, 12);
    assert_eq!(analysis.monthly_data[0].expenses, dec!(10));
    assert_eq!(analysis.trends.expenses.direction, TrendDirection::Decreasing);
}

#[test]
fn trend_analysis_without_months_is_no_data() {
    let err = StatisticsCalculator::new(&[]).trend_analysis(0).unwrap_err();
    assert!(matches!(err, FinanceError::NoData(_)));
}

#[test]
fn period_summary_counts_transfers_but_does_not_sum_them() {
    let d = day(2026, 3, 10);
    let txs = vec![
        income(dec!(300), at(d, 9)),
        expense(dec!(100), at(d, 10)),
        Transaction::new(TransactionKind::Transfer, dec!(5000), at(d, 11)),
    ];
    let stats = StatisticsCalculator::new(&txs);
    let summary = stats.monthly_summary(2026, 3).unwrap();
    assert_eq!(summary.total_income, dec!(300));
    assert_eq!(summary.total_expenses, dec!(100));
    assert_eq!(summary.net_income, dec!(200));
    assert_eq!(summary.transaction_count, 3);
    assert_eq!(summary.average_transaction.round_dp(2), dec!(133.33));
    assert_eq!(summary.period.start_date, day(2026, 3, 1));
    assert_eq!(summary.period.end_date, day(2026, 3, 31));

    let empty = stats.monthly_summary(2026, 4).unwrap();
    assert_eq!(empty.transaction_count, 0);
    assert_eq!(empty.average_transaction, Decimal::ZERO);

    let year = stats.yearly_summary(2026).unwrap();
    assert_eq!(year.period.end_date, day(2026, 12, 31));
    assert_eq!(year.net_income, dec!(200));
}

#[test]
fn invalid_month_is_rejected() {
    let err = StatisticsCalculator::new(&[]).monthly_summary(2026, 13).unwrap_err();
    assert!(matches!(err, FinanceError::Validation(_)));
}

#[test]
fn february_summary_respects_leap_years() {
    let txs = vec![expense(dec!(12), at(day(2028, 2, 29), 8))];
    let summary = StatisticsCalculator::new(&txs).monthly_summary(2028, 2).unwrap();
    assert_eq!(summary.period.end_date, day(2028, 2, 29));
    assert_eq!(summary.total_expenses, dec!(12));
}

#[test]
fn category_analysis_sorts_by_expense() {
    let d = day(2026, 5, 5);
    let txs = vec![
        expense(dec!(40), at(d, 9)).with_category(Some(1)),
        expense(dec!(90), at(d, 9)).with_category(Some(2)),
        expense(dec!(90), at(d, 9)),
        income(dec!(500), at(d, 9)).with_category(Some(3)),
        expense(dec!(10), at(d, 9)).with_category(Some(1)),
    ];
    let analysis = StatisticsCalculator::new(&txs).category_analysis(day(2026, 5, 1), day(2026, 5, 31));
    let order: Vec<CategoryKey> = analysis.categories.iter().map(|c| c.category_id).collect();
    assert_eq!(
        order,
        vec![
            CategoryKey::Id(2),
            CategoryKey::Uncategorized,
            CategoryKey::Id(1),
            CategoryKey::Id(3)
        ]
    );
    assert_eq!(analysis.total_categories, 4);
    assert_eq!(analysis.categories[2].transaction_count, 2);
    assert_eq!(analysis.categories[3].net, dec!(500));
}

#[test]
fn top_expense_categories_are_capped_at_five() {
    let d = day(2026, 5, 5);
    let txs: Vec<Transaction> = (1..=7)
        .map(|i| expense(Decimal::from(i * 10), at(d, 9)).with_category(Some(i)))
        .collect();
    let analysis = StatisticsCalculator::new(&txs).category_analysis(d, d);
    assert_eq!(analysis.total_categories, 7);
    assert_eq!(analysis.top_expense_categories.len(), 5);
    assert_eq!(analysis.top_expense_categories[0].category_id, CategoryKey::Id(7));
}

#[test]
fn amount_buckets_use_half_open_ranges() {
    assert_eq!(AmountBucket::for_amount(dec!(999.99)), AmountBucket::Small);
    assert_eq!(AmountBucket::for_amount(dec!(1000)), AmountBucket::Medium);
    assert_eq!(AmountBucket::for_amount(dec!(4999.99)), AmountBucket::Medium);
    assert_eq!(AmountBucket::for_amount(dec!(5000)), AmountBucket::Large);
    assert_eq!(AmountBucket::for_amount(dec!(20000)), AmountBucket::VeryLarge);
}

#[test]
fn time_of_day_boundaries() {
    assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Night);
    assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Morning);
    assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
    assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Evening);
    assert_eq!(TimeOfDay::from_hour(22), TimeOfDay::Night);
}

#[test]
fn spending_patterns_group_recent_expenses() {
    let today = day(2026, 10, 18); // Sunday
    let txs = vec![
        expense(dec!(1000), at(day(2026, 10, 12), 8)), // Monday morning
        expense(dec!(200), at(day(2026, 10, 12), 13)), // Monday afternoon
        expense(dec!(6000), at(day(2026, 10, 18), 23)), // Sunday night
        income(dec!(9999), at(day(2026, 10, 14), 9)),
        expense(dec!(50), at(day(2026, 9, 1), 9)), // older than the window
    ];
    let patterns = StatisticsCalculator::new(&txs)
        .with_today(today)
        .spending_patterns(30);

    assert_eq!(patterns.weekday_analysis.len(), 7);
    assert_eq!(patterns.weekday_analysis[0].weekday, Weekday::Mon);
    assert_eq!(patterns.weekday_analysis[0].count, 2);
    assert_eq!(patterns.weekday_analysis[0].average, dec!(600));
    assert_eq!(patterns.weekday_analysis[6].weekday, Weekday::Sun);
    assert_eq!(patterns.weekday_analysis[6].amount, dec!(6000));
    assert_eq!(patterns.weekday_analysis[2].count, 0);
    assert_eq!(patterns.weekday_analysis[2].average, Decimal::ZERO);

    let times: Vec<(TimeOfDay, usize)> = patterns
        .time_analysis
        .iter()
        .map(|t| (t.time_of_day, t.count))
        .collect();
    assert_eq!(
        times,
        vec![
            (TimeOfDay::Morning, 1),
            (TimeOfDay::Afternoon, 1),
            (TimeOfDay::Evening, 0),
            (TimeOfDay::Night, 1)
        ]
    );

    let buckets = &patterns.amount_analysis;
    assert_eq!(buckets.len(), 4);
    assert_eq!(buckets[0].bucket, AmountBucket::Small);
    assert_eq!(buckets[0].amount, dec!(200));
    assert_eq!(buckets[1].bucket, AmountBucket::Medium);
    assert_eq!(buckets[1].count, 1);
    assert_eq!(buckets[2].amount, dec!(6000));
    assert_eq!(buckets[3].percentage, Decimal::ZERO);
    let total_share: Decimal = buckets.iter().map(|b| b.percentage).sum();
    assert_eq!(total_share.round_dp(6), dec!(100));
}

#[test]
fn spending_patterns_with_no_expenses_emit_every_bucket() {
    let patterns = StatisticsCalculator::new(&[])
        .with_today(day(2026, 1, 1))
        .spending_patterns(7);
    assert_eq!(patterns.weekday_analysis.len(), 7);
    assert_eq!(patterns.time_analysis.len(), 4);
    assert!(patterns.amount_analysis.iter().all(|b| b.percentage.is_zero()));
    assert_eq!(patterns.period.start_date, day(2025, 12, 25));
}
