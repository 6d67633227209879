// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use pennywise::calc::{BalanceCalculator, CategoryKey};
use pennywise::models::{Transaction, TransactionKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    day(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

fn tx(id: i64, kind: TransactionKind, amount: Decimal, when: NaiveDateTime) -> Transaction {
    let mut t = Transaction::new(kind, amount, when);
    t.id = Some(id);
    t
}

fn ledger() -> Vec<Transaction> {
    vec![
        tx(1, TransactionKind::Income, dec!(3000), at(2026, 9, 1, 9)).with_category(Some(1)),
        tx(2, TransactionKind::Expense, dec!(120.50), at(2026, 9, 3, 12)).with_category(Some(2)),
        tx(3, TransactionKind::Transfer, dec!(500), at(2026, 9, 4, 8)),
        tx(4, TransactionKind::Expense, dec!(79.50), at(2026, 9, 10, 19)),
        tx(5, TransactionKind::Expense, dec!(200), at(2026, 10, 2, 10)).with_category(Some(2)),
    ]
}

#[test]
fn balance_counts_income_minus_expenses_up_to_date() {
    let txs = ledger();
    let calc = BalanceCalculator::new(&txs).with_today(day(2026, 10, 18));
    assert_eq!(calc.calculate_balance(Some(day(2026, 9, 30)), None), dec!(2800));
    assert_eq!(calc.calculate_balance(None, None), dec!(2600));
    assert_eq!(calc.calculate_balance(Some(day(2026, 8, 31)), None), Decimal::ZERO);
}

#[test]
fn transfers_never_move_the_balance() {
    let only_transfers = vec![
        tx(1, TransactionKind::Transfer, dec!(1000), at(2026, 1, 1, 10)),
        tx(2, TransactionKind::Transfer, dec!(250), at(2026, 1, 2, 10)),
    ];
    let calc = BalanceCalculator::new(&only_transfers).with_today(day(2026, 2, 1));
    assert_eq!(calc.calculate_balance(None, None), Decimal::ZERO);
    assert_eq!(
        calc.calculate_income(day(2026, 1, 1), day(2026, 1, 31), None),
        Decimal::ZERO
    );
}

#[test]
fn empty_ledger_has_zero_balance() {
    let calc = BalanceCalculator::new(&[]).with_today(day(2026, 1, 1));
    assert_eq!(calc.calculate_balance(None, None), Decimal::ZERO);
    assert!(calc.balance_history(day(2025, 1, 1), day(2026, 1, 1), None).is_empty());
}

#[test]
fn account_filter_limits_balance() {
    let txs = vec![
        tx(1, TransactionKind::Income, dec!(100), at(2026, 3, 1, 9)).with_account(Some(1)),
        tx(2, TransactionKind::Income, dec!(40), at(2026, 3, 1, 9)).with_account(Some(2)),
        tx(3, TransactionKind::Expense, dec!(15), at(2026, 3, 2, 9)).with_account(Some(2)),
    ];
    let calc = BalanceCalculator::new(&txs).with_today(day(2026, 3, 31));
    assert_eq!(calc.calculate_balance(None, Some(2)), dec!(25));
    assert_eq!(calc.calculate_balance(None, Some(1)), dec!(100));
    assert_eq!(calc.calculate_balance(None, Some(9)), Decimal::ZERO);
}

#[test]
fn net_income_is_income_minus_expenses() {
    let txs = ledger();
    let calc = BalanceCalculator::new(&txs);
    let (start, end) = (day(2026, 9, 1), day(2026, 9, 30));
    let income = calc.calculate_income(start, end, None);
    let expenses = calc.calculate_expenses(start, end, None);
    assert_eq!(income, dec!(3000));
    assert_eq!(expenses, dec!(200));
    assert_eq!(calc.calculate_net_income(start, end), income - expenses);
    assert_eq!(calc.calculate_expenses(start, end, Some(2)), dec!(120.50));
}

#[test]
fn inverted_range_yields_zero() {
    let txs = ledger();
    let calc = BalanceCalculator::new(&txs);
    let (start, end) = (day(2026, 9, 30), day(2026, 9, 1));
    assert_eq!(calc.calculate_income(start, end, None), Decimal::ZERO);
    assert_eq!(calc.calculate_net_income(start, end), Decimal::ZERO);
    assert!(calc.category_summary(start, end).is_empty());
    assert!(calc.balance_history(start, end, None).is_empty());
}

#[test]
fn history_runs_in_time_order_and_can_be_replayed() {
    let mut txs = ledger();
    txs.reverse();
    let calc = BalanceCalculator::new(&txs);
    let history = calc.balance_history(day(2026, 9, 1), day(2026, 10, 31), None);
    assert_eq!(history.len(), 5);

    let balances: Vec<Decimal> = history.iter().map(|e| e.balance).collect();
    assert_eq!(
        balances,
        vec![dec!(3000), dec!(2879.50), dec!(2879.50), dec!(2800), dec!(2600)]
    );
    let ids: Vec<Option<i64>> = history.iter().map(|e| e.transaction_id).collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);

    // second pass starts from zero again
    let last = (&history).into_iter().last().unwrap();
    assert_eq!(last.balance, dec!(2600));
}

#[test]
fn history_keeps_slice_order_for_equal_timestamps() {
    let when = at(2026, 5, 5, 12);
    let txs = vec![
        tx(7, TransactionKind::Expense, dec!(10), when),
        tx(3, TransactionKind::Income, dec!(50), when),
    ];
    let history = BalanceCalculator::new(&txs).balance_history(day(2026, 5, 5), day(2026, 5, 5), None);
    let entries: Vec<_> = history.iter().collect();
    assert_eq!(entries[0].transaction_id, Some(7));
    assert_eq!(entries[0].balance, dec!(-10));
    assert_eq!(entries[1].balance, dec!(40));
}

#[test]
fn category_summary_matches_totals_and_puts_uncategorized_last() {
    let txs = ledger();
    let calc = BalanceCalculator::new(&txs);
    let (start, end) = (day(2026, 9, 1), day(2026, 10, 31));
    let summary = calc.category_summary(start, end);

    let keys: Vec<CategoryKey> = summary.iter().map(|c| c.category_id).collect();
    assert_eq!(
        keys,
        vec![CategoryKey::Id(1), CategoryKey::Id(2), CategoryKey::Uncategorized]
    );
    let income: Decimal = summary.iter().map(|c| c.income).sum();
    let expense: Decimal = summary.iter().map(|c| c.expense).sum();
    assert_eq!(income, calc.calculate_income(start, end, None));
    assert_eq!(expense, calc.calculate_expenses(start, end, None));
    assert_eq!(summary[1].expense, dec!(320.50));
}

#[test]
fn category_key_serializes_untagged() {
    assert_eq!(serde_json::to_string(&CategoryKey::Id(4)).unwrap(), "4");
    assert_eq!(
        serde_json::to_string(&CategoryKey::Uncategorized).unwrap(),
        "null"
    );
}
