// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pennywise::calc::DuplicateDetector;
use pennywise::models::{Transaction, TransactionKind};
use rust_decimal_macros::dec;

fn coffee() -> Transaction {
    let when = NaiveDate::from_ymd_opt(2026, 4, 2)
        .unwrap()
        .and_hms_opt(8, 15, 0)
        .unwrap();
    Transaction::new(TransactionKind::Expense, dec!(4.50), when).with_description("Coffee")
}

#[test]
fn identical_candidate_is_a_duplicate() {
    let mut existing = coffee();
    existing.id = Some(42);
    let ledger = vec![existing];
    let detector = DuplicateDetector::new(&ledger);
    assert!(detector.is_duplicate(&coffee()));
    assert_eq!(detector.find_duplicate(&coffee()).and_then(|t| t.id), Some(42));
}

#[test]
fn each_field_breaks_the_match() {
    let ledger = vec![coffee()];
    let detector = DuplicateDetector::new(&ledger);

    let mut other_day = coffee();
    other_day.occurred_at = other_day.occurred_at + chrono::Duration::days(1);
    assert!(!detector.is_duplicate(&other_day));

    let mut other_amount = coffee();
    other_amount.amount = dec!(4.51);
    assert!(!detector.is_duplicate(&other_amount));

    let mut other_kind = coffee();
    other_kind.kind = TransactionKind::Income;
    assert!(!detector.is_duplicate(&other_kind));

    let other_description = coffee().with_description("Tea");
    assert!(!detector.is_duplicate(&other_description));
}

#[test]
fn time_of_day_and_amount_scale_do_not_matter() {
    let ledger = vec![coffee()];
    let detector = DuplicateDetector::new(&ledger);
    let mut later = coffee();
    later.occurred_at = later.occurred_at + chrono::Duration::hours(9);
    later.amount = dec!(4.500);
    assert!(detector.is_duplicate(&later));
}

#[test]
fn missing_and_empty_descriptions_are_equal() {
    let mut blank = coffee();
    blank.description = Some("   ".into());
    let ledger = vec![blank];
    let detector = DuplicateDetector::new(&ledger);

    let mut none = coffee();
    none.description = None;
    assert!(detector.is_duplicate(&none));
    assert!(!detector.is_duplicate(&coffee()));
}

#[test]
fn empty_ledger_has_no_duplicates() {
    let detector = DuplicateDetector::new(&[]);
    assert!(detector.is_empty());
    assert!(detector.find_duplicate(&coffee()).is_none());
}

#[test]
fn descriptions_compare_exactly() {
    let ledger = vec![coffee().with_description("Coffee ")];
    let detector = DuplicateDetector::new(&ledger);
    assert!(!detector.is_duplicate(&coffee()));
    assert!(!detector.is_duplicate(&coffee().with_description("coffee ")));
    assert!(detector.is_duplicate(&coffee().with_description("Coffee ")));
}
