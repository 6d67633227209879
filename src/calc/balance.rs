// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::period::PeriodWindow;
use super::{CategoryKey, today};
use crate::models::{Transaction, TransactionKind};

/// Monetary totals over a ledger snapshot.
#[derive(Debug, Clone, Copy)]
pub struct BalanceCalculator<'a> {
    transactions: &'a [Transaction],
    today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotals {
    pub category_id: CategoryKey,
    pub income: Decimal,
    pub expense: Decimal,
}

impl<'a> BalanceCalculator<'a> {
    pub fn new(transactions: &'a [Transaction]) -> Self {
        Self {
            transactions,
            today: today(),
        }
    }

    /// Pins the date used when `as_of` is omitted.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Income minus expenses for everything dated on or before `as_of` (default today).
    pub fn calculate_balance(&self, as_of: Option<NaiveDate>, account: Option<i64>) -> Decimal {
        let as_of = as_of.unwrap_or(self.today);
        self.transactions
            .iter()
            .filter(|t| t.date() <= as_of)
            .filter(|t| account.is_none_or(|a| t.account_id == Some(a)))
            .map(Transaction::signed_amount)
            .sum()
    }

    pub fn calculate_income(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        category: Option<i64>,
    ) -> Decimal {
        self.sum_kind(TransactionKind::Income, PeriodWindow::new(start, end), category)
    }

    pub fn calculate_expenses(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        category: Option<i64>,
    ) -> Decimal {
        self.sum_kind(TransactionKind::Expense, PeriodWindow::new(start, end), category)
    }

    pub fn calculate_net_income(&self, start: NaiveDate, end: NaiveDate) -> Decimal {
        self.calculate_income(start, end, None) - self.calculate_expenses(start, end, None)
    }

    /// Running balance over the window, oldest first. Transactions sharing a
    /// timestamp keep their order from the snapshot slice.
    pub fn balance_history(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        account: Option<i64>,
    ) -> BalanceHistory<'a> {
        let window = PeriodWindow::new(start, end);
        let mut entries: Vec<&'a Transaction> = self
            .transactions
            .iter()
            .filter(|t| window.contains(t.date()))
            .filter(|t| account.is_none_or(|a| t.account_id == Some(a)))
            .collect();
        // sort_by_key is stable
        entries.sort_by_key(|t| t.occurred_at);
        debug!(count = entries.len(), %start, %end, "balance history prepared");
        BalanceHistory { entries }
    }

    pub fn category_summary(&self, start: NaiveDate, end: NaiveDate) -> Vec<CategoryTotals> {
        let window = PeriodWindow::new(start, end);
        let mut totals: BTreeMap<CategoryKey, (Decimal, Decimal)> = BTreeMap::new();
        for t in self.transactions.iter().filter(|t| window.contains(t.date())) {
            if t.is_transfer() {
                continue;
            }
            let slot = totals
                .entry(CategoryKey::from(t.category_id))
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            if t.is_income() {
                slot.0 += t.amount;
            } else {
                slot.1 += t.amount;
            }
        }
        totals
            .into_iter()
            .map(|(category_id, (income, expense))| CategoryTotals {
                category_id,
                income,
                expense,
            })
            .collect()
    }

    fn sum_kind(
        &self,
        kind: TransactionKind,
        window: PeriodWindow,
        category: Option<i64>,
    ) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.kind == kind && window.contains(t.date()))
            .filter(|t| category.is_none_or(|c| t.category_id == Some(c)))
            .map(|t| t.amount)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceHistoryEntry {
    pub date: NaiveDate,
    pub balance: Decimal,
    pub transaction_id: Option<i64>,
    pub amount: Decimal,
    pub kind: TransactionKind,
}

/// Ordered history whose running balances are computed on iteration.
/// Iterate it as many times as needed; each pass starts from zero.
#[derive(Debug, Clone)]
pub struct BalanceHistory<'a> {
    entries: Vec<&'a Transaction>,
}

impl<'a> BalanceHistory<'a> {
    pub fn iter(&self) -> BalanceHistoryIter<'_> {
        BalanceHistoryIter {
            inner: self.entries.iter(),
            balance: Decimal::ZERO,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'h, 'a> IntoIterator for &'h BalanceHistory<'a> {
    type Item = BalanceHistoryEntry;
    type IntoIter = BalanceHistoryIter<'h>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct BalanceHistoryIter<'h> {
    inner: std::slice::Iter<'h, &'h Transaction>,
    balance: Decimal,
}

impl Iterator for BalanceHistoryIter<'_> {
    type Item = BalanceHistoryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let t = self.inner.next()?;
        self.balance += t.signed_amount();
        Some(BalanceHistoryEntry {
            date: t.date(),
            balance: self.balance,
            transaction_id: t.id,
            amount: t.amount,
            kind: t.kind,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
