// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinanceError;

/// Alert threshold used when neither the budget nor the settings carry one.
pub const DEFAULT_ALERT_THRESHOLD: Decimal = Decimal::from_parts(80, 0, 0, false, 2);

/// Thresholds are fractions of the budget amount and must lie in (0, 1].
pub fn validate_alert_threshold(threshold: Decimal) -> Result<(), FinanceError> {
    if threshold <= Decimal::ZERO || threshold > Decimal::ONE {
        return Err(FinanceError::Validation(format!(
            "alert_threshold must be in (0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub r#type: String,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" | "credit" => Ok(TransactionKind::Income),
            "expense" | "out" | "debit" => Ok(TransactionKind::Expense),
            "transfer" => Ok(TransactionKind::Transfer),
            other => Err(FinanceError::Validation(format!(
                "unknown transaction kind '{}' (use income|expense|transfer)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Option<i64>,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    pub occurred_at: NaiveDateTime,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount: Decimal, occurred_at: NaiveDateTime) -> Self {
        Self {
            id: None,
            amount,
            kind,
            category_id: None,
            account_id: None,
            occurred_at,
            description: None,
            tags: Vec::new(),
        }
    }

    pub fn with_category(mut self, category_id: Option<i64>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn with_account(mut self, account_id: Option<i64>) -> Self {
        self.account_id = account_id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.occurred_at.date()
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_transfer(&self) -> bool {
        self.kind == TransactionKind::Transfer
    }

    /// Effect on a running balance: income adds, expense subtracts, transfer is neutral.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
            TransactionKind::Transfer => Decimal::ZERO,
        }
    }

    /// Description with blank strings folded into `None`; anything else is kept verbatim.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), FinanceError> {
        if self.amount < Decimal::ZERO {
            return Err(FinanceError::Validation(format!(
                "amount must not be negative, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
    Both,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
            CategoryKind::Both => "both",
        }
    }
}

impl From<TransactionKind> for CategoryKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => CategoryKind::Income,
            TransactionKind::Expense => CategoryKind::Expense,
            TransactionKind::Transfer => CategoryKind::Both,
        }
    }
}

impl FromStr for CategoryKind {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            "both" => Ok(CategoryKind::Both),
            other => Err(FinanceError::Validation(format!(
                "unknown category kind '{}' (use income|expense|both)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: CategoryKind,
    pub parent_id: Option<i64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Daily => "daily",
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(BudgetPeriod::Daily),
            "weekly" | "week" => Ok(BudgetPeriod::Weekly),
            "monthly" | "month" => Ok(BudgetPeriod::Monthly),
            "yearly" | "year" => Ok(BudgetPeriod::Yearly),
            other => Err(FinanceError::Validation(format!(
                "unknown budget period '{}' (use daily|weekly|monthly|yearly)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Option<i64>,
    pub name: String,
    pub category_id: Option<i64>,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub alert_threshold: Decimal, // fraction of amount, 0.80 = 80%
    pub is_active: bool,
}

impl Budget {
    pub fn new(
        name: impl Into<String>,
        amount: Decimal,
        period: BudgetPeriod,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            category_id: None,
            amount,
            period,
            start_date,
            end_date: None,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            is_active: true,
        }
    }

    pub fn with_category(mut self, category_id: Option<i64>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn with_alert_threshold(mut self, threshold: Decimal) -> Self {
        self.alert_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), FinanceError> {
        if self.name.trim().is_empty() {
            return Err(FinanceError::Validation("budget name must not be empty".into()));
        }
        if self.amount < Decimal::ZERO {
            return Err(FinanceError::Validation(format!(
                "budget amount must not be negative, got {}",
                self.amount
            )));
        }
        if self.end_date.is_some_and(|e| e < self.start_date) {
            return Err(FinanceError::Validation(format!(
                "budget end date precedes its start date {}",
                self.start_date
            )));
        }
        validate_alert_threshold(self.alert_threshold)
    }

    /// Whether the budget's lifetime `[start_date, end_date]` intersects `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date.is_none_or(|e| e >= start)
    }
}
