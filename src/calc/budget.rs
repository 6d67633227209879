// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::period::PeriodWindow;
use super::{ratio, today};
use crate::models::{Budget, BudgetPeriod, Transaction};

/// Headroom applied on top of the historical average when suggesting a budget.
const SUGGESTION_HEADROOM: Decimal = Decimal::from_parts(110, 0, 0, false, 2);
const HALF_USED_PERCENT: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OverBudget,
    NearLimit,
    HalfUsed,
    Normal,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::OverBudget => "over_budget",
            BudgetStatus::NearLimit => "near_limit",
            BudgetStatus::HalfUsed => "half_used",
            BudgetStatus::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetUsage {
    pub budget_id: Option<i64>,
    pub budget_name: String,
    pub budget_amount: Decimal,
    pub spent_amount: Decimal,
    pub remaining_amount: Decimal,
    pub usage_percentage: Decimal,
    pub status: BudgetStatus,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub is_over_budget: bool,
    pub is_near_limit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    OverBudget,
    NearLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    High,
    Medium,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::High => "high",
            AlertSeverity::Medium => "medium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetAlert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub budget_name: String,
    pub message: String,
    pub severity: AlertSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub period: PeriodWindow,
    pub total_budgets: usize,
    pub total_budget_amount: Decimal,
    pub budgets: Vec<BudgetUsage>,
}

/// Evaluates budgets against the expenses of a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct BudgetCalculator<'a> {
    budgets: &'a [Budget],
    transactions: &'a [Transaction],
    today: NaiveDate,
}

impl<'a> BudgetCalculator<'a> {
    pub fn new(budgets: &'a [Budget], transactions: &'a [Transaction]) -> Self {
        Self {
            budgets,
            transactions,
            today: today(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn calculate_budget_usage(&self, budget: &Budget, as_of: Option<NaiveDate>) -> BudgetUsage {
        let as_of = as_of.unwrap_or(self.today);
        let window = PeriodWindow::containing(budget.period, as_of);
        let spent = self.spent_in(window, budget.category_id);

        let usage_percentage = if budget.amount > Decimal::ZERO {
            ratio(spent, budget.amount) * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
        let threshold_percent = budget.alert_threshold * Decimal::ONE_HUNDRED;
        let is_over_budget = spent > budget.amount;
        let is_near_limit = usage_percentage >= threshold_percent;

        let status = if is_over_budget {
            BudgetStatus::OverBudget
        } else if is_near_limit {
            BudgetStatus::NearLimit
        } else if usage_percentage >= HALF_USED_PERCENT {
            BudgetStatus::HalfUsed
        } else {
            BudgetStatus::Normal
        };

        debug!(
            budget = %budget.name,
            %spent,
            %usage_percentage,
            status = status.as_str(),
            "budget usage computed"
        );

        BudgetUsage {
            budget_id: budget.id,
            budget_name: budget.name.clone(),
            budget_amount: budget.amount,
            spent_amount: spent,
            remaining_amount: budget.amount - spent,
            usage_percentage,
            status,
            period_start: window.start_date,
            period_end: window.end_date,
            is_over_budget,
            is_near_limit,
        }
    }

    /// Usage of every active budget, in input order.
    pub fn all_budgets_status(&self, as_of: Option<NaiveDate>) -> Vec<BudgetUsage> {
        self.budgets
            .iter()
            .filter(|b| b.is_active)
            .map(|b| self.calculate_budget_usage(b, as_of))
            .collect()
    }

    pub fn budget_alerts(&self, as_of: Option<NaiveDate>) -> Vec<BudgetAlert> {
        self.all_budgets_status(as_of)
            .into_iter()
            .filter_map(|usage| {
                if usage.is_over_budget {
                    Some(BudgetAlert {
                        kind: AlertKind::OverBudget,
                        message: format!(
                            "Budget '{}' exceeded by {:.2}",
                            usage.budget_name, -usage.remaining_amount
                        ),
                        budget_name: usage.budget_name,
                        severity: AlertSeverity::High,
                    })
                } else if usage.is_near_limit {
                    Some(BudgetAlert {
                        kind: AlertKind::NearLimit,
                        message: format!(
                            "Budget '{}' is close to its limit ({:.1}%)",
                            usage.budget_name, usage.usage_percentage
                        ),
                        budget_name: usage.budget_name,
                        severity: AlertSeverity::Medium,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Average spending of `category_id` over the `lookback` complete windows
    /// preceding the current one, plus 10% headroom.
    pub fn suggest_budget_amount(
        &self,
        category_id: i64,
        period: BudgetPeriod,
        lookback: u32,
    ) -> Decimal {
        let mut window = PeriodWindow::containing(period, self.today);
        let mut total = Decimal::ZERO;
        let mut iterated = 0u32;
        for _ in 0..lookback {
            let Some(previous) = window.previous(period) else {
                break;
            };
            window = previous;
            total += self.spent_in(window, Some(category_id));
            iterated += 1;
        }
        if iterated == 0 {
            return Decimal::ZERO;
        }
        ratio(total, Decimal::from(iterated)) * SUGGESTION_HEADROOM
    }

    /// Active budgets whose lifetime overlaps `[start, end]`, evaluated as of `end`.
    pub fn budget_summary(&self, start: NaiveDate, end: NaiveDate) -> BudgetSummary {
        let period = PeriodWindow::new(start, end);
        let budgets: Vec<BudgetUsage> = if period.is_empty() {
            Vec::new()
        } else {
            self.budgets
                .iter()
                .filter(|b| b.is_active && b.overlaps(start, end))
                .map(|b| self.calculate_budget_usage(b, Some(end)))
                .collect()
        };
        BudgetSummary {
            period,
            total_budgets: budgets.len(),
            total_budget_amount: budgets.iter().map(|u| u.budget_amount).sum(),
            budgets,
        }
    }

    fn spent_in(&self, window: PeriodWindow, category: Option<i64>) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.is_expense() && window.contains(t.date()))
            .filter(|t| category.is_none_or(|c| t.category_id == Some(c)))
            .map(|t| t.amount)
            .sum()
    }
}
