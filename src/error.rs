// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Budget not found: {0}")]
    BudgetNotFound(String),
    #[error("Category '{0}' still has child categories")]
    CategoryHasChildren(String),
    #[error("Category '{name}' is used by {count} transaction(s)")]
    CategoryInUse { name: String, count: i64 },
    #[error("Category '{name}' is used by {count} budget(s)")]
    CategoryHasBudgets { name: String, count: i64 },
    #[error("Moving category '{child}' under '{parent}' would create a cycle")]
    CategoryCycle { child: String, parent: String },
    #[error("No data: {0}")]
    NoData(String),
    #[error("Validation failed: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, FinanceError>;
