// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Transaction;

/// Flags import candidates that match an existing transaction on calendar
/// date, amount, kind and description. Missing and empty descriptions are
/// treated alike.
///
/// Each lookup is a linear scan of the existing ledger.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateDetector<'a> {
    existing: &'a [Transaction],
}

impl<'a> DuplicateDetector<'a> {
    pub fn new(existing: &'a [Transaction]) -> Self {
        Self { existing }
    }

    /// First existing transaction matching `candidate`, if any.
    pub fn find_duplicate(&self, candidate: &Transaction) -> Option<&'a Transaction> {
        let existing = self.existing;
        existing.iter().find(|t| {
            t.date() == candidate.date()
                && t.amount == candidate.amount
                && t.kind == candidate.kind
                && t.description_text() == candidate.description_text()
        })
    }

    pub fn is_duplicate(&self, candidate: &Transaction) -> bool {
        self.find_duplicate(candidate).is_some()
    }

    pub fn len(&self) -> usize {
        self.existing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.existing.is_empty()
    }
}
