// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Category forest built from the flat `categories` table.

use std::collections::{BTreeMap, HashSet};

use crate::error::{FinanceError, Result};
use crate::models::Category;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow<'a> {
    pub depth: usize,
    pub category: &'a Category,
}

#[derive(Debug, Clone)]
pub struct CategoryForest<'a> {
    by_id: BTreeMap<i64, &'a Category>,
    children: BTreeMap<i64, Vec<i64>>,
}

impl<'a> CategoryForest<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        let by_id: BTreeMap<i64, &'a Category> = categories.iter().map(|c| (c.id, c)).collect();
        let mut children: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
        for c in categories {
            if let Some(parent) = c.parent_id.filter(|p| by_id.contains_key(p)) {
                children.entry(parent).or_default().push(c.id);
            }
        }
        for ids in children.values_mut() {
            ids.sort_by(|a, b| name_of(&by_id, *a).cmp(name_of(&by_id, *b)));
        }
        Self { by_id, children }
    }

    pub fn get(&self, id: i64) -> Option<&'a Category> {
        self.by_id.get(&id).copied()
    }

    pub fn children(&self, id: i64) -> Vec<&'a Category> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|c| self.get(*c)).collect())
            .unwrap_or_default()
    }

    /// Categories with no parent, or whose parent is missing, sorted by name.
    pub fn roots(&self) -> Vec<&'a Category> {
        let mut roots: Vec<&'a Category> = self
            .by_id
            .values()
            .copied()
            .filter(|c| c.parent_id.is_none_or(|p| !self.by_id.contains_key(&p)))
            .collect();
        roots.sort_by(|a, b| a.name.cmp(&b.name));
        roots
    }

    /// Parent chain of `id`, nearest first. Stops if the stored graph loops.
    pub fn ancestors(&self, id: i64) -> Vec<&'a Category> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.get(id).and_then(|c| c.parent_id);
        while let Some(parent_id) = current {
            if !seen.insert(parent_id) {
                break;
            }
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            out.push(parent);
            current = parent.parent_id;
        }
        out
    }

    /// Pre-order walk of every tree, for indented rendering.
    pub fn depth_first(&self) -> Vec<TreeRow<'a>> {
        let mut rows = Vec::with_capacity(self.by_id.len());
        let mut visited = HashSet::new();
        let mut stack: Vec<(i64, usize)> = self.roots().iter().rev().map(|c| (c.id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(category) = self.get(id) else {
                continue;
            };
            rows.push(TreeRow { depth, category });
            if let Some(kids) = self.children.get(&id) {
                stack.extend(kids.iter().rev().map(|k| (*k, depth + 1)));
            }
        }
        rows
    }

    /// Ids that sit on a parent loop, which a healthy database never has.
    pub fn cycles(&self) -> Vec<i64> {
        self.by_id
            .keys()
            .copied()
            .filter(|id| self.on_cycle(*id))
            .collect()
    }

    pub fn check_reparent(&self, id: i64, new_parent: Option<i64>) -> Result<()> {
        let child = self
            .get(id)
            .ok_or_else(|| FinanceError::CategoryNotFound(id.to_string()))?;
        let Some(parent_id) = new_parent else {
            return Ok(());
        };
        let parent = self
            .get(parent_id)
            .ok_or_else(|| FinanceError::CategoryNotFound(parent_id.to_string()))?;
        if parent_id == id || self.ancestors(parent_id).iter().any(|a| a.id == id) {
            return Err(FinanceError::CategoryCycle {
                child: child.name.clone(),
                parent: parent.name.clone(),
            });
        }
        Ok(())
    }

    /// A category can go only when it has no children and nothing references it.
    pub fn check_delete(
        &self,
        id: i64,
        referencing_transactions: i64,
        referencing_budgets: i64,
    ) -> Result<()> {
        let category = self
            .get(id)
            .ok_or_else(|| FinanceError::CategoryNotFound(id.to_string()))?;
        if self.children.get(&id).is_some_and(|k| !k.is_empty()) {
            return Err(FinanceError::CategoryHasChildren(category.name.clone()));
        }
        if referencing_transactions > 0 {
            return Err(FinanceError::CategoryInUse {
                name: category.name.clone(),
                count: referencing_transactions,
            });
        }
        if referencing_budgets > 0 {
            return Err(FinanceError::CategoryHasBudgets {
                name: category.name.clone(),
                count: referencing_budgets,
            });
        }
        Ok(())
    }

    fn on_cycle(&self, id: i64) -> bool {
        let mut seen = HashSet::new();
        let mut current = self.get(id).and_then(|c| c.parent_id);
        while let Some(parent_id) = current {
            if parent_id == id {
                return true;
            }
            if !seen.insert(parent_id) {
                return false;
            }
            current = self.get(parent_id).and_then(|c| c.parent_id);
        }
        false
    }
}

fn name_of<'c>(by_id: &BTreeMap<i64, &'c Category>, id: i64) -> &'c str {
    by_id.get(&id).map(|c| c.name.as_str()).unwrap_or("")
}
