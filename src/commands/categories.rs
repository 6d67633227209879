// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{
    count_category_budgets, count_category_transactions, insert_category, load_categories,
    load_transactions,
};
use crate::hierarchy::CategoryForest;
use crate::models::{CategoryKind, TransactionKind};
use crate::utils::{arg, id_for_category, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct KindUsage {
    pub kind: TransactionKind,
    pub count: usize,
    pub total_amount: Decimal,
}

/// How much a category is used, split by transaction kind.
#[derive(Debug, Serialize)]
pub struct CategoryUsage {
    pub category_id: i64,
    pub category: String,
    pub transaction_count: usize,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub by_kind: Vec<KindUsage>,
}

#[derive(Serialize)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub kind: CategoryKind,
    pub parent: Option<String>,
    pub depth: usize,
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?.trim();
            let kind: CategoryKind = arg(sub, "kind")?.parse()?;
            let parent_id = match sub.get_one::<String>("parent") {
                Some(p) => Some(id_for_category(conn, p.trim())?),
                None => None,
            };
            insert_category(conn, name, kind, parent_id)?;
            println!("Added category '{}'", name);
        }
        Some(("list", sub)) => {
            let rows = tree_rows(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
                let data = rows
                    .into_iter()
                    .map(|r| {
                        vec![
                            format!("{}{}", "  ".repeat(r.depth), r.name),
                            r.kind.as_str().to_string(),
                            r.parent.unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Category", "Kind", "Parent"], data));
            }
        }
        Some(("move", sub)) => {
            let name = arg(sub, "name")?.trim();
            let id = id_for_category(conn, name)?;
            let parent_id = match sub.get_one::<String>("parent") {
                Some(p) => Some(id_for_category(conn, p.trim())?),
                None => None,
            };
            let categories = load_categories(conn)?;
            CategoryForest::new(&categories).check_reparent(id, parent_id)?;
            conn.execute(
                "UPDATE categories SET parent_id=?1 WHERE id=?2",
                params![parent_id, id],
            )?;
            println!("Moved category '{}'", name);
        }
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?.trim();
            let id = id_for_category(conn, name)?;
            let categories = load_categories(conn)?;
            let in_use = count_category_transactions(conn, id)?;
            let budgets = count_category_budgets(conn, id)?;
            CategoryForest::new(&categories).check_delete(id, in_use, budgets)?;
            conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
            println!("Removed category '{}'", name);
        }
        Some(("stats", sub)) => {
            let usage = usage_stats(conn, arg(sub, "name")?.trim())?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &usage)? {
                println!(
                    "{}: {} transaction(s), income {:.2}, expense {:.2}",
                    usage.category, usage.transaction_count, usage.total_income, usage.total_expense
                );
                let data = usage
                    .by_kind
                    .into_iter()
                    .map(|k| {
                        vec![
                            k.kind.to_string(),
                            k.count.to_string(),
                            format!("{:.2}", k.total_amount),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Kind", "Count", "Total"], data));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Transaction counts and totals recorded against the named category.
pub fn usage_stats(conn: &Connection, name: &str) -> Result<CategoryUsage> {
    let id = id_for_category(conn, name)?;
    let txs = load_transactions(conn, None)?;
    let mut by_kind = Vec::new();
    for kind in [
        TransactionKind::Income,
        TransactionKind::Expense,
        TransactionKind::Transfer,
    ] {
        let (count, total_amount) = txs
            .iter()
            .filter(|t| t.category_id == Some(id) && t.kind == kind)
            .fold((0, Decimal::ZERO), |(n, sum), t| (n + 1, sum + t.amount));
        if count > 0 {
            by_kind.push(KindUsage {
                kind,
                count,
                total_amount,
            });
        }
    }
    let total_of = |kind: TransactionKind| {
        by_kind
            .iter()
            .find(|k| k.kind == kind)
            .map_or(Decimal::ZERO, |k| k.total_amount)
    };
    Ok(CategoryUsage {
        category_id: id,
        category: name.to_string(),
        transaction_count: by_kind.iter().map(|k| k.count).sum(),
        total_income: total_of(TransactionKind::Income),
        total_expense: total_of(TransactionKind::Expense),
        by_kind,
    })
}

/// Categories in tree order with their depth.
pub fn tree_rows(conn: &Connection) -> Result<Vec<CategoryRow>> {
    let categories = load_categories(conn)?;
    let forest = CategoryForest::new(&categories);
    Ok(forest
        .depth_first()
        .into_iter()
        .map(|row| CategoryRow {
            id: row.category.id,
            name: row.category.name.clone(),
            kind: row.category.kind,
            parent: row
                .category
                .parent_id
                .and_then(|p| forest.get(p))
                .map(|p| p.name.clone()),
            depth: row.depth,
        })
        .collect())
}
