// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_categories;
use crate::hierarchy::CategoryForest;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

/// Ledger problems as `(issue, detail)` pairs; empty when healthy.
pub fn diagnose(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut rows = Vec::new();

    // 1) Negative amounts; direction belongs in kind
    let mut stmt = conn.prepare(
        "SELECT id, amount FROM transactions WHERE CAST(amount AS REAL) < 0 ORDER BY id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let amount: String = r.get(1)?;
        rows.push(("negative_amount".into(), format!("tx {} amount {}", id, amount)));
    }

    // 2) Dangling category references
    let mut stmt = conn.prepare(
        "SELECT t.id, t.category_id FROM transactions t
         LEFT JOIN categories c ON c.id=t.category_id
         WHERE t.category_id IS NOT NULL AND c.id IS NULL ORDER BY t.id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let cat: i64 = r.get(1)?;
        rows.push(("unknown_category".into(), format!("tx {} -> category {}", id, cat)));
    }

    // 3) Parent loops in the category tree
    let categories = load_categories(conn)?;
    let forest = CategoryForest::new(&categories);
    for id in forest.cycles() {
        let name = forest.get(id).map(|c| c.name.clone()).unwrap_or_default();
        rows.push(("category_cycle".into(), format!("{} (id {})", name, id)));
    }

    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = diagnose(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        let data = rows.into_iter().map(|(issue, detail)| vec![issue, detail]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], data));
    }
    Ok(())
}
