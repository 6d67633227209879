// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{DATETIME_FORMAT, load_accounts, load_categories, load_transactions};
use crate::utils::arg;
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

/// Flat export record; the CSV columns match what `import transactions` reads.
#[derive(Debug, Serialize)]
struct ExportRow {
    id: Option<i64>,
    date: String,
    time: String,
    kind: &'static str,
    amount: String,
    category: String,
    description: String,
    tags: String,
    account: String,
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = arg(sub, "format")?.trim().to_lowercase();
    let out = arg(sub, "out")?.trim();

    let categories: HashMap<i64, String> = load_categories(conn)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let accounts: HashMap<i64, String> = load_accounts(conn)?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let lookup = |map: &HashMap<i64, String>, id: Option<i64>| {
        id.and_then(|i| map.get(&i).cloned()).unwrap_or_default()
    };

    let rows: Vec<ExportRow> = load_transactions(conn, None)?
        .into_iter()
        .map(|t| {
            let stamp = t.occurred_at.format(DATETIME_FORMAT).to_string();
            let (date, time) = stamp.split_at(10);
            ExportRow {
                id: t.id,
                date: date.to_string(),
                time: time.trim().to_string(),
                kind: t.kind.as_str(),
                amount: t.amount.to_string(),
                category: lookup(&categories, t.category_id),
                description: t.description.clone().unwrap_or_default(),
                tags: t.tags.join("|"),
                account: lookup(&accounts, t.account_id),
            }
        })
        .collect();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    tracing::info!(count = rows.len(), out, "export written");
    println!("Exported {} transaction(s) to {}", rows.len(), out);
    Ok(())
}
