// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::DuplicateDetector;
use crate::db::{insert_category, insert_transaction, load_transactions};
use crate::models::{CategoryKind, Transaction, TransactionKind};
use crate::settings::Settings;
use crate::utils::{apply_import_rules, arg, id_for_account, maybe_print_json, parse_decimal, parse_time};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, hash_map::Entry};
use std::path::Path;
use tracing::{info, instrument, warn};

/// One CSV row. Columns other than `date` and `amount` may be absent.
#[derive(Debug, Deserialize)]
struct ImportRow {
    date: String,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    amount: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    account: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
    pub error_details: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub date_format: String,
    pub keep_duplicates: bool,
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let path = arg(sub, "path")?.trim().to_string();
            let settings = Settings::load(conn)?;
            let opts = ImportOptions {
                date_format: sub
                    .get_one::<String>("date-format")
                    .cloned()
                    .unwrap_or(settings.date_format),
                keep_duplicates: sub.get_flag("keep-duplicates"),
            };
            let report = import_transactions(conn, Path::new(&path), &opts)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
                println!(
                    "Imported {} transaction(s) from {}: {} duplicate(s) skipped, {} error(s)",
                    report.imported, path, report.skipped, report.errors
                );
                for detail in &report.error_details {
                    println!("  {}", detail);
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Imports every row it can. Unparseable rows are counted and reported, not fatal.
/// Duplicates are checked against the ledger as it was before the import.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn import_transactions(
    conn: &mut Connection,
    path: &Path,
    opts: &ImportOptions,
) -> Result<ImportReport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;

    let existing = load_transactions(conn, None)?;
    let detector = DuplicateDetector::new(&existing);
    let mut report = ImportReport::default();
    let mut account_cache: HashMap<String, i64> = HashMap::new();
    let mut category_cache: HashMap<String, i64> = HashMap::new();

    let db_tx = conn.transaction()?;
    for (index, result) in rdr.deserialize::<ImportRow>().enumerate() {
        // header is line 1
        let line = index + 2;
        let outcome = result
            .context("Malformed row")
            .and_then(|row| {
                build_transaction(&db_tx, row, opts, &mut account_cache, &mut category_cache)
            });
        let tx = match outcome {
            Ok(tx) => tx,
            Err(e) => {
                warn!(line, error = %e, "skipping row");
                report.errors += 1;
                report.error_details.push(format!("line {}: {:#}", line, e));
                continue;
            }
        };
        if !opts.keep_duplicates && detector.is_duplicate(&tx) {
            report.skipped += 1;
            continue;
        }
        match insert_transaction(&db_tx, &tx) {
            Ok(_) => report.imported += 1,
            Err(e) => {
                warn!(line, error = %e, "insert failed");
                report.errors += 1;
                report.error_details.push(format!("line {}: {:#}", line, e));
            }
        }
    }
    db_tx.commit()?;
    info!(
        imported = report.imported,
        skipped = report.skipped,
        errors = report.errors,
        "import finished"
    );
    Ok(report)
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn build_transaction(
    conn: &Connection,
    row: ImportRow,
    opts: &ImportOptions,
    account_cache: &mut HashMap<String, i64>,
    category_cache: &mut HashMap<String, i64>,
) -> Result<Transaction> {
    let date = NaiveDate::parse_from_str(row.date.trim(), &opts.date_format).with_context(|| {
        format!(
            "Invalid date '{}' for format '{}'",
            row.date, opts.date_format
        )
    })?;
    let occurred_at = date.and_time(parse_time(row.time.as_deref())?);
    let raw_amount = parse_decimal(&row.amount)?;
    // Without a kind column the sign decides
    let kind = match non_empty(row.kind) {
        Some(k) => k.parse::<TransactionKind>()?,
        None if raw_amount < Decimal::ZERO => TransactionKind::Expense,
        None => TransactionKind::Income,
    };
    let amount = raw_amount.abs();

    let account_id = match non_empty(row.account) {
        Some(name) => Some(match account_cache.entry(name) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let id = id_for_account(conn, e.key())?;
                *e.insert(id)
            }
        }),
        None => None,
    };

    let mut description = non_empty(row.description);
    let mut category_id = match non_empty(row.category) {
        Some(name) => Some(category_for_import(conn, name, kind, category_cache)?),
        None => None,
    };
    if let Some(desc) = description.clone() {
        let (rule_cat, rewrite) = apply_import_rules(conn, &desc)?;
        if category_id.is_none() {
            category_id = rule_cat;
        }
        if let Some(newd) = rewrite.filter(|n| n != &desc) {
            description = Some(newd);
        }
    }

    let mut tx = Transaction::new(kind, amount, occurred_at)
        .with_category(category_id)
        .with_account(account_id);
    tx.description = description;
    tx.tags = non_empty(row.tags)
        .map(|t| {
            t.split(['|', ','])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Ok(tx)
}

/// Looks a category up by name, creating it with the row's kind when missing.
fn category_for_import(
    conn: &Connection,
    name: String,
    kind: TransactionKind,
    cache: &mut HashMap<String, i64>,
) -> Result<i64> {
    match cache.entry(name) {
        Entry::Occupied(e) => Ok(*e.get()),
        Entry::Vacant(e) => {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT id FROM categories WHERE name=?1",
                    params![e.key()],
                    |r| r.get(0),
                )
                .optional()?;
            let id = match found {
                Some(id) => id,
                None => insert_category(conn, e.key(), CategoryKind::from(kind), None)?,
            };
            Ok(*e.insert(id))
        }
    }
}
