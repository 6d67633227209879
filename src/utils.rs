// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::error::FinanceError;

/// Required argument lookup; clap enforces presence, this keeps the handlers panic-free.
pub fn arg<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("Missing argument '{}'", name))
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// `YYYY-MM` into `(year, month)`.
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let d = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok((chrono::Datelike::year(&d), chrono::Datelike::month(&d)))
}

/// Time of day as `HH:MM` or `HH:MM:SS`; missing means midnight.
pub fn parse_time(s: Option<&str>) -> Result<NaiveTime> {
    match s.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(NaiveTime::MIN),
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
            .with_context(|| format!("Invalid time '{}', expected HH:MM[:SS]", t)),
    }
}

pub fn parse_datetime(date: NaiveDate, time: Option<&str>) -> Result<NaiveDateTime> {
    Ok(date.and_time(parse_time(time)?))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn id_for_account(conn: &Connection, name: &str) -> Result<i64> {
    let id: Option<i64> = conn
        .query_row("SELECT id FROM accounts WHERE name=?1", params![name], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(id.ok_or_else(|| FinanceError::AccountNotFound(name.to_string()))?)
}

pub fn id_for_category(conn: &Connection, name: &str) -> Result<i64> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM categories WHERE name=?1",
            params![name],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id.ok_or_else(|| FinanceError::CategoryNotFound(name.to_string()))?)
}

pub fn id_for_budget(conn: &Connection, name: &str) -> Result<i64> {
    let id: Option<i64> = conn
        .query_row("SELECT id FROM budgets WHERE name=?1", params![name], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(id.ok_or_else(|| FinanceError::BudgetNotFound(name.to_string()))?)
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Runs the categorization rules, newest first, against the description.
/// Returns the category and description rewrite of the first matching rule.
pub fn apply_import_rules(
    conn: &Connection,
    description: &str,
) -> Result<(Option<i64>, Option<String>)> {
    let mut stmt = conn.prepare(
        "SELECT id, pattern, category_id, description_rewrite FROM rules ORDER BY id DESC",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let pat: String = r.get(1)?;
        let cat: Option<i64> = r.get(2)?;
        let rewrite: Option<String> = r.get(3)?;
        match Regex::new(&pat) {
            Ok(re) if re.is_match(description) => return Ok((cat, rewrite)),
            Ok(_) => {}
            Err(e) => tracing::warn!(rule = id, error = %e, "skipping rule with invalid pattern"),
        }
    }
    Ok((None, None))
}
