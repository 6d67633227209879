// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::models::{Account, Budget, BudgetPeriod, Category, CategoryKind, Transaction};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.pennywise", "Pennywise", "pennywise"));

/// Overrides the database location, e.g. for scratch ledgers.
pub const DB_ENV: &str = "PENNYWISE_DB";

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn db_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("pennywise.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        type TEXT NOT NULL,
        currency TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        kind TEXT NOT NULL DEFAULT 'expense' CHECK(kind IN ('income','expense','both')),
        parent_id INTEGER,
        is_active INTEGER NOT NULL DEFAULT 1,
        FOREIGN KEY(parent_id) REFERENCES categories(id)
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        occurred_at TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('income','expense','transfer')),
        amount TEXT NOT NULL,
        category_id INTEGER,
        account_id INTEGER,
        description TEXT,
        tags TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE SET NULL,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_occurred ON transactions(occurred_at);

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        category_id INTEGER,
        amount TEXT NOT NULL,
        period TEXT NOT NULL CHECK(period IN ('daily','weekly','monthly','yearly')),
        start_date TEXT NOT NULL,
        end_date TEXT,
        alert_threshold TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        FOREIGN KEY(category_id) REFERENCES categories(id)
    );

    CREATE TABLE IF NOT EXISTS rules(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pattern TEXT NOT NULL,
        category_id INTEGER,
        description_rewrite TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );
    "#,
    )?;
    Ok(())
}

fn parse_stored_decimal(raw: &str, column: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .with_context(|| format!("Corrupt {} value '{}'", column, raw))
}

fn parse_stored_date(raw: &str, column: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Corrupt {} value '{}'", column, raw))
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

type TransactionRow = (
    i64,
    String,
    String,
    String,
    Option<i64>,
    Option<i64>,
    Option<String>,
    String,
);

/// Loads transactions ordered by time, optionally restricted to an inclusive date range.
pub fn load_transactions(
    conn: &Connection,
    window: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<Transaction>> {
    let mut sql = String::from(
        "SELECT id, occurred_at, kind, amount, category_id, account_id, description, tags FROM transactions",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some((start, end)) = window {
        sql.push_str(" WHERE substr(occurred_at,1,10) BETWEEN ?1 AND ?2");
        params_vec.push(start.to_string());
        params_vec.push(end.to_string());
    }
    sql.push_str(" ORDER BY occurred_at, id");

    let mut stmt = conn.prepare(&sql)?;
    let raw = stmt
        .query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
            Ok((
                r.get(0)?,
                r.get(1)?,
                r.get(2)?,
                r.get(3)?,
                r.get(4)?,
                r.get(5)?,
                r.get(6)?,
                r.get(7)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<TransactionRow>>>()?;

    let mut out = Vec::with_capacity(raw.len());
    for (id, occurred_at, kind, amount, category_id, account_id, description, tags) in raw {
        let occurred_at = NaiveDateTime::parse_from_str(&occurred_at, DATETIME_FORMAT)
            .with_context(|| format!("Corrupt occurred_at '{}' on transaction {}", occurred_at, id))?;
        out.push(Transaction {
            id: Some(id),
            amount: parse_stored_decimal(&amount, "amount")?,
            kind: kind.parse()?,
            category_id,
            account_id,
            occurred_at,
            description,
            tags: split_tags(&tags),
        });
    }
    debug!(count = out.len(), "transactions loaded");
    Ok(out)
}

pub fn insert_transaction(conn: &Connection, tx: &Transaction) -> Result<i64> {
    tx.validate()?;
    conn.execute(
        "INSERT INTO transactions(occurred_at, kind, amount, category_id, account_id, description, tags)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            tx.occurred_at.format(DATETIME_FORMAT).to_string(),
            tx.kind.as_str(),
            tx.amount.to_string(),
            tx.category_id,
            tx.account_id,
            tx.description,
            tx.tags.join(","),
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, kind = tx.kind.as_str(), amount = %tx.amount, "transaction recorded");
    Ok(id)
}

pub fn load_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT id, name, kind, parent_id, is_active FROM categories ORDER BY name")?;
    let raw = stmt
        .query_map([], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, Option<i64>>(3)?,
                r.get::<_, bool>(4)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    raw.into_iter()
        .map(|(id, name, kind, parent_id, is_active)| {
            Ok(Category {
                id,
                name,
                kind: kind.parse::<CategoryKind>()?,
                parent_id,
                is_active,
            })
        })
        .collect()
}

pub fn insert_category(
    conn: &Connection,
    name: &str,
    kind: CategoryKind,
    parent_id: Option<i64>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO categories(name, kind, parent_id) VALUES (?1, ?2, ?3)",
        params![name, kind.as_str(), parent_id],
    )
    .with_context(|| format!("Insert category '{}'", name))?;
    let id = conn.last_insert_rowid();
    info!(id, name, "category created");
    Ok(id)
}

pub fn count_category_transactions(conn: &Connection, category_id: i64) -> Result<i64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE category_id=?1",
        params![category_id],
        |r| r.get(0),
    )?;
    Ok(n)
}

pub fn count_category_budgets(conn: &Connection, category_id: i64) -> Result<i64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM budgets WHERE category_id=?1",
        params![category_id],
        |r| r.get(0),
    )?;
    Ok(n)
}

type BudgetRow = (
    i64,
    String,
    Option<i64>,
    String,
    String,
    String,
    Option<String>,
    String,
    bool,
);

pub fn load_budgets(conn: &Connection) -> Result<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, category_id, amount, period, start_date, end_date, alert_threshold, is_active
         FROM budgets ORDER BY name",
    )?;
    let raw = stmt
        .query_map([], |r| {
            Ok((
                r.get(0)?,
                r.get(1)?,
                r.get(2)?,
                r.get(3)?,
                r.get(4)?,
                r.get(5)?,
                r.get(6)?,
                r.get(7)?,
                r.get(8)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<BudgetRow>>>()?;

    let mut out = Vec::with_capacity(raw.len());
    for (id, name, category_id, amount, period, start, end, threshold, is_active) in raw {
        out.push(Budget {
            id: Some(id),
            name,
            category_id,
            amount: parse_stored_decimal(&amount, "budget amount")?,
            period: period.parse::<BudgetPeriod>()?,
            start_date: parse_stored_date(&start, "start_date")?,
            end_date: end
                .as_deref()
                .map(|e| parse_stored_date(e, "end_date"))
                .transpose()?,
            alert_threshold: parse_stored_decimal(&threshold, "alert_threshold")?,
            is_active,
        });
    }
    Ok(out)
}

pub fn insert_budget(conn: &Connection, budget: &Budget) -> Result<i64> {
    budget.validate()?;
    conn.execute(
        "INSERT INTO budgets(name, category_id, amount, period, start_date, end_date, alert_threshold, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            budget.name,
            budget.category_id,
            budget.amount.to_string(),
            budget.period.as_str(),
            budget.start_date.to_string(),
            budget.end_date.map(|d| d.to_string()),
            budget.alert_threshold.to_string(),
            budget.is_active,
        ],
    )
    .with_context(|| format!("Insert budget '{}'", budget.name))?;
    let id = conn.last_insert_rowid();
    info!(id, name = %budget.name, "budget created");
    Ok(id)
}

/// Rewrites every column of a stored budget, keyed by its id.
pub fn update_budget(conn: &Connection, budget: &Budget) -> Result<()> {
    budget.validate()?;
    let id = budget
        .id
        .with_context(|| format!("Budget '{}' has no id", budget.name))?;
    conn.execute(
        "UPDATE budgets SET name=?1, category_id=?2, amount=?3, period=?4, start_date=?5,
         end_date=?6, alert_threshold=?7, is_active=?8 WHERE id=?9",
        params![
            budget.name,
            budget.category_id,
            budget.amount.to_string(),
            budget.period.as_str(),
            budget.start_date.to_string(),
            budget.end_date.map(|d| d.to_string()),
            budget.alert_threshold.to_string(),
            budget.is_active,
            id,
        ],
    )
    .with_context(|| format!("Update budget '{}'", budget.name))?;
    info!(id, name = %budget.name, active = budget.is_active, "budget updated");
    Ok(())
}

pub fn load_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare("SELECT id, name, type, currency FROM accounts ORDER BY name")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(Account {
                id: r.get(0)?,
                name: r.get(1)?,
                r#type: r.get(2)?,
                currency: r.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn put_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}
