// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::insert_transaction;
use crate::models::{Transaction, TransactionKind};
use crate::utils::{
    apply_import_rules, arg, id_for_account, id_for_category, maybe_print_json, parse_date,
    parse_datetime, parse_decimal, parse_month, pretty_table,
};
use anyhow::{Result, bail};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("search", sub)) => search(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(arg(sub, "date")?.trim())?;
    let occurred_at = parse_datetime(date, sub.get_one::<String>("time").map(String::as_str))?;
    let kind: TransactionKind = arg(sub, "kind")?.parse()?;
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let mut description = sub
        .get_one::<String>("description")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let account_id = match sub.get_one::<String>("account") {
        Some(a) => Some(id_for_account(conn, a.trim())?),
        None => None,
    };
    let mut category_id = match sub.get_one::<String>("category") {
        Some(c) => Some(id_for_category(conn, c.trim())?),
        None => None,
    };

    if category_id.is_none() {
        if let Some(desc) = description.as_deref() {
            let (rule_cat, rewrite) = apply_import_rules(conn, desc)?;
            category_id = rule_cat;
            if let Some(newd) = rewrite {
                println!("Description rewritten: {} -> {}", desc, newd);
                description = Some(newd);
            }
        }
    }

    let mut tx = Transaction::new(kind, amount, occurred_at)
        .with_category(category_id)
        .with_account(account_id);
    tx.description = description;
    tx.tags = sub
        .get_one::<String>("tags")
        .map(|t| {
            t.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let id = insert_transaction(conn, &tx)?;
    println!("Recorded {} {} on {} (id {})", kind, amount, date, id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    print_rows(sub, &data)
}

fn search(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let term = arg(sub, "term")?.trim();
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(SEARCH_LIMIT);
    let data = search_rows(conn, term, limit)?;
    print_rows(sub, &data)
}

fn print_rows(sub: &clap::ArgMatches, data: &[TransactionRow]) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.occurred_at.clone(),
                    r.kind.clone(),
                    r.amount.clone(),
                    r.account.clone(),
                    r.category.clone(),
                    r.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "When", "Kind", "Amount", "Account", "Category", "Description"],
                rows,
            )
        );
    }
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = arg(sub, "id")?.trim().parse()?;
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if n == 0 {
        bail!("Transaction {} not found", id);
    }
    tracing::info!(id, "transaction removed");
    println!("Removed transaction {}", id);
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub occurred_at: String,
    pub kind: String,
    pub amount: String,
    pub account: String,
    pub category: String,
    pub description: String,
    pub tags: String,
}

const SEARCH_LIMIT: usize = 50;

const SELECT_ROWS: &str = "SELECT t.id, t.occurred_at, t.kind, t.amount, a.name, c.name, t.description, t.tags FROM transactions t LEFT JOIN accounts a ON t.account_id=a.id LEFT JOIN categories c ON t.category_id=c.id";

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let mut sql = format!("{} WHERE 1=1", SELECT_ROWS);
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(month) = sub.get_one::<String>("month") {
        let (year, month) = parse_month(month.trim())?;
        sql.push_str(" AND substr(t.occurred_at,1,7)=?");
        params_vec.push(format!("{:04}-{:02}", year, month));
    }
    if let Some(from) = sub.get_one::<String>("from") {
        sql.push_str(" AND substr(t.occurred_at,1,10)>=?");
        params_vec.push(parse_date(from.trim())?.to_string());
    }
    if let Some(to) = sub.get_one::<String>("to") {
        sql.push_str(" AND substr(t.occurred_at,1,10)<=?");
        params_vec.push(parse_date(to.trim())?.to_string());
    }
    if let Some(acct) = sub.get_one::<String>("account") {
        sql.push_str(" AND a.name=?");
        params_vec.push(acct.trim().into());
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        sql.push_str(" AND c.name=?");
        params_vec.push(cat.trim().into());
    }
    sql.push_str(" ORDER BY t.occurred_at DESC, t.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    fetch_rows(conn, &sql, &params_vec)
}

/// Newest transactions whose description contains `term`, ignoring ASCII case.
pub fn search_rows(conn: &Connection, term: &str, limit: usize) -> Result<Vec<TransactionRow>> {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    let sql = format!(
        "{} WHERE t.description LIKE ? ESCAPE '\\' ORDER BY t.occurred_at DESC, t.id DESC LIMIT ?",
        SELECT_ROWS
    );
    fetch_rows(conn, &sql, &[format!("%{}%", escaped), limit.to_string()])
}

fn fetch_rows(conn: &Connection, sql: &str, params_vec: &[String]) -> Result<Vec<TransactionRow>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let account: Option<String> = r.get(4)?;
        let category: Option<String> = r.get(5)?;
        let description: Option<String> = r.get(6)?;
        data.push(TransactionRow {
            id: r.get(0)?,
            occurred_at: r.get(1)?,
            kind: r.get(2)?,
            amount: r.get(3)?,
            account: account.unwrap_or_default(),
            category: category.unwrap_or_default(),
            description: description.unwrap_or_default(),
            tags: r.get(7)?,
        });
    }
    Ok(data)
}
