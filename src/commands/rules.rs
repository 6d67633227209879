// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{arg, id_for_category, maybe_print_json, pretty_table};
use anyhow::{Result, anyhow, bail};
use regex::Regex;
use rusqlite::{Connection, params};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RuleRow {
    pub id: i64,
    pub pattern: String,
    pub category: Option<String>,
    pub description_rewrite: Option<String>,
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let pattern = arg(sub, "pattern")?.trim();
            Regex::new(pattern)
                .map_err(|err| anyhow!("Invalid regex pattern '{}': {}", pattern, err))?;

            let cat = sub
                .get_one::<String>("category")
                .map(|s| s.trim())
                .filter(|s| !s.is_empty());
            let rewrite = sub
                .get_one::<String>("description_rewrite")
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string());
            if cat.is_none() && rewrite.is_none() {
                bail!("A rule needs --category, --description-rewrite or both");
            }
            let cat_id = match cat {
                Some(c) => Some(id_for_category(conn, c)?),
                None => None,
            };
            conn.execute(
                "INSERT INTO rules(pattern, category_id, description_rewrite) VALUES (?1,?2,?3)",
                params![pattern, cat_id, rewrite],
            )?;
            println!(
                "Added rule /{}/ -> category {}, rewrite {}",
                pattern,
                cat.unwrap_or("-"),
                rewrite.as_deref().unwrap_or("-")
            );
        }
        Some(("list", sub)) => {
            let data = list_rules(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.pattern,
                            r.category.unwrap_or_default(),
                            r.description_rewrite.unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Pattern", "Category", "Rewrite"], rows)
                );
            }
        }
        Some(("rm", sub)) => {
            let raw = arg(sub, "id")?;
            let id = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| anyhow!("Invalid rule id '{}'", raw.trim()))?;
            let n = conn.execute("DELETE FROM rules WHERE id=?1", params![id])?;
            if n == 0 {
                bail!("Rule {} not found", id);
            }
            println!("Removed rule {}", id);
        }
        _ => {}
    }
    Ok(())
}

/// Rules in evaluation order, newest first.
pub fn list_rules(conn: &Connection) -> Result<Vec<RuleRow>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.pattern, c.name, r.description_rewrite
         FROM rules r LEFT JOIN categories c ON c.id=r.category_id
         ORDER BY r.id DESC",
    )?;
    let rows = stmt
        .query_map([], |r| {
            Ok(RuleRow {
                id: r.get(0)?,
                pattern: r.get(1)?,
                category: r.get(2)?,
                description_rewrite: r.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
