// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_accounts;
use crate::utils::{arg, id_for_account, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?.trim();
            let typ = arg(sub, "type")?.trim();
            let ccy = arg(sub, "currency")?.trim().to_uppercase();
            conn.execute(
                "INSERT INTO accounts(name, type, currency) VALUES (?1, ?2, ?3)",
                params![name, typ, ccy],
            )?;
            tracing::info!(name, "account created");
            println!("Added account '{}' ({}, {})", name, typ, ccy);
        }
        Some(("list", sub)) => {
            let accounts = load_accounts(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
                let data = accounts
                    .into_iter()
                    .map(|a| vec![a.id.to_string(), a.name, a.r#type, a.currency])
                    .collect();
                println!("{}", pretty_table(&["ID", "Name", "Type", "Currency"], data));
            }
        }
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?.trim();
            let id = id_for_account(conn, name)?;
            conn.execute("DELETE FROM accounts WHERE id=?1", params![id])?;
            println!("Removed account '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
