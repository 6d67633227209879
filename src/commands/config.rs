// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings::Settings;
use crate::utils::{arg, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = arg(sub, "key")?.trim();
            println!("{}", Settings::load(conn)?.get(key)?);
        }
        Some(("set", sub)) => {
            let key = arg(sub, "key")?.trim();
            let settings = Settings::set(conn, key, arg(sub, "value")?)?;
            println!("{} = {}", key, settings.get(key)?);
        }
        Some(("list", sub)) => {
            let settings = Settings::load(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &settings)? {
                let data = settings
                    .entries()?
                    .into_iter()
                    .map(|(k, v)| vec![k.to_string(), v])
                    .collect();
                println!("{}", pretty_table(&["Key", "Value"], data));
            }
        }
        _ => {}
    }
    Ok(())
}
