// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::{BalanceCalculator, BalanceHistoryEntry, CategoryKey, StatisticsCalculator};
use crate::db::{load_categories, load_transactions};
use crate::settings::Settings;
use crate::utils::{
    arg, fmt_money, id_for_account, maybe_print_json, parse_date, parse_month, pretty_table,
};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balance", sub)) => balance(conn, sub)?,
        Some(("history", sub)) => history(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("trend", sub)) => trend(conn, sub)?,
        Some(("categories", sub)) => categories(conn, sub)?,
        Some(("patterns", sub)) => patterns(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn json_flags(sub: &clap::ArgMatches) -> (bool, bool) {
    (sub.get_flag("json"), sub.get_flag("jsonl"))
}

fn account_filter(conn: &Connection, sub: &clap::ArgMatches) -> Result<Option<i64>> {
    match sub.get_one::<String>("account") {
        Some(a) => Ok(Some(id_for_account(conn, a.trim())?)),
        None => Ok(None),
    }
}

fn category_label(names: &HashMap<i64, String>, key: CategoryKey) -> String {
    match key {
        CategoryKey::Id(id) => names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("#{}", id)),
        CategoryKey::Uncategorized => key.to_string(),
    }
}

fn balance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let as_of = sub
        .get_one::<String>("as-of")
        .map(|s| parse_date(s.trim()))
        .transpose()?;
    let account = account_filter(conn, sub)?;
    let txs = load_transactions(conn, None)?;
    let balance = BalanceCalculator::new(&txs).calculate_balance(as_of, account);
    let low = balance < settings.low_balance_threshold;
    let (json_flag, jsonl_flag) = json_flags(sub);
    let out = json!({
        "as_of": as_of.unwrap_or_else(crate::calc::today),
        "balance": balance,
        "currency": settings.currency,
        "below_low_balance_threshold": low,
    });
    if !maybe_print_json(json_flag, jsonl_flag, &out)? {
        println!("Balance: {}", fmt_money(&balance, &settings.currency));
        if low {
            println!(
                "Warning: balance is below the low-balance threshold of {}",
                fmt_money(&settings.low_balance_threshold, &settings.currency)
            );
        }
    }
    Ok(())
}

fn history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let start = parse_date(arg(sub, "from")?.trim())?;
    let end = parse_date(arg(sub, "to")?.trim())?;
    let account = account_filter(conn, sub)?;
    let txs = load_transactions(conn, None)?;
    let history = BalanceCalculator::new(&txs).balance_history(start, end, account);
    let entries: Vec<BalanceHistoryEntry> = history.iter().collect();
    let (json_flag, jsonl_flag) = json_flags(sub);
    if !maybe_print_json(json_flag, jsonl_flag, &entries)? {
        let data = entries
            .into_iter()
            .map(|e| {
                vec![
                    e.date.to_string(),
                    e.transaction_id.map(|i| i.to_string()).unwrap_or_default(),
                    e.kind.to_string(),
                    format!("{:.2}", e.amount),
                    format!("{:.2}", e.balance),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Tx", "Kind", "Amount", "Balance"], data)
        );
    }
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let txs = load_transactions(conn, None)?;
    let stats = StatisticsCalculator::new(&txs);
    let summary = if let Some(month) = sub.get_one::<String>("month") {
        let (year, month) = parse_month(month.trim())?;
        stats.monthly_summary(year, month)?
    } else if let Some(year) = sub.get_one::<i32>("year") {
        stats.yearly_summary(*year)?
    } else if let Some(from) = sub.get_one::<String>("from") {
        let start = parse_date(from.trim())?;
        let end = match sub.get_one::<String>("to") {
            Some(to) => parse_date(to.trim())?,
            None => crate::calc::today(),
        };
        stats.period_summary(start, end)
    } else {
        bail!("Pass one of --month, --year or --from/--to");
    };
    let (json_flag, jsonl_flag) = json_flags(sub);
    if !maybe_print_json(json_flag, jsonl_flag, &summary)? {
        let data = vec![
            vec!["Period".into(), format!("{} .. {}", summary.period.start_date, summary.period.end_date)],
            vec!["Income".into(), format!("{:.2}", summary.total_income)],
            vec!["Expenses".into(), format!("{:.2}", summary.total_expenses)],
            vec!["Net".into(), format!("{:.2}", summary.net_income)],
            vec!["Transactions".into(), summary.transaction_count.to_string()],
            vec!["Average".into(), format!("{:.2}", summary.average_transaction)],
        ];
        println!("{}", pretty_table(&["Metric", "Value"], data));
    }
    Ok(())
}

fn trend(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let months = sub.get_one::<u32>("months").copied().unwrap_or(12);
    let txs = load_transactions(conn, None)?;
    let analysis = StatisticsCalculator::new(&txs).trend_analysis(months)?;
    let (json_flag, jsonl_flag) = json_flags(sub);
    if maybe_print_json(json_flag, jsonl_flag, &analysis)? {
        return Ok(());
    }
    let data = analysis
        .monthly_data
        .iter()
        .map(|m| {
            vec![
                format!("{:04}-{:02}", m.year, m.month),
                format!("{:.2}", m.income),
                format!("{:.2}", m.expenses),
                format!("{:.2}", m.net_income),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Month", "Income", "Expenses", "Net"], data));
    let t = &analysis.trends;
    let rows = [("Income", &t.income), ("Expenses", &t.expenses), ("Net", &t.net_income)]
        .into_iter()
        .map(|(label, trend)| {
            vec![
                label.to_string(),
                trend.direction.as_str().to_string(),
                format!("{:.1}%", trend.percentage),
                format!("{:.2}", trend.slope),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Series", "Direction", "Change", "Slope"], rows));
    Ok(())
}

fn categories(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let start = parse_date(arg(sub, "from")?.trim())?;
    let end = parse_date(arg(sub, "to")?.trim())?;
    let txs = load_transactions(conn, Some((start, end)))?;
    let analysis = StatisticsCalculator::new(&txs).category_analysis(start, end);
    let (json_flag, jsonl_flag) = json_flags(sub);
    if maybe_print_json(json_flag, jsonl_flag, &analysis)? {
        return Ok(());
    }
    let names: HashMap<i64, String> = load_categories(conn)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let data = analysis
        .categories
        .into_iter()
        .map(|c| {
            vec![
                category_label(&names, c.category_id),
                format!("{:.2}", c.income),
                format!("{:.2}", c.expense),
                format!("{:.2}", c.net),
                c.transaction_count.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Income", "Expense", "Net", "Count"], data)
    );
    Ok(())
}

fn patterns(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let days = sub.get_one::<u32>("days").copied().unwrap_or(30);
    let txs = load_transactions(conn, None)?;
    let patterns = StatisticsCalculator::new(&txs).spending_patterns(days);
    let (json_flag, jsonl_flag) = json_flags(sub);
    if maybe_print_json(json_flag, jsonl_flag, &patterns)? {
        return Ok(());
    }
    let weekdays = patterns
        .weekday_analysis
        .iter()
        .map(|w| {
            vec![
                w.weekday.to_string(),
                format!("{:.2}", w.amount),
                w.count.to_string(),
                format!("{:.2}", w.average),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Weekday", "Amount", "Count", "Average"], weekdays));
    let times = patterns
        .time_analysis
        .iter()
        .map(|t| {
            vec![
                t.time_of_day.as_str().to_string(),
                format!("{:.2}", t.amount),
                t.count.to_string(),
                format!("{:.2}", t.average),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Time", "Amount", "Count", "Average"], times));
    let buckets = patterns
        .amount_analysis
        .iter()
        .map(|b| {
            vec![
                b.bucket.as_str().to_string(),
                format!("{:.2}", b.amount),
                b.count.to_string(),
                format!("{:.1}%", b.percentage),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Size", "Amount", "Count", "Share"], buckets));
    Ok(())
}
