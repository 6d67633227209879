// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::BudgetCalculator;
use crate::db::{insert_budget, load_budgets, load_categories, load_transactions, update_budget};
use crate::error::FinanceError;
use crate::models::{Budget, BudgetPeriod};
use crate::settings::Settings;
use crate::utils::{
    arg, id_for_budget, id_for_category, maybe_print_json, parse_date, parse_decimal, pretty_table,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use serde_json::json;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("deactivate", sub)) => set_active(conn, arg(sub, "name")?.trim(), false)?,
        Some(("activate", sub)) => set_active(conn, arg(sub, "name")?.trim(), true)?,
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?.trim();
            let id = id_for_budget(conn, name)?;
            conn.execute("DELETE FROM budgets WHERE id=?1", params![id])?;
            println!("Removed budget '{}'", name);
        }
        Some(("status", sub)) => status(conn, sub)?,
        Some(("alerts", sub)) => alerts(conn, sub)?,
        Some(("suggest", sub)) => suggest(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn optional_date(sub: &clap::ArgMatches, name: &str) -> Result<Option<NaiveDate>> {
    sub.get_one::<String>(name)
        .map(|s| parse_date(s.trim()))
        .transpose()
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let name = arg(sub, "name")?.trim();
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let period: BudgetPeriod = arg(sub, "period")?.parse()?;
    let category_id = match sub.get_one::<String>("category") {
        Some(c) => Some(id_for_category(conn, c.trim())?),
        None => None,
    };
    let start = optional_date(sub, "start")?.unwrap_or_else(crate::calc::today);
    let end = optional_date(sub, "end")?;
    let threshold = match sub.get_one::<String>("threshold") {
        Some(t) => parse_decimal(t)?,
        None => settings.alert_threshold,
    };

    let mut budget = Budget::new(name, amount, period, start)
        .with_category(category_id)
        .with_alert_threshold(threshold);
    budget.end_date = end;
    insert_budget(conn, &budget)?;
    println!(
        "Budget '{}' set: {} {} per {}",
        name, settings.currency, amount, period
    );
    Ok(())
}

fn find_budget(conn: &Connection, name: &str) -> Result<Budget> {
    let id = id_for_budget(conn, name)?;
    load_budgets(conn)?
        .into_iter()
        .find(|b| b.id == Some(id))
        .ok_or_else(|| FinanceError::BudgetNotFound(name.to_string()).into())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = arg(sub, "name")?.trim();
    let mut budget = find_budget(conn, name)?;
    if let Some(new_name) = sub.get_one::<String>("rename") {
        budget.name = new_name.trim().to_string();
    }
    if let Some(amount) = sub.get_one::<String>("amount") {
        budget.amount = parse_decimal(amount)?;
    }
    if let Some(period) = sub.get_one::<String>("period") {
        budget.period = period.parse()?;
    }
    if let Some(category) = sub.get_one::<String>("category") {
        budget.category_id = Some(id_for_category(conn, category.trim())?);
    } else if sub.get_flag("all-categories") {
        budget.category_id = None;
    }
    if let Some(start) = optional_date(sub, "start")? {
        budget.start_date = start;
    }
    if let Some(end) = optional_date(sub, "end")? {
        budget.end_date = Some(end);
    }
    if let Some(threshold) = sub.get_one::<String>("threshold") {
        budget.alert_threshold = parse_decimal(threshold)?;
    }
    if let Some(active) = sub.get_one::<bool>("active") {
        budget.is_active = *active;
    }
    update_budget(conn, &budget)?;
    println!("Updated budget '{}'", budget.name);
    Ok(())
}

fn set_active(conn: &Connection, name: &str, active: bool) -> Result<()> {
    let mut budget = find_budget(conn, name)?;
    budget.is_active = active;
    update_budget(conn, &budget)?;
    println!(
        "Budget '{}' {}",
        name,
        if active { "activated" } else { "deactivated" }
    );
    Ok(())
}

fn category_names(conn: &Connection) -> Result<HashMap<i64, String>> {
    Ok(load_categories(conn)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let budgets = load_budgets(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &budgets)? {
        return Ok(());
    }
    let names = category_names(conn)?;
    let data = budgets
        .into_iter()
        .map(|b| {
            vec![
                b.name,
                b.category_id
                    .and_then(|c| names.get(&c).cloned())
                    .unwrap_or_else(|| "(all)".into()),
                format!("{:.2}", b.amount),
                b.period.to_string(),
                b.start_date.to_string(),
                b.end_date.map(|d| d.to_string()).unwrap_or_default(),
                b.alert_threshold.to_string(),
                if b.is_active { "yes".into() } else { "no".into() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Name", "Category", "Amount", "Period", "Start", "End", "Alert", "Active"],
            data
        )
    );
    Ok(())
}

fn status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = optional_date(sub, "as-of")?;
    let budgets = load_budgets(conn)?;
    let txs = load_transactions(conn, None)?;
    let usage = BudgetCalculator::new(&budgets, &txs).all_budgets_status(as_of);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &usage)? {
        let data = usage
            .into_iter()
            .map(|u| {
                vec![
                    u.budget_name,
                    format!("{} .. {}", u.period_start, u.period_end),
                    format!("{:.2}", u.budget_amount),
                    format!("{:.2}", u.spent_amount),
                    format!("{:.2}", u.remaining_amount),
                    format!("{:.1}%", u.usage_percentage),
                    u.status.as_str().to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Budget", "Window", "Limit", "Spent", "Remaining", "Used", "Status"],
                data
            )
        );
    }
    Ok(())
}

fn alerts(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = optional_date(sub, "as-of")?;
    let budgets = load_budgets(conn)?;
    let txs = load_transactions(conn, None)?;
    let alerts = BudgetCalculator::new(&budgets, &txs).budget_alerts(as_of);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &alerts)? {
        return Ok(());
    }
    if alerts.is_empty() {
        println!("No budget alerts");
        return Ok(());
    }
    let data = alerts
        .into_iter()
        .map(|a| {
            vec![
                a.severity.as_str().to_string(),
                a.budget_name,
                a.message,
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Severity", "Budget", "Message"], data));
    Ok(())
}

fn suggest(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let category = arg(sub, "category")?.trim();
    let category_id = id_for_category(conn, category)?;
    let period: BudgetPeriod = arg(sub, "period")?.parse()?;
    let lookback = sub.get_one::<u32>("lookback").copied().unwrap_or(3);
    let txs = load_transactions(conn, None)?;
    let amount = BudgetCalculator::new(&[], &txs).suggest_budget_amount(category_id, period, lookback);
    let out = json!({
        "category": category,
        "period": period,
        "lookback": lookback,
        "suggested_amount": amount.round_dp(2),
    });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
        println!(
            "Suggested {} budget for '{}': {:.2} (average of last {} periods + 10%)",
            period, category, amount, lookback
        );
    }
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let start = parse_date(arg(sub, "from")?.trim())?;
    let end = parse_date(arg(sub, "to")?.trim())?;
    let budgets = load_budgets(conn)?;
    let txs = load_transactions(conn, None)?;
    let summary = BudgetCalculator::new(&budgets, &txs).budget_summary(start, end);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
        println!(
            "{} budget(s) active between {} and {}, total limit {:.2}",
            summary.total_budgets, start, end, summary.total_budget_amount
        );
        let data = summary
            .budgets
            .into_iter()
            .map(|u| {
                vec![
                    u.budget_name,
                    format!("{:.2}", u.spent_amount),
                    format!("{:.2}", u.budget_amount),
                    u.status.as_str().to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Budget", "Spent", "Limit", "Status"], data));
    }
    Ok(())
}
