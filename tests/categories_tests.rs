// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pennywise::db::init_schema;
use pennywise::models::TransactionKind;
use pennywise::{cli, commands::categories};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["pennywise", "category"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("category", cat_m)) = matches.subcommand() {
        categories::handle(conn, cat_m)
    } else {
        panic!("no category subcommand");
    }
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    run(&conn, &["add", "--name", "Food"]).unwrap();
    run(&conn, &["add", "--name", " Groceries ", "--parent", "Food"]).unwrap();
    run(&conn, &["add", "--name", "Salary", "--kind", "income"]).unwrap();
    conn
}

#[test]
fn list_renders_tree_order() {
    let conn = setup();
    let rows = categories::tree_rows(&conn).unwrap();
    let shape: Vec<(&str, usize, Option<&str>)> = rows
        .iter()
        .map(|r| (r.name.as_str(), r.depth, r.parent.as_deref()))
        .collect();
    assert_eq!(
        shape,
        vec![("Food", 0, None), ("Groceries", 1, Some("Food")), ("Salary", 0, None)]
    );
    assert_eq!(rows[2].kind.as_str(), "income");
}

#[test]
fn add_rejects_unknown_kind_and_parent() {
    let conn = setup();
    assert!(run(&conn, &["add", "--name", "X", "--kind", "sideways"]).is_err());
    let err = run(&conn, &["add", "--name", "X", "--parent", "Nope"]).unwrap_err();
    assert!(err.to_string().contains("Category not found: Nope"));
}

#[test]
fn move_refuses_cycles_and_can_detach() {
    let conn = setup();
    let err = run(&conn, &["move", "--name", "Food", "--parent", "Groceries"]).unwrap_err();
    assert!(err.to_string().contains("would create a cycle"));

    run(&conn, &["move", "--name", "Groceries"]).unwrap();
    let rows = categories::tree_rows(&conn).unwrap();
    assert!(rows.iter().all(|r| r.depth == 0));
}

#[test]
fn rm_refuses_parents_and_categories_in_use() {
    let conn = setup();
    let err = run(&conn, &["rm", "--name", "Food"]).unwrap_err();
    assert!(err.to_string().contains("still has child categories"));

    conn.execute(
        "INSERT INTO transactions(occurred_at,kind,amount,category_id) \
         SELECT '2025-01-01 00:00:00','expense','3',id FROM categories WHERE name='Groceries'",
        [],
    )
    .unwrap();
    let err = run(&conn, &["rm", "--name", "Groceries"]).unwrap_err();
    assert!(err.to_string().contains("is used by 1 transaction(s)"));

    run(&conn, &["rm", "--name", "Salary"]).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn rm_refuses_categories_with_budgets() {
    let conn = setup();
    conn.execute(
        "INSERT INTO budgets(name,category_id,amount,period,start_date,alert_threshold) \
         SELECT 'Pay', id, '100', 'monthly', '2025-01-01', '0.8' FROM categories WHERE name='Salary'",
        [],
    )
    .unwrap();
    let err = run(&conn, &["rm", "--name", "Salary"]).unwrap_err();
    assert!(err.to_string().contains("is used by 1 budget(s)"));
    let budgets: i64 = conn
        .query_row("SELECT COUNT(*) FROM budgets", [], |r| r.get(0))
        .unwrap();
    assert_eq!(budgets, 1);
}

#[test]
fn stats_split_usage_by_kind() {
    let conn = setup();
    conn.execute_batch(
        "INSERT INTO transactions(occurred_at,kind,amount,category_id) VALUES
            ('2025-01-01 09:00:00','expense','12.50',2),
            ('2025-01-03 09:00:00','expense','7.50',2),
            ('2025-01-04 09:00:00','income','5',2),
            ('2025-01-05 09:00:00','expense','99',1);",
    )
    .unwrap();

    let usage = categories::usage_stats(&conn, "Groceries").unwrap();
    assert_eq!(usage.category_id, 2);
    assert_eq!(usage.transaction_count, 3);
    assert_eq!(usage.total_expense, dec!(20));
    assert_eq!(usage.total_income, dec!(5));
    let kinds: Vec<(TransactionKind, usize)> =
        usage.by_kind.iter().map(|k| (k.kind, k.count)).collect();
    assert_eq!(
        kinds,
        vec![(TransactionKind::Income, 1), (TransactionKind::Expense, 2)]
    );

    let empty = categories::usage_stats(&conn, "Salary").unwrap();
    assert_eq!(empty.transaction_count, 0);
    assert!(empty.by_kind.is_empty());

    assert!(run(&conn, &["stats", "--name", "Groceries", "--json"]).is_ok());
    let err = run(&conn, &["stats", "--name", "Nope"]).unwrap_err();
    assert!(err.to_string().contains("Category not found: Nope"));
}
