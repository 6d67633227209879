// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pennywise::commands::doctor;
use pennywise::db::init_schema;
use pennywise::settings::Settings;
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

#[test]
fn defaults_apply_until_a_key_is_set() {
    let conn = setup();
    let settings = Settings::load(&conn).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.alert_threshold, dec!(0.80));

    Settings::set(&conn, "currency", " eur ").unwrap();
    Settings::set(&conn, "alert_threshold", "0.9").unwrap();
    let settings = Settings::load(&conn).unwrap();
    assert_eq!(settings.currency, "EUR");
    assert_eq!(settings.get("alert_threshold").unwrap(), "0.9");
}

#[test]
fn invalid_values_are_rejected_and_not_stored() {
    let conn = setup();
    assert!(Settings::set(&conn, "alert_threshold", "1.5").is_err());
    assert!(Settings::set(&conn, "alert_threshold", "0").is_err());
    assert!(Settings::set(&conn, "low_balance_threshold", "lots").is_err());
    let err = Settings::set(&conn, "colour", "blue").unwrap_err();
    assert!(err.to_string().contains("unknown setting 'colour'"));
    assert_eq!(Settings::load(&conn).unwrap(), Settings::default());
}

#[test]
fn entries_list_every_key() {
    let settings = Settings::default();
    let keys: Vec<&str> = settings.entries().unwrap().into_iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec!["currency", "alert_threshold", "date_format", "low_balance_threshold"]
    );
}

#[test]
fn doctor_is_quiet_on_a_healthy_ledger() {
    let conn = setup();
    assert!(doctor::diagnose(&conn).unwrap().is_empty());
}

#[test]
fn doctor_reports_ledger_problems() {
    let conn = setup();
    conn.execute_batch(
        "PRAGMA foreign_keys = OFF;
         INSERT INTO categories(id,name) VALUES (1,'A');
         INSERT INTO categories(id,name,parent_id) VALUES (2,'B',1);
         UPDATE categories SET parent_id=2 WHERE id=1;
         INSERT INTO transactions(occurred_at,kind,amount) VALUES ('2025-01-01 00:00:00','expense','-5');
         INSERT INTO transactions(occurred_at,kind,amount,category_id) VALUES ('2025-01-02 00:00:00','expense','5',99);",
    )
    .unwrap();

    let issues: Vec<String> = doctor::diagnose(&conn)
        .unwrap()
        .into_iter()
        .map(|(issue, _)| issue)
        .collect();
    assert_eq!(
        issues,
        vec![
            "negative_amount",
            "unknown_category",
            "category_cycle",
            "category_cycle"
        ]
    );
}
