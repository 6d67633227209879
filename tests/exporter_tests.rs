// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pennywise::commands::importer::{self, ImportOptions};
use pennywise::db::{init_schema, load_transactions};
use pennywise::{cli, commands::exporter};
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO accounts(id,name,type,currency) VALUES (1,'Checking','bank','USD')",
        [],
    )
    .unwrap();
    conn.execute("INSERT INTO categories(id,name) VALUES (1,'Groceries')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO transactions(occurred_at,kind,amount,category_id,account_id,description,tags) VALUES \
        ('2025-01-02 17:30:00','expense','12.34',1,1,'Corner Shop','food,weekly')",
        [],
    )
    .unwrap();
    conn
}

fn export(conn: &Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "pennywise",
        "export",
        "transactions",
        "--format",
        format,
        "--out",
        out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_transactions_streams_pretty_json() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    export(&conn, "json", &out_str).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": 1,
                "date": "2025-01-02",
                "time": "17:30:00",
                "kind": "expense",
                "amount": "12.34",
                "category": "Groceries",
                "description": "Corner Shop",
                "tags": "food|weekly",
                "account": "Checking"
            }
        ])
    );
}

#[test]
fn csv_export_can_be_imported_again() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    export(&conn, " CSV ", &out_str).unwrap();
    let contents = std::fs::read_to_string(&out_path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("id,date,time,kind,amount,category,description,tags,account")
    );
    assert_eq!(
        lines.next(),
        Some("1,2025-01-02,17:30:00,expense,12.34,Groceries,Corner Shop,food|weekly,Checking")
    );

    let mut fresh = Connection::open_in_memory().unwrap();
    init_schema(&fresh).unwrap();
    fresh
        .execute(
            "INSERT INTO accounts(id,name,type,currency) VALUES (1,'Checking','bank','USD')",
            [],
        )
        .unwrap();
    let opts = ImportOptions {
        date_format: "%Y-%m-%d".into(),
        keep_duplicates: false,
    };
    let report = importer::import_transactions(&mut fresh, &out_path, &opts).unwrap();
    assert_eq!(report.imported, 1);

    let original = load_transactions(&conn, None).unwrap();
    let copy = load_transactions(&fresh, None).unwrap();
    assert_eq!(copy[0].occurred_at, original[0].occurred_at);
    assert_eq!(copy[0].amount, original[0].amount);
    assert_eq!(copy[0].kind, original[0].kind);
    assert_eq!(copy[0].tags, original[0].tags);
    assert_eq!(copy[0].description, original[0].description);
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let err = export(&conn, "xml", &out_str).unwrap_err();
    assert!(err.to_string().contains("Unknown format: xml"));
    assert!(!out_path.exists());
}
