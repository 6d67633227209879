// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .help("Print pretty JSON instead of a table")
            .action(ArgAction::SetTrue),
        Arg::new("jsonl")
            .long("jsonl")
            .help("Print one JSON object per line")
            .action(ArgAction::SetTrue)
            .conflicts_with("json"),
    ]
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn range_args() -> [Arg; 2] {
    [
        req("from", "Start date, inclusive (YYYY-MM-DD)"),
        req("to", "End date, inclusive (YYYY-MM-DD)"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("pennywise")
        .about("Personal finance tracker: transactions, budgets and reports")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Create the database if needed"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Account name"))
                        .arg(opt("type", "Account type, e.g. bank, cash, card").default_value("bank"))
                        .arg(opt("currency", "Display currency code").default_value("USD")),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(Command::new("rm").arg(req("name", "Account name"))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage the category tree")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Category name"))
                        .arg(opt("kind", "income|expense|both").default_value("expense"))
                        .arg(opt("parent", "Parent category name")),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(
                    Command::new("move")
                        .about("Re-parent a category; omit --parent to make it a root")
                        .arg(req("name", "Category name"))
                        .arg(opt("parent", "New parent category name")),
                )
                .subcommand(Command::new("rm").arg(req("name", "Category name")))
                .subcommand(
                    Command::new("stats")
                        .about("Transaction counts and totals for one category")
                        .arg(req("name", "Category name"))
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and list transactions")
                .subcommand(
                    Command::new("add")
                        .arg(req("date", "Date (YYYY-MM-DD)"))
                        .arg(opt("time", "Time of day (HH:MM[:SS])"))
                        .arg(opt("kind", "income|expense|transfer").default_value("expense"))
                        .arg(req("amount", "Non-negative amount"))
                        .arg(opt("category", "Category name"))
                        .arg(opt("account", "Account name"))
                        .arg(opt("description", "Free-text description"))
                        .arg(opt("tags", "Comma-separated tags")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(opt("from", "Start date (YYYY-MM-DD)"))
                        .arg(opt("to", "End date (YYYY-MM-DD)"))
                        .arg(opt("month", "Month (YYYY-MM)").conflicts_with_all(["from", "to"]))
                        .arg(opt("account", "Account name"))
                        .arg(opt("category", "Category name"))
                        .arg(opt("limit", "Max rows").value_parser(value_parser!(usize)))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("search")
                        .about("Find transactions by description text")
                        .arg(req("term", "Text the description must contain"))
                        .arg(
                            opt("limit", "Max rows")
                                .value_parser(value_parser!(usize))
                                .default_value("50"),
                        )
                        .args(json_args()),
                )
                .subcommand(Command::new("rm").arg(req("id", "Transaction id"))),
        )
        .subcommand(
            Command::new("budget")
                .about("Budgets, their usage and alerts")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Budget name"))
                        .arg(req("amount", "Limit per period"))
                        .arg(opt("period", "daily|weekly|monthly|yearly").default_value("monthly"))
                        .arg(opt("category", "Category name; omit to cover all expenses"))
                        .arg(opt("start", "First day the budget applies (YYYY-MM-DD)"))
                        .arg(opt("end", "Last day the budget applies (YYYY-MM-DD)"))
                        .arg(opt("threshold", "Alert threshold as a fraction, e.g. 0.8")),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(
                    Command::new("update")
                        .about("Change a budget; omitted options keep their value")
                        .arg(req("name", "Budget name"))
                        .arg(opt("rename", "New budget name"))
                        .arg(opt("amount", "Limit per period"))
                        .arg(opt("period", "daily|weekly|monthly|yearly"))
                        .arg(opt("category", "Category name").conflicts_with("all-categories"))
                        .arg(
                            Arg::new("all-categories")
                                .long("all-categories")
                                .help("Cover all expenses instead of one category")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(opt("start", "First day the budget applies (YYYY-MM-DD)"))
                        .arg(opt("end", "Last day the budget applies (YYYY-MM-DD)"))
                        .arg(opt("threshold", "Alert threshold as a fraction, e.g. 0.8"))
                        .arg(opt("active", "true|false").value_parser(value_parser!(bool))),
                )
                .subcommand(
                    Command::new("deactivate")
                        .about("Keep a budget but stop tracking it")
                        .arg(req("name", "Budget name")),
                )
                .subcommand(Command::new("activate").arg(req("name", "Budget name")))
                .subcommand(Command::new("rm").arg(req("name", "Budget name")))
                .subcommand(
                    Command::new("status")
                        .arg(opt("as-of", "Evaluate as of this date (YYYY-MM-DD)"))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("alerts")
                        .arg(opt("as-of", "Evaluate as of this date (YYYY-MM-DD)"))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("suggest")
                        .arg(req("category", "Category name"))
                        .arg(opt("period", "daily|weekly|monthly|yearly").default_value("monthly"))
                        .arg(
                            opt("lookback", "Number of past periods to average")
                                .value_parser(value_parser!(u32))
                                .default_value("3"),
                        )
                        .args(json_args()),
                )
                .subcommand(Command::new("summary").args(range_args()).args(json_args())),
        )
        .subcommand(
            Command::new("report")
                .about("Balance and statistics reports")
                .subcommand(
                    Command::new("balance")
                        .arg(opt("as-of", "Date (YYYY-MM-DD), default today"))
                        .arg(opt("account", "Account name"))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("history")
                        .args(range_args())
                        .arg(opt("account", "Account name"))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("summary")
                        .arg(opt("month", "Month (YYYY-MM)"))
                        .arg(
                            opt("year", "Calendar year")
                                .value_parser(value_parser!(i32))
                                .conflicts_with("month"),
                        )
                        .arg(opt("from", "Start date (YYYY-MM-DD)").conflicts_with_all(["month", "year"]))
                        .arg(opt("to", "End date (YYYY-MM-DD)").requires("from"))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("trend")
                        .arg(
                            opt("months", "Number of calendar months, ending with the current one")
                                .value_parser(value_parser!(u32))
                                .default_value("12"),
                        )
                        .args(json_args()),
                )
                .subcommand(Command::new("categories").args(range_args()).args(json_args()))
                .subcommand(
                    Command::new("patterns")
                        .arg(
                            opt("days", "Look back this many days")
                                .value_parser(value_parser!(u32))
                                .default_value("30"),
                        )
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import data from CSV")
                .subcommand(
                    Command::new("transactions")
                        .arg(req("path", "CSV file"))
                        .arg(opt("date-format", "chrono format of the date column"))
                        .arg(
                            Arg::new("keep-duplicates")
                                .long("keep-duplicates")
                                .help("Import rows that match an existing transaction")
                                .action(ArgAction::SetTrue),
                        )
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("transactions")
                        .arg(opt("format", "csv|json").default_value("csv"))
                        .arg(req("out", "Output file")),
                ),
        )
        .subcommand(
            Command::new("rules")
                .about("Regex categorization rules applied on add and import")
                .subcommand(
                    Command::new("add")
                        .arg(req("pattern", "Regex matched against the description"))
                        .arg(opt("category", "Category to assign"))
                        .arg(
                            Arg::new("description_rewrite")
                                .long("description-rewrite")
                                .help("Replacement description"),
                        ),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(Command::new("rm").arg(req("id", "Rule id"))),
        )
        .subcommand(
            Command::new("config")
                .about("Read and change settings")
                .subcommand(Command::new("get").arg(req("key", "Setting key")))
                .subcommand(
                    Command::new("set")
                        .arg(req("key", "Setting key"))
                        .arg(req("value", "New value")),
                )
                .subcommand(Command::new("list").args(json_args())),
        )
        .subcommand(Command::new("doctor").about("Check the ledger for inconsistencies"))
}
