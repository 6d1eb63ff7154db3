//! End-to-end checks of the `optlab` commands that read files.
//!
//! Strategy books and smile quote files are written to a temp directory and
//! run through the same `run` entry point the binary uses.

use std::fs;

use approx::assert_relative_eq;
use clap::Parser;
use optlab_pricing::{price, OptionParams, OptionType};
use optlab_runner::cli::Cli;
use serde_json::Value;
use tempfile::TempDir;

fn run_args(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("optlab").chain(args.iter().copied()))?;
    optlab_runner::run(&cli)
}

const BOOK: &str = r#"
name = "call + put"

[market]
spot = 100.0
risk_free_rate = 0.05

[[legs]]
option_type = "call"
strike = 100.0
maturity = 1.0
premium = 10.0

[[legs]]
option_type = "put"
strike = 110.0
maturity = 1.0
premium = 5.0
"#;

#[test]
fn strategy_book_json_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.toml");
    fs::write(&path, BOOK).unwrap();

    let out = run_args(&[
        "strategy",
        path.to_str().unwrap(),
        "--json",
        "--steps",
        "1500",
    ])
    .unwrap();
    let summary: Value = serde_json::from_str(&out).unwrap();

    assert_eq!(summary["name"], "call + put");
    assert_relative_eq!(summary["net_premium"].as_f64().unwrap(), 15.0, epsilon = 1e-12);

    let breakevens: Vec<f64> = summary["breakevens"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert_eq!(breakevens.len(), 2);
    assert_relative_eq!(breakevens[0], 95.0, epsilon = 1e-6);
    assert_relative_eq!(breakevens[1], 115.0, epsilon = 1e-6);

    // Between the strikes both legs are in the money: payoff 10, cost 15.
    assert_relative_eq!(summary["max_loss"].as_f64().unwrap(), -5.0, epsilon = 1e-9);
}

#[test]
fn strategy_book_text_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.toml");
    fs::write(&path, BOOK).unwrap();

    let out = run_args(&["strategy", path.to_str().unwrap()]).unwrap();
    assert!(out.starts_with("=== call + put ==="), "{}", out);
    assert!(out.contains("call_100"), "{}", out);
    assert!(out.contains("put_110"), "{}", out);
    assert!(out.contains("(debit)"), "{}", out);
}

#[test]
fn missing_book_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.toml");
    let err = run_args(&["strategy", path.to_str().unwrap()]).unwrap_err();
    assert!(format!("{:#}", err).contains("nope.toml"));
}

#[test]
fn bad_leg_is_named() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.toml");
    fs::write(&path, BOOK.replace("premium = 5.0", "premium = 500.0")).unwrap();

    let err = run_args(&["strategy", path.to_str().unwrap()]).unwrap_err();
    assert!(format!("{:#}", err).contains("leg #2"), "{:#}", err);
}

#[test]
fn smile_from_jsonl_quotes() {
    let (spot, t, r): (f64, f64, f64) = (100.0, 0.25, 0.02);
    let mut lines = String::new();
    for (strike, option_type) in [
        (90.0, OptionType::Put),
        (95.0, OptionType::Put),
        (100.0, OptionType::Call),
        (105.0, OptionType::Call),
        (110.0, OptionType::Call),
    ] {
        let vol = 0.20 - 0.4 * (strike / spot).ln();
        let premium = price(&OptionParams::new(spot, strike, t, r, vol, option_type));
        lines.push_str(&format!(
            "{{\"strike\": {}, \"premium\": {}, \"option_type\": \"{}\"}}\n",
            strike, premium, option_type
        ));
    }
    lines.push_str("\n{\"strike\": 120.0, \"premium\": 50.0, \"option_type\": \"call\"}\n");

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("quotes.jsonl");
    fs::write(&path, lines).unwrap();

    let out = run_args(&[
        "smile",
        path.to_str().unwrap(),
        "--spot",
        "100",
        "--maturity",
        "0.25",
        "--rate",
        "0.02",
        "--json",
    ])
    .unwrap();
    let smile: Value = serde_json::from_str(&out).unwrap();

    assert_eq!(smile["points"].as_array().unwrap().len(), 5);
    assert_eq!(smile["skipped"], 1);
    assert_relative_eq!(smile["atm_iv"].as_f64().unwrap(), 0.20, epsilon = 1e-6);
}

#[test]
fn malformed_quote_line_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("quotes.jsonl");
    let text = "{\"strike\": 100.0, \"premium\": 4.0, \"option_type\": \"call\"}\nnot json\n";
    fs::write(&path, text).unwrap();

    let err = run_args(&[
        "smile",
        path.to_str().unwrap(),
        "--spot",
        "100",
        "--maturity",
        "0.25",
    ])
    .unwrap_err();
    assert!(format!("{:#}", err).contains("quotes.jsonl:2"), "{:#}", err);
}
