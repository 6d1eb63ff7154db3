//! # OptLab Runner
//!
//! Command-line front end over `optlab-pricing` and `optlab-strategy`.
//!
//! ## Description
//! Every subcommand resolves to a pure function returning the text (or JSON)
//! to print, so the binary only parses arguments, sets up logging and writes
//! the result to stdout.

pub mod cli;
pub mod config;
pub mod observability;
pub mod report;

use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use optlab_pricing::{
    implied_vol, price, Greeks, IvSolverConfig, OptionType, SmileQuote, VolSmile,
};
use optlab_strategy::{Leg, LegSpec, Strategy, TemplateParams};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::cli::{
    Cli, Command, IvArgs, OutputArgs, ScanArgs, SmileArgs, StrategyArgs, TemplateArgs, VolArgs,
};
use crate::config::StrategyBook;

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    text.push('\n');
    Ok(text)
}

/// Execute a parsed command line and return what should be printed.
pub fn run(cli: &Cli) -> Result<String> {
    match &cli.command {
        Command::Price(args) => run_price(args),
        Command::Greeks(args) => run_greeks(args),
        Command::Iv(args) => run_iv(args),
        Command::Strategy(args) => run_strategy(args),
        Command::Template(args) => run_template(args),
        Command::Smile(args) => run_smile(args),
        Command::Demo(args) => run_demo(args),
    }
}

fn run_price(args: &VolArgs) -> Result<String> {
    let params = args.contract.params(args.vol);
    params.validate().context("Invalid contract")?;
    let value = price(&params);
    if args.output.json {
        return to_json(&json!({ "contract": params, "price": value }));
    }
    Ok(report::render_price(&params, value))
}

fn run_greeks(args: &VolArgs) -> Result<String> {
    let params = args.contract.params(args.vol);
    params.validate().context("Invalid contract")?;
    let greeks = Greeks::calculate(&params);
    if args.output.json {
        return to_json(&json!({ "contract": params, "greeks": greeks }));
    }
    Ok(report::render_greeks(&params, &greeks))
}

fn run_iv(args: &IvArgs) -> Result<String> {
    let c = &args.contract;
    let config = IvSolverConfig::default().with_guess(args.guess);
    let result = implied_vol(
        args.premium,
        c.spot,
        c.strike,
        c.maturity,
        c.rate,
        c.dividend,
        c.option_type,
        &config,
    )
    .with_context(|| format!("Could not solve implied vol for premium {}", args.premium))?;

    let params = c.params(result.iv);
    if args.output.json {
        return to_json(&json!({ "contract": params, "premium": args.premium, "result": result }));
    }
    Ok(report::render_iv(&params, args.premium, &result))
}

fn analyse(strategy: &Strategy, scan: &ScanArgs, output: &OutputArgs) -> Result<String> {
    let (lo, hi) = strategy.scan_range(scan.range_pct)?;
    let summary = strategy.summary(lo, hi, scan.steps);
    if output.json {
        return to_json(&summary);
    }
    Ok(report::render_strategy(&summary))
}

fn run_strategy(args: &StrategyArgs) -> Result<String> {
    let book = StrategyBook::load(&args.book)?;
    let strategy = book.build_strategy()?;
    analyse(&strategy, &args.scan, &args.output)
}

fn run_template(args: &TemplateArgs) -> Result<String> {
    let params = TemplateParams::new(args.spot, args.maturity, args.rate, args.vol)
        .with_dividend(args.dividend)
        .with_quantity(args.quantity, args.multiplier)
        .with_strike_step(args.strike_step)
        .with_wing_width(args.wing_width);

    let strategy = args
        .kind
        .build(&params)
        .with_context(|| format!("Could not build {}", args.kind))?;
    analyse(&strategy, &args.scan, &args.output)
}

/// Read one [`SmileQuote`] per non-empty line.
pub fn load_quotes(path: &Path) -> Result<Vec<SmileQuote>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Could not open quotes file: {}", path.display()))?;
    let mut quotes = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let quote: SmileQuote = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid quote", path.display(), i + 1))?;
        quotes.push(quote);
    }
    info!(path = %path.display(), quotes = quotes.len(), "loaded smile quotes");
    Ok(quotes)
}

fn run_smile(args: &SmileArgs) -> Result<String> {
    let quotes = load_quotes(&args.quotes)?;
    let smile = VolSmile::from_quotes(
        args.spot,
        args.maturity,
        args.rate,
        args.dividend,
        &quotes,
        &IvSolverConfig::default(),
    );
    if smile.points.is_empty() {
        anyhow::bail!("no quote in {} produced an implied vol", args.quotes.display());
    }
    if args.output.json {
        return to_json(&smile);
    }
    Ok(report::render_smile(&smile))
}

/// Long 100 call quoted at 10 and long 110 put quoted at 5.
pub fn demo_strategy() -> Result<Strategy> {
    let (spot, maturity, rate) = (100.0, 1.0, 0.05);
    let config = IvSolverConfig::default();
    let call = Leg::from_market_price(
        LegSpec::new(OptionType::Call, spot, 100.0, maturity, rate),
        10.0,
        &config,
    )?;
    let put = Leg::from_market_price(
        LegSpec::new(OptionType::Put, spot, 110.0, maturity, rate),
        5.0,
        &config,
    )?;
    Ok(Strategy::new("call 100 + put 110", vec![call, put]))
}

fn run_demo(output: &OutputArgs) -> Result<String> {
    let strategy = demo_strategy()?;
    if output.json {
        return to_json(&json!({
            "strategy": strategy.name,
            "delta": strategy.delta(),
            "gamma": strategy.gamma(),
            "vega": strategy.vega(),
        }));
    }
    Ok(format!(
        "Strategy Delta: {:.6}\nStrategy Gamma: {:.6}\nStrategy Vega: {:.6}\n",
        strategy.delta(),
        strategy.gamma(),
        strategy.vega()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use clap::Parser;

    fn run_args(args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("optlab").chain(args.iter().copied()))?;
        run(&cli)
    }

    #[test]
    fn test_price_command() {
        let out = run_args(&[
            "price", "--spot", "42", "--strike", "40", "--maturity", "0.5", "--rate", "0.1",
            "--vol", "0.2",
        ])
        .unwrap();
        assert!(out.contains("price: 4.759"), "{}", out);
    }

    #[test]
    fn test_greeks_json() {
        let out = run_args(&[
            "greeks", "--spot", "100", "--strike", "100", "--maturity", "1", "--vol", "0.2",
            "--option", "put", "--json",
        ])
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let delta = value["greeks"]["delta"].as_f64().unwrap();
        assert!(delta < 0.0 && delta > -1.0);
        assert_eq!(value["contract"]["option_type"], "put");
    }

    #[test]
    fn test_iv_command_recovers_vol() {
        let out = run_args(&[
            "iv", "--spot", "42", "--strike", "40", "--maturity", "0.5", "--rate", "0.1",
            "--premium", "4.759422", "--json",
        ])
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_relative_eq!(value["result"]["iv"].as_f64().unwrap(), 0.2, epsilon = 1e-4);
    }

    #[test]
    fn test_iv_command_rejects_impossible_premium() {
        let err = run_args(&[
            "iv", "--spot", "100", "--strike", "100", "--maturity", "1", "--premium", "150",
        ])
        .unwrap_err();
        assert!(format!("{:#}", err).contains("premium 150"));
    }

    #[test]
    fn test_template_command() {
        let out = run_args(&[
            "template", "iron_condor", "--spot", "100", "--maturity", "0.25", "--rate", "0.05",
            "--vol", "0.2", "--strike-step", "1", "--json",
        ])
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["legs"].as_array().unwrap().len(), 4);
        assert!(value["net_premium"].as_f64().unwrap() < 0.0);
    }

    #[test]
    fn test_unknown_template_is_a_parse_error() {
        assert!(run_args(&[
            "template", "covered_call", "--spot", "100", "--maturity", "1", "--vol", "0.2",
        ])
        .is_err());
    }

    #[test]
    fn test_demo_matches_leg_sums() {
        let strategy = demo_strategy().unwrap();
        let call = &strategy.legs[0];
        let put = &strategy.legs[1];
        assert_relative_eq!(call.iv, 0.18797, epsilon = 1e-4);
        assert_relative_eq!(put.iv, 0.04444, epsilon = 1e-4);
        assert_relative_eq!(
            strategy.delta(),
            call.greeks.delta + put.greeks.delta,
            epsilon = 1e-12
        );

        let out = run_args(&["demo"]).unwrap();
        assert!(out.starts_with("Strategy Delta: "));
        assert!(out.contains("Strategy Vega: "));
    }
}
