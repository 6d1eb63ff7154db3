//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use optlab_pricing::{OptionParams, OptionType};
use optlab_strategy::StrategyType;

#[derive(Parser, Debug)]
#[command(name = "optlab")]
#[command(version, about = "Black-Scholes pricing, Greeks, implied volatility and option strategies")]
pub struct Cli {
    /// Increase stderr log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write rotated log files to this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Theoretical price of a European option
    Price(VolArgs),
    /// Full set of Greeks
    Greeks(VolArgs),
    /// Implied volatility from a quoted premium
    Iv(IvArgs),
    /// Analyse a strategy book (TOML)
    Strategy(StrategyArgs),
    /// Build and analyse a standard multi-leg structure
    Template(TemplateArgs),
    /// Volatility smile from a JSONL file of quotes
    Smile(SmileArgs),
    /// Long 100 call @10 and 110 put @5, S=100, T=1, r=5%
    Demo(OutputArgs),
}

/// Contract terms shared by the single-option commands.
#[derive(Args, Debug, Clone)]
pub struct ContractArgs {
    /// Underlying spot price
    #[arg(long)]
    pub spot: f64,

    #[arg(long)]
    pub strike: f64,

    /// Time to expiry in years
    #[arg(long)]
    pub maturity: f64,

    /// Risk-free rate (0.05 = 5%)
    #[arg(long, default_value = "0")]
    pub rate: f64,

    /// Continuous dividend yield
    #[arg(long, default_value = "0")]
    pub dividend: f64,

    /// call | put
    #[arg(long = "option", default_value = "call")]
    pub option_type: OptionType,
}

impl ContractArgs {
    pub fn params(&self, iv: f64) -> OptionParams {
        OptionParams::new(
            self.spot,
            self.strike,
            self.maturity,
            self.rate,
            iv,
            self.option_type,
        )
        .with_dividend(self.dividend)
    }
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Emit JSON instead of a text table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct VolArgs {
    #[command(flatten)]
    pub contract: ContractArgs,

    /// Volatility (0.2 = 20%)
    #[arg(long)]
    pub vol: f64,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct IvArgs {
    #[command(flatten)]
    pub contract: ContractArgs,

    /// Quoted option premium
    #[arg(long)]
    pub premium: f64,

    /// Starting volatility for the solver
    #[arg(long, default_value = "0.2")]
    pub guess: f64,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Expiry P&L scan settings.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Scan spot × (1 ± range) for the expiry profile
    #[arg(long, default_value = "0.5")]
    pub range_pct: f64,

    /// Grid intervals across the scan range
    #[arg(long, default_value = "200")]
    pub steps: usize,
}

#[derive(Args, Debug, Clone)]
pub struct StrategyArgs {
    /// Path to the strategy book
    pub book: PathBuf,

    #[command(flatten)]
    pub scan: ScanArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TemplateArgs {
    /// Structure name, e.g. iron_condor, long_straddle, bull_call_spread
    pub kind: StrategyType,

    #[arg(long)]
    pub spot: f64,

    /// Time to expiry in years
    #[arg(long)]
    pub maturity: f64,

    #[arg(long, default_value = "0")]
    pub rate: f64,

    #[arg(long, default_value = "0")]
    pub dividend: f64,

    /// Flat volatility for every leg
    #[arg(long)]
    pub vol: f64,

    /// Contracts per unit leg
    #[arg(long, default_value = "1")]
    pub quantity: f64,

    /// Units of underlying per contract
    #[arg(long, default_value = "1")]
    pub multiplier: f64,

    /// Listed strike spacing (0 = no snapping)
    #[arg(long, default_value = "0")]
    pub strike_step: f64,

    /// Wing distance as a fraction of spot
    #[arg(long, default_value = "0.05")]
    pub wing_width: f64,

    #[command(flatten)]
    pub scan: ScanArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SmileArgs {
    /// JSONL file: {"strike":..,"premium":..,"option_type":"call"} per line
    pub quotes: PathBuf,

    #[arg(long)]
    pub spot: f64,

    /// Time to expiry in years
    #[arg(long)]
    pub maturity: f64,

    #[arg(long, default_value = "0")]
    pub rate: f64,

    #[arg(long, default_value = "0")]
    pub dividend: f64,

    #[command(flatten)]
    pub output: OutputArgs,
}
