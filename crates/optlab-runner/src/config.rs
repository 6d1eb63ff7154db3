//! # Strategy Book Configuration
//!
//! TOML description of a multi-leg position: market inputs, optional solver
//! settings, and one entry per leg. Legs are marked to a quoted `premium`
//! (implied vol solved) or priced at an assumed `iv`.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use optlab_pricing::{IvSolverConfig, OptionType};
use optlab_strategy::{Leg, LegSpec, Strategy};
use serde::Deserialize;
use std::path::Path;

/// Root schema of a strategy book file.
#[derive(Debug, Deserialize, Clone)]
pub struct StrategyBook {
    #[serde(default = "default_name")]
    pub name: String,
    pub market: MarketInfo,
    #[serde(default)]
    pub solver: IvSolverConfig,
    pub legs: Vec<LegEntry>,
}

fn default_name() -> String {
    "strategy".to_string()
}

/// Market inputs shared by every leg.
#[derive(Debug, Deserialize, Clone)]
pub struct MarketInfo {
    pub spot: f64,
    #[serde(default)]
    pub risk_free_rate: f64,
    #[serde(default)]
    pub dividend_yield: f64,
    /// Reference date for legs given by `expiry`; defaults to today
    pub valuation_date: Option<NaiveDate>,
}

/// One leg of the book.
#[derive(Debug, Deserialize, Clone)]
pub struct LegEntry {
    pub id: Option<String>,
    pub option_type: OptionType,
    pub strike: f64,
    /// Time to expiry in years
    pub maturity: Option<f64>,
    /// Expiry date, measured from `market.valuation_date`
    pub expiry: Option<NaiveDate>,
    /// Quoted premium; the leg's IV is solved from it
    pub premium: Option<f64>,
    /// Assumed volatility when no premium is quoted
    pub iv: Option<f64>,
    #[serde(default = "default_one")]
    pub quantity: f64,
    #[serde(default = "default_one")]
    pub multiplier: f64,
}

fn default_one() -> f64 {
    1.0
}

impl LegEntry {
    fn time_to_expiry(&self, valuation_date: NaiveDate) -> Result<f64> {
        match (self.maturity, self.expiry) {
            (Some(t), None) => Ok(t),
            (None, Some(expiry)) => {
                let days = expiry.signed_duration_since(valuation_date).num_days();
                if days < 0 {
                    bail!("expiry {} is before valuation date {}", expiry, valuation_date);
                }
                Ok(days as f64 / 365.0)
            }
            (Some(_), Some(_)) => bail!("give either maturity or expiry, not both"),
            (None, None) => bail!("one of maturity or expiry is required"),
        }
    }
}

impl StrategyBook {
    /// Load a book from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read strategy book: {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid strategy book: {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| anyhow!("Failed to parse strategy book: {}", e))
    }

    /// Price every leg and assemble the strategy.
    pub fn build_strategy(&self) -> Result<Strategy> {
        if self.legs.is_empty() {
            bail!("strategy book '{}' has no legs", self.name);
        }
        let valuation_date = self
            .market
            .valuation_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        let mut legs = Vec::with_capacity(self.legs.len());
        for (i, entry) in self.legs.iter().enumerate() {
            let leg = self
                .build_leg(entry, valuation_date)
                .with_context(|| format!("leg #{} ({} {})", i + 1, entry.option_type, entry.strike))?;
            legs.push(leg);
        }

        tracing::info!(book = %self.name, legs = legs.len(), "strategy book priced");
        Ok(Strategy::new(self.name.clone(), legs))
    }

    fn build_leg(&self, entry: &LegEntry, valuation_date: NaiveDate) -> Result<Leg> {
        let t = entry.time_to_expiry(valuation_date)?;
        let mut spec = LegSpec::new(
            entry.option_type,
            self.market.spot,
            entry.strike,
            t,
            self.market.risk_free_rate,
        )
        .with_dividend(self.market.dividend_yield)
        .with_quantity(entry.quantity)
        .with_multiplier(entry.multiplier);
        if let Some(id) = &entry.id {
            spec = spec.with_id(id.clone());
        }

        let leg = match (entry.premium, entry.iv) {
            (Some(premium), None) => Leg::from_market_price(spec, premium, &self.solver)?,
            (None, Some(iv)) => Leg::from_volatility(spec, iv)?,
            (Some(_), Some(_)) => bail!("give either premium or iv, not both"),
            (None, None) => bail!("one of premium or iv is required"),
        };
        Ok(leg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BOOK: &str = r#"
        name = "call + put"

        [market]
        spot = 100.0
        risk_free_rate = 0.05
        valuation_date = "2026-01-01"

        [[legs]]
        option_type = "call"
        strike = 100.0
        maturity = 1.0
        premium = 10.0

        [[legs]]
        id = "wing"
        option_type = "put"
        strike = 110.0
        expiry = "2027-01-01"
        iv = 0.25
        quantity = -2.0
        multiplier = 100.0
    "#;

    #[test]
    fn test_parse_and_build() {
        let book = StrategyBook::from_toml(BOOK).unwrap();
        assert_eq!(book.name, "call + put");
        assert_eq!(book.solver, IvSolverConfig::default());

        let strategy = book.build_strategy().unwrap();
        assert_eq!(strategy.legs.len(), 2);
        assert_relative_eq!(strategy.legs[0].premium, 10.0);
        assert_relative_eq!(strategy.legs[1].time_to_expiry, 1.0);
        assert_relative_eq!(strategy.legs[1].quantity, -2.0);
        assert_eq!(strategy.legs[1].id, "wing");
    }

    #[test]
    fn test_solver_section_overrides_defaults() {
        let text = format!("{}\n[solver]\ninitial_guess = 0.5\nmax_iterations = 50\n", BOOK);
        let book = StrategyBook::from_toml(&text).unwrap();
        assert_relative_eq!(book.solver.initial_guess, 0.5);
        assert_eq!(book.solver.max_iterations, 50);
        assert_relative_eq!(book.solver.tolerance, 1e-8);
    }

    #[test]
    fn test_leg_errors_name_the_leg() {
        let text = BOOK.replace("premium = 10.0", "premium = 10.0\niv = 0.2");
        let err = StrategyBook::from_toml(&text).unwrap().build_strategy().unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("leg #1"), "{}", msg);
        assert!(msg.contains("not both"), "{}", msg);
    }

    #[test]
    fn test_expiry_before_valuation_rejected() {
        let text = BOOK.replace("2027-01-01", "2025-06-01");
        let err = StrategyBook::from_toml(&text).unwrap().build_strategy().unwrap_err();
        assert!(format!("{:#}", err).contains("before valuation date"));
    }

    #[test]
    fn test_unknown_option_type_rejected() {
        let text = BOOK.replace("\"put\"", "\"straddle\"");
        assert!(StrategyBook::from_toml(&text).is_err());
    }
}
