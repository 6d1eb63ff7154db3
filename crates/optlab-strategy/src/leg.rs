//! Option Legs
//!
//! A leg is one option position inside a strategy. It is either marked to a
//! quoted premium (implied volatility solved from the quote) or priced from
//! an assumed volatility.

use optlab_pricing::{
    implied_vol, intrinsic, Greeks, IvSolverConfig, OptionParams, OptionType,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StrategyError};

/// Contract terms and position size for a leg, before any pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegSpec {
    /// Leg identifier
    pub id: String,
    pub option_type: OptionType,
    /// Underlying spot price
    pub spot: f64,
    pub strike: f64,
    /// Time to expiration in years
    pub time_to_expiry: f64,
    pub risk_free_rate: f64,
    #[serde(default)]
    pub dividend_yield: f64,
    /// Signed contracts (positive = long, negative = short)
    pub quantity: f64,
    /// Units of underlying per contract
    pub multiplier: f64,
}

impl LegSpec {
    /// Long one contract, multiplier 1, no dividend.
    pub fn new(
        option_type: OptionType,
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
    ) -> Self {
        Self {
            id: format!("{}_{}", option_type, strike),
            option_type,
            spot,
            strike,
            time_to_expiry,
            risk_free_rate,
            dividend_yield: 0.0,
            quantity: 1.0,
            multiplier: 1.0,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_dividend(mut self, dividend_yield: f64) -> Self {
        self.dividend_yield = dividend_yield;
        self
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.quantity.is_finite() || self.quantity == 0.0 {
            return Err(StrategyError::InvalidLeg(format!(
                "{}: quantity must be a non-zero number, got {}",
                self.id, self.quantity
            )));
        }
        if !(self.multiplier.is_finite() && self.multiplier > 0.0) {
            return Err(StrategyError::InvalidLeg(format!(
                "{}: multiplier must be positive, got {}",
                self.id, self.multiplier
            )));
        }
        Ok(())
    }

    fn params(&self, iv: f64) -> OptionParams {
        OptionParams::new(
            self.spot,
            self.strike,
            self.time_to_expiry,
            self.risk_free_rate,
            iv,
            self.option_type,
        )
        .with_dividend(self.dividend_yield)
    }
}

/// A priced leg: contract terms, premium, volatility and per-contract Greeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub id: String,
    pub option_type: OptionType,
    pub spot: f64,
    pub strike: f64,
    pub time_to_expiry: f64,
    pub risk_free_rate: f64,
    pub dividend_yield: f64,
    /// Premium per unit of underlying
    pub premium: f64,
    pub quantity: f64,
    pub multiplier: f64,
    /// Volatility the Greeks were computed at
    pub iv: f64,
    /// Per-contract Greeks (unscaled)
    pub greeks: Greeks,
}

impl Leg {
    /// Mark a leg to its quoted premium: solve implied vol, then compute Greeks.
    pub fn from_market_price(spec: LegSpec, premium: f64, config: &IvSolverConfig) -> Result<Self> {
        spec.validate()?;

        let iv = implied_vol(
            premium,
            spec.spot,
            spec.strike,
            spec.time_to_expiry,
            spec.risk_free_rate,
            spec.dividend_yield,
            spec.option_type,
            config,
        )
        .map_err(|source| StrategyError::LegPricing {
            leg: spec.id.clone(),
            source,
        })?;

        tracing::debug!(
            leg = %spec.id,
            premium,
            iv = iv.iv,
            iterations = iv.iterations,
            "leg marked to market"
        );

        let greeks = Greeks::calculate(&spec.params(iv.iv));
        Ok(Self::assemble(spec, premium, iv.iv, greeks))
    }

    /// Price a leg at an assumed volatility; the premium is the model price.
    pub fn from_volatility(spec: LegSpec, iv: f64) -> Result<Self> {
        spec.validate()?;

        let params = spec.params(iv);
        params.validate().map_err(|source| StrategyError::LegPricing {
            leg: spec.id.clone(),
            source,
        })?;

        let greeks = Greeks::calculate(&params);
        Ok(Self::assemble(spec, greeks.price, iv, greeks))
    }

    fn assemble(spec: LegSpec, premium: f64, iv: f64, greeks: Greeks) -> Self {
        Self {
            id: spec.id,
            option_type: spec.option_type,
            spot: spec.spot,
            strike: spec.strike,
            time_to_expiry: spec.time_to_expiry,
            risk_free_rate: spec.risk_free_rate,
            dividend_yield: spec.dividend_yield,
            premium,
            quantity: spec.quantity,
            multiplier: spec.multiplier,
            iv,
            greeks,
        }
    }

    /// Units of underlying the leg controls, signed.
    pub fn units(&self) -> f64 {
        self.quantity * self.multiplier
    }

    pub fn is_long(&self) -> bool {
        self.quantity > 0.0
    }

    /// Greeks scaled by quantity × multiplier.
    pub fn position_greeks(&self) -> Greeks {
        self.greeks.scale(self.units())
    }

    /// Premium paid (positive) or received (negative) to open the leg.
    pub fn cost(&self) -> f64 {
        self.premium * self.units()
    }

    /// Value of the position at expiry for an underlying price `s_t`.
    pub fn payoff_at_expiry(&self, s_t: f64) -> f64 {
        intrinsic(self.option_type, s_t, self.strike) * self.units()
    }

    /// Expiry payoff less the opening cost.
    pub fn pnl_at_expiry(&self, s_t: f64) -> f64 {
        self.payoff_at_expiry(s_t) - self.cost()
    }
}
