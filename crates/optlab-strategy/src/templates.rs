//! Strategy Templates
//!
//! Standard multi-leg structures built from a spot, an expiry and a flat
//! volatility:
//! - Straddles, Strangles
//! - Iron Condors, Iron Butterflies
//! - Long call butterfly
//! - Vertical debit and credit spreads
//!
//! Strikes are chosen relative to spot (ATM, percent/fixed offset, or target
//! delta) and snapped to the listed strike grid.

use optlab_pricing::{norm_inv_cdf, OptionType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StrategyError};
use crate::leg::{Leg, LegSpec};
use crate::strategy::Strategy;

/// How to select the strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StrikeSelection {
    /// At-the-money (nearest listed strike to spot)
    Atm,
    /// Absolute delta target (e.g., 0.25 for a 25Δ call or put)
    Delta(f64),
    /// Percentage offset from spot (0.05 = 5% above)
    PercentOffset(f64),
    /// Fixed offset in currency from spot
    FixedOffset(f64),
    /// Specific strike value
    Absolute(f64),
}

/// Inputs shared by every template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateParams {
    pub spot: f64,
    pub time_to_expiry: f64,
    pub risk_free_rate: f64,
    #[serde(default)]
    pub dividend_yield: f64,
    /// Flat volatility used to price every leg
    pub iv: f64,
    /// Contracts per unit leg
    pub quantity: f64,
    pub multiplier: f64,
    /// Listed strike spacing; 0 disables snapping
    pub strike_step: f64,
    /// Distance of wings / second strikes from spot, as a fraction of spot
    pub wing_width_pct: f64,
}

impl TemplateParams {
    pub fn new(spot: f64, time_to_expiry: f64, risk_free_rate: f64, iv: f64) -> Self {
        Self {
            spot,
            time_to_expiry,
            risk_free_rate,
            dividend_yield: 0.0,
            iv,
            quantity: 1.0,
            multiplier: 1.0,
            strike_step: 0.0,
            wing_width_pct: 0.05,
        }
    }

    pub fn with_dividend(mut self, dividend_yield: f64) -> Self {
        self.dividend_yield = dividend_yield;
        self
    }

    pub fn with_quantity(mut self, quantity: f64, multiplier: f64) -> Self {
        self.quantity = quantity;
        self.multiplier = multiplier;
        self
    }

    pub fn with_strike_step(mut self, strike_step: f64) -> Self {
        self.strike_step = strike_step;
        self
    }

    pub fn with_wing_width(mut self, wing_width_pct: f64) -> Self {
        self.wing_width_pct = wing_width_pct;
        self
    }

    fn validate(&self) -> Result<()> {
        let positive = [
            ("spot", self.spot),
            ("time_to_expiry", self.time_to_expiry),
            ("iv", self.iv),
            ("quantity", self.quantity),
            ("multiplier", self.multiplier),
            ("wing_width_pct", self.wing_width_pct),
        ];
        if let Some((name, v)) = positive.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            return Err(StrategyError::InvalidTemplate(format!(
                "{} must be positive, got {}",
                name, v
            )));
        }
        if !(self.strike_step.is_finite() && self.strike_step >= 0.0) {
            return Err(StrategyError::InvalidTemplate(format!(
                "strike_step must be non-negative, got {}",
                self.strike_step
            )));
        }
        Ok(())
    }

    fn snap(&self, strike: f64) -> f64 {
        if self.strike_step > 0.0 {
            ((strike / self.strike_step).round() * self.strike_step).max(self.strike_step)
        } else {
            strike
        }
    }
}

impl StrikeSelection {
    /// Concrete strike for this selection, snapped to the strike grid.
    pub fn resolve(&self, option_type: OptionType, params: &TemplateParams) -> Result<f64> {
        let raw = match *self {
            StrikeSelection::Atm => params.spot,
            StrikeSelection::PercentOffset(p) => params.spot * (1.0 + p),
            StrikeSelection::FixedOffset(x) => params.spot + x,
            StrikeSelection::Absolute(k) => return Ok(k),
            StrikeSelection::Delta(d) => strike_for_delta(d, option_type, params)?,
        };
        let strike = params.snap(raw);
        if !(strike.is_finite() && strike > 0.0) {
            return Err(StrategyError::InvalidTemplate(format!(
                "{:?} resolves to a non-positive strike {}",
                self, strike
            )));
        }
        Ok(strike)
    }
}

/// Strike whose Black-Scholes delta equals `|target|` in magnitude.
///
/// Inverts `Δ = ±e^(-qT)·N(±d1)` for d1, then solves d1 for K.
pub fn strike_for_delta(target: f64, option_type: OptionType, params: &TemplateParams) -> Result<f64> {
    let t = params.time_to_expiry;
    let sigma = params.iv;
    let q = params.dividend_yield;
    let p = target.abs() * (q * t).exp();

    if !(p > 0.0 && p < 1.0) {
        return Err(StrategyError::InvalidTemplate(format!(
            "delta {} is not attainable for a {}",
            target, option_type
        )));
    }

    let d1 = match option_type {
        OptionType::Call => norm_inv_cdf(p),
        OptionType::Put => -norm_inv_cdf(p),
    };
    let sqrt_t = t.sqrt();
    Ok(params.spot
        * (-d1 * sigma * sqrt_t + (params.risk_free_rate - q + 0.5 * sigma * sigma) * t).exp())
}

/// Leg blueprint before strike resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLeg {
    pub id: String,
    pub option_type: OptionType,
    pub strike_selection: StrikeSelection,
    /// Multiples of `TemplateParams::quantity` (positive = long)
    pub ratio: f64,
}

fn tl(id: &str, option_type: OptionType, strike_selection: StrikeSelection, ratio: f64) -> TemplateLeg {
    TemplateLeg {
        id: id.to_string(),
        option_type,
        strike_selection,
        ratio,
    }
}

/// Strategy type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    // === Volatility Plays ===
    /// Long ATM call + put (long gamma, long vega)
    LongStraddle,
    /// Short ATM call + put (short gamma, positive theta)
    ShortStraddle,
    /// Long 25Δ call + put
    LongStrangle,
    /// Short 25Δ call + put
    ShortStrangle,

    // === Iron Strategies ===
    /// Short 20Δ strangle + long 10Δ wings (defined risk)
    IronCondor,
    /// Short ATM straddle + long wings
    IronButterfly,

    // === Butterfly ===
    /// Long lower call, short 2 ATM calls, long upper call
    LongCallButterfly,

    // === Verticals ===
    /// Long ATM call, short OTM call (debit)
    BullCallSpread,
    /// Long ATM put, short OTM put (debit)
    BearPutSpread,
    /// Short ATM put, long OTM put (credit)
    BullPutSpread,
    /// Short ATM call, long OTM call (credit)
    BearCallSpread,
}

impl StrategyType {
    pub fn all() -> &'static [StrategyType] {
        &[
            StrategyType::LongStraddle,
            StrategyType::ShortStraddle,
            StrategyType::LongStrangle,
            StrategyType::ShortStrangle,
            StrategyType::IronCondor,
            StrategyType::IronButterfly,
            StrategyType::LongCallButterfly,
            StrategyType::BullCallSpread,
            StrategyType::BearPutSpread,
            StrategyType::BullPutSpread,
            StrategyType::BearCallSpread,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyType::LongStraddle => "long_straddle",
            StrategyType::ShortStraddle => "short_straddle",
            StrategyType::LongStrangle => "long_strangle",
            StrategyType::ShortStrangle => "short_strangle",
            StrategyType::IronCondor => "iron_condor",
            StrategyType::IronButterfly => "iron_butterfly",
            StrategyType::LongCallButterfly => "long_call_butterfly",
            StrategyType::BullCallSpread => "bull_call_spread",
            StrategyType::BearPutSpread => "bear_put_spread",
            StrategyType::BullPutSpread => "bull_put_spread",
            StrategyType::BearCallSpread => "bear_call_spread",
        }
    }

    /// Get the legs for this strategy type.
    pub fn legs(&self, params: &TemplateParams) -> Vec<TemplateLeg> {
        use OptionType::{Call, Put};
        use StrikeSelection::{Atm, Delta, PercentOffset};

        let w = params.wing_width_pct;
        match self {
            StrategyType::LongStraddle => vec![
                tl("long_call", Call, Atm, 1.0),
                tl("long_put", Put, Atm, 1.0),
            ],
            StrategyType::ShortStraddle => vec![
                tl("short_call", Call, Atm, -1.0),
                tl("short_put", Put, Atm, -1.0),
            ],
            StrategyType::LongStrangle => vec![
                tl("long_otm_call", Call, Delta(0.25), 1.0),
                tl("long_otm_put", Put, Delta(0.25), 1.0),
            ],
            StrategyType::ShortStrangle => vec![
                tl("short_otm_call", Call, Delta(0.25), -1.0),
                tl("short_otm_put", Put, Delta(0.25), -1.0),
            ],
            StrategyType::IronCondor => vec![
                tl("short_call", Call, Delta(0.20), -1.0),
                tl("short_put", Put, Delta(0.20), -1.0),
                tl("long_call_wing", Call, Delta(0.10), 1.0),
                tl("long_put_wing", Put, Delta(0.10), 1.0),
            ],
            StrategyType::IronButterfly => vec![
                tl("short_call", Call, Atm, -1.0),
                tl("short_put", Put, Atm, -1.0),
                tl("long_call_wing", Call, PercentOffset(w), 1.0),
                tl("long_put_wing", Put, PercentOffset(-w), 1.0),
            ],
            StrategyType::LongCallButterfly => vec![
                tl("long_lower_call", Call, PercentOffset(-w), 1.0),
                tl("short_body_calls", Call, Atm, -2.0),
                tl("long_upper_call", Call, PercentOffset(w), 1.0),
            ],
            StrategyType::BullCallSpread => vec![
                tl("long_call", Call, Atm, 1.0),
                tl("short_call", Call, PercentOffset(w), -1.0),
            ],
            StrategyType::BearPutSpread => vec![
                tl("long_put", Put, Atm, 1.0),
                tl("short_put", Put, PercentOffset(-w), -1.0),
            ],
            StrategyType::BullPutSpread => vec![
                tl("short_put", Put, Atm, -1.0),
                tl("long_put", Put, PercentOffset(-w), 1.0),
            ],
            StrategyType::BearCallSpread => vec![
                tl("short_call", Call, Atm, -1.0),
                tl("long_call", Call, PercentOffset(w), 1.0),
            ],
        }
    }

    /// Pairs of leg indices `(a, b)` whose strikes must satisfy `K[a] < K[b]`.
    fn strike_order(&self) -> &'static [(usize, usize)] {
        match self {
            StrategyType::LongStraddle | StrategyType::ShortStraddle => &[],
            StrategyType::LongStrangle | StrategyType::ShortStrangle => &[(1, 0)],
            StrategyType::IronCondor => &[(3, 1), (1, 0), (0, 2)],
            StrategyType::IronButterfly => &[(3, 1), (0, 2)],
            StrategyType::LongCallButterfly => &[(0, 1), (1, 2)],
            StrategyType::BullCallSpread | StrategyType::BearCallSpread => &[(0, 1)],
            StrategyType::BearPutSpread | StrategyType::BullPutSpread => &[(1, 0)],
        }
    }

    /// Resolve strikes and price every leg at the template volatility.
    ///
    /// Fails when snapping to the strike grid collapses strikes that the
    /// structure needs apart, e.g. a spread whose two legs land on one strike.
    pub fn build(&self, params: &TemplateParams) -> Result<Strategy> {
        params.validate()?;

        let blueprints = self.legs(params);
        let strikes = blueprints
            .iter()
            .map(|b| b.strike_selection.resolve(b.option_type, params))
            .collect::<Result<Vec<f64>>>()?;

        for &(a, b) in self.strike_order() {
            if strikes[a] >= strikes[b] {
                return Err(StrategyError::InvalidTemplate(format!(
                    "{}: {} strike {} must be below {} strike {} (strike_step {}, wing_width_pct {})",
                    self.name(),
                    blueprints[a].id,
                    strikes[a],
                    blueprints[b].id,
                    strikes[b],
                    params.strike_step,
                    params.wing_width_pct
                )));
            }
        }

        let mut legs = Vec::with_capacity(blueprints.len());
        for (blueprint, strike) in blueprints.into_iter().zip(strikes) {
            let spec = LegSpec::new(
                blueprint.option_type,
                params.spot,
                strike,
                params.time_to_expiry,
                params.risk_free_rate,
            )
            .with_id(blueprint.id)
            .with_dividend(params.dividend_yield)
            .with_quantity(blueprint.ratio * params.quantity)
            .with_multiplier(params.multiplier);

            legs.push(Leg::from_volatility(spec, params.iv)?);
        }

        tracing::debug!(
            strategy = self.name(),
            legs = legs.len(),
            "template built"
        );
        Ok(Strategy::new(self.name(), legs))
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyType {
    type Err = StrategyError;

    /// Accepts `iron_condor`, `iron-condor`, `IronCondor`.
    fn from_str(s: &str) -> Result<Self> {
        let normalize = |x: &str| {
            x.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .map(|c| c.to_ascii_lowercase())
                .collect::<String>()
        };
        let wanted = normalize(s);
        StrategyType::all()
            .iter()
            .copied()
            .find(|t| normalize(t.name()) == wanted)
            .ok_or_else(|| StrategyError::UnknownTemplate(s.to_string()))
    }
}
