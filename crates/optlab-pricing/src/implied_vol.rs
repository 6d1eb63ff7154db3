//! Implied Volatility
//!
//! Inverts the Black-Scholes price for σ. Newton-Raphson on vega starting
//! from a caller-supplied guess, safeguarded by a shrinking bracket: any step
//! that leaves the bracket, or meets a vanishing vega, falls back to
//! bisection.

use serde::{Deserialize, Serialize};

use crate::black_scholes::{price, price_bounds, OptionParams, OptionType};
use crate::error::{PricingError, Result};
use crate::greeks::Greeks;

/// Solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IvSolverConfig {
    /// Starting volatility for the Newton iteration
    pub initial_guess: f64,
    /// Absolute price tolerance
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Lower edge of the search bracket
    pub min_vol: f64,
    /// Upper edge of the search bracket
    pub max_vol: f64,
}

impl Default for IvSolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.2,
            tolerance: 1e-8,
            max_iterations: 100,
            min_vol: 1e-4,
            max_vol: 5.0,
        }
    }
}

impl IvSolverConfig {
    pub fn with_guess(mut self, initial_guess: f64) -> Self {
        self.initial_guess = initial_guess;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.min_vol > 0.0 && self.max_vol > self.min_vol && self.max_vol.is_finite()) {
            return Err(PricingError::InvalidInput(format!(
                "solver bracket [{}, {}] is not a valid volatility range",
                self.min_vol, self.max_vol
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(PricingError::InvalidInput(format!(
                "solver tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if !self.initial_guess.is_finite() {
            return Err(PricingError::InvalidInput(
                "initial guess must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which step produced the final iterate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IvMethod {
    Newton,
    Bisection,
}

/// IV calculation result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IvResult {
    pub iv: f64,
    pub iterations: u32,
    pub converged: bool,
    pub method: IvMethod,
    /// Steps taken by bisection instead of Newton
    pub bisection_steps: u32,
}

/// Solve for the volatility that reproduces `market_price`.
#[allow(clippy::too_many_arguments)]
pub fn implied_vol(
    market_price: f64,
    spot: f64,
    strike: f64,
    time_to_expiry: f64,
    risk_free_rate: f64,
    dividend_yield: f64,
    option_type: OptionType,
    config: &IvSolverConfig,
) -> Result<IvResult> {
    config.validate()?;

    let guess = config.initial_guess.clamp(config.min_vol, config.max_vol);
    let base = OptionParams::new(spot, strike, time_to_expiry, risk_free_rate, guess, option_type)
        .with_dividend(dividend_yield);
    base.validate()?;

    if !market_price.is_finite() || market_price < 0.0 {
        return Err(PricingError::InvalidInput(format!(
            "market price must be a non-negative number, got {}",
            market_price
        )));
    }
    if time_to_expiry == 0.0 {
        return Err(PricingError::Expired);
    }

    // Both bounds are only reached in the σ → 0 and σ → ∞ limits.
    let (lower, upper) = price_bounds(&base);
    if market_price <= lower || market_price >= upper {
        return Err(PricingError::PriceOutOfBounds {
            price: market_price,
            lower,
            upper,
        });
    }

    // Price is increasing in σ, so the bracket edges fix the solvable range.
    let objective = |iv: f64| price(&base.with_iv(iv)) - market_price;
    let f_lo = objective(config.min_vol);
    let f_hi = objective(config.max_vol);
    if f_lo > config.tolerance || f_hi < -config.tolerance {
        return Err(PricingError::PriceOutOfBounds {
            price: market_price,
            lower: f_lo + market_price,
            upper: f_hi + market_price,
        });
    }

    let mut lo = config.min_vol;
    let mut hi = config.max_vol;
    let mut iv = guess;
    let mut method = IvMethod::Newton;
    let mut bisection_steps = 0;

    for i in 0..config.max_iterations {
        let greeks = Greeks::calculate(&base.with_iv(iv));
        let diff = greeks.price - market_price;

        if diff.abs() < config.tolerance {
            tracing::debug!(
                iv,
                iterations = i + 1,
                ?method,
                "implied volatility converged"
            );
            return Ok(IvResult {
                iv,
                iterations: i + 1,
                converged: true,
                method,
                bisection_steps,
            });
        }

        if diff < 0.0 {
            lo = iv;
        } else {
            hi = iv;
        }

        // Vega in terms of σ (not %)
        let vega_sigma = greeks.vega * 100.0;
        let newton = iv - diff / vega_sigma;

        if vega_sigma > 1e-10 && newton > lo && newton < hi {
            iv = newton;
            method = IvMethod::Newton;
        } else {
            iv = 0.5 * (lo + hi);
            method = IvMethod::Bisection;
            bisection_steps += 1;
        }
    }

    tracing::warn!(
        market_price,
        strike,
        last_iv = iv,
        iterations = config.max_iterations,
        "implied volatility did not converge"
    );
    Err(PricingError::NoConvergence {
        iterations: config.max_iterations,
        last_iv: iv,
    })
}

/// Solve with the default solver settings and an explicit starting guess.
pub fn implied_vol_with_guess(
    market_price: f64,
    params: &OptionParams,
    initial_guess: f64,
) -> Result<IvResult> {
    implied_vol(
        market_price,
        params.spot,
        params.strike,
        params.time_to_expiry,
        params.risk_free_rate,
        params.dividend_yield,
        params.option_type,
        &IvSolverConfig::default().with_guess(initial_guess),
    )
}
