//! Black-Scholes-Merton Pricing
//!
//! Closed-form valuation of European options with a continuous dividend yield:
//! - `d1`/`d2` terms and the standard normal helpers
//! - Call and put prices, with the T=0 and σ=0 limits handled explicitly
//! - No-arbitrage price bounds used by the implied volatility solver

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{PricingError, Result};

/// Standard normal PDF: φ(x) = (1/√(2π)) * e^(-x²/2)
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Standard normal CDF: Φ(x)
pub fn norm_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Inverse standard normal CDF: Φ⁻¹(p) for p in (0, 1).
///
/// # Panics
/// Panics if `p` is outside `[0, 1]`; the endpoints map to ∓∞.
pub fn norm_inv_cdf(p: f64) -> f64 {
    Normal::standard().inverse_cdf(p)
}

/// Option type (Call or Put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// +1 for calls, -1 for puts.
    pub fn sign(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(PricingError::UnknownOptionType(other.to_string())),
        }
    }
}

/// Input parameters for pricing and Greeks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionParams {
    /// Current spot price of underlying
    pub spot: f64,
    /// Strike price
    pub strike: f64,
    /// Time to expiration in years (e.g., 30 days = 30/365)
    pub time_to_expiry: f64,
    /// Risk-free interest rate (annualized, continuously compounded)
    pub risk_free_rate: f64,
    /// Volatility (annualized, e.g., 0.20 for 20%)
    pub iv: f64,
    /// Dividend yield (annualized, continuous)
    #[serde(default)]
    pub dividend_yield: f64,
    /// Option type
    pub option_type: OptionType,
}

impl OptionParams {
    /// Create new option parameters with zero dividend yield.
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
        iv: f64,
        option_type: OptionType,
    ) -> Self {
        Self {
            spot,
            strike,
            time_to_expiry,
            risk_free_rate,
            iv,
            dividend_yield: 0.0,
            option_type,
        }
    }

    /// Set dividend yield.
    pub fn with_dividend(mut self, dividend_yield: f64) -> Self {
        self.dividend_yield = dividend_yield;
        self
    }

    /// Replace the volatility.
    pub fn with_iv(mut self, iv: f64) -> Self {
        self.iv = iv;
        self
    }

    /// Check that the inputs describe a priceable contract.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("spot", self.spot),
            ("strike", self.strike),
            ("time_to_expiry", self.time_to_expiry),
            ("risk_free_rate", self.risk_free_rate),
            ("iv", self.iv),
            ("dividend_yield", self.dividend_yield),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(PricingError::InvalidInput(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }
        if self.spot <= 0.0 {
            return Err(PricingError::InvalidInput(format!(
                "spot must be positive, got {}",
                self.spot
            )));
        }
        if self.strike <= 0.0 {
            return Err(PricingError::InvalidInput(format!(
                "strike must be positive, got {}",
                self.strike
            )));
        }
        if self.time_to_expiry < 0.0 {
            return Err(PricingError::InvalidInput(format!(
                "time_to_expiry must be non-negative, got {}",
                self.time_to_expiry
            )));
        }
        if self.iv < 0.0 {
            return Err(PricingError::InvalidInput(format!(
                "volatility must be non-negative, got {}",
                self.iv
            )));
        }
        Ok(())
    }

    /// d1 term. Zero when T or σ is not positive.
    pub fn d1(&self) -> f64 {
        if self.time_to_expiry <= 0.0 || self.iv <= 0.0 {
            return 0.0;
        }
        let sqrt_t = self.time_to_expiry.sqrt();
        ((self.spot / self.strike).ln()
            + (self.risk_free_rate - self.dividend_yield + 0.5 * self.iv * self.iv)
                * self.time_to_expiry)
            / (self.iv * sqrt_t)
    }

    /// d2 = d1 - σ√T
    pub fn d2(&self) -> f64 {
        self.d1() - self.iv * self.time_to_expiry.max(0.0).sqrt()
    }

    /// Moneyness: ln(S/K)
    pub fn moneyness(&self) -> f64 {
        (self.spot / self.strike).ln()
    }

    /// Forward price F = S * e^((r-q)T)
    pub fn forward(&self) -> f64 {
        self.spot * ((self.risk_free_rate - self.dividend_yield) * self.time_to_expiry).exp()
    }

    /// Discount factor e^(-rT)
    pub fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_expiry).exp()
    }

    /// Dividend discount factor e^(-qT)
    pub fn dividend_factor(&self) -> f64 {
        (-self.dividend_yield * self.time_to_expiry).exp()
    }

    /// Intrinsic value at the current spot.
    pub fn intrinsic(&self) -> f64 {
        intrinsic(self.option_type, self.spot, self.strike)
    }
}

/// Payoff of one option at expiry.
pub fn intrinsic(option_type: OptionType, spot: f64, strike: f64) -> f64 {
    match option_type {
        OptionType::Call => (spot - strike).max(0.0),
        OptionType::Put => (strike - spot).max(0.0),
    }
}

/// Theoretical Black-Scholes price.
pub fn price(params: &OptionParams) -> f64 {
    let s = params.spot;
    let k = params.strike;
    let t = params.time_to_expiry;

    if t <= 0.0 {
        return params.intrinsic();
    }

    let df = params.discount_factor();
    if params.iv <= 0.0 {
        return df * intrinsic(params.option_type, params.forward(), k);
    }

    let d1 = params.d1();
    let d2 = params.d2();
    let qf = params.dividend_factor();

    match params.option_type {
        OptionType::Call => s * qf * norm_cdf(d1) - k * df * norm_cdf(d2),
        OptionType::Put => k * df * norm_cdf(-d2) - s * qf * norm_cdf(-d1),
    }
}

/// No-arbitrage band `(lower, upper)` for the option premium.
pub fn price_bounds(params: &OptionParams) -> (f64, f64) {
    let pv_spot = params.spot * params.dividend_factor();
    let pv_strike = params.strike * params.discount_factor();
    match params.option_type {
        OptionType::Call => ((pv_spot - pv_strike).max(0.0), pv_spot),
        OptionType::Put => ((pv_strike - pv_spot).max(0.0), pv_strike),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hull(option_type: OptionType) -> OptionParams {
        // Hull, Options Futures and Other Derivatives, Example 15.6
        OptionParams::new(42.0, 40.0, 0.5, 0.10, 0.20, option_type)
    }

    #[test]
    fn test_reference_prices() {
        assert_relative_eq!(price(&hull(OptionType::Call)), 4.7594, epsilon = 1e-4);
        assert_relative_eq!(price(&hull(OptionType::Put)), 0.8086, epsilon = 1e-4);
    }

    #[test]
    fn test_d1_d2() {
        let p = hull(OptionType::Call);
        assert_relative_eq!(p.d1(), 0.7693, epsilon = 1e-4);
        assert_relative_eq!(p.d2(), 0.6278, epsilon = 1e-4);
    }

    #[test]
    fn test_put_call_parity_with_dividend() {
        let call = OptionParams::new(100.0, 95.0, 0.75, 0.04, 0.30, OptionType::Call)
            .with_dividend(0.02);
        let put = OptionParams {
            option_type: OptionType::Put,
            ..call
        };

        let lhs = price(&call) - price(&put);
        let rhs = call.spot * call.dividend_factor() - call.strike * call.discount_factor();
        assert_relative_eq!(lhs, rhs, epsilon = 1e-9);
    }

    #[test]
    fn test_expired_option_is_intrinsic() {
        let call = OptionParams::new(110.0, 100.0, 0.0, 0.05, 0.2, OptionType::Call);
        let put = OptionParams::new(110.0, 100.0, 0.0, 0.05, 0.2, OptionType::Put);
        assert_relative_eq!(price(&call), 10.0);
        assert_relative_eq!(price(&put), 0.0);
    }

    #[test]
    fn test_zero_vol_is_discounted_forward_intrinsic() {
        let call = OptionParams::new(100.0, 100.0, 1.0, 0.05, 0.0, OptionType::Call);
        let expected = (-0.05f64).exp() * (100.0 * 0.05f64.exp() - 100.0);
        assert_relative_eq!(price(&call), expected, epsilon = 1e-12);

        let put = OptionParams { option_type: OptionType::Put, ..call };
        assert_relative_eq!(price(&put), 0.0);
    }

    #[test]
    fn test_price_within_bounds() {
        for &vol in &[0.01, 0.1, 0.5, 1.5] {
            for &ot in &[OptionType::Call, OptionType::Put] {
                let p = OptionParams::new(100.0, 110.0, 1.0, 0.05, vol, ot);
                let (lo, hi) = price_bounds(&p);
                let v = price(&p);
                assert!(v >= lo - 1e-12 && v <= hi + 1e-12, "{ot} vol={vol}: {v} not in [{lo}, {hi}]");
            }
        }
    }

    #[test]
    fn test_validate_rejects_bad_inputs() {
        let good = OptionParams::new(100.0, 100.0, 1.0, 0.05, 0.2, OptionType::Call);
        assert!(good.validate().is_ok());

        assert!(OptionParams { spot: 0.0, ..good }.validate().is_err());
        assert!(OptionParams { strike: -1.0, ..good }.validate().is_err());
        assert!(OptionParams { time_to_expiry: -0.1, ..good }.validate().is_err());
        assert!(OptionParams { iv: -0.2, ..good }.validate().is_err());
        assert!(OptionParams { spot: f64::NAN, ..good }.validate().is_err());
    }

    #[test]
    fn test_option_type_parsing() {
        assert_eq!("CALL".parse::<OptionType>().unwrap(), OptionType::Call);
        assert_eq!("p".parse::<OptionType>().unwrap(), OptionType::Put);
        assert!("straddle".parse::<OptionType>().is_err());

        let json = serde_json::to_string(&OptionType::Put).unwrap();
        assert_eq!(json, "\"put\"");
    }
}
