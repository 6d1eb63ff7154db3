//! Volatility Smile
//!
//! Implied volatility across strikes at a single expiry:
//! - IV per quote via the implied volatility solver
//! - ATM interpolation
//! - 25Δ skew, risk reversal and butterfly

use serde::{Deserialize, Serialize};

use crate::black_scholes::{OptionParams, OptionType};
use crate::greeks::Greeks;
use crate::implied_vol::{implied_vol, IvSolverConfig};

/// One option quote on the chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmileQuote {
    pub strike: f64,
    pub premium: f64,
    pub option_type: OptionType,
}

/// A point on the volatility smile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolPoint {
    /// Strike price
    pub strike: f64,
    /// Time to expiry in years
    pub expiry: f64,
    /// Implied volatility
    pub iv: f64,
    /// Option type used for calculation
    pub option_type: OptionType,
    /// Moneyness: ln(K/S)
    pub moneyness: f64,
    /// Delta of the option at its implied vol
    pub delta: f64,
}

/// Volatility smile at a single expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolSmile {
    pub spot: f64,
    /// Expiry in years
    pub expiry: f64,
    /// Days to expiry
    pub dte: u32,
    /// ATM volatility
    pub atm_iv: f64,
    /// Points sorted by strike
    pub points: Vec<VolPoint>,
    /// Quotes the solver rejected
    pub skipped: usize,
    /// Skew: 25Δ put IV - 25Δ call IV
    pub skew_25d: f64,
    /// Butterfly: (25Δ put IV + 25Δ call IV) / 2 - ATM IV
    pub butterfly_25d: f64,
    /// Risk reversal: 25Δ call IV - 25Δ put IV
    pub risk_reversal_25d: f64,
}

impl VolSmile {
    /// Build a smile from option quotes.
    pub fn from_quotes(
        spot: f64,
        expiry: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
        quotes: &[SmileQuote],
        config: &IvSolverConfig,
    ) -> Self {
        let dte = (expiry * 365.0).round().max(0.0) as u32;
        let mut points = Vec::with_capacity(quotes.len());
        let mut skipped = 0;

        for quote in quotes {
            let result = implied_vol(
                quote.premium,
                spot,
                quote.strike,
                expiry,
                risk_free_rate,
                dividend_yield,
                quote.option_type,
                config,
            );

            match result {
                Ok(iv_result) => {
                    let params = OptionParams::new(
                        spot,
                        quote.strike,
                        expiry,
                        risk_free_rate,
                        iv_result.iv,
                        quote.option_type,
                    )
                    .with_dividend(dividend_yield);
                    let greeks = Greeks::calculate(&params);

                    points.push(VolPoint {
                        strike: quote.strike,
                        expiry,
                        iv: iv_result.iv,
                        option_type: quote.option_type,
                        moneyness: (quote.strike / spot).ln(),
                        delta: greeks.delta,
                    });
                }
                Err(e) => {
                    tracing::debug!(
                        strike = quote.strike,
                        premium = quote.premium,
                        option_type = %quote.option_type,
                        error = %e,
                        "skipping quote"
                    );
                    skipped += 1;
                }
            }
        }

        points.sort_by(|a, b| a.strike.total_cmp(&b.strike));

        let atm_iv = interpolate_iv_at_strike(&points, spot);
        let (skew_25d, butterfly_25d, risk_reversal_25d) = skew_metrics(&points, atm_iv);

        VolSmile {
            spot,
            expiry,
            dte,
            atm_iv,
            points,
            skipped,
            skew_25d,
            butterfly_25d,
            risk_reversal_25d,
        }
    }

    /// Linearly interpolated IV at a strike, flat beyond the wings.
    pub fn iv_at_strike(&self, strike: f64) -> Option<f64> {
        if self.points.is_empty() {
            None
        } else {
            Some(interpolate_iv_at_strike(&self.points, strike))
        }
    }

    /// IV of the point whose delta is closest to `target_delta`.
    pub fn iv_at_delta(&self, target_delta: f64) -> Option<f64> {
        self.points
            .iter()
            .min_by(|a, b| {
                (a.delta - target_delta)
                    .abs()
                    .total_cmp(&(b.delta - target_delta).abs())
            })
            .map(|p| p.iv)
    }
}

fn interpolate_iv_at_strike(points: &[VolPoint], target_strike: f64) -> f64 {
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return 0.0,
    };
    if target_strike <= first.strike {
        return first.iv;
    }
    if target_strike >= last.strike {
        return last.iv;
    }

    for w in points.windows(2) {
        let (a, b) = (&w[0], &w[1]);
        if a.strike <= target_strike && target_strike <= b.strike {
            if b.strike == a.strike {
                return 0.5 * (a.iv + b.iv);
            }
            let t = (target_strike - a.strike) / (b.strike - a.strike);
            return a.iv + t * (b.iv - a.iv);
        }
    }
    last.iv
}

/// Returns `(skew, butterfly, risk_reversal)`; zero when the wings are missing.
fn skew_metrics(points: &[VolPoint], atm_iv: f64) -> (f64, f64, f64) {
    let closest = |option_type: OptionType, target: f64| {
        points
            .iter()
            .filter(|p| p.option_type == option_type)
            .filter(|p| (p.delta - target).abs() <= 0.05)
            .min_by(|a, b| (a.delta - target).abs().total_cmp(&(b.delta - target).abs()))
            .map(|p| p.iv)
    };

    match (closest(OptionType::Put, -0.25), closest(OptionType::Call, 0.25)) {
        (Some(put_iv), Some(call_iv)) => {
            let skew = put_iv - call_iv;
            let butterfly = if atm_iv > 0.0 {
                (put_iv + call_iv) / 2.0 - atm_iv
            } else {
                0.0
            };
            (skew, butterfly, -skew)
        }
        _ => (0.0, 0.0, 0.0),
    }
}
