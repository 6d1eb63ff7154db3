//! Options Greeks Calculator
//!
//! Black-Scholes sensitivities of a European option:
//! - First-order Greeks: Delta, Gamma, Theta, Vega, Rho
//! - Second-order Greeks: Vanna, Volga (Vomma), Charm, Veta, Speed, Color
//! - Position scaling and portfolio-level aggregation
//!
//! Unit conventions: theta is per calendar day, vega per one volatility point
//! (1%), rho per one rate point (1%).

use serde::{Deserialize, Serialize};

use crate::black_scholes::{self, norm_cdf, norm_pdf, OptionParams, OptionType};

/// Days per year used to express theta per day.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Complete set of Greeks for an option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    // === First-Order Greeks ===
    /// Delta: ∂V/∂S - sensitivity to underlying price
    pub delta: f64,
    /// Gamma: ∂²V/∂S² - rate of change of delta
    pub gamma: f64,
    /// Theta: ∂V/∂t - time decay (per day)
    pub theta: f64,
    /// Vega: ∂V/∂σ - sensitivity to volatility (per 1% IV change)
    pub vega: f64,
    /// Rho: ∂V/∂r - sensitivity to interest rate (per 1% rate change)
    pub rho: f64,

    // === Second-Order Greeks ===
    /// Vanna: ∂²V/∂S∂σ
    pub vanna: f64,
    /// Volga (Vomma): ∂²V/∂σ²
    pub volga: f64,
    /// Charm: ∂Delta/∂t
    pub charm: f64,
    /// Veta: ∂Vega/∂t
    pub veta: f64,
    /// Speed: ∂Gamma/∂S
    pub speed: f64,
    /// Color: ∂Gamma/∂t
    pub color: f64,

    // === Derived Metrics ===
    /// Theoretical option price
    pub price: f64,
    /// Intrinsic value
    pub intrinsic: f64,
    /// Extrinsic (time) value
    pub extrinsic: f64,
    /// Lambda (leverage): Delta * S / V
    pub lambda: f64,
}

impl Greeks {
    /// Calculate all Greeks for given option parameters.
    pub fn calculate(params: &OptionParams) -> Self {
        let s = params.spot;
        let k = params.strike;
        let t = params.time_to_expiry;
        let r = params.risk_free_rate;
        let q = params.dividend_yield;
        let sigma = params.iv;

        if t <= 0.0 {
            return Self::at_expiry(params);
        }
        if sigma <= 0.0 {
            return Self::zero_vol(params);
        }

        let sqrt_t = t.sqrt();
        let d1 = params.d1();
        let d2 = params.d2();

        let nd1 = norm_cdf(d1);
        let nd2 = norm_cdf(d2);
        let n_neg_d1 = norm_cdf(-d1);
        let n_neg_d2 = norm_cdf(-d2);
        let pdf_d1 = norm_pdf(d1);

        let exp_qt = params.dividend_factor();
        let exp_rt = params.discount_factor();

        let price = black_scholes::price(params);

        let delta = match params.option_type {
            OptionType::Call => exp_qt * nd1,
            OptionType::Put => -exp_qt * n_neg_d1,
        };

        let gamma = exp_qt * pdf_d1 / (s * sigma * sqrt_t);

        let theta_annual = match params.option_type {
            OptionType::Call => {
                -s * exp_qt * pdf_d1 * sigma / (2.0 * sqrt_t) - r * k * exp_rt * nd2
                    + q * s * exp_qt * nd1
            }
            OptionType::Put => {
                -s * exp_qt * pdf_d1 * sigma / (2.0 * sqrt_t) + r * k * exp_rt * n_neg_d2
                    - q * s * exp_qt * n_neg_d1
            }
        };
        let theta = theta_annual / DAYS_PER_YEAR;

        let vega = s * exp_qt * pdf_d1 * sqrt_t / 100.0;

        let rho = match params.option_type {
            OptionType::Call => k * t * exp_rt * nd2 / 100.0,
            OptionType::Put => -k * t * exp_rt * n_neg_d2 / 100.0,
        };

        // Second order, all per unit σ / per year
        let vanna = -exp_qt * pdf_d1 * d2 / sigma;
        let volga = vega * 100.0 * d1 * d2 / sigma;

        let charm_core =
            pdf_d1 * (2.0 * (r - q) * t - d2 * sigma * sqrt_t) / (2.0 * t * sigma * sqrt_t);
        let charm = match params.option_type {
            OptionType::Call => exp_qt * (q * nd1 - charm_core),
            OptionType::Put => -exp_qt * (q * n_neg_d1 + charm_core),
        };

        let veta = -s
            * exp_qt
            * pdf_d1
            * sqrt_t
            * (q + (r - q) * d1 / (sigma * sqrt_t) - (1.0 + d1 * d2) / (2.0 * t));

        let speed = -gamma * (1.0 + d1 / (sigma * sqrt_t)) / s;

        let color = -exp_qt * pdf_d1 / (2.0 * s * t * sigma * sqrt_t)
            * (2.0 * q * t
                + 1.0
                + d1 * (2.0 * (r - q) * t - d2 * sigma * sqrt_t) / (sigma * sqrt_t));

        let intrinsic = params.intrinsic();
        let extrinsic = (price - intrinsic).max(0.0);
        let lambda = if price > 0.0 { delta * s / price } else { 0.0 };

        Greeks {
            delta,
            gamma,
            theta,
            vega,
            rho,
            vanna,
            volga,
            charm,
            veta,
            speed,
            color,
            price,
            intrinsic,
            extrinsic,
            lambda,
        }
    }

    /// Greeks at expiry (T=0): step-function delta, everything else flat.
    fn at_expiry(params: &OptionParams) -> Self {
        let intrinsic = params.intrinsic();
        let delta = match params.option_type {
            OptionType::Call if params.spot > params.strike => 1.0,
            OptionType::Put if params.spot < params.strike => -1.0,
            _ => 0.0,
        };

        Greeks {
            delta,
            price: intrinsic,
            intrinsic,
            ..Default::default()
        }
    }

    /// Greeks with zero volatility: the option is a discounted forward payoff.
    fn zero_vol(params: &OptionParams) -> Self {
        let forward = params.forward();
        let exp_qt = params.dividend_factor();
        let price = black_scholes::price(params);

        let delta = match params.option_type {
            OptionType::Call if forward > params.strike => exp_qt,
            OptionType::Put if forward < params.strike => -exp_qt,
            _ => 0.0,
        };

        let intrinsic = params.intrinsic();
        Greeks {
            delta,
            price,
            intrinsic,
            extrinsic: (price - intrinsic).max(0.0),
            ..Default::default()
        }
    }

    /// Apply `f` to every additive field; `lambda` is left untouched.
    fn map(&self, f: impl Fn(f64) -> f64) -> Greeks {
        self.zip(self, |a, _| f(a))
    }

    fn zip(&self, other: &Greeks, f: impl Fn(f64, f64) -> f64) -> Greeks {
        Greeks {
            delta: f(self.delta, other.delta),
            gamma: f(self.gamma, other.gamma),
            theta: f(self.theta, other.theta),
            vega: f(self.vega, other.vega),
            rho: f(self.rho, other.rho),
            vanna: f(self.vanna, other.vanna),
            volga: f(self.volga, other.volga),
            charm: f(self.charm, other.charm),
            veta: f(self.veta, other.veta),
            speed: f(self.speed, other.speed),
            color: f(self.color, other.color),
            price: f(self.price, other.price),
            intrinsic: f(self.intrinsic, other.intrinsic),
            extrinsic: f(self.extrinsic, other.extrinsic),
            lambda: self.lambda,
        }
    }

    /// Greeks of `units` contracts (negative for a short position).
    /// Lambda is a ratio and keeps its per-option value.
    pub fn scale(&self, units: f64) -> Greeks {
        self.map(|g| g * units)
    }

    /// Sum of two positions. Lambda has no portfolio meaning and is zeroed.
    pub fn add(&self, other: &Greeks) -> Greeks {
        Greeks {
            lambda: 0.0,
            ..self.zip(other, |a, b| a + b)
        }
    }
}

/// Position-weighted Greeks of a book, with spot-denominated exposures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioGreeks {
    pub total: Greeks,
    pub position_count: usize,
    /// Signed delta in currency: Σ Δ·S
    pub dollar_delta: f64,
    /// Gross delta in currency: Σ |Δ·S|
    pub notional_delta: f64,
    /// P&L from gamma on a 1% spot move: Σ Γ·S²·0.01² / 2
    pub dollar_gamma: f64,
}

impl PortfolioGreeks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `qty` contracts of `multiplier` units each, on an underlying at `spot`.
    pub fn add_position(&mut self, greeks: &Greeks, spot: f64, qty: f64, multiplier: f64) {
        let position = greeks.scale(qty * multiplier);
        let delta_cash = position.delta * spot;

        self.total = self.total.add(&position);
        self.position_count += 1;
        self.dollar_delta += delta_cash;
        self.notional_delta += delta_cash.abs();
        self.dollar_gamma += 0.5 * position.gamma * (0.01 * spot).powi(2);
    }

    pub fn is_delta_neutral(&self, threshold: f64) -> bool {
        self.total.delta.abs() <= threshold
    }

    pub fn is_long_gamma(&self) -> bool {
        self.total.gamma > 0.0
    }

    /// Earning time decay.
    pub fn is_positive_theta(&self) -> bool {
        self.total.theta > 0.0
    }
}
