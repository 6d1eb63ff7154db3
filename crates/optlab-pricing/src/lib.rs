//! # OptLab Pricing
//!
//! European option valuation under Black-Scholes-Merton.
//!
//! ## Description
//! - **Pricing**: closed-form call/put prices with continuous dividend yield,
//!   including the expiry and zero-volatility limits.
//! - **Greeks**: first and second order sensitivities, position scaling and
//!   portfolio aggregation.
//! - **Implied Volatility**: safeguarded Newton-Raphson inversion of the
//!   pricer from a quoted premium.
//! - **Smile**: per-expiry implied volatility curve with 25Δ skew metrics.
//!
//! ## Usage
//! ```rust
//! use optlab_pricing::{implied_vol, Greeks, IvSolverConfig, OptionParams, OptionType};
//!
//! let params = OptionParams::new(100.0, 100.0, 1.0, 0.05, 0.2, OptionType::Call);
//! let greeks = Greeks::calculate(&params);
//! assert!(greeks.delta > 0.5);
//!
//! let iv = implied_vol(
//!     greeks.price, 100.0, 100.0, 1.0, 0.05, 0.0, OptionType::Call,
//!     &IvSolverConfig::default(),
//! )
//! .unwrap();
//! assert!((iv.iv - 0.2).abs() < 1e-6);
//! ```
//!
//! ## References
//! - Black, F., & Scholes, M. (1973). The Pricing of Options and Corporate Liabilities.
//! - Hull, J. Options, Futures, and Other Derivatives.

pub mod black_scholes;
pub mod error;
pub mod greeks;
pub mod implied_vol;
pub mod vol_surface;

pub use black_scholes::{
    intrinsic, norm_cdf, norm_inv_cdf, norm_pdf, price, price_bounds, OptionParams, OptionType,
};
pub use error::PricingError;
pub use greeks::{Greeks, PortfolioGreeks, DAYS_PER_YEAR};
pub use implied_vol::{implied_vol, implied_vol_with_guess, IvMethod, IvResult, IvSolverConfig};
pub use vol_surface::{SmileQuote, VolPoint, VolSmile};
