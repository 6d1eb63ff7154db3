//! Pricing error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Option has expired; implied volatility is undefined at T=0")]
    Expired,

    #[error("Premium {price:.6} outside no-arbitrage bounds [{lower:.6}, {upper:.6}]")]
    PriceOutOfBounds { price: f64, lower: f64, upper: f64 },

    #[error("Implied volatility did not converge after {iterations} iterations (last iv {last_iv:.6})")]
    NoConvergence { iterations: u32, last_iv: f64 },

    #[error("Unknown option type: {0}")]
    UnknownOptionType(String),
}

pub type Result<T> = std::result::Result<T, PricingError>;
