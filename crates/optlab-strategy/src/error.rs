//! Strategy error types.

use optlab_pricing::PricingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Leg {leg}: {source}")]
    LegPricing {
        leg: String,
        #[source]
        source: PricingError,
    },

    #[error("Invalid leg: {0}")]
    InvalidLeg(String),

    #[error("Strategy has no legs")]
    EmptyStrategy,

    #[error("Unknown strategy template: {0}")]
    UnknownTemplate(String),

    #[error("Invalid template parameters: {0}")]
    InvalidTemplate(String),
}

pub type Result<T> = std::result::Result<T, StrategyError>;
