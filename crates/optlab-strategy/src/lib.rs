//! # OptLab Strategy
//!
//! Multi-leg option positions on top of `optlab-pricing`.
//!
//! ## Description
//! - **Legs**: one option position each, marked either to a quoted premium
//!   (implied volatility solved from the quote) or to an assumed volatility.
//! - **Strategies**: linear aggregation of leg Greeks, net premium, and the
//!   expiry P&L profile with breakevens and max profit/loss.
//! - **Templates**: straddles, strangles, condors, butterflies and verticals
//!   generated from spot, expiry and volatility.

pub mod error;
pub mod leg;
pub mod strategy;
pub mod templates;

pub use error::StrategyError;
pub use leg::{Leg, LegSpec};
pub use strategy::{LegRow, Strategy, StrategySummary};
pub use templates::{strike_for_delta, StrategyType, StrikeSelection, TemplateLeg, TemplateParams};
