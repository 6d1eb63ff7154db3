//! Multi-Leg Strategies
//!
//! Aggregates a set of legs into strategy-level Greeks and an expiry P&L
//! profile (breakevens, max profit and max loss over a price grid).
//! Expiry analysis values every leg at its own payoff, so it is meaningful
//! for single-expiry structures.

use optlab_pricing::{Greeks, PortfolioGreeks};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StrategyError};
use crate::leg::Leg;

/// A named collection of legs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    pub legs: Vec<Leg>,
}

impl Strategy {
    pub fn new(name: impl Into<String>, legs: Vec<Leg>) -> Self {
        Self {
            name: name.into(),
            legs,
        }
    }

    pub fn push(&mut self, leg: Leg) {
        self.legs.push(leg);
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Underlying spot of the first leg.
    pub fn spot(&self) -> Option<f64> {
        self.legs.first().map(|l| l.spot)
    }

    /// Sum of the legs' position Greeks.
    pub fn total_greeks(&self) -> Greeks {
        self.legs
            .iter()
            .fold(Greeks::default(), |acc, leg| acc.add(&leg.position_greeks()))
    }

    pub fn delta(&self) -> f64 {
        self.legs.iter().map(|l| l.position_greeks().delta).sum()
    }

    pub fn gamma(&self) -> f64 {
        self.legs.iter().map(|l| l.position_greeks().gamma).sum()
    }

    pub fn vega(&self) -> f64 {
        self.legs.iter().map(|l| l.position_greeks().vega).sum()
    }

    pub fn theta(&self) -> f64 {
        self.legs.iter().map(|l| l.position_greeks().theta).sum()
    }

    pub fn rho(&self) -> f64 {
        self.legs.iter().map(|l| l.position_greeks().rho).sum()
    }

    /// Portfolio view with currency-denominated exposures.
    pub fn greeks(&self) -> PortfolioGreeks {
        let mut portfolio = PortfolioGreeks::new();
        for leg in &self.legs {
            portfolio.add_position(&leg.greeks, leg.spot, leg.quantity, leg.multiplier);
        }
        portfolio
    }

    /// Net opening cost. Positive is a debit, negative a credit.
    pub fn net_premium(&self) -> f64 {
        self.legs.iter().map(Leg::cost).sum()
    }

    pub fn payoff_at_expiry(&self, s_t: f64) -> f64 {
        self.legs.iter().map(|l| l.payoff_at_expiry(s_t)).sum()
    }

    pub fn pnl_at_expiry(&self, s_t: f64) -> f64 {
        self.payoff_at_expiry(s_t) - self.net_premium()
    }

    /// Price grid around the reference spot: `spot × (1 ± range_pct)`.
    pub fn scan_range(&self, range_pct: f64) -> Result<(f64, f64)> {
        let spot = self.spot().ok_or(StrategyError::EmptyStrategy)?;
        let pct = range_pct.clamp(0.0, 0.99);
        Ok((spot * (1.0 - pct), spot * (1.0 + pct)))
    }

    /// Expiry P&L at `steps + 1` evenly spaced prices in `[lo, hi]`.
    pub fn pnl_profile(&self, lo: f64, hi: f64, steps: usize) -> Vec<(f64, f64)> {
        let steps = steps.max(1);
        let dx = (hi - lo) / steps as f64;
        (0..=steps)
            .map(|i| {
                let s = lo + dx * i as f64;
                (s, self.pnl_at_expiry(s))
            })
            .collect()
    }

    /// Underlying prices where the expiry P&L crosses zero.
    ///
    /// A grid point with exactly zero P&L counts only at the edge of a zero
    /// run, so a flat zero stretch yields its end points rather than every
    /// point inside it.
    pub fn breakevens(&self, lo: f64, hi: f64, steps: usize) -> Vec<f64> {
        let profile = self.pnl_profile(lo, hi, steps);
        let mut out: Vec<f64> = Vec::new();
        let mut push = |x: f64| {
            if out.last().map_or(true, |&prev| (x - prev).abs() > 1e-9) {
                out.push(x);
            }
        };

        for (i, &(s0, p0)) in profile.iter().enumerate() {
            let prev = i.checked_sub(1).map(|j| profile[j].1);
            let next = profile.get(i + 1).map(|&(_, p)| p);

            if p0 == 0.0 {
                let nonzero = |p: Option<f64>| p.map_or(false, |p| p != 0.0);
                if nonzero(prev) || nonzero(next) {
                    push(s0);
                }
            } else if let Some(p1) = next {
                if p0 * p1 < 0.0 {
                    let s1 = profile[i + 1].0;
                    push(s0 + (s1 - s0) * p0 / (p0 - p1));
                }
            }
        }
        out
    }

    /// Largest expiry P&L on the grid.
    pub fn max_profit(&self, lo: f64, hi: f64, steps: usize) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        self.pnl_profile(lo, hi, steps)
            .into_iter()
            .map(|(_, p)| p)
            .reduce(f64::max)
    }

    /// Smallest expiry P&L on the grid (negative for a loss).
    pub fn max_loss(&self, lo: f64, hi: f64, steps: usize) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        self.pnl_profile(lo, hi, steps)
            .into_iter()
            .map(|(_, p)| p)
            .reduce(f64::min)
    }

    /// Everything a report needs about the strategy.
    pub fn summary(&self, lo: f64, hi: f64, steps: usize) -> StrategySummary {
        StrategySummary {
            name: self.name.clone(),
            legs: self.legs.iter().map(LegRow::from).collect(),
            greeks: self.greeks(),
            net_premium: self.net_premium(),
            breakevens: self.breakevens(lo, hi, steps),
            max_profit: self.max_profit(lo, hi, steps),
            max_loss: self.max_loss(lo, hi, steps),
            scan_low: lo,
            scan_high: hi,
        }
    }
}

/// Per-leg line of a strategy report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegRow {
    pub id: String,
    pub option_type: optlab_pricing::OptionType,
    pub strike: f64,
    pub time_to_expiry: f64,
    pub quantity: f64,
    pub premium: f64,
    pub iv: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
}

impl From<&Leg> for LegRow {
    fn from(leg: &Leg) -> Self {
        Self {
            id: leg.id.clone(),
            option_type: leg.option_type,
            strike: leg.strike,
            time_to_expiry: leg.time_to_expiry,
            quantity: leg.quantity,
            premium: leg.premium,
            iv: leg.iv,
            delta: leg.greeks.delta,
            gamma: leg.greeks.gamma,
            vega: leg.greeks.vega,
            theta: leg.greeks.theta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub name: String,
    pub legs: Vec<LegRow>,
    pub greeks: PortfolioGreeks,
    pub net_premium: f64,
    pub breakevens: Vec<f64>,
    pub max_profit: Option<f64>,
    pub max_loss: Option<f64>,
    pub scan_low: f64,
    pub scan_high: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leg::LegSpec;
    use approx::assert_relative_eq;
    use optlab_pricing::OptionType;

    fn leg(option_type: OptionType, strike: f64, qty: f64) -> Leg {
        let spec = LegSpec::new(option_type, 100.0, strike, 0.5, 0.03).with_quantity(qty);
        Leg::from_volatility(spec, 0.25).unwrap()
    }

    #[test]
    fn test_empty_strategy_is_flat() {
        let s = Strategy::new("empty", vec![]);
        assert_relative_eq!(s.delta(), 0.0);
        assert_relative_eq!(s.gamma(), 0.0);
        assert_relative_eq!(s.vega(), 0.0);
        assert_relative_eq!(s.net_premium(), 0.0);
        assert!(s.max_profit(50.0, 150.0, 10).is_none());
        assert!(matches!(s.scan_range(0.5), Err(StrategyError::EmptyStrategy)));
    }

    #[test]
    fn test_aggregates_are_sums_of_legs() {
        let legs = vec![
            leg(OptionType::Call, 100.0, 1.0),
            leg(OptionType::Put, 95.0, -2.0),
            leg(OptionType::Call, 110.0, 3.0),
        ];
        let s = Strategy::new("mixed", legs.clone());

        let expected_delta: f64 = legs.iter().map(|l| l.greeks.delta * l.quantity).sum();
        let expected_vega: f64 = legs.iter().map(|l| l.greeks.vega * l.quantity).sum();
        assert_relative_eq!(s.delta(), expected_delta, epsilon = 1e-12);
        assert_relative_eq!(s.vega(), expected_vega, epsilon = 1e-12);
        assert_relative_eq!(s.total_greeks().gamma, s.gamma(), epsilon = 1e-12);
        assert_relative_eq!(s.greeks().total.theta, s.theta(), epsilon = 1e-12);
        assert_relative_eq!(s.greeks().total.rho, s.rho(), epsilon = 1e-12);
        assert_eq!(s.greeks().position_count, 3);
    }

    #[test]
    fn test_long_straddle_shape() {
        let s = Strategy::new(
            "straddle",
            vec![leg(OptionType::Call, 100.0, 1.0), leg(OptionType::Put, 100.0, 1.0)],
        );

        assert!(s.gamma() > 0.0);
        assert!(s.vega() > 0.0);
        assert!(s.delta().abs() < 0.2);

        let (lo, hi) = s.scan_range(0.5).unwrap();
        let be = s.breakevens(lo, hi, 1000);
        assert_eq!(be.len(), 2);
        let debit = s.net_premium();
        assert_relative_eq!(be[0], 100.0 - debit, epsilon = 1e-6);
        assert_relative_eq!(be[1], 100.0 + debit, epsilon = 1e-6);
        assert_relative_eq!(s.max_loss(lo, hi, 1000).unwrap(), -debit, epsilon = 1e-9);
    }

    #[test]
    fn test_bull_call_spread_is_bounded() {
        let s = Strategy::new(
            "bull call",
            vec![leg(OptionType::Call, 100.0, 1.0), leg(OptionType::Call, 110.0, -1.0)],
        );
        let debit = s.net_premium();
        assert!(debit > 0.0 && debit < 10.0);

        let (lo, hi) = (50.0, 200.0);
        assert_relative_eq!(s.max_profit(lo, hi, 300).unwrap(), 10.0 - debit, epsilon = 1e-9);
        assert_relative_eq!(s.max_loss(lo, hi, 300).unwrap(), -debit, epsilon = 1e-9);

        let be = s.breakevens(lo, hi, 300);
        assert_eq!(be.len(), 1);
        assert_relative_eq!(be[0], 100.0 + debit, epsilon = 1e-6);
    }

    #[test]
    fn test_flat_zero_pnl_is_not_a_run_of_breakevens() {
        // Zero vol, OTM forward: the call costs nothing and pays only above 110
        let spec = LegSpec::new(OptionType::Call, 100.0, 110.0, 0.5, 0.03);
        let call = Leg::from_volatility(spec, 0.0).unwrap();
        assert_eq!(call.premium, 0.0);

        let s = Strategy::new("free call", vec![call]);
        assert_eq!(s.breakevens(50.0, 150.0, 200), vec![110.0]);
    }

    #[test]
    fn test_summary_round_trips_through_json() {
        let s = Strategy::new(
            "straddle",
            vec![leg(OptionType::Call, 100.0, 1.0), leg(OptionType::Put, 100.0, 1.0)],
        );
        let summary = s.summary(50.0, 150.0, 200);
        assert_eq!(summary.legs.len(), 2);
        assert_eq!(summary.breakevens.len(), 2);

        let json = serde_json::to_string(&summary).unwrap();
        let back: StrategySummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "straddle");
        assert_eq!(back.legs[1].option_type, OptionType::Put);
    }
}
