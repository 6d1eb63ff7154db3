//! Two-leg book marked to market quotes.
//!
//! Long a 100 call quoted at 10 and a 110 put quoted at 5 on a 100 spot,
//! one year out at 5%. Each leg's IV is solved from its quote, then the
//! strategy Greeks are the plain sums of the leg Greeks.

use approx::assert_relative_eq;
use optlab_pricing::{Greeks, IvSolverConfig, OptionParams, OptionType};
use optlab_strategy::{Leg, LegSpec, Strategy};

fn book() -> Strategy {
    let config = IvSolverConfig::default();
    let call = Leg::from_market_price(
        LegSpec::new(OptionType::Call, 100.0, 100.0, 1.0, 0.05),
        10.0,
        &config,
    )
    .unwrap();
    let put = Leg::from_market_price(
        LegSpec::new(OptionType::Put, 100.0, 110.0, 1.0, 0.05),
        5.0,
        &config,
    )
    .unwrap();
    Strategy::new("call + put", vec![call, put])
}

#[test]
fn leg_vols_reprice_the_quotes() {
    let s = book();
    for (leg, quote) in s.legs.iter().zip([10.0, 5.0]) {
        let params = OptionParams::new(100.0, leg.strike, 1.0, 0.05, leg.iv, leg.option_type);
        assert_relative_eq!(Greeks::calculate(&params).price, quote, epsilon = 1e-7);
    }
    assert_relative_eq!(s.legs[0].iv, 0.18797, epsilon = 1e-4);
    assert_relative_eq!(s.legs[1].iv, 0.04444, epsilon = 1e-4);
}

#[test]
fn strategy_greeks_are_leg_sums() {
    let s = book();
    let (c, p) = (&s.legs[0].greeks, &s.legs[1].greeks);

    assert_relative_eq!(s.delta(), c.delta + p.delta, epsilon = 1e-12);
    assert_relative_eq!(s.gamma(), c.gamma + p.gamma, epsilon = 1e-12);
    assert_relative_eq!(s.vega(), c.vega + p.vega, epsilon = 1e-12);

    // Put delta is N(d1) - 1 with no dividend
    let same_strike_put =
        OptionParams::new(100.0, 100.0, 1.0, 0.05, s.legs[0].iv, OptionType::Put);
    assert_relative_eq!(
        Greeks::calculate(&same_strike_put).delta,
        c.delta - 1.0,
        epsilon = 1e-12
    );
}

#[test]
fn net_premium_and_expiry_pnl() {
    let s = book();
    assert_relative_eq!(s.net_premium(), 15.0, epsilon = 1e-12);

    // Between the strikes both legs pay: call S-100 plus put 110-S = 10
    assert_relative_eq!(s.pnl_at_expiry(105.0), -5.0, epsilon = 1e-9);
    assert_relative_eq!(s.pnl_at_expiry(80.0), 30.0 - 15.0, epsilon = 1e-9);

    let be = s.breakevens(50.0, 200.0, 1500);
    assert_eq!(be.len(), 2);
    assert_relative_eq!(be[0], 95.0, epsilon = 1e-6);
    assert_relative_eq!(be[1], 115.0, epsilon = 1e-6);
}
