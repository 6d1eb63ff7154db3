//! # Text Reports
//!
//! Plain-text renderings of pricing and strategy results for the terminal.

use std::fmt::Write;

use optlab_pricing::{Greeks, IvResult, OptionParams, VolSmile};
use optlab_strategy::StrategySummary;

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |x| format!("{:.4}", x))
}

pub fn render_contract(params: &OptionParams) -> String {
    format!(
        "{} K={} S={} T={:.4}y r={:.4} q={:.4}",
        params.option_type,
        params.strike,
        params.spot,
        params.time_to_expiry,
        params.risk_free_rate,
        params.dividend_yield
    )
}

pub fn render_price(params: &OptionParams, price: f64) -> String {
    format!(
        "{}  σ={:.4}\nprice: {:.6}\n",
        render_contract(params),
        params.iv,
        price
    )
}

pub fn render_greeks(params: &OptionParams, g: &Greeks) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  σ={:.4}", render_contract(params), params.iv);
    let rows = [
        ("price", g.price),
        ("intrinsic", g.intrinsic),
        ("extrinsic", g.extrinsic),
        ("delta", g.delta),
        ("gamma", g.gamma),
        ("theta/day", g.theta),
        ("vega/1%", g.vega),
        ("rho/1%", g.rho),
        ("vanna", g.vanna),
        ("volga", g.volga),
        ("charm", g.charm),
        ("veta", g.veta),
        ("speed", g.speed),
        ("color", g.color),
        ("lambda", g.lambda),
    ];
    for (name, value) in rows {
        let _ = writeln!(out, "  {:<10} {:>14.6}", name, value);
    }
    out
}

pub fn render_iv(params: &OptionParams, premium: f64, result: &IvResult) -> String {
    format!(
        "{}  premium={:.4}\nimplied vol: {:.6} ({:.2}%)\niterations: {} ({:?})\n",
        render_contract(params),
        premium,
        result.iv,
        result.iv * 100.0,
        result.iterations,
        result.method
    )
}

pub fn render_strategy(summary: &StrategySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", summary.name);
    let _ = writeln!(
        out,
        "{:<18} {:>5} {:>10} {:>7} {:>8} {:>10} {:>8} {:>9} {:>9} {:>9} {:>9}",
        "leg", "type", "strike", "T", "qty", "premium", "iv", "delta", "gamma", "vega", "theta"
    );
    for leg in &summary.legs {
        let _ = writeln!(
            out,
            "{:<18} {:>5} {:>10.2} {:>7.4} {:>8.2} {:>10.4} {:>8.4} {:>9.4} {:>9.5} {:>9.4} {:>9.4}",
            leg.id,
            leg.option_type.to_string(),
            leg.strike,
            leg.time_to_expiry,
            leg.quantity,
            leg.premium,
            leg.iv,
            leg.delta,
            leg.gamma,
            leg.vega,
            leg.theta
        );
    }

    let g = &summary.greeks;
    let _ = writeln!(out);
    let _ = writeln!(out, "delta:        {:.6}", g.total.delta);
    let _ = writeln!(out, "gamma:        {:.6}", g.total.gamma);
    let _ = writeln!(out, "vega:         {:.6}", g.total.vega);
    let _ = writeln!(out, "theta/day:    {:.6}", g.total.theta);
    let _ = writeln!(out, "rho:          {:.6}", g.total.rho);
    let _ = writeln!(out, "dollar gamma: {:.4}", g.dollar_gamma);
    let side = if summary.net_premium >= 0.0 { "debit" } else { "credit" };
    let _ = writeln!(out, "net premium:  {:.4} ({})", summary.net_premium.abs(), side);

    let breakevens = if summary.breakevens.is_empty() {
        "-".to_string()
    } else {
        summary
            .breakevens
            .iter()
            .map(|b| format!("{:.4}", b))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let _ = writeln!(
        out,
        "breakevens:   {}  (scan {:.2}..{:.2})",
        breakevens, summary.scan_low, summary.scan_high
    );
    let _ = writeln!(out, "max profit:   {}", fmt_opt(summary.max_profit));
    let _ = writeln!(out, "max loss:     {}", fmt_opt(summary.max_loss));
    out
}

pub fn render_smile(smile: &VolSmile) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "spot={} T={:.4}y ({} DTE)  points={} skipped={}",
        smile.spot,
        smile.expiry,
        smile.dte,
        smile.points.len(),
        smile.skipped
    );
    let _ = writeln!(out, "{:>10} {:>5} {:>9} {:>9} {:>9}", "strike", "type", "iv", "delta", "ln(K/S)");
    for p in &smile.points {
        let _ = writeln!(
            out,
            "{:>10.2} {:>5} {:>9.4} {:>9.4} {:>9.4}",
            p.strike,
            p.option_type.to_string(),
            p.iv,
            p.delta,
            p.moneyness
        );
    }
    let _ = writeln!(out, "atm iv:         {:.4}", smile.atm_iv);
    let _ = writeln!(out, "25d skew:       {:.4}", smile.skew_25d);
    let _ = writeln!(out, "25d risk rev:   {:.4}", smile.risk_reversal_25d);
    let _ = writeln!(out, "25d butterfly:  {:.4}", smile.butterfly_25d);
    out
}
