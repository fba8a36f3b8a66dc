#![deny(warnings)]

//! Strategic narrative over a finished forecast.
//!
//! Reads the output bundle and produces three text blocks driven by fixed
//! benchmarks on LTV/CAC, payback period, and cash runway: core strengths
//! ("the flywheel"), core weaknesses ("the brutal facts"), and a single
//! strategic recommendation ("the crossroads"). Also hosts the analyst
//! query stub, which answers offline unless a credential is configured.

use fin_core::ForecastBundle;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// LTV/CAC above this marks an efficient growth engine.
const LTV_CAC_STRONG: f64 = 3.0;
/// LTV/CAC below this marks the growth engine as broken.
const LTV_CAC_WEAK: f64 = 2.0;
/// Payback faster than this (months) is a strength.
const PAYBACK_FAST_MONTHS: f64 = 18.0;
/// Payback slower than this (months) is a risk.
const PAYBACK_SLOW_MONTHS: f64 = 24.0;
/// Runway at or under this many months is a near-term financing risk.
const RUNWAY_RISK_MONTHS: f64 = 12.0;
/// Sentinel runway when the trailing burn is non-negative.
const RUNWAY_UNBOUNDED: f64 = 999.0;

/// Environment variable holding the analyst credential.
pub const ANALYST_KEY_ENV: &str = "ANALYST_API_KEY";

/// The three narrative blocks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Narrative {
    /// Core strengths, one bullet per finding.
    pub flywheel: Vec<String>,
    /// Core weaknesses, one bullet per finding.
    pub brutal_facts: Vec<String>,
    /// The single strategic recommendation.
    pub crossroads: String,
}

/// Derived figures the narrative is judged on.
#[derive(Clone, Copy, Debug, Default)]
struct Diagnostics {
    runway_months: f64,
    breakeven_period: Option<usize>,
    final_ltv_cac: f64,
    final_payback: f64,
}

fn diagnose(bundle: &ForecastBundle) -> Diagnostics {
    let ebitda = &bundle.pnl.ebitda;
    let trailing = &ebitda[ebitda.len().saturating_sub(12)..];
    let trailing_burn = trailing.iter().sum::<f64>() / trailing.len().max(1) as f64;
    let ending_cash = bundle.balance.cash.last().copied().unwrap_or(0.0);
    let runway_months = if trailing_burn < 0.0 {
        ending_cash / trailing_burn.abs()
    } else {
        RUNWAY_UNBOUNDED
    };
    Diagnostics {
        runway_months,
        breakeven_period: ebitda.iter().position(|&e| e > 0.0),
        final_ltv_cac: bundle.kpis.ltv_to_cac.last().copied().unwrap_or(0.0),
        final_payback: bundle.kpis.payback_months.last().copied().unwrap_or(0.0),
    }
}

/// Generate the narrative for a forecast bundle.
pub fn generate_narrative(bundle: &ForecastBundle) -> Narrative {
    let d = diagnose(bundle);
    debug!(
        runway = d.runway_months,
        ltv_cac = d.final_ltv_cac,
        payback = d.final_payback,
        "narrative diagnostics"
    );

    let mut flywheel = Vec::new();
    let mut brutal_facts = Vec::new();

    if d.final_ltv_cac > LTV_CAC_STRONG {
        flywheel.push(format!(
            "Strong capital efficiency: the model projects a final LTV/CAC ratio of \
             {:.1}x, above the {:.1}x benchmark for a healthy, scalable GTM motion.",
            d.final_ltv_cac, LTV_CAC_STRONG
        ));
    }
    if d.final_payback > 0.0 && d.final_payback < PAYBACK_FAST_MONTHS {
        flywheel.push(format!(
            "Fast sales velocity: with a payback period of {:.1} months, new customers \
             become profitable quickly, allowing rapid reinvestment in growth.",
            d.final_payback
        ));
    }
    if let Some(t) = d.breakeven_period {
        let label = bundle
            .periods
            .get(t)
            .cloned()
            .unwrap_or_else(|| format!("period {t}"));
        flywheel.push(format!(
            "Path to profitability: the business reaches EBITDA breakeven in {label}, \
             demonstrating a clear path to self-sustainability."
        ));
    }

    if d.runway_months <= RUNWAY_RISK_MONTHS {
        brutal_facts.push(format!(
            "Limited cash runway: the current burn rate leaves only {:.0} months of \
             runway, creating significant near-term financing risk.",
            d.runway_months
        ));
    }
    if d.final_ltv_cac < LTV_CAC_WEAK {
        brutal_facts.push(format!(
            "Inefficient growth engine: the LTV/CAC ratio of {:.1}x is below the {:.1}x \
             survival benchmark; acquisition spend outruns customer lifetime value.",
            d.final_ltv_cac, LTV_CAC_WEAK
        ));
    }
    if d.final_payback > PAYBACK_SLOW_MONTHS {
        brutal_facts.push(format!(
            "Slow capital recovery: a payback period of {:.1} months ties capital up for \
             over two years per new customer, constraining growth without external funding.",
            d.final_payback
        ));
    }

    if flywheel.is_empty() {
        flywheel.push(
            "The model does not currently indicate a strong, self-sustaining growth \
             flywheel; efficiency and profitability metrics sit below standard benchmarks."
                .to_string(),
        );
    }
    if brutal_facts.is_empty() {
        brutal_facts.push(
            "No immediate critical risks against standard financial benchmarks; the \
             primary focus should be scaling the existing strengths."
                .to_string(),
        );
    }

    let crossroads = if d.runway_months < RUNWAY_RISK_MONTHS && d.final_ltv_cac > LTV_CAC_STRONG {
        "Secure funding immediately to fuel the highly efficient growth engine before \
         capital runs out."
            .to_string()
    } else if d.final_ltv_cac < LTV_CAC_WEAK {
        "Pause aggressive growth and re-evaluate the GTM strategy to fix the underlying \
         capital-efficiency problems."
            .to_string()
    } else {
        "Decide between optimizing the current model for efficiency and aggressively \
         funding the existing GTM motion to capture market share."
            .to_string()
    };

    Narrative {
        flywheel,
        brutal_facts,
        crossroads,
    }
}

/// Free-text analyst query against a finished forecast.
///
/// Without a configured credential this answers with a fixed offline
/// message; with one it acknowledges the query. The actual model call is
/// intentionally not wired up here.
pub fn query_analyst(query: &str, _bundle: &ForecastBundle) -> String {
    if std::env::var(ANALYST_KEY_ENV).is_err() {
        return format!(
            "The analyst is offline. Set {ANALYST_KEY_ENV} to enable scenario queries."
        );
    }
    format!("The analyst is processing your query: '{query}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fin_core::Assumptions;

    fn bundle_with(ebitda_tail: f64, ending_cash: f64, ltv_cac: f64, payback: f64) -> ForecastBundle {
        let mut b = fin_model::run_forecast(&Assumptions::baseline());
        let n = b.pnl.ebitda.len();
        for v in b.pnl.ebitda[n - 12..].iter_mut() {
            *v = ebitda_tail;
        }
        *b.balance.cash.last_mut().unwrap() = ending_cash;
        *b.kpis.ltv_to_cac.last_mut().unwrap() = ltv_cac;
        *b.kpis.payback_months.last_mut().unwrap() = payback;
        b
    }

    #[test]
    fn efficient_fast_scenario_fills_the_flywheel() {
        let b = bundle_with(10_000.0, 500_000.0, 5.0, 10.0);
        let n = generate_narrative(&b);
        assert!(n.flywheel.iter().any(|s| s.contains("capital efficiency")));
        assert!(n.flywheel.iter().any(|s| s.contains("sales velocity")));
        assert!(n.flywheel.iter().any(|s| s.contains("breakeven")));
        assert!(n.brutal_facts.iter().any(|s| s.contains("No immediate")));
    }

    #[test]
    fn short_runway_with_efficient_engine_demands_funding() {
        // Burning 100k/month with 500k in the bank: five months of runway.
        let mut b = bundle_with(-100_000.0, 500_000.0, 5.0, 10.0);
        for v in b.pnl.ebitda.iter_mut() {
            *v = -100_000.0;
        }
        let n = generate_narrative(&b);
        assert!(n.brutal_facts.iter().any(|s| s.contains("cash runway")));
        assert!(n.crossroads.contains("Secure funding immediately"));
    }

    #[test]
    fn weak_unit_economics_trigger_the_brutal_facts() {
        let b = bundle_with(-50_000.0, 10_000_000.0, 1.2, 30.0);
        let n = generate_narrative(&b);
        assert!(n.brutal_facts.iter().any(|s| s.contains("Inefficient growth engine")));
        assert!(n.brutal_facts.iter().any(|s| s.contains("Slow capital recovery")));
        assert!(n.crossroads.contains("Pause aggressive growth"));
    }

    #[test]
    fn analyst_is_offline_without_credential() {
        // Assumes the test environment does not define the key.
        let b = fin_model::run_forecast(&Assumptions::baseline());
        let reply = query_analyst("why is runway short?", &b);
        assert!(reply.contains("offline"));
    }
}
