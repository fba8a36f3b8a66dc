//! Unit-economics KPIs.
//!
//! Pure per-period functions of series computed earlier in the pipeline.
//! Every ratio carries an explicit zero-guard: a period with no new deals
//! or no revenue reports 0, never a division error.

use crate::revenue::RevenueCost;
use fin_core::{Assumptions, FunnelTable, IncomeStatement, KpiTable, MONTHS};

/// Churn floor for the customer-lifetime estimate; keeps LTV finite when
/// churn is configured as zero.
const MIN_MONTHLY_CHURN: f64 = 0.001;

fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Compute the KPI table for one scenario.
///
/// Market-fit deals stand in for "new customers": CAC spreads the loaded
/// payroll plus commissions over them, and LTV projects the per-deal
/// market-fit revenue at gross margin over the expected customer lifetime
/// (the reciprocal of floored monthly churn).
pub fn compute_kpis(
    funnel: &FunnelTable,
    rc: &RevenueCost,
    pnl: &IncomeStatement,
    a: &Assumptions,
) -> KpiTable {
    let monthly_churn = a.platform_churn_pct / 100.0 / 12.0;
    let monthly_expansion = a.platform_expansion_pct / 100.0 / 12.0;
    // Constant inputs make NDR a constant series.
    let ndr = 1.0 - monthly_churn + monthly_expansion;
    let lifetime_months = 1.0 / monthly_churn.max(MIN_MONTHLY_CHURN);

    let mut kpis = KpiTable {
        net_dollar_retention: vec![ndr; MONTHS],
        cac: vec![0.0; MONTHS],
        ltv: vec![0.0; MONTHS],
        ltv_to_cac: vec![0.0; MONTHS],
        payback_months: vec![0.0; MONTHS],
    };

    for t in 0..MONTHS {
        let new_deals = funnel.market_fit[t];
        let cac = safe_div(rc.total_payroll[t] + rc.commissions[t], new_deals);
        let rev_per_deal = safe_div(rc.market_fit_revenue[t], new_deals);
        let gross_margin = safe_div(pnl.gross_profit[t], pnl.revenue[t]);
        let ltv = rev_per_deal * gross_margin * lifetime_months;

        kpis.cac[t] = cac;
        kpis.ltv[t] = ltv;
        kpis.ltv_to_cac[t] = safe_div(ltv, cac);
        kpis.payback_months[t] = safe_div(cac, rev_per_deal * gross_margin);
    }
    kpis
}
