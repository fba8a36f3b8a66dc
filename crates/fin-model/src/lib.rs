#![deny(warnings)]

//! The forecast pipeline for the pro-forma model.
//!
//! One scenario run is a strictly linear, deterministic pass:
//! assumptions → funnel → revenue/cost → 3-statement recurrence → KPIs.
//! No stage reads back from a later one, and a run never fails for
//! well-formed numeric input: missing keys were defaulted at the boundary
//! and every ratio is zero-guarded.

pub mod funnel;
pub mod kpi;
pub mod revenue;
pub mod statements;

use chrono::NaiveDate;
use fin_core::{
    default_start_date, period_labels, round_series, Assumptions, ForecastBundle, MONTHS,
};
use tracing::info;

pub use funnel::simulate_funnel;
pub use kpi::compute_kpis;
pub use revenue::{derive_revenue_cost, hours_per_report, platform_mrr_series, RevenueCost};
pub use statements::{build_income_statement, build_statements, funding_schedule};

/// Run a full 60-month forecast with the default start date.
pub fn run_forecast(a: &Assumptions) -> ForecastBundle {
    run_forecast_with_start(a, default_start_date())
}

/// Run a full 60-month forecast labelling periods from `start`.
///
/// Financial tables are rounded to whole units and KPIs to two decimals
/// before the bundle is returned; everything upstream stays unrounded.
pub fn run_forecast_with_start(a: &Assumptions, start: NaiveDate) -> ForecastBundle {
    let funnel = simulate_funnel(a);
    let rc = derive_revenue_cost(&funnel, a);
    let pnl = build_income_statement(&rc.total_revenue, &rc.cogs, &rc.opex);
    let (balance, cash_flow) = build_statements(&pnl, a);
    let kpis = compute_kpis(&funnel, &rc, &pnl, a);

    let mut bundle = ForecastBundle {
        periods: period_labels(start),
        funnel,
        pnl,
        balance,
        cash_flow,
        kpis,
    };
    round_bundle(&mut bundle);
    info!(
        periods = MONTHS,
        ending_cash = bundle.balance.cash[MONTHS - 1],
        "forecast complete"
    );
    bundle
}

fn round_bundle(b: &mut ForecastBundle) {
    for series in [
        &mut b.funnel.leads,
        &mut b.funnel.market_fit,
        &mut b.funnel.company_fit,
        &mut b.funnel.ready,
        &mut b.funnel.go,
        &mut b.pnl.revenue,
        &mut b.pnl.cogs,
        &mut b.pnl.gross_profit,
        &mut b.pnl.operating_expenses,
        &mut b.pnl.ebitda,
        &mut b.pnl.net_income,
        &mut b.balance.cash,
        &mut b.balance.accounts_receivable,
        &mut b.balance.total_assets,
        &mut b.balance.accounts_payable,
        &mut b.balance.equity,
        &mut b.balance.total_liabilities_and_equity,
        &mut b.cash_flow.net_income,
        &mut b.cash_flow.change_in_ar,
        &mut b.cash_flow.change_in_ap,
        &mut b.cash_flow.cfo,
        &mut b.cash_flow.capex,
        &mut b.cash_flow.cfi,
        &mut b.cash_flow.funding,
        &mut b.cash_flow.cff,
        &mut b.cash_flow.net_change_in_cash,
    ] {
        round_series(series, 0);
    }
    for series in [
        &mut b.kpis.net_dollar_retention,
        &mut b.kpis.cac,
        &mut b.kpis.ltv,
        &mut b.kpis.ltv_to_cac,
        &mut b.kpis.payback_months,
    ] {
        round_series(series, 2);
    }
}
