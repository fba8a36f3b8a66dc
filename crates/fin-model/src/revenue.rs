//! Revenue and cost derivation.
//!
//! Turns funnel counts and static assumptions into the per-period revenue,
//! COGS, and operating-expense series the statement engine consumes. The
//! platform MRR stream is itself a first-order recurrence (quarterly new
//! licenses, monthly churn and expansion) and is computed before totals.

use fin_core::{Assumptions, FunnelTable, MONTHS};

/// Intermediate revenue/cost series for one scenario.
///
/// `stage_revenue` is the commissionable slice (priced stages plus Go
/// transaction fees, excluding platform MRR); `market_fit_revenue` and
/// `total_payroll`/`commissions` feed the KPI engine directly.
#[derive(Clone, Debug, Default)]
pub struct RevenueCost {
    pub total_revenue: Vec<f64>,
    pub stage_revenue: Vec<f64>,
    pub market_fit_revenue: Vec<f64>,
    pub platform_mrr: Vec<f64>,
    pub cogs: Vec<f64>,
    pub total_payroll: Vec<f64>,
    pub commissions: Vec<f64>,
    pub opex: Vec<f64>,
}

/// Analyst hours required per report in a given period.
///
/// Hours decay geometrically each quarter by the configured efficiency
/// gain: `start × (1 − gain)^floor(period / 3)`.
pub fn hours_per_report(start_hours: f64, quarterly_gain_pct: f64, period: usize) -> f64 {
    let quarter = (period / 3) as i32;
    start_hours * (1.0 - quarterly_gain_pct / 100.0).powi(quarter)
}

/// Recurring platform revenue over the horizon.
///
/// Starts at the configured MRR; each later period adds new quarterly
/// license revenue (periods divisible by 3), subtracts monthly churn, and
/// adds monthly expansion, both as fractions of the prior period's MRR.
/// Churn and expansion assumptions are annual percentages.
pub fn platform_mrr_series(a: &Assumptions) -> Vec<f64> {
    let mut mrr = vec![0.0; MONTHS];
    mrr[0] = a.investor_license_start_mrr;
    for t in 1..MONTHS {
        let new_licenses = if t % 3 == 0 {
            a.new_investor_licenses_q * a.investor_license_price
        } else {
            0.0
        };
        let churn = mrr[t - 1] * (a.platform_churn_pct / 100.0 / 12.0);
        let expansion = mrr[t - 1] * (a.platform_expansion_pct / 100.0 / 12.0);
        mrr[t] = mrr[t - 1] + new_licenses - churn + expansion;
    }
    mrr
}

/// Derive revenue, COGS, and OpEx from funnel output and assumptions.
pub fn derive_revenue_cost(funnel: &FunnelTable, a: &Assumptions) -> RevenueCost {
    let platform_mrr = platform_mrr_series(a);

    let mut market_fit_revenue = vec![0.0; MONTHS];
    let mut stage_revenue = vec![0.0; MONTHS];
    let mut total_revenue = vec![0.0; MONTHS];
    let mut cogs = vec![0.0; MONTHS];

    for t in 0..MONTHS {
        market_fit_revenue[t] = funnel.market_fit[t] * a.price_market_fit;
        let rev_company_fit = funnel.company_fit[t] * a.price_company_fit;
        let rev_ready = funnel.ready[t] * a.price_ready;
        let rev_go = funnel.go[t] * a.avg_deal_size_go * (a.fee_pct_go / 100.0);
        stage_revenue[t] = market_fit_revenue[t] + rev_company_fit + rev_ready + rev_go;
        total_revenue[t] = stage_revenue[t] + platform_mrr[t];

        let hours = hours_per_report(a.analyst_hours_start, a.analyst_efficiency_gain_pct, t);
        let delivery = (funnel.market_fit[t] + funnel.company_fit[t] + funnel.ready[t])
            * hours
            * a.analyst_hourly_cost;
        let go_delivery = funnel.go[t] * a.additional_hours_go * a.analyst_hourly_cost;
        cogs[t] = delivery + go_delivery;
    }

    // Fixed team for the whole horizon: one AE, SDR/CS pods sized off it.
    let sdr_headcount = a.sdr_per_ae;
    let cs_headcount = a.cs_per_ae;
    let sdr_salary = a.ae_ote * 0.5 / 12.0;
    let ae_salary = a.ae_ote / 12.0;
    let cs_salary = a.cs_salary / 12.0;
    let base_payroll = sdr_headcount * sdr_salary + ae_salary + cs_headcount * cs_salary;
    let loaded_payroll = base_payroll * (1.0 + a.benefits_tax_pct / 100.0);

    let mut total_payroll = vec![0.0; MONTHS];
    let mut commissions = vec![0.0; MONTHS];
    let mut opex = vec![0.0; MONTHS];
    for t in 0..MONTHS {
        total_payroll[t] = loaded_payroll;
        commissions[t] = stage_revenue[t] * (a.sales_commission_pct / 100.0);
        let g_and_a = total_revenue[t] * (a.ga_overhead_pct / 100.0);
        opex[t] = total_payroll[t] + commissions[t] + g_and_a;
    }

    RevenueCost {
        total_revenue,
        stage_revenue,
        market_fit_revenue,
        platform_mrr,
        cogs,
        total_payroll,
        commissions,
        opex,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::funnel::simulate_funnel;

    #[test]
    fn efficiency_decay_hits_reference_point() {
        // Quarter index 4 begins at period 12.
        let h = hours_per_report(20.0, 10.0, 12);
        assert!((h - 20.0 * 0.9f64.powi(4)).abs() < 1e-12);
        // Flat within a quarter.
        assert_eq!(
            hours_per_report(20.0, 10.0, 13),
            hours_per_report(20.0, 10.0, 14)
        );
        // No gain means no decay.
        assert_eq!(hours_per_report(20.0, 0.0, 59), 20.0);
    }

    #[test]
    fn mrr_adds_licenses_only_on_quarter_boundaries() {
        let mut a = Assumptions::default();
        a.investor_license_start_mrr = 1000.0;
        a.new_investor_licenses_q = 2.0;
        a.investor_license_price = 500.0;
        let mrr = platform_mrr_series(&a);
        assert_eq!(mrr[0], 1000.0);
        assert_eq!(mrr[1], 1000.0);
        assert_eq!(mrr[2], 1000.0);
        assert_eq!(mrr[3], 2000.0);
        assert_eq!(mrr[4], 2000.0);
        assert_eq!(mrr[6], 3000.0);
    }

    #[test]
    fn mrr_churn_and_expansion_apply_monthly_from_annual_rates() {
        let mut a = Assumptions::default();
        a.investor_license_start_mrr = 1200.0;
        a.platform_churn_pct = 12.0; // 1% per month
        a.platform_expansion_pct = 24.0; // 2% per month
        let mrr = platform_mrr_series(&a);
        assert!((mrr[1] - 1200.0 * 1.01).abs() < 1e-9);
        assert!((mrr[2] - 1200.0 * 1.01 * 1.01).abs() < 1e-9);
    }

    #[test]
    fn zero_conversions_leave_platform_mrr_as_only_revenue() {
        let mut a = Assumptions::baseline();
        a.lead_to_marketfit_pct = 0.0;
        a.marketfit_to_companyfit_pct = 0.0;
        a.companyfit_to_ready_pct = 0.0;
        a.ready_to_go_pct = 0.0;
        let funnel = simulate_funnel(&a);
        let rc = derive_revenue_cost(&funnel, &a);
        for t in 0..MONTHS {
            assert_eq!(rc.total_revenue[t], rc.platform_mrr[t]);
            assert_eq!(rc.cogs[t], 0.0);
            assert_eq!(rc.commissions[t], 0.0);
        }
    }

    #[test]
    fn commissions_exclude_platform_mrr() {
        let a = Assumptions::baseline();
        let funnel = simulate_funnel(&a);
        let rc = derive_revenue_cost(&funnel, &a);
        for t in 0..MONTHS {
            let expected = rc.stage_revenue[t] * a.sales_commission_pct / 100.0;
            assert!((rc.commissions[t] - expected).abs() < 1e-9);
            assert!(rc.stage_revenue[t] < rc.total_revenue[t]);
        }
    }

    #[test]
    fn payroll_is_loaded_and_constant() {
        let a = Assumptions::baseline();
        let funnel = simulate_funnel(&a);
        let rc = derive_revenue_cost(&funnel, &a);
        // 2 SDRs at half OTE + 1 AE at OTE, monthly, with 25% loading.
        let base = (2.0 * 75_000.0 + 150_000.0) / 12.0;
        let expected = base * 1.25;
        assert!(rc.total_payroll.iter().all(|&p| (p - expected).abs() < 1e-9));
    }
}
