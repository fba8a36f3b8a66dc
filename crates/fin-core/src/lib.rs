#![deny(warnings)]

//! Core domain model for the pro-forma forecast.
//!
//! This crate defines the immutable [`Assumptions`] input, its per-key
//! defaults and map boundary, and the serializable output tables produced
//! by one forecast run. All defaulting happens once here; the model crates
//! never consult a raw key/value map.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Forecast horizon in calendar months.
pub const MONTHS: usize = 60;

/// First period label when a scenario does not pin a start date.
/// A fixed date keeps runs bit-identical; wall-clock labels would not.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

/// Boundary policy for the one-period funnel lag.
///
/// The reference behavior rotates each stage's series, so period 0 of a
/// lagged stage sees period 59 of its parent. `ZeroFill` starts lagged
/// stages at zero instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LagPolicy {
    /// Rotate: the last period's value wraps into period 0 of the next stage.
    #[default]
    Wraparound,
    /// Lagged stages have no period-0 inflow.
    ZeroFill,
}

/// The full assumption set for one scenario run.
///
/// Percentages are expressed as whole numbers (e.g. `50.0` = 50%).
/// Churn and expansion are annual rates applied monthly. Every field has a
/// documented default (zero unless stated otherwise), so a partial scenario
/// is always valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assumptions {
    // Go-to-market funnel
    /// SDRs supporting each AE.
    pub sdr_per_ae: f64,
    /// Qualified leads a ramped SDR generates per month.
    pub leads_per_sdr: f64,
    pub lead_to_marketfit_pct: f64,
    pub marketfit_to_companyfit_pct: f64,
    pub companyfit_to_ready_pct: f64,
    pub ready_to_go_pct: f64,

    // Product pricing
    pub price_market_fit: f64,
    pub price_company_fit: f64,
    pub price_ready: f64,
    /// Average transaction size a Go deal closes on.
    pub avg_deal_size_go: f64,
    /// Fee taken on a Go transaction, percent of deal size.
    pub fee_pct_go: f64,

    // Report delivery
    /// Manual analyst hours per report before any efficiency gains.
    pub analyst_hours_start: f64,
    /// Quarterly reduction in analyst hours, percent.
    pub analyst_efficiency_gain_pct: f64,
    pub additional_hours_go: f64,
    pub analyst_hourly_cost: f64,

    // Investor platform (recurring revenue)
    /// Platform MRR at period 0. Default 1000.
    pub investor_license_start_mrr: f64,
    /// New licenses sold each quarter.
    pub new_investor_licenses_q: f64,
    pub investor_license_price: f64,
    /// Annual churn, percent of MRR.
    pub platform_churn_pct: f64,
    /// Annual expansion, percent of MRR.
    pub platform_expansion_pct: f64,

    // Team
    /// AE on-target earnings, annual. SDRs are paid half OTE.
    pub ae_ote: f64,
    /// CS annual salary.
    pub cs_salary: f64,
    /// CS reps supporting each AE.
    pub cs_per_ae: f64,
    pub benefits_tax_pct: f64,
    pub sales_commission_pct: f64,
    /// G&A overhead, percent of total revenue.
    pub ga_overhead_pct: f64,
    pub capex_per_new_hire: f64,

    // Working capital
    /// Days sales outstanding. Default 45.
    pub ar_days: f64,
    /// Days payables outstanding. Default 30.
    pub ap_days: f64,

    // Capital strategy
    /// Cash on hand before any funding. Default 50000.
    pub starting_cash: f64,
    pub seed_amount: f64,
    /// 1-based closing month; out of horizon means no round. Default 1.
    pub seed_month: f64,
    pub series_a_amount: f64,
    /// 1-based closing month; out of horizon means no round. Default 1.
    pub series_a_month: f64,

    /// Funnel lag boundary policy. Not part of the numeric key map.
    pub lag_policy: LagPolicy,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            sdr_per_ae: 0.0,
            leads_per_sdr: 0.0,
            lead_to_marketfit_pct: 0.0,
            marketfit_to_companyfit_pct: 0.0,
            companyfit_to_ready_pct: 0.0,
            ready_to_go_pct: 0.0,
            price_market_fit: 0.0,
            price_company_fit: 0.0,
            price_ready: 0.0,
            avg_deal_size_go: 0.0,
            fee_pct_go: 0.0,
            analyst_hours_start: 0.0,
            analyst_efficiency_gain_pct: 0.0,
            additional_hours_go: 0.0,
            analyst_hourly_cost: 0.0,
            investor_license_start_mrr: 1000.0,
            new_investor_licenses_q: 0.0,
            investor_license_price: 0.0,
            platform_churn_pct: 0.0,
            platform_expansion_pct: 0.0,
            ae_ote: 0.0,
            cs_salary: 0.0,
            cs_per_ae: 0.0,
            benefits_tax_pct: 0.0,
            sales_commission_pct: 0.0,
            ga_overhead_pct: 0.0,
            capex_per_new_hire: 0.0,
            ar_days: 45.0,
            ap_days: 30.0,
            starting_cash: 50000.0,
            seed_amount: 0.0,
            seed_month: 1.0,
            series_a_amount: 0.0,
            series_a_month: 1.0,
            lag_policy: LagPolicy::Wraparound,
        }
    }
}

impl Assumptions {
    /// Resolve a raw key/value map into a full assumption set.
    ///
    /// Missing keys fall back to the documented defaults; unknown keys are
    /// ignored. This is the only place dynamic keys are consulted.
    pub fn from_map(map: &BTreeMap<String, f64>) -> Self {
        let mut a = Assumptions::default();
        let get = |key: &str, fallback: f64| map.get(key).copied().unwrap_or(fallback);

        a.sdr_per_ae = get("sdr_per_ae", a.sdr_per_ae);
        a.leads_per_sdr = get("leads_per_sdr", a.leads_per_sdr);
        a.lead_to_marketfit_pct = get("lead_to_marketfit_pct", a.lead_to_marketfit_pct);
        a.marketfit_to_companyfit_pct =
            get("marketfit_to_companyfit_pct", a.marketfit_to_companyfit_pct);
        a.companyfit_to_ready_pct = get("companyfit_to_ready_pct", a.companyfit_to_ready_pct);
        a.ready_to_go_pct = get("ready_to_go_pct", a.ready_to_go_pct);
        a.price_market_fit = get("price_market_fit", a.price_market_fit);
        a.price_company_fit = get("price_company_fit", a.price_company_fit);
        a.price_ready = get("price_ready", a.price_ready);
        a.avg_deal_size_go = get("avg_deal_size_go", a.avg_deal_size_go);
        a.fee_pct_go = get("fee_pct_go", a.fee_pct_go);
        a.analyst_hours_start = get("analyst_hours_start", a.analyst_hours_start);
        a.analyst_efficiency_gain_pct =
            get("analyst_efficiency_gain_pct", a.analyst_efficiency_gain_pct);
        a.additional_hours_go = get("additional_hours_go", a.additional_hours_go);
        a.analyst_hourly_cost = get("analyst_hourly_cost", a.analyst_hourly_cost);
        a.investor_license_start_mrr =
            get("investor_license_start_mrr", a.investor_license_start_mrr);
        a.new_investor_licenses_q = get("new_investor_licenses_q", a.new_investor_licenses_q);
        a.investor_license_price = get("investor_license_price", a.investor_license_price);
        a.platform_churn_pct = get("platform_churn_pct", a.platform_churn_pct);
        a.platform_expansion_pct = get("platform_expansion_pct", a.platform_expansion_pct);
        a.ae_ote = get("ae_ote", a.ae_ote);
        a.cs_salary = get("cs_salary", a.cs_salary);
        a.cs_per_ae = get("cs_per_ae", a.cs_per_ae);
        a.benefits_tax_pct = get("benefits_tax_pct", a.benefits_tax_pct);
        a.sales_commission_pct = get("sales_commission_pct", a.sales_commission_pct);
        a.ga_overhead_pct = get("ga_overhead_pct", a.ga_overhead_pct);
        a.capex_per_new_hire = get("capex_per_new_hire", a.capex_per_new_hire);
        a.ar_days = get("ar_days", a.ar_days);
        a.ap_days = get("ap_days", a.ap_days);
        a.starting_cash = get("starting_cash", a.starting_cash);
        a.seed_amount = get("seed_amount", a.seed_amount);
        a.seed_month = get("seed_month", a.seed_month);
        a.series_a_amount = get("series_a_amount", a.series_a_amount);
        a.series_a_month = get("series_a_month", a.series_a_month);
        a
    }

    /// The reference scenario: one AE, a two-SDR pod, seed at month 1 and
    /// Series A at month 18.
    pub fn baseline() -> Self {
        Self {
            sdr_per_ae: 2.0,
            leads_per_sdr: 40.0,
            lead_to_marketfit_pct: 50.0,
            marketfit_to_companyfit_pct: 30.0,
            companyfit_to_ready_pct: 20.0,
            ready_to_go_pct: 10.0,
            price_market_fit: 500.0,
            price_company_fit: 15000.0,
            price_ready: 50000.0,
            avg_deal_size_go: 75_000_000.0,
            fee_pct_go: 1.5,
            analyst_hours_start: 20.0,
            analyst_efficiency_gain_pct: 10.0,
            additional_hours_go: 10.0,
            analyst_hourly_cost: 75.0,
            investor_license_start_mrr: 1000.0,
            new_investor_licenses_q: 5.0,
            investor_license_price: 2500.0,
            platform_churn_pct: 10.0,
            platform_expansion_pct: 15.0,
            ae_ote: 150_000.0,
            cs_salary: 80_000.0,
            cs_per_ae: 0.0,
            benefits_tax_pct: 25.0,
            sales_commission_pct: 10.0,
            ga_overhead_pct: 15.0,
            capex_per_new_hire: 3000.0,
            ar_days: 45.0,
            ap_days: 30.0,
            starting_cash: 50000.0,
            seed_amount: 750_000.0,
            seed_month: 1.0,
            series_a_amount: 1_250_000.0,
            series_a_month: 18.0,
            lag_policy: LagPolicy::Wraparound,
        }
    }

    fn named_fields(&self) -> [(&'static str, f64); 34] {
        [
            ("sdr_per_ae", self.sdr_per_ae),
            ("leads_per_sdr", self.leads_per_sdr),
            ("lead_to_marketfit_pct", self.lead_to_marketfit_pct),
            ("marketfit_to_companyfit_pct", self.marketfit_to_companyfit_pct),
            ("companyfit_to_ready_pct", self.companyfit_to_ready_pct),
            ("ready_to_go_pct", self.ready_to_go_pct),
            ("price_market_fit", self.price_market_fit),
            ("price_company_fit", self.price_company_fit),
            ("price_ready", self.price_ready),
            ("avg_deal_size_go", self.avg_deal_size_go),
            ("fee_pct_go", self.fee_pct_go),
            ("analyst_hours_start", self.analyst_hours_start),
            ("analyst_efficiency_gain_pct", self.analyst_efficiency_gain_pct),
            ("additional_hours_go", self.additional_hours_go),
            ("analyst_hourly_cost", self.analyst_hourly_cost),
            ("investor_license_start_mrr", self.investor_license_start_mrr),
            ("new_investor_licenses_q", self.new_investor_licenses_q),
            ("investor_license_price", self.investor_license_price),
            ("platform_churn_pct", self.platform_churn_pct),
            ("platform_expansion_pct", self.platform_expansion_pct),
            ("ae_ote", self.ae_ote),
            ("cs_salary", self.cs_salary),
            ("cs_per_ae", self.cs_per_ae),
            ("benefits_tax_pct", self.benefits_tax_pct),
            ("sales_commission_pct", self.sales_commission_pct),
            ("ga_overhead_pct", self.ga_overhead_pct),
            ("capex_per_new_hire", self.capex_per_new_hire),
            ("ar_days", self.ar_days),
            ("ap_days", self.ap_days),
            ("starting_cash", self.starting_cash),
            ("seed_amount", self.seed_amount),
            ("seed_month", self.seed_month),
            ("series_a_amount", self.series_a_amount),
            ("series_a_month", self.series_a_month),
        ]
    }
}

/// Validation errors for scenario inputs.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Every assumption must be a finite number.
    #[error("assumption `{0}` is not finite")]
    NonFinite(&'static str),
    /// Day-count conventions cannot be negative.
    #[error("assumption `{0}` must be >= 0")]
    NegativeDays(&'static str),
}

/// Validate a scenario before running it.
///
/// Missing keys were already defaulted at the map boundary, so the only
/// caller mistakes left are non-finite values and negative day counts.
pub fn validate_assumptions(a: &Assumptions) -> Result<(), ValidationError> {
    for (name, value) in a.named_fields() {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite(name));
        }
    }
    if a.ar_days < 0.0 {
        return Err(ValidationError::NegativeDays("ar_days"));
    }
    if a.ap_days < 0.0 {
        return Err(ValidationError::NegativeDays("ap_days"));
    }
    Ok(())
}

/// Month labels for the horizon, `Mon-YY`, one per period.
pub fn period_labels(start: NaiveDate) -> Vec<String> {
    (0..MONTHS)
        .map(|i| (start + Months::new(i as u32)).format("%b-%y").to_string())
        .collect()
}

/// Round every value in a series to `decimals` places.
pub fn round_series(series: &mut [f64], decimals: i32) {
    let scale = 10f64.powi(decimals);
    for v in series.iter_mut() {
        *v = (*v * scale).round() / scale;
    }
}

/// Per-period funnel stage counts. Stage N is derived from stage N-1 one
/// period earlier, so ordering matters.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FunnelTable {
    pub leads: Vec<f64>,
    pub market_fit: Vec<f64>,
    pub company_fit: Vec<f64>,
    pub ready: Vec<f64>,
    pub go: Vec<f64>,
}

impl FunnelTable {
    pub fn columns(&self) -> Vec<(&'static str, &[f64])> {
        vec![
            ("Leads Generated", self.leads.as_slice()),
            ("Market Fit Deals", self.market_fit.as_slice()),
            ("Company Fit Deals", self.company_fit.as_slice()),
            ("Ready Deals", self.ready.as_slice()),
            ("Go Transactions", self.go.as_slice()),
        ]
    }
}

/// Monthly income statement. Net income equals EBITDA: no interest or tax
/// layer in this model.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub revenue: Vec<f64>,
    pub cogs: Vec<f64>,
    pub gross_profit: Vec<f64>,
    pub operating_expenses: Vec<f64>,
    pub ebitda: Vec<f64>,
    pub net_income: Vec<f64>,
}

impl IncomeStatement {
    pub fn columns(&self) -> Vec<(&'static str, &[f64])> {
        vec![
            ("Revenue", self.revenue.as_slice()),
            ("COGS", self.cogs.as_slice()),
            ("Gross Profit", self.gross_profit.as_slice()),
            ("Operating Expenses", self.operating_expenses.as_slice()),
            ("EBITDA", self.ebitda.as_slice()),
            ("Net Income", self.net_income.as_slice()),
        ]
    }
}

/// Monthly balance sheet. `total_assets` must equal
/// `total_liabilities_and_equity` every period.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub cash: Vec<f64>,
    pub accounts_receivable: Vec<f64>,
    pub total_assets: Vec<f64>,
    pub accounts_payable: Vec<f64>,
    pub equity: Vec<f64>,
    pub total_liabilities_and_equity: Vec<f64>,
}

impl BalanceSheet {
    pub fn columns(&self) -> Vec<(&'static str, &[f64])> {
        vec![
            ("Cash", self.cash.as_slice()),
            ("Accounts Receivable", self.accounts_receivable.as_slice()),
            ("Total Assets", self.total_assets.as_slice()),
            ("Accounts Payable", self.accounts_payable.as_slice()),
            ("Equity", self.equity.as_slice()),
            (
                "Total Liabilities & Equity",
                self.total_liabilities_and_equity.as_slice(),
            ),
        ]
    }
}

/// Monthly cash flow statement. CFO + CFI + CFF equals the net change in
/// cash exactly, by construction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub net_income: Vec<f64>,
    pub change_in_ar: Vec<f64>,
    pub change_in_ap: Vec<f64>,
    pub cfo: Vec<f64>,
    pub capex: Vec<f64>,
    pub cfi: Vec<f64>,
    pub funding: Vec<f64>,
    pub cff: Vec<f64>,
    pub net_change_in_cash: Vec<f64>,
}

impl CashFlowStatement {
    pub fn columns(&self) -> Vec<(&'static str, &[f64])> {
        vec![
            ("Net Income", self.net_income.as_slice()),
            ("Change in AR", self.change_in_ar.as_slice()),
            ("Change in AP", self.change_in_ap.as_slice()),
            ("CFO", self.cfo.as_slice()),
            ("CapEx", self.capex.as_slice()),
            ("CFI", self.cfi.as_slice()),
            ("Funding", self.funding.as_slice()),
            ("CFF", self.cff.as_slice()),
            ("Net Change in Cash", self.net_change_in_cash.as_slice()),
        ]
    }
}

/// Per-period unit economics.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KpiTable {
    pub net_dollar_retention: Vec<f64>,
    pub cac: Vec<f64>,
    pub ltv: Vec<f64>,
    pub ltv_to_cac: Vec<f64>,
    pub payback_months: Vec<f64>,
}

impl KpiTable {
    pub fn columns(&self) -> Vec<(&'static str, &[f64])> {
        vec![
            ("Net Dollar Retention", self.net_dollar_retention.as_slice()),
            ("CAC", self.cac.as_slice()),
            ("LTV", self.ltv.as_slice()),
            ("LTV/CAC", self.ltv_to_cac.as_slice()),
            ("Payback Period (Months)", self.payback_months.as_slice()),
        ]
    }
}

/// Everything one scenario run produces. Immutable after construction;
/// a new scenario allocates a fresh bundle.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ForecastBundle {
    /// Month labels, one per period.
    pub periods: Vec<String>,
    pub funnel: FunnelTable,
    pub pnl: IncomeStatement,
    pub balance: BalanceSheet,
    pub cash_flow: CashFlowStatement,
    pub kpis: KpiTable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_map_resolves_to_documented_defaults() {
        let a = Assumptions::from_map(&BTreeMap::new());
        assert_eq!(a.starting_cash, 50000.0);
        assert_eq!(a.ar_days, 45.0);
        assert_eq!(a.ap_days, 30.0);
        assert_eq!(a.investor_license_start_mrr, 1000.0);
        assert_eq!(a.seed_month, 1.0);
        assert_eq!(a.series_a_month, 1.0);
        assert_eq!(a.sdr_per_ae, 0.0);
        assert_eq!(a.lag_policy, LagPolicy::Wraparound);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut map = BTreeMap::new();
        map.insert("tax_rate_pct".to_string(), 21.0);
        map.insert("not_a_real_key".to_string(), 1.0);
        map.insert("ae_ote".to_string(), 120000.0);
        let a = Assumptions::from_map(&map);
        assert_eq!(a.ae_ote, 120000.0);
        assert_eq!(a, {
            let mut b = Assumptions::default();
            b.ae_ote = 120000.0;
            b
        });
    }

    #[test]
    fn serde_roundtrip_assumptions() {
        let a = Assumptions::baseline();
        let s = serde_json::to_string(&a).unwrap();
        let back: Assumptions = serde_json::from_str(&s).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let a: Assumptions = serde_json::from_str(r#"{"seed_amount": 500000}"#).unwrap();
        assert_eq!(a.seed_amount, 500000.0);
        assert_eq!(a.starting_cash, 50000.0);
    }

    #[test]
    fn validate_rejects_non_finite() {
        let mut a = Assumptions::baseline();
        a.price_ready = f64::NAN;
        assert_eq!(
            validate_assumptions(&a),
            Err(ValidationError::NonFinite("price_ready"))
        );
    }

    #[test]
    fn validate_rejects_negative_day_counts() {
        let mut a = Assumptions::baseline();
        a.ap_days = -1.0;
        assert_eq!(
            validate_assumptions(&a),
            Err(ValidationError::NegativeDays("ap_days"))
        );
    }

    #[test]
    fn labels_cover_horizon_in_month_year_format() {
        let labels = period_labels(default_start_date());
        assert_eq!(labels.len(), MONTHS);
        assert_eq!(labels[0], "Jan-26");
        assert_eq!(labels[12], "Jan-27");
        assert_eq!(labels[59], "Dec-30");
    }

    #[test]
    fn round_series_whole_and_cents() {
        let mut xs = vec![1.49, -2.5, 3.014];
        round_series(&mut xs, 0);
        assert_eq!(xs, vec![1.0, -3.0, 3.0]);
        let mut ys = vec![1.006, 2.3449];
        round_series(&mut ys, 2);
        assert_eq!(ys, vec![1.01, 2.34]);
    }

    proptest! {
        #[test]
        fn finite_overrides_always_validate(cash in 0.0f64..1e9, days in 0.0f64..120.0) {
            let mut map = BTreeMap::new();
            map.insert("starting_cash".to_string(), cash);
            map.insert("ar_days".to_string(), days);
            let a = Assumptions::from_map(&map);
            prop_assert!(validate_assumptions(&a).is_ok());
            prop_assert_eq!(a.starting_cash, cash);
        }
    }
}
