//! The 3-statement engine.
//!
//! The income statement is stateless given revenue and cost. The balance
//! sheet and cash flow statement form a sequential recurrence: period t
//! depends on period t−1's closing balances, so the loop must run in
//! increasing period order. Each run recomputes the full horizon from
//! period 0; there is no state kept between invocations.

use fin_core::{Assumptions, BalanceSheet, CashFlowStatement, IncomeStatement, MONTHS};
use tracing::debug;

/// Days-to-months conversion used for AR/AP balances.
const DAYS_PER_MONTH: f64 = 30.4;

/// Funding disbursed per period.
///
/// Closing months are 1-based; a configured month outside the horizon is
/// silently ignored. When both rounds land on the same month the later
/// configured round wins, matching the reference behavior.
pub fn funding_schedule(a: &Assumptions) -> Vec<f64> {
    let mut funding = vec![0.0; MONTHS];
    for (month, amount) in [
        (a.seed_month, a.seed_amount),
        (a.series_a_month, a.series_a_amount),
    ] {
        let idx = month as i64 - 1;
        if (0..MONTHS as i64).contains(&idx) {
            funding[idx as usize] = amount;
        }
    }
    funding
}

/// Build the income statement from the revenue/cost series.
///
/// Net income equals EBITDA: the model carries no interest, tax,
/// depreciation, or amortization layer.
pub fn build_income_statement(
    revenue: &[f64],
    cogs: &[f64],
    opex: &[f64],
) -> IncomeStatement {
    let mut pnl = IncomeStatement {
        revenue: revenue.to_vec(),
        cogs: cogs.to_vec(),
        gross_profit: vec![0.0; MONTHS],
        operating_expenses: opex.to_vec(),
        ebitda: vec![0.0; MONTHS],
        net_income: vec![0.0; MONTHS],
    };
    for t in 0..MONTHS {
        pnl.gross_profit[t] = pnl.revenue[t] - pnl.cogs[t];
        pnl.ebitda[t] = pnl.gross_profit[t] - pnl.operating_expenses[t];
        pnl.net_income[t] = pnl.ebitda[t];
    }
    pnl
}

/// Run the balance-sheet / cash-flow recurrence over the horizon.
///
/// Period 0 is the initial state: cash and equity are starting cash plus
/// any round closing in month 1, AR and AP are zero. Period-0 funding is
/// recorded in the Funding/CFF columns even though the cash recurrence
/// only starts at t = 1. For t >= 1 the transition follows the closing
/// balances of t−1; the loop order is load-bearing.
pub fn build_statements(
    pnl: &IncomeStatement,
    a: &Assumptions,
) -> (BalanceSheet, CashFlowStatement) {
    let funding = funding_schedule(a);
    // Headcount growth is not modeled, so there are never new AE hires
    // and CapEx stays zero. The term is kept so the investing section
    // remains structurally present.
    let ae_hires = vec![0.0; MONTHS];

    let mut bs = BalanceSheet {
        cash: vec![0.0; MONTHS],
        accounts_receivable: vec![0.0; MONTHS],
        total_assets: vec![0.0; MONTHS],
        accounts_payable: vec![0.0; MONTHS],
        equity: vec![0.0; MONTHS],
        total_liabilities_and_equity: vec![0.0; MONTHS],
    };
    let mut cf = CashFlowStatement {
        net_income: vec![0.0; MONTHS],
        change_in_ar: vec![0.0; MONTHS],
        change_in_ap: vec![0.0; MONTHS],
        cfo: vec![0.0; MONTHS],
        capex: vec![0.0; MONTHS],
        cfi: vec![0.0; MONTHS],
        funding: funding.clone(),
        cff: vec![0.0; MONTHS],
        net_change_in_cash: vec![0.0; MONTHS],
    };

    bs.cash[0] = a.starting_cash + funding[0];
    bs.equity[0] = bs.cash[0];
    bs.total_assets[0] = bs.cash[0];
    bs.total_liabilities_and_equity[0] = bs.equity[0];
    cf.cff[0] = funding[0];

    for t in 1..MONTHS {
        let ar_t = pnl.revenue[t] * (a.ar_days / DAYS_PER_MONTH);
        let ap_t = pnl.operating_expenses[t] * (a.ap_days / DAYS_PER_MONTH);
        // Sign convention: a growing receivable consumes cash, a growing
        // payable frees it.
        let change_in_ar = -(ar_t - bs.accounts_receivable[t - 1]);
        let change_in_ap = ap_t - bs.accounts_payable[t - 1];

        cf.net_income[t] = pnl.net_income[t];
        cf.change_in_ar[t] = change_in_ar;
        cf.change_in_ap[t] = change_in_ap;
        cf.cfo[t] = pnl.net_income[t] + change_in_ar + change_in_ap;
        cf.capex[t] = -a.capex_per_new_hire * ae_hires[t];
        cf.cfi[t] = cf.capex[t];
        cf.cff[t] = funding[t];
        cf.net_change_in_cash[t] = cf.cfo[t] + cf.cfi[t] + cf.cff[t];

        bs.cash[t] = bs.cash[t - 1] + cf.net_change_in_cash[t];
        bs.accounts_receivable[t] = ar_t;
        bs.accounts_payable[t] = ap_t;
        bs.equity[t] = bs.equity[t - 1] + pnl.net_income[t] + funding[t];
        bs.total_assets[t] = bs.cash[t] + bs.accounts_receivable[t];
        bs.total_liabilities_and_equity[t] = bs.accounts_payable[t] + bs.equity[t];
    }

    debug!(
        ending_cash = bs.cash[MONTHS - 1],
        ending_equity = bs.equity[MONTHS - 1],
        "statement recurrence complete"
    );
    (bs, cf)
}
