//! Projection state carried from one month to the next

use crate::assumptions::PlanAssumptions;

/// State of the company at the close of the last computed month
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current projection month (1-indexed, 0 before the first month)
    pub projection_month: u32,

    /// MRR at the close of the previous month
    pub prev_mrr: f64,

    /// Customers at the close of the previous month
    pub prev_customers: f64,

    /// Cash balance at the close of the previous month
    pub cash_balance: f64,
}

impl ProjectionState {
    /// Initialize state from the company's current position
    pub fn from_assumptions(assumptions: &PlanAssumptions) -> Self {
        Self {
            projection_month: 0,
            prev_mrr: assumptions.starting_mrr,
            prev_customers: assumptions.starting_customers,
            cash_balance: assumptions.starting_cash,
        }
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.projection_month += 1;
    }

    /// Record the closing position of the month just computed
    pub fn close_month(&mut self, mrr: f64, customers: f64, cash_balance: f64) {
        self.prev_mrr = mrr;
        self.prev_customers = customers;
        self.cash_balance = cash_balance;
    }

    pub fn is_first_month(&self) -> bool {
        self.projection_month == 1
    }
}
