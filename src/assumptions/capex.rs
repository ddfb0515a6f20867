//! Capital expenditure schedule

use serde::{Deserialize, Serialize};

/// One-off capital purchase scheduled for a specific plan month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapexItem {
    /// Item description
    #[serde(default)]
    pub name: String,

    /// Plan month of the purchase (1-12)
    pub purchase_month: u32,

    /// Purchase cost
    pub cost: f64,
}

impl CapexItem {
    pub fn new(name: impl Into<String>, purchase_month: u32, cost: f64) -> Self {
        Self {
            name: name.into(),
            purchase_month,
            cost,
        }
    }
}

/// Split of a month's CAPEX into categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CapexBreakdown {
    pub equipment: f64,
    pub software: f64,
    pub furniture: f64,
    pub other: f64,
}

impl CapexBreakdown {
    /// Split a total into equipment 60%, software 30%, furniture 5%, other 5%
    pub fn split(total: f64) -> Self {
        let other_pool = total * 0.1;
        Self {
            equipment: total * 0.6,
            software: total * 0.3,
            furniture: other_pool * 0.5,
            other: other_pool * 0.5,
        }
    }

    pub fn total(&self) -> f64 {
        self.equipment + self.software + self.furniture + self.other
    }
}
