use std::cmp::Ordering;

use crate::parser::CustomerSummary;

/// Length of the top-risk list, always within [MIN, MAX]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankLimit(usize);

impl RankLimit {
    pub const MIN: usize = 5;
    pub const MAX: usize = 50;
    pub const DEFAULT: usize = 10;

    pub fn new(n: usize) -> Self {
        Self(n.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(&self) -> usize {
        self.0
    }

    pub fn increase(&mut self, step: usize) {
        *self = Self::new(self.0.saturating_add(step));
    }

    pub fn decrease(&mut self, step: usize) {
        *self = Self::new(self.0.saturating_sub(step));
    }

    /// Slider position in [0, 1]
    pub fn ratio(&self) -> f64 {
        (self.0 - Self::MIN) as f64 / (Self::MAX - Self::MIN) as f64
    }
}

impl Default for RankLimit {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Larger first, NaN after every number
fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Descending by max_stress, then stressed_months, then avg_stress
fn risk_order(a: &CustomerSummary, b: &CustomerSummary) -> Ordering {
    descending_nan_last(a.max_stress, b.max_stress)
        .then_with(|| b.stressed_months.cmp(&a.stressed_months))
        .then_with(|| descending_nan_last(a.avg_stress, b.avg_stress))
}

/// The `n` highest-risk customers. Equal keys keep their table order.
pub fn top_risk_customers(summary: &[CustomerSummary], n: usize) -> Vec<&CustomerSummary> {
    let mut ranked: Vec<&CustomerSummary> = summary.iter().collect();
    ranked.sort_by(|a, b| risk_order(a, b));
    ranked.truncate(n);
    ranked
}
