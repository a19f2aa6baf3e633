use crate::parser::CustomerSummary;

/// Customers whose worst month reached this score count as severely stressed
pub const SEVERE_STRESS_THRESHOLD: f64 = 6.0;

/// Headline numbers for the portfolio overview
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioMetrics {
    pub total_customers: usize,
    pub stressed_pct: f64,
    pub severe_pct: f64,
    pub avg_stress: f64,
}

impl PortfolioMetrics {
    /// All ratios are 0.0 for an empty table. Missing (NaN) stress scores are
    /// left out of the mean but still count as customers.
    pub fn from_summary(summary: &[CustomerSummary]) -> Self {
        let total = summary.len();
        if total == 0 {
            return Self {
                total_customers: 0,
                stressed_pct: 0.0,
                severe_pct: 0.0,
                avg_stress: 0.0,
            };
        }

        let stressed = summary.iter().filter(|c| c.stressed_months > 0).count();
        let severe = summary
            .iter()
            .filter(|c| c.max_stress >= SEVERE_STRESS_THRESHOLD)
            .count();
        let (stress_sum, scored) = summary
            .iter()
            .map(|c| c.avg_stress)
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
        let avg_stress = if scored == 0 { 0.0 } else { stress_sum / scored as f64 };

        Self {
            total_customers: total,
            stressed_pct: stressed as f64 / total as f64 * 100.0,
            severe_pct: severe as f64 / total as f64 * 100.0,
            avg_stress,
        }
    }
}
