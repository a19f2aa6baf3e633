use crate::data::DataStore;
use crate::error::LookupError;
use crate::parser::MonthlyRecord;

/// Advisory flags raised from a customer's latest month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressIndicator {
    NoIncome,
    Overspending,
    LowSavings,
    HighFixedObligations,
}

impl StressIndicator {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoIncome => "No Income",
            Self::Overspending => "Overspending",
            Self::LowSavings => "Low Savings",
            Self::HighFixedObligations => "High Fixed Obligations",
        }
    }

    /// Income missing entirely is worse than the ratio warnings
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::NoIncome)
    }

    /// Each threshold is checked independently
    pub fn evaluate(record: &MonthlyRecord) -> Vec<StressIndicator> {
        let mut indicators = Vec::new();
        if record.monthly_income == 0.0 {
            indicators.push(Self::NoIncome);
        }
        if record.expense_income_ratio > 1.0 {
            indicators.push(Self::Overspending);
        }
        if record.savings_rate < 0.1 {
            indicators.push(Self::LowSavings);
        }
        if record.transfer_ratio > 0.5 {
            indicators.push(Self::HighFixedObligations);
        }
        indicators
    }
}

/// One customer's monthly history, oldest month first
#[derive(Debug, Clone)]
pub struct CustomerDetail<'a> {
    pub customer_id: String,
    pub records: Vec<&'a MonthlyRecord>,
    pub indicators: Vec<StressIndicator>,
}

impl<'a> CustomerDetail<'a> {
    pub fn latest(&self) -> Option<&'a MonthlyRecord> {
        self.records.last().copied()
    }
}

/// Look up `customer_id` and evaluate its latest month.
pub fn analyze_customer<'a>(
    store: &'a DataStore,
    customer_id: &str,
) -> Result<CustomerDetail<'a>, LookupError> {
    let customer_id = customer_id.trim();
    if !store.has_customer(customer_id) {
        return Err(LookupError::NotFound {
            customer_id: customer_id.to_string(),
        });
    }

    let mut records: Vec<&MonthlyRecord> = store
        .monthly()
        .iter()
        .filter(|r| r.customer_id == customer_id)
        .collect();
    records.sort_by(|a, b| a.month.cmp(&b.month));

    let latest = match records.last() {
        Some(r) => *r,
        None => {
            return Err(LookupError::NoMonthlyData {
                customer_id: customer_id.to_string(),
            })
        }
    };
    let indicators = StressIndicator::evaluate(latest);

    log::debug!(
        "customer {}: {} months, {} indicators",
        customer_id,
        records.len(),
        indicators.len()
    );

    Ok(CustomerDetail {
        customer_id: customer_id.to_string(),
        records,
        indicators,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CustomerSummary, Month};
    use std::path::PathBuf;

    fn record(id: &str, month: &str, income: f64, eir: f64, savings_rate: f64, transfer: f64) -> MonthlyRecord {
        MonthlyRecord {
            customer_id: id.to_string(),
            month: Month::new(month),
            monthly_income: income,
            monthly_expense: income * eir,
            savings: income * savings_rate,
            transfer_ratio: transfer,
            stress_score: 0.0,
            stress_category: "Low".to_string(),
            expense_income_ratio: eir,
            savings_rate,
        }
    }

    fn summary(id: &str) -> CustomerSummary {
        CustomerSummary {
            customer_id: id.to_string(),
            avg_stress: 1.0,
            max_stress: 1.0,
            stressed_months: 0,
        }
    }

    fn store(monthly: Vec<MonthlyRecord>, ids: &[&str]) -> DataStore {
        DataStore::from_tables(
            PathBuf::from("data"),
            monthly,
            ids.iter().map(|id| summary(id)).collect(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn test_all_indicators_fire() {
        let r = record("C1", "1", 0.0, 1.2, 0.05, 0.6);
        let labels: Vec<_> = StressIndicator::evaluate(&r).iter().map(|i| i.label()).collect();
        assert_eq!(
            labels,
            vec!["No Income", "Overspending", "Low Savings", "High Fixed Obligations"]
        );
    }

    #[test]
    fn test_no_indicators_for_healthy_month() {
        let r = record("C1", "1", 1000.0, 0.5, 0.3, 0.2);
        assert!(StressIndicator::evaluate(&r).is_empty());
    }

    #[test]
    fn test_thresholds_are_strict() {
        // exactly on each boundary: none fire
        let r = record("C1", "1", 1.0, 1.0, 0.1, 0.5);
        assert!(StressIndicator::evaluate(&r).is_empty());
    }

    #[test]
    fn test_zero_income_month_with_missing_ratios() {
        // income 0 gives an infinite expense ratio and no savings rate
        let r = record("C1", "1", 0.0, f64::INFINITY, f64::NAN, 0.2);
        assert_eq!(
            StressIndicator::evaluate(&r),
            vec![StressIndicator::NoIncome, StressIndicator::Overspending]
        );

        let r = record("C1", "1", f64::NAN, f64::NAN, f64::NAN, f64::NAN);
        assert!(StressIndicator::evaluate(&r).is_empty());
    }

    #[test]
    fn test_latest_month_drives_indicators() {
        let s = store(
            vec![
                record("C1", "2023-03", 1000.0, 0.5, 0.3, 0.2),
                record("C2", "2023-01", 0.0, 2.0, 0.0, 0.9),
                record("C1", "2023-01", 0.0, 2.0, 0.0, 0.9),
                record("C1", "2023-02", 1000.0, 0.5, 0.3, 0.2),
            ],
            &["C1", "C2"],
        );

        let detail = analyze_customer(&s, "C1").unwrap();
        let months: Vec<_> = detail.records.iter().map(|r| r.month.as_str()).collect();
        assert_eq!(months, vec!["2023-01", "2023-02", "2023-03"]);
        assert_eq!(detail.latest().unwrap().month.as_str(), "2023-03");
        assert!(detail.indicators.is_empty());
    }

    #[test]
    fn test_input_is_trimmed() {
        let s = store(vec![record("C1", "1", 0.0, 1.2, 0.05, 0.6)], &["C1"]);
        let detail = analyze_customer(&s, "  C1 ").unwrap();
        assert_eq!(detail.customer_id, "C1");
        assert_eq!(detail.indicators.len(), 4);
        assert!(detail.indicators[0].is_critical());
    }

    #[test]
    fn test_unknown_customer_is_not_found() {
        let s = store(vec![record("C1", "1", 0.0, 1.2, 0.05, 0.6)], &["C1"]);

        // present in monthly data but not in the summary table
        let s2 = store(vec![record("C9", "1", 0.0, 1.2, 0.05, 0.6)], &["C1"]);

        assert_eq!(
            analyze_customer(&s, "C404").unwrap_err(),
            LookupError::NotFound { customer_id: "C404".into() }
        );
        assert!(matches!(
            analyze_customer(&s2, "C9"),
            Err(LookupError::NotFound { .. })
        ));
    }

    #[test]
    fn test_known_customer_without_months() {
        let s = store(vec![record("C1", "1", 0.0, 1.2, 0.05, 0.6)], &["C1", "C2"]);
        assert_eq!(
            analyze_customer(&s, "C2").unwrap_err(),
            LookupError::NoMonthlyData { customer_id: "C2".into() }
        );
    }
}
