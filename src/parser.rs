/// Parsers for the precomputed stress CSV summaries
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::error::LoadError;

// ============================================================================
// CSV line splitting
// ============================================================================

/// Split one CSV line into fields, honoring double quotes.
/// `""` inside a quoted field is an escaped quote.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Header name -> column position for one file
#[derive(Debug, Clone)]
pub struct ColumnMap {
    file: String,
    positions: HashMap<String, usize>,
}

impl ColumnMap {
    pub fn from_header(file: &str, header: &str) -> Self {
        let positions = split_csv_line(header)
            .into_iter()
            .enumerate()
            // Strip a UTF-8 BOM from the first header cell
            .map(|(i, name)| (name.trim_start_matches('\u{feff}').to_string(), i))
            .collect();

        Self {
            file: file.to_string(),
            positions,
        }
    }

    /// Position of the first name in `names` present in the header.
    /// Later names are aliases.
    pub fn require(&self, names: &[&str]) -> Result<usize, LoadError> {
        names
            .iter()
            .find_map(|n| self.positions.get(*n).copied())
            .ok_or_else(|| LoadError::MissingColumn {
                file: self.file.clone(),
                column: names.first().copied().unwrap_or_default().to_string(),
            })
    }
}

/// A row type read from one of the summary files
pub trait CsvRecord: Sized {
    type Columns;

    fn resolve_columns(map: &ColumnMap) -> Result<Self::Columns, LoadError>;

    fn parse_csv_line(fields: &[String], cols: &Self::Columns) -> Result<Self, String>;
}

fn field<'a>(fields: &'a [String], idx: usize, name: &str) -> Result<&'a str, String> {
    fields
        .get(idx)
        .map(|s| s.as_str())
        .ok_or_else(|| format!("missing field '{}'", name))
}

/// Cells read as missing (NaN) rather than as an error
const MISSING_TOKENS: &[&str] = &["", "nan", "-nan", "na", "n/a", "null", "none"];

fn is_missing(raw: &str) -> bool {
    let raw = raw.trim();
    MISSING_TOKENS.iter().any(|t| raw.eq_ignore_ascii_case(t))
}

/// Missing cells become NaN; `inf`/`-inf` are kept. Anything else non-numeric is an error.
fn parse_f64(fields: &[String], idx: usize, name: &str) -> Result<f64, String> {
    let raw = field(fields, idx, name)?;
    if is_missing(raw) {
        return Ok(f64::NAN);
    }
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid number '{}' in '{}'", raw, name))
}

/// Counts are written as "3" or "3.0" depending on the upstream dtype.
/// A missing count reads as 0, which fails every `> 0` test just like NaN.
fn parse_count(fields: &[String], idx: usize, name: &str) -> Result<u64, String> {
    let raw = field(fields, idx, name)?;
    if is_missing(raw) {
        return Ok(0);
    }
    if let Ok(v) = raw.trim().parse::<u64>() {
        return Ok(v);
    }
    match raw.trim().parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v.is_finite() => Ok(v as u64),
        _ => Err(format!("invalid count '{}' in '{}'", raw, name)),
    }
}

fn parse_text(fields: &[String], idx: usize, name: &str) -> Result<String, String> {
    let raw = field(fields, idx, name)?;
    if raw.is_empty() {
        Err(format!("empty '{}'", name))
    } else {
        Ok(raw.to_string())
    }
}

// ============================================================================
// Month label
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum MonthKey {
    Numeric(i64),
    Text(String),
}

/// A month label such as "2023-04" or "7".
/// Integer labels order numerically, everything else lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Month {
    key: MonthKey,
    raw: String,
}

impl Month {
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let key = match raw.parse::<i64>() {
            Ok(n) => MonthKey::Numeric(n),
            Err(_) => MonthKey::Text(raw.clone()),
        };
        Self { key, raw }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for Month {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key).then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for Month {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CUSTOMER_ID: &[&str] = &["customer_id", "nameOrig"];

// ============================================================================
// Monthly metrics
// ============================================================================
/// Sample:
/// nameOrig,month,monthly_income,monthly_expense,savings,transfer_ratio,stress_score,stress_category,expense_income_ratio,savings_rate
/// C1000000639,2023-04,0.0,1520.5,-1520.5,0.62,7,High,1.2,0.05

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRecord {
    pub customer_id: String,
    pub month: Month,
    pub monthly_income: f64,
    pub monthly_expense: f64,
    pub savings: f64,
    pub transfer_ratio: f64,
    pub stress_score: f64,
    pub stress_category: String,
    pub expense_income_ratio: f64,
    pub savings_rate: f64,
}

/// Column positions for `MonthlyRecord`, resolved once per file
#[derive(Debug, Clone, Copy)]
pub struct MonthlyColumns {
    customer_id: usize,
    month: usize,
    monthly_income: usize,
    monthly_expense: usize,
    savings: usize,
    transfer_ratio: usize,
    stress_score: usize,
    stress_category: usize,
    expense_income_ratio: usize,
    savings_rate: usize,
}

impl MonthlyColumns {
    pub fn resolve(map: &ColumnMap) -> Result<Self, LoadError> {
        Ok(Self {
            customer_id: map.require(CUSTOMER_ID)?,
            month: map.require(&["month"])?,
            monthly_income: map.require(&["monthly_income"])?,
            monthly_expense: map.require(&["monthly_expense"])?,
            savings: map.require(&["savings"])?,
            transfer_ratio: map.require(&["transfer_ratio"])?,
            stress_score: map.require(&["stress_score"])?,
            stress_category: map.require(&["stress_category"])?,
            expense_income_ratio: map.require(&["expense_income_ratio"])?,
            savings_rate: map.require(&["savings_rate"])?,
        })
    }
}

impl CsvRecord for MonthlyRecord {
    type Columns = MonthlyColumns;

    fn resolve_columns(map: &ColumnMap) -> Result<MonthlyColumns, LoadError> {
        MonthlyColumns::resolve(map)
    }

    fn parse_csv_line(fields: &[String], cols: &MonthlyColumns) -> Result<Self, String> {
        Ok(Self {
            customer_id: parse_text(fields, cols.customer_id, "customer_id")?,
            month: Month::new(&parse_text(fields, cols.month, "month")?),
            monthly_income: parse_f64(fields, cols.monthly_income, "monthly_income")?,
            monthly_expense: parse_f64(fields, cols.monthly_expense, "monthly_expense")?,
            savings: parse_f64(fields, cols.savings, "savings")?,
            transfer_ratio: parse_f64(fields, cols.transfer_ratio, "transfer_ratio")?,
            stress_score: parse_f64(fields, cols.stress_score, "stress_score")?,
            stress_category: parse_text(fields, cols.stress_category, "stress_category")?,
            expense_income_ratio: parse_f64(
                fields,
                cols.expense_income_ratio,
                "expense_income_ratio",
            )?,
            savings_rate: parse_f64(fields, cols.savings_rate, "savings_rate")?,
        })
    }
}

// ============================================================================
// Customer summary
// ============================================================================
/// Sample:
/// nameOrig,avg_stress,max_stress,stressed_months
/// C1000000639,4.25,8,3

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSummary {
    pub customer_id: String,
    pub avg_stress: f64,
    pub max_stress: f64,
    pub stressed_months: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct SummaryColumns {
    customer_id: usize,
    avg_stress: usize,
    max_stress: usize,
    stressed_months: usize,
}

impl SummaryColumns {
    pub fn resolve(map: &ColumnMap) -> Result<Self, LoadError> {
        Ok(Self {
            customer_id: map.require(CUSTOMER_ID)?,
            avg_stress: map.require(&["avg_stress"])?,
            max_stress: map.require(&["max_stress"])?,
            stressed_months: map.require(&["stressed_months"])?,
        })
    }
}

impl CsvRecord for CustomerSummary {
    type Columns = SummaryColumns;

    fn resolve_columns(map: &ColumnMap) -> Result<SummaryColumns, LoadError> {
        SummaryColumns::resolve(map)
    }

    fn parse_csv_line(fields: &[String], cols: &SummaryColumns) -> Result<Self, String> {
        Ok(Self {
            customer_id: parse_text(fields, cols.customer_id, "customer_id")?,
            avg_stress: parse_f64(fields, cols.avg_stress, "avg_stress")?,
            max_stress: parse_f64(fields, cols.max_stress, "max_stress")?,
            stressed_months: parse_count(fields, cols.stressed_months, "stressed_months")?,
        })
    }
}

// ============================================================================
// Stress distribution, trend and drivers
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StressDistribution {
    pub stress_category: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct DistributionColumns {
    stress_category: usize,
    count: usize,
}

impl DistributionColumns {
    pub fn resolve(map: &ColumnMap) -> Result<Self, LoadError> {
        Ok(Self {
            stress_category: map.require(&["stress_category"])?,
            count: map.require(&["count"])?,
        })
    }
}

impl CsvRecord for StressDistribution {
    type Columns = DistributionColumns;

    fn resolve_columns(map: &ColumnMap) -> Result<DistributionColumns, LoadError> {
        DistributionColumns::resolve(map)
    }

    fn parse_csv_line(fields: &[String], cols: &DistributionColumns) -> Result<Self, String> {
        Ok(Self {
            stress_category: parse_text(fields, cols.stress_category, "stress_category")?,
            count: parse_count(fields, cols.count, "count")?,
        })
    }
}

/// Portfolio average stress for one month
#[derive(Debug, Clone, PartialEq)]
pub struct StressTrend {
    pub month: Month,
    pub stress_score: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct TrendColumns {
    month: usize,
    stress_score: usize,
}

impl TrendColumns {
    pub fn resolve(map: &ColumnMap) -> Result<Self, LoadError> {
        Ok(Self {
            month: map.require(&["month"])?,
            stress_score: map.require(&["stress_score"])?,
        })
    }
}

impl CsvRecord for StressTrend {
    type Columns = TrendColumns;

    fn resolve_columns(map: &ColumnMap) -> Result<TrendColumns, LoadError> {
        TrendColumns::resolve(map)
    }

    fn parse_csv_line(fields: &[String], cols: &TrendColumns) -> Result<Self, String> {
        Ok(Self {
            month: Month::new(&parse_text(fields, cols.month, "month")?),
            stress_score: parse_f64(fields, cols.stress_score, "stress_score")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StressDriver {
    pub driver: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct DriverColumns {
    driver: usize,
    percentage: usize,
}

impl DriverColumns {
    pub fn resolve(map: &ColumnMap) -> Result<Self, LoadError> {
        Ok(Self {
            driver: map.require(&["driver"])?,
            percentage: map.require(&["percentage"])?,
        })
    }
}

impl CsvRecord for StressDriver {
    type Columns = DriverColumns;

    fn resolve_columns(map: &ColumnMap) -> Result<DriverColumns, LoadError> {
        DriverColumns::resolve(map)
    }

    fn parse_csv_line(fields: &[String], cols: &DriverColumns) -> Result<Self, String> {
        Ok(Self {
            driver: parse_text(fields, cols.driver, "driver")?,
            percentage: parse_f64(fields, cols.percentage, "percentage")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONTHLY_HEADER: &str = "nameOrig,month,monthly_income,monthly_expense,savings,transfer_ratio,stress_score,stress_category,expense_income_ratio,savings_rate";

    #[test]
    fn test_split_plain_line() {
        assert_eq!(split_csv_line("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_csv_line("a,,c"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_split_quoted_fields() {
        let fields = split_csv_line(r#""High utilization, revolving",42.5"#);
        assert_eq!(fields, vec!["High utilization, revolving", "42.5"]);

        let fields = split_csv_line(r#""say ""hi""",1"#);
        assert_eq!(fields, vec![r#"say "hi""#, "1"]);
    }

    #[test]
    fn test_split_strips_carriage_return() {
        assert_eq!(split_csv_line("a,1\r"), vec!["a", "1"]);
    }

    #[test]
    fn test_parse_monthly_line() {
        let map = ColumnMap::from_header("monthly", MONTHLY_HEADER);
        let cols = MonthlyColumns::resolve(&map).unwrap();
        let fields = split_csv_line("C1000000639,2023-04,0.0,1520.5,-1520.5,0.62,7,High,1.2,0.05");
        let record = MonthlyRecord::parse_csv_line(&fields, &cols).unwrap();

        assert_eq!(record.customer_id, "C1000000639");
        assert_eq!(record.month.as_str(), "2023-04");
        assert_eq!(record.monthly_income, 0.0);
        assert_eq!(record.monthly_expense, 1520.5);
        assert_eq!(record.savings, -1520.5);
        assert_eq!(record.transfer_ratio, 0.62);
        assert_eq!(record.stress_score, 7.0);
        assert_eq!(record.stress_category, "High");
        assert_eq!(record.expense_income_ratio, 1.2);
        assert_eq!(record.savings_rate, 0.05);
    }

    #[test]
    fn test_columns_found_by_name_in_any_order() {
        let map = ColumnMap::from_header("summary", "stressed_months,extra,max_stress,customer_id,avg_stress");
        let cols = SummaryColumns::resolve(&map).unwrap();
        let fields = split_csv_line("3.0,ignored,8,C1,4.25");
        let summary = CustomerSummary::parse_csv_line(&fields, &cols).unwrap();

        assert_eq!(summary.customer_id, "C1");
        assert_eq!(summary.max_stress, 8.0);
        assert_eq!(summary.avg_stress, 4.25);
        assert_eq!(summary.stressed_months, 3);
    }

    #[test]
    fn test_header_bom_is_ignored() {
        let map = ColumnMap::from_header("drivers", "\u{feff}driver,percentage");
        assert!(DriverColumns::resolve(&map).is_ok());
    }

    #[test]
    fn test_missing_column() {
        let map = ColumnMap::from_header("stress_trend.csv", "month,score");
        match TrendColumns::resolve(&map) {
            Err(LoadError::MissingColumn { file, column }) => {
                assert_eq!(file, "stress_trend.csv");
                assert_eq!(column, "stress_score");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let map = ColumnMap::from_header("drivers", "driver,percentage");
        let cols = DriverColumns::resolve(&map).unwrap();

        let err = StressDriver::parse_csv_line(&split_csv_line("Low savings,abc"), &cols).unwrap_err();
        assert!(err.contains("percentage"));
        assert!(StressDriver::parse_csv_line(&split_csv_line("Low savings,12x"), &cols).is_err());
    }

    #[test]
    fn test_missing_numbers_read_as_nan() {
        let map = ColumnMap::from_header("drivers", "driver,percentage");
        let cols = DriverColumns::resolve(&map).unwrap();

        for raw in ["Low savings,", "Low savings,NaN", "Low savings,nan", "Low savings,NA"] {
            let driver = StressDriver::parse_csv_line(&split_csv_line(raw), &cols).unwrap();
            assert!(driver.percentage.is_nan(), "{}", raw);
        }
    }

    #[test]
    fn test_infinite_ratio_is_kept() {
        let map = ColumnMap::from_header("monthly", MONTHLY_HEADER);
        let cols = MonthlyColumns::resolve(&map).unwrap();
        let fields = split_csv_line("C1,2023-01,0.0,300,-300,0.6,8,Severe,inf,");
        let record = MonthlyRecord::parse_csv_line(&fields, &cols).unwrap();

        assert_eq!(record.expense_income_ratio, f64::INFINITY);
        assert!(record.savings_rate.is_nan());

        let fields = split_csv_line("C1,2023-01,0.0,300,-300,0.6,8,Severe,-inf,0.1");
        let record = MonthlyRecord::parse_csv_line(&fields, &cols).unwrap();
        assert_eq!(record.expense_income_ratio, f64::NEG_INFINITY);
    }

    #[test]
    fn test_missing_count_reads_as_zero() {
        let map = ColumnMap::from_header("summary", "customer_id,avg_stress,max_stress,stressed_months");
        let cols = SummaryColumns::resolve(&map).unwrap();
        let summary = CustomerSummary::parse_csv_line(&split_csv_line("C1,,7,"), &cols).unwrap();

        assert!(summary.avg_stress.is_nan());
        assert_eq!(summary.max_stress, 7.0);
        assert_eq!(summary.stressed_months, 0);
    }

    #[test]
    fn test_count_rejects_fractions() {
        let map = ColumnMap::from_header("dist", "stress_category,count");
        let cols = DistributionColumns::resolve(&map).unwrap();

        let ok = StressDistribution::parse_csv_line(&split_csv_line("High,12.0"), &cols).unwrap();
        assert_eq!(ok.count, 12);
        assert!(StressDistribution::parse_csv_line(&split_csv_line("High,1.5"), &cols).is_err());
        assert!(StressDistribution::parse_csv_line(&split_csv_line("High,-1"), &cols).is_err());
    }

    #[test]
    fn test_short_row_is_rejected() {
        let map = ColumnMap::from_header("trend", "month,stress_score");
        let cols = TrendColumns::resolve(&map).unwrap();
        assert!(StressTrend::parse_csv_line(&split_csv_line("2023-01"), &cols).is_err());
    }

    #[test]
    fn test_month_ordering() {
        assert!(Month::new("2") < Month::new("10"));
        assert!(Month::new("2023-02") < Month::new("2023-10"));
        assert!(Month::new("2022-12") < Month::new("2023-01"));
        // integer labels sort ahead of text labels
        assert!(Month::new("99") < Month::new("2023-01"));
        assert_eq!(Month::new(" 5 ").as_str(), "5");
    }
}
