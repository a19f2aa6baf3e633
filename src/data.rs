use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::OnceCell;

use crate::error::{LoadError, LoadResult};
use crate::parser::{
    split_csv_line, ColumnMap, CsvRecord, CustomerSummary, MonthlyRecord, StressDistribution,
    StressDriver, StressTrend,
};

pub const MONTHLY_FILE: &str = "monthly_metrics_trimmed.csv";
pub const DISTRIBUTION_FILE: &str = "stress_distribution.csv";
pub const TREND_FILE: &str = "stress_trend.csv";
pub const DRIVERS_FILE: &str = "stress_drivers.csv";
pub const SUMMARY_FILE: &str = "top_risk_customers.csv";

/// Read and parse one summary file into a table
async fn read_table<T: CsvRecord>(dir: &Path, file: &str) -> LoadResult<Vec<T>> {
    let path = dir.join(file);
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(LoadError::MissingFile { path });
        }
        Err(source) => return Err(LoadError::Io { path, source }),
    };

    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let header = match lines.next() {
        Some((_, h)) => h,
        None => {
            return Err(LoadError::Parse {
                file: file.to_string(),
                line: 1,
                reason: "missing header".into(),
            })
        }
    };
    let columns = T::resolve_columns(&ColumnMap::from_header(file, header))?;

    let mut rows = Vec::new();
    for (idx, line) in lines {
        let fields = split_csv_line(line);
        let row = T::parse_csv_line(&fields, &columns).map_err(|reason| LoadError::Parse {
            file: file.to_string(),
            line: idx + 1,
            reason,
        })?;
        rows.push(row);
    }

    log::info!("loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// The five precomputed tables. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    source_dir: PathBuf,
    monthly: Vec<MonthlyRecord>,
    summary: Vec<CustomerSummary>,
    distribution: Vec<StressDistribution>,
    trend: Vec<StressTrend>,
    drivers: Vec<StressDriver>,
}

impl DataStore {
    pub fn from_tables(
        source_dir: PathBuf,
        monthly: Vec<MonthlyRecord>,
        summary: Vec<CustomerSummary>,
        distribution: Vec<StressDistribution>,
        trend: Vec<StressTrend>,
        drivers: Vec<StressDriver>,
    ) -> Self {
        Self {
            source_dir,
            monthly,
            summary,
            distribution,
            trend,
            drivers,
        }
    }

    /// Load all five files from `dir`. Any failure aborts the whole load.
    pub async fn load(dir: &Path) -> LoadResult<Self> {
        let (monthly, summary, distribution, trend, drivers) = tokio::try_join!(
            read_table::<MonthlyRecord>(dir, MONTHLY_FILE),
            read_table::<CustomerSummary>(dir, SUMMARY_FILE),
            read_table::<StressDistribution>(dir, DISTRIBUTION_FILE),
            read_table::<StressTrend>(dir, TREND_FILE),
            read_table::<StressDriver>(dir, DRIVERS_FILE),
        )?;

        let store = Self::from_tables(dir.to_path_buf(), monthly, summary, distribution, trend, drivers);
        store.warn_on_duplicates();
        Ok(store)
    }

    fn warn_on_duplicates(&self) {
        let mut seen = HashSet::new();
        let dupes = self
            .monthly
            .iter()
            .filter(|r| !seen.insert((r.customer_id.as_str(), &r.month)))
            .count();
        if dupes > 0 {
            log::warn!("{}: {} duplicate (customer, month) rows", MONTHLY_FILE, dupes);
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn monthly(&self) -> &[MonthlyRecord] {
        &self.monthly
    }

    pub fn summary(&self) -> &[CustomerSummary] {
        &self.summary
    }

    pub fn distribution(&self) -> &[StressDistribution] {
        &self.distribution
    }

    pub fn trend(&self) -> &[StressTrend] {
        &self.trend
    }

    pub fn drivers(&self) -> &[StressDriver] {
        &self.drivers
    }

    pub fn has_customer(&self, customer_id: &str) -> bool {
        self.summary.iter().any(|c| c.customer_id == customer_id)
    }

    /// (file name, row count) for every source file
    pub fn row_counts(&self) -> [(&'static str, usize); 5] {
        [
            (MONTHLY_FILE, self.monthly.len()),
            (SUMMARY_FILE, self.summary.len()),
            (DISTRIBUTION_FILE, self.distribution.len()),
            (TREND_FILE, self.trend.len()),
            (DRIVERS_FILE, self.drivers.len()),
        ]
    }
}

/// Loads the data directory once per process and hands out the same store afterwards
#[derive(Debug)]
pub struct DataLoader {
    dir: PathBuf,
    store: OnceCell<DataStore>,
}

impl DataLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            store: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> LoadResult<&DataStore> {
        self.store
            .get_or_try_init(|| async {
                log::info!("loading dashboard data from {}", self.dir.display());
                DataStore::load(&self.dir).await
            })
            .await
    }

    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.store.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_fixture(dir: &Path) {
        std::fs::write(
            dir.join(MONTHLY_FILE),
            "nameOrig,month,monthly_income,monthly_expense,savings,transfer_ratio,stress_score,stress_category,expense_income_ratio,savings_rate\n\
             C1,2023-02,1000,500,500,0.2,1,Low,0.5,0.5\n\
             C1,2023-01,1000,1200,-200,0.6,6,High,1.2,0.05\n\
             \n\
             C2,2023-01,0,300,-300,0.1,8,Severe,1.5,0.0\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(SUMMARY_FILE),
            "nameOrig,avg_stress,max_stress,stressed_months\nC1,3.5,6,1\nC2,8.0,8,1\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(DISTRIBUTION_FILE),
            "stress_category,count\nLow,1\nHigh,1\nSevere,1\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(TREND_FILE),
            "month,stress_score\n2023-01,7.0\n2023-02,1.0\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(DRIVERS_FILE),
            "driver,percentage\n\"High utilization, revolving\",42.5\nNo income,12\n",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_load_all_tables() {
        let temp_dir = TempDir::new().unwrap();
        write_fixture(temp_dir.path());

        let store = DataStore::load(temp_dir.path()).await.unwrap();

        assert_eq!(store.monthly().len(), 3);
        assert_eq!(store.summary().len(), 2);
        assert_eq!(store.distribution().len(), 3);
        assert_eq!(store.trend().len(), 2);
        assert_eq!(store.drivers()[0].driver, "High utilization, revolving");
        assert_eq!(store.source_dir(), temp_dir.path());
        assert!(store.has_customer("C2"));
        assert!(!store.has_customer("C3"));

        // file order is preserved
        assert_eq!(store.monthly()[0].month.as_str(), "2023-02");
    }

    #[tokio::test]
    async fn test_missing_file_fails_load() {
        let temp_dir = TempDir::new().unwrap();
        write_fixture(temp_dir.path());
        std::fs::remove_file(temp_dir.path().join(TREND_FILE)).unwrap();

        match DataStore::load(temp_dir.path()).await {
            Err(LoadError::MissingFile { path }) => assert!(path.ends_with(TREND_FILE)),
            other => panic!("expected MissingFile, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_row_reports_line() {
        let temp_dir = TempDir::new().unwrap();
        write_fixture(temp_dir.path());
        std::fs::write(
            temp_dir.path().join(SUMMARY_FILE),
            "nameOrig,avg_stress,max_stress,stressed_months\nC1,3.5,6,1\nC2,high,8,1\n",
        )
        .unwrap();

        match DataStore::load(temp_dir.path()).await {
            Err(LoadError::Parse { file, line, .. }) => {
                assert_eq!(file, SUMMARY_FILE);
                assert_eq!(line, 3);
            }
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_infinite_and_missing_cells_load() {
        let temp_dir = TempDir::new().unwrap();
        write_fixture(temp_dir.path());
        std::fs::write(
            temp_dir.path().join(MONTHLY_FILE),
            "nameOrig,month,monthly_income,monthly_expense,savings,transfer_ratio,stress_score,stress_category,expense_income_ratio,savings_rate\n\
             C1,2023-01,0.0,300,-300,0.6,8,Severe,inf,\n",
        )
        .unwrap();
        std::fs::write(
            temp_dir.path().join(SUMMARY_FILE),
            "nameOrig,avg_stress,max_stress,stressed_months\nC1,NaN,8,1\n",
        )
        .unwrap();

        let store = DataStore::load(temp_dir.path()).await.unwrap();
        let detail = crate::detail::analyze_customer(&store, "C1").unwrap();
        let labels: Vec<_> = detail.indicators.iter().map(|i| i.label()).collect();
        assert_eq!(labels, vec!["No Income", "Overspending", "High Fixed Obligations"]);
        assert!(store.summary()[0].avg_stress.is_nan());
    }

    #[tokio::test]
    async fn test_empty_file_fails_load() {
        let temp_dir = TempDir::new().unwrap();
        write_fixture(temp_dir.path());
        std::fs::write(temp_dir.path().join(DRIVERS_FILE), "").unwrap();

        assert!(matches!(
            DataStore::load(temp_dir.path()).await,
            Err(LoadError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_header_only_file_is_empty_table() {
        let temp_dir = TempDir::new().unwrap();
        write_fixture(temp_dir.path());
        std::fs::write(temp_dir.path().join(DRIVERS_FILE), "driver,percentage\n").unwrap();

        let store = DataStore::load(temp_dir.path()).await.unwrap();
        assert!(store.drivers().is_empty());
    }

    #[tokio::test]
    async fn test_loader_memoizes() {
        let temp_dir = TempDir::new().unwrap();
        write_fixture(temp_dir.path());

        let loader = DataLoader::new(temp_dir.path());
        assert!(!loader.is_loaded());

        let first = loader.get().await.unwrap() as *const DataStore;

        // A second call must not touch disk again
        std::fs::remove_file(temp_dir.path().join(MONTHLY_FILE)).unwrap();
        let second = loader.get().await.unwrap() as *const DataStore;

        assert!(loader.is_loaded());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_loader_does_not_cache_failures() {
        let temp_dir = TempDir::new().unwrap();
        let loader = DataLoader::new(temp_dir.path());

        assert!(loader.get().await.is_err());
        assert!(!loader.is_loaded());
    }

    #[test]
    fn test_row_counts() {
        let store = DataStore::default();
        let counts = store.row_counts();
        assert_eq!(counts.len(), 5);
        assert!(counts.iter().all(|(_, n)| *n == 0));
        assert_eq!(counts[0].0, MONTHLY_FILE);
    }
}
