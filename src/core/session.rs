//! Application state for one dashboard session: input paths, loaded
//! datasets and the memo cache. Mutated only through `&mut self`.

use crate::core::cache::{CacheKey, ReportCache};
use crate::core::calendar::{DateParser, WeekdayLocale};
use crate::core::loader::DataLoader;
use crate::domain::model::Frame;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DashboardError, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_DATA_DIR: &str = "dados";
pub const DEFAULT_SALES_FILE: &str = "NotasFW_ProdInfo.csv";
pub const DEFAULT_CATALOG_FILE: &str = "prodMercado.csv";

/// The datasets a session can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Sales,
    Catalog,
    GroupedSales,
}

impl Dataset {
    pub fn key(&self) -> &'static str {
        match self {
            Dataset::Sales => "df_vendas",
            Dataset::Catalog => "df_cadastro",
            Dataset::GroupedSales => "df_vendas_agrupado",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Dataset {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sales" | "vendas" | "df_vendas" => Ok(Dataset::Sales),
            "catalog" | "cadastro" | "df_cadastro" => Ok(Dataset::Catalog),
            "grouped" | "agrupado" | "df_vendas_agrupado" => Ok(Dataset::GroupedSales),
            _ => Err(DashboardError::DatasetUnavailable {
                name: s.to_string(),
            }),
        }
    }
}

pub fn is_valid_path(path: &str) -> bool {
    !path.trim().is_empty() && Path::new(path).is_file()
}

/// The two input paths, seeded with defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStore {
    sales: String,
    catalog: String,
}

impl PathStore {
    pub fn new(sales: impl Into<String>, catalog: impl Into<String>) -> Self {
        Self {
            sales: sales.into(),
            catalog: catalog.into(),
        }
    }

    pub fn in_dir(dir: &str) -> Self {
        let dir = Path::new(dir);
        Self::new(
            dir.join(DEFAULT_SALES_FILE).to_string_lossy(),
            dir.join(DEFAULT_CATALOG_FILE).to_string_lossy(),
        )
    }

    /// `(caminho_vendas, caminho_cadastro)`
    pub fn get_paths(&self) -> (&str, &str) {
        (&self.sales, &self.catalog)
    }

    pub fn sales(&self) -> &str {
        &self.sales
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    /// Replaces both paths only if both point to existing files.
    pub fn set_paths(&mut self, sales: &str, catalog: &str) -> Result<()> {
        if !is_valid_path(sales) {
            return Err(DashboardError::PathError {
                dataset: "sales".to_string(),
                path: sales.to_string(),
            });
        }
        if !is_valid_path(catalog) {
            return Err(DashboardError::PathError {
                dataset: "catalog".to_string(),
                path: catalog.to_string(),
            });
        }
        self.sales = sales.to_string();
        self.catalog = catalog.to_string();
        Ok(())
    }
}

impl Default for PathStore {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATA_DIR)
    }
}

#[derive(Debug, Clone)]
struct Loaded {
    frame: Frame,
    fingerprint: String,
}

#[derive(Debug)]
pub struct Session {
    paths: PathStore,
    loader: DataLoader,
    datasets: HashMap<Dataset, Loaded>,
    cache: ReportCache,
}

impl Session {
    pub fn new(paths: PathStore, loader: DataLoader) -> Self {
        Self {
            paths,
            loader,
            datasets: HashMap::new(),
            cache: ReportCache::new(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        let loader = DataLoader::new(
            DateParser::new(config.date_formats().to_vec()),
            config.weekday_locale(),
        )
        .with_delimiter(config.delimiter());
        Self::new(
            PathStore::new(config.sales_path(), config.catalog_path()),
            loader,
        )
    }

    pub fn paths(&self) -> &PathStore {
        &self.paths
    }

    pub fn date_parser(&self) -> &DateParser {
        self.loader.parser()
    }

    pub fn weekday_locale(&self) -> WeekdayLocale {
        self.loader.locale()
    }

    /// Validates and stores new input paths. On success every loaded dataset
    /// and cached result is dropped; on failure nothing changes.
    pub fn set_paths(&mut self, sales: &str, catalog: &str) -> Result<()> {
        self.paths.set_paths(sales, catalog)?;
        self.clear();
        tracing::info!("💾 Paths updated: sales={}, catalog={}", sales, catalog);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.datasets.clear();
        self.cache.invalidate_all();
    }

    pub fn is_loaded(&self, dataset: Dataset) -> bool {
        self.datasets.contains_key(&dataset)
    }

    /// Loads `dataset` (and what it depends on) unless already present.
    pub fn ensure_loaded(&mut self, dataset: Dataset) -> Result<()> {
        if self.is_loaded(dataset) {
            return Ok(());
        }
        self.load(dataset)
    }

    /// Loads `dataset` again from disk, discarding what was derived from it.
    pub fn reload(&mut self, dataset: Dataset) -> Result<()> {
        if dataset == Dataset::GroupedSales {
            self.datasets.remove(&Dataset::Sales);
        }
        self.load(dataset)
    }

    fn load(&mut self, dataset: Dataset) -> Result<()> {
        let frame = match dataset {
            Dataset::Sales => {
                let frame = self.loader.load_sales(self.paths.sales())?;
                // The grouped view is derived from the old sales frame.
                self.datasets.remove(&Dataset::GroupedSales);
                frame
            }
            Dataset::Catalog => self.loader.load_catalog(self.paths.catalog())?,
            Dataset::GroupedSales => {
                self.ensure_loaded(Dataset::Sales)?;
                let sales = self.dataset(Dataset::Sales)?;
                self.loader.aggregate_transactions(sales).map_err(|e| {
                    tracing::error!("❌ Sales dataset is not available or malformed: {}", e);
                    e
                })?
            }
        };

        self.cache.invalidate_all();
        let fingerprint = frame.fingerprint();
        self.datasets.insert(dataset, Loaded { frame, fingerprint });
        Ok(())
    }

    /// Pure accessor; fails when the dataset is absent or empty.
    pub fn dataset(&self, dataset: Dataset) -> Result<&Frame> {
        match self.datasets.get(&dataset) {
            Some(loaded) if !loaded.frame.is_empty() => Ok(&loaded.frame),
            _ => Err(DashboardError::DatasetUnavailable {
                name: dataset.key().to_string(),
            }),
        }
    }

    pub fn fingerprint(&self, dataset: Dataset) -> Option<&str> {
        self.datasets.get(&dataset).map(|l| l.fingerprint.as_str())
    }

    /// Ensures every input is loaded, then returns the cached result for
    /// `(operation, input fingerprints, params)` or computes and stores it.
    pub fn memoized<T, F>(
        &mut self,
        operation: &'static str,
        inputs: &[Dataset],
        params: impl Into<String>,
        compute: F,
    ) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(&Session) -> Result<T>,
    {
        for dataset in inputs {
            self.ensure_loaded(*dataset)?;
        }
        let fingerprints = inputs
            .iter()
            .map(|d| self.fingerprint(*d).unwrap_or_default().to_string())
            .collect();
        let key = CacheKey::new(operation, fingerprints, params);

        if let Some(hit) = self.cache.get::<T>(&key) {
            return Ok(hit);
        }
        let value = compute(self)?;
        self.cache.insert(key, value.clone());
        Ok(value)
    }

    pub fn cache(&self) -> &ReportCache {
        &self.cache
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PathStore::default(), DataLoader::default())
    }
}
