use crate::app::export::ExportFormat;
use crate::core::aggregate::WALK_IN_CUSTOMER;
use crate::core::calendar::{default_date_formats, WeekdayLocale};
use crate::core::session::PathStore;
use crate::domain::columns::BAIRRO;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TOP_PRODUCTS: usize = 10;
pub const DEFAULT_TOP_CUSTOMERS: usize = 10;
pub const DEFAULT_ROWS_PER_PAGE: usize = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub paths: PathsConfig,
    pub loader: LoaderConfig,
    pub calendar: CalendarConfig,
    pub reports: ReportsConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub sales: String,
    pub catalog: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let defaults = PathStore::default();
        Self {
            sales: defaults.sales().to_string(),
            catalog: defaults.catalog().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub delimiter: String,
    pub date_formats: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: ";".to_string(),
            date_formats: default_date_formats(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub weekday_names: WeekdayLocale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    pub top_products: usize,
    pub top_customers: usize,
    pub walk_in_customer: i64,
    pub exclude_walk_in: bool,
    pub location_field: String,
    pub rows_per_page: usize,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            top_products: DEFAULT_TOP_PRODUCTS,
            top_customers: DEFAULT_TOP_CUSTOMERS,
            walk_in_customer: WALK_IN_CUSTOMER,
            exclude_walk_in: true,
            location_field: BAIRRO.to_string(),
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_path: String,
    pub format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            format: ExportFormat::Csv,
        }
    }
}

impl DashboardConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DashboardError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DashboardError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashboardError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("paths.sales", &self.paths.sales)?;
        validation::validate_path("paths.catalog", &self.paths.catalog)?;
        validation::validate_delimiter("loader.delimiter", &self.loader.delimiter)?;

        if self.loader.date_formats.is_empty() {
            return Err(DashboardError::InvalidConfigValueError {
                field: "loader.date_formats".to_string(),
                value: "[]".to_string(),
                reason: "At least one date format is required".to_string(),
            });
        }

        validation::validate_range("reports.top_products", self.reports.top_products, 5, 100)?;
        validation::validate_range("reports.top_customers", self.reports.top_customers, 5, 50)?;
        validation::validate_positive_number("reports.rows_per_page", self.reports.rows_per_page, 1)?;
        validation::validate_non_empty_string("reports.location_field", &self.reports.location_field)?;
        validation::validate_path("export.output_path", &self.export.output_path)?;

        Ok(())
    }

    pub fn excluded_customer(&self) -> Option<i64> {
        self.reports
            .exclude_walk_in
            .then_some(self.reports.walk_in_customer)
    }
}

impl ConfigProvider for DashboardConfig {
    fn sales_path(&self) -> &str {
        &self.paths.sales
    }

    fn catalog_path(&self) -> &str {
        &self.paths.catalog
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn delimiter(&self) -> u8 {
        self.loader.delimiter.bytes().next().unwrap_or(b';')
    }

    fn date_formats(&self) -> &[String] {
        &self.loader.date_formats
    }

    fn weekday_locale(&self) -> WeekdayLocale {
        self.calendar.weekday_names
    }

    fn rows_per_page(&self) -> usize {
        self.reports.rows_per_page
    }
}

impl Validate for DashboardConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
