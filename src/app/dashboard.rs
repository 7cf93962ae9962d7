//! The dashboard views as data. Every view loads what it needs through the
//! session and is memoized against the fingerprints of its inputs.

use crate::app::render::{paginate, Page};
use crate::config::toml_config::DashboardConfig;
use crate::core::aggregate::{self, CustomerReport, LocationSummary, ProductSalesSummary, TurnoverRow};
use crate::core::calendar::PeriodKind;
use crate::core::session::{Dataset, Session};
use crate::domain::model::{Cell, Frame};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DashboardError, Result};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub walk_in_customer: Cell,
    pub exclude_walk_in: bool,
    pub location_field: String,
    pub rows_per_page: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for ReportSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            walk_in_customer: Cell::Int(config.reports.walk_in_customer),
            exclude_walk_in: config.excluded_customer().is_some(),
            location_field: config.reports.location_field.clone(),
            rows_per_page: config.rows_per_page(),
        }
    }
}

/// Something that can be written out as a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Dataset(Dataset),
    Products,
    Turnover(PeriodKind),
    Unsold,
    Customers,
    Locations,
}

impl ExportTarget {
    /// File stem of the exported artifact.
    pub fn stem(&self) -> String {
        match self {
            ExportTarget::Dataset(dataset) => dataset.key().to_string(),
            ExportTarget::Products => "produtos_vendidos".to_string(),
            ExportTarget::Turnover(period) => format!("giro_vendas_{}", period.slug()),
            ExportTarget::Unsold => "produtos_nao_vendidos".to_string(),
            ExportTarget::Customers => "clientes".to_string(),
            ExportTarget::Locations => "vendas_por_local".to_string(),
        }
    }

    pub fn with_period(self, period: PeriodKind) -> Self {
        match self {
            ExportTarget::Turnover(_) => ExportTarget::Turnover(period),
            other => other,
        }
    }
}

impl FromStr for ExportTarget {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "products" | "produtos" => Ok(ExportTarget::Products),
            "turnover" | "giro" => Ok(ExportTarget::Turnover(PeriodKind::Month)),
            "unsold" | "nao_vendidos" => Ok(ExportTarget::Unsold),
            "customers" | "clientes" => Ok(ExportTarget::Customers),
            "locations" | "bairros" => Ok(ExportTarget::Locations),
            other => Dataset::from_str(other)
                .map(ExportTarget::Dataset)
                .map_err(|_| DashboardError::InvalidConfigValueError {
                    field: "target".to_string(),
                    value: s.to_string(),
                    reason: "Unknown export target".to_string(),
                }),
        }
    }
}

pub struct Dashboard {
    session: Session,
    settings: ReportSettings,
}

impl Dashboard {
    pub fn new(session: Session, settings: ReportSettings) -> Self {
        Self { session, settings }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(Session::from_config(config), ReportSettings::from(config))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn product_summary(&mut self) -> Result<Vec<ProductSalesSummary>> {
        self.session.memoized(
            "product_totals",
            &[Dataset::Sales, Dataset::Catalog],
            "",
            |s| aggregate::product_totals(s.dataset(Dataset::Sales)?, s.dataset(Dataset::Catalog)?),
        )
    }

    pub fn top_products(&mut self, n: usize) -> Result<Vec<ProductSalesSummary>> {
        let summary = self.product_summary()?;
        Ok(aggregate::top_n(&summary, n).to_vec())
    }

    pub fn turnover(&mut self, period: PeriodKind) -> Result<Vec<TurnoverRow>> {
        self.session.memoized(
            "turnover_by_period",
            &[Dataset::Sales, Dataset::Catalog],
            period.label(),
            move |s| {
                aggregate::turnover_by_period(
                    s.dataset(Dataset::Sales)?,
                    s.dataset(Dataset::Catalog)?,
                    period,
                    s.date_parser(),
                    s.weekday_locale(),
                )
            },
        )
    }

    /// Catalog rows never sold, projected onto `columns` (all columns when
    /// empty).
    pub fn unsold(&mut self, columns: &[String]) -> Result<Frame> {
        let unsold = self.session.memoized(
            "unsold_products",
            &[Dataset::Sales, Dataset::Catalog],
            "",
            |s| aggregate::unsold_products(s.dataset(Dataset::Sales)?, s.dataset(Dataset::Catalog)?),
        )?;
        if columns.is_empty() {
            Ok(unsold)
        } else {
            Ok(aggregate::select_columns(&unsold, columns))
        }
    }

    /// Columns the unsold-products view can be projected onto.
    pub fn catalog_columns(&mut self) -> Result<Vec<String>> {
        self.session.ensure_loaded(Dataset::Catalog)?;
        Ok(self.session.dataset(Dataset::Catalog)?.columns().to_vec())
    }

    pub fn customers(&mut self, exclude_walk_in: bool) -> Result<CustomerReport> {
        let excluded = exclude_walk_in.then(|| self.settings.walk_in_customer.clone());
        let params = match &excluded {
            Some(customer) => format!("exclude={}", customer),
            None => "exclude=none".to_string(),
        };
        self.session
            .memoized("customer_metrics", &[Dataset::GroupedSales], params, move |s| {
                aggregate::customer_metrics(s.dataset(Dataset::GroupedSales)?, excluded.as_ref())
            })
    }

    /// Sales per value of `field`, or of the configured location field.
    pub fn locations(&mut self, field: Option<&str>) -> Result<Vec<LocationSummary>> {
        let field = field.unwrap_or(self.settings.location_field.as_str()).to_string();
        self.session.memoized(
            "sales_by_location",
            &[Dataset::GroupedSales],
            field.clone(),
            move |s| Ok(aggregate::sales_by_location(s.dataset(Dataset::GroupedSales)?, &field)),
        )
    }

    pub fn average_items_per_sale(&mut self) -> Result<f64> {
        self.session.memoized(
            "average_items_per_sale",
            &[Dataset::GroupedSales],
            "",
            |s| Ok(aggregate::average_items_per_sale(s.dataset(Dataset::GroupedSales)?)),
        )
    }

    /// A page of a raw dataset. An empty dataset gives an empty page rather
    /// than an error.
    pub fn page(&mut self, dataset: Dataset, page: usize, rows_per_page: Option<usize>) -> Result<Page> {
        self.session.ensure_loaded(dataset)?;
        let per_page = rows_per_page.unwrap_or(self.settings.rows_per_page);
        let empty = Frame::default();
        let frame = match self.session.dataset(dataset) {
            Ok(frame) => frame,
            Err(DashboardError::DatasetUnavailable { .. }) => &empty,
            Err(e) => return Err(e),
        };
        Ok(paginate(frame, dataset.key(), page, per_page))
    }

    pub fn frame_for(&mut self, target: ExportTarget) -> Result<Frame> {
        match target {
            ExportTarget::Dataset(dataset) => {
                self.session.ensure_loaded(dataset)?;
                Ok(self.session.dataset(dataset)?.clone())
            }
            ExportTarget::Products => Ok(aggregate::products_frame(&self.product_summary()?)),
            ExportTarget::Turnover(period) => Ok(aggregate::turnover_frame(&self.turnover(period)?)),
            ExportTarget::Unsold => self.unsold(&[]),
            ExportTarget::Customers => {
                let report = self.customers(self.settings.exclude_walk_in)?;
                Ok(aggregate::customers_frame(&report.customers))
            }
            ExportTarget::Locations => {
                let field = self.settings.location_field.clone();
                let rows = self.locations(Some(&field))?;
                Ok(aggregate::locations_frame(&field, &rows))
            }
        }
    }

    /// Every exportable view, named by file stem.
    pub fn all_frames(&mut self, period: PeriodKind) -> Result<Vec<(String, Frame)>> {
        let targets = [
            ExportTarget::Dataset(Dataset::Sales),
            ExportTarget::Dataset(Dataset::GroupedSales),
            ExportTarget::Products,
            ExportTarget::Turnover(period),
            ExportTarget::Unsold,
            ExportTarget::Customers,
            ExportTarget::Locations,
        ];
        targets
            .into_iter()
            .map(|target| Ok((target.stem(), self.frame_for(target)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::PathStore;
    use crate::domain::columns::*;
    use std::io::Write;
    use tempfile::TempDir;

    const SALES: &str = "\
Controle;ProCod;Cliente;Quantidade;TotalItem;Data;Bairro
1;10;500;2;20.0;2024-01-15 10:00:00;Centro
1;11;500;1;5.0;2024-01-15 10:00:00;Centro
2;10;501;1;10.0;2024-02-01 09:00:00;Jardim
3;10;500;3;30.0;2024-02-03 11:00:00;Centro
4;11;99999;1;5.0;2024-02-03 12:00:00;Centro
";
    const CATALOG: &str = "ProCod;ProNom;Preco\n10;Arroz;10.0\n11;Feijao;5.0\n12;Cafe;8.0\n";

    fn write(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn dashboard(dir: &TempDir) -> Dashboard {
        let sales = write(dir, "vendas.csv", SALES);
        let catalog = write(dir, "cadastro.csv", CATALOG);
        let session = Session::new(PathStore::new(sales, catalog), Default::default());
        Dashboard::new(session, ReportSettings::default())
    }

    #[test]
    fn test_product_summary_is_memoized() {
        let dir = TempDir::new().unwrap();
        let mut dashboard = dashboard(&dir);

        let first = dashboard.product_summary().unwrap();
        assert_eq!(first[0].name.as_deref(), Some("Arroz"));
        assert_eq!(first[0].quantity, 6.0);

        let misses = dashboard.session().cache().stats().misses;
        let second = dashboard.product_summary().unwrap();
        assert_eq!(first, second);
        assert_eq!(dashboard.session().cache().stats().misses, misses);
        assert!(dashboard.session().cache().stats().hits >= 1);

        assert_eq!(dashboard.top_products(1).unwrap().len(), 1);
    }

    #[test]
    fn test_unsold_projection() {
        let dir = TempDir::new().unwrap();
        let mut dashboard = dashboard(&dir);

        let all = dashboard.unsold(&[]).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all.width(), 3);

        assert_eq!(dashboard.catalog_columns().unwrap(), [PRO_COD, PRO_NOM, "Preco"]);

        let projected = dashboard
            .unsold(&[PRO_NOM.to_string(), "Missing".to_string()])
            .unwrap();
        assert_eq!(projected.columns(), &[PRO_NOM.to_string()]);
        assert_eq!(projected.get(0, PRO_NOM), Some(&Cell::from("Cafe")));
    }

    #[test]
    fn test_customers_walk_in_toggle() {
        let dir = TempDir::new().unwrap();
        let mut dashboard = dashboard(&dir);

        let with_walk_in = dashboard.customers(false).unwrap();
        let without = dashboard.customers(true).unwrap();
        assert_eq!(with_walk_in.total_customers, 3);
        assert_eq!(without.total_customers, 2);
        assert_eq!(without.returning_customers, 1);
        assert_eq!(without.return_rate, 50.0);
    }

    #[test]
    fn test_locations_and_average_items() {
        let dir = TempDir::new().unwrap();
        let mut dashboard = dashboard(&dir);

        let locations = dashboard.locations(None).unwrap();
        assert_eq!(locations[0].location, Cell::from("Centro"));
        assert_eq!(locations[0].sales, 3);
        assert!(dashboard.locations(Some("Cidade")).unwrap().is_empty());

        // Transactions carry 2, 1, 1 and 1 items.
        assert_eq!(dashboard.average_items_per_sale().unwrap(), 1.25);
    }

    #[test]
    fn test_page_of_grouped_sales() {
        let dir = TempDir::new().unwrap();
        let mut dashboard = dashboard(&dir);

        let page = dashboard.page(Dataset::GroupedSales, 2, Some(3)).unwrap();
        assert_eq!(page.pages, 2);
        assert_eq!(page.caption(), "Exibindo linhas 4 a 4 de 4.");
    }

    #[test]
    fn test_export_targets() {
        assert_eq!("giro".parse::<ExportTarget>().unwrap(), ExportTarget::Turnover(PeriodKind::Month));
        assert_eq!(
            "grouped".parse::<ExportTarget>().unwrap(),
            ExportTarget::Dataset(Dataset::GroupedSales)
        );
        assert!("charts".parse::<ExportTarget>().is_err());
        assert_eq!(ExportTarget::Customers.stem(), "clientes");
        assert_eq!(
            ExportTarget::Turnover(PeriodKind::Month)
                .with_period(PeriodKind::Year)
                .stem(),
            "giro_vendas_ano"
        );
    }

    #[test]
    fn test_all_frames() {
        let dir = TempDir::new().unwrap();
        let mut dashboard = dashboard(&dir);

        let frames = dashboard.all_frames(PeriodKind::Quarter).unwrap();
        assert_eq!(frames.len(), 7);
        let (stem, products) = &frames[2];
        assert_eq!(stem, "produtos_vendidos");
        assert_eq!(products.len(), 2);
        let (_, grouped) = &frames[1];
        assert_eq!(grouped.len(), 4);
    }
}
