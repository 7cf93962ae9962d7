use anyhow::Result;
use chrono::Datelike;
use sales_dashboard::core::calendar::WeekdayLocale;
use sales_dashboard::core::loader::DataLoader;
use sales_dashboard::domain::columns::*;
use sales_dashboard::domain::model::{Cell, Frame};
use sales_dashboard::{Dashboard, DashboardConfig, DashboardError, Dataset, PathStore, PeriodKind, Session};
use std::collections::BTreeSet;
use std::io::Write;
use tempfile::TempDir;

const SALES: &str = "\
Controle;ProCod;Cliente;Quantidade;TotalItem;Data;Bairro;Vendedor
100;1;500;2;20.50;15/01/2024 10:00;Centro;Ana
100;2;500;1;4.00;15/01/2024 10:00;Centro;Ana
101;1;501;1;10.25;03/02/2024;Jardim;Bia
102;3;500;5;50.00;2024-07-06 09:30:00;Centro;Ana
103;2;99999;2;8.00;07/07/2024 18:00;;Bia
104;1;502;1;10.25;not a date;Centro;Ana
";

const CATALOG: &str = "\
ProCod;ProNom;Preco
1;Arroz;10.25
2;Feijão;4.00
3;Café;10.00
4;Açúcar;3.50
5;Sal;2.00
";

fn write_file(dir: &TempDir, name: &str, content: &str) -> Result<String> {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path)?;
    file.write_all(content.as_bytes())?;
    Ok(path.to_string_lossy().into_owned())
}

fn fixture(dir: &TempDir) -> Result<(String, String)> {
    Ok((
        write_file(dir, "NotasFW_ProdInfo.csv", SALES)?,
        write_file(dir, "prodMercado.csv", CATALOG)?,
    ))
}

fn dashboard(dir: &TempDir) -> Result<Dashboard> {
    let (sales, catalog) = fixture(dir)?;
    let mut config = DashboardConfig::default();
    config.paths.sales = sales;
    config.paths.catalog = catalog;
    Ok(Dashboard::from_config(&config))
}

fn codes(frame: &Frame) -> BTreeSet<Cell> {
    frame
        .column_values(PRO_COD)
        .unwrap_or_default()
        .into_iter()
        .cloned()
        .collect()
}

#[test]
fn test_derived_calendar_columns_match_dates() -> Result<()> {
    let dir = TempDir::new()?;
    let mut dashboard = dashboard(&dir)?;
    let session = dashboard.session_mut();
    session.ensure_loaded(Dataset::Sales)?;
    let sales = session.dataset(Dataset::Sales)?;

    // The row with an unparseable date is dropped.
    assert_eq!(sales.len(), 5);

    for row in 0..sales.len() {
        let dt = sales
            .get(row, DATA)
            .and_then(Cell::as_datetime)
            .expect("Data is parsed");
        assert_eq!(sales.get(row, ANO), Some(&Cell::Int(dt.year() as i64)));
        assert_eq!(
            sales.get(row, MES_PERIODO),
            Some(&Cell::Text(dt.format("%Y-%m").to_string()))
        );
        assert_eq!(
            sales.get(row, SEMESTRE),
            Some(&Cell::from(if dt.month() <= 6 { "S1" } else { "S2" }))
        );
        assert_eq!(
            sales.get(row, DIA_SEMANA),
            Some(&Cell::from(WeekdayLocale::Portuguese.name(dt.weekday())))
        );
    }

    assert_eq!(sales.get(0, DIA_SEMANA), Some(&Cell::from("Segunda-feira")));
    assert_eq!(sales.get(0, TRIMESTRE), Some(&Cell::from("2024Q1")));
    assert_eq!(
        sales.get(0, SEMANA_INICIO),
        Some(&Cell::from("2024-01-15/2024-01-21"))
    );
    Ok(())
}

#[test]
fn test_product_totals_sum_and_order() -> Result<()> {
    let dir = TempDir::new()?;
    let mut dashboard = dashboard(&dir)?;

    let products = dashboard.product_summary()?;
    let names: Vec<_> = products.iter().map(|p| p.name.clone().unwrap_or_default()).collect();
    assert_eq!(names, ["Café", "Arroz", "Feijão"]);
    assert!(products.windows(2).all(|w| w[0].total >= w[1].total));

    let sold: f64 = dashboard
        .session()
        .dataset(Dataset::Sales)?
        .column_values(QUANTIDADE)
        .unwrap_or_default()
        .into_iter()
        .filter_map(Cell::as_f64)
        .sum();
    assert_eq!(products.iter().map(|p| p.quantity).sum::<f64>(), sold);
    assert_eq!(products[1].formatted_total(), "R$ 30,75");

    assert_eq!(dashboard.top_products(2)?.len(), 2);
    Ok(())
}

#[test]
fn test_grouped_sales_one_row_per_transaction() -> Result<()> {
    let dir = TempDir::new()?;
    let mut dashboard = dashboard(&dir)?;
    let session = dashboard.session_mut();
    session.ensure_loaded(Dataset::GroupedSales)?;

    let sales = session.dataset(Dataset::Sales)?;
    let grouped = session.dataset(Dataset::GroupedSales)?;

    let distinct: BTreeSet<&Cell> = sales
        .column_values(CONTROLE)
        .unwrap_or_default()
        .into_iter()
        .collect();
    assert_eq!(grouped.len(), distinct.len());

    for row in 0..grouped.len() {
        let controle = grouped.get(row, CONTROLE).cloned().unwrap_or(Cell::Null);
        let expected: f64 = sales
            .rows()
            .iter()
            .filter(|r| sales.column_index(CONTROLE).is_some_and(|i| r[i] == controle))
            .filter_map(|r| sales.column_index(TOTAL_ITEM).and_then(|i| r[i].as_f64()))
            .sum();
        let actual = grouped.get(row, TOTAL_VENDA).and_then(Cell::as_f64).unwrap_or(0.0);
        assert!((actual - expected).abs() < 1e-9);
    }

    assert_eq!(grouped.get(0, QUANTIDADE_ITENS), Some(&Cell::Int(2)));
    assert_eq!(grouped.get(3, BAIRRO), Some(&Cell::Null));
    Ok(())
}

#[test]
fn test_unsold_partitions_catalog() -> Result<()> {
    let dir = TempDir::new()?;
    let mut dashboard = dashboard(&dir)?;

    let unsold = codes(&dashboard.unsold(&[])?);
    let sold = codes(dashboard.session().dataset(Dataset::Sales)?);
    let catalog = codes(dashboard.session().dataset(Dataset::Catalog)?);

    assert!(unsold.is_disjoint(&sold));
    let union: BTreeSet<Cell> = unsold.union(&sold).cloned().collect();
    assert_eq!(union, catalog);
    assert_eq!(unsold, BTreeSet::from([Cell::Int(4), Cell::Int(5)]));
    Ok(())
}

#[test]
fn test_customer_metrics() -> Result<()> {
    let dir = TempDir::new()?;
    let mut dashboard = dashboard(&dir)?;

    let all = dashboard.customers(false)?;
    let excluded = dashboard.customers(true)?;
    assert_eq!(excluded.total_customers, all.total_customers - 1);
    assert_eq!(excluded.total_purchases, 3);

    let best = &excluded.customers[0];
    assert_eq!(best.customer, Cell::Int(500));
    assert_eq!(best.purchases, 2);
    assert_eq!(best.average_ticket, best.total_spend / best.purchases as f64);
    assert_eq!(best.total_spend, 74.5);

    assert_eq!(excluded.returning_customers, 1);
    assert_eq!(excluded.return_rate, 50.0);
    Ok(())
}

#[test]
fn test_only_walk_in_customers_gives_zero_rate() -> Result<()> {
    let dir = TempDir::new()?;
    let sales = write_file(
        &dir,
        "vendas.csv",
        "Controle;ProCod;Cliente;Quantidade;TotalItem;Data;Bairro\n1;1;99999;1;5.0;01/03/2024;Centro\n",
    )?;
    let catalog = write_file(&dir, "cadastro.csv", CATALOG)?;
    let session = Session::new(PathStore::new(sales, catalog), DataLoader::default());
    let mut dashboard = Dashboard::new(session, Default::default());

    let report = dashboard.customers(true)?;
    assert_eq!(report.total_customers, 0);
    assert_eq!(report.return_rate, 0.0);
    assert!(report.customers.is_empty());
    Ok(())
}

#[test]
fn test_locations_and_average_items() -> Result<()> {
    let dir = TempDir::new()?;
    let mut dashboard = dashboard(&dir)?;

    let locations = dashboard.locations(None)?;
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].location, Cell::from("Centro"));
    assert_eq!(locations[0].sales, 2);
    assert_eq!(locations[0].formatted_total(), "R$ 74,50");

    assert!(dashboard.locations(Some("Cidade"))?.is_empty());
    assert_eq!(dashboard.average_items_per_sale()?, 5.0 / 4.0);
    Ok(())
}

#[test]
fn test_turnover_by_month_and_english_weekday() -> Result<()> {
    let dir = TempDir::new()?;
    let mut dashboard = dashboard(&dir)?;

    let monthly = dashboard.turnover(PeriodKind::Month)?;
    let cafe = monthly
        .iter()
        .find(|r| r.product == "Café")
        .expect("Café was sold");
    assert_eq!(cafe.period, Cell::from("2024-07"));
    assert_eq!(cafe.quantity, 5.0);
    assert_eq!(monthly.len(), 5);

    let (sales, catalog) = fixture(&dir)?;
    let mut config = DashboardConfig::default();
    config.paths.sales = sales;
    config.paths.catalog = catalog;
    config.calendar.weekday_names = WeekdayLocale::English;
    let mut english = Dashboard::from_config(&config);

    let by_weekday = english.turnover(PeriodKind::Weekday)?;
    let saturday: f64 = by_weekday
        .iter()
        .filter(|r| r.period == Cell::from("Saturday"))
        .map(|r| r.quantity)
        .sum();
    assert_eq!(saturday, 6.0);
    Ok(())
}

#[test]
fn test_set_paths_validates_and_invalidates() -> Result<()> {
    let dir = TempDir::new()?;
    let mut dashboard = dashboard(&dir)?;
    assert_eq!(dashboard.product_summary()?.len(), 3);
    assert!(!dashboard.session().cache().is_empty());

    let before = dashboard.session().paths().clone();
    let err = dashboard
        .session_mut()
        .set_paths("/nonexistent/vendas.csv", before.catalog())
        .unwrap_err();
    assert!(matches!(err, DashboardError::PathError { .. }));
    assert_eq!(dashboard.session().paths(), &before);
    assert!(dashboard.session().is_loaded(Dataset::Sales));

    let smaller = write_file(
        &dir,
        "outras.csv",
        "Controle;ProCod;Cliente;Quantidade;TotalItem;Data;Bairro\n9;5;700;1;2.0;01/03/2024;Centro\n",
    )?;
    dashboard.session_mut().set_paths(&smaller, before.catalog())?;
    assert!(dashboard.session().cache().is_empty());
    assert!(!dashboard.session().is_loaded(Dataset::Sales));

    let products = dashboard.product_summary()?;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name.as_deref(), Some("Sal"));
    Ok(())
}

#[test]
fn test_view_pages_and_missing_dataset() -> Result<()> {
    let dir = TempDir::new()?;
    let mut dashboard = dashboard(&dir)?;

    let page = dashboard.page(Dataset::Sales, 3, Some(2))?;
    assert_eq!(page.pages, 3);
    assert_eq!(page.caption(), "Exibindo linhas 5 a 5 de 5.");

    let session = Session::new(
        PathStore::new(dir.path().join("missing.csv").to_string_lossy(), "x.csv"),
        DataLoader::default(),
    );
    let mut broken = Dashboard::new(session, Default::default());
    assert!(matches!(
        broken.product_summary(),
        Err(DashboardError::LoadError { .. })
    ));
    Ok(())
}
