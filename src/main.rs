use clap::Parser;
use sales_dashboard::app::dashboard::{Dashboard, ExportTarget, ReportSettings};
use sales_dashboard::app::{export, render};
use sales_dashboard::config::cli::{Command, LogFormat};
use sales_dashboard::core::aggregate;
use sales_dashboard::core::calendar::PeriodKind;
use sales_dashboard::core::session::{is_valid_path, Dataset, Session};
use sales_dashboard::domain::ports::ConfigProvider;
use sales_dashboard::utils::error::{ErrorSeverity, Result};
use sales_dashboard::utils::validation::{self, Validate};
use sales_dashboard::utils::logger;
use sales_dashboard::{CliConfig, DashboardConfig, LocalStorage};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting sales-dashboard");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&cli, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn load_config(cli: &CliConfig) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(cli: &CliConfig, config: &DashboardConfig) -> Result<()> {
    let mut session = Session::from_config(config);
    if cli.sales.is_some() || cli.catalog.is_some() {
        let sales = cli.sales.as_deref().unwrap_or(config.sales_path());
        let catalog = cli.catalog.as_deref().unwrap_or(config.catalog_path());
        session.set_paths(sales, catalog)?;
    }
    let mut dashboard = Dashboard::new(session, ReportSettings::from(config));
    let storage = LocalStorage::new(config.output_path().to_string());

    match &cli.command {
        Command::Paths => {
            let (sales, catalog) = dashboard.session().paths().get_paths();
            for (label, path) in [("Vendas", sales), ("Cadastro", catalog)] {
                let mark = if is_valid_path(path) { "✅" } else { "❌" };
                println!("{} {}: {}", mark, label, path);
            }
        }
        Command::Products { top } => {
            let n = top.unwrap_or(config.reports.top_products);
            validation::validate_range("--top", n, 5, 100)?;

            let products = dashboard.product_summary()?;
            println!("### Lista de Produtos Vendidos");
            print!("{}", render::render_table(&aggregate::products_frame(&products)));
            println!("\n### Top {} Produtos Mais Vendidos (R$)", n);
            print!(
                "{}",
                render::render_table(&aggregate::products_frame(aggregate::top_n(&products, n)))
            );
        }
        Command::Turnover { period } => {
            let period: PeriodKind = period.parse()?;
            let rows = dashboard.turnover(period)?;
            println!("### Giro de Vendas por {}", period);
            print!("{}", render::render_table(&aggregate::turnover_frame(&rows)));
        }
        Command::Unsold { columns } => {
            let available = dashboard.catalog_columns()?;
            println!("Colunas disponíveis: {}", available.join(", "));
            let unsold = dashboard.unsold(columns)?;
            println!("\n### Produtos Não Vendidos ({})", unsold.len());
            print!("{}", render::render_table(&unsold));
        }
        Command::Customers {
            include_walk_in,
            top,
        } => {
            let n = top.unwrap_or(config.reports.top_customers);
            validation::validate_range("--top", n, 5, 50)?;

            let exclude = !include_walk_in && dashboard.settings().exclude_walk_in;
            let report = dashboard.customers(exclude)?;
            print!(
                "{}",
                render::render_metrics(&[
                    ("Clientes", report.total_customers.to_string()),
                    ("Clientes Retornaram", report.returning_customers.to_string()),
                    ("Taxa de Retorno", format!("{:.1}%", report.return_rate)),
                    ("Compras Totais", report.total_purchases.to_string()),
                ])
            );

            let frame = aggregate::customers_frame(aggregate::top_n(&report.customers, n));
            println!("\n### Top {} Clientes por Valor", n);
            print!("{}", render::render_table(&frame));
        }
        Command::Locations { field } => {
            let field = field
                .clone()
                .unwrap_or_else(|| dashboard.settings().location_field.clone());
            let average = dashboard.average_items_per_sale()?;
            let rows = dashboard.locations(Some(&field))?;
            print!(
                "{}",
                render::render_metrics(&[("Itens por Venda (média)", format!("{:.2}", average))])
            );
            if rows.is_empty() {
                println!("Não há dados suficientes para agrupar por '{}'.", field);
            } else {
                let frame = aggregate::locations_frame(&field, &rows);
                println!("\n### Vendas por {}", field);
                print!("{}", render::render_table(&frame));
            }
        }
        Command::View {
            dataset,
            page,
            rows_per_page,
        } => {
            let dataset: Dataset = dataset.parse()?;
            let page = dashboard.page(dataset, *page, *rows_per_page)?;
            if page.total > 0 {
                println!("Página {} de {}", page.page, page.pages);
                print!("{}", render::render_table(&page.frame));
            }
            println!("{}", page.caption());
        }
        Command::Export {
            target,
            format,
            period,
        } => {
            let period: PeriodKind = period.parse()?;
            let target = target.parse::<ExportTarget>()?.with_period(period);
            let format = format.unwrap_or(config.export.format);
            let frame = dashboard.frame_for(target)?;
            let name = export::export_frame(&storage, &target.stem(), &frame, format).await?;
            println!("📁 {}/{}", storage.base_path(), name);
        }
        Command::Bundle => {
            let frames = dashboard.all_frames(PeriodKind::Month)?;
            let name = export::export_bundle(&storage, "relatorios.zip", &frames).await?;
            println!("📦 {}/{}", storage.base_path(), name);
        }
    }

    tracing::debug!("Cache: {:?}", dashboard.session().cache().stats());
    Ok(())
}
