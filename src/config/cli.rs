use crate::app::export::ExportFormat;
use crate::config::DashboardConfig;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "Sales analytics over a sales file and a product registry")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Sales file (';'-delimited)
    #[arg(long)]
    pub sales: Option<String>,

    /// Product registry file (';'-delimited)
    #[arg(long)]
    pub catalog: Option<String>,

    /// Directory for exported files
    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the configured input paths and whether they exist
    Paths,
    /// Products sold, with the top N by value
    Products {
        #[arg(long)]
        top: Option<usize>,
    },
    /// Quantity sold per product and period
    Turnover {
        /// Ano, Semestre, Trimestre, Mês, Semana, Dia da Semana or Data
        #[arg(long, default_value = "Mês")]
        period: String,
    },
    /// Catalog products with no sales
    Unsold {
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// Customer KPIs and spend ranking
    Customers {
        /// Keep the walk-in customer in the figures
        #[arg(long)]
        include_walk_in: bool,
        #[arg(long)]
        top: Option<usize>,
    },
    /// Sales per delivery location
    Locations {
        #[arg(long)]
        field: Option<String>,
    },
    /// Page through a dataset (sales, catalog or grouped)
    View {
        dataset: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        rows_per_page: Option<usize>,
    },
    /// Write a dataset or report to the output directory
    Export {
        /// sales, catalog, grouped, products, turnover, unsold, customers or locations
        target: String,
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
        /// Period for the turnover export
        #[arg(long, default_value = "Mês")]
        period: String,
    },
    /// Write every dataset and report into one zip archive
    Bundle,
}

impl CliConfig {
    /// Applies the flags that override file configuration. Input paths are
    /// not applied here; they go through the session's validation.
    pub fn apply_overrides(&self, config: &mut DashboardConfig) {
        if let Some(output_path) = &self.output_path {
            config.export.output_path = output_path.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags_and_subcommand() {
        let cli = CliConfig::try_parse_from([
            "sales-dashboard",
            "--sales",
            "v.csv",
            "--output-path",
            "out",
            "--log-format",
            "json",
            "unsold",
            "--columns",
            "ProCod,ProNom",
        ])
        .unwrap();

        assert_eq!(cli.sales.as_deref(), Some("v.csv"));
        assert_eq!(cli.log_format, LogFormat::Json);
        match &cli.command {
            Command::Unsold { columns } => assert_eq!(columns, &["ProCod", "ProNom"]),
            other => panic!("unexpected command {:?}", other),
        }

        let mut config = DashboardConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.export.output_path, "out");
        assert_eq!(config.paths.sales, DashboardConfig::default().paths.sales);
    }

    #[test]
    fn test_export_defaults() {
        let cli = CliConfig::try_parse_from(["sales-dashboard", "export", "giro"]).unwrap();
        match cli.command {
            Command::Export {
                target,
                format,
                period,
            } => {
                assert_eq!(target, "giro");
                assert_eq!(format, None);
                assert_eq!(period, "Mês");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_view_requires_dataset() {
        assert!(CliConfig::try_parse_from(["sales-dashboard", "view"]).is_err());
    }
}
