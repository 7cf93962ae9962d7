use crate::core::calendar::{self, DateParser, WeekdayLocale};
use crate::domain::columns::*;
use crate::domain::model::{Cell, Frame};
use crate::utils::error::{DashboardError, Result};
use chrono::{Datelike, NaiveDateTime};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

pub const DEFAULT_DELIMITER: u8 = b';';

/// Reads the sales and catalog files and prepares the per-transaction view.
#[derive(Debug, Clone)]
pub struct DataLoader {
    delimiter: u8,
    parser: DateParser,
    locale: WeekdayLocale,
}

impl DataLoader {
    pub fn new(parser: DateParser, locale: WeekdayLocale) -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            parser,
            locale,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn parser(&self) -> &DateParser {
        &self.parser
    }

    pub fn locale(&self) -> WeekdayLocale {
        self.locale
    }

    fn read_frame(&self, dataset: &str, path: &str) -> Result<Frame> {
        if path.trim().is_empty() {
            return Err(DashboardError::PathError {
                dataset: dataset.to_string(),
                path: path.to_string(),
            });
        }

        let file = File::open(path).map_err(|e| DashboardError::LoadError {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        Frame::read_csv(BufReader::new(file), self.delimiter).map_err(|e| match e {
            DashboardError::LoadError { reason, .. } => DashboardError::LoadError {
                path: path.to_string(),
                reason,
            },
            other => DashboardError::LoadError {
                path: path.to_string(),
                reason: other.to_string(),
            },
        })
    }

    /// Reads the sales file, drops rows whose `Data` does not parse and
    /// appends the calendar columns.
    pub fn load_sales(&self, path: &str) -> Result<Frame> {
        let mut frame = self.read_frame("sales", path)?;
        let data_idx = frame.require("load_sales", &[DATA])?[0];

        let missing = frame.missing_columns(&SALES_REQUIRED);
        if !missing.is_empty() {
            tracing::warn!("⚠️ Sales file {} lacks column(s): {}", path, missing.join(", "));
        }

        let total = frame.len();
        let mut dates: Vec<NaiveDateTime> = Vec::with_capacity(total);
        frame.retain_rows(|row| match self.parser.parse_cell(&row[data_idx]) {
            Some(dt) => {
                dates.push(dt);
                true
            }
            None => false,
        });

        let dropped = total - frame.len();
        if dropped > 0 {
            tracing::debug!("Dropped {} sales row(s) with unparseable dates", dropped);
        }

        frame.set_column(DATA, dates.iter().copied().map(Cell::DateTime).collect());
        self.derive_calendar_columns(&mut frame, &dates);

        tracing::info!("📥 Loaded {} sales rows from {}", frame.len(), path);
        Ok(frame)
    }

    pub fn load_catalog(&self, path: &str) -> Result<Frame> {
        let frame = self.read_frame("catalog", path)?;

        let missing = frame.missing_columns(&CATALOG_REQUIRED);
        if !missing.is_empty() {
            tracing::warn!("⚠️ Catalog file {} lacks column(s): {}", path, missing.join(", "));
        }

        tracing::info!("📥 Loaded {} catalog rows from {}", frame.len(), path);
        Ok(frame)
    }

    fn derive_calendar_columns(&self, frame: &mut Frame, dates: &[NaiveDateTime]) {
        frame.set_column(ANO, map_dates(dates, |d| Cell::Int(d.year() as i64)));
        frame.set_column(SEMESTRE, map_dates(dates, |d| Cell::from(calendar::semester_label(d))));
        frame.set_column(TRIMESTRE, map_dates(dates, |d| Cell::Text(calendar::quarter_period(d))));
        frame.set_column(MES_PERIODO, map_dates(dates, |d| Cell::Text(calendar::month_period(d))));
        frame.set_column(SEMANA_INICIO, map_dates(dates, |d| Cell::Text(calendar::week_period(d))));
        frame.set_column(DIA, map_dates(dates, |d| Cell::Text(calendar::day_label(d))));
        frame.set_column(
            DIA_SEMANA,
            map_dates(dates, |d| Cell::from(self.locale.name(d.weekday()))),
        );
    }

    /// One row per distinct `Controle`: line totals summed, products counted,
    /// every other column taking the first non-null value in the group.
    pub fn aggregate_transactions(&self, sales: &Frame) -> Result<Frame> {
        let controle_idx = sales.require("aggregate_transactions", &[CONTROLE])?[0];

        // Columns carried over from the first row of each group.
        const FIRST: [&str; 10] = [
            CLIENTE,
            DATA,
            ANO,
            SEMESTRE,
            TRIMESTRE,
            MES_PERIODO,
            SEMANA_INICIO,
            DIA,
            DIA_SEMANA,
            BAIRRO,
        ];
        let first_idx: Vec<Option<usize>> = FIRST.iter().map(|c| sales.column_index(c)).collect();
        let total_idx = sales.column_index(TOTAL_ITEM);
        let code_idx = sales.column_index(PRO_COD);

        struct Group {
            first: Vec<Cell>,
            total: f64,
            items: i64,
        }

        let mut groups: BTreeMap<Cell, Group> = BTreeMap::new();
        for row in sales.rows() {
            let key = &row[controle_idx];
            if key.is_null() {
                continue;
            }
            let group = groups.entry(key.clone()).or_insert_with(|| Group {
                first: vec![Cell::Null; FIRST.len()],
                total: 0.0,
                items: 0,
            });

            for (slot, idx) in group.first.iter_mut().zip(&first_idx) {
                if let Some(idx) = idx {
                    if slot.is_null() && !row[*idx].is_null() {
                        *slot = row[*idx].clone();
                    }
                }
            }
            if let Some(v) = total_idx.and_then(|i| row[i].as_f64()) {
                group.total += v;
            }
            if code_idx.is_some_and(|i| !row[i].is_null()) {
                group.items += 1;
            }
        }

        let mut out = Frame::new([
            CONTROLE,
            CLIENTE,
            TOTAL_VENDA,
            DATA,
            QUANTIDADE_ITENS,
            ANO,
            SEMESTRE,
            TRIMESTRE,
            MES_PERIODO,
            SEMANA_INICIO,
            DIA,
            DIA_SEMANA,
            BAIRRO,
        ]);

        for (key, group) in groups {
            let mut first = group.first.into_iter();
            let mut take = || first.next().unwrap_or(Cell::Null);
            let cliente = take();
            let data = take();
            let mut carried: Vec<Cell> = (0..8).map(|_| take()).collect();

            // Ano, MesPeriodo and DiaSemana follow the representative date.
            if let Some(dt) = data.as_datetime() {
                carried[0] = Cell::Int(dt.year() as i64);
                carried[3] = Cell::Text(calendar::month_period(&dt));
                carried[6] = Cell::from(self.locale.name(dt.weekday()));
            }

            let mut row = vec![
                key,
                cliente,
                Cell::Float(group.total),
                data,
                Cell::Int(group.items),
            ];
            row.extend(carried);
            out.push_row(row);
        }

        tracing::debug!("Grouped {} sales rows into {} transactions", sales.len(), out.len());
        Ok(out)
    }
}

fn map_dates<F: Fn(&NaiveDateTime) -> Cell>(dates: &[NaiveDateTime], f: F) -> Vec<Cell> {
    dates.iter().map(f).collect()
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(DateParser::default(), WeekdayLocale::default())
    }
}
