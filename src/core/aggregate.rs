//! Derived views over the sales, catalog and per-transaction datasets.

use crate::core::calendar::{DateParser, PeriodKind, WeekdayLocale};
use crate::domain::columns::*;
use crate::domain::model::{Cell, Frame};
use crate::utils::currency::format_brl;
use crate::utils::error::{DashboardError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Customer id used for walk-in sales.
pub const WALK_IN_CUSTOMER: i64 = 99999;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSalesSummary {
    pub code: Cell,
    pub name: Option<String>,
    pub quantity: f64,
    pub total: f64,
}

impl ProductSalesSummary {
    pub fn formatted_total(&self) -> String {
        format_brl(Some(self.total))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverRow {
    pub period: Cell,
    pub product: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerMetrics {
    pub customer: Cell,
    pub total_spend: f64,
    pub purchases: u64,
    pub total_items: f64,
    pub average_ticket: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerReport {
    pub total_customers: usize,
    pub returning_customers: usize,
    /// Percentage of customers with more than one purchase.
    pub return_rate: f64,
    pub total_purchases: usize,
    pub customers: Vec<CustomerMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub location: Cell,
    pub sales: usize,
    pub total: f64,
}

impl LocationSummary {
    pub fn formatted_total(&self) -> String {
        format_brl(Some(self.total))
    }
}

/// First catalog name per product code; later duplicates are ignored.
fn product_names(catalog: &Frame) -> BTreeMap<Cell, Option<String>> {
    let mut names = BTreeMap::new();
    let (Some(code_idx), Some(name_idx)) =
        (catalog.column_index(PRO_COD), catalog.column_index(PRO_NOM))
    else {
        tracing::warn!("⚠️ Catalog has no {}/{} columns; product names unavailable", PRO_COD, PRO_NOM);
        return names;
    };

    for row in catalog.rows() {
        let code = &row[code_idx];
        if code.is_null() {
            continue;
        }
        let name = (!row[name_idx].is_null()).then(|| row[name_idx].to_string());
        names.entry(code.clone()).or_insert(name);
    }
    names
}

/// Quantity and line total per product code, joined to the catalog name and
/// sorted by total, highest first.
pub fn product_totals(sales: &Frame, catalog: &Frame) -> Result<Vec<ProductSalesSummary>> {
    let idx = sales.require("product_totals", &[PRO_COD, QUANTIDADE, TOTAL_ITEM])?;
    let (code_idx, qty_idx, total_idx) = (idx[0], idx[1], idx[2]);

    let mut groups: BTreeMap<Cell, (f64, f64)> = BTreeMap::new();
    for row in sales.rows() {
        let code = &row[code_idx];
        if code.is_null() {
            continue;
        }
        let entry = groups.entry(code.clone()).or_insert((0.0, 0.0));
        entry.0 += row[qty_idx].as_f64().unwrap_or(0.0);
        entry.1 += row[total_idx].as_f64().unwrap_or(0.0);
    }

    let names = product_names(catalog);
    let mut summaries: Vec<ProductSalesSummary> = groups
        .into_iter()
        .map(|(code, (quantity, total))| ProductSalesSummary {
            name: names.get(&code).cloned().flatten(),
            code,
            quantity,
            total,
        })
        .collect();

    summaries.sort_by(|a, b| b.total.total_cmp(&a.total));
    Ok(summaries)
}

pub fn top_n<T>(rows: &[T], n: usize) -> &[T] {
    &rows[..n.min(rows.len())]
}

/// Quantity sold per (period, product). Rows whose date does not parse are
/// skipped, as are rows without a catalog name.
pub fn turnover_by_period(
    sales: &Frame,
    catalog: &Frame,
    period: PeriodKind,
    parser: &DateParser,
    locale: WeekdayLocale,
) -> Result<Vec<TurnoverRow>> {
    let code_idx = sales.require("turnover_by_period", &[PRO_COD])?[0];

    // Any name column already on the sales rows is ignored in favour of the catalog.
    let names = product_names(catalog);
    let joined: Vec<Option<&String>> = sales
        .rows()
        .iter()
        .map(|row| names.get(&row[code_idx]).and_then(|n| n.as_ref()))
        .collect();
    if joined.iter().all(Option::is_none) {
        return Err(DashboardError::schema(
            "turnover_by_period (after joining the catalog)",
            &[PRODUTO],
        ));
    }

    let idx = sales.require("turnover_by_period", &[QUANTIDADE, DATA])?;
    let (qty_idx, date_idx) = (idx[0], idx[1]);

    let mut groups: BTreeMap<(Cell, String), f64> = BTreeMap::new();
    for (row, name) in sales.rows().iter().zip(joined) {
        let (Some(name), Some(dt)) = (name, parser.parse_cell(&row[date_idx])) else {
            continue;
        };
        *groups
            .entry((period.bucket(&dt, locale), name.clone()))
            .or_insert(0.0) += row[qty_idx].as_f64().unwrap_or(0.0);
    }

    Ok(groups
        .into_iter()
        .map(|((period, product), quantity)| TurnoverRow {
            period,
            product,
            quantity,
        })
        .collect())
}

/// Catalog rows whose product code never appears in `sales`.
pub fn unsold_products(sales: &Frame, catalog: &Frame) -> Result<Frame> {
    let sales_code = sales.require("unsold_products (sales)", &[PRO_COD])?[0];
    let catalog_code = catalog.require("unsold_products (catalog)", &[PRO_COD])?[0];

    let sold: BTreeSet<&Cell> = sales
        .rows()
        .iter()
        .map(|row| &row[sales_code])
        .filter(|code| !code.is_null())
        .collect();

    let mut unsold = catalog.clone();
    unsold.retain_rows(|row| !sold.contains(&row[catalog_code]));
    Ok(unsold)
}

/// Keeps the requested columns that exist, in the requested order.
pub fn select_columns(frame: &Frame, columns: &[String]) -> Frame {
    let names: Vec<&str> = columns.iter().map(String::as_str).collect();
    frame.select(&names)
}

pub fn customer_metrics(grouped: &Frame, exclude_customer: Option<&Cell>) -> Result<CustomerReport> {
    let idx = grouped.require(
        "customer_metrics",
        &[CLIENTE, TOTAL_VENDA, DATA, QUANTIDADE_ITENS],
    )?;
    let (customer_idx, total_idx, date_idx, items_idx) = (idx[0], idx[1], idx[2], idx[3]);

    let mut total_purchases = 0;
    let mut groups: BTreeMap<Cell, (f64, u64, f64)> = BTreeMap::new();
    for row in grouped.rows() {
        let customer = &row[customer_idx];
        if exclude_customer.is_some_and(|excluded| excluded == customer) {
            continue;
        }
        total_purchases += 1;
        if customer.is_null() {
            continue;
        }
        let entry = groups.entry(customer.clone()).or_insert((0.0, 0, 0.0));
        entry.0 += row[total_idx].as_f64().unwrap_or(0.0);
        if !row[date_idx].is_null() {
            entry.1 += 1;
        }
        entry.2 += row[items_idx].as_f64().unwrap_or(0.0);
    }

    let mut customers: Vec<CustomerMetrics> = groups
        .into_iter()
        .map(|(customer, (total_spend, purchases, total_items))| CustomerMetrics {
            customer,
            total_spend,
            purchases,
            total_items,
            average_ticket: if purchases > 0 {
                total_spend / purchases as f64
            } else {
                0.0
            },
        })
        .collect();
    customers.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));

    let total_customers = customers.len();
    let returning_customers = customers.iter().filter(|c| c.purchases > 1).count();
    let return_rate = if total_customers > 0 {
        returning_customers as f64 / total_customers as f64 * 100.0
    } else {
        0.0
    };

    Ok(CustomerReport {
        total_customers,
        returning_customers,
        return_rate,
        total_purchases,
        customers,
    })
}

/// Distinct transactions and spend per value of `field`. Returns an empty
/// list when `field`, `Controle` or `TotalVenda` is absent.
pub fn sales_by_location(grouped: &Frame, field: &str) -> Vec<LocationSummary> {
    let missing = grouped.missing_columns(&[field, CONTROLE, TOTAL_VENDA]);
    if !missing.is_empty() {
        tracing::warn!("⚠️ Cannot group by '{}': missing {}", field, missing.join(", "));
        return Vec::new();
    }
    let (Some(field_idx), Some(controle_idx), Some(total_idx)) = (
        grouped.column_index(field),
        grouped.column_index(CONTROLE),
        grouped.column_index(TOTAL_VENDA),
    ) else {
        return Vec::new();
    };

    let mut groups: BTreeMap<&Cell, (BTreeSet<&Cell>, f64)> = BTreeMap::new();
    for row in grouped.rows() {
        let (location, controle, total) = (&row[field_idx], &row[controle_idx], &row[total_idx]);
        if location.is_null() || controle.is_null() || total.is_null() {
            continue;
        }
        let entry = groups.entry(location).or_default();
        entry.0.insert(controle);
        entry.1 += total.as_f64().unwrap_or(0.0);
    }
    tracing::debug!("Grouping by {} produced {} locations", field, groups.len());

    let mut summaries: Vec<LocationSummary> = groups
        .into_iter()
        .map(|(location, (controles, total))| LocationSummary {
            location: location.clone(),
            sales: controles.len(),
            total,
        })
        .collect();
    summaries.sort_by(|a, b| b.sales.cmp(&a.sales));
    summaries
}

/// Mean line-item count per transaction, 0 when there is nothing to average.
pub fn average_items_per_sale(grouped: &Frame) -> f64 {
    let values: Vec<f64> = grouped
        .column_values(QUANTIDADE_ITENS)
        .unwrap_or_default()
        .into_iter()
        .filter_map(Cell::as_f64)
        .collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn products_frame(rows: &[ProductSalesSummary]) -> Frame {
    Frame::from_rows(
        [PRO_COD, PRODUTO, QUANTIDADE, TOTAL_ITEM, "TotalFormatado"],
        rows.iter()
            .map(|p| {
                vec![
                    p.code.clone(),
                    Cell::from(p.name.clone()),
                    Cell::Float(p.quantity),
                    Cell::Float(p.total),
                    Cell::Text(p.formatted_total()),
                ]
            })
            .collect(),
    )
}

pub fn turnover_frame(rows: &[TurnoverRow]) -> Frame {
    Frame::from_rows(
        [PERIODO, PRODUTO, QUANTIDADE],
        rows.iter()
            .map(|t| {
                vec![
                    t.period.clone(),
                    Cell::from(t.product.as_str()),
                    Cell::Float(t.quantity),
                ]
            })
            .collect(),
    )
}

pub fn customers_frame(rows: &[CustomerMetrics]) -> Frame {
    Frame::from_rows(
        [
            CLIENTE,
            "total_vendas",
            "num_compras",
            "itens_totais",
            "ticket_medio",
            "total_vendas_fmt",
            "ticket_medio_fmt",
        ],
        rows.iter()
            .map(|c| {
                vec![
                    c.customer.clone(),
                    Cell::Float(c.total_spend),
                    Cell::Int(c.purchases as i64),
                    Cell::Float(c.total_items),
                    Cell::Float(c.average_ticket),
                    Cell::Text(format_brl(Some(c.total_spend))),
                    Cell::Text(format_brl(Some(c.average_ticket))),
                ]
            })
            .collect(),
    )
}

pub fn locations_frame(field: &str, rows: &[LocationSummary]) -> Frame {
    Frame::from_rows(
        [field, "Vendas", "ValorTotal", "ValorTotalFormatado"],
        rows.iter()
            .map(|l| {
                vec![
                    l.location.clone(),
                    Cell::Int(l.sales as i64),
                    Cell::Float(l.total),
                    Cell::Text(l.formatted_total()),
                ]
            })
            .collect(),
    )
}
