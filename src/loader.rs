use crate::types::{RawRow, Transaction, COLUMN_COUNT};
use crate::util::{
    parse_count, parse_date_safe, parse_flag, parse_money, safe_div, MONTHS, WEEKDAYS,
};
use chrono::Datelike;
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("no usable rows in the dataset ({skipped} rows skipped)")]
    Empty { skipped: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub skipped_rows: usize,
}

pub fn load_and_clean(path: &Path) -> Result<(Vec<Transaction>, LoadReport), DataLoadError> {
    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = load_from_reader(file)?;
    info!(
        "loaded {} from {} ({} rows skipped)",
        loaded.1.kept_rows,
        path.display(),
        loaded.1.skipped_rows
    );
    Ok(loaded)
}

/// Read and normalize every data row of a comma-separated source.
///
/// The first line is a header and is dropped. Rows with the wrong number of
/// fields, undecodable bytes or an unreadable date are skipped and counted;
/// only an I/O failure or a source with no usable row fails the whole load.
pub fn load_from_reader<R: Read>(reader: R) -> Result<(Vec<Transaction>, LoadReport), DataLoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut total_rows = 0usize;
    let mut skipped_rows = 0usize;
    let mut rows: Vec<Transaction> = Vec::new();

    let mut record = StringRecord::new();
    loop {
        match rdr.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(DataLoadError::Csv(e)),
            Err(e) => {
                total_rows += 1;
                skipped_rows += 1;
                debug!("skipping unreadable row {}: {}", total_rows, e);
                continue;
            }
        }
        total_rows += 1;

        if record.len() != COLUMN_COUNT {
            skipped_rows += 1;
            debug!(
                "skipping row {}: expected {} fields, found {}",
                total_rows,
                COLUMN_COUNT,
                record.len()
            );
            continue;
        }
        let raw: RawRow = match record.deserialize(None) {
            Ok(r) => r,
            Err(e) => {
                skipped_rows += 1;
                debug!("skipping row {}: {}", total_rows, e);
                continue;
            }
        };
        match normalize(raw) {
            Some(tx) => rows.push(tx),
            None => {
                skipped_rows += 1;
                debug!("skipping row {}: unreadable date", total_rows);
            }
        }
    }

    if rows.is_empty() {
        return Err(DataLoadError::Empty {
            skipped: skipped_rows,
        });
    }
    let report = LoadReport {
        total_rows,
        kept_rows: rows.len(),
        skipped_rows,
    };
    Ok((rows, report))
}

fn text(v: Option<String>) -> String {
    match v {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => "Unknown".to_string(),
    }
}

/// Coerce one raw row into a typed record and fill in the derived columns.
/// Returns `None` only when the date cannot be read.
pub fn normalize(raw: RawRow) -> Option<Transaction> {
    let date = parse_date_safe(raw.date.as_deref())?;

    let gross_total = parse_money(raw.gross_total.as_deref());
    let net_profit = parse_money(raw.net_profit.as_deref());
    let prep_time_min = parse_count(raw.prep_time_min.as_deref());
    let is_new_customer = parse_flag(raw.is_new_customer.as_deref());

    Some(Transaction {
        date,
        product: text(raw.product),
        category: text(raw.category),
        store: text(raw.store),
        channel: text(raw.channel),
        units_sold: parse_count(raw.units_sold.as_deref()),
        unit_price: parse_money(raw.unit_price.as_deref()),
        gross_total,
        materials_cost: parse_money(raw.materials_cost.as_deref()),
        delivery_cost: parse_money(raw.delivery_cost.as_deref()),
        net_revenue: parse_money(raw.net_revenue.as_deref()),
        store_revenue: parse_money(raw.store_revenue.as_deref()),
        customer_discount: parse_money(raw.customer_discount.as_deref()),
        platform_fee: parse_money(raw.platform_fee.as_deref()),
        net_profit,
        staff_count: parse_count(raw.staff_count.as_deref()),
        staff_commission: parse_money(raw.staff_commission.as_deref()),
        prep_time_min,
        delivery_distance: parse_count(raw.delivery_distance.as_deref()),
        unique_customers: parse_count(raw.unique_customers.as_deref()),
        people_served: parse_count(raw.people_served.as_deref()),
        delivery_time_min: parse_count(raw.delivery_time_min.as_deref()),
        average_ticket: parse_money(raw.average_ticket.as_deref()),
        is_new_customer,
        max_capacity: parse_count(raw.max_capacity.as_deref()),
        is_promotion: parse_flag(raw.is_promotion.as_deref()),
        promo_discount: parse_money(raw.promo_discount.as_deref()),
        discount_units: parse_count(raw.discount_units.as_deref()),

        profitability: safe_div(net_profit, gross_total) * 100.0,
        // Prep time below one minute counts as one minute.
        operational_efficiency: gross_total / prep_time_min.max(1) as f64,
        return_flag: if is_new_customer { 0 } else { 1 },
        year: date.year(),
        month: date.month(),
        month_name: MONTHS[date.month0() as usize],
        weekday_name: WEEKDAYS[date.weekday().num_days_from_monday() as usize],
        iso_week: date.iso_week().week(),
        day: date.day(),
    })
}
