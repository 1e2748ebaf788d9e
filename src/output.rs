use crate::filter::DateRange;
use crate::types::Transaction;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// File name of a filtered export, parameterized by the active range.
pub fn export_file_name(range: &DateRange) -> String {
    format!(
        "sales_{}_to_{}.csv",
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d")
    )
}

/// Write the rows of a view in the 28-column source layout so the file can
/// be loaded again. Returns the path written.
pub fn export_view(dir: &Path, range: &DateRange, view: &[&Transaction]) -> Result<PathBuf> {
    let path = dir.join(export_file_name(range));
    write_csv(&path, view)?;
    Ok(path)
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Filters, Period};
    use crate::loader::load_and_clean;
    use crate::loader::tests::{line, table};
    use crate::metrics::{compute_kpis, compute_view};
    use chrono::NaiveDate;

    #[test]
    fn export_then_reload_keeps_the_kpis() {
        let t = table(&[
            line("2024-01-08", "\"Acai, grande\"", "Bowl", "Centro", "Loja", "100,25", "10,10", "0", "2", "true", "false"),
            line("2024-01-09", "Suco", "Drink", "Praia", "iFood", "49,90", "4,99", "3", "1", "false", "true"),
            line("2024-01-10", "Wrap", "Food", "Praia", "iFood", "20,00", "-2,00", "4", "0", "false", "false"),
        ]);
        let range = Period::All.resolve(&t).unwrap();
        let view = compute_view(&t, &Filters::new(range));

        let dir = tempfile::tempdir().unwrap();
        let path = export_view(dir.path(), &range, &view.current).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "sales_2024-01-08_to_2024-01-10.csv"
        );

        let (reloaded, report) = load_and_clean(&path).unwrap();
        assert_eq!(report.skipped_rows, 0);
        assert_eq!(reloaded.len(), 3);
        let refs: Vec<&Transaction> = reloaded.iter().collect();
        let again = compute_kpis(&refs);
        let before = view.current_kpis;
        assert!((again.total_sales - before.total_sales).abs() < 1e-9);
        assert!((again.total_profit - before.total_profit).abs() < 1e-9);
        assert!((again.average_ticket - before.average_ticket).abs() < 1e-9);
        assert_eq!(again.new_customers, before.new_customers);
        assert_eq!(reloaded[0].product, "Acai, grande");
        assert_eq!(reloaded[0].operational_efficiency, t[0].operational_efficiency);
        assert_eq!(reloaded[2].date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn summary_json_has_the_kpis() {
        let t = table(&[line(
            "2024-01-10", "A", "C", "S", "Loja", "100,00", "10,00", "5", "1", "false", "false",
        )]);
        let view = compute_view(&t, &Filters::new(Period::All.resolve(&t).unwrap()));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_json(&path, &view.summary()).unwrap();

        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["current"]["total_sales"], 100.0);
        assert_eq!(v["delta_pct"]["total_sales"], 0.0);
        assert_eq!(v["start"], "2024-01-10");
        assert_eq!(v["comparison_end"], "2024-01-09");
    }
}
