use crate::filter::{select, select_in, DateRange, Filters};
use crate::types::{KpiDeltas, Kpis, SummaryStats, Transaction};
use crate::util::{pct_change, safe_div};

/// Everything one filter change produces: the selected rows, the rows of the
/// equal-length period right before, and the headline figures of both.
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub range: DateRange,
    pub comparison_range: DateRange,
    pub current: Vec<&'a Transaction>,
    pub comparison: Vec<&'a Transaction>,
    pub current_kpis: Kpis,
    pub previous_kpis: Kpis,
    pub deltas: KpiDeltas,
}

impl DashboardView<'_> {
    pub fn summary(&self) -> SummaryStats {
        SummaryStats {
            start: self.range.start,
            end: self.range.end,
            comparison_start: self.comparison_range.start,
            comparison_end: self.comparison_range.end,
            rows: self.current.len(),
            comparison_rows: self.comparison.len(),
            current: self.current_kpis,
            previous: self.previous_kpis,
            delta_pct: self.deltas,
        }
    }
}

pub fn compute_view<'a>(table: &'a [Transaction], filters: &Filters) -> DashboardView<'a> {
    let range = filters.range;
    let comparison_range = range.preceding();
    let current = select(table, filters);
    let comparison = select_in(table, filters, comparison_range);
    let current_kpis = compute_kpis(&current);
    let previous_kpis = compute_kpis(&comparison);
    let deltas = kpi_deltas(&current_kpis, &previous_kpis);
    DashboardView {
        range,
        comparison_range,
        current,
        comparison,
        current_kpis,
        previous_kpis,
        deltas,
    }
}

/// Headline figures of a view. An empty view yields all zeros.
pub fn compute_kpis(view: &[&Transaction]) -> Kpis {
    let mut total_sales = 0.0;
    let mut total_profit = 0.0;
    let mut customers = 0i64;
    let mut new_customers = 0i64;
    for tx in view {
        total_sales += tx.gross_total;
        total_profit += tx.net_profit;
        customers += tx.unique_customers;
        if tx.is_new_customer {
            new_customers += tx.unique_customers;
        }
    }
    Kpis {
        total_sales,
        total_profit,
        average_ticket: if customers > 0 {
            safe_div(total_sales, customers as f64)
        } else {
            0.0
        },
        new_customers,
    }
}

pub fn kpi_deltas(current: &Kpis, previous: &Kpis) -> KpiDeltas {
    KpiDeltas {
        total_sales: pct_change(current.total_sales, previous.total_sales),
        total_profit: pct_change(current.total_profit, previous.total_profit),
        average_ticket: pct_change(current.average_ticket, previous.average_ticket),
        new_customers: pct_change(current.new_customers as f64, previous.new_customers as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Period, Selection};
    use crate::loader::tests::{line, table};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn day_range(day: NaiveDate) -> Filters {
        Filters::new(DateRange::new(day, day))
    }

    #[test]
    fn two_rows_on_one_day() {
        let t = table(&[
            line("2024-01-10", "A", "C", "S", "Loja", "100,00", "10,00", "5", "1", "false", "false"),
            line("2024-01-10", "B", "C", "S", "Loja", "200,00", "20,00", "5", "1", "false", "false"),
        ]);
        let view = compute_view(&t, &day_range(d(2024, 1, 10)));
        assert_eq!(view.current.len(), 2);
        assert_eq!(view.current_kpis.total_sales, 300.0);
        assert_eq!(view.current_kpis.total_profit, 30.0);
        assert_eq!(view.current_kpis.average_ticket, 150.0);
    }

    #[test]
    fn empty_comparison_means_zero_deltas() {
        let t = table(&[
            line("2024-01-10", "A", "C", "S", "Loja", "100,00", "10,00", "5", "2", "true", "false"),
        ]);
        let view = compute_view(&t, &day_range(d(2024, 1, 10)));
        assert!(view.comparison.is_empty());
        assert_eq!(view.previous_kpis, Kpis::default());
        assert_eq!(view.deltas, KpiDeltas::default());
        assert_eq!(view.current_kpis.new_customers, 2);
    }

    #[test]
    fn zero_previous_sales_gives_zero_delta() {
        let t = table(&[
            line("2024-01-09", "A", "C", "S", "Loja", "0,00", "0,00", "5", "1", "false", "false"),
            line("2024-01-10", "A", "C", "S", "Loja", "50,00", "5,00", "5", "1", "false", "false"),
        ]);
        let view = compute_view(&t, &day_range(d(2024, 1, 10)));
        assert_eq!(view.comparison.len(), 1);
        assert_eq!(view.previous_kpis.total_sales, 0.0);
        assert_eq!(view.deltas.total_sales, 0.0);
        assert!(view.deltas.total_sales.is_finite());
    }

    #[test]
    fn deltas_against_the_preceding_period() {
        let t = table(&[
            line("2024-01-07", "A", "C", "S", "Loja", "100,00", "10,00", "5", "2", "true", "false"),
            line("2024-01-08", "A", "C", "S", "Loja", "100,00", "10,00", "5", "2", "false", "false"),
            line("2024-01-09", "A", "C", "S", "Loja", "150,00", "20,00", "5", "2", "true", "false"),
            line("2024-01-10", "A", "C", "S", "Loja", "150,00", "10,00", "5", "2", "true", "false"),
            // Outside both windows.
            line("2024-01-06", "A", "C", "S", "Loja", "999,00", "99,00", "5", "9", "true", "false"),
        ]);
        let f = Filters::new(DateRange::new(d(2024, 1, 9), d(2024, 1, 10)));
        let view = compute_view(&t, &f);
        assert_eq!(view.comparison_range, DateRange::new(d(2024, 1, 7), d(2024, 1, 8)));
        assert_eq!(view.previous_kpis.total_sales, 200.0);
        assert_eq!(view.current_kpis.total_sales, 300.0);
        assert!((view.deltas.total_sales - 50.0).abs() < 1e-9);
        assert!((view.deltas.total_profit - 50.0).abs() < 1e-9);
        assert!((view.deltas.average_ticket - 50.0).abs() < 1e-9);
        // 4 new customers now against 2 before.
        assert!((view.deltas.new_customers - 100.0).abs() < 1e-9);
    }

    #[test]
    fn comparison_uses_the_same_dimension_filters() {
        let t = table(&[
            line("2024-01-09", "A", "C", "North", "Loja", "100,00", "10,00", "5", "1", "false", "false"),
            line("2024-01-09", "A", "C", "South", "Loja", "500,00", "50,00", "5", "1", "false", "false"),
            line("2024-01-10", "A", "C", "North", "Loja", "120,00", "12,00", "5", "1", "false", "false"),
        ]);
        let mut f = day_range(d(2024, 1, 10));
        f.stores = Selection::only(["North"]);
        let view = compute_view(&t, &f);
        assert_eq!(view.previous_kpis.total_sales, 100.0);
        assert!((view.deltas.total_sales - 20.0).abs() < 1e-9);
    }

    #[test]
    fn oversized_count_cells_do_not_overflow_totals() {
        let t = table(&[
            line("2024-01-10", "A", "C", "S", "Loja", "100,00", "10,00", "9e18", "9e18", "true", "true"),
            line("2024-01-10", "A", "C", "S", "Loja", "100,00", "10,00", "9e18", "9e18", "true", "false"),
        ]);
        let view = compute_view(&t, &day_range(d(2024, 1, 10)));
        let expected = 2 * crate::util::MAX_COUNT;
        assert_eq!(view.current_kpis.new_customers, expected);
        assert!(view.current_kpis.average_ticket > 0.0);

        let mix = crate::reports::customer_mix(&view.current);
        assert_eq!(mix.total_customers, expected);
        let promo = crate::reports::promotion_impact(&view.current);
        assert_eq!(promo.with_promotion.unwrap().customers, crate::util::MAX_COUNT);
        assert_eq!(crate::reports::store_tickets(&view.current)[0].customers, expected);
    }

    #[test]
    fn average_ticket_is_zero_without_customers() {
        let t = table(&[
            line("2024-01-10", "A", "C", "S", "Loja", "100,00", "10,00", "5", "0", "false", "false"),
        ]);
        let view = compute_view(&t, &Filters::new(Period::All.resolve(&t).unwrap()));
        assert_eq!(view.current_kpis.average_ticket, 0.0);
        assert_eq!(view.summary().rows, 1);
    }
}
