// Grouped aggregate tables over a filtered view.
//
// Each function takes the rows of one view and returns plain numeric
// structs; turning them into display rows is done in `render_*` at the
// bottom. Ratios go through `util::safe_div`/`percent`, so no table ever
// carries NaN or infinity.
use crate::types::{
    ChannelRow, DailyRow, PerformanceRow, ProductRow, SegmentRow, StoreEfficiencyRow,
    StoreTicketRow, Transaction, TransactionRow, TrendRow, WeekdayRow,
};
use crate::util::{
    average, format_int, format_money, format_number, linear_fit, percent, safe_div, WEEKDAYS,
};
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Views spanning at least this many days get a monthly seasonality table.
pub const MONTHLY_MIN_SPAN_DAYS: i64 = 60;

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn by_value_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub sales: f64,
    pub profit: f64,
}

pub fn daily_trend(view: &[&Transaction]) -> Vec<DailyTotals> {
    let mut map: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for tx in view {
        let e = map.entry(tx.date).or_default();
        e.0 += tx.gross_total;
        e.1 += tx.net_profit;
    }
    map.into_iter()
        .map(|(date, (sales, profit))| DailyTotals { date, sales, profit })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayTotals {
    pub weekday: &'static str,
    pub sales: f64,
    pub units: i64,
}

/// Totals per weekday present in the view, Monday first.
pub fn weekday_performance(view: &[&Transaction]) -> Vec<WeekdayTotals> {
    let mut acc: [Option<(f64, i64)>; 7] = [None; 7];
    for tx in view {
        let idx = tx.date.weekday().num_days_from_monday() as usize;
        let e = acc[idx].get_or_insert((0.0, 0));
        e.0 += tx.gross_total;
        e.1 += tx.units_sold;
    }
    acc.iter()
        .enumerate()
        .filter_map(|(i, slot)| {
            slot.map(|(sales, units)| WeekdayTotals {
                weekday: WEEKDAYS[i],
                sales,
                units,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductTotals {
    pub product: String,
    pub category: String,
    pub sales: f64,
    pub units: i64,
    pub profit: f64,
    pub margin: f64,
}

/// Best selling (product, category) pairs by sales, at most `limit`.
pub fn top_products(view: &[&Transaction], limit: usize) -> Vec<ProductTotals> {
    let mut map: BTreeMap<(&str, &str), (f64, i64, f64)> = BTreeMap::new();
    for tx in view {
        let e = map
            .entry((tx.product.as_str(), tx.category.as_str()))
            .or_default();
        e.0 += tx.gross_total;
        e.1 += tx.units_sold;
        e.2 += tx.net_profit;
    }
    let mut rows: Vec<ProductTotals> = map
        .into_iter()
        .map(|((product, category), (sales, units, profit))| ProductTotals {
            product: product.to_string(),
            category: category.to_string(),
            sales,
            units,
            profit,
            margin: percent(profit, sales),
        })
        .collect();
    rows.sort_by(|a, b| by_value_desc(a.sales, b.sales));
    rows.truncate(limit);
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTotals {
    pub channel: String,
    pub sales: f64,
    pub customers: i64,
    pub profit: f64,
    pub margin: f64,
    pub average_ticket: f64,
    pub share: f64,
}

pub fn channel_breakdown(view: &[&Transaction]) -> Vec<ChannelTotals> {
    let mut map: BTreeMap<&str, (f64, i64, f64)> = BTreeMap::new();
    for tx in view {
        let e = map.entry(tx.channel.as_str()).or_default();
        e.0 += tx.gross_total;
        e.1 += tx.unique_customers;
        e.2 += tx.net_profit;
    }
    let total_sales: f64 = map.values().map(|v| v.0).sum();
    let mut rows: Vec<ChannelTotals> = map
        .into_iter()
        .map(|(channel, (sales, customers, profit))| ChannelTotals {
            channel: channel.to_string(),
            sales,
            customers,
            profit,
            margin: percent(profit, sales),
            average_ticket: safe_div(sales, customers as f64),
            share: percent(sales, total_sales),
        })
        .collect();
    rows.sort_by(|a, b| by_value_desc(a.sales, b.sales));
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreEfficiency {
    pub store: String,
    pub avg_prep: f64,
    pub profit: f64,
    pub sales: f64,
    pub avg_efficiency: f64,
    pub margin: f64,
    /// The three scores below are 0..=100, relative to the best store.
    pub efficiency_score: f64,
    pub speed_score: f64,
    pub margin_score: f64,
}

/// Per-store operating figures, most efficient store first.
pub fn store_efficiency(view: &[&Transaction]) -> Vec<StoreEfficiency> {
    #[derive(Default)]
    struct Acc {
        prep: Vec<f64>,
        efficiency: Vec<f64>,
        profit: f64,
        sales: f64,
    }
    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for tx in view {
        let e = map.entry(tx.store.as_str()).or_default();
        e.prep.push(tx.prep_time_min as f64);
        e.efficiency.push(tx.operational_efficiency);
        e.profit += tx.net_profit;
        e.sales += tx.gross_total;
    }
    let mut rows: Vec<StoreEfficiency> = map
        .into_iter()
        .map(|(store, acc)| StoreEfficiency {
            store: store.to_string(),
            avg_prep: average(&acc.prep),
            profit: acc.profit,
            sales: acc.sales,
            avg_efficiency: average(&acc.efficiency),
            margin: percent(acc.profit, acc.sales),
            efficiency_score: 0.0,
            speed_score: 0.0,
            margin_score: 0.0,
        })
        .collect();

    let max_eff = rows.iter().map(|r| r.avg_efficiency).fold(f64::NEG_INFINITY, f64::max);
    let max_prep = rows.iter().map(|r| r.avg_prep).fold(f64::NEG_INFINITY, f64::max);
    let max_margin = rows.iter().map(|r| r.margin).fold(f64::NEG_INFINITY, f64::max);
    let scaled = |v: f64, max: f64| if max > 0.0 { safe_div(v, max) * 100.0 } else { 0.0 };
    for r in &mut rows {
        r.efficiency_score = scaled(r.avg_efficiency, max_eff);
        r.speed_score = if max_prep > 0.0 {
            (1.0 - safe_div(r.avg_prep, max_prep)) * 100.0
        } else {
            0.0
        };
        r.margin_score = scaled(r.margin, max_margin);
    }

    rows.sort_by(|a, b| by_value_desc(a.avg_efficiency, b.avg_efficiency));
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthPoint {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub sales: f64,
    pub units: i64,
    /// Value of the least-squares line at this point.
    pub trend: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Seasonality {
    Monthly {
        points: Vec<MonthPoint>,
        best: String,
        worst: String,
    },
    Weekly {
        days: Vec<WeekdayTotals>,
        best: &'static str,
        worst: &'static str,
    },
}

/// Index of the first maximum and first minimum of `values`.
fn extremes(values: impl Iterator<Item = f64>) -> Option<(usize, usize)> {
    let mut best: Option<(usize, f64)> = None;
    let mut worst: Option<(usize, f64)> = None;
    for (i, v) in values.enumerate() {
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((i, v));
        }
        if worst.map_or(true, |(_, w)| v < w) {
            worst = Some((i, v));
        }
    }
    Some((best?.0, worst?.0))
}

/// Days between the first and the last date of the view.
pub fn span_days(view: &[&Transaction]) -> i64 {
    let min = view.iter().map(|t| t.date).min();
    let max = view.iter().map(|t| t.date).max();
    match (min, max) {
        (Some(a), Some(b)) => (b - a).num_days(),
        _ => 0,
    }
}

/// Monthly sales with a linear trend when the view covers enough days,
/// otherwise the weekday pattern. `None` for an empty view.
pub fn seasonality(view: &[&Transaction]) -> Option<Seasonality> {
    if view.is_empty() {
        return None;
    }
    if span_days(view) >= MONTHLY_MIN_SPAN_DAYS {
        let mut map: BTreeMap<(i32, u32), (f64, i64)> = BTreeMap::new();
        for tx in view {
            let e = map.entry((tx.year, tx.month)).or_default();
            e.0 += tx.gross_total;
            e.1 += tx.units_sold;
        }
        let sales: Vec<f64> = map.values().map(|v| v.0).collect();
        let (slope, intercept) = linear_fit(&sales);
        let points: Vec<MonthPoint> = map
            .into_iter()
            .enumerate()
            .map(|(i, ((year, month), (sales, units)))| MonthPoint {
                year,
                month,
                label: format!("{}-{}", year, MONTH_ABBR[(month - 1) as usize]),
                sales,
                units,
                trend: intercept + slope * i as f64,
            })
            .collect();
        let (b, w) = extremes(points.iter().map(|p| p.sales))?;
        let best = MONTH_ABBR[(points[b].month - 1) as usize].to_string();
        let worst = MONTH_ABBR[(points[w].month - 1) as usize].to_string();
        Some(Seasonality::Monthly {
            points,
            best,
            worst,
        })
    } else {
        let days = weekday_performance(view);
        let (b, w) = extremes(days.iter().map(|d| d.sales))?;
        let (best, worst) = (days[b].weekday, days[w].weekday);
        Some(Seasonality::Weekly { days, best, worst })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SegmentTotals {
    pub sales: f64,
    pub units: i64,
    pub customers: i64,
    pub profit: f64,
    pub average_ticket: f64,
    pub margin: f64,
}

fn segment<'a, I>(rows: I) -> Option<SegmentTotals>
where
    I: Iterator<Item = &'a Transaction>,
{
    let mut seen = false;
    let mut t = SegmentTotals::default();
    for tx in rows {
        seen = true;
        t.sales += tx.gross_total;
        t.units += tx.units_sold;
        t.customers += tx.unique_customers;
        t.profit += tx.net_profit;
    }
    if !seen {
        return None;
    }
    t.average_ticket = safe_div(t.sales, t.customers as f64);
    t.margin = percent(t.profit, t.sales);
    Some(t)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromotionImpact {
    pub with_promotion: Option<SegmentTotals>,
    pub without_promotion: Option<SegmentTotals>,
}

pub fn promotion_impact(view: &[&Transaction]) -> PromotionImpact {
    PromotionImpact {
        with_promotion: segment(view.iter().copied().filter(|t| t.is_promotion)),
        without_promotion: segment(view.iter().copied().filter(|t| !t.is_promotion)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerMix {
    pub new: Option<SegmentTotals>,
    pub returning: Option<SegmentTotals>,
    pub total_customers: i64,
}

impl CustomerMix {
    /// Share of new customers among all customers, in percent.
    pub fn new_share(&self) -> f64 {
        let new = self.new.map_or(0, |s| s.customers);
        percent(new as f64, self.total_customers as f64)
    }
}

pub fn customer_mix(view: &[&Transaction]) -> CustomerMix {
    CustomerMix {
        new: segment(view.iter().copied().filter(|t| t.is_new_customer)),
        returning: segment(view.iter().copied().filter(|t| !t.is_new_customer)),
        total_customers: view.iter().map(|t| t.unique_customers).sum(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreTicket {
    pub store: String,
    pub sales: f64,
    pub customers: i64,
    pub average_ticket: f64,
}

/// Average ticket per store, highest first.
pub fn store_tickets(view: &[&Transaction]) -> Vec<StoreTicket> {
    let mut map: BTreeMap<&str, (f64, i64)> = BTreeMap::new();
    for tx in view {
        let e = map.entry(tx.store.as_str()).or_default();
        e.0 += tx.gross_total;
        e.1 += tx.unique_customers;
    }
    let mut rows: Vec<StoreTicket> = map
        .into_iter()
        .map(|(store, (sales, customers))| StoreTicket {
            store: store.to_string(),
            sales,
            customers,
            average_ticket: if customers > 0 {
                safe_div(sales, customers as f64)
            } else {
                0.0
            },
        })
        .collect();
    rows.sort_by(|a, b| by_value_desc(a.average_ticket, b.average_ticket));
    rows
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Performance {
    pub margin: f64,
    pub mean_profitability: f64,
    pub mean_efficiency: f64,
    /// Sales per customer over new-customer rows.
    pub acquisition_ticket: f64,
    pub new_customer_rate: f64,
}

pub const MARGIN_TARGET: f64 = 15.0;
pub const PROFITABILITY_TARGET: f64 = 10.0;
pub const EFFICIENCY_TARGET: f64 = 50.0;

pub fn performance(view: &[&Transaction]) -> Performance {
    let sales: f64 = view.iter().map(|t| t.gross_total).sum();
    let profit: f64 = view.iter().map(|t| t.net_profit).sum();
    let profitability: Vec<f64> = view.iter().map(|t| t.profitability).collect();
    let efficiency: Vec<f64> = view.iter().map(|t| t.operational_efficiency).collect();
    let customers: i64 = view.iter().map(|t| t.unique_customers).sum();
    let new = segment(view.iter().copied().filter(|t| t.is_new_customer)).unwrap_or_default();
    Performance {
        margin: percent(profit, sales),
        mean_profitability: average(&profitability),
        mean_efficiency: average(&efficiency),
        acquisition_ticket: new.average_ticket,
        new_customer_rate: percent(new.customers as f64, customers as f64),
    }
}

// ---------------------------------------------------------------------------
// Display rows
// ---------------------------------------------------------------------------

pub fn render_daily(rows: &[DailyTotals]) -> Vec<DailyRow> {
    rows.iter()
        .map(|r| DailyRow {
            date: r.date.format("%Y-%m-%d").to_string(),
            sales: format_money(r.sales),
            profit: format_money(r.profit),
        })
        .collect()
}

/// Rows of the view in their original order.
pub fn render_transactions(view: &[&Transaction]) -> Vec<TransactionRow> {
    view.iter()
        .map(|t| TransactionRow {
            date: t.date.format("%Y-%m-%d").to_string(),
            product: t.product.clone(),
            category: t.category.clone(),
            store: t.store.clone(),
            channel: t.channel.clone(),
            units: format_int(t.units_sold),
            sales: format_money(t.gross_total),
            profit: format_money(t.net_profit),
            customers: format_int(t.unique_customers),
            promotion: if t.is_promotion { "yes" } else { "no" }.to_string(),
        })
        .collect()
}

pub fn render_weekdays(rows: &[WeekdayTotals]) -> Vec<WeekdayRow> {
    rows.iter()
        .map(|r| WeekdayRow {
            weekday: r.weekday.to_string(),
            sales: format_money(r.sales),
            units: format_int(r.units),
        })
        .collect()
}

pub fn render_products(rows: &[ProductTotals]) -> Vec<ProductRow> {
    rows.iter()
        .map(|r| ProductRow {
            product: r.product.clone(),
            category: r.category.clone(),
            sales: format_money(r.sales),
            units: format_int(r.units),
            margin: format_number(r.margin, 1),
        })
        .collect()
}

pub fn render_channels(rows: &[ChannelTotals]) -> Vec<ChannelRow> {
    rows.iter()
        .map(|r| ChannelRow {
            channel: r.channel.clone(),
            sales: format_money(r.sales),
            share: format_number(r.share, 1),
            margin: format_number(r.margin, 1),
            average_ticket: format_money(r.average_ticket),
        })
        .collect()
}

pub fn render_store_efficiency(rows: &[StoreEfficiency]) -> Vec<StoreEfficiencyRow> {
    rows.iter()
        .map(|r| StoreEfficiencyRow {
            store: r.store.clone(),
            efficiency: format!("{}/min", format_money(r.avg_efficiency)),
            avg_prep: format_number(r.avg_prep, 1),
            margin: format_number(r.margin, 1),
            efficiency_score: format_number(r.efficiency_score, 0),
            speed_score: format_number(r.speed_score, 0),
            margin_score: format_number(r.margin_score, 0),
        })
        .collect()
}

pub fn render_seasonality(s: &Seasonality) -> Vec<TrendRow> {
    match s {
        Seasonality::Monthly { points, .. } => points
            .iter()
            .map(|p| TrendRow {
                period: p.label.clone(),
                sales: format_money(p.sales),
                units: format_int(p.units),
                trend: format_money(p.trend),
            })
            .collect(),
        Seasonality::Weekly { days, .. } => days
            .iter()
            .map(|d| TrendRow {
                period: d.weekday.to_string(),
                sales: format_money(d.sales),
                units: format_int(d.units),
                trend: String::new(),
            })
            .collect(),
    }
}

fn segment_row(label: &str, s: &SegmentTotals) -> SegmentRow {
    SegmentRow {
        segment: label.to_string(),
        sales: format_money(s.sales),
        customers: format_int(s.customers),
        average_ticket: format_money(s.average_ticket),
        margin: format_number(s.margin, 1),
    }
}

pub fn render_promotions(p: &PromotionImpact) -> Vec<SegmentRow> {
    let mut rows = Vec::new();
    if let Some(s) = &p.without_promotion {
        rows.push(segment_row("Without promotion", s));
    }
    if let Some(s) = &p.with_promotion {
        rows.push(segment_row("With promotion", s));
    }
    rows
}

pub fn render_customers(m: &CustomerMix) -> Vec<SegmentRow> {
    let mut rows = Vec::new();
    if let Some(s) = &m.returning {
        rows.push(segment_row("Returning", s));
    }
    if let Some(s) = &m.new {
        rows.push(segment_row("New", s));
    }
    rows
}

pub fn render_store_tickets(rows: &[StoreTicket]) -> Vec<StoreTicketRow> {
    rows.iter()
        .map(|r| StoreTicketRow {
            store: r.store.clone(),
            sales: format_money(r.sales),
            customers: format_int(r.customers),
            average_ticket: format_money(r.average_ticket),
        })
        .collect()
}

pub fn render_performance(p: &Performance) -> Vec<PerformanceRow> {
    let mut rows = vec![
        PerformanceRow {
            indicator: "Average margin".to_string(),
            value: format!("{}%", format_number(p.margin, 2)),
            vs_target: format!("{}pp", format_number(p.margin - MARGIN_TARGET, 2)),
        },
        PerformanceRow {
            indicator: "Average profitability".to_string(),
            value: format!("{}%", format_number(p.mean_profitability, 2)),
            vs_target: format!(
                "{}pp",
                format_number(p.mean_profitability - PROFITABILITY_TARGET, 2)
            ),
        },
        PerformanceRow {
            indicator: "Operational efficiency".to_string(),
            value: format!("{}/min", format_money(p.mean_efficiency)),
            vs_target: format_number(p.mean_efficiency - EFFICIENCY_TARGET, 2),
        },
    ];
    if p.acquisition_ticket > 0.0 {
        rows.push(PerformanceRow {
            indicator: "New-customer ticket".to_string(),
            value: format_money(p.acquisition_ticket),
            vs_target: String::new(),
        });
    } else {
        rows.push(PerformanceRow {
            indicator: "New-customer rate".to_string(),
            value: format!("{}%", format_number(p.new_customer_rate, 2)),
            vs_target: String::new(),
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::{line, table};

    fn refs(t: &[Transaction]) -> Vec<&Transaction> {
        t.iter().collect()
    }

    #[test]
    fn transaction_rows_keep_view_order() {
        let t = shop();
        let rows = render_transactions(&refs(&t));
        assert_eq!(rows.len(), t.len());
        assert_eq!(rows[0].date, "2024-01-08");
        assert_eq!(rows[0].product, "Acai");
        assert_eq!(rows[0].sales, "R$ 100.00");
        assert_eq!(rows[0].promotion, "no");
        assert_eq!(rows[1].promotion, "yes");
    }

    fn shop() -> Vec<Transaction> {
        table(&[
            // 2024-01-08 is a Monday.
            line("2024-01-08", "Acai", "Bowl", "Centro", "Loja", "100,00", "30,00", "10", "4", "true", "false"),
            line("2024-01-08", "Suco", "Drink", "Praia", "iFood", "50,00", "5,00", "2", "1", "false", "true"),
            line("2024-01-10", "Acai", "Bowl", "Praia", "iFood", "150,00", "15,00", "5", "2", "false", "true"),
            line("2024-01-14", "Wrap", "Food", "Centro", "Loja", "20,00", "2,00", "0", "0", "false", "false"),
        ])
    }

    #[test]
    fn daily_totals_are_sorted_by_date() {
        let t = shop();
        let daily = daily_trend(&refs(&t));
        assert_eq!(daily.len(), 3);
        assert_eq!(daily[0].sales, 150.0);
        assert_eq!(daily[0].profit, 35.0);
        assert!(daily.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn weekdays_run_monday_to_sunday() {
        let t = shop();
        let days = weekday_performance(&refs(&t));
        let names: Vec<_> = days.iter().map(|d| d.weekday).collect();
        assert_eq!(names, vec!["Monday", "Wednesday", "Sunday"]);
        assert_eq!(days[0].units, 4);
    }

    #[test]
    fn top_products_rank_by_sales() {
        let t = shop();
        let top = top_products(&refs(&t), 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product, "Acai");
        assert_eq!(top[0].sales, 250.0);
        assert!((top[0].margin - 18.0).abs() < 1e-9);
        assert_eq!(top[1].product, "Suco");
    }

    #[test]
    fn channel_shares_add_up() {
        let t = shop();
        let channels = channel_breakdown(&refs(&t));
        assert_eq!(channels[0].channel, "iFood");
        let total: f64 = channels.iter().map(|c| c.share).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!((channels[0].average_ticket - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn store_scores_are_relative_to_the_best() {
        let t = shop();
        let stores = store_efficiency(&refs(&t));
        // Praia: (25 + 30) / 2 = 27.5; Centro: (10 + 20) / 2 = 15.
        assert_eq!(stores[0].store, "Praia");
        assert!((stores[0].avg_efficiency - 27.5).abs() < 1e-9);
        assert!((stores[0].efficiency_score - 100.0).abs() < 1e-9);
        assert!((stores[1].speed_score - 0.0).abs() < 1e-9);
        for s in &stores {
            assert!(s.efficiency_score.is_finite());
            assert!(s.margin_score.is_finite());
        }
    }

    #[test]
    fn short_views_fall_back_to_weekly_pattern() {
        let t = shop();
        match seasonality(&refs(&t)).unwrap() {
            Seasonality::Weekly { best, worst, .. } => {
                assert_eq!(best, "Monday");
                assert_eq!(worst, "Sunday");
            }
            other => panic!("expected weekly, got {other:?}"),
        }
        assert!(seasonality(&[]).is_none());
    }

    #[test]
    fn long_views_get_a_monthly_trend() {
        let t = table(&[
            line("2024-01-15", "A", "C", "S", "Loja", "100,00", "1,00", "5", "1", "false", "false"),
            line("2024-02-15", "A", "C", "S", "Loja", "200,00", "1,00", "5", "1", "false", "false"),
            line("2024-03-20", "A", "C", "S", "Loja", "300,00", "1,00", "5", "1", "false", "false"),
        ]);
        match seasonality(&refs(&t)).unwrap() {
            Seasonality::Monthly { points, best, worst } => {
                assert_eq!(points.len(), 3);
                assert_eq!(points[0].label, "2024-Jan");
                assert!((points[2].trend - 300.0).abs() < 1e-9);
                assert_eq!(best, "Mar");
                assert_eq!(worst, "Jan");
            }
            other => panic!("expected monthly, got {other:?}"),
        }
    }

    #[test]
    fn promotion_and_customer_segments() {
        let t = shop();
        let promo = promotion_impact(&refs(&t));
        let with = promo.with_promotion.unwrap();
        assert_eq!(with.sales, 200.0);
        assert!((with.average_ticket - 200.0 / 3.0).abs() < 1e-9);
        assert!(promo.without_promotion.is_some());

        let mix = customer_mix(&refs(&t));
        assert_eq!(mix.total_customers, 7);
        assert!((mix.new_share() - 400.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn store_ticket_handles_zero_customers() {
        let t = table(&[
            line("2024-01-10", "A", "C", "Empty", "Loja", "20,00", "1,00", "5", "0", "false", "false"),
            line("2024-01-10", "A", "C", "Busy", "Loja", "90,00", "1,00", "5", "3", "false", "false"),
        ]);
        let tickets = store_tickets(&refs(&t));
        assert_eq!(tickets[0].store, "Busy");
        assert_eq!(tickets[0].average_ticket, 30.0);
        assert_eq!(tickets[1].average_ticket, 0.0);
    }

    #[test]
    fn performance_without_new_customers() {
        let t = table(&[
            line("2024-01-10", "A", "C", "S", "Loja", "100,00", "20,00", "0", "2", "false", "false"),
        ]);
        let p = performance(&refs(&t));
        assert!((p.margin - 20.0).abs() < 1e-9);
        assert_eq!(p.mean_efficiency, 100.0);
        assert_eq!(p.acquisition_ticket, 0.0);
        assert_eq!(p.new_customer_rate, 0.0);
        let rows = render_performance(&p);
        assert_eq!(rows[3].indicator, "New-customer rate");
        assert_eq!(rows[0].vs_target, "5.00pp");
    }

    #[test]
    fn empty_view_yields_empty_tables() {
        let empty: Vec<&Transaction> = Vec::new();
        assert!(daily_trend(&empty).is_empty());
        assert!(store_efficiency(&empty).is_empty());
        assert_eq!(performance(&empty), Performance::default());
        assert!(promotion_impact(&empty).with_promotion.is_none());
    }
}
