use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Number of positional columns in the source file.
pub const COLUMN_COUNT: usize = 28;

/// One untyped source row, read positionally. Field order is the column
/// order of the file; the file's own header line is never consulted.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub date: Option<String>,
    pub product: Option<String>,
    pub category: Option<String>,
    pub store: Option<String>,
    pub channel: Option<String>,
    pub units_sold: Option<String>,
    pub unit_price: Option<String>,
    pub gross_total: Option<String>,
    pub materials_cost: Option<String>,
    pub delivery_cost: Option<String>,
    pub net_revenue: Option<String>,
    pub store_revenue: Option<String>,
    pub customer_discount: Option<String>,
    pub platform_fee: Option<String>,
    pub net_profit: Option<String>,
    pub staff_count: Option<String>,
    pub staff_commission: Option<String>,
    pub prep_time_min: Option<String>,
    pub delivery_distance: Option<String>,
    pub unique_customers: Option<String>,
    pub people_served: Option<String>,
    pub delivery_time_min: Option<String>,
    pub average_ticket: Option<String>,
    pub is_new_customer: Option<String>,
    pub max_capacity: Option<String>,
    pub is_promotion: Option<String>,
    pub promo_discount: Option<String>,
    pub discount_units: Option<String>,
}

/// A normalized sale event. Built once by the loader and never mutated.
///
/// The first block mirrors the 28 source columns in file order; the
/// remaining fields are derived at load time from those columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub product: String,
    pub category: String,
    pub store: String,
    pub channel: String,
    pub units_sold: i64,
    pub unit_price: f64,
    pub gross_total: f64,
    pub materials_cost: f64,
    pub delivery_cost: f64,
    pub net_revenue: f64,
    pub store_revenue: f64,
    pub customer_discount: f64,
    pub platform_fee: f64,
    pub net_profit: f64,
    pub staff_count: i64,
    pub staff_commission: f64,
    pub prep_time_min: i64,
    pub delivery_distance: i64,
    pub unique_customers: i64,
    pub people_served: i64,
    pub delivery_time_min: i64,
    pub average_ticket: f64,
    pub is_new_customer: bool,
    pub max_capacity: i64,
    pub is_promotion: bool,
    pub promo_discount: f64,
    pub discount_units: i64,

    #[serde(skip)]
    pub profitability: f64,
    #[serde(skip)]
    pub operational_efficiency: f64,
    #[serde(skip)]
    pub return_flag: u8,
    #[serde(skip)]
    pub year: i32,
    #[serde(skip)]
    pub month: u32,
    #[serde(skip)]
    pub month_name: &'static str,
    #[serde(skip)]
    pub weekday_name: &'static str,
    #[serde(skip)]
    pub iso_week: u32,
    #[serde(skip)]
    pub day: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Kpis {
    pub total_sales: f64,
    pub total_profit: f64,
    pub average_ticket: f64,
    pub new_customers: i64,
}

/// Percentage change of each KPI against the comparison period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KpiDeltas {
    pub total_sales: f64,
    pub total_profit: f64,
    pub average_ticket: f64,
    pub new_customers: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub comparison_start: NaiveDate,
    pub comparison_end: NaiveDate,
    pub rows: usize,
    pub comparison_rows: usize,
    pub current: Kpis,
    pub previous: Kpis,
    pub delta_pct: KpiDeltas,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiCardRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Previous")]
    pub previous: String,
    #[tabled(rename = "Change")]
    pub change: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DailyRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Sales")]
    pub sales: String,
    #[tabled(rename = "Profit")]
    pub profit: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct WeekdayRow {
    #[tabled(rename = "Weekday")]
    pub weekday: String,
    #[tabled(rename = "Sales")]
    pub sales: String,
    #[tabled(rename = "Units")]
    pub units: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProductRow {
    #[tabled(rename = "Product")]
    pub product: String,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Sales")]
    pub sales: String,
    #[tabled(rename = "Units")]
    pub units: String,
    #[tabled(rename = "Margin%")]
    pub margin: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ChannelRow {
    #[tabled(rename = "Channel")]
    pub channel: String,
    #[tabled(rename = "Sales")]
    pub sales: String,
    #[tabled(rename = "Share%")]
    pub share: String,
    #[tabled(rename = "Margin%")]
    pub margin: String,
    #[tabled(rename = "AvgTicket")]
    pub average_ticket: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StoreEfficiencyRow {
    #[tabled(rename = "Store")]
    pub store: String,
    #[tabled(rename = "Efficiency")]
    pub efficiency: String,
    #[tabled(rename = "AvgPrepMin")]
    pub avg_prep: String,
    #[tabled(rename = "Margin%")]
    pub margin: String,
    #[tabled(rename = "EffScore")]
    pub efficiency_score: String,
    #[tabled(rename = "SpeedScore")]
    pub speed_score: String,
    #[tabled(rename = "MarginScore")]
    pub margin_score: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[tabled(rename = "Period")]
    pub period: String,
    #[tabled(rename = "Sales")]
    pub sales: String,
    #[tabled(rename = "Units")]
    pub units: String,
    #[tabled(rename = "Trend")]
    pub trend: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SegmentRow {
    #[tabled(rename = "Segment")]
    pub segment: String,
    #[tabled(rename = "Sales")]
    pub sales: String,
    #[tabled(rename = "Customers")]
    pub customers: String,
    #[tabled(rename = "AvgTicket")]
    pub average_ticket: String,
    #[tabled(rename = "Margin%")]
    pub margin: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StoreTicketRow {
    #[tabled(rename = "Store")]
    pub store: String,
    #[tabled(rename = "Sales")]
    pub sales: String,
    #[tabled(rename = "Customers")]
    pub customers: String,
    #[tabled(rename = "AvgTicket")]
    pub average_ticket: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PerformanceRow {
    #[tabled(rename = "Indicator")]
    pub indicator: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "VsTarget")]
    pub vs_target: String,
}

/// One source row as shown in the filtered-data preview.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TransactionRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Product")]
    pub product: String,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Store")]
    pub store: String,
    #[tabled(rename = "Channel")]
    pub channel: String,
    #[tabled(rename = "Units")]
    pub units: String,
    #[tabled(rename = "Sales")]
    pub sales: String,
    #[tabled(rename = "Profit")]
    pub profit: String,
    #[tabled(rename = "Customers")]
    pub customers: String,
    #[tabled(rename = "Promo")]
    pub promotion: String,
}
