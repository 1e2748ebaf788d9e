// Entry point and high-level CLI flow.
//
// - `report` prints the dashboard for one filter selection.
// - `export` writes the filtered rows back out as CSV.
// - `menu` (the default) is the interactive loop: load the file once, then
//   generate dashboards, previews or exports for any filter selection.
mod cache;
mod filter;
mod insights;
mod loader;
mod metrics;
mod output;
mod reports;
mod types;
mod util;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use filter::{DateRange, Filters, Period, Selection};
use log::error;
use metrics::{compute_view, DashboardView};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use types::{KpiCardRow, Transaction};

const DEFAULT_DATA: &str = "vendas_acai_5_anos_completo.csv";

/// Sales analytics for the store network: KPIs against the previous period,
/// grouped tables and recommendations.
#[derive(Parser, Debug)]
#[command(name = "sales-dashboard", version, about, long_about = None)]
struct Cli {
    /// Source CSV (28 positional columns, first line is a header)
    #[arg(long, env = "SALES_DATA", default_value = DEFAULT_DATA, global = true)]
    data: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the dashboard for the selected filters
    Report {
        #[command(flatten)]
        filters: FilterArgs,

        /// Also write the KPI summary as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Write the filtered rows to `sales_<start>_to_<end>.csv`
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Interactive menu
    Menu,
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Period ending at the latest date in the data
    #[arg(long, value_enum, default_value_t = Period::Last90Days)]
    period: Period,

    /// Custom range start (YYYY-MM-DD), overrides the period start
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Custom range end (YYYY-MM-DD), defaults to the latest date
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Keep only these products (repeatable)
    #[arg(long = "product")]
    products: Vec<String>,

    #[arg(long = "category")]
    categories: Vec<String>,

    #[arg(long = "store")]
    stores: Vec<String>,

    #[arg(long = "channel")]
    channels: Vec<String>,
}

impl FilterArgs {
    fn for_period(period: Period) -> Self {
        FilterArgs {
            period,
            start: None,
            end: None,
            products: Vec::new(),
            categories: Vec::new(),
            stores: Vec::new(),
            channels: Vec::new(),
        }
    }

    /// `None` only when the table is empty.
    ///
    /// A single explicit bound always wins: the missing one comes from the
    /// period, or from the user's bound itself when the period would fall on
    /// the wrong side of it.
    fn to_filters(&self, table: &[Transaction]) -> Option<Filters> {
        let base = self.period.resolve(table)?;
        let range = match (self.start, self.end) {
            (None, None) => base,
            (Some(start), Some(end)) => DateRange::new(start, end),
            (None, Some(end)) => {
                let (first, _) = filter::date_bounds(table)?;
                let start = if base.start <= end { base.start } else { first.min(end) };
                DateRange::new(start, end)
            }
            (Some(start), None) => DateRange::new(start, base.end.max(start)),
        };
        Some(Filters {
            range,
            products: Selection::from_args(&self.products),
            categories: Selection::from_args(&self.categories),
            stores: Selection::from_args(&self.stores),
            channels: Selection::from_args(&self.channels),
        })
    }
}

/// Load through the cache, printing the error state instead of failing.
fn load_table(path: &Path) -> Option<Arc<[Transaction]>> {
    match cache::load_cached(path) {
        Ok((rows, report)) => {
            println!(
                "Dataset ready: {} rows loaded, {} skipped.\n",
                util::format_int(report.kept_rows as u64),
                util::format_int(report.skipped_rows as u64)
            );
            Some(rows)
        }
        Err(e) => {
            error!("data load failed: {e}");
            println!("Could not load the data: {e}");
            println!("Check the CSV file and try again. No figures are shown.\n");
            None
        }
    }
}

fn change(delta: f64) -> String {
    let arrow = if delta >= 0.0 { "up" } else { "down" };
    format!("{} {:.1}%", arrow, delta.abs())
}

fn kpi_cards(view: &DashboardView) -> Vec<KpiCardRow> {
    let (c, p, d) = (&view.current_kpis, &view.previous_kpis, &view.deltas);
    vec![
        KpiCardRow {
            metric: "Total sales".to_string(),
            value: util::format_money(c.total_sales),
            previous: util::format_money(p.total_sales),
            change: change(d.total_sales),
        },
        KpiCardRow {
            metric: "Net profit".to_string(),
            value: util::format_money(c.total_profit),
            previous: util::format_money(p.total_profit),
            change: change(d.total_profit),
        },
        KpiCardRow {
            metric: "Average ticket".to_string(),
            value: util::format_money(c.average_ticket),
            previous: util::format_money(p.average_ticket),
            change: change(d.average_ticket),
        },
        KpiCardRow {
            metric: "New customers".to_string(),
            value: util::format_int(c.new_customers),
            previous: util::format_int(p.new_customers),
            change: change(d.new_customers),
        },
    ]
}

fn print_dashboard(view: &DashboardView) {
    let rows = &view.current;
    println!("Sales dashboard");
    println!("Period analysed: {}", view.range);
    println!("Compared with: {}", view.comparison_range);
    output::preview_table("Key figures", None, &kpi_cards(view), 4);

    if rows.is_empty() {
        println!("No sales match the selected filters.\n");
        return;
    }

    let daily = reports::daily_trend(rows);
    output::preview_table(
        "Daily sales and profit",
        Some("latest 14 days"),
        &reports::render_daily(&daily[daily.len().saturating_sub(14)..]),
        14,
    );
    output::preview_table(
        "Performance by weekday",
        None,
        &reports::render_weekdays(&reports::weekday_performance(rows)),
        7,
    );
    output::preview_table(
        "Top 10 products by sales",
        None,
        &reports::render_products(&reports::top_products(rows, 10)),
        10,
    );
    output::preview_table(
        "Sales by channel",
        None,
        &reports::render_channels(&reports::channel_breakdown(rows)),
        usize::MAX,
    );

    println!("\nInsights and recommendations");
    let stores = reports::store_efficiency(rows);
    output::preview_table(
        "Operational efficiency by store",
        None,
        &reports::render_store_efficiency(&stores),
        usize::MAX,
    );
    if let Some(tip) = insights::store_efficiency_tip(&stores) {
        println!("Operational tip: {}\n", tip);
    }

    if let Some(season) = reports::seasonality(rows) {
        let title = match season {
            reports::Seasonality::Monthly { .. } => "Monthly sales trend",
            reports::Seasonality::Weekly { .. } => "Weekly sales pattern",
        };
        output::preview_table(
            title,
            None,
            &reports::render_seasonality(&season),
            usize::MAX,
        );
        println!("Seasonal pattern: {}\n", insights::seasonality_note(&season));
    }

    let promo = reports::promotion_impact(rows);
    output::preview_table(
        "Promotion impact",
        None,
        &reports::render_promotions(&promo),
        2,
    );
    if let Some(advice) = insights::promotion_advice(&promo) {
        println!("Promotion analysis: {}\n", advice.message());
    }

    let mix = reports::customer_mix(rows);
    let total = format!("{} customers in total", util::format_int(mix.total_customers));
    output::preview_table(
        "New vs. returning customers",
        Some(&total),
        &reports::render_customers(&mix),
        2,
    );
    if let Some(advice) = insights::customer_advice(&mix) {
        println!("Customer base: {}\n", advice);
    }

    let tickets = reports::store_tickets(rows);
    let mean = format!(
        "overall mean {}",
        util::format_money(insights::mean_store_ticket(&tickets))
    );
    output::preview_table(
        "Average ticket by store",
        Some(&mean),
        &reports::render_store_tickets(&tickets),
        usize::MAX,
    );
    println!("Ticket analysis: {}\n", insights::ticket_note(&tickets));

    output::preview_table(
        "Performance summary",
        None,
        &reports::render_performance(&reports::performance(rows)),
        4,
    );

    let key = insights::key_insights(rows);
    if !key.is_empty() {
        println!("Key insights:");
        for (i, text) in key.iter().enumerate() {
            println!("{}. {}", i + 1, text);
        }
        println!();
    }
}

fn run_report(data: &Path, args: &FilterArgs, json: Option<&Path>) -> Result<bool> {
    let Some(table) = load_table(data) else {
        return Ok(false);
    };
    let Some(filters) = args.to_filters(&table) else {
        return Ok(false);
    };
    let stores = filter::distinct(&table, |t| t.store.as_str());
    let channels = filter::distinct(&table, |t| t.channel.as_str());
    println!(
        "Stores: {}",
        stores.into_iter().collect::<Vec<_>>().join(", ")
    );
    println!(
        "Channels: {}\n",
        channels.into_iter().collect::<Vec<_>>().join(", ")
    );
    let view = compute_view(&table, &filters);
    print_dashboard(&view);
    if let Some(path) = json {
        output::write_json(path, &view.summary())?;
        println!("(Summary written to {})\n", path.display());
    }
    Ok(true)
}

fn run_export(data: &Path, args: &FilterArgs, out_dir: &Path) -> Result<bool> {
    let Some(table) = load_table(data) else {
        return Ok(false);
    };
    let Some(filters) = args.to_filters(&table) else {
        return Ok(false);
    };
    let view = compute_view(&table, &filters);
    let path = output::export_view(out_dir, &filters.range, &view.current)
        .context("exporting filtered rows")?;
    println!(
        "Exported {} rows to {}\n",
        util::format_int(view.current.len() as u64),
        path.display()
    );
    Ok(true)
}

/// Most rows listed by the filtered-data preview.
const PREVIEW_ROWS: usize = 50;

fn run_preview(data: &Path, args: &FilterArgs) -> Result<bool> {
    let Some(table) = load_table(data) else {
        return Ok(false);
    };
    let Some(filters) = args.to_filters(&table) else {
        return Ok(false);
    };
    let view = compute_view(&table, &filters);
    let note = format!(
        "{} rows in {}, showing up to {}",
        util::format_int(view.current.len() as u64),
        view.range,
        PREVIEW_ROWS
    );
    output::preview_table(
        "Filtered data",
        Some(&note),
        &reports::render_transactions(&view.current),
        PREVIEW_ROWS,
    );
    Ok(true)
}

/// Read a single trimmed line of input after printing `prompt`.
fn read_input(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    read_input("Enter choice: ")
}

/// Comma separated values; blank input means no restriction.
fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// `Ok(None)` for blank input, `Err(())` for text that is not a date.
fn parse_optional_date(input: &str) -> Result<Option<NaiveDate>, ()> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    util::parse_date_safe(Some(input)).map(Some).ok_or(())
}

fn prompt_date(label: &str) -> Option<NaiveDate> {
    loop {
        let input = read_input(&format!("{} (YYYY-MM-DD, blank to skip): ", label));
        match parse_optional_date(&input) {
            Ok(date) => return date,
            Err(()) => println!("Invalid date. Please use YYYY-MM-DD or dd/mm/yyyy."),
        }
    }
}

/// Period, optional custom dates and dimension selections, as on the
/// command line.
fn prompt_filters() -> FilterArgs {
    let mut args = FilterArgs::for_period(prompt_period());
    args.start = prompt_date("Start date");
    args.end = prompt_date("End date");
    println!("Leave blank to keep every value; separate several with commas.");
    args.products = parse_list(&read_input("Products: "));
    args.categories = parse_list(&read_input("Categories: "));
    args.stores = parse_list(&read_input("Stores: "));
    args.channels = parse_list(&read_input("Channels: "));
    println!();
    args
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn prompt_period() -> Period {
    println!("Select period:");
    for (i, p) in Period::ALL.iter().enumerate() {
        println!("[{}] {}", i + 1, p.label());
    }
    loop {
        let choice = read_choice();
        match choice.parse::<usize>() {
            Ok(n) if (1..=Period::ALL.len()).contains(&n) => return Period::ALL[n - 1],
            _ => println!("Invalid choice. Please enter 1 to {}.", Period::ALL.len()),
        }
    }
}

fn run_menu(data: &Path) -> Result<()> {
    loop {
        println!("Sales dashboard");
        println!("[1] Load the file");
        println!("[2] Generate dashboard");
        println!("[3] Show filtered data");
        println!("[4] Export filtered data");
        println!("[5] Exit\n");
        let done = match read_choice().as_str() {
            "1" => {
                load_table(data);
                false
            }
            "2" => {
                run_report(data, &prompt_filters(), None)?;
                !prompt_back_to_menu()
            }
            "3" => {
                run_preview(data, &prompt_filters())?;
                !prompt_back_to_menu()
            }
            "4" => {
                run_export(data, &prompt_filters(), Path::new("."))?;
                !prompt_back_to_menu()
            }
            "5" => true,
            _ => {
                println!("Invalid choice. Please enter 1 to 5.\n");
                false
            }
        };
        if done {
            break;
        }
    }
    println!("Exiting the program.");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Command::Menu) {
        Command::Report { filters, json } => run_report(&cli.data, &filters, json.as_deref()),
        Command::Export { filters, out_dir } => run_export(&cli.data, &filters, &out_dir),
        Command::Menu => run_menu(&cli.data).map(|_| true),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
