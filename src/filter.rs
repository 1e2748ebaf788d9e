use crate::types::Transaction;
use chrono::{Days, NaiveDate};
use clap::ValueEnum;
use std::collections::BTreeSet;
use std::fmt;

/// A closed interval of calendar days. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Bounds given in the wrong order are swapped.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            DateRange { start: a, end: b }
        } else {
            DateRange { start: b, end: a }
        }
    }

    pub fn len_days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        self.start <= d && d <= self.end
    }

    /// The interval of the same length that ends the day before `start`.
    pub fn preceding(&self) -> DateRange {
        let len = self.len_days();
        let start = self
            .start
            .checked_sub_days(Days::new(len))
            .unwrap_or(NaiveDate::MIN);
        let end = self
            .start
            .checked_sub_days(Days::new(1))
            .unwrap_or(NaiveDate::MIN);
        DateRange { start, end }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%d/%m/%Y"),
            self.end.format("%d/%m/%Y")
        )
    }
}

/// Period shortcuts. "Today" is the latest date in the dataset, never the
/// wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Period {
    #[value(name = "7d")]
    Last7Days,
    #[value(name = "30d")]
    Last30Days,
    #[value(name = "90d")]
    Last90Days,
    #[value(name = "year")]
    LastYear,
    #[value(name = "all")]
    All,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::Last7Days,
        Period::Last30Days,
        Period::Last90Days,
        Period::LastYear,
        Period::All,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Period::Last7Days => "Last 7 days",
            Period::Last30Days => "Last 30 days",
            Period::Last90Days => "Last 90 days",
            Period::LastYear => "Last year",
            Period::All => "All",
        }
    }

    fn lookback_days(self) -> Option<u64> {
        match self {
            Period::Last7Days => Some(7),
            Period::Last30Days => Some(30),
            Period::Last90Days => Some(90),
            Period::LastYear => Some(365),
            Period::All => None,
        }
    }

    /// Turn the shortcut into concrete dates for `table`.
    /// `None` only for an empty table.
    pub fn resolve(self, table: &[Transaction]) -> Option<DateRange> {
        let (min, max) = date_bounds(table)?;
        let start = match self.lookback_days() {
            Some(n) => max.checked_sub_days(Days::new(n)).unwrap_or(min),
            None => min,
        };
        Some(DateRange::new(start, max))
    }
}

/// Membership predicate for one dimension. `None` accepts every value; an
/// explicit set accepts only its members, so an empty set accepts nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(Option<BTreeSet<String>>);

impl Selection {
    pub fn all() -> Self {
        Selection(None)
    }

    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection(Some(values.into_iter().map(Into::into).collect()))
    }

    /// An empty list on the command line means "no restriction".
    pub fn from_args(values: &[String]) -> Self {
        if values.is_empty() {
            Selection::all()
        } else {
            Selection::only(values.iter().cloned())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match &self.0 {
            None => true,
            Some(set) => set.contains(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub range: DateRange,
    pub products: Selection,
    pub categories: Selection,
    pub stores: Selection,
    pub channels: Selection,
}

impl Filters {
    pub fn new(range: DateRange) -> Self {
        Filters {
            range,
            products: Selection::all(),
            categories: Selection::all(),
            stores: Selection::all(),
            channels: Selection::all(),
        }
    }

    /// Product, category, store and channel predicates; the date is ignored.
    pub fn matches_dimensions(&self, tx: &Transaction) -> bool {
        self.products.matches(&tx.product)
            && self.categories.matches(&tx.category)
            && self.stores.matches(&tx.store)
            && self.channels.matches(&tx.channel)
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.range.contains(tx.date) && self.matches_dimensions(tx)
    }
}

/// Rows of `table` inside `range` that pass the dimension predicates.
pub fn select_in<'a>(
    table: &'a [Transaction],
    filters: &Filters,
    range: DateRange,
) -> Vec<&'a Transaction> {
    table
        .iter()
        .filter(|tx| range.contains(tx.date) && filters.matches_dimensions(tx))
        .collect()
}

pub fn select<'a>(table: &'a [Transaction], filters: &Filters) -> Vec<&'a Transaction> {
    table.iter().filter(|tx| filters.matches(tx)).collect()
}

/// Earliest and latest date present, `None` for an empty table.
pub fn date_bounds(table: &[Transaction]) -> Option<(NaiveDate, NaiveDate)> {
    let min = table.iter().map(|t| t.date).min()?;
    let max = table.iter().map(|t| t.date).max()?;
    Some((min, max))
}

/// Sorted distinct values of one text column.
pub fn distinct<F>(table: &[Transaction], column: F) -> BTreeSet<String>
where
    F: Fn(&Transaction) -> &str,
{
    table.iter().map(|t| column(t).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::{line, table};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> Vec<Transaction> {
        table(&[
            line("2024-01-01", "Acai", "Bowl", "Centro", "Loja", "10,00", "1,00", "5", "1", "false", "false"),
            line("2024-01-05", "Acai", "Bowl", "Praia", "iFood", "20,00", "2,00", "5", "1", "false", "false"),
            line("2024-01-08", "Suco", "Drink", "Centro", "iFood", "30,00", "3,00", "5", "1", "true", "false"),
            line("2024-01-10", "Suco", "Drink", "Praia", "Loja", "40,00", "4,00", "5", "1", "false", "true"),
        ])
    }

    #[test]
    fn preceding_range_has_equal_length() {
        let r = DateRange::new(d(2024, 1, 8), d(2024, 1, 10));
        let p = r.preceding();
        assert_eq!(p, DateRange::new(d(2024, 1, 5), d(2024, 1, 7)));
        assert_eq!(p.len_days(), r.len_days());

        let single = DateRange::new(d(2024, 3, 1), d(2024, 3, 1));
        assert_eq!(single.preceding(), DateRange::new(d(2024, 2, 29), d(2024, 2, 29)));
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let r = DateRange::new(d(2024, 1, 10), d(2024, 1, 1));
        assert_eq!(r.start, d(2024, 1, 1));
        assert_eq!(r.len_days(), 10);
    }

    #[test]
    fn periods_are_relative_to_latest_data() {
        let t = sample();
        let r = Period::Last7Days.resolve(&t).unwrap();
        assert_eq!(r, DateRange::new(d(2024, 1, 3), d(2024, 1, 10)));
        let all = Period::All.resolve(&t).unwrap();
        assert_eq!(all, DateRange::new(d(2024, 1, 1), d(2024, 1, 10)));
        assert!(Period::LastYear.resolve(&[]).is_none());
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let t = sample();
        let f = Filters::new(DateRange::new(d(2024, 1, 5), d(2024, 1, 8)));
        let view = select(&t, &f);
        let dates: Vec<_> = view.iter().map(|tx| tx.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 5), d(2024, 1, 8)]);
    }

    #[test]
    fn selections_or_within_and_across() {
        let t = sample();
        let mut f = Filters::new(Period::All.resolve(&t).unwrap());
        f.stores = Selection::only(["Centro", "Praia"]);
        f.channels = Selection::only(["iFood"]);
        let view = select(&t, &f);
        assert_eq!(view.len(), 2);
        for tx in &view {
            assert!(f.matches(tx));
            assert!(t.iter().any(|row| std::ptr::eq(row, *tx)));
        }

        f.products = Selection::only(Vec::<String>::new());
        assert!(select(&t, &f).is_empty());
    }

    #[test]
    fn distinct_values_are_sorted() {
        let t = sample();
        let stores: Vec<_> = distinct(&t, |tx| tx.store.as_str()).into_iter().collect();
        assert_eq!(stores, vec!["Centro", "Praia"]);
    }
}
