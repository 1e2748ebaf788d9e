// Narrative recommendations built from the report tables.
//
// Thresholds match the ones the dashboard has always used; each function
// returns `None` when the view lacks what the sentence needs.
use crate::reports::{
    channel_breakdown, promotion_impact, CustomerMix, PromotionImpact, Seasonality, StoreEfficiency, StoreTicket,
};
use crate::types::Transaction;
use crate::util::{average, format_money, pct_change, WEEKDAYS};
use chrono::Datelike;
use std::collections::BTreeMap;

pub fn store_efficiency_tip(stores: &[StoreEfficiency]) -> Option<String> {
    let best = stores.first()?;
    let worst = stores.last()?;
    Some(format!(
        "Store {} shows the highest operational efficiency. Review its processes and bring \
         those practices to store {}.",
        best.store, worst.store
    ))
}

pub fn seasonality_note(s: &Seasonality) -> String {
    match s {
        Seasonality::Monthly { best, worst, .. } => format!(
            "Sales tend to peak in {} and bottom out in {}. Plan campaigns and stock around \
             those months.",
            best, worst
        ),
        Seasonality::Weekly { best, worst, .. } => format!(
            "Sales tend to peak on {} and bottom out on {}. Adjust staffing and promotions \
             for those days.",
            best, worst
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionAdvice {
    Keep,
    AdjustDiscounts,
    Revise,
}

impl PromotionAdvice {
    pub fn message(self) -> &'static str {
        match self {
            PromotionAdvice::Keep => {
                "Promotions lift sales substantially without hurting margin much. Keep the \
                 promotional strategy."
            }
            PromotionAdvice::AdjustDiscounts => {
                "Promotions lift volume but are eroding margin. Consider smaller discounts."
            }
            PromotionAdvice::Revise => {
                "Promotions are not making much of a difference. Revisit the promotional \
                 strategy."
            }
        }
    }
}

/// Compare sales lift and margin change between promoted and regular sales.
/// Needs both groups in the view. With no regular sales to compare against
/// the lift counts as 0, so the advice is `Revise`.
pub fn promotion_advice(p: &PromotionImpact) -> Option<PromotionAdvice> {
    let with = p.with_promotion?;
    let without = p.without_promotion?;
    let lift = pct_change(with.sales, without.sales);
    let margin_diff = with.margin - without.margin;
    Some(if lift > 20.0 && margin_diff > -5.0 {
        PromotionAdvice::Keep
    } else if lift > 20.0 && margin_diff < -10.0 {
        PromotionAdvice::AdjustDiscounts
    } else {
        PromotionAdvice::Revise
    })
}

/// New-vs-returning balance and ticket comparison. Needs both groups.
pub fn customer_advice(m: &CustomerMix) -> Option<String> {
    let new = m.new?;
    let returning = m.returning?;
    let share = m.new_share();
    let base = if share > 40.0 {
        "The share of new customers is high (above 40%)."
    } else if share < 15.0 {
        "The share of new customers is low (below 15%)."
    } else {
        "New and returning customers are balanced."
    };
    let ticket_diff = pct_change(returning.average_ticket, new.average_ticket);
    let (ticket, action) = if ticket_diff > 20.0 {
        (
            "Returning customers spend noticeably more per visit than new ones.",
            "Work on loyalty to turn more new customers into regulars.",
        )
    } else if ticket_diff < -10.0 {
        (
            "New customers spend more per visit than returning ones.",
            "Find out why regulars spend less and create offers to raise their spend.",
        )
    } else {
        (
            "Average ticket is similar for new and returning customers.",
            "Keep a balanced mix of acquisition and retention.",
        )
    };
    Some(format!("{} {} {}", base, ticket, action))
}

/// Lowest ticket floor used when measuring the spread between stores.
const MIN_TICKET: f64 = 0.01;

pub fn ticket_note(tickets: &[StoreTicket]) -> String {
    let (Some(high), Some(low)) = (tickets.first(), tickets.last()) else {
        return "The current filters leave too little data for a ticket analysis. Try widening \
                them."
            .to_string();
    };
    let spread = (high.average_ticket / low.average_ticket.max(MIN_TICKET) - 1.0) * 100.0;
    if spread > 30.0 {
        format!(
            "Average ticket varies by {:.1}% between stores. {} leads with {}; try cross-selling \
             and upselling at {} to raise its ticket.",
            spread,
            high.store,
            format_money(high.average_ticket),
            low.store
        )
    } else {
        format!(
            "Highest and lowest store tickets differ by {:.1}%, so stores are fairly consistent. \
             Keep monitoring.",
            spread
        )
    }
}

/// Mean of the per-store tickets, drawn as the reference line.
pub fn mean_store_ticket(tickets: &[StoreTicket]) -> f64 {
    average(&tickets.iter().map(|t| t.average_ticket).collect::<Vec<_>>())
}

fn top_by_sales<'a, F>(view: &[&'a Transaction], key: F) -> Option<&'a str>
where
    F: Fn(&'a Transaction) -> &'a str,
{
    let mut map: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in view {
        *map.entry(key(*tx)).or_default() += tx.gross_total;
    }
    let mut best: Option<(&str, f64)> = None;
    for (k, v) in map {
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((k, v));
        }
    }
    best.map(|(k, _)| k)
}

/// The numbered "key insights" list shown at the bottom of the dashboard.
pub fn key_insights(view: &[&Transaction]) -> Vec<String> {
    let mut out = Vec::new();
    if view.is_empty() {
        return out;
    }

    if let (Some(product), Some(category)) = (
        top_by_sales(view, |t| t.product.as_str()),
        top_by_sales(view, |t| t.category.as_str()),
    ) {
        out.push(format!(
            "The best-selling product is {} and the leading category is {}. Feature it in \
             campaigns and keep it in stock.",
            product, category
        ));
    }

    let mut by_day = [0.0f64; 7];
    for tx in view {
        by_day[tx.date.weekday().num_days_from_monday() as usize] += tx.gross_total;
    }
    let mut top_day: Option<(usize, f64)> = None;
    for tx in view {
        let i = tx.date.weekday().num_days_from_monday() as usize;
        if top_day.map_or(true, |(_, b)| by_day[i] > b) {
            top_day = Some((i, by_day[i]));
        }
    }
    if let Some((i, _)) = top_day {
        out.push(format!(
            "{} is the strongest sales day. Add staff and stock on that day.",
            WEEKDAYS[i]
        ));
    }

    let channels = channel_breakdown(view);
    let mut best_channel: Option<(&str, f64)> = None;
    for c in &channels {
        if best_channel.map_or(true, |(_, m)| c.margin > m) {
            best_channel = Some((c.channel.as_str(), c.margin));
        }
    }
    if let Some((channel, margin)) = best_channel {
        out.push(format!(
            "Channel {} has the highest profit margin ({:.1}%). Consider putting more resources \
             behind it.",
            channel, margin
        ));
    }

    let mut prep: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for tx in view {
        prep.entry(tx.store.as_str())
            .or_default()
            .push(tx.prep_time_min as f64);
    }
    let overall_prep = average(&view.iter().map(|t| t.prep_time_min as f64).collect::<Vec<_>>());
    let mut fastest: Option<(&str, f64)> = None;
    for (store, times) in &prep {
        let avg = average(times);
        if fastest.map_or(true, |(_, f)| avg < f) {
            fastest = Some((*store, avg));
        }
    }
    if let Some((store, avg)) = fastest {
        out.push(format!(
            "Store {} has the shortest average preparation time ({:.1} min vs. {:.1} min \
             overall). Share its routines with the other stores.",
            store, avg, overall_prep
        ));
    }

    let promo = promotion_impact(view);
    if let (Some(with), Some(without)) = (promo.with_promotion, promo.without_promotion) {
        let (promo_margin, regular_margin) = (with.margin, without.margin);
        if promo_margin > regular_margin {
            out.push(format!(
                "Promoted sales carry a higher margin ({:.1}%) than regular sales ({:.1}%); \
                 promotions are adding volume without hurting profitability.",
                promo_margin, regular_margin
            ));
        } else {
            let level = if regular_margin - promo_margin > 10.0 {
                "significantly"
            } else {
                "slightly"
            };
            out.push(format!(
                "Regular sales are {} more profitable ({:.1}% vs {:.1}%). Consider adjusting \
                 discount levels on promotions.",
                level, regular_margin, promo_margin
            ));
        }
    }

    out
}
