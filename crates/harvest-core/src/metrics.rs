//! Metric identifiers and the named metric sets shared across importers.

use serde::{Deserialize, Serialize};

/// A single aggregated metric column.
///
/// Serialized names match the readable column names the archive stores, so a
/// metric can double as the record name for flat numeric writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "nb_uniq_visitors")]
    UniqueVisitors,
    #[serde(rename = "nb_visits")]
    Visits,
    #[serde(rename = "nb_actions")]
    Actions,
    #[serde(rename = "sum_visit_length")]
    VisitLength,
    #[serde(rename = "bounce_count")]
    Bounces,
    #[serde(rename = "nb_visits_converted")]
    VisitsConverted,
    #[serde(rename = "nb_conversions")]
    Conversions,
    #[serde(rename = "revenue")]
    Revenue,
    #[serde(rename = "goals")]
    Goals,
    #[serde(rename = "nb_hits")]
    Hits,
    #[serde(rename = "sum_time_spent")]
    TimeSpent,
    #[serde(rename = "sum_time_generation")]
    TimeGeneration,
    #[serde(rename = "nb_hits_with_time_generation")]
    HitsWithTimeGeneration,
    #[serde(rename = "item_revenue")]
    ItemRevenue,
    #[serde(rename = "item_quantity")]
    ItemQuantity,
    #[serde(rename = "item_price")]
    ItemPrice,
    #[serde(rename = "nb_orders")]
    Orders,
    #[serde(rename = "goal_nb_conversions")]
    GoalConversions,
    #[serde(rename = "goal_nb_visits_converted")]
    GoalVisitsConverted,
    #[serde(rename = "goal_revenue_subtotal")]
    GoalRevenueSubtotal,
    #[serde(rename = "goal_revenue_tax")]
    GoalRevenueTax,
    #[serde(rename = "goal_revenue_shipping")]
    GoalRevenueShipping,
    #[serde(rename = "goal_items")]
    GoalItems,
}

impl Metric {
    /// Readable column name, used as the record name for flat numeric writes.
    pub fn readable_name(&self) -> &'static str {
        match self {
            Metric::UniqueVisitors => "nb_uniq_visitors",
            Metric::Visits => "nb_visits",
            Metric::Actions => "nb_actions",
            Metric::VisitLength => "sum_visit_length",
            Metric::Bounces => "bounce_count",
            Metric::VisitsConverted => "nb_visits_converted",
            Metric::Conversions => "nb_conversions",
            Metric::Revenue => "revenue",
            Metric::Goals => "goals",
            Metric::Hits => "nb_hits",
            Metric::TimeSpent => "sum_time_spent",
            Metric::TimeGeneration => "sum_time_generation",
            Metric::HitsWithTimeGeneration => "nb_hits_with_time_generation",
            Metric::ItemRevenue => "item_revenue",
            Metric::ItemQuantity => "item_quantity",
            Metric::ItemPrice => "item_price",
            Metric::Orders => "nb_orders",
            Metric::GoalConversions => "goal_nb_conversions",
            Metric::GoalVisitsConverted => "goal_nb_visits_converted",
            Metric::GoalRevenueSubtotal => "goal_revenue_subtotal",
            Metric::GoalRevenueTax => "goal_revenue_tax",
            Metric::GoalRevenueShipping => "goal_revenue_shipping",
            Metric::GoalItems => "goal_items",
        }
    }
}

/// Visit-scoped metrics requested for breakdown dimensions.
pub fn visit_metrics() -> Vec<Metric> {
    vec![
        Metric::UniqueVisitors,
        Metric::Visits,
        Metric::Actions,
        Metric::VisitLength,
        Metric::Bounces,
        Metric::VisitsConverted,
    ]
}

/// Visit metrics plus the conversion totals, for reports that show revenue.
pub fn conversion_aware_visit_metrics() -> Vec<Metric> {
    let mut metrics = visit_metrics();
    metrics.extend([Metric::Conversions, Metric::Revenue, Metric::Goals]);
    metrics
}

pub fn action_metrics() -> Vec<Metric> {
    vec![Metric::Visits, Metric::UniqueVisitors, Metric::Hits]
}

pub fn page_metrics() -> Vec<Metric> {
    let mut metrics = action_metrics();
    metrics.extend([
        Metric::TimeSpent,
        Metric::TimeGeneration,
        Metric::HitsWithTimeGeneration,
    ]);
    metrics
}

pub fn ecommerce_metrics() -> Vec<Metric> {
    vec![
        Metric::ItemRevenue,
        Metric::ItemQuantity,
        Metric::ItemPrice,
        Metric::Orders,
        Metric::Visits,
        Metric::Actions,
    ]
}

pub fn conversion_only_metrics() -> Vec<Metric> {
    vec![
        Metric::GoalConversions,
        Metric::GoalVisitsConverted,
        Metric::GoalRevenueSubtotal,
        Metric::GoalRevenueTax,
        Metric::GoalRevenueShipping,
        Metric::GoalItems,
    ]
}
