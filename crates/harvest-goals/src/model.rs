//! Source and target goal schemas.

use serde::{Deserialize, Serialize};

/// A goal definition as the external analytics API reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSource {
    pub id: String,
    pub name: String,
    /// Monetary value assigned to the goal in the source, if any.
    pub value: Option<f64>,
    pub trigger: GoalTrigger,
}

/// The trigger kinds the source schema distinguishes. Exactly one per goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalTrigger {
    Event(EventDetails),
    UrlDestination(UrlDestinationDetails),
    VisitDuration(VisitDurationDetails),
    /// Pages-per-visit goals. The target schema has no counterpart, so these
    /// always fail translation.
    VisitPages(VisitPagesDetails),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetails {
    /// Source flag: use the tracked event's value as conversion revenue.
    pub use_event_value: bool,
    pub conditions: Vec<EventCondition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCondition {
    pub kind: EventConditionKind,
    pub match_type: String,
    pub expression: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventConditionKind {
    Category,
    Action,
    Label,
    Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlDestinationDetails {
    pub url: String,
    pub match_type: String,
    pub case_sensitive: bool,
    /// Whether the source marks the first funnel step as required.
    pub first_step_required: bool,
    pub steps: Vec<FunnelStepSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelStepSource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitDurationDetails {
    pub comparison_type: String,
    /// Seconds on site.
    pub comparison_value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitPagesDetails {
    pub comparison_type: String,
    pub comparison_value: i64,
}

/// A goal definition in the target platform's schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalTarget {
    pub name: String,
    /// Free text; always embeds the source goal id in the fixed
    /// `id = <id>)` format so it can be recovered later.
    pub description: String,
    pub match_attribute: MatchAttribute,
    pub pattern: String,
    pub pattern_type: PatternType,
    pub case_sensitive: bool,
    pub revenue: Option<f64>,
    pub allow_multiple_conversions: bool,
    pub use_event_value_as_revenue: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funnel: Option<Vec<FunnelStep>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchAttribute {
    EventCategory,
    EventAction,
    EventName,
    Url,
    VisitDuration,
    Manually,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Regex,
    Exact,
    Contains,
    GreaterThan,
    PathEquals,
    Manually,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelStep {
    pub name: String,
    pub pattern: String,
    pub pattern_type: PatternType,
    pub required: bool,
}
