use thiserror::Error;

/// A goal the target schema cannot represent. Expected and non-fatal: the
/// goal is skipped, the reason surfaced, and the import run continues.
#[derive(Debug, Error)]
#[error("goal {goal_id} cannot be imported: {reason}")]
pub struct CannotImportGoal {
    pub goal_id: String,
    pub reason: GoalSkipReason,
}

/// The closed set of translation failure reasons.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoalSkipReason {
    #[error("uses multiple event conditions")]
    MultipleEventConditions,
    #[error("goals based on event value are not supported")]
    EventValueGoal,
    #[error("unknown match type '{0}'")]
    UnknownMatchType(String),
    #[error("unsupported comparison type '{0}'")]
    UnsupportedComparisonType(String),
    #[error("ordered destination steps require the funnel capability")]
    FunnelCapabilityMissing,
    #[error("unsupported goal type")]
    UnsupportedGoalType,
}
