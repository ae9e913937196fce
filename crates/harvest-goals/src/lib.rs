//! Translation of external conversion-goal definitions into the target
//! platform's goal schema. Runs once per goal during configuration import,
//! independent of the per-day record pipeline.

pub mod error;
pub mod import;
pub mod mapper;
pub mod model;

pub use error::{CannotImportGoal, GoalSkipReason};
pub use import::{map_site_goals, GoalImportOutcome, SkippedGoal};
pub use mapper::{extract_source_goal_id, map_goal, map_manual_goal};
pub use model::{
    EventCondition, EventConditionKind, EventDetails, FunnelStep, FunnelStepSource, GoalSource,
    GoalTarget, GoalTrigger, MatchAttribute, PatternType, UrlDestinationDetails,
    VisitDurationDetails, VisitPagesDetails,
};
