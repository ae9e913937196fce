//! The goal decision tree: one external goal in, one target goal out, or a
//! classified refusal.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CannotImportGoal, GoalSkipReason};
use crate::model::{
    EventConditionKind, EventDetails, FunnelStep, GoalSource, GoalTarget, GoalTrigger,
    MatchAttribute, PatternType, UrlDestinationDetails, VisitDurationDetails,
};

/// Captures the source id out of a target description. The id is everything
/// between `id = ` and the next `)`.
static GOAL_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"id = ([^)]+)\)").expect("static pattern compiles"));

pub fn map_goal(
    goal: &GoalSource,
    site_urls: &[String],
    funnels_available: bool,
) -> Result<GoalTarget, CannotImportGoal> {
    match &goal.trigger {
        GoalTrigger::Event(details) => map_event_goal(goal, details),
        GoalTrigger::UrlDestination(details) => {
            map_url_destination_goal(goal, details, site_urls, funnels_available)
        }
        GoalTrigger::VisitDuration(details) => map_visit_duration_goal(goal, details),
        GoalTrigger::VisitPages(_) => Err(cannot_import(goal, GoalSkipReason::UnsupportedGoalType)),
    }
}

/// Goals with no automatic trigger: everything is the literal `manually`.
pub fn map_manual_goal(goal: &GoalSource) -> GoalTarget {
    GoalTarget {
        match_attribute: MatchAttribute::Manually,
        pattern: "manually".to_string(),
        pattern_type: PatternType::Manually,
        ..base_target(goal)
    }
}

/// Recover the original source goal id from a target description, or `None`
/// when the fixed format is absent or the captured id is blank.
pub fn extract_source_goal_id(description: &str) -> Option<String> {
    let captures = GOAL_ID_PATTERN.captures(description)?;
    let id = captures.get(1)?.as_str().trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

fn base_target(goal: &GoalSource) -> GoalTarget {
    GoalTarget {
        name: goal.name.clone(),
        description: format!(
            "(imported from external analytics, original id = {})",
            goal.id
        ),
        match_attribute: MatchAttribute::Manually,
        pattern: String::new(),
        pattern_type: PatternType::Contains,
        case_sensitive: false,
        revenue: goal.value,
        allow_multiple_conversions: false,
        use_event_value_as_revenue: false,
        funnel: None,
    }
}

fn map_event_goal(
    goal: &GoalSource,
    details: &EventDetails,
) -> Result<GoalTarget, CannotImportGoal> {
    if details.conditions.len() > 1 {
        return Err(cannot_import(goal, GoalSkipReason::MultipleEventConditions));
    }
    let Some(condition) = details.conditions.first() else {
        return Err(cannot_import(goal, GoalSkipReason::UnsupportedGoalType));
    };

    let match_attribute = match condition.kind {
        EventConditionKind::Category => MatchAttribute::EventCategory,
        EventConditionKind::Action => MatchAttribute::EventAction,
        EventConditionKind::Label => MatchAttribute::EventName,
        EventConditionKind::Value => {
            return Err(cannot_import(goal, GoalSkipReason::EventValueGoal));
        }
    };

    let (mut pattern_type, pattern) =
        map_match_type(goal, &condition.match_type, &condition.expression, &[])?;

    // The source never includes the hostname in event condition values, so
    // exact matching against a full URL can never fire. Fall back to contains.
    if pattern_type == PatternType::Exact {
        pattern_type = PatternType::Contains;
    }

    Ok(GoalTarget {
        match_attribute,
        pattern,
        pattern_type,
        use_event_value_as_revenue: details.use_event_value,
        ..base_target(goal)
    })
}

fn map_url_destination_goal(
    goal: &GoalSource,
    details: &UrlDestinationDetails,
    site_urls: &[String],
    funnels_available: bool,
) -> Result<GoalTarget, CannotImportGoal> {
    let (pattern_type, pattern) = map_match_type(goal, &details.match_type, &details.url, site_urls)?;

    let funnel = if details.steps.is_empty() {
        None
    } else if !funnels_available {
        return Err(cannot_import(goal, GoalSkipReason::FunnelCapabilityMissing));
    } else {
        Some(map_funnel_steps(details))
    };

    Ok(GoalTarget {
        match_attribute: MatchAttribute::Url,
        pattern,
        pattern_type,
        case_sensitive: details.case_sensitive,
        funnel,
        ..base_target(goal)
    })
}

fn map_visit_duration_goal(
    goal: &GoalSource,
    details: &VisitDurationDetails,
) -> Result<GoalTarget, CannotImportGoal> {
    if !details.comparison_type.eq_ignore_ascii_case("greater_than") {
        return Err(cannot_import(
            goal,
            GoalSkipReason::UnsupportedComparisonType(details.comparison_type.clone()),
        ));
    }

    Ok(GoalTarget {
        match_attribute: MatchAttribute::VisitDuration,
        pattern: details.comparison_value.to_string(),
        pattern_type: PatternType::GreaterThan,
        ..base_target(goal)
    })
}

fn map_match_type(
    goal: &GoalSource,
    match_type: &str,
    pattern: &str,
    site_urls: &[String],
) -> Result<(PatternType, String), CannotImportGoal> {
    match match_type.to_ascii_lowercase().as_str() {
        "regexp" => Ok((PatternType::Regex, pattern.to_string())),
        "head" | "begins_with" => Ok((
            PatternType::Regex,
            format!("^{}", regex::escape(pattern)),
        )),
        "exact" => Ok((PatternType::Exact, prefix_with_site_url(pattern, site_urls))),
        _ => Err(cannot_import(
            goal,
            GoalSkipReason::UnknownMatchType(match_type.to_string()),
        )),
    }
}

/// Exact URL patterns arrive without a hostname; anchor them to the site's
/// first known URL unless a known prefix is already present. A `/` separator
/// is inserted only when neither side supplies one.
fn prefix_with_site_url(pattern: &str, site_urls: &[String]) -> String {
    if site_urls.iter().any(|url| pattern.starts_with(url.as_str())) {
        return pattern.to_string();
    }
    let Some(base) = site_urls.first() else {
        return pattern.to_string();
    };
    if base.ends_with('/') || pattern.starts_with('/') {
        format!("{base}{pattern}")
    } else {
        format!("{base}/{pattern}")
    }
}

fn map_funnel_steps(details: &UrlDestinationDetails) -> Vec<FunnelStep> {
    let mut steps: Vec<FunnelStep> = details
        .steps
        .iter()
        .map(|step| FunnelStep {
            name: step.name.clone(),
            pattern: step.url.clone(),
            pattern_type: PatternType::PathEquals,
            required: false,
        })
        .collect();

    if details.first_step_required {
        if let Some(first) = steps.first_mut() {
            first.required = true;
        }
    }

    steps
}

fn cannot_import(goal: &GoalSource, reason: GoalSkipReason) -> CannotImportGoal {
    CannotImportGoal {
        goal_id: goal.id.clone(),
        reason,
    }
}
