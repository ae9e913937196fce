//! Batch goal translation for one site: map every source goal, skip the ones
//! the target schema cannot hold, and keep going.

use std::collections::HashSet;

use harvest_core::site::{CapabilityLookup, SiteLookup};
use tracing::{debug, warn};

use crate::error::GoalSkipReason;
use crate::mapper::{extract_source_goal_id, map_goal};
use crate::model::{GoalSource, GoalTarget};

#[derive(Debug)]
pub struct SkippedGoal {
    pub goal_id: String,
    pub goal_name: String,
    pub reason: GoalSkipReason,
}

#[derive(Debug, Default)]
pub struct GoalImportOutcome {
    pub mapped: Vec<GoalTarget>,
    pub skipped: Vec<SkippedGoal>,
    /// Source ids found embedded in existing target goals and left alone.
    pub already_imported: Vec<String>,
}

/// Translate `goals` for one site. Goals whose source id is already embedded
/// in an existing target goal's description are not mapped again; goals the
/// schema cannot represent are reported and skipped, never fatal.
pub async fn map_site_goals(
    site_id: &str,
    goals: &[GoalSource],
    existing: &[GoalTarget],
    sites: &dyn SiteLookup,
    capabilities: &dyn CapabilityLookup,
) -> anyhow::Result<GoalImportOutcome> {
    let site_urls = sites.site_urls(site_id).await?;
    let funnels_available = capabilities.is_funnel_capability_available().await?;

    let known_ids: HashSet<String> = existing
        .iter()
        .filter_map(|goal| extract_source_goal_id(&goal.description))
        .collect();

    let mut outcome = GoalImportOutcome::default();
    for goal in goals {
        if known_ids.contains(&goal.id) {
            debug!(site = site_id, goal_id = %goal.id, "goal already imported, skipping");
            outcome.already_imported.push(goal.id.clone());
            continue;
        }

        match map_goal(goal, &site_urls, funnels_available) {
            Ok(target) => {
                debug!(site = site_id, goal_id = %goal.id, goal = %goal.name, "mapped goal");
                outcome.mapped.push(target);
            }
            Err(err) => {
                warn!(
                    site = site_id,
                    goal_id = %err.goal_id,
                    goal = %goal.name,
                    reason = %err.reason,
                    "goal cannot be represented, skipping"
                );
                outcome.skipped.push(SkippedGoal {
                    goal_id: err.goal_id,
                    goal_name: goal.name.clone(),
                    reason: err.reason,
                });
            }
        }
    }

    Ok(outcome)
}
