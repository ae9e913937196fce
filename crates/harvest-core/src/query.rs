//! External query service abstraction.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::metrics::Metric;
use crate::record::QueryRow;

/// One day's worth of external analytics data, one request at a time.
///
/// Implementations own pagination, quota handling, and backoff; callers see
/// the complete flat result set or an error. A day with no matching rows is
/// `Ok` with an empty vec — never an error, so importers can tell "nothing
/// tracked" apart from "could not ask".
#[async_trait]
pub trait QueryService: Send + Sync + 'static {
    async fn query(
        &self,
        day: NaiveDate,
        dimensions: &[&str],
        metrics: &[Metric],
    ) -> anyhow::Result<Vec<QueryRow>>;
}
