//! Site and capability lookups consumed by the importers and the goal
//! translator. Both live in the host platform; the engine only reads.

use async_trait::async_trait;

#[async_trait]
pub trait SiteLookup: Send + Sync + 'static {
    /// Known URLs for a site, ordered; the first entry is the canonical one.
    /// Never empty for a configured site.
    async fn site_urls(&self, site_id: &str) -> anyhow::Result<Vec<String>>;

    async fn is_ecommerce_enabled(&self, site_id: &str) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait CapabilityLookup: Send + Sync + 'static {
    /// Whether the target environment supports ordered multi-step goal
    /// definitions.
    async fn is_funnel_capability_available(&self) -> anyhow::Result<bool>;
}
