//! Named remote procedures of the hosted event platform.

mod client;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{DistributionRow, DistributionSummary, EventPlan, Item, Participant};

pub use client::HttpRpcClient;

#[async_trait]
pub trait EventPlanRpc: Send + Sync {
    /// Whether calls can succeed at all. The orchestrator skips event data
    /// entirely when this is false.
    fn is_available(&self) -> bool {
        true
    }

    /// Event with its items, participants and distribution. `None` when the
    /// platform knows no such event.
    async fn get_event_plan(&self, event_id: &str) -> Result<Option<EventPlan>>;

    /// Replace the whole item list of an event.
    async fn items_replace_for_event(&self, event_id: &str, items: &[Item]) -> Result<Vec<Item>>;

    async fn participants_bulk_upsert(
        &self,
        event_id: &str,
        participants: &[Participant],
    ) -> Result<Vec<Participant>>;

    async fn distribution_bulk_upsert(
        &self,
        event_id: &str,
        rows: &[DistributionRow],
    ) -> Result<Vec<DistributionRow>>;

    async fn get_distribution_summary(&self, event_id: &str) -> Result<DistributionSummary>;
}
