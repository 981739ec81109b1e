mod inmemory;
mod postgres;

use super::shared::repo::DeleteResult;
pub use inmemory::InMemoryEventRepo;
pub use postgres::PostgresEventRepo;
use slotbook_domain::{CalendarEvent, EventStatus, TimeSpan, ID};

#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    async fn insert(&self, e: &CalendarEvent) -> anyhow::Result<()>;
    /// Replaces the stored record with `e` only while its status and exdates
    /// are still the ones in `seen`, so that a concurrent claim is never undone.
    /// Returns false when the event is missing or either of them changed.
    async fn save_if_unchanged(
        &self,
        e: &CalendarEvent,
        seen: &CalendarEvent,
    ) -> anyhow::Result<bool>;
    async fn find(&self, event_id: &ID) -> Option<CalendarEvent>;
    /// Events of the owner that touch the timespan, plus every recurring master
    /// of the owner that starts no later than the end of the timespan since
    /// its occurrences might reach into it
    async fn find_by_owner(
        &self,
        owner_id: &ID,
        timespan: &TimeSpan,
    ) -> anyhow::Result<Vec<CalendarEvent>>;
    /// Same as `find_by_owner` but across all owners
    async fn find_by_timespan(&self, timespan: &TimeSpan) -> anyhow::Result<Vec<CalendarEvent>>;
    async fn find_by_parent(&self, parent_id: &ID) -> anyhow::Result<Vec<CalendarEvent>>;
    async fn delete(&self, event_id: &ID) -> Option<CalendarEvent>;
    async fn delete_by_parent(&self, parent_id: &ID) -> anyhow::Result<DeleteResult>;
    /// Sets the status to `to` only if it currently is `from`.
    /// Returns false when the event is missing or the status did not match.
    async fn transition_status(
        &self,
        event_id: &ID,
        from: EventStatus,
        to: EventStatus,
    ) -> anyhow::Result<bool>;
    /// Appends the timestamp to the exdates of the event unless it is already there.
    /// Returns false when the event is missing or the exdate was already recorded.
    async fn add_exdate(&self, event_id: &ID, exdate: i64) -> anyhow::Result<bool>;
    /// Drops the timestamp from the exdates of the event.
    /// Returns false when the event is missing or the exdate was not recorded.
    async fn remove_exdate(&self, event_id: &ID, exdate: i64) -> anyhow::Result<bool>;
}

/// Shared matching rule for range queries
pub(crate) fn is_in_timespan(e: &CalendarEvent, timespan: &TimeSpan) -> bool {
    timespan.touches(e.start_ts, e.end_ts)
        || (e.recurrence.is_some() && e.start_ts <= timespan.end())
}
