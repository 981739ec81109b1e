use super::{is_in_timespan, IEventRepo};
use crate::repos::shared::{inmemory_repo::*, repo::DeleteResult};
use slotbook_domain::{CalendarEvent, EventStatus, TimeSpan, ID};

pub struct InMemoryEventRepo {
    calendar_events: std::sync::Mutex<Vec<CalendarEvent>>,
}

impl InMemoryEventRepo {
    pub fn new() -> Self {
        Self {
            calendar_events: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn insert(&self, e: &CalendarEvent) -> anyhow::Result<()> {
        insert(e, &self.calendar_events);
        Ok(())
    }

    async fn save_if_unchanged(
        &self,
        e: &CalendarEvent,
        seen: &CalendarEvent,
    ) -> anyhow::Result<bool> {
        let saved = update_one(&e.id, &self.calendar_events, |event| {
            if event.status == seen.status && event.exdates == seen.exdates {
                *event = e.clone();
                true
            } else {
                false
            }
        });
        Ok(saved.unwrap_or(false))
    }

    async fn find(&self, event_id: &ID) -> Option<CalendarEvent> {
        find(event_id, &self.calendar_events)
    }

    async fn find_by_owner(
        &self,
        owner_id: &ID,
        timespan: &TimeSpan,
    ) -> anyhow::Result<Vec<CalendarEvent>> {
        let res = find_by(&self.calendar_events, |event| {
            event.owner_id == *owner_id && is_in_timespan(event, timespan)
        });
        Ok(res)
    }

    async fn find_by_timespan(&self, timespan: &TimeSpan) -> anyhow::Result<Vec<CalendarEvent>> {
        let res = find_by(&self.calendar_events, |event| is_in_timespan(event, timespan));
        Ok(res)
    }

    async fn find_by_parent(&self, parent_id: &ID) -> anyhow::Result<Vec<CalendarEvent>> {
        let res = find_by(&self.calendar_events, |event| {
            event.recurrence_parent_id.as_ref() == Some(parent_id)
        });
        Ok(res)
    }

    async fn delete(&self, event_id: &ID) -> Option<CalendarEvent> {
        delete(event_id, &self.calendar_events)
    }

    async fn delete_by_parent(&self, parent_id: &ID) -> anyhow::Result<DeleteResult> {
        let res = delete_by(&self.calendar_events, |event| {
            event.recurrence_parent_id.as_ref() == Some(parent_id)
        });
        Ok(res)
    }

    async fn transition_status(
        &self,
        event_id: &ID,
        from: EventStatus,
        to: EventStatus,
    ) -> anyhow::Result<bool> {
        let transitioned = update_one(event_id, &self.calendar_events, |event| {
            if event.status == from {
                event.status = to;
                true
            } else {
                false
            }
        });
        Ok(transitioned.unwrap_or(false))
    }

    async fn add_exdate(&self, event_id: &ID, exdate: i64) -> anyhow::Result<bool> {
        let added = update_one(event_id, &self.calendar_events, |event| {
            if event.exdates.contains(&exdate) {
                false
            } else {
                event.exdates.push(exdate);
                true
            }
        });
        Ok(added.unwrap_or(false))
    }

    async fn remove_exdate(&self, event_id: &ID, exdate: i64) -> anyhow::Result<bool> {
        let removed = update_one(event_id, &self.calendar_events, |event| {
            let before = event.exdates.len();
            event.exdates.retain(|ts| *ts != exdate);
            event.exdates.len() != before
        });
        Ok(removed.unwrap_or(false))
    }
}
