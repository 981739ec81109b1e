use super::lookup::to_calendar_entries;
use crate::{
    error::SlotbookError,
    shared::{
        time_range::{parse_time_range, TimeRangeError},
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpResponse};
use slotbook_api_structs::get_events::*;
use slotbook_domain::{CalendarEntry, ID};
use slotbook_infra::SlotbookContext;

pub fn handle_time_range_error(e: TimeRangeError, ctx: &SlotbookContext) -> SlotbookError {
    match e {
        TimeRangeError::InvalidTimeFormat(e) => SlotbookError::InvalidTimeFormat(e.to_string()),
        TimeRangeError::InvalidRange(start_ts, end_ts) => SlotbookError::InvalidRange(format!(
            "The start: {} must not be after the end: {}",
            start_ts, end_ts
        )),
        TimeRangeError::TooLong => SlotbookError::BadClientData(format!(
            "The requested range is too long, the limit is {} days",
            ctx.config.event_query_duration_limit / (1000 * 60 * 60 * 24)
        )),
    }
}

fn handle_error(e: UseCaseErrors, ctx: &SlotbookContext) -> SlotbookError {
    match e {
        UseCaseErrors::InvalidTimeRange(e) => handle_time_range_error(e, ctx),
        UseCaseErrors::StorageError => SlotbookError::InternalError,
    }
}

pub async fn get_events_controller(
    path_params: web::Path<PathParams>,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<SlotbookContext>,
) -> Result<HttpResponse, SlotbookError> {
    let query = query_params.0;
    let usecase = GetEventsUseCase {
        owner_id: path_params.owner_id.clone(),
        start: query.start,
        end: query.end,
        timezone: query.timezone,
    };

    execute(usecase, &ctx)
        .await
        .map(|entries| HttpResponse::Ok().json(APIResponse::new(entries)))
        .map_err(|e| handle_error(e, &ctx))
}

/// The calendar of an owner within a window, with masters replaced by
/// their occurrences in that window
#[derive(Debug)]
pub struct GetEventsUseCase {
    pub owner_id: ID,
    pub start: String,
    pub end: String,
    pub timezone: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidTimeRange(TimeRangeError),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetEventsUseCase {
    type Response = Vec<CalendarEntry>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetEvents";

    async fn execute(&mut self, ctx: &SlotbookContext) -> Result<Self::Response, Self::Errors> {
        let timespan = parse_time_range(&self.start, &self.end, self.timezone.as_deref(), ctx)
            .map_err(UseCaseErrors::InvalidTimeRange)?;

        let events = ctx
            .repos
            .events
            .find_by_owner(&self.owner_id, &timespan)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        Ok(to_calendar_entries(events, &timespan))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::test_helpers::*;
    use chrono::Weekday;
    use slotbook_domain::{
        CalendarEvent, EventStatus, EventVisibility, RecurrenceFrequency, RecurrenceRule, WeekDay,
    };

    fn range(owner_id: &ID, start: &str, end: &str) -> GetEventsUseCase {
        GetEventsUseCase {
            owner_id: owner_id.clone(),
            start: start.into(),
            end: end.into(),
            timezone: Some("Asia/Manila".into()),
        }
    }

    #[actix_web::main]
    #[test]
    async fn weekly_master_is_expanded_and_merged_with_stored_events() {
        let ctx = SlotbookContext::create_inmemory();
        let owner_id = ID::default();
        let rule = RecurrenceRule {
            frequency: RecurrenceFrequency::Weekly,
            by_day: Some(vec![WeekDay::new(Weekday::Mon), WeekDay::new(Weekday::Wed)]),
            ..Default::default()
        };
        insert_event(
            &ctx,
            &owner_id,
            "2024-01-01T09:00",
            "2024-01-01T10:00",
            EventStatus::Scheduled,
            EventVisibility::Private,
            Some(rule),
        )
        .await;
        let standalone = insert_event(
            &ctx,
            &owner_id,
            "2024-01-02T13:00",
            "2024-01-02T14:00",
            EventStatus::Scheduled,
            EventVisibility::Private,
            None,
        )
        .await;
        // Another owner
        insert_event(
            &ctx,
            &ID::default(),
            "2024-01-02T13:00",
            "2024-01-02T14:00",
            EventStatus::Scheduled,
            EventVisibility::Private,
            None,
        )
        .await;

        let mut usecase = range(&owner_id, "2024-01-01T00:00", "2024-01-14T23:59");
        let entries = usecase.execute(&ctx).await.unwrap();

        let starts = entries.iter().map(|e| e.start_ts()).collect::<Vec<_>>();
        assert_eq!(
            starts,
            vec![
                ts("2024-01-01T09:00"),
                standalone.start_ts,
                ts("2024-01-03T09:00"),
                ts("2024-01-08T09:00"),
                ts("2024-01-10T09:00"),
            ]
        );
        assert_eq!(entries.iter().filter(|e| e.is_virtual()).count(), 4);
    }

    #[actix_web::main]
    #[test]
    async fn detached_instances_are_not_generated_twice() {
        let ctx = SlotbookContext::create_inmemory();
        let owner_id = ID::default();
        let master = insert_event(
            &ctx,
            &owner_id,
            "2024-01-01T09:00",
            "2024-01-01T10:00",
            EventStatus::Scheduled,
            EventVisibility::Private,
            Some(RecurrenceRule::default()),
        )
        .await;
        let position = ts("2024-01-02T09:00");
        let mut detached: CalendarEvent = master.detach_occurrence(position, 0);
        detached.start_ts = ts("2024-01-02T15:00");
        detached.end_ts = ts("2024-01-02T16:00");
        ctx.repos.events.insert(&detached).await.unwrap();
        ctx.repos.events.add_exdate(&master.id, position).await.unwrap();

        let mut usecase = range(&owner_id, "2024-01-01T00:00", "2024-01-03T23:59");
        let entries = usecase.execute(&ctx).await.unwrap();

        let starts = entries.iter().map(|e| e.start_ts()).collect::<Vec<_>>();
        assert_eq!(
            starts,
            vec![
                ts("2024-01-01T09:00"),
                ts("2024-01-02T15:00"),
                ts("2024-01-03T09:00"),
            ]
        );
    }

    #[actix_web::main]
    #[test]
    async fn master_starting_long_before_the_window_still_reaches_it() {
        let ctx = SlotbookContext::create_inmemory();
        let owner_id = ID::default();
        insert_event(
            &ctx,
            &owner_id,
            "2023-06-01T09:00",
            "2023-06-01T10:00",
            EventStatus::Scheduled,
            EventVisibility::Private,
            Some(RecurrenceRule::default()),
        )
        .await;

        let mut usecase = range(&owner_id, "2024-01-01T00:00", "2024-01-07T23:59");
        let entries = usecase.execute(&ctx).await.unwrap();
        assert_eq!(entries.len(), 7);
    }

    #[actix_web::main]
    #[test]
    async fn invalid_ranges() {
        let ctx = SlotbookContext::create_inmemory();
        let owner_id = ID::default();

        let mut usecase = range(&owner_id, "2024-01-07", "2024-01-01");
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::InvalidTimeRange(TimeRangeError::InvalidRange(_, _)))
        ));

        let mut usecase = range(&owner_id, "2024-01-01", "not a date");
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::InvalidTimeRange(TimeRangeError::InvalidTimeFormat(_)))
        ));
    }
}
