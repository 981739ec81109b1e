use super::{
    lookup::{find_owned_event, find_series_master, ResolvedEvent},
    release_occurrence, validate_color, validate_title,
};
use crate::{
    error::SlotbookError,
    shared::{
        guard::Guard,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpResponse};
use slotbook_api_structs::update_event::*;
use slotbook_domain::{
    date::{parse_datetime, parse_timezone},
    Actor, CalendarEvent, EditMode, EventRef, EventStatus, EventVisibility,
    InvalidRecurrenceRuleError, InvalidTimeFormatError, RecurrenceRule, ID,
};
use slotbook_infra::SlotbookContext;

fn handle_error(e: UseCaseErrors) -> SlotbookError {
    match e {
        UseCaseErrors::NotFound(event_ref) => SlotbookError::NotFound(format!(
            "The calendar event with id: {}, was not found.",
            event_ref
        )),
        UseCaseErrors::InvalidTimeFormat(e) => SlotbookError::InvalidTimeFormat(e.to_string()),
        UseCaseErrors::InvalidRange(start_ts, end_ts) => SlotbookError::InvalidRange(format!(
            "The start: {} must be before the end: {}",
            start_ts, end_ts
        )),
        UseCaseErrors::InvalidRecurrenceRule(e) => SlotbookError::BadClientData(format!(
            "Invalid recurrence rule specified for the event. {}",
            e
        )),
        UseCaseErrors::Validation(msg) => SlotbookError::BadClientData(msg),
        UseCaseErrors::Conflict(msg) => SlotbookError::Conflict(msg),
        UseCaseErrors::StorageError => SlotbookError::InternalError,
    }
}

pub async fn update_event_controller(
    body: web::Json<RequestBody>,
    path_params: web::Path<PathParams>,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<SlotbookContext>,
) -> Result<HttpResponse, SlotbookError> {
    let event_ref = Guard::against_malformed_event_ref(&path_params.event_id)?;

    let body = body.0;
    let usecase = UpdateEventUseCase {
        owner_id: path_params.owner_id.clone(),
        event_ref,
        mode: query_params.mode,
        changes: EventChanges {
            title: body.title,
            agenda: body.agenda,
            notes: body.notes,
            start_datetime: body.start_datetime,
            end_datetime: body.end_datetime,
            timezone: body.timezone,
            status: body.status,
            visibility: body.visibility,
            recurrence: body.recurrence_rule,
            color: body.color,
        },
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(APIResponse::new(event)))
        .map_err(handle_error)
}

#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub title: Option<String>,
    pub agenda: Option<String>,
    pub notes: Option<String>,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    pub timezone: Option<String>,
    pub status: Option<EventStatus>,
    pub visibility: Option<EventVisibility>,
    /// `Some(None)` removes the rule
    pub recurrence: Option<Option<RecurrenceRule>>,
    pub color: Option<String>,
}

/// Updates one event or a whole series.
///
/// With `EditMode::Single` a generated occurrence is detached from its master
/// into its own record, while stored events are changed in place. With
/// `EditMode::Series` the master of the addressed event is changed and
/// already detached instances are left alone.
#[derive(Debug)]
pub struct UpdateEventUseCase {
    pub owner_id: ID,
    pub event_ref: EventRef,
    pub mode: EditMode,
    pub changes: EventChanges,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(EventRef),
    InvalidTimeFormat(InvalidTimeFormatError),
    InvalidRange(i64, i64),
    InvalidRecurrenceRule(InvalidRecurrenceRuleError),
    Validation(String),
    Conflict(String),
    StorageError,
}

impl UpdateEventUseCase {
    fn apply_changes(&self, e: &mut CalendarEvent, now: i64) -> Result<(), UseCaseErrors> {
        let changes = &self.changes;

        if let Some(title) = &changes.title {
            validate_title(title).map_err(UseCaseErrors::Validation)?;
            e.title = title.trim().to_string();
        }
        if let Some(color) = &changes.color {
            validate_color(color).map_err(UseCaseErrors::Validation)?;
            e.color = Some(color.clone());
        }
        if let Some(agenda) = &changes.agenda {
            e.agenda = Some(agenda.clone());
        }
        if let Some(notes) = &changes.notes {
            e.notes = Some(notes.clone());
        }
        if let Some(visibility) = changes.visibility {
            e.visibility = visibility;
        }
        if let Some(status) = changes.status {
            // Owners are allowed every transition
            e.set_status(status, Actor::Owner)
                .map_err(|err| UseCaseErrors::Validation(err.to_string()))?;
        }

        // Datetimes are read in the timezone the event ends up with
        let (previous_start_ts, previous_tz) = (e.start_ts, e.timezone);
        if let Some(timezone) = &changes.timezone {
            e.timezone = parse_timezone(timezone).map_err(UseCaseErrors::InvalidTimeFormat)?;
        }
        if let Some(start) = &changes.start_datetime {
            e.start_ts =
                parse_datetime(start, &e.timezone).map_err(UseCaseErrors::InvalidTimeFormat)?;
        }
        if let Some(end) = &changes.end_datetime {
            e.end_ts = parse_datetime(end, &e.timezone).map_err(UseCaseErrors::InvalidTimeFormat)?;
        }
        if e.start_ts >= e.end_ts {
            return Err(UseCaseErrors::InvalidRange(e.start_ts, e.end_ts));
        }
        // Detached and removed positions stay suppressed after a move
        e.shift_exdates(previous_start_ts, &previous_tz);

        match &changes.recurrence {
            Some(Some(_)) if e.is_detached() => {
                return Err(UseCaseErrors::Validation(
                    "A detached occurrence can not have its own recurrence rule".into(),
                ))
            }
            Some(rule) => e.recurrence = rule.clone(),
            None => (),
        }
        if let Some(rule) = &e.recurrence {
            rule.validate(&e.timezone)
                .map_err(UseCaseErrors::InvalidRecurrenceRule)?;
        }

        e.updated = now;
        Ok(())
    }

    /// Saves only if no booking claimed the event or one of its occurrences
    /// since it was read
    async fn save_changes(
        &self,
        seen: CalendarEvent,
        now: i64,
        ctx: &SlotbookContext,
    ) -> Result<CalendarEvent, UseCaseErrors> {
        let mut e = seen.clone();
        self.apply_changes(&mut e, now)?;
        let saved = ctx
            .repos
            .events
            .save_if_unchanged(&e, &seen)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        if !saved {
            return Err(UseCaseErrors::Conflict(format!(
                "The calendar event with id: {}, was changed while updating it. Please retry.",
                e.id
            )));
        }
        Ok(e)
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateEventUseCase {
    type Response = CalendarEvent;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "UpdateEvent";

    async fn execute(&mut self, ctx: &SlotbookContext) -> Result<Self::Response, Self::Errors> {
        let resolved = find_owned_event(&self.owner_id, &self.event_ref, ctx)
            .await
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_ref.clone()))?;
        let now = ctx.sys.get_timestamp_millis();

        match (self.mode, resolved) {
            (EditMode::Single, ResolvedEvent::Occurrence { master, instance }) => {
                let mut detached = master.detach_occurrence(instance.start_ts, now);
                self.apply_changes(&mut detached, now)?;

                // Stop generating this position before the detached record exists
                let claimed = ctx
                    .repos
                    .events
                    .add_exdate(&master.id, instance.start_ts)
                    .await
                    .map_err(|_| UseCaseErrors::StorageError)?;
                if !claimed {
                    // Someone else detached or removed it in the meantime
                    return Err(UseCaseErrors::NotFound(self.event_ref.clone()));
                }

                if ctx.repos.events.insert(&detached).await.is_err() {
                    release_occurrence(&master.id, instance.start_ts, ctx).await;
                    return Err(UseCaseErrors::StorageError);
                }
                Ok(detached)
            }
            (EditMode::Single, ResolvedEvent::Stored(e)) => self.save_changes(e, now, ctx).await,
            (EditMode::Series, resolved) => {
                let master = find_series_master(resolved, ctx)
                    .await
                    .ok_or_else(|| UseCaseErrors::NotFound(self.event_ref.clone()))?;
                self.save_changes(master, now, ctx).await
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::{
        delete_event::DeleteEventUseCase, get_events::GetEventsUseCase, test_helpers::*,
    };
    use slotbook_domain::{CalendarEntry, OccurrenceId, TimeSpan};

    async fn setup_master(ctx: &SlotbookContext, owner_id: &ID) -> CalendarEvent {
        insert_event(
            ctx,
            owner_id,
            "2024-01-01T09:00",
            "2024-01-01T10:00",
            EventStatus::Scheduled,
            EventVisibility::Private,
            Some(RecurrenceRule::default()),
        )
        .await
    }

    fn occurrence(master: &CalendarEvent, start: &str) -> EventRef {
        EventRef::Occurrence(OccurrenceId::new(master.id.clone(), ts(start)))
    }

    #[actix_web::main]
    #[test]
    async fn update_nonexisting_event() {
        let ctx = SlotbookContext::create_inmemory();
        let mut usecase = UpdateEventUseCase {
            owner_id: Default::default(),
            event_ref: EventRef::Stored(Default::default()),
            mode: EditMode::Single,
            changes: EventChanges {
                title: Some("Renamed".into()),
                ..Default::default()
            },
        };
        let res = usecase.execute(&ctx).await;
        assert!(matches!(res, Err(UseCaseErrors::NotFound(_))));
    }

    #[actix_web::main]
    #[test]
    async fn single_edit_of_an_occurrence_detaches_it() {
        let ctx = SlotbookContext::create_inmemory();
        let owner_id = ID::default();
        let master = setup_master(&ctx, &owner_id).await;

        let mut usecase = UpdateEventUseCase {
            owner_id: owner_id.clone(),
            event_ref: occurrence(&master, "2024-01-03T09:00"),
            mode: EditMode::Single,
            changes: EventChanges {
                title: Some("Moved standup".into()),
                start_datetime: Some("2024-01-03T15:00".into()),
                end_datetime: Some("2024-01-03T16:00".into()),
                ..Default::default()
            },
        };
        let detached = usecase.execute(&ctx).await.unwrap();

        assert_ne!(detached.id, master.id);
        assert_eq!(detached.recurrence_parent_id, Some(master.id.clone()));
        assert!(detached.recurrence.is_none());
        assert_eq!(detached.start_ts, ts("2024-01-03T15:00"));
        assert_eq!(detached.title, "Moved standup");

        let master = ctx.repos.events.find(&master.id).await.unwrap();
        assert_eq!(master.title, "Session");
        assert_eq!(master.exdates, vec![ts("2024-01-03T09:00")]);

        let span = TimeSpan::new(ts("2024-01-03T00:00"), ts("2024-01-03T23:59"));
        assert!(master.expand(&span).is_empty());

        // The same occurrence can not be detached twice
        let mut usecase = UpdateEventUseCase {
            owner_id,
            event_ref: occurrence(&master, "2024-01-03T09:00"),
            mode: EditMode::Single,
            changes: Default::default(),
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::NotFound(_))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn single_edit_of_a_detached_instance_keeps_lineage() {
        let ctx = SlotbookContext::create_inmemory();
        let owner_id = ID::default();
        let master = setup_master(&ctx, &owner_id).await;

        let mut usecase = UpdateEventUseCase {
            owner_id: owner_id.clone(),
            event_ref: occurrence(&master, "2024-01-03T09:00"),
            mode: EditMode::Single,
            changes: EventChanges {
                title: Some("First".into()),
                ..Default::default()
            },
        };
        let detached = usecase.execute(&ctx).await.unwrap();

        let mut usecase = UpdateEventUseCase {
            owner_id: owner_id.clone(),
            event_ref: EventRef::Stored(detached.id.clone()),
            mode: EditMode::Single,
            changes: EventChanges {
                title: Some("Second".into()),
                ..Default::default()
            },
        };
        let updated = usecase.execute(&ctx).await.unwrap();
        assert_eq!(updated.id, detached.id);
        assert_eq!(updated.title, "Second");
        assert_eq!(updated.recurrence_parent_id, Some(master.id.clone()));
        assert_eq!(
            ctx.repos.events.find_by_parent(&master.id).await.unwrap().len(),
            1
        );

        let mut usecase = UpdateEventUseCase {
            owner_id,
            event_ref: EventRef::Stored(detached.id.clone()),
            mode: EditMode::Single,
            changes: EventChanges {
                recurrence: Some(Some(RecurrenceRule::default())),
                ..Default::default()
            },
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::Validation(_))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn series_edit_changes_the_master_only() {
        let ctx = SlotbookContext::create_inmemory();
        let owner_id = ID::default();
        let master = setup_master(&ctx, &owner_id).await;

        let mut usecase = UpdateEventUseCase {
            owner_id: owner_id.clone(),
            event_ref: occurrence(&master, "2024-01-03T09:00"),
            mode: EditMode::Single,
            changes: EventChanges {
                title: Some("Detached".into()),
                ..Default::default()
            },
        };
        let detached = usecase.execute(&ctx).await.unwrap();

        // Series edit addressed through the detached instance
        let mut usecase = UpdateEventUseCase {
            owner_id: owner_id.clone(),
            event_ref: EventRef::Stored(detached.id.clone()),
            mode: EditMode::Series,
            changes: EventChanges {
                title: Some("Renamed series".into()),
                ..Default::default()
            },
        };
        let updated = usecase.execute(&ctx).await.unwrap();
        assert_eq!(updated.id, master.id);
        assert_eq!(updated.title, "Renamed series");
        assert_eq!(updated.exdates, vec![ts("2024-01-03T09:00")]);

        let detached = ctx.repos.events.find(&detached.id).await.unwrap();
        assert_eq!(detached.title, "Detached");
    }

    #[actix_web::main]
    #[test]
    async fn invalid_changes_are_rejected() {
        let ctx = SlotbookContext::create_inmemory();
        let owner_id = ID::default();
        let master = setup_master(&ctx, &owner_id).await;

        let cases = vec![
            (
                EventChanges {
                    end_datetime: Some("2024-01-01T08:00".into()),
                    ..Default::default()
                },
                "range",
            ),
            (
                EventChanges {
                    start_datetime: Some("2024-13-01T08:00".into()),
                    ..Default::default()
                },
                "format",
            ),
            (
                EventChanges {
                    timezone: Some("Not/AZone".into()),
                    ..Default::default()
                },
                "format",
            ),
        ];
        for (changes, kind) in cases {
            let mut usecase = UpdateEventUseCase {
                owner_id: owner_id.clone(),
                event_ref: EventRef::Stored(master.id.clone()),
                mode: EditMode::Series,
                changes,
            };
            let res = usecase.execute(&ctx).await;
            match kind {
                "range" => assert!(matches!(res, Err(UseCaseErrors::InvalidRange(_, _)))),
                _ => assert!(matches!(res, Err(UseCaseErrors::InvalidTimeFormat(_)))),
            }
        }

        // Nothing was saved
        let stored = ctx.repos.events.find(&master.id).await.unwrap();
        assert_eq!(stored.start_ts, master.start_ts);
        assert_eq!(stored.end_ts, master.end_ts);
    }

    #[actix_web::main]
    #[test]
    async fn removing_the_rule_turns_a_master_into_a_standalone_event() {
        let ctx = SlotbookContext::create_inmemory();
        let owner_id = ID::default();
        let master = setup_master(&ctx, &owner_id).await;

        let mut usecase = UpdateEventUseCase {
            owner_id,
            event_ref: EventRef::Stored(master.id.clone()),
            mode: EditMode::Series,
            changes: EventChanges {
                recurrence: Some(None),
                status: Some(EventStatus::Cancelled),
                ..Default::default()
            },
        };
        let updated = usecase.execute(&ctx).await.unwrap();
        assert!(updated.recurrence.is_none());
        assert!(!updated.is_master());
        assert_eq!(updated.status, EventStatus::Cancelled);
    }

    #[actix_web::main]
    #[test]
    async fn moving_the_series_keeps_detached_and_deleted_positions_empty() {
        let ctx = SlotbookContext::create_inmemory();
        let owner_id = ID::default();
        let master = setup_master(&ctx, &owner_id).await;

        let mut usecase = UpdateEventUseCase {
            owner_id: owner_id.clone(),
            event_ref: occurrence(&master, "2024-01-03T09:00"),
            mode: EditMode::Single,
            changes: EventChanges {
                title: Some("Detached".into()),
                ..Default::default()
            },
        };
        let detached = usecase.execute(&ctx).await.unwrap();
        let mut usecase = DeleteEventUseCase {
            owner_id: owner_id.clone(),
            event_ref: occurrence(&master, "2024-01-04T09:00"),
            mode: EditMode::Single,
        };
        usecase.execute(&ctx).await.unwrap();

        let mut usecase = UpdateEventUseCase {
            owner_id: owner_id.clone(),
            event_ref: EventRef::Stored(master.id.clone()),
            mode: EditMode::Series,
            changes: EventChanges {
                start_datetime: Some("2024-01-01T10:00".into()),
                end_datetime: Some("2024-01-01T11:00".into()),
                ..Default::default()
            },
        };
        let moved = usecase.execute(&ctx).await.unwrap();
        assert_eq!(
            moved.exdates,
            vec![ts("2024-01-03T10:00"), ts("2024-01-04T10:00")]
        );

        let mut usecase = GetEventsUseCase {
            owner_id,
            start: "2024-01-03T00:00".into(),
            end: "2024-01-04T23:59".into(),
            timezone: Some("Asia/Manila".into()),
        };
        let entries = usecase.execute(&ctx).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(matches!(&entries[0], CalendarEntry::Stored(e) if e.id == detached.id));

        // Other days follow the move
        let span = TimeSpan::new(ts("2024-01-05T00:00"), ts("2024-01-05T23:59"));
        let instances = moved.expand(&span);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].start_ts, ts("2024-01-05T10:00"));
    }

    #[actix_web::main]
    #[test]
    async fn stale_update_does_not_undo_a_booking_claim() {
        let ctx = SlotbookContext::create_inmemory();
        let owner_id = ID::default();
        let slot = insert_event(
            &ctx,
            &owner_id,
            "2024-02-01T10:00",
            "2024-02-01T11:00",
            EventStatus::OpenSlot,
            EventVisibility::PublicOpen,
            None,
        )
        .await;

        let usecase = UpdateEventUseCase {
            owner_id,
            event_ref: EventRef::Stored(slot.id.clone()),
            mode: EditMode::Single,
            changes: EventChanges {
                title: Some("Renamed".into()),
                ..Default::default()
            },
        };
        // The booking lands between the read and the write
        let stale = ctx.repos.events.find(&slot.id).await.unwrap();
        ctx.repos
            .events
            .transition_status(&slot.id, EventStatus::OpenSlot, EventStatus::Scheduled)
            .await
            .unwrap();
        let res = usecase.save_changes(stale, 1, &ctx).await;
        assert!(matches!(res, Err(UseCaseErrors::Conflict(_))));

        let stored = ctx.repos.events.find(&slot.id).await.unwrap();
        assert_eq!(stored.status, EventStatus::Scheduled);
        assert_eq!(stored.title, "Session");
    }

    #[actix_web::main]
    #[test]
    async fn failed_detach_gives_the_occurrence_back() {
        let mut ctx = SlotbookContext::create_inmemory();
        let owner_id = ID::default();
        let master = setup_master(&ctx, &owner_id).await;
        fail_event_inserts(&mut ctx);

        let mut usecase = UpdateEventUseCase {
            owner_id,
            event_ref: occurrence(&master, "2024-01-03T09:00"),
            mode: EditMode::Single,
            changes: EventChanges {
                title: Some("Moved".into()),
                ..Default::default()
            },
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::StorageError)
        ));

        let master = ctx.repos.events.find(&master.id).await.unwrap();
        assert!(master.exdates.is_empty());
        assert!(master.has_occurrence_at(ts("2024-01-03T09:00")));
    }
}
