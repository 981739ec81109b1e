use super::validate_booking::{
    to_bookable_slot, validate_booking, BookableSlot, SlotConflict, ValidateBookingError,
};
use crate::{
    error::SlotbookError,
    event::{
        convert_open_slot::{self, ConvertOpenSlotToScheduledUseCase},
        lookup::find_event,
        release_occurrence,
    },
    shared::usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpResponse};
use slotbook_api_structs::create_booking::*;
use slotbook_domain::{
    date::parse_timezone, is_valid_email, normalize_email, BookingRequest, BookingStatus,
    Contact, EventRef, EventStatus, Notification,
};
use slotbook_infra::SlotbookContext;
use tracing::{error, info};

const NAME_MAX_LENGTH: usize = 255;

fn handle_error(e: UseCaseErrors) -> SlotbookError {
    match e {
        UseCaseErrors::Validation(msg) => SlotbookError::BadClientData(msg),
        UseCaseErrors::NotFound(event_ref) => SlotbookError::NotFound(format!(
            "The calendar event with id: {}, was not found.",
            event_ref
        )),
        UseCaseErrors::Conflict(msg) => SlotbookError::Conflict(msg),
        UseCaseErrors::StorageError => SlotbookError::InternalError,
    }
}

pub async fn create_booking_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<SlotbookContext>,
) -> Result<HttpResponse, SlotbookError> {
    let body = body.0;
    // An id that can not be parsed can not address a slot
    let event_ref = body.calendar_event_id.parse::<EventRef>().map_err(|_| {
        SlotbookError::NotFound(format!(
            "The calendar event with id: {}, was not found.",
            body.calendar_event_id
        ))
    })?;

    let usecase = CreateBookingUseCase {
        event_ref,
        name: body.name,
        email: body.email,
        message: body.message,
        timezone: body.timezone,
    };

    execute(usecase, &ctx)
        .await
        .map(|booking| HttpResponse::Created().json(APIResponse::new(booking)))
        .map_err(handle_error)
}

/// Books an open slot for a member of the public.
///
/// The slot is claimed with a conditional status change, so when several
/// bookings race for the same slot only one of them is confirmed and the
/// others end in a conflict.
#[derive(Debug)]
pub struct CreateBookingUseCase {
    pub event_ref: EventRef,
    pub name: String,
    pub email: String,
    pub message: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    Validation(String),
    NotFound(EventRef),
    Conflict(String),
    StorageError,
}

impl From<ValidateBookingError> for UseCaseErrors {
    fn from(e: ValidateBookingError) -> Self {
        match e {
            ValidateBookingError::Conflict(conflict) => Self::Conflict(conflict.to_string()),
            ValidateBookingError::StorageError => Self::StorageError,
        }
    }
}

impl CreateBookingUseCase {
    fn validate_shape(&self) -> Result<(), UseCaseErrors> {
        let name_length = self.name.trim().chars().count();
        if name_length == 0 || name_length > NAME_MAX_LENGTH {
            return Err(UseCaseErrors::Validation(format!(
                "Name must be between 1 and {} characters",
                NAME_MAX_LENGTH
            )));
        }
        if !is_valid_email(&self.email) {
            return Err(UseCaseErrors::Validation(format!(
                "Invalid email: {}",
                self.email
            )));
        }
        if let Some(timezone) = &self.timezone {
            parse_timezone(timezone).map_err(|e| UseCaseErrors::Validation(e.to_string()))?;
        }
        Ok(())
    }

    async fn upsert_contact(&self, now: i64, ctx: &SlotbookContext) -> Result<(), UseCaseErrors> {
        let email = normalize_email(&self.email);
        if ctx.repos.contacts.find_by_email(&email).await.is_some() {
            return Ok(());
        }
        let contact = Contact::new(self.name.trim().to_string(), email, now);
        ctx.repos
            .contacts
            .insert(&contact)
            .await
            .map_err(|_| UseCaseErrors::StorageError)
    }

    /// Persists the detached record of a booked occurrence. The exdate is
    /// the claim on the position, only one booking can add it.
    async fn materialize(
        &self,
        slot: &BookableSlot,
        ctx: &SlotbookContext,
    ) -> Result<(), UseCaseErrors> {
        if let BookableSlot::Occurrence { master, detached } = slot {
            let claimed = ctx
                .repos
                .events
                .add_exdate(&master.id, detached.start_ts)
                .await
                .map_err(|_| UseCaseErrors::StorageError)?;
            if !claimed {
                return Err(UseCaseErrors::Conflict(
                    "The slot was booked by someone else".into(),
                ));
            }
            if ctx.repos.events.insert(detached).await.is_err() {
                release_occurrence(&master.id, detached.start_ts, ctx).await;
                return Err(UseCaseErrors::StorageError);
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateBookingUseCase {
    type Response = BookingRequest;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "CreateBooking";

    async fn execute(&mut self, ctx: &SlotbookContext) -> Result<Self::Response, Self::Errors> {
        self.validate_shape()?;
        let now = ctx.sys.get_timestamp_millis();

        let resolved = find_event(&self.event_ref, ctx)
            .await
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_ref.clone()))?;
        let slot = to_bookable_slot(resolved, now)
            .map_err(|conflict| UseCaseErrors::Conflict(conflict.to_string()))?;
        validate_booking(slot.event(), ctx).await?;

        self.upsert_contact(now, ctx).await?;
        self.materialize(&slot, ctx).await?;

        let slot_id = slot.event().id.clone();
        let convert = ConvertOpenSlotToScheduledUseCase {
            owner_id: slot.event().owner_id.clone(),
            event_id: slot_id.clone(),
        };
        execute(convert, ctx).await.map_err(|e| match e {
            convert_open_slot::UseCaseErrors::NotFound(_)
            | convert_open_slot::UseCaseErrors::InvalidState(_) => UseCaseErrors::Conflict(
                SlotConflict::NotOpen(EventStatus::Scheduled).to_string(),
            ),
            convert_open_slot::UseCaseErrors::StorageError => UseCaseErrors::StorageError,
        })?;

        let booking = BookingRequest {
            id: Default::default(),
            event_id: slot_id.clone(),
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            message: self.message.clone(),
            timezone_at_booking: self.timezone.clone(),
            status: BookingStatus::Confirmed,
            created: now,
        };
        if ctx.repos.booking_requests.insert(&booking).await.is_err() {
            // Give the slot back, the booking never happened
            match ctx
                .repos
                .events
                .transition_status(&slot_id, EventStatus::Scheduled, EventStatus::OpenSlot)
                .await
            {
                Ok(true) => info!("Reopened slot: {} after a failed booking", slot_id),
                _ => error!("Unable to reopen slot: {} after a failed booking", slot_id),
            }
            return Err(UseCaseErrors::StorageError);
        }

        Ok(booking)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(CreateNotificationOnBookingCreated)]
    }
}

pub struct CreateNotificationOnBookingCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateBookingUseCase> for CreateNotificationOnBookingCreated {
    async fn notify(&self, booking: &BookingRequest, ctx: &SlotbookContext) {
        let notification = Notification::booking_request(booking.id.clone(), booking.created);

        // The booking stays confirmed without its notification
        if let Err(e) = ctx.repos.notifications.insert(&notification).await {
            error!(
                "Unable to create notification for booking: {}. Error: {:?}",
                booking.id, e
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::test_helpers::*;
    use slotbook_domain::{
        CalendarEvent, EventVisibility, OccurrenceId, RecurrenceRule, ID,
    };

    fn build_usecase(event_ref: EventRef) -> CreateBookingUseCase {
        CreateBookingUseCase {
            event_ref,
            name: "Ana Reyes".into(),
            email: "Ana@Example.com".into(),
            message: Some("See you there".into()),
            timezone: Some("Asia/Manila".into()),
        }
    }

    async fn open_slot(ctx: &SlotbookContext, recurrence: Option<RecurrenceRule>) -> CalendarEvent {
        insert_event(
            ctx,
            &ID::default(),
            "2024-02-01T10:00",
            "2024-02-01T11:00",
            EventStatus::OpenSlot,
            EventVisibility::PublicOpen,
            recurrence,
        )
        .await
    }

    #[actix_web::main]
    #[test]
    async fn books_an_open_slot() {
        let ctx = SlotbookContext::create_inmemory();
        let slot = open_slot(&ctx, None).await;

        let booking = execute(build_usecase(EventRef::Stored(slot.id.clone())), &ctx)
            .await
            .unwrap();
        assert_eq!(booking.event_id, slot.id);
        assert_eq!(booking.email, "ana@example.com");
        assert_eq!(booking.status, BookingStatus::Confirmed);

        let slot = ctx.repos.events.find(&slot.id).await.unwrap();
        assert_eq!(slot.status, EventStatus::Scheduled);
        assert!(ctx.repos.contacts.find_by_email("ana@example.com").await.is_some());
        assert_eq!(
            ctx.repos.booking_requests.find_by_event(&slot.id).await.unwrap().len(),
            1
        );

        let notifications = ctx.repos.notifications.find_unread().await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].related_id, booking.id);
    }

    #[actix_web::main]
    #[test]
    async fn second_booking_of_the_same_slot_conflicts() {
        let ctx = SlotbookContext::create_inmemory();
        let slot = open_slot(&ctx, None).await;

        assert!(execute(build_usecase(EventRef::Stored(slot.id.clone())), &ctx)
            .await
            .is_ok());
        let mut second = build_usecase(EventRef::Stored(slot.id.clone()));
        second.email = "ben@example.com".into();
        assert!(matches!(
            execute(second, &ctx).await,
            Err(UseCaseErrors::Conflict(_))
        ));
        assert_eq!(
            ctx.repos.booking_requests.find_by_event(&slot.id).await.unwrap().len(),
            1
        );
    }

    #[actix_web::main]
    #[test]
    async fn overlapping_private_event_conflicts() {
        let ctx = SlotbookContext::create_inmemory();
        let slot = open_slot(&ctx, None).await;
        insert_event(
            &ctx,
            &slot.owner_id,
            "2024-02-01T10:30",
            "2024-02-01T12:00",
            EventStatus::Scheduled,
            EventVisibility::Private,
            None,
        )
        .await;

        let res = execute(build_usecase(EventRef::Stored(slot.id.clone())), &ctx).await;
        assert!(matches!(res, Err(UseCaseErrors::Conflict(_))));

        let slot = ctx.repos.events.find(&slot.id).await.unwrap();
        assert_eq!(slot.status, EventStatus::OpenSlot);
        assert!(ctx.repos.contacts.find_by_email("ana@example.com").await.is_none());
    }

    #[actix_web::main]
    #[test]
    async fn booking_an_occurrence_detaches_it() {
        let ctx = SlotbookContext::create_inmemory();
        let master = open_slot(&ctx, Some(RecurrenceRule::default())).await;
        let occurrence = EventRef::Occurrence(OccurrenceId::new(
            master.id.clone(),
            ts("2024-02-03T10:00"),
        ));

        let booking = execute(build_usecase(occurrence.clone()), &ctx).await.unwrap();
        assert_ne!(booking.event_id, master.id);

        let detached = ctx.repos.events.find(&booking.event_id).await.unwrap();
        assert_eq!(detached.recurrence_parent_id, Some(master.id.clone()));
        assert_eq!(detached.status, EventStatus::Scheduled);
        assert_eq!(detached.start_ts, ts("2024-02-03T10:00"));

        let master = ctx.repos.events.find(&master.id).await.unwrap();
        assert_eq!(master.status, EventStatus::OpenSlot);
        assert_eq!(master.exdates, vec![ts("2024-02-03T10:00")]);

        // The occurrence is no longer generated
        assert!(matches!(
            execute(build_usecase(occurrence), &ctx).await,
            Err(UseCaseErrors::NotFound(_))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn failed_detach_keeps_the_occurrence_bookable() {
        let mut ctx = SlotbookContext::create_inmemory();
        let master = open_slot(&ctx, Some(RecurrenceRule::default())).await;
        fail_event_inserts(&mut ctx);
        let start_ts = ts("2024-02-03T10:00");
        let occurrence = EventRef::Occurrence(OccurrenceId::new(master.id.clone(), start_ts));

        assert!(matches!(
            execute(build_usecase(occurrence), &ctx).await,
            Err(UseCaseErrors::StorageError)
        ));

        let master = ctx.repos.events.find(&master.id).await.unwrap();
        assert!(master.exdates.is_empty());
        assert!(master.has_occurrence_at(start_ts));
        assert!(ctx.repos.events.find_by_parent(&master.id).await.unwrap().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn booking_a_master_directly_conflicts() {
        let ctx = SlotbookContext::create_inmemory();
        let master = open_slot(&ctx, Some(RecurrenceRule::default())).await;

        assert!(matches!(
            execute(build_usecase(EventRef::Stored(master.id)), &ctx).await,
            Err(UseCaseErrors::Conflict(_))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn rejects_bad_input() {
        let ctx = SlotbookContext::create_inmemory();
        let slot = open_slot(&ctx, None).await;

        let mut bad_email = build_usecase(EventRef::Stored(slot.id.clone()));
        bad_email.email = "not-an-email".into();
        let mut blank_name = build_usecase(EventRef::Stored(slot.id.clone()));
        blank_name.name = "   ".into();
        let mut bad_timezone = build_usecase(EventRef::Stored(slot.id.clone()));
        bad_timezone.timezone = Some("Moon/Base".into());

        for usecase in vec![bad_email, blank_name, bad_timezone] {
            assert!(matches!(
                execute(usecase, &ctx).await,
                Err(UseCaseErrors::Validation(_))
            ));
        }

        assert!(matches!(
            execute(build_usecase(EventRef::Stored(ID::default())), &ctx).await,
            Err(UseCaseErrors::NotFound(_))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn returning_contact_is_not_duplicated() {
        let ctx = SlotbookContext::create_inmemory();
        let first = open_slot(&ctx, None).await;
        let second = insert_event(
            &ctx,
            &ID::default(),
            "2024-02-02T10:00",
            "2024-02-02T11:00",
            EventStatus::OpenSlot,
            EventVisibility::PublicOpen,
            None,
        )
        .await;

        execute(build_usecase(EventRef::Stored(first.id)), &ctx).await.unwrap();
        let mut again = build_usecase(EventRef::Stored(second.id));
        again.email = " ANA@example.com ".into();
        execute(again, &ctx).await.unwrap();

        let contact = ctx.repos.contacts.find_by_email("ana@example.com").await.unwrap();
        assert_eq!(contact.name, "Ana Reyes");
    }
}
