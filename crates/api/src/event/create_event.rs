use super::{validate_color, validate_title};
use crate::{
    error::SlotbookError,
    shared::{
        time_range::resolve_timezone,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpResponse};
use slotbook_api_structs::create_event::*;
use slotbook_domain::{
    date::parse_datetime, CalendarEvent, EventStatus, EventVisibility, InvalidRecurrenceRuleError,
    InvalidTimeFormatError, RecurrenceRule, ID,
};
use slotbook_infra::SlotbookContext;

fn handle_error(e: UseCaseErrors) -> SlotbookError {
    match e {
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
        UseCaseErrors::StorageError => SlotbookError::InternalError,
    }
}

pub async fn create_event_controller(
    body: web::Json<RequestBody>,
    path_params: web::Path<PathParams>,
    ctx: web::Data<SlotbookContext>,
) -> Result<HttpResponse, SlotbookError> {
    let body = body.0;
    let usecase = CreateEventUseCase {
        owner_id: path_params.owner_id.clone(),
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
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Created().json(APIResponse::new(event)))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct CreateEventUseCase {
    pub owner_id: ID,
    pub title: String,
    pub agenda: Option<String>,
    pub notes: Option<String>,
    pub start_datetime: String,
    pub end_datetime: String,
    pub timezone: Option<String>,
    pub status: EventStatus,
    pub visibility: EventVisibility,
    pub recurrence: Option<RecurrenceRule>,
    pub color: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidTimeFormat(InvalidTimeFormatError),
    InvalidRange(i64, i64),
    InvalidRecurrenceRule(InvalidRecurrenceRuleError),
    Validation(String),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateEventUseCase {
    type Response = CalendarEvent;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "CreateEvent";

    async fn execute(&mut self, ctx: &SlotbookContext) -> Result<Self::Response, Self::Errors> {
        validate_title(&self.title).map_err(UseCaseErrors::Validation)?;
        if let Some(color) = &self.color {
            validate_color(color).map_err(UseCaseErrors::Validation)?;
        }

        let tz = resolve_timezone(self.timezone.as_deref(), ctx)
            .map_err(UseCaseErrors::InvalidTimeFormat)?;
        let start_ts =
            parse_datetime(&self.start_datetime, &tz).map_err(UseCaseErrors::InvalidTimeFormat)?;
        let end_ts =
            parse_datetime(&self.end_datetime, &tz).map_err(UseCaseErrors::InvalidTimeFormat)?;
        if start_ts >= end_ts {
            return Err(UseCaseErrors::InvalidRange(start_ts, end_ts));
        }

        if let Some(rule) = &self.recurrence {
            rule.validate(&tz)
                .map_err(UseCaseErrors::InvalidRecurrenceRule)?;
        }

        let now = ctx.sys.get_timestamp_millis();
        let e = CalendarEvent {
            id: Default::default(),
            owner_id: self.owner_id.clone(),
            title: self.title.trim().to_string(),
            agenda: self.agenda.clone(),
            notes: self.notes.clone(),
            start_ts,
            end_ts,
            timezone: tz,
            status: self.status,
            visibility: self.visibility,
            recurrence: self.recurrence.clone(),
            recurrence_parent_id: None,
            exdates: Vec::new(),
            color: self.color.clone(),
            created: now,
            updated: now,
        };

        ctx.repos
            .events
            .insert(&e)
            .await
            .map(|_| e)
            .map_err(|_| UseCaseErrors::StorageError)
    }
}
