use crate::{
    error::SlotbookError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use slotbook_api_structs::convert_open_slot::*;
use slotbook_domain::{Actor, CalendarEvent, EventStatus, InvalidStateError, ID};
use slotbook_infra::SlotbookContext;

fn handle_error(e: UseCaseErrors) -> SlotbookError {
    match e {
        UseCaseErrors::NotFound(event_id) => SlotbookError::NotFound(format!(
            "The calendar event with id: {}, was not found.",
            event_id
        )),
        UseCaseErrors::InvalidState(e) => SlotbookError::InvalidState(e.to_string()),
        UseCaseErrors::StorageError => SlotbookError::InternalError,
    }
}

pub async fn convert_open_slot_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<SlotbookContext>,
) -> Result<HttpResponse, SlotbookError> {
    let usecase = ConvertOpenSlotToScheduledUseCase {
        owner_id: path_params.owner_id.clone(),
        event_id: path_params.event_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(APIResponse::new(event)))
        .map_err(handle_error)
}

/// Turns an open slot into a scheduled event, either when a booking claims
/// it or when the owner fills it directly.
///
/// The status is only changed if it still is `open_slot` in the store, so
/// of two concurrent conversions of the same slot exactly one succeeds.
#[derive(Debug)]
pub struct ConvertOpenSlotToScheduledUseCase {
    pub owner_id: ID,
    pub event_id: ID,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    InvalidState(InvalidStateError),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for ConvertOpenSlotToScheduledUseCase {
    type Response = CalendarEvent;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "ConvertOpenSlotToScheduled";

    async fn execute(&mut self, ctx: &SlotbookContext) -> Result<Self::Response, Self::Errors> {
        let mut e = ctx
            .repos
            .events
            .find(&self.event_id)
            .await
            .filter(|e| e.owner_id == self.owner_id)
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_id.clone()))?;

        let from = e.status;
        e.set_status(EventStatus::Scheduled, Actor::Booking)
            .map_err(UseCaseErrors::InvalidState)?;

        let converted = ctx
            .repos
            .events
            .transition_status(&e.id, from, e.status)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        if !converted {
            // Changed since it was read
            return Err(UseCaseErrors::InvalidState(InvalidStateError {
                from,
                to: EventStatus::Scheduled,
                actor: Actor::Booking,
            }));
        }

        Ok(e)
    }
}
