use super::lookup::find_owned_event;
use crate::{
    error::SlotbookError,
    shared::{
        guard::Guard,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpResponse};
use slotbook_api_structs::get_event::*;
use slotbook_domain::{CalendarEntry, EventRef, ID};
use slotbook_infra::SlotbookContext;

fn handle_error(e: UseCaseErrors) -> SlotbookError {
    match e {
        UseCaseErrors::NotFound(event_ref) => SlotbookError::NotFound(format!(
            "The calendar event with id: {}, was not found.",
            event_ref
        )),
    }
}

pub async fn get_event_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<SlotbookContext>,
) -> Result<HttpResponse, SlotbookError> {
    let event_ref = Guard::against_malformed_event_ref(&path_params.event_id)?;

    let usecase = GetEventUseCase {
        owner_id: path_params.owner_id.clone(),
        event_ref,
    };

    execute(usecase, &ctx)
        .await
        .map(|entry| HttpResponse::Ok().json(APIResponse::from_entry(entry)))
        .map_err(handle_error)
}

/// Finds a stored event or one generated occurrence of a master
#[derive(Debug)]
pub struct GetEventUseCase {
    pub owner_id: ID,
    pub event_ref: EventRef,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(EventRef),
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetEventUseCase {
    type Response = CalendarEntry;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetEvent";

    async fn execute(&mut self, ctx: &SlotbookContext) -> Result<Self::Response, Self::Errors> {
        match find_owned_event(&self.owner_id, &self.event_ref, ctx).await {
            Some(resolved) => Ok(resolved.into_entry()),
            None => Err(UseCaseErrors::NotFound(self.event_ref.clone())),
        }
    }
}
