use super::lookup::{find_owned_event, find_series_master, ResolvedEvent};
use crate::{
    error::SlotbookError,
    shared::{
        guard::Guard,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpResponse};
use slotbook_api_structs::delete_event::*;
use slotbook_domain::{CalendarEntry, EditMode, EventRef, ID};
use slotbook_infra::SlotbookContext;
use tracing::info;

fn handle_error(e: UseCaseErrors) -> SlotbookError {
    match e {
        UseCaseErrors::NotFound(event_ref) => SlotbookError::NotFound(format!(
            "The calendar event with id: {}, was not found.",
            event_ref
        )),
        UseCaseErrors::StorageError => SlotbookError::InternalError,
    }
}

pub async fn delete_event_controller(
    path_params: web::Path<PathParams>,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<SlotbookContext>,
) -> Result<HttpResponse, SlotbookError> {
    let event_ref = Guard::against_malformed_event_ref(&path_params.event_id)?;

    let usecase = DeleteEventUseCase {
        owner_id: path_params.owner_id.clone(),
        event_ref,
        mode: query_params.mode,
    };

    execute(usecase, &ctx)
        .await
        .map(|entry| HttpResponse::Ok().json(APIResponse::from_entry(entry)))
        .map_err(handle_error)
}

/// Removes one event or a whole series.
///
/// A single generated occurrence is excluded from its master. Removing a
/// stored master on its own also removes its detached instances since they
/// have nothing left to belong to.
#[derive(Debug)]
pub struct DeleteEventUseCase {
    pub owner_id: ID,
    pub event_ref: EventRef,
    pub mode: EditMode,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(EventRef),
    StorageError,
}

impl DeleteEventUseCase {
    async fn delete_with_children(
        &self,
        event_id: &ID,
        ctx: &SlotbookContext,
    ) -> Result<CalendarEntry, UseCaseErrors> {
        let res = ctx
            .repos
            .events
            .delete_by_parent(event_id)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        if res.deleted_count > 0 {
            info!(
                "Removed {} detached instances of event: {}",
                res.deleted_count, event_id
            );
        }
        self.delete_one(event_id, ctx).await
    }

    async fn delete_one(
        &self,
        event_id: &ID,
        ctx: &SlotbookContext,
    ) -> Result<CalendarEntry, UseCaseErrors> {
        ctx.repos
            .events
            .delete(event_id)
            .await
            .map(CalendarEntry::Stored)
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_ref.clone()))
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteEventUseCase {
    type Response = CalendarEntry;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "DeleteEvent";

    async fn execute(&mut self, ctx: &SlotbookContext) -> Result<Self::Response, Self::Errors> {
        let resolved = find_owned_event(&self.owner_id, &self.event_ref, ctx)
            .await
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_ref.clone()))?;

        match (self.mode, resolved) {
            (EditMode::Single, ResolvedEvent::Occurrence { master, instance }) => {
                let excluded = ctx
                    .repos
                    .events
                    .add_exdate(&master.id, instance.start_ts)
                    .await
                    .map_err(|_| UseCaseErrors::StorageError)?;
                if !excluded {
                    return Err(UseCaseErrors::NotFound(self.event_ref.clone()));
                }
                Ok(CalendarEntry::Virtual(instance))
            }
            (EditMode::Single, ResolvedEvent::Stored(e)) if e.is_detached() => {
                // The master keeps its exdate so the position stays empty
                self.delete_one(&e.id, ctx).await
            }
            (EditMode::Single, ResolvedEvent::Stored(e)) => {
                self.delete_with_children(&e.id, ctx).await
            }
            (EditMode::Series, resolved) => {
                let master = find_series_master(resolved, ctx)
                    .await
                    .ok_or_else(|| UseCaseErrors::NotFound(self.event_ref.clone()))?;
                self.delete_with_children(&master.id, ctx).await
            }
        }
    }
}
