pub mod convert_open_slot;
mod create_event;
mod delete_event;
mod get_event;
mod get_event_instances;
pub mod get_events;
pub mod lookup;
mod update_event;

use actix_web::web;
use convert_open_slot::convert_open_slot_controller;
use create_event::create_event_controller;
use delete_event::delete_event_controller;
use get_event::get_event_controller;
use get_event_instances::get_event_instances_controller;
use get_events::get_events_controller;
use slotbook_domain::ID;
use slotbook_infra::SlotbookContext;
use tracing::{error, info};
use update_event::update_event_controller;

const TITLE_MAX_LENGTH: usize = 255;
const COLOR_MAX_LENGTH: usize = 50;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/user/{owner_id}/events",
        web::post().to(create_event_controller),
    );
    cfg.route(
        "/user/{owner_id}/events",
        web::get().to(get_events_controller),
    );
    cfg.route(
        "/user/{owner_id}/events/{event_id}",
        web::get().to(get_event_controller),
    );
    cfg.route(
        "/user/{owner_id}/events/{event_id}",
        web::put().to(update_event_controller),
    );
    cfg.route(
        "/user/{owner_id}/events/{event_id}",
        web::delete().to(delete_event_controller),
    );
    cfg.route(
        "/user/{owner_id}/events/{event_id}/instances",
        web::get().to(get_event_instances_controller),
    );
    cfg.route(
        "/user/{owner_id}/events/{event_id}/schedule",
        web::post().to(convert_open_slot_controller),
    );
}

/// Shape checks shared by create and update
fn validate_title(title: &str) -> Result<(), String> {
    let length = title.trim().chars().count();
    if length == 0 || length > TITLE_MAX_LENGTH {
        return Err(format!(
            "Title must be between 1 and {} characters",
            TITLE_MAX_LENGTH
        ));
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<(), String> {
    if color.chars().count() > COLOR_MAX_LENGTH {
        return Err(format!(
            "Color must be at most {} characters",
            COLOR_MAX_LENGTH
        ));
    }
    Ok(())
}

/// Undoes an exdate added to claim an occurrence whose detached record could
/// not be stored, so the position is generated again
pub(crate) async fn release_occurrence(master_id: &ID, start_ts: i64, ctx: &SlotbookContext) {
    match ctx.repos.events.remove_exdate(master_id, start_ts).await {
        Ok(true) => info!(
            "Released occurrence: {} of master: {} after a failed insert",
            start_ts, master_id
        ),
        _ => error!(
            "Unable to release occurrence: {} of master: {} after a failed insert",
            start_ts, master_id
        ),
    }
}
