mod create_booking;
mod get_public_schedule;
mod validate_booking;

use actix_web::web;
use create_booking::create_booking_controller;
use get_public_schedule::get_public_schedule_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/public/schedule",
        web::get().to(get_public_schedule_controller),
    );
    cfg.route("/public/bookings", web::post().to(create_booking_controller));
}
