use actix_web::{web, HttpResponse};
use slotbook_api_structs::get_service_health::*;
use slotbook_infra::SlotbookContext;

async fn status(ctx: web::Data<SlotbookContext>) -> HttpResponse {
    HttpResponse::Ok().json(APIResponse {
        message: "Yo! We are up!\r\n".into(),
        default_timezone: ctx.config.default_timezone.name().into(),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}
