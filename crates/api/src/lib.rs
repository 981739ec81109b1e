mod booking;
mod error;
mod event;
mod shared;
mod status;

use actix_cors::Cors;
use actix_web::{
    dev::Server, error::InternalError, middleware, web, App, HttpServer, ResponseError,
};
use error::SlotbookError;
use slotbook_infra::SlotbookContext;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    booking::configure_routes(cfg);
    event::configure_routes(cfg);
    status::configure_routes(cfg);
}

/// Malformed request input is reported with the same error body as every
/// other failure. Path segments that do not parse can not address anything.
fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| extractor_error(err, SlotbookError::BadClientData)),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| extractor_error(err, SlotbookError::BadClientData)),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| extractor_error(err, SlotbookError::NotFound)),
    );
}

fn extractor_error<E>(err: E, kind: fn(String) -> SlotbookError) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let response = kind(err.to_string()).error_response();
    InternalError::from_response(err, response).into()
}

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    pub async fn new(context: SlotbookContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context).await?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn configure_server(context: SlotbookContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .configure(configure_extractors)
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
