mod booking;
mod contact;
mod event;
mod notification;
mod shared;

use booking::{IBookingRequestRepo, InMemoryBookingRequestRepo, PostgresBookingRequestRepo};
use contact::{IContactRepo, InMemoryContactRepo, PostgresContactRepo};
use event::{InMemoryEventRepo, PostgresEventRepo};
use notification::{INotificationRepo, InMemoryNotificationRepo, PostgresNotificationRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

pub use event::IEventRepo;
pub use shared::repo::DeleteResult;

#[derive(Clone)]
pub struct Repos {
    pub events: Arc<dyn IEventRepo>,
    pub booking_requests: Arc<dyn IBookingRequestRepo>,
    pub contacts: Arc<dyn IContactRepo>,
    pub notifications: Arc<dyn INotificationRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            events: Arc::new(PostgresEventRepo::new(pool.clone())),
            booking_requests: Arc::new(PostgresBookingRequestRepo::new(pool.clone())),
            contacts: Arc::new(PostgresContactRepo::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            events: Arc::new(InMemoryEventRepo::new()),
            booking_requests: Arc::new(InMemoryBookingRequestRepo::new()),
            contacts: Arc::new(InMemoryContactRepo::new()),
            notifications: Arc::new(InMemoryNotificationRepo::new()),
        }
    }
}
