mod inmemory;
mod postgres;

pub use inmemory::InMemoryBookingRequestRepo;
pub use postgres::PostgresBookingRequestRepo;
use slotbook_domain::{BookingRequest, ID};

#[async_trait::async_trait]
pub trait IBookingRequestRepo: Send + Sync {
    async fn insert(&self, booking: &BookingRequest) -> anyhow::Result<()>;
    async fn find(&self, booking_id: &ID) -> Option<BookingRequest>;
    async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<BookingRequest>>;
}
