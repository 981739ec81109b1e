use super::IBookingRequestRepo;
use crate::repos::shared::inmemory_repo::*;
use slotbook_domain::{BookingRequest, ID};

pub struct InMemoryBookingRequestRepo {
    bookings: std::sync::Mutex<Vec<BookingRequest>>,
}

impl InMemoryBookingRequestRepo {
    pub fn new() -> Self {
        Self {
            bookings: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IBookingRequestRepo for InMemoryBookingRequestRepo {
    async fn insert(&self, booking: &BookingRequest) -> anyhow::Result<()> {
        insert(booking, &self.bookings);
        Ok(())
    }

    async fn find(&self, booking_id: &ID) -> Option<BookingRequest> {
        find(booking_id, &self.bookings)
    }

    async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<BookingRequest>> {
        Ok(find_by(&self.bookings, |b| b.event_id == *event_id))
    }
}
