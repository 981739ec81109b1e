use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

/// A confirmed claim of an open slot by a member of the public
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub id: ID,
    /// The slot that was booked. For a booked occurrence this is the
    /// detached instance created for it, never the master.
    pub event_id: ID,
    pub name: String,
    pub email: String,
    pub message: Option<String>,
    pub timezone_at_booking: Option<String>,
    pub status: BookingStatus,
    pub created: i64,
}

impl Entity for BookingRequest {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
        }
    }
}
